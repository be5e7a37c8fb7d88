//! 언어별 정규식 규칙 기반 정적 검사.
//!
//! 린터 본체를 실행하지 않고, 라인 단위 패턴만으로 흔한 컨벤션 위반을 찾는다.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::finding::{Finding, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Kotlin,
    Swift,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Kotlin, Language::Swift, Language::JavaScript];

    /// 확장자로 언어를 판별한다. 지원하지 않는 파일은 None.
    pub fn detect(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().iter().any(|ext| path.ends_with(ext)))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kotlin => "kotlin",
            Self::Swift => "swift",
            Self::JavaScript => "javascript",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Kotlin => &[".kt", ".kts"],
            Self::Swift => &[".swift"],
            Self::JavaScript => &[".js", ".jsx", ".ts", ".tsx"],
        }
    }

    /// 이 언어 규칙이 보고하는 category(린터 이름).
    pub fn linter(self) -> &'static str {
        match self {
            Self::Kotlin => "ktlint",
            Self::Swift => "swiftlint",
            Self::JavaScript => "eslint",
        }
    }

    fn rules(self) -> &'static [LintRule] {
        match self {
            Self::Kotlin => KOTLIN_RULES.as_slice(),
            Self::Swift => SWIFT_RULES.as_slice(),
            Self::JavaScript => JAVASCRIPT_RULES.as_slice(),
        }
    }
}

/// 기본 들여쓰기 칸 수.
pub const DEFAULT_INDENT_SIZE: usize = 4;
/// 기본 최대 줄 길이(문자 수).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// 한 언어 검사에 적용되는 최종 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSettings {
    pub indent_size: usize,
    pub max_line_length: usize,
    pub disabled_rules: Vec<String>,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_INDENT_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            disabled_rules: Vec::new(),
        }
    }
}

/// 설정 한 출처(linepilot 설정, 저장소 린터 설정)가 지정한 값. 빈 값은 하위 출처를 따른다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOverrides {
    pub indent_size: Option<usize>,
    pub max_line_length: Option<usize>,
    pub disabled_rules: Vec<String>,
}

impl LintSettings {
    /// 임계값은 `explicit` > `repo` > 기본값 순으로 정한다. 끈 규칙은 합집합이다.
    pub fn resolve(explicit: &LintOverrides, repo: Option<&LintOverrides>) -> Self {
        let repo_indent = repo.and_then(|r| r.indent_size);
        let repo_length = repo.and_then(|r| r.max_line_length);

        let mut disabled_rules = explicit.disabled_rules.clone();
        for rule in repo.map(|r| r.disabled_rules.as_slice()).unwrap_or_default() {
            if !disabled_rules.contains(rule) {
                disabled_rules.push(rule.clone());
            }
        }

        Self {
            indent_size: explicit
                .indent_size
                .or(repo_indent)
                .unwrap_or(DEFAULT_INDENT_SIZE),
            max_line_length: explicit
                .max_line_length
                .or(repo_length)
                .unwrap_or(DEFAULT_MAX_LINE_LENGTH),
            disabled_rules,
        }
    }

    fn is_disabled(&self, rule: &str) -> bool {
        self.disabled_rules.iter().any(|d| d == rule)
    }
}

/// 모든 linter category 이름. 출처(정적/AI) 구분에 쓴다.
pub fn is_linter_category(category: &str) -> bool {
    Language::ALL.iter().any(|lang| lang.linter() == category)
}

enum Check {
    Pattern(Regex),
    /// 선행 공백이 `indent_size`보다 적거나 탭으로 시작하는 줄
    Indent,
    /// 문자 수가 `max_line_length`를 넘는 줄
    LineLength,
}

struct LintRule {
    name: &'static str,
    check: Check,
    priority: Priority,
    /// `{n}`은 적용된 임계값으로 바뀐다.
    message: &'static str,
    suggestion: &'static str,
}

impl LintRule {
    fn pattern(
        name: &'static str,
        pattern: &str,
        priority: Priority,
        message: &'static str,
        suggestion: &'static str,
    ) -> Self {
        Self::with_check(
            name,
            Check::Pattern(Regex::new(pattern).expect("lint rule pattern")),
            priority,
            message,
            suggestion,
        )
    }

    fn with_check(
        name: &'static str,
        check: Check,
        priority: Priority,
        message: &'static str,
        suggestion: &'static str,
    ) -> Self {
        Self {
            name,
            check,
            priority,
            message,
            suggestion,
        }
    }

    fn hits(&self, line: &str, settings: &LintSettings) -> bool {
        match &self.check {
            Check::Pattern(regex) => regex.is_match(line),
            Check::Indent => {
                let spaces = line.len() - line.trim_start_matches(' ').len();
                line.starts_with('\t')
                    || (spaces > 0 && spaces < settings.indent_size && line.len() > spaces)
            }
            Check::LineLength => line.chars().count() > settings.max_line_length,
        }
    }

    fn text(&self, template: &str, settings: &LintSettings) -> String {
        match self.check {
            Check::Indent => template.replace("{n}", &settings.indent_size.to_string()),
            Check::LineLength => template.replace("{n}", &settings.max_line_length.to_string()),
            Check::Pattern(_) => template.to_string(),
        }
    }
}

static KOTLIN_RULES: LazyLock<Vec<LintRule>> = LazyLock::new(|| {
    vec![
        LintRule::with_check(
            "indent",
            Check::Indent,
            Priority::P3,
            "들여쓰기는 {n}칸 스페이스를 사용해야 합니다.",
            "들여쓰기를 {n}칸 스페이스로 수정하세요.",
        ),
        LintRule::with_check(
            "max-line-length",
            Check::LineLength,
            Priority::P3,
            "한 줄의 길이가 {n}자를 초과합니다.",
            "긴 줄을 여러 줄로 나누어 가독성을 높이세요.",
        ),
        LintRule::pattern(
            "no-wildcard-imports",
            r"import\s+.*\.\*",
            Priority::P3,
            "와일드카드 import(*)는 사용하지 마세요.",
            "import com.example.* → import com.example.SpecificClass",
        ),
        LintRule::pattern(
            "function-naming",
            r"fun\s+[A-Z][a-zA-Z0-9_]*\s*\(",
            Priority::P3,
            "함수명은 camelCase를 사용해야 합니다.",
            "MyFunction() → myFunction()",
        ),
    ]
});

static SWIFT_RULES: LazyLock<Vec<LintRule>> = LazyLock::new(|| {
    vec![
        LintRule::with_check(
            "line_length",
            Check::LineLength,
            Priority::P3,
            "한 줄의 길이가 {n}자를 초과합니다.",
            "긴 줄을 여러 줄로 나누어 가독성을 높이세요.",
        ),
        LintRule::pattern(
            "function_parameter_count",
            r"func\s+\w+\([^)]*,[^)]*,[^)]*,[^)]*,[^)]*,[^)]*\)",
            Priority::P2,
            "함수 매개변수가 너무 많습니다. 구조체나 튜플 사용을 고려하세요.",
            "매개변수를 구조체로 그룹화하거나 함수를 분할하세요.",
        ),
        LintRule::pattern(
            "force_cast",
            r"\s+as!\s+",
            Priority::P2,
            "force cast(as!) 대신 안전한 캐스팅(as?)을 사용하세요.",
            "as! → as? 또는 guard let 사용",
        ),
        LintRule::pattern(
            "implicitly_unwrapped_optional",
            r":\s*\w+!",
            Priority::P2,
            "암시적 옵셔널 언래핑(!)보다 명시적 옵셔널을 권장합니다.",
            "String! → String? 사용 권장",
        ),
    ]
});

static JAVASCRIPT_RULES: LazyLock<Vec<LintRule>> = LazyLock::new(|| {
    vec![
        LintRule::pattern(
            "no-console",
            r"console\.(log|warn|error)",
            Priority::P3,
            "프로덕션 코드에서 console 사용을 피하세요.",
            "console.log → 로깅 라이브러리 사용",
        ),
        LintRule::pattern(
            "eqeqeq",
            r"[^=!]==[^=]|[^=!]!=[^=]",
            Priority::P2,
            "== 대신 ===, != 대신 !==를 사용하세요.",
            "== → ===, != → !== 변경",
        ),
    ]
});

/// 파일 전체 내용을 검사한다. `settings.disabled_rules`에 있는 규칙 이름은 건너뛴다.
/// 지원하지 않는 언어면 빈 목록이다.
pub fn lint_file(path: &str, content: &str, settings: &LintSettings) -> Vec<Finding> {
    let Some(language) = Language::detect(path) else {
        return Vec::new();
    };

    let rules: Vec<&LintRule> = language
        .rules()
        .iter()
        .filter(|rule| !settings.is_disabled(rule.name))
        .collect();

    let mut findings = Vec::new();
    for (idx, text) in content.lines().enumerate() {
        // u32 범위를 넘는 줄은 diff position으로도 표현할 수 없다.
        let Ok(line) = u32::try_from(idx + 1) else {
            break;
        };
        for rule in &rules {
            if !rule.hits(text, settings) {
                continue;
            }
            findings.push(Finding {
                line,
                priority: rule.priority,
                category: language.linter().to_string(),
                message: rule.text(rule.message, settings),
                suggestion: Some(rule.text(rule.suggestion, settings)),
            });
        }
    }
    findings
}
