//! 리뷰 도메인 엔티티/값 객체.

use std::collections::BTreeMap;

use crate::domain::finding::Finding;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub url: String,
    pub dry_run: bool,
}

/// PR에서 변경된 파일 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Other,
}

impl FileStatus {
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "added" => Self::Added,
            "modified" | "changed" => Self::Modified,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Other,
        }
    }
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
            Self::Other => "changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    pub additions: u32,
    pub deletions: u32,
    /// 바이너리/대용량 파일은 patch가 없다.
    pub patch: Option<String>,
}

/// PR 메타데이터 중 실행에 필요한 부분.
#[derive(Debug, Clone, Default)]
pub struct PullRequestInfo {
    pub title: String,
    pub body: String,
    pub head_sha: String,
}

/// 작성자와 본문을 가진 PR 코멘트(라인 리뷰 코멘트, 일반 코멘트 공통).
pub trait AuthoredComment {
    fn id(&self) -> &str;
    fn author(&self) -> &str;
    fn body(&self) -> &str;
}

/// PR에 이미 달린 라인 리뷰 코멘트.
#[derive(Debug, Clone)]
pub struct ExistingReviewComment {
    pub id: String,
    pub author: String,
    pub path: String,
    /// outdated 코멘트는 현재 라인이 없다.
    pub line: Option<u32>,
    pub body: String,
    /// 답글이면 스레드 첫 코멘트 id
    pub in_reply_to: Option<String>,
}

impl AuthoredComment for ExistingReviewComment {
    fn id(&self) -> &str {
        &self.id
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn body(&self) -> &str {
        &self.body
    }
}

/// PR 대화 탭의 일반 코멘트.
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub id: String,
    pub author: String,
    pub body: String,
}

impl AuthoredComment for IssueComment {
    fn id(&self) -> &str {
        &self.id
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn body(&self) -> &str {
        &self.body
    }
}

/// 리뷰 결과 출력 언어 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentLanguage {
    Korean,
    English,
}

impl CommentLanguage {
    /// 지원값: ko/korean, en/english (미지정/알수없음은 ko 기본값)
    pub fn from_config(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::Korean;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Self::English,
            _ => Self::Korean,
        }
    }

    pub fn prompt_instruction(self) -> &'static str {
        match self {
            Self::Korean => "Write every message and suggestion in Korean.",
            Self::English => "Write every message and suggestion in English.",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Korean => "ko",
            Self::English => "en",
        }
    }
}

/// 파일 하나에 대한 모델 분석 요청.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub path: String,
    pub language: Option<&'static str>,
    pub patch: String,
    pub content: Option<String>,
    pub changed_lines: Vec<u32>,
    pub system_prompt: String,
    pub comment_language: CommentLanguage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    pub fn add_from(&mut self, other: &TokenUsage) {
        self.prompt_tokens = sum_optional(self.prompt_tokens, other.prompt_tokens);
        self.completion_tokens = sum_optional(self.completion_tokens, other.completion_tokens);
        self.total_tokens = sum_optional(self.total_tokens, other.total_tokens);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderFindings {
    pub findings: Vec<Finding>,
    pub usage: TokenUsage,
}

/// diff position에 고정된 라인 코멘트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineComment {
    pub path: String,
    pub line: u32,
    pub position: u32,
    pub body: String,
}

/// 한 번에 게시할 리뷰(요약 본문 + 라인 코멘트).
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub commit_id: String,
    pub body: String,
    pub comments: Vec<InlineComment>,
}

/// 리뷰 요약 본문에 들어가는 집계값.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub files_reviewed: usize,
    /// linter 이름 -> 게시 대상 finding 수
    pub lint_counts: BTreeMap<String, usize>,
    pub model_findings: usize,
    pub duplicates_skipped: usize,
    pub usage: TokenUsage,
}

impl ReviewSummary {
    pub fn lint_findings(&self) -> usize {
        self.lint_counts.values().sum()
    }

    pub fn total_findings(&self) -> usize {
        self.lint_findings() + self.model_findings
    }
}

/// 파일 경로 -> finding 목록. 경로 순서로 결정적으로 순회한다.
pub type FileFindings = BTreeMap<String, Vec<Finding>>;

/// UTF-8 경계를 지키며 최대 바이트까지 자른다.
pub fn truncate_utf8(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn sum_optional(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + y),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_sums_known_fields_only() {
        let mut total = TokenUsage::default();
        total.add_from(&TokenUsage {
            prompt_tokens: Some(10),
            completion_tokens: None,
            total_tokens: Some(10),
        });
        total.add_from(&TokenUsage {
            prompt_tokens: Some(5),
            completion_tokens: Some(3),
            total_tokens: Some(8),
        });
        assert_eq!(total.prompt_tokens, Some(15));
        assert_eq!(total.completion_tokens, Some(3));
        assert_eq!(total.total_tokens, Some(18));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_utf8("abc", 10), "abc");
        assert_eq!(truncate_utf8("abcdef", 3), "abc");
        // "한"은 3바이트다.
        assert_eq!(truncate_utf8("한글", 4), "한");
    }

    #[test]
    fn unknown_language_defaults_to_korean() {
        assert_eq!(CommentLanguage::from_config(None), CommentLanguage::Korean);
        assert_eq!(CommentLanguage::from_config(Some("EN")), CommentLanguage::English);
        assert_eq!(CommentLanguage::from_config(Some("fr")), CommentLanguage::Korean);
    }
}
