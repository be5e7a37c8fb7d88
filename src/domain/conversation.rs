//! PR 요약 코멘트와 코멘트 답글 규칙.
//!
//! 요약 코멘트는 본문 맨 앞의 마커와 봇 로그인으로 알아본다.
//! 답글 대상은 사람이 AI 코멘트에 단 질문/의견이다.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::finding::PostedComment;
use crate::domain::review::{AuthoredComment, ChangedFile, CommentLanguage, TokenUsage};

/// 요약 코멘트 식별 마커(렌더링되지 않는 HTML 주석).
pub const SUMMARY_MARKER: &str = "<!-- linepilot:summary -->";
/// 접힌 이전 요약 마커. 이 코멘트는 다시 요약으로 취급하지 않는다.
pub const MINIMIZED_MARKER: &str = "<!-- linepilot:minimized -->";
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";
pub const REPLY_HEADING: &str = "**💬 AI 응답**";
/// README 등에 팀 컨벤션 섹션이 없을 때 모델에 주는 안내.
pub const FALLBACK_CONVENTIONS: &str = "No team conventions were found. Apply general best practices.";

/// 본문에 있으면 AI가 쓴 코멘트로 본다.
const AI_COMMENT_MARKERS: &[&str] = &[
    SUMMARY_MARKER,
    REPLY_HEADING,
    "**[P2]**",
    "**[P3]**",
    "🤖 **AI 분석**",
    "⚠️ **Potential issue**",
    "🔧 **Refactor suggestion**",
    "📝 **Code quality**",
    "📝 Walkthrough",
    "Committable suggestion",
];

/// 고맙다/확인 같은 짧은 반응. 답하지 않는다.
static ACKNOWLEDGEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(감사|고마워|thanks|thank you|thx|ok|okay|좋아|알겠|lgtm)|\+1|👍|✅")
        .expect("acknowledgement pattern")
});

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[\w+-]*\n(.*?)\n?```").expect("code block pattern")
});

const QUESTION_HINTS: &[&str] = &[
    "?", "어떻게", "왜", "어떤", "언제", "어디서", "뭔가", "그런데", "근데", "그럼", "만약", "how", "why",
    "what", "could", "should",
];

/// 이 길이(문자) 이하 코멘트는 답하지 않는다.
const MIN_RESPONDABLE_CHARS: usize = 5;
/// 질문 표현이 없어도 이 길이 이상이면 의견으로 보고 답한다.
const OPINION_CHARS: usize = 15;

/// `linepilot reply` 실행 옵션.
#[derive(Debug, Clone)]
pub struct ReplyOptions {
    pub url: String,
    /// 답할 코멘트(라인 리뷰 코멘트 또는 일반 코멘트) id
    pub comment_id: String,
    pub dry_run: bool,
}

/// `summarize` 한 번에 모델로 넘기는 입력.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub title: String,
    pub description: String,
    /// 저장소 컨벤션 섹션 본문(없으면 `FALLBACK_CONVENTIONS`)
    pub conventions: String,
    /// patch는 이미 잘린 상태다.
    pub files: Vec<ChangedFile>,
    pub comment_language: CommentLanguage,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// 답글 한 건을 만들기 위한 입력.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub author: String,
    pub question: String,
    /// 답글이 달린 AI 코멘트 원문
    pub parent_body: String,
    /// 원문을 finding 형식으로 읽은 결과(요약/답글 코멘트면 None)
    pub parent: Option<PostedComment>,
    pub suggested_code: Option<String>,
    pub path: Option<String>,
    pub line: Option<u32>,
    /// `{번호:3}: {내용}` 형식의 주변 코드
    pub surrounding_code: Option<String>,
    pub diff_excerpt: Option<String>,
    pub comment_language: CommentLanguage,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// 모델이 쓴 자유 형식 문장.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// 요약 실행 결과.
#[derive(Debug, Clone, Default)]
pub struct SummaryOutcome {
    pub files_changed: usize,
    pub previous_removed: usize,
    pub previous_minimized: usize,
    pub posted: bool,
    pub usage: TokenUsage,
}

/// 답글 실행 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// 답할 필요가 없는 코멘트(봇 코멘트, 짧은 반응)
    Ignored(&'static str),
    /// 대화 안에 AI 코멘트가 없다.
    NoParent,
    Replied { fallback: bool },
}

/// 게시할 요약 본문. 마커가 맨 앞에 붙는다.
pub fn mark_summary(text: &str) -> String {
    format!("{SUMMARY_MARKER}\n{}\n", text.trim())
}

/// 봇이 쓴, 아직 접히지 않은 요약 코멘트인지.
pub fn is_summary_comment(author: &str, body: &str, bot_login: &str) -> bool {
    author == bot_login && body.contains(SUMMARY_MARKER) && !body.contains(MINIMIZED_MARKER)
}

/// 삭제하지 못한 이전 요약을 `<details>`로 접은 본문.
pub fn minimize_summary(body: &str) -> String {
    format!(
        "{MINIMIZED_MARKER}\n<details>\n<summary>이전 분석 결과 (클릭하여 보기)</summary>\n\n{}\n</details>\n",
        body.replace(SUMMARY_MARKER, "").trim()
    )
}

/// 마크다운에서 `## {heading}` 섹션 본문을 다음 `##` 줄 전까지 꺼낸다.
/// 제목은 대소문자를 가리지 않는다.
pub fn extract_section(markdown: &str, heading: &str) -> Option<String> {
    let wanted = heading.trim().to_lowercase();
    let mut lines = markdown.lines();
    lines.find(|line| {
        line.trim_start()
            .strip_prefix("##")
            .is_some_and(|title| title.trim_start_matches('#').trim().to_lowercase().starts_with(&wanted))
    })?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.trim_start().starts_with("##"))
        .collect();
    let section = body.join("\n").trim().to_string();
    (!section.is_empty()).then_some(section)
}

/// AI(요약/라인 리뷰/답글)가 쓴 코멘트인지. 봇 로그인이 쓰고 AI 마커가 있어야 한다.
pub fn is_ai_generated(author: &str, body: &str, bot_login: &str) -> bool {
    author == bot_login && AI_COMMENT_MARKERS.iter().any(|m| body.contains(m))
}

/// 사람이 쓴 코멘트에 답할지 판단한다.
pub fn should_respond(body: &str) -> bool {
    let text = body.trim();
    let chars = text.chars().count();
    if chars <= MIN_RESPONDABLE_CHARS {
        return false;
    }
    if ACKNOWLEDGEMENT.is_match(text) {
        return false;
    }
    let lowered = text.to_lowercase();
    if QUESTION_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return true;
    }
    chars >= OPINION_CHARS
}

/// 답할 AI 코멘트를 고른다.
/// `reply_to`가 AI 코멘트면 그것, 아니면 `current_id` 이전의 마지막 AI 코멘트.
pub fn find_parent_ai_comment<'a, C: AuthoredComment>(
    comments: &'a [C],
    current_id: &str,
    reply_to: Option<&str>,
    bot_login: &str,
) -> Option<&'a C> {
    let is_ai = |c: &C| is_ai_generated(c.author(), c.body(), bot_login);

    if let Some(parent) = reply_to.and_then(|id| comments.iter().find(|c| c.id() == id))
        && is_ai(parent)
    {
        return Some(parent);
    }

    comments
        .iter()
        .take_while(|c| c.id() != current_id)
        .filter(|c| is_ai(c))
        .last()
}

/// 1부터 센 `line` 앞뒤 `radius`줄을 `{번호:3}: {내용}`으로 이어 붙인다.
/// 범위 밖 라인이면 None.
pub fn surrounding_lines(content: &str, line: u32, radius: usize) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let center = usize::try_from(line).ok()?;
    if center == 0 || center > lines.len() {
        return None;
    }
    let start = center.saturating_sub(radius);
    let end = center.saturating_add(radius).min(lines.len());

    Some(
        (start..end)
            .map(|idx| format!("{:3}: {}", idx + 1, lines[idx]))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// 본문의 첫 코드 블록 내용.
pub fn first_code_block(body: &str) -> Option<String> {
    CODE_BLOCK
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 게시할 답글 본문.
pub fn reply_body(text: &str) -> String {
    format!("{REPLY_HEADING}\n\n{}\n", text.trim())
}

/// 모델 호출이 실패했을 때 남기는 답글.
pub fn fallback_reply(author: &str, language: CommentLanguage) -> String {
    match language {
        CommentLanguage::Korean => {
            format!("@{author} 죄송합니다. 현재 응답을 생성할 수 없습니다. 나중에 다시 시도해주세요.")
        }
        CommentLanguage::English => {
            format!("@{author} Sorry, I can't generate a response right now. Please try again later.")
        }
    }
}
