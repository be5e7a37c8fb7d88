//! Provider 공통 프롬프트 구성.

use crate::domain::conversation::{ReplyRequest, SummaryRequest};
use crate::domain::review::{AnalysisRequest, truncate_utf8};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a code reviewer specialised in Android and iOS development. \
Read the whole pull request, focus on changes that are likely to contain mistakes, and give accurate, practical analysis.";

pub const REPLY_SYSTEM_PROMPT: &str = "You are a friendly, professional code review assistant. \
Give specific, helpful answers to the developer's question.";

/// 답글 프롬프트에 넣는 이전 AI 코멘트/diff 최대 바이트.
const REPLY_PARENT_BYTES: usize = 1000;
const REPLY_DIFF_BYTES: usize = 500;

/// 파일 단위 분석용 사용자 프롬프트를 생성한다.
pub fn build_user_prompt(request: &AnalysisRequest) -> String {
    let language = request.language.unwrap_or("text");
    let changed: Vec<String> = request.changed_lines.iter().map(u32::to_string).collect();

    let mut out = format!(
        "File: {}\nLanguage: {}\nAdded lines: {}\n{}\n",
        request.path,
        language,
        changed.join(", "),
        request.comment_language.prompt_instruction()
    );

    if let Some(content) = &request.content {
        out.push_str(&format!("\nFile content (excerpt):\n```{language}\n{content}\n```\n"));
    }
    out.push_str(&format!("\nChanges:\n```diff\n{}\n```\n", request.patch));
    out
}

/// PR 전체 요약 요청 프롬프트. 파일별 patch는 호출 전에 잘려 있다.
pub fn build_summary_prompt(request: &SummaryRequest) -> String {
    let mut out = format!(
        "Analyse this pull request and write a review guide.\n\n\
**Pull request**\n- Title: {}\n- Description: {}\n\n**Team conventions**\n{}\n\n**Changed files**\n",
        request.title,
        if request.description.trim().is_empty() {
            "(none)"
        } else {
            request.description.trim()
        },
        request.conventions,
    );

    for file in &request.files {
        out.push_str(&format!(
            "\n### {} ({})\n+{} / -{} lines\n",
            file.path,
            file.status.as_str(),
            file.additions,
            file.deletions
        ));
        if let Some(patch) = &file.patch {
            out.push_str(&format!("```diff\n{patch}\n```\n"));
        }
    }

    out.push_str(
        "\n**Format**\n\
## 🤖 AI PR 분석 결과\n\
### 📋 작업 개요\n(purpose and intent of the change)\n\
### 🔧 주요 변경사항\n(main changes per file or feature)\n\
### ⚠️ 리뷰 집중 포인트\n\
(risky spots, one per line as `- <tag> file:line - explanation`, tags: \
🔴 **[로직오류위험]**, 🟡 **[사이드이펙트]**, 🔵 **[성능저하]**, 🟠 **[보안취약]**, 🟣 **[호환성이슈]**, ⚫ **[데이터정합성]**)\n\
### 💡 추가 권장사항\n(general quality suggestions, if any)\n\n\
Include only changes that matter or carry risk.\n",
    );
    out.push_str(request.comment_language.prompt_instruction());
    out.push('\n');
    out
}

/// 사람이 AI 코멘트에 남긴 질문/의견에 대한 답글 프롬프트.
pub fn build_reply_prompt(request: &ReplyRequest) -> String {
    let mut out = format!(
        "A developer left a question or opinion on your earlier review comment.\n\n\
**Earlier AI comment**\n{}\n\n**Developer (@{})**\n{}\n",
        truncate_utf8(&request.parent_body, REPLY_PARENT_BYTES),
        request.author,
        request.question.trim(),
    );

    if let Some(parent) = &request.parent {
        out.push_str(&format!(
            "\n**Issue**\n- Priority: {}\n- Category: {}\n- Message: {}\n",
            parent.priority.as_str(),
            parent.category,
            parent.message
        ));
    }
    if let Some(code) = &request.suggested_code {
        out.push_str(&format!("\nSuggested code:\n```\n{code}\n```\n"));
    }

    out.push_str(&format!(
        "\n**Code context**\nFile: {}\nLine: {}\n",
        request.path.as_deref().unwrap_or("N/A"),
        request
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    ));
    if let Some(code) = &request.surrounding_code {
        out.push_str(&format!("```\n{code}\n```\n"));
    }
    if let Some(diff) = &request.diff_excerpt {
        out.push_str(&format!(
            "Diff:\n```diff\n{}\n```\n",
            truncate_utf8(diff, REPLY_DIFF_BYTES)
        ));
    }

    out.push_str(&format!(
        "\n**Guidelines**\n\
- Answer the question concretely, grounded in the code context.\n\
- Offer an alternative solution when it helps.\n\
- Keep a friendly, professional tone and stay concise.\n\
- Start with @{}.\n{}\n",
        request.author,
        request.comment_language.prompt_instruction()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::finding::{PostedComment, Priority};
    use crate::domain::review::{ChangedFile, CommentLanguage, FileStatus};

    #[test]
    fn prompt_includes_patch_and_added_lines() {
        let request = AnalysisRequest {
            path: "Main.kt".to_string(),
            language: Some("kotlin"),
            patch: "@@ -1 +1,2 @@\n a\n+b".to_string(),
            content: None,
            changed_lines: vec![2],
            system_prompt: String::new(),
            comment_language: CommentLanguage::English,
        };
        let prompt = build_user_prompt(&request);
        assert!(prompt.contains("Added lines: 2"));
        assert!(prompt.contains("```diff\n@@ -1 +1,2 @@\n a\n+b\n```"));
        assert!(!prompt.contains("File content"));
        assert!(prompt.contains("in English"));
    }

    #[test]
    fn summary_prompt_lists_files_with_counts() {
        let request = SummaryRequest {
            title: "Add login".to_string(),
            description: String::new(),
            conventions: "- camelCase".to_string(),
            files: vec![ChangedFile {
                path: "Login.kt".to_string(),
                status: FileStatus::Added,
                additions: 12,
                deletions: 0,
                patch: Some("@@ -0,0 +1 @@\n+fun login() {}".to_string()),
            }],
            comment_language: CommentLanguage::Korean,
            max_tokens: 2500,
            temperature: 0.3,
        };
        let prompt = build_summary_prompt(&request);
        assert!(prompt.contains("- Description: (none)"));
        assert!(prompt.contains("### Login.kt (added)\n+12 / -0 lines"));
        assert!(prompt.contains("```diff\n@@ -0,0 +1 @@\n+fun login() {}\n```"));
        assert!(prompt.contains("- camelCase"));
        assert!(prompt.contains("in Korean"));
    }

    #[test]
    fn reply_prompt_carries_parent_issue_and_code() {
        let request = ReplyRequest {
            author: "octocat".to_string(),
            question: "왜 이렇게 해야 하나요?".to_string(),
            parent_body: "🟡 **[P2]** 🤖 **AI 분석**".to_string(),
            parent: Some(PostedComment {
                priority: Priority::P2,
                category: "메모리".to_string(),
                message: "누수 가능성".to_string(),
            }),
            suggested_code: None,
            path: Some("Main.kt".to_string()),
            line: Some(4),
            surrounding_code: Some("  4: val x = 1".to_string()),
            diff_excerpt: Some("d".repeat(2000)),
            comment_language: CommentLanguage::Korean,
            max_tokens: 1000,
            temperature: 0.3,
        };
        let prompt = build_reply_prompt(&request);
        assert!(prompt.contains("**Developer (@octocat)**\n왜 이렇게 해야 하나요?"));
        assert!(prompt.contains("- Category: 메모리"));
        assert!(prompt.contains("File: Main.kt\nLine: 4"));
        assert!(prompt.contains("  4: val x = 1"));
        assert!(prompt.contains(&format!("```diff\n{}\n```", "d".repeat(500))));
        assert!(!prompt.contains(&"d".repeat(501)));
    }
}
