mod support;

use std::sync::Arc;

use anyhow::Result;

use linepilot::application::usecases::reply_comment::ReplyToCommentUseCase;
use linepilot::domain::conversation::{REPLY_HEADING, ReplyOptions, ReplyOutcome, mark_summary};
use linepilot::domain::finding::Priority;
use linepilot::domain::review::{ChangedFile, FileStatus};
use linepilot::infrastructure::adapters::{MarkdownRendererAdapter, UrlTargetResolver};

use support::{
    BOT, FakeConversation, FakeProviderFactory, Harness, PR_URL, VcsState, issue_comment,
    review_comment,
};

const MAIN_KT: &str = "app/Main.kt";
const MAIN_PATCH: &str = "@@ -1,2 +1,3 @@\n fun a() {}\n+fun loadData() = repo.all()\n val x = 1";
const MAIN_CONTENT: &str = "fun a() {}\nfun loadData() = repo.all()\nval x = 1";
const AI_LINE_COMMENT: &str = "🟡 **[P2]** 🤖 **AI 분석**\n\n**성능**: 전체 목록을 한 번에 읽습니다\n\n```kotlin\nfun loadData() = repo.page(0)\n```\n";

fn pr_state() -> VcsState {
    VcsState {
        files: vec![ChangedFile {
            path: MAIN_KT.to_string(),
            status: FileStatus::Modified,
            additions: 1,
            deletions: 0,
            patch: Some(MAIN_PATCH.to_string()),
        }],
        contents: [(MAIN_KT.to_string(), MAIN_CONTENT.to_string())].into(),
        comments: vec![
            review_comment("100", BOT, MAIN_KT, Some(2), AI_LINE_COMMENT, None),
            review_comment("101", "octocat", MAIN_KT, Some(2), "왜 페이지 단위로 읽어야 하나요?", Some("100")),
            review_comment("102", "octocat", MAIN_KT, Some(2), "감사합니다!", Some("100")),
            review_comment("103", BOT, MAIN_KT, Some(2), "**💬 AI 응답**\n\n이전 답변", Some("100")),
        ],
        issue_comments: vec![
            issue_comment("200", "octocat", "리뷰 부탁드립니다"),
            issue_comment("201", BOT, &mark_summary("## 🤖 AI PR 분석 결과")),
            issue_comment("202", "hubot", "이 변경이 배포 일정에 영향이 있을까요?"),
        ],
        ..VcsState::default()
    }
}

fn reply_harness(state: VcsState, conversation: Arc<FakeConversation>) -> Harness {
    Harness::new(
        Some("token"),
        state,
        FakeProviderFactory {
            conversation: Some(conversation),
            ..FakeProviderFactory::default()
        },
    )
}

async fn run(harness: &Harness, comment_id: &str, dry_run: bool) -> Result<ReplyOutcome> {
    let use_case = ReplyToCommentUseCase {
        config_repo: &harness.config_repo,
        host_token_resolver: &harness.tokens,
        target_resolver: &UrlTargetResolver,
        vcs_factory: &harness.vcs_factory,
        provider_factory: &harness.provider_factory,
        renderer: &MarkdownRendererAdapter,
        reporter: &harness.reporter,
    };
    use_case
        .execute(ReplyOptions {
            url: PR_URL.to_string(),
            comment_id: comment_id.to_string(),
            dry_run,
        })
        .await
}

#[tokio::test]
async fn review_thread_question_gets_threaded_answer() {
    let conversation = FakeConversation::answering("@octocat 목록이 커지면 메모리를 많이 씁니다.");
    let harness = reply_harness(pr_state(), Arc::clone(&conversation));

    let outcome = run(&harness, "101", false).await.unwrap();

    assert_eq!(outcome, ReplyOutcome::Replied { fallback: false });
    let replies = harness.state().replies.lock().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "100");
    assert!(replies[0].1.starts_with(REPLY_HEADING));
    assert!(replies[0].1.contains("메모리를 많이 씁니다"));
    assert!(harness.state().created.lock().unwrap().is_empty());

    let requests = conversation.replies.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.author, "octocat");
    assert_eq!(request.path.as_deref(), Some(MAIN_KT));
    assert_eq!(request.line, Some(2));
    let parent = request.parent.as_ref().unwrap();
    assert_eq!(parent.priority, Priority::P2);
    assert_eq!(parent.category, "성능");
    assert_eq!(
        request.suggested_code.as_deref(),
        Some("fun loadData() = repo.page(0)")
    );
    assert_eq!(
        request.surrounding_code.as_deref(),
        Some("  1: fun a() {}\n  2: fun loadData() = repo.all()\n  3: val x = 1")
    );
    assert_eq!(request.diff_excerpt.as_deref(), Some(MAIN_PATCH));
}

#[tokio::test]
async fn conversation_comment_is_answered_in_the_conversation() {
    let conversation = FakeConversation::answering("@hubot 배포 일정에는 영향이 없습니다.");
    let harness = reply_harness(pr_state(), Arc::clone(&conversation));

    let outcome = run(&harness, "202", false).await.unwrap();

    assert_eq!(outcome, ReplyOutcome::Replied { fallback: false });
    let created = harness.state().created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert!(created[0].contains("영향이 없습니다"));
    assert!(harness.state().replies.lock().unwrap().is_empty());

    let request = &conversation.replies.lock().unwrap()[0];
    assert!(request.parent_body.contains("AI PR 분석 결과"));
    assert!(request.parent.is_none());
    assert!(request.path.is_none());
    assert!(request.surrounding_code.is_none());
}

#[tokio::test]
async fn acknowledgements_and_bot_comments_are_ignored() {
    let conversation = FakeConversation::answering("unused");
    let harness = reply_harness(pr_state(), Arc::clone(&conversation));

    assert_eq!(
        run(&harness, "102", false).await.unwrap(),
        ReplyOutcome::Ignored("acknowledgement")
    );
    assert_eq!(
        run(&harness, "103", false).await.unwrap(),
        ReplyOutcome::Ignored("bot comment")
    );
    assert!(conversation.replies.lock().unwrap().is_empty());
    assert!(harness.state().replies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn model_failure_posts_apology() {
    let harness = reply_harness(pr_state(), FakeConversation::failing());

    let outcome = run(&harness, "101", false).await.unwrap();

    assert_eq!(outcome, ReplyOutcome::Replied { fallback: true });
    let replies = harness.state().replies.lock().unwrap();
    assert!(replies[0].1.contains(
        "@octocat 죄송합니다. 현재 응답을 생성할 수 없습니다. 나중에 다시 시도해주세요."
    ));
}

#[tokio::test]
async fn conversation_without_ai_comment_has_no_parent() {
    let mut state = pr_state();
    state.issue_comments = vec![
        issue_comment("200", "octocat", "리뷰 부탁드립니다"),
        issue_comment("202", "hubot", "이 변경이 배포 일정에 영향이 있을까요?"),
    ];
    let conversation = FakeConversation::answering("unused");
    let harness = reply_harness(state, Arc::clone(&conversation));

    assert_eq!(run(&harness, "202", false).await.unwrap(), ReplyOutcome::NoParent);
    assert!(conversation.replies.lock().unwrap().is_empty());
    assert!(harness.state().created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_comment_is_an_error() {
    let harness = reply_harness(pr_state(), FakeConversation::answering("unused"));

    let err = run(&harness, "999", false).await.unwrap_err();

    assert!(err.to_string().contains("comment 999 not found"));
}

#[tokio::test]
async fn dry_run_prints_reply() {
    let harness = reply_harness(pr_state(), FakeConversation::answering("@octocat 답변"));

    run(&harness, "101", true).await.unwrap();

    assert!(harness.state().replies.lock().unwrap().is_empty());
    let printed = harness.reporter.raw.lock().unwrap();
    assert_eq!(printed.len(), 1);
    assert!(printed[0].starts_with(REPLY_HEADING));
}
