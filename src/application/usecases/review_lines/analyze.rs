//! 파일별 분석(정적 검사 + provider) 단계.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::application::ports::FindingProvider;
use crate::application::usecases::review_lines::{ReviewLinesUseCase, context::ExecutionContext};
use crate::domain::diff::{LineMapping, build_line_mapping, changed_lines_only};
use crate::domain::finding::Finding;
use crate::domain::lint::{Language, LintSettings, lint_file};
use crate::domain::lint_config::parse_linter_config;
use crate::domain::policy::{collapse_repeats, retain_addressable};
use crate::domain::review::{
    AnalysisRequest, ChangedFile, FileFindings, FileStatus, TokenUsage, truncate_utf8,
};

/// 전체 파일 분석 결과 묶음.
pub(super) struct AnalysisOutcome {
    pub findings: FileFindings,
    pub mappings: HashMap<String, LineMapping>,
    pub files_reviewed: usize,
    pub usage: TokenUsage,
}

/// 설정에서 활성 provider를 구성한다. 없으면 정적 검사만 수행한다.
pub(super) fn build_enabled_providers(
    use_case: &ReviewLinesUseCase<'_>,
    ctx: &ExecutionContext,
) -> Vec<Box<dyn FindingProvider>> {
    let providers = use_case.provider_factory.build(&ctx.config);

    use_case.reporter.section("Providers");
    if providers.is_empty() {
        use_case
            .reporter
            .status("Providers", "none runnable; static lint only");
    } else {
        for provider in &providers {
            use_case.reporter.kv("Enabled", provider.name());
        }
    }
    providers
}

/// 변경 파일을 API 순서대로 하나씩 분석한다.
pub(super) async fn analyze_changed_files(
    use_case: &ReviewLinesUseCase<'_>,
    ctx: &ExecutionContext,
    providers: &[Box<dyn FindingProvider>],
) -> AnalysisOutcome {
    let lint_settings = resolve_lint_settings(use_case, ctx).await;

    use_case.reporter.section("Analyze Files");

    let mut outcome = AnalysisOutcome {
        findings: FileFindings::new(),
        mappings: HashMap::new(),
        files_reviewed: 0,
        usage: TokenUsage::default(),
    };

    for file in &ctx.changed_files {
        let Some(patch) = reviewable_patch(file) else {
            use_case.reporter.status("Skip", &file.path);
            continue;
        };

        let changed = changed_lines_only(patch);
        if changed.is_empty() {
            use_case.reporter.status("Skip", &file.path);
            continue;
        }
        let mapping = build_line_mapping(patch);
        outcome.files_reviewed += 1;
        use_case.reporter.status("Analyze", &file.path);

        let content = match ctx.vcs.fetch_file_content(&file.path, &ctx.head_sha).await {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(path = %file.path, error = %err, "file content unavailable");
                None
            }
        };

        let mut findings = Vec::new();
        if let Some(content) = content.as_deref()
            && let Some(settings) = Language::detect(&file.path).and_then(|l| lint_settings.get(&l))
        {
            findings.extend(lint_file(&file.path, content, settings));
        }

        let request = AnalysisRequest {
            path: file.path.clone(),
            language: Language::detect(&file.path).map(Language::name),
            patch: truncate_utf8(patch, ctx.config.max_patch_bytes()),
            content: content
                .as_deref()
                .map(|c| truncate_utf8(c, ctx.config.max_content_bytes())),
            changed_lines: changed.clone(),
            system_prompt: ctx.config.system_prompt(),
            comment_language: ctx.config.comment_language(),
        };
        for provider in providers {
            let model_findings =
                run_provider(use_case, provider.as_ref(), &request, &mut outcome.usage).await;
            findings.extend(model_findings);
        }

        let kept = retain_addressable(
            collapse_repeats(findings),
            &mapping,
            &changed,
            ctx.config.changed_lines_only(),
        );
        debug!(path = %file.path, kept = kept.len(), "file analyzed");

        if !kept.is_empty() {
            outcome.findings.insert(file.path.clone(), kept);
        }
        outcome.mappings.insert(file.path.clone(), mapping);
    }

    outcome
}

/// PR에 나온 언어별로 정적 검사 설정을 정한다. 정적 검사가 꺼져 있으면 빈 맵이다.
/// 저장소 린터 설정 파일은 HEAD 기준으로 언어당 한 번, 첫 번째로 읽히는 파일만 쓴다.
async fn resolve_lint_settings(
    use_case: &ReviewLinesUseCase<'_>,
    ctx: &ExecutionContext,
) -> HashMap<Language, LintSettings> {
    let mut settings = HashMap::new();
    if !ctx.config.lint_enabled() {
        return settings;
    }

    let explicit = ctx.config.lint_overrides();
    let languages = ctx
        .changed_files
        .iter()
        .filter(|f| reviewable_patch(f).is_some())
        .filter_map(|f| Language::detect(&f.path));

    for language in languages {
        if settings.contains_key(&language) {
            continue;
        }
        let mut repo = None;
        if ctx.config.lint_repo_config() {
            for name in language.config_files() {
                let Ok(content) = ctx.vcs.fetch_file_content(name, &ctx.head_sha).await else {
                    continue;
                };
                if let Some(parsed) = parse_linter_config(language, name, &content) {
                    use_case.reporter.kv("Lint Config", name);
                    repo = Some(parsed);
                    break;
                }
                debug!(file = %name, "linter config has no usable settings");
            }
        }
        let resolved = LintSettings::resolve(&explicit, repo.as_ref());
        debug!(
            language = language.name(),
            indent = resolved.indent_size,
            max_line = resolved.max_line_length,
            disabled = resolved.disabled_rules.len(),
            "lint settings resolved"
        );
        settings.insert(language, resolved);
    }
    settings
}

/// 삭제된 파일과 patch가 없는 파일(바이너리 등)은 건너뛴다.
fn reviewable_patch(file: &ChangedFile) -> Option<&str> {
    if file.status == FileStatus::Removed {
        return None;
    }
    file.patch.as_deref().filter(|p| !p.trim().is_empty())
}

/// provider 실패는 해당 파일의 모델 finding 없음으로 처리한다.
async fn run_provider(
    use_case: &ReviewLinesUseCase<'_>,
    provider: &dyn FindingProvider,
    request: &AnalysisRequest,
    usage: &mut TokenUsage,
) -> Vec<Finding> {
    let started = Instant::now();
    use_case
        .reporter
        .provider_status(provider.name(), "running", Some(&request.path));

    match provider.analyze(request).await {
        Ok(resp) => {
            usage.add_from(&resp.usage);
            use_case.reporter.provider_status(
                provider.name(),
                "done",
                Some(&format!("{:.1}s", started.elapsed().as_secs_f32())),
            );
            resp.findings
        }
        Err(err) => {
            warn!(provider = provider.id(), path = %request.path, error = %err, "provider failed");
            use_case.reporter.provider_status(
                provider.name(),
                "error",
                Some(&format!("{:.1}s", started.elapsed().as_secs_f32())),
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_and_binary_files_are_not_reviewable() {
        let removed = ChangedFile {
            path: "a.kt".to_string(),
            status: FileStatus::Removed,
            additions: 0,
            deletions: 1,
            patch: Some("@@ -1 +0,0 @@\n-a".to_string()),
        };
        let binary = ChangedFile {
            path: "logo.png".to_string(),
            status: FileStatus::Added,
            additions: 0,
            deletions: 0,
            patch: None,
        };
        assert!(reviewable_patch(&removed).is_none());
        assert!(reviewable_patch(&binary).is_none());
    }
}
