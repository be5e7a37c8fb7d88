//! CLI 명령 파싱 모듈.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::domain::conversation::ReplyOptions;
use crate::domain::review::RunOptions;
use crate::domain::target::ReviewTarget;

/// CI에서 대상 저장소(`owner/repo`)를 넘겨주는 환경변수.
pub const REPO_NAME_ENV: &str = "REPO_NAME";
/// CI에서 PR 번호를 넘겨주는 환경변수.
pub const PR_NUMBER_ENV: &str = "PR_NUMBER";
/// 답글 대상 코멘트 id를 넘겨주는 환경변수.
pub const COMMENT_ID_ENV: &str = "COMMENT_ID";

#[derive(Debug, Parser)]
#[command(name = "linepilot")]
#[command(about = "Line-level review comments for GitHub pull requests")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Review a pull request and post inline comments
    Review {
        /// PR URL (defaults to REPO_NAME + PR_NUMBER from the environment)
        url: Option<String>,

        /// Print the review to stdout, do not post
        #[arg(long)]
        dry_run: bool,
    },
    /// Post a PR summary comment, replacing the previous one
    Summarize {
        /// PR URL (defaults to REPO_NAME + PR_NUMBER from the environment)
        url: Option<String>,

        /// Print the summary to stdout, do not post
        #[arg(long)]
        dry_run: bool,
    },
    /// Answer a question left on an AI review comment
    Reply {
        /// PR URL (defaults to REPO_NAME + PR_NUMBER from the environment)
        url: Option<String>,

        /// Comment to answer (defaults to COMMENT_ID from the environment)
        #[arg(long)]
        comment_id: Option<u64>,

        /// Print the reply to stdout, do not post
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the line -> diff position mapping of a patch as JSON
    Map {
        /// Patch file path, or "-" for stdin
        patch: String,

        /// Print only the added line numbers
        #[arg(long)]
        changed_only: bool,
    },
    /// Show effective merged config
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSource {
    Stdin,
    File(PathBuf),
}

impl PatchSource {
    pub async fn read(&self) -> anyhow::Result<String> {
        match self {
            Self::Stdin => {
                let mut buf = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut buf)
                    .await
                    .context("failed to read patch from stdin")?;
                Ok(buf)
            }
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read patch at {}", path.display())),
        }
    }
}

pub enum CliAction {
    InspectConfig,
    MapPatch {
        source: PatchSource,
        changed_only: bool,
    },
    Review(RunOptions),
    Summarize(RunOptions),
    Reply(ReplyOptions),
}

impl Cli {
    pub fn parse_action() -> Result<CliAction, String> {
        let cli = Cli::parse();

        match cli.command {
            Commands::Config => Ok(CliAction::InspectConfig),
            Commands::Map {
                patch,
                changed_only,
            } => {
                let source = if patch == "-" {
                    PatchSource::Stdin
                } else {
                    PatchSource::File(PathBuf::from(patch))
                };
                Ok(CliAction::MapPatch {
                    source,
                    changed_only,
                })
            }
            Commands::Review { url, dry_run } => {
                let url = url_from_env(url)?;
                Ok(CliAction::Review(RunOptions { url, dry_run }))
            }
            Commands::Summarize { url, dry_run } => {
                let url = url_from_env(url)?;
                Ok(CliAction::Summarize(RunOptions { url, dry_run }))
            }
            Commands::Reply {
                url,
                comment_id,
                dry_run,
            } => {
                let url = url_from_env(url)?;
                let comment_id = resolve_comment_id(comment_id, env::var(COMMENT_ID_ENV).ok())?;
                Ok(CliAction::Reply(ReplyOptions {
                    url,
                    comment_id,
                    dry_run,
                }))
            }
        }
    }
}

fn url_from_env(url: Option<String>) -> Result<String, String> {
    resolve_review_url(
        url,
        env::var(REPO_NAME_ENV).ok(),
        env::var(PR_NUMBER_ENV).ok(),
    )
}

/// `--comment-id`가 없으면 `COMMENT_ID` 환경값을 쓴다.
pub fn resolve_comment_id(arg: Option<u64>, env_value: Option<String>) -> Result<String, String> {
    if let Some(id) = arg {
        return Ok(id.to_string());
    }
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return Err(format!(
            "missing comment id. Pass --comment-id or set {COMMENT_ID_ENV}"
        ));
    };
    raw.trim()
        .parse::<u64>()
        .map(|id| id.to_string())
        .map_err(|_| format!("{COMMENT_ID_ENV} must be a number: {raw}"))
}

/// URL 인자가 없으면 CI 환경값(`REPO_NAME`, `PR_NUMBER`)으로 PR URL을 만든다.
pub fn resolve_review_url(
    url: Option<String>,
    repo_name: Option<String>,
    pr_number: Option<String>,
) -> Result<String, String> {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        return Ok(url);
    }

    let (Some(repo_name), Some(pr_number)) = (repo_name, pr_number) else {
        return Err(format!(
            "missing PR URL. Pass it as an argument or set {REPO_NAME_ENV} and {PR_NUMBER_ENV}"
        ));
    };

    let number: u64 = pr_number
        .trim()
        .parse()
        .map_err(|_| format!("{PR_NUMBER_ENV} must be a number: {pr_number}"))?;
    ReviewTarget::from_repo_name(&repo_name, number)
        .map(|target| target.url().to_string())
        .map_err(|err| err.to_string())
}
