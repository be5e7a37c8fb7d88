//! 입력 URL 또는 CI 환경값을 GitHub PR 대상으로 해석하는 모듈.

use anyhow::{Context, Result, bail};
use url::Url;

pub const DEFAULT_GITHUB_HOST: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTarget {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub url: String,
}

impl ReviewTarget {
    /// `https://<host>/<owner>/<repo>/pull/<number>` 형식을 해석한다.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL host is missing"))?
            .to_string();

        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(ToString::to_string).collect())
            .unwrap_or_default();

        // /owner/repo/pull/<number>[/files ...]
        if segments.len() < 4 || segments[2] != "pull" {
            bail!("unsupported URL format: {input}");
        }
        let number = segments[3]
            .parse()
            .with_context(|| format!("invalid pull request number in {input}"))?;

        Ok(Self {
            host,
            owner: segments[0].clone(),
            repo: segments[1].clone(),
            number,
            url: input.to_string(),
        })
    }

    /// CI에서 넘겨주는 `owner/repo`와 PR 번호로 github.com 대상을 만든다.
    pub fn from_repo_name(repo_name: &str, number: u64) -> Result<Self> {
        let Some((owner, repo)) = repo_name.trim().split_once('/') else {
            bail!("repository name must look like owner/repo: {repo_name}");
        };
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            bail!("repository name must look like owner/repo: {repo_name}");
        }

        Ok(Self {
            host: DEFAULT_GITHUB_HOST.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            url: format!("https://{DEFAULT_GITHUB_HOST}/{owner}/{repo}/pull/{number}"),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
