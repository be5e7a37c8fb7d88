//! GitHub API 연동 구현.

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::VcsProvider;
use crate::domain::review::{
    ChangedFile, ExistingReviewComment, FileStatus, IssueComment, PullRequestInfo, ReviewDraft,
};

const PER_PAGE: usize = 100;
/// 목록 API는 최대 3000개까지만 돌려준다.
const MAX_PAGES: usize = 30;

/// contents 경로 세그먼트 인코딩에서 그대로 둘 문자.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct GitHubClient {
    client: Client,
    host: String,
    owner: String,
    repo: String,
    number: u64,
    token: Option<String>,
    api_base: Option<String>,
}

impl GitHubClient {
    /// GitHub 대상 클라이언트를 생성한다.
    pub fn new(
        host: String,
        owner: String,
        repo: String,
        number: u64,
        token: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            host,
            owner,
            repo,
            number,
            token,
            api_base,
        }
    }

    fn api_base(&self) -> String {
        // github.com은 공개 API, 그 외는 Enterprise 기본 경로를 사용한다.
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        if self.host == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    fn repo_endpoint(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base(), self.owner, self.repo)
    }

    fn pulls_endpoint(&self) -> String {
        format!("{}/pulls/{}", self.repo_endpoint(), self.number)
    }

    fn issue_comments_endpoint(&self) -> String {
        format!("{}/issues/{}/comments", self.repo_endpoint(), self.number)
    }

    /// 개별 일반 코멘트(수정/삭제). PR 번호가 경로에 들어가지 않는다.
    fn issue_comment_endpoint(&self, id: &str) -> String {
        format!(
            "{}/issues/comments/{}",
            self.repo_endpoint(),
            utf8_percent_encode(id, PATH_SEGMENT)
        )
    }

    fn contents_endpoint(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect();
        format!("{}/contents/{}", self.repo_endpoint(), encoded.join("/"))
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.request_accepting(method, url, "application/vnd.github+json")
    }

    fn request_accepting(&self, method: Method, url: String, accept: &str) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        let req = self
            .client
            .request(method, url)
            .header("User-Agent", "linepilot")
            .header("Accept", accept);

        if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    /// 성공 응답 본문을 문자열로 읽는다. 실패 상태는 본문과 함께 에러로 올린다.
    async fn send_text(&self, req: RequestBuilder, what: &str) -> Result<String> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("github: failed to {what}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("github: failed to read {what} body"))?;

        if !status.is_success() {
            anyhow::bail!("github: failed to {what} ({status}): {body}");
        }
        Ok(body)
    }

    /// `per_page`/`page` 페이지네이션 목록을 끝까지 모은다.
    async fn get_paginated<T>(&self, endpoint: &str, what: &str) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        let mut out = Vec::new();
        for page in 1..=MAX_PAGES {
            let req = self
                .request(Method::GET, endpoint.to_string())
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let body = self.send_text(req, what).await?;
            let items: Vec<T> = serde_json::from_str(&body)
                .with_context(|| format!("github: invalid {what} JSON"))?;

            let last = items.len() < PER_PAGE;
            out.extend(items);
            if last {
                break;
            }
        }
        debug!(what, count = out.len(), "github list fetched");
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    title: String,
    /// 설명이 비어 있으면 null이다.
    #[serde(default)]
    body: Option<String>,
    head: PullHead,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullFileResponse {
    filename: String,
    status: String,
    #[serde(default)]
    additions: u32,
    #[serde(default)]
    deletions: u32,
    #[serde(default)]
    patch: Option<String>,
}

/// 탈퇴한 사용자의 코멘트는 user가 null이다.
#[derive(Debug, Default, Deserialize)]
struct UserResponse {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Deserialize)]
struct ReviewCommentResponse {
    id: u64,
    #[serde(default)]
    user: Option<UserResponse>,
    path: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    in_reply_to_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct IssueCommentResponse {
    id: u64,
    #[serde(default)]
    user: Option<UserResponse>,
    #[serde(default)]
    body: String,
}

fn login(user: Option<UserResponse>) -> String {
    user.unwrap_or_default().login
}

#[async_trait]
impl VcsProvider for GitHubClient {
    async fn fetch_pull_request(&self) -> Result<PullRequestInfo> {
        let req = self.request(Method::GET, self.pulls_endpoint());
        let body = self.send_text(req, "fetch PR metadata").await?;

        let pr: PullResponse = serde_json::from_str(&body).context("github: invalid PR JSON")?;
        Ok(PullRequestInfo {
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            head_sha: pr.head.sha,
        })
    }

    async fn list_changed_files(&self) -> Result<Vec<ChangedFile>> {
        let endpoint = format!("{}/files", self.pulls_endpoint());
        let files: Vec<PullFileResponse> = self.get_paginated(&endpoint, "list PR files").await?;

        Ok(files
            .into_iter()
            .map(|f| ChangedFile {
                path: f.filename,
                status: FileStatus::from_api(&f.status),
                additions: f.additions,
                deletions: f.deletions,
                patch: f.patch,
            })
            .collect())
    }

    async fn fetch_file_content(&self, path: &str, reference: &str) -> Result<String> {
        // raw Accept 헤더로 base64 JSON 대신 원문을 받는다.
        let req = self
            .request_accepting(
                Method::GET,
                self.contents_endpoint(path),
                "application/vnd.github.raw",
            )
            .query(&[("ref", reference)]);
        self.send_text(req, "fetch file content").await
    }

    async fn list_review_comments(&self) -> Result<Vec<ExistingReviewComment>> {
        let endpoint = format!("{}/comments", self.pulls_endpoint());
        let comments: Vec<ReviewCommentResponse> = self
            .get_paginated(&endpoint, "list review comments")
            .await?;

        Ok(comments
            .into_iter()
            .map(|c| ExistingReviewComment {
                id: c.id.to_string(),
                author: login(c.user),
                path: c.path,
                line: c.line,
                body: c.body,
                in_reply_to: c.in_reply_to_id.map(|id| id.to_string()),
            })
            .collect())
    }

    async fn create_review(&self, draft: &ReviewDraft) -> Result<()> {
        let comments: Vec<serde_json::Value> = draft
            .comments
            .iter()
            .map(|c| {
                json!({
                    "path": c.path,
                    "position": c.position,
                    "body": c.body,
                })
            })
            .collect();

        let req = self
            .request(Method::POST, format!("{}/reviews", self.pulls_endpoint()))
            .json(&json!({
                "commit_id": draft.commit_id,
                "body": draft.body,
                "event": "COMMENT",
                "comments": comments,
            }));
        self.send_text(req, "create review").await?;
        Ok(())
    }

    async fn list_issue_comments(&self) -> Result<Vec<IssueComment>> {
        let comments: Vec<IssueCommentResponse> = self
            .get_paginated(&self.issue_comments_endpoint(), "list issue comments")
            .await?;

        Ok(comments
            .into_iter()
            .map(|c| IssueComment {
                id: c.id.to_string(),
                author: login(c.user),
                body: c.body,
            })
            .collect())
    }

    async fn create_issue_comment(&self, body: &str) -> Result<()> {
        let req = self
            .request(Method::POST, self.issue_comments_endpoint())
            .json(&json!({ "body": body }));
        self.send_text(req, "create issue comment").await?;
        Ok(())
    }

    async fn update_issue_comment(&self, id: &str, body: &str) -> Result<()> {
        let req = self
            .request(Method::PATCH, self.issue_comment_endpoint(id))
            .json(&json!({ "body": body }));
        self.send_text(req, "update issue comment").await?;
        Ok(())
    }

    async fn delete_issue_comment(&self, id: &str) -> Result<()> {
        let req = self.request(Method::DELETE, self.issue_comment_endpoint(id));
        self.send_text(req, "delete issue comment").await?;
        Ok(())
    }

    async fn reply_to_review_comment(&self, id: &str, body: &str) -> Result<()> {
        let endpoint = format!(
            "{}/comments/{}/replies",
            self.pulls_endpoint(),
            utf8_percent_encode(id, PATH_SEGMENT)
        );
        let req = self
            .request(Method::POST, endpoint)
            .json(&json!({ "body": body }));
        self.send_text(req, "reply to review comment").await?;
        Ok(())
    }
}
