use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::GithubSettings;
use crate::error::{BotError, Result};

const API_ROOT: &str = "https://api.github.com";
const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct WorkflowFile {
    pub content: String,
    pub sha: String,
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn fetch(&self) -> Result<WorkflowFile>;
    async fn update(&self, content: &str, sha: &str, message: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

pub struct GitHubClient {
    settings: GithubSettings,
    client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(settings: GithubSettings) -> Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .user_agent("duelbot")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { settings, client })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            API_ROOT, self.settings.owner, self.settings.repo, self.settings.workflow_path
        )
    }
}

#[async_trait]
impl WorkflowStore for GitHubClient {
    async fn fetch(&self) -> Result<WorkflowFile> {
        let response = self
            .client
            .get(self.contents_url())
            .bearer_auth(&self.settings.token)
            .header(header::ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                service: "github",
                status: status.as_u16(),
                body,
            });
        }
        let contents: ContentsResponse = response.json().await?;
        let content = decode_content(&contents.content)?;
        debug!(path = %self.settings.workflow_path, sha = %contents.sha, "workflow fetched");
        Ok(WorkflowFile {
            content,
            sha: contents.sha,
        })
    }

    async fn update(&self, content: &str, sha: &str, message: &str) -> Result<()> {
        let body = json!({
            "message": message,
            "content": STANDARD.encode(content),
            "sha": sha,
        });
        let response = self
            .client
            .put(self.contents_url())
            .bearer_auth(&self.settings.token)
            .header(header::ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(BotError::WorkflowConflict {
                path: self.settings.workflow_path.clone(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                service: "github",
                status: status.as_u16(),
                body,
            });
        }
        debug!(path = %self.settings.workflow_path, "workflow contents updated");
        Ok(())
    }
}

// The contents API wraps base64 payloads in newlines.
fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| BotError::WorkflowContent(format!("base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| BotError::WorkflowContent(format!("utf-8: {e}")))
}
