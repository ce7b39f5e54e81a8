// ABOUTME: External user-directory collaborator for verifying account existence
// ABOUTME: Production implementation talks to a GitLab-style users endpoint over HTTP

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Narrow contract against the external identity system: a username either
/// resolves to at least one account or it does not.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, username: &str) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct DirectoryUser {
    #[allow(dead_code)]
    id: i64,
    #[allow(dead_code)]
    username: String,
}

/// Directory client backed by the GitLab users API
/// (`GET {base}/users?username={u}` with a `PRIVATE-TOKEN` header).
pub struct GitLabDirectory {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitLabDirectory {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Reads DIRECTORY_URL and DIRECTORY_TOKEN. The token is deliberately
    /// configuration-only and never appears in source.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DIRECTORY_URL").context("DIRECTORY_URL must be set")?;
        let token =
            std::env::var("DIRECTORY_TOKEN").context("DIRECTORY_TOKEN must be set")?;
        Ok(Self::new(base_url, token))
    }
}

#[async_trait]
impl UserDirectory for GitLabDirectory {
    async fn user_exists(&self, username: &str) -> Result<bool> {
        let url = format!("{}/users", self.base_url);
        let users: Vec<DirectoryUser> = self
            .http
            .get(&url)
            .query(&[("username", username)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .context("directory request failed")?
            .error_for_status()
            .context("directory returned an error status")?
            .json()
            .await
            .context("directory returned an unexpected body")?;

        Ok(!users.is_empty())
    }
}
