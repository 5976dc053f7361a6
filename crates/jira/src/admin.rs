//! Atlassian organization admin API client.
//!
//! Jira itself cannot deactivate managed accounts; that goes through the
//! admin API at `api.atlassian.com` with an organization API key.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, info, instrument};

use crate::client::DEFAULT_TIMEOUT_SECS;
use crate::error::JiraError;
use crate::models::DisableUserRequest;
use crate::USER_AGENT;

/// Base URL for the Atlassian admin API.
pub const ADMIN_API_URL: &str = "https://api.atlassian.com";

/// Admin API client authenticated with a bearer token.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a client against the public admin API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self, JiraError> {
        Self::with_base_url(ADMIN_API_URL, token)
    }

    /// Create a client against a custom base URL.
    ///
    /// # Errors
    /// Returns error if the URL is empty or the HTTP client cannot be created.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, JiraError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(JiraError::Config("admin API URL is empty".to_string()));
        }
        Url::parse(base_url)
            .map_err(|e| JiraError::Config(format!("invalid admin API URL {base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            token: token.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/users/{account_id}/manage/lifecycle/disable`, with the account ID
    /// encoded as a single path segment.
    fn disable_url(&self, account_id: &str) -> Result<Url, JiraError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| JiraError::Config(format!("invalid admin API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| JiraError::Config(format!("admin API URL {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(["users", account_id, "manage", "lifecycle", "disable"]);
        Ok(url)
    }

    /// Disable a managed account. The message is recorded in the audit log.
    #[instrument(skip(self, message))]
    pub async fn disable_user(&self, account_id: &str, message: &str) -> Result<(), JiraError> {
        let url = self.disable_url(account_id)?;
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&DisableUserRequest { message })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(account_id = %account_id, "Account disabled");
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(JiraError::Api {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}
