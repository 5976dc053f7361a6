//! Jira Cloud REST v3 client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::JiraError;
use crate::models::{
    Group, GroupCreate, GroupMembershipRequest, GroupPage, User, UserCreate,
};
use crate::USER_AGENT;

/// Default timeout for API requests.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Suffix appended to bare site names.
const ATLASSIAN_CLOUD_SUFFIX: &str = ".atlassian.net";

/// Jira Cloud client authenticated with an account email and API token.
#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    /// Site root, e.g. `https://your-domain.atlassian.net`.
    base_url: String,
    email: String,
    token: String,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Turn a configured domain into a site URL.
///
/// Accepts a full URL, a host name, or just the site name:
/// `acme`, `acme.atlassian.net` and `https://acme.atlassian.net/` all
/// resolve to `https://acme.atlassian.net`.
pub fn normalize_site(domain: &str) -> Result<String, JiraError> {
    let domain = domain.trim().trim_end_matches('/');
    if domain.is_empty() {
        return Err(JiraError::Config("Jira domain is empty".to_string()));
    }

    if domain.contains("://") {
        Ok(domain.to_string())
    } else if domain.contains('.') || domain.contains(':') {
        Ok(format!("https://{domain}"))
    } else {
        Ok(format!("https://{domain}{ATLASSIAN_CLOUD_SUFFIX}"))
    }
}

impl JiraClient {
    /// Create a new Jira client.
    ///
    /// # Arguments
    /// * `domain` - Site name or URL (see [`normalize_site`])
    /// * `email` - Account email used for basic auth
    /// * `token` - API token used for basic auth
    ///
    /// # Errors
    /// Returns error if the domain is empty or the HTTP client cannot be created.
    pub fn new(
        domain: &str,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, JiraError> {
        let base_url = normalize_site(domain)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        debug!(base_url = %base_url, "Jira client configured");

        Ok(Self {
            client,
            base_url,
            email: email.into(),
            token: token.into(),
        })
    }

    /// Site root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(method = %method, url = %url, "Jira request");

        self.client
            .request(method, url)
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, JiraError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(JiraError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            JiraError::Serialization(e)
        })
    }

    /// Send a request whose success body is ignored.
    async fn send_empty(request: RequestBuilder) -> Result<(), JiraError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(JiraError::Api {
                status: status.as_u16(),
                body: text,
            })
        }
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Create a user.
    #[instrument(skip(self, user), fields(email = %user.email_address))]
    pub async fn create_user(&self, user: &UserCreate) -> Result<User, JiraError> {
        let request = self
            .request(reqwest::Method::POST, "/rest/api/3/user")
            .json(user);
        let created: User = Self::send_json(request).await?;

        info!(account_id = %created.account_id, "Jira user created");
        Ok(created)
    }

    /// Get a user by account ID, optionally expanding `groups` or `applicationRoles`.
    #[instrument(skip(self))]
    pub async fn get_user(&self, account_id: &str, expand: &[&str]) -> Result<User, JiraError> {
        let mut query = vec![("accountId", account_id.to_string())];
        if !expand.is_empty() {
            query.push(("expand", expand.join(",")));
        }

        let request = self
            .request(reqwest::Method::GET, "/rest/api/3/user")
            .query(&query);
        Self::send_json(request).await
    }

    // =========================================================================
    // Group Operations
    // =========================================================================

    /// Create a group.
    #[instrument(skip(self))]
    pub async fn create_group(&self, name: &str) -> Result<Group, JiraError> {
        let request = self
            .request(reqwest::Method::POST, "/rest/api/3/group")
            .json(&GroupCreate { name });
        let group: Group = Self::send_json(request).await?;

        info!(group = %group.name, "Jira group created");
        Ok(group)
    }

    /// Look up groups by name, one page at a time.
    #[instrument(skip(self))]
    pub async fn bulk_groups(
        &self,
        names: &[&str],
        start_at: u32,
        max_results: u32,
    ) -> Result<GroupPage, JiraError> {
        let mut query = vec![
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        query.extend(names.iter().map(|name| ("groupName", (*name).to_string())));

        let request = self
            .request(reqwest::Method::GET, "/rest/api/3/group/bulk")
            .query(&query);
        Self::send_json(request).await
    }

    /// Delete a group by name.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, name: &str) -> Result<(), JiraError> {
        let request = self
            .request(reqwest::Method::DELETE, "/rest/api/3/group")
            .query(&[("groupname", name)]);
        Self::send_empty(request).await?;

        info!(group = %name, "Jira group deleted");
        Ok(())
    }

    /// Add a user to a group. Returns the group the user was added to.
    #[instrument(skip(self))]
    pub async fn add_user_to_group(
        &self,
        group_name: &str,
        account_id: &str,
    ) -> Result<Group, JiraError> {
        let request = self
            .request(reqwest::Method::POST, "/rest/api/3/group/user")
            .query(&[("groupname", group_name)])
            .json(&GroupMembershipRequest { account_id });
        let group: Group = Self::send_json(request).await?;

        info!(group = %group.name, account_id = %account_id, "User added to group");
        Ok(group)
    }

    /// Remove a user from a group.
    #[instrument(skip(self))]
    pub async fn remove_user_from_group(
        &self,
        group_name: &str,
        account_id: &str,
    ) -> Result<(), JiraError> {
        let request = self
            .request(reqwest::Method::DELETE, "/rest/api/3/group/user")
            .query(&[("groupname", group_name), ("accountId", account_id)]);
        Self::send_empty(request).await?;

        info!(group = %group_name, account_id = %account_id, "User removed from group");
        Ok(())
    }
}
