//! Jira REST v3 and admin API payloads.
//!
//! Only the fields the provider reads or writes are modeled. Unknown fields
//! in responses are ignored.

use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// A Jira user as returned by `GET /rest/api/3/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Atlassian account ID.
    pub account_id: String,
    /// Account type (`atlassian`, `app`, `customer`).
    pub account_type: String,
    /// Email address. May be hidden by the user's privacy settings.
    pub email_address: String,
    /// Display name.
    pub display_name: String,
    /// Whether the account is active.
    pub active: bool,
    /// Group memberships, present when requested with `expand=groups`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupList>,
}

impl User {
    /// Whether the user's expanded group list contains `group_name`.
    #[must_use]
    pub fn is_member_of(&self, group_name: &str) -> bool {
        self.groups
            .as_ref()
            .is_some_and(|g| g.items.iter().any(|item| item.name == group_name))
    }
}

/// Expanded group list on a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupList {
    pub size: u32,
    pub items: Vec<GroupName>,
}

/// Group reference inside a user's group list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Body for `POST /rest/api/3/user`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    /// Email address of the new user.
    pub email_address: String,
    /// Optional display name. Jira derives one from the email when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Products to grant access to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
}

impl UserCreate {
    #[must_use]
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// A Jira group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Page of groups from `GET /rest/api/3/group/bulk`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupPage {
    pub start_at: u32,
    pub max_results: u32,
    pub total: u32,
    pub is_last: bool,
    pub values: Vec<Group>,
}

/// Body for `POST /rest/api/3/group`.
#[derive(Debug, Serialize)]
pub(crate) struct GroupCreate<'a> {
    pub name: &'a str,
}

/// Body for `POST /rest/api/3/group/user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupMembershipRequest<'a> {
    pub account_id: &'a str,
}

// ============================================================================
// Admin API
// ============================================================================

/// Body for `POST /users/{account_id}/manage/lifecycle/disable`.
#[derive(Debug, Serialize)]
pub(crate) struct DisableUserRequest<'a> {
    pub message: &'a str,
}
