//! Jira Cloud REST clients for identity management.
//!
//! This crate provides the HTTP side of the Jira provider:
//!
//! - [`JiraClient`] - Jira REST v3 (`/rest/api/3`) with basic auth for users,
//!   groups and group memberships
//! - [`AdminClient`] - Atlassian admin API (`api.atlassian.com`) with a bearer
//!   token, used to disable managed accounts
//!
//! Every failed call returns a [`JiraError`] that keeps the HTTP status, so
//! callers can tell "already gone" (404) from real failures.
//!
//! ## Example
//!
//! ```ignore
//! use jira::{JiraClient, UserCreate};
//!
//! let client = JiraClient::new("your-domain", "me@example.com", api_token)?;
//!
//! let user = client.create_user(&UserCreate::new("new.hire@example.com")).await?;
//! client.add_user_to_group("developers", &user.account_id).await?;
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod admin;
pub mod client;
pub mod error;
pub mod models;

pub use admin::{AdminClient, ADMIN_API_URL};
pub use client::{normalize_site, JiraClient};
pub use error::JiraError;
pub use models::{Group, GroupList, GroupName, GroupPage, User, UserCreate};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("jira-provider/", env!("CARGO_PKG_VERSION"));
