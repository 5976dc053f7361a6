//! Declarative provider for Jira users, groups and group memberships.
//!
//! This crate provides:
//! - Provider configuration with environment fallbacks ([`ProviderConfig`])
//! - The `jira_user`, `jira_group` and `jira_group_membership` resources
//! - A [`Provider`] implementing the host protocol service, served by the
//!   `jira-provider` binary
//!
//! # Example
//!
//! ```no_run
//! use jira_provider::{Operation, Provider, ProviderConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = Provider::new();
//! provider.connect(ProviderConfig::from_env()).await?;
//!
//! let applied = provider
//!     .apply("jira_group", Operation::Read, serde_json::json!({"id": "developers"}))
//!     .await?;
//! if let Some(state) = &applied.state {
//!     println!("group_id: {}", state["group_id"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `JIRA_DOMAIN`: Jira site (`acme`, `acme.atlassian.net` or a full URL)
//! - `JIRA_USER_EMAIL`: Account email for basic auth
//! - `JIRA_TOKEN`: Jira API token
//! - `ADMIN_TOKEN`: Organization admin API key (used to disable users)
//! - `JIRA_ADMIN_URL`: Admin API base URL override (optional)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod provider;
pub mod resources;
pub mod state;

pub use config::ProviderConfig;
pub use diagnostics::Diagnostics;
pub use error::{ConfigError, ConfigureError, StateError};
pub use provider::{Applied, Clients, Operation, Provider, VERSION};
pub use resources::{MembershipId, Resource};
pub use state::{ResourceData, ID_KEY};
