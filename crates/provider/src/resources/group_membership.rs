//! `jira_group_membership`: a user's membership in a group.
//!
//! Jira has no membership object of its own, so the resource ID is the
//! composite `group_name:account_id`.

use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info};

use hemmer_provider_sdk::schema::{Attribute, Diagnostic, Schema};

use super::{delete_outcome, resource_schema, Resource};
use crate::diagnostics::Diagnostics;
use crate::provider::Clients;
use crate::state::ResourceData;

/// Separator between group name and account ID in the composite ID.
pub const ID_SEPARATOR: char = ':';

/// Group name and account ID decoded from a composite ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipId {
    pub group_name: String,
    pub account_id: String,
}

impl MembershipId {
    #[must_use]
    pub fn new(group_name: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            account_id: account_id.into(),
        }
    }

    /// Decode `group_name:account_id`.
    ///
    /// Only the first separator splits: account IDs such as `557058:f581...`
    /// contain one themselves. A malformed ID yields an empty value, which
    /// reads as "not found".
    #[must_use]
    pub fn parse(id: &str) -> Self {
        match id.split_once(ID_SEPARATOR) {
            Some((group, account)) if !group.is_empty() && !account.is_empty() => {
                Self::new(group, account)
            }
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group_name.is_empty() || self.account_id.is_empty()
    }

    /// Whether the composite ID decodes back to this membership. Fails for
    /// empty parts and for group names containing the separator.
    #[must_use]
    pub fn round_trips(&self) -> bool {
        Self::parse(&self.to_string()) == *self
    }
}

impl fmt::Display for MembershipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ID_SEPARATOR}{}", self.group_name, self.account_id)
    }
}

pub struct GroupMembershipResource;

#[async_trait]
impl Resource for GroupMembershipResource {
    fn name(&self) -> &'static str {
        "jira_group_membership"
    }

    fn schema(&self) -> Schema {
        resource_schema(
            "With this resource, you can manage group memberships by adding users to and removing them from groups.",
        )
        .with_attribute(
            "group_name",
            Attribute::required_string()
                .with_force_new()
                .with_description("Name of the group."),
        )
        .with_attribute(
            "account_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("Account id of the user."),
        )
    }

    async fn create(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let membership = expand_membership(data);

        // Checked before the POST so no untrackable membership is left behind
        if !membership.round_trips() {
            let mut diags = Diagnostics::new();
            diags.push(
                Diagnostic::error(format!(
                    "cannot manage membership [group_name: {} account_id: {}]",
                    membership.group_name, membership.account_id
                ))
                .with_detail(format!(
                    "group_name and account_id must be non-empty and group_name must not contain {ID_SEPARATOR:?}"
                ))
                .with_attribute("group_name"),
            );
            return diags;
        }

        let group = match clients
            .jira
            .add_user_to_group(&membership.group_name, &membership.account_id)
            .await
        {
            Ok(group) => group,
            Err(e) => {
                let status = e
                    .status()
                    .map_or_else(|| "unknown".to_string(), |s| s.to_string());
                return Diagnostics::error(format!(
                    "creating membership failed with status {status} [group_name: {} account_id: {}]",
                    membership.group_name, membership.account_id
                ));
            }
        };

        let id = MembershipId::new(group.name, membership.account_id);
        info!(id = %id, "jira_group_membership created");
        data.set_id(id.to_string());

        self.read(clients, data).await
    }

    async fn read(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let membership = MembershipId::parse(data.id());
        if membership.is_empty() {
            debug!(id = %data.id(), "Malformed membership ID, treating as gone");
            data.clear_id();
            return Diagnostics::new();
        }

        let user = match clients
            .jira
            .get_user(&membership.account_id, &["groups"])
            .await
        {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                data.clear_id();
                return Diagnostics::new();
            }
            Err(e) => return Diagnostics::from_err(&e),
        };

        if !user.is_member_of(&membership.group_name) {
            data.clear_id();
            return Diagnostics::new();
        }

        Diagnostics::from_results([
            data.set("group_name", membership.group_name),
            data.set("account_id", membership.account_id),
        ])
    }

    async fn delete(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let membership = MembershipId::parse(data.id());
        if membership.is_empty() {
            data.clear_id();
            return Diagnostics::new();
        }

        let result = clients
            .jira
            .remove_user_from_group(&membership.group_name, &membership.account_id)
            .await;
        delete_outcome(self.name(), result, data)
    }
}

/// Read the membership from configuration. Only new resources carry it.
fn expand_membership(data: &ResourceData) -> MembershipId {
    if data.is_new_resource() {
        MembershipId::new(data.get_str("group_name"), data.get_str("account_id"))
    } else {
        MembershipId::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_id() {
        let id = MembershipId::parse("group1:user1");
        assert_eq!(id.group_name, "group1");
        assert_eq!(id.account_id, "user1");
        assert!(!id.is_empty());
    }

    #[test]
    fn test_parse_keeps_colons_in_account_id() {
        let id = MembershipId::parse("developers:557058:f58131cb-b67d-43c7-b30d-6b58d40bd077");
        assert_eq!(id.group_name, "developers");
        assert_eq!(id.account_id, "557058:f58131cb-b67d-43c7-b30d-6b58d40bd077");
    }

    #[test]
    fn test_parse_without_separator_is_empty() {
        assert_eq!(MembershipId::parse("group1"), MembershipId::default());
        assert!(MembershipId::parse("").is_empty());
    }

    #[test]
    fn test_parse_with_empty_half_is_empty() {
        assert!(MembershipId::parse(":user1").is_empty());
        assert!(MembershipId::parse("group1:").is_empty());
    }

    #[test]
    fn test_display_matches_parse() {
        let id = MembershipId::new("developers", "557058:abc");
        assert_eq!(id.to_string(), "developers:557058:abc");
        assert_eq!(MembershipId::parse(&id.to_string()), id);
    }

    #[test]
    fn test_round_trips() {
        assert!(MembershipId::new("developers", "557058:abc").round_trips());
        assert!(!MembershipId::new("team:alpha", "acc-1").round_trips());
        assert!(!MembershipId::new("", "acc-1").round_trips());
        assert!(!MembershipId::new("developers", "").round_trips());
    }

    #[test]
    fn test_expand_membership_for_new_resource() {
        let config = json!({"group_name": "developers", "account_id": "acc-1"});

        let data = ResourceData::for_create(&GroupMembershipResource.schema(), config.clone());
        assert_eq!(
            expand_membership(&data),
            MembershipId::new("developers", "acc-1")
        );

        let mut data = ResourceData::from_state(&GroupMembershipResource.schema(), config);
        data.set_id("x:y");
        assert!(expand_membership(&data).is_empty());
    }
}
