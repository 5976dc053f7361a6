//! `jira_user`: Jira accounts.
//!
//! Destroying a user disables the managed account through the admin API;
//! Jira has no hard delete for Atlassian accounts.

use async_trait::async_trait;
use jira::UserCreate;
use tracing::info;

use hemmer_provider_sdk::schema::{Attribute, Schema};

use super::{delete_outcome, resource_schema, Resource};
use crate::diagnostics::Diagnostics;
use crate::provider::Clients;
use crate::state::ResourceData;

/// Message recorded in the organization audit log on destroy.
pub const DISABLE_MESSAGE: &str = "jira-provider: destroy resource";

pub struct UserResource;

#[async_trait]
impl Resource for UserResource {
    fn name(&self) -> &'static str {
        "jira_user"
    }

    fn schema(&self) -> Schema {
        resource_schema(
            "With this resource, you can manage user identities and creating and deleting users.",
        )
        .with_attribute(
            "email",
            Attribute::required_string()
                .with_force_new()
                .with_description("Email address of the user."),
        )
        .with_attribute("account_id", Attribute::computed_string())
        .with_attribute("account_type", Attribute::computed_string())
        .with_attribute("display_name", Attribute::computed_string())
        .with_attribute("active", Attribute::computed_bool())
    }

    async fn create(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let payload = expand_user(data);

        let user = match clients.jira.create_user(&payload).await {
            Ok(user) => user,
            Err(e) => return Diagnostics::from_err(&e),
        };

        info!(account_id = %user.account_id, "jira_user created");
        data.set_id(user.account_id);

        self.read(clients, data).await
    }

    async fn read(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let account_id = data.id().to_string();
        let user = match clients.jira.get_user(&account_id, &[]).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                data.clear_id();
                return Diagnostics::new();
            }
            Err(e) => return Diagnostics::from_err(&e),
        };

        Diagnostics::from_results([
            data.set("account_id", user.account_id),
            data.set("account_type", user.account_type),
            data.set("email", user.email_address),
            data.set("display_name", user.display_name),
            data.set("active", user.active),
        ])
    }

    async fn delete(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let result = clients.admin.disable_user(data.id(), DISABLE_MESSAGE).await;
        delete_outcome(self.name(), result, data)
    }
}

/// Build the create payload. Only new resources carry configuration.
fn expand_user(data: &ResourceData) -> UserCreate {
    if data.is_new_resource() {
        UserCreate::new(data.get_str("email"))
    } else {
        UserCreate::default()
    }
}
