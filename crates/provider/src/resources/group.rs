//! `jira_group`: Jira groups, identified by name.

use async_trait::async_trait;
use tracing::info;

use hemmer_provider_sdk::schema::{Attribute, Schema};

use super::{delete_outcome, resource_schema, Resource};
use crate::diagnostics::Diagnostics;
use crate::provider::Clients;
use crate::state::ResourceData;

pub struct GroupResource;

#[async_trait]
impl Resource for GroupResource {
    fn name(&self) -> &'static str {
        "jira_group"
    }

    fn schema(&self) -> Schema {
        resource_schema(
            "With this resource, you can manage group identities and creating and deleting groups.",
        )
        .with_attribute("group_id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_force_new()
                .with_description("Name of the group."),
        )
    }

    async fn create(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let name = if data.is_new_resource() {
            data.get_str("name").to_string()
        } else {
            String::new()
        };

        let group = match clients.jira.create_group(&name).await {
            Ok(group) => group,
            Err(e) => return Diagnostics::from_err(&e),
        };

        info!(group = %group.name, "jira_group created");
        data.set_id(group.name);

        self.read(clients, data).await
    }

    async fn read(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let name = data.id().to_string();
        let page = match clients.jira.bulk_groups(&[name.as_str()], 0, 1).await {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                data.clear_id();
                return Diagnostics::new();
            }
            Err(e) => return Diagnostics::from_err(&e),
        };

        let group = match page.values.into_iter().next() {
            Some(group) if page.total > 0 => group,
            _ => {
                data.clear_id();
                return Diagnostics::new();
            }
        };

        Diagnostics::from_results([
            data.set("group_id", group.group_id),
            data.set("name", group.name),
        ])
    }

    async fn delete(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        let result = clients.jira.delete_group(data.id()).await;
        delete_outcome(self.name(), result, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = GroupResource.schema();
        assert!(schema.block.attributes["name"].force_new);
        assert!(schema.block.attributes["group_id"].flags.computed);
        assert_eq!(GroupResource.name(), "jira_group");
    }
}
