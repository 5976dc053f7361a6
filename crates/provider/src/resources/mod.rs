//! Resource implementations.
//!
//! Each resource maps create/read/delete onto Jira REST calls and folds the
//! HTTP outcome back into [`ResourceData`] plus [`Diagnostics`]:
//!
//! - 404 on read or delete drops the resource from state
//! - 400 on delete is a warning and the resource is dropped from state
//! - anything else is an error and the state is left as it was

pub mod group;
pub mod group_membership;
pub mod user;

use async_trait::async_trait;
use hemmer_provider_sdk::schema::{Attribute, Schema};
use jira::JiraError;
use tracing::warn;

use crate::diagnostics::Diagnostics;
use crate::provider::Clients;
use crate::state::{ResourceData, ID_KEY};

pub use group::GroupResource;
pub use group_membership::{GroupMembershipResource, MembershipId};
pub use user::UserResource;

/// A managed resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `jira_user`.
    fn name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Create the remote object, set the ID, then refresh state.
    async fn create(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics;

    /// Refresh state from the remote object. Clears the ID when it is gone.
    async fn read(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics;

    /// Remove the remote object.
    async fn delete(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics;

    /// Adopt an existing object by ID. The ID is taken as-is.
    async fn import(&self, clients: &Clients, data: &mut ResourceData) -> Diagnostics {
        self.read(clients, data).await
    }
}

/// Base schema shared by every resource: a description and the computed `id`.
pub(crate) fn resource_schema(description: &str) -> Schema {
    let mut schema = Schema::v0().with_attribute(
        ID_KEY,
        Attribute::computed_string().with_description("Identifier of the resource."),
    );
    schema.block.description = Some(description.to_string());
    schema
}

/// Fold the result of a delete call into state.
pub(crate) fn delete_outcome(
    resource: &str,
    result: Result<(), JiraError>,
    data: &mut ResourceData,
) -> Diagnostics {
    match result {
        Ok(()) => {
            data.clear_id();
            Diagnostics::new()
        }
        Err(e) if e.is_not_found() => {
            data.clear_id();
            Diagnostics::new()
        }
        Err(e) if e.is_bad_request() => {
            warn!(resource, id = %data.id(), error = %e, "Delete rejected, dropping from state");
            data.clear_id();
            let summary = if e.body().is_empty() {
                e.to_string()
            } else {
                e.body().to_string()
            };
            Diagnostics::warning(summary)
        }
        Err(e) => Diagnostics::from_err(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemmer_provider_sdk::schema::DiagnosticSeverity;
    use serde_json::Map;

    fn data() -> ResourceData {
        let schema = resource_schema("t").with_attribute("name", Attribute::required_string());
        ResourceData::new(&schema, "existing", Map::new())
    }

    fn api_error(status: u16, body: &str) -> JiraError {
        JiraError::Api {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_delete_success_clears_id() {
        let mut data = data();
        let diags = delete_outcome("t", Ok(()), &mut data);
        assert!(diags.is_empty());
        assert_eq!(data.id(), "");
    }

    #[test]
    fn test_delete_not_found_clears_id() {
        let mut data = data();
        let diags = delete_outcome("t", Err(api_error(404, "")), &mut data);
        assert!(diags.is_empty());
        assert_eq!(data.id(), "");
    }

    #[test]
    fn test_delete_bad_request_warns_with_body() {
        let mut data = data();
        let diags = delete_outcome("t", Err(api_error(400, "cannot remove")), &mut data);

        let diagnostic = diags.iter().next().unwrap();
        assert_eq!(diagnostic.severity, DiagnosticSeverity::Warning);
        assert_eq!(diagnostic.summary, "cannot remove");
        assert_eq!(data.id(), "");
    }

    #[test]
    fn test_resource_schema_declares_computed_id() {
        let schema = resource_schema("Things.");
        let id = &schema.block.attributes[ID_KEY];
        assert!(id.flags.computed);
        assert_eq!(schema.block.description.as_deref(), Some("Things."));
    }

    #[test]
    fn test_delete_server_error_keeps_id() {
        let mut data = data();
        let diags = delete_outcome("t", Err(api_error(500, "oops")), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.id(), "existing");
    }
}
