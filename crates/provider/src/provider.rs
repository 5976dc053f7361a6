//! Provider registry, configuration and the host protocol service.

use async_trait::async_trait;
use hemmer_provider_sdk::schema::{Attribute, Diagnostic, Schema};
use hemmer_provider_sdk::{
    AttributeChange, ImportedResource, PlanResult, ProviderError as SdkError, ProviderSchema,
    ProviderService,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use jira::{AdminClient, JiraClient, ADMIN_API_URL};

use crate::config::{ProviderConfig, ENV_ADMIN_TOKEN, ENV_ADMIN_URL, ENV_DOMAIN, ENV_EMAIL, ENV_TOKEN};
use crate::diagnostics::Diagnostics;
use crate::error::ConfigureError;
use crate::resources::{GroupMembershipResource, GroupResource, Resource, UserResource};
use crate::state::{ResourceData, ID_KEY};

/// Provider version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configured API clients handed to every resource operation.
#[derive(Debug, Clone)]
pub struct Clients {
    /// Jira REST client (basic auth).
    pub jira: JiraClient,
    /// Admin API client (bearer auth).
    pub admin: AdminClient,
}

impl Clients {
    /// Resolve settings and build both clients.
    pub fn connect(config: ProviderConfig) -> Result<Self, ConfigureError> {
        let config = config.resolve();
        config.validate()?;

        let jira = JiraClient::new(&config.domain, config.email, config.token)?;
        let admin = match config.admin_url.as_deref() {
            Some(url) => AdminClient::with_base_url(url, config.admin_token)?,
            None => AdminClient::new(config.admin_token)?,
        };

        Ok(Self { jira, admin })
    }
}

/// Resource lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Delete,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Delete => write!(f, "delete"),
            Self::Import => write!(f, "import"),
        }
    }
}

/// Result of one resource operation.
#[derive(Debug, Clone)]
pub struct Applied {
    /// State after the operation. `None` when the resource is gone.
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl Applied {
    /// Resource ID after the operation, empty when gone.
    #[must_use]
    pub fn id(&self) -> &str {
        self.state
            .as_ref()
            .and_then(|state| state.get(ID_KEY))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Fail on error diagnostics; warnings are logged since the protocol
    /// only carries diagnostics for failures.
    fn into_state(self, resource_type: &str, operation: Operation) -> Result<Option<Value>, SdkError> {
        for warning in self.diagnostics.warnings() {
            warn!(
                resource = resource_type,
                operation = %operation,
                summary = %warning.summary,
                "Operation finished with a warning"
            );
        }

        if self.diagnostics.has_errors() {
            return Err(SdkError::Sdk(self.diagnostics.error_message()));
        }
        Ok(self.state)
    }
}

/// The Jira provider: the registered resources plus the configured clients.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    clients: RwLock<Option<Clients>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    #[must_use]
    pub fn new() -> Self {
        let all: [Box<dyn Resource>; 3] = [
            Box::new(UserResource),
            Box::new(GroupResource),
            Box::new(GroupMembershipResource),
        ];

        Self {
            resources: all.into_iter().map(|r| (r.name(), r)).collect(),
            clients: RwLock::new(None),
        }
    }

    /// Schema of the provider block.
    #[must_use]
    pub fn config_schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "domain",
                Attribute::required_string().with_description(format!(
                    "Your Jira domain name. It can also be sourced from the `{ENV_DOMAIN}` environment variable."
                )),
            )
            .with_attribute(
                "email",
                Attribute::required_string().with_description(format!(
                    "Your Jira user email. It can also be sourced from the `{ENV_EMAIL}` environment variable."
                )),
            )
            .with_attribute(
                "token",
                Attribute::required_string()
                    .sensitive()
                    .with_description(format!(
                        "Your Jira user token. It can also be sourced from the `{ENV_TOKEN}` environment variable."
                    )),
            )
            .with_attribute(
                "admin_token",
                Attribute::required_string()
                    .sensitive()
                    .with_description(format!(
                        "Your Jira admin token. It can also be sourced from the `{ENV_ADMIN_TOKEN}` environment variable."
                    )),
            )
            .with_attribute(
                "admin_url",
                Attribute::optional_string().with_description(format!(
                    "Atlassian admin API base URL. Defaults to `{ADMIN_API_URL}` or the `{ENV_ADMIN_URL}` environment variable."
                )),
            )
    }

    /// Build the API clients and keep them for later operations.
    pub async fn connect(&self, config: ProviderConfig) -> Result<(), ConfigureError> {
        let clients = Clients::connect(config)?;
        info!(site = %clients.jira.base_url(), version = VERSION, "Provider configured");

        *self.clients.write().await = Some(clients);
        Ok(())
    }

    async fn clients(&self) -> Result<Clients, SdkError> {
        self.clients
            .read()
            .await
            .clone()
            .ok_or_else(|| SdkError::Configuration("provider is not configured".to_string()))
    }

    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&dyn Resource> {
        self.resources.get(name).map(|resource| resource.as_ref())
    }

    /// Registered resource type names.
    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    fn lookup(&self, resource_type: &str) -> Result<&dyn Resource, SdkError> {
        self.resource(resource_type)
            .ok_or_else(|| SdkError::UnknownResource(resource_type.to_string()))
    }

    /// Run one resource operation against `state`.
    ///
    /// For create `state` is the planned configuration; otherwise it must
    /// carry the resource ID under `id`.
    #[instrument(skip(self, state))]
    pub async fn apply(
        &self,
        resource_type: &str,
        operation: Operation,
        state: Value,
    ) -> Result<Applied, SdkError> {
        let resource = self.lookup(resource_type)?;
        let clients = self.clients().await?;

        let schema = resource.schema();
        let mut data = match operation {
            Operation::Create => ResourceData::for_create(&schema, state),
            _ => ResourceData::from_state(&schema, state),
        };
        if operation != Operation::Create && data.id().is_empty() {
            return Err(SdkError::InvalidRequest(format!(
                "{operation} of {resource_type} requires a resource ID"
            )));
        }

        let diagnostics = match operation {
            Operation::Create => resource.create(&clients, &mut data).await,
            Operation::Read => resource.read(&clients, &mut data).await,
            Operation::Delete => resource.delete(&clients, &mut data).await,
            Operation::Import => resource.import(&clients, &mut data).await,
        };

        debug!(
            id = %data.id(),
            diagnostics = diagnostics.len(),
            "Operation finished"
        );

        Ok(Applied {
            state: data.into_state(),
            diagnostics,
        })
    }
}

fn parse_config(config: Value) -> Result<ProviderConfig, ConfigureError> {
    if config.is_null() {
        return Ok(ProviderConfig::default());
    }
    Ok(serde_json::from_value(config)?)
}

/// Every configurable attribute forces replacement, so a plan is either
/// create, no-op, replace or destroy. Computed attributes are ignored.
fn plan_replacement(schema: &Schema, prior: Option<Value>, proposed: Value) -> PlanResult {
    let Some(prior) = prior.filter(|state| !state.is_null()) else {
        return PlanResult::from_diff(None, &proposed);
    };
    if proposed.is_null() {
        return PlanResult::with_changes(Value::Null, Vec::new(), false);
    }

    let mut changes: Vec<AttributeChange> = schema
        .block
        .attributes
        .iter()
        .filter(|(_, attr)| !attr.flags.computed)
        .filter_map(|(name, _)| {
            let before = prior.get(name).filter(|v| !v.is_null());
            let after = proposed.get(name).filter(|v| !v.is_null());
            (before != after).then(|| AttributeChange::new(name.clone(), before.cloned(), after.cloned()))
        })
        .collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));

    if changes.is_empty() {
        PlanResult::no_change(prior)
    } else {
        PlanResult::with_changes(proposed, changes, true)
    }
}

#[async_trait]
impl ProviderService for Provider {
    fn schema(&self) -> ProviderSchema {
        self.resources.iter().fold(
            ProviderSchema::new().with_provider_config(Self::config_schema()),
            |schema, (name, resource)| schema.with_resource(*name, resource.schema()),
        )
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, SdkError> {
        let result = parse_config(config)
            .and_then(|config| config.resolve().validate().map_err(ConfigureError::from));

        Ok(match result {
            Ok(()) => Vec::new(),
            Err(e) => Diagnostics::from_err(&e).into_vec(),
        })
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, SdkError> {
        let result = match parse_config(config) {
            Ok(config) => self.connect(config).await,
            Err(e) => Err(e),
        };

        Ok(match result {
            Ok(()) => Vec::new(),
            Err(e) => Diagnostics::from_err(&e).into_vec(),
        })
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, SdkError> {
        let resource = self.lookup(resource_type)?;
        Ok(plan_replacement(&resource.schema(), prior_state, proposed_state))
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, SdkError> {
        self.apply(resource_type, Operation::Create, planned_state)
            .await?
            .into_state(resource_type, Operation::Create)?
            .ok_or_else(|| {
                SdkError::NotFound(format!(
                    "{resource_type} was created but could not be read back"
                ))
            })
    }

    /// A resource that no longer exists reads as `null`.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, SdkError> {
        let state = self
            .apply(resource_type, Operation::Read, current_state)
            .await?
            .into_state(resource_type, Operation::Read)?;
        Ok(state.unwrap_or(Value::Null))
    }

    async fn update(
        &self,
        resource_type: &str,
        _prior_state: Value,
        _planned_state: Value,
    ) -> Result<Value, SdkError> {
        Err(SdkError::Unimplemented(format!(
            "{resource_type} cannot be updated in place; every attribute forces replacement"
        )))
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), SdkError> {
        self.apply(resource_type, Operation::Delete, current_state)
            .await?
            .into_state(resource_type, Operation::Delete)?;
        Ok(())
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, SdkError> {
        let mut state = Map::new();
        state.insert(ID_KEY.to_string(), Value::String(id.to_string()));

        let imported = self
            .apply(resource_type, Operation::Import, Value::Object(state))
            .await?
            .into_state(resource_type, Operation::Import)?;

        match imported {
            Some(state) => Ok(vec![ImportedResource::new(resource_type, state)]),
            None => Err(SdkError::NotFound(format!("{resource_type} {id:?} does not exist"))),
        }
    }
}
