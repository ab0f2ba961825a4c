//! Data sources
//!
//! - [`LookupDataSource`] mirrors one resource type read-only: the identifier
//!   is the lookup argument and every other attribute is computed.
//! - [`ListDataSource`] returns a summary of every entity of one kind, e.g.
//!   `nxrm_repositories`.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use nxrm_client::{NxrmClient, Result as ClientResult};
use nxrm_core::{
    attrs, block, clear_unknowns, require_version, Attribute, AttributeType, Attributes,
    Diagnostic, Schema,
};
use semver::Version;
use serde_json::{json, Map, Value as JsonValue};

use crate::capability::CAPABILITY_MIN_VERSION;
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;
use crate::firewall::FirewallCoordinator;
use crate::mapping::{self, classify, Operation, Outcome};
use crate::resource::{DataSource, ReadResponse};
use crate::task::TASK_MIN_VERSION;

/// Read-only mirror of a resource type
pub struct LookupDataSource<D: ResourceDescriptor> {
    descriptor: D,
    type_name: String,
    noun: String,
    schema: Schema,
}

impl<D: ResourceDescriptor> LookupDataSource<D> {
    /// Look up by the descriptor's identifier attribute
    pub fn new(descriptor: D) -> Self {
        let key = descriptor.identifier_attribute();
        Self::with_keys(descriptor, &[key], &[])
    }

    /// Look up by `keys`, narrowed by the `optional` arguments
    pub fn with_keys(descriptor: D, keys: &[&str], optional: &[&str]) -> Self {
        Self {
            type_name: descriptor.type_name(),
            noun: descriptor.noun(),
            schema: descriptor.schema().as_data_source(keys, optional),
            descriptor,
        }
    }

    fn not_found(&self, id: &str) -> Diagnostic {
        Diagnostic::error(
            format!("{} not found", self.noun),
            format!("No {} matches \"{}\".", self.noun, id),
        )
    }
}

#[async_trait]
impl<D: ResourceDescriptor> DataSource for LookupDataSource<D> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &ProviderContext, config: &JsonValue) -> ReadResponse {
        let mut diags = self.schema.validate_config(config);
        diags.extend(require_version(
            &self.noun,
            self.descriptor.min_version().as_ref(),
            ctx.version(),
        ));
        if diags.has_error() {
            return ReadResponse {
                state: None,
                diagnostics: diags,
            };
        }
        let query: D::Model = match serde_json::from_value(config.clone()) {
            Ok(m) => m,
            Err(e) => {
                return ReadResponse::failed(Diagnostic::error(
                    format!("Invalid configuration for {}", self.type_name),
                    e.to_string(),
                ));
            }
        };
        let id = self.descriptor.identifier(&query).unwrap_or_default();
        tracing::debug!(data_source = %self.type_name, id = %id, "reading");

        let mut state = query.clone();
        match classify(Operation::Read, &self.noun, &id, self.descriptor.do_read(ctx, &query).await) {
            Outcome::Done(api) => diags.extend(self.descriptor.update_state_from_api(&mut state, api)),
            Outcome::Gone(_) => return ReadResponse::failed(self.not_found(&id)),
            Outcome::Failed(e) => return ReadResponse::failed(e),
        }

        let support = self.descriptor.firewall_support();
        if support.is_supported() {
            let coordinator = FirewallCoordinator::new(ctx.client(), support);
            match coordinator.find_by_repository_id(&id).await {
                Ok(capability) => self
                    .descriptor
                    .update_state_with_capability(&mut state, capability.as_ref()),
                Err(e) => diags.push(mapping::api_error(
                    Operation::Read,
                    FirewallCoordinator::noun(),
                    &e,
                )),
            }
        }

        match serde_json::to_value(&state) {
            Ok(mut value) => {
                clear_unknowns(&mut value);
                ReadResponse {
                    state: Some(value),
                    diagnostics: diags,
                }
            }
            Err(e) => {
                diags.push(Diagnostic::error(
                    format!("Invalid state for {}", self.type_name),
                    e.to_string(),
                ));
                ReadResponse {
                    state: None,
                    diagnostics: diags,
                }
            }
        }
    }
}

/// Fetch every entity of one kind as element objects; the second argument is
/// the data source configuration
pub type Fetch = for<'a> fn(&'a NxrmClient, &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>>;

/// Summary listing of one entity kind
pub struct ListDataSource {
    type_name: String,
    noun: &'static str,
    field: &'static str,
    schema: Schema,
    min_version: Option<Version>,
    fetch: Fetch,
}

impl ListDataSource {
    pub fn new(
        type_name: &str,
        noun: &'static str,
        field: &'static str,
        element: Attributes,
        fetch: Fetch,
    ) -> Self {
        let schema = Schema::new(
            format!("Lists every {}.", noun.to_lowercase()),
            attrs([(
                field,
                Attribute::computed(AttributeType::List(Box::new(block(element)))),
            )]),
        );
        Self {
            type_name: type_name.to_string(),
            noun,
            field,
            schema,
            min_version: None,
            fetch,
        }
    }

    /// Add an optional filter argument
    pub fn filter(mut self, name: &str, description: &str) -> Self {
        self.schema.attributes.insert(
            name.to_string(),
            Attribute::optional_string().describe(description),
        );
        self
    }

    pub fn min_version(mut self, version: Version) -> Self {
        self.min_version = Some(version);
        self
    }
}

#[async_trait]
impl DataSource for ListDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &ProviderContext, config: &JsonValue) -> ReadResponse {
        let mut diags = self.schema.validate_config(config);
        diags.extend(require_version(self.noun, self.min_version.as_ref(), ctx.version()));
        if diags.has_error() {
            return ReadResponse {
                state: None,
                diagnostics: diags,
            };
        }

        let items = match (self.fetch)(ctx.client(), config).await {
            Ok(items) => items,
            Err(e) => return ReadResponse::failed(mapping::api_error(Operation::Read, self.noun, &e)),
        };
        tracing::debug!(data_source = %self.type_name, count = items.len(), "listed");

        let mut state: Map<String, JsonValue> = config.as_object().cloned().unwrap_or_default();
        for name in self.schema.attributes.keys() {
            state.entry(name.clone()).or_insert(JsonValue::Null);
        }
        state.insert(self.field.to_string(), JsonValue::Array(items));
        ReadResponse {
            state: Some(JsonValue::Object(state)),
            diagnostics: diags,
        }
    }
}

fn argument<'a>(config: &'a JsonValue, name: &str) -> Option<&'a str> {
    config.get(name).and_then(JsonValue::as_str)
}

fn strings(names: &[&str]) -> Attributes {
    names
        .iter()
        .map(|n| (n.to_string(), Attribute::computed_string()))
        .collect()
}

fn fetch_repositories<'a>(client: &'a NxrmClient, config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        let format = argument(config, "format");
        Ok(client
            .list_repositories()
            .await?
            .into_iter()
            .filter(|r| format.is_none_or(|f| r.format == f))
            .map(|r| json!({"name": r.name, "format": r.format, "type": r.kind, "url": r.url}))
            .collect())
    }
    .boxed()
}

fn fetch_blob_stores<'a>(client: &'a NxrmClient, _config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        Ok(client
            .list_blob_stores()
            .await?
            .into_iter()
            .map(|b| {
                json!({
                    "name": b.name,
                    "type": b.kind,
                    "blob_count": b.blob_count,
                    "total_size_in_bytes": b.total_size_in_bytes,
                    "available_space_in_bytes": b.available_space_in_bytes,
                    "unavailable": b.unavailable,
                })
            })
            .collect())
    }
    .boxed()
}

fn fetch_capabilities<'a>(client: &'a NxrmClient, config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        let kind = argument(config, "type");
        Ok(client
            .list_capabilities()
            .await?
            .into_iter()
            .filter(|c| kind.is_none_or(|k| c.kind == k))
            .map(|c| json!({"id": c.id, "type": c.kind, "enabled": c.enabled, "notes": c.notes}))
            .collect())
    }
    .boxed()
}

fn fetch_tasks<'a>(client: &'a NxrmClient, config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        let kind = argument(config, "type");
        Ok(client
            .list_tasks()
            .await?
            .into_iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .map(|t| {
                json!({
                    "id": t.id,
                    "type": t.kind,
                    "name": t.name,
                    "current_state": t.current_state,
                    "next_run": t.next_run,
                    "last_run": t.last_run,
                })
            })
            .collect())
    }
    .boxed()
}

fn fetch_roles<'a>(client: &'a NxrmClient, _config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        Ok(client
            .list_roles()
            .await?
            .into_iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "name": r.name,
                    "description": r.description,
                    "source": r.source,
                    "privileges": r.privileges,
                    "roles": r.roles,
                })
            })
            .collect())
    }
    .boxed()
}

fn fetch_users<'a>(client: &'a NxrmClient, config: &'a JsonValue) -> BoxFuture<'a, ClientResult<Vec<JsonValue>>> {
    async move {
        Ok(client
            .list_users(argument(config, "source"))
            .await?
            .into_iter()
            .map(|u| {
                json!({
                    "user_id": u.user_id,
                    "first_name": u.first_name,
                    "last_name": u.last_name,
                    "email_address": u.email_address,
                    "source": u.source,
                    "status": u.status,
                    "roles": u.roles,
                })
            })
            .collect())
    }
    .boxed()
}

/// The aggregate listings
pub fn list_data_sources() -> Vec<ListDataSource> {
    let mut blob_store = strings(&["name", "type"]);
    for field in ["blob_count", "total_size_in_bytes", "available_space_in_bytes"] {
        blob_store.insert(field.to_string(), Attribute::computed(AttributeType::Int64));
    }
    blob_store.insert("unavailable".to_string(), Attribute::computed(AttributeType::Bool));

    let mut capability = strings(&["id", "type", "notes"]);
    capability.insert("enabled".to_string(), Attribute::computed(AttributeType::Bool));

    let mut role = strings(&["id", "name", "description", "source"]);
    role.insert("privileges".to_string(), Attribute::computed(Attribute::string_list()));
    role.insert("roles".to_string(), Attribute::computed(Attribute::string_list()));

    let mut user = strings(&["user_id", "first_name", "last_name", "email_address", "source", "status"]);
    user.insert("roles".to_string(), Attribute::computed(Attribute::string_list()));

    vec![
        ListDataSource::new(
            "nxrm_repositories",
            "Repository",
            "repositories",
            strings(&["name", "format", "type", "url"]),
            fetch_repositories,
        )
        .filter("format", "Only list repositories of this format, e.g. maven2"),
        ListDataSource::new("nxrm_blob_stores", "Blob Store", "blob_stores", blob_store, fetch_blob_stores),
        ListDataSource::new("nxrm_capabilities", "Capability", "capabilities", capability, fetch_capabilities)
            .filter("type", "Only list capabilities of this type")
            .min_version(CAPABILITY_MIN_VERSION),
        ListDataSource::new(
            "nxrm_tasks",
            "Task",
            "tasks",
            strings(&["id", "type", "name", "current_state", "next_run", "last_run"]),
            fetch_tasks,
        )
        .filter("type", "Only list tasks of this type id")
        .min_version(TASK_MIN_VERSION),
        ListDataSource::new("nxrm_roles", "Role", "roles", role, fetch_roles),
        ListDataSource::new("nxrm_users", "User", "users", user, fetch_users)
            .filter("source", "Only list users of this source, e.g. default or LDAP"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::FileBlobStoreDescriptor;

    #[test]
    fn test_lookup_schema_is_read_only() {
        let ds = LookupDataSource::new(FileBlobStoreDescriptor);
        let schema = ds.schema();
        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["path"].computed);
        assert!(!schema.attributes["path"].optional);

        let diags = schema.validate_config(&json!({"name": "default", "path": "/tmp"}));
        assert!(diags.has_error());
    }

    #[test]
    fn test_list_data_sources() {
        let names: Vec<String> = list_data_sources()
            .iter()
            .map(|d| d.type_name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "nxrm_repositories",
                "nxrm_blob_stores",
                "nxrm_capabilities",
                "nxrm_tasks",
                "nxrm_roles",
                "nxrm_users"
            ]
        );
        let repos = &list_data_sources()[0];
        assert!(repos.schema().attributes["format"].optional);
        assert!(repos.schema().attributes["repositories"].computed);
    }
}
