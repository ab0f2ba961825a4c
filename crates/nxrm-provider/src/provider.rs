//! Host-runtime adapter
//!
//! [`Provider`] owns the registry and, once configured, the shared client
//! context. The host runtime calls it by resource type name.

use nxrm_client::{ClientConfig, NxrmClient, DEFAULT_API_BASE_PATH, DEFAULT_TIMEOUT};
use nxrm_core::{attrs, Attribute, Diagnostic, Diagnostics, Schema, ServerVersion, Validator};
use serde_json::{json, Value as JsonValue};

use crate::context::ProviderContext;
use crate::error::{ProviderError, Result};
use crate::registry::Registry;
use crate::resource::{ApplyResponse, DataSource, DeleteResponse, PlanResponse, ReadResponse, Resource};

/// The provider instance the host runtime talks to
pub struct Provider {
    registry: Registry,
    context: Option<ProviderContext>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// A provider with every built-in resource and data source registered
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            context: None,
        }
    }

    /// Schema of the provider configuration block
    pub fn schema() -> Schema {
        Schema::new(
            "Manages a Sonatype Nexus Repository server through its REST API.",
            attrs([
                (
                    "url",
                    Attribute::optional_string()
                        .validate(Validator::http_url())
                        .describe("Server URL, e.g. https://nexus.example.com. Falls back to NXRM_SERVER_URL."),
                ),
                (
                    "username",
                    Attribute::optional_string().describe("Falls back to NXRM_SERVER_USERNAME."),
                ),
                (
                    "password",
                    Attribute::optional_string()
                        .sensitive()
                        .describe("Falls back to NXRM_SERVER_PASSWORD."),
                ),
                (
                    "api_base_path",
                    Attribute::optional_string()
                        .default_value(json!(DEFAULT_API_BASE_PATH))
                        .describe("REST API prefix"),
                ),
                (
                    "timeout",
                    Attribute::optional_int64()
                        .default_value(json!(DEFAULT_TIMEOUT))
                        .validate(Validator::AtLeast(1))
                        .describe("Per-request timeout in seconds"),
                ),
            ]),
        )
    }

    /// Connection settings from a configuration block, with fallbacks from `lookup`
    pub fn client_config(config: &JsonValue, lookup: impl Fn(&str) -> Option<String>) -> ClientConfig {
        let text = |key: &str| {
            config
                .get(key)
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let mut client = ClientConfig::new(text("url"), text("username"), text("password"));
        if let Some(path) = config.get("api_base_path").and_then(JsonValue::as_str) {
            client.api_base_path = path.to_string();
        }
        if let Some(timeout) = config.get("timeout").and_then(JsonValue::as_u64) {
            client.timeout = timeout;
        }
        client.with_fallbacks(lookup)
    }

    /// Validate the configuration block, build the client and query the
    /// server version
    pub async fn configure(&mut self, config: &JsonValue) -> Diagnostics {
        let diags = Self::schema().validate_config(config);
        if diags.has_error() {
            return diags;
        }
        let client_config = Self::client_config(config, |key| std::env::var(key).ok());
        let mut diags = diags;
        diags.extend(self.configure_client(client_config).await);
        diags
    }

    /// Configure from ready connection settings
    pub async fn configure_client(&mut self, config: ClientConfig) -> Diagnostics {
        let invalid = |e: nxrm_client::ClientError| -> Diagnostics {
            Diagnostic::error("Invalid provider configuration", e.to_string()).into()
        };
        if let Err(e) = config.validate() {
            return invalid(e);
        }
        let url = config.url.clone();
        let client = match NxrmClient::new(config) {
            Ok(c) => c,
            Err(e) => return invalid(e),
        };

        let mut diags = Diagnostics::new();
        let version = match client.server_version().await {
            Ok(version) => version,
            Err(e) => {
                return Diagnostic::error(
                    "Unable to connect to the server",
                    format!("Probing {} failed: {}", url, e),
                )
                .into();
            }
        };
        match &version {
            Some(v) => tracing::info!(url = %url, version = %v, "configured"),
            None => diags.add_warning(
                "Server version not detected",
                "The server did not report its version; version requirements are not checked.",
            ),
        }
        self.context = Some(ProviderContext::new(client, version));
        diags
    }

    /// Use an already built context
    pub fn set_context(&mut self, context: ProviderContext) {
        self.context = Some(context);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn version(&self) -> Option<&ServerVersion> {
        self.context.as_ref().and_then(ProviderContext::version)
    }

    fn context(&self) -> Result<&ProviderContext> {
        self.context.as_ref().ok_or(ProviderError::NotConfigured)
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.registry
            .resource(type_name)
            .ok_or_else(|| ProviderError::UnknownResourceType {
                name: type_name.to_string(),
            })
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource> {
        self.registry
            .data_source(type_name)
            .ok_or_else(|| ProviderError::UnknownDataSource {
                name: type_name.to_string(),
            })
    }

    /// Plan a change; works before configuration, without version gates
    pub fn plan(&self, type_name: &str, prior: Option<&JsonValue>, config: &JsonValue) -> Result<PlanResponse> {
        Ok(self.resource(type_name)?.plan(self.version(), prior, config))
    }

    pub async fn create(&self, type_name: &str, planned: &JsonValue) -> Result<ApplyResponse> {
        let resource = self.resource(type_name)?;
        Ok(resource.create(self.context()?, planned).await)
    }

    pub async fn read(&self, type_name: &str, state: &JsonValue) -> Result<ReadResponse> {
        let resource = self.resource(type_name)?;
        Ok(resource.read(self.context()?, state).await)
    }

    pub async fn update(&self, type_name: &str, planned: &JsonValue, prior: &JsonValue) -> Result<ApplyResponse> {
        let resource = self.resource(type_name)?;
        Ok(resource.update(self.context()?, planned, prior).await)
    }

    pub async fn delete(&self, type_name: &str, prior: &JsonValue) -> Result<DeleteResponse> {
        let resource = self.resource(type_name)?;
        Ok(resource.delete(self.context()?, prior).await)
    }

    pub async fn import(&self, type_name: &str, id: &str) -> Result<ReadResponse> {
        let resource = self.resource(type_name)?;
        Ok(resource.import(self.context()?, id).await)
    }

    pub async fn read_data_source(&self, type_name: &str, config: &JsonValue) -> Result<ReadResponse> {
        let data_source = self.data_source(type_name)?;
        Ok(data_source.read(self.context()?, config).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_client_config_from_block() {
        let env: HashMap<&str, &str> = [("NXRM_SERVER_PASSWORD", "from-env")].into_iter().collect();
        let config = Provider::client_config(
            &json!({"url": "https://nexus.example.com", "username": "admin", "timeout": 10}),
            |key| env.get(key).map(|v| v.to_string()),
        );
        assert_eq!(config.url, "https://nexus.example.com");
        assert_eq!(config.password, "from-env");
        assert_eq!(config.timeout, 10);
        assert_eq!(config.api_base_path, DEFAULT_API_BASE_PATH);
    }

    #[test]
    fn test_invalid_url_scheme() {
        let diags = Provider::schema().validate_config(&json!({"url": "ftp://nexus"}));
        assert!(diags.has_error());
    }

    #[tokio::test]
    async fn test_missing_credentials_reported_before_any_request() {
        let mut provider = Provider::with_registry(Registry::new());
        let diags = provider
            .configure_client(ClientConfig::new("http://127.0.0.1:9", "", ""))
            .await;
        assert!(diags.has_error());
        assert!(diags.contains("username is required"));
    }

    #[test]
    fn test_unknown_type_and_unconfigured() {
        let provider = Provider::new();
        assert!(matches!(
            provider.plan("nxrm_repository_maven_bogus", None, &json!({})),
            Err(ProviderError::UnknownResourceType { .. })
        ));
        let plan = provider
            .plan(
                "nxrm_blob_store_file",
                None,
                &json!({"name": "default", "path": "/data/default"}),
            )
            .unwrap();
        assert!(!plan.diagnostics.has_error());
        assert!(matches!(provider.context(), Err(ProviderError::NotConfigured)));
    }
}
