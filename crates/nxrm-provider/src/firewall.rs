//! Firewall audit and quarantine capability coordinator
//!
//! A proxy repository's `firewall_audit_and_quarantine` block is stored upstream as a
//! separate capability keyed by the repository name. The coordinator keeps
//! at most one such capability per repository and folds it back into the
//! repository's state.

use nxrm_client::{CapabilityApi, NxrmClient, Result as ClientResult};
use nxrm_core::{attrs, block, Attr, Attribute, AttributeType};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::descriptor::FirewallSupport;
use crate::mapping::{self, Outcome};

/// Upstream capability type
pub const CAPABILITY_TYPE: &str = "firewall.audit-quarantine";

const NOUN: &str = "Firewall Audit and Quarantine Capability";

const PROP_REPOSITORY: &str = "repository";
const PROP_QUARANTINE: &str = "quarantine";
const PROP_PCCS: &str = "pccsEnabled";

/// The `firewall_audit_and_quarantine` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallModel {
    pub enabled: Attr<bool>,
    pub quarantine: Attr<bool>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub pccs_enabled: Attr<bool>,
    pub capability_id: Attr<String>,
}

/// Schema of the `firewall_audit_and_quarantine` block
pub fn schema_attribute(support: FirewallSupport) -> Attribute {
    let mut fields = attrs([
        (
            "enabled",
            Attribute::optional_bool()
                .default_value(json!(true))
                .describe("Whether the capability is enabled"),
        ),
        (
            "quarantine",
            Attribute::required_bool().describe("Quarantine components that violate policy"),
        ),
        (
            "capability_id",
            Attribute::computed_string()
                .use_state_for_unknown()
                .describe("Identifier of the upstream capability"),
        ),
    ]);
    if support.has_pccs() {
        fields.insert(
            "pccs_enabled".to_string(),
            Attribute::optional_computed(AttributeType::Bool)
                .use_state_for_unknown()
                .describe("Policy-compliant component selection"),
        );
    }
    Attribute::optional(block(fields)).describe("Firewall audit and quarantine settings")
}

/// Project a capability onto the block.
///
/// `prior` supplies the operator's `pccs_enabled` when the server does not
/// report one.
pub fn fold(
    support: FirewallSupport,
    capability: Option<&CapabilityApi>,
    prior: Option<&FirewallModel>,
) -> Option<FirewallModel> {
    let capability = capability?;
    let pccs_enabled = if support.has_pccs() {
        match capability.property(PROP_PCCS) {
            Some(v) => Attr::Known(v == "true"),
            None => prior.map(|p| p.pccs_enabled.clone()).unwrap_or_default(),
        }
    } else {
        Attr::Null
    };
    Some(FirewallModel {
        enabled: Attr::Known(capability.enabled),
        quarantine: Attr::Known(capability.property(PROP_QUARANTINE) == Some("true")),
        pccs_enabled,
        capability_id: Attr::from_option(capability.id.clone()),
    })
}

fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Keeps a repository and its firewall capability in step
pub struct FirewallCoordinator<'a> {
    client: &'a NxrmClient,
    support: FirewallSupport,
}

impl<'a> FirewallCoordinator<'a> {
    pub fn new(client: &'a NxrmClient, support: FirewallSupport) -> Self {
        Self { client, support }
    }

    /// The capability paired with a repository, if any
    pub async fn find_by_repository_id(&self, repository: &str) -> ClientResult<Option<CapabilityApi>> {
        let capabilities = self.client.list_capabilities().await?;
        Ok(capabilities.into_iter().find(|c| {
            c.kind == CAPABILITY_TYPE && c.property(PROP_REPOSITORY) == Some(repository)
        }))
    }

    fn body(&self, repository: &str, settings: &FirewallModel) -> CapabilityApi {
        let mut capability = CapabilityApi::new(CAPABILITY_TYPE);
        capability.enabled = settings.enabled.known_or(true);
        capability
            .properties
            .insert(PROP_REPOSITORY.to_string(), repository.to_string());
        capability.properties.insert(
            PROP_QUARANTINE.to_string(),
            flag(settings.quarantine.known_or(false)),
        );
        if self.support.has_pccs() {
            if let Some(pccs) = settings.pccs_enabled.value() {
                capability.properties.insert(PROP_PCCS.to_string(), flag(*pccs));
            }
        }
        capability
    }

    pub async fn create(&self, repository: &str, settings: &FirewallModel) -> ClientResult<CapabilityApi> {
        tracing::info!(repository, "creating firewall capability");
        let body = self.body(repository, settings);
        let mut created = self.client.create_capability(&body, &[200, 201]).await?;
        if created.properties.is_empty() {
            created.properties = body.properties;
            created.kind = body.kind;
            created.enabled = body.enabled;
        }
        Ok(created)
    }

    pub async fn update(
        &self,
        capability_id: &str,
        repository: &str,
        settings: &FirewallModel,
    ) -> ClientResult<CapabilityApi> {
        tracing::info!(repository, capability_id, "updating firewall capability");
        let mut body = self.body(repository, settings);
        body.id = Some(capability_id.to_string());
        self.client.update_capability(capability_id, &body).await?;
        Ok(body)
    }

    /// Create the capability, or adopt and update the existing one
    pub async fn ensure(&self, repository: &str, settings: &FirewallModel) -> ClientResult<CapabilityApi> {
        match self.find_by_repository_id(repository).await? {
            Some(existing) => {
                let id = existing.id.clone().unwrap_or_default();
                let wanted = self.body(repository, settings);
                let unchanged = existing.enabled == wanted.enabled
                    && wanted
                        .properties
                        .iter()
                        .all(|(key, value)| existing.property(key) == Some(value.as_str()));
                if unchanged {
                    Ok(existing)
                } else {
                    self.update(&id, repository, settings).await
                }
            }
            None => self.create(repository, settings).await,
        }
    }

    /// Delete the paired capability; a missing one is reported as gone
    pub async fn remove(&self, repository: &str, known_id: Option<String>) -> Outcome<()> {
        let id = match known_id {
            Some(id) => id,
            None => match self.find_by_repository_id(repository).await {
                Ok(Some(capability)) => capability.id.unwrap_or_default(),
                Ok(None) => {
                    return Outcome::Gone(mapping::drift_warning(
                        mapping::Operation::Delete,
                        NOUN,
                        repository,
                    ));
                }
                Err(e) => {
                    return Outcome::Failed(mapping::api_error(mapping::Operation::Delete, NOUN, &e));
                }
            },
        };
        tracing::info!(repository, capability_id = %id, "deleting firewall capability");
        let client = self.client;
        let capability_id = id.as_str();
        mapping::delete_with_retry(NOUN, capability_id, move || client.delete_capability(capability_id)).await
    }

    /// Name used in diagnostics
    pub fn noun() -> &'static str {
        NOUN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxrm_client::ClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NxrmClient {
        NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap()
    }

    fn settings(quarantine: bool) -> FirewallModel {
        FirewallModel {
            enabled: Attr::Known(true),
            quarantine: Attr::Known(quarantine),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_find_by_repository_id_matches_type_and_repository() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/capabilities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "a", "type": "webhook.repository", "enabled": true, "properties": {"repository": "npm-proxy"}},
                {"id": "b", "type": CAPABILITY_TYPE, "enabled": true, "properties": {"repository": "other"}},
                {"id": "c", "type": CAPABILITY_TYPE, "enabled": true, "properties": {"repository": "npm-proxy", "quarantine": "true"}}
            ])))
            .mount(&server)
            .await;

        let client = client(&server);
        let coordinator = FirewallCoordinator::new(&client, FirewallSupport::Audit);
        let found = coordinator.find_by_repository_id("npm-proxy").await.unwrap().unwrap();
        assert_eq!(found.id.as_deref(), Some("c"));
        assert!(coordinator.find_by_repository_id("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_adopts_existing_capability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/capabilities"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "c1", "type": CAPABILITY_TYPE, "enabled": true, "properties": {"repository": "npm-proxy", "quarantine": "false"}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/service/rest/v1/capabilities/c1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/service/rest/v1/capabilities"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let coordinator = FirewallCoordinator::new(&client, FirewallSupport::Audit);
        let capability = coordinator.ensure("npm-proxy", &settings(true)).await.unwrap();
        assert_eq!(capability.id.as_deref(), Some("c1"));
        assert_eq!(capability.property("quarantine"), Some("true"));
    }

    #[test]
    fn test_fold() {
        let mut capability = CapabilityApi::new(CAPABILITY_TYPE);
        capability.id = Some("c9".to_string());
        capability.enabled = true;
        capability
            .properties
            .insert("quarantine".to_string(), "true".to_string());

        let prior = FirewallModel {
            pccs_enabled: Attr::Known(true),
            ..settings(true)
        };
        let folded = fold(FirewallSupport::AuditAndPccs, Some(&capability), Some(&prior)).unwrap();
        assert_eq!(folded.quarantine, Attr::Known(true));
        assert_eq!(folded.pccs_enabled, Attr::Known(true));
        assert_eq!(folded.capability_id, Attr::Known("c9".to_string()));

        assert!(fold(FirewallSupport::AuditAndPccs, None, Some(&prior)).is_none());

        capability.properties.insert("pccsEnabled".to_string(), "false".to_string());
        let plain = fold(FirewallSupport::Audit, Some(&capability), Some(&prior)).unwrap();
        assert!(plain.pccs_enabled.is_null());
    }
}
