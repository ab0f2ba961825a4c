//! Proxy repositories: a cache of a remote repository
//!
//! Formats with firewall support carry the optional
//! `firewall_audit_and_quarantine` block, which lives upstream as a separate
//! capability (see [`crate::firewall`]).

use std::marker::PhantomData;

use async_trait::async_trait;
use nxrm_client::{CapabilityApi, FormatBlocks, ProxyRepositoryApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Diagnostics, FieldGate, Schema};
use serde::{Deserialize, Serialize};

use super::common::{
    cleanup_attribute, http_client_attribute, identity_attributes, last_updated_attribute,
    negative_cache_attribute, proxy_attribute, replication_attribute, routing_rule_attribute,
    storage_attribute, CleanupModel, HttpClientModel, NegativeCacheModel, ProxySettingsModel,
    ReplicationModel, StorageModel,
};
use super::ext::FormatExtension;
use super::format::{Format, Role};
use super::reported_format;
use crate::context::ProviderContext;
use crate::descriptor::{FirewallSupport, ResourceDescriptor};
use crate::firewall::{self, FirewallModel};

const ROLE: Role = Role::Proxy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyRepositoryModel<X> {
    pub name: Attr<String>,
    pub online: Attr<bool>,
    pub format: Attr<String>,
    #[serde(rename = "type")]
    pub kind: Attr<String>,
    pub url: Attr<String>,
    pub storage: Attr<StorageModel>,
    pub cleanup: Attr<CleanupModel>,
    pub proxy: Attr<ProxySettingsModel>,
    pub negative_cache: Attr<NegativeCacheModel>,
    pub http_client: Attr<HttpClientModel>,
    pub routing_rule: Attr<String>,
    pub replication: Attr<ReplicationModel>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub firewall_audit_and_quarantine: Attr<FirewallModel>,
    #[serde(flatten)]
    pub ext: X,
    pub last_updated: Attr<String>,
}

impl<X: FormatExtension> ProxyRepositoryModel<X> {
    fn to_api(&self) -> ProxyRepositoryApi<FormatBlocks> {
        ProxyRepositoryApi {
            name: self.name.known_or(String::new()),
            online: self.online.known_or(true),
            storage: StorageModel::to_wire(&self.storage, ROLE),
            cleanup: CleanupModel::to_wire(&self.cleanup),
            proxy: ProxySettingsModel::to_wire(&self.proxy),
            negative_cache: NegativeCacheModel::to_wire(&self.negative_cache),
            http_client: HttpClientModel::to_wire(&self.http_client),
            routing_rule: self.routing_rule.to_option(),
            replication: ReplicationModel::to_wire(&self.replication),
            format_attrs: self.ext.to_wire(ROLE),
            ..Default::default()
        }
    }
}

/// Descriptor for `nxrm_repository_<format>_proxy`
#[derive(Debug)]
pub struct ProxyDescriptor<X> {
    format: &'static Format,
    _ext: PhantomData<fn() -> X>,
}

impl<X> ProxyDescriptor<X> {
    pub fn new(format: &'static Format) -> Self {
        Self {
            format,
            _ext: PhantomData,
        }
    }
}

#[async_trait]
impl<X: FormatExtension> ResourceDescriptor for ProxyDescriptor<X> {
    type Model = ProxyRepositoryModel<X>;
    type Api = ProxyRepositoryApi<FormatBlocks>;

    fn type_name(&self) -> String {
        self.format.resource_name(ROLE)
    }

    fn noun(&self) -> String {
        self.format.noun(ROLE)
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new(
            format!(
                "A {} proxy repository caching a remote repository.",
                self.format.title
            ),
            identity_attributes(),
        )
        .with(attrs([
            ("storage", storage_attribute(ROLE)),
            ("cleanup", cleanup_attribute()),
            ("proxy", proxy_attribute()),
            ("negative_cache", negative_cache_attribute()),
            ("http_client", http_client_attribute()),
            ("routing_rule", routing_rule_attribute()),
            ("replication", replication_attribute()),
        ]))
        .with(X::attributes(ROLE))
        .with(last_updated_attribute());
        if self.format.firewall.is_supported() {
            schema.attributes.insert(
                "firewall_audit_and_quarantine".to_string(),
                firewall::schema_attribute(self.format.firewall),
            );
        }
        schema
    }

    fn identifier(&self, model: &Self::Model) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut Self::Model, id: String) {
        model.name = Attr::Known(id);
    }

    fn field_gates(&self) -> Vec<FieldGate> {
        let mut gates = vec![FieldGate::reject("replication", 3, 62, 0)];
        gates.extend(X::field_gates(ROLE));
        gates
    }

    fn validate(&self, plan: &Self::Model) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(auth) = plan.http_client.value().and_then(|h| h.authentication.value()) {
            diags.extend(auth.validate());
        }
        diags
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &Self::Model) -> ClientResult<Option<String>> {
        ctx.client()
            .create_repository(self.format.key, ROLE.as_str(), &plan.to_api(), &[201])
            .await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &Self::Model) -> ClientResult<Self::Api> {
        ctx.client()
            .get_repository(self.format.key, ROLE.as_str(), &state.name.known_or(String::new()))
            .await
    }

    async fn do_update(&self, ctx: &ProviderContext, plan: &Self::Model, state: &Self::Model) -> ClientResult<()> {
        ctx.client()
            .update_repository(
                self.format.key,
                ROLE.as_str(),
                &state.name.known_or(String::new()),
                &plan.to_api(),
            )
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &Self::Model) -> ClientResult<()> {
        ctx.client()
            .delete_repository(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut Self::Model, api: Self::Api) -> Diagnostics {
        let diags = reported_format(self.format, ROLE, &api.name, api.format.as_deref());
        state.name = Attr::Known(api.name);
        state.online = Attr::Known(api.online);
        state.format = Attr::from_option(api.format);
        state.kind = Attr::from_option(api.kind);
        state.url = Attr::from_option(api.url);
        state.storage = StorageModel::from_wire(api.storage, ROLE);
        state.cleanup = CleanupModel::from_wire(api.cleanup, &state.cleanup);
        state.proxy = ProxySettingsModel::from_wire(api.proxy);
        state.negative_cache = NegativeCacheModel::from_wire(api.negative_cache);
        state.http_client = HttpClientModel::from_wire(api.http_client);
        state.routing_rule = Attr::from_option(api.routing_rule.filter(|r| !r.is_empty()));
        state.replication = ReplicationModel::from_wire(api.replication);
        state.ext.update_from_wire(api.format_attrs, ROLE);
        diags
    }

    fn map_missing_from_plan(&self, state: &mut Self::Model, plan: &Self::Model) {
        HttpClientModel::restore_secrets(&mut state.http_client, &plan.http_client);
        state.ext.restore_from_plan(&plan.ext);
    }

    fn firewall_support(&self) -> FirewallSupport {
        self.format.firewall
    }

    fn firewall_block(&self, model: &Self::Model) -> Option<FirewallModel> {
        if !self.format.firewall.is_supported() {
            return None;
        }
        model.firewall_audit_and_quarantine.to_option()
    }

    fn update_state_with_capability(&self, state: &mut Self::Model, capability: Option<&CapabilityApi>) {
        let prior = state.firewall_audit_and_quarantine.value();
        state.firewall_audit_and_quarantine =
            Attr::from_option(firewall::fold(self.format.firewall, capability, prior));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ext::{NoExtension, NpmExtension};
    use crate::repository::format::find;
    use serde_json::json;

    fn npm() -> ProxyDescriptor<NpmExtension> {
        ProxyDescriptor::new(find("npm").unwrap())
    }

    #[test]
    fn test_firewall_block_only_where_supported() {
        let schema = npm().schema();
        assert!(schema.attribute("firewall_audit_and_quarantine.pccs_enabled").is_some());

        let go = ProxyDescriptor::<NoExtension>::new(find("go").unwrap()).schema();
        assert!(go.attributes.contains_key("firewall_audit_and_quarantine"));
        assert!(go
            .attribute("firewall_audit_and_quarantine.pccs_enabled")
            .is_none());

        let raw = ProxyDescriptor::<NoExtension>::new(find("raw").unwrap()).schema();
        assert!(!raw.attributes.contains_key("firewall_audit_and_quarantine"));
    }

    #[test]
    fn test_plan_fills_proxy_defaults() {
        let change = npm().schema().plan(
            None,
            &json!({
                "name": "npm-proxy",
                "storage": {"blob_store_name": "default"},
                "proxy": {"remote_url": "https://registry.npmjs.org"}
            }),
        );
        assert!(!change.diagnostics.has_error());
        let planned = change.planned_state;
        assert_eq!(planned["negative_cache"], json!({"enabled": true, "time_to_live": 1440}));
        assert_eq!(planned["http_client"]["auto_block"], true);
        assert_eq!(planned["proxy"]["content_max_age"], 1440);
        assert_eq!(planned["npm"]["remove_quarantined"], false);
        assert!(planned["firewall_audit_and_quarantine"].is_null());
    }

    #[test]
    fn test_bearer_token_required() {
        let plan: ProxyRepositoryModel<NpmExtension> = serde_json::from_value(json!({
            "name": "npm-proxy",
            "http_client": {"authentication": {"type": "bearerToken"}}
        }))
        .unwrap();
        let diags = npm().validate(&plan);
        assert!(diags.has_error());
        assert!(diags.contains("bearer_token"));
    }

    #[test]
    fn test_capability_folds_into_state() {
        let mut state = ProxyRepositoryModel::<NpmExtension> {
            name: Attr::Known("npm-proxy".to_string()),
            ..Default::default()
        };
        let mut capability = CapabilityApi::new(firewall::CAPABILITY_TYPE);
        capability.id = Some("cap-1".to_string());
        capability.enabled = true;
        capability
            .properties
            .insert("repository".to_string(), "npm-proxy".to_string());
        capability
            .properties
            .insert("quarantine".to_string(), "true".to_string());

        npm().update_state_with_capability(&mut state, Some(&capability));
        let block = state.firewall_audit_and_quarantine.value().cloned().unwrap();
        assert_eq!(block.capability_id, Attr::Known("cap-1".to_string()));
        assert_eq!(block.quarantine, Attr::Known(true));

        npm().update_state_with_capability(&mut state, None);
        assert!(state.firewall_audit_and_quarantine.is_null());
        assert!(serde_json::to_value(&state)
            .unwrap()
            .get("firewall_audit_and_quarantine")
            .is_none());
    }
}
