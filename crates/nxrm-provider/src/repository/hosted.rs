//! Hosted repositories: content uploaded to and served from this server

use std::marker::PhantomData;

use async_trait::async_trait;
use nxrm_client::{FormatBlocks, HostedRepositoryApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Diagnostics, FieldGate, Schema};
use serde::{Deserialize, Serialize};

use super::common::{
    cleanup_attribute, component_attribute, identity_attributes, last_updated_attribute,
    storage_attribute, CleanupModel, ComponentModel, StorageModel,
};
use super::ext::FormatExtension;
use super::format::{Format, Role};
use super::reported_format;
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

const ROLE: Role = Role::Hosted;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedRepositoryModel<X> {
    pub name: Attr<String>,
    pub online: Attr<bool>,
    pub format: Attr<String>,
    #[serde(rename = "type")]
    pub kind: Attr<String>,
    pub url: Attr<String>,
    pub storage: Attr<StorageModel>,
    pub cleanup: Attr<CleanupModel>,
    pub component: Attr<ComponentModel>,
    #[serde(flatten)]
    pub ext: X,
    pub last_updated: Attr<String>,
}

impl<X: FormatExtension> HostedRepositoryModel<X> {
    fn to_api(&self) -> HostedRepositoryApi<FormatBlocks> {
        HostedRepositoryApi {
            name: self.name.known_or(String::new()),
            online: self.online.known_or(true),
            storage: StorageModel::to_wire(&self.storage, ROLE),
            cleanup: CleanupModel::to_wire(&self.cleanup),
            component: ComponentModel::to_wire(&self.component),
            format_attrs: self.ext.to_wire(ROLE),
            ..Default::default()
        }
    }
}

/// Descriptor for `nxrm_repository_<format>_hosted`
#[derive(Debug)]
pub struct HostedDescriptor<X> {
    format: &'static Format,
    _ext: PhantomData<fn() -> X>,
}

impl<X> HostedDescriptor<X> {
    pub fn new(format: &'static Format) -> Self {
        Self {
            format,
            _ext: PhantomData,
        }
    }
}

#[async_trait]
impl<X: FormatExtension> ResourceDescriptor for HostedDescriptor<X> {
    type Model = HostedRepositoryModel<X>;
    type Api = HostedRepositoryApi<FormatBlocks>;

    fn type_name(&self) -> String {
        self.format.resource_name(ROLE)
    }

    fn noun(&self) -> String {
        self.format.noun(ROLE)
    }

    fn schema(&self) -> Schema {
        Schema::new(
            format!(
                "A {} hosted repository storing uploaded components.",
                self.format.title
            ),
            identity_attributes(),
        )
        .with(attrs([
            ("storage", storage_attribute(ROLE)),
            ("cleanup", cleanup_attribute()),
            ("component", component_attribute()),
        ]))
        .with(X::attributes(ROLE))
        .with(last_updated_attribute())
    }

    fn identifier(&self, model: &Self::Model) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut Self::Model, id: String) {
        model.name = Attr::Known(id);
    }

    fn field_gates(&self) -> Vec<FieldGate> {
        X::field_gates(ROLE)
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
        state.component = ComponentModel::from_wire(api.component);
        state.ext.update_from_wire(api.format_attrs, ROLE);
        diags
    }

    fn map_missing_from_plan(&self, state: &mut Self::Model, plan: &Self::Model) {
        state.ext.restore_from_plan(&plan.ext);
    }
}
