//! `nxrm_security_realms`: the ordered list of active realms
//!
//! A singleton. Deleting it restores the server's default realm list.

use async_trait::async_trait;
use nxrm_client::Result as ClientResult;
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

/// Identifier of the singleton
pub const REALMS_ID: &str = "realms";

/// Active realms of a fresh server
pub const DEFAULT_REALMS: &[&str] = &["NexusAuthenticatingRealm"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmsModel {
    pub id: Attr<String>,
    pub active: Attr<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealmsDescriptor;

#[async_trait]
impl ResourceDescriptor for RealmsDescriptor {
    type Model = RealmsModel;
    type Api = Vec<String>;

    fn type_name(&self) -> String {
        "nxrm_security_realms".to_string()
    }

    fn noun(&self) -> String {
        "Security Realms".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Active security realms, in evaluation order.",
            attrs([
                ("id", Attribute::computed_string().use_state_for_unknown()),
                (
                    "active",
                    Attribute::required(Attribute::string_list())
                        .validate(Validator::NotEmpty)
                        .describe("Realm ids, first evaluated first"),
                ),
            ]),
        )
    }

    fn identifier_attribute(&self) -> &'static str {
        "id"
    }

    fn identifier(&self, model: &RealmsModel) -> Option<String> {
        model.id.to_option()
    }

    fn set_identifier(&self, model: &mut RealmsModel, id: String) {
        model.id = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &RealmsModel) -> ClientResult<Option<String>> {
        ctx.client()
            .set_active_realms(&plan.active.known_or(Vec::new()))
            .await?;
        Ok(Some(REALMS_ID.to_string()))
    }

    async fn do_read(&self, ctx: &ProviderContext, _state: &RealmsModel) -> ClientResult<Vec<String>> {
        ctx.client().get_active_realms().await
    }

    async fn do_update(&self, ctx: &ProviderContext, plan: &RealmsModel, _state: &RealmsModel) -> ClientResult<()> {
        ctx.client()
            .set_active_realms(&plan.active.known_or(Vec::new()))
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, _state: &RealmsModel) -> ClientResult<()> {
        let defaults: Vec<String> = DEFAULT_REALMS.iter().map(|r| r.to_string()).collect();
        ctx.client().set_active_realms(&defaults).await
    }

    fn import_model(&self, _id: &str) -> Result<RealmsModel, nxrm_core::Diagnostic> {
        Ok(RealmsModel {
            id: Attr::Known(REALMS_ID.to_string()),
            ..Default::default()
        })
    }

    fn update_state_from_api(&self, state: &mut RealmsModel, api: Vec<String>) -> Diagnostics {
        state.id = Attr::Known(REALMS_ID.to_string());
        state.active = Attr::Known(api);
        Diagnostics::new()
    }
}
