//! `nxrm_anonymous_access`: the singleton anonymous access settings
//!
//! Deleting the resource disables anonymous access.

use async_trait::async_trait;
use nxrm_client::{AnonymousAccessApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Attribute, Diagnostic, Diagnostics, Schema};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

pub const ANONYMOUS_ID: &str = "anonymous";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymousAccessModel {
    pub id: Attr<String>,
    pub enabled: Attr<bool>,
    pub user_id: Attr<String>,
    pub realm_name: Attr<String>,
}

impl AnonymousAccessModel {
    fn to_api(&self) -> AnonymousAccessApi {
        AnonymousAccessApi {
            enabled: self.enabled.known_or(false),
            user_id: self.user_id.known_or("anonymous".to_string()),
            realm_name: self.realm_name.known_or("NexusAuthorizingRealm".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAccessDescriptor;

#[async_trait]
impl ResourceDescriptor for AnonymousAccessDescriptor {
    type Model = AnonymousAccessModel;
    type Api = AnonymousAccessApi;

    fn type_name(&self) -> String {
        "nxrm_anonymous_access".to_string()
    }

    fn noun(&self) -> String {
        "Anonymous Access".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Anonymous access settings.",
            attrs([
                ("id", Attribute::computed_string().use_state_for_unknown()),
                ("enabled", Attribute::required_bool()),
                (
                    "user_id",
                    Attribute::optional_string()
                        .default_value(json!("anonymous"))
                        .describe("User whose roles anonymous requests get"),
                ),
                (
                    "realm_name",
                    Attribute::optional_string().default_value(json!("NexusAuthorizingRealm")),
                ),
            ]),
        )
    }

    fn identifier_attribute(&self) -> &'static str {
        "id"
    }

    fn identifier(&self, model: &AnonymousAccessModel) -> Option<String> {
        model.id.to_option()
    }

    fn set_identifier(&self, model: &mut AnonymousAccessModel, id: String) {
        model.id = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &AnonymousAccessModel) -> ClientResult<Option<String>> {
        ctx.client().update_anonymous_access(&plan.to_api()).await?;
        Ok(Some(ANONYMOUS_ID.to_string()))
    }

    async fn do_read(&self, ctx: &ProviderContext, _state: &AnonymousAccessModel) -> ClientResult<AnonymousAccessApi> {
        ctx.client().get_anonymous_access().await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &AnonymousAccessModel,
        _state: &AnonymousAccessModel,
    ) -> ClientResult<()> {
        ctx.client().update_anonymous_access(&plan.to_api()).await?;
        Ok(())
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &AnonymousAccessModel) -> ClientResult<()> {
        let mut body = state.to_api();
        body.enabled = false;
        ctx.client().update_anonymous_access(&body).await?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<AnonymousAccessModel, Diagnostic> {
        Ok(AnonymousAccessModel {
            id: Attr::Known(ANONYMOUS_ID.to_string()),
            ..Default::default()
        })
    }

    fn update_state_from_api(&self, state: &mut AnonymousAccessModel, api: AnonymousAccessApi) -> Diagnostics {
        state.id = Attr::Known(ANONYMOUS_ID.to_string());
        state.enabled = Attr::Known(api.enabled);
        state.user_id = Attr::Known(api.user_id);
        state.realm_name = Attr::Known(api.realm_name);
        Diagnostics::new()
    }
}
