//! `nxrm_role`

use async_trait::async_trait;
use nxrm_client::{Result as ClientResult, RoleApi};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub privileges: Attr<Vec<String>>,
    pub roles: Attr<Vec<String>>,
    pub source: Attr<String>,
}

impl RoleModel {
    fn to_api(&self) -> RoleApi {
        RoleApi {
            id: self.id.known_or(String::new()),
            name: self.name.known_or(String::new()),
            description: self.description.to_option(),
            source: None,
            privileges: self.privileges.known_or(Vec::new()),
            roles: self.roles.known_or(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDescriptor;

#[async_trait]
impl ResourceDescriptor for RoleDescriptor {
    type Model = RoleModel;
    type Api = RoleApi;

    fn type_name(&self) -> String {
        "nxrm_role".to_string()
    }

    fn noun(&self) -> String {
        "Role".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A security role bundling privileges and other roles.",
            attrs([
                (
                    "id",
                    Attribute::required_string()
                        .requires_replace()
                        .validate(Validator::LengthAtLeast(1)),
                ),
                ("name", Attribute::required_string()),
                ("description", Attribute::optional_string()),
                (
                    "privileges",
                    Attribute::optional(Attribute::string_set()).describe("Privilege names"),
                ),
                (
                    "roles",
                    Attribute::optional(Attribute::string_set()).describe("Contained role ids"),
                ),
                (
                    "source",
                    Attribute::computed_string()
                        .use_state_for_unknown()
                        .describe("Realm the role comes from"),
                ),
            ]),
        )
    }

    fn identifier_attribute(&self) -> &'static str {
        "id"
    }

    fn identifier(&self, model: &RoleModel) -> Option<String> {
        model.id.to_option()
    }

    fn set_identifier(&self, model: &mut RoleModel, id: String) {
        model.id = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &RoleModel) -> ClientResult<Option<String>> {
        ctx.client().create_role(&plan.to_api()).await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &RoleModel) -> ClientResult<RoleApi> {
        ctx.client().get_role(&state.id.known_or(String::new())).await
    }

    async fn do_update(&self, ctx: &ProviderContext, plan: &RoleModel, state: &RoleModel) -> ClientResult<()> {
        ctx.client()
            .update_role(&state.id.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &RoleModel) -> ClientResult<()> {
        ctx.client().delete_role(&state.id.known_or(String::new())).await
    }

    fn update_state_from_api(&self, state: &mut RoleModel, api: RoleApi) -> Diagnostics {
        state.id = Attr::Known(api.id);
        state.name = Attr::Known(api.name);
        state.description = Attr::from_option(api.description.filter(|d| !d.is_empty()));
        state.privileges = state.privileges.observe_set(api.privileges);
        state.roles = state.roles.observe_set(api.roles);
        state.source = Attr::from_option(api.source);
        Diagnostics::new()
    }
}
