//! `nxrm_content_selector`

use async_trait::async_trait;
use nxrm_client::{ContentSelectorApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSelectorModel {
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub expression: Attr<String>,
}

impl ContentSelectorModel {
    fn to_api(&self) -> ContentSelectorApi {
        ContentSelectorApi {
            name: self.name.known_or(String::new()),
            kind: None,
            description: self.description.to_option(),
            expression: self.expression.known_or(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSelectorDescriptor;

#[async_trait]
impl ResourceDescriptor for ContentSelectorDescriptor {
    type Model = ContentSelectorModel;
    type Api = ContentSelectorApi;

    fn type_name(&self) -> String {
        "nxrm_content_selector".to_string()
    }

    fn noun(&self) -> String {
        "Content Selector".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A CSEL expression selecting content for privileges.",
            attrs([
                (
                    "name",
                    Attribute::required_string()
                        .requires_replace()
                        .validate(Validator::matches(
                            r"^[a-zA-Z0-9\-]{1}[a-zA-Z0-9_\-\.]*$",
                            "may only contain letters, digits, underscores, hyphens and dots and may not start with an underscore or dot",
                        )),
                ),
                ("description", Attribute::optional_string()),
                (
                    "expression",
                    Attribute::required_string().describe("e.g. format == \"maven2\" and path =^ \"/org/\""),
                ),
            ]),
        )
    }

    fn identifier(&self, model: &ContentSelectorModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut ContentSelectorModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &ContentSelectorModel) -> ClientResult<Option<String>> {
        ctx.client().create_content_selector(&plan.to_api()).await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &ContentSelectorModel) -> ClientResult<ContentSelectorApi> {
        ctx.client()
            .get_content_selector(&state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &ContentSelectorModel,
        _state: &ContentSelectorModel,
    ) -> ClientResult<()> {
        ctx.client().update_content_selector(&plan.to_api()).await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &ContentSelectorModel) -> ClientResult<()> {
        ctx.client()
            .delete_content_selector(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut ContentSelectorModel, api: ContentSelectorApi) -> Diagnostics {
        state.name = Attr::Known(api.name);
        state.description = Attr::from_option(api.description.filter(|d| !d.is_empty()));
        state.expression = Attr::Known(api.expression);
        Diagnostics::new()
    }
}
