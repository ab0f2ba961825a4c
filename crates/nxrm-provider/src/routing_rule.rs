//! `nxrm_routing_rule`: path matchers that allow or block proxy requests

use async_trait::async_trait;
use nxrm_client::{Result as ClientResult, RoutingRuleApi};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

pub const ROUTING_RULE_MODES: &[&str] = &["ALLOW", "BLOCK"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRuleModel {
    pub name: Attr<String>,
    pub description: Attr<String>,
    pub mode: Attr<String>,
    pub matchers: Attr<Vec<String>>,
}

impl RoutingRuleModel {
    fn to_api(&self) -> RoutingRuleApi {
        RoutingRuleApi {
            name: self.name.known_or(String::new()),
            description: self.description.to_option(),
            mode: self.mode.known_or("BLOCK".to_string()),
            matchers: self.matchers.known_or(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingRuleDescriptor;

#[async_trait]
impl ResourceDescriptor for RoutingRuleDescriptor {
    type Model = RoutingRuleModel;
    type Api = RoutingRuleApi;

    fn type_name(&self) -> String {
        "nxrm_routing_rule".to_string()
    }

    fn noun(&self) -> String {
        "Routing Rule".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A routing rule restricting which paths a repository will serve.",
            attrs([
                ("name", Attribute::required_string().requires_replace()),
                ("description", Attribute::optional_string()),
                (
                    "mode",
                    Attribute::optional_string()
                        .default_value(json!("BLOCK"))
                        .validate(Validator::one_of(ROUTING_RULE_MODES))
                        .describe("ALLOW serves only matching paths, BLOCK refuses them"),
                ),
                (
                    "matchers",
                    Attribute::required(Attribute::string_list())
                        .validate(Validator::NotEmpty)
                        .describe("Regular expressions matched against the request path"),
                ),
            ]),
        )
    }

    fn identifier(&self, model: &RoutingRuleModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut RoutingRuleModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &RoutingRuleModel) -> ClientResult<Option<String>> {
        ctx.client().create_routing_rule(&plan.to_api()).await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &RoutingRuleModel) -> ClientResult<RoutingRuleApi> {
        ctx.client()
            .get_routing_rule(&state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &RoutingRuleModel,
        state: &RoutingRuleModel,
    ) -> ClientResult<()> {
        ctx.client()
            .update_routing_rule(&state.name.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &RoutingRuleModel) -> ClientResult<()> {
        ctx.client()
            .delete_routing_rule(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut RoutingRuleModel, api: RoutingRuleApi) -> Diagnostics {
        state.name = Attr::Known(api.name);
        state.description = Attr::from_option(api.description.filter(|d| !d.is_empty()));
        state.mode = Attr::Known(api.mode);
        state.matchers = Attr::Known(api.matchers);
        Diagnostics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_block() {
        let model = RoutingRuleModel {
            name: Attr::Known("no-snapshots".to_string()),
            matchers: Attr::Known(vec![".*-SNAPSHOT.*".to_string()]),
            ..Default::default()
        };
        let api = model.to_api();
        assert_eq!(api.mode, "BLOCK");
        assert_eq!(api.description, None);
    }

    #[test]
    fn test_empty_description_reads_as_null() {
        let mut state = RoutingRuleModel::default();
        RoutingRuleDescriptor.update_state_from_api(
            &mut state,
            RoutingRuleApi {
                name: "r".to_string(),
                description: Some(String::new()),
                mode: "ALLOW".to_string(),
                matchers: vec!["^/org/.*".to_string()],
            },
        );
        assert!(state.description.is_null());
        assert_eq!(state.mode, Attr::Known("ALLOW".to_string()));
    }
}
