//! `nxrm_blob_store_group`: an ordered set of member blob stores

use async_trait::async_trait;
use nxrm_client::{GroupBlobStoreApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{common_attributes, last_updated_attribute, SoftQuotaModel};
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

pub const FILL_POLICIES: &[&str] = &["roundRobin", "writeToFirst"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupBlobStoreModel {
    pub name: Attr<String>,
    pub soft_quota: Attr<SoftQuotaModel>,
    pub fill_policy: Attr<String>,
    pub members: Attr<Vec<String>>,
    pub last_updated: Attr<String>,
}

impl GroupBlobStoreModel {
    fn to_api(&self) -> GroupBlobStoreApi {
        GroupBlobStoreApi {
            name: self.name.to_option(),
            soft_quota: SoftQuotaModel::to_wire(&self.soft_quota),
            members: self.members.known_or(Vec::new()),
            fill_policy: self.fill_policy.known_or("roundRobin".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupBlobStoreDescriptor;

#[async_trait]
impl ResourceDescriptor for GroupBlobStoreDescriptor {
    type Model = GroupBlobStoreModel;
    type Api = GroupBlobStoreApi;

    fn type_name(&self) -> String {
        "nxrm_blob_store_group".to_string()
    }

    fn noun(&self) -> String {
        "Group Blob Store".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A blob store spreading writes over member blob stores.",
            common_attributes("blob store group"),
        )
        .with(attrs([
            (
                "fill_policy",
                Attribute::optional_string()
                    .default_value(json!("roundRobin"))
                    .validate(Validator::one_of(FILL_POLICIES)),
            ),
            (
                "members",
                Attribute::required(Attribute::string_list())
                    .validate(Validator::NotEmpty)
                    .describe("Member blob store names, in order"),
            ),
        ]))
        .with(last_updated_attribute())
    }

    fn identifier(&self, model: &GroupBlobStoreModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut GroupBlobStoreModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &GroupBlobStoreModel) -> ClientResult<Option<String>> {
        ctx.client()
            .create_blob_store("group", &plan.to_api(), &[204])
            .await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &GroupBlobStoreModel) -> ClientResult<GroupBlobStoreApi> {
        ctx.client()
            .get_blob_store("group", &state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &GroupBlobStoreModel,
        state: &GroupBlobStoreModel,
    ) -> ClientResult<()> {
        ctx.client()
            .update_blob_store("group", &state.name.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &GroupBlobStoreModel) -> ClientResult<()> {
        ctx.client()
            .delete_blob_store(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut GroupBlobStoreModel, api: GroupBlobStoreApi) -> Diagnostics {
        if let Some(name) = api.name {
            state.name = Attr::Known(name);
        }
        state.soft_quota = SoftQuotaModel::from_wire(api.soft_quota);
        state.fill_policy = Attr::Known(api.fill_policy);
        state.members = Attr::Known(api.members);
        Diagnostics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_members_rejected_at_plan() {
        let schema = GroupBlobStoreDescriptor.schema();
        let diags = schema.validate_config(&json!({"name": "grp", "members": []}));
        assert!(diags.has_error());
        assert!(diags.contains("members"));
    }

    #[test]
    fn test_body_keeps_member_order() {
        let model = GroupBlobStoreModel {
            name: Attr::Known("grp".to_string()),
            members: Attr::Known(vec!["b".to_string(), "a".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(model.to_api()).unwrap(),
            json!({"name": "grp", "members": ["b", "a"], "fillPolicy": "roundRobin"})
        );
    }
}
