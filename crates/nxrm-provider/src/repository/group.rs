//! Group repositories: one URL over an ordered list of member repositories

use std::marker::PhantomData;

use async_trait::async_trait;
use nxrm_client::{FormatBlocks, GroupRepositoryApi, RepositorySummary, Result as ClientResult};
use nxrm_core::{attrs, Attr, Diagnostic, Diagnostics, FieldGate, Schema};
use serde::{Deserialize, Serialize};

use super::common::{
    group_attribute, identity_attributes, last_updated_attribute, storage_attribute,
    GroupMembersModel, StorageModel,
};
use super::ext::FormatExtension;
use super::format::{Format, Role};
use super::reported_format;
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;
use crate::mapping::{self, Operation};

const ROLE: Role = Role::Group;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRepositoryModel<X> {
    pub name: Attr<String>,
    pub online: Attr<bool>,
    pub format: Attr<String>,
    #[serde(rename = "type")]
    pub kind: Attr<String>,
    pub url: Attr<String>,
    pub storage: Attr<StorageModel>,
    pub group: Attr<GroupMembersModel>,
    #[serde(flatten)]
    pub ext: X,
    pub last_updated: Attr<String>,
}

impl<X: FormatExtension> GroupRepositoryModel<X> {
    fn to_api(&self) -> GroupRepositoryApi<FormatBlocks> {
        GroupRepositoryApi {
            name: self.name.known_or(String::new()),
            online: self.online.known_or(true),
            storage: StorageModel::to_wire(&self.storage, ROLE),
            group: GroupMembersModel::to_wire(&self.group),
            format_attrs: self.ext.to_wire(ROLE),
            ..Default::default()
        }
    }
}

/// Problems with a group's member list, given the server's repositories
pub fn check_members(format: &Format, members: &[String], repositories: &[RepositorySummary]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for member in members {
        match repositories.iter().find(|r| &r.name == member) {
            None => diags.push(
                Diagnostic::error(
                    "Unknown group member",
                    format!("Repository \"{}\" does not exist.", member),
                )
                .at("group.member_names"),
            ),
            Some(repo) if repo.format != format.wire => diags.push(
                Diagnostic::error(
                    "Group member has the wrong format",
                    format!(
                        "Repository \"{}\" is a {} repository; members of a {} group must be {} repositories.",
                        member, repo.format, format.title, format.wire
                    ),
                )
                .at("group.member_names"),
            ),
            Some(_) => {}
        }
    }
    diags
}

/// Descriptor for `nxrm_repository_<format>_group`
#[derive(Debug)]
pub struct GroupDescriptor<X> {
    format: &'static Format,
    _ext: PhantomData<fn() -> X>,
}

impl<X> GroupDescriptor<X> {
    pub fn new(format: &'static Format) -> Self {
        Self {
            format,
            _ext: PhantomData,
        }
    }
}

#[async_trait]
impl<X: FormatExtension> ResourceDescriptor for GroupDescriptor<X> {
    type Model = GroupRepositoryModel<X>;
    type Api = GroupRepositoryApi<FormatBlocks>;

    fn type_name(&self) -> String {
        self.format.resource_name(ROLE)
    }

    fn noun(&self) -> String {
        self.format.noun(ROLE)
    }

    fn schema(&self) -> Schema {
        Schema::new(
            format!(
                "A {} group repository serving its members under one URL.",
                self.format.title
            ),
            identity_attributes(),
        )
        .with(attrs([
            ("storage", storage_attribute(ROLE)),
            ("group", group_attribute(self.format.group_deploy)),
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

    fn validate(&self, plan: &Self::Model) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(group) = plan.group.value() else {
            return diags;
        };
        if let (Some(writable), Some(members)) = (group.writable_member.value(), group.member_names.value()) {
            if !members.contains(writable) {
                diags.push(
                    Diagnostic::error(
                        "Invalid writable member",
                        format!("group.writable_member \"{}\" must be one of group.member_names.", writable),
                    )
                    .at("group.writable_member"),
                );
            }
        }
        diags
    }

    async fn pre_apply_checks(&self, ctx: &ProviderContext, plan: &Self::Model) -> Diagnostics {
        let Some(members) = plan.group.value().and_then(|g| g.member_names.value()) else {
            return Diagnostics::new();
        };
        match ctx.client().list_repositories().await {
            Ok(repositories) => check_members(self.format, members, &repositories),
            Err(e) => mapping::api_error(Operation::Read, "Repository List", &e).into(),
        }
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
        state.group = GroupMembersModel::from_wire(api.group);
        state.ext.update_from_wire(api.format_attrs, ROLE);
        diags
    }

    fn map_missing_from_plan(&self, state: &mut Self::Model, plan: &Self::Model) {
        state.ext.restore_from_plan(&plan.ext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ext::{DockerExtension, MavenExtension};
    use crate::repository::format::find;
    use serde_json::json;

    fn summary(name: &str, format: &str) -> RepositorySummary {
        RepositorySummary {
            name: name.to_string(),
            format: format.to_string(),
            kind: "hosted".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_members() {
        let maven = find("maven").unwrap();
        let repositories = vec![summary("maven-releases", "maven2"), summary("npm-hosted", "npm")];
        let members = vec![
            "maven-releases".to_string(),
            "npm-hosted".to_string(),
            "missing".to_string(),
        ];
        let diags = check_members(maven, &members, &repositories);
        assert_eq!(diags.errors().count(), 2);
        assert!(diags.contains("\"missing\" does not exist"));
        assert!(diags.contains("npm repository"));

        assert!(check_members(maven, &members[..1], &repositories).is_empty());
    }

    #[test]
    fn test_writable_member_must_be_a_member() {
        let docker = GroupDescriptor::<DockerExtension>::new(find("docker").unwrap());
        assert!(docker.schema().attribute("group.writable_member").is_some());

        let plan: GroupRepositoryModel<DockerExtension> = serde_json::from_value(json!({
            "name": "docker-group",
            "group": {"member_names": ["docker-hosted"], "writable_member": "docker-other"}
        }))
        .unwrap();
        assert!(docker.validate(&plan).contains("writable_member"));

        let maven = GroupDescriptor::<MavenExtension>::new(find("maven").unwrap());
        assert!(maven.schema().attribute("group.writable_member").is_none());
        assert!(!maven.schema().attributes.contains_key("maven"));
    }

    #[test]
    fn test_member_order_preserved() {
        let plan: GroupRepositoryModel<MavenExtension> = serde_json::from_value(json!({
            "name": "maven-public",
            "storage": {"blob_store_name": "default", "strict_content_type_validation": true},
            "group": {"member_names": ["maven-releases", "maven-central"]}
        }))
        .unwrap();
        let body = serde_json::to_value(plan.to_api()).unwrap();
        assert_eq!(body["group"]["memberNames"], json!(["maven-releases", "maven-central"]));
        assert!(body["storage"].get("writePolicy").is_none());
        assert!(body.get("maven").is_none());
    }
}
