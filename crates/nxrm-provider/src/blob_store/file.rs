//! `nxrm_blob_store_file`

use async_trait::async_trait;
use nxrm_client::{FileBlobStoreApi, Result as ClientResult};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema};
use serde::{Deserialize, Serialize};

use super::{common_attributes, last_updated_attribute, SoftQuotaModel};
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBlobStoreModel {
    pub name: Attr<String>,
    pub path: Attr<String>,
    pub soft_quota: Attr<SoftQuotaModel>,
    pub last_updated: Attr<String>,
}

impl FileBlobStoreModel {
    fn to_api(&self) -> FileBlobStoreApi {
        let name = self.name.known_or(String::new());
        FileBlobStoreApi {
            // The server derives the path from the name when none is given
            path: self.path.value().cloned().unwrap_or_else(|| name.clone()),
            name: Some(name),
            soft_quota: SoftQuotaModel::to_wire(&self.soft_quota),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileBlobStoreDescriptor;

#[async_trait]
impl ResourceDescriptor for FileBlobStoreDescriptor {
    type Model = FileBlobStoreModel;
    type Api = FileBlobStoreApi;

    fn type_name(&self) -> String {
        "nxrm_blob_store_file".to_string()
    }

    fn noun(&self) -> String {
        "File Blob Store".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new("A blob store on the server's file system.", common_attributes("blob store"))
            .with(attrs([(
                "path",
                Attribute::optional_computed(nxrm_core::AttributeType::String)
                    .use_state_for_unknown()
                    .describe("Absolute path, or relative to the data directory; defaults to the name"),
            )]))
            .with(last_updated_attribute())
    }

    fn identifier(&self, model: &FileBlobStoreModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut FileBlobStoreModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &FileBlobStoreModel) -> ClientResult<Option<String>> {
        ctx.client()
            .create_blob_store("file", &plan.to_api(), &[204])
            .await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &FileBlobStoreModel) -> ClientResult<FileBlobStoreApi> {
        ctx.client()
            .get_blob_store("file", &state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &FileBlobStoreModel,
        state: &FileBlobStoreModel,
    ) -> ClientResult<()> {
        ctx.client()
            .update_blob_store("file", &state.name.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &FileBlobStoreModel) -> ClientResult<()> {
        ctx.client()
            .delete_blob_store(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut FileBlobStoreModel, api: FileBlobStoreApi) -> Diagnostics {
        // Reads do not echo the name; the state keeps the one it has.
        if let Some(name) = api.name {
            state.name = Attr::Known(name);
        }
        state.path = Attr::Known(api.path);
        state.soft_quota = SoftQuotaModel::from_wire(api.soft_quota);
        Diagnostics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_defaults_to_name() {
        let model = FileBlobStoreModel {
            name: Attr::Known("bs-a".to_string()),
            path: Attr::Unknown,
            ..Default::default()
        };
        let api = model.to_api();
        assert_eq!(api.path, "bs-a");
        assert_eq!(api.name.as_deref(), Some("bs-a"));
        assert!(api.soft_quota.is_none());
    }

    #[test]
    fn test_read_keeps_name() {
        let mut state = FileBlobStoreModel {
            name: Attr::Known("bs-a".to_string()),
            ..Default::default()
        };
        FileBlobStoreDescriptor.update_state_from_api(
            &mut state,
            FileBlobStoreApi {
                name: None,
                path: "/nexus-data/blobs/bs-a".to_string(),
                soft_quota: None,
            },
        );
        assert_eq!(state.name, Attr::Known("bs-a".to_string()));
        assert_eq!(state.path, Attr::Known("/nexus-data/blobs/bs-a".to_string()));
        assert!(state.soft_quota.is_null());
    }
}
