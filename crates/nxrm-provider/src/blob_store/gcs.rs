//! `nxrm_blob_store_gcs`
//!
//! The upstream endpoints call this kind `google`.

use async_trait::async_trait;
use nxrm_client::{
    GcsBlobStoreApi, GcsBucket, GcsBucketConfiguration, GcsBucketSecurity, Result as ClientResult,
};
use nxrm_core::{attrs, block, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};

use super::s3::EncryptionModel;
use super::{common_attributes, last_updated_attribute, non_empty, SoftQuotaModel};
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

const KIND: &str = "google";

pub const GCS_AUTHENTICATION_METHODS: &[&str] = &["applicationDefault", "accountKey"];
pub const GCS_ENCRYPTION_TYPES: &[&str] = &["default", "kmsManagedEncryption"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsBucketModel {
    pub name: Attr<String>,
    pub prefix: Attr<String>,
    pub region: Attr<String>,
    pub project_id: Attr<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsSecurityModel {
    pub authentication_method: Attr<String>,
    /// JSON service account key
    pub account_key: Attr<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsBucketConfigurationModel {
    pub bucket: Attr<GcsBucketModel>,
    pub bucket_security: Attr<GcsSecurityModel>,
    pub encryption: Attr<EncryptionModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsBlobStoreModel {
    pub name: Attr<String>,
    pub soft_quota: Attr<SoftQuotaModel>,
    pub bucket_configuration: Attr<GcsBucketConfigurationModel>,
    pub last_updated: Attr<String>,
}

impl GcsBlobStoreModel {
    fn to_api(&self) -> GcsBlobStoreApi {
        let config = self.bucket_configuration.value().cloned().unwrap_or_default();
        let bucket = config.bucket.value().cloned().unwrap_or_default();
        GcsBlobStoreApi {
            name: self.name.known_or(String::new()),
            soft_quota: SoftQuotaModel::to_wire(&self.soft_quota),
            bucket_configuration: GcsBucketConfiguration {
                bucket: GcsBucket {
                    name: bucket.name.known_or(String::new()),
                    prefix: bucket.prefix.to_option(),
                    region: bucket.region.to_option(),
                    project_id: bucket.project_id.to_option(),
                },
                bucket_security: config.bucket_security.value().map(|s| GcsBucketSecurity {
                    authentication_method: s.authentication_method.to_option(),
                    account_key: s.account_key.to_option(),
                }),
                encryption: EncryptionModel::to_wire(&config.encryption),
            },
        }
    }
}

fn bucket_configuration_attribute() -> Attribute {
    Attribute::required(block(attrs([
        (
            "bucket",
            Attribute::required(block(attrs([
                ("name", Attribute::required_string().requires_replace()),
                ("prefix", Attribute::optional_string()),
                ("region", Attribute::optional_string()),
                ("project_id", Attribute::optional_string()),
            ]))),
        ),
        (
            "bucket_security",
            Attribute::optional(block(attrs([
                (
                    "authentication_method",
                    Attribute::optional_string().validate(Validator::one_of(GCS_AUTHENTICATION_METHODS)),
                ),
                ("account_key", Attribute::optional_string().sensitive()),
            ]))),
        ),
        (
            "encryption",
            Attribute::optional(block(attrs([
                (
                    "encryption_type",
                    Attribute::optional_string().validate(Validator::one_of(GCS_ENCRYPTION_TYPES)),
                ),
                ("encryption_key", Attribute::optional_string()),
            ]))),
        ),
    ])))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GcsBlobStoreDescriptor;

#[async_trait]
impl ResourceDescriptor for GcsBlobStoreDescriptor {
    type Model = GcsBlobStoreModel;
    type Api = GcsBlobStoreApi;

    fn type_name(&self) -> String {
        "nxrm_blob_store_gcs".to_string()
    }

    fn noun(&self) -> String {
        "Google Cloud Blob Store".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A blob store backed by a Google Cloud Storage bucket.",
            common_attributes("blob store"),
        )
        .with(attrs([("bucket_configuration", bucket_configuration_attribute())]))
        .with(last_updated_attribute())
    }

    fn identifier(&self, model: &GcsBlobStoreModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut GcsBlobStoreModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &GcsBlobStoreModel) -> ClientResult<Option<String>> {
        ctx.client()
            .create_blob_store(KIND, &plan.to_api(), &[201])
            .await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &GcsBlobStoreModel) -> ClientResult<GcsBlobStoreApi> {
        ctx.client()
            .get_blob_store(KIND, &state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &GcsBlobStoreModel,
        state: &GcsBlobStoreModel,
    ) -> ClientResult<()> {
        ctx.client()
            .update_blob_store(KIND, &state.name.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &GcsBlobStoreModel) -> ClientResult<()> {
        ctx.client()
            .delete_blob_store(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut GcsBlobStoreModel, api: GcsBlobStoreApi) -> Diagnostics {
        let wire = api.bucket_configuration;
        state.name = Attr::Known(api.name);
        state.soft_quota = SoftQuotaModel::from_wire(api.soft_quota);
        state.bucket_configuration = Attr::Known(GcsBucketConfigurationModel {
            bucket: Attr::Known(GcsBucketModel {
                name: Attr::Known(wire.bucket.name),
                prefix: non_empty(wire.bucket.prefix),
                region: non_empty(wire.bucket.region),
                project_id: non_empty(wire.bucket.project_id),
            }),
            bucket_security: Attr::from_option(wire.bucket_security.map(|s| GcsSecurityModel {
                authentication_method: non_empty(s.authentication_method),
                account_key: non_empty(s.account_key),
            })),
            encryption: EncryptionModel::from_wire(wire.encryption),
        });
        Diagnostics::new()
    }

    fn map_missing_from_plan(&self, state: &mut GcsBlobStoreModel, plan: &GcsBlobStoreModel) {
        let declared = plan
            .bucket_configuration
            .value()
            .and_then(|c| c.bucket_security.value());
        let current = state
            .bucket_configuration
            .value_mut()
            .and_then(|c| c.bucket_security.value_mut());
        if let (Some(current), Some(declared)) = (current, declared) {
            current.account_key.fill_from(&declared.account_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_key_survives_read() {
        let plan: GcsBlobStoreModel = serde_json::from_value(json!({
            "name": "gcs-a",
            "bucket_configuration": {
                "bucket": {"name": "artifacts", "region": "us-central1"},
                "bucket_security": {"authentication_method": "accountKey", "account_key": "{\"type\":\"service_account\"}"}
            }
        }))
        .unwrap();

        let mut api = plan.to_api();
        assert_eq!(
            serde_json::to_value(&api).unwrap()["bucketConfiguration"]["bucketSecurity"]["authenticationMethod"],
            "accountKey"
        );
        if let Some(security) = api.bucket_configuration.bucket_security.as_mut() {
            security.account_key = None;
        }

        let mut state = plan.clone();
        GcsBlobStoreDescriptor.update_state_from_api(&mut state, api);
        GcsBlobStoreDescriptor.map_missing_from_plan(&mut state, &plan);
        let security = state
            .bucket_configuration
            .value()
            .and_then(|c| c.bucket_security.value())
            .cloned()
            .unwrap();
        assert!(security.account_key.is_known());
        assert_eq!(security.authentication_method, Attr::Known("accountKey".to_string()));
    }
}
