//! `nxrm_blob_store_s3`
//!
//! The secret access key and session token are write-only; reads keep the
//! declared values.

use async_trait::async_trait;
use nxrm_client::{
    BucketEncryption, Result as ClientResult, S3AdvancedBucketConnection, S3BlobStoreApi, S3Bucket,
    S3BucketConfiguration, S3BucketSecurity,
};
use nxrm_core::{attrs, block, Attr, Attribute, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{common_attributes, last_updated_attribute, non_empty, SoftQuotaModel};
use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

pub const S3_ENCRYPTION_TYPES: &[&str] = &["s3ManagedEncryption", "kmsManagedEncryption"];
pub const S3_SIGNER_TYPES: &[&str] = &["DEFAULT", "S3SignerType", "AWSS3V4SignerType"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BucketModel {
    pub region: Attr<String>,
    pub name: Attr<String>,
    pub prefix: Attr<String>,
    /// Days before deleted blobs are removed from the bucket
    pub expiration: Attr<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionModel {
    pub encryption_type: Attr<String>,
    pub encryption_key: Attr<String>,
}

impl EncryptionModel {
    pub(crate) fn to_wire(model: &Attr<EncryptionModel>) -> Option<BucketEncryption> {
        model.value().map(|e| BucketEncryption {
            encryption_type: e.encryption_type.to_option(),
            encryption_key: e.encryption_key.to_option(),
        })
    }

    pub(crate) fn from_wire(wire: Option<BucketEncryption>) -> Attr<EncryptionModel> {
        match wire {
            Some(e) if e.encryption_type.is_some() || e.encryption_key.is_some() => {
                Attr::Known(EncryptionModel {
                    encryption_type: non_empty(e.encryption_type),
                    encryption_key: non_empty(e.encryption_key),
                })
            }
            _ => Attr::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3SecurityModel {
    pub access_key_id: Attr<String>,
    pub secret_access_key: Attr<String>,
    pub role: Attr<String>,
    pub session_token: Attr<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3AdvancedModel {
    pub endpoint: Attr<String>,
    pub signer_type: Attr<String>,
    pub force_path_style: Attr<bool>,
    pub max_connection_pool_size: Attr<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BucketConfigurationModel {
    pub bucket: Attr<S3BucketModel>,
    pub encryption: Attr<EncryptionModel>,
    pub bucket_security: Attr<S3SecurityModel>,
    pub advanced_bucket_connection: Attr<S3AdvancedModel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BlobStoreModel {
    pub name: Attr<String>,
    pub soft_quota: Attr<SoftQuotaModel>,
    pub bucket_configuration: Attr<S3BucketConfigurationModel>,
    pub last_updated: Attr<String>,
}

impl S3BlobStoreModel {
    fn to_api(&self) -> S3BlobStoreApi {
        let config = self.bucket_configuration.value().cloned().unwrap_or_default();
        let bucket = config.bucket.value().cloned().unwrap_or_default();
        S3BlobStoreApi {
            name: self.name.known_or(String::new()),
            soft_quota: SoftQuotaModel::to_wire(&self.soft_quota),
            bucket_configuration: S3BucketConfiguration {
                bucket: S3Bucket {
                    region: bucket.region.known_or("DEFAULT".to_string()),
                    name: bucket.name.known_or(String::new()),
                    prefix: bucket.prefix.to_option(),
                    expiration: bucket.expiration.to_option(),
                },
                encryption: EncryptionModel::to_wire(&config.encryption),
                bucket_security: config.bucket_security.value().map(|s| S3BucketSecurity {
                    access_key_id: s.access_key_id.to_option(),
                    secret_access_key: s.secret_access_key.to_option(),
                    role: s.role.to_option(),
                    session_token: s.session_token.to_option(),
                }),
                advanced_bucket_connection: config.advanced_bucket_connection.value().map(|a| {
                    S3AdvancedBucketConnection {
                        endpoint: a.endpoint.to_option(),
                        signer_type: a.signer_type.to_option(),
                        force_path_style: a.force_path_style.to_option(),
                        max_connection_pool_size: a.max_connection_pool_size.to_option(),
                    }
                }),
            },
        }
    }
}

fn bucket_configuration_attribute() -> Attribute {
    Attribute::required(block(attrs([
        (
            "bucket",
            Attribute::required(block(attrs([
                (
                    "region",
                    Attribute::optional_string()
                        .default_value(json!("DEFAULT"))
                        .describe("AWS region; DEFAULT uses the server's configured region"),
                ),
                ("name", Attribute::required_string().requires_replace()),
                ("prefix", Attribute::optional_string()),
                (
                    "expiration",
                    Attribute::optional_int64()
                        .default_value(json!(3))
                        .validate(Validator::AtLeast(-1))
                        .describe("Days until deleted blobs are removed; -1 disables removal"),
                ),
            ]))),
        ),
        (
            "encryption",
            Attribute::optional(block(attrs([
                (
                    "encryption_type",
                    Attribute::optional_string().validate(Validator::one_of(S3_ENCRYPTION_TYPES)),
                ),
                ("encryption_key", Attribute::optional_string()),
            ]))),
        ),
        (
            "bucket_security",
            Attribute::optional(block(attrs([
                ("access_key_id", Attribute::optional_string()),
                ("secret_access_key", Attribute::optional_string().sensitive()),
                ("role", Attribute::optional_string()),
                ("session_token", Attribute::optional_string().sensitive()),
            ]))),
        ),
        (
            "advanced_bucket_connection",
            Attribute::optional(block(attrs([
                (
                    "endpoint",
                    Attribute::optional_string().validate(Validator::http_url()),
                ),
                (
                    "signer_type",
                    Attribute::optional_string().validate(Validator::one_of(S3_SIGNER_TYPES)),
                ),
                ("force_path_style", Attribute::optional_bool()),
                (
                    "max_connection_pool_size",
                    Attribute::optional_int64().validate(Validator::AtLeast(1)),
                ),
            ]))),
        ),
    ])))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct S3BlobStoreDescriptor;

#[async_trait]
impl ResourceDescriptor for S3BlobStoreDescriptor {
    type Model = S3BlobStoreModel;
    type Api = S3BlobStoreApi;

    fn type_name(&self) -> String {
        "nxrm_blob_store_s3".to_string()
    }

    fn noun(&self) -> String {
        "S3 Blob Store".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new("A blob store backed by an Amazon S3 bucket.", common_attributes("blob store"))
            .with(attrs([("bucket_configuration", bucket_configuration_attribute())]))
            .with(last_updated_attribute())
    }

    fn identifier(&self, model: &S3BlobStoreModel) -> Option<String> {
        model.name.to_option()
    }

    fn set_identifier(&self, model: &mut S3BlobStoreModel, id: String) {
        model.name = Attr::Known(id);
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &S3BlobStoreModel) -> ClientResult<Option<String>> {
        ctx.client()
            .create_blob_store("s3", &plan.to_api(), &[201])
            .await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &S3BlobStoreModel) -> ClientResult<S3BlobStoreApi> {
        ctx.client()
            .get_blob_store("s3", &state.name.known_or(String::new()))
            .await
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &S3BlobStoreModel,
        state: &S3BlobStoreModel,
    ) -> ClientResult<()> {
        ctx.client()
            .update_blob_store("s3", &state.name.known_or(String::new()), &plan.to_api())
            .await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &S3BlobStoreModel) -> ClientResult<()> {
        ctx.client()
            .delete_blob_store(&state.name.known_or(String::new()))
            .await
    }

    fn update_state_from_api(&self, state: &mut S3BlobStoreModel, api: S3BlobStoreApi) -> Diagnostics {
        let wire = api.bucket_configuration;
        let security = wire.bucket_security.map(|s| S3SecurityModel {
            access_key_id: non_empty(s.access_key_id),
            secret_access_key: non_empty(s.secret_access_key),
            role: non_empty(s.role),
            session_token: non_empty(s.session_token),
        });

        state.name = Attr::Known(api.name);
        state.soft_quota = SoftQuotaModel::from_wire(api.soft_quota);
        state.bucket_configuration = Attr::Known(S3BucketConfigurationModel {
            bucket: Attr::Known(S3BucketModel {
                region: Attr::Known(wire.bucket.region),
                name: Attr::Known(wire.bucket.name),
                prefix: non_empty(wire.bucket.prefix),
                expiration: Attr::from_option(wire.bucket.expiration),
            }),
            encryption: EncryptionModel::from_wire(wire.encryption),
            bucket_security: Attr::from_option(security),
            advanced_bucket_connection: Attr::from_option(wire.advanced_bucket_connection.map(|a| {
                S3AdvancedModel {
                    endpoint: non_empty(a.endpoint),
                    signer_type: non_empty(a.signer_type),
                    force_path_style: Attr::from_option(a.force_path_style),
                    max_connection_pool_size: Attr::from_option(a.max_connection_pool_size),
                }
            })),
        });
        Diagnostics::new()
    }

    fn map_missing_from_plan(&self, state: &mut S3BlobStoreModel, plan: &S3BlobStoreModel) {
        let declared = plan
            .bucket_configuration
            .value()
            .and_then(|c| c.bucket_security.value());
        let current = state
            .bucket_configuration
            .value_mut()
            .and_then(|c| c.bucket_security.value_mut());
        if let (Some(current), Some(declared)) = (current, declared) {
            current.secret_access_key.fill_from(&declared.secret_access_key);
            current.session_token.fill_from(&declared.session_token);
        }
    }
}
