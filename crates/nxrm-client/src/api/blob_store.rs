//! Blob store wire types and endpoints

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftQuota {
    /// `spaceUsedQuota` or `spaceRemainingQuota`
    #[serde(rename = "type")]
    pub kind: String,
    /// Limit in bytes
    pub limit: i64,
}

/// `file` blob store; reads do not echo the name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlobStoreApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBlobStoreApi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    #[serde(default)]
    pub members: Vec<String>,
    pub fill_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Bucket {
    pub region: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketEncryption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BucketSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Never echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Never echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3AdvancedBucketConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_path_style: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connection_pool_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BucketConfiguration {
    pub bucket: S3Bucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<BucketEncryption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_security: Option<S3BucketSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_bucket_connection: Option<S3AdvancedBucketConnection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BlobStoreApi {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    pub bucket_configuration: S3BucketConfiguration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsBucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsBucketSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    /// Never echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsBucketConfiguration {
    pub bucket: GcsBucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_security: Option<GcsBucketSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<BucketEncryption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsBlobStoreApi {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    pub bucket_configuration: GcsBucketConfiguration,
}

/// Entry of `GET /v1/blobstores`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobStoreSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub blob_count: i64,
    #[serde(default)]
    pub total_size_in_bytes: i64,
    #[serde(default)]
    pub available_space_in_bytes: i64,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub soft_quota: Option<SoftQuota>,
}

impl NxrmClient {
    /// `GET /v1/blobstores`
    pub async fn list_blob_stores(&self) -> Result<Vec<BlobStoreSummary>> {
        self.get_json("/v1/blobstores", "blob store list").await
    }

    /// `GET /v1/blobstores/{kind}/{name}`; `kind` is `file`, `s3`, `google` or `group`
    pub async fn get_blob_store<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T> {
        self.get_json(&format!("/v1/blobstores/{}/{}", kind, name), "blob store")
            .await
    }

    /// `POST /v1/blobstores/{kind}`
    pub async fn create_blob_store<B: Serialize>(
        &self,
        kind: &str,
        body: &B,
        success: &[u16],
    ) -> Result<()> {
        self.post_json(&format!("/v1/blobstores/{}", kind), body)
            .await?
            .expect(success)?;
        Ok(())
    }

    /// `PUT /v1/blobstores/{kind}/{name}`
    pub async fn update_blob_store<B: Serialize>(&self, kind: &str, name: &str, body: &B) -> Result<()> {
        self.put_json(&format!("/v1/blobstores/{}/{}", kind, name), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/blobstores/{name}`
    pub async fn delete_blob_store(&self, name: &str) -> Result<()> {
        self.delete(&format!("/v1/blobstores/{}", name))
            .await?
            .expect(&[204])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_file_blob_store_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/service/rest/v1/blobstores/file"))
            .and(body_json(json!({
                "name": "bs-a",
                "path": "/nexus-data/blobs/bs-a",
                "softQuota": {"type": "spaceUsedQuota", "limit": 1048576}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/blobstores/file/bs-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "path": "/nexus-data/blobs/bs-a",
                "softQuota": {"type": "spaceUsedQuota", "limit": 1048576}
            })))
            .mount(&server)
            .await;

        let client = NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap();
        let body = FileBlobStoreApi {
            name: Some("bs-a".to_string()),
            path: "/nexus-data/blobs/bs-a".to_string(),
            soft_quota: Some(SoftQuota {
                kind: "spaceUsedQuota".to_string(),
                limit: 1048576,
            }),
        };
        client.create_blob_store("file", &body, &[204]).await.unwrap();

        let read: FileBlobStoreApi = client.get_blob_store("file", "bs-a").await.unwrap();
        assert_eq!(read.name, None);
        assert_eq!(read.path, body.path);
        assert_eq!(read.soft_quota, body.soft_quota);
    }

    #[tokio::test]
    async fn test_delete_in_use_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/service/rest/v1/blobstores/default"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string("Blob store (default) is in use by 3 repositories"),
            )
            .mount(&server)
            .await;

        let client = NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap();
        let err = client.delete_blob_store("default").await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.message().contains("in use"));
    }
}
