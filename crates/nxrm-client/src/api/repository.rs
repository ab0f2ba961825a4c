//! Repository wire types and endpoints
//!
//! Request and response bodies share one record per role. The per-format
//! blocks (`maven`, `docker`, `aptSigning`, ...) are flattened in through the
//! role record's type parameter.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAttributes {
    pub blob_store_name: String,
    pub strict_content_type_validation: bool,
    /// Hosted repositories only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPolicyAttributes {
    #[serde(default)]
    pub policy_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAttributes {
    pub proprietary_components: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAttributes {
    pub remote_url: String,
    pub content_max_age: i64,
    pub metadata_max_age: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeCacheAttributes {
    pub enabled: bool,
    pub time_to_live: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_circular_redirects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cookies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_trust_store: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientAuthentication {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Never echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preemptive: Option<bool>,
    /// Never echoed back by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientAttributes {
    pub blocked: bool,
    pub auto_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<HttpClientConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<HttpClientAuthentication>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationAttributes {
    pub preemptive_pull_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path_regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAttributes {
    #[serde(default)]
    pub member_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable_member: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedRepositoryApi<X> {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupPolicyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentAttributes>,
    #[serde(default, skip_serializing)]
    pub format: Option<String>,
    #[serde(default, rename = "type", skip_serializing)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub format_attrs: X,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRepositoryApi<X> {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupPolicyAttributes>,
    pub proxy: ProxyAttributes,
    pub negative_cache: NegativeCacheAttributes,
    pub http_client: HttpClientAttributes,
    /// Written as `routingRule`, reported back as `routingRuleName`
    #[serde(
        default,
        rename(serialize = "routingRule", deserialize = "routingRuleName"),
        alias = "routingRule",
        skip_serializing_if = "Option::is_none"
    )]
    pub routing_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication: Option<ReplicationAttributes>,
    #[serde(default, skip_serializing)]
    pub format: Option<String>,
    #[serde(default, rename = "type", skip_serializing)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub format_attrs: X,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepositoryApi<X> {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    pub group: GroupAttributes,
    #[serde(default, skip_serializing)]
    pub format: Option<String>,
    #[serde(default, rename = "type", skip_serializing)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub format_attrs: X,
}

/// Entry of `GET /v1/repositories`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

// Per-format blocks

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenAttributes {
    pub version_policy: String,
    pub layout_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerAttributes {
    pub v1_enabled: bool,
    pub force_basic_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerProxyAttributes {
    pub index_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_foreign_layers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_layer_url_whitelist: Option<Vec<String>>,
}

/// npm and PyPI proxy block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineAttributes {
    pub remove_quarantined: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NugetProxyAttributes {
    pub query_cache_item_max_age: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YumAttributes {
    pub repodata_depth: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_policy: Option<String>,
}

/// `yumSigning` and `aptSigning`; neither value is echoed back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypair: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptAttributes {
    pub distribution: String,
    /// Proxy repositories only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConanProxyAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoAttributes {
    pub require_authentication: bool,
}

/// Format extension for the role records: the set of per-format blocks one
/// (format, role) pair sends and receives. Absent blocks are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatBlocks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<MavenAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_proxy: Option<DockerProxyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<QuarantineAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pypi: Option<QuarantineAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_proxy: Option<NugetProxyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum: Option<YumAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum_signing: Option<SigningAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<AptAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt_signing: Option<SigningAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan_proxy: Option<ConanProxyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<CargoAttributes>,
}

fn role_path(format: &str, role: &str) -> String {
    format!("/v1/repositories/{}/{}", format, role)
}

impl NxrmClient {
    /// `GET /v1/repositories`
    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>> {
        self.get_json("/v1/repositories", "repository list").await
    }

    /// `GET /v1/repositories/{format}/{role}/{name}`
    pub async fn get_repository<T: DeserializeOwned>(
        &self,
        format: &str,
        role: &str,
        name: &str,
    ) -> Result<T> {
        let path = format!("{}/{}", role_path(format, role), name);
        self.get_json(&path, "repository").await
    }

    /// `POST /v1/repositories/{format}/{role}`
    pub async fn create_repository<B: Serialize>(
        &self,
        format: &str,
        role: &str,
        body: &B,
        success: &[u16],
    ) -> Result<()> {
        self.post_json(&role_path(format, role), body)
            .await?
            .expect(success)?;
        Ok(())
    }

    /// `PUT /v1/repositories/{format}/{role}/{name}`
    pub async fn update_repository<B: Serialize>(
        &self,
        format: &str,
        role: &str,
        name: &str,
        body: &B,
    ) -> Result<()> {
        let path = format!("{}/{}", role_path(format, role), name);
        self.put_json(&path, body).await?.expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/repositories/{name}`
    pub async fn delete_repository(&self, name: &str) -> Result<()> {
        self.delete(&format!("/v1/repositories/{}", name))
            .await?
            .expect(&[204])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_routing_rule_asymmetry() {
        let read: ProxyRepositoryApi<FormatBlocks> = serde_json::from_value(json!({
            "name": "npm-proxy",
            "format": "npm",
            "type": "proxy",
            "url": "http://localhost:8081/repository/npm-proxy",
            "online": true,
            "storage": {"blobStoreName": "default", "strictContentTypeValidation": true},
            "proxy": {"remoteUrl": "https://registry.npmjs.org", "contentMaxAge": 1440, "metadataMaxAge": 1440},
            "negativeCache": {"enabled": true, "timeToLive": 1440},
            "httpClient": {"blocked": false, "autoBlock": true},
            "routingRuleName": "block-internal",
            "npm": {"removeQuarantined": true}
        }))
        .unwrap();

        assert_eq!(read.routing_rule.as_deref(), Some("block-internal"));
        assert_eq!(read.format.as_deref(), Some("npm"));
        assert!(read.format_attrs.npm.as_ref().unwrap().remove_quarantined);

        let mut write = read.clone();
        write.format_attrs = FormatBlocks::default();
        let body = serde_json::to_value(&write).unwrap();
        assert_eq!(body["routingRule"], "block-internal");
        assert!(body.get("routingRuleName").is_none());
        assert!(body.get("format").is_none());
        assert!(body.get("url").is_none());
        assert!(body.get("npm").is_none());
    }

    #[test]
    fn test_hosted_body_shape() {
        let body = HostedRepositoryApi {
            name: "maven-releases".to_string(),
            online: true,
            storage: StorageAttributes {
                blob_store_name: "default".to_string(),
                strict_content_type_validation: true,
                write_policy: Some("ALLOW_ONCE".to_string()),
            },
            format_attrs: FormatBlocks {
                maven: Some(MavenAttributes {
                    version_policy: "RELEASE".to_string(),
                    layout_policy: "STRICT".to_string(),
                    content_disposition: None,
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "maven-releases",
                "online": true,
                "storage": {
                    "blobStoreName": "default",
                    "strictContentTypeValidation": true,
                    "writePolicy": "ALLOW_ONCE"
                },
                "maven": {"versionPolicy": "RELEASE", "layoutPolicy": "STRICT"}
            })
        );
    }
}
