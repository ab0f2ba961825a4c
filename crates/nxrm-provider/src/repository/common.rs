//! Records and schema fragments shared by the repository roles

use nxrm_client::{
    CleanupPolicyAttributes, ComponentAttributes, GroupAttributes, HttpClientAttributes,
    HttpClientAuthentication, HttpClientConnection, NegativeCacheAttributes, ProxyAttributes,
    ReplicationAttributes, StorageAttributes,
};
use nxrm_core::{attrs, block, Attr, Attribute, AttributeType, Attributes, Diagnostic, Diagnostics, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::format::Role;

pub const WRITE_POLICIES: &[&str] = &["ALLOW", "ALLOW_ONCE", "DENY", "REPLICATION_ONLY"];
pub const AUTHENTICATION_TYPES: &[&str] = &["username", "ntlm", "bearerToken"];

/// Empty strings on the wire mean "not set"
pub(crate) fn non_empty(value: Option<String>) -> Attr<String> {
    Attr::from_option(value.filter(|v| !v.is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageModel {
    pub blob_store_name: Attr<String>,
    pub strict_content_type_validation: Attr<bool>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub write_policy: Attr<String>,
}

impl StorageModel {
    pub fn to_wire(model: &Attr<StorageModel>, role: Role) -> StorageAttributes {
        let storage = model.value().cloned().unwrap_or_default();
        StorageAttributes {
            blob_store_name: storage.blob_store_name.known_or("default".to_string()),
            strict_content_type_validation: storage.strict_content_type_validation.known_or(true),
            write_policy: match role {
                Role::Hosted => Some(storage.write_policy.known_or("ALLOW_ONCE".to_string())),
                _ => None,
            },
        }
    }

    pub fn from_wire(wire: StorageAttributes, role: Role) -> Attr<StorageModel> {
        Attr::Known(StorageModel {
            blob_store_name: Attr::Known(wire.blob_store_name),
            strict_content_type_validation: Attr::Known(wire.strict_content_type_validation),
            write_policy: match role {
                Role::Hosted => non_empty(wire.write_policy),
                _ => Attr::Null,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupModel {
    pub policy_names: Attr<Vec<String>>,
}

impl CleanupModel {
    pub fn to_wire(model: &Attr<CleanupModel>) -> Option<CleanupPolicyAttributes> {
        let names = model.value()?.policy_names.to_option()?;
        Some(CleanupPolicyAttributes { policy_names: names })
    }

    /// An empty policy list reads as no cleanup block
    pub fn from_wire(wire: Option<CleanupPolicyAttributes>, prior: &Attr<CleanupModel>) -> Attr<CleanupModel> {
        match wire {
            Some(c) if !c.policy_names.is_empty() => {
                let current = prior.value().map(|p| p.policy_names.clone()).unwrap_or_default();
                Attr::Known(CleanupModel {
                    policy_names: current.observe_set(c.policy_names),
                })
            }
            _ => Attr::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    pub proprietary_components: Attr<bool>,
}

impl ComponentModel {
    pub fn to_wire(model: &Attr<ComponentModel>) -> Option<ComponentAttributes> {
        model.value().map(|c| ComponentAttributes {
            proprietary_components: c.proprietary_components.known_or(false),
        })
    }

    pub fn from_wire(wire: Option<ComponentAttributes>) -> Attr<ComponentModel> {
        Attr::from_option(wire.map(|c| ComponentModel {
            proprietary_components: Attr::Known(c.proprietary_components),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettingsModel {
    pub remote_url: Attr<String>,
    /// Minutes
    pub content_max_age: Attr<i64>,
    /// Minutes
    pub metadata_max_age: Attr<i64>,
}

impl ProxySettingsModel {
    pub fn to_wire(model: &Attr<ProxySettingsModel>) -> ProxyAttributes {
        let proxy = model.value().cloned().unwrap_or_default();
        ProxyAttributes {
            remote_url: proxy.remote_url.known_or(String::new()),
            content_max_age: proxy.content_max_age.known_or(1440),
            metadata_max_age: proxy.metadata_max_age.known_or(1440),
        }
    }

    pub fn from_wire(wire: ProxyAttributes) -> Attr<ProxySettingsModel> {
        Attr::Known(ProxySettingsModel {
            remote_url: Attr::Known(wire.remote_url),
            content_max_age: Attr::Known(wire.content_max_age),
            metadata_max_age: Attr::Known(wire.metadata_max_age),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeCacheModel {
    pub enabled: Attr<bool>,
    /// Minutes
    pub time_to_live: Attr<i64>,
}

impl NegativeCacheModel {
    pub fn to_wire(model: &Attr<NegativeCacheModel>) -> NegativeCacheAttributes {
        let cache = model.value().cloned().unwrap_or_default();
        NegativeCacheAttributes {
            enabled: cache.enabled.known_or(true),
            time_to_live: cache.time_to_live.known_or(1440),
        }
    }

    pub fn from_wire(wire: NegativeCacheAttributes) -> Attr<NegativeCacheModel> {
        Attr::Known(NegativeCacheModel {
            enabled: Attr::Known(wire.enabled),
            time_to_live: Attr::Known(wire.time_to_live),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionModel {
    pub retries: Attr<i64>,
    pub user_agent_suffix: Attr<String>,
    /// Seconds
    pub timeout: Attr<i64>,
    pub enable_circular_redirects: Attr<bool>,
    pub enable_cookies: Attr<bool>,
    pub use_trust_store: Attr<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationModel {
    #[serde(rename = "type")]
    pub kind: Attr<String>,
    pub username: Attr<String>,
    pub password: Attr<String>,
    pub ntlm_host: Attr<String>,
    pub ntlm_domain: Attr<String>,
    pub bearer_token: Attr<String>,
    pub preemptive: Attr<bool>,
}

impl AuthenticationModel {
    /// Fields each authentication type needs
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(kind) = self.kind.value() else {
            return diags;
        };
        let required: Vec<(&str, bool)> = match kind.as_str() {
            "username" => vec![("username", self.username.is_null()), ("password", self.password.is_null())],
            "ntlm" => vec![
                ("username", self.username.is_null()),
                ("password", self.password.is_null()),
                ("ntlm_host", self.ntlm_host.is_null()),
                ("ntlm_domain", self.ntlm_domain.is_null()),
            ],
            "bearerToken" => vec![("bearer_token", self.bearer_token.is_null())],
            _ => Vec::new(),
        };
        for (field, missing) in required {
            if missing {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!(
                            "http_client.authentication.{} is required when the authentication type is \"{}\".",
                            field, kind
                        ),
                    )
                    .at(format!("http_client.authentication.{}", field)),
                );
            }
        }
        diags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientModel {
    pub blocked: Attr<bool>,
    pub auto_block: Attr<bool>,
    pub connection: Attr<ConnectionModel>,
    pub authentication: Attr<AuthenticationModel>,
}

impl HttpClientModel {
    pub fn to_wire(model: &Attr<HttpClientModel>) -> HttpClientAttributes {
        let http = model.value().cloned().unwrap_or_default();
        HttpClientAttributes {
            blocked: http.blocked.known_or(false),
            auto_block: http.auto_block.known_or(true),
            connection: http.connection.value().map(|c| HttpClientConnection {
                retries: c.retries.to_option(),
                user_agent_suffix: c.user_agent_suffix.to_option(),
                timeout: c.timeout.to_option(),
                enable_circular_redirects: c.enable_circular_redirects.to_option(),
                enable_cookies: c.enable_cookies.to_option(),
                use_trust_store: c.use_trust_store.to_option(),
            }),
            authentication: http.authentication.value().map(|a| HttpClientAuthentication {
                kind: a.kind.known_or("username".to_string()),
                username: a.username.to_option(),
                password: a.password.to_option(),
                ntlm_host: a.ntlm_host.to_option(),
                ntlm_domain: a.ntlm_domain.to_option(),
                preemptive: a.preemptive.to_option(),
                bearer_token: a.bearer_token.to_option(),
            }),
        }
    }

    /// A connection record of all-null fields reads as no block
    pub fn from_wire(wire: HttpClientAttributes) -> Attr<HttpClientModel> {
        let connection = wire
            .connection
            .filter(|c| *c != HttpClientConnection::default())
            .map(|c| ConnectionModel {
                retries: Attr::from_option(c.retries),
                user_agent_suffix: non_empty(c.user_agent_suffix),
                timeout: Attr::from_option(c.timeout),
                enable_circular_redirects: Attr::from_option(c.enable_circular_redirects),
                enable_cookies: Attr::from_option(c.enable_cookies),
                use_trust_store: Attr::from_option(c.use_trust_store),
            });
        let authentication = wire.authentication.map(|a| AuthenticationModel {
            kind: Attr::Known(a.kind),
            username: non_empty(a.username),
            password: non_empty(a.password),
            ntlm_host: non_empty(a.ntlm_host),
            ntlm_domain: non_empty(a.ntlm_domain),
            bearer_token: non_empty(a.bearer_token),
            preemptive: Attr::from_option(a.preemptive),
        });
        Attr::Known(HttpClientModel {
            blocked: Attr::Known(wire.blocked),
            auto_block: Attr::Known(wire.auto_block),
            connection: Attr::from_option(connection),
            authentication: Attr::from_option(authentication),
        })
    }

    /// Restore the write-only credentials from the plan
    pub fn restore_secrets(state: &mut Attr<HttpClientModel>, plan: &Attr<HttpClientModel>) {
        let declared = plan.value().and_then(|h| h.authentication.value());
        let current = state.value_mut().and_then(|h| h.authentication.value_mut());
        if let (Some(current), Some(declared)) = (current, declared) {
            current.password.fill_from(&declared.password);
            current.bearer_token.fill_from(&declared.bearer_token);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationModel {
    pub preemptive_pull_enabled: Attr<bool>,
    pub asset_path_regex: Attr<String>,
}

impl ReplicationModel {
    pub fn to_wire(model: &Attr<ReplicationModel>) -> Option<ReplicationAttributes> {
        model.value().map(|r| ReplicationAttributes {
            preemptive_pull_enabled: r.preemptive_pull_enabled.known_or(false),
            asset_path_regex: r.asset_path_regex.to_option(),
        })
    }

    /// Disabled replication with no regex reads as no block
    pub fn from_wire(wire: Option<ReplicationAttributes>) -> Attr<ReplicationModel> {
        match wire {
            Some(r) if r.preemptive_pull_enabled || r.asset_path_regex.is_some() => {
                Attr::Known(ReplicationModel {
                    preemptive_pull_enabled: Attr::Known(r.preemptive_pull_enabled),
                    asset_path_regex: non_empty(r.asset_path_regex),
                })
            }
            _ => Attr::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMembersModel {
    pub member_names: Attr<Vec<String>>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub writable_member: Attr<String>,
}

impl GroupMembersModel {
    pub fn to_wire(model: &Attr<GroupMembersModel>) -> GroupAttributes {
        let group = model.value().cloned().unwrap_or_default();
        GroupAttributes {
            member_names: group.member_names.known_or(Vec::new()),
            writable_member: group.writable_member.to_option(),
        }
    }

    pub fn from_wire(wire: GroupAttributes) -> Attr<GroupMembersModel> {
        Attr::Known(GroupMembersModel {
            member_names: Attr::Known(wire.member_names),
            writable_member: non_empty(wire.writable_member),
        })
    }
}

// Schema fragments

/// `name`, `online` and the server-reported fields
pub fn identity_attributes() -> Attributes {
    attrs([
        (
            "name",
            Attribute::required_string()
                .requires_replace()
                .validate(Validator::matches(
                    r"^[a-zA-Z0-9\-]{1}[a-zA-Z0-9_\-\.]*$",
                    "may only contain letters, digits, underscores, hyphens and dots and may not start with an underscore or dot",
                ))
                .describe("Unique repository name"),
        ),
        (
            "online",
            Attribute::optional_bool()
                .default_value(json!(true))
                .describe("Whether the repository accepts incoming requests"),
        ),
        (
            "format",
            Attribute::computed_string()
                .use_state_for_unknown()
                .describe("Format reported by the server, e.g. maven2"),
        ),
        (
            "type",
            Attribute::computed_string().use_state_for_unknown(),
        ),
        (
            "url",
            Attribute::computed_string()
                .use_state_for_unknown()
                .describe("URL of the repository"),
        ),
    ])
}

pub fn storage_attribute(role: Role) -> Attribute {
    let mut fields = attrs([
        (
            "blob_store_name",
            Attribute::required_string().describe("Blob store holding the repository's content"),
        ),
        (
            "strict_content_type_validation",
            Attribute::optional_bool().default_value(json!(true)),
        ),
    ]);
    if role == Role::Hosted {
        fields.insert(
            "write_policy".to_string(),
            Attribute::optional_string()
                .default_value(json!("ALLOW_ONCE"))
                .validate(Validator::one_of(WRITE_POLICIES)),
        );
    }
    Attribute::required(block(fields))
}

pub fn cleanup_attribute() -> Attribute {
    Attribute::optional(block(attrs([(
        "policy_names",
        Attribute::required(Attribute::string_set()).describe("Cleanup policies applied to the repository"),
    )])))
}

pub fn component_attribute() -> Attribute {
    Attribute::optional(block(attrs([(
        "proprietary_components",
        Attribute::optional_bool().default_value(json!(false)),
    )])))
    .default_value(json!({"proprietary_components": false}))
    .describe("Component settings of hosted repositories")
}

pub fn proxy_attribute() -> Attribute {
    Attribute::required(block(attrs([
        (
            "remote_url",
            Attribute::required_string()
                .validate(Validator::http_url())
                .describe("Location of the remote repository"),
        ),
        (
            "content_max_age",
            Attribute::optional_int64()
                .default_value(json!(1440))
                .validate(Validator::AtLeast(-1))
                .describe("Minutes to cache artifacts; -1 caches forever"),
        ),
        (
            "metadata_max_age",
            Attribute::optional_int64()
                .default_value(json!(1440))
                .validate(Validator::AtLeast(-1))
                .describe("Minutes to cache metadata; -1 caches forever"),
        ),
    ])))
}

pub fn negative_cache_attribute() -> Attribute {
    Attribute::optional(block(attrs([
        ("enabled", Attribute::optional_bool().default_value(json!(true))),
        (
            "time_to_live",
            Attribute::optional_int64()
                .default_value(json!(1440))
                .validate(Validator::AtLeast(0))
                .describe("Minutes to cache a missing artifact"),
        ),
    ])))
    .default_value(json!({"enabled": true, "time_to_live": 1440}))
}

pub fn http_client_attribute() -> Attribute {
    let connection = Attribute::optional(block(attrs([
        (
            "retries",
            Attribute::optional_int64()
                .default_value(json!(0))
                .validate(Validator::Between(0, 10)),
        ),
        ("user_agent_suffix", Attribute::optional_string()),
        (
            "timeout",
            Attribute::optional_int64()
                .default_value(json!(60))
                .validate(Validator::Between(1, 3600))
                .describe("Seconds to wait for activity before stopping and retrying"),
        ),
        (
            "enable_circular_redirects",
            Attribute::optional_bool().default_value(json!(false)),
        ),
        (
            "enable_cookies",
            Attribute::optional_bool().default_value(json!(false)),
        ),
        (
            "use_trust_store",
            Attribute::optional_bool().default_value(json!(false)),
        ),
    ])));
    let authentication = Attribute::optional(block(attrs([
        (
            "type",
            Attribute::required_string().validate(Validator::one_of(AUTHENTICATION_TYPES)),
        ),
        ("username", Attribute::optional_string()),
        ("password", Attribute::optional_string().sensitive()),
        ("ntlm_host", Attribute::optional_string()),
        ("ntlm_domain", Attribute::optional_string()),
        ("bearer_token", Attribute::optional_string().sensitive()),
        ("preemptive", Attribute::optional_bool()),
    ])));
    Attribute::optional(block(attrs([
        (
            "blocked",
            Attribute::optional_bool()
                .default_value(json!(false))
                .describe("Block outbound connections"),
        ),
        (
            "auto_block",
            Attribute::optional_bool()
                .default_value(json!(true))
                .describe("Block outbound connections while the remote is unreachable"),
        ),
        ("connection", connection),
        ("authentication", authentication),
    ])))
    .default_value(json!({"blocked": false, "auto_block": true}))
}

pub fn routing_rule_attribute() -> Attribute {
    Attribute::optional(AttributeType::String).describe("Name of the routing rule applied to this repository")
}

pub fn replication_attribute() -> Attribute {
    Attribute::optional(block(attrs([
        (
            "preemptive_pull_enabled",
            Attribute::optional_bool().default_value(json!(false)),
        ),
        ("asset_path_regex", Attribute::optional_string()),
    ])))
    .describe("Pre-emptive pull of replicated content")
}

pub fn group_attribute(group_deploy: bool) -> Attribute {
    let mut fields = attrs([(
        "member_names",
        Attribute::required(Attribute::string_list())
            .validate(Validator::NotEmpty)
            .describe("Member repositories, in resolution order"),
    )]);
    if group_deploy {
        fields.insert(
            "writable_member".to_string(),
            Attribute::optional_string().describe("Member receiving uploads to the group"),
        );
    }
    Attribute::required(block(fields))
}

pub fn last_updated_attribute() -> Attributes {
    attrs([(
        "last_updated",
        Attribute::computed_string().describe("Time of the last successful apply"),
    )])
}
