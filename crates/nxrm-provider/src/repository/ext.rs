//! Per-format extension records
//!
//! Each repository model is generic over a [`FormatExtension`]: the blocks a
//! format adds on top of the role's common records. One extension type can
//! serve several roles; blocks a role does not carry stay null and are left
//! out of state.

use std::fmt;

use nxrm_client::{
    AptAttributes, CargoAttributes, ConanProxyAttributes, DockerAttributes, DockerProxyAttributes,
    FormatBlocks, MavenAttributes, NugetProxyAttributes, QuarantineAttributes, RawAttributes,
    SigningAttributes, YumAttributes,
};
use nxrm_core::{attrs, block, Attr, Attribute, AttributeType, Attributes, FieldGate, Validator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::non_empty;
use super::format::Role;

/// Blocks a format adds to its repository records
pub trait FormatExtension:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Schema attributes for `role`
    fn attributes(role: Role) -> Attributes;

    fn to_wire(&self, role: Role) -> FormatBlocks;

    /// Replace the blocks with what the server reported
    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role);

    /// Restore write-only values and blocks the server did not report
    fn restore_from_plan(&mut self, _plan: &Self) {}

    fn field_gates(_role: Role) -> Vec<FieldGate> {
        Vec::new()
    }
}

/// Formats without blocks of their own
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoExtension {}

impl FormatExtension for NoExtension {
    fn attributes(_role: Role) -> Attributes {
        Attributes::new()
    }

    fn to_wire(&self, _role: Role) -> FormatBlocks {
        FormatBlocks::default()
    }

    fn update_from_wire(&mut self, _blocks: FormatBlocks, _role: Role) {}
}

// Signing keys

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningModel {
    pub keypair: Attr<String>,
    pub passphrase: Attr<String>,
}

impl SigningModel {
    fn to_wire(model: &Attr<SigningModel>) -> Option<SigningAttributes> {
        model.value().map(|s| SigningAttributes {
            keypair: s.keypair.to_option(),
            passphrase: s.passphrase.to_option(),
        })
    }

    /// Neither value is echoed: the block is kept from the plan
    fn restore(state: &mut Attr<SigningModel>, plan: &Attr<SigningModel>) {
        match (state.value_mut(), plan.value()) {
            (Some(current), Some(declared)) => {
                current.keypair.fill_from(&declared.keypair);
                current.passphrase.fill_from(&declared.passphrase);
            }
            _ => state.fill_from(plan),
        }
    }

    fn attribute(required: bool) -> Attribute {
        let keypair = if required {
            Attribute::required_string()
        } else {
            Attribute::optional_string()
        };
        let fields = attrs([
            (
                "keypair",
                keypair.sensitive().describe("ASCII-armored PGP private key"),
            ),
            ("passphrase", Attribute::optional_string().sensitive()),
        ]);
        if required {
            Attribute::required(block(fields))
        } else {
            Attribute::optional(block(fields))
        }
    }
}

// Maven

pub const VERSION_POLICIES: &[&str] = &["RELEASE", "SNAPSHOT", "MIXED"];
pub const LAYOUT_POLICIES: &[&str] = &["STRICT", "PERMISSIVE"];
pub const CONTENT_DISPOSITIONS: &[&str] = &["INLINE", "ATTACHMENT"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenModel {
    pub version_policy: Attr<String>,
    pub layout_policy: Attr<String>,
    pub content_disposition: Attr<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub maven: Attr<MavenModel>,
}

impl FormatExtension for MavenExtension {
    fn attributes(role: Role) -> Attributes {
        if role == Role::Group {
            return Attributes::new();
        }
        attrs([(
            "maven",
            Attribute::required(block(attrs([
                (
                    "version_policy",
                    Attribute::required_string().validate(Validator::one_of(VERSION_POLICIES)),
                ),
                (
                    "layout_policy",
                    Attribute::required_string().validate(Validator::one_of(LAYOUT_POLICIES)),
                ),
                (
                    "content_disposition",
                    Attribute::optional_string()
                        .default_value(json!("INLINE"))
                        .validate(Validator::one_of(CONTENT_DISPOSITIONS)),
                ),
            ]))),
        )])
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            maven: self.maven.value().filter(|_| role != Role::Group).map(|m| MavenAttributes {
                version_policy: m.version_policy.known_or("RELEASE".to_string()),
                layout_policy: m.layout_policy.known_or("STRICT".to_string()),
                content_disposition: m.content_disposition.to_option(),
            }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Group {
            return;
        }
        self.maven = Attr::from_option(blocks.maven.map(|m| MavenModel {
            version_policy: Attr::Known(m.version_policy),
            layout_policy: Attr::Known(m.layout_policy),
            content_disposition: non_empty(m.content_disposition),
        }));
    }
}

// Docker

pub const INDEX_TYPES: &[&str] = &["HUB", "REGISTRY", "CUSTOM"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerModel {
    pub v1_enabled: Attr<bool>,
    pub force_basic_auth: Attr<bool>,
    pub http_port: Attr<i64>,
    pub https_port: Attr<i64>,
    pub subdomain: Attr<String>,
    pub path_enabled: Attr<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerProxyModel {
    pub index_type: Attr<String>,
    pub index_url: Attr<String>,
    pub cache_foreign_layers: Attr<bool>,
    pub foreign_layer_url_whitelist: Attr<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub docker: Attr<DockerModel>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub docker_proxy: Attr<DockerProxyModel>,
}

impl FormatExtension for DockerExtension {
    fn attributes(role: Role) -> Attributes {
        let mut out = attrs([(
            "docker",
            Attribute::required(block(attrs([
                (
                    "v1_enabled",
                    Attribute::optional_bool().default_value(json!(false)),
                ),
                (
                    "force_basic_auth",
                    Attribute::optional_bool()
                        .default_value(json!(true))
                        .describe("Disable anonymous pulls through the token realm"),
                ),
                (
                    "http_port",
                    Attribute::optional_int64().validate(Validator::Between(1, 65535)),
                ),
                (
                    "https_port",
                    Attribute::optional_int64().validate(Validator::Between(1, 65535)),
                ),
                ("subdomain", Attribute::optional_string()),
                (
                    "path_enabled",
                    Attribute::optional_computed(AttributeType::Bool)
                        .use_state_for_unknown()
                        .describe("Serve the repository under /repository/<name>/"),
                ),
            ]))),
        )]);
        if role == Role::Proxy {
            out.insert(
                "docker_proxy".to_string(),
                Attribute::required(block(attrs([
                    (
                        "index_type",
                        Attribute::optional_string()
                            .default_value(json!("REGISTRY"))
                            .validate(Validator::one_of(INDEX_TYPES)),
                    ),
                    (
                        "index_url",
                        Attribute::optional_string().validate(Validator::http_url()),
                    ),
                    ("cache_foreign_layers", Attribute::optional_bool()),
                    (
                        "foreign_layer_url_whitelist",
                        Attribute::optional(Attribute::string_list()),
                    ),
                ]))),
            );
        }
        out
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            docker: self.docker.value().map(|d| DockerAttributes {
                v1_enabled: d.v1_enabled.known_or(false),
                force_basic_auth: d.force_basic_auth.known_or(true),
                http_port: d.http_port.to_option(),
                https_port: d.https_port.to_option(),
                subdomain: d.subdomain.to_option(),
                path_enabled: d.path_enabled.to_option(),
            }),
            docker_proxy: self
                .docker_proxy
                .value()
                .filter(|_| role == Role::Proxy)
                .map(|p| DockerProxyAttributes {
                    index_type: p.index_type.known_or("REGISTRY".to_string()),
                    index_url: p.index_url.to_option(),
                    cache_foreign_layers: p.cache_foreign_layers.to_option(),
                    foreign_layer_url_whitelist: p.foreign_layer_url_whitelist.to_option(),
                }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        self.docker = Attr::from_option(blocks.docker.map(|d| DockerModel {
            v1_enabled: Attr::Known(d.v1_enabled),
            force_basic_auth: Attr::Known(d.force_basic_auth),
            http_port: Attr::from_option(d.http_port),
            https_port: Attr::from_option(d.https_port),
            subdomain: non_empty(d.subdomain),
            path_enabled: Attr::from_option(d.path_enabled),
        }));
        if role == Role::Proxy {
            let prior_whitelist = self
                .docker_proxy
                .value()
                .map(|p| p.foreign_layer_url_whitelist.clone())
                .unwrap_or_default();
            self.docker_proxy = Attr::from_option(blocks.docker_proxy.map(|p| DockerProxyModel {
                index_type: Attr::Known(p.index_type),
                index_url: non_empty(p.index_url),
                cache_foreign_layers: Attr::from_option(p.cache_foreign_layers),
                foreign_layer_url_whitelist: match p.foreign_layer_url_whitelist {
                    Some(list) if !list.is_empty() => Attr::Known(list),
                    _ if prior_whitelist.is_known() => Attr::Known(Vec::new()),
                    _ => Attr::Null,
                },
            }));
        }
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        // Older servers do not report path_enabled
        if let (Some(current), Some(declared)) = (self.docker.value_mut(), plan.docker.value()) {
            current.path_enabled.fill_from(&declared.path_enabled);
        }
    }

    fn field_gates(_role: Role) -> Vec<FieldGate> {
        vec![FieldGate::reject("docker.path_enabled", 3, 83, 0)]
    }
}

// npm and PyPI proxies

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarantineModel {
    pub remove_quarantined: Attr<bool>,
}

impl QuarantineModel {
    fn attribute(format: &str) -> Attribute {
        Attribute::optional(block(attrs([(
            "remove_quarantined",
            Attribute::optional_bool()
                .default_value(json!(false))
                .describe("Remove quarantined versions from metadata"),
        )])))
        .default_value(json!({"remove_quarantined": false}))
        .describe(format!("{} proxy settings", format))
    }

    fn to_wire(model: &Attr<QuarantineModel>) -> Option<QuarantineAttributes> {
        model.value().map(|q| QuarantineAttributes {
            remove_quarantined: q.remove_quarantined.known_or(false),
        })
    }

    fn from_wire(wire: Option<QuarantineAttributes>) -> Attr<QuarantineModel> {
        Attr::from_option(wire.map(|q| QuarantineModel {
            remove_quarantined: Attr::Known(q.remove_quarantined),
        }))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NpmExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub npm: Attr<QuarantineModel>,
}

impl FormatExtension for NpmExtension {
    fn attributes(role: Role) -> Attributes {
        match role {
            Role::Proxy => attrs([("npm", QuarantineModel::attribute("npm"))]),
            _ => Attributes::new(),
        }
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            npm: QuarantineModel::to_wire(&self.npm).filter(|_| role == Role::Proxy),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Proxy {
            self.npm = QuarantineModel::from_wire(blocks.npm);
        }
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        self.npm.fill_from(&plan.npm);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PypiExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub pypi: Attr<QuarantineModel>,
}

impl FormatExtension for PypiExtension {
    fn attributes(role: Role) -> Attributes {
        match role {
            Role::Proxy => attrs([("pypi", QuarantineModel::attribute("PyPI"))]),
            _ => Attributes::new(),
        }
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            pypi: QuarantineModel::to_wire(&self.pypi).filter(|_| role == Role::Proxy),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Proxy {
            self.pypi = QuarantineModel::from_wire(blocks.pypi);
        }
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        self.pypi.fill_from(&plan.pypi);
    }
}

// NuGet

pub const NUGET_VERSIONS: &[&str] = &["V2", "V3"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NugetProxyModel {
    /// Seconds
    pub query_cache_item_max_age: Attr<i64>,
    pub nuget_version: Attr<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NugetExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub nuget_proxy: Attr<NugetProxyModel>,
}

impl FormatExtension for NugetExtension {
    fn attributes(role: Role) -> Attributes {
        if role != Role::Proxy {
            return Attributes::new();
        }
        attrs([(
            "nuget_proxy",
            Attribute::optional(block(attrs([
                (
                    "query_cache_item_max_age",
                    Attribute::optional_int64()
                        .default_value(json!(3600))
                        .validate(Validator::AtLeast(0))
                        .describe("Seconds to cache query results"),
                ),
                (
                    "nuget_version",
                    Attribute::optional_string()
                        .default_value(json!("V3"))
                        .validate(Validator::one_of(NUGET_VERSIONS)),
                ),
            ])))
            .default_value(json!({"query_cache_item_max_age": 3600, "nuget_version": "V3"})),
        )])
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            nuget_proxy: self
                .nuget_proxy
                .value()
                .filter(|_| role == Role::Proxy)
                .map(|n| NugetProxyAttributes {
                    query_cache_item_max_age: n.query_cache_item_max_age.known_or(3600),
                    nuget_version: n.nuget_version.to_option(),
                }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Proxy {
            self.nuget_proxy = Attr::from_option(blocks.nuget_proxy.map(|n| NugetProxyModel {
                query_cache_item_max_age: Attr::Known(n.query_cache_item_max_age),
                nuget_version: non_empty(n.nuget_version),
            }));
        }
    }
}

// Raw

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawModel {
    pub content_disposition: Attr<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub raw: Attr<RawModel>,
}

impl FormatExtension for RawExtension {
    fn attributes(_role: Role) -> Attributes {
        attrs([(
            "raw",
            Attribute::optional(block(attrs([(
                "content_disposition",
                Attribute::optional_string()
                    .default_value(json!("ATTACHMENT"))
                    .validate(Validator::one_of(CONTENT_DISPOSITIONS)),
            )])))
            .default_value(json!({"content_disposition": "ATTACHMENT"})),
        )])
    }

    fn to_wire(&self, _role: Role) -> FormatBlocks {
        FormatBlocks {
            raw: self.raw.value().map(|r| RawAttributes {
                content_disposition: r.content_disposition.to_option(),
            }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, _role: Role) {
        self.raw = Attr::from_option(blocks.raw.map(|r| RawModel {
            content_disposition: non_empty(r.content_disposition),
        }));
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        self.raw.fill_from(&plan.raw);
    }
}

// Yum

pub const DEPLOY_POLICIES: &[&str] = &["STRICT", "PERMISSIVE"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YumModel {
    pub repodata_depth: Attr<i64>,
    pub deploy_policy: Attr<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YumExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub yum: Attr<YumModel>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub yum_signing: Attr<SigningModel>,
}

impl FormatExtension for YumExtension {
    fn attributes(role: Role) -> Attributes {
        match role {
            Role::Hosted => attrs([(
                "yum",
                Attribute::optional(block(attrs([
                    (
                        "repodata_depth",
                        Attribute::optional_int64()
                            .default_value(json!(0))
                            .validate(Validator::Between(0, 5))
                            .describe("Directory depth at which repodata is created"),
                    ),
                    (
                        "deploy_policy",
                        Attribute::optional_string()
                            .default_value(json!("STRICT"))
                            .validate(Validator::one_of(DEPLOY_POLICIES)),
                    ),
                ])))
                .default_value(json!({"repodata_depth": 0, "deploy_policy": "STRICT"})),
            )]),
            _ => attrs([("yum_signing", SigningModel::attribute(false))]),
        }
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        match role {
            Role::Hosted => FormatBlocks {
                yum: self.yum.value().map(|y| YumAttributes {
                    repodata_depth: y.repodata_depth.known_or(0),
                    deploy_policy: y.deploy_policy.to_option(),
                }),
                ..Default::default()
            },
            _ => FormatBlocks {
                yum_signing: SigningModel::to_wire(&self.yum_signing),
                ..Default::default()
            },
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Hosted {
            self.yum = Attr::from_option(blocks.yum.map(|y| YumModel {
                repodata_depth: Attr::Known(y.repodata_depth),
                deploy_policy: non_empty(y.deploy_policy),
            }));
        }
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        SigningModel::restore(&mut self.yum_signing, &plan.yum_signing);
    }
}

// APT

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AptModel {
    pub distribution: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub flat: Attr<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AptExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub apt: Attr<AptModel>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub apt_signing: Attr<SigningModel>,
}

impl FormatExtension for AptExtension {
    fn attributes(role: Role) -> Attributes {
        let mut apt = attrs([(
            "distribution",
            Attribute::required_string().describe("Distribution to fetch, e.g. bookworm"),
        )]);
        if role == Role::Proxy {
            apt.insert(
                "flat".to_string(),
                Attribute::optional_bool()
                    .default_value(json!(false))
                    .describe("Whether the remote is a flat repository"),
            );
        }
        let mut out = attrs([("apt", Attribute::required(block(apt)))]);
        if role == Role::Hosted {
            out.insert("apt_signing".to_string(), SigningModel::attribute(true));
        }
        out
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            apt: self.apt.value().map(|a| AptAttributes {
                distribution: a.distribution.known_or(String::new()),
                flat: match role {
                    Role::Proxy => Some(a.flat.known_or(false)),
                    _ => None,
                },
            }),
            apt_signing: SigningModel::to_wire(&self.apt_signing).filter(|_| role == Role::Hosted),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        self.apt = Attr::from_option(blocks.apt.map(|a| AptModel {
            distribution: Attr::Known(a.distribution),
            flat: match role {
                Role::Proxy => Attr::Known(a.flat.unwrap_or(false)),
                _ => Attr::Null,
            },
        }));
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        SigningModel::restore(&mut self.apt_signing, &plan.apt_signing);
    }
}

// Conan

pub const CONAN_VERSIONS: &[&str] = &["V1", "V2"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConanProxyModel {
    pub conan_version: Attr<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConanExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub conan_proxy: Attr<ConanProxyModel>,
}

impl FormatExtension for ConanExtension {
    fn attributes(role: Role) -> Attributes {
        if role != Role::Proxy {
            return Attributes::new();
        }
        attrs([(
            "conan_proxy",
            Attribute::optional(block(attrs([(
                "conan_version",
                Attribute::optional_string()
                    .default_value(json!("V1"))
                    .validate(Validator::one_of(CONAN_VERSIONS)),
            )])))
            .default_value(json!({"conan_version": "V1"})),
        )])
    }

    fn to_wire(&self, role: Role) -> FormatBlocks {
        FormatBlocks {
            conan_proxy: self
                .conan_proxy
                .value()
                .filter(|_| role == Role::Proxy)
                .map(|c| ConanProxyAttributes {
                    conan_version: c.conan_version.to_option(),
                }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, role: Role) {
        if role == Role::Proxy {
            self.conan_proxy = Attr::from_option(blocks.conan_proxy.map(|c| ConanProxyModel {
                conan_version: non_empty(c.conan_version),
            }));
        }
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        self.conan_proxy.fill_from(&plan.conan_proxy);
    }
}

// Cargo

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoModel {
    pub require_authentication: Attr<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoExtension {
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub cargo: Attr<CargoModel>,
}

impl FormatExtension for CargoExtension {
    fn attributes(_role: Role) -> Attributes {
        attrs([(
            "cargo",
            Attribute::optional(block(attrs([(
                "require_authentication",
                Attribute::optional_bool().default_value(json!(false)),
            )])))
            .default_value(json!({"require_authentication": false})),
        )])
    }

    fn to_wire(&self, _role: Role) -> FormatBlocks {
        FormatBlocks {
            cargo: self.cargo.value().map(|c| CargoAttributes {
                require_authentication: c.require_authentication.known_or(false),
            }),
            ..Default::default()
        }
    }

    fn update_from_wire(&mut self, blocks: FormatBlocks, _role: Role) {
        self.cargo = Attr::from_option(blocks.cargo.map(|c| CargoModel {
            require_authentication: Attr::Known(c.require_authentication),
        }));
    }

    fn restore_from_plan(&mut self, plan: &Self) {
        self.cargo.fill_from(&plan.cargo);
    }
}
