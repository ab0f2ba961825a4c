//! Catalog of managed capability types

use nxrm_core::Validator;
use serde_json::json;

use crate::properties::PropertySpec;

/// One capability type
#[derive(Debug, Clone, Copy)]
pub struct CapabilityType {
    /// Resource suffix, e.g. `core_base_url`
    pub key: &'static str,
    /// Upstream `type`
    pub wire_type: &'static str,
    /// Display name used in diagnostics
    pub title: &'static str,
    pub description: &'static str,
    pub properties: fn() -> Vec<PropertySpec>,
}

impl CapabilityType {
    pub fn resource_name(&self) -> String {
        format!("nxrm_capability_{}", self.key)
    }
}

fn no_properties() -> Vec<PropertySpec> {
    Vec::new()
}

fn base_url() -> Vec<PropertySpec> {
    vec![PropertySpec::string("url", "url")
        .required()
        .validate(Validator::http_url())
        .describe("Base URL of the server as seen by clients")]
}

fn storage_settings() -> Vec<PropertySpec> {
    vec![PropertySpec::int("last_downloaded_interval", "lastDownloaded")
        .default_value(json!(12))
        .validate(Validator::AtLeast(1))
        .describe("Hours between updates of an asset's last downloaded time")]
}

fn custom_s3_regions() -> Vec<PropertySpec> {
    vec![PropertySpec::string_set("regions", "regions")
        .required()
        .validate(Validator::NotEmpty)
        .describe("Additional S3 region names offered for S3 blob stores")]
}

fn default_role() -> Vec<PropertySpec> {
    vec![PropertySpec::string("role", "role")
        .required()
        .describe("Role granted to every authenticated user")]
}

fn healthcheck() -> Vec<PropertySpec> {
    vec![PropertySpec::bool("configure_all_repositories", "configAllRepositories")
        .default_value(json!(false))
        .describe("Enable repository health check for every proxy repository")]
}

fn outreach() -> Vec<PropertySpec> {
    vec![
        PropertySpec::bool("always_remote", "alwaysRemote").default_value(json!(false)),
        PropertySpec::string("override_url", "overrideUrl").validate(Validator::http_url()),
    ]
}

fn rut_auth() -> Vec<PropertySpec> {
    vec![PropertySpec::string("http_header", "httpHeader")
        .required()
        .describe("Header carrying the authenticated user id")]
}

fn ui_branding() -> Vec<PropertySpec> {
    vec![
        PropertySpec::bool("header_enabled", "headerEnabled").default_value(json!(false)),
        PropertySpec::string("header_html", "headerHtml"),
        PropertySpec::bool("footer_enabled", "footerEnabled").default_value(json!(false)),
        PropertySpec::string("footer_html", "footerHtml"),
    ]
}

fn ui_settings() -> Vec<PropertySpec> {
    vec![
        PropertySpec::string("title", "title").default_value(json!("Sonatype Nexus Repository")),
        PropertySpec::bool("debug_allowed", "debugAllowed").default_value(json!(true)),
        PropertySpec::int("status_interval_authenticated", "statusIntervalAuthenticated")
            .default_value(json!(5))
            .validate(Validator::AtLeast(1)),
        PropertySpec::int("status_interval_anonymous", "statusIntervalAnonymous")
            .default_value(json!(60))
            .validate(Validator::AtLeast(1)),
        PropertySpec::int("session_timeout", "sessionTimeout")
            .default_value(json!(30))
            .validate(Validator::AtLeast(1)),
        PropertySpec::int("request_timeout", "requestTimeout")
            .default_value(json!(60))
            .validate(Validator::AtLeast(1)),
        PropertySpec::int("long_request_timeout", "longRequestTimeout")
            .default_value(json!(180))
            .validate(Validator::AtLeast(1)),
    ]
}

fn webhook(events: &'static str) -> Vec<PropertySpec> {
    vec![
        PropertySpec::string_set("names", "names")
            .required()
            .validate(Validator::NotEmpty)
            .describe(events),
        PropertySpec::string("url", "url")
            .required()
            .validate(Validator::http_url()),
        PropertySpec::secret("secret", "secret").describe("Key used to sign payloads"),
    ]
}

fn webhook_global() -> Vec<PropertySpec> {
    webhook("Event types to send: audit, repository")
}

fn webhook_repository() -> Vec<PropertySpec> {
    let mut specs = vec![PropertySpec::string("repository", "repository").required()];
    specs.extend(webhook("Event types to send: asset, component"));
    specs
}

pub const CAPABILITY_TYPES: &[CapabilityType] = &[
    CapabilityType {
        key: "audit",
        wire_type: "audit",
        title: "Audit Capability",
        description: "Records configuration and security events in the audit log.",
        properties: no_properties,
    },
    CapabilityType {
        key: "core_base_url",
        wire_type: "baseurl",
        title: "Base URL Capability",
        description: "Sets the base URL the server uses in generated links.",
        properties: base_url,
    },
    CapabilityType {
        key: "core_storage_settings",
        wire_type: "StorageSettings",
        title: "Storage Settings Capability",
        description: "Controls how often an asset's last downloaded time is updated.",
        properties: storage_settings,
    },
    CapabilityType {
        key: "custom_s3_regions",
        wire_type: "customs3regions",
        title: "Custom S3 Regions Capability",
        description: "Adds S3 regions to those offered for S3 blob stores.",
        properties: custom_s3_regions,
    },
    CapabilityType {
        key: "default_role",
        wire_type: "defaultrole",
        title: "Default Role Capability",
        description: "Grants a role to every authenticated user.",
        properties: default_role,
    },
    CapabilityType {
        key: "healthcheck",
        wire_type: "healthcheck",
        title: "Repository Health Check Capability",
        description: "Configures repository health check analysis.",
        properties: healthcheck,
    },
    CapabilityType {
        key: "outreach",
        wire_type: "OutreachManagementCapability",
        title: "Outreach Capability",
        description: "Controls the outreach content shown on the welcome page.",
        properties: outreach,
    },
    CapabilityType {
        key: "rut_auth",
        wire_type: "rutauth",
        title: "Remote User Token Capability",
        description: "Authenticates users from an HTTP header set by a reverse proxy.",
        properties: rut_auth,
    },
    CapabilityType {
        key: "ui_branding",
        wire_type: "rapture.branding",
        title: "UI Branding Capability",
        description: "Adds a custom header and footer to the user interface.",
        properties: ui_branding,
    },
    CapabilityType {
        key: "ui_settings",
        wire_type: "rapture.settings",
        title: "UI Settings Capability",
        description: "User interface title, polling intervals and timeouts.",
        properties: ui_settings,
    },
    CapabilityType {
        key: "webhook_global",
        wire_type: "webhook.global",
        title: "Global Webhook Capability",
        description: "Sends global audit and repository events to a URL.",
        properties: webhook_global,
    },
    CapabilityType {
        key: "webhook_repository",
        wire_type: "webhook.repository",
        title: "Repository Webhook Capability",
        description: "Sends asset and component events of one repository to a URL.",
        properties: webhook_repository,
    },
];

/// Look up a type by its resource suffix
pub fn find(key: &str) -> Option<&'static CapabilityType> {
    CAPABILITY_TYPES.iter().find(|t| t.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_unique() {
        let keys: HashSet<_> = CAPABILITY_TYPES.iter().map(|t| t.key).collect();
        let wire: HashSet<_> = CAPABILITY_TYPES.iter().map(|t| t.wire_type).collect();
        assert_eq!(keys.len(), CAPABILITY_TYPES.len());
        assert_eq!(wire.len(), CAPABILITY_TYPES.len());
    }

    #[test]
    fn test_firewall_is_not_a_standalone_type() {
        assert!(CAPABILITY_TYPES
            .iter()
            .all(|t| t.wire_type != crate::firewall::CAPABILITY_TYPE));
    }

    #[test]
    fn test_repository_webhook_properties() {
        let specs = (find("webhook_repository").unwrap().properties)();
        let names: Vec<_> = specs.iter().map(|s| s.attribute).collect();
        assert_eq!(names, vec!["repository", "names", "url", "secret"]);
    }
}
