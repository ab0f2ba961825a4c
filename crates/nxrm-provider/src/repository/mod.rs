//! Repository resources
//!
//! One resource type per (format, role) pair of [`FORMATS`]. The three role
//! records share their common blocks; the per-format blocks come from the
//! record's [`FormatExtension`] parameter.

pub mod common;
pub mod ext;
pub mod format;
pub mod group;
pub mod hosted;
pub mod proxy;

pub use ext::FormatExtension;
pub use format::{find, Format, Role, FORMATS};
pub use group::{GroupDescriptor, GroupRepositoryModel};
pub use hosted::{HostedDescriptor, HostedRepositoryModel};
pub use proxy::{ProxyDescriptor, ProxyRepositoryModel};

use nxrm_core::{Diagnostic, Diagnostics};

use crate::registry::Registry;
use ext::{
    AptExtension, CargoExtension, ConanExtension, DockerExtension, MavenExtension, NoExtension,
    NpmExtension, NugetExtension, PypiExtension, RawExtension, YumExtension,
};

/// Warn when the server reports a repository of another format
pub(crate) fn reported_format(format: &Format, role: Role, name: &str, reported: Option<&str>) -> Diagnostics {
    match reported {
        Some(actual) if actual != format.wire => Diagnostic::warning(
            format!("Unexpected format for {}", format.noun(role)),
            format!(
                "Repository \"{}\" is reported as {}, expected {}.",
                name, actual, format.wire
            ),
        )
        .into(),
        _ => Diagnostics::new(),
    }
}

fn register_roles<X: FormatExtension>(registry: &mut Registry, format: &'static Format) {
    for role in format.roles {
        match role {
            Role::Hosted => registry.register(|| HostedDescriptor::<X>::new(format)),
            Role::Proxy => registry.register(|| ProxyDescriptor::<X>::new(format)),
            Role::Group => registry.register(|| GroupDescriptor::<X>::new(format)),
        }
    }
}

/// Register every (format, role) resource type
pub fn register(registry: &mut Registry) {
    for format in FORMATS {
        match format.key {
            "maven" => register_roles::<MavenExtension>(registry, format),
            "npm" => register_roles::<NpmExtension>(registry, format),
            "docker" => register_roles::<DockerExtension>(registry, format),
            "pypi" => register_roles::<PypiExtension>(registry, format),
            "nuget" => register_roles::<NugetExtension>(registry, format),
            "raw" => register_roles::<RawExtension>(registry, format),
            "yum" => register_roles::<YumExtension>(registry, format),
            "apt" => register_roles::<AptExtension>(registry, format),
            "conan" => register_roles::<ConanExtension>(registry, format),
            "cargo" => register_roles::<CargoExtension>(registry, format),
            _ => register_roles::<NoExtension>(registry, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_registered() {
        let mut registry = Registry::new();
        register(&mut registry);
        let names: Vec<&str> = registry.resource_names().collect();
        assert_eq!(names.len(), 50);
        assert!(names.contains(&"nxrm_repository_maven_hosted"));
        assert!(names.contains(&"nxrm_repository_gitlfs_hosted"));
        assert!(names.contains(&"nxrm_repository_huggingface_proxy"));
        assert!(!names.contains(&"nxrm_repository_go_hosted"));
        assert!(registry.data_source("nxrm_repository_npm_proxy").is_some());
    }

    #[test]
    fn test_reported_format_mismatch_warns() {
        let maven = find("maven").unwrap();
        assert!(reported_format(maven, Role::Hosted, "r", Some("maven2")).is_empty());
        let diags = reported_format(maven, Role::Hosted, "r", Some("npm"));
        assert!(!diags.has_error());
        assert_eq!(diags.warnings().count(), 1);
    }
}
