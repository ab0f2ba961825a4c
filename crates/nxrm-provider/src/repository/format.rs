//! Repository format catalog
//!
//! Which roles each format supports, its wire name and firewall support.

use std::fmt;

use crate::descriptor::FirewallSupport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Hosted,
    Proxy,
    Group,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hosted => "hosted",
            Role::Proxy => "proxy",
            Role::Group => "group",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Role::Hosted => "Hosted",
            Role::Proxy => "Proxy",
            Role::Group => "Group",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const HPG: &[Role] = &[Role::Hosted, Role::Proxy, Role::Group];
const HP: &[Role] = &[Role::Hosted, Role::Proxy];
const PG: &[Role] = &[Role::Proxy, Role::Group];
const P: &[Role] = &[Role::Proxy];
const H: &[Role] = &[Role::Hosted];

/// One repository format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Resource name and endpoint path segment, e.g. `maven`
    pub key: &'static str,
    /// Format name on the wire, e.g. `maven2`
    pub wire: &'static str,
    pub title: &'static str,
    pub roles: &'static [Role],
    /// Firewall support of the proxy role
    pub firewall: FirewallSupport,
    /// Groups accept uploads through a writable member
    pub group_deploy: bool,
}

impl Format {
    pub fn supports(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// e.g. `nxrm_repository_maven_hosted`
    pub fn resource_name(&self, role: Role) -> String {
        format!("nxrm_repository_{}_{}", self.key, role)
    }

    /// e.g. "Maven Hosted Repository"
    pub fn noun(&self, role: Role) -> String {
        format!("{} {} Repository", self.title, role.title())
    }
}

const fn entry(key: &'static str, wire: &'static str, title: &'static str, roles: &'static [Role]) -> Format {
    Format {
        key,
        wire,
        title,
        roles,
        firewall: FirewallSupport::None,
        group_deploy: false,
    }
}

const fn with_firewall(mut f: Format, support: FirewallSupport) -> Format {
    f.firewall = support;
    f
}

const fn with_group_deploy(mut f: Format) -> Format {
    f.group_deploy = true;
    f
}

pub const FORMATS: &[Format] = &[
    with_firewall(entry("maven", "maven2", "Maven", HPG), FirewallSupport::AuditAndPccs),
    with_group_deploy(with_firewall(entry("npm", "npm", "npm", HPG), FirewallSupport::AuditAndPccs)),
    with_group_deploy(with_firewall(entry("docker", "docker", "Docker", HPG), FirewallSupport::Audit)),
    with_firewall(entry("pypi", "pypi", "PyPI", HPG), FirewallSupport::AuditAndPccs),
    with_firewall(entry("nuget", "nuget", "NuGet", HPG), FirewallSupport::Audit),
    entry("raw", "raw", "Raw", HPG),
    with_firewall(entry("yum", "yum", "Yum", HPG), FirewallSupport::Audit),
    entry("apt", "apt", "APT", HP),
    with_firewall(entry("go", "go", "Go", PG), FirewallSupport::Audit),
    entry("helm", "helm", "Helm", HP),
    with_firewall(entry("conan", "conan", "Conan", HPG), FirewallSupport::Audit),
    with_firewall(entry("r", "r", "R", HPG), FirewallSupport::Audit),
    with_firewall(entry("cargo", "cargo", "Cargo", HPG), FirewallSupport::Audit),
    with_firewall(entry("cocoapods", "cocoapods", "CocoaPods", P), FirewallSupport::Audit),
    with_firewall(entry("composer", "composer", "Composer", P), FirewallSupport::Audit),
    entry("p2", "p2", "P2", P),
    with_firewall(entry("swift", "swift", "Swift", HPG), FirewallSupport::Audit),
    entry("terraform", "terraform", "Terraform", HPG),
    with_firewall(entry("huggingface", "huggingface", "Hugging Face", P), FirewallSupport::Audit),
    with_firewall(entry("rubygems", "rubygems", "RubyGems", HPG), FirewallSupport::Audit),
    entry("gitlfs", "gitlfs", "Git LFS", H),
];

/// Look up a format by its resource name segment
pub fn find(key: &str) -> Option<&'static Format> {
    FORMATS.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(FORMATS.len(), 21);
        let maven = find("maven").unwrap();
        assert_eq!(maven.wire, "maven2");
        assert_eq!(maven.resource_name(Role::Hosted), "nxrm_repository_maven_hosted");
        assert_eq!(maven.noun(Role::Proxy), "Maven Proxy Repository");
        assert!(find("gitlfs").unwrap().supports(Role::Hosted));
        assert!(!find("gitlfs").unwrap().supports(Role::Proxy));
        assert!(!find("go").unwrap().supports(Role::Hosted));
        assert!(find("docker").unwrap().group_deploy);
        assert!(!find("raw").unwrap().firewall.is_supported());
    }

    #[test]
    fn test_resource_count() {
        let count: usize = FORMATS.iter().map(|f| f.roles.len()).sum();
        assert_eq!(count, 50);
    }
}
