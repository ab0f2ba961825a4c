//! Server version detection and feature gates
//!
//! The upstream server advertises itself in the `Server` response header, e.g.
//! `Nexus/3.76.0-03 (PRO)`. Descriptors declare the minimum version they need
//! and reconcile operations consult the gate before issuing requests.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CoreError, Result};

static SERVER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Nexus/(\d+)\.(\d+)\.(\d+)(?:-(\d+))?(?:\s+\((\w+)\))?").expect("valid regex")
});

/// Server edition as reported in the `Server` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Pro,
    Community,
    Oss,
    Unknown,
}

impl Edition {
    fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PRO" => Edition::Pro,
            "COMMUNITY" | "CORE" => Edition::Community,
            "OSS" => Edition::Oss,
            _ => Edition::Unknown,
        }
    }
}

/// Version of the upstream server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub build: u64,
    pub edition: Edition,
}

impl ServerVersion {
    pub fn new(major: u64, minor: u64, patch: u64, build: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
            edition: Edition::Unknown,
        }
    }

    /// Parse a `Server` header value
    pub fn parse_header(header: &str) -> Result<Self> {
        let caps = SERVER_HEADER
            .captures(header.trim())
            .ok_or_else(|| CoreError::InvalidVersion {
                value: header.to_string(),
            })?;

        let num = |i: usize| -> u64 {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };

        Ok(Self {
            major: num(1),
            minor: num(2),
            patch: num(3),
            build: num(4),
            edition: caps
                .get(5)
                .map(|m| Edition::parse(m.as_str()))
                .unwrap_or(Edition::Unknown),
        })
    }

    /// The semver triple (build number dropped)
    pub fn semver(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }

    pub fn is_at_least(&self, min: &Version) -> bool {
        self.semver() >= *min
    }

    pub fn is_pro(&self) -> bool {
        self.edition == Edition::Pro
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.build,
        ))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}-{:02}", self.major, self.minor, self.patch, self.build)
    }
}

/// What to do when a gated field is used against an older server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Drop the field from the request and warn
    Skip,
    /// Refuse the plan with an InvalidConfig diagnostic
    Reject,
}

/// A per-field version requirement
#[derive(Debug, Clone)]
pub struct FieldGate {
    /// Attribute path as shown to the user
    pub attribute: &'static str,
    pub min: Version,
    pub policy: GatePolicy,
}

impl FieldGate {
    pub const fn reject(attribute: &'static str, major: u64, minor: u64, patch: u64) -> Self {
        Self {
            attribute,
            min: Version::new(major, minor, patch),
            policy: GatePolicy::Reject,
        }
    }

    pub const fn skip(attribute: &'static str, major: u64, minor: u64, patch: u64) -> Self {
        Self {
            attribute,
            min: Version::new(major, minor, patch),
            policy: GatePolicy::Skip,
        }
    }

    /// Whether the field may be sent to a server of this version.
    ///
    /// An undetected server version never blocks.
    pub fn allows(&self, version: Option<&ServerVersion>) -> bool {
        version.is_none_or(|v| v.is_at_least(&self.min))
    }
}

/// Check a whole-resource minimum version
pub fn require_version(
    noun: &str,
    min: Option<&Version>,
    version: Option<&ServerVersion>,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    if let (Some(min), Some(version)) = (min, version) {
        if !version.is_at_least(min) {
            diags.push(Diagnostic::error(
                format!("{} is not supported by this server", noun),
                format!(
                    "{} requires Sonatype Nexus Repository {} or later; the server reports {}.",
                    noun, min, version
                ),
            ));
        }
    }
    diags
}

/// Evaluate field gates for the fields that are set in a plan.
///
/// `is_set` reports whether the attribute at a gate's path carries a value.
pub fn check_field_gates(
    gates: &[FieldGate],
    version: Option<&ServerVersion>,
    is_set: impl Fn(&str) -> bool,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for gate in gates {
        if gate.allows(version) || !is_set(gate.attribute) {
            continue;
        }
        let reported = version.map(ToString::to_string).unwrap_or_default();
        match gate.policy {
            GatePolicy::Reject => diags.push(
                Diagnostic::error(
                    "Attribute not supported by this server version",
                    format!(
                        "`{}` requires Sonatype Nexus Repository {} or later; the server reports {}.",
                        gate.attribute, gate.min, reported
                    ),
                )
                .at(gate.attribute),
            ),
            GatePolicy::Skip => diags.push(
                Diagnostic::warning(
                    "Attribute ignored for this server version",
                    format!(
                        "`{}` is only sent to Sonatype Nexus Repository {} or later; the server reports {}.",
                        gate.attribute, gate.min, reported
                    ),
                )
                .at(gate.attribute),
            ),
        }
    }
    diags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pro_header() {
        let v = ServerVersion::parse_header("Nexus/3.76.0-03 (PRO)").unwrap();
        assert_eq!((v.major, v.minor, v.patch, v.build), (3, 76, 0, 3));
        assert!(v.is_pro());
        assert_eq!(v.to_string(), "3.76.0-03");
    }

    #[test]
    fn test_parse_without_edition() {
        let v = ServerVersion::parse_header("Nexus/3.45.1-01").unwrap();
        assert_eq!(v.minor, 45);
        assert_eq!(v.edition, Edition::Unknown);
    }

    #[test]
    fn test_parse_community() {
        let v = ServerVersion::parse_header("Nexus/3.77.0-08 (COMMUNITY)").unwrap();
        assert_eq!(v.edition, Edition::Community);
    }

    #[test]
    fn test_parse_rejects_other_servers() {
        assert!(ServerVersion::parse_header("Jetty(9.4.53)").is_err());
    }

    #[test]
    fn test_ordering_uses_build() {
        let a = ServerVersion::new(3, 76, 0, 1);
        let b = ServerVersion::new(3, 76, 0, 3);
        assert!(a < b);
        assert!(a.is_at_least(&Version::new(3, 76, 0)));
        assert!(!a.is_at_least(&Version::new(3, 77, 0)));
    }

    #[test]
    fn test_require_version() {
        let old = ServerVersion::new(3, 70, 0, 1);
        let diags = require_version("Capability", Some(&Version::new(3, 84, 0)), Some(&old));
        assert!(diags.has_error());
        assert!(diags.contains("3.84.0"));

        let none = require_version("Capability", Some(&Version::new(3, 84, 0)), None);
        assert!(none.is_empty());
    }

    #[test]
    fn test_field_gates() {
        let gates = [
            FieldGate::reject("docker.path_enabled", 3, 83, 0),
            FieldGate::skip("properties.blobs_older_than", 3, 79, 0),
        ];
        let old = ServerVersion::new(3, 70, 0, 0);

        let diags = check_field_gates(&gates, Some(&old), |_| true);
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.warnings().count(), 1);

        let unset = check_field_gates(&gates, Some(&old), |_| false);
        assert!(unset.is_empty());

        let new = ServerVersion::new(3, 85, 0, 0);
        assert!(check_field_gates(&gates, Some(&new), |_| true).is_empty());
    }
}
