//! Blob store resources: file, S3, Google Cloud Storage and group
//!
//! All kinds share the name, an optional soft quota and the last-updated
//! stamp; the kind-specific records live in the submodules.

pub mod file;
pub mod gcs;
pub mod group;
pub mod s3;

pub use file::{FileBlobStoreDescriptor, FileBlobStoreModel};
pub use gcs::{GcsBlobStoreDescriptor, GcsBlobStoreModel};
pub use group::{GroupBlobStoreDescriptor, GroupBlobStoreModel};
pub use s3::{S3BlobStoreDescriptor, S3BlobStoreModel};

use nxrm_client::SoftQuota;
use nxrm_core::{attrs, block, Attr, Attribute, Attributes, Validator};
use serde::{Deserialize, Serialize};

pub const SOFT_QUOTA_TYPES: &[&str] = &["spaceUsedQuota", "spaceRemainingQuota"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftQuotaModel {
    #[serde(rename = "type")]
    pub kind: Attr<String>,
    pub limit_bytes: Attr<i64>,
}

impl SoftQuotaModel {
    pub fn to_wire(quota: &Attr<SoftQuotaModel>) -> Option<SoftQuota> {
        let quota = quota.value()?;
        Some(SoftQuota {
            kind: quota.kind.to_option()?,
            limit: quota.limit_bytes.known_or(0),
        })
    }

    pub fn from_wire(quota: Option<SoftQuota>) -> Attr<SoftQuotaModel> {
        Attr::from_option(quota.map(|q| SoftQuotaModel {
            kind: Attr::Known(q.kind),
            limit_bytes: Attr::Known(q.limit),
        }))
    }
}

/// Attributes every blob store kind carries
pub(crate) fn common_attributes(what: &str) -> Attributes {
    attrs([
        (
            "name",
            Attribute::required_string()
                .requires_replace()
                .validate(Validator::LengthAtLeast(1))
                .describe(format!("Name of the {}", what)),
        ),
        (
            "soft_quota",
            Attribute::optional(block(attrs([
                (
                    "type",
                    Attribute::required_string().validate(Validator::one_of(SOFT_QUOTA_TYPES)),
                ),
                (
                    "limit_bytes",
                    Attribute::required_int64().validate(Validator::AtLeast(0)),
                ),
            ])))
            .describe("Raises an alert when the quota is exceeded"),
        ),
    ])
}

pub(crate) fn last_updated_attribute() -> Attributes {
    attrs([(
        "last_updated",
        Attribute::computed_string().describe("Time of the last successful apply"),
    )])
}

/// Empty strings on the wire mean "not set"
pub(crate) fn non_empty(value: Option<String>) -> Attr<String> {
    Attr::from_option(value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_quota_wire_names() {
        let quota = Attr::Known(SoftQuotaModel {
            kind: Attr::Known("spaceUsedQuota".to_string()),
            limit_bytes: Attr::Known(1048576),
        });
        let wire = SoftQuotaModel::to_wire(&quota).unwrap();
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            serde_json::json!({"type": "spaceUsedQuota", "limit": 1048576})
        );
        assert_eq!(SoftQuotaModel::from_wire(Some(wire)), quota);
        assert!(SoftQuotaModel::from_wire(None).is_null());
    }

    #[test]
    fn test_unknown_quota_type_is_not_sent() {
        let quota = Attr::Known(SoftQuotaModel {
            kind: Attr::Unknown,
            limit_bytes: Attr::Known(10),
        });
        assert!(SoftQuotaModel::to_wire(&quota).is_none());
    }
}
