//! Catalog of managed task types

use nxrm_core::{FieldGate, Validator};
use serde_json::json;

use crate::properties::PropertySpec;

/// One scheduled task type
#[derive(Debug, Clone, Copy)]
pub struct TaskType {
    /// Resource suffix, e.g. `blobstore_compact`
    pub key: &'static str,
    /// Upstream `type`
    pub wire_type: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub properties: fn() -> Vec<PropertySpec>,
    /// Per-property version requirements
    pub gates: fn() -> Vec<FieldGate>,
    /// No update endpoint is known to accept this type; any change replaces
    pub replace_on_any_change: bool,
}

impl TaskType {
    pub fn resource_name(&self) -> String {
        format!("nxrm_task_{}", self.key)
    }
}

fn no_properties() -> Vec<PropertySpec> {
    Vec::new()
}

fn no_gates() -> Vec<FieldGate> {
    Vec::new()
}

fn repository_name() -> PropertySpec {
    PropertySpec::string("repository_name", "repositoryName")
        .required()
        .describe("Repository the task runs against; `*` for all")
}

fn blob_store_name() -> PropertySpec {
    PropertySpec::string("blob_store_name", "blobstoreName")
        .required()
        .describe("Blob store the task runs against")
}

fn blobstore_compact() -> Vec<PropertySpec> {
    vec![
        blob_store_name(),
        PropertySpec::int("blobs_older_than", "blobsOlderThan")
            .validate(Validator::AtLeast(0))
            .describe("Only compact blobs deleted more than this many days ago"),
    ]
}

fn blobstore_compact_gates() -> Vec<FieldGate> {
    vec![FieldGate::skip("properties.blobs_older_than", 3, 81, 0)]
}

fn blobstore_delete_temp_files() -> Vec<PropertySpec> {
    vec![blob_store_name()]
}

fn docker_gc() -> Vec<PropertySpec> {
    vec![
        repository_name(),
        PropertySpec::int("deploy_offset", "deployOffset")
            .default_value(json!(24))
            .validate(Validator::AtLeast(0))
            .describe("Hours during which recently deployed layers are kept"),
    ]
}

fn docker_upload_purge() -> Vec<PropertySpec> {
    vec![PropertySpec::int("age", "age")
        .default_value(json!(24))
        .validate(Validator::AtLeast(0))
        .describe("Hours after which incomplete uploads are purged")]
}

fn maven_remove_snapshots() -> Vec<PropertySpec> {
    vec![
        repository_name(),
        PropertySpec::int("minimum_retained", "minimumRetained")
            .default_value(json!(1))
            .validate(Validator::AtLeast(0)),
        PropertySpec::int("snapshot_retention_days", "snapshotRetentionDays")
            .default_value(json!(30))
            .validate(Validator::AtLeast(0)),
        PropertySpec::bool("remove_if_released", "removeIfReleased").default_value(json!(false)),
        PropertySpec::int("grace_period_in_days", "gracePeriodInDays").validate(Validator::AtLeast(0)),
    ]
}

fn purge_unused() -> Vec<PropertySpec> {
    vec![
        repository_name(),
        PropertySpec::int("last_used", "lastUsed")
            .required()
            .validate(Validator::AtLeast(1))
            .describe("Purge items not downloaded for this many days"),
    ]
}

fn maven_rebuild_index() -> Vec<PropertySpec> {
    vec![repository_name()]
}

pub const TASK_TYPES: &[TaskType] = &[
    TaskType {
        key: "blobstore_compact",
        wire_type: "blobstore.compact",
        title: "Blob Store Compact Task",
        description: "Reclaims space used by soft-deleted blobs.",
        properties: blobstore_compact,
        gates: blobstore_compact_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "blobstore_delete_temp_files",
        wire_type: "blobstore.delete-temp-files",
        title: "Blob Store Delete Temporary Files Task",
        description: "Deletes temporary files left behind in a blob store.",
        properties: blobstore_delete_temp_files,
        gates: no_gates,
        replace_on_any_change: true,
    },
    TaskType {
        key: "repository_docker_gc",
        wire_type: "repository.docker.gc",
        title: "Docker Garbage Collection Task",
        description: "Deletes unreferenced Docker layers.",
        properties: docker_gc,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "repository_docker_upload_purge",
        wire_type: "repository.docker.upload-purge",
        title: "Docker Incomplete Upload Purge Task",
        description: "Purges incomplete Docker uploads.",
        properties: docker_upload_purge,
        gates: no_gates,
        replace_on_any_change: true,
    },
    TaskType {
        key: "repository_maven_remove_snapshots",
        wire_type: "repository.maven.remove-snapshots",
        title: "Maven Remove Snapshots Task",
        description: "Removes old Maven snapshot versions.",
        properties: maven_remove_snapshots,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "repository_maven_purge_unused_snapshots",
        wire_type: "repository.maven.purge-unused-snapshots",
        title: "Maven Purge Unused Snapshots Task",
        description: "Purges Maven snapshots that have not been downloaded recently.",
        properties: purge_unused,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "repository_purge_unused",
        wire_type: "repository.purge-unused",
        title: "Purge Unused Components Task",
        description: "Purges components and assets of proxy repositories that have not been downloaded recently.",
        properties: purge_unused,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "repository_maven_rebuild_index",
        wire_type: "repository.maven.rebuild-index",
        title: "Maven Rebuild Index Task",
        description: "Rebuilds the Maven index of a repository.",
        properties: maven_rebuild_index,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "security_purge_api_keys",
        wire_type: "security.purge-api-keys",
        title: "Purge Orphaned API Keys Task",
        description: "Deletes API keys of users that no longer exist.",
        properties: no_properties,
        gates: no_gates,
        replace_on_any_change: false,
    },
    TaskType {
        key: "tasklog_cleanup",
        wire_type: "tasklog.cleanup",
        title: "Task Log Cleanup Task",
        description: "Deletes old task log files.",
        properties: no_properties,
        gates: no_gates,
        replace_on_any_change: false,
    },
];

/// Look up a type by its resource suffix
pub fn find(key: &str) -> Option<&'static TaskType> {
    TASK_TYPES.iter().find(|t| t.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(TASK_TYPES.len(), 10);
        let compact = find("blobstore_compact").unwrap();
        assert_eq!(compact.resource_name(), "nxrm_task_blobstore_compact");
        assert_eq!((compact.gates)().len(), 1);
        assert!(find("blobstore_delete_temp_files").unwrap().replace_on_any_change);
    }
}
