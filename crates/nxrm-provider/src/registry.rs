//! Resource and data source registry
//!
//! Every resource type is registered once through a descriptor factory; the
//! registry builds both the managed resource and its read-only lookup data
//! source from it.

use indexmap::IndexMap;

use crate::blob_store::{
    FileBlobStoreDescriptor, GcsBlobStoreDescriptor, GroupBlobStoreDescriptor, S3BlobStoreDescriptor,
};
use crate::capability::{CapabilityDescriptor, CAPABILITY_TYPES};
use crate::data_source::{list_data_sources, LookupDataSource};
use crate::descriptor::ResourceDescriptor;
use crate::reconciler::Reconciler;
use crate::repository;
use crate::resource::{DataSource, Resource};
use crate::routing_rule::RoutingRuleDescriptor;
use crate::security::{
    AnonymousAccessDescriptor, ContentSelectorDescriptor, RealmsDescriptor, RoleDescriptor,
    UserDescriptor,
};
use crate::task::{TaskDescriptor, TASK_TYPES};

/// Registered resource and data source types, in registration order
#[derive(Default)]
pub struct Registry {
    resources: IndexMap<String, Box<dyn Resource>>,
    data_sources: IndexMap<String, Box<dyn DataSource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in type
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        repository::register(&mut registry);

        registry.register(|| FileBlobStoreDescriptor);
        registry.register(|| S3BlobStoreDescriptor);
        registry.register(|| GcsBlobStoreDescriptor);
        registry.register(|| GroupBlobStoreDescriptor);

        for kind in CAPABILITY_TYPES {
            registry.register(|| CapabilityDescriptor::new(kind));
        }
        for kind in TASK_TYPES {
            registry.register(|| TaskDescriptor::new(kind));
        }

        registry.register(|| RoleDescriptor);
        registry.register_keyed(|| UserDescriptor, &["user_id"], &["source"]);
        registry.register_keyed(|| RealmsDescriptor, &[], &[]);
        registry.register_keyed(|| AnonymousAccessDescriptor, &[], &[]);
        registry.register(|| ContentSelectorDescriptor);
        registry.register(|| RoutingRuleDescriptor);

        for ds in list_data_sources() {
            registry.add_data_source(ds);
        }
        registry
    }

    /// Register a resource type and its lookup data source
    pub fn register<D: ResourceDescriptor>(&mut self, make: impl Fn() -> D) {
        let descriptor = make();
        let key = descriptor.identifier_attribute();
        self.add_resource(Reconciler::new(descriptor));
        self.add_data_source(LookupDataSource::with_keys(make(), &[key], &[]));
    }

    /// Like [`Registry::register`], with explicit lookup arguments
    pub fn register_keyed<D: ResourceDescriptor>(&mut self, make: impl Fn() -> D, keys: &[&str], optional: &[&str]) {
        self.add_resource(Reconciler::new(make()));
        self.add_data_source(LookupDataSource::with_keys(make(), keys, optional));
    }

    pub fn add_resource(&mut self, resource: impl Resource + 'static) {
        let name = resource.type_name().to_string();
        if self.resources.insert(name.clone(), Box::new(resource)).is_some() {
            tracing::warn!(resource = %name, "resource type registered twice");
        }
    }

    pub fn add_data_source(&mut self, data_source: impl DataSource + 'static) {
        let name = data_source.type_name().to_string();
        if self.data_sources.insert(name.clone(), Box::new(data_source)).is_some() {
            tracing::warn!(data_source = %name, "data source registered twice");
        }
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn Resource> {
        self.resources.get(type_name).map(|r| r.as_ref())
    }

    pub fn data_source(&self, type_name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(type_name).map(|d| d.as_ref())
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_surface() {
        let registry = Registry::builtin();
        let resources: Vec<&str> = registry.resource_names().collect();
        let repositories = resources
            .iter()
            .filter(|n| n.starts_with("nxrm_repository_"))
            .count();
        assert_eq!(repositories, 50);
        assert_eq!(
            resources.len(),
            50 + 4 + CAPABILITY_TYPES.len() + TASK_TYPES.len() + 6
        );
        for name in [
            "nxrm_blob_store_file",
            "nxrm_blob_store_gcs",
            "nxrm_role",
            "nxrm_user",
            "nxrm_security_realms",
            "nxrm_anonymous_access",
            "nxrm_content_selector",
            "nxrm_routing_rule",
            "nxrm_capability_core_base_url",
            "nxrm_task_blobstore_compact",
        ] {
            assert!(registry.resource(name).is_some(), "missing {}", name);
            assert!(registry.data_source(name).is_some(), "missing data source {}", name);
        }
        assert!(registry.data_source("nxrm_repositories").is_some());
        assert!(registry.resource("nxrm_repositories").is_none());
        assert_eq!(registry.data_source_names().count(), resources.len() + 6);
    }

    #[test]
    fn test_user_lookup_arguments() {
        let registry = Registry::builtin();
        let schema = registry.data_source("nxrm_user").unwrap().schema();
        assert!(schema.attributes["user_id"].required);
        assert!(schema.attributes["source"].optional);
        assert!(!schema.attributes["password"].optional);
    }
}
