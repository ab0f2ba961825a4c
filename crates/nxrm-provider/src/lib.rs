//! nxrm Provider - Declarative resources for Sonatype Nexus Repository
//!
//! This crate provides:
//! - **Repositories**: one resource type per format and role (hosted, proxy, group)
//! - **Blob Stores**: file, S3, Google Cloud Storage and group stores
//! - **Capabilities and Tasks**: typed property maps with secret preservation
//! - **Security**: users, roles, realms, anonymous access and content selectors
//! - **Routing Rules**: allow and block rules referenced by proxies
//! - **Firewall**: audit and quarantine capability folded into proxy repositories
//! - **Data Sources**: single-object lookups and filtered listings
//!
//! Every resource type is a [`ResourceDescriptor`] driven by the generic
//! [`Reconciler`], which owns planning, drift handling, version gates and
//! error mapping. [`Provider`] is the entry point for a host runtime.

pub mod blob_store;
pub mod capability;
pub mod context;
pub mod data_source;
pub mod descriptor;
pub mod error;
pub mod firewall;
pub mod mapping;
pub mod properties;
pub mod provider;
pub mod reconciler;
pub mod registry;
pub mod repository;
pub mod resource;
pub mod routing_rule;
pub mod security;
pub mod task;

pub use context::ProviderContext;
pub use data_source::{list_data_sources, ListDataSource, LookupDataSource};
pub use descriptor::{FirewallSupport, Model, ResourceDescriptor};
pub use error::{ProviderError, Result};
pub use mapping::{Operation, Outcome};
pub use provider::Provider;
pub use reconciler::Reconciler;
pub use registry::Registry;
pub use resource::{ApplyResponse, DataSource, DeleteResponse, PlanResponse, ReadResponse, Resource};
