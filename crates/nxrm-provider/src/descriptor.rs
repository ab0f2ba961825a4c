//! Per-type descriptor contract
//!
//! A descriptor hides endpoint selection and model mapping for one resource
//! type. The generic [`Reconciler`](crate::reconciler::Reconciler) drives the
//! lifecycle and is the only caller.

use std::fmt;

use async_trait::async_trait;
use nxrm_client::{CapabilityApi, Result as ClientResult};
use nxrm_core::{Diagnostic, Diagnostics, FieldGate, Schema};
use semver::Version;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ProviderContext;
use crate::firewall::FirewallModel;

/// State record of one resource type
pub trait Model: Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> Model for T where
    T: Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
}

/// Firewall capability support of a repository format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirewallSupport {
    #[default]
    None,
    /// Audit and quarantine
    Audit,
    /// Audit and quarantine plus policy-compliant component selection
    AuditAndPccs,
}

impl FirewallSupport {
    pub fn is_supported(&self) -> bool {
        *self != FirewallSupport::None
    }

    pub fn has_pccs(&self) -> bool {
        *self == FirewallSupport::AuditAndPccs
    }
}

/// Descriptor for one resource type
#[async_trait]
pub trait ResourceDescriptor: Send + Sync + 'static {
    /// Record decoded from plan and state
    type Model: Model;
    /// Wire record returned by a read
    type Api: Send + 'static;

    /// Full type name, e.g. `nxrm_blob_store_file`
    fn type_name(&self) -> String;

    /// Human readable name used in diagnostics, e.g. "File Blob Store"
    fn noun(&self) -> String;

    fn schema(&self) -> Schema;

    /// Attribute holding the identifier
    fn identifier_attribute(&self) -> &'static str {
        "name"
    }

    /// Identifier of a record, if known
    fn identifier(&self, model: &Self::Model) -> Option<String>;

    /// Store an identifier: server-assigned on create, or from an import
    fn set_identifier(&self, model: &mut Self::Model, id: String);

    /// Oldest server version that offers the endpoints
    fn min_version(&self) -> Option<Version> {
        None
    }

    fn field_gates(&self) -> Vec<FieldGate> {
        Vec::new()
    }

    /// Cross-attribute rules the schema cannot express
    fn validate(&self, _plan: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    /// Checks against the server before create and update
    async fn pre_apply_checks(&self, _ctx: &ProviderContext, _plan: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    /// Create upstream; returns the server-assigned identifier, if any
    async fn do_create(
        &self,
        ctx: &ProviderContext,
        plan: &Self::Model,
    ) -> ClientResult<Option<String>>;

    async fn do_read(&self, ctx: &ProviderContext, state: &Self::Model) -> ClientResult<Self::Api>;

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> ClientResult<()>;

    async fn do_delete(&self, ctx: &ProviderContext, state: &Self::Model) -> ClientResult<()>;

    /// Seed a record from an import identifier
    fn import_model(&self, id: &str) -> Result<Self::Model, Diagnostic> {
        let mut model = Self::Model::default();
        self.set_identifier(&mut model, id.to_string());
        Ok(model)
    }

    /// Project a read response onto the record; warnings for unexpected data
    fn update_state_from_api(&self, state: &mut Self::Model, api: Self::Api) -> Diagnostics;

    /// Restore fields the server never echoes (secrets, plan-only fields)
    fn map_missing_from_plan(&self, _state: &mut Self::Model, _plan: &Self::Model) {}

    /// Stamp plan-only computed fields after a successful apply
    fn update_plan_for_state(&self, _state: &mut Self::Model) {}

    fn firewall_support(&self) -> FirewallSupport {
        FirewallSupport::None
    }

    /// The firewall block declared on a record
    fn firewall_block(&self, _model: &Self::Model) -> Option<FirewallModel> {
        None
    }

    /// Fold the paired firewall capability into the record
    fn update_state_with_capability(&self, _state: &mut Self::Model, _capability: Option<&CapabilityApi>) {}
}
