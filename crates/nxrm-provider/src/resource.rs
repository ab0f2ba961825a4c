//! Host-runtime facing resource and data source contracts

use async_trait::async_trait;
use nxrm_core::{Diagnostic, Diagnostics, Schema, ServerVersion};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::context::ProviderContext;

/// Result of planning one resource change
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanResponse {
    pub planned_state: JsonValue,
    pub requires_replace: Vec<String>,
    pub has_changes: bool,
    pub diagnostics: Diagnostics,
}

/// Result of create and update
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyResponse {
    /// New state; `None` means the resource must be dropped from state
    pub state: Option<JsonValue>,
    pub diagnostics: Diagnostics,
}

impl ApplyResponse {
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            state: None,
            diagnostics: diagnostic.into(),
        }
    }
}

/// Result of read, import and data source reads
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadResponse {
    /// Observed state; `None` means the resource no longer exists
    pub state: Option<JsonValue>,
    pub diagnostics: Diagnostics,
}

impl ReadResponse {
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            state: None,
            diagnostics: diagnostic.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

/// A managed resource type
///
/// Implementations must be Send + Sync; the provider shares them across
/// concurrently reconciled resources.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `nxrm_repository_maven_hosted`
    fn type_name(&self) -> &str;

    fn schema(&self) -> &Schema;

    /// Validate `config` and compute the planned state
    fn plan(
        &self,
        version: Option<&ServerVersion>,
        prior: Option<&JsonValue>,
        config: &JsonValue,
    ) -> PlanResponse;

    async fn create(&self, ctx: &ProviderContext, planned: &JsonValue) -> ApplyResponse;

    async fn read(&self, ctx: &ProviderContext, state: &JsonValue) -> ReadResponse;

    async fn update(
        &self,
        ctx: &ProviderContext,
        planned: &JsonValue,
        prior: &JsonValue,
    ) -> ApplyResponse;

    async fn delete(&self, ctx: &ProviderContext, prior: &JsonValue) -> DeleteResponse;

    async fn import(&self, ctx: &ProviderContext, id: &str) -> ReadResponse;
}

/// A read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> &Schema;

    async fn read(&self, ctx: &ProviderContext, config: &JsonValue) -> ReadResponse;
}
