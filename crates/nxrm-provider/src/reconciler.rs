//! Generic lifecycle driver
//!
//! [`Reconciler`] turns a [`ResourceDescriptor`] into a [`Resource`]:
//!
//! - **Plan**: schema planning, whole-resource and per-field version gates,
//!   cross-attribute validation
//! - **Create / Update**: pre-apply checks, the upstream call, the paired
//!   firewall capability, a read-back, last-updated stamping
//! - **Read**: drift detection; a 404 drops the resource from state
//! - **Delete**: capability first, then the entity with retry on 500
//! - **Import**: seed from an identifier and read

use async_trait::async_trait;
use nxrm_client::CapabilityApi;
use nxrm_core::{
    check_field_gates, clear_unknowns, last_updated_now, require_version, Diagnostic,
    Diagnostics, GatePolicy, Schema, ServerVersion,
};
use serde_json::Value as JsonValue;

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;
use crate::firewall::FirewallCoordinator;
use crate::mapping::{self, classify, Operation, Outcome};
use crate::resource::{ApplyResponse, DeleteResponse, PlanResponse, ReadResponse, Resource};

/// Attribute stamped with the time of the last successful apply
pub const LAST_UPDATED: &str = "last_updated";

/// Whether the attribute at a dotted path carries a value in `value`.
///
/// Unknown counts as set: it will carry a value at apply time.
pub fn is_path_set(value: &JsonValue, path: &str) -> bool {
    let mut current = value;
    for part in path.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return false,
        }
    }
    !current.is_null()
}

/// Null the attribute at a dotted path, if present
pub fn clear_path(value: &mut JsonValue, path: &str) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(last) = parts.pop() else { return };
    let mut current = value;
    for part in parts {
        match current.get_mut(part) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(map) = current.as_object_mut() {
        if map.contains_key(last) {
            map.insert(last.to_string(), JsonValue::Null);
        }
    }
}

/// Lifecycle driver for one resource type
pub struct Reconciler<D: ResourceDescriptor> {
    descriptor: D,
    type_name: String,
    noun: String,
    schema: Schema,
}

impl<D: ResourceDescriptor> Reconciler<D> {
    pub fn new(descriptor: D) -> Self {
        Self {
            type_name: descriptor.type_name(),
            noun: descriptor.noun(),
            schema: descriptor.schema(),
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    pub fn noun(&self) -> &str {
        &self.noun
    }

    fn decode(&self, what: &str, value: &JsonValue) -> Result<D::Model, Diagnostic> {
        serde_json::from_value(value.clone()).map_err(|e| {
            Diagnostic::error(
                format!("Invalid {} for {}", what, self.type_name),
                e.to_string(),
            )
        })
    }

    /// Encode a record as committed state.
    ///
    /// Nothing may stay unknown once an apply succeeded.
    fn commit(&self, model: &D::Model, stamp: bool) -> Result<JsonValue, Diagnostic> {
        let mut value = serde_json::to_value(model).map_err(|e| {
            Diagnostic::error(format!("Invalid state for {}", self.type_name), e.to_string())
        })?;
        if stamp && self.schema.attributes.contains_key(LAST_UPDATED) {
            if let Some(map) = value.as_object_mut() {
                map.insert(LAST_UPDATED.to_string(), JsonValue::String(last_updated_now()));
            }
        }
        clear_unknowns(&mut value);
        Ok(value)
    }

    fn apply_result(&self, model: &D::Model, stamp: bool, mut diagnostics: Diagnostics) -> ApplyResponse {
        match self.commit(model, stamp) {
            Ok(state) => ApplyResponse {
                state: Some(state),
                diagnostics,
            },
            Err(d) => {
                diagnostics.push(d);
                ApplyResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }

    fn require_version(&self, ctx: &ProviderContext) -> Diagnostics {
        require_version(&self.noun, self.descriptor.min_version().as_ref(), ctx.version())
    }

    /// Version checks evaluated at plan time
    fn version_diagnostics(&self, version: Option<&ServerVersion>, config: &JsonValue) -> Diagnostics {
        let mut diags = require_version(&self.noun, self.descriptor.min_version().as_ref(), version);
        diags.extend(check_field_gates(&self.descriptor.field_gates(), version, |path| {
            is_path_set(config, path)
        }));
        diags
    }

    /// The record as sent upstream: fields gated with Skip are dropped.
    ///
    /// The plan record itself keeps them so state matches configuration.
    fn request_model(&self, plan: &JsonValue, version: Option<&ServerVersion>) -> Result<D::Model, Diagnostic> {
        let skipped: Vec<_> = self
            .descriptor
            .field_gates()
            .into_iter()
            .filter(|g| g.policy == GatePolicy::Skip && !g.allows(version))
            .collect();
        if skipped.is_empty() {
            return self.decode("plan", plan);
        }
        let mut stripped = plan.clone();
        for gate in &skipped {
            tracing::debug!(resource = %self.type_name, attribute = gate.attribute, "dropping gated field");
            clear_path(&mut stripped, gate.attribute);
        }
        self.decode("plan", &stripped)
    }

    fn firewall<'c>(&self, ctx: &'c ProviderContext) -> Option<FirewallCoordinator<'c>> {
        let support = self.descriptor.firewall_support();
        support
            .is_supported()
            .then(|| FirewallCoordinator::new(ctx.client(), support))
    }

    /// Read the entity back and fold it onto `state`
    async fn read_back(
        &self,
        ctx: &ProviderContext,
        id: &str,
        state: &mut D::Model,
        plan: &D::Model,
        diags: &mut Diagnostics,
    ) {
        match classify(Operation::Read, &self.noun, id, self.descriptor.do_read(ctx, state).await) {
            Outcome::Done(api) => diags.extend(self.descriptor.update_state_from_api(state, api)),
            Outcome::Gone(d) | Outcome::Failed(d) => diags.push(d),
        }
        self.descriptor.map_missing_from_plan(state, plan);
    }

    /// Bring the capability in line with the declared block.
    ///
    /// Returns the capability now paired with the repository. A failure is
    /// reported but leaves the repository itself in state, so the next apply
    /// only retries the capability.
    async fn reconcile_firewall(
        &self,
        ctx: &ProviderContext,
        id: &str,
        plan: &D::Model,
        prior: Option<&D::Model>,
        diags: &mut Diagnostics,
    ) -> Option<CapabilityApi> {
        let coordinator = self.firewall(ctx)?;
        let wanted = self.descriptor.firewall_block(plan);
        let had = prior.and_then(|p| self.descriptor.firewall_block(p));

        match (wanted, had) {
            (Some(settings), _) => match coordinator.ensure(id, &settings).await {
                Ok(capability) => Some(capability),
                Err(e) => {
                    let op = if prior.is_some() { Operation::Update } else { Operation::Create };
                    diags.push(mapping::api_error(op, FirewallCoordinator::noun(), &e));
                    None
                }
            },
            (None, Some(previous)) => {
                match coordinator.remove(id, previous.capability_id.to_option()).await {
                    Outcome::Done(()) => {}
                    Outcome::Gone(w) => diags.push(w),
                    Outcome::Failed(e) => diags.push(e),
                }
                None
            }
            (None, None) => None,
        }
    }

    /// Fold whatever capability the server holds for this repository
    async fn observe_firewall(&self, ctx: &ProviderContext, id: &str, state: &mut D::Model, diags: &mut Diagnostics) {
        let Some(coordinator) = self.firewall(ctx) else {
            return;
        };
        match coordinator.find_by_repository_id(id).await {
            Ok(capability) => self
                .descriptor
                .update_state_with_capability(state, capability.as_ref()),
            Err(e) => diags.push(mapping::api_error(
                Operation::Read,
                FirewallCoordinator::noun(),
                &e,
            )),
        }
    }
}

#[async_trait]
impl<D: ResourceDescriptor> Resource for Reconciler<D> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn plan(
        &self,
        version: Option<&ServerVersion>,
        prior: Option<&JsonValue>,
        config: &JsonValue,
    ) -> PlanResponse {
        let change = self.schema.plan(prior, config);
        let mut diagnostics = change.diagnostics;
        diagnostics.extend(self.version_diagnostics(version, config));

        if !diagnostics.has_error() {
            match self.decode("configuration", &change.planned_state) {
                Ok(model) => diagnostics.extend(self.descriptor.validate(&model)),
                Err(d) => diagnostics.push(d),
            }
        }

        PlanResponse {
            planned_state: change.planned_state,
            requires_replace: change.requires_replace,
            has_changes: change.has_changes,
            diagnostics,
        }
    }

    async fn create(&self, ctx: &ProviderContext, planned: &JsonValue) -> ApplyResponse {
        let mut plan = match self.decode("plan", planned) {
            Ok(m) => m,
            Err(d) => return ApplyResponse::failed(d),
        };
        let mut diags = self.require_version(ctx);
        diags.extend(self.descriptor.pre_apply_checks(ctx, &plan).await);
        if diags.has_error() {
            return ApplyResponse {
                state: None,
                diagnostics: diags,
            };
        }

        let request = match self.request_model(planned, ctx.version()) {
            Ok(m) => m,
            Err(d) => return ApplyResponse::failed(d),
        };
        let name = self.descriptor.identifier(&plan).unwrap_or_default();
        tracing::info!(resource = %self.type_name, id = %name, "creating");

        match classify(
            Operation::Create,
            &self.noun,
            &name,
            self.descriptor.do_create(ctx, &request).await,
        ) {
            Outcome::Done(Some(assigned)) => self.descriptor.set_identifier(&mut plan, assigned),
            Outcome::Done(None) => {}
            Outcome::Gone(d) | Outcome::Failed(d) => {
                diags.push(d);
                return ApplyResponse {
                    state: None,
                    diagnostics: diags,
                };
            }
        }
        let id = self.descriptor.identifier(&plan).unwrap_or(name);

        let capability = self.reconcile_firewall(ctx, &id, &plan, None, &mut diags).await;

        let mut state = plan.clone();
        self.read_back(ctx, &id, &mut state, &plan, &mut diags).await;
        if self.descriptor.firewall_support().is_supported() {
            self.descriptor
                .update_state_with_capability(&mut state, capability.as_ref());
        }
        self.descriptor.update_plan_for_state(&mut state);
        self.apply_result(&state, true, diags)
    }

    async fn read(&self, ctx: &ProviderContext, state: &JsonValue) -> ReadResponse {
        let prior = match self.decode("state", state) {
            Ok(m) => m,
            Err(d) => return ReadResponse::failed(d),
        };
        let Some(id) = self.descriptor.identifier(&prior) else {
            return ReadResponse {
                state: Some(state.clone()),
                diagnostics: Diagnostics::new(),
            };
        };

        let mut diags = Diagnostics::new();
        let mut current = prior.clone();
        match classify(Operation::Read, &self.noun, &id, self.descriptor.do_read(ctx, &prior).await) {
            Outcome::Done(api) => diags.extend(self.descriptor.update_state_from_api(&mut current, api)),
            Outcome::Gone(w) => {
                return ReadResponse {
                    state: None,
                    diagnostics: w.into(),
                };
            }
            Outcome::Failed(e) => {
                return ReadResponse {
                    state: Some(state.clone()),
                    diagnostics: e.into(),
                };
            }
        }
        self.descriptor.map_missing_from_plan(&mut current, &prior);
        self.observe_firewall(ctx, &id, &mut current, &mut diags).await;

        match self.commit(&current, false) {
            Ok(value) => ReadResponse {
                state: Some(value),
                diagnostics: diags,
            },
            Err(d) => {
                diags.push(d);
                ReadResponse {
                    state: Some(state.clone()),
                    diagnostics: diags,
                }
            }
        }
    }

    async fn update(&self, ctx: &ProviderContext, planned: &JsonValue, prior: &JsonValue) -> ApplyResponse {
        let plan = match self.decode("plan", planned) {
            Ok(m) => m,
            Err(d) => return ApplyResponse::failed(d),
        };
        let previous = match self.decode("state", prior) {
            Ok(m) => m,
            Err(d) => return ApplyResponse::failed(d),
        };
        let keep_prior = |diagnostics: Diagnostics| ApplyResponse {
            state: Some(prior.clone()),
            diagnostics,
        };

        let mut diags = self.require_version(ctx);
        diags.extend(self.descriptor.pre_apply_checks(ctx, &plan).await);
        if diags.has_error() {
            return keep_prior(diags);
        }
        let request = match self.request_model(planned, ctx.version()) {
            Ok(m) => m,
            Err(d) => return keep_prior(d.into()),
        };

        let id = self
            .descriptor
            .identifier(&previous)
            .or_else(|| self.descriptor.identifier(&plan))
            .unwrap_or_default();
        tracing::info!(resource = %self.type_name, id = %id, "updating");

        match classify(
            Operation::Update,
            &self.noun,
            &id,
            self.descriptor.do_update(ctx, &request, &previous).await,
        ) {
            Outcome::Done(()) => {}
            Outcome::Gone(w) => {
                diags.push(w);
                return ApplyResponse {
                    state: None,
                    diagnostics: diags,
                };
            }
            Outcome::Failed(e) => {
                diags.push(e);
                return keep_prior(diags);
            }
        }

        let capability = self
            .reconcile_firewall(ctx, &id, &plan, Some(&previous), &mut diags)
            .await;

        let mut state = plan.clone();
        if self.descriptor.identifier(&state).is_none() {
            self.descriptor.set_identifier(&mut state, id.clone());
        }
        self.read_back(ctx, &id, &mut state, &plan, &mut diags).await;
        if self.descriptor.firewall_support().is_supported() {
            self.descriptor
                .update_state_with_capability(&mut state, capability.as_ref());
        }
        self.descriptor.update_plan_for_state(&mut state);
        self.apply_result(&state, true, diags)
    }

    async fn delete(&self, ctx: &ProviderContext, prior: &JsonValue) -> DeleteResponse {
        let previous = match self.decode("state", prior) {
            Ok(m) => m,
            Err(d) => {
                return DeleteResponse {
                    diagnostics: d.into(),
                };
            }
        };
        let Some(id) = self.descriptor.identifier(&previous) else {
            return DeleteResponse::default();
        };
        let mut diagnostics = Diagnostics::new();

        if let (Some(coordinator), Some(block)) = (
            self.firewall(ctx),
            self.descriptor.firewall_block(&previous),
        ) {
            match coordinator.remove(&id, block.capability_id.to_option()).await {
                Outcome::Done(()) => {}
                Outcome::Gone(w) => diagnostics.push(w),
                Outcome::Failed(e) => {
                    diagnostics.push(e);
                    return DeleteResponse { diagnostics };
                }
            }
        }

        tracing::info!(resource = %self.type_name, id = %id, "deleting");
        let descriptor = &self.descriptor;
        let model = &previous;
        match mapping::delete_with_retry(&self.noun, &id, move || descriptor.do_delete(ctx, model)).await {
            Outcome::Done(()) => {}
            Outcome::Gone(w) | Outcome::Failed(w) => diagnostics.push(w),
        }
        DeleteResponse { diagnostics }
    }

    async fn import(&self, ctx: &ProviderContext, id: &str) -> ReadResponse {
        let mut diags = self.require_version(ctx);
        if diags.has_error() {
            return ReadResponse {
                state: None,
                diagnostics: diags,
            };
        }
        let seed = match self.descriptor.import_model(id) {
            Ok(m) => m,
            Err(d) => return ReadResponse::failed(d),
        };
        let entity_id = self
            .descriptor
            .identifier(&seed)
            .unwrap_or_else(|| id.to_string());
        tracing::info!(resource = %self.type_name, id = %entity_id, "importing");

        let mut state = seed.clone();
        match classify(Operation::Import, &self.noun, id, self.descriptor.do_read(ctx, &seed).await) {
            Outcome::Done(api) => diags.extend(self.descriptor.update_state_from_api(&mut state, api)),
            Outcome::Gone(d) | Outcome::Failed(d) => return ReadResponse::failed(d),
        }
        self.observe_firewall(ctx, &entity_id, &mut state, &mut diags).await;
        self.descriptor.update_plan_for_state(&mut state);

        match self.commit(&state, true) {
            Ok(value) => ReadResponse {
                state: Some(value),
                diagnostics: diags,
            },
            Err(d) => {
                diags.push(d);
                ReadResponse {
                    state: None,
                    diagnostics: diags,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_path_set() {
        let config = json!({"docker": {"path_enabled": true, "subdomain": null}, "name": "d"});
        assert!(is_path_set(&config, "docker.path_enabled"));
        assert!(!is_path_set(&config, "docker.subdomain"));
        assert!(!is_path_set(&config, "replication.preemptive_pull_enabled"));
        assert!(is_path_set(&config, "name"));
    }

    #[test]
    fn test_clear_path() {
        let mut plan = json!({"properties": {"blobs_older_than": 30, "blob_store_name": "default"}});
        clear_path(&mut plan, "properties.blobs_older_than");
        assert!(plan["properties"]["blobs_older_than"].is_null());
        assert_eq!(plan["properties"]["blob_store_name"], "default");

        clear_path(&mut plan, "missing.path");
        assert!(plan.get("missing").is_none());
    }
}
