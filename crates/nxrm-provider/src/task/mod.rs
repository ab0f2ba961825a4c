//! Scheduled task resources
//!
//! One resource type per entry of [`TASK_TYPES`], sharing the record below.
//! The `frequency` block is folded into the single upstream `frequency`
//! field; the type's property table supplies the `properties` block.

mod frequency;
mod types;

pub use frequency::{FrequencyModel, SCHEDULES};
pub use types::{find, TaskType, TASK_TYPES};

use async_trait::async_trait;
use nxrm_client::{ClientError, Result as ClientResult, TaskApi};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, FieldGate, Schema, Validator};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;
use crate::properties::{self, PropertySpec};

/// Oldest server offering the tasks API with create and update
pub const TASK_MIN_VERSION: Version = Version::new(3, 79, 0);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskModel {
    pub id: Attr<String>,
    pub name: Attr<String>,
    pub enabled: Attr<bool>,
    pub alert_email: Attr<String>,
    pub notification_condition: Attr<String>,
    pub frequency: Attr<FrequencyModel>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub properties: Attr<Map<String, JsonValue>>,
    pub last_updated: Attr<String>,
}

/// Descriptor for one task type
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    kind: &'static TaskType,
    specs: Vec<PropertySpec>,
}

impl TaskDescriptor {
    pub fn new(kind: &'static TaskType) -> Self {
        Self {
            kind,
            specs: (kind.properties)(),
        }
    }

    fn body(&self, model: &TaskModel) -> TaskApi {
        TaskApi {
            id: model.id.to_option(),
            kind: self.kind.wire_type.to_string(),
            name: model.name.known_or(String::new()),
            enabled: Some(model.enabled.known_or(true)),
            alert_email: model.alert_email.to_option(),
            notification_condition: Some(model.notification_condition.known_or("FAILURE".to_string())),
            frequency: model.frequency.value().map(FrequencyModel::to_wire),
            properties: properties::to_wire(&self.specs, model.properties.value()),
            ..Default::default()
        }
    }

    fn id(model: &TaskModel) -> ClientResult<String> {
        model.id.to_option().ok_or_else(|| ClientError::InvalidConfig {
            message: "task id is not known".to_string(),
        })
    }
}

#[async_trait]
impl ResourceDescriptor for TaskDescriptor {
    type Model = TaskModel;
    type Api = TaskApi;

    fn type_name(&self) -> String {
        self.kind.resource_name()
    }

    fn noun(&self) -> String {
        self.kind.title.to_string()
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new(
            self.kind.description,
            attrs([
                (
                    "id",
                    Attribute::computed_string()
                        .use_state_for_unknown()
                        .describe("Server-assigned task identifier"),
                ),
                ("name", Attribute::required_string().validate(Validator::LengthAtLeast(1))),
                ("enabled", Attribute::optional_bool().default_value(json!(true))),
                (
                    "alert_email",
                    Attribute::optional_string().describe("Address notified about task runs"),
                ),
                (
                    "notification_condition",
                    Attribute::optional_string()
                        .default_value(json!("FAILURE"))
                        .validate(Validator::one_of(&["FAILURE", "SUCCESS_FAILURE"])),
                ),
                ("frequency", frequency::schema_attribute()),
            ]),
        );
        if let Some(props) = properties::properties_attribute(&self.specs) {
            schema.attributes.insert("properties".to_string(), props);
        }
        schema.attributes.insert(
            "last_updated".to_string(),
            Attribute::computed_string().describe("Time of the last successful apply"),
        );
        if self.kind.replace_on_any_change {
            schema = schema.replace_on_any_change();
        }
        schema
    }

    fn identifier_attribute(&self) -> &'static str {
        "id"
    }

    fn identifier(&self, model: &TaskModel) -> Option<String> {
        model.id.to_option()
    }

    fn set_identifier(&self, model: &mut TaskModel, id: String) {
        model.id = Attr::Known(id);
    }

    fn min_version(&self) -> Option<Version> {
        Some(TASK_MIN_VERSION)
    }

    fn field_gates(&self) -> Vec<FieldGate> {
        (self.kind.gates)()
    }

    fn validate(&self, plan: &TaskModel) -> Diagnostics {
        plan.frequency
            .value()
            .map(FrequencyModel::validate)
            .unwrap_or_default()
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &TaskModel) -> ClientResult<Option<String>> {
        let mut body = self.body(plan);
        body.id = None;
        let created = ctx.client().create_task(&body).await?;
        Ok(created.id)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &TaskModel) -> ClientResult<TaskApi> {
        ctx.client().get_task(&Self::id(state)?).await
    }

    async fn do_update(&self, ctx: &ProviderContext, plan: &TaskModel, state: &TaskModel) -> ClientResult<()> {
        let id = Self::id(state)?;
        let mut body = self.body(plan);
        body.id = Some(id.clone());
        ctx.client().update_task(&id, &body).await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &TaskModel) -> ClientResult<()> {
        ctx.client().delete_task(&Self::id(state)?).await
    }

    /// Single-task reads may omit the schedule and properties; what is absent
    /// keeps its state value.
    fn update_state_from_api(&self, state: &mut TaskModel, api: TaskApi) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(id) = api.id {
            state.id = Attr::Known(id);
        }
        if !api.name.is_empty() {
            state.name = Attr::Known(api.name);
        }
        if let Some(enabled) = api.enabled {
            state.enabled = Attr::Known(enabled);
        }
        if api.alert_email.is_some() {
            state.alert_email = Attr::from_option(api.alert_email);
        }
        if let Some(condition) = api.notification_condition {
            state.notification_condition = Attr::Known(condition);
        }
        if let Some(frequency) = api.frequency {
            let folded = FrequencyModel::from_wire(frequency, state.frequency.value());
            state.frequency = Attr::Known(folded);
        }
        if !api.properties.is_empty() {
            let (values, warnings) =
                properties::from_wire(self.kind.title, &self.specs, &api.properties, state.properties.value());
            diags.extend(warnings);
            if !self.specs.is_empty() {
                state.properties = Attr::Known(values);
            }
        }
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxrm_client::TaskFrequency;

    fn compact() -> TaskDescriptor {
        TaskDescriptor::new(find("blobstore_compact").unwrap())
    }

    #[test]
    fn test_body() {
        let model = TaskModel {
            name: Attr::Known("compact-default".to_string()),
            enabled: Attr::Known(true),
            frequency: Attr::Known(FrequencyModel {
                schedule: Attr::Known("cron".to_string()),
                cron_expression: Attr::Known("0 0 2 * * ?".to_string()),
                ..Default::default()
            }),
            properties: Attr::Known(
                json!({"blob_store_name": "default", "blobs_older_than": 7})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            ..Default::default()
        };
        let body = serde_json::to_value(compact().body(&model)).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "blobstore.compact",
                "name": "compact-default",
                "enabled": true,
                "notificationCondition": "FAILURE",
                "frequency": {"schedule": "cron", "cronExpression": "0 0 2 * * ?"},
                "properties": {"blobstoreName": "default", "blobsOlderThan": "7"}
            })
        );
    }

    #[test]
    fn test_sparse_read_keeps_state() {
        let mut state = TaskModel {
            id: Attr::Known("t1".to_string()),
            name: Attr::Known("compact-default".to_string()),
            enabled: Attr::Known(false),
            frequency: Attr::Known(FrequencyModel {
                schedule: Attr::Known("manual".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let api = TaskApi {
            id: Some("t1".to_string()),
            kind: "blobstore.compact".to_string(),
            name: "compact-default".to_string(),
            current_state: Some("WAITING".to_string()),
            ..Default::default()
        };
        let diags = compact().update_state_from_api(&mut state, api);
        assert!(diags.is_empty());
        assert_eq!(state.enabled, Attr::Known(false));
        assert!(state.frequency.is_known());
    }

    #[test]
    fn test_recurring_days_keep_declared_order() {
        let prior = FrequencyModel {
            schedule: Attr::Known("weekly".to_string()),
            recurring_days: Attr::Known(vec![5, 1]),
            ..Default::default()
        };
        let wire = TaskFrequency {
            schedule: "weekly".to_string(),
            recurring_days: Some(vec![1, 5]),
            ..Default::default()
        };
        let folded = FrequencyModel::from_wire(wire, Some(&prior));
        assert_eq!(folded.recurring_days, Attr::Known(vec![5, 1]));
    }

    #[test]
    fn test_replace_on_any_change() {
        let descriptor = TaskDescriptor::new(find("repository_docker_upload_purge").unwrap());
        let schema = descriptor.schema();
        assert!(schema.attributes["name"].has_modifier(nxrm_core::PlanModifier::RequiresReplace));
        assert!(!compact().schema().attributes["name"].has_modifier(nxrm_core::PlanModifier::RequiresReplace));
    }
}
