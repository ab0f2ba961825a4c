//! Capability resources
//!
//! One resource type per entry of [`CAPABILITY_TYPES`]. All share the same
//! record and descriptor; the type's property table supplies the
//! `properties` block.

mod types;

pub use types::{find, CapabilityType, CAPABILITY_TYPES};

use async_trait::async_trait;
use nxrm_client::{CapabilityApi, ClientError, Result as ClientResult};
use nxrm_core::{attrs, Attr, Attribute, Diagnostics, Schema};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;
use crate::properties::{self, PropertySpec};

/// Oldest server offering the capabilities API
pub const CAPABILITY_MIN_VERSION: Version = Version::new(3, 84, 0);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityModel {
    pub id: Attr<String>,
    pub enabled: Attr<bool>,
    pub notes: Attr<String>,
    #[serde(skip_serializing_if = "Attr::is_null")]
    pub properties: Attr<Map<String, JsonValue>>,
    pub last_updated: Attr<String>,
}

/// Descriptor for one capability type
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    kind: &'static CapabilityType,
    specs: Vec<PropertySpec>,
}

impl CapabilityDescriptor {
    pub fn new(kind: &'static CapabilityType) -> Self {
        Self {
            kind,
            specs: (kind.properties)(),
        }
    }

    fn body(&self, model: &CapabilityModel) -> CapabilityApi {
        let mut body = CapabilityApi::new(self.kind.wire_type);
        body.id = model.id.to_option();
        body.enabled = model.enabled.known_or(true);
        body.notes = model.notes.known_or(String::new());
        body.properties = properties::to_wire(&self.specs, model.properties.value());
        body
    }

    fn id(model: &CapabilityModel) -> ClientResult<String> {
        model.id.to_option().ok_or_else(|| ClientError::InvalidConfig {
            message: "capability id is not known".to_string(),
        })
    }
}

#[async_trait]
impl ResourceDescriptor for CapabilityDescriptor {
    type Model = CapabilityModel;
    type Api = CapabilityApi;

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
                        .describe("Server-assigned capability identifier"),
                ),
                (
                    "enabled",
                    Attribute::optional_bool()
                        .default_value(json!(true))
                        .describe("Whether the capability is active"),
                ),
                (
                    "notes",
                    Attribute::optional_string().default_value(json!("")),
                ),
            ]),
        );
        if let Some(props) = properties::properties_attribute(&self.specs) {
            schema.attributes.insert("properties".to_string(), props);
        }
        schema.attributes.insert(
            "last_updated".to_string(),
            Attribute::computed_string().describe("Time of the last successful apply"),
        );
        schema
    }

    fn identifier_attribute(&self) -> &'static str {
        "id"
    }

    fn identifier(&self, model: &CapabilityModel) -> Option<String> {
        model.id.to_option()
    }

    fn set_identifier(&self, model: &mut CapabilityModel, id: String) {
        model.id = Attr::Known(id);
    }

    fn min_version(&self) -> Option<Version> {
        Some(CAPABILITY_MIN_VERSION)
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &CapabilityModel) -> ClientResult<Option<String>> {
        let mut body = self.body(plan);
        body.id = None;
        let created = ctx.client().create_capability(&body, &[200, 201]).await?;
        Ok(created.id)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &CapabilityModel) -> ClientResult<CapabilityApi> {
        let id = Self::id(state)?;
        ctx.client()
            .get_capability(&id)
            .await?
            .ok_or_else(|| ClientError::not_found(format!("capability {} not found", id)))
    }

    async fn do_update(
        &self,
        ctx: &ProviderContext,
        plan: &CapabilityModel,
        state: &CapabilityModel,
    ) -> ClientResult<()> {
        let id = Self::id(state)?;
        let mut body = self.body(plan);
        body.id = Some(id.clone());
        ctx.client().update_capability(&id, &body).await
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &CapabilityModel) -> ClientResult<()> {
        ctx.client().delete_capability(&Self::id(state)?).await
    }

    fn update_state_from_api(&self, state: &mut CapabilityModel, api: CapabilityApi) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if api.kind != self.kind.wire_type {
            diags.add_warning(
                format!("Unexpected {} type", self.kind.title),
                format!(
                    "Capability {} has type \"{}\", expected \"{}\".",
                    api.id.as_deref().unwrap_or_default(),
                    api.kind,
                    self.kind.wire_type
                ),
            );
        }
        if let Some(id) = api.id {
            state.id = Attr::Known(id);
        }
        state.enabled = Attr::Known(api.enabled);
        state.notes = Attr::Known(api.notes);

        let (values, warnings) =
            properties::from_wire(self.kind.title, &self.specs, &api.properties, state.properties.value());
        diags.extend(warnings);
        if !self.specs.is_empty() {
            state.properties = Attr::Known(values);
        }
        diags
    }

    fn map_missing_from_plan(&self, state: &mut CapabilityModel, plan: &CapabilityModel) {
        // Secrets are masked in listings; keep the declared value.
        let (Some(current), Some(declared)) = (state.properties.value_mut(), plan.properties.value()) else {
            return;
        };
        for spec in self.specs.iter().filter(|s| s.kind == properties::PropertyKind::Secret) {
            let missing = current.get(spec.attribute).is_none_or(JsonValue::is_null);
            if missing {
                if let Some(value) = declared.get(spec.attribute) {
                    current.insert(spec.attribute.to_string(), value.clone());
                }
            }
        }
    }
}
