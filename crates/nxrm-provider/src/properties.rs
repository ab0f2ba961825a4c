//! Typed property bags for capabilities and tasks
//!
//! Upstream stores capability and task properties as a flat string map. Each
//! type declares a table of [`PropertySpec`]s; the table drives the
//! `properties` schema block and the conversion between typed attribute values
//! and wire strings. Keys the server reports that no spec declares are
//! surfaced as warnings.

use std::collections::BTreeMap;

use nxrm_core::{block, is_unknown, Attribute, AttributeType, Diagnostic, Diagnostics, Validator};
use serde_json::{Map, Value as JsonValue};

/// Placeholder the server returns instead of a stored secret
pub const SECRET_PLACEHOLDER: &str = "#~NXRM~PLACEHOLDER~PASSWORD~#";

/// Value kind of one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    /// Sensitive string; never echoed back by the server
    Secret,
    Bool,
    Int,
    /// Comma separated on the wire
    StringSet,
}

/// Declaration of one property
#[derive(Debug, Clone)]
pub struct PropertySpec {
    /// Attribute name inside the `properties` block
    pub attribute: &'static str,
    /// Key in the upstream property map
    pub wire: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    pub default: Option<JsonValue>,
    pub description: &'static str,
    pub validators: Vec<Validator>,
}

impl PropertySpec {
    fn new(attribute: &'static str, wire: &'static str, kind: PropertyKind) -> Self {
        Self {
            attribute,
            wire,
            kind,
            required: false,
            default: None,
            description: "",
            validators: Vec::new(),
        }
    }

    pub fn string(attribute: &'static str, wire: &'static str) -> Self {
        Self::new(attribute, wire, PropertyKind::String)
    }

    pub fn secret(attribute: &'static str, wire: &'static str) -> Self {
        Self::new(attribute, wire, PropertyKind::Secret)
    }

    pub fn bool(attribute: &'static str, wire: &'static str) -> Self {
        Self::new(attribute, wire, PropertyKind::Bool)
    }

    pub fn int(attribute: &'static str, wire: &'static str) -> Self {
        Self::new(attribute, wire, PropertyKind::Int)
    }

    pub fn string_set(attribute: &'static str, wire: &'static str) -> Self {
        Self::new(attribute, wire, PropertyKind::StringSet)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    fn attribute_type(&self) -> AttributeType {
        match self.kind {
            PropertyKind::String | PropertyKind::Secret => AttributeType::String,
            PropertyKind::Bool => AttributeType::Bool,
            PropertyKind::Int => AttributeType::Int64,
            PropertyKind::StringSet => Attribute::string_set(),
        }
    }

    pub fn schema_attribute(&self) -> Attribute {
        let mut attr = if self.required {
            Attribute::required(self.attribute_type())
        } else {
            Attribute::optional(self.attribute_type())
        };
        if let Some(default) = &self.default {
            attr = attr.default_value(default.clone());
        }
        if self.kind == PropertyKind::Secret {
            attr = attr.sensitive();
        }
        for validator in &self.validators {
            attr = attr.validate(validator.clone());
        }
        attr.describe(self.description)
    }

    /// Wire string for a known value; Null and Unknown are not sent
    pub fn encode(&self, value: &JsonValue) -> Option<String> {
        if value.is_null() || is_unknown(value) {
            return None;
        }
        match (self.kind, value) {
            (PropertyKind::String | PropertyKind::Secret, JsonValue::String(s)) => Some(s.clone()),
            (PropertyKind::Bool, JsonValue::Bool(b)) => Some(b.to_string()),
            (PropertyKind::Int, JsonValue::Number(n)) => Some(n.to_string()),
            (PropertyKind::StringSet, JsonValue::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            (_, other) => Some(other.to_string()),
        }
    }

    /// Typed value of a wire string
    pub fn decode(&self, raw: &str) -> Result<JsonValue, String> {
        match self.kind {
            PropertyKind::String | PropertyKind::Secret => Ok(JsonValue::String(raw.to_string())),
            PropertyKind::Bool => match raw.trim() {
                "true" => Ok(JsonValue::Bool(true)),
                "false" => Ok(JsonValue::Bool(false)),
                other => Err(format!("expected true or false, got \"{}\"", other)),
            },
            PropertyKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(JsonValue::from)
                .map_err(|_| format!("expected an integer, got \"{}\"", raw)),
            PropertyKind::StringSet => Ok(JsonValue::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| JsonValue::String(s.to_string()))
                    .collect(),
            )),
        }
    }
}

/// The `properties` block, or `None` for types without properties
pub fn properties_attribute(specs: &[PropertySpec]) -> Option<Attribute> {
    if specs.is_empty() {
        return None;
    }
    let fields = specs
        .iter()
        .map(|spec| (spec.attribute.to_string(), spec.schema_attribute()))
        .collect();
    let any_required = specs.iter().any(|s| s.required);
    let kind = block(fields);
    Some(if any_required {
        Attribute::required(kind)
    } else {
        Attribute::optional_computed(kind)
    })
}

/// Encode known values into the upstream string map
pub fn to_wire(specs: &[PropertySpec], values: Option<&Map<String, JsonValue>>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(values) = values else {
        return out;
    };
    for spec in specs {
        let value = values
            .get(spec.attribute)
            .cloned()
            .or_else(|| spec.default.clone())
            .unwrap_or(JsonValue::Null);
        if let Some(encoded) = spec.encode(&value) {
            out.insert(spec.wire.to_string(), encoded);
        }
    }
    out
}

/// Decode the upstream string map.
///
/// Secrets the server does not echo keep their `prior` value, as do sets
/// whose elements are unchanged (to keep the declared order).
pub fn from_wire(
    noun: &str,
    specs: &[PropertySpec],
    wire: &BTreeMap<String, String>,
    prior: Option<&Map<String, JsonValue>>,
) -> (Map<String, JsonValue>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut out = Map::new();
    let prior_value = |attr: &str| prior.and_then(|p| p.get(attr)).cloned();

    for spec in specs {
        let raw = wire.get(spec.wire).map(String::as_str);
        let value = match (spec.kind, raw) {
            (PropertyKind::Secret, None) | (PropertyKind::Secret, Some(SECRET_PLACEHOLDER)) => {
                prior_value(spec.attribute).unwrap_or(JsonValue::Null)
            }
            (_, None) => JsonValue::Null,
            (_, Some(raw)) => match spec.decode(raw) {
                Ok(decoded) => decoded,
                Err(e) => {
                    diags.push(
                        Diagnostic::warning(
                            format!("Unexpected {} property value", noun),
                            format!("Property \"{}\": {}", spec.wire, e),
                        )
                        .at(format!("properties.{}", spec.attribute)),
                    );
                    JsonValue::Null
                }
            },
        };
        let value = match (spec.kind, prior_value(spec.attribute)) {
            (PropertyKind::StringSet, Some(previous)) if same_elements(&previous, &value) => previous,
            _ => value,
        };
        out.insert(spec.attribute.to_string(), value);
    }

    for key in wire.keys() {
        if !specs.iter().any(|s| s.wire == key) {
            diags.push(Diagnostic::warning(
                format!("Unexpected {} property", noun),
                format!(
                    "The server reported property \"{}\", which this resource does not manage.",
                    key
                ),
            ));
        }
    }
    (out, diags)
}

fn same_elements(a: &JsonValue, b: &JsonValue) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(a), Some(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook() -> Vec<PropertySpec> {
        vec![
            PropertySpec::string_set("names", "names").required(),
            PropertySpec::string("url", "url").required(),
            PropertySpec::secret("secret", "secret"),
            PropertySpec::bool("enabled_flag", "enabledFlag").default_value(json!(false)),
            PropertySpec::int("timeout", "timeout"),
        ]
    }

    #[test]
    fn test_to_wire() {
        let values = json!({
            "names": ["repository", "component"],
            "url": "https://hooks.example.com",
            "secret": null,
            "timeout": 30
        });
        let wire = to_wire(&webhook(), values.as_object());
        assert_eq!(wire["names"], "repository,component");
        assert_eq!(wire["enabledFlag"], "false");
        assert_eq!(wire["timeout"], "30");
        assert!(!wire.contains_key("secret"));
    }

    #[test]
    fn test_from_wire_keeps_secret_and_set_order() {
        let prior = json!({
            "names": ["repository", "component"],
            "secret": "s3cr3t"
        });
        let wire: BTreeMap<String, String> = [
            ("names", "component,repository"),
            ("url", "https://hooks.example.com"),
            ("secret", SECRET_PLACEHOLDER),
            ("enabledFlag", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let (values, diags) = from_wire("Webhook", &webhook(), &wire, prior.as_object());
        assert!(diags.is_empty());
        assert_eq!(values["names"], json!(["repository", "component"]));
        assert_eq!(values["secret"], "s3cr3t");
        assert_eq!(values["enabled_flag"], true);
        assert!(values["timeout"].is_null());
    }

    #[test]
    fn test_from_wire_reports_unmanaged_keys() {
        let wire: BTreeMap<String, String> = [("url", "u"), ("names", "a"), ("extra", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let (_, diags) = from_wire("Webhook", &webhook(), &wire, None);
        assert_eq!(diags.len(), 1);
        assert!(diags.contains("extra"));
        assert!(!diags.has_error());
    }

    #[test]
    fn test_bad_bool_is_a_warning() {
        let wire: BTreeMap<String, String> = [("enabledFlag", "maybe")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let (values, diags) = from_wire("Webhook", &webhook(), &wire, None);
        assert!(values["enabled_flag"].is_null());
        assert!(!diags.has_error());
        assert!(diags.contains("expected true or false"));
    }

    #[test]
    fn test_properties_attribute() {
        let attr = properties_attribute(&webhook()).unwrap();
        assert!(attr.required);
        let nested = attr.nested().unwrap();
        assert!(nested["secret"].sensitive);
        assert!(properties_attribute(&[]).is_none());
    }
}
