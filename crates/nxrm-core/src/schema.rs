//! Attribute schemas for resources, data sources and the provider block
//!
//! Schemas are plain data composed from shared fragments: a resource schema is
//! an ordered map of attributes, each carrying its type, its
//! required/optional/computed flags, an optional default, plan-time validators
//! and plan modifiers.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::diagnostics::Diagnostic;

/// Ordered attribute map
pub type Attributes = IndexMap<String, Attribute>;

/// Attribute value type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "element")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Float64,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Single nested block
    Object(Attributes),
}

impl AttributeType {
    /// Shallow shape check of a known JSON value
    pub fn accepts(&self, value: &JsonValue) -> bool {
        match (self, value) {
            (AttributeType::String, JsonValue::String(_)) => true,
            (AttributeType::Bool, JsonValue::Bool(_)) => true,
            (AttributeType::Int64, JsonValue::Number(n)) => n.is_i64() || n.is_u64(),
            (AttributeType::Float64, JsonValue::Number(_)) => true,
            (AttributeType::List(_) | AttributeType::Set(_), JsonValue::Array(_)) => true,
            (AttributeType::Map(_) | AttributeType::Object(_), JsonValue::Object(_)) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::Int64 => "number".to_string(),
            AttributeType::Float64 => "number".to_string(),
            AttributeType::List(e) => format!("list of {}", e.name()),
            AttributeType::Set(e) => format!("set of {}", e.name()),
            AttributeType::Map(e) => format!("map of {}", e.name()),
            AttributeType::Object(_) => "object".to_string(),
        }
    }
}

/// Per-attribute planning rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Carry the prior state value instead of planning an unknown
    UseStateForUnknown,
    /// A change of this attribute destroys and re-creates the resource
    RequiresReplace,
}

static URL_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/]+").expect("valid regex"));

/// Plan-time value validator
#[derive(Debug, Clone)]
pub enum Validator {
    /// String must be one of a closed set
    OneOf(Vec<&'static str>),
    /// Integer within an inclusive range
    Between(i64, i64),
    /// Integer at least this value
    AtLeast(i64),
    /// String of at least this many characters
    LengthAtLeast(usize),
    /// List, set or map must not be empty
    NotEmpty,
    /// Every integer element of a list or set within an inclusive range
    ElementsBetween(i64, i64),
    /// String must match a pattern
    Matches(Regex, &'static str),
    /// String must be an absolute URL with one of these schemes
    UrlScheme(Vec<&'static str>),
}

impl Validator {
    pub fn one_of(values: &[&'static str]) -> Self {
        Validator::OneOf(values.to_vec())
    }

    pub fn matches(pattern: &str, message: &'static str) -> Self {
        Validator::Matches(Regex::new(pattern).expect("valid validator pattern"), message)
    }

    pub fn http_url() -> Self {
        Validator::UrlScheme(vec!["http", "https"])
    }

    /// Validate a known value; Null and Unknown are never passed here
    pub fn check(&self, path: &str, value: &JsonValue) -> Option<Diagnostic> {
        let invalid = |detail: String| {
            Some(Diagnostic::error("Invalid Attribute Value", detail).at(path))
        };

        match self {
            Validator::OneOf(allowed) => {
                let s = value.as_str()?;
                if allowed.contains(&s) {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} value must be one of: [{}], got: \"{}\"",
                        path,
                        allowed
                            .iter()
                            .map(|a| format!("\"{}\"", a))
                            .collect::<Vec<_>>()
                            .join(" "),
                        s
                    ))
                }
            }
            Validator::Between(min, max) => {
                let n = value.as_i64()?;
                if (*min..=*max).contains(&n) {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} value must be between {} and {}, got: {}",
                        path, min, max, n
                    ))
                }
            }
            Validator::AtLeast(min) => {
                let n = value.as_i64()?;
                if n >= *min {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} value must be at least {}, got: {}",
                        path, min, n
                    ))
                }
            }
            Validator::LengthAtLeast(min) => {
                let s = value.as_str()?;
                if s.chars().count() >= *min {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} string length must be at least {}, got: {}",
                        path,
                        min,
                        s.chars().count()
                    ))
                }
            }
            Validator::NotEmpty => {
                let empty = match value {
                    JsonValue::Array(items) => items.is_empty(),
                    JsonValue::Object(map) => map.is_empty(),
                    _ => false,
                };
                if empty {
                    invalid(format!("Attribute {} cannot be empty", path))
                } else {
                    None
                }
            }
            Validator::ElementsBetween(min, max) => {
                let items = value.as_array()?;
                let bad: Vec<String> = items
                    .iter()
                    .filter_map(JsonValue::as_i64)
                    .filter(|n| !(*min..=*max).contains(n))
                    .map(|n| n.to_string())
                    .collect();
                if bad.is_empty() {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} elements must be between {} and {}, got: {}",
                        path,
                        min,
                        max,
                        bad.join(", ")
                    ))
                }
            }
            Validator::Matches(re, message) => {
                let s = value.as_str()?;
                if re.is_match(s) {
                    None
                } else {
                    invalid(format!("Attribute {} {}, got: \"{}\"", path, message, s))
                }
            }
            Validator::UrlScheme(schemes) => {
                let s = value.as_str()?;
                let ok = url::Url::parse(s)
                    .map(|u| schemes.contains(&u.scheme()) && u.host_str().is_some())
                    .unwrap_or(false)
                    && URL_LIKE.is_match(s);
                if ok {
                    None
                } else {
                    invalid(format!(
                        "Attribute {} must be a valid URL with scheme {}, got: \"{}\"",
                        path,
                        schemes.join(" or "),
                        s
                    ))
                }
            }
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::OneOf(values) => write!(f, "one of [{}]", values.join(", ")),
            Validator::Between(min, max) => write!(f, "between {} and {}", min, max),
            Validator::AtLeast(min) => write!(f, "at least {}", min),
            Validator::LengthAtLeast(min) => write!(f, "length at least {}", min),
            Validator::NotEmpty => write!(f, "not empty"),
            Validator::ElementsBetween(min, max) => {
                write!(f, "elements between {} and {}", min, max)
            }
            Validator::Matches(re, _) => write!(f, "matches {}", re.as_str()),
            Validator::UrlScheme(schemes) => write!(f, "URL ({})", schemes.join("/")),
        }
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single attribute declaration
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub kind: AttributeType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    fn base(kind: AttributeType) -> Self {
        Self {
            kind,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    pub fn required(kind: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::base(kind)
        }
    }

    pub fn optional(kind: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::base(kind)
        }
    }

    /// Set by the provider only
    pub fn computed(kind: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::base(kind)
        }
    }

    /// Optional; the server fills a value in when the operator does not
    pub fn optional_computed(kind: AttributeType) -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::base(kind)
        }
    }

    pub fn required_string() -> Self {
        Self::required(AttributeType::String)
    }

    pub fn optional_string() -> Self {
        Self::optional(AttributeType::String)
    }

    pub fn computed_string() -> Self {
        Self::computed(AttributeType::String)
    }

    pub fn required_bool() -> Self {
        Self::required(AttributeType::Bool)
    }

    pub fn optional_bool() -> Self {
        Self::optional(AttributeType::Bool)
    }

    pub fn required_int64() -> Self {
        Self::required(AttributeType::Int64)
    }

    pub fn optional_int64() -> Self {
        Self::optional(AttributeType::Int64)
    }

    pub fn string_list() -> AttributeType {
        AttributeType::List(Box::new(AttributeType::String))
    }

    pub fn string_set() -> AttributeType {
        AttributeType::Set(Box::new(AttributeType::String))
    }

    pub fn int64_set() -> AttributeType {
        AttributeType::Set(Box::new(AttributeType::Int64))
    }

    pub fn string_map() -> AttributeType {
        AttributeType::Map(Box::new(AttributeType::String))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Static default; makes the attribute optional and computed
    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self.optional = true;
        self.computed = true;
        self.required = false;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn requires_replace(mut self) -> Self {
        if !self.plan_modifiers.contains(&PlanModifier::RequiresReplace) {
            self.plan_modifiers.push(PlanModifier::RequiresReplace);
        }
        self
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    /// Nested attributes when this is a single nested block
    pub fn nested(&self) -> Option<&Attributes> {
        match &self.kind {
            AttributeType::Object(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn nested_mut(&mut self) -> Option<&mut Attributes> {
        match &mut self.kind {
            AttributeType::Object(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Build a single nested block attribute
pub fn block(attributes: Attributes) -> AttributeType {
    AttributeType::Object(attributes)
}

/// Build an ordered attribute map from `(name, attribute)` pairs
pub fn attrs<const N: usize>(items: [(&str, Attribute); N]) -> Attributes {
    items
        .into_iter()
        .map(|(name, attr)| (name.to_string(), attr))
        .collect()
}

/// Schema for a resource, data source or the provider block
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub version: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: Attributes,
}

impl Schema {
    pub fn new(description: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes,
        }
    }

    /// Merge a fragment into the top level; later attributes win
    pub fn with(mut self, fragment: Attributes) -> Self {
        self.attributes.extend(fragment);
        self
    }

    /// Look up an attribute by dotted path
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut parts = path.split('.');
        let mut current = self.attributes.get(parts.next()?)?;
        for part in parts {
            current = current.nested()?.get(part)?;
        }
        Some(current)
    }

    /// Mark every configurable attribute as forcing replacement.
    ///
    /// Used by resource types whose upstream offers no update endpoint.
    pub fn replace_on_any_change(mut self) -> Self {
        fn mark(attrs: &mut Attributes) {
            for attr in attrs.values_mut() {
                if attr.required || attr.optional {
                    *attr = attr.clone().requires_replace();
                }
                if let Some(nested) = attr.nested_mut() {
                    mark(nested);
                }
            }
        }
        mark(&mut self.attributes);
        self
    }

    /// Read-only mirror of a resource schema.
    ///
    /// The `keys` become required lookup arguments, `optional_keys` stay
    /// optional, and everything else is computed.
    pub fn as_data_source(&self, keys: &[&str], optional_keys: &[&str]) -> Schema {
        fn computed_only(attrs: &Attributes) -> Attributes {
            attrs
                .iter()
                .map(|(name, attr)| {
                    let mut kind = attr.kind.clone();
                    if let AttributeType::Object(nested) = &kind {
                        kind = AttributeType::Object(computed_only(nested));
                    }
                    let out = Attribute {
                        sensitive: attr.sensitive,
                        description: attr.description.clone(),
                        ..Attribute::computed(kind)
                    };
                    (name.clone(), out)
                })
                .collect()
        }

        let mut attributes = computed_only(&self.attributes);
        for key in keys {
            if let Some(attr) = attributes.get_mut(*key) {
                attr.required = true;
                attr.computed = false;
            }
        }
        for key in optional_keys {
            if let Some(attr) = attributes.get_mut(*key) {
                attr.optional = true;
            }
        }
        Schema {
            version: self.version,
            description: self.description.clone(),
            attributes,
        }
    }

    /// Paths of every sensitive attribute
    pub fn sensitive_paths(&self) -> Vec<String> {
        fn walk(prefix: &str, attrs: &Attributes, out: &mut Vec<String>) {
            for (name, attr) in attrs {
                let path = join_path(prefix, name);
                if attr.sensitive {
                    out.push(path.clone());
                }
                if let Some(nested) = attr.nested() {
                    walk(&path, nested, out);
                }
            }
        }
        let mut out = Vec::new();
        walk("", &self.attributes, &mut out);
        out
    }

    /// Copy of `value` with every sensitive attribute masked, for display
    pub fn redact(&self, value: &JsonValue) -> JsonValue {
        fn walk(attrs: &Attributes, value: &JsonValue) -> JsonValue {
            let JsonValue::Object(map) = value else {
                return value.clone();
            };
            let mut out = map.clone();
            for (name, attr) in attrs {
                let Some(v) = map.get(name) else { continue };
                if attr.sensitive && !v.is_null() {
                    out.insert(name.clone(), JsonValue::String("(sensitive value)".to_string()));
                } else if let Some(nested) = attr.nested() {
                    out.insert(name.clone(), walk(nested, v));
                }
            }
            JsonValue::Object(out)
        }
        walk(&self.attributes, value)
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
