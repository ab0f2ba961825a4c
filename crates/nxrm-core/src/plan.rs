//! Schema-driven validation and planning
//!
//! This is the part of the host runtime's planning the provider is answerable
//! for: configuration validation against the schema, static defaults, unknown
//! markers for computed attributes, "use state for unknown" and "requires
//! replace" plan modifiers.

use serde_json::{Map, Value as JsonValue};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{join_path, Attribute, AttributeType, Attributes, PlanModifier, Schema};
use crate::value::{is_unknown, unknown};

/// Result of planning one resource change
#[derive(Debug, Clone)]
pub struct PlannedChange {
    /// Proposed new state; computed attributes may be unknown
    pub planned_state: JsonValue,
    /// Attribute paths whose change forces replacement
    pub requires_replace: Vec<String>,
    /// Whether the plan differs from the prior state at all
    pub has_changes: bool,
    pub diagnostics: Diagnostics,
}

impl PlannedChange {
    pub fn is_replace(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

impl Schema {
    /// Validate a configuration object against the schema.
    ///
    /// Unknown values are skipped: they are validated again once known.
    pub fn validate_config(&self, config: &JsonValue) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match config {
            JsonValue::Object(map) => validate_attrs("", &self.attributes, map, &mut diags),
            JsonValue::Null => validate_attrs("", &self.attributes, &Map::new(), &mut diags),
            _ => diags.add_error(
                "Invalid configuration",
                "configuration must be an object",
            ),
        }
        diags
    }

    /// Plan a change from `prior` state (None on create) towards `config`.
    pub fn plan(&self, prior: Option<&JsonValue>, config: &JsonValue) -> PlannedChange {
        let diagnostics = self.validate_config(config);

        let empty = Map::new();
        let config_map = config.as_object().unwrap_or(&empty);
        let prior_map = prior.and_then(JsonValue::as_object);

        // First pass keeps prior values for computed attributes the operator
        // left unset, so a no-op refresh plans no change.
        let mut planned = plan_attrs(&self.attributes, config_map, prior_map, false);

        let has_changes = match prior {
            None => true,
            Some(p) => !values_equal(&planned, p),
        };

        // Any change makes computed attributes without "use state for unknown"
        // unknown again.
        if has_changes {
            planned = plan_attrs(&self.attributes, config_map, prior_map, true);
        }

        let mut requires_replace = Vec::new();
        if let Some(prior_map) = prior_map {
            collect_replacements("", &self.attributes, &planned, prior_map, &mut requires_replace);
        }

        PlannedChange {
            planned_state: planned,
            requires_replace,
            has_changes,
            diagnostics,
        }
    }
}

fn validate_attrs(
    prefix: &str,
    attrs: &Attributes,
    config: &Map<String, JsonValue>,
    diags: &mut Diagnostics,
) {
    for key in config.keys().filter(|k| !attrs.contains_key(k.as_str())) {
        let path = join_path(prefix, key);
        diags.push(
            Diagnostic::error(
                "Unsupported argument",
                format!("An argument named \"{}\" is not expected here.", path),
            )
            .at(path),
        );
    }

    for (name, attr) in attrs {
        let path = join_path(prefix, name);
        let value = config.get(name).unwrap_or(&JsonValue::Null);

        if value.is_null() {
            if attr.required {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", path),
                    )
                    .at(path),
                );
            }
            continue;
        }
        if attr.computed && !attr.optional && !attr.required {
            diags.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!("Can't configure a value for \"{}\": its value will be decided automatically.", path),
                )
                .at(path),
            );
            continue;
        }
        if is_unknown(value) {
            continue;
        }
        if !attr.kind.accepts(value) {
            diags.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("Inappropriate value for attribute \"{}\": {} required.", path, attr.kind.name()),
                )
                .at(path),
            );
            continue;
        }

        for validator in &attr.validators {
            if let Some(diag) = validator.check(&path, value) {
                diags.push(diag);
            }
        }

        match (&attr.kind, value) {
            (AttributeType::Object(nested), JsonValue::Object(map)) => {
                validate_attrs(&path, nested, map, diags);
            }
            (AttributeType::List(element) | AttributeType::Set(element), JsonValue::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_null() && !is_unknown(item) && !element.accepts(item) {
                        diags.push(
                            Diagnostic::error(
                                "Incorrect attribute value type",
                                format!("Element {} of \"{}\": {} required.", i, path, element.name()),
                            )
                            .at(format!("{}[{}]", path, i)),
                        );
                    }
                }
                if matches!(attr.kind, AttributeType::Set(_)) {
                    if let Some(dup) = first_duplicate(items) {
                        diags.push(
                            Diagnostic::error(
                                "Duplicate set element",
                                format!("Attribute {} contains duplicate element {}", path, dup),
                            )
                            .at(path),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn first_duplicate(items: &[JsonValue]) -> Option<&JsonValue> {
    items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(item))
        .map(|(_, item)| item)
}

fn plan_attrs(
    attrs: &Attributes,
    config: &Map<String, JsonValue>,
    prior: Option<&Map<String, JsonValue>>,
    changing: bool,
) -> JsonValue {
    let mut out = Map::new();
    for (name, attr) in attrs {
        let config_value = config.get(name).unwrap_or(&JsonValue::Null);
        let prior_value = prior.and_then(|p| p.get(name));
        out.insert(
            name.clone(),
            plan_attr(attr, config_value, prior_value, prior.is_some(), changing),
        );
    }
    JsonValue::Object(out)
}

fn plan_attr(
    attr: &Attribute,
    config_value: &JsonValue,
    prior_value: Option<&JsonValue>,
    has_prior: bool,
    changing: bool,
) -> JsonValue {
    let prior_known = prior_value.filter(|v| !v.is_null() && !is_unknown(v));

    if !config_value.is_null() {
        // Nested blocks are planned attribute by attribute so their own
        // defaults and computed members apply.
        if let (AttributeType::Object(nested), JsonValue::Object(map)) = (&attr.kind, config_value) {
            let nested_prior = prior_value.and_then(JsonValue::as_object);
            return plan_attrs(nested, map, nested_prior, changing);
        }
        return config_value.clone();
    }

    if let Some(default) = &attr.default {
        return default.clone();
    }

    if !attr.computed {
        return JsonValue::Null;
    }

    if attr.has_modifier(PlanModifier::UseStateForUnknown) {
        if let Some(prior) = prior_known {
            return prior.clone();
        }
    }

    if has_prior && !changing {
        return prior_value.cloned().unwrap_or(JsonValue::Null);
    }

    unknown()
}

fn collect_replacements(
    prefix: &str,
    attrs: &Attributes,
    planned: &JsonValue,
    prior: &Map<String, JsonValue>,
    out: &mut Vec<String>,
) {
    for (name, attr) in attrs {
        let path = join_path(prefix, name);
        let planned_value = planned.get(name).unwrap_or(&JsonValue::Null);
        let prior_value = prior.get(name).unwrap_or(&JsonValue::Null);

        if attr.has_modifier(PlanModifier::RequiresReplace)
            && !is_unknown(planned_value)
            && !values_equal(planned_value, prior_value)
        {
            out.push(path.clone());
            continue;
        }

        if let (Some(nested), Some(prior_nested)) = (attr.nested(), prior_value.as_object()) {
            collect_replacements(&path, nested, planned_value, prior_nested, out);
        }
    }
}

/// Structural equality where a missing key equals `null`
pub fn values_equal(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Object(ma), JsonValue::Object(mb)) => {
            let keys = ma.keys().chain(mb.keys());
            for key in keys {
                let va = ma.get(key).unwrap_or(&JsonValue::Null);
                let vb = mb.get(key).unwrap_or(&JsonValue::Null);
                if !values_equal(va, vb) {
                    return false;
                }
            }
            true
        }
        (JsonValue::Array(xa), JsonValue::Array(xb)) => {
            xa.len() == xb.len() && xa.iter().zip(xb).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}
