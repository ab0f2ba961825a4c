//! Three-valued attribute values
//!
//! The host runtime distinguishes three shapes for every attribute:
//!
//! - **Known**: a concrete value
//! - **Null**: explicitly absent
//! - **Unknown**: to be computed during apply (only appears in planned state)
//!
//! On the JSON boundary `null` encodes Null and the host runtime's unknown
//! sentinel string encodes Unknown. Absent keys decode as Null.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Sentinel string the host runtime uses for values not yet known at plan time
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// A single attribute value in planned or prior state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attr<T> {
    /// Explicitly absent
    #[default]
    Null,
    /// Computed during apply
    Unknown,
    /// Concrete value
    Known(T),
}

impl<T> Attr<T> {
    /// Wrap a concrete value
    pub fn known(value: impl Into<T>) -> Self {
        Attr::Known(value.into())
    }

    /// `Some` becomes Known, `None` becomes Null
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Attr::Known(v),
            None => Attr::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    /// Borrow the concrete value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Mutably borrow the concrete value, if any
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into an optional upstream field.
    ///
    /// Null and Unknown both map to `None`: an unknown value is never sent.
    pub fn into_option(self) -> Option<T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Attr<&T> {
        match self {
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
            Attr::Known(v) => Attr::Known(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Attr::Null => Attr::Null,
            Attr::Unknown => Attr::Unknown,
            Attr::Known(v) => Attr::Known(f(v)),
        }
    }

    /// Replace Unknown with Null; Known and Null are left alone
    pub fn resolve_unknown(&mut self) {
        if self.is_unknown() {
            *self = Attr::Null;
        }
    }
}

impl<T: Clone> Attr<T> {
    /// Clone into an optional upstream field
    pub fn to_option(&self) -> Option<T> {
        self.value().cloned()
    }

    /// The concrete value, or `default` for Null and Unknown
    pub fn known_or(&self, default: T) -> T {
        self.value().cloned().unwrap_or(default)
    }

    /// Copy `other` into `self` when `self` is Null.
    ///
    /// Used for fields the upstream never echoes back (secrets) and for
    /// plan-only fields: a Null read from the server must not overwrite a
    /// value the operator declared.
    pub fn fill_from(&mut self, other: &Attr<T>) {
        if self.is_null() && other.is_known() {
            *self = other.clone();
        }
    }
}

impl<T: PartialEq + Clone> Attr<Vec<T>> {
    /// Project observed set elements onto this value.
    ///
    /// The current order is kept when only the order differs, and an empty
    /// observation of a Null set stays Null.
    pub fn observe_set(&self, observed: Vec<T>) -> Attr<Vec<T>> {
        match self {
            Attr::Known(current)
                if current.len() == observed.len() && observed.iter().all(|e| current.contains(e)) =>
            {
                Attr::Known(current.clone())
            }
            Attr::Null if observed.is_empty() => Attr::Null,
            _ => Attr::Known(observed),
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        Attr::from_option(value)
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Null => serializer.serialize_none(),
            Attr::Unknown => serializer.serialize_str(UNKNOWN_VALUE),
            Attr::Known(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        match raw {
            JsonValue::Null => Ok(Attr::Null),
            JsonValue::String(ref s) if s == UNKNOWN_VALUE => Ok(Attr::Unknown),
            other => serde_json::from_value(other)
                .map(Attr::Known)
                .map_err(D::Error::custom),
        }
    }
}

/// Whether a raw JSON value is the unknown sentinel
pub fn is_unknown(value: &JsonValue) -> bool {
    matches!(value, JsonValue::String(s) if s == UNKNOWN_VALUE)
}

/// The unknown sentinel as a JSON value
pub fn unknown() -> JsonValue {
    JsonValue::String(UNKNOWN_VALUE.to_string())
}

/// Recursively replace every unknown sentinel with `null`.
///
/// Applied to state before it is committed: nothing may remain unknown after
/// an apply.
pub fn clear_unknowns(value: &mut JsonValue) {
    if is_unknown(value) {
        *value = JsonValue::Null;
        return;
    }
    match value {
        JsonValue::Array(items) => items.iter_mut().for_each(clear_unknowns),
        JsonValue::Object(map) => map.values_mut().for_each(clear_unknowns),
        _ => {}
    }
}

/// Whether a value contains the unknown sentinel anywhere
pub fn contains_unknown(value: &JsonValue) -> bool {
    if is_unknown(value) {
        return true;
    }
    match value {
        JsonValue::Array(items) => items.iter().any(contains_unknown),
        JsonValue::Object(map) => map.values().any(contains_unknown),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: Attr<String>,
        port: Attr<i64>,
        tags: Attr<Vec<String>>,
    }

    #[test]
    fn test_decodes_three_shapes() {
        let sample: Sample = serde_json::from_value(json!({
            "name": "mvn-h",
            "port": UNKNOWN_VALUE,
        }))
        .unwrap();

        assert_eq!(sample.name, Attr::Known("mvn-h".to_string()));
        assert!(sample.port.is_unknown());
        assert!(sample.tags.is_null());
    }

    #[test]
    fn test_encodes_three_shapes() {
        let sample = Sample {
            name: Attr::known("x"),
            port: Attr::Unknown,
            tags: Attr::Null,
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value, json!({"name": "x", "port": UNKNOWN_VALUE, "tags": null}));
    }

    #[test]
    fn test_unknown_is_never_sent() {
        let unknown: Attr<bool> = Attr::Unknown;
        assert_eq!(unknown.to_option(), None);
        assert_eq!(Attr::<bool>::Null.into_option(), None);
        assert_eq!(Attr::Known(true).into_option(), Some(true));
    }

    #[test]
    fn test_fill_from_only_replaces_null() {
        let prior: Attr<String> = Attr::known("secret");

        let mut from_api: Attr<String> = Attr::Null;
        from_api.fill_from(&prior);
        assert_eq!(from_api, prior);

        let mut changed = Attr::known("rotated".to_string());
        changed.fill_from(&prior);
        assert_eq!(changed.value().map(String::as_str), Some("rotated"));
    }

    #[test]
    fn test_observe_set() {
        let declared: Attr<Vec<String>> = Attr::Known(vec!["b".into(), "a".into()]);
        assert_eq!(
            declared.observe_set(vec!["a".into(), "b".into()]),
            Attr::Known(vec!["b".to_string(), "a".to_string()])
        );
        assert_eq!(
            declared.observe_set(vec!["a".into()]),
            Attr::Known(vec!["a".to_string()])
        );
        assert_eq!(Attr::<Vec<String>>::Null.observe_set(vec![]), Attr::Null);
        assert_eq!(
            Attr::<Vec<String>>::Known(vec![]).observe_set(vec![]),
            Attr::Known(vec![])
        );
    }

    #[test]
    fn test_clear_unknowns_nested() {
        let mut value = json!({
            "id": UNKNOWN_VALUE,
            "block": {"inner": UNKNOWN_VALUE, "kept": 1},
            "list": [UNKNOWN_VALUE, "a"],
        });
        assert!(contains_unknown(&value));
        clear_unknowns(&mut value);
        assert!(!contains_unknown(&value));
        assert_eq!(value["block"]["kept"], 1);
        assert_eq!(value["list"][1], "a");
        assert!(value["id"].is_null());
    }
}
