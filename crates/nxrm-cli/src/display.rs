//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Diagnostics with severity colors
//! - Plan diffs between prior and planned state
//! - "Did you mean" suggestions for mistyped type names

use console::{style, Style};
use nxrm_core::{is_unknown, Diagnostics, Schema, Severity};
use serde_json::Value as JsonValue;
use similar::{ChangeTag, TextDiff};

/// Shown in place of values only known after apply
pub const KNOWN_AFTER_APPLY: &str = "(known after apply)";

/// Print diagnostics to stderr; returns the number of errors
pub fn print_diagnostics(diagnostics: &Diagnostics) -> usize {
    for d in diagnostics.iter() {
        let label = match d.severity {
            Severity::Error => style("error").red().bold(),
            Severity::Warning => style("warning").yellow().bold(),
        };
        match &d.attribute {
            Some(attr) => eprintln!("{}: {} {}", label, style(&d.summary).bold(), style(format!("({})", attr)).dim()),
            None => eprintln!("{}: {}", label, style(&d.summary).bold()),
        }
        if !d.detail.is_empty() {
            for line in d.detail.lines() {
                eprintln!("  {}", line);
            }
        }
    }
    diagnostics.errors().count()
}

/// Replace unknown markers with a readable placeholder
fn humanize(value: &JsonValue) -> JsonValue {
    if is_unknown(value) {
        return JsonValue::String(KNOWN_AFTER_APPLY.to_string());
    }
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), humanize(v)))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(humanize).collect()),
        other => other.clone(),
    }
}

/// Pretty JSON of a state record with secrets masked
pub fn render_state(schema: &Schema, value: &JsonValue) -> String {
    let shown = humanize(&schema.redact(value));
    serde_json::to_string_pretty(&shown).unwrap_or_else(|_| shown.to_string())
}

/// Unified diff between the prior and planned state, one line per JSON line
pub fn plan_diff(schema: &Schema, prior: Option<&JsonValue>, planned: &JsonValue) -> String {
    let before = prior.map(|p| render_state(schema, p)).unwrap_or_default();
    let after = render_state(schema, planned);
    let diff = TextDiff::from_lines(&before, &after);

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let (sign, line_style) = match change.tag() {
            ChangeTag::Delete => ("-", Style::new().red()),
            ChangeTag::Insert => ("+", Style::new().green()),
            ChangeTag::Equal => (" ", Style::new().dim()),
        };
        let line = change.to_string();
        let line = line.trim_end_matches('\n');
        out.push_str(&format!("{}\n", line_style.apply_to(format!("{} {}", sign, line))));
    }
    out
}

/// Closest known names to a mistyped one
pub fn suggest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|c| (strsim::jaro_winkler(name, c), c))
        .filter(|(score, _)| *score > 0.85)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(3).map(|(_, c)| c.to_string()).collect()
}

/// Help text for an unknown type name
pub fn did_you_mean<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let suggestions = suggest(name, candidates);
    match suggestions.as_slice() {
        [] => None,
        [one] => Some(format!("Did you mean '{}'?", one)),
        many => Some(format!("Did you mean one of: {}?", many.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxrm_core::{attrs, Attribute, UNKNOWN_VALUE};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "test",
            attrs([
                ("name", Attribute::required_string()),
                ("token", Attribute::optional_string().sensitive()),
                ("last_updated", Attribute::computed_string()),
            ]),
        )
    }

    #[test]
    fn test_render_masks_and_humanizes() {
        let rendered = render_state(
            &schema(),
            &json!({"name": "a", "token": "secret", "last_updated": UNKNOWN_VALUE}),
        );
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains(KNOWN_AFTER_APPLY));
    }

    #[test]
    fn test_plan_diff_marks_changes() {
        console::set_colors_enabled(false);
        let diff = plan_diff(
            &schema(),
            Some(&json!({"name": "a"})),
            &json!({"name": "b"}),
        );
        assert!(diff.contains("-   \"name\": \"a\""));
        assert!(diff.contains("+   \"name\": \"b\""));
    }

    #[test]
    fn test_suggestions() {
        let names = ["nxrm_repository_maven_hosted", "nxrm_repository_npm_hosted", "nxrm_role"];
        let suggestions = suggest("nxrm_repository_mavn_hosted", names.iter().copied());
        assert_eq!(suggestions[0], "nxrm_repository_maven_hosted");
        assert!(did_you_mean("zzz", names.iter().copied()).is_none());
        insta::assert_snapshot!(
            did_you_mean("nxrm_rol", names.iter().copied()).unwrap(),
            @"Did you mean 'nxrm_role'?"
        );
    }
}
