//! Task schedule: the `frequency` block and its conditional rules

use nxrm_client::TaskFrequency;
use nxrm_core::{attrs, block, Attr, Attribute, Diagnostic, Diagnostics, Validator};
use serde::{Deserialize, Serialize};

pub const SCHEDULES: &[&str] = &["manual", "once", "hourly", "daily", "weekly", "monthly", "cron"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyModel {
    pub schedule: Attr<String>,
    /// Epoch seconds
    pub start_date: Attr<i64>,
    pub timezone_offset: Attr<String>,
    pub recurring_days: Attr<Vec<i64>>,
    pub cron_expression: Attr<String>,
}

pub fn schema_attribute() -> Attribute {
    Attribute::required(block(attrs([
        (
            "schedule",
            Attribute::required_string().validate(Validator::one_of(SCHEDULES)),
        ),
        (
            "start_date",
            Attribute::optional_int64()
                .validate(Validator::AtLeast(0))
                .describe("First run, in epoch seconds; required unless manual or cron"),
        ),
        (
            "timezone_offset",
            Attribute::optional_string().validate(Validator::matches(
                r"^[+-]\d{2}:\d{2}$",
                "must be an offset such as -05:00",
            )),
        ),
        (
            "recurring_days",
            Attribute::optional(Attribute::int64_set())
                .validate(Validator::NotEmpty)
                .validate(Validator::ElementsBetween(1, 31))
                .describe("Days of the week (1..7) or of the month (1..31)"),
        ),
        ("cron_expression", Attribute::optional_string()),
    ])))
    .describe("When the task runs")
}

impl FrequencyModel {
    /// Conditional requirements of each schedule.
    ///
    /// Values still unknown at plan time are not checked.
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(schedule) = self.schedule.value() else {
            return diags;
        };
        let missing = |field: &str| {
            Diagnostic::error(
                "Missing required argument",
                format!(
                    "frequency.{} is required when frequency.schedule is \"{}\".",
                    field, schedule
                ),
            )
            .at(format!("frequency.{}", field))
        };

        if !matches!(schedule.as_str(), "manual" | "cron") && self.start_date.is_null() {
            diags.push(missing("start_date"));
        }

        let day_range = match schedule.as_str() {
            "weekly" => Some(7),
            "monthly" => Some(31),
            _ => None,
        };
        if let Some(max) = day_range {
            match &self.recurring_days {
                Attr::Null => diags.push(missing("recurring_days")),
                Attr::Known(days) if days.is_empty() => diags.push(missing("recurring_days")),
                Attr::Known(days) => {
                    let bad: Vec<String> = days
                        .iter()
                        .filter(|d| !(1..=max).contains(*d))
                        .map(ToString::to_string)
                        .collect();
                    if !bad.is_empty() {
                        diags.push(
                            Diagnostic::error(
                                "Invalid Attribute Value",
                                format!(
                                    "frequency.recurring_days must be between 1 and {} for a {} schedule, got: {}",
                                    max,
                                    schedule,
                                    bad.join(", ")
                                ),
                            )
                            .at("frequency.recurring_days"),
                        );
                    }
                }
                Attr::Unknown => {}
            }
        }

        if schedule == "cron" && self.cron_expression.is_null() {
            diags.push(missing("cron_expression"));
        }
        diags
    }

    /// Fold the block into the single upstream field
    pub fn to_wire(&self) -> TaskFrequency {
        TaskFrequency {
            schedule: self.schedule.known_or("manual".to_string()),
            start_date: self.start_date.to_option(),
            time_zone_offset: self.timezone_offset.to_option(),
            recurring_days: self.recurring_days.to_option(),
            cron_expression: self.cron_expression.to_option(),
        }
    }

    pub fn from_wire(wire: TaskFrequency, prior: Option<&FrequencyModel>) -> Self {
        let mut recurring_days = Attr::from_option(wire.recurring_days);
        if let (Attr::Known(days), Some(Attr::Known(previous))) =
            (&recurring_days, prior.map(|p| &p.recurring_days))
        {
            if days.len() == previous.len() && days.iter().all(|d| previous.contains(d)) {
                recurring_days = Attr::Known(previous.clone());
            }
        }
        Self {
            schedule: Attr::Known(wire.schedule),
            start_date: Attr::from_option(wire.start_date),
            timezone_offset: Attr::from_option(wire.time_zone_offset),
            recurring_days,
            cron_expression: Attr::from_option(wire.cron_expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequency(schedule: &str) -> FrequencyModel {
        FrequencyModel {
            schedule: Attr::Known(schedule.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_manual_needs_nothing() {
        assert!(frequency("manual").validate().is_empty());
    }

    #[test]
    fn test_daily_needs_start_date() {
        let diags = frequency("daily").validate();
        assert!(diags.has_error());
        assert!(diags.contains("frequency.start_date is required"));
    }

    #[test]
    fn test_cron_needs_expression_not_start_date() {
        let diags = frequency("cron").validate();
        assert_eq!(diags.len(), 1);
        assert!(diags.contains("cron_expression"));

        let ok = FrequencyModel {
            cron_expression: Attr::Known("0 0 1 * * ?".to_string()),
            ..frequency("cron")
        };
        assert!(ok.validate().is_empty());
    }

    #[test]
    fn test_weekly_day_range() {
        let weekly = FrequencyModel {
            start_date: Attr::Known(1_700_000_000),
            recurring_days: Attr::Known(vec![1, 8]),
            ..frequency("weekly")
        };
        let diags = weekly.validate();
        assert!(diags.contains("between 1 and 7"));

        let monthly = FrequencyModel {
            recurring_days: Attr::Known(vec![1, 8, 31]),
            ..weekly
        };
        let monthly = FrequencyModel {
            schedule: Attr::Known("monthly".to_string()),
            ..monthly
        };
        assert!(monthly.validate().is_empty());
    }

    #[test]
    fn test_weekly_requires_days() {
        let weekly = FrequencyModel {
            start_date: Attr::Known(1_700_000_000),
            recurring_days: Attr::Known(vec![]),
            ..frequency("weekly")
        };
        assert!(weekly.validate().contains("recurring_days is required"));
    }

    #[test]
    fn test_unknown_days_are_not_checked() {
        let weekly = FrequencyModel {
            start_date: Attr::Known(1_700_000_000),
            recurring_days: Attr::Unknown,
            ..frequency("weekly")
        };
        assert!(weekly.validate().is_empty());
    }
}
