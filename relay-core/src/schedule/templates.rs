//! Script template library
//!
//! Parameterized generators that emit ready-to-edit scheduling script text.
//! Pure string building, no execution. A generated script is a plain script
//! once produced; the only provenance tracking is the drift check against
//! the last generated text.

use super::{DeliveryMode, RecurrenceInterval};

/// A canned, ready-to-edit script
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub script: String,
    pub usage_note: &'static str,
}

/// List the canned templates for a delivery mode.
///
/// Deterministic: the same call always yields identical script text.
/// Immediate delivery needs no script, so it has no templates.
pub fn list_templates(mode: DeliveryMode) -> Vec<Template> {
    match mode {
        DeliveryMode::Immediate => Vec::new(),
        DeliveryMode::Delayed => vec![
            Template {
                id: "delayed-next-morning",
                name: "Next morning",
                description: "Deliver at 09:00 the day after the event arrives",
                script: "\
local tomorrow = lib.add_days(lib.now(), 1)
return { deliver_at = lib.format_date(tomorrow, \"%Y-%m-%dT09:00:00%:z\") }"
                    .to_string(),
                usage_note: "Adjust the hour in the format string to change the delivery time.",
            },
            Template {
                id: "delayed-grace-period",
                name: "Two-hour grace period",
                description: "Deliver two hours after the event arrives",
                script: "return { deliver_at = lib.add_hours(lib.now(), 2) }".to_string(),
                usage_note: "Change the offset to lengthen or shorten the grace period.",
            },
            Template {
                id: "delayed-from-payload",
                name: "Offset from a payload date",
                description: "Deliver relative to a timestamp carried by the event itself",
                script: "\
local base = lib.parse_date(payload.scheduledFor)
if base == nil then
  base = lib.now()
end
return { deliver_at = lib.add_days(base, 1) }"
                    .to_string(),
                usage_note: "Replace payload.scheduledFor with the field your events carry.",
            },
        ],
        DeliveryMode::Recurring => vec![
            Template {
                id: "recurring-daily-digest",
                name: "Daily digest",
                description: "Deliver once a day at 09:00",
                script: "return { every = \"day\", at = \"09:00\" }".to_string(),
                usage_note: "Times are interpreted in the tenant's delivery timezone.",
            },
            Template {
                id: "recurring-weekly",
                name: "Weekly summary",
                description: "Deliver once a week, Monday at 08:00",
                script: "return { every = \"week\", on = \"monday\", at = \"08:00\" }".to_string(),
                usage_note: "Change the weekday or add several with a table of names.",
            },
            Template {
                id: "recurring-monthly",
                name: "Monthly report",
                description: "Deliver on the first day of each month",
                script: "return { every = \"month\", day = 1, at = \"07:00\" }".to_string(),
                usage_note: "day = -1 selects the last day of the month.",
            },
        ],
    }
}

/// Builds a delayed-delivery script from structured offsets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayedQuickBuilder {
    pub offset_days: i64,
    pub offset_hours: i64,
    pub offset_minutes: i64,
}

impl DelayedQuickBuilder {
    /// Emit script text; zero offsets collapse to delivery at evaluation
    /// time
    pub fn build(&self) -> String {
        let mut expr = "lib.now()".to_string();
        for (amount, helper) in [
            (self.offset_days, "lib.add_days"),
            (self.offset_hours, "lib.add_hours"),
            (self.offset_minutes, "lib.add_minutes"),
        ] {
            if amount != 0 {
                expr = format!("{}({}, {})", helper, expr, amount);
            }
        }
        format!("return {{ deliver_at = {} }}", expr)
    }
}

/// Builds a recurring-delivery script from a structured schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringQuickBuilder {
    pub interval: RecurrenceInterval,
    pub at_hour: u8,
    pub at_minute: u8,
}

impl RecurringQuickBuilder {
    pub fn build(&self) -> String {
        format!(
            "return {{ every = \"{}\", at = \"{:02}:{:02}\" }}",
            self.interval.unit(),
            self.at_hour,
            self.at_minute
        )
    }
}

/// Has the operator edited the script since it was generated?
///
/// Text comparison only; "generated" and "customized" scripts are the same
/// kind of thing.
pub fn has_drifted(current: &str, generated: &str) -> bool {
    current.trim() != generated.trim()
}
