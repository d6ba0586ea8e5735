//! Scheduling: delivery modes, script templates, and the remote preview
//! service client.

pub mod remote;
pub mod templates;

use serde::{Deserialize, Serialize};

pub use remote::{SchedulePreviewClient, ScheduleTestRequest, ScheduleTestResponse};
pub use templates::{
    has_drifted, list_templates, DelayedQuickBuilder, RecurringQuickBuilder, Template,
};

/// When an event rule fires: immediately, once at a future time, or on a
/// repeating schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    Immediate,
    Delayed,
    Recurring,
}

impl DeliveryMode {
    /// Get display label
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMode::Immediate => "Immediate",
            DeliveryMode::Delayed => "Delayed",
            DeliveryMode::Recurring => "Recurring",
        }
    }
}

/// Recurrence step for recurring delivery rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceInterval {
    /// Wire/script name ("day", "week", "month")
    pub fn unit(&self) -> &'static str {
        match self {
            RecurrenceInterval::Daily => "day",
            RecurrenceInterval::Weekly => "week",
            RecurrenceInterval::Monthly => "month",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(DeliveryMode::Delayed).unwrap(),
            serde_json::json!("DELAYED")
        );
        assert_eq!(
            serde_json::from_value::<DeliveryMode>(serde_json::json!("RECURRING")).unwrap(),
            DeliveryMode::Recurring
        );
        assert_eq!(DeliveryMode::Immediate.label(), "Immediate");
    }

    #[test]
    fn test_recurrence_units() {
        assert_eq!(RecurrenceInterval::Daily.unit(), "day");
        assert_eq!(RecurrenceInterval::Weekly.unit(), "week");
        assert_eq!(RecurrenceInterval::Monthly.unit(), "month");
    }
}
