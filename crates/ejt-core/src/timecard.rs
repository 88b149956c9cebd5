//! Time-card snapshot types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw payload of the vendor's `Timecard/Details` endpoint.
///
/// Field names follow the vendor's PascalCase JSON. The vendor omits
/// fields freely, so everything is optional. `WorkMinutesPlaned` is the
/// vendor's spelling, not ours.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsPayload {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Holidays")]
    pub holidays: Option<i64>,
    #[serde(rename = "TotalWorkMinutes")]
    pub total_work_minutes: Option<i64>,
    #[serde(rename = "WorkMinutes")]
    pub work_minutes: Option<i64>,
    #[serde(rename = "WorkMinutesPlaned")]
    pub work_minutes_planned: Option<i64>,
    #[serde(rename = "CurrentWorkTime")]
    pub current_work_time: Option<Value>,
}

/// One polled work-time summary, fully replacing the previous one each
/// cycle.
///
/// `work_time` is derived from `CurrentWorkTime`: `Some` means an active
/// work session exists, `None` means the user is clocked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimecardSnapshot {
    pub date: Option<String>,
    pub holidays: Option<i64>,
    pub total_work_minutes: Option<i64>,
    pub work_minutes: Option<i64>,
    pub work_minutes_planned: Option<i64>,
    pub work_time: Option<String>,
}

impl TimecardSnapshot {
    /// Whether an active work session exists.
    pub const fn is_working(&self) -> bool {
        self.work_time.is_some()
    }
}

impl From<DetailsPayload> for TimecardSnapshot {
    fn from(payload: DetailsPayload) -> Self {
        let work_time = payload.current_work_time.and_then(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        Self {
            date: payload.date,
            holidays: payload.holidays,
            total_work_minutes: payload.total_work_minutes,
            work_minutes: payload.work_minutes,
            work_minutes_planned: payload.work_minutes_planned,
            work_time,
        }
    }
}
