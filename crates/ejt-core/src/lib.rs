//! Domain types for the easyjob timecard client.
//!
//! This crate contains the vendor-facing records and pure helpers:
//! - Time-card snapshot: the polled work-time/holiday/minutes summary
//! - Calendar items: resource-plan entries with denylist filtering
//! - Resource states: caption/type-id pairs for the save endpoint

pub mod calendar;
pub mod resource;
pub mod timecard;
pub mod util;

pub use calendar::{CalendarItem, DEFAULT_FILTERED_IDT, apply_denylist};
pub use resource::{ResourceStateType, type_id_for_caption};
pub use timecard::{DetailsPayload, TimecardSnapshot};
