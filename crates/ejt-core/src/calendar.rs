//! Resource-plan calendar items.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::util::parse_vendor_datetime;

/// Default denylist of calendar-item type ids (`IdT`) to hide from
/// filtered views.
pub const DEFAULT_FILTERED_IDT: &[i64] = &[34, 3];

/// One resource-plan entry as the vendor sends it.
///
/// This is a loose record: except for `id`, any field may be absent.
/// Start and end are kept as the vendor's raw strings; use
/// [`CalendarItem::start_time`] / [`CalendarItem::end_time`] to parse
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    #[serde(rename = "Id")]
    pub id: Option<i64>,
    #[serde(rename = "IdT")]
    pub type_id: Option<i64>,
    #[serde(rename = "Caption")]
    pub caption: Option<String>,
    #[serde(rename = "StartDate")]
    pub start: Option<String>,
    #[serde(rename = "EndDate")]
    pub end: Option<String>,
    #[serde(rename = "Color")]
    pub color: Option<String>,
    #[serde(rename = "PreCaption")]
    pub pre_caption: Option<String>,
    #[serde(rename = "PostCaption")]
    pub post_caption: Option<String>,
}

impl CalendarItem {
    /// Parsed start timestamp, if present and well-formed.
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.start.as_deref().and_then(parse_vendor_datetime)
    }

    /// Parsed end timestamp, if present and well-formed.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.end.as_deref().and_then(parse_vendor_datetime)
    }

    /// Pre/post captions joined into a description block.
    pub fn description(&self) -> Option<String> {
        let parts: Vec<&str> = [self.pre_caption.as_deref(), self.post_caption.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// Removes items whose type id is on the denylist.
///
/// Items without a type id are always retained. An empty denylist returns
/// the input unchanged.
pub fn apply_denylist(items: Vec<CalendarItem>, deny: &[i64]) -> Vec<CalendarItem> {
    if deny.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.type_id.is_none_or(|idt| !deny.contains(&idt)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(type_id: Option<i64>) -> CalendarItem {
        CalendarItem {
            id: Some(1),
            type_id,
            caption: Some("Gig".to_string()),
            start: None,
            end: None,
            color: None,
            pre_caption: None,
            post_caption: None,
        }
    }

    #[test]
    fn denylist_removes_matching_type_ids() {
        let items = vec![item(Some(3)), item(Some(7)), item(Some(34))];
        let kept = apply_denylist(items, DEFAULT_FILTERED_IDT);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].type_id, Some(7));
    }

    #[test]
    fn empty_denylist_keeps_everything() {
        let items = vec![item(Some(3)), item(Some(34))];
        let kept = apply_denylist(items.clone(), &[]);
        assert_eq!(kept, items);
    }

    #[test]
    fn items_without_type_id_are_retained() {
        let items = vec![item(None), item(Some(3))];
        let kept = apply_denylist(items, DEFAULT_FILTERED_IDT);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].type_id, None);
    }

    #[test]
    fn item_deserializes_from_vendor_json() {
        let item: CalendarItem = serde_json::from_str(
            r##"{
                "Id": 42,
                "IdT": 5,
                "Caption": "Festival",
                "StartDate": "2025-06-01T08:00:00",
                "EndDate": "2025-06-01T18:00:00",
                "Color": "#ff0000",
                "PreCaption": "Setup",
                "PostCaption": "Teardown"
            }"##,
        )
        .unwrap();

        assert_eq!(item.id, Some(42));
        assert_eq!(item.type_id, Some(5));
        assert!(item.start_time().is_some());
        assert_eq!(item.description().as_deref(), Some("Setup\nTeardown"));
    }

    #[test]
    fn description_is_none_when_captions_absent() {
        assert_eq!(item(Some(1)).description(), None);
    }
}
