//! Resource-state types.

use serde::{Deserialize, Serialize};

/// One selectable resource state: a human-readable caption paired with
/// the numeric type id the save endpoint requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStateType {
    #[serde(rename = "Caption")]
    pub caption: Option<String>,
    #[serde(rename = "IdResourceStateType")]
    pub type_id: Option<i64>,
}

/// Translates a caption back into its numeric type id.
///
/// The match is case-exact; entries missing either field are skipped.
pub fn type_id_for_caption(types: &[ResourceStateType], caption: &str) -> Option<i64> {
    types
        .iter()
        .find(|t| t.caption.as_deref() == Some(caption))
        .and_then(|t| t.type_id)
}
