//! Version record schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single saved version: one configuration snapshot plus its canvas image.
///
/// Serialized field names match the wire format the client already speaks
/// (`parentId` etc.), so the index file and API responses share one shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Lexicographically-sortable timestamp-derived identifier, never reused.
    pub id: String,
    /// Id of the version this one was tuned from, if any.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Filename of the PNG snapshot inside the store directory.
    pub image: String,
    /// Opaque sketch configuration at save time; never interpreted.
    pub config: serde_json::Value,
    /// Short git revision of the sketch working tree at save time.
    #[serde(default)]
    pub revision: Option<String>,
}

impl Version {
    /// Filename for the canvas snapshot of the version with the given id.
    pub fn image_name(id: &str) -> String {
        format!("{id}.png")
    }
}

/// Compact UTC timestamp token used in version ids and artifact names.
///
/// Millisecond resolution, no colons, so the token is filename-safe on
/// every platform and sorts lexicographically in time order.
pub fn timestamp_token() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}
