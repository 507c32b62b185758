use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::carrier::Carrier;
use crate::tags::TagSet;

/// The persisted span-state record: everything a later invocation needs to
/// finish a span that an earlier invocation opened.
///
/// The live backend span never crosses the process boundary; this record is
/// its reconstructable description. `span_id` and `start` are assigned once
/// at OPEN and reused verbatim at CLOSE so the backend treats the two halves
/// as one span.
///
/// Field names on the wire match the original record format. Records written
/// by earlier revisions may lack `Resource`, `Tags`, or `ParentContext`;
/// those load with defaults rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanState {
    #[serde(rename = "Env")]
    pub env: String,

    #[serde(rename = "Service")]
    pub service: String,

    #[serde(rename = "Resource", default)]
    pub resource: String,

    #[serde(rename = "Operation")]
    pub operation: String,

    #[serde(rename = "StartMillis")]
    pub start: DateTime<Utc>,

    #[serde(rename = "SpanID")]
    pub span_id: u64,

    #[serde(rename = "Tags", default)]
    pub tags: TagSet,

    /// The span's own propagation context, captured at OPEN. A prospective
    /// child names this record as its parent and extracts from here.
    #[serde(rename = "Context")]
    pub context: Carrier,

    /// The parent's propagation context, inlined at OPEN so CLOSE never has
    /// to re-read the parent's own record. Present iff a parent reference was
    /// supplied at OPEN.
    #[serde(rename = "ParentContext", default, skip_serializing_if = "Option::is_none")]
    pub parent_context: Option<Carrier>,
}
