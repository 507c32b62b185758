use chrono::{DateTime, Utc};

use crate::error::{Result, StitchError};

/// Resolves an explicit timestamp override. An ISO-8601 string wins over a
/// numeric epoch value; `None` means the caller should use the current time.
pub fn resolve_override(epoch_ns: Option<i64>, iso: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    if let Some(raw) = iso {
        let ts = DateTime::parse_from_rfc3339(raw).map_err(|e| {
            StitchError::InvalidArgument(format!("expected RFC3339 time, got {raw}: {e}"))
        })?;
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    if let Some(ns) = epoch_ns {
        return Ok(Some(DateTime::from_timestamp_nanos(ns)));
    }

    Ok(None)
}
