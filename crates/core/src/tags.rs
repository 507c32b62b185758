use std::collections::BTreeMap;

use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StitchError};

/// Accumulating string tags carried across the open/close boundary.
///
/// At CLOSE time these are replayed as backend-global tags (resource
/// attributes), so every span emitted by that backend initialization inherits
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// Parses a flat string-to-string JSON object. Anything else fails fast.
    pub fn parse(raw: &str) -> Result<Self> {
        let map: BTreeMap<String, String> = serde_json::from_str(raw).map_err(|e| {
            StitchError::Tags(format!("tags must be a flat JSON object of strings: {e}"))
        })?;
        Ok(Self(map))
    }

    /// Merges `parsed` into this set; parsed tags override on key collision.
    pub fn merge(&mut self, parsed: TagSet) {
        self.0.extend(parsed.0);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_key_values(&self) -> Vec<KeyValue> {
        self.0
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }
}
