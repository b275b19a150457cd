//! Identity and bookkeeping shared by every entity record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Create a new unique entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identity, timestamps and AI provenance of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Keys of fields that were populated by AI field-assist.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_by: Vec<String>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            generated_by: Vec::new(),
        }
    }

    /// Advance `updated_at`. Strictly increasing even when the clock is not.
    pub fn touch(&mut self) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = Utc::now().max(floor);
    }

    /// Record that AI assistance populated `key`.
    pub fn mark_generated(&mut self, key: &str) {
        if !self.generated_by.iter().any(|k| k == key) {
            self.generated_by.push(key.to_string());
        }
    }

    pub fn is_ai_assisted(&self) -> bool {
        !self.generated_by.is_empty()
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_is_strictly_increasing() {
        let mut meta = RecordMeta::new();
        let mut previous = meta.updated_at;
        for _ in 0..100 {
            meta.touch();
            assert!(meta.updated_at > previous);
            previous = meta.updated_at;
        }
        assert!(meta.created_at < meta.updated_at);
    }

    #[test]
    fn test_mark_generated_deduplicates() {
        let mut meta = RecordMeta::new();
        assert!(!meta.is_ai_assisted());
        meta.mark_generated("description");
        meta.mark_generated("description");
        meta.mark_generated("climate");
        assert_eq!(meta.generated_by, vec!["description", "climate"]);
    }

    #[test]
    fn test_entity_id_parse_roundtrip() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = RecordMeta::new();
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("generatedBy").is_none());
    }
}
