//! Field schemas for the thirteen world-building entity kinds.
//!
//! Every kind carries [`RecordMeta`], a required `name`, a `type`
//! classification used by list filters and a `description`; the remaining
//! fields are specific to the kind. Doc comments double as editor labels.

use super::record::RecordMeta;
use lore_macros::Fields;
use serde::{Deserialize, Serialize};

// ============================================================================
// Geography
// ============================================================================

/// A settlement, fortress, ruin or other named place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (city, village, fortress, ruin, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Climate
    pub climate: String,
    /// Population
    pub population: Option<i64>,
    /// Region it belongs to
    pub region: String,
    /// Notable features
    pub notable_features: String,
}

/// A continent, kingdom, province or wild area.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Region {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (continent, kingdom, province, wilderness, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Terrain
    pub terrain: String,
    /// Climate
    pub climate: String,
    /// Ruler or governing body
    pub ruler: String,
    /// Area in square kilometres
    pub area: Option<i64>,
}

/// A natural wonder, monument, ruin or sacred site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Landmark {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (natural, monument, ruin, sacred, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Where it is
    pub location: String,
    /// History
    pub history: String,
    /// Significance
    pub significance: String,
}

/// A mineral, plant, creature or magical material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (mineral, plant, animal, magical, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Rarity
    pub rarity: String,
    /// Uses
    pub uses: String,
    /// Where it is found
    pub found_in: String,
    /// Market value
    pub value: String,
}

// ============================================================================
// Cultures
// ============================================================================

/// A race, ethnicity, tribe or nation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct People {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (race, ethnicity, tribe, nation, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Physical appearance
    pub appearance: String,
    /// Culture and customs
    pub culture: String,
    /// Homeland
    pub homeland: String,
    /// Population
    pub population: Option<i64>,
}

/// A faith, pantheon, philosophy or cult.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Religion {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (monotheistic, polytheistic, animistic, philosophy, cult, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Deities
    pub deities: String,
    /// Core beliefs
    pub beliefs: String,
    /// Practices and rites
    pub practices: String,
    /// Followers
    pub followers: String,
}

/// A spoken, written or magical language.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (spoken, written, sign, magical, dead, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Who speaks it
    pub speakers: String,
    /// Writing system
    pub script: String,
    /// Grammar notes
    pub grammar: String,
    /// Sample phrases
    pub sample_phrases: String,
}

/// A festival, ritual, custom or taboo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Tradition {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (festival, ritual, custom, taboo, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Origin
    pub origin: String,
    /// Who practices it
    pub practitioners: String,
    /// Significance
    pub significance: String,
}

// ============================================================================
// Systems
// ============================================================================

/// How magic works in the world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct MagicSystem {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (elemental, divine, arcane, blood, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Source of power
    pub source: String,
    /// Rules
    pub rules: String,
    /// Limitations
    pub limitations: String,
    /// Cost to the caster
    pub cost: String,
    /// Who can use it
    pub practitioners: String,
}

/// An invention, craft or body of knowledge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Technology {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (tool, weapon, transport, arcane engineering, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Era
    pub era: String,
    /// Inventor
    pub inventor: String,
    /// Impact on society
    pub impact: String,
    /// Requirements
    pub requirements: String,
}

/// A ruling body and its institutions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Government {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (monarchy, republic, theocracy, council, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Current leader
    pub leader: String,
    /// Structure
    pub structure: String,
    /// Notable laws
    pub laws: String,
    /// Year founded
    pub founded_year: Option<i64>,
}

/// Currencies, trade and industry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Economy {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (currency, trade route, industry, guild, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Currency
    pub currency: String,
    /// Main exports
    pub main_exports: String,
    /// Trade partners
    pub trade_partners: String,
}

// ============================================================================
// History
// ============================================================================

/// A dated event on the world's timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Fields)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(flatten)]
    #[field(meta)]
    pub meta: RecordMeta,
    /// Name
    #[field(no_assist)]
    pub name: String,
    /// Type (war, discovery, disaster, founding, ...)
    #[serde(rename = "type")]
    #[field(rename = "type", no_assist)]
    pub kind: String,
    /// Description
    pub description: String,
    /// Year
    pub year: Option<i64>,
    /// Who took part
    pub participants: String,
    /// Consequences
    pub consequences: String,
    /// Where it happened
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{FieldKind, FieldValue, Fields};

    #[test]
    fn test_location_field_table() {
        let keys: Vec<_> = Location::field_specs().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "type",
                "description",
                "climate",
                "population",
                "region",
                "notableFeatures"
            ]
        );

        let population = Location::default().spec("population").copied().unwrap();
        assert_eq!(population.kind, FieldKind::Number);
        assert_eq!(population.label, "Population");
    }

    #[test]
    fn test_name_and_type_are_not_assistable() {
        let location = Location::default();
        assert!(!location.spec("name").unwrap().assist);
        assert!(!location.spec("type").unwrap().assist);
        assert!(location.spec("description").unwrap().assist);
    }

    #[test]
    fn test_set_and_get_by_key() {
        let mut event = Event::default();
        event.set_field("name", "Fall of the Moon Gate").unwrap();
        event.set_field("type", "war").unwrap();
        event.set_field("year", "1203").unwrap();

        assert_eq!(event.name(), "Fall of the Moon Gate");
        assert_eq!(event.kind_tag(), "war");
        assert_eq!(event.year, Some(1203));
        assert_eq!(event.field("year"), Some(FieldValue::Number(1203)));
        assert_eq!(event.field("participants"), Some(FieldValue::Empty));
        assert_eq!(event.field("nope"), None);
        assert!(event.set_field("nope", "x").is_err());
    }

    #[test]
    fn test_serde_uses_type_key_and_flattened_meta() {
        let location = Location {
            name: "Cidade da Lua".to_string(),
            kind: "city".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["type"], "city");
        assert_eq!(json["name"], "Cidade da Lua");
        assert!(json.get("id").is_some());
        assert!(json.get("notableFeatures").is_some());

        let back: Location = serde_json::from_value(json).unwrap();
        assert_eq!(back, location);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let json = serde_json::json!({
            "id": crate::world::EntityId::new(),
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "name": "Aether Weaving"
        });
        let magic: MagicSystem = serde_json::from_value(json).unwrap();
        assert_eq!(magic.name, "Aether Weaving");
        assert!(magic.rules.is_empty());
    }
}
