//! Character profiles and their relationship graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A character profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub powers: Vec<String>,
    #[serde(default)]
    pub affiliations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_appearance: Option<FirstAppearance>,
    /// Narrative phases in story order
    #[serde(default)]
    pub character_arc: Vec<ArcPhase>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Attribute scores (0-100) keyed by name, e.g. "energy" or "wisdom"
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, u8>,
}

impl Character {
    /// Creates a character with the required fields only
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            description: String::new(),
            background: String::new(),
            image_url: None,
            aliases: Vec::new(),
            powers: Vec::new(),
            affiliations: Vec::new(),
            first_appearance: None,
            character_arc: Vec::new(),
            relationships: Vec::new(),
            stats: BTreeMap::new(),
        }
    }

    /// Adds a relationship edge
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Identifiers of every character this one has an edge to
    pub fn related_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships.iter().map(|r| r.character_id.as_str())
    }

    /// Returns the relationship to `character_id`, if any
    pub fn relationship_to(&self, character_id: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|r| r.character_id == character_id)
    }
}

/// Where a character is first seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstAppearance {
    pub book_number: u32,
    pub chapter_number: u32,
}

/// One phase of a character's arc
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcPhase {
    pub phase: String,
    #[serde(default)]
    pub description: String,
}

/// Directed edge to another character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub character_id: String,
    /// Kind of bond, e.g. "ally", "rival", "family"
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

impl Relationship {
    pub fn new(character_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            kind: kind.into(),
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_from_json() {
        let character: Character = serde_json::from_str(
            r#"{
                "id": "kael",
                "name": "Kael",
                "role": "The Starborn Seeker",
                "description": "A space-faring warrior.",
                "background": "Drawn by a spectral frequency.",
                "characterArc": [{"phase": "Awakening", "description": "Remembers Auron"}],
                "relationships": [
                    {"characterId": "lyra", "type": "soulmate", "description": "Bound across lifetimes"}
                ],
                "stats": {"energy": 95, "love": 98}
            }"#,
        )
        .unwrap();

        assert_eq!(character.character_arc.len(), 1);
        assert_eq!(character.relationship_to("lyra").map(|r| r.kind.as_str()), Some("soulmate"));
        assert_eq!(character.stats.get("energy"), Some(&95));
        assert!(character.first_appearance.is_none());
    }

    #[test]
    fn test_character_minimal_fields() {
        let character: Character =
            serde_json::from_str(r#"{"id": "maya", "name": "Maya"}"#).unwrap();
        assert!(character.role.is_empty());
        assert!(character.relationships.is_empty());
    }

    #[test]
    fn test_related_ids() {
        let character = Character::new("riven", "Riven Elari")
            .with_relationship(Relationship::new("kael", "ally"))
            .with_relationship(Relationship::new("solenne", "former commander"));
        let ids: Vec<&str> = character.related_ids().collect();
        assert_eq!(ids, vec!["kael", "solenne"]);
    }

    #[test]
    fn test_relationship_kind_serializes_as_type() {
        let value = serde_json::to_value(Relationship::new("lyra", "bond")).unwrap();
        assert_eq!(value["type"], "bond");
        assert_eq!(value["characterId"], "lyra");
    }
}
