use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate entity id: {0}")]
    DuplicateId(EntityId),
}

/// Newtype wrapper for stable entity IDs (e.g. `"director"`, `"ana-perez"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A non-player character the narrative can reference or portray.
///
/// Owned by the host game state; immutable for the duration of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub portrait: String,
    #[serde(default)]
    pub personality: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
            role: role.into(),
            portrait: String::new(),
            personality: String::new(),
        }
    }

    pub fn tooltip(&self) -> EntityTooltip<'_> {
        EntityTooltip {
            name: &self.name,
            role: &self.role,
            personality: &self.personality,
            portrait: &self.portrait,
        }
    }
}

/// What a hoverable entity reference shows: the fields a renderer exposes
/// on hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityTooltip<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub personality: &'a str,
    pub portrait: &'a str,
}

/// A content-side pointer to a stakeholder, by id or by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Read-only lookup over the entities visible in the current scene.
///
/// Order is significant: ambiguities (duplicate names, shared roles)
/// resolve to the earliest entry.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entities: Vec<Entity>,
    by_id: FxHashMap<EntityId, usize>,
}

impl Roster {
    /// Build a roster. A repeated id keeps its first occurrence.
    pub fn new(entities: Vec<Entity>) -> Self {
        let mut by_id = FxHashMap::default();
        for (idx, entity) in entities.iter().enumerate() {
            by_id.entry(entity.id.clone()).or_insert(idx);
        }
        Self { entities, by_id }
    }

    /// The roster for a scene: its participants, or the active speaker
    /// alone when no participants are given.
    pub fn for_scene(participants: &[Entity], speaker: &Entity) -> Self {
        if participants.is_empty() {
            Self::new(vec![speaker.clone()])
        } else {
            Self::new(participants.to_vec())
        }
    }

    /// Load a roster from a RON list of entities. Duplicate ids are rejected.
    pub fn load_from_ron(path: &Path) -> Result<Roster, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Roster, RosterError> {
        let entities: Vec<Entity> = ron::from_str(input)?;
        let roster = Self::new(entities);
        if roster.by_id.len() != roster.entities.len() {
            let mut seen = rustc_hash::FxHashSet::default();
            for entity in &roster.entities {
                if !seen.insert(&entity.id) {
                    return Err(RosterError::DuplicateId(entity.id.clone()));
                }
            }
        }
        Ok(roster)
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.by_id.get(id).map(|&idx| &self.entities[idx])
    }

    pub fn get_str(&self, id: &str) -> Option<&Entity> {
        self.get(&EntityId::new(id))
    }

    /// First entity holding `role`. Several holders is a content smell,
    /// reported but not fatal.
    pub fn find_by_role(&self, role: &str) -> Option<&Entity> {
        let mut matches = self.entities.iter().filter(|e| e.role == role);
        let first = matches.next()?;
        if matches.next().is_some() {
            tracing::warn!(role, "multiple stakeholders share role, using first match");
        }
        Some(first)
    }

    /// Resolve a content reference: id first, then role.
    pub fn resolve_ref(&self, reference: &EntityRef) -> Option<&Entity> {
        if let Some(entity) = reference.id.as_ref().and_then(|id| self.get(id)) {
            return Some(entity);
        }
        reference.role.as_deref().and_then(|role| self.find_by_role(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl From<Vec<Entity>> for Roster {
    fn from(entities: Vec<Entity>) -> Self {
        Self::new(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_roster() -> Roster {
        Roster::new(vec![
            Entity::new("dir", "Marta Rojas", "Directora"),
            Entity::new("med", "Dr. Soto", "Jefe Médico"),
            Entity::new("med2", "Paula Vidal", "Jefe Médico"),
        ])
    }

    #[test]
    fn lookup_by_id() {
        let roster = make_roster();
        assert_eq!(roster.get_str("med").map(|e| e.name.as_str()), Some("Dr. Soto"));
        assert!(roster.get_str("missing").is_none());
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let roster = Roster::new(vec![
            Entity::new("a", "First", "r"),
            Entity::new("a", "Second", "r"),
        ]);
        assert_eq!(roster.get_str("a").map(|e| e.name.as_str()), Some("First"));
    }

    #[test]
    fn scene_falls_back_to_speaker() {
        let speaker = Entity::new("dir", "Marta Rojas", "Directora");
        let roster = Roster::for_scene(&[], &speaker);
        assert_eq!(roster.len(), 1);
        assert!(roster.get_str("dir").is_some());

        let others = vec![Entity::new("x", "Ximena", "Enfermera"), speaker.clone()];
        let roster = Roster::for_scene(&others, &speaker);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn resolve_ref_prefers_id_then_role() {
        let roster = make_roster();
        let by_id = EntityRef {
            id: Some(EntityId::from("med2")),
            role: Some("Directora".to_string()),
        };
        assert_eq!(roster.resolve_ref(&by_id).map(|e| e.id.as_str()), Some("med2"));

        let stale_id = EntityRef {
            id: Some(EntityId::from("gone")),
            role: Some("Directora".to_string()),
        };
        assert_eq!(roster.resolve_ref(&stale_id).map(|e| e.id.as_str()), Some("dir"));

        let shared_role = EntityRef {
            id: None,
            role: Some("Jefe Médico".to_string()),
        };
        assert_eq!(roster.resolve_ref(&shared_role).map(|e| e.id.as_str()), Some("med"));

        assert!(roster.resolve_ref(&EntityRef::default()).is_none());
    }

    #[test]
    fn parse_ron_roster() {
        let roster = Roster::parse_ron(
            r#"[
                (id: "a", name: "Ana Pérez", role: "Enfermera", personality: "Directa"),
                (id: "b", name: "Bruno Díaz", role: "TENS"),
            ]"#,
        )
        .unwrap();
        assert_eq!(roster.len(), 2);
        let ana = roster.get_str("a").unwrap();
        assert_eq!(ana.tooltip().personality, "Directa");
        assert_eq!(roster.get_str("b").unwrap().portrait, "");
    }

    #[test]
    fn parse_ron_rejects_duplicate_ids() {
        let result = Roster::parse_ron(
            r#"[(id: "a", name: "Ana", role: "x"), (id: "a", name: "Otra", role: "y")]"#,
        );
        assert!(matches!(result, Err(RosterError::DuplicateId(id)) if id.as_str() == "a"));
    }
}
