use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate action id in offer: {0}")]
    DuplicateId(String),
}

/// Opaque world-state consequences previewed while a choice is hovered,
/// e.g. `{"budget": "M", "reputation": "S"}`. An empty map means no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmbientEffects(pub BTreeMap<String, String>);

impl AmbientEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Visual treatment requested by content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiVariant {
    #[default]
    Default,
    Success,
    Danger,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// An offered player choice. `id` is unique within the current offer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCandidate {
    pub id: String,
    pub label: String,
    /// Present for narrative cards; the preview falls back to `label`.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub variant: UiVariant,
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub card_emoji: Option<String>,
    #[serde(default)]
    pub ambient_effects: AmbientEffects,
}

impl ActionCandidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            locked: false,
            variant: UiVariant::Default,
            risk: None,
            card_emoji: None,
            ambient_effects: AmbientEffects::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_effects(mut self, effects: AmbientEffects) -> Self {
        self.ambient_effects = effects;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Text shown on the floating preview.
    pub fn preview_text(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.label)
    }

    /// Glyph shown on the card face.
    pub fn icon(&self) -> &str {
        if let Some(ref emoji) = self.card_emoji {
            return emoji;
        }
        match self.variant {
            UiVariant::Danger => return "!",
            UiVariant::Success => return "+",
            UiVariant::Default | UiVariant::Muted => {}
        }
        match self.risk {
            Some(RiskLevel::High) => "^",
            Some(RiskLevel::Medium) => "*",
            Some(RiskLevel::Low) => "o",
            None => "#",
        }
    }
}

/// Load an offer set from a RON list of candidates.
pub fn load_offer_from_ron(path: &Path) -> Result<Vec<ActionCandidate>, OfferError> {
    let contents = std::fs::read_to_string(path)?;
    parse_offer_ron(&contents)
}

/// Parse an offer set, rejecting repeated ids.
pub fn parse_offer_ron(input: &str) -> Result<Vec<ActionCandidate>, OfferError> {
    let offer: Vec<ActionCandidate> = ron::from_str(input)?;
    let mut seen = FxHashSet::default();
    for candidate in &offer {
        if !seen.insert(candidate.id.as_str()) {
            return Err(OfferError::DuplicateId(candidate.id.clone()));
        }
    }
    Ok(offer)
}
