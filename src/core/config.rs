/// Scene configuration: resolver and deck tuning, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning for the entity reference resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix inside `[[...]]` that marks an explicit entity tag.
    pub tag_prefix: String,
    /// Short titles that never count as a first name ("Dr. Soto" is not "Dr").
    /// Compared case- and accent-insensitively, trailing dot ignored.
    pub honorifics: Vec<String>,
    /// Name tokens shorter than this many characters are never matched.
    pub min_token_chars: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "entity:".to_string(),
            honorifics: [
                "sr", "sra", "srta", "dr", "dra", "don", "doña", "mr", "mrs", "ms", "prof", "ing",
                "lic",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_token_chars: 3,
        }
    }
}

/// Timing and geometry for the decision card deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Debounce before a left preview closes.
    pub close_delay_ms: u64,
    /// Length of the throw animation before the selection is reported.
    pub commit_delay_ms: u64,
    /// Minimum distance between the preview and the viewport edges.
    pub edge_margin: f64,
    /// Extra height of the preview over its anchor card.
    pub preview_padding: f64,
    /// Seed for the throw direction RNG.
    pub seed: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: 140,
            commit_delay_ms: 320,
            edge_margin: 12.0,
            preview_padding: 64.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub resolver: ResolverConfig,
    pub deck: DeckConfig,
}

impl SceneConfig {
    pub fn load_from_ron(path: &Path) -> Result<SceneConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<SceneConfig, ConfigError> {
        let config: SceneConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.tag_prefix.is_empty() || self.resolver.tag_prefix.contains(']') {
            return Err(ConfigError::Invalid(format!(
                "tag_prefix '{}' must be non-empty and contain no ']'",
                self.resolver.tag_prefix
            )));
        }
        if self.deck.edge_margin < 0.0 || self.deck.preview_padding < 0.0 {
            return Err(ConfigError::Invalid(
                "edge_margin and preview_padding must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
