use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::entity::EntityId;

/// An atomic unit of rendered dialogue text.
///
/// `span` is the byte range of the source text the segment was produced
/// from. Spans of a resolved sequence are contiguous and cover the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSegment {
    /// Plain text, rendered as-is.
    Literal { text: String, span: Range<usize> },
    /// A hoverable mention of a roster entity.
    EntityRef {
        entity_id: EntityId,
        display_text: String,
        span: Range<usize>,
    },
}

impl TextSegment {
    /// The visible text of the segment.
    pub fn text(&self) -> &str {
        match self {
            Self::Literal { text, .. } => text,
            Self::EntityRef { display_text, .. } => display_text,
        }
    }

    pub fn span(&self) -> &Range<usize> {
        match self {
            Self::Literal { span, .. } | Self::EntityRef { span, .. } => span,
        }
    }

    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Self::Literal { .. } => None,
            Self::EntityRef { entity_id, .. } => Some(entity_id),
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::EntityRef { .. })
    }
}

/// Concatenated visible text of a segment sequence.
pub fn visible_text(segments: &[TextSegment]) -> String {
    segments.iter().map(TextSegment::text).collect()
}
