//! Hover and logging bridge: the side-effect contract shared by entity
//! tooltips and the decision card deck.
//!
//! Interaction code never calls the host directly. It returns a list of
//! [`Effect`]s and the host applies them with [`dispatch`], which keeps every
//! state machine testable without a renderer.
//!
//! The ambient-effect channel is a single host-side slot. Whoever reported
//! last wins.

use serde::Serialize;
use thiserror::Error;

use crate::schema::action::{ActionCandidate, AmbientEffects};
use crate::schema::entity::EntityId;

/// Host event-loop time in milliseconds.
pub type Millis = u64;

#[derive(Debug, Error)]
pub enum CueError {
    #[error("cue playback failed: {0}")]
    Playback(String),
    #[error("cue unavailable")]
    Unavailable,
}

/// Audio cues the host may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    CardThrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HoverKind {
    #[serde(rename = "hover_enter")]
    Enter,
    #[serde(rename = "hover_leave")]
    Leave,
}

impl HoverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "hover_enter",
            Self::Leave => "hover_leave",
        }
    }
}

/// What was hovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverTarget {
    /// A decision card, by action id.
    Option(String),
    /// An entity reference in dialogue text.
    Entity(EntityId),
}

impl HoverTarget {
    /// Metadata key the session log files the identifier under.
    pub fn metadata_key(&self) -> &'static str {
        match self {
            Self::Option(_) => "option_id",
            Self::Entity(_) => "entity_id",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Option(id) => id,
            Self::Entity(id) => id.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionEvent {
    pub kind: HoverKind,
    pub target: HoverTarget,
    pub at: Millis,
}

/// A side effect requested by an interaction state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", content = "payload", rename_all = "snake_case")]
pub enum Effect {
    /// Report to the session logger.
    Log(InteractionEvent),
    /// Write the ambient-effect slot. `None` clears it.
    Ambient(Option<AmbientEffects>),
    /// Best-effort audio cue.
    PlayCue(Cue),
    /// The player committed to a choice.
    Selected(ActionCandidate),
}

/// Receives hover events for the session log.
pub trait InteractionLogger {
    fn record(&mut self, event: &InteractionEvent);
}

/// The host side of a scene: callbacks for selection, ambient effects,
/// interaction logging and cue playback.
pub trait SceneHost {
    fn on_option_selected(&mut self, candidate: &ActionCandidate);

    fn on_hover_effects(&mut self, effects: Option<&AmbientEffects>);

    fn log_interaction(&mut self, _event: &InteractionEvent) {}

    fn play_cue(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Apply effects to the host in order. Cue failures are dropped.
pub fn dispatch<H: SceneHost + ?Sized>(effects: impl IntoIterator<Item = Effect>, host: &mut H) {
    for effect in effects {
        match effect {
            Effect::Log(event) => host.log_interaction(&event),
            Effect::Ambient(effects) => host.on_hover_effects(effects.as_ref()),
            Effect::PlayCue(cue) => {
                if let Err(e) = host.play_cue(cue) {
                    tracing::debug!(?cue, error = %e, "cue playback failed, ignoring");
                }
            }
            Effect::Selected(candidate) => host.on_option_selected(&candidate),
        }
    }
}

pub(crate) fn hover_log(kind: HoverKind, target: HoverTarget, at: Millis) -> Effect {
    Effect::Log(InteractionEvent { kind, target, at })
}

/// Hover tracking for entity references in dialogue text.
///
/// Logs every enter/leave. Ambient effects handed to `enter` are reported
/// only when non-empty, and cleared on the matching `leave`.
#[derive(Debug, Clone, Default)]
pub struct HoverBridge {
    reported_for: Option<HoverTarget>,
}

impl HoverBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_entity(&mut self, id: &EntityId, effects: Option<&AmbientEffects>, now: Millis) -> Vec<Effect> {
        self.enter(HoverTarget::Entity(id.clone()), effects, now)
    }

    pub fn leave_entity(&mut self, id: &EntityId, now: Millis) -> Vec<Effect> {
        self.leave(HoverTarget::Entity(id.clone()), now)
    }

    pub fn enter(&mut self, target: HoverTarget, effects: Option<&AmbientEffects>, now: Millis) -> Vec<Effect> {
        let mut out = vec![hover_log(HoverKind::Enter, target.clone(), now)];
        if let Some(effects) = effects.filter(|e| !e.is_empty()) {
            out.push(Effect::Ambient(Some(effects.clone())));
            self.reported_for = Some(target);
        }
        out
    }

    pub fn leave(&mut self, target: HoverTarget, now: Millis) -> Vec<Effect> {
        let mut out = vec![hover_log(HoverKind::Leave, target.clone(), now)];
        if self.reported_for.as_ref() == Some(&target) {
            out.push(Effect::Ambient(None));
            self.reported_for = None;
        }
        out
    }
}
