//! WASM bindings for stakeholder-narrative: the dialogue resolver, entity
//! hover tracking and the decision card deck, for a browser host.
//!
//! Everything crosses the boundary as JSON strings. Times are the host's
//! `performance.now()`-style milliseconds.

use wasm_bindgen::prelude::*;

use stakeholder_narrative::core::bridge::{Effect, HoverBridge, Millis};
use stakeholder_narrative::core::config::{DeckConfig, ResolverConfig, SceneConfig};
use stakeholder_narrative::core::deck::{DeckController, DeckKey, DeckState, ThrowDirection};
use stakeholder_narrative::core::placement::{PreviewPlacement, Rect, Viewport};
use stakeholder_narrative::core::resolver::EntityResolver;
use stakeholder_narrative::core::session_log::SessionLog;
use stakeholder_narrative::schema::action::{ActionCandidate, AmbientEffects};
use stakeholder_narrative::schema::entity::{Entity, EntityId, Roster};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct DeckSnapshot<'a> {
    state: &'a DeckState,
    armed: bool,
    preview_text: Option<&'a str>,
    placement: Option<&'a PreviewPlacement>,
    throw_direction: Option<ThrowDirection>,
    dimmed: Vec<&'a str>,
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

fn parse_roster(roster_json: &str) -> Result<Roster, JsError> {
    let entities: Vec<Entity> = serde_json::from_str(roster_json)
        .map_err(|e| JsError::new(&format!("Invalid roster JSON: {e}")))?;
    Ok(Roster::new(entities))
}

/// An empty string selects the defaults.
fn parse_config(config_json: &str) -> Result<SceneConfig, JsError> {
    if config_json.trim().is_empty() {
        return Ok(SceneConfig::default());
    }
    let config: SceneConfig = serde_json::from_str(config_json)
        .map_err(|e| JsError::new(&format!("Invalid config JSON: {e}")))?;
    config
        .validate()
        .map_err(|e| JsError::new(&format!("Config error: {e}")))?;
    Ok(config)
}

fn parse_key(key: &str) -> DeckKey {
    match key {
        "Enter" => DeckKey::Enter,
        " " | "Space" | "Spacebar" => DeckKey::Space,
        _ => DeckKey::Other,
    }
}

fn millis(now_ms: f64) -> Millis {
    now_ms.max(0.0) as Millis
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// Resolve entity mentions in `text`. `roster_json` is an array of entities;
/// returns a JSON array of segments.
#[wasm_bindgen]
pub fn resolve_dialogue(text: &str, roster_json: &str, config_json: &str) -> Result<String, JsError> {
    let roster = parse_roster(roster_json)?;
    let config = parse_config(config_json)?;
    let segments = EntityResolver::new(config.resolver).resolve(text, &roster);
    to_json(&segments)
}

/// Tooltip fields for one entity, or `null` when the id is unknown.
#[wasm_bindgen]
pub fn entity_tooltip(roster_json: &str, entity_id: &str) -> Result<String, JsError> {
    let roster = parse_roster(roster_json)?;
    to_json(&roster.get_str(entity_id).map(Entity::tooltip))
}

/// A resolver with a prebuilt matcher, for hosts that resolve many lines
/// against one roster.
#[wasm_bindgen]
pub struct DialogueResolver {
    resolver: EntityResolver,
    roster: Roster,
}

#[wasm_bindgen]
impl DialogueResolver {
    #[wasm_bindgen(constructor)]
    pub fn new(roster_json: &str, config_json: &str) -> Result<DialogueResolver, JsError> {
        let roster = parse_roster(roster_json)?;
        let config = parse_config(config_json)?;
        Ok(DialogueResolver {
            resolver: EntityResolver::new(config.resolver),
            roster,
        })
    }

    pub fn resolve(&self, text: &str) -> Result<String, JsError> {
        to_json(&self.resolver.resolve(text, &self.roster))
    }

    /// Resolver defaults as JSON.
    pub fn default_config() -> Result<String, JsError> {
        to_json(&ResolverConfig::default())
    }
}

// ---------------------------------------------------------------------------
// EntityHover
// ---------------------------------------------------------------------------

/// Hover tracking for entity references rendered from resolved dialogue.
/// `enter` and `leave` return a JSON array of effects, like `DecisionDeck`.
#[wasm_bindgen]
pub struct EntityHover {
    bridge: HoverBridge,
}

#[wasm_bindgen]
impl EntityHover {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EntityHover {
        EntityHover {
            bridge: HoverBridge::new(),
        }
    }

    /// `effects_json` is an object of ambient effects, or empty for none.
    pub fn enter(&mut self, entity_id: &str, effects_json: &str, now_ms: f64) -> Result<String, JsError> {
        let effects: Option<AmbientEffects> = if effects_json.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(effects_json)
                    .map_err(|e| JsError::new(&format!("Invalid effects JSON: {e}")))?,
            )
        };
        let id = EntityId::new(entity_id);
        to_json(&self.bridge.enter_entity(&id, effects.as_ref(), millis(now_ms)))
    }

    pub fn leave(&mut self, entity_id: &str, now_ms: f64) -> Result<String, JsError> {
        let id = EntityId::new(entity_id);
        to_json(&self.bridge.leave_entity(&id, millis(now_ms)))
    }
}

impl Default for EntityHover {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// DecisionDeck
// ---------------------------------------------------------------------------

/// One deck of decision cards. Input methods return a JSON array of effects
/// for the host to apply in order; call `advance` at `next_deadline`.
#[wasm_bindgen]
pub struct DecisionDeck {
    controller: DeckController,
}

#[wasm_bindgen]
impl DecisionDeck {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<DecisionDeck, JsError> {
        let config = parse_config(config_json)?;
        Ok(DecisionDeck {
            controller: DeckController::new(config.deck),
        })
    }

    /// Replace the offer set with a JSON array of action candidates.
    pub fn set_options(&mut self, options_json: &str) -> Result<String, JsError> {
        let options: Vec<ActionCandidate> = serde_json::from_str(options_json)
            .map_err(|e| JsError::new(&format!("Invalid options JSON: {e}")))?;
        self.effects(|deck| deck.set_options(options))
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.controller.set_disabled(disabled);
    }

    pub fn set_anchor(&mut self, id: &str, left: f64, top: f64, width: f64, height: f64) {
        self.controller
            .set_anchor(id, Some(Rect::new(left, top, width, height)));
    }

    pub fn clear_anchor(&mut self, id: &str) {
        self.controller.set_anchor(id, None);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.controller.on_viewport_change(Viewport::new(width, height));
    }

    pub fn enter(&mut self, id: &str, now_ms: f64) -> Result<String, JsError> {
        self.effects(|deck| deck.enter(id, millis(now_ms)))
    }

    pub fn leave(&mut self, id: &str, now_ms: f64) -> Result<String, JsError> {
        self.effects(|deck| deck.leave(id, millis(now_ms)))
    }

    pub fn activate(&mut self, id: &str, now_ms: f64) -> Result<String, JsError> {
        self.effects(|deck| deck.activate(id, millis(now_ms)))
    }

    /// `key` is a DOM `KeyboardEvent.key` value.
    pub fn key_down(&mut self, id: &str, key: &str, now_ms: f64) -> Result<String, JsError> {
        let key = parse_key(key);
        self.effects(|deck| deck.key_down(id, key, millis(now_ms)))
    }

    pub fn advance(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.effects(|deck| deck.advance(millis(now_ms)))
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.controller.next_deadline().map(|t| t as f64)
    }

    /// Current render state as JSON.
    pub fn snapshot(&self) -> Result<String, JsError> {
        let deck = &self.controller;
        let snapshot = DeckSnapshot {
            state: deck.state(),
            armed: deck.is_armed(),
            preview_text: deck.preview().map(ActionCandidate::preview_text),
            placement: deck.placement(),
            throw_direction: deck.throw_direction(),
            dimmed: deck
                .options()
                .iter()
                .filter(|o| deck.is_dimmed(&o.id))
                .map(|o| o.id.as_str())
                .collect(),
        };
        to_json(&snapshot)
    }

    /// Card glyphs in offer order, as a JSON array.
    pub fn icons(&self) -> Result<String, JsError> {
        let icons: Vec<&str> = self.controller.options().iter().map(ActionCandidate::icon).collect();
        to_json(&icons)
    }

    pub fn teardown(&mut self) {
        self.controller.teardown();
    }

    /// Deck defaults as JSON.
    pub fn default_config() -> Result<String, JsError> {
        to_json(&DeckConfig::default())
    }
}

// Private helpers
impl DecisionDeck {
    fn effects(&mut self, f: impl FnOnce(&mut DeckController) -> Vec<Effect>) -> Result<String, JsError> {
        to_json(&f(&mut self.controller))
    }
}

// ---------------------------------------------------------------------------
// SessionTimelog
// ---------------------------------------------------------------------------

/// Hover timelog for one scenario node at a time.
#[wasm_bindgen]
pub struct SessionTimelog {
    log: SessionLog,
}

#[wasm_bindgen]
impl SessionTimelog {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SessionTimelog {
        SessionTimelog { log: SessionLog::new() }
    }

    pub fn start(&mut self, node_id: &str, now_ms: f64) {
        self.log.start(node_id, millis(now_ms));
    }

    pub fn log(&mut self, kind: &str, key: &str, id: &str, now_ms: f64) {
        self.log.log(kind, key, id, millis(now_ms));
    }

    /// The finished entry as JSON, or `null` when no session was running.
    pub fn finalize(&mut self, final_choice: &str, now_ms: f64) -> Result<String, JsError> {
        to_json(&self.log.finalize(final_choice, millis(now_ms)))
    }
}

impl Default for SessionTimelog {
    fn default() -> Self {
        Self::new()
    }
}
