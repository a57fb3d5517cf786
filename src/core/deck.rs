//! Decision card deck: a preview-then-confirm interaction for a small set of
//! weighty choices.
//!
//! The controller is a plain state machine owned by one deck. The host
//! feeds it pointer/focus/keyboard input and its own clock; every call
//! returns the [`Effect`]s to apply, and [`DeckController::advance`] fires
//! due timers. Nothing runs on its own, so nothing can fire after
//! [`DeckController::teardown`].
//!
//! ```text
//! Idle ──enter/activate──▶ Previewing(id) ──activate (armed)──▶ Committing(id)
//!  ▲                          │ leave + close delay                │ commit delay
//!  └──────────────────────────┴────────────────────────────────────┘
//! ```
//!
//! A preview is armed by its first activation; the next activation commits.
//! Entering by hover or focus opens a preview without arming it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::core::bridge::{hover_log, Cue, Effect, HoverKind, HoverTarget, Millis};
use crate::core::config::DeckConfig;
use crate::core::placement::{compute_placement, PreviewPlacement, Rect, Viewport};
use crate::core::timer::TimerSlot;
use crate::schema::action::ActionCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum DeckState {
    Idle,
    Previewing(String),
    Committing(String),
}

impl DeckState {
    /// The card currently open, previewing or mid-throw.
    pub fn open_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Previewing(id) | Self::Committing(id) => Some(id),
        }
    }

    pub fn is_committing(&self) -> bool {
        matches!(self, Self::Committing(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowDirection {
    Left,
    Right,
}

/// Keys a focused card reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckKey {
    Enter,
    Space,
    Other,
}

pub struct DeckController<R = StdRng> {
    config: DeckConfig,
    options: Vec<ActionCandidate>,
    disabled: bool,
    state: DeckState,
    armed: bool,
    anchors: FxHashMap<String, Rect>,
    viewport: Option<Viewport>,
    placement: Option<PreviewPlacement>,
    tracking_viewport: bool,
    throw_direction: Option<ThrowDirection>,
    /// Whether the ambient slot currently holds this deck's effects.
    ambient_reported: bool,
    close_timer: TimerSlot<String>,
    commit_timer: TimerSlot<String>,
    torn_down: bool,
    rng: R,
}

impl DeckController<StdRng> {
    pub fn new(config: DeckConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> DeckController<R> {
    pub fn with_rng(config: DeckConfig, rng: R) -> Self {
        Self {
            config,
            options: Vec::new(),
            disabled: false,
            state: DeckState::Idle,
            armed: false,
            anchors: FxHashMap::default(),
            viewport: None,
            placement: None,
            tracking_viewport: false,
            throw_direction: None,
            ambient_reported: false,
            close_timer: TimerSlot::new(),
            commit_timer: TimerSlot::new(),
            torn_down: false,
            rng,
        }
    }

    // -- Host inputs -------------------------------------------------------

    /// Replace the offered set. Open or committing cards that are gone are
    /// dropped immediately; a dropped commit never reports a selection.
    pub fn set_options(&mut self, options: Vec<ActionCandidate>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.torn_down {
            return effects;
        }

        let evicted = {
            let ids: FxHashSet<&str> = options.iter().map(|o| o.id.as_str()).collect();
            self.anchors.retain(|id, _| ids.contains(id.as_str()));
            self.state.open_id().is_some_and(|id| !ids.contains(id))
        };

        if evicted {
            tracing::debug!(state = ?self.state, "open card left the offer set, resetting");
            self.close_timer.cancel();
            self.commit_timer.cancel();
            self.reset_to_idle(&mut effects);
        }

        self.options = options;
        effects
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Record a card's on-screen box, or `None` once it is unmounted.
    pub fn set_anchor(&mut self, id: &str, rect: Option<Rect>) {
        match rect {
            Some(rect) => {
                self.anchors.insert(id.to_string(), rect);
            }
            None => {
                self.anchors.remove(id);
            }
        }
        if self.tracking_viewport && self.state.open_id() == Some(id) {
            self.refresh_placement();
        }
    }

    /// Resize or scroll. Placement follows only while a preview is open.
    pub fn on_viewport_change(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if self.tracking_viewport {
            self.refresh_placement();
        }
    }

    /// Pointer or focus entered a card (or its floating preview).
    pub fn enter(&mut self, id: &str, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(candidate) = self.live_candidate(id) else {
            return effects;
        };
        effects.push(hover_log(HoverKind::Enter, HoverTarget::Option(candidate.id.clone()), now));

        if self.accepts(&candidate) {
            self.open(&candidate, &mut effects);
        }
        effects
    }

    /// Pointer or focus left a card. The preview closes after the close
    /// delay unless the card is entered again first.
    pub fn leave(&mut self, id: &str, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(candidate) = self.live_candidate(id) else {
            return effects;
        };
        effects.push(hover_log(HoverKind::Leave, HoverTarget::Option(candidate.id.clone()), now));

        if self.state == DeckState::Previewing(candidate.id.clone()) {
            self.close_timer
                .schedule(now, self.config.close_delay_ms, candidate.id);
        }
        effects
    }

    /// Click or confirm key. Opens and arms a closed card, arms an open
    /// one, and throws an armed one.
    ///
    /// A card opened by hover or focus is not armed, so it takes two
    /// activations to throw it. A card opened by activation throws on the
    /// next one.
    pub fn activate(&mut self, id: &str, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(candidate) = self.live_candidate(id) else {
            return effects;
        };
        if !self.accepts(&candidate) {
            return effects;
        }

        let is_open = self.state == DeckState::Previewing(candidate.id.clone());
        if !is_open {
            self.open(&candidate, &mut effects);
            self.armed = true;
        } else if !self.armed {
            self.close_timer.cancel();
            self.armed = true;
        } else {
            self.commit(candidate, now, &mut effects);
        }
        effects
    }

    pub fn key_down(&mut self, id: &str, key: DeckKey, now: Millis) -> Vec<Effect> {
        match key {
            DeckKey::Enter | DeckKey::Space => self.activate(id, now),
            DeckKey::Other => Vec::new(),
        }
    }

    /// Fire every timer due at `now`.
    pub fn advance(&mut self, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.torn_down {
            return effects;
        }

        if let Some(id) = self.commit_timer.fire_due(now) {
            self.finish_commit(&id, &mut effects);
        }
        if let Some(id) = self.close_timer.fire_due(now) {
            if self.state == DeckState::Previewing(id) {
                tracing::debug!(state = ?self.state, "closing preview");
                self.reset_to_idle(&mut effects);
            }
        }
        effects
    }

    /// Cancel all timers and stop following the viewport. The controller
    /// ignores every later call.
    pub fn teardown(&mut self) {
        self.close_timer.cancel();
        self.commit_timer.cancel();
        self.tracking_viewport = false;
        self.placement = None;
        self.state = DeckState::Idle;
        self.armed = false;
        self.throw_direction = None;
        self.torn_down = true;
    }

    // -- Observers ---------------------------------------------------------

    pub fn state(&self) -> &DeckState {
        &self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn options(&self) -> &[ActionCandidate] {
        &self.options
    }

    /// The open card, if any.
    pub fn preview(&self) -> Option<&ActionCandidate> {
        let id = self.state.open_id()?;
        self.options.iter().find(|o| o.id == id)
    }

    /// Where to draw the floating preview. `None` while closed or when the
    /// open card has no known geometry.
    pub fn placement(&self) -> Option<&PreviewPlacement> {
        self.placement.as_ref()
    }

    pub fn is_tracking_viewport(&self) -> bool {
        self.tracking_viewport
    }

    pub fn throw_direction(&self) -> Option<ThrowDirection> {
        self.throw_direction
    }

    /// Cards other than the open one render dimmed.
    pub fn is_dimmed(&self, id: &str) -> bool {
        self.state.open_id().is_some_and(|open| open != id)
    }

    /// When the host should next call [`advance`](Self::advance).
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.close_timer.deadline(), self.commit_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // -- Transitions -------------------------------------------------------

    fn live_candidate(&self, id: &str) -> Option<ActionCandidate> {
        if self.torn_down {
            return None;
        }
        self.options.iter().find(|o| o.id == id).cloned()
    }

    fn accepts(&self, candidate: &ActionCandidate) -> bool {
        !self.disabled && !candidate.locked && !self.state.is_committing()
    }

    fn open(&mut self, candidate: &ActionCandidate, effects: &mut Vec<Effect>) {
        self.close_timer.cancel();

        if self.state == DeckState::Previewing(candidate.id.clone()) {
            self.refresh_placement();
            return;
        }

        tracing::debug!(id = %candidate.id, "opening preview");
        self.state = DeckState::Previewing(candidate.id.clone());
        self.armed = false;
        self.tracking_viewport = true;
        self.refresh_placement();

        if !candidate.ambient_effects.is_empty() {
            effects.push(Effect::Ambient(Some(candidate.ambient_effects.clone())));
            self.ambient_reported = true;
        } else if self.ambient_reported {
            // The previous card's effects are no longer previewed.
            effects.push(Effect::Ambient(None));
            self.ambient_reported = false;
        }
    }

    fn commit(&mut self, candidate: ActionCandidate, now: Millis, effects: &mut Vec<Effect>) {
        self.close_timer.cancel();
        let direction = if self.rng.gen_bool(0.5) {
            ThrowDirection::Right
        } else {
            ThrowDirection::Left
        };
        tracing::debug!(id = %candidate.id, ?direction, "committing card");

        self.throw_direction = Some(direction);
        self.state = DeckState::Committing(candidate.id.clone());
        self.commit_timer
            .schedule(now, self.config.commit_delay_ms, candidate.id);
        effects.push(Effect::PlayCue(Cue::CardThrow));
    }

    fn finish_commit(&mut self, id: &str, effects: &mut Vec<Effect>) {
        if self.state != DeckState::Committing(id.to_string()) {
            return;
        }
        let Some(candidate) = self.options.iter().find(|o| o.id == id).cloned() else {
            self.reset_to_idle(effects);
            return;
        };
        self.reset_to_idle(effects);
        effects.push(Effect::Selected(candidate));
    }

    /// Back to `Idle`, clearing the ambient slot once.
    fn reset_to_idle(&mut self, effects: &mut Vec<Effect>) {
        self.state = DeckState::Idle;
        self.armed = false;
        self.placement = None;
        self.tracking_viewport = false;
        self.throw_direction = None;
        self.ambient_reported = false;
        effects.push(Effect::Ambient(None));
    }

    fn refresh_placement(&mut self) {
        self.placement = self.state.open_id().and_then(|id| {
            let anchor = self.anchors.get(id)?;
            let viewport = self.viewport.as_ref()?;
            Some(compute_placement(
                anchor,
                viewport,
                self.config.edge_margin,
                self.config.preview_padding,
            ))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::action::AmbientEffects;

    fn deck(options: Vec<ActionCandidate>) -> DeckController {
        let mut deck = DeckController::new(DeckConfig::default());
        deck.set_options(options);
        deck
    }

    fn xy() -> Vec<ActionCandidate> {
        vec![ActionCandidate::new("x", "Equis"), ActionCandidate::new("y", "Ye")]
    }

    fn selected(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Selected(c) => Some(c.id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn enter_opens_and_logs() {
        let mut deck = deck(xy());
        let effects = deck.enter("x", 0);
        assert_eq!(deck.state(), &DeckState::Previewing("x".to_string()));
        assert!(matches!(&effects[0], Effect::Log(e) if e.kind == HoverKind::Enter));
        assert!(deck.is_tracking_viewport());
        assert!(deck.is_dimmed("y"));
        assert!(!deck.is_dimmed("x"));
    }

    #[test]
    fn switching_previews_keeps_one_open() {
        let mut deck = deck(xy());
        deck.enter("x", 0);
        deck.enter("y", 10);
        assert_eq!(deck.state(), &DeckState::Previewing("y".to_string()));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut deck = deck(xy());
        assert!(deck.enter("zzz", 0).is_empty());
        assert!(deck.activate("zzz", 0).is_empty());
        assert_eq!(deck.state(), &DeckState::Idle);
    }

    #[test]
    fn leave_closes_after_delay() {
        let mut deck = deck(xy());
        deck.enter("x", 0);
        deck.leave("x", 100);
        assert_eq!(deck.next_deadline(), Some(240));
        assert!(deck.advance(239).is_empty());
        let effects = deck.advance(240);
        assert_eq!(deck.state(), &DeckState::Idle);
        assert_eq!(effects, vec![Effect::Ambient(None)]);
        assert!(!deck.is_tracking_viewport());
    }

    #[test]
    fn leaving_another_card_does_not_close() {
        let mut deck = deck(xy());
        deck.enter("x", 0);
        deck.leave("y", 10);
        assert_eq!(deck.next_deadline(), None);
    }

    #[test]
    fn ambient_effects_reported_only_when_present() {
        let effects = AmbientEffects::new().with("budget", "M");
        let mut deck = deck(vec![
            ActionCandidate::new("x", "Equis").with_effects(effects.clone()),
            ActionCandidate::new("y", "Ye"),
        ]);

        let out = deck.enter("x", 0);
        assert!(out.contains(&Effect::Ambient(Some(effects))));

        // Moving to a card without effects clears the previous report.
        let out = deck.enter("y", 5);
        assert!(out.contains(&Effect::Ambient(None)));

        let mut plain = DeckController::new(DeckConfig::default());
        plain.set_options(xy());
        let out = plain.enter("y", 0);
        assert!(!out.iter().any(|e| matches!(e, Effect::Ambient(_))));
    }

    #[test]
    fn throw_direction_is_set_while_committing() {
        let mut deck = deck(xy());
        deck.activate("x", 0);
        assert_eq!(deck.throw_direction(), None);
        let effects = deck.activate("x", 10);
        assert_eq!(effects, vec![Effect::PlayCue(Cue::CardThrow)]);
        assert!(deck.throw_direction().is_some());
        let effects = deck.advance(330);
        assert_eq!(selected(&effects), vec!["x"]);
        assert_eq!(deck.throw_direction(), None);
    }

    #[test]
    fn locked_and_disabled_cards_do_not_open() {
        let mut deck = deck(vec![ActionCandidate::new("x", "Equis").locked(), ActionCandidate::new("y", "Ye")]);
        let effects = deck.enter("x", 0);
        assert_eq!(effects.len(), 1);
        assert_eq!(deck.state(), &DeckState::Idle);

        deck.set_disabled(true);
        deck.enter("y", 0);
        deck.activate("y", 0);
        assert_eq!(deck.state(), &DeckState::Idle);
    }

    #[test]
    fn keyboard_confirm_keys() {
        let mut deck = deck(xy());
        assert!(deck.key_down("x", DeckKey::Other, 0).is_empty());
        deck.key_down("x", DeckKey::Enter, 0);
        deck.key_down("x", DeckKey::Space, 0);
        assert_eq!(deck.state(), &DeckState::Committing("x".to_string()));
    }

    #[test]
    fn placement_follows_viewport_only_while_open() {
        let mut deck = deck(xy());
        deck.set_anchor("x", Some(Rect::new(100.0, 500.0, 200.0, 120.0)));
        deck.on_viewport_change(Viewport::new(1280.0, 800.0));
        assert!(deck.placement().is_none());

        deck.enter("x", 0);
        assert_eq!(deck.placement().map(|p| p.bottom), Some(180.0));

        deck.on_viewport_change(Viewport::new(1280.0, 700.0));
        assert_eq!(deck.placement().map(|p| p.bottom), Some(80.0));

        deck.leave("x", 10);
        deck.advance(200);
        assert!(deck.placement().is_none());
        deck.on_viewport_change(Viewport::new(1280.0, 900.0));
        assert!(deck.placement().is_none());
    }

    #[test]
    fn missing_anchor_leaves_preview_unplaced() {
        let mut deck = deck(xy());
        deck.on_viewport_change(Viewport::new(1280.0, 800.0));
        deck.enter("x", 0);
        assert_eq!(deck.state(), &DeckState::Previewing("x".to_string()));
        assert!(deck.placement().is_none());
    }

    #[test]
    fn teardown_silences_everything() {
        let mut deck = deck(xy());
        deck.activate("x", 0);
        deck.activate("x", 0);
        deck.teardown();
        assert!(deck.advance(10_000).is_empty());
        assert!(deck.enter("y", 10_001).is_empty());
        assert_eq!(deck.next_deadline(), None);
        assert!(!deck.is_tracking_viewport());
    }

    #[test]
    fn seeded_decks_throw_the_same_way() {
        let mut a = DeckController::new(DeckConfig { seed: 9, ..DeckConfig::default() });
        let mut b = DeckController::new(DeckConfig { seed: 9, ..DeckConfig::default() });
        for deck in [&mut a, &mut b] {
            deck.set_options(xy());
            deck.activate("x", 0);
            deck.activate("x", 0);
        }
        assert_eq!(a.throw_direction(), b.throw_direction());
    }
}
