/// Session timelogger. Records hover events while one scenario node is
/// on screen and summarizes them when the player decides.

use serde::{Deserialize, Serialize};

use crate::core::bridge::{InteractionEvent, InteractionLogger, Millis};

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    #[serde(rename = "type")]
    pub kind: String,
    /// `(metadata key, identifier)`, e.g. `("option_id", "call_mayor")`.
    pub metadata: (String, String),
    pub timestamp: Millis,
}

/// A finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLogEntry {
    pub node_id: String,
    pub start_time: Millis,
    pub end_time: Millis,
    pub total_duration: Millis,
    pub events: Vec<LoggedEvent>,
    pub final_choice: String,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    node_id: String,
    start_time: Millis,
    events: Vec<LoggedEvent>,
}

/// At most one session is active; events outside a session are dropped.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    current: Option<ActiveSession>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin logging for `node_id`, discarding any unfinished session.
    pub fn start(&mut self, node_id: impl Into<String>, now: Millis) {
        let node_id = node_id.into();
        if let Some(ref previous) = self.current {
            tracing::debug!(previous = %previous.node_id, "discarding unfinished session");
        }
        self.current = Some(ActiveSession {
            node_id,
            start_time: now,
            events: Vec::new(),
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn log(&mut self, kind: &str, key: &str, id: &str, now: Millis) {
        let Some(ref mut session) = self.current else {
            return;
        };
        session.events.push(LoggedEvent {
            kind: kind.to_string(),
            metadata: (key.to_string(), id.to_string()),
            timestamp: now,
        });
    }

    /// Close the session with the player's choice. `None` if no session ran.
    pub fn finalize(&mut self, final_choice: impl Into<String>, now: Millis) -> Option<ProcessLogEntry> {
        let session = self.current.take()?;
        Some(ProcessLogEntry {
            node_id: session.node_id,
            start_time: session.start_time,
            end_time: now,
            total_duration: now.saturating_sub(session.start_time),
            events: session.events,
            final_choice: final_choice.into(),
        })
    }
}

impl InteractionLogger for SessionLog {
    fn record(&mut self, event: &InteractionEvent) {
        self.log(
            event.kind.as_str(),
            event.target.metadata_key(),
            event.target.id(),
            event.at,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bridge::{HoverKind, HoverTarget};

    #[test]
    fn events_outside_session_are_dropped() {
        let mut log = SessionLog::new();
        log.log("hover_enter", "option_id", "x", 5);
        assert!(!log.is_active());
        assert!(log.finalize("x", 10).is_none());
    }

    #[test]
    fn session_round() {
        let mut log = SessionLog::new();
        log.start("node_budget", 100);
        log.record(&InteractionEvent {
            kind: HoverKind::Enter,
            target: HoverTarget::Option("cut".to_string()),
            at: 150,
        });
        log.record(&InteractionEvent {
            kind: HoverKind::Leave,
            target: HoverTarget::Option("cut".to_string()),
            at: 400,
        });

        let entry = log.finalize("cut", 900).unwrap();
        assert_eq!(entry.node_id, "node_budget");
        assert_eq!(entry.total_duration, 800);
        assert_eq!(entry.events.len(), 2);
        assert_eq!(entry.events[0].kind, "hover_enter");
        assert_eq!(entry.events[1].metadata, ("option_id".to_string(), "cut".to_string()));
        assert_eq!(entry.final_choice, "cut");
        assert!(!log.is_active());
    }

    #[test]
    fn restart_discards_previous() {
        let mut log = SessionLog::new();
        log.start("a", 0);
        log.log("hover_enter", "option_id", "x", 1);
        log.start("b", 10);
        let entry = log.finalize("y", 20).unwrap();
        assert_eq!(entry.node_id, "b");
        assert!(entry.events.is_empty());
    }
}
