//! Stakeholder Narrative: the interactive core of a stakeholder
//! management simulation.
//!
//! Resolves mentions of non-player characters in dialogue text into
//! hoverable references, and drives the preview/confirm/throw interaction
//! of decision cards, both reporting to the host through a shared effect
//! contract.

pub mod core;
pub mod schema;
