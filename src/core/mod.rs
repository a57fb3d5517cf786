pub mod bridge;
pub mod config;
pub mod deck;
pub mod normalize;
pub mod placement;
pub mod resolver;
pub mod session_log;
pub mod timer;
