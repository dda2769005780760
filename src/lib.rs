//! Beat-synchronized tile action game core.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod map;
pub mod session;
pub mod systems;
