//! The Entity-Component-System (ECS) module.
//!
//! Components, resources and the systems that make up one frame, in the order
//! they run: beat clock, streak sweep, player commands, player motion,
//! projectiles, enemy decisions, enemy motion and the level objective.

pub mod common;
pub mod conductor;
pub mod enemy;
pub mod level;
pub mod motion;
pub mod player;
pub mod projectile;
pub mod rhythm;

pub use self::common::bundles::*;
pub use self::common::components::*;
pub use self::conductor::*;
pub use self::enemy::*;
pub use self::level::*;
pub use self::motion::*;
pub use self::player::*;
pub use self::projectile::*;
pub use self::rhythm::*;
