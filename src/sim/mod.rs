//! Deterministic simulation module
//!
//! All experience logic lives here. This module must be pure and deterministic:
//! - Time comes in as an explicit millisecond timestamp
//! - Seeded RNG only
//! - Stable pool order (by category)
//! - No rendering or platform dependencies

pub mod ambient;
pub mod director;
pub mod gesture;
pub mod pool;
pub mod session;
pub mod stage;

pub use ambient::AmbientField;
pub use director::{Category, ParticleDirector};
pub use gesture::{Hand, Landmark, TrackingFrame, gesture_satisfied, is_pinch, is_raised_hand};
pub use pool::{
    BlendMode, EmissionZone, ParticlePool, PoolConfig, RenderParams, SpriteHandle,
    VelocityProfile, Wobble,
};
pub use session::Session;
pub use stage::{Millis, Stage, StageEvent, StageMachine, TaskKind, TimedTask};
