//! Pinch Bloom - gesture-gated particle celebrations
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particle pools, gesture classifier, stage machine)
//! - `platform`: Clock abstraction and tracking-source status
//! - `settings`: Data-driven tunables with JSON loading
//! - `ui`: Collaborator traits for panels and the scene renderer

pub mod platform;
pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::{QualityPreset, Settings, SettingsError, Tunables};

/// Default tuning constants
pub mod consts {
    use glam::Vec3;

    /// Maximum substeps per frame when running fixed-rate physics
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Thumb-to-index distance (normalized frame units) that counts as a pinch
    pub const PINCH_THRESHOLD: f32 = 0.05;
    /// Middle fingertip must be above this Y (top 30% of the frame)
    pub const RAISED_HAND_Y: f32 = 0.3;
    /// Wrist-to-middle-tip distance above which the hand counts as open
    pub const OPEN_HAND_DISTANCE: f32 = 0.2;
    /// Consecutive satisfying frames required to confirm a gesture (~1s at 30fps)
    pub const HOLD_FRAMES: u32 = 30;
    /// A micro-burst fires every N consecutive satisfying frames
    pub const MICRO_BURST_EVERY: u32 = 5;
    /// Particles per pool in a micro-burst
    pub const MICRO_BURST_AMOUNT: u32 = 3;

    /// Downward velocity change per tick
    pub const GRAVITY: f32 = 0.02;
    /// Life lost per tick
    pub const LIFE_DECAY: f32 = 0.01;
    /// Life at or below this is treated as dead (absorbs f32 drift)
    pub const LIFE_EPSILON: f32 = 1e-4;
    /// Where dead particles are parked: well below the camera frustum
    pub const SENTINEL: Vec3 = Vec3::new(0.0, -500.0, 0.0);

    /// Spawn requests per pool for one celebratory burst
    pub const BURST_AMOUNT: u32 = 50;
    /// Interval between fireworks after the first gesture (ms)
    pub const FIREWORKS_INTERVAL_MS: u64 = 100;
    /// Number of fireworks bursts after the first gesture (3 seconds)
    pub const FIREWORKS_COUNT: u32 = 30;
    /// Delay before the second stage is revealed (ms)
    pub const STAGE_ADVANCE_DELAY_MS: u64 = 15_000;
    /// Interval of the never-ending finale bursts (ms)
    pub const FINALE_INTERVAL_MS: u64 = 50;

    /// Horizontal wobble amplitude for balloon-style particles
    pub const WOBBLE_AMPLITUDE: f32 = 0.05;
    /// Wobble angular frequency (radians per tick)
    pub const WOBBLE_FREQUENCY: f32 = 0.15;

    /// Half-extent of the ambient dust cube
    pub const AMBIENT_HALF_EXTENT: f32 = 100.0;
    /// Ambient field rotation per tick (radians)
    pub const AMBIENT_SPIN: f32 = 0.001;

    /// Default RNG seed
    pub const DEFAULT_SEED: u64 = 0x5EED_B100;
}

