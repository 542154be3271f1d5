//! Session settings and tunables
//!
//! Loaded from a JSON file on native; every field falls back to the
//! defaults in [`crate::consts`] when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tunable `{name}`: {reason}")]
    Invalid { name: &'static str, reason: &'static str },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Slot capacity of each celebratory pool
    pub fn celebration_capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 500,
            QualityPreset::Medium => 2000,
            QualityPreset::High => 4000,
        }
    }

    /// Number of ambient dust points
    pub fn ambient_count(&self) -> usize {
        match self {
            QualityPreset::Low => 250,
            QualityPreset::Medium => 1000,
            QualityPreset::High => 2000,
        }
    }
}

/// Every numeric knob of the experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // === Gestures ===
    pub pinch_threshold: f32,
    pub raised_hand_y: f32,
    /// `None` accepts a raised fist as well as an open hand
    pub open_hand_distance: Option<f32>,
    pub hold_frames: u32,
    pub micro_burst_every: u32,
    pub micro_burst_amount: u32,

    // === Physics ===
    pub gravity: f32,
    pub life_decay: f32,
    pub wobble_amplitude: f32,
    pub wobble_frequency: f32,
    /// `None` steps physics once per display frame
    pub fixed_step_hz: Option<f32>,

    // === Choreography ===
    pub burst_amount: u32,
    pub fireworks_interval_ms: u64,
    pub fireworks_count: u32,
    pub stage_advance_delay_ms: u64,
    pub finale_interval_ms: u64,

    pub seed: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pinch_threshold: PINCH_THRESHOLD,
            raised_hand_y: RAISED_HAND_Y,
            open_hand_distance: Some(OPEN_HAND_DISTANCE),
            hold_frames: HOLD_FRAMES,
            micro_burst_every: MICRO_BURST_EVERY,
            micro_burst_amount: MICRO_BURST_AMOUNT,

            gravity: GRAVITY,
            life_decay: LIFE_DECAY,
            wobble_amplitude: WOBBLE_AMPLITUDE,
            wobble_frequency: WOBBLE_FREQUENCY,
            fixed_step_hz: None,

            burst_amount: BURST_AMOUNT,
            fireworks_interval_ms: FIREWORKS_INTERVAL_MS,
            fireworks_count: FIREWORKS_COUNT,
            stage_advance_delay_ms: STAGE_ADVANCE_DELAY_MS,
            finale_interval_ms: FINALE_INTERVAL_MS,

            seed: DEFAULT_SEED,
        }
    }
}

impl Tunables {
    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(name: &'static str, v: f32) -> Result<(), SettingsError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid { name, reason: "must be a positive finite number" })
            }
        }
        fn nonzero(name: &'static str, v: u64) -> Result<(), SettingsError> {
            if v > 0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid { name, reason: "must be greater than zero" })
            }
        }

        positive("pinch_threshold", self.pinch_threshold)?;
        positive("raised_hand_y", self.raised_hand_y)?;
        if let Some(d) = self.open_hand_distance {
            positive("open_hand_distance", d)?;
        }
        nonzero("hold_frames", self.hold_frames.into())?;
        nonzero("micro_burst_every", self.micro_burst_every.into())?;
        positive("life_decay", self.life_decay)?;
        if !self.gravity.is_finite() {
            return Err(SettingsError::Invalid { name: "gravity", reason: "must be finite" });
        }
        if let Some(hz) = self.fixed_step_hz {
            positive("fixed_step_hz", hz)?;
        }
        nonzero("fireworks_interval_ms", self.fireworks_interval_ms)?;
        nonzero("finale_interval_ms", self.finale_interval_ms)?;
        Ok(())
    }
}

/// Session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pool sizing preset
    pub quality: QualityPreset,
    /// Reduced motion: ambient field does not spin
    pub reduced_motion: bool,
    pub tunables: Tunables,
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tunables.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} (quality {})",
            path.display(),
            settings.quality.as_str()
        );
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
