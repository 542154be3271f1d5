//! Hand landmarks and per-stage gesture predicates
//!
//! Coordinates are normalized to the camera frame: `(0, 0)` is the top-left
//! corner and `y` grows downward. Every predicate is total: a missing hand,
//! missing landmarks or non-finite coordinates all classify as `false`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::stage::Stage;
use crate::settings::Tunables;

/// Landmark indices in the tracker's 21-point hand model
pub mod landmark {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const COUNT: usize = 21;
}

/// One tracked point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    fn planar(&self) -> Option<Vec2> {
        let v = Vec2::new(self.x, self.y);
        v.is_finite().then_some(v)
    }
}

/// Landmarks of a single detected hand
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Planar coordinates of a landmark, if present and finite
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.landmarks.get(index).and_then(Landmark::planar)
    }
}

/// One result from the tracking pipeline: zero or more hands
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackingFrame {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl TrackingFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hand(hand: Hand) -> Self {
        Self { hands: vec![hand] }
    }

    /// Only the first hand is considered
    pub fn primary(&self) -> Option<&Hand> {
        self.hands.first()
    }
}

/// Thumb and index tips closer than the threshold
pub fn is_pinch(hand: &Hand, threshold: f32) -> bool {
    match (hand.point(landmark::THUMB_TIP), hand.point(landmark::INDEX_TIP)) {
        (Some(thumb), Some(index)) => thumb.distance(index) < threshold,
        _ => false,
    }
}

/// Middle fingertip in the top band of the frame, optionally with the
/// fingers extended away from the wrist.
pub fn is_raised_hand(hand: &Hand, max_y: f32, open_distance: Option<f32>) -> bool {
    let Some(tip) = hand.point(landmark::MIDDLE_TIP) else {
        return false;
    };
    if tip.y >= max_y {
        return false;
    }
    match open_distance {
        None => true,
        Some(min) => hand
            .point(landmark::WRIST)
            .is_some_and(|wrist| wrist.distance(tip) > min),
    }
}

/// Whether the gesture that advances `stage` is present in this frame
pub fn gesture_satisfied(stage: Stage, hand: Option<&Hand>, tunables: &Tunables) -> bool {
    let Some(hand) = hand else {
        return false;
    };
    match stage {
        Stage::One => is_pinch(hand, tunables.pinch_threshold),
        Stage::Two => is_raised_hand(hand, tunables.raised_hand_y, tunables.open_hand_distance),
        Stage::Three => false,
    }
}

/// Synthetic hands for tests and the scripted demo
pub mod synthetic {
    use super::*;

    /// A neutral hand low in the frame: no pinch, not raised
    pub fn resting() -> Hand {
        let mut landmarks = vec![Landmark::new(0.5, 0.8); landmark::COUNT];
        landmarks[landmark::WRIST] = Landmark::new(0.5, 0.9);
        landmarks[landmark::THUMB_TIP] = Landmark::new(0.4, 0.7);
        landmarks[landmark::INDEX_TIP] = Landmark::new(0.5, 0.6);
        landmarks[landmark::MIDDLE_TIP] = Landmark::new(0.55, 0.55);
        Hand::new(landmarks)
    }

    /// Thumb and index tips `distance` apart
    pub fn pinching(distance: f32) -> Hand {
        let mut hand = resting();
        hand.landmarks[landmark::THUMB_TIP] = Landmark::new(0.5, 0.6);
        hand.landmarks[landmark::INDEX_TIP] = Landmark::new(0.5 + distance, 0.6);
        hand
    }

    /// Middle tip at `tip_y`, wrist `reach` below it
    pub fn raised(tip_y: f32, reach: f32) -> Hand {
        let mut hand = resting();
        hand.landmarks[landmark::MIDDLE_TIP] = Landmark::new(0.5, tip_y);
        hand.landmarks[landmark::WRIST] = Landmark::new(0.5, tip_y + reach);
        hand
    }
}
