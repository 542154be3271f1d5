//! Ambient background dust
//!
//! A static cloud of points that never dies; only its rotation advances.

use glam::Vec3;
use rand::Rng;

use super::pool::{BlendMode, RenderParams};

#[derive(Debug, Clone)]
pub struct AmbientField {
    positions: Vec<Vec3>,
    /// Rotation about the vertical axis (radians)
    rotation_y: f32,
    spin: f32,
    opacity: f32,
    render: RenderParams,
}

impl AmbientField {
    /// Scatter `count` points uniformly in a cube of `±half_extent`
    pub fn new(count: usize, half_extent: f32, spin: f32, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.random::<f32>() - 0.5) * 2.0 * half_extent,
                    (rng.random::<f32>() - 0.5) * 2.0 * half_extent,
                    (rng.random::<f32>() - 0.5) * 2.0 * half_extent,
                )
            })
            .collect();

        Self {
            positions,
            rotation_y: 0.0,
            spin,
            opacity: 0.6,
            render: RenderParams {
                point_size: 0.4,
                blend: BlendMode::Normal,
                depth_write: true,
            },
        }
    }

    pub fn step(&mut self, ticks: u32) {
        self.rotation_y = (self.rotation_y + self.spin * ticks as f32) % std::f32::consts::TAU;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn render_params(&self) -> RenderParams {
        self.render
    }
}
