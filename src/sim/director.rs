//! Particle director
//!
//! Owns the ambient field, one pool per celebratory category, and the
//! seeded RNG every spawn draws from.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ambient::AmbientField;
use super::pool::{
    BlendMode, EmissionZone, ParticlePool, PoolConfig, RenderParams, SpriteHandle,
    VelocityProfile, Wobble,
};
use crate::consts::{AMBIENT_HALF_EXTENT, AMBIENT_SPIN};
use crate::settings::Settings;

/// Celebratory particle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Hearts,
    Balloons,
    Kisses,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hearts, Category::Balloons, Category::Kisses];

    pub fn sprite(&self) -> SpriteHandle {
        match self {
            Category::Hearts => SpriteHandle(1),
            Category::Balloons => SpriteHandle(2),
            Category::Kisses => SpriteHandle(3),
        }
    }

    /// Pool parameters for this category under the given settings
    pub fn pool_config(&self, settings: &Settings) -> PoolConfig {
        let t = &settings.tunables;
        let base = PoolConfig {
            capacity: settings.quality.celebration_capacity(),
            sprite: self.sprite(),
            render: RenderParams::default(),
            emission: EmissionZone::default(),
            velocity: VelocityProfile::default(),
            wobble: None,
            gravity: t.gravity,
            life_decay: t.life_decay,
        };

        match self {
            Category::Hearts => base,
            // Balloons drift up slower and sway
            Category::Balloons => PoolConfig {
                render: RenderParams {
                    point_size: 28.0,
                    blend: BlendMode::Normal,
                    depth_write: false,
                },
                velocity: VelocityProfile {
                    spread: 0.4,
                    min_rise: 0.4,
                    max_rise: 1.0,
                },
                wobble: Some(Wobble {
                    amplitude: t.wobble_amplitude,
                    frequency: t.wobble_frequency,
                }),
                ..base
            },
            Category::Kisses => PoolConfig {
                render: RenderParams {
                    point_size: 16.0,
                    ..RenderParams::default()
                },
                ..base
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticleDirector {
    rng: Pcg32,
    ambient: AmbientField,
    pools: Vec<(Category, ParticlePool)>,
}

impl ParticleDirector {
    pub fn new(settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.tunables.seed);
        let spin = if settings.reduced_motion { 0.0 } else { AMBIENT_SPIN };
        let ambient = AmbientField::new(
            settings.quality.ambient_count(),
            AMBIENT_HALF_EXTENT,
            spin,
            &mut rng,
        );
        let pools = Category::ALL
            .iter()
            .map(|&c| (c, ParticlePool::new(c.pool_config(settings))))
            .collect();

        Self { rng, ambient, pools }
    }

    /// Request `amount` spawns from every celebratory pool.
    ///
    /// Requests that pick a live slot are lost; a saturated pool simply
    /// absorbs the call.
    pub fn celebrate(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        let mut activated = 0;
        for (_, pool) in &mut self.pools {
            activated += pool.burst(amount, &mut self.rng);
        }
        log::debug!(
            "Celebrate x{} -> {} of {} requests landed",
            amount,
            activated,
            amount as usize * self.pools.len()
        );
    }

    /// Advance every pool and the ambient field
    pub fn step(&mut self, ticks: u32) {
        self.ambient.step(ticks);
        for (_, pool) in &mut self.pools {
            pool.step(ticks);
        }
    }

    pub fn pool(&self, category: Category) -> Option<&ParticlePool> {
        self.pools.iter().find(|(c, _)| *c == category).map(|(_, p)| p)
    }

    pub fn pools(&self) -> impl Iterator<Item = (Category, &ParticlePool)> {
        self.pools.iter().map(|(c, p)| (*c, p))
    }

    pub fn pools_mut(&mut self) -> impl Iterator<Item = (Category, &mut ParticlePool)> {
        self.pools.iter_mut().map(|(c, p)| (*c, p))
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn alive_count(&self) -> usize {
        self.pools.iter().map(|(_, p)| p.alive_count()).sum()
    }
}
