//! Fixed-capacity particle pool
//!
//! Slots are never freed individually. A slot is alive while `life > 0`;
//! dead slots are parked at [`SENTINEL`] until a spawn attempt reuses them.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{LIFE_EPSILON, SENTINEL};

/// Opaque handle to the sprite/texture the renderer draws for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteHandle(pub u32);

/// How the renderer composites a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Additive,
}

/// Per-category render parameters, read by the renderer only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub point_size: f32,
    pub blend: BlendMode,
    pub depth_write: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            point_size: 20.0,
            blend: BlendMode::Additive,
            depth_write: false,
        }
    }
}

/// Horizontal oscillation applied while a particle is alive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub amplitude: f32,
    /// Radians per tick
    pub frequency: f32,
}

/// Region new particles appear in: `center` plus uniform jitter in `±half_extent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionZone {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl Default for EmissionZone {
    /// Bottom center of the view, spread 10 units in X and Z
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, -20.0, 0.0),
            half_extent: Vec3::new(5.0, 0.0, 5.0),
        }
    }
}

impl EmissionZone {
    pub fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        self.center + jitter(rng) * self.half_extent
    }
}

/// Upward cone of initial velocities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityProfile {
    /// Horizontal (X/Z) speed spread: uniform in `±spread`
    pub spread: f32,
    pub min_rise: f32,
    pub max_rise: f32,
}

impl Default for VelocityProfile {
    fn default() -> Self {
        Self {
            spread: 0.75,
            min_rise: 0.5,
            max_rise: 1.5,
        }
    }
}

impl VelocityProfile {
    pub fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        let j = jitter(rng);
        let rise = self.min_rise + rng.random::<f32>() * (self.max_rise - self.min_rise);
        Vec3::new(j.x * self.spread, rise, j.z * self.spread)
    }
}

/// Uniform vector in [-1, 1)^3
fn jitter(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() * 2.0 - 1.0,
        rng.random::<f32>() * 2.0 - 1.0,
        rng.random::<f32>() * 2.0 - 1.0,
    )
}

/// Construction parameters for one pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub capacity: usize,
    pub sprite: SpriteHandle,
    pub render: RenderParams,
    pub emission: EmissionZone,
    pub velocity: VelocityProfile,
    pub wobble: Option<Wobble>,
    pub gravity: f32,
    pub life_decay: f32,
}

/// A fixed array of particle slots for one visual category
#[derive(Debug, Clone)]
pub struct ParticlePool {
    config: PoolConfig,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    lives: Vec<f32>,
    /// Per-slot wobble phase, re-rolled on spawn
    phases: Vec<f32>,
    needs_redraw: bool,
}

impl ParticlePool {
    /// Create a pool with every slot dead and parked
    pub fn new(config: PoolConfig) -> Self {
        let capacity = config.capacity;
        Self {
            config,
            positions: vec![SENTINEL; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            lives: vec![0.0; capacity],
            phases: vec![0.0; capacity],
            needs_redraw: true,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.lives.len()
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.config.sprite
    }

    pub fn render_params(&self) -> RenderParams {
        self.config.render
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.lives.get(index).is_some_and(|&life| life > 0.0)
    }

    pub fn alive_count(&self) -> usize {
        self.lives.iter().filter(|&&life| life > 0.0).count()
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        self.velocities.get(index).copied()
    }

    pub fn life(&self, index: usize) -> Option<f32> {
        self.lives.get(index).copied()
    }

    /// Flat XYZ position buffer, `3 * capacity` floats
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Per-slot opacity buffer, `capacity` floats
    pub fn life_buffer(&self) -> &[f32] {
        &self.lives
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Read and clear the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }

    /// Spawn using the pool's own emission zone and velocity profile
    pub fn burst(&mut self, n: u32, rng: &mut impl Rng) -> u32 {
        let PoolConfig { emission, velocity, .. } = self.config;
        self.spawn(n, &emission, &velocity, rng)
    }

    /// Try to activate `n` slots, one random slot pick per request.
    ///
    /// A pick that lands on a live slot is dropped without retry, so a busy
    /// pool sheds load. Returns how many slots were actually activated.
    pub fn spawn(
        &mut self,
        n: u32,
        zone: &EmissionZone,
        profile: &VelocityProfile,
        rng: &mut impl Rng,
    ) -> u32 {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }

        let mut activated = 0;
        for _ in 0..n {
            let i = rng.random_range(0..capacity);
            if self.lives[i] > 0.0 {
                continue;
            }
            self.positions[i] = zone.sample(rng);
            self.velocities[i] = profile.sample(rng);
            self.phases[i] = rng.random::<f32>() * std::f32::consts::TAU;
            self.lives[i] = 1.0;
            activated += 1;
        }

        if activated > 0 {
            self.needs_redraw = true;
        }
        activated
    }

    /// Advance every live slot by `ticks` fixed steps
    pub fn step(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.step_once();
        }
    }

    fn step_once(&mut self) {
        let PoolConfig { gravity, life_decay, wobble, .. } = self.config;
        let mut touched = false;

        for i in 0..self.lives.len() {
            if self.lives[i] <= 0.0 {
                continue;
            }
            touched = true;

            let pos = &mut self.positions[i];
            let vel = &mut self.velocities[i];
            *pos += *vel;
            vel.y -= gravity;

            if let Some(w) = wobble {
                // Age in ticks is recoverable from spent life
                let age = (1.0 - self.lives[i]) / life_decay;
                pos.x += w.amplitude * (self.phases[i] + age * w.frequency).sin();
            }

            self.lives[i] -= life_decay;
            if self.lives[i] <= LIFE_EPSILON {
                self.lives[i] = 0.0;
                self.positions[i] = SENTINEL;
                self.velocities[i] = Vec3::ZERO;
            }
        }

        if touched {
            self.needs_redraw = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config(capacity: usize) -> PoolConfig {
        PoolConfig {
            capacity,
            sprite: SpriteHandle(1),
            render: RenderParams::default(),
            emission: EmissionZone::default(),
            velocity: VelocityProfile::default(),
            wobble: None,
            gravity: 0.02,
            life_decay: 0.01,
        }
    }

    fn assert_dead_parked(pool: &ParticlePool) {
        for i in 0..pool.capacity() {
            if !pool.is_alive(i) {
                assert!(pool.life(i).unwrap() <= 0.0);
                assert_eq!(pool.position(i).unwrap(), SENTINEL);
            }
        }
    }

    #[test]
    fn test_new_pool_all_dead() {
        let pool = ParticlePool::new(config(64));
        assert_eq!(pool.alive_count(), 0);
        assert_eq!(pool.position_buffer().len(), 64 * 3);
        assert_eq!(pool.life_buffer().len(), 64);
        assert_dead_parked(&pool);
    }

    #[test]
    fn test_spawn_sets_life_and_emission() {
        let mut pool = ParticlePool::new(config(1000));
        let mut rng = Pcg32::seed_from_u64(7);
        let activated = pool.burst(50, &mut rng);
        assert!(activated > 0 && activated <= 50);
        assert_eq!(pool.alive_count() as u32, activated);

        for i in (0..pool.capacity()).filter(|&i| pool.is_alive(i)) {
            assert_eq!(pool.life(i), Some(1.0));
            let p = pool.position(i).unwrap();
            assert_eq!(p.y, -20.0);
            assert!(p.x.abs() <= 5.0 && p.z.abs() <= 5.0);
            let v = pool.velocity(i).unwrap();
            assert!((0.5..1.5).contains(&v.y));
        }
    }

    #[test]
    fn test_pick_hitting_live_slot_is_dropped() {
        let mut pool = ParticlePool::new(config(1));
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(pool.burst(10, &mut rng), 1);
        let before = pool.position(0);
        // Saturated: every pick lands on the live slot
        assert_eq!(pool.burst(10, &mut rng), 0);
        assert_eq!(pool.position(0), before);
    }

    #[test]
    fn test_spawn_zero_is_noop() {
        let mut pool = ParticlePool::new(config(16));
        pool.take_redraw();
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(pool.burst(0, &mut rng), 0);
        assert!(!pool.needs_redraw());
    }

    #[test]
    fn test_step_integrates_and_applies_gravity() {
        let mut pool = ParticlePool::new(config(1));
        let mut rng = Pcg32::seed_from_u64(5);
        pool.burst(1, &mut rng);
        let p0 = pool.position(0).unwrap();
        let v0 = pool.velocity(0).unwrap();

        pool.step(1);
        let p1 = pool.position(0).unwrap();
        let v1 = pool.velocity(0).unwrap();
        assert!((p1 - (p0 + v0)).length() < 1e-5);
        assert!((v1.y - (v0.y - 0.02)).abs() < 1e-6);
        assert!((pool.life(0).unwrap() - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_step_zero_leaves_buffers_unchanged() {
        let mut pool = ParticlePool::new(config(128));
        let mut rng = Pcg32::seed_from_u64(11);
        pool.burst(40, &mut rng);
        let positions = pool.position_buffer().to_vec();
        let lives = pool.life_buffer().to_vec();
        pool.step(0);
        assert_eq!(pool.position_buffer(), positions.as_slice());
        assert_eq!(pool.life_buffer(), lives.as_slice());
    }

    #[test]
    fn test_all_particles_die_within_decay_window() {
        let mut pool = ParticlePool::new(config(256));
        let mut rng = Pcg32::seed_from_u64(42);
        pool.burst(200, &mut rng);
        assert!(pool.alive_count() > 0);

        let window = (1.0f64 / 0.01f32 as f64).ceil() as u32;
        pool.step(window);
        assert_eq!(pool.alive_count(), 0);
        assert_dead_parked(&pool);
    }

    #[test]
    fn test_wobble_moves_horizontally() {
        let mut plain = ParticlePool::new(config(1));
        let mut wobbly = ParticlePool::new(PoolConfig {
            wobble: Some(Wobble { amplitude: 0.5, frequency: 0.3 }),
            ..config(1)
        });
        let mut rng_a = Pcg32::seed_from_u64(9);
        let mut rng_b = Pcg32::seed_from_u64(9);
        plain.burst(1, &mut rng_a);
        wobbly.burst(1, &mut rng_b);

        plain.step(10);
        wobbly.step(10);
        let a = plain.position(0).unwrap();
        let b = wobbly.position(0).unwrap();
        assert_eq!(a.y, b.y);
        assert_eq!(a.z, b.z);
        assert_ne!(a.x, b.x);
    }

    #[test]
    fn test_redraw_flag() {
        let mut pool = ParticlePool::new(config(8));
        assert!(pool.take_redraw());
        assert!(!pool.take_redraw());

        // Stepping an empty pool changes nothing
        pool.step(3);
        assert!(!pool.needs_redraw());

        let mut rng = Pcg32::seed_from_u64(2);
        pool.burst(4, &mut rng);
        assert!(pool.take_redraw());
        pool.step(1);
        assert!(pool.take_redraw());
    }

    proptest! {
        #[test]
        fn prop_lifecycle_invariants(
            seed in any::<u64>(),
            capacity in 1usize..200,
            bursts in proptest::collection::vec((0u32..80, 0u32..40), 1..12),
        ) {
            let mut pool = ParticlePool::new(config(capacity));
            let mut rng = Pcg32::seed_from_u64(seed);

            for (amount, ticks) in bursts {
                let alive_before = pool.alive_count();
                let activated = pool.burst(amount, &mut rng);
                prop_assert!(activated <= amount);
                prop_assert!(pool.alive_count() <= capacity);
                prop_assert_eq!(pool.alive_count(), alive_before + activated as usize);
                for &life in pool.life_buffer() {
                    prop_assert!(life <= 1.0);
                }

                for _ in 0..ticks {
                    let before = pool.life_buffer().to_vec();
                    pool.step(1);
                    for (old, new) in before.iter().zip(pool.life_buffer()) {
                        prop_assert!(new <= old);
                    }
                }

                for i in 0..capacity {
                    if !pool.is_alive(i) {
                        prop_assert!(pool.life(i).unwrap() <= 0.0);
                        prop_assert_eq!(pool.position(i).unwrap(), SENTINEL);
                    }
                }
            }
        }
    }
}
