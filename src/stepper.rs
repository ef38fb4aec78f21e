//! Per-tick simulation: spawn, update, retire.
//!
//! Each call to [`SimulationStepper::step`] runs, in order:
//!
//! 1. Age the particles carried over from the last tick and retire the
//!    expired ones, freeing their slots.
//! 2. Continuous emission: while emitting and (looping or still inside
//!    `duration`), `accumulator += rate * dt` and one particle spawns per whole
//!    unit. If the pool fills up the whole units left over are dropped.
//! 3. Bursts: scheduled cycles that have come due, then pending manual
//!    triggers. A looping effect that has reached its duration wraps its
//!    clock here, re-arms its scheduled bursts and collects the ones already
//!    due in the new playthrough, so a burst at `time = 0` fires on the
//!    wrapping tick.
//! 4. Age the newly spawned particles by `dt`.
//! 5. Update every live particle:
//!    velocity modules, integration, rotation, colour, size, noise,
//!    force fields, collision.
//! 6. Retire particles that died during the update.

use ::noise::Perlin;
use glam::{Vec2, Vec4};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::asset::ParticleAsset;
use crate::burst::BurstScheduler;
use crate::curve::lerp;
use crate::modules::{ModuleContext, ModuleStack};
use crate::pool::{Particle, ParticlePool};
use crate::shape;
use crate::time::PlaybackClock;

/// What one call to [`SimulationStepper::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles added this tick.
    pub spawned: u32,
    /// Spawn requests dropped because the pool was full.
    pub dropped: u32,
    /// Particles removed this tick.
    pub retired: u32,
    /// Whether the playthrough wrapped around.
    pub looped: bool,
}

/// Owns the runtime state of one effect and advances it.
pub struct SimulationStepper {
    pool: ParticlePool,
    bursts: BurstScheduler,
    clock: PlaybackClock,
    /// Fractional particles owed by continuous emission.
    accumulator: f32,
    rng: SmallRng,
    noise: Perlin,
    total_spawned: u64,
}

impl SimulationStepper {
    /// Stepper seeded from system entropy.
    pub fn new(capacity: usize) -> Self {
        Self::from_rng(capacity, SmallRng::from_entropy())
    }

    /// Stepper with a fixed seed. Equal seeds and inputs give equal runs.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::from_rng(capacity, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(capacity: usize, mut rng: SmallRng) -> Self {
        let noise = Perlin::new(rng.gen());
        Self {
            pool: ParticlePool::new(capacity),
            bursts: BurstScheduler::new(),
            clock: PlaybackClock::new(),
            accumulator: 0.0,
            rng,
            noise,
            total_spawned: 0,
        }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub(crate) fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    pub fn bursts(&self) -> &BurstScheduler {
        &self.bursts
    }

    pub(crate) fn bursts_mut(&mut self) -> &mut BurstScheduler {
        &mut self.bursts
    }

    /// Particles spawned since construction.
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Start a fresh playthrough: time zero, bursts re-armed, nothing owed.
    /// Existing particles and pending manual triggers are kept.
    pub fn restart(&mut self) {
        self.clock.reset();
        self.bursts.rearm();
        self.accumulator = 0.0;
    }

    /// Drop all scheduling state, and the particles too if `clear`.
    pub fn halt(&mut self, clear: bool) {
        self.bursts.reset();
        self.accumulator = 0.0;
        if clear {
            self.pool.clear();
        }
    }

    /// Forget everything and adopt the capacity of `asset`.
    pub fn reload(&mut self, asset: &ParticleAsset) {
        self.pool.clear();
        self.pool.set_capacity(asset.max_particles as usize);
        self.bursts.reset();
        self.restart();
        self.clock.set_time_scale(asset.playback_speed);
    }

    /// Bring runtime state in line with an edited asset without restarting.
    pub fn sync(&mut self, asset: &ParticleAsset) {
        let capacity = asset.max_particles as usize;
        if capacity != self.pool.capacity() {
            log::debug!("pool capacity {} -> {}", self.pool.capacity(), capacity);
            self.pool.set_capacity(capacity);
        }
        self.bursts.resize(asset.bursts.len());
        self.clock.set_time_scale(asset.playback_speed);
        for particle in self.pool.iter_mut() {
            particle.acceleration = asset.gravity;
        }
    }

    /// Advance the simulation by the raw host delta `raw_dt`.
    ///
    /// `center` is the emitter position in world space. With `emitting`
    /// false, continuous emission and scheduled bursts are suppressed but
    /// existing particles keep simulating and manual bursts still fire.
    pub fn step(
        &mut self,
        asset: &ParticleAsset,
        center: Vec2,
        raw_dt: f32,
        emitting: bool,
    ) -> StepReport {
        let mut report = StepReport::default();
        let started_at = self.clock.elapsed();
        let dt = self.clock.advance(raw_dt);

        for particle in self.pool.iter_mut() {
            particle.advance_age(dt);
        }
        report.retired += self.pool.retire_dead() as u32;

        let first_new = self.pool.len();

        if emitting && (asset.looping || started_at < asset.duration) {
            self.accumulator += asset.emission.rate * dt;
            while self.accumulator >= 1.0 {
                if !self.spawn(asset, center) {
                    let owed = self.accumulator.trunc() as u32;
                    report.dropped += owed;
                    self.accumulator = self.accumulator.fract();
                    break;
                }
                self.accumulator -= 1.0;
                report.spawned += 1;
            }
        }

        let mut batch = 0u32;
        if emitting {
            batch = batch.saturating_add(self.bursts.take_due(&asset.bursts, self.clock.elapsed()));
        }
        if asset.looping && self.clock.wrap(asset.duration) {
            log::trace!("'{}' looped after {:.3}s", asset.name, asset.duration);
            self.bursts.rearm();
            report.looped = true;
            if emitting {
                let due = self.bursts.take_due(&asset.bursts, self.clock.elapsed());
                batch = batch.saturating_add(due);
            }
        }
        batch = batch.saturating_add(self.bursts.take_manual(&asset.bursts, asset.max_particles));
        if batch > 0 {
            let spawned = self.spawn_batch(asset, center, batch);
            report.spawned += spawned;
            report.dropped += batch - spawned;
        }

        for particle in &mut self.pool.as_mut_slice()[first_new..] {
            particle.advance_age(dt);
        }

        self.update_particles(asset, center, dt);
        report.retired += self.pool.retire_dead() as u32;

        report
    }

    /// Spawn up to `count` particles at once. Returns how many fit.
    pub(crate) fn spawn_batch(&mut self, asset: &ParticleAsset, center: Vec2, count: u32) -> u32 {
        let fits = (count as usize).min(self.pool.remaining()) as u32;
        for _ in 0..fits {
            self.spawn(asset, center);
        }
        fits
    }

    fn spawn(&mut self, asset: &ParticleAsset, center: Vec2) -> bool {
        if self.pool.is_full() {
            return false;
        }
        let particle = self.new_particle(asset, center);
        self.total_spawned += 1;
        self.pool.spawn(particle)
    }

    /// Draw a particle's initial state from the asset's spawn ranges.
    fn new_particle(&mut self, asset: &ParticleAsset, center: Vec2) -> Particle {
        let spawn = &asset.spawn;
        let rng = &mut self.rng;

        let offset = shape::sample(
            asset.emission.shape,
            &asset.emission.shape_params,
            spawn.direction,
            rng,
        );
        let angle = spawn.direction + (rng.gen::<f32>() - 0.5) * spawn.spread;
        let speed = random_range(rng, spawn.speed_min, spawn.speed_max);
        let lifetime = random_range(rng, spawn.lifetime_min, spawn.lifetime_max);
        let scale = random_range(rng, spawn.scale_min, spawn.scale_max);
        let rotation = random_range(rng, spawn.rotation_min, spawn.rotation_max);
        let angular_velocity =
            random_range(rng, spawn.angular_velocity_min, spawn.angular_velocity_max);

        let [r, g, b] = asset.start_color;
        let start_color = Vec4::new(r, g, b, asset.start_alpha);

        let mut particle = Particle::new(center + offset, lifetime);
        particle.velocity = Vec2::from_angle(angle.to_radians()) * speed;
        particle.acceleration = asset.gravity;
        particle.rotation = rotation;
        particle.angular_velocity = angular_velocity;
        particle.start_scale = Vec2::splat(scale);
        particle.scale = particle.start_scale;
        particle.start_color = start_color;
        particle.color = start_color;
        particle.spawn_position = center;
        particle
    }

    fn update_particles(&mut self, asset: &ParticleAsset, center: Vec2, dt: f32) {
        let stack = ModuleStack::resolve(&asset.modules);
        let ctx = ModuleContext {
            center,
            time: self.clock.total_elapsed() as f32,
            noise: &self.noise,
        };

        for particle in self.pool.iter_mut().filter(|p| p.is_alive()) {
            let age = particle.normalized_age();

            for velocity in &stack.velocity {
                velocity.apply(particle, &ctx, dt);
            }

            particle.velocity += particle.acceleration * dt;
            particle.position += particle.velocity * dt;

            match stack.rotation {
                Some(rotation) => rotation.apply(particle, age, dt),
                None => particle.rotation += particle.angular_velocity * dt,
            }

            match stack.color {
                Some(color) => color.apply(particle, age),
                None => {
                    let alpha = lerp(particle.start_color.w, asset.end_alpha, age);
                    particle.color = particle.start_color.truncate().extend(alpha);
                }
            }

            match stack.size {
                Some(size) => size.apply(particle, age),
                None => particle.scale = particle.start_scale * lerp(1.0, asset.end_scale, age),
            }

            for noise in &stack.noise {
                noise.apply(particle, &ctx, dt);
            }
            for field in &stack.force_fields {
                field.apply(particle, &ctx, dt);
            }
            for collision in &stack.collisions {
                if !particle.is_alive() {
                    break;
                }
                collision.apply(particle, &ctx);
            }
        }
    }
}

impl std::fmt::Debug for SimulationStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationStepper")
            .field("pool", &self.pool)
            .field("bursts", &self.bursts)
            .field("clock", &self.clock)
            .field("accumulator", &self.accumulator)
            .field("total_spawned", &self.total_spawned)
            .finish_non_exhaustive()
    }
}

/// Uniform draw from `[min, max)`. Collapses to `min` for empty ranges.
fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        min + rng.gen::<f32>() * (max - min)
    } else {
        min
    }
}
