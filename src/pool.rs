//! Bounded storage for live particles.
//!
//! The pool never grows past its capacity: [`ParticlePool::spawn`] drops the
//! particle and returns `false` when full. Dead particles stay in place until
//! [`ParticlePool::retire_dead`] compacts them out, preserving spawn order of
//! the survivors.

use glam::{Vec2, Vec4};

/// Runtime state of a single particle.
///
/// Created by the stepper on spawn, mutated every tick, and removed once it
/// is no longer alive. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Constant acceleration applied during integration (the asset gravity).
    pub acceleration: Vec2,
    pub rotation: f32,
    /// Degrees per second.
    pub angular_velocity: f32,
    pub scale: Vec2,
    pub start_scale: Vec2,
    pub color: Vec4,
    pub start_color: Vec4,
    /// Seconds since spawn.
    pub age: f32,
    /// Seconds this particle may live.
    pub lifetime: f32,
    /// Emitter centre at the moment of spawning.
    pub spawn_position: Vec2,
    alive: bool,
}

impl Particle {
    /// Create a freshly spawned particle at rest.
    pub fn new(position: Vec2, lifetime: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            scale: Vec2::ONE,
            start_scale: Vec2::ONE,
            color: Vec4::ONE,
            start_color: Vec4::ONE,
            age: 0.0,
            lifetime,
            spawn_position: position,
            alive: true,
        }
    }

    /// Whether the particle will survive the next retirement pass.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the particle dead. It is removed at the next retirement pass.
    #[inline]
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Age by `dt`, killing the particle once its lifetime is spent.
    ///
    /// Returns whether it is still alive.
    pub fn advance_age(&mut self, dt: f32) -> bool {
        self.age += dt;
        if self.age >= self.lifetime {
            self.alive = false;
        }
        self.alive
    }

    /// Age as a fraction of lifetime, clamped to `[0, 1]`.
    #[inline]
    pub fn normalized_age(&self) -> f32 {
        if self.lifetime > f32::EPSILON {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Seconds left before the particle expires.
    #[inline]
    pub fn remaining_life(&self) -> f32 {
        (self.lifetime - self.age).max(0.0)
    }
}

/// Fixed-capacity particle store.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of particles the pool holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored particles, including any not yet retired.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    /// Free slots left.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.particles.len())
    }

    /// Insert a particle. Returns `false` and drops it if the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Remove every dead particle. Returns how many were removed.
    pub fn retire_dead(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        before - self.particles.len()
    }

    /// Change capacity, discarding the newest particles if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.particles.truncate(capacity);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_new() {
        let p = Particle::new(Vec2::new(1.0, 2.0), 5.0);
        assert_eq!(p.position, Vec2::new(1.0, 2.0));
        assert_eq!(p.spawn_position, Vec2::new(1.0, 2.0));
        assert_eq!(p.lifetime, 5.0);
        assert_eq!(p.age, 0.0);
        assert!(p.is_alive());
    }

    #[test]
    fn test_dies_exactly_at_lifetime() {
        let mut p = Particle::new(Vec2::ZERO, 1.0);
        assert!(p.advance_age(0.5));
        assert!(p.advance_age(0.25));
        assert!(!p.advance_age(0.25));
        assert_eq!(p.age, 1.0);
    }

    #[test]
    fn test_normalized_age() {
        let mut p = Particle::new(Vec2::ZERO, 10.0);
        assert_eq!(p.normalized_age(), 0.0);
        p.age = 5.0;
        assert_eq!(p.normalized_age(), 0.5);
        p.age = 15.0;
        assert_eq!(p.normalized_age(), 1.0);

        let zero = Particle::new(Vec2::ZERO, 0.0);
        assert_eq!(zero.normalized_age(), 1.0);
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let mut pool = ParticlePool::new(2);
        assert!(pool.spawn(Particle::new(Vec2::ZERO, 1.0)));
        assert!(pool.spawn(Particle::new(Vec2::ZERO, 1.0)));
        assert!(!pool.spawn(Particle::new(Vec2::ZERO, 1.0)));
        assert_eq!(pool.len(), 2);
        assert!(pool.is_full());
        assert_eq!(pool.remaining(), 0);
    }

    #[test]
    fn test_retire_dead_keeps_order() {
        let mut pool = ParticlePool::new(4);
        for i in 0..4 {
            pool.spawn(Particle::new(Vec2::new(i as f32, 0.0), 1.0));
        }
        pool.as_mut_slice()[1].kill();
        pool.as_mut_slice()[2].kill();

        assert_eq!(pool.retire_dead(), 2);
        let xs: Vec<f32> = pool.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 3.0]);
    }

    #[test]
    fn test_shrinking_capacity_truncates() {
        let mut pool = ParticlePool::new(5);
        for _ in 0..5 {
            pool.spawn(Particle::new(Vec2::ZERO, 1.0));
        }
        pool.set_capacity(3);
        assert_eq!(pool.len(), 3);
        assert!(pool.is_full());
    }
}
