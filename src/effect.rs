//! Host-facing control surface for one particle effect.
//!
//! A [`ParticleEffect`] pairs an asset with the runtime state simulating it.
//! The host drives it once per frame with [`tick`](ParticleEffect::tick) and
//! reads the result through [`render_feed`](ParticleEffect::render_feed).
//!
//! # Playback states
//!
//! | From | Call | To | Effect |
//! |------|------|----|--------|
//! | Stopped | `play()` | Playing | time zero, bursts re-armed |
//! | Paused | `play()` | Playing | time resumes where it froze |
//! | Playing | `pause()` | Paused | time and particles freeze |
//! | any | `stop(clear)` | Stopped | emission ends, scheduling state dropped |
//!
//! A stopped effect keeps simulating the particles it still has (when
//! stopped without `clear`) until they expire, but emits nothing new.
//!
//! # Example
//!
//! ```
//! use flurry::{ParticleAsset, ParticleEffect};
//!
//! let mut effect = ParticleEffect::with_seed(ParticleAsset::default(), 1);
//! effect.play();
//! for _ in 0..60 {
//!     effect.tick(1.0 / 60.0);
//! }
//! assert!(effect.stats().live > 0);
//! ```

use glam::Vec2;
use serde_json::Value;

use crate::asset::ParticleAsset;
use crate::error::Result;
use crate::pool::Particle;
use crate::render::RenderFeed;
use crate::stepper::{SimulationStepper, StepReport};

/// Where an effect is in its playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Counters describing an effect at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectStats {
    /// Particles currently alive.
    pub live: usize,
    /// Pool capacity.
    pub capacity: usize,
    /// Particles spawned since the effect was created.
    pub total_spawned: u64,
    /// Ticks since the last restart.
    pub frame: u64,
    /// Seconds into the current playthrough.
    pub elapsed: f32,
}

/// A playable particle effect.
#[derive(Debug)]
pub struct ParticleEffect {
    asset: ParticleAsset,
    stepper: SimulationStepper,
    state: PlaybackState,
    position: Vec2,
    dirty: bool,
    last_report: StepReport,
}

impl ParticleEffect {
    /// Stopped effect for `asset`, seeded from system entropy.
    pub fn new(asset: ParticleAsset) -> Self {
        let stepper = SimulationStepper::new(asset.max_particles as usize);
        Self::from_parts(asset, stepper)
    }

    /// Stopped effect whose randomness is fully determined by `seed`.
    pub fn with_seed(asset: ParticleAsset, seed: u64) -> Self {
        let stepper = SimulationStepper::with_seed(asset.max_particles as usize, seed);
        Self::from_parts(asset, stepper)
    }

    fn from_parts(asset: ParticleAsset, mut stepper: SimulationStepper) -> Self {
        stepper.reload(&asset);
        Self {
            asset,
            stepper,
            state: PlaybackState::Stopped,
            position: Vec2::ZERO,
            dirty: false,
            last_report: StepReport::default(),
        }
    }

    /// Start or resume playback.
    ///
    /// From Stopped this begins a new playthrough with every scheduled burst
    /// re-armed. Manual bursts requested while stopped still fire on the next
    /// tick.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Paused => self.stepper.clock_mut().resume(),
            PlaybackState::Stopped => self.stepper.restart(),
        }
        log::debug!("'{}' {:?} -> Playing", self.asset.name, self.state);
        self.state = PlaybackState::Playing;
    }

    /// Freeze time. Particles keep their state until playback resumes.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.stepper.clock_mut().pause();
            self.state = PlaybackState::Paused;
            log::debug!("'{}' Playing -> Paused", self.asset.name);
        }
    }

    /// End emission and drop scheduling state. With `clear`, live particles
    /// are removed immediately; otherwise they play out their lifetimes.
    pub fn stop(&mut self, clear: bool) {
        self.stepper.halt(clear);
        self.stepper.clock_mut().resume();
        if self.state != PlaybackState::Stopped {
            log::debug!(
                "'{}' {:?} -> Stopped (clear: {clear})",
                self.asset.name,
                self.state
            );
        }
        self.state = PlaybackState::Stopped;
    }

    /// Request a one-shot batch, spawned on the next tick.
    ///
    /// A `count` of zero asks for the asset default: the sum of its
    /// configured bursts, or `min(max_particles, 50)` if it has none.
    pub fn burst(&mut self, count: u32) {
        let requested = (count > 0).then_some(count);
        self.stepper.bursts_mut().trigger(requested);
    }

    /// Advance by `dt` seconds of host time (scaled by the asset's playback
    /// speed). Does nothing while paused.
    ///
    /// `dt` is used as given, even on the first tick after [`play`](Self::play),
    /// so a fixed-step host emits from its very first tick. Hosts that only
    /// have a clock should call [`tick_at`](Self::tick_at), which advances the
    /// first tick after a restart or resume by zero.
    pub fn tick(&mut self, dt: f32) {
        if self.dirty {
            self.stepper.sync(&self.asset);
            self.dirty = false;
        }

        let emitting = match self.state {
            PlaybackState::Paused => return,
            PlaybackState::Playing => true,
            PlaybackState::Stopped => {
                if self.stepper.pool().is_empty() && !self.stepper.bursts().has_pending() {
                    return;
                }
                false
            }
        };

        self.last_report = self.stepper.step(&self.asset, self.position, dt, emitting);
    }

    /// Advance to the host timestamp `seconds`. The first call after
    /// construction, restart or resume advances by zero.
    pub fn tick_at(&mut self, seconds: f64) {
        let dt = self.stepper.clock_mut().delta_since(seconds);
        self.tick(dt);
    }

    /// Replace the asset with one parsed from JSON.
    ///
    /// On success the pool and all scheduling state are cleared and the
    /// playback state is kept. On failure nothing changes.
    pub fn load_asset(&mut self, json: &str) -> Result<()> {
        let asset = ParticleAsset::from_json(json)?;
        self.set_asset(asset)
    }

    /// Replace the asset after validating it. Same semantics as
    /// [`load_asset`](Self::load_asset).
    pub fn set_asset(&mut self, asset: ParticleAsset) -> Result<()> {
        asset.validate()?;
        log::debug!(
            "loaded '{}' ({} particles max, {} modules, {} bursts)",
            asset.name,
            asset.max_particles,
            asset.modules.len(),
            asset.bursts.len()
        );
        self.asset = asset;
        self.stepper.reload(&self.asset);
        self.dirty = false;
        Ok(())
    }

    /// Set one asset property by dotted path, e.g. `"emission.rate"`.
    ///
    /// The change takes effect on the next tick without restarting. A
    /// rejected write leaves the asset unchanged.
    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        match self.asset.with_property(key, value.into()) {
            Ok(asset) => {
                self.asset = asset;
                self.mark_dirty();
                Ok(())
            }
            Err(err) => {
                log::warn!("rejected property `{key}` on '{}': {err}", self.asset.name);
                Err(err)
            }
        }
    }

    /// Flag the asset as edited so the next tick re-applies capacity,
    /// burst list length, playback speed and gravity.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn asset(&self) -> &ParticleAsset {
        &self.asset
    }

    /// Mutable access to the asset. Marks the effect dirty.
    pub fn asset_mut(&mut self) -> &mut ParticleAsset {
        self.dirty = true;
        &mut self.asset
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Emitter centre in world space.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the emitter. Live particles stay where they are.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        self.stepper.pool().as_slice()
    }

    /// Drawable snapshot of the live particles.
    pub fn render_feed(&self) -> RenderFeed<'_> {
        RenderFeed::new(self.stepper.pool().as_slice(), &self.asset.render)
    }

    /// What the last tick did.
    pub fn last_step(&self) -> StepReport {
        self.last_report
    }

    pub fn stats(&self) -> EffectStats {
        let clock = self.stepper.clock();
        EffectStats {
            live: self.stepper.pool().len(),
            capacity: self.stepper.pool().capacity(),
            total_spawned: self.stepper.total_spawned(),
            frame: clock.frame(),
            elapsed: clock.elapsed(),
        }
    }

    /// Whether the effect has nothing left to show and will not emit again
    /// on its own.
    ///
    /// Looping effects only finish once stopped and empty.
    pub fn is_finished(&self) -> bool {
        if !self.stepper.pool().is_empty() || self.stepper.bursts().has_pending() {
            return false;
        }
        match self.state {
            PlaybackState::Stopped => true,
            PlaybackState::Paused => false,
            PlaybackState::Playing => {
                !self.asset.looping
                    && self.stepper.clock().elapsed() >= self.asset.duration
                    && self.stepper.bursts().all_fired(&self.asset.bursts)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::BurstConfig;
    use crate::error::AssetError;

    fn quiet_asset() -> ParticleAsset {
        let mut asset = ParticleAsset::default();
        asset.emission.rate = 0.0;
        asset.spawn.lifetime_min = 1.0;
        asset.spawn.lifetime_max = 1.0;
        asset
    }

    #[test]
    fn test_new_effect_is_stopped_and_idle() {
        let mut effect = ParticleEffect::with_seed(ParticleAsset::default(), 3);
        assert_eq!(effect.state(), PlaybackState::Stopped);
        effect.tick(1.0);
        assert_eq!(effect.stats().live, 0);
        assert!(effect.is_finished());
    }

    #[test]
    fn test_pause_freezes_particles() {
        let mut asset = quiet_asset();
        asset.emission.rate = 10.0;
        let mut effect = ParticleEffect::with_seed(asset, 3);
        effect.play();
        effect.tick(0.5);
        let frozen = effect.particles().to_vec();

        effect.pause();
        effect.tick(0.5);
        assert_eq!(effect.particles(), frozen.as_slice());
        assert_eq!(effect.stats().elapsed, 0.5);

        effect.play();
        effect.tick(0.1);
        assert_ne!(effect.particles(), frozen.as_slice());
    }

    #[test]
    fn test_stop_without_clear_drains() {
        let mut asset = quiet_asset();
        asset.emission.rate = 20.0;
        let mut effect = ParticleEffect::with_seed(asset, 3);
        effect.play();
        effect.tick(0.5);
        let spawned = effect.stats().total_spawned;
        assert!(spawned > 0);

        effect.stop(false);
        effect.tick(0.25);
        assert!(effect.stats().live > 0);
        assert_eq!(effect.stats().total_spawned, spawned);

        effect.tick(1.0);
        assert_eq!(effect.stats().live, 0);
        assert!(effect.is_finished());
    }

    #[test]
    fn test_stop_with_clear_empties() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(12);
        effect.tick(0.0);
        assert_eq!(effect.stats().live, 12);

        effect.stop(true);
        assert_eq!(effect.stats().live, 0);
    }

    #[test]
    fn test_stop_discards_unobserved_burst() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(5);
        effect.stop(true);
        effect.play();
        effect.tick(0.1);
        assert_eq!(effect.stats().live, 0);
    }

    #[test]
    fn test_load_asset_failure_keeps_state() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(4);
        effect.tick(0.1);

        assert!(matches!(effect.load_asset("{ broken"), Err(AssetError::Parse(_))));
        assert!(matches!(
            effect.load_asset(r#"{ "max_particles": 0 }"#),
            Err(AssetError::Invalid { .. })
        ));
        assert_eq!(effect.stats().live, 4);
        assert_eq!(effect.asset().max_particles, 1000);
    }

    #[test]
    fn test_load_asset_resets_runtime() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(4);
        effect.tick(0.1);

        effect
            .load_asset(r#"{ "name": "Next", "max_particles": 8, "emission": { "rate": 0 } }"#)
            .unwrap();
        assert_eq!(effect.stats().live, 0);
        assert_eq!(effect.stats().capacity, 8);
        assert_eq!(effect.asset().name, "Next");
        assert!(effect.is_playing());
    }

    #[test]
    fn test_set_property_applies_on_next_tick() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(20);
        effect.tick(0.0);

        effect.set_property("max_particles", 5).unwrap();
        assert_eq!(effect.stats().live, 20);
        effect.tick(0.0);
        assert_eq!(effect.stats().live, 5);
        assert_eq!(effect.stats().capacity, 5);
    }

    #[test]
    fn test_set_property_rejects_unknown_key() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        let before = effect.asset().clone();
        assert!(matches!(
            effect.set_property("emission.flux", 3.0),
            Err(AssetError::UnknownProperty(_))
        ));
        assert_eq!(effect.asset(), &before);
    }

    #[test]
    fn test_asset_mut_gravity_reaches_live_particles() {
        let mut effect = ParticleEffect::with_seed(quiet_asset(), 3);
        effect.play();
        effect.burst(3);
        effect.tick(0.0);

        effect.asset_mut().gravity = Vec2::new(0.0, -30.0);
        effect.tick(0.0);
        assert!(effect
            .particles()
            .iter()
            .all(|p| p.acceleration == Vec2::new(0.0, -30.0)));
    }

    #[test]
    fn test_tick_at_first_call_is_zero() {
        let mut asset = quiet_asset();
        asset.bursts = vec![BurstConfig::new(0.0, 1)];
        let mut effect = ParticleEffect::with_seed(asset, 3);
        effect.play();

        effect.tick_at(1000.0);
        assert_eq!(effect.stats().elapsed, 0.0);
        assert_eq!(effect.stats().live, 1);

        effect.tick_at(1000.5);
        assert!((effect.stats().elapsed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_emitter_position_offsets_spawns() {
        let mut asset = quiet_asset();
        asset.spawn.speed_min = 0.0;
        asset.spawn.speed_max = 0.0;
        let mut effect = ParticleEffect::with_seed(asset, 3);
        effect.set_position(Vec2::new(50.0, 25.0));
        effect.play();
        effect.burst(2);
        effect.tick(0.0);

        assert!(effect
            .particles()
            .iter()
            .all(|p| p.position == Vec2::new(50.0, 25.0)));
    }

    #[test]
    fn test_non_looping_finishes() {
        let mut asset = quiet_asset();
        asset.looping = false;
        asset.duration = 0.5;
        asset.emission.rate = 10.0;
        asset.spawn.lifetime_min = 0.2;
        asset.spawn.lifetime_max = 0.2;
        let mut effect = ParticleEffect::with_seed(asset, 3);
        effect.play();

        effect.tick(0.25);
        assert!(!effect.is_finished());
        for _ in 0..8 {
            effect.tick(0.25);
        }
        assert!(effect.is_finished());
    }
}
