//! One-shot spawn batches: scheduled by time or triggered by the host.
//!
//! # Scheduled bursts
//!
//! Each [`BurstConfig`] fires `count` particles once the playthrough's elapsed
//! time reaches `time`. With `cycles > 1` it fires again every `interval`
//! seconds until all cycles are spent. Fired cycles are remembered per burst
//! index until [`BurstScheduler::rearm`] (loop wrap, restart) or
//! [`BurstScheduler::reset`] (stop).
//!
//! # Manual bursts
//!
//! [`BurstScheduler::trigger`] bumps a monotonic counter. The stepper observes
//! the counter once per tick and spawns the requested batch:
//!
//! - an explicit count, if one was given
//! - otherwise the sum of all configured burst counts
//! - otherwise `min(max_particles, 50)`

use serde::{Deserialize, Serialize};

/// Batch size used by a manual trigger when the asset configures no bursts.
pub const DEFAULT_MANUAL_BURST: u32 = 50;

/// A scheduled burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Seconds into the playthrough of the first firing.
    pub time: f32,
    /// Particles per firing.
    pub count: u32,
    /// Number of firings. `0` behaves as `1`.
    pub cycles: u32,
    /// Seconds between firings.
    pub interval: f32,
}

impl BurstConfig {
    /// A single-cycle burst.
    pub fn new(time: f32, count: u32) -> Self {
        Self {
            time,
            count,
            ..Default::default()
        }
    }

    /// Repeat the burst `cycles` times, `interval` seconds apart.
    pub fn repeating(mut self, cycles: u32, interval: f32) -> Self {
        self.cycles = cycles;
        self.interval = interval;
        self
    }

    #[inline]
    fn total_cycles(&self) -> u32 {
        self.cycles.max(1)
    }

    /// Elapsed time at which `cycle` fires.
    #[inline]
    fn fire_time(&self, cycle: u32) -> f32 {
        self.time + cycle as f32 * self.interval.max(0.0)
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            time: 0.0,
            count: 10,
            cycles: 1,
            interval: 0.0,
        }
    }
}

/// Fired-state and manual trigger bookkeeping for one effect.
#[derive(Debug, Clone, Default)]
pub struct BurstScheduler {
    /// Cycles already fired, indexed like the asset's burst list.
    fired: Vec<u32>,
    /// Monotonic count of manual triggers.
    trigger_count: u64,
    /// Trigger count at the last observation.
    observed: u64,
    /// Explicit counts of triggers not yet observed. `None` = asset default.
    pending: Vec<Option<u32>>,
}

impl BurstScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a manual burst. Returns the new trigger count.
    pub fn trigger(&mut self, count: Option<u32>) -> u64 {
        self.trigger_count = self.trigger_count.wrapping_add(1);
        self.pending.push(count);
        self.trigger_count
    }

    /// Total manual triggers so far.
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    /// Whether a manual trigger is waiting to be observed.
    pub fn has_pending(&self) -> bool {
        self.observed != self.trigger_count
    }

    /// Cycles already fired for burst `index`.
    pub fn fired_cycles(&self, index: usize) -> u32 {
        self.fired.get(index).copied().unwrap_or(0)
    }

    /// Whether every cycle of every burst in `bursts` has fired.
    pub fn all_fired(&self, bursts: &[BurstConfig]) -> bool {
        bursts
            .iter()
            .enumerate()
            .all(|(index, burst)| self.fired_cycles(index) >= burst.total_cycles())
    }

    /// Consume pending manual triggers and return the particle count they ask for.
    pub fn take_manual(&mut self, bursts: &[BurstConfig], max_particles: u32) -> u32 {
        if !self.has_pending() {
            return 0;
        }
        self.observed = self.trigger_count;

        let default_batch = if bursts.is_empty() {
            max_particles.min(DEFAULT_MANUAL_BURST)
        } else {
            bursts.iter().fold(0u32, |sum, b| sum.saturating_add(b.count))
        };

        self.pending
            .drain(..)
            .map(|count| count.unwrap_or(default_batch))
            .fold(0u32, u32::saturating_add)
    }

    /// Fire every scheduled cycle whose time has been reached.
    ///
    /// Returns the total particle count due this tick.
    pub fn take_due(&mut self, bursts: &[BurstConfig], elapsed: f32) -> u32 {
        if self.fired.len() < bursts.len() {
            self.fired.resize(bursts.len(), 0);
        }

        let mut due = 0u32;
        for (index, burst) in bursts.iter().enumerate() {
            let fired = &mut self.fired[index];
            while *fired < burst.total_cycles() && elapsed >= burst.fire_time(*fired) {
                log::trace!(
                    "burst {index} cycle {} fired at {elapsed:.3}s ({} particles)",
                    *fired,
                    burst.count
                );
                due = due.saturating_add(burst.count);
                *fired += 1;
            }
        }
        due
    }

    /// Forget fired cycles so every burst fires again. Manual triggers are kept.
    pub fn rearm(&mut self) {
        self.fired.iter_mut().for_each(|f| *f = 0);
    }

    /// Track a burst list of a new length, dropping state for removed bursts.
    pub fn resize(&mut self, burst_count: usize) {
        self.fired.truncate(burst_count);
    }

    /// Clear fired cycles and discard unobserved manual triggers.
    pub fn reset(&mut self) {
        self.fired.clear();
        self.pending.clear();
        self.observed = self.trigger_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once() {
        let bursts = [BurstConfig::new(0.5, 10)];
        let mut scheduler = BurstScheduler::new();

        assert_eq!(scheduler.take_due(&bursts, 0.4), 0);
        assert_eq!(scheduler.take_due(&bursts, 0.5), 10);
        assert_eq!(scheduler.take_due(&bursts, 0.6), 0);
        assert_eq!(scheduler.take_due(&bursts, 5.0), 0);
    }

    #[test]
    fn test_rearm_fires_again() {
        let bursts = [BurstConfig::new(0.0, 10)];
        let mut scheduler = BurstScheduler::new();

        assert_eq!(scheduler.take_due(&bursts, 0.0), 10);
        assert_eq!(scheduler.take_due(&bursts, 0.1), 0);
        scheduler.rearm();
        assert_eq!(scheduler.take_due(&bursts, 0.0), 10);
    }

    #[test]
    fn test_cycles_fire_on_interval() {
        let bursts = [BurstConfig::new(1.0, 5).repeating(3, 0.5)];
        let mut scheduler = BurstScheduler::new();

        assert_eq!(scheduler.take_due(&bursts, 1.0), 5);
        assert_eq!(scheduler.take_due(&bursts, 1.2), 0);
        assert_eq!(scheduler.take_due(&bursts, 1.5), 5);
        assert_eq!(scheduler.take_due(&bursts, 3.0), 5);
        assert_eq!(scheduler.take_due(&bursts, 9.0), 0);
        assert_eq!(scheduler.fired_cycles(0), 3);
        assert!(scheduler.all_fired(&bursts));
    }

    #[test]
    fn test_all_fired_tracks_every_burst() {
        let bursts = [BurstConfig::new(0.0, 1), BurstConfig::new(2.0, 1)];
        let mut scheduler = BurstScheduler::new();
        assert!(!scheduler.all_fired(&bursts));
        scheduler.take_due(&bursts, 1.0);
        assert!(!scheduler.all_fired(&bursts));
        scheduler.take_due(&bursts, 2.0);
        assert!(scheduler.all_fired(&bursts));
        assert!(scheduler.all_fired(&[]));
    }

    #[test]
    fn test_large_step_catches_up_on_cycles() {
        let bursts = [BurstConfig::new(0.0, 2).repeating(4, 0.1)];
        let mut scheduler = BurstScheduler::new();
        assert_eq!(scheduler.take_due(&bursts, 1.0), 8);
    }

    #[test]
    fn test_manual_uses_explicit_count() {
        let mut scheduler = BurstScheduler::new();
        scheduler.trigger(Some(7));
        assert!(scheduler.has_pending());
        assert_eq!(scheduler.take_manual(&[], 100), 7);
        assert!(!scheduler.has_pending());
        assert_eq!(scheduler.take_manual(&[], 100), 0);
    }

    #[test]
    fn test_manual_uses_configured_bursts() {
        let bursts = [BurstConfig::new(0.0, 10), BurstConfig::new(2.0, 4)];
        let mut scheduler = BurstScheduler::new();
        scheduler.trigger(None);
        assert_eq!(scheduler.take_manual(&bursts, 100), 14);
    }

    #[test]
    fn test_manual_default_batch() {
        let mut scheduler = BurstScheduler::new();
        scheduler.trigger(None);
        assert_eq!(scheduler.take_manual(&[], 1000), 50);
        scheduler.trigger(None);
        assert_eq!(scheduler.take_manual(&[], 20), 20);
    }

    #[test]
    fn test_trigger_counter_is_monotonic() {
        let mut scheduler = BurstScheduler::new();
        assert_eq!(scheduler.trigger(None), 1);
        assert_eq!(scheduler.trigger(Some(3)), 2);
        scheduler.reset();
        assert_eq!(scheduler.trigger_count(), 2);
        assert!(!scheduler.has_pending());
    }
}
