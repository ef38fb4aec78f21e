//! Playback clock for an effect.
//!
//! Tracks the time of the current playthrough, the total simulated time and
//! the frame count. The host drives it either with explicit deltas
//! ([`PlaybackClock::advance`]) or with absolute timestamps
//! ([`PlaybackClock::delta_since`]), in which case the first timestamp after
//! a reset or resume yields a delta of zero so a long gap never turns into a
//! time jump.
//!
//! # Example
//!
//! ```
//! use flurry::time::PlaybackClock;
//!
//! let mut clock = PlaybackClock::new();
//! clock.set_time_scale(2.0);
//!
//! assert_eq!(clock.advance(0.25), 0.5);
//! assert_eq!(clock.elapsed(), 0.5);
//! assert_eq!(clock.frame(), 1);
//! ```

/// Time tracking for one effect.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Seconds into the current playthrough. Wraps on loop.
    elapsed: f32,
    /// Simulated seconds since the last reset. Never wraps.
    total: f64,
    /// Scaled delta of the last advance.
    delta: f32,
    /// Advances since the last reset.
    frame: u64,
    /// Last timestamp seen by `delta_since`.
    last_timestamp: Option<f64>,
    paused: bool,
    /// Multiplier applied to every raw delta.
    time_scale: f32,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            total: 0.0,
            delta: 0.0,
            frame: 0,
            last_timestamp: None,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Advance by a raw host delta. Returns the scaled delta actually applied.
    ///
    /// Negative or non-finite deltas count as zero. While paused nothing
    /// advances and the result is zero.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }

        let raw = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        self.delta = raw * self.time_scale;
        self.elapsed += self.delta;
        self.total += self.delta as f64;
        self.frame += 1;
        self.delta
    }

    /// Raw delta between `timestamp` (seconds) and the previous one.
    ///
    /// Zero for the first timestamp after construction, reset or resume, and
    /// whenever time appears to run backwards.
    pub fn delta_since(&mut self, timestamp: f64) -> f32 {
        let raw = match self.last_timestamp {
            Some(last) if timestamp > last => (timestamp - last) as f32,
            _ => 0.0,
        };
        self.last_timestamp = Some(timestamp);
        raw
    }

    /// Seconds into the current playthrough.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Simulated seconds since the last reset, across loops.
    #[inline]
    pub fn total_elapsed(&self) -> f64 {
        self.total
    }

    /// Scaled delta of the last advance.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the delta multiplier. Negative scales clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Stop time progression.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after pausing. The next timestamp yields a zero delta.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_timestamp = None;
        }
    }

    /// Fold the playthrough time back into `[0, duration)` once it reaches
    /// `duration`. Returns whether it wrapped.
    pub fn wrap(&mut self, duration: f32) -> bool {
        if duration <= 0.0 || self.elapsed < duration {
            return false;
        }
        self.elapsed = self.elapsed.rem_euclid(duration);
        true
    }

    /// Back to time zero, unpaused. The time scale is kept.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.total = 0.0;
        self.delta = 0.0;
        self.frame = 0;
        self.last_timestamp = None;
        self.paused = false;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
