//! Fixed-timestep tick timing.
//!
//! Converts frame deltas into a whole number of simulation ticks at the
//! configured rate.

/// Slowest supported tick rate.
pub const MIN_TICKS_PER_SECOND: u32 = 1;

/// Fastest supported tick rate.
pub const MAX_TICKS_PER_SECOND: u32 = 60;

/// Tick rate of a new session.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 10;

/// Upper bound on ticks run for a single frame.
pub const MAX_TICKS_PER_UPDATE: u32 = 10;

/// Fixed-timestep accumulator driving the simulation.
#[derive(Debug, Clone)]
pub struct TickTimer {
    /// Target ticks per second
    ticks_per_second: u32,
    /// Seconds per tick
    tick_interval: f32,
    /// Unconsumed time in seconds
    accumulator: f32,
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_SECOND)
    }
}

impl TickTimer {
    /// Create a timer. The rate is clamped to the supported range.
    #[must_use]
    pub fn new(ticks_per_second: u32) -> Self {
        let mut timer = Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            tick_interval: 1.0 / DEFAULT_TICKS_PER_SECOND as f32,
            accumulator: 0.0,
        };
        timer.set_ticks_per_second(ticks_per_second);
        timer
    }

    /// Set the tick rate, clamped to the supported range.
    pub fn set_ticks_per_second(&mut self, ticks_per_second: u32) {
        self.ticks_per_second = ticks_per_second.clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND);
        self.tick_interval = 1.0 / self.ticks_per_second as f32;
    }

    /// Get the tick rate.
    #[must_use]
    pub const fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Get the seconds per tick.
    #[must_use]
    pub const fn tick_interval(&self) -> f32 {
        self.tick_interval
    }

    /// Accumulate frame time.
    /// Returns the number of ticks that should run now.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        let mut count = 0;

        // Limit to prevent spiral of death
        while self.accumulator >= self.tick_interval && count < MAX_TICKS_PER_UPDATE {
            self.accumulator -= self.tick_interval;
            count += 1;
        }

        // If we're still behind, drop the backlog
        if self.accumulator > self.tick_interval * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Discard accumulated time (call after pause or loading).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
