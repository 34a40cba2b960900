//! Fixed-rate tick clock.
//!
//! The driver calls [`TickClock::advance`] once per frame with the wall-clock
//! time since match start. A tick fires when more than `1 / speed` seconds
//! have passed since the previous one. There is one clock per match: economy
//! and battle ticks run at the same rate.

use std::time::Duration;

/// Default match speed (ticks per second).
pub const DEFAULT_SPEED: u32 = 32;

/// Gate that turns frame timestamps into simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    interval: Duration,
    last_tick_at: Duration,
}

impl TickClock {
    /// Create a clock firing `speed` times per second. A speed of zero
    /// falls back to [`DEFAULT_SPEED`].
    #[must_use]
    pub fn new(speed: u32) -> Self {
        let speed = if speed == 0 { DEFAULT_SPEED } else { speed };
        Self {
            interval: Duration::from_secs(1) / speed,
            last_tick_at: Duration::ZERO,
        }
    }

    /// Minimum wall-clock gap between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wall-clock reading of the last fired tick.
    #[must_use]
    pub const fn last_tick_at(&self) -> Duration {
        self.last_tick_at
    }

    /// Offer a frame timestamp. Returns `true` if a tick fires.
    ///
    /// Timestamps earlier than the last tick never fire and never move the
    /// clock backward.
    pub fn advance(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_tick_at) > self.interval {
            self.last_tick_at = now;
            true
        } else {
            false
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}
