//! Pulse-output sensor capture
//!
//! Flow meters and frequency-output temperature transmitters emit one pulse
//! per unit. The monitor needs the time between consecutive pulses, so this
//! module timestamps edges and hands back periods.

use embedded_hal_async::digital::Wait;
use pulsewatch_core::traits::MonotonicClock;

/// Edge that marks a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    Rising,
    Falling,
}

/// Converts edge timestamps into inter-pulse periods
///
/// The first edge only primes the timer. Edges arriving sooner than
/// `min_period_us` after the last accepted one are treated as contact
/// bounce or noise and dropped without moving the reference point.
#[derive(Debug, Clone, Default)]
pub struct PulseTimer {
    last_edge_us: Option<u64>,
    min_period_us: u32,
    rejected: u32,
}

impl PulseTimer {
    /// Create a timer that accepts every edge
    pub const fn new() -> Self {
        Self {
            last_edge_us: None,
            min_period_us: 0,
            rejected: 0,
        }
    }

    /// Create a timer that ignores edges closer than `min_period_us`
    pub const fn with_glitch_filter(min_period_us: u32) -> Self {
        Self {
            last_edge_us: None,
            min_period_us,
            rejected: 0,
        }
    }

    /// Record an edge seen at `now_us`
    ///
    /// Returns the period since the previous accepted edge, saturated to
    /// `u32::MAX` (about 71 minutes), or `None` for the first edge and for
    /// rejected glitches.
    pub fn edge(&mut self, now_us: u64) -> Option<u32> {
        let Some(last_us) = self.last_edge_us else {
            self.last_edge_us = Some(now_us);
            return None;
        };

        let elapsed_us = now_us.saturating_sub(last_us);
        if elapsed_us < u64::from(self.min_period_us) {
            self.rejected = self.rejected.saturating_add(1);
            return None;
        }

        self.last_edge_us = Some(now_us);
        Some(u32::try_from(elapsed_us).unwrap_or(u32::MAX))
    }

    /// Number of edges dropped by the glitch filter
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

/// Pulse input pin with its own timer
///
/// Waits for edges on an async GPIO and reports inter-pulse periods.
pub struct PulseInput<P, C> {
    pin: P,
    clock: C,
    edge: Edge,
    timer: PulseTimer,
}

impl<P: Wait, C: MonotonicClock> PulseInput<P, C> {
    /// Create a new pulse input
    ///
    /// # Arguments
    /// - `pin`: GPIO with edge-wait support
    /// - `clock`: Time source for edge timestamps (same clock as the monitor)
    /// - `edge`: Which transition counts as a pulse
    /// - `timer`: Period timer, optionally with a glitch filter
    pub fn new(pin: P, clock: C, edge: Edge, timer: PulseTimer) -> Self {
        Self {
            pin,
            clock,
            edge,
            timer,
        }
    }

    /// Wait for the next accepted pulse and return its period (µs)
    pub async fn next_period(&mut self) -> Result<u32, P::Error> {
        loop {
            match self.edge {
                Edge::Rising => self.pin.wait_for_rising_edge().await?,
                Edge::Falling => self.pin.wait_for_falling_edge().await?,
            }

            if let Some(period_us) = self.timer.edge(self.clock.now_us()) {
                return Ok(period_us);
            }
        }
    }

    /// Period timer (for glitch statistics)
    pub fn timer(&self) -> &PulseTimer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorType;

    /// Pin whose edges are always already there
    struct ReadyPin {
        rising: u32,
        falling: u32,
    }

    impl ErrorType for ReadyPin {
        type Error = Infallible;
    }

    impl Wait for ReadyPin {
        async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
            self.rising += 1;
            Ok(())
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
            self.falling += 1;
            Ok(())
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_pulse_input_reports_period() {
        // Each clock read advances 2 ms
        let now = Cell::new(0u64);
        let clock = || {
            let t = now.get();
            now.set(t + 2_000);
            t
        };
        let pin = ReadyPin { rising: 0, falling: 0 };
        let mut input = PulseInput::new(pin, clock, Edge::Rising, PulseTimer::new());

        assert_eq!(block_on(input.next_period()), Ok(2_000));
        // First edge primed, second produced the period
        assert_eq!(input.pin.rising, 2);
        assert_eq!(input.pin.falling, 0);

        assert_eq!(block_on(input.next_period()), Ok(2_000));
        assert_eq!(input.pin.rising, 3);
    }

    #[test]
    fn test_pulse_input_skips_glitches() {
        let now = Cell::new(0u64);
        let clock = || {
            let t = now.get();
            now.set(t + 100);
            t
        };
        let pin = ReadyPin { rising: 0, falling: 0 };
        let mut input = PulseInput::new(
            pin,
            clock,
            Edge::Falling,
            PulseTimer::with_glitch_filter(250),
        );

        // Edges at 0 (prime), 100 and 200 (rejected), 300 (accepted)
        assert_eq!(block_on(input.next_period()), Ok(300));
        assert_eq!(input.pin.falling, 4);
        assert_eq!(input.timer().rejected(), 2);
    }

    #[test]
    fn test_first_edge_primes() {
        let mut timer = PulseTimer::new();
        assert_eq!(timer.edge(1_000), None);
        assert_eq!(timer.edge(251_000), Some(250_000));
        assert_eq!(timer.edge(501_000), Some(250_000));
    }

    #[test]
    fn test_glitch_filter_rejects_bounce() {
        let mut timer = PulseTimer::with_glitch_filter(500);
        timer.edge(0);

        // Bounce right after the real edge
        assert_eq!(timer.edge(120), None);
        assert_eq!(timer.edge(300), None);
        assert_eq!(timer.rejected(), 2);

        // Period measured from the accepted edge, not the glitches
        assert_eq!(timer.edge(10_000), Some(10_000));
    }

    #[test]
    fn test_glitch_filter_boundary() {
        let mut timer = PulseTimer::with_glitch_filter(500);
        timer.edge(0);
        assert_eq!(timer.edge(500), Some(500));
    }

    #[test]
    fn test_long_gap_saturates() {
        let mut timer = PulseTimer::new();
        timer.edge(0);
        assert_eq!(timer.edge(u64::from(u32::MAX) + 10), Some(u32::MAX));
    }
}
