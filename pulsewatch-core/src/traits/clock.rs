//! Monotonic time source

/// Monotonic microsecond clock
///
/// The monitor reads the clock when a pulse is recorded, on every
/// evaluation and on fault reset. Implementations must never go backwards.
///
/// Any `Fn() -> u64` is a clock, so a plain function wrapping the platform
/// timer or a closure over a test counter can be injected directly.
pub trait MonotonicClock {
    /// Current time in microseconds since an arbitrary epoch
    fn now_us(&self) -> u64;
}

impl<F: Fn() -> u64> MonotonicClock for F {
    fn now_us(&self) -> u64 {
        self()
    }
}
