//! Shared state between tasks
//!
//! The monitor itself lives in a `StaticCell` created in `main`; tasks get
//! a `&'static` handle. Requests that should run in the evaluation task are
//! passed through signals.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

use pulsewatch_core::monitor::SharedMonitor;

/// Clock handed to the monitor and the pulse inputs
pub type Clock = fn() -> u64;

/// Monitor shared by the pulse tasks and the evaluation task
pub type Monitor = SharedMonitor<CriticalSectionRawMutex, Clock>;

/// Microseconds since boot
pub fn now_us() -> u64 {
    Instant::now().as_micros()
}

/// Fault reset requested (from the reset button)
pub static FAULT_RESET: Signal<CriticalSectionRawMutex, ()> = Signal::new();
