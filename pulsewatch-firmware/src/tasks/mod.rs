//! Embassy async tasks
//!
//! Each task runs independently and communicates via the shared monitor
//! and signals.

pub mod monitor;
pub mod pulse;
pub mod reset;

pub use monitor::monitor_task;
pub use pulse::{pulse_task, PulsePin};
pub use reset::reset_task;
