//! Hardware abstraction traits
//!
//! These traits define the interface between the monitoring logic
//! and platform-specific implementations.

pub mod clock;

pub use clock::MonotonicClock;
