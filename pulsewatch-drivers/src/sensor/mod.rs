//! Sensor input implementations

pub mod pulse;

pub use pulse::{Edge, PulseInput, PulseTimer};
