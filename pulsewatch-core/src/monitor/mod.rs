//! Pulse channel monitoring
//!
//! Converts inter-pulse periods into filtered physical values and latches
//! faults when a channel stays out of range or goes quiet.

pub mod channel;
pub mod channel_monitor;
pub mod shared;
pub mod snapshot;

pub use channel::{
    ChannelKind, FaultCause, FaultDirection, FaultState, PulseChannel, SignalStatus,
    STALE_FLOW_PERIOD_US, STALE_TEMPERATURE_PERIOD_US,
};
pub use channel_monitor::{ChannelMonitor, DEFAULT_AVERAGING_WINDOW};
pub use shared::SharedMonitor;
pub use snapshot::{ChannelReading, MonitorSnapshot};
