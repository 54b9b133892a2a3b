//! Point-in-time readings
//!
//! Copyable views of both channels for reporting, taken without holding a
//! borrow on the monitor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::channel::{ChannelKind, FaultCause, FaultState, PulseChannel, SignalStatus};

/// Reading of a single channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelReading {
    pub average_period_us: u32,
    pub average_frequency_hz: f32,
    pub scaled_value: f32,
    pub fault: FaultState,
    pub fault_cause: Option<FaultCause>,
    pub signal: SignalStatus,
}

impl<const N: usize> From<&PulseChannel<N>> for ChannelReading {
    fn from(channel: &PulseChannel<N>) -> Self {
        Self {
            average_period_us: channel.average_period_us(),
            average_frequency_hz: channel.average_frequency_hz(),
            scaled_value: channel.scaled_value(),
            fault: channel.fault_state(),
            fault_cause: channel.fault_cause(),
            signal: channel.signal_status(),
        }
    }
}

/// Readings of both channels taken together
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorSnapshot {
    pub flow: ChannelReading,
    pub temperature: ChannelReading,
}

impl MonitorSnapshot {
    pub fn channel(&self, kind: ChannelKind) -> &ChannelReading {
        match kind {
            ChannelKind::Flow => &self.flow,
            ChannelKind::Temperature => &self.temperature,
        }
    }

    /// Check if either channel is latched
    pub fn any_fault(&self) -> bool {
        self.flow.fault.is_fault() || self.temperature.fault.is_fault()
    }
}
