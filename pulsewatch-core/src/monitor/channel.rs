//! Per-channel pulse state
//!
//! A `PulseChannel` holds everything for one sensor: the averaging window,
//! the derived frequency and physical value, the stale-signal check and the
//! debounced fault latch. Flow and temperature differ only in fault
//! direction and stale sentinel, both derived from `ChannelKind`.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{ChannelCalibration, MICROS_PER_SECOND};

/// Period substituted when the flow signal goes quiet
///
/// Reads as roughly 0.001 Hz, i.e. no flow.
pub const STALE_FLOW_PERIOD_US: u32 = 999_999_999;

/// Period substituted when the temperature signal goes quiet
///
/// Reads as roughly 1 kHz, i.e. at or beyond full scale, so a lost
/// temperature sensor is treated as too hot.
pub const STALE_TEMPERATURE_PERIOD_US: u32 = 999;

/// The two monitored channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelKind {
    /// Coolant flow rate, dangerous when low
    Flow,
    /// Temperature, dangerous when high
    Temperature,
}

impl ChannelKind {
    /// Both channels, flow first
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Flow, ChannelKind::Temperature];

    /// Side of the threshold that counts as a breach
    pub const fn fault_direction(self) -> FaultDirection {
        match self {
            ChannelKind::Flow => FaultDirection::LowIsFault,
            ChannelKind::Temperature => FaultDirection::HighIsFault,
        }
    }

    /// Average period forced onto the channel when its signal is stale
    pub const fn stale_period_us(self) -> u32 {
        match self {
            ChannelKind::Flow => STALE_FLOW_PERIOD_US,
            ChannelKind::Temperature => STALE_TEMPERATURE_PERIOD_US,
        }
    }

    /// Short lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ChannelKind::Flow => "flow",
            ChannelKind::Temperature => "temperature",
        }
    }
}

/// Which side of the threshold is dangerous
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultDirection {
    /// Fault when the value drops below the threshold
    LowIsFault,
    /// Fault when the value rises above the threshold
    HighIsFault,
}

impl FaultDirection {
    /// Check whether `value` is on the fault side of `threshold`
    ///
    /// Equality is in range, and NaN never breaches.
    pub fn is_breach(self, value: f32, threshold: f32) -> bool {
        match self {
            FaultDirection::LowIsFault => value < threshold,
            FaultDirection::HighIsFault => value > threshold,
        }
    }
}

/// Latched fault state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultState {
    #[default]
    Ok,
    Fault,
}

impl FaultState {
    pub fn is_fault(self) -> bool {
        self == FaultState::Fault
    }
}

/// What was going on when a fault latched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultCause {
    /// Pulses were arriving but the value stayed out of range
    Threshold,
    /// No pulses for longer than the grace period
    StaleSignal,
}

/// Whether pulses are still arriving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalStatus {
    /// A pulse arrived within the grace period (or the channel is new)
    #[default]
    Live,
    /// The last evaluation found no pulse within the grace period
    Stale,
}

/// State of one monitored channel
///
/// `N` is the averaging window. Updates and evaluation take explicit
/// timestamps; `ChannelMonitor` supplies them from its clock.
#[derive(Debug, Clone)]
pub struct PulseChannel<const N: usize> {
    kind: ChannelKind,
    calibration: ChannelCalibration,
    /// Circular buffer of inter-pulse periods (µs)
    period_samples: [u32; N],
    /// Next slot to overwrite
    write_index: usize,
    /// Samples written so far, saturating at `N`
    samples_seen: usize,
    average_period_us: u32,
    average_frequency_hz: f32,
    scaled_value: f32,
    last_pulse_us: u64,
    signal: SignalStatus,
    fault_state: FaultState,
    fault_cause: Option<FaultCause>,
    debounce_armed: bool,
    debounce_start_us: u64,
}

impl<const N: usize> PulseChannel<N> {
    const NONEMPTY_WINDOW: () = assert!(N > 0, "averaging window must hold at least one sample");

    /// Create an empty, unfaulted channel
    ///
    /// `now_us` starts the stale-signal timer, so a sensor that never
    /// pulses goes stale one grace period after construction.
    pub fn new(kind: ChannelKind, calibration: ChannelCalibration, now_us: u64) -> Self {
        let () = Self::NONEMPTY_WINDOW;

        Self {
            kind,
            calibration,
            period_samples: [0; N],
            write_index: 0,
            samples_seen: 0,
            average_period_us: 0,
            average_frequency_hz: 0.0,
            scaled_value: 0.0,
            last_pulse_us: now_us,
            signal: SignalStatus::Live,
            fault_state: FaultState::Ok,
            fault_cause: None,
            debounce_armed: false,
            debounce_start_us: 0,
        }
    }

    /// Record one inter-pulse period
    ///
    /// Overwrites the oldest sample, recomputes the average and restarts
    /// the stale-signal timer. Fault logic waits for the next evaluation.
    pub fn record_pulse(&mut self, period_us: u32, now_us: u64) {
        self.period_samples[self.write_index] = period_us;
        self.write_index = (self.write_index + 1) % N;
        if self.samples_seen < N {
            self.samples_seen += 1;
        }

        self.average_period_us = self.window_average();
        self.last_pulse_us = now_us;
        self.signal = SignalStatus::Live;
    }

    /// Re-evaluate staleness, derived values and the fault debounce
    pub fn evaluate(&mut self, now_us: u64, grace_period_us: u32) {
        let grace_us = u64::from(grace_period_us);

        if now_us.saturating_sub(self.last_pulse_us) > grace_us {
            self.signal = SignalStatus::Stale;
            self.average_period_us = self.kind.stale_period_us();
        }

        // Zero period (no pulses yet) divides to +inf
        self.average_frequency_hz = MICROS_PER_SECOND / self.average_period_us as f32;
        self.scaled_value = self.calibration.scale(self.average_frequency_hz);

        // Latched: nothing left to time until reset
        if self.fault_state.is_fault() {
            return;
        }

        let breached = self
            .kind
            .fault_direction()
            .is_breach(self.scaled_value, self.calibration.fault_threshold);

        if !breached {
            self.debounce_armed = false;
            return;
        }

        if !self.debounce_armed {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "{} out of range: {} (threshold {})",
                self.kind,
                self.scaled_value,
                self.calibration.fault_threshold
            );
            self.debounce_armed = true;
            self.debounce_start_us = now_us;
        }

        if now_us.saturating_sub(self.debounce_start_us) > grace_us {
            let cause = match self.signal {
                SignalStatus::Stale => FaultCause::StaleSignal,
                SignalStatus::Live => FaultCause::Threshold,
            };
            #[cfg(feature = "defmt")]
            defmt::warn!("{} fault latched: {}", self.kind, cause);
            self.fault_state = FaultState::Fault;
            self.fault_cause = Some(cause);
        }
    }

    /// Clear the fault latch and restart the debounce timer at `now_us`
    ///
    /// A channel still out of range gets a full grace period before it
    /// can latch again.
    pub fn reset_fault(&mut self, now_us: u64) {
        self.fault_state = FaultState::Ok;
        self.fault_cause = None;
        self.debounce_start_us = now_us;
    }

    /// Replace the calibration, keeping samples, timers and latch
    pub fn set_calibration(&mut self, calibration: ChannelCalibration) {
        self.calibration = calibration;
    }

    fn window_average(&self) -> u32 {
        let count = self.samples_seen.min(N);
        if count == 0 {
            return 0;
        }

        // Unwritten slots are still zero, so the full sum is the written sum
        let sum: u64 = self.period_samples.iter().map(|&p| u64::from(p)).sum();
        let average = sum / count as u64;
        u32::try_from(average).unwrap_or(u32::MAX)
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn calibration(&self) -> &ChannelCalibration {
        &self.calibration
    }

    /// Mean inter-pulse period (µs), or the stale sentinel
    pub fn average_period_us(&self) -> u32 {
        self.average_period_us
    }

    /// Frequency as of the last evaluation (Hz)
    pub fn average_frequency_hz(&self) -> f32 {
        self.average_frequency_hz
    }

    /// Physical value as of the last evaluation
    pub fn scaled_value(&self) -> f32 {
        self.scaled_value
    }

    pub fn fault_state(&self) -> FaultState {
        self.fault_state
    }

    /// Why the latch is set, if it is
    pub fn fault_cause(&self) -> Option<FaultCause> {
        self.fault_cause
    }

    pub fn signal_status(&self) -> SignalStatus {
        self.signal
    }

    /// Whether a threshold breach is currently being timed
    pub fn is_debounce_armed(&self) -> bool {
        self.debounce_armed
    }

    /// Slot the next pulse will be written to, always `< N`
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Samples in the window so far (at most `N`)
    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    /// Clock time of the most recent pulse (µs)
    pub fn last_pulse_us(&self) -> u64 {
        self.last_pulse_us
    }

    /// Periods currently in the window, oldest first
    pub fn recent_periods(&self) -> Vec<u32, N> {
        let start = if self.samples_seen < N { 0 } else { self.write_index };
        (0..self.samples_seen)
            .map(|offset| self.period_samples[(start + offset) % N])
            .collect()
    }
}
