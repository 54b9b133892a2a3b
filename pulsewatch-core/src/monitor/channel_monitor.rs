//! Dual-channel monitor
//!
//! Owns the flow and temperature channels, the shared grace period and the
//! injected clock. Pulse capture calls `update_*` once per edge; the main
//! loop calls `process` periodically and polls the accessors.

use crate::config::MonitorConfig;
use crate::traits::MonotonicClock;

use super::channel::{ChannelKind, PulseChannel};
use super::snapshot::MonitorSnapshot;

/// Samples averaged per channel unless specified otherwise
pub const DEFAULT_AVERAGING_WINDOW: usize = 4;

/// Flow and temperature pulse monitor
///
/// Single-owner: every mutating call takes `&mut self`. Wrap it in a
/// [`SharedMonitor`](super::SharedMonitor) when pulses are captured in a
/// different task from the one calling `process`.
///
/// No operation fails. Calibrations that divide by zero (for example
/// `max_frequency_hz == 0`) produce IEEE infinities or NaN; use
/// [`MonitorConfig::validate`] to reject them up front.
#[derive(Debug, Clone)]
pub struct ChannelMonitor<C, const N: usize = DEFAULT_AVERAGING_WINDOW> {
    clock: C,
    grace_period_us: u32,
    flow: PulseChannel<N>,
    temperature: PulseChannel<N>,
}

impl<C: MonotonicClock, const N: usize> ChannelMonitor<C, N> {
    /// Create a monitor with empty windows and no faults
    pub fn new(config: MonitorConfig, clock: C) -> Self {
        let now_us = clock.now_us();
        Self {
            grace_period_us: config.grace_period_us,
            flow: PulseChannel::new(ChannelKind::Flow, config.flow, now_us),
            temperature: PulseChannel::new(ChannelKind::Temperature, config.temperature, now_us),
            clock,
        }
    }

    /// Replace calibrations and grace period
    ///
    /// Averages, timers and fault latches are left as they are; call
    /// [`reset_faults`](Self::reset_faults) as well for a clean restart.
    pub fn reconfigure(&mut self, config: MonitorConfig) {
        self.flow.set_calibration(config.flow);
        self.temperature.set_calibration(config.temperature);
        self.grace_period_us = config.grace_period_us;
    }

    /// Record a pulse on a channel
    ///
    /// # Arguments
    /// - `period_us`: Time since the previous pulse on the same channel
    pub fn update(&mut self, kind: ChannelKind, period_us: u32) {
        let now_us = self.clock.now_us();
        self.channel_mut(kind).record_pulse(period_us, now_us);
    }

    /// Record a flow pulse
    pub fn update_flow(&mut self, period_us: u32) {
        self.update(ChannelKind::Flow, period_us);
    }

    /// Record a temperature pulse
    pub fn update_temperature(&mut self, period_us: u32) {
        self.update(ChannelKind::Temperature, period_us);
    }

    /// Periodic evaluation
    ///
    /// Checks both channels for a lost signal, refreshes frequency and
    /// scaled value, and advances the fault debounce. Should be called from
    /// the main loop well within the grace period.
    pub fn process(&mut self) {
        let now_us = self.clock.now_us();
        self.flow.evaluate(now_us, self.grace_period_us);
        self.temperature.evaluate(now_us, self.grace_period_us);
    }

    /// Clear both fault latches
    ///
    /// Debounce timers restart now, so an out-of-range channel latches
    /// again only after a fresh grace period.
    pub fn reset_faults(&mut self) {
        let now_us = self.clock.now_us();
        self.flow.reset_fault(now_us);
        self.temperature.reset_fault(now_us);
    }

    pub fn flow(&self) -> &PulseChannel<N> {
        &self.flow
    }

    pub fn temperature(&self) -> &PulseChannel<N> {
        &self.temperature
    }

    pub fn channel(&self, kind: ChannelKind) -> &PulseChannel<N> {
        match kind {
            ChannelKind::Flow => &self.flow,
            ChannelKind::Temperature => &self.temperature,
        }
    }

    fn channel_mut(&mut self, kind: ChannelKind) -> &mut PulseChannel<N> {
        match kind {
            ChannelKind::Flow => &mut self.flow,
            ChannelKind::Temperature => &mut self.temperature,
        }
    }

    /// Current configuration
    pub fn config(&self) -> MonitorConfig {
        MonitorConfig::new(
            *self.flow.calibration(),
            *self.temperature.calibration(),
            self.grace_period_us,
        )
    }

    pub fn grace_period_us(&self) -> u32 {
        self.grace_period_us
    }

    /// Check if either channel is latched
    pub fn any_fault(&self) -> bool {
        self.flow.fault_state().is_fault() || self.temperature.fault_state().is_fault()
    }

    /// Copy out the readings of both channels
    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            flow: (&self.flow).into(),
            temperature: (&self.temperature).into(),
        }
    }
}
