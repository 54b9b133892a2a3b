//! Configuration type definitions
//!
//! These types describe how pulse frequency maps onto physical units for
//! each channel and how long a fault condition must persist before it
//! latches.

use crate::monitor::ChannelKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Microseconds per second, for period/frequency conversion
pub const MICROS_PER_SECOND: f32 = 1_000_000.0;

/// Default fault grace period (2 s)
pub const DEFAULT_GRACE_PERIOD_US: u32 = 2_000_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Full-scale frequency is zero, negative or not finite
    InvalidMaxFrequency(ChannelKind),
    /// A range or threshold value is NaN or infinite
    NonFiniteValue(ChannelKind),
    /// Grace period of zero would latch on the first breached evaluation
    ZeroGracePeriod,
}

/// Frequency-to-value calibration for one channel
///
/// Frequencies in `[0, max_frequency_hz]` map linearly onto
/// `[min_value, max_value]`. The direction is not checked: `max_value`
/// may be below `min_value` for an inverted sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelCalibration {
    /// Physical value at full-scale frequency
    pub max_value: f32,
    /// Physical value at zero frequency
    pub min_value: f32,
    /// Value beyond which the channel is out of range
    ///
    /// Flow faults below it, temperature faults above it.
    pub fault_threshold: f32,
    /// Sensor output frequency at `max_value` (Hz)
    pub max_frequency_hz: f32,
}

impl ChannelCalibration {
    /// Create a calibration entry
    pub const fn new(
        max_value: f32,
        min_value: f32,
        fault_threshold: f32,
        max_frequency_hz: f32,
    ) -> Self {
        Self {
            max_value,
            min_value,
            fault_threshold,
            max_frequency_hz,
        }
    }

    /// Map a frequency onto the physical range
    ///
    /// No clamping: frequencies above full scale extrapolate, and an
    /// infinite frequency yields an infinite (or NaN for an empty range) value.
    pub fn scale(&self, frequency_hz: f32) -> f32 {
        (frequency_hz / self.max_frequency_hz) * (self.max_value - self.min_value) + self.min_value
    }

    fn validate(&self, kind: ChannelKind) -> Result<(), ConfigError> {
        if !(self.max_frequency_hz.is_finite() && self.max_frequency_hz > 0.0) {
            return Err(ConfigError::InvalidMaxFrequency(kind));
        }

        let values = [self.max_value, self.min_value, self.fault_threshold];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteValue(kind));
        }

        Ok(())
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Flow channel calibration (faults low)
    pub flow: ChannelCalibration,
    /// Temperature channel calibration (faults high)
    pub temperature: ChannelCalibration,
    /// How long a breach or a missing signal must persist (µs)
    pub grace_period_us: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // 0-30 units over 0-100 Hz, low-flow fault below 2
            flow: ChannelCalibration::new(30.0, 0.0, 2.0, 100.0),
            // 0-100 units over 0-1 kHz, over-temperature fault above 60
            temperature: ChannelCalibration::new(100.0, 0.0, 60.0, 1000.0),
            grace_period_us: DEFAULT_GRACE_PERIOD_US,
        }
    }
}

impl MonitorConfig {
    /// Create a configuration from both calibrations and the grace period
    pub const fn new(
        flow: ChannelCalibration,
        temperature: ChannelCalibration,
        grace_period_us: u32,
    ) -> Self {
        Self {
            flow,
            temperature,
            grace_period_us,
        }
    }

    /// Calibration for a channel
    pub fn calibration(&self, kind: ChannelKind) -> &ChannelCalibration {
        match kind {
            ChannelKind::Flow => &self.flow,
            ChannelKind::Temperature => &self.temperature,
        }
    }

    /// Mutable calibration for a channel
    pub fn calibration_mut(&mut self, kind: ChannelKind) -> &mut ChannelCalibration {
        match kind {
            ChannelKind::Flow => &mut self.flow,
            ChannelKind::Temperature => &mut self.temperature,
        }
    }

    /// Check that the parameters produce defined arithmetic
    ///
    /// The monitor itself accepts any configuration; this is for loaders
    /// that want to reject bad input before handing it over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flow.validate(ChannelKind::Flow)?;
        self.temperature.validate(ChannelKind::Temperature)?;

        if self.grace_period_us == 0 {
            return Err(ConfigError::ZeroGracePeriod);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(MonitorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_scale_endpoints() {
        let cal = ChannelCalibration::new(100.0, 0.0, 50.0, 4.0);
        assert!((cal.scale(0.0) - 0.0).abs() < 1e-6);
        assert!((cal.scale(4.0) - 100.0).abs() < 1e-4);
        assert!((cal.scale(2.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_scale_inverted_range() {
        let cal = ChannelCalibration::new(-20.0, 80.0, 0.0, 10.0);
        assert!((cal.scale(0.0) - 80.0).abs() < 1e-4);
        assert!((cal.scale(10.0) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_scale_infinite_frequency() {
        let cal = ChannelCalibration::new(100.0, 0.0, 50.0, 4.0);
        assert!(cal.scale(f32::INFINITY).is_infinite());
    }

    #[test]
    fn test_zero_max_frequency_rejected() {
        let mut config = MonitorConfig::default();
        config.temperature.max_frequency_hz = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMaxFrequency(ChannelKind::Temperature))
        );
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = MonitorConfig::default();
        config.flow.fault_threshold = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFiniteValue(ChannelKind::Flow))
        );
    }

    #[test]
    fn test_zero_grace_period_rejected() {
        let mut config = MonitorConfig::default();
        config.grace_period_us = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroGracePeriod));
    }

    #[test]
    fn test_calibration_by_kind() {
        let mut config = MonitorConfig::default();
        config.calibration_mut(ChannelKind::Flow).max_value = 12.5;
        assert!((config.calibration(ChannelKind::Flow).max_value - 12.5).abs() < 1e-6);
        assert!((config.calibration(ChannelKind::Temperature).max_value - 100.0).abs() < 1e-6);
    }
}
