//! Text configuration parser
//!
//! Minimal parser for the subset of TOML used by monitor configuration
//! files. It does NOT support the full TOML spec.
//!
//! ```toml
//! grace_period_us = 2_000_000
//!
//! [flow]
//! max_value = 30.0
//! min_value = 0.0
//! fault_threshold = 2.0
//! max_frequency_hz = 100.0
//!
//! [temperature]
//! fault_threshold = 60.0
//! ```
//!
//! Supported features:
//! - Key = value pairs (integers and floats, `_` digit separators)
//! - `[flow]` and `[temperature]` section headers
//! - Comments (# ...), including trailing comments
//!
//! Keys that are not present keep their default values.

use heapless::String;

use super::types::{ChannelCalibration, MonitorConfig};
use crate::monitor::ChannelKind;

/// Longest numeric literal accepted (after removing separators)
const MAX_NUMBER_LEN: usize = 32;

/// Parse error, carrying the 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Malformed or unknown section header
    InvalidSection { line: usize },
    /// Key not valid in the current section
    UnknownKey { line: usize },
    /// Value is not a number of the expected type
    InvalidValue { line: usize },
    /// Line has no `=` or nothing on one side of it
    MissingValue { line: usize },
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Channel(ChannelKind),
}

/// Parse configuration text into a `MonitorConfig`
///
/// Starts from `MonitorConfig::default()` and overrides whatever keys are
/// present. The result is not validated; call `MonitorConfig::validate`.
pub fn parse_config(input: &str) -> Result<MonitorConfig, ParseError> {
    let mut config = MonitorConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = strip_comment(raw).trim();

        if text.is_empty() {
            continue;
        }

        if let Some(header) = text.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection { line })?;
            section = parse_section_header(header).ok_or(ParseError::InvalidSection { line })?;
            continue;
        }

        let (key, value) = parse_key_value(text).ok_or(ParseError::MissingValue { line })?;

        match section {
            Section::Root => apply_root(&mut config, key, value, line)?,
            Section::Channel(kind) => {
                apply_channel(config.calibration_mut(kind), key, value, line)?
            }
        }
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "flow" => Some(Section::Channel(ChannelKind::Flow)),
        "temperature" => Some(Section::Channel(ChannelKind::Temperature)),
        _ => None,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_root(
    config: &mut MonitorConfig,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    match key {
        "grace_period_us" => {
            config.grace_period_us = parse_u32(value).ok_or(ParseError::InvalidValue { line })?;
        }
        _ => return Err(ParseError::UnknownKey { line }),
    }
    Ok(())
}

fn apply_channel(
    calibration: &mut ChannelCalibration,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    let field = match key {
        "max_value" => &mut calibration.max_value,
        "min_value" => &mut calibration.min_value,
        "fault_threshold" => &mut calibration.fault_threshold,
        "max_frequency_hz" => &mut calibration.max_frequency_hz,
        _ => return Err(ParseError::UnknownKey { line }),
    };
    *field = parse_f32(value).ok_or(ParseError::InvalidValue { line })?;
    Ok(())
}

/// Copy a numeric literal without its `_` separators
fn strip_separators(value: &str) -> Option<String<MAX_NUMBER_LEN>> {
    let mut digits = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).ok()?;
    }
    Some(digits)
}

fn parse_u32(value: &str) -> Option<u32> {
    strip_separators(value)?.parse().ok()
}

fn parse_f32(value: &str) -> Option<f32> {
    let parsed: f32 = strip_separators(value)?.parse().ok()?;
    // Rust accepts "inf" and "NaN"; TOML-style configs should not
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Pulse monitor configuration
grace_period_us = 1_500_000   # 1.5 s

[flow]
max_value = 25.0
min_value = 0
fault_threshold = 3.5
max_frequency_hz = 450.0

[temperature]
max_value = 120.0
min_value = -20.0
fault_threshold = 85.0
max_frequency_hz = 2_000
";

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.grace_period_us, 1_500_000);
        assert!((config.flow.max_value - 25.0).abs() < 1e-6);
        assert!((config.flow.fault_threshold - 3.5).abs() < 1e-6);
        assert!((config.flow.max_frequency_hz - 450.0).abs() < 1e-6);
        assert!((config.temperature.min_value + 20.0).abs() < 1e-6);
        assert!((config.temperature.max_frequency_hz - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[temperature]\nfault_threshold = 70.0\n").unwrap();
        let defaults = MonitorConfig::default();

        assert_eq!(config.flow, defaults.flow);
        assert_eq!(config.grace_period_us, defaults.grace_period_us);
        assert!((config.temperature.fault_threshold - 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_unknown_section() {
        let result = parse_config("[pressure]\nmax_value = 1.0\n");
        assert_eq!(result, Err(ParseError::InvalidSection { line: 1 }));
    }

    #[test]
    fn test_unterminated_section() {
        let result = parse_config("\n[flow\n");
        assert_eq!(result, Err(ParseError::InvalidSection { line: 2 }));
    }

    #[test]
    fn test_unknown_key() {
        let result = parse_config("[flow]\nmax_flow = 1.0\n");
        assert_eq!(result, Err(ParseError::UnknownKey { line: 2 }));

        // Channel keys are not valid at the root
        let result = parse_config("max_value = 1.0\n");
        assert_eq!(result, Err(ParseError::UnknownKey { line: 1 }));
    }

    #[test]
    fn test_invalid_values() {
        let result = parse_config("grace_period_us = -5\n");
        assert_eq!(result, Err(ParseError::InvalidValue { line: 1 }));

        let result = parse_config("[flow]\nmax_value = fast\n");
        assert_eq!(result, Err(ParseError::InvalidValue { line: 2 }));

        let result = parse_config("[flow]\nmax_value = inf\n");
        assert_eq!(result, Err(ParseError::InvalidValue { line: 2 }));
    }

    #[test]
    fn test_missing_value() {
        let result = parse_config("grace_period_us =\n");
        assert_eq!(result, Err(ParseError::MissingValue { line: 1 }));

        let result = parse_config("[flow]\nmax_value\n");
        assert_eq!(result, Err(ParseError::MissingValue { line: 2 }));
    }

    #[test]
    fn test_overlong_number_rejected() {
        let result = parse_config("grace_period_us = 1234567890123456789012345678901234567890\n");
        assert_eq!(result, Err(ParseError::InvalidValue { line: 1 }));
    }
}
