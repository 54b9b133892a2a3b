//! Boot-time configuration selection
//!
//! Firmware carries a configuration text compiled in at build time and may
//! find a stored record from an earlier boot. Valid text wins and is stored
//! again whenever it differs from the record. A bad text falls back to the
//! stored record, and defaults cover the case where neither is usable.

use super::parse::{parse_config, ParseError};
use super::stored::{StoreError, StoredConfig};
use super::types::{ConfigError, MonitorConfig};

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSource {
    /// Compiled-in configuration text
    Embedded,
    /// Record persisted by an earlier boot
    Stored,
    /// `MonitorConfig::default()`
    Defaults,
}

/// Why the configuration text was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextError {
    Parse(ParseError),
    Invalid(ConfigError),
}

/// Outcome of [`select_config`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Selection {
    /// Configuration to run with (always valid)
    pub config: MonitorConfig,
    pub source: ConfigSource,
    /// Set when the text was rejected
    pub text_error: Option<TextError>,
    /// Set when the stored bytes did not hold a usable record
    pub stored_error: Option<StoreError>,
    /// The record should be rewritten with `config`
    pub needs_store: bool,
}

/// Pick the configuration to run with
///
/// `stored` is the raw content of the record area (erased flash reads as
/// `0xFF` and is simply an unusable record).
pub fn select_config(text: &str, stored: &[u8]) -> Selection {
    let record = StoredConfig::decode(stored).and_then(|config| {
        config.validate().map_err(StoreError::Invalid)?;
        Ok(config)
    });
    let embedded = parse_config(text)
        .map_err(TextError::Parse)
        .and_then(|config| {
            config.validate().map_err(TextError::Invalid)?;
            Ok(config)
        });

    match (embedded, record) {
        (Ok(config), record) => Selection {
            config,
            source: ConfigSource::Embedded,
            text_error: None,
            stored_error: record.err(),
            needs_store: record != Ok(config),
        },
        (Err(text_error), Ok(config)) => Selection {
            config,
            source: ConfigSource::Stored,
            text_error: Some(text_error),
            stored_error: None,
            needs_store: false,
        },
        (Err(text_error), Err(stored_error)) => Selection {
            config: MonitorConfig::default(),
            source: ConfigSource::Defaults,
            text_error: Some(text_error),
            stored_error: Some(stored_error),
            needs_store: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_STORED_CONFIG_LEN;
    use crate::monitor::ChannelKind;

    const TEXT: &str = "grace_period_us = 500_000\n[flow]\nfault_threshold = 3.5\n";

    fn text_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.grace_period_us = 500_000;
        config.flow.fault_threshold = 3.5;
        config
    }

    fn record(config: &MonitorConfig) -> [u8; MAX_STORED_CONFIG_LEN] {
        let mut buf = [0u8; MAX_STORED_CONFIG_LEN];
        StoredConfig::encode(config, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_first_boot_stores_text() {
        let erased = [0xFFu8; MAX_STORED_CONFIG_LEN];
        let selection = select_config(TEXT, &erased);

        assert_eq!(selection.source, ConfigSource::Embedded);
        assert_eq!(selection.config, text_config());
        assert_eq!(selection.stored_error, Some(StoreError::Deserialize));
        assert!(selection.needs_store);
    }

    #[test]
    fn test_matching_record_not_rewritten() {
        let selection = select_config(TEXT, &record(&text_config()));

        assert_eq!(selection.source, ConfigSource::Embedded);
        assert_eq!(selection.stored_error, None);
        assert!(!selection.needs_store);
    }

    #[test]
    fn test_changed_text_replaces_record() {
        let selection = select_config(TEXT, &record(&MonitorConfig::default()));

        assert_eq!(selection.source, ConfigSource::Embedded);
        assert_eq!(selection.config, text_config());
        assert!(selection.needs_store);
    }

    #[test]
    fn test_bad_text_uses_record() {
        let selection = select_config("[pressure]\n", &record(&text_config()));

        assert_eq!(selection.source, ConfigSource::Stored);
        assert_eq!(selection.config, text_config());
        assert_eq!(
            selection.text_error,
            Some(TextError::Parse(ParseError::InvalidSection { line: 1 }))
        );
        assert!(!selection.needs_store);
    }

    #[test]
    fn test_invalid_text_uses_record() {
        let text = "[temperature]\nmax_frequency_hz = 0\n";
        let selection = select_config(text, &record(&text_config()));

        assert_eq!(selection.source, ConfigSource::Stored);
        assert_eq!(
            selection.text_error,
            Some(TextError::Invalid(ConfigError::InvalidMaxFrequency(
                ChannelKind::Temperature
            )))
        );
    }

    #[test]
    fn test_nothing_usable_gives_defaults() {
        let erased = [0xFFu8; MAX_STORED_CONFIG_LEN];
        let selection = select_config("grace_period_us = 0\n", &erased);

        assert_eq!(selection.source, ConfigSource::Defaults);
        assert_eq!(selection.config, MonitorConfig::default());
        assert_eq!(
            selection.text_error,
            Some(TextError::Invalid(ConfigError::ZeroGracePeriod))
        );
        assert!(!selection.needs_store);
    }

    #[test]
    fn test_invalid_record_not_trusted() {
        let mut bad = MonitorConfig::default();
        bad.flow.max_frequency_hz = -1.0;
        let selection = select_config("[flow\n", &record(&bad));

        assert_eq!(selection.source, ConfigSource::Defaults);
        assert_eq!(
            selection.stored_error,
            Some(StoreError::Invalid(ConfigError::InvalidMaxFrequency(
                ChannelKind::Flow
            )))
        );
    }
}
