//! Stored configuration record
//!
//! Wraps a `MonitorConfig` with a header and checksum so it can be written
//! to flash as postcard binary data and rejected if corrupted.

use serde::{Deserialize, Serialize};

use super::types::{ChannelCalibration, ConfigError, MonitorConfig};

/// Magic number to identify a valid record
pub const CONFIG_MAGIC: u32 = 0x5057_4346; // "PWCF"

/// Current record format version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on the encoded record size
pub const MAX_STORED_CONFIG_LEN: usize = 64;

/// Stored configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Output buffer too small or serializer failure
    Serialize,
    /// Bytes do not decode as a record
    Deserialize,
    /// Magic number does not match
    BadMagic,
    /// Record written by an incompatible format version
    VersionMismatch,
    /// Checksum does not match contents
    CrcMismatch,
    /// Record is intact but holds a configuration that fails validation
    Invalid(ConfigError),
}

/// Configuration record as persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredConfig {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Monitor configuration
    pub config: MonitorConfig,
    /// CRC32 checksum (calculated over magic..config)
    pub crc: u32,
}

impl StoredConfig {
    /// Wrap a configuration with a fresh header and checksum
    pub fn new(config: MonitorConfig) -> Self {
        let mut record = Self {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            config,
            crc: 0,
        };
        record.crc = record.calculate_crc();
        record
    }

    /// Calculate CRC32 over the header and configuration fields
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = calibration_crc(crc, &self.config.flow);
        crc = calibration_crc(crc, &self.config.temperature);
        crc = crc32_update(crc, &self.config.grace_period_us.to_le_bytes());

        !crc
    }

    /// Check header and checksum
    pub fn verify(&self) -> Result<(), StoreError> {
        if self.magic != CONFIG_MAGIC {
            return Err(StoreError::BadMagic);
        }
        if self.version != CONFIG_VERSION {
            return Err(StoreError::VersionMismatch);
        }
        if self.crc != self.calculate_crc() {
            return Err(StoreError::CrcMismatch);
        }
        Ok(())
    }

    /// Encode a configuration into `buf`, returning the used prefix
    pub fn encode<'a>(config: &MonitorConfig, buf: &'a mut [u8]) -> Result<&'a mut [u8], StoreError> {
        postcard::to_slice(&Self::new(*config), buf).map_err(|_| StoreError::Serialize)
    }

    /// Decode and verify a record, returning the configuration it holds
    pub fn decode(bytes: &[u8]) -> Result<MonitorConfig, StoreError> {
        let record: Self = postcard::from_bytes(bytes).map_err(|_| StoreError::Deserialize)?;
        record.verify()?;
        Ok(record.config)
    }
}

fn calibration_crc(crc: u32, calibration: &ChannelCalibration) -> u32 {
    let mut crc = crc;
    crc = crc32_update(crc, &calibration.max_value.to_le_bytes());
    crc = crc32_update(crc, &calibration.min_value.to_le_bytes());
    crc = crc32_update(crc, &calibration.fault_threshold.to_le_bytes());
    crc32_update(crc, &calibration.max_frequency_hz.to_le_bytes())
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }

    crc
}
