//! Configuration loading and persistence
//!
//! The configuration compiled in from `monitor.toml` is checked against the
//! record kept in the last flash sector. Bad input never stops the monitor:
//! it logs and falls back to the stored record, then to defaults.

use defmt::*;
use embassy_rp::flash::{self, Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;

use pulsewatch_core::config::{
    select_config, ConfigSource, MonitorConfig, StoreError, StoredConfig, MAX_STORED_CONFIG_LEN,
};

/// On-board QSPI flash size
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Record sector, excluded from the program region in memory.x
const CONFIG_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Flash driver used for the configuration record
pub type ConfigFlash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(flash::Error),
    /// Record encoding failed
    Store(StoreError),
}

impl From<flash::Error> for PersistError {
    fn from(e: flash::Error) -> Self {
        PersistError::Flash(e)
    }
}

impl From<StoreError> for PersistError {
    fn from(e: StoreError) -> Self {
        PersistError::Store(e)
    }
}

/// Choose the active configuration and keep the stored record in sync
pub fn load(flash: &mut ConfigFlash<'_>, text: &str) -> MonitorConfig {
    let mut record = [0u8; MAX_STORED_CONFIG_LEN];
    if let Err(e) = flash.blocking_read(CONFIG_OFFSET, &mut record) {
        warn!("Config record read failed: {}", e);
        record.fill(0xFF);
    }

    let selection = select_config(text, &record);

    if let Some(e) = selection.text_error {
        warn!("Embedded config rejected: {}", e);
    }
    match selection.source {
        ConfigSource::Embedded => info!("Using embedded config"),
        ConfigSource::Stored => info!("Using stored config"),
        ConfigSource::Defaults => {
            warn!("No usable config ({}), using defaults", selection.stored_error)
        }
    }

    if selection.needs_store {
        match store(flash, &selection.config) {
            Ok(()) => info!("Config record written"),
            Err(e) => warn!("Config record write failed: {}", e),
        }
    }

    log_config_summary(&selection.config);
    selection.config
}

/// Replace the stored record with `config`
fn store(flash: &mut ConfigFlash<'_>, config: &MonitorConfig) -> Result<(), PersistError> {
    let mut buf = [0u8; MAX_STORED_CONFIG_LEN];
    let len = StoredConfig::encode(config, &mut buf)?.len();

    flash.blocking_erase(CONFIG_OFFSET, CONFIG_OFFSET + ERASE_SIZE as u32)?;
    flash.blocking_write(CONFIG_OFFSET, &buf[..len])?;
    Ok(())
}

fn log_config_summary(config: &MonitorConfig) {
    info!(
        "Config: grace={}us flow=[{}..{}] @{}Hz <{} temp=[{}..{}] @{}Hz >{}",
        config.grace_period_us,
        config.flow.min_value,
        config.flow.max_value,
        config.flow.max_frequency_hz,
        config.flow.fault_threshold,
        config.temperature.min_value,
        config.temperature.max_value,
        config.temperature.max_frequency_hz,
        config.temperature.fault_threshold,
    );
}
