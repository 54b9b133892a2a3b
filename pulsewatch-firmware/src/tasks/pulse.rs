//! Pulse capture task
//!
//! One instance per channel. Waits for sensor edges and feeds each
//! inter-pulse period into the shared monitor.

use defmt::*;
use embassy_rp::gpio::Input;

use pulsewatch_core::monitor::ChannelKind;
use pulsewatch_drivers::sensor::PulseInput;

use crate::channels::{Clock, Monitor};

/// Pulse input on an RP2040 GPIO
pub type PulsePin = PulseInput<Input<'static>, Clock>;

/// Pulse capture task
#[embassy_executor::task(pool_size = 2)]
pub async fn pulse_task(kind: ChannelKind, mut input: PulsePin, monitor: &'static Monitor) {
    info!("Pulse task started: {}", kind);

    let mut rejected = 0;

    loop {
        match input.next_period().await {
            Ok(period_us) => monitor.update(kind, period_us),
            Err(e) => match e {},
        }

        let total = input.timer().rejected();
        if total != rejected {
            debug!("{}: {} glitch edges ignored", kind, total - rejected);
            rejected = total;
        }
    }
}
