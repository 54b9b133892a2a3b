//! Fault reset button task
//!
//! Active-low push button. A press held past the debounce time requests a
//! fault reset from the monitor task.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::channels::FAULT_RESET;

/// Debounce time in milliseconds
const DEBOUNCE_MS: u64 = 50;

/// Reset button task
#[embassy_executor::task]
pub async fn reset_task(mut button: Input<'static>) {
    info!("Reset button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;

        if button.is_low() {
            info!("Fault reset requested");
            FAULT_RESET.signal(());
            // One reset per press
            button.wait_for_high().await;
        }
    }
}
