//! Pulsewatch - Flow and Temperature Monitor Firmware
//!
//! Main firmware binary for RP2040-based boards. Watches a pulse-output
//! flow meter and a frequency-output temperature transmitter and asserts a
//! fault output when either stays out of range or goes silent.
//!
//! Pin map:
//! - GPIO2: flow pulses (open collector, pulled up)
//! - GPIO3: temperature pulses (open collector, pulled up)
//! - GPIO4: fault reset button (active low)
//! - GPIO25: fault output (high = fault)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pulsewatch_core::monitor::{ChannelKind, ChannelMonitor, SharedMonitor};
use pulsewatch_drivers::sensor::{Edge, PulseInput, PulseTimer};

use crate::channels::{now_us, Clock, Monitor};
use crate::config::ConfigFlash;

mod channels;
mod config;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit monitor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

/// Edges closer than this are contact bounce (caps both channels at 5 kHz)
const PULSE_GLITCH_FILTER_US: u32 = 200;

static MONITOR: StaticCell<Monitor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pulsewatch firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut flash = ConfigFlash::new_blocking(p.FLASH);
    let config = config::load(&mut flash, EMBEDDED_CONFIG);

    let clock: Clock = now_us;
    let monitor: &'static Monitor =
        MONITOR.init(SharedMonitor::new(ChannelMonitor::new(config, clock)));
    info!("Monitor initialized");

    let flow_input = PulseInput::new(
        Input::new(p.PIN_2, Pull::Up),
        clock,
        Edge::Falling,
        PulseTimer::with_glitch_filter(PULSE_GLITCH_FILTER_US),
    );
    let temperature_input = PulseInput::new(
        Input::new(p.PIN_3, Pull::Up),
        clock,
        Edge::Falling,
        PulseTimer::with_glitch_filter(PULSE_GLITCH_FILTER_US),
    );
    let reset_button = Input::new(p.PIN_4, Pull::Up);
    let fault_out = Output::new(p.PIN_25, Level::Low);

    spawner
        .spawn(tasks::pulse_task(ChannelKind::Flow, flow_input, monitor))
        .unwrap();
    spawner
        .spawn(tasks::pulse_task(
            ChannelKind::Temperature,
            temperature_input,
            monitor,
        ))
        .unwrap();
    spawner.spawn(tasks::monitor_task(monitor, fault_out)).unwrap();
    spawner.spawn(tasks::reset_task(reset_button)).unwrap();

    info!("All tasks spawned");
}
