//! Periodic evaluation task
//!
//! Runs the monitor's staleness and threshold checks on a fixed tick,
//! drives the fault output and reports channel transitions.

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Ticker};

use pulsewatch_core::monitor::{ChannelKind, ChannelReading, FaultState, SignalStatus};

use crate::channels::{Monitor, FAULT_RESET};

/// Evaluation interval in milliseconds
pub const PROCESS_INTERVAL_MS: u64 = 100;

/// Status line every 5 s
const STATUS_EVERY_TICKS: u32 = 50;

/// Monitor task
///
/// `fault_out` is held high while either channel is latched (relay, lamp
/// or interlock input).
#[embassy_executor::task]
pub async fn monitor_task(monitor: &'static Monitor, mut fault_out: Output<'static>) {
    info!("Monitor task started");

    let mut ticker = Ticker::every(Duration::from_millis(PROCESS_INTERVAL_MS));
    let mut previous = monitor.snapshot();
    let mut ticks: u32 = 0;

    loop {
        if FAULT_RESET.try_take().is_some() {
            monitor.reset_faults();
            info!("Faults reset");
        }

        let snapshot = monitor.process();

        for kind in ChannelKind::ALL {
            report_transitions(kind, previous.channel(kind), snapshot.channel(kind));
        }

        let level = if snapshot.any_fault() {
            Level::High
        } else {
            Level::Low
        };
        if level != fault_out.get_output_level() {
            if level == Level::High {
                error!("Fault output asserted");
            } else {
                info!("Fault output released");
            }
            fault_out.set_level(level);
        }

        ticks = ticks.wrapping_add(1);
        if ticks % STATUS_EVERY_TICKS == 0 {
            info!(
                "flow={} ({}us, {}) temp={} ({}us, {})",
                snapshot.flow.scaled_value,
                snapshot.flow.average_period_us,
                snapshot.flow.fault,
                snapshot.temperature.scaled_value,
                snapshot.temperature.average_period_us,
                snapshot.temperature.fault,
            );
        }

        previous = snapshot;
        ticker.next().await;
    }
}

fn report_transitions(kind: ChannelKind, before: &ChannelReading, after: &ChannelReading) {
    if before.signal != after.signal {
        match after.signal {
            SignalStatus::Stale => warn!("{} signal lost", kind),
            SignalStatus::Live => info!("{} signal restored", kind),
        }
    }

    if before.fault != after.fault {
        match after.fault {
            FaultState::Fault => error!(
                "{} fault: {} at value {}",
                kind, after.fault_cause, after.scaled_value
            ),
            FaultState::Ok => info!("{} fault cleared", kind),
        }
    }
}
