//! Monitor shared between tasks
//!
//! Pulse capture and periodic evaluation usually run in different tasks
//! (or an interrupt and the main loop). Every call here runs inside a
//! blocking mutex so a pulse can never land halfway through an evaluation
//! and tear the buffer, average and timestamp apart.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::MonitorConfig;
use crate::traits::MonotonicClock;

use super::channel::ChannelKind;
use super::channel_monitor::{ChannelMonitor, DEFAULT_AVERAGING_WINDOW};
use super::snapshot::MonitorSnapshot;

/// `ChannelMonitor` behind a blocking mutex
///
/// Use `CriticalSectionRawMutex` when pulses are recorded from an
/// interrupt, `ThreadModeRawMutex` or `NoopRawMutex` when everything runs
/// on one executor. Critical sections are a few dozen instructions.
pub struct SharedMonitor<R, C, const N: usize = DEFAULT_AVERAGING_WINDOW> {
    inner: Mutex<R, RefCell<ChannelMonitor<C, N>>>,
}

impl<R: RawMutex, C: MonotonicClock, const N: usize> SharedMonitor<R, C, N> {
    pub const fn new(monitor: ChannelMonitor<C, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(monitor)),
        }
    }

    /// Run `f` with exclusive access to the monitor
    ///
    /// `f` must not call back into this `SharedMonitor`.
    pub fn with<U>(&self, f: impl FnOnce(&mut ChannelMonitor<C, N>) -> U) -> U {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }

    pub fn update(&self, kind: ChannelKind, period_us: u32) {
        self.with(|monitor| monitor.update(kind, period_us));
    }

    pub fn update_flow(&self, period_us: u32) {
        self.update(ChannelKind::Flow, period_us);
    }

    pub fn update_temperature(&self, period_us: u32) {
        self.update(ChannelKind::Temperature, period_us);
    }

    /// Evaluate both channels and return the readings it produced
    pub fn process(&self) -> MonitorSnapshot {
        self.with(|monitor| {
            monitor.process();
            monitor.snapshot()
        })
    }

    pub fn reset_faults(&self) {
        self.with(|monitor| monitor.reset_faults());
    }

    pub fn reconfigure(&self, config: MonitorConfig) {
        self.with(|monitor| monitor.reconfigure(config));
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.with(|monitor| monitor.snapshot())
    }

    pub fn any_fault(&self) -> bool {
        self.with(|monitor| monitor.any_fault())
    }

    /// Recover the monitor
    pub fn into_inner(self) -> ChannelMonitor<C, N> {
        self.inner.into_inner().into_inner()
    }
}
