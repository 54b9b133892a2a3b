//! Board-agnostic core logic for the pulse monitor firmware
//!
//! This crate contains all monitoring logic that does not depend on
//! specific hardware implementations:
//!
//! - Clock abstraction trait
//! - Flow and temperature channel monitor (averaging, scaling, fault latching)
//! - Mutex-guarded monitor for sharing between pulse and evaluation tasks
//! - Configuration types, text parser and stored-record codec

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod monitor;
pub mod traits;
