//! Hardware driver implementations
//!
//! This crate provides the pulse-capture side of the monitor: turning pin
//! edges from frequency-output sensors into inter-pulse periods that
//! `pulsewatch-core` consumes.

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
