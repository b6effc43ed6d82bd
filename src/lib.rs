//! Coordination core for a duty-cycled (sleep/wake) link-layer protocol.
//!
//! Provides wake-phase arithmetic over the hardware tick counter, the
//! per-device control-flag register, inbound frame parsing and the
//! receive-side dispatch/deduplication buffer. The radio driver and the
//! TX/RX procedure state machines sit above this crate and drive it.
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod config;

pub mod timer;

pub mod phase;

pub mod flags;

pub mod frame;

pub mod dispatch;

pub mod error;

pub mod prelude;


/// Wake phases and tick deltas are expressed in raw hardware counter ticks
pub type Phase = u32;
