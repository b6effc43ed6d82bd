//! Core error types
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

use crate::frame::RxFrame;

/// Inbound frame parsing errors.
///
/// Non-fatal, the caller drops the offending frame without forwarding it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Frame shorter than the header it claims to carry
    Truncated,

    /// Reserved address-mode encoding in the header
    UnsupportedAddressMode,

    /// Unrecognised frame type bits
    UnknownFrameType,
}

/// Dispatch staging errors
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// No free slot, the frame is handed back so the caller can release it
    /// and count the drop
    BufferFull(RxFrame),
}
