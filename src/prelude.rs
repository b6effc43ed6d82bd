//! dutymac crate prelude
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

pub use crate::Phase;

pub use crate::config::Config;

pub use crate::error::{DispatchError, ParseError};

pub use crate::timer::TickCounter;

pub use crate::phase::PhaseClock;

pub use crate::flags::{CycleFlags, DeviceMacState, DutyFlags};

pub use crate::frame::{parse, Addr, FrameType, HeaderView, PacketInfo, RxFrame};

pub use crate::dispatch::{DispatchBuffer, DISPATCH_BUFFER_LEN};
