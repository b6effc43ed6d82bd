//! MAC core configuration
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

/// Build/init-time constants for the duty-cycle core
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Wakeup interval (duty cycle period) in microseconds.
    ///
    /// Must be nonzero, checked once when the `PhaseClock` is built.
    pub wakeup_interval_us: u32,

    /// Minimum distance of a wake alarm in the future, in microseconds.
    ///
    /// An alarm computed from a counter read can already be in the past by
    /// the time the alarm register write completes, silently dropping the
    /// interrupt. Callers arming an alarm add this margin to any computed
    /// delay so the alarm is strictly future relative to the write.
    pub alarm_margin_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wakeup_interval_us: 100_000,
            alarm_margin_us: 2_000,
        }
    }
}
