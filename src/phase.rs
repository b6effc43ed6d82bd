//! Wake-phase arithmetic over the hardware tick counter
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

use rand_core::RngCore;

use crate::{config::Config, timer::TickCounter, Phase};

/// PhaseClock converts raw counter reads into a position within the
/// fixed-length wakeup interval and computes delays to future phases.
///
/// Tick constants are derived once from [`Config`] at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseClock<T> {
    counter: T,

    interval_ticks: u32,
    alarm_margin_ticks: u32,
}

impl<T> PhaseClock<T>
where
    T: TickCounter,
{
    /// Build a phase clock over the provided counter.
    ///
    /// Panics if the configured wakeup interval is zero (or rounds to zero
    /// ticks), a configuration defect rather than a runtime error.
    pub fn new(config: &Config, counter: T) -> Self {
        let interval_ticks = counter.us_to_ticks(config.wakeup_interval_us);
        assert!(interval_ticks != 0, "wakeup interval must be nonzero");

        let alarm_margin_ticks = counter.us_to_ticks(config.alarm_margin_us);

        Self {
            counter,
            interval_ticks,
            alarm_margin_ticks,
        }
    }

    /// Wakeup interval length in ticks
    pub fn interval_ticks(&self) -> u32 {
        self.interval_ticks
    }

    /// Minimum alarm distance in ticks
    pub fn alarm_margin_ticks(&self) -> u32 {
        self.alarm_margin_ticks
    }

    /// Convert a raw counter value to a phase in `[0, interval_ticks)`
    pub fn ticks_to_phase(&self, ticks: u32) -> Phase {
        ticks % self.interval_ticks
    }

    /// Current phase of the device
    pub fn phase_now(&self) -> Phase {
        self.ticks_to_phase(self.counter.counter())
    }

    /// Ticks remaining until the targeted phase in the future.
    ///
    /// `phase` must be a valid phase, ie. less than the interval length.
    /// Result is in `[0, interval_ticks)`.
    pub fn ticks_until_phase(&self, phase: Phase) -> u32 {
        let mut delta = phase as i64 - self.phase_now() as i64;

        if delta < 0 {
            // Phase in next interval
            delta += self.interval_ticks as i64;
        }

        delta as u32
    }

    /// Delay to load into a hardware wake alarm for the targeted phase.
    ///
    /// Adds the configured margin so the armed alarm is strictly in the
    /// future relative to the register write.
    pub fn alarm_in(&self, phase: Phase) -> u32 {
        self.ticks_until_phase(phase) + self.alarm_margin_ticks
    }

    /// Draw a new random wake phase, used after a phase backoff
    pub fn backoff_phase<R: RngCore>(&self, rng: &mut R) -> Phase {
        rng.next_u32() % self.interval_ticks
    }
}
