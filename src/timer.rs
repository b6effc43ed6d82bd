//! Hardware tick counter API
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

/// TickCounter trait abstracts the free-running hardware counter (RTT or
/// similar) driving the duty-cycle schedule.
///
/// Reads are non-blocking and callable from interrupt context, and must be
/// monotonic modulo the counter's fixed wraparound width.
pub trait TickCounter {
    /// Returns the raw counter value in ticks
    fn counter(&self) -> u32;

    /// Converts microseconds to ticks at the counter's fixed frequency
    fn us_to_ticks(&self, us: u32) -> u32;
}

#[cfg(any(test, feature = "mocks"))]
pub mod mock {
    use std::sync::{Arc, Mutex};

    /// Mock tick counter to assist with testing, 1 MHz (1 tick per
    /// microsecond) unless built with another frequency
    #[derive(Clone, Debug)]
    pub struct MockCounter {
        ticks: Arc<Mutex<u32>>,
        freq_hz: u32,
    }

    impl MockCounter {
        pub fn new() -> Self {
            Self::with_freq(1_000_000)
        }

        pub fn with_freq(freq_hz: u32) -> Self {
            Self {
                ticks: Arc::new(Mutex::new(0)),
                freq_hz,
            }
        }

        pub fn set(&mut self, ticks: u32) {
            *self.ticks.lock().unwrap() = ticks;
        }

        pub fn advance(&mut self, ticks: u32) {
            let mut v = self.ticks.lock().unwrap();
            *v = v.wrapping_add(ticks);
        }

        pub fn val(&self) -> u32 {
            *self.ticks.lock().unwrap()
        }
    }

    impl super::TickCounter for MockCounter {
        fn counter(&self) -> u32 {
            *self.ticks.lock().unwrap()
        }

        fn us_to_ticks(&self, us: u32) -> u32 {
            (us as u64 * self.freq_hz as u64 / 1_000_000) as u32
        }
    }
}
