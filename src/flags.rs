//! Per-device MAC control flags
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

use bitflags::bitflags;

bitflags! {
    /// Transient control flags, cleared at the start of each duty cycle
    /// unless the state machine explicitly carries one forward
    pub struct CycleFlags: u16 {
        /// Sender may keep transmitting to the same receiver this cycle
        const TX_CONTINUE   = 0x0008;
        /// Abandon remaining TX attempts this cycle
        const QUIT_TX       = 0x0010;
        /// Reselect a random wake phase before the next cycle
        const PHASE_BACKOFF = 0x0020;
        /// End the listen window after the current reception
        const QUIT_RX       = 0x0040;
    }
}

bitflags! {
    /// Persistent duty-cycle flags, survive across cycles until changed
    pub struct DutyFlags: u8 {
        /// Sleep/wake duty cycling is currently running
        const DUTYCYCLE_ACTIVE = 0x01;
        /// Wake/sleep schedule must be recomputed before next use
        const NEEDS_RESCHEDULE = 0x02;
    }
}

/// Control-flag register of one device, owned by the MAC context per radio
/// interface and passed by reference into every operation.
///
/// Flags are bit-independent, setting one never alters another. All setters
/// are idempotent and all getters side-effect free; the TX/RX procedure
/// state machines derive their continue/abort/backoff decisions solely from
/// this state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMacState {
    cycle: CycleFlags,
    duty: DutyFlags,
}

impl Default for DeviceMacState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceMacState {
    pub fn new() -> Self {
        Self {
            cycle: CycleFlags::empty(),
            duty: DutyFlags::empty(),
        }
    }

    /// Reset the transient flags at the start of a duty cycle.
    /// Persistent flags are untouched.
    pub fn begin_cycle(&mut self) {
        self.cycle = CycleFlags::empty();
    }

    /// Set the TX-continue flag.
    ///
    /// Supports burst transmission based on the pending-bit technique: a
    /// sender with multiple frames queued for the same receiver transmits
    /// them back to back, aware that the receiver stays awake for further
    /// receptions.
    pub fn set_tx_continue(&mut self, tx_continue: bool) {
        self.cycle.set(CycleFlags::TX_CONTINUE, tx_continue);
    }

    pub fn tx_continue(&self) -> bool {
        self.cycle.contains(CycleFlags::TX_CONTINUE)
    }

    /// Set the quit-TX flag.
    ///
    /// Collision avoidance: a node overhearing an ongoing broadcast stream
    /// or another pair's transmission during its wake period quits all
    /// remaining TX attempts this cycle rather than collide with them.
    pub fn set_quit_tx(&mut self, quit_tx: bool) {
        self.cycle.set(CycleFlags::QUIT_TX, quit_tx);
    }

    pub fn quit_tx(&self) -> bool {
        self.cycle.contains(CycleFlags::QUIT_TX)
    }

    /// Set the phase-backoff flag.
    ///
    /// In multi-hop topologies a sender whose wake phase sits close to its
    /// receiver's risks collisions between its own uplink and its childrens'
    /// traffic; on detection it reselects a random wake phase for the next
    /// cycle.
    pub fn set_phase_backoff(&mut self, backoff: bool) {
        self.cycle.set(CycleFlags::PHASE_BACKOFF, backoff);
    }

    pub fn phase_backoff(&self) -> bool {
        self.cycle.contains(CycleFlags::PHASE_BACKOFF)
    }

    /// Set the quit-RX flag.
    ///
    /// Normally each reception extends the listen window by another basic
    /// duration to catch burst traffic. After receiving a broadcast-stream
    /// frame the node instead sleeps immediately so it does not collect
    /// duplicate copies.
    pub fn set_quit_rx(&mut self, quit_rx: bool) {
        self.cycle.set(CycleFlags::QUIT_RX, quit_rx);
    }

    pub fn quit_rx(&self) -> bool {
        self.cycle.contains(CycleFlags::QUIT_RX)
    }

    /// Set the duty-cycle-active flag, gating whether wake scheduling runs
    pub fn set_dutycycle_active(&mut self, active: bool) {
        self.duty.set(DutyFlags::DUTYCYCLE_ACTIVE, active);
    }

    pub fn dutycycle_active(&self) -> bool {
        self.duty.contains(DutyFlags::DUTYCYCLE_ACTIVE)
    }

    /// Set the needs-reschedule flag, eg. after a phase backoff or a
    /// configuration change invalidated the armed wake alarm
    pub fn set_reschedule(&mut self, reschedule: bool) {
        self.duty.set(DutyFlags::NEEDS_RESCHEDULE, reschedule);
    }

    pub fn needs_reschedule(&self) -> bool {
        self.duty.contains(DutyFlags::NEEDS_RESCHEDULE)
    }
}
