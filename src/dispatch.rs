//! Receive-side dispatch buffer with duplicate suppression.
//!
//! Accepted frames are staged here until the dispatch path forwards them to
//! the upper layer. Repeated broadcast-stream copies are collapsed so a
//! stream repeated over a full wakeup interval reaches the network layer
//! once.
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

use log::{debug, warn};

use crate::error::DispatchError;
use crate::frame::{parse, Addr, FrameType, RxFrame};

/// Default dispatch buffer capacity
pub const DISPATCH_BUFFER_LEN: usize = 8;

/// Two broadcast frames carrying the same stream marker from the same
/// source are copies of one another.
#[derive(Debug, Clone, PartialEq)]
struct BroadcastKey {
    seq: u8,
    src: Addr,
}

fn broadcast_key(frame: &RxFrame) -> Option<BroadcastKey> {
    // Frames reaching dispatch already passed parse, anything else just
    // skips duplicate matching
    let info = parse(frame).ok()?;

    if info.header.frame_type() != FrameType::Broadcast {
        return None;
    }

    Some(BroadcastKey {
        seq: info.header.seq(),
        src: info.src_addr,
    })
}

/// Fixed-capacity staging buffer for received frames, filled bottom-up and
/// emptied completely so occupied slots never have holes between them.
#[derive(Debug)]
pub struct DispatchBuffer<const N: usize = DISPATCH_BUFFER_LEN> {
    slots: [Option<RxFrame>; N],
}

impl<const N: usize> Default for DispatchBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DispatchBuffer<N> {
    const EMPTY: Option<RxFrame> = None;

    pub fn new() -> Self {
        Self {
            slots: [Self::EMPTY; N],
        }
    }

    /// Stage a received frame for upper-layer dispatch, suppressing
    /// duplicates.
    ///
    /// A frame matching a staged broadcast copy is discarded and the call
    /// still succeeds, suppression is not an error. With no duplicate and
    /// no free slot the frame is handed back in
    /// [`DispatchError::BufferFull`].
    pub fn defer(&mut self, frame: RxFrame) -> Result<(), DispatchError> {
        let key = broadcast_key(&frame);

        for slot in self.slots.iter_mut() {
            match slot {
                // First empty slot, no duplicate further up
                None => {
                    *slot = Some(frame);
                    return Ok(());
                }
                Some(stored) => {
                    if let (Some(k), Some(stored_k)) = (&key, broadcast_key(stored)) {
                        if *k == stored_k {
                            debug!("Dropping duplicate broadcast frame (seq {})", k.seq);
                            return Ok(());
                        }
                    }
                }
            }
        }

        warn!("Dispatch buffer full, dropping frame");
        Err(DispatchError::BufferFull(frame))
    }

    /// Remove the oldest staged frame for forwarding upward, freeing its
    /// slot and keeping the buffer hole free
    pub fn pop(&mut self) -> Option<RxFrame> {
        let frame = self.slots[0].take()?;

        for i in 1..N {
            self.slots[i - 1] = self.slots[i].take();
        }

        Some(frame)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    pub fn is_full(&self) -> bool {
        self.slots[N - 1].is_some()
    }

    pub fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SRC_A: Addr = Addr::Short([0x00, 0x0a]);
    const SRC_B: Addr = Addr::Short([0x00, 0x0b]);
    const SRC_C: Addr = Addr::Short([0x00, 0x0c]);
    const SRC_D: Addr = Addr::Short([0x00, 0x0d]);
    const SRC_E: Addr = Addr::Short([0x00, 0x0e]);

    fn bcast(src: Addr, seq: u8) -> RxFrame {
        RxFrame::broadcast(src, seq, &[seq]).unwrap()
    }

    #[test]
    fn defer_dedup_and_overflow() {
        let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, simplelog::Config::default());

        let mut buffer: DispatchBuffer<4> = DispatchBuffer::new();

        let a = bcast(SRC_A, 1);

        buffer.defer(a.clone()).unwrap();
        assert_eq!(buffer.len(), 1);

        // Same source and stream marker, duplicate of A: discarded, still Ok
        buffer.defer(bcast(SRC_A, 1)).unwrap();
        assert_eq!(buffer.len(), 1);

        buffer.defer(bcast(SRC_B, 1)).unwrap();
        buffer.defer(bcast(SRC_C, 2)).unwrap();
        buffer.defer(bcast(SRC_D, 3)).unwrap();
        assert_eq!(buffer.len(), 4);
        assert!(buffer.is_full());

        // Buffer saturated, frame handed back, contents unchanged
        let e = bcast(SRC_E, 4);
        assert_eq!(buffer.defer(e.clone()), Err(DispatchError::BufferFull(e)));
        assert_eq!(buffer.len(), 4);

        // Staged frames come out in arrival order
        assert_eq!(buffer.pop(), Some(a));
        assert_eq!(buffer.pop(), Some(bcast(SRC_B, 1)));
        assert_eq!(buffer.pop(), Some(bcast(SRC_C, 2)));
        assert_eq!(buffer.pop(), Some(bcast(SRC_D, 3)));
        assert_eq!(buffer.pop(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn defer_same_seq_different_source() {
        let mut buffer: DispatchBuffer<4> = DispatchBuffer::new();

        buffer.defer(bcast(SRC_A, 1)).unwrap();
        buffer.defer(bcast(SRC_B, 1)).unwrap();

        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn defer_unicast_never_dedups() {
        let mut buffer: DispatchBuffer<4> = DispatchBuffer::new();

        let frame = RxFrame::data_frame(SRC_B, SRC_A, 1, &[0xaa], false).unwrap();

        buffer.defer(frame.clone()).unwrap();
        buffer.defer(frame).unwrap();

        // Identical unicast frames are not broadcast copies
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn pop_frees_slot_for_defer() {
        let mut buffer: DispatchBuffer<2> = DispatchBuffer::new();

        buffer.defer(bcast(SRC_A, 1)).unwrap();
        buffer.defer(bcast(SRC_B, 2)).unwrap();
        assert!(buffer.is_full());

        assert_eq!(buffer.pop(), Some(bcast(SRC_A, 1)));

        buffer.defer(bcast(SRC_C, 3)).unwrap();
        assert!(buffer.is_full());
        assert_eq!(buffer.pop(), Some(bcast(SRC_B, 2)));
        assert_eq!(buffer.pop(), Some(bcast(SRC_C, 3)));
    }
}
