//! MAC frame layout and inbound parsing.
//!
//! Every frame starts with a fixed two-byte header (type / address-mode
//! byte, then sequence number), an extra little-endian phase field for
//! wakeup-ack frames, then the destination and source addresses whose
//! lengths are encoded in the header's mode bits. Payload follows and is
//! never copied by the parser.
//
// https://github.com/rust-iot/dutymac
// Copyright 2021 Ryan Kurte

use byteorder::{ByteOrder, LittleEndian};

use heapless::Vec;

use crate::error::ParseError;
use crate::Phase;

/// Maximum over-the-air frame length
pub const MAX_FRAME_LEN: usize = 128;

/// Fixed header: frame type / address modes, sequence number
pub const FIXED_HDR_LEN: usize = 2;

const WA_PHASE_LEN: usize = 4;

const FRAME_TYPE_MASK: u8 = 0x0f;
const DST_MODE_SHIFT: u8 = 4;
const SRC_MODE_SHIFT: u8 = 6;
const ADDR_MODE_MASK: u8 = 0x03;

/// MAC frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameType {
    /// Wakeup request (WR), sent repeatedly until the receiver's phase
    WakeupRequest = 0x01,
    /// Wakeup acknowledgement (WA), carries the responder's current phase
    WakeupAck = 0x02,
    /// Unicast data
    Data = 0x03,
    /// Unicast data with the pending bit set: more frames follow in this
    /// cycle, the receiver should stay awake
    DataPending = 0x04,
    /// Broadcast stream frame, repeated over a full wakeup interval
    Broadcast = 0x05,
}

impl FrameType {
    fn from_bits(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(FrameType::WakeupRequest),
            0x02 => Some(FrameType::WakeupAck),
            0x03 => Some(FrameType::Data),
            0x04 => Some(FrameType::DataPending),
            0x05 => Some(FrameType::Broadcast),
            _ => None,
        }
    }

    /// Pending bit, receiver should extend its listen window
    pub fn pending(&self) -> bool {
        matches!(self, FrameType::DataPending)
    }
}

/// Link-layer address with explicit length tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Addr {
    /// No address present
    None,
    /// Short form address
    Short([u8; 2]),
    /// Long form address
    Long([u8; 8]),
}

impl Addr {
    /// Address length in bytes
    pub fn len(&self) -> usize {
        match self {
            Addr::None => 0,
            Addr::Short(_) => 2,
            Addr::Long(_) => 8,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Addr::None
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Addr::None => &[],
            Addr::Short(a) => a,
            Addr::Long(a) => a,
        }
    }

    fn mode(&self) -> u8 {
        match self {
            Addr::None => 0,
            Addr::Short(_) => 1,
            Addr::Long(_) => 2,
        }
    }

    fn read(mode: u8, buf: &[u8]) -> Result<(Self, usize), ParseError> {
        match mode {
            0 => Ok((Addr::None, 0)),
            1 => {
                if buf.len() < 2 {
                    return Err(ParseError::Truncated);
                }
                let mut a = [0u8; 2];
                a.copy_from_slice(&buf[..2]);
                Ok((Addr::Short(a), 2))
            }
            2 => {
                if buf.len() < 8 {
                    return Err(ParseError::Truncated);
                }
                let mut a = [0u8; 8];
                a.copy_from_slice(&buf[..8]);
                Ok((Addr::Long(a), 8))
            }
            _ => Err(ParseError::UnsupportedAddressMode),
        }
    }
}

/// Received frame with owned storage, as handed up by the radio driver
#[derive(Debug, Clone, PartialEq)]
pub struct RxFrame {
    data: Vec<u8, MAX_FRAME_LEN>,
    pub rssi: i16,
}

impl RxFrame {
    /// Wrap raw received bytes, failing if they exceed the frame MTU
    pub fn from_slice(data: &[u8]) -> Result<Self, ()> {
        Ok(Self {
            data: Vec::from_slice(data)?,
            rssi: 0,
        })
    }

    /// Raw frame bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Build a wakeup-request frame
    pub fn wakeup_request(dst: Addr, src: Addr, seq: u8) -> Result<Self, ()> {
        Self::build(FrameType::WakeupRequest, seq, dst, src, None, &[])
    }

    /// Build a wakeup-ack frame carrying the responder's current phase
    pub fn wakeup_ack(dst: Addr, src: Addr, seq: u8, phase: Phase) -> Result<Self, ()> {
        Self::build(FrameType::WakeupAck, seq, dst, src, Some(phase), &[])
    }

    /// Build a unicast data frame, setting the pending bit when more
    /// frames for the same receiver follow this cycle
    pub fn data_frame(
        dst: Addr,
        src: Addr,
        seq: u8,
        payload: &[u8],
        pending: bool,
    ) -> Result<Self, ()> {
        let ty = match pending {
            true => FrameType::DataPending,
            false => FrameType::Data,
        };
        Self::build(ty, seq, dst, src, None, payload)
    }

    /// Build a broadcast stream frame, sequence number identifies the
    /// stream for duplicate suppression on the receive side
    pub fn broadcast(src: Addr, seq: u8, payload: &[u8]) -> Result<Self, ()> {
        Self::build(FrameType::Broadcast, seq, Addr::None, src, None, payload)
    }

    fn build(
        ty: FrameType,
        seq: u8,
        dst: Addr,
        src: Addr,
        phase: Option<Phase>,
        payload: &[u8],
    ) -> Result<Self, ()> {
        let mut data = Vec::new();

        let b0 = ty as u8 | (dst.mode() << DST_MODE_SHIFT) | (src.mode() << SRC_MODE_SHIFT);
        data.push(b0).map_err(drop)?;
        data.push(seq).map_err(drop)?;

        if let Some(p) = phase {
            let mut b = [0u8; WA_PHASE_LEN];
            LittleEndian::write_u32(&mut b, p);
            data.extend_from_slice(&b)?;
        }

        data.extend_from_slice(dst.as_bytes())?;
        data.extend_from_slice(src.as_bytes())?;
        data.extend_from_slice(payload)?;

        Ok(Self { data, rssi: 0 })
    }
}

/// Borrowed view of a frame's MAC header, aliasing the frame's own bytes.
/// Valid only while the caller retains the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderView<'a> {
    buf: &'a [u8],
    ty: FrameType,
}

impl<'a> HeaderView<'a> {
    pub fn frame_type(&self) -> FrameType {
        self.ty
    }

    /// Sequence number, for broadcast frames the stream marker
    pub fn seq(&self) -> u8 {
        self.buf[1]
    }

    /// Responder phase carried by wakeup-ack frames
    pub fn wakeup_ack_phase(&self) -> Option<Phase> {
        match self.ty {
            FrameType::WakeupAck => {
                Some(LittleEndian::read_u32(&self.buf[FIXED_HDR_LEN..FIXED_HDR_LEN + WA_PHASE_LEN]))
            }
            _ => None,
        }
    }

    /// Total header length including addresses; payload starts here
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }
}

/// Parsed information of one inbound frame.
///
/// Addresses are copied out, the header is not: it points into the frame
/// and is discarded with this value.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketInfo<'a> {
    /// MAC header of the frame
    pub header: HeaderView<'a>,
    /// Copied source address of the frame
    pub src_addr: Addr,
    /// Copied destination address of the frame
    pub dst_addr: Addr,
}

/// Parse an inbound frame, validating the header in place and copying out
/// the addresses.
///
/// On error the caller drops the frame without forwarding it.
pub fn parse(frame: &RxFrame) -> Result<PacketInfo<'_>, ParseError> {
    let buf = frame.data();

    if buf.len() < FIXED_HDR_LEN {
        return Err(ParseError::Truncated);
    }

    let ty = FrameType::from_bits(buf[0] & FRAME_TYPE_MASK).ok_or(ParseError::UnknownFrameType)?;
    let dst_mode = (buf[0] >> DST_MODE_SHIFT) & ADDR_MODE_MASK;
    let src_mode = (buf[0] >> SRC_MODE_SHIFT) & ADDR_MODE_MASK;

    let mut offset = FIXED_HDR_LEN;

    if ty == FrameType::WakeupAck {
        if buf.len() < offset + WA_PHASE_LEN {
            return Err(ParseError::Truncated);
        }
        offset += WA_PHASE_LEN;
    }

    let (dst_addr, n) = Addr::read(dst_mode, &buf[offset..])?;
    offset += n;

    let (src_addr, n) = Addr::read(src_mode, &buf[offset..])?;
    offset += n;

    Ok(PacketInfo {
        header: HeaderView {
            buf: &buf[..offset],
            ty,
        },
        src_addr,
        dst_addr,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const SRC: Addr = Addr::Long([0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]);
    const DST: Addr = Addr::Short([0xab, 0xcd]);

    #[test]
    fn parse_data_frame() {
        let payload = [0xde, 0xad, 0xbe, 0xef];
        let frame = RxFrame::data_frame(DST, SRC, 7, &payload, false).unwrap();

        let info = parse(&frame).unwrap();

        assert_eq!(info.header.frame_type(), FrameType::Data);
        assert_eq!(info.header.seq(), 7);
        assert_eq!(info.src_addr, SRC);
        assert_eq!(info.dst_addr, DST);

        // Header aliases the frame's own memory, fixed part + 2 + 8 addresses
        assert_eq!(info.header.as_bytes().as_ptr(), frame.data().as_ptr());
        assert_eq!(info.header.len(), FIXED_HDR_LEN + 2 + 8);

        // Payload is whatever follows the header, uncopied
        assert_eq!(&frame.data()[info.header.len()..], &payload);
    }

    #[test]
    fn parse_pending_bit() {
        let frame = RxFrame::data_frame(DST, SRC, 1, &[], true).unwrap();
        let info = parse(&frame).unwrap();

        assert_eq!(info.header.frame_type(), FrameType::DataPending);
        assert!(info.header.frame_type().pending());

        let frame = RxFrame::data_frame(DST, SRC, 1, &[], false).unwrap();
        assert!(!parse(&frame).unwrap().header.frame_type().pending());
    }

    #[test]
    fn parse_wakeup_ack_phase() {
        let frame = RxFrame::wakeup_ack(DST, SRC, 3, 0x1122_3344).unwrap();
        let info = parse(&frame).unwrap();

        assert_eq!(info.header.frame_type(), FrameType::WakeupAck);
        assert_eq!(info.header.wakeup_ack_phase(), Some(0x1122_3344));

        // Phase field counts towards the header
        assert_eq!(info.header.len(), FIXED_HDR_LEN + 4 + 2 + 8);

        let frame = RxFrame::data_frame(DST, SRC, 3, &[], false).unwrap();
        assert_eq!(parse(&frame).unwrap().header.wakeup_ack_phase(), None);
    }

    #[test]
    fn parse_broadcast_no_dst() {
        let frame = RxFrame::broadcast(SRC, 9, &[1, 2, 3]).unwrap();
        let info = parse(&frame).unwrap();

        assert_eq!(info.header.frame_type(), FrameType::Broadcast);
        assert_eq!(info.dst_addr, Addr::None);
        assert!(info.dst_addr.is_none());
        assert_eq!(info.src_addr, SRC);
    }

    #[test]
    fn parse_truncated() {
        // Shorter than the fixed header
        let frame = RxFrame::from_slice(&[0x03]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::Truncated));

        let frame = RxFrame::from_slice(&[]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::Truncated));

        // Fixed header claims a short destination address that is missing
        let b0 = 0x03 | (1 << DST_MODE_SHIFT);
        let frame = RxFrame::from_slice(&[b0, 0x00]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::Truncated));

        // Wakeup-ack without its phase field
        let frame = RxFrame::from_slice(&[0x02, 0x00, 0x01, 0x02]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::Truncated));
    }

    #[test]
    fn parse_unknown_frame_type() {
        for ty in [0x00u8, 0x06, 0x0f].iter() {
            let frame = RxFrame::from_slice(&[*ty, 0x00]).unwrap();
            assert_eq!(parse(&frame), Err(ParseError::UnknownFrameType));
        }
    }

    #[test]
    fn parse_reserved_address_mode() {
        let b0 = 0x03 | (3 << DST_MODE_SHIFT);
        let frame = RxFrame::from_slice(&[b0, 0x00]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::UnsupportedAddressMode));

        let b0 = 0x03 | (3 << SRC_MODE_SHIFT);
        let frame = RxFrame::from_slice(&[b0, 0x00]).unwrap();
        assert_eq!(parse(&frame), Err(ParseError::UnsupportedAddressMode));
    }

    #[test]
    fn oversize_payload_rejected() {
        let payload = [0u8; MAX_FRAME_LEN];
        assert!(RxFrame::data_frame(DST, SRC, 0, &payload, false).is_err());
    }
}
