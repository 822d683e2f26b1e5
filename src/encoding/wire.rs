// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire-format primitives.
//!
//! Pure functions over byte buffers for the five wire types: varint,
//! fixed64, length-delimited, start/end-group and fixed32. Each shape has a
//! `size_*` / `put_*` / `get_*` triple; `get_*` functions take the buffer
//! and a position and return the value with the position advanced past it.

use crate::core::error::{CodecError, Result};
use crate::schema::model::{Kind, FIELD_NUMBER_MAX, FIELD_NUMBER_MIN};

/// Wire type of an encoded record, the low three bits of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer: int32/64, uint32/64, sint32/64, bool, enum
    Varint = 0,
    /// 8-byte little-endian: fixed64, sfixed64, double
    Fixed64 = 1,
    /// Varint length then raw bytes: string, bytes, message, packed repeated
    LengthDelimited = 2,
    /// Opens a group; closed by a matching [`WireType::EndGroup`] tag
    StartGroup = 3,
    /// Closes a group
    EndGroup = 4,
    /// 4-byte little-endian: fixed32, sfixed32, float
    Fixed32 = 5,
}

impl WireType {
    /// Decode a wire type from the low bits of a tag.
    pub fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            other => Err(CodecError::malformed(
                "tag",
                format!("wire type {other} is not defined"),
            )),
        }
    }

    /// Raw 3-bit value of this wire type.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// The wire type a field kind encodes with.
    pub fn for_kind(kind: Kind) -> WireType {
        match kind {
            Kind::Int32
            | Kind::Int64
            | Kind::UInt32
            | Kind::UInt64
            | Kind::SInt32
            | Kind::SInt64
            | Kind::Bool
            | Kind::Enum => WireType::Varint,
            Kind::Fixed64 | Kind::SFixed64 | Kind::Double => WireType::Fixed64,
            Kind::Fixed32 | Kind::SFixed32 | Kind::Float => WireType::Fixed32,
            Kind::String | Kind::Bytes | Kind::Message => WireType::LengthDelimited,
            Kind::Group => WireType::StartGroup,
        }
    }
}

// ============================================================================
// Varint
// ============================================================================

/// Number of bytes `put_varint` writes for `value`.
pub fn size_varint(value: u64) -> usize {
    // 7 significant bits per byte, minimum one byte for zero.
    ((64 - (value | 1).leading_zeros() as usize) + 6) / 7
}

/// Append a base-128 varint.
pub fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Parse a varint at `pos`; returns the value and the position after it.
pub fn get_varint(data: &[u8], pos: usize) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    let mut cursor = pos;

    loop {
        if cursor >= data.len() {
            return Err(CodecError::truncated(1, 0, cursor));
        }
        let byte = data[cursor];
        cursor += 1;

        if shift == 63 && byte > 1 {
            // Tenth byte may only contribute the final bit.
            return Err(CodecError::overflow("varint"));
        }
        result |= ((byte & 0x7F) as u64) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((result, cursor));
        }
        if shift >= 70 {
            return Err(CodecError::overflow("varint"));
        }
    }
}

// ============================================================================
// Zig-zag
// ============================================================================

/// Zig-zag encode a signed 32-bit value for the sint32 kind.
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zig-zag decode a sint32 wire value.
pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Zig-zag encode a signed 64-bit value for the sint64 kind.
pub fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Zig-zag decode a sint64 wire value.
pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

// ============================================================================
// Tags
// ============================================================================

/// Number of bytes `put_tag` writes for a field number.
pub fn size_tag(number: u32) -> usize {
    size_varint((number as u64) << 3)
}

/// Append a field tag.
pub fn put_tag(buf: &mut Vec<u8>, number: u32, wire_type: WireType) {
    put_varint(buf, ((number as u64) << 3) | wire_type.raw() as u64);
}

/// Parse a tag at `pos`; returns the field number, wire type, and the
/// position after the tag.
pub fn get_tag(data: &[u8], pos: usize) -> Result<(u32, WireType, usize)> {
    let (raw, next) = get_varint(data, pos)?;
    let number = raw >> 3;
    if !(FIELD_NUMBER_MIN as u64..=FIELD_NUMBER_MAX as u64).contains(&number) {
        return Err(CodecError::malformed(
            "tag",
            format!("field number {number} out of range"),
        ));
    }
    let wire_type = WireType::from_raw((raw & 0x7) as u8)?;
    Ok((number as u32, wire_type, next))
}

// ============================================================================
// Fixed-width
// ============================================================================

/// Append a 4-byte little-endian value.
pub fn put_fixed32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Parse a fixed32 at `pos`.
pub fn get_fixed32(data: &[u8], pos: usize) -> Result<(u32, usize)> {
    let end = pos + 4;
    if end > data.len() {
        return Err(CodecError::truncated(4, data.len().saturating_sub(pos), pos));
    }
    let bytes: [u8; 4] = data[pos..end].try_into().expect("slice length checked");
    Ok((u32::from_le_bytes(bytes), end))
}

/// Append an 8-byte little-endian value.
pub fn put_fixed64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Parse a fixed64 at `pos`.
pub fn get_fixed64(data: &[u8], pos: usize) -> Result<(u64, usize)> {
    let end = pos + 8;
    if end > data.len() {
        return Err(CodecError::truncated(8, data.len().saturating_sub(pos), pos));
    }
    let bytes: [u8; 8] = data[pos..end].try_into().expect("slice length checked");
    Ok((u64::from_le_bytes(bytes), end))
}

// ============================================================================
// Length-delimited
// ============================================================================

/// Number of bytes `put_bytes` writes for a payload of `len` bytes.
pub fn size_bytes(len: usize) -> usize {
    size_varint(len as u64) + len
}

/// Append a varint length prefix followed by the payload.
pub fn put_bytes(buf: &mut Vec<u8>, payload: &[u8]) {
    put_varint(buf, payload.len() as u64);
    buf.extend_from_slice(payload);
}

/// Parse a length-delimited payload at `pos`; returns the payload slice and
/// the position after it.
pub fn get_bytes(data: &[u8], pos: usize) -> Result<(&[u8], usize)> {
    let (len, start) = get_varint(data, pos)?;
    let len = usize::try_from(len).map_err(|_| CodecError::overflow("length prefix"))?;
    let end = start.checked_add(len).ok_or_else(|| CodecError::overflow("length prefix"))?;
    if end > data.len() {
        return Err(CodecError::truncated(len, data.len() - start, start));
    }
    Ok((&data[start..end], end))
}

// ============================================================================
// Record skipping
// ============================================================================

/// Nesting bound for group skipping; matches the decoder's recursion limit.
const MAX_SKIP_DEPTH: u32 = 100;

/// Advance past one record's value (the tag already consumed), returning the
/// position after it. Groups are skipped through their matching end tag,
/// brackets included.
pub fn skip_value(data: &[u8], pos: usize, number: u32, wire_type: WireType) -> Result<usize> {
    skip_value_bounded(data, pos, number, wire_type, MAX_SKIP_DEPTH)
}

fn skip_value_bounded(
    data: &[u8],
    pos: usize,
    number: u32,
    wire_type: WireType,
    depth: u32,
) -> Result<usize> {
    match wire_type {
        WireType::Varint => get_varint(data, pos).map(|(_, next)| next),
        WireType::Fixed64 => get_fixed64(data, pos).map(|(_, next)| next),
        WireType::Fixed32 => get_fixed32(data, pos).map(|(_, next)| next),
        WireType::LengthDelimited => get_bytes(data, pos).map(|(_, next)| next),
        WireType::StartGroup => {
            if depth == 0 {
                return Err(CodecError::malformed("group", "nesting too deep"));
            }
            let mut cursor = pos;
            loop {
                let (inner_number, inner_type, next) = get_tag(data, cursor)?;
                if inner_type == WireType::EndGroup {
                    if inner_number != number {
                        return Err(CodecError::malformed(
                            "group",
                            format!("end tag {inner_number} does not match start tag {number}"),
                        ));
                    }
                    return Ok(next);
                }
                cursor = skip_value_bounded(data, next, inner_number, inner_type, depth - 1)?;
            }
        }
        WireType::EndGroup => Err(CodecError::malformed("group", "end tag without a start tag")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_varint_known_encodings() {
        #[track_caller]
        fn case(value: u64, expect: &[u8]) {
            let mut buf = Vec::new();
            put_varint(&mut buf, value);
            assert_eq!(buf, expect, "encoding of {value}");
            assert_eq!(size_varint(value), expect.len(), "size of {value}");
            assert_eq!(get_varint(&buf, 0).unwrap(), (value, expect.len()));
        }

        case(0, &[0x00]);
        case(1, &[0x01]);
        case(127, &[0x7F]);
        case(128, &[0x80, 0x01]);
        case(255, &[0xFF, 0x01]);
        case(300, &[0xAC, 0x02]);
        case(
            u64::MAX,
            &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01],
        );
    }

    #[test]
    fn test_varint_truncated() {
        let err = get_varint(&[0x80, 0x80], 0).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    #[test]
    fn test_varint_overflow_eleven_bytes() {
        let data = [0x80u8; 11];
        let err = get_varint(&data, 0).unwrap_err();
        assert!(matches!(err, CodecError::Overflow { .. }));
    }

    #[test]
    fn test_varint_overflow_tenth_byte_too_large() {
        let mut data = vec![0xFFu8; 9];
        data.push(0x02);
        let err = get_varint(&data, 0).unwrap_err();
        assert!(matches!(err, CodecError::Overflow { .. }));
    }

    #[test]
    fn test_zigzag_known_values() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_encode32(-2), 3);
        assert_eq!(zigzag_encode32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_encode64(-1), 1);
        assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);

        assert_eq!(zigzag_decode32(1), -1);
        assert_eq!(zigzag_decode64(2), 1);
    }

    #[test]
    fn test_tag_round_trip() {
        let mut buf = Vec::new();
        put_tag(&mut buf, 1, WireType::Varint);
        assert_eq!(buf, [0x08]);
        assert_eq!(get_tag(&buf, 0).unwrap(), (1, WireType::Varint, 1));

        buf.clear();
        put_tag(&mut buf, 2, WireType::LengthDelimited);
        assert_eq!(buf, [0x12]);

        buf.clear();
        put_tag(&mut buf, FIELD_NUMBER_MAX, WireType::Fixed32);
        let (number, wire_type, _) = get_tag(&buf, 0).unwrap();
        assert_eq!(number, FIELD_NUMBER_MAX);
        assert_eq!(wire_type, WireType::Fixed32);
    }

    #[test]
    fn test_tag_field_number_zero_rejected() {
        // Raw key 0: field number 0, varint wire type.
        let err = get_tag(&[0x00], 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_tag_bad_wire_type_rejected() {
        // Field 1 with wire type 7.
        let err = get_tag(&[0x0F], 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_fixed_round_trips() {
        let mut buf = Vec::new();
        put_fixed32(&mut buf, 0xDEAD_BEEF);
        assert_eq!(buf, [0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(get_fixed32(&buf, 0).unwrap(), (0xDEAD_BEEF, 4));

        buf.clear();
        put_fixed64(&mut buf, 0x0123_4567_89AB_CDEF);
        assert_eq!(get_fixed64(&buf, 0).unwrap(), (0x0123_4567_89AB_CDEF, 8));
    }

    #[test]
    fn test_fixed_truncated() {
        assert!(matches!(
            get_fixed32(&[1, 2, 3], 0).unwrap_err(),
            CodecError::Truncated { .. }
        ));
        assert!(matches!(
            get_fixed64(&[1, 2, 3, 4, 5, 6, 7], 0).unwrap_err(),
            CodecError::Truncated { .. }
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut buf = Vec::new();
        put_bytes(&mut buf, b"hello");
        assert_eq!(buf, [0x05, b'h', b'e', b'l', b'l', b'o']);
        let (payload, next) = get_bytes(&buf, 0).unwrap();
        assert_eq!(payload, b"hello");
        assert_eq!(next, 6);
        assert_eq!(size_bytes(5), 6);
    }

    #[test]
    fn test_bytes_length_past_end() {
        let err = get_bytes(&[0x05, b'h', b'i'], 0).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    #[test]
    fn test_skip_simple_values() {
        // varint
        assert_eq!(skip_value(&[0xAC, 0x02, 0xFF], 0, 1, WireType::Varint).unwrap(), 2);
        // fixed32 / fixed64
        assert_eq!(skip_value(&[0; 4], 0, 1, WireType::Fixed32).unwrap(), 4);
        assert_eq!(skip_value(&[0; 8], 0, 1, WireType::Fixed64).unwrap(), 8);
        // length-delimited
        assert_eq!(
            skip_value(&[0x03, 1, 2, 3, 9], 0, 1, WireType::LengthDelimited).unwrap(),
            4
        );
    }

    #[test]
    fn test_skip_group_with_nesting() {
        // group 2 { field 1 varint 5; group 3 {} } end
        let mut data = Vec::new();
        put_tag(&mut data, 1, WireType::Varint);
        put_varint(&mut data, 5);
        put_tag(&mut data, 3, WireType::StartGroup);
        put_tag(&mut data, 3, WireType::EndGroup);
        put_tag(&mut data, 2, WireType::EndGroup);
        let end = data.len();
        data.push(0xAA); // trailing byte beyond the group

        assert_eq!(skip_value(&data, 0, 2, WireType::StartGroup).unwrap(), end);
    }

    #[test]
    fn test_skip_group_mismatched_end_tag() {
        let mut data = Vec::new();
        put_tag(&mut data, 7, WireType::EndGroup);
        let err = skip_value(&data, 0, 2, WireType::StartGroup).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_skip_stray_end_group() {
        let err = skip_value(&[], 0, 1, WireType::EndGroup).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_wire_type_for_kind() {
        assert_eq!(WireType::for_kind(Kind::SInt32), WireType::Varint);
        assert_eq!(WireType::for_kind(Kind::Double), WireType::Fixed64);
        assert_eq!(WireType::for_kind(Kind::Float), WireType::Fixed32);
        assert_eq!(WireType::for_kind(Kind::Message), WireType::LengthDelimited);
        assert_eq!(WireType::for_kind(Kind::Group), WireType::StartGroup);
    }

    proptest! {
        #[test]
        fn proptest_varint_round_trip(value: u64) {
            let mut buf = Vec::new();
            put_varint(&mut buf, value);
            prop_assert_eq!(buf.len(), size_varint(value));
            let (decoded, next) = get_varint(&buf, 0).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(next, buf.len());
        }

        #[test]
        fn proptest_zigzag_round_trip(v32: i32, v64: i64) {
            prop_assert_eq!(zigzag_decode32(zigzag_encode32(v32)), v32);
            prop_assert_eq!(zigzag_decode64(zigzag_encode64(v64)), v64);
        }

        #[test]
        fn proptest_tag_round_trip(number in FIELD_NUMBER_MIN..=FIELD_NUMBER_MAX, raw in 0u8..=5) {
            let wire_type = WireType::from_raw(raw).unwrap();
            let mut buf = Vec::new();
            put_tag(&mut buf, number, wire_type);
            prop_assert_eq!(buf.len(), size_tag(number));
            let (n, w, next) = get_tag(&buf, 0).unwrap();
            prop_assert_eq!(n, number);
            prop_assert_eq!(w, wire_type);
            prop_assert_eq!(next, buf.len());
        }

        #[test]
        fn proptest_fixed_round_trip(v32: u32, v64: u64) {
            let mut buf = Vec::new();
            put_fixed32(&mut buf, v32);
            prop_assert_eq!(get_fixed32(&buf, 0).unwrap(), (v32, 4));
            buf.clear();
            put_fixed64(&mut buf, v64);
            prop_assert_eq!(get_fixed64(&buf, 0).unwrap(), (v64, 8));
        }
    }
}
