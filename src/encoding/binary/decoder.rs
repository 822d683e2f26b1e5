// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary wire-format decoder.
//!
//! Unmarshal consumes tagged records in stream order and routes each one
//! through the coder table: known fields decode into the message, extension
//! numbers resolve through the registry, and everything else lands verbatim
//! in the unknown-field buffer. A known field whose record carries an
//! unexpected wire type also goes to the unknown buffer (receiver
//! tolerance), with one deliberate exception: repeated scalars of packable
//! kinds accept both their element wire type and a packed block.

use std::sync::Arc;

use crate::core::error::{CodecError, Result};
use crate::core::message::DynamicMessage;
use crate::core::value::{MapKey, Value};
use crate::encoding::table::{CoderMode, FieldCoder, TableCache};
use crate::encoding::wire::{
    get_bytes, get_fixed32, get_fixed64, get_tag, get_varint, skip_value, zigzag_decode32,
    zigzag_decode64, WireType,
};
use crate::schema::model::{
    FieldDescriptor, Kind, MessageDescriptor, MESSAGE_SET_ITEM_NUMBER, MESSAGE_SET_MESSAGE_NUMBER,
    MESSAGE_SET_TYPE_ID_NUMBER,
};
use crate::schema::registry::SchemaRegistry;

/// Options for binary unmarshal.
#[derive(Debug, Clone)]
pub struct UnmarshalOptions {
    /// Skip required-field validation.
    pub allow_partial: bool,
    /// Drop unknown fields instead of preserving them.
    pub discard_unknown: bool,
    /// Maximum message nesting depth.
    pub recursion_limit: u32,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        Self {
            allow_partial: false,
            discard_unknown: false,
            recursion_limit: 100,
        }
    }
}

pub(crate) struct Decoder<'a> {
    pub tables: &'a TableCache,
    pub registry: &'a SchemaRegistry,
    pub options: &'a UnmarshalOptions,
}

impl Decoder<'_> {
    /// Decode `data` into `message`, merging with anything already set.
    pub fn decode(&self, data: &[u8], message: &mut DynamicMessage) -> Result<()> {
        let end = self.decode_fields(data, 0, message, None, self.options.recursion_limit)?;
        debug_assert_eq!(end, data.len());
        Ok(())
    }

    /// Consume records starting at `pos`. With `group` unset this runs to
    /// the end of `data` (top level or a length-delimited body); with
    /// `group` set it stops after the matching end tag. Returns the
    /// position after the consumed input.
    fn decode_fields(
        &self,
        data: &[u8],
        pos: usize,
        message: &mut DynamicMessage,
        group: Option<u32>,
        depth: u32,
    ) -> Result<usize> {
        if depth == 0 {
            return Err(CodecError::malformed("message", "nesting too deep"));
        }
        let table = self.tables.table_for(message.descriptor(), self.registry)?;
        if table.message_set {
            return self.decode_message_set_fields(data, pos, message, group, depth);
        }

        let mut pos = pos;
        while pos < data.len() {
            let record_start = pos;
            let (number, wire_type, next) = get_tag(data, pos)?;
            if wire_type == WireType::EndGroup {
                return end_group(group, number, next);
            }

            pos = if let Some(coder) = table.coder(number) {
                self.decode_known(data, record_start, next, message, coder, wire_type, depth)?
            } else if let Some(ext) = self.registry.extension(&table.full_name, number) {
                let coder = self.tables.extension_coder(&ext, self.registry)?;
                self.decode_extension(data, record_start, next, message, &ext, &coder, wire_type, depth)?
            } else {
                self.capture_unknown(data, record_start, next, number, wire_type, message)?
            };
        }

        match group {
            None => Ok(pos),
            Some(_) => Err(CodecError::truncated(1, 0, pos)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_known(
        &self,
        data: &[u8],
        record_start: usize,
        value_start: usize,
        message: &mut DynamicMessage,
        coder: &FieldCoder,
        wire_type: WireType,
        depth: u32,
    ) -> Result<usize> {
        let number = coder.field.number;
        if !accepts_wire_type(coder, wire_type) {
            return self.capture_unknown(data, record_start, value_start, number, wire_type, message);
        }
        let existing = message.clear(number);
        let (value, next) =
            self.decode_value(data, value_start, existing, coder, wire_type, depth)?;
        message.set(number, value)?;
        Ok(next)
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_extension(
        &self,
        data: &[u8],
        record_start: usize,
        value_start: usize,
        message: &mut DynamicMessage,
        ext: &Arc<FieldDescriptor>,
        coder: &FieldCoder,
        wire_type: WireType,
        depth: u32,
    ) -> Result<usize> {
        if !accepts_wire_type(coder, wire_type) {
            return self.capture_unknown(
                data,
                record_start,
                value_start,
                ext.number,
                wire_type,
                message,
            );
        }
        let existing = message.clear_extension(ext.number).map(|e| e.value);
        let (value, next) =
            self.decode_value(data, value_start, existing, coder, wire_type, depth)?;
        message.set_extension(Arc::clone(ext), value)?;
        Ok(next)
    }

    /// Decode one record's value, merging into `existing` where the field's
    /// semantics call for it. Returns the value to store and the position
    /// after the record.
    fn decode_value(
        &self,
        data: &[u8],
        pos: usize,
        existing: Option<Value>,
        coder: &FieldCoder,
        wire_type: WireType,
        depth: u32,
    ) -> Result<(Value, usize)> {
        let kind = coder.field.kind;
        let name = coder.field.full_name.as_str();

        match &coder.mode {
            CoderMode::Scalar | CoderMode::ImplicitScalar => decode_scalar(kind, data, pos, name),
            CoderMode::RepeatedScalar => {
                let mut list = match existing {
                    Some(Value::List(list)) => list,
                    _ => Vec::new(),
                };
                let next = if wire_type == WireType::LengthDelimited && kind.is_packable() {
                    let (block, next) = get_bytes(data, pos)?;
                    let mut block_pos = 0;
                    while block_pos < block.len() {
                        let (element, after) = decode_scalar(kind, block, block_pos, name)?;
                        list.push(element);
                        block_pos = after;
                    }
                    next
                } else {
                    let (element, next) = decode_scalar(kind, data, pos, name)?;
                    list.push(element);
                    next
                };
                Ok((Value::List(list), next))
            }
            CoderMode::Message => {
                let (body, next) = get_bytes(data, pos)?;
                let mut sub = self.take_or_new_message(existing, coder)?;
                self.decode_fields(body, 0, &mut sub, None, depth - 1)?;
                Ok((Value::Message(sub), next))
            }
            CoderMode::Group => {
                let mut sub = self.take_or_new_message(existing, coder)?;
                let next =
                    self.decode_fields(data, pos, &mut sub, Some(coder.field.number), depth - 1)?;
                Ok((Value::Message(sub), next))
            }
            CoderMode::RepeatedMessage => {
                let (body, next) = get_bytes(data, pos)?;
                let mut sub = DynamicMessage::new(self.resolve_field_type(&coder.field)?);
                self.decode_fields(body, 0, &mut sub, None, depth - 1)?;
                let mut list = match existing {
                    Some(Value::List(list)) => list,
                    _ => Vec::new(),
                };
                list.push(Value::Message(sub));
                Ok((Value::List(list), next))
            }
            CoderMode::RepeatedGroup => {
                let mut sub = DynamicMessage::new(self.resolve_field_type(&coder.field)?);
                let next =
                    self.decode_fields(data, pos, &mut sub, Some(coder.field.number), depth - 1)?;
                let mut list = match existing {
                    Some(Value::List(list)) => list,
                    _ => Vec::new(),
                };
                list.push(Value::Message(sub));
                Ok((Value::List(list), next))
            }
            CoderMode::Map {
                key_kind,
                value_kind,
                value_type,
            } => {
                let (body, next) = get_bytes(data, pos)?;
                let (key, value) = self.decode_map_entry(
                    body,
                    *key_kind,
                    *value_kind,
                    value_type.as_deref(),
                    name,
                    depth,
                )?;
                let mut map = match existing {
                    Some(Value::Map(map)) => map,
                    _ => Default::default(),
                };
                map.insert(key, value);
                Ok((Value::Map(map), next))
            }
        }
    }

    /// Decode a map entry body. A repeated key or value record inside one
    /// entry follows last-wins; a missing key or value defaults to the
    /// kind's zero.
    fn decode_map_entry(
        &self,
        body: &[u8],
        key_kind: Kind,
        value_kind: Kind,
        value_type: Option<&str>,
        field_name: &str,
        depth: u32,
    ) -> Result<(MapKey, Value)> {
        let mut key = MapKey::zero(key_kind).ok_or_else(|| {
            CodecError::malformed(
                "map entry",
                format!("kind {} cannot key a map", key_kind.name()),
            )
        })?;
        let mut value = match Value::zero(value_kind) {
            Some(zero) => zero,
            None => Value::Message(DynamicMessage::new(self.resolve_type_name(value_type, field_name)?)),
        };

        let mut pos = 0;
        while pos < body.len() {
            let (number, wire_type, next) = get_tag(body, pos)?;
            match number {
                1 => {
                    let expected = WireType::for_kind(key_kind);
                    if wire_type != expected {
                        return Err(CodecError::wire_type_mismatch(
                            format!("{field_name}.key"),
                            expected.raw(),
                            wire_type.raw(),
                        ));
                    }
                    let (decoded, after) =
                        decode_scalar(key_kind, body, next, field_name)?;
                    key = MapKey::from_value(decoded).ok_or_else(|| {
                        CodecError::malformed(
                            "map entry",
                            format!("kind {} cannot key a map", key_kind.name()),
                        )
                    })?;
                    pos = after;
                }
                2 => {
                    if value_kind.is_composite() {
                        if wire_type != WireType::LengthDelimited {
                            return Err(CodecError::wire_type_mismatch(
                                format!("{field_name}.value"),
                                WireType::LengthDelimited.raw(),
                                wire_type.raw(),
                            ));
                        }
                        let (sub_body, after) = get_bytes(body, next)?;
                        let mut sub = DynamicMessage::new(
                            self.resolve_type_name(value_type, field_name)?,
                        );
                        self.decode_fields(sub_body, 0, &mut sub, None, depth - 1)?;
                        value = Value::Message(sub);
                        pos = after;
                    } else {
                        let expected = WireType::for_kind(value_kind);
                        if wire_type != expected {
                            return Err(CodecError::wire_type_mismatch(
                                format!("{field_name}.value"),
                                expected.raw(),
                                wire_type.raw(),
                            ));
                        }
                        let (decoded, after) =
                            decode_scalar(value_kind, body, next, field_name)?;
                        value = decoded;
                        pos = after;
                    }
                }
                _ => {
                    pos = skip_value(body, next, number, wire_type)?;
                }
            }
        }
        Ok((key, value))
    }

    /// Message-set wire layout: items are groups at field 1 holding a
    /// varint `type_id` and a length-prefixed `message`, tolerated in
    /// either order. Items with an unresolvable type id are preserved
    /// verbatim as unknown fields.
    fn decode_message_set_fields(
        &self,
        data: &[u8],
        pos: usize,
        message: &mut DynamicMessage,
        group: Option<u32>,
        depth: u32,
    ) -> Result<usize> {
        let mut pos = pos;
        while pos < data.len() {
            let record_start = pos;
            let (number, wire_type, next) = get_tag(data, pos)?;
            if wire_type == WireType::EndGroup {
                return end_group(group, number, next);
            }
            pos = if number == MESSAGE_SET_ITEM_NUMBER && wire_type == WireType::StartGroup {
                self.decode_message_set_item(data, record_start, next, message, depth)?
            } else {
                self.capture_unknown(data, record_start, next, number, wire_type, message)?
            };
        }
        match group {
            None => Ok(pos),
            Some(_) => Err(CodecError::truncated(1, 0, pos)),
        }
    }

    fn decode_message_set_item(
        &self,
        data: &[u8],
        item_start: usize,
        pos: usize,
        message: &mut DynamicMessage,
        depth: u32,
    ) -> Result<usize> {
        let mut type_id: Option<u32> = None;
        let mut payload: Option<&[u8]> = None;

        let mut pos = pos;
        let item_end = loop {
            if pos >= data.len() {
                return Err(CodecError::truncated(1, 0, pos));
            }
            let (number, wire_type, next) = get_tag(data, pos)?;
            match (number, wire_type) {
                (MESSAGE_SET_ITEM_NUMBER, WireType::EndGroup) => break next,
                (_, WireType::EndGroup) => {
                    return Err(CodecError::malformed(
                        "group",
                        format!("end tag {number} does not match start tag {MESSAGE_SET_ITEM_NUMBER}"),
                    ))
                }
                (MESSAGE_SET_TYPE_ID_NUMBER, WireType::Varint) => {
                    let (id, after) = get_varint(data, next)?;
                    type_id = Some(id as u32);
                    pos = after;
                }
                (MESSAGE_SET_MESSAGE_NUMBER, WireType::LengthDelimited) => {
                    let (body, after) = get_bytes(data, next)?;
                    payload = Some(body);
                    pos = after;
                }
                _ => {
                    pos = skip_value(data, next, number, wire_type)?;
                }
            }
        };

        let extendee = message.descriptor().full_name.clone();
        if let (Some(id), Some(body)) = (type_id, payload) {
            if let Some(ext) = self.registry.extension(&extendee, id) {
                let mut sub = match message.clear_extension(id).map(|e| e.value) {
                    Some(Value::Message(existing)) => existing,
                    _ => DynamicMessage::new(self.resolve_field_type(&ext)?),
                };
                self.decode_fields(body, 0, &mut sub, None, depth - 1)?;
                message.set_extension(ext, Value::Message(sub))?;
                return Ok(item_end);
            }
        }

        if !self.options.discard_unknown {
            message.append_unknown(&data[item_start..item_end]);
        }
        Ok(item_end)
    }

    fn capture_unknown(
        &self,
        data: &[u8],
        record_start: usize,
        value_start: usize,
        number: u32,
        wire_type: WireType,
        message: &mut DynamicMessage,
    ) -> Result<usize> {
        let end = skip_value(data, value_start, number, wire_type)?;
        if !self.options.discard_unknown {
            message.append_unknown(&data[record_start..end]);
        }
        Ok(end)
    }

    fn take_or_new_message(
        &self,
        existing: Option<Value>,
        coder: &FieldCoder,
    ) -> Result<DynamicMessage> {
        match existing {
            Some(Value::Message(message)) => Ok(message),
            _ => Ok(DynamicMessage::new(self.resolve_field_type(&coder.field)?)),
        }
    }

    fn resolve_field_type(&self, field: &FieldDescriptor) -> Result<Arc<MessageDescriptor>> {
        self.resolve_type_name(field.type_name.as_deref(), &field.full_name)
    }

    fn resolve_type_name(
        &self,
        type_name: Option<&str>,
        field_name: &str,
    ) -> Result<Arc<MessageDescriptor>> {
        let type_name = type_name.ok_or_else(|| {
            CodecError::malformed(
                "descriptor",
                format!("field '{field_name}' has no type name"),
            )
        })?;
        self.registry
            .message(type_name)
            .ok_or_else(|| CodecError::resolve_failure(type_name))
    }
}

/// Whether a record with this wire type may decode into the field at all;
/// anything else falls through to the unknown-field buffer.
fn accepts_wire_type(coder: &FieldCoder, wire_type: WireType) -> bool {
    wire_type == coder.wire_type
        || (matches!(coder.mode, CoderMode::RepeatedScalar)
            && coder.field.kind.is_packable()
            && wire_type == WireType::LengthDelimited)
}

fn end_group(group: Option<u32>, number: u32, next: usize) -> Result<usize> {
    match group {
        Some(open) if open == number => Ok(next),
        Some(open) => Err(CodecError::malformed(
            "group",
            format!("end tag {number} does not match start tag {open}"),
        )),
        None => Err(CodecError::malformed("group", "end tag without a start tag")),
    }
}

/// Decode one scalar value of `kind` at `pos`.
pub(crate) fn decode_scalar(
    kind: Kind,
    data: &[u8],
    pos: usize,
    field: &str,
) -> Result<(Value, usize)> {
    let (value, next) = match kind {
        Kind::Bool => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Bool(v != 0), next)
        }
        Kind::Int32 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Int32(v as i32), next)
        }
        Kind::Int64 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Int64(v as i64), next)
        }
        Kind::UInt32 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::UInt32(v as u32), next)
        }
        Kind::UInt64 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::UInt64(v), next)
        }
        Kind::SInt32 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Int32(zigzag_decode32(v as u32)), next)
        }
        Kind::SInt64 => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Int64(zigzag_decode64(v)), next)
        }
        Kind::Enum => {
            let (v, next) = get_varint(data, pos)?;
            (Value::Enum(v as i32), next)
        }
        Kind::Fixed32 => {
            let (v, next) = get_fixed32(data, pos)?;
            (Value::UInt32(v), next)
        }
        Kind::SFixed32 => {
            let (v, next) = get_fixed32(data, pos)?;
            (Value::Int32(v as i32), next)
        }
        Kind::Float => {
            let (v, next) = get_fixed32(data, pos)?;
            (Value::Float(f32::from_bits(v)), next)
        }
        Kind::Fixed64 => {
            let (v, next) = get_fixed64(data, pos)?;
            (Value::UInt64(v), next)
        }
        Kind::SFixed64 => {
            let (v, next) = get_fixed64(data, pos)?;
            (Value::Int64(v as i64), next)
        }
        Kind::Double => {
            let (v, next) = get_fixed64(data, pos)?;
            (Value::Double(f64::from_bits(v)), next)
        }
        Kind::String => {
            let (bytes, next) = get_bytes(data, pos)?;
            let text = std::str::from_utf8(bytes).map_err(|_| {
                CodecError::malformed("string", format!("field '{field}' holds invalid UTF-8"))
            })?;
            (Value::String(text.to_string()), next)
        }
        Kind::Bytes => {
            let (bytes, next) = get_bytes(data, pos)?;
            (Value::Bytes(bytes.to_vec()), next)
        }
        Kind::Message | Kind::Group => {
            return Err(CodecError::malformed(
                "message",
                format!("field '{field}': composite kind in scalar position"),
            ))
        }
    };
    Ok((value, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalar_varint_kinds() {
        let data = [0xFF, 0x01];
        assert_eq!(
            decode_scalar(Kind::Int32, &data, 0, "f").unwrap(),
            (Value::Int32(255), 2)
        );
        assert_eq!(
            decode_scalar(Kind::UInt32, &data, 0, "f").unwrap(),
            (Value::UInt32(255), 2)
        );
        // Zig-zag: 255 decodes to -128.
        assert_eq!(
            decode_scalar(Kind::SInt32, &data, 0, "f").unwrap(),
            (Value::Int32(-128), 2)
        );
        assert_eq!(
            decode_scalar(Kind::Bool, &[0x01], 0, "f").unwrap(),
            (Value::Bool(true), 1)
        );
    }

    #[test]
    fn test_decode_scalar_sign_extended_negative_int32() {
        // -123 as a ten-byte sign-extended varint.
        let mut data = Vec::new();
        crate::encoding::wire::put_varint(&mut data, (-123i64) as u64);
        assert_eq!(data.len(), 10);
        assert_eq!(
            decode_scalar(Kind::Int32, &data, 0, "f").unwrap(),
            (Value::Int32(-123), 10)
        );
    }

    #[test]
    fn test_decode_scalar_fixed_kinds() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        assert_eq!(
            decode_scalar(Kind::Float, &data, 0, "f").unwrap(),
            (Value::Float(1.5), 4)
        );

        let mut data = Vec::new();
        data.extend_from_slice(&(-7i64 as u64).to_le_bytes());
        assert_eq!(
            decode_scalar(Kind::SFixed64, &data, 0, "f").unwrap(),
            (Value::Int64(-7), 8)
        );
    }

    #[test]
    fn test_decode_scalar_string_utf8_validation() {
        let data = [0x02, 0xFF, 0xFE];
        let err = decode_scalar(Kind::String, &data, 0, "f").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));

        // The same bytes are fine for the bytes kind.
        assert_eq!(
            decode_scalar(Kind::Bytes, &data, 0, "f").unwrap(),
            (Value::Bytes(vec![0xFF, 0xFE]), 3)
        );
    }

    #[test]
    fn test_end_group_matching() {
        assert_eq!(end_group(Some(3), 3, 10).unwrap(), 10);
        assert!(end_group(Some(3), 4, 10).is_err());
        assert!(end_group(None, 3, 10).is_err());
    }
}
