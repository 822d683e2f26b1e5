// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary wire-format encoder.
//!
//! Marshal is two-pass: an exact size pass over the coder table, one
//! allocation, then an append pass that mirrors the size pass shape for
//! shape. Output order is fixed: declared fields by ascending number, then
//! extensions by ascending number, then unknown bytes verbatim.

use crate::core::error::{CodecError, Result};
use crate::core::message::{DynamicMessage, ExtensionField};
use crate::core::value::{MapKey, Value};
use crate::encoding::table::{CoderMode, FieldCoder, TableCache};
use crate::encoding::wire::{
    put_bytes, put_fixed32, put_fixed64, put_tag, put_varint, size_bytes, size_tag, size_varint,
    zigzag_encode32, zigzag_encode64, WireType,
};
use crate::schema::model::{
    Kind, MESSAGE_SET_ITEM_NUMBER, MESSAGE_SET_MESSAGE_NUMBER, MESSAGE_SET_TYPE_ID_NUMBER,
};
use crate::schema::registry::SchemaRegistry;

/// Options for binary marshal.
#[derive(Debug, Clone, Default)]
pub struct MarshalOptions {
    /// Skip required-field validation.
    pub allow_partial: bool,
    /// Request byte-for-byte reproducible output. Map entries always emit
    /// in key order here, so this documents the guarantee rather than
    /// switching behavior.
    pub deterministic: bool,
}

pub(crate) struct Encoder<'a> {
    pub tables: &'a TableCache,
    pub registry: &'a SchemaRegistry,
}

impl Encoder<'_> {
    /// Encode a message: exact size pass, single allocation, append pass.
    pub fn encode(&self, message: &DynamicMessage) -> Result<Vec<u8>> {
        let size = self.size_message(message)?;
        let mut buf = Vec::with_capacity(size);
        self.append_message(&mut buf, message)?;
        debug_assert_eq!(buf.len(), size, "size pass disagrees with append pass");
        Ok(buf)
    }

    pub fn size_message(&self, message: &DynamicMessage) -> Result<usize> {
        let table = self.tables.table_for(message.descriptor(), self.registry)?;
        let mut total = 0;

        for (number, value) in message.fields() {
            let coder = table.coder(number).ok_or_else(|| {
                CodecError::malformed(
                    "message",
                    format!("no coder for field {number} of {}", table.full_name),
                )
            })?;
            total += self.size_field(coder, value)?;
        }

        for ext in message.extensions() {
            if table.message_set {
                total += self.size_message_set_item(ext)?;
            } else {
                let coder = self
                    .tables
                    .extension_coder(&ext.descriptor, self.registry)?;
                total += self.size_field(&coder, &ext.value)?;
            }
        }

        total += message.unknown().len();
        Ok(total)
    }

    pub fn append_message(&self, buf: &mut Vec<u8>, message: &DynamicMessage) -> Result<()> {
        let table = self.tables.table_for(message.descriptor(), self.registry)?;

        for (number, value) in message.fields() {
            let coder = table.coder(number).ok_or_else(|| {
                CodecError::malformed(
                    "message",
                    format!("no coder for field {number} of {}", table.full_name),
                )
            })?;
            self.append_field(buf, coder, value)?;
        }

        for ext in message.extensions() {
            if table.message_set {
                self.append_message_set_item(buf, ext)?;
            } else {
                let coder = self
                    .tables
                    .extension_coder(&ext.descriptor, self.registry)?;
                self.append_field(buf, &coder, &ext.value)?;
            }
        }

        buf.extend_from_slice(message.unknown());
        Ok(())
    }

    fn size_field(&self, coder: &FieldCoder, value: &Value) -> Result<usize> {
        let number = coder.field.number;
        let name = coder.field.full_name.as_str();

        match &coder.mode {
            CoderMode::ImplicitScalar if value.is_zero() => Ok(0),
            CoderMode::Scalar | CoderMode::ImplicitScalar => {
                Ok(size_tag(number) + size_scalar(coder.field.kind, value, name)?)
            }
            CoderMode::Message => {
                let sub = expect_message(value, name)?;
                Ok(size_tag(number) + size_bytes(self.size_message(sub)?))
            }
            CoderMode::Group => {
                let sub = expect_message(value, name)?;
                Ok(2 * size_tag(number) + self.size_message(sub)?)
            }
            CoderMode::RepeatedScalar => {
                let list = expect_list(value, name)?;
                if coder.packed {
                    if list.is_empty() {
                        return Ok(0);
                    }
                    let mut payload = 0;
                    for element in list {
                        payload += size_scalar(coder.field.kind, element, name)?;
                    }
                    Ok(size_tag(number) + size_bytes(payload))
                } else {
                    let mut total = 0;
                    for element in list {
                        total += size_tag(number) + size_scalar(coder.field.kind, element, name)?;
                    }
                    Ok(total)
                }
            }
            CoderMode::RepeatedMessage => {
                let list = expect_list(value, name)?;
                let mut total = 0;
                for element in list {
                    let sub = expect_message(element, name)?;
                    total += size_tag(number) + size_bytes(self.size_message(sub)?);
                }
                Ok(total)
            }
            CoderMode::RepeatedGroup => {
                let list = expect_list(value, name)?;
                let mut total = 0;
                for element in list {
                    let sub = expect_message(element, name)?;
                    total += 2 * size_tag(number) + self.size_message(sub)?;
                }
                Ok(total)
            }
            CoderMode::Map {
                key_kind,
                value_kind,
                ..
            } => {
                let map = expect_map(value, name)?;
                let mut total = 0;
                for (key, entry_value) in map {
                    let entry = self.size_map_entry(*key_kind, key, *value_kind, entry_value, name)?;
                    total += size_tag(number) + size_bytes(entry);
                }
                Ok(total)
            }
        }
    }

    fn append_field(&self, buf: &mut Vec<u8>, coder: &FieldCoder, value: &Value) -> Result<()> {
        let number = coder.field.number;
        let name = coder.field.full_name.as_str();

        match &coder.mode {
            CoderMode::ImplicitScalar if value.is_zero() => Ok(()),
            CoderMode::Scalar | CoderMode::ImplicitScalar => {
                put_tag(buf, number, coder.wire_type);
                append_scalar(buf, coder.field.kind, value, name)
            }
            CoderMode::Message => {
                let sub = expect_message(value, name)?;
                put_tag(buf, number, WireType::LengthDelimited);
                put_varint(buf, self.size_message(sub)? as u64);
                self.append_message(buf, sub)
            }
            CoderMode::Group => {
                let sub = expect_message(value, name)?;
                put_tag(buf, number, WireType::StartGroup);
                self.append_message(buf, sub)?;
                put_tag(buf, number, WireType::EndGroup);
                Ok(())
            }
            CoderMode::RepeatedScalar => {
                let list = expect_list(value, name)?;
                if coder.packed {
                    if list.is_empty() {
                        return Ok(());
                    }
                    let mut payload = 0;
                    for element in list {
                        payload += size_scalar(coder.field.kind, element, name)?;
                    }
                    put_tag(buf, number, WireType::LengthDelimited);
                    put_varint(buf, payload as u64);
                    for element in list {
                        append_scalar(buf, coder.field.kind, element, name)?;
                    }
                } else {
                    for element in list {
                        put_tag(buf, number, coder.wire_type);
                        append_scalar(buf, coder.field.kind, element, name)?;
                    }
                }
                Ok(())
            }
            CoderMode::RepeatedMessage => {
                let list = expect_list(value, name)?;
                for element in list {
                    let sub = expect_message(element, name)?;
                    put_tag(buf, number, WireType::LengthDelimited);
                    put_varint(buf, self.size_message(sub)? as u64);
                    self.append_message(buf, sub)?;
                }
                Ok(())
            }
            CoderMode::RepeatedGroup => {
                let list = expect_list(value, name)?;
                for element in list {
                    let sub = expect_message(element, name)?;
                    put_tag(buf, number, WireType::StartGroup);
                    self.append_message(buf, sub)?;
                    put_tag(buf, number, WireType::EndGroup);
                }
                Ok(())
            }
            CoderMode::Map {
                key_kind,
                value_kind,
                ..
            } => {
                let map = expect_map(value, name)?;
                for (key, entry_value) in map {
                    let entry = self.size_map_entry(*key_kind, key, *value_kind, entry_value, name)?;
                    put_tag(buf, number, WireType::LengthDelimited);
                    put_varint(buf, entry as u64);
                    self.append_map_entry(buf, *key_kind, key, *value_kind, entry_value, name)?;
                }
                Ok(())
            }
        }
    }

    /// Size of one map entry's body. Default-valued keys and scalar values
    /// are omitted; the receiver fills the kind's zero.
    fn size_map_entry(
        &self,
        key_kind: Kind,
        key: &MapKey,
        value_kind: Kind,
        value: &Value,
        name: &str,
    ) -> Result<usize> {
        let mut total = 0;
        let key_value = key.to_value();
        if !key_value.is_zero() {
            total += size_tag(1) + size_scalar(key_kind, &key_value, name)?;
        }
        if value_kind.is_composite() {
            let sub = expect_message(value, name)?;
            total += size_tag(2) + size_bytes(self.size_message(sub)?);
        } else if !value.is_zero() {
            total += size_tag(2) + size_scalar(value_kind, value, name)?;
        }
        Ok(total)
    }

    fn append_map_entry(
        &self,
        buf: &mut Vec<u8>,
        key_kind: Kind,
        key: &MapKey,
        value_kind: Kind,
        value: &Value,
        name: &str,
    ) -> Result<()> {
        let key_value = key.to_value();
        if !key_value.is_zero() {
            put_tag(buf, 1, WireType::for_kind(key_kind));
            append_scalar(buf, key_kind, &key_value, name)?;
        }
        if value_kind.is_composite() {
            let sub = expect_message(value, name)?;
            put_tag(buf, 2, WireType::LengthDelimited);
            put_varint(buf, self.size_message(sub)? as u64);
            self.append_message(buf, sub)?;
        } else if !value.is_zero() {
            put_tag(buf, 2, WireType::for_kind(value_kind));
            append_scalar(buf, value_kind, value, name)?;
        }
        Ok(())
    }

    /// Size of one message-set item: a group at field 1 holding a varint
    /// `type_id` and a length-prefixed `message`.
    fn size_message_set_item(&self, ext: &ExtensionField) -> Result<usize> {
        let sub = expect_message(&ext.value, &ext.descriptor.full_name)?;
        Ok(2 * size_tag(MESSAGE_SET_ITEM_NUMBER)
            + size_tag(MESSAGE_SET_TYPE_ID_NUMBER)
            + size_varint(ext.descriptor.number as u64)
            + size_tag(MESSAGE_SET_MESSAGE_NUMBER)
            + size_bytes(self.size_message(sub)?))
    }

    fn append_message_set_item(&self, buf: &mut Vec<u8>, ext: &ExtensionField) -> Result<()> {
        let sub = expect_message(&ext.value, &ext.descriptor.full_name)?;
        put_tag(buf, MESSAGE_SET_ITEM_NUMBER, WireType::StartGroup);
        put_tag(buf, MESSAGE_SET_TYPE_ID_NUMBER, WireType::Varint);
        put_varint(buf, ext.descriptor.number as u64);
        put_tag(buf, MESSAGE_SET_MESSAGE_NUMBER, WireType::LengthDelimited);
        put_varint(buf, self.size_message(sub)? as u64);
        self.append_message(buf, sub)?;
        put_tag(buf, MESSAGE_SET_ITEM_NUMBER, WireType::EndGroup);
        Ok(())
    }
}

/// Encoded size of one scalar value, tag excluded.
pub(crate) fn size_scalar(kind: Kind, value: &Value, name: &str) -> Result<usize> {
    let size = match (kind, value) {
        (Kind::Bool, Value::Bool(v)) => size_varint(*v as u64),
        (Kind::Int32, Value::Int32(v)) => size_varint(*v as i64 as u64),
        (Kind::Int64, Value::Int64(v)) => size_varint(*v as u64),
        (Kind::UInt32, Value::UInt32(v)) => size_varint(*v as u64),
        (Kind::UInt64, Value::UInt64(v)) => size_varint(*v),
        (Kind::SInt32, Value::Int32(v)) => size_varint(zigzag_encode32(*v) as u64),
        (Kind::SInt64, Value::Int64(v)) => size_varint(zigzag_encode64(*v)),
        (Kind::Enum, Value::Enum(v) | Value::Int32(v)) => size_varint(*v as i64 as u64),
        (Kind::Fixed32, Value::UInt32(_))
        | (Kind::SFixed32, Value::Int32(_))
        | (Kind::Float, Value::Float(_)) => 4,
        (Kind::Fixed64, Value::UInt64(_))
        | (Kind::SFixed64, Value::Int64(_))
        | (Kind::Double, Value::Double(_)) => 8,
        (Kind::String, Value::String(s)) => size_bytes(s.len()),
        (Kind::Bytes, Value::Bytes(b)) => size_bytes(b.len()),
        _ => return Err(shape_mismatch(kind, value, name)),
    };
    Ok(size)
}

/// Append one scalar value, tag excluded. Mirrors [`size_scalar`].
pub(crate) fn append_scalar(buf: &mut Vec<u8>, kind: Kind, value: &Value, name: &str) -> Result<()> {
    match (kind, value) {
        (Kind::Bool, Value::Bool(v)) => put_varint(buf, *v as u64),
        (Kind::Int32, Value::Int32(v)) => put_varint(buf, *v as i64 as u64),
        (Kind::Int64, Value::Int64(v)) => put_varint(buf, *v as u64),
        (Kind::UInt32, Value::UInt32(v)) => put_varint(buf, *v as u64),
        (Kind::UInt64, Value::UInt64(v)) => put_varint(buf, *v),
        (Kind::SInt32, Value::Int32(v)) => put_varint(buf, zigzag_encode32(*v) as u64),
        (Kind::SInt64, Value::Int64(v)) => put_varint(buf, zigzag_encode64(*v)),
        (Kind::Enum, Value::Enum(v) | Value::Int32(v)) => put_varint(buf, *v as i64 as u64),
        (Kind::Fixed32, Value::UInt32(v)) => put_fixed32(buf, *v),
        (Kind::SFixed32, Value::Int32(v)) => put_fixed32(buf, *v as u32),
        (Kind::Float, Value::Float(v)) => put_fixed32(buf, v.to_bits()),
        (Kind::Fixed64, Value::UInt64(v)) => put_fixed64(buf, *v),
        (Kind::SFixed64, Value::Int64(v)) => put_fixed64(buf, *v as u64),
        (Kind::Double, Value::Double(v)) => put_fixed64(buf, v.to_bits()),
        (Kind::String, Value::String(s)) => put_bytes(buf, s.as_bytes()),
        (Kind::Bytes, Value::Bytes(b)) => put_bytes(buf, b),
        _ => return Err(shape_mismatch(kind, value, name)),
    }
    Ok(())
}

fn shape_mismatch(kind: Kind, value: &Value, name: &str) -> CodecError {
    CodecError::malformed(
        "message",
        format!(
            "field '{name}' of kind {} holds a {} value",
            kind.name(),
            value.type_name()
        ),
    )
}

pub(crate) fn expect_message<'a>(value: &'a Value, name: &str) -> Result<&'a DynamicMessage> {
    value.as_message().ok_or_else(|| {
        CodecError::malformed(
            "message",
            format!("field '{name}' expects a message value, found {}", value.type_name()),
        )
    })
}

fn expect_list<'a>(value: &'a Value, name: &str) -> Result<&'a [Value]> {
    value.as_list().ok_or_else(|| {
        CodecError::malformed(
            "message",
            format!("field '{name}' expects a list value, found {}", value.type_name()),
        )
    })
}

fn expect_map<'a>(
    value: &'a Value,
    name: &str,
) -> Result<&'a std::collections::BTreeMap<MapKey, Value>> {
    value.as_map().ok_or_else(|| {
        CodecError::malformed(
            "message",
            format!("field '{name}' expects a map value, found {}", value.type_name()),
        )
    })
}
