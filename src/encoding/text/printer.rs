// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Text-format printer.
//!
//! Emits declared fields in field-number order, then extensions sorted by
//! their display name, then unknown fields by number. Message values print
//! as `name: { ... }` with two-space indentation by default; an empty
//! indent string collapses the output to a single line. Output always ends
//! with exactly one newline, even for an empty message.

use std::sync::Arc;

use crate::core::error::{CodecError, Result};
use crate::core::message::{DynamicMessage, ExtensionField};
use crate::core::value::{MapKey, Value};
use crate::encoding::binary::{BinaryCodec, UnmarshalOptions};
use crate::encoding::wire::{get_bytes, get_fixed32, get_fixed64, get_tag, get_varint, size_tag, skip_value, WireType};
use crate::schema::model::{
    FieldDescriptor, Kind, MessageDescriptor, ANY_TYPE_URL_NUMBER, ANY_VALUE_NUMBER,
};
use crate::schema::registry::SchemaRegistry;

/// Options for text marshal.
#[derive(Debug, Clone)]
pub struct TextMarshalOptions {
    /// String written per indent level; empty means single-line output.
    pub indent: String,
    /// Skip required-field validation.
    pub allow_partial: bool,
    /// Registry used to expand `Any` payloads by type URL. Without one,
    /// `Any` prints its raw `type_url`/`value` fields.
    pub resolver: Option<Arc<SchemaRegistry>>,
}

impl Default for TextMarshalOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            allow_partial: false,
            resolver: None,
        }
    }
}

pub(crate) struct Printer<'a> {
    pub registry: &'a SchemaRegistry,
    pub binary: &'a BinaryCodec,
    pub options: &'a TextMarshalOptions,
    pub out: String,
}

impl Printer<'_> {
    /// Render a message to text.
    pub fn print(mut self, message: &DynamicMessage) -> Result<String> {
        self.print_entries(message, 0)?;
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        Ok(self.out)
    }

    fn multiline(&self) -> bool {
        !self.options.indent.is_empty()
    }

    fn push_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(&self.options.indent);
        }
    }

    fn begin_entry(&mut self, level: usize, name: &str) {
        if self.multiline() {
            self.push_indent(level);
        } else if !(self.out.is_empty() || self.out.ends_with(' ')) {
            self.out.push(' ');
        }
        self.out.push_str(name);
        self.out.push_str(": ");
    }

    fn end_entry(&mut self) {
        if self.multiline() {
            self.out.push('\n');
        }
    }

    fn print_entries(&mut self, message: &DynamicMessage, level: usize) -> Result<()> {
        if message.descriptor().is_any() {
            if let Some(resolver) = self.options.resolver.clone() {
                if self.try_print_any_expanded(message, level, &resolver)? {
                    return Ok(());
                }
            }
        }

        for (number, value) in message.fields() {
            let field = message.descriptor().field(number).ok_or_else(|| {
                CodecError::malformed(
                    "message",
                    format!(
                        "field number {number} is not declared by {}",
                        message.descriptor().full_name
                    ),
                )
            })?;
            if elided(message.descriptor(), field, value) {
                continue;
            }
            self.print_field(field, value, level)?;
        }

        let message_set = message.descriptor().message_set_wire_format;
        let mut extensions: Vec<&ExtensionField> = message.extensions().collect();
        extensions.sort_by(|a, b| {
            extension_display_name(a, message_set).cmp(&extension_display_name(b, message_set))
        });
        for ext in extensions {
            self.print_extension(ext, message_set, level)?;
        }

        self.print_unknown(message.unknown(), level)
    }

    fn print_field(&mut self, field: &FieldDescriptor, value: &Value, level: usize) -> Result<()> {
        let name = field.group_name().unwrap_or(&field.name).to_string();
        match value {
            Value::List(elements) => {
                for element in elements {
                    self.print_entry(&name, field, element, level)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                let entry_desc = self.map_entry_descriptor(field)?;
                for (key, entry_value) in entries {
                    self.print_map_entry(&name, &entry_desc, key, entry_value, level)?;
                }
                Ok(())
            }
            single => self.print_entry(&name, field, single, level),
        }
    }

    fn print_entry(
        &mut self,
        name: &str,
        field: &FieldDescriptor,
        value: &Value,
        level: usize,
    ) -> Result<()> {
        self.begin_entry(level, name);
        self.write_value(field, value, level)?;
        self.end_entry();
        Ok(())
    }

    fn print_extension(
        &mut self,
        ext: &ExtensionField,
        message_set: bool,
        level: usize,
    ) -> Result<()> {
        let name = format!("[{}]", extension_display_name(ext, message_set));
        match &ext.value {
            Value::List(elements) => {
                for element in elements {
                    self.print_entry(&name, &ext.descriptor, element, level)?;
                }
                Ok(())
            }
            single => self.print_entry(&name, &ext.descriptor, single, level),
        }
    }

    fn print_map_entry(
        &mut self,
        name: &str,
        entry_desc: &MessageDescriptor,
        key: &MapKey,
        value: &Value,
        level: usize,
    ) -> Result<()> {
        let key_field = entry_desc
            .field(1)
            .ok_or_else(|| CodecError::malformed("map entry", "missing key field"))?;
        let value_field = entry_desc
            .field(2)
            .ok_or_else(|| CodecError::malformed("map entry", "missing value field"))?;

        self.begin_entry(level, name);
        self.open_brace();
        self.begin_entry(level + 1, "key");
        self.write_value(key_field, &key.to_value(), level + 1)?;
        self.end_entry();
        self.begin_entry(level + 1, "value");
        self.write_value(value_field, value, level + 1)?;
        self.end_entry();
        self.close_brace(level);
        self.end_entry();
        Ok(())
    }

    fn write_value(&mut self, field: &FieldDescriptor, value: &Value, level: usize) -> Result<()> {
        match field.kind {
            Kind::Message | Kind::Group => {
                let sub = value.as_message().ok_or_else(|| {
                    shape_mismatch(field, value)
                })?;
                self.write_message_value(sub, level)
            }
            Kind::Enum => {
                let number = value.as_i32().ok_or_else(|| shape_mismatch(field, value))?;
                let name = field
                    .type_name
                    .as_deref()
                    .and_then(|t| self.registry.enum_type(t))
                    .and_then(|e| e.value_by_number(number).map(|v| v.name.clone()));
                match name {
                    Some(name) => self.out.push_str(&name),
                    None => self.out.push_str(&number.to_string()),
                }
                Ok(())
            }
            kind => {
                let text = scalar_text(kind, value).ok_or_else(|| shape_mismatch(field, value))?;
                self.out.push_str(&text);
                Ok(())
            }
        }
    }

    fn write_message_value(&mut self, message: &DynamicMessage, level: usize) -> Result<()> {
        if self.nothing_to_print(message) {
            self.out.push_str("{}");
            return Ok(());
        }
        self.open_brace();
        self.print_entries(message, level + 1)?;
        self.close_brace(level);
        Ok(())
    }

    fn open_brace(&mut self) {
        if self.multiline() {
            self.out.push_str("{\n");
        } else {
            self.out.push_str("{ ");
        }
    }

    fn close_brace(&mut self, level: usize) {
        if self.multiline() {
            self.push_indent(level);
            self.out.push('}');
        } else {
            self.out.push_str(" }");
        }
    }

    /// Whether a message renders zero entries: nothing populated, or only
    /// zero-valued fields without presence and empty containers.
    fn nothing_to_print(&self, message: &DynamicMessage) -> bool {
        message.extensions().next().is_none()
            && message.unknown().is_empty()
            && message.fields().all(|(number, value)| {
                message
                    .descriptor()
                    .field(number)
                    .is_some_and(|field| elided(message.descriptor(), field, value))
            })
    }

    /// Expanded `Any` form: `[type_url]: { decoded fields }`. Returns false
    /// (caller falls back to the raw two-field form) when the URL does not
    /// resolve or the payload does not decode.
    fn try_print_any_expanded(
        &mut self,
        message: &DynamicMessage,
        level: usize,
        resolver: &SchemaRegistry,
    ) -> Result<bool> {
        if !message.unknown().is_empty() || message.extensions().next().is_some() {
            return Ok(false);
        }
        let Some(Value::String(url)) = message.get(ANY_TYPE_URL_NUMBER) else {
            return Ok(false);
        };
        if url.is_empty() {
            return Ok(false);
        }
        let payload = match message.get(ANY_VALUE_NUMBER) {
            Some(Value::Bytes(bytes)) => bytes.as_slice(),
            None => &[],
            Some(_) => return Ok(false),
        };
        let Some(descriptor) = resolver.resolve_type_url(url) else {
            return Ok(false);
        };
        let options = UnmarshalOptions {
            allow_partial: true,
            ..Default::default()
        };
        let Ok(decoded) = self.binary.unmarshal_with(payload, &descriptor, &options) else {
            return Ok(false);
        };

        self.begin_entry(level, &format!("[{url}]"));
        self.write_message_value(&decoded, level)?;
        self.end_entry();
        Ok(true)
    }

    /// Unknown records print by field number: varint and fixed records as
    /// unsigned decimals, length-delimited as quoted strings, groups as
    /// nested blocks.
    fn print_unknown(&mut self, data: &[u8], level: usize) -> Result<()> {
        let mut pos = 0;
        while pos < data.len() {
            let (number, wire_type, next) = get_tag(data, pos)?;
            let name = number.to_string();
            match wire_type {
                WireType::Varint => {
                    let (v, after) = get_varint(data, next)?;
                    self.begin_entry(level, &name);
                    self.out.push_str(&v.to_string());
                    self.end_entry();
                    pos = after;
                }
                WireType::Fixed32 => {
                    let (v, after) = get_fixed32(data, next)?;
                    self.begin_entry(level, &name);
                    self.out.push_str(&v.to_string());
                    self.end_entry();
                    pos = after;
                }
                WireType::Fixed64 => {
                    let (v, after) = get_fixed64(data, next)?;
                    self.begin_entry(level, &name);
                    self.out.push_str(&v.to_string());
                    self.end_entry();
                    pos = after;
                }
                WireType::LengthDelimited => {
                    let (bytes, after) = get_bytes(data, next)?;
                    self.begin_entry(level, &name);
                    let quoted = quote_bytes(bytes);
                    self.out.push_str(&quoted);
                    self.end_entry();
                    pos = after;
                }
                WireType::StartGroup => {
                    let end = skip_value(data, next, number, WireType::StartGroup)?;
                    let inner = &data[next..end - size_tag(number)];
                    self.begin_entry(level, &name);
                    if inner.is_empty() {
                        self.out.push_str("{}");
                    } else {
                        self.open_brace();
                        self.print_unknown(inner, level + 1)?;
                        self.close_brace(level);
                    }
                    self.end_entry();
                    pos = end;
                }
                WireType::EndGroup => {
                    return Err(CodecError::malformed(
                        "unknown fields",
                        "end tag without a start tag",
                    ))
                }
            }
        }
        Ok(())
    }

    fn map_entry_descriptor(&self, field: &FieldDescriptor) -> Result<Arc<MessageDescriptor>> {
        let type_name = field.type_name.as_deref().ok_or_else(|| {
            CodecError::malformed(
                "descriptor",
                format!("field '{}' has no type name", field.full_name),
            )
        })?;
        self.registry
            .message(type_name)
            .ok_or_else(|| CodecError::resolve_failure(type_name))
    }
}

/// Whether the field renders no entry at all: a zero value without
/// presence, or an empty container.
fn elided(descriptor: &MessageDescriptor, field: &FieldDescriptor, value: &Value) -> bool {
    match value {
        Value::List(list) => list.is_empty(),
        Value::Map(map) => map.is_empty(),
        value => {
            !field.has_presence(descriptor.syntax) && !field.kind.is_composite() && value.is_zero()
        }
    }
}

/// Name an extension prints under: its message type's full name for a
/// canonical message-set extension, its own full name otherwise.
fn extension_display_name(ext: &ExtensionField, message_set: bool) -> String {
    if message_set && ext.descriptor.is_message_set_extension() {
        if let Some(type_name) = ext.descriptor.type_name.as_deref() {
            return type_name.to_string();
        }
    }
    ext.descriptor.full_name.clone()
}

fn shape_mismatch(field: &FieldDescriptor, value: &Value) -> CodecError {
    CodecError::malformed(
        "message",
        format!(
            "field '{}' of kind {} holds a {} value",
            field.full_name,
            field.kind.name(),
            value.type_name()
        ),
    )
}

/// Canonical text for one scalar value; `None` on a shape mismatch.
pub(crate) fn scalar_text(kind: Kind, value: &Value) -> Option<String> {
    let text = match (kind, value) {
        (Kind::Bool, Value::Bool(v)) => v.to_string(),
        (Kind::Int32 | Kind::SInt32 | Kind::SFixed32, Value::Int32(v)) => v.to_string(),
        (Kind::Int64 | Kind::SInt64 | Kind::SFixed64, Value::Int64(v)) => v.to_string(),
        (Kind::UInt32 | Kind::Fixed32, Value::UInt32(v)) => v.to_string(),
        (Kind::UInt64 | Kind::Fixed64, Value::UInt64(v)) => v.to_string(),
        (Kind::Float, Value::Float(v)) => {
            if v.is_finite() {
                // f32 formats at its own precision; widening first would
                // print the f64 image of the value instead.
                format!("{v}")
            } else {
                float_text(*v as f64, v.is_sign_negative())
            }
        }
        (Kind::Double, Value::Double(v)) => float_text(*v, v.is_sign_negative()),
        (Kind::String, Value::String(v)) => quote_bytes(v.as_bytes()),
        (Kind::Bytes, Value::Bytes(v)) => quote_bytes(v),
        _ => return None,
    };
    Some(text)
}

fn float_text(value: f64, negative: bool) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if negative { "-inf".to_string() } else { "inf".to_string() }
    } else {
        format!("{value}")
    }
}

/// Quote bytes for text output. Valid UTF-8 passes through raw except for
/// control characters, quotes and backslashes; everything else becomes a
/// lowercase `\xhh` escape.
pub(crate) fn quote_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                push_escaped(&mut out, text);
                break;
            }
            Err(err) => {
                let (valid, invalid) = rest.split_at(err.valid_up_to());
                push_escaped(&mut out, std::str::from_utf8(valid).expect("validated prefix"));
                let bad = err.error_len().unwrap_or(invalid.len());
                for &b in &invalid[..bad] {
                    out.push_str(&format!("\\x{b:02x}"));
                }
                rest = &invalid[bad..];
            }
        }
    }
    out.push('"');
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
}
