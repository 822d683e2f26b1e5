// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Text-format parser.
//!
//! Recursive-descent over the token stream: entries are `name ':' value`
//! with the colon optional before message literals, names are field names,
//! group type names, or bracketed extension / `Any` names, and values are
//! scalars, `{}`/`<>` literals, or bracketed lists. Setting a singular
//! field twice, setting two members of one oneof, and naming an undeclared
//! field are all errors; commas and semicolons between entries are skipped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::error::{CodecError, Result};
use crate::core::message::DynamicMessage;
use crate::core::value::{MapKey, Value};
use crate::encoding::binary::{BinaryCodec, MarshalOptions};
use crate::encoding::text::lexer::{Lexer, Token};
use crate::encoding::validate::check_initialized;
use crate::schema::model::{
    FieldDescriptor, Kind, MessageDescriptor, ANY_TYPE_URL_NUMBER, ANY_VALUE_NUMBER,
};
use crate::schema::registry::SchemaRegistry;

/// Options for text unmarshal.
#[derive(Debug, Clone)]
pub struct TextUnmarshalOptions {
    /// Skip required-field validation.
    pub allow_partial: bool,
    /// Maximum message nesting depth.
    pub recursion_limit: u32,
}

impl Default for TextUnmarshalOptions {
    fn default() -> Self {
        Self {
            allow_partial: false,
            recursion_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Closer {
    Brace,
    Angle,
}

/// A parsed value ready to store: either a plain value or one map entry.
enum Parsed {
    Value(Value),
    MapEntry(MapKey, Value),
}

pub(crate) struct Parser<'a> {
    pub lexer: Lexer<'a>,
    pub lookahead: Option<Token>,
    pub registry: &'a SchemaRegistry,
    pub binary: &'a BinaryCodec,
    pub options: &'a TextUnmarshalOptions,
}

impl Parser<'_> {
    /// Parse the whole input into `message`.
    pub fn parse(&mut self, message: &mut DynamicMessage) -> Result<()> {
        self.parse_entries(message, None, self.options.recursion_limit)?;
        if let Some(token) = self.peek()? {
            return Err(CodecError::malformed(
                "text",
                format!("trailing input at {}", token.describe()),
            ));
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Token>> {
        match self.lookahead.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>> {
        if self.lookahead.is_none() {
            self.lookahead = self.lexer.next_token()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn eat(&mut self, token: &Token) -> Result<bool> {
        if self.peek()? == Some(token) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next()? {
            Some(found) if found == token => Ok(()),
            Some(found) => Err(CodecError::malformed(
                "text",
                format!("expected {}, found {}", token.describe(), found.describe()),
            )),
            None => Err(CodecError::malformed(
                "text",
                format!("expected {}, found end of input", token.describe()),
            )),
        }
    }

    fn parse_entries(
        &mut self,
        message: &mut DynamicMessage,
        closer: Option<Closer>,
        depth: u32,
    ) -> Result<()> {
        if depth == 0 {
            return Err(CodecError::malformed("text", "nesting too deep"));
        }

        let mut seen: HashSet<u32> = HashSet::new();
        let mut seen_ext: HashSet<u32> = HashSet::new();
        let mut oneof_seen: HashMap<usize, String> = HashMap::new();
        let mut any_expanded = false;
        let mut any_raw = false;

        loop {
            match self.peek()? {
                None => {
                    return match closer {
                        None => Ok(()),
                        Some(_) => Err(CodecError::malformed("text", "unexpected end of input")),
                    }
                }
                Some(Token::RBrace) if closer == Some(Closer::Brace) => {
                    self.next()?;
                    return Ok(());
                }
                Some(Token::RAngle) if closer == Some(Closer::Angle) => {
                    self.next()?;
                    return Ok(());
                }
                Some(Token::Comma | Token::Semicolon) => {
                    self.next()?;
                    continue;
                }
                _ => {}
            }
            self.parse_entry(
                message,
                &mut seen,
                &mut oneof_seen,
                &mut seen_ext,
                &mut any_expanded,
                &mut any_raw,
                depth,
            )?;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_entry(
        &mut self,
        message: &mut DynamicMessage,
        seen: &mut HashSet<u32>,
        oneof_seen: &mut HashMap<usize, String>,
        seen_ext: &mut HashSet<u32>,
        any_expanded: &mut bool,
        any_raw: &mut bool,
        depth: u32,
    ) -> Result<()> {
        let descriptor = Arc::clone(message.descriptor_arc());
        let token = self.next()?.expect("caller peeked a token");

        match token {
            Token::Ident(name) => {
                let field = descriptor
                    .field_by_text_name(&name)
                    .ok_or_else(|| CodecError::unknown_field(&name))?;

                if !field.is_repeated() {
                    if !seen.insert(field.number) {
                        return Err(CodecError::duplicate_field(&field.name));
                    }
                    if let Some(index) = field.oneof_index {
                        if oneof_seen.insert(index, field.name.clone()).is_some() {
                            let oneof = descriptor
                                .oneofs
                                .get(index)
                                .map(|o| o.name.clone())
                                .unwrap_or_default();
                            return Err(CodecError::oneof_conflict(oneof, &field.name));
                        }
                    }
                }
                if descriptor.is_any() {
                    if *any_expanded {
                        return Err(CodecError::malformed(
                            "text",
                            "Any uses both the expanded and the type_url/value form",
                        ));
                    }
                    *any_raw = true;
                }

                let colon = self.eat(&Token::Colon)?;
                self.parse_field_into(message, field, colon, depth)
            }
            Token::Number(text) => Err(CodecError::malformed(
                "text",
                format!("field name cannot be a number: '{text}'"),
            )),
            Token::LBracket => {
                let (name, has_slash) = self.parse_bracketed_name()?;
                if has_slash {
                    self.parse_any_expansion(message, &descriptor, name, any_expanded, any_raw, depth)
                } else {
                    self.parse_extension_entry(message, &descriptor, name, seen_ext, depth)
                }
            }
            other => Err(CodecError::malformed(
                "text",
                format!("expected a field name, found {}", other.describe()),
            )),
        }
    }

    /// Read the inside of `[...]`: a dotted name, or a type URL containing
    /// `/` separators.
    fn parse_bracketed_name(&mut self) -> Result<(String, bool)> {
        let mut name = String::new();
        let mut has_slash = false;
        loop {
            match self.next()? {
                Some(Token::Ident(part)) => name.push_str(&part),
                Some(Token::Dot) => name.push('.'),
                Some(Token::Slash) => {
                    name.push('/');
                    has_slash = true;
                }
                Some(Token::RBracket) => break,
                Some(other) => {
                    return Err(CodecError::malformed(
                        "text",
                        format!("unexpected {} in bracketed field name", other.describe()),
                    ))
                }
                None => return Err(CodecError::malformed("text", "unterminated bracketed name")),
            }
        }
        if name.is_empty() {
            return Err(CodecError::malformed("text", "empty bracketed field name"));
        }
        Ok((name, has_slash))
    }

    /// `[type.url/full.Name]: { ... }`, only valid inside `Any`. The
    /// literal parses against the resolved type and re-encodes into the
    /// `value` field.
    fn parse_any_expansion(
        &mut self,
        message: &mut DynamicMessage,
        descriptor: &MessageDescriptor,
        type_url: String,
        any_expanded: &mut bool,
        any_raw: &mut bool,
        depth: u32,
    ) -> Result<()> {
        if !descriptor.is_any() {
            return Err(CodecError::malformed(
                "text",
                format!("type URL '[{type_url}]' outside the Any well-known type"),
            ));
        }
        if *any_raw {
            return Err(CodecError::malformed(
                "text",
                "Any uses both the expanded and the type_url/value form",
            ));
        }
        if *any_expanded {
            return Err(CodecError::duplicate_field("type_url"));
        }
        *any_expanded = true;

        let target = self
            .registry
            .resolve_type_url(&type_url)
            .ok_or_else(|| CodecError::resolve_failure(&type_url))?;

        self.eat(&Token::Colon)?;
        let mut payload = DynamicMessage::new(target);
        self.parse_message_literal(&mut payload, depth - 1)?;
        if !self.options.allow_partial {
            check_initialized(&payload)?;
        }
        let bytes = self.binary.marshal_with(
            &payload,
            &MarshalOptions {
                allow_partial: true,
                deterministic: true,
            },
        )?;

        message.set(ANY_TYPE_URL_NUMBER, Value::String(type_url))?;
        message.set(ANY_VALUE_NUMBER, Value::Bytes(bytes))?;
        Ok(())
    }

    /// `[full.name]: value`, naming an extension or a message-set item
    /// addressed by its extension type.
    fn parse_extension_entry(
        &mut self,
        message: &mut DynamicMessage,
        descriptor: &MessageDescriptor,
        name: String,
        seen_ext: &mut HashSet<u32>,
        depth: u32,
    ) -> Result<()> {
        let extendee = descriptor.full_name.as_str();
        let ext = self
            .registry
            .extension_by_name(extendee, &name)
            .or_else(|| {
                if descriptor.message_set_wire_format {
                    self.registry.message_set_extension(extendee, &name)
                } else {
                    None
                }
            })
            .ok_or_else(|| CodecError::resolve_failure(&name))?;

        if !ext.is_repeated() && !seen_ext.insert(ext.number) {
            return Err(CodecError::duplicate_field(&ext.full_name));
        }

        let colon = self.eat(&Token::Colon)?;
        self.check_colon(colon)?;

        if self.peek()? == Some(&Token::LBracket) && ext.is_repeated() {
            self.next()?;
            if self.eat(&Token::RBracket)? {
                return Ok(());
            }
            loop {
                let parsed = self.parse_one_value(&ext, depth)?;
                store_extension(message, &ext, parsed)?;
                if self.eat(&Token::Comma)? {
                    continue;
                }
                self.expect(Token::RBracket)?;
                break;
            }
            Ok(())
        } else {
            let parsed = self.parse_one_value(&ext, depth)?;
            store_extension(message, &ext, parsed)
        }
    }

    fn parse_field_into(
        &mut self,
        message: &mut DynamicMessage,
        field: &FieldDescriptor,
        colon: bool,
        depth: u32,
    ) -> Result<()> {
        self.check_colon(colon)?;

        if self.peek()? == Some(&Token::LBracket) && field.is_repeated() {
            self.next()?;
            if self.eat(&Token::RBracket)? {
                return Ok(());
            }
            loop {
                let parsed = self.parse_one_value(field, depth)?;
                store_field(message, field, parsed)?;
                if self.eat(&Token::Comma)? {
                    continue;
                }
                self.expect(Token::RBracket)?;
                break;
            }
            Ok(())
        } else {
            let parsed = self.parse_one_value(field, depth)?;
            store_field(message, field, parsed)
        }
    }

    /// The colon may be omitted only before a message literal or a list.
    fn check_colon(&mut self, colon: bool) -> Result<()> {
        if colon {
            return Ok(());
        }
        match self.peek()? {
            Some(Token::LBrace | Token::LAngle | Token::LBracket) => Ok(()),
            Some(other) => Err(CodecError::malformed(
                "text",
                format!("expected ':', found {}", other.describe()),
            )),
            None => Err(CodecError::malformed("text", "unexpected end of input")),
        }
    }

    fn parse_one_value(&mut self, field: &FieldDescriptor, depth: u32) -> Result<Parsed> {
        match field.kind {
            Kind::Message | Kind::Group => {
                let type_name = field.type_name.as_deref().ok_or_else(|| {
                    CodecError::malformed(
                        "descriptor",
                        format!("field '{}' has no type name", field.full_name),
                    )
                })?;
                let sub_desc = self
                    .registry
                    .message(type_name)
                    .ok_or_else(|| CodecError::resolve_failure(type_name))?;

                if sub_desc.map_entry {
                    let (key, value) = self.parse_map_entry(&sub_desc, field, depth)?;
                    Ok(Parsed::MapEntry(key, value))
                } else {
                    let mut sub = DynamicMessage::new(sub_desc);
                    self.parse_message_literal(&mut sub, depth - 1)?;
                    Ok(Parsed::Value(Value::Message(sub)))
                }
            }
            _ => Ok(Parsed::Value(self.parse_scalar(field)?)),
        }
    }

    fn parse_message_literal(&mut self, message: &mut DynamicMessage, depth: u32) -> Result<()> {
        match self.next()? {
            Some(Token::LBrace) => self.parse_entries(message, Some(Closer::Brace), depth),
            Some(Token::LAngle) => self.parse_entries(message, Some(Closer::Angle), depth),
            Some(other) => Err(CodecError::malformed(
                "text",
                format!("expected '{{' or '<', found {}", other.describe()),
            )),
            None => Err(CodecError::malformed("text", "unexpected end of input")),
        }
    }

    /// A map entry literal holds `key` and `value` entries in any order;
    /// a missing one defaults to its kind's zero. Extension syntax inside
    /// an entry is rejected.
    fn parse_map_entry(
        &mut self,
        entry_desc: &MessageDescriptor,
        field: &FieldDescriptor,
        depth: u32,
    ) -> Result<(MapKey, Value)> {
        if depth == 0 {
            return Err(CodecError::malformed("text", "nesting too deep"));
        }
        let key_field = entry_desc
            .field(1)
            .ok_or_else(|| CodecError::malformed("map entry", "missing key field"))?;
        let value_field = entry_desc
            .field(2)
            .ok_or_else(|| CodecError::malformed("map entry", "missing value field"))?;

        let closer = match self.next()? {
            Some(Token::LBrace) => Closer::Brace,
            Some(Token::LAngle) => Closer::Angle,
            Some(other) => {
                return Err(CodecError::malformed(
                    "text",
                    format!("expected '{{' or '<', found {}", other.describe()),
                ))
            }
            None => return Err(CodecError::malformed("text", "unexpected end of input")),
        };

        let mut key: Option<Value> = None;
        let mut value: Option<Value> = None;

        loop {
            match self.peek()? {
                None => return Err(CodecError::malformed("text", "unexpected end of input")),
                Some(Token::RBrace) if closer == Closer::Brace => {
                    self.next()?;
                    break;
                }
                Some(Token::RAngle) if closer == Closer::Angle => {
                    self.next()?;
                    break;
                }
                Some(Token::Comma | Token::Semicolon) => {
                    self.next()?;
                    continue;
                }
                Some(Token::LBracket) => {
                    return Err(CodecError::malformed(
                        "text",
                        format!("extension syntax inside a map entry of '{}'", field.full_name),
                    ))
                }
                _ => {}
            }

            match self.next()? {
                Some(Token::Ident(name)) if name == "key" => {
                    if key.is_some() {
                        return Err(CodecError::duplicate_field("key"));
                    }
                    let colon = self.eat(&Token::Colon)?;
                    self.check_colon(colon)?;
                    key = Some(self.parse_scalar(key_field)?);
                }
                Some(Token::Ident(name)) if name == "value" => {
                    if value.is_some() {
                        return Err(CodecError::duplicate_field("value"));
                    }
                    let colon = self.eat(&Token::Colon)?;
                    self.check_colon(colon)?;
                    match self.parse_one_value(value_field, depth)? {
                        Parsed::Value(v) => value = Some(v),
                        Parsed::MapEntry(..) => {
                            return Err(CodecError::malformed("map entry", "nested map entry"))
                        }
                    }
                }
                Some(Token::Ident(name)) => return Err(CodecError::unknown_field(name)),
                Some(other) => {
                    return Err(CodecError::malformed(
                        "text",
                        format!("expected a field name, found {}", other.describe()),
                    ))
                }
                None => return Err(CodecError::malformed("text", "unexpected end of input")),
            }
        }

        let key = match key {
            Some(k) => k,
            None => Value::zero(key_field.kind).ok_or_else(|| {
                CodecError::malformed("map entry", "key kind has no zero value")
            })?,
        };
        let value = match value {
            Some(v) => v,
            None => match Value::zero(value_field.kind) {
                Some(zero) => zero,
                None => {
                    let type_name = value_field.type_name.as_deref().ok_or_else(|| {
                        CodecError::malformed("map entry", "value field has no type name")
                    })?;
                    let sub_desc = self
                        .registry
                        .message(type_name)
                        .ok_or_else(|| CodecError::resolve_failure(type_name))?;
                    Value::Message(DynamicMessage::new(sub_desc))
                }
            },
        };

        let key = MapKey::from_value(key).ok_or_else(|| {
            CodecError::malformed("map entry", "key value cannot key a map")
        })?;
        Ok((key, value))
    }

    fn parse_scalar(&mut self, field: &FieldDescriptor) -> Result<Value> {
        match field.kind {
            Kind::Bool => self.parse_bool(field),
            Kind::String => {
                let bytes = self.parse_string_bytes(field)?;
                let text = String::from_utf8(bytes).map_err(|_| {
                    CodecError::malformed(
                        "string",
                        format!("field '{}' holds invalid UTF-8", field.full_name),
                    )
                })?;
                Ok(Value::String(text))
            }
            Kind::Bytes => Ok(Value::Bytes(self.parse_string_bytes(field)?)),
            Kind::Float | Kind::Double => self.parse_float(field),
            Kind::Enum => self.parse_enum(field),
            _ => self.parse_int(field),
        }
    }

    fn parse_bool(&mut self, field: &FieldDescriptor) -> Result<Value> {
        let value = match self.next()? {
            Some(Token::Ident(s)) => match s.as_str() {
                "true" | "True" | "t" => true,
                "false" | "False" | "f" => false,
                other => {
                    return Err(CodecError::malformed(
                        "bool",
                        format!("invalid value '{other}' for '{}'", field.full_name),
                    ))
                }
            },
            Some(Token::Number(s)) => match s.as_str() {
                "1" => true,
                "0" => false,
                other => {
                    return Err(CodecError::malformed(
                        "bool",
                        format!("invalid value '{other}' for '{}'", field.full_name),
                    ))
                }
            },
            other => return Err(unexpected_value(field, other)),
        };
        Ok(Value::Bool(value))
    }

    /// One or more adjacent string literals, concatenated C-style.
    fn parse_string_bytes(&mut self, field: &FieldDescriptor) -> Result<Vec<u8>> {
        let mut bytes = match self.next()? {
            Some(Token::String(b)) => b,
            other => return Err(unexpected_value(field, other)),
        };
        while let Some(Token::String(_)) = self.peek()? {
            match self.next()? {
                Some(Token::String(more)) => bytes.extend(more),
                _ => unreachable!("peeked a string literal"),
            }
        }
        Ok(bytes)
    }

    fn parse_float(&mut self, field: &FieldDescriptor) -> Result<Value> {
        let negative = self.eat(&Token::Minus)?;
        let magnitude = match self.next()? {
            Some(Token::Ident(s)) => {
                if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity") {
                    f64::INFINITY
                } else if s.eq_ignore_ascii_case("nan") {
                    f64::NAN
                } else {
                    return Err(CodecError::malformed(
                        "number",
                        format!("invalid value '{s}' for '{}'", field.full_name),
                    ));
                }
            }
            Some(Token::Number(text)) => {
                let trimmed = text
                    .strip_suffix(['f', 'F'])
                    .filter(|_| !text.starts_with("0x") && !text.starts_with("0X"))
                    .unwrap_or(&text);
                if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
                    u64::from_str_radix(hex, 16).map_err(|_| bad_number(field, &text))? as f64
                } else {
                    trimmed
                        .parse::<f64>()
                        .map_err(|_| bad_number(field, &text))?
                }
            }
            other => return Err(unexpected_value(field, other)),
        };
        let value = if negative { -magnitude } else { magnitude };
        match field.kind {
            Kind::Float => Ok(Value::Float(value as f32)),
            _ => Ok(Value::Double(value)),
        }
    }

    fn parse_enum(&mut self, field: &FieldDescriptor) -> Result<Value> {
        match self.next()? {
            Some(Token::Ident(name)) => {
                let type_name = field.type_name.as_deref().ok_or_else(|| {
                    CodecError::malformed(
                        "descriptor",
                        format!("field '{}' has no type name", field.full_name),
                    )
                })?;
                let enum_desc = self
                    .registry
                    .enum_type(type_name)
                    .ok_or_else(|| CodecError::resolve_failure(type_name))?;
                let value = enum_desc.value_by_name(&name).ok_or_else(|| {
                    CodecError::malformed(
                        "enum",
                        format!("'{name}' is not a value of {type_name}"),
                    )
                })?;
                Ok(Value::Enum(value.number))
            }
            Some(token @ (Token::Minus | Token::Number(_))) => {
                self.lookahead = Some(token);
                let v = self.parse_int_magnitude(field, i32::MIN as i128, i32::MAX as i128)?;
                Ok(Value::Enum(v as i32))
            }
            other => Err(unexpected_value(field, other)),
        }
    }

    fn parse_int(&mut self, field: &FieldDescriptor) -> Result<Value> {
        match field.kind {
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => {
                let v = self.parse_int_magnitude(field, i32::MIN as i128, i32::MAX as i128)?;
                Ok(Value::Int32(v as i32))
            }
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => {
                let v = self.parse_int_magnitude(field, i64::MIN as i128, i64::MAX as i128)?;
                Ok(Value::Int64(v as i64))
            }
            Kind::UInt32 | Kind::Fixed32 => {
                let v = self.parse_int_magnitude(field, 0, u32::MAX as i128)?;
                Ok(Value::UInt32(v as u32))
            }
            Kind::UInt64 | Kind::Fixed64 => {
                let v = self.parse_int_magnitude(field, 0, u64::MAX as i128)?;
                Ok(Value::UInt64(v as u64))
            }
            other => Err(CodecError::malformed(
                "number",
                format!("kind {} is not an integer kind", other.name()),
            )),
        }
    }

    fn parse_int_magnitude(&mut self, field: &FieldDescriptor, min: i128, max: i128) -> Result<i128> {
        let negative = self.eat(&Token::Minus)?;
        let text = match self.next()? {
            Some(Token::Number(text)) => text,
            other => return Err(unexpected_value(field, other)),
        };
        let magnitude = parse_uint_text(&text).ok_or_else(|| bad_number(field, &text))?;
        if magnitude > u64::MAX as u128 {
            return Err(CodecError::overflow(format!(
                "value {text} for '{}'",
                field.full_name
            )));
        }
        let value = if negative {
            -(magnitude as i128)
        } else {
            magnitude as i128
        };
        if value < min || value > max {
            return Err(CodecError::overflow(format!(
                "value {value} for '{}'",
                field.full_name
            )));
        }
        Ok(value)
    }
}

/// Parse decimal, hex (`0x`) or octal (leading `0`) digits.
fn parse_uint_text(text: &str) -> Option<u128> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u128::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| b.is_ascii_digit()) {
        u128::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse::<u128>().ok()
    }
}

fn store_field(message: &mut DynamicMessage, field: &FieldDescriptor, parsed: Parsed) -> Result<()> {
    match parsed {
        Parsed::MapEntry(key, value) => message.map_insert(field.number, key, value),
        Parsed::Value(value) if field.is_repeated() => message.push(field.number, value),
        Parsed::Value(value) => message.set(field.number, value),
    }
}

fn store_extension(
    message: &mut DynamicMessage,
    ext: &Arc<FieldDescriptor>,
    parsed: Parsed,
) -> Result<()> {
    let value = match parsed {
        Parsed::Value(value) => value,
        Parsed::MapEntry(..) => {
            return Err(CodecError::malformed(
                "text",
                format!("extension '{}' cannot be a map", ext.full_name),
            ))
        }
    };
    if ext.is_repeated() {
        if message.has_extension(ext.number) {
            if let Some(Value::List(list)) = message.extension_mut(ext.number) {
                list.push(value);
                return Ok(());
            }
        }
        message.set_extension(Arc::clone(ext), Value::List(vec![value]))
    } else {
        message.set_extension(Arc::clone(ext), value)
    }
}

fn unexpected_value(field: &FieldDescriptor, token: Option<Token>) -> CodecError {
    match token {
        Some(token) => CodecError::malformed(
            "text",
            format!(
                "invalid value {} for '{}'",
                token.describe(),
                field.full_name
            ),
        ),
        None => CodecError::malformed("text", "unexpected end of input"),
    }
}

fn bad_number(field: &FieldDescriptor, text: &str) -> CodecError {
    CodecError::malformed(
        "number",
        format!("invalid value '{text}' for '{}'", field.full_name),
    )
}
