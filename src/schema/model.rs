// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor model for protobuf message, field and enum schemas.
//!
//! Descriptors are plain data produced by an external schema source (a
//! `.proto` compiler, a descriptor-set loader, hand construction in tests)
//! and are immutable once registered. Cross-type references are carried as
//! full names and resolved through the [`SchemaRegistry`](crate::schema::SchemaRegistry),
//! which keeps cyclic message graphs representable.

use serde::{Deserialize, Serialize};

use crate::core::error::{CodecError, Result};

/// Smallest valid field number.
pub const FIELD_NUMBER_MIN: u32 = 1;
/// Largest valid field number (2^29 - 1).
pub const FIELD_NUMBER_MAX: u32 = (1 << 29) - 1;
/// First field number of the reserved range.
pub const RESERVED_NUMBER_FIRST: u32 = 19000;
/// Last field number of the reserved range.
pub const RESERVED_NUMBER_LAST: u32 = 19999;

/// Full name of the `Any` well-known type.
pub const ANY_FULL_NAME: &str = "google.protobuf.Any";
/// Field number of `Any.type_url`.
pub const ANY_TYPE_URL_NUMBER: u32 = 1;
/// Field number of `Any.value`.
pub const ANY_VALUE_NUMBER: u32 = 2;

/// Field number of the item group in the message-set wire layout.
pub const MESSAGE_SET_ITEM_NUMBER: u32 = 1;
/// Field number of `type_id` inside a message-set item.
pub const MESSAGE_SET_TYPE_ID_NUMBER: u32 = 2;
/// Field number of `message` inside a message-set item.
pub const MESSAGE_SET_MESSAGE_NUMBER: u32 = 3;

/// Protobuf language revision a message was declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    /// proto2: explicit presence, required fields, groups, expanded repeated
    Proto2,
    /// proto3: implicit presence for singular scalars, packed repeated
    Proto3,
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
    Group,
}

impl Kind {
    /// Whether a repeated field of this kind may use the packed encoding.
    ///
    /// Only fixed-width and varint scalars pack; length-delimited and group
    /// kinds never do.
    pub fn is_packable(self) -> bool {
        !matches!(self, Kind::String | Kind::Bytes | Kind::Message | Kind::Group)
    }

    /// Whether this kind carries a nested message type.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Message | Kind::Group)
    }

    /// Whether this kind is a valid map key kind.
    ///
    /// Map keys are restricted to integral, bool and string kinds.
    pub fn is_valid_map_key(self) -> bool {
        matches!(
            self,
            Kind::Int32
                | Kind::Int64
                | Kind::UInt32
                | Kind::UInt64
                | Kind::SInt32
                | Kind::SInt64
                | Kind::Fixed32
                | Kind::Fixed64
                | Kind::SFixed32
                | Kind::SFixed64
                | Kind::Bool
                | Kind::String
        )
    }

    /// Lowercase protobuf name of this kind, as written in `.proto` sources.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::UInt32 => "uint32",
            Kind::UInt64 => "uint64",
            Kind::SInt32 => "sint32",
            Kind::SInt64 => "sint64",
            Kind::Fixed32 => "fixed32",
            Kind::Fixed64 => "fixed64",
            Kind::SFixed32 => "sfixed32",
            Kind::SFixed64 => "sfixed64",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Enum => "enum",
            Kind::Message => "message",
            Kind::Group => "group",
        }
    }
}

/// How many values a field holds and how presence is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// proto3 singular field: no explicit presence, zero values are elided
    Singular,
    /// proto2 optional field: explicit presence
    Optional,
    /// proto2 required field: explicit presence, checked by validation
    Required,
    /// Repeated field; maps are repeated entry messages
    Repeated,
}

/// Declared default for a proto2 scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Default enum value referenced by name, resolved through the registry.
    EnumName(String),
}

/// Schema of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name in snake_case
    pub name: String,
    /// Fully qualified name; for extensions this includes the declaring scope
    pub full_name: String,
    /// JSON name (lowerCamelCase); defaults to a mechanical conversion
    pub json_name: String,
    /// Field number on the wire
    pub number: u32,
    /// Declared type
    pub kind: Kind,
    /// Cardinality
    pub cardinality: Cardinality,
    /// Explicit `[packed = ...]` annotation; `None` uses the syntax default
    pub packed: Option<bool>,
    /// Declared default value, proto2 only
    pub default: Option<DefaultValue>,
    /// Full name of the message/group/enum type for composite and enum kinds
    pub type_name: Option<String>,
    /// Index into the parent message's oneof list
    pub oneof_index: Option<usize>,
    /// Full name of the extended message when this field is an extension
    pub extendee: Option<String>,
}

impl FieldDescriptor {
    /// Create a field with the given identity; refine with the `with_*`
    /// builder methods.
    pub fn new(name: impl Into<String>, number: u32, kind: Kind, cardinality: Cardinality) -> Self {
        let name = name.into();
        let json_name = json_name_of(&name);
        Self {
            full_name: name.clone(),
            name,
            json_name,
            number,
            kind,
            cardinality,
            packed: None,
            default: None,
            type_name: None,
            oneof_index: None,
            extendee: None,
        }
    }

    /// Set the referenced message/group/enum type name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set an explicit packed annotation.
    pub fn with_packed(mut self, packed: bool) -> Self {
        self.packed = Some(packed);
        self
    }

    /// Set the declared default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Place the field in a oneof by index.
    pub fn with_oneof(mut self, index: usize) -> Self {
        self.oneof_index = Some(index);
        self
    }

    /// Mark the field as an extension of `extendee`, with `scope` as the
    /// declaring scope for its full name.
    pub fn with_extendee(mut self, extendee: impl Into<String>, scope: impl Into<String>) -> Self {
        self.extendee = Some(extendee.into());
        let scope = scope.into();
        self.full_name = if scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", scope, self.name)
        };
        self
    }

    /// Override the JSON name.
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    /// Whether this field is an extension.
    pub fn is_extension(&self) -> bool {
        self.extendee.is_some()
    }

    /// Whether this field is repeated (including map fields).
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    /// Whether a repeated field of this descriptor uses the packed encoding
    /// under the given syntax.
    pub fn is_packed(&self, syntax: Syntax) -> bool {
        if !self.is_repeated() || !self.kind.is_packable() {
            return false;
        }
        self.packed.unwrap_or(syntax == Syntax::Proto3)
    }

    /// Whether the field tracks explicit presence under the given syntax.
    pub fn has_presence(&self, syntax: Syntax) -> bool {
        if self.is_repeated() {
            return false;
        }
        self.kind.is_composite()
            || self.oneof_index.is_some()
            || matches!(self.cardinality, Cardinality::Optional | Cardinality::Required)
            || syntax == Syntax::Proto2
    }

    /// Whether this is a canonical message-set extension: a message-typed
    /// extension named `message_set_extension`, declared inside the very
    /// type it carries. Such extensions are addressed by their type's full
    /// name in the text format.
    pub fn is_message_set_extension(&self) -> bool {
        self.kind == Kind::Message
            && self.name == "message_set_extension"
            && self.extendee.is_some()
            && self
                .type_name
                .as_deref()
                .is_some_and(|t| self.full_name == format!("{t}.{}", self.name))
    }

    /// The declared type name a group is addressed by in the text format:
    /// the last segment of its message type's full name.
    pub fn group_name(&self) -> Option<&str> {
        if self.kind != Kind::Group {
            return None;
        }
        self.type_name
            .as_deref()
            .map(|t| t.rsplit('.').next().unwrap_or(t))
    }
}

/// A oneof grouping: at most one member field is populated at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneofDescriptor {
    /// Oneof name
    pub name: String,
    /// Member field numbers, filled in at message construction
    pub fields: Vec<u32>,
}

impl OneofDescriptor {
    /// Create an empty oneof; members are collected from the fields'
    /// `oneof_index` when the message descriptor is built.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }
}

/// Inclusive range of field numbers open for extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRange {
    /// First number in the range
    pub start: u32,
    /// Last number in the range (inclusive)
    pub end: u32,
}

/// Schema of a message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Fully qualified type name, e.g. `pkg.Outer.Inner`
    pub full_name: String,
    /// Language revision the type was declared under
    pub syntax: Syntax,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Oneof groupings
    pub oneofs: Vec<OneofDescriptor>,
    /// Field number ranges open for extensions
    pub extension_ranges: Vec<ExtensionRange>,
    /// Whether this type is a synthesized map entry
    pub map_entry: bool,
    /// Whether this type uses the legacy message-set wire layout
    pub message_set_wire_format: bool,
}

impl MessageDescriptor {
    /// Build and validate a message descriptor.
    ///
    /// Checks field number uniqueness and range, rejects numbers in the
    /// reserved range, verifies oneof references, and qualifies each field's
    /// full name. Descriptors that fail these checks never enter a registry.
    pub fn new(
        full_name: impl Into<String>,
        syntax: Syntax,
        fields: Vec<FieldDescriptor>,
        mut oneofs: Vec<OneofDescriptor>,
        extension_ranges: Vec<ExtensionRange>,
    ) -> Result<Self> {
        let full_name = full_name.into();
        let mut fields = fields;
        let mut seen = std::collections::HashSet::new();

        for oneof in &mut oneofs {
            oneof.fields.clear();
        }

        for field in &mut fields {
            validate_field_number(field.number)?;
            if !seen.insert(field.number) {
                return Err(CodecError::malformed(
                    "descriptor",
                    format!("duplicate field number {} in {}", field.number, full_name),
                ));
            }
            if field.cardinality == Cardinality::Required && syntax != Syntax::Proto2 {
                return Err(CodecError::malformed(
                    "descriptor",
                    format!("required field '{}' outside proto2", field.name),
                ));
            }
            if field.packed == Some(true) && !(field.is_repeated() && field.kind.is_packable()) {
                return Err(CodecError::malformed(
                    "descriptor",
                    format!("field '{}' cannot be packed", field.name),
                ));
            }
            if let Some(index) = field.oneof_index {
                match oneofs.get_mut(index) {
                    Some(oneof) => oneof.fields.push(field.number),
                    None => {
                        return Err(CodecError::malformed(
                            "descriptor",
                            format!("field '{}' references missing oneof {index}", field.name),
                        ))
                    }
                }
            }
            field.full_name = format!("{}.{}", full_name, field.name);
        }

        Ok(Self {
            full_name,
            syntax,
            fields,
            oneofs,
            extension_ranges,
            map_entry: false,
            message_set_wire_format: false,
        })
    }

    /// Mark this type as a synthesized map entry.
    pub fn with_map_entry(mut self) -> Self {
        self.map_entry = true;
        self
    }

    /// Mark this type as using the legacy message-set wire layout.
    pub fn with_message_set(mut self) -> Self {
        self.message_set_wire_format = true;
        self
    }

    /// Build the synthesized entry type for a map field.
    ///
    /// The entry holds `key` at number 1 and `value` at number 2; a message
    /// or enum value kind carries `value_type` as its type name.
    pub fn map_entry_type(
        full_name: impl Into<String>,
        key_kind: Kind,
        value_kind: Kind,
        value_type: Option<&str>,
    ) -> Result<Self> {
        if !key_kind.is_valid_map_key() {
            return Err(CodecError::malformed(
                "descriptor",
                format!("kind {} is not a valid map key", key_kind.name()),
            ));
        }
        let mut value = FieldDescriptor::new("value", 2, value_kind, Cardinality::Singular);
        if let Some(t) = value_type {
            value = value.with_type_name(t);
        }
        let entry = Self::new(
            full_name,
            Syntax::Proto3,
            vec![
                FieldDescriptor::new("key", 1, key_kind, Cardinality::Singular),
                value,
            ],
            Vec::new(),
            Vec::new(),
        )?;
        Ok(entry.with_map_entry())
    }

    /// Descriptor of the `Any` well-known type.
    pub fn any() -> Self {
        Self::new(
            ANY_FULL_NAME,
            Syntax::Proto3,
            vec![
                FieldDescriptor::new("type_url", ANY_TYPE_URL_NUMBER, Kind::String, Cardinality::Singular),
                FieldDescriptor::new("value", ANY_VALUE_NUMBER, Kind::Bytes, Cardinality::Singular),
            ],
            Vec::new(),
            Vec::new(),
        )
        .expect("Any descriptor is statically valid")
    }

    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Look up a field by its declared snake_case name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by the name the text format addresses it with:
    /// the field name, or the declared type name for groups.
    ///
    /// A group's lowercase field name is deliberately not accepted, matching
    /// the canonical decoder.
    pub fn field_by_text_name(&self, name: &str) -> Option<&FieldDescriptor> {
        if let Some(field) = self.field_by_name(name) {
            if field.kind != Kind::Group {
                return Some(field);
            }
        }
        self.fields
            .iter()
            .find(|f| f.kind == Kind::Group && f.group_name() == Some(name))
    }

    /// The oneof a field belongs to, if any.
    pub fn oneof_containing(&self, number: u32) -> Option<&OneofDescriptor> {
        let field = self.field(number)?;
        field.oneof_index.and_then(|i| self.oneofs.get(i))
    }

    /// Whether `number` falls inside one of this type's extension ranges.
    pub fn accepts_extension(&self, number: u32) -> bool {
        self.extension_ranges
            .iter()
            .any(|r| r.start <= number && number <= r.end)
    }

    /// Field numbers of all required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.cardinality == Cardinality::Required)
    }

    /// Whether this is the `Any` well-known type.
    pub fn is_any(&self) -> bool {
        self.full_name == ANY_FULL_NAME
    }
}

/// Schema of an enum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Fully qualified type name
    pub full_name: String,
    /// Values in declaration order
    pub values: Vec<EnumValueDescriptor>,
}

/// A single enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    /// Value name, e.g. `FOO_UNSPECIFIED`
    pub name: String,
    /// Numeric value
    pub number: i32,
}

impl EnumDescriptor {
    /// Build an enum descriptor from `(name, number)` pairs.
    pub fn new(full_name: impl Into<String>, values: Vec<(&str, i32)>) -> Self {
        Self {
            full_name: full_name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| EnumValueDescriptor {
                    name: name.to_string(),
                    number,
                })
                .collect(),
        }
    }

    /// Look up a value by name.
    pub fn value_by_name(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Look up a value by number; the first declared match wins for aliases.
    pub fn value_by_number(&self, number: i32) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.number == number)
    }

    /// The default number for fields of this enum type: the first declared
    /// value, or 0 for an empty enum.
    pub fn default_number(&self) -> i32 {
        self.values.first().map(|v| v.number).unwrap_or(0)
    }
}

/// Validate that a field number is usable for a user-declared field.
pub fn validate_field_number(number: u32) -> Result<()> {
    if !(FIELD_NUMBER_MIN..=FIELD_NUMBER_MAX).contains(&number) {
        return Err(CodecError::malformed(
            "descriptor",
            format!("field number {number} out of range"),
        ));
    }
    if (RESERVED_NUMBER_FIRST..=RESERVED_NUMBER_LAST).contains(&number) {
        return Err(CodecError::reserved(number));
    }
    Ok(())
}

fn json_name_of(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_message() -> MessageDescriptor {
        MessageDescriptor::new(
            "test.Scalars",
            Syntax::Proto2,
            vec![
                FieldDescriptor::new("opt_int32", 1, Kind::Int32, Cardinality::Optional),
                FieldDescriptor::new("opt_string", 2, Kind::String, Cardinality::Optional),
            ],
            Vec::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_field_lookup_by_number_and_name() {
        let desc = scalar_message();
        assert_eq!(desc.field(1).unwrap().name, "opt_int32");
        assert_eq!(desc.field_by_name("opt_string").unwrap().number, 2);
        assert!(desc.field(3).is_none());
        assert!(desc.field_by_name("nope").is_none());
    }

    #[test]
    fn test_field_full_names_are_qualified() {
        let desc = scalar_message();
        assert_eq!(desc.field(1).unwrap().full_name, "test.Scalars.opt_int32");
    }

    #[test]
    fn test_duplicate_field_number_rejected() {
        let result = MessageDescriptor::new(
            "test.Dup",
            Syntax::Proto3,
            vec![
                FieldDescriptor::new("a", 1, Kind::Int32, Cardinality::Singular),
                FieldDescriptor::new("b", 1, Kind::Int32, Cardinality::Singular),
            ],
            Vec::new(),
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reserved_field_number_rejected() {
        let result = MessageDescriptor::new(
            "test.Reserved",
            Syntax::Proto3,
            vec![FieldDescriptor::new("a", 19500, Kind::Int32, Cardinality::Singular)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(result.unwrap_err(), CodecError::reserved(19500));
    }

    #[test]
    fn test_required_outside_proto2_rejected() {
        let result = MessageDescriptor::new(
            "test.Req",
            Syntax::Proto3,
            vec![FieldDescriptor::new("a", 1, Kind::Int32, Cardinality::Required)],
            Vec::new(),
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_oneof_membership_collected() {
        let desc = MessageDescriptor::new(
            "test.Union",
            Syntax::Proto3,
            vec![
                FieldDescriptor::new("str_value", 1, Kind::String, Cardinality::Singular)
                    .with_oneof(0),
                FieldDescriptor::new("int_value", 2, Kind::Int32, Cardinality::Singular)
                    .with_oneof(0),
                FieldDescriptor::new("plain", 3, Kind::Bool, Cardinality::Singular),
            ],
            vec![OneofDescriptor::new("union")],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(desc.oneofs[0].fields, vec![1, 2]);
        assert_eq!(desc.oneof_containing(1).unwrap().name, "union");
        assert!(desc.oneof_containing(3).is_none());
    }

    #[test]
    fn test_packed_defaults_follow_syntax() {
        let p3 = FieldDescriptor::new("v", 1, Kind::Int32, Cardinality::Repeated);
        assert!(p3.is_packed(Syntax::Proto3));
        assert!(!p3.is_packed(Syntax::Proto2));

        let annotated = p3.clone().with_packed(true);
        assert!(annotated.is_packed(Syntax::Proto2));

        let strings = FieldDescriptor::new("s", 2, Kind::String, Cardinality::Repeated);
        assert!(!strings.is_packed(Syntax::Proto3));
    }

    #[test]
    fn test_presence_rules() {
        let p3_scalar = FieldDescriptor::new("v", 1, Kind::Int32, Cardinality::Singular);
        assert!(!p3_scalar.has_presence(Syntax::Proto3));
        assert!(p3_scalar.has_presence(Syntax::Proto2));

        let msg = FieldDescriptor::new("m", 2, Kind::Message, Cardinality::Singular)
            .with_type_name("test.Nested");
        assert!(msg.has_presence(Syntax::Proto3));

        let in_oneof = FieldDescriptor::new("o", 3, Kind::Int32, Cardinality::Singular).with_oneof(0);
        assert!(in_oneof.has_presence(Syntax::Proto3));

        let repeated = FieldDescriptor::new("r", 4, Kind::Int32, Cardinality::Repeated);
        assert!(!repeated.has_presence(Syntax::Proto2));
    }

    #[test]
    fn test_group_text_name() {
        let group = FieldDescriptor::new("optgroup", 1, Kind::Group, Cardinality::Optional)
            .with_type_name("test.Nests.OptGroup");
        assert_eq!(group.group_name(), Some("OptGroup"));

        let desc = MessageDescriptor::new(
            "test.Nests",
            Syntax::Proto2,
            vec![group],
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        assert!(desc.field_by_text_name("OptGroup").is_some());
        assert!(desc.field_by_text_name("optgroup").is_none());
    }

    #[test]
    fn test_extension_ranges() {
        let desc = MessageDescriptor::new(
            "test.Extendable",
            Syntax::Proto2,
            vec![FieldDescriptor::new("a", 1, Kind::Int32, Cardinality::Optional)],
            Vec::new(),
            vec![ExtensionRange { start: 100, end: 199 }],
        )
        .unwrap();
        assert!(desc.accepts_extension(100));
        assert!(desc.accepts_extension(199));
        assert!(!desc.accepts_extension(200));
        assert!(!desc.accepts_extension(1));
    }

    #[test]
    fn test_map_entry_type() {
        let entry =
            MessageDescriptor::map_entry_type("test.M.Int32ToStrEntry", Kind::Int32, Kind::String, None)
                .unwrap();
        assert!(entry.map_entry);
        assert_eq!(entry.field(1).unwrap().name, "key");
        assert_eq!(entry.field(2).unwrap().name, "value");

        let bad = MessageDescriptor::map_entry_type("test.Bad", Kind::Float, Kind::String, None);
        assert!(bad.is_err());
    }

    #[test]
    fn test_any_descriptor() {
        let any = MessageDescriptor::any();
        assert!(any.is_any());
        assert_eq!(any.field(1).unwrap().name, "type_url");
        assert_eq!(any.field(2).unwrap().kind, Kind::Bytes);
    }

    #[test]
    fn test_enum_lookup() {
        let e = EnumDescriptor::new("test.Enum", vec![("ONE", 1), ("TWO", 2), ("TEN", 10)]);
        assert_eq!(e.value_by_name("TEN").unwrap().number, 10);
        assert_eq!(e.value_by_number(2).unwrap().name, "TWO");
        assert!(e.value_by_name("ten").is_none());
        assert_eq!(e.default_number(), 1);
    }

    #[test]
    fn test_json_name_derivation() {
        let f = FieldDescriptor::new("opt_int32_value", 1, Kind::Int32, Cardinality::Optional);
        assert_eq!(f.json_name, "optInt32Value");
    }

    #[test]
    fn test_kind_packable() {
        assert!(Kind::Int32.is_packable());
        assert!(Kind::Double.is_packable());
        assert!(Kind::Enum.is_packable());
        assert!(!Kind::String.is_packable());
        assert!(!Kind::Bytes.is_packable());
        assert!(!Kind::Message.is_packable());
        assert!(!Kind::Group.is_packable());
    }

    #[test]
    fn test_schema_model_serializes() {
        let desc = scalar_message();
        let json = serde_json::to_string(&desc).unwrap();
        let back: MessageDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
