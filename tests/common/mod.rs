// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared schema fixtures for the integration suites.
//!
//! Builds one registry holding proto2 and proto3 test types covering every
//! field shape the codecs handle: scalars, enums, nested and recursive
//! messages, groups, oneofs, maps, packed and expanded repeated fields,
//! extensions and a message-set type.

#![allow(dead_code)]

use std::sync::Arc;

use protodyn::schema::{
    Cardinality, EnumDescriptor, ExtensionRange, FieldDescriptor, Kind, MessageDescriptor,
    OneofDescriptor, SchemaRegistry, Syntax,
};
use protodyn::DynamicMessage;

/// Largest usable field number, for the message-set extension range.
const NUMBER_MAX: u32 = (1 << 29) - 1;

pub fn test_registry() -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());

    registry
        .register_enum(EnumDescriptor::new(
            "pb2.Enum",
            vec![("ONE", 1), ("TWO", 2), ("TEN", 10)],
        ))
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Simple",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("opt_int32", 1, Kind::Int32, Cardinality::Optional),
                    FieldDescriptor::new("opt_string", 2, Kind::String, Cardinality::Optional),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Scalars",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("opt_bool", 1, Kind::Bool, Cardinality::Optional),
                    FieldDescriptor::new("opt_int32", 2, Kind::Int32, Cardinality::Optional),
                    FieldDescriptor::new("opt_int64", 3, Kind::Int64, Cardinality::Optional),
                    FieldDescriptor::new("opt_uint32", 4, Kind::UInt32, Cardinality::Optional),
                    FieldDescriptor::new("opt_uint64", 5, Kind::UInt64, Cardinality::Optional),
                    FieldDescriptor::new("opt_sint32", 6, Kind::SInt32, Cardinality::Optional),
                    FieldDescriptor::new("opt_sint64", 7, Kind::SInt64, Cardinality::Optional),
                    FieldDescriptor::new("opt_fixed32", 8, Kind::Fixed32, Cardinality::Optional),
                    FieldDescriptor::new("opt_fixed64", 9, Kind::Fixed64, Cardinality::Optional),
                    FieldDescriptor::new("opt_sfixed32", 10, Kind::SFixed32, Cardinality::Optional),
                    FieldDescriptor::new("opt_sfixed64", 11, Kind::SFixed64, Cardinality::Optional),
                    FieldDescriptor::new("opt_float", 12, Kind::Float, Cardinality::Optional),
                    FieldDescriptor::new("opt_double", 13, Kind::Double, Cardinality::Optional),
                    FieldDescriptor::new("opt_string", 14, Kind::String, Cardinality::Optional),
                    FieldDescriptor::new("opt_bytes", 15, Kind::Bytes, Cardinality::Optional),
                    FieldDescriptor::new("opt_enum", 16, Kind::Enum, Cardinality::Optional)
                        .with_type_name("pb2.Enum"),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Nested",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("opt_string", 1, Kind::String, Cardinality::Optional),
                    FieldDescriptor::new("opt_nested", 2, Kind::Message, Cardinality::Optional)
                        .with_type_name("pb2.Nested"),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Requireds",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("req_bool", 1, Kind::Bool, Cardinality::Required),
                    FieldDescriptor::new("opt_string", 2, Kind::String, Cardinality::Optional),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Repeats",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("rpt_bool", 1, Kind::Bool, Cardinality::Repeated),
                    FieldDescriptor::new("rpt_int32", 2, Kind::Int32, Cardinality::Repeated),
                    FieldDescriptor::new("rpt_string", 3, Kind::String, Cardinality::Repeated),
                    FieldDescriptor::new("rpt_nested", 4, Kind::Message, Cardinality::Repeated)
                        .with_type_name("pb2.Nested"),
                    FieldDescriptor::new("rpt_packed_int32", 5, Kind::Int32, Cardinality::Repeated)
                        .with_packed(true),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Nests.OptGroup",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("opt_string", 1, Kind::String, Cardinality::Optional),
                    FieldDescriptor::new("opt_fixed32", 2, Kind::Fixed32, Cardinality::Optional),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Nests",
                Syntax::Proto2,
                vec![
                    FieldDescriptor::new("opt_nested", 1, Kind::Message, Cardinality::Optional)
                        .with_type_name("pb2.Nested"),
                    FieldDescriptor::new("optgroup", 2, Kind::Group, Cardinality::Optional)
                        .with_type_name("pb2.Nests.OptGroup"),
                    FieldDescriptor::new("rpt_nested", 3, Kind::Message, Cardinality::Repeated)
                        .with_type_name("pb2.Nested"),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb3.Scalars",
                Syntax::Proto3,
                vec![
                    FieldDescriptor::new("s_int32", 1, Kind::Int32, Cardinality::Singular),
                    FieldDescriptor::new("s_float", 2, Kind::Float, Cardinality::Singular),
                    FieldDescriptor::new("s_double", 3, Kind::Double, Cardinality::Singular),
                    FieldDescriptor::new("s_string", 4, Kind::String, Cardinality::Singular),
                    FieldDescriptor::new("s_bytes", 5, Kind::Bytes, Cardinality::Singular),
                    FieldDescriptor::new("rpt_int32", 6, Kind::Int32, Cardinality::Repeated),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb3.Union",
                Syntax::Proto3,
                vec![
                    FieldDescriptor::new("str_value", 1, Kind::String, Cardinality::Singular)
                        .with_oneof(0),
                    FieldDescriptor::new("int_value", 2, Kind::Int32, Cardinality::Singular)
                        .with_oneof(0),
                    FieldDescriptor::new("flag", 3, Kind::Bool, Cardinality::Singular),
                ],
                vec![OneofDescriptor::new("union")],
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::map_entry_type(
                "pb3.Maps.Int32ToStrEntry",
                Kind::Int32,
                Kind::String,
                None,
            )
            .unwrap(),
        )
        .unwrap();
    registry
        .register_message(
            MessageDescriptor::map_entry_type(
                "pb3.Maps.StrToNestedEntry",
                Kind::String,
                Kind::Message,
                Some("pkg.Nested"),
            )
            .unwrap(),
        )
        .unwrap();
    registry
        .register_message(
            MessageDescriptor::new(
                "pb3.Maps",
                Syntax::Proto3,
                vec![
                    FieldDescriptor::new("int32_to_str", 1, Kind::Message, Cardinality::Repeated)
                        .with_type_name("pb3.Maps.Int32ToStrEntry"),
                    FieldDescriptor::new("str_to_nested", 2, Kind::Message, Cardinality::Repeated)
                        .with_type_name("pb3.Maps.StrToNestedEntry"),
                ],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pkg.Nested",
                Syntax::Proto3,
                vec![FieldDescriptor::new("opt_string", 1, Kind::String, Cardinality::Singular)],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.Extendable",
                Syntax::Proto2,
                vec![FieldDescriptor::new("opt_int32", 1, Kind::Int32, Cardinality::Optional)],
                Vec::new(),
                vec![ExtensionRange { start: 100, end: 199 }],
            )
            .unwrap(),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("opt_ext_bool", 101, Kind::Bool, Cardinality::Optional)
                .with_extendee("pb2.Extendable", "pb2"),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("opt_ext_string", 102, Kind::String, Cardinality::Optional)
                .with_extendee("pb2.Extendable", "pb2"),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("rpt_ext_fixed32", 103, Kind::Fixed32, Cardinality::Repeated)
                .with_extendee("pb2.Extendable", "pb2"),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("opt_ext_nested", 104, Kind::Message, Cardinality::Optional)
                .with_type_name("pb2.Nested")
                .with_extendee("pb2.Extendable", "pb2"),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("opt_ext_enum", 105, Kind::Enum, Cardinality::Optional)
                .with_type_name("pb2.Enum")
                .with_extendee("pb2.Extendable", "pb2"),
        )
        .unwrap();

    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.MessageSet",
                Syntax::Proto2,
                Vec::new(),
                Vec::new(),
                vec![ExtensionRange { start: 4, end: NUMBER_MAX }],
            )
            .unwrap()
            .with_message_set(),
        )
        .unwrap();
    registry
        .register_message(
            MessageDescriptor::new(
                "pb2.MessageSetExtension",
                Syntax::Proto2,
                vec![FieldDescriptor::new("opt_string", 1, Kind::String, Cardinality::Optional)],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
        .unwrap();
    registry
        .register_extension(
            FieldDescriptor::new("message_set_extension", 100, Kind::Message, Cardinality::Optional)
                .with_type_name("pb2.MessageSetExtension")
                .with_extendee("pb2.MessageSet", "pb2.MessageSetExtension"),
        )
        .unwrap();

    registry
}

/// Fresh message of a registered type.
pub fn message(registry: &SchemaRegistry, full_name: &str) -> DynamicMessage {
    DynamicMessage::new(
        registry
            .message(full_name)
            .unwrap_or_else(|| panic!("type {full_name} not registered")),
    )
}
