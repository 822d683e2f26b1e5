// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic value type system.
//!
//! Provides the unified value representation the codecs read and write
//! through descriptors. A populated field holds exactly one [`Value`];
//! repeated fields hold a [`Value::List`], map fields a [`Value::Map`]
//! keyed by the ordered [`MapKey`].

use std::collections::BTreeMap;
use std::fmt;

use crate::core::message::DynamicMessage;
use crate::schema::model::Kind;

/// A single dynamic field value.
///
/// The scalar variants mirror the protobuf kinds: every 32/64-bit integer
/// kind maps onto the variant of its in-memory type (`sint32`, `sfixed32`
/// and `int32` all populate [`Value::Int32`]); the field's descriptor is
/// what decides the wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value by number; values outside the descriptor round-trip
    Enum(i32),
    /// Nested message or group
    Message(DynamicMessage),
    /// Repeated field elements in order
    List(Vec<Value>),
    /// Map field entries, ordered by key
    Map(BTreeMap<MapKey, Value>),
}

impl Value {
    /// The zero value for a scalar or enum kind; composite kinds have no
    /// context-free zero and return `None`.
    pub fn zero(kind: Kind) -> Option<Value> {
        let value = match kind {
            Kind::Double => Value::Double(0.0),
            Kind::Float => Value::Float(0.0),
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => Value::Int32(0),
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => Value::Int64(0),
            Kind::UInt32 | Kind::Fixed32 => Value::UInt32(0),
            Kind::UInt64 | Kind::Fixed64 => Value::UInt64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum => Value::Enum(0),
            Kind::Message | Kind::Group => return None,
        };
        Some(value)
    }

    /// Whether this value is the kind's zero, for proto3 implicit-presence
    /// elision.
    ///
    /// `-0.0` compares bit-exactly, not numerically: its sign survives a
    /// round trip, so it must be emitted.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(v) => !v,
            Value::Int32(v) => *v == 0,
            Value::Int64(v) => *v == 0,
            Value::UInt32(v) => *v == 0,
            Value::UInt64(v) => *v == 0,
            Value::Float(v) => v.to_bits() == 0,
            Value::Double(v) => v.to_bits() == 0,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::Enum(v) => *v == 0,
            Value::Message(_) => false,
            Value::List(v) => v.is_empty(),
            Value::Map(v) => v.is_empty(),
        }
    }

    /// Check if this value is a container (list or map).
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Try to get the inner bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the value as i32 (for `Int32` and `Enum`).
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) | Value::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner f32.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner message.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner message.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the inner list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner list.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the inner map.
    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner map.
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of this value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Enum(v) => write!(f, "{v}"),
            Value::Message(m) => write!(f, "{{{} fields}}", m.len()),
            Value::List(v) => write!(f, "[{} elements]", v.len()),
            Value::Map(m) => write!(f, "{{{} entries}}", m.len()),
        }
    }
}

/// Key of a map field entry.
///
/// Map keys are restricted to integral, bool and string kinds, all of which
/// have a total order; entries iterate in that order, which is what makes
/// deterministic output hold without a separate sort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    String(String),
}

impl MapKey {
    /// The zero key for a key kind; `None` if the kind cannot key a map.
    pub fn zero(kind: Kind) -> Option<MapKey> {
        let key = match kind {
            Kind::Bool => MapKey::Bool(false),
            Kind::Int32 | Kind::SInt32 | Kind::SFixed32 => MapKey::Int32(0),
            Kind::Int64 | Kind::SInt64 | Kind::SFixed64 => MapKey::Int64(0),
            Kind::UInt32 | Kind::Fixed32 => MapKey::UInt32(0),
            Kind::UInt64 | Kind::Fixed64 => MapKey::UInt64(0),
            Kind::String => MapKey::String(String::new()),
            _ => return None,
        };
        Some(key)
    }

    /// Convert a scalar value into a map key.
    pub fn from_value(value: Value) -> Option<MapKey> {
        let key = match value {
            Value::Bool(v) => MapKey::Bool(v),
            Value::Int32(v) => MapKey::Int32(v),
            Value::Int64(v) => MapKey::Int64(v),
            Value::UInt32(v) => MapKey::UInt32(v),
            Value::UInt64(v) => MapKey::UInt64(v),
            Value::String(v) => MapKey::String(v),
            _ => return None,
        };
        Some(key)
    }

    /// Convert this key back into the scalar value it came from.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(v) => Value::Bool(*v),
            MapKey::Int32(v) => Value::Int32(*v),
            MapKey::Int64(v) => Value::Int64(*v),
            MapKey::UInt32(v) => Value::UInt32(*v),
            MapKey::UInt64(v) => Value::UInt64(*v),
            MapKey::String(v) => Value::String(v.clone()),
        }
    }
}
