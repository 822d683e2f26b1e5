// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protodyn
//!
//! Reflection-driven Protocol Buffers runtime.
//!
//! Given only a descriptor, this library sizes, appends and consumes any
//! message to and from the binary wire format, and prints and parses the
//! canonical text format: scalar fields, groups, oneofs, maps, extensions,
//! required-field tracking, the `Any` well-known type, and byte-preserving
//! unknown fields included.
//!
//! ## Architecture
//!
//! The library is organized in three layers:
//! - `core/` - Errors, dynamic values and dynamic messages
//! - `schema/` - The descriptor model and the registry resolving names
//! - `encoding/` - Wire primitives, per-type coder tables, and the binary
//!   and text codecs driven by them
//!
//! ## Example: binary round trip
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use protodyn::schema::{Cardinality, FieldDescriptor, Kind, MessageDescriptor, SchemaRegistry, Syntax};
//! use protodyn::{BinaryCodec, DynamicMessage, Value};
//!
//! let registry = Arc::new(SchemaRegistry::new());
//! let descriptor = registry.register_message(MessageDescriptor::new(
//!     "demo.Greeting",
//!     Syntax::Proto3,
//!     vec![FieldDescriptor::new("text", 1, Kind::String, Cardinality::Singular)],
//!     Vec::new(),
//!     Vec::new(),
//! )?)?;
//!
//! let codec = BinaryCodec::new(registry);
//! let mut message = DynamicMessage::new(Arc::clone(&descriptor));
//! message.set(1, Value::String("hello".to_string()))?;
//!
//! let bytes = codec.marshal(&message)?;
//! assert_eq!(codec.unmarshal(&bytes, &descriptor)?, message);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use crate::core::{CodecError, DynamicMessage, ExtensionField, MapKey, Result, Value};

// Descriptor model and registry
pub mod schema;

pub use schema::SchemaRegistry;

// Codecs
pub mod encoding;

pub use encoding::{
    check_initialized, BinaryCodec, MarshalOptions, TextCodec, TextMarshalOptions,
    TextUnmarshalOptions, UnmarshalOptions,
};
