// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor model and registry.
//!
//! This module is the read side of the schema: descriptors come from an
//! external producer, are validated on construction, and are immutable once
//! registered.

pub mod model;
pub mod registry;

pub use model::{
    Cardinality, DefaultValue, EnumDescriptor, EnumValueDescriptor, ExtensionRange,
    FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor, Syntax,
};
pub use registry::SchemaRegistry;
