// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Coder tables: per-type codec plans.
//!
//! A [`CoderTable`] binds every field of a message type to the handling mode
//! chosen once from its (kind, cardinality, packed, presence) signature, so
//! the hot encode/decode paths dispatch on a small closed enum instead of
//! re-deriving behavior from the descriptor per record. Tables are built
//! lazily on first use of a type and cached for the registry's lifetime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::error::{CodecError, Result};
use crate::encoding::wire::WireType;
use crate::schema::model::{Cardinality, FieldDescriptor, Kind, MessageDescriptor, Syntax};
use crate::schema::registry::SchemaRegistry;

/// Handling mode for one field, fixed at table construction.
#[derive(Debug, Clone, PartialEq)]
pub enum CoderMode {
    /// Singular scalar or enum with explicit presence: emitted whenever set
    Scalar,
    /// Singular proto3 scalar without presence: the zero value is elided
    ImplicitScalar,
    /// Singular length-prefixed sub-message
    Message,
    /// Singular group, delimited by start/end tags
    Group,
    /// Repeated scalar or enum; `FieldCoder::packed` picks the encoding
    RepeatedScalar,
    /// Repeated length-prefixed sub-message
    RepeatedMessage,
    /// Repeated group
    RepeatedGroup,
    /// Map field, serialized as repeated key/value entry messages
    Map {
        /// Kind of entry field 1
        key_kind: Kind,
        /// Kind of entry field 2
        value_kind: Kind,
        /// Type name for message- or enum-valued maps
        value_type: Option<String>,
    },
}

/// One field's slot in a coder table.
#[derive(Debug, Clone)]
pub struct FieldCoder {
    /// The field this coder serves
    pub field: Arc<FieldDescriptor>,
    /// Handling mode
    pub mode: CoderMode,
    /// Wire type of a single element of this field
    pub wire_type: WireType,
    /// Whether a repeated field marshals as one length-delimited block
    pub packed: bool,
}

impl FieldCoder {
    /// Choose the coder for a field under the given syntax.
    ///
    /// Map detection resolves the field's entry type through the registry,
    /// so every message type reachable from the field must be registered
    /// before first use.
    pub fn build(
        field: Arc<FieldDescriptor>,
        syntax: Syntax,
        registry: &SchemaRegistry,
    ) -> Result<FieldCoder> {
        let wire_type = WireType::for_kind(field.kind);
        let packed = field.is_packed(syntax);

        let mode = match (field.cardinality, field.kind) {
            (Cardinality::Repeated, Kind::Message) => {
                let type_name = composite_type_name(&field)?;
                let entry = registry
                    .message(type_name)
                    .ok_or_else(|| CodecError::resolve_failure(type_name))?;
                if entry.map_entry {
                    let key = entry.field(1).ok_or_else(|| {
                        CodecError::malformed("descriptor", "map entry lacks a key field")
                    })?;
                    let value = entry.field(2).ok_or_else(|| {
                        CodecError::malformed("descriptor", "map entry lacks a value field")
                    })?;
                    CoderMode::Map {
                        key_kind: key.kind,
                        value_kind: value.kind,
                        value_type: value.type_name.clone(),
                    }
                } else {
                    CoderMode::RepeatedMessage
                }
            }
            (Cardinality::Repeated, Kind::Group) => CoderMode::RepeatedGroup,
            (Cardinality::Repeated, _) => CoderMode::RepeatedScalar,
            (_, Kind::Message) => CoderMode::Message,
            (_, Kind::Group) => CoderMode::Group,
            _ => {
                if field.has_presence(syntax) {
                    CoderMode::Scalar
                } else {
                    CoderMode::ImplicitScalar
                }
            }
        };

        Ok(FieldCoder {
            field,
            mode,
            wire_type,
            packed,
        })
    }

    /// Choose the coder for an extension field.
    ///
    /// Extensions are proto2 constructs: explicit presence, repeated fields
    /// expanded unless annotated packed.
    pub fn build_extension(
        field: Arc<FieldDescriptor>,
        registry: &SchemaRegistry,
    ) -> Result<FieldCoder> {
        FieldCoder::build(field, Syntax::Proto2, registry)
    }

    /// Whether this field is a map.
    pub fn is_map(&self) -> bool {
        matches!(self.mode, CoderMode::Map { .. })
    }
}

fn composite_type_name(field: &FieldDescriptor) -> Result<&str> {
    field.type_name.as_deref().ok_or_else(|| {
        CodecError::malformed(
            "descriptor",
            format!("field '{}' has no type name", field.full_name),
        )
    })
}

/// The codec plan for one message type.
#[derive(Debug, Clone)]
pub struct CoderTable {
    /// Full name of the message type this table serves
    pub full_name: String,
    /// Syntax the type was declared under
    pub syntax: Syntax,
    /// Field coders in declaration order
    pub coders: Vec<FieldCoder>,
    /// Numbers of required fields, checked by validation
    pub required: Vec<u32>,
    /// Whether the type uses the message-set wire layout
    pub message_set: bool,
    index: HashMap<u32, usize>,
}

impl CoderTable {
    /// Build the table for a message type.
    pub fn build(descriptor: &MessageDescriptor, registry: &SchemaRegistry) -> Result<CoderTable> {
        let mut coders = Vec::with_capacity(descriptor.fields.len());
        let mut index = HashMap::with_capacity(descriptor.fields.len());
        let mut required = Vec::new();

        for field in &descriptor.fields {
            if field.cardinality == Cardinality::Required {
                required.push(field.number);
            }
            index.insert(field.number, coders.len());
            coders.push(FieldCoder::build(
                Arc::new(field.clone()),
                descriptor.syntax,
                registry,
            )?);
        }

        Ok(CoderTable {
            full_name: descriptor.full_name.clone(),
            syntax: descriptor.syntax,
            coders,
            required,
            message_set: descriptor.message_set_wire_format,
            index,
        })
    }

    /// Look up the coder for a field number.
    pub fn coder(&self, number: u32) -> Option<&FieldCoder> {
        self.index.get(&number).map(|&i| &self.coders[i])
    }
}

/// Write-once cache of coder tables keyed by type name.
///
/// Concurrent first-users may race to build the same table; the first
/// insert wins and later builders adopt it, so all callers observe one
/// consistent table per type.
pub struct TableCache {
    tables: RwLock<HashMap<String, Arc<CoderTable>>>,
    /// Extension coders live outside the per-type field vectors, keyed by
    /// (extended type, field number).
    extensions: RwLock<HashMap<(String, u32), Arc<FieldCoder>>>,
}

impl TableCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            extensions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the table for a type, building and caching it on first use.
    pub fn table_for(
        &self,
        descriptor: &MessageDescriptor,
        registry: &SchemaRegistry,
    ) -> Result<Arc<CoderTable>> {
        {
            let tables = self
                .tables
                .read()
                .map_err(|e| CodecError::malformed("coder cache", format!("lock poisoned: {e}")))?;
            if let Some(table) = tables.get(&descriptor.full_name) {
                return Ok(Arc::clone(table));
            }
        }

        let built = Arc::new(CoderTable::build(descriptor, registry)?);
        tracing::debug!(
            type_name = %descriptor.full_name,
            fields = built.coders.len(),
            "built coder table"
        );

        let mut tables = self
            .tables
            .write()
            .map_err(|e| CodecError::malformed("coder cache", format!("lock poisoned: {e}")))?;
        let entry = tables
            .entry(descriptor.full_name.clone())
            .or_insert_with(|| Arc::clone(&built));
        Ok(Arc::clone(entry))
    }

    /// Get the coder for an extension field, building and caching it on
    /// first use.
    pub fn extension_coder(
        &self,
        field: &Arc<FieldDescriptor>,
        registry: &SchemaRegistry,
    ) -> Result<Arc<FieldCoder>> {
        let extendee = field.extendee.clone().ok_or_else(|| {
            CodecError::malformed(
                "coder cache",
                format!("field '{}' is not an extension", field.full_name),
            )
        })?;
        let key = (extendee, field.number);

        {
            let extensions = self
                .extensions
                .read()
                .map_err(|e| CodecError::malformed("coder cache", format!("lock poisoned: {e}")))?;
            if let Some(coder) = extensions.get(&key) {
                return Ok(Arc::clone(coder));
            }
        }

        let built = Arc::new(FieldCoder::build_extension(Arc::clone(field), registry)?);
        let mut extensions = self
            .extensions
            .write()
            .map_err(|e| CodecError::malformed("coder cache", format!("lock poisoned: {e}")))?;
        let entry = extensions.entry(key).or_insert_with(|| Arc::clone(&built));
        Ok(Arc::clone(entry))
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}
