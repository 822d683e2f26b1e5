// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe registry for message, enum and extension descriptors.
//!
//! Cross-type references in the descriptor model are plain full names; the
//! registry turns them back into descriptor handles. Messages reference each
//! other through it, which is what keeps cyclic schemas (A contains B
//! contains A) representable without embedding descriptors by value.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::error::{CodecError, Result};
use crate::schema::model::{
    validate_field_number, EnumDescriptor, FieldDescriptor, MessageDescriptor,
};

/// Registry of descriptors keyed by full name.
///
/// Uses `RwLock` for concurrent read access with exclusive write access.
/// Registration happens up front; lookups dominate afterwards.
pub struct SchemaRegistry {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Inner {
    messages: HashMap<String, Arc<MessageDescriptor>>,
    enums: HashMap<String, Arc<EnumDescriptor>>,
    /// Extensions keyed by (extended type, field number)
    extensions: HashMap<(String, u32), Arc<FieldDescriptor>>,
    /// The same extensions keyed by their own full name
    extensions_by_name: HashMap<String, Arc<FieldDescriptor>>,
}

impl SchemaRegistry {
    /// Create a registry with the `Any` well-known type pre-registered.
    pub fn new() -> Self {
        let registry = Self {
            inner: RwLock::new(Inner::default()),
        };
        registry
            .register_message(MessageDescriptor::any())
            .expect("Any registration cannot fail on an empty registry");
        registry
    }

    /// Register a message type, returning the shared handle.
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register_message(&self, descriptor: MessageDescriptor) -> Result<Arc<MessageDescriptor>> {
        let descriptor = Arc::new(descriptor);
        let mut inner = self.write()?;
        if inner
            .messages
            .insert(descriptor.full_name.clone(), Arc::clone(&descriptor))
            .is_some()
        {
            tracing::warn!(name = %descriptor.full_name, "replacing registered message type");
        }
        Ok(descriptor)
    }

    /// Register an enum type, returning the shared handle.
    pub fn register_enum(&self, descriptor: EnumDescriptor) -> Result<Arc<EnumDescriptor>> {
        let descriptor = Arc::new(descriptor);
        let mut inner = self.write()?;
        if inner
            .enums
            .insert(descriptor.full_name.clone(), Arc::clone(&descriptor))
            .is_some()
        {
            tracing::warn!(name = %descriptor.full_name, "replacing registered enum type");
        }
        Ok(descriptor)
    }

    /// Register an extension field, returning the shared handle.
    ///
    /// The descriptor must carry an extendee and a valid field number. Range
    /// admission against the extended type happens when a value is set or
    /// decoded, since the extendee may not be registered yet.
    pub fn register_extension(&self, descriptor: FieldDescriptor) -> Result<Arc<FieldDescriptor>> {
        let extendee = descriptor.extendee.clone().ok_or_else(|| {
            CodecError::malformed(
                "registry",
                format!("field '{}' is not an extension", descriptor.full_name),
            )
        })?;
        validate_field_number(descriptor.number)?;

        let descriptor = Arc::new(descriptor);
        let mut inner = self.write()?;
        if inner
            .extensions
            .insert((extendee, descriptor.number), Arc::clone(&descriptor))
            .is_some()
        {
            tracing::warn!(name = %descriptor.full_name, "replacing registered extension");
        }
        inner
            .extensions_by_name
            .insert(descriptor.full_name.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up a message type by full name.
    pub fn message(&self, full_name: &str) -> Option<Arc<MessageDescriptor>> {
        self.inner.read().ok()?.messages.get(full_name).cloned()
    }

    /// Look up an enum type by full name.
    pub fn enum_type(&self, full_name: &str) -> Option<Arc<EnumDescriptor>> {
        self.inner.read().ok()?.enums.get(full_name).cloned()
    }

    /// Look up an extension by extended type and field number.
    pub fn extension(&self, extendee: &str, number: u32) -> Option<Arc<FieldDescriptor>> {
        self.inner
            .read()
            .ok()?
            .extensions
            .get(&(extendee.to_string(), number))
            .cloned()
    }

    /// Look up an extension by its own full name, checking it extends the
    /// given type.
    pub fn extension_by_name(&self, extendee: &str, full_name: &str) -> Option<Arc<FieldDescriptor>> {
        let ext = self
            .inner
            .read()
            .ok()?
            .extensions_by_name
            .get(full_name)
            .cloned()?;
        (ext.extendee.as_deref() == Some(extendee)).then_some(ext)
    }

    /// Look up the canonical message-set extension of `extendee` whose
    /// message type is `type_name`.
    pub fn message_set_extension(
        &self,
        extendee: &str,
        type_name: &str,
    ) -> Option<Arc<FieldDescriptor>> {
        let inner = self.inner.read().ok()?;
        inner
            .extensions
            .iter()
            .filter(|((e, _), _)| e == extendee)
            .map(|(_, ext)| ext)
            .find(|ext| {
                ext.is_message_set_extension() && ext.type_name.as_deref() == Some(type_name)
            })
            .cloned()
    }

    /// Resolve an `Any` type URL to a message descriptor.
    ///
    /// Only the last `/`-separated segment identifies the type; the host
    /// prefix carries no meaning here.
    pub fn resolve_type_url(&self, type_url: &str) -> Option<Arc<MessageDescriptor>> {
        let full_name = type_url.rsplit('/').next()?;
        self.message(full_name)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| CodecError::malformed("registry", format!("lock poisoned: {e}")))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
