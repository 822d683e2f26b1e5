// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary wire-format codec.
//!
//! [`BinaryCodec`] is the entry point: it owns the coder-table cache and
//! drives the encoder and decoder against a shared schema registry.

pub mod decoder;
pub mod encoder;

pub use decoder::UnmarshalOptions;
pub use encoder::MarshalOptions;

use std::sync::Arc;

use crate::core::error::Result;
use crate::core::message::DynamicMessage;
use crate::encoding::table::TableCache;
use crate::encoding::validate::check_initialized;
use crate::schema::model::MessageDescriptor;
use crate::schema::registry::SchemaRegistry;

/// Codec between dynamic messages and the protobuf binary wire format.
pub struct BinaryCodec {
    registry: Arc<SchemaRegistry>,
    tables: TableCache,
}

impl BinaryCodec {
    /// Create a codec over the given registry.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            tables: TableCache::new(),
        }
    }

    /// The registry this codec resolves types through.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Marshal with default options.
    pub fn marshal(&self, message: &DynamicMessage) -> Result<Vec<u8>> {
        self.marshal_with(message, &MarshalOptions::default())
    }

    /// Marshal a message to wire bytes.
    ///
    /// Required-field validation runs after the payload is produced; with
    /// `allow_partial` unset a missing required field turns the call into
    /// an error.
    pub fn marshal_with(
        &self,
        message: &DynamicMessage,
        options: &MarshalOptions,
    ) -> Result<Vec<u8>> {
        let encoder = encoder::Encoder {
            tables: &self.tables,
            registry: &self.registry,
        };
        let bytes = encoder.encode(message)?;
        if !options.allow_partial {
            check_initialized(message)?;
        }
        Ok(bytes)
    }

    /// Unmarshal with default options.
    pub fn unmarshal(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<DynamicMessage> {
        self.unmarshal_with(data, descriptor, &UnmarshalOptions::default())
    }

    /// Unmarshal wire bytes into a fresh message of the given type.
    pub fn unmarshal_with(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        options: &UnmarshalOptions,
    ) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(Arc::clone(descriptor));
        self.unmarshal_into(data, &mut message, options)?;
        Ok(message)
    }

    /// Unmarshal wire bytes into an existing message, merging field by
    /// field: singular scalars overwrite, singular messages merge
    /// recursively, repeated fields append, map entries overwrite by key.
    pub fn unmarshal_into(
        &self,
        data: &[u8],
        message: &mut DynamicMessage,
        options: &UnmarshalOptions,
    ) -> Result<()> {
        let decoder = decoder::Decoder {
            tables: &self.tables,
            registry: &self.registry,
            options,
        };
        decoder.decode(data, message)?;
        if !options.allow_partial {
            check_initialized(message)?;
        }
        Ok(())
    }
}
