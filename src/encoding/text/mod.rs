// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Text-format codec.
//!
//! [`TextCodec`] pairs the printer and parser over a shared registry. `Any`
//! expansion re-enters the binary codec: the printer decodes `value` bytes
//! through it, the parser re-encodes the expanded literal into them.

pub mod lexer;
pub mod parser;
pub mod printer;

pub use parser::TextUnmarshalOptions;
pub use printer::TextMarshalOptions;

use std::sync::Arc;

use crate::core::error::Result;
use crate::core::message::DynamicMessage;
use crate::encoding::binary::BinaryCodec;
use crate::encoding::validate::check_initialized;
use crate::schema::model::MessageDescriptor;
use crate::schema::registry::SchemaRegistry;

/// Codec between dynamic messages and the protobuf text format.
pub struct TextCodec {
    registry: Arc<SchemaRegistry>,
    binary: BinaryCodec,
}

impl TextCodec {
    /// Create a codec over the given registry.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            binary: BinaryCodec::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// The registry this codec resolves types through.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Marshal with default options: two-space indent, no `Any` expansion.
    pub fn marshal(&self, message: &DynamicMessage) -> Result<String> {
        self.marshal_with(message, &TextMarshalOptions::default())
    }

    /// Render a message as text. Output always ends with one newline.
    pub fn marshal_with(
        &self,
        message: &DynamicMessage,
        options: &TextMarshalOptions,
    ) -> Result<String> {
        let printer = printer::Printer {
            registry: &self.registry,
            binary: &self.binary,
            options,
            out: String::new(),
        };
        let text = printer.print(message)?;
        if !options.allow_partial {
            check_initialized(message)?;
        }
        Ok(text)
    }

    /// Unmarshal with default options.
    pub fn unmarshal(
        &self,
        text: &str,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<DynamicMessage> {
        self.unmarshal_with(text, descriptor, &TextUnmarshalOptions::default())
    }

    /// Parse text into a fresh message of the given type.
    pub fn unmarshal_with(
        &self,
        text: &str,
        descriptor: &Arc<MessageDescriptor>,
        options: &TextUnmarshalOptions,
    ) -> Result<DynamicMessage> {
        let mut message = DynamicMessage::new(Arc::clone(descriptor));
        self.unmarshal_into(text, &mut message, options)?;
        Ok(message)
    }

    /// Parse text into an existing message.
    pub fn unmarshal_into(
        &self,
        text: &str,
        message: &mut DynamicMessage,
        options: &TextUnmarshalOptions,
    ) -> Result<()> {
        let mut parser = parser::Parser {
            lexer: lexer::Lexer::new(text),
            lookahead: None,
            registry: &self.registry,
            binary: &self.binary,
            options,
        };
        parser.parse(message)?;
        if !options.allow_partial {
            check_initialized(message)?;
        }
        Ok(())
    }
}
