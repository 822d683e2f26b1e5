// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types: errors, dynamic values and dynamic messages.

pub mod error;
pub mod message;
pub mod value;

pub use error::{CodecError, Result};
pub use message::{DynamicMessage, ExtensionField};
pub use value::{MapKey, Value};
