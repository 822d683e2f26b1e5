// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec implementations: wire primitives, coder tables, and the binary
//! and text codecs driven by them.

pub mod binary;
pub mod table;
pub mod text;
pub mod validate;
pub mod wire;

pub use binary::{BinaryCodec, MarshalOptions, UnmarshalOptions};
pub use table::{CoderMode, CoderTable, FieldCoder, TableCache};
pub use text::{TextCodec, TextMarshalOptions, TextUnmarshalOptions};
pub use validate::check_initialized;
pub use wire::WireType;
