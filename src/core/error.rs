// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for protodyn.
//!
//! Every fallible codec operation reports one of a closed set of error
//! kinds:
//! - Wire-level parse failures (truncation, varint overflow, malformed tags)
//! - Text-format diagnostics (unknown names, duplicates, oneof conflicts)
//! - Validation failures (missing required fields, reserved field numbers)
//! - Name resolution failures for extensions and `Any` payloads

use std::fmt;

/// Errors that can occur while encoding, decoding or validating messages.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Wire input ended in the middle of a record.
    Truncated {
        /// Bytes the parser needed
        requested: usize,
        /// Bytes that were left
        available: usize,
        /// Byte offset at which the read was attempted
        position: usize,
    },

    /// A varint ran past ten bytes, or a parsed value exceeded the range of
    /// its target kind.
    Overflow {
        /// What was being parsed when the overflow happened
        context: String,
    },

    /// A record inside a structurally typed scope (map entry, packed block)
    /// carried the wrong wire type.
    WireTypeMismatch {
        /// Field the record belongs to
        field: String,
        /// Wire type required at this position
        expected: u8,
        /// Wire type found on the wire
        actual: u8,
    },

    /// Unrecognizable input: bad tag, invalid UTF-8 where required, syntax
    /// errors in the text format.
    Malformed {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Text input named a field the descriptor does not define.
    UnknownField {
        /// Name as written in the input
        name: String,
    },

    /// Text input set the same singular field twice.
    DuplicateField {
        /// Field name
        name: String,
    },

    /// Text input set two members of the same oneof.
    OneofConflict {
        /// Oneof group name
        oneof: String,
        /// Member whose assignment raised the conflict
        field: String,
    },

    /// A required field was absent on a fully validated encode or decode.
    MissingRequired {
        /// Dotted path to the first missing field, e.g. `foo.bar[3].qux`
        path: String,
    },

    /// An extension name or `Any` type URL could not be resolved.
    ResolveFailure {
        /// Name or URL that failed to resolve
        name: String,
    },

    /// A field number fell into the reserved range [19000, 19999].
    Reserved {
        /// Offending field number
        number: u32,
    },
}

impl CodecError {
    /// Create a truncation error.
    pub fn truncated(requested: usize, available: usize, position: usize) -> Self {
        CodecError::Truncated {
            requested,
            available,
            position,
        }
    }

    /// Create a varint or value-range overflow error.
    pub fn overflow(context: impl Into<String>) -> Self {
        CodecError::Overflow {
            context: context.into(),
        }
    }

    /// Create a wire type mismatch error.
    pub fn wire_type_mismatch(field: impl Into<String>, expected: u8, actual: u8) -> Self {
        CodecError::WireTypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Create a malformed-input error.
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Malformed {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-field-name error.
    pub fn unknown_field(name: impl Into<String>) -> Self {
        CodecError::UnknownField { name: name.into() }
    }

    /// Create a duplicate-singular-field error.
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        CodecError::DuplicateField { name: name.into() }
    }

    /// Create a oneof conflict error.
    pub fn oneof_conflict(oneof: impl Into<String>, field: impl Into<String>) -> Self {
        CodecError::OneofConflict {
            oneof: oneof.into(),
            field: field.into(),
        }
    }

    /// Create a missing-required-field error.
    pub fn missing_required(path: impl Into<String>) -> Self {
        CodecError::MissingRequired { path: path.into() }
    }

    /// Create a resolution failure error.
    pub fn resolve_failure(name: impl Into<String>) -> Self {
        CodecError::ResolveFailure { name: name.into() }
    }

    /// Create a reserved-field-number error.
    pub fn reserved(number: u32) -> Self {
        CodecError::Reserved { number }
    }

    /// Whether this error aborts parsing immediately, as opposed to the
    /// validation errors reported after the payload is produced.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, CodecError::MissingRequired { .. })
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Truncated {
                requested,
                available,
                position,
            } => write!(
                f,
                "truncated input: needed {requested} bytes at offset {position}, but only {available} remain"
            ),
            CodecError::Overflow { context } => {
                write!(f, "value overflow while parsing {context}")
            }
            CodecError::WireTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "wire type mismatch for field '{field}': expected {expected}, got {actual}"
            ),
            CodecError::Malformed { context, message } => {
                write!(f, "malformed {context}: {message}")
            }
            CodecError::UnknownField { name } => {
                write!(f, "unknown field name '{name}'")
            }
            CodecError::DuplicateField { name } => {
                write!(f, "field '{name}' set more than once")
            }
            CodecError::OneofConflict { oneof, field } => {
                write!(
                    f,
                    "field '{field}' conflicts with an already-set member of oneof '{oneof}'"
                )
            }
            CodecError::MissingRequired { path } => {
                write!(f, "required field '{path}' not set")
            }
            CodecError::ResolveFailure { name } => {
                write!(f, "unable to resolve '{name}'")
            }
            CodecError::Reserved { number } => {
                write!(
                    f,
                    "field number {number} lies in the reserved range [19000, 19999]"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Result type for protodyn operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_display() {
        let err = CodecError::truncated(8, 3, 12);
        assert!(matches!(err, CodecError::Truncated { .. }));
        assert_eq!(
            err.to_string(),
            "truncated input: needed 8 bytes at offset 12, but only 3 remain"
        );
    }

    #[test]
    fn test_overflow_display() {
        let err = CodecError::overflow("varint");
        assert_eq!(err.to_string(), "value overflow while parsing varint");
    }

    #[test]
    fn test_wire_type_mismatch_display() {
        let err = CodecError::wire_type_mismatch("entry.key", 0, 2);
        assert_eq!(
            err.to_string(),
            "wire type mismatch for field 'entry.key': expected 0, got 2"
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = CodecError::malformed("tag", "wire type 7 is not defined");
        assert_eq!(err.to_string(), "malformed tag: wire type 7 is not defined");
    }

    #[test]
    fn test_unknown_field_display() {
        let err = CodecError::unknown_field("no_such_field");
        assert_eq!(err.to_string(), "unknown field name 'no_such_field'");
    }

    #[test]
    fn test_duplicate_field_display() {
        let err = CodecError::duplicate_field("opt_int32");
        assert_eq!(err.to_string(), "field 'opt_int32' set more than once");
    }

    #[test]
    fn test_oneof_conflict_display() {
        let err = CodecError::oneof_conflict("union", "str_value");
        assert_eq!(
            err.to_string(),
            "field 'str_value' conflicts with an already-set member of oneof 'union'"
        );
    }

    #[test]
    fn test_missing_required_display() {
        let err = CodecError::missing_required("outer.req_bool");
        assert_eq!(err.to_string(), "required field 'outer.req_bool' not set");
    }

    #[test]
    fn test_resolve_failure_display() {
        let err = CodecError::resolve_failure("type.googleapis.com/pkg.Missing");
        assert_eq!(
            err.to_string(),
            "unable to resolve 'type.googleapis.com/pkg.Missing'"
        );
    }

    #[test]
    fn test_reserved_display() {
        let err = CodecError::reserved(19500);
        assert_eq!(
            err.to_string(),
            "field number 19500 lies in the reserved range [19000, 19999]"
        );
    }

    #[test]
    fn test_is_parse_error() {
        assert!(CodecError::overflow("varint").is_parse_error());
        assert!(CodecError::truncated(1, 0, 0).is_parse_error());
        assert!(!CodecError::missing_required("m.f").is_parse_error());
    }

    #[test]
    fn test_error_clone_and_eq() {
        let err = CodecError::malformed("string", "invalid UTF-8");
        assert_eq!(err, err.clone());
    }
}
