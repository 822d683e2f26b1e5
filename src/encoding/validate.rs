// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Required-field validation.
//!
//! Runs at the end of marshal and unmarshal unless the caller opted into
//! partial semantics. The traversal visits every populated sub-message
//! reachable through singular, repeated, map-valued and extension fields
//! and reports the first missing required field by its dotted path.

use crate::core::error::{CodecError, Result};
use crate::core::message::DynamicMessage;
use crate::core::value::Value;

/// Verify that every required field is transitively present.
///
/// The returned error carries the path of the first missing field, e.g.
/// `outer.rpt_nested[2].req_bool`.
pub fn check_initialized(message: &DynamicMessage) -> Result<()> {
    let mut path = Vec::new();
    check_message(message, &mut path)
}

fn check_message(message: &DynamicMessage, path: &mut Vec<String>) -> Result<()> {
    for field in message.descriptor().required_fields() {
        if !message.has(field.number) {
            path.push(field.name.clone());
            return Err(CodecError::missing_required(path.join(".")));
        }
    }

    for (number, value) in message.fields() {
        let name = message
            .descriptor()
            .field(number)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| number.to_string());
        check_value(&name, value, path)?;
    }

    for ext in message.extensions() {
        let name = format!("({})", ext.descriptor.full_name);
        check_value(&name, &ext.value, path)?;
    }

    Ok(())
}

fn check_value(name: &str, value: &Value, path: &mut Vec<String>) -> Result<()> {
    match value {
        Value::Message(sub) => {
            path.push(name.to_string());
            check_message(sub, path)?;
            path.pop();
        }
        Value::List(elements) => {
            for (index, element) in elements.iter().enumerate() {
                if let Value::Message(sub) = element {
                    path.push(format!("{name}[{index}]"));
                    check_message(sub, path)?;
                    path.pop();
                }
            }
        }
        Value::Map(entries) => {
            for (key, entry_value) in entries {
                if let Value::Message(sub) = entry_value {
                    path.push(format!("{name}[{}]", key.to_value()));
                    check_message(sub, path)?;
                    path.pop();
                }
            }
        }
        _ => {}
    }
    Ok(())
}
