// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic message values.
//!
//! A [`DynamicMessage`] is the in-memory form both codecs read and write:
//! populated fields keyed by number, an extension side table, and a verbatim
//! unknown-field buffer. The message owns no schema knowledge beyond the
//! descriptor handle it was created with; all structural decisions (oneof
//! clearing, extension admission) consult that descriptor.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::{CodecError, Result};
use crate::core::value::{MapKey, Value};
use crate::schema::model::{FieldDescriptor, MessageDescriptor};

/// An extension value together with the descriptor that defines it.
///
/// Extension descriptors live outside the extended message's schema, so the
/// handle travels with the value.
#[derive(Debug, Clone)]
pub struct ExtensionField {
    /// Descriptor of the extension field
    pub descriptor: Arc<FieldDescriptor>,
    /// Populated value
    pub value: Value,
}

/// A message value driven entirely by its descriptor.
///
/// Field iteration follows field-number order, which is what gives marshal
/// its deterministic field ordering without a sort pass.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    fields: BTreeMap<u32, Value>,
    extensions: BTreeMap<u32, ExtensionField>,
    unknown: Vec<u8>,
}

impl DynamicMessage {
    /// Create an empty message of the given type.
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
            extensions: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    /// The message's descriptor.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Shared handle to the message's descriptor.
    pub fn descriptor_arc(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Number of populated fields, extensions included.
    pub fn len(&self) -> usize {
        self.fields.len() + self.extensions.len()
    }

    /// Whether nothing is populated, the unknown buffer included.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extensions.is_empty() && self.unknown.is_empty()
    }

    /// Whether the field is populated.
    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Get a populated field value by number.
    pub fn get(&self, number: u32) -> Option<&Value> {
        self.fields.get(&number)
    }

    /// Get a mutable reference to a populated field value.
    pub fn get_mut(&mut self, number: u32) -> Option<&mut Value> {
        self.fields.get_mut(&number)
    }

    /// Get a populated field value by field name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let field = self.descriptor.field_by_name(name)?;
        self.fields.get(&field.number)
    }

    /// Populate a field.
    ///
    /// Setting a oneof member clears any previously-set sibling. Numbers not
    /// declared by the descriptor are rejected; extensions go through
    /// [`set_extension`](Self::set_extension).
    pub fn set(&mut self, number: u32, value: Value) -> Result<()> {
        if self.descriptor.field(number).is_none() {
            return Err(CodecError::malformed(
                "message",
                format!(
                    "field number {number} is not declared by {}",
                    self.descriptor.full_name
                ),
            ));
        }
        if let Some(oneof) = self.descriptor.oneof_containing(number) {
            for &member in &oneof.fields {
                if member != number {
                    self.fields.remove(&member);
                }
            }
        }
        self.fields.insert(number, value);
        Ok(())
    }

    /// Clear a field, returning its previous value.
    pub fn clear(&mut self, number: u32) -> Option<Value> {
        self.fields.remove(&number)
    }

    /// Append an element to a repeated field, creating the list on first use.
    pub fn push(&mut self, number: u32, value: Value) -> Result<()> {
        if !self.fields.contains_key(&number) {
            return self.set(number, Value::List(vec![value]));
        }
        match self.fields.get_mut(&number) {
            Some(Value::List(list)) => {
                list.push(value);
                Ok(())
            }
            other => Err(CodecError::malformed(
                "message",
                format!(
                    "field {number} holds a {}, not a list",
                    other.map(|v| v.type_name()).unwrap_or("nothing")
                ),
            )),
        }
    }

    /// Insert a map entry, creating the map on first use. A repeated key
    /// overwrites the earlier entry (last write wins).
    pub fn map_insert(&mut self, number: u32, key: MapKey, value: Value) -> Result<()> {
        if !self.fields.contains_key(&number) {
            let mut map = BTreeMap::new();
            map.insert(key, value);
            return self.set(number, Value::Map(map));
        }
        match self.fields.get_mut(&number) {
            Some(Value::Map(map)) => {
                map.insert(key, value);
                Ok(())
            }
            other => Err(CodecError::malformed(
                "message",
                format!(
                    "field {number} holds a {}, not a map",
                    other.map(|v| v.type_name()).unwrap_or("nothing")
                ),
            )),
        }
    }

    /// Iterate populated fields in field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (u32, &Value)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    /// Populate an extension field.
    ///
    /// The descriptor must extend this message type and its number must fall
    /// inside a declared extension range.
    pub fn set_extension(&mut self, descriptor: Arc<FieldDescriptor>, value: Value) -> Result<()> {
        match descriptor.extendee.as_deref() {
            Some(extendee) if extendee == self.descriptor.full_name => {}
            _ => {
                return Err(CodecError::malformed(
                    "message",
                    format!(
                        "'{}' does not extend {}",
                        descriptor.full_name, self.descriptor.full_name
                    ),
                ))
            }
        }
        if !self.descriptor.accepts_extension(descriptor.number) {
            return Err(CodecError::malformed(
                "message",
                format!(
                    "number {} is outside the extension ranges of {}",
                    descriptor.number, self.descriptor.full_name
                ),
            ));
        }
        self.extensions
            .insert(descriptor.number, ExtensionField { descriptor, value });
        Ok(())
    }

    /// Get a populated extension value by number.
    pub fn extension(&self, number: u32) -> Option<&Value> {
        self.extensions.get(&number).map(|e| &e.value)
    }

    /// Get a mutable reference to a populated extension value.
    pub fn extension_mut(&mut self, number: u32) -> Option<&mut Value> {
        self.extensions.get_mut(&number).map(|e| &mut e.value)
    }

    /// Whether the extension is populated.
    pub fn has_extension(&self, number: u32) -> bool {
        self.extensions.contains_key(&number)
    }

    /// Clear an extension, returning its previous entry.
    pub fn clear_extension(&mut self, number: u32) -> Option<ExtensionField> {
        self.extensions.remove(&number)
    }

    /// Iterate populated extensions in field-number order.
    pub fn extensions(&self) -> impl Iterator<Item = &ExtensionField> {
        self.extensions.values()
    }

    /// The unknown-field buffer, verbatim in arrival order.
    pub fn unknown(&self) -> &[u8] {
        &self.unknown
    }

    /// Append raw record bytes to the unknown-field buffer.
    pub fn append_unknown(&mut self, bytes: &[u8]) {
        self.unknown.extend_from_slice(bytes);
    }

    /// Replace the unknown-field buffer.
    pub fn set_unknown(&mut self, bytes: Vec<u8>) {
        self.unknown = bytes;
    }

    /// Drop all unknown-field bytes.
    pub fn clear_unknown(&mut self) {
        self.unknown.clear();
    }

    /// Merge another message of the same type into this one.
    ///
    /// Singular scalars overwrite, singular messages merge recursively,
    /// repeated fields concatenate, map entries overwrite by key, and
    /// unknown bytes append.
    pub fn merge_from(&mut self, other: &DynamicMessage) -> Result<()> {
        if self.descriptor.full_name != other.descriptor.full_name {
            return Err(CodecError::malformed(
                "message",
                format!(
                    "cannot merge {} into {}",
                    other.descriptor.full_name, self.descriptor.full_name
                ),
            ));
        }
        for (number, value) in other.fields() {
            self.merge_field(number, value)?;
        }
        for ext in other.extensions() {
            use std::collections::btree_map::Entry;
            match self.extensions.entry(ext.descriptor.number) {
                Entry::Occupied(mut occupied) => {
                    merge_value(&mut occupied.get_mut().value, &ext.value)?;
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(ExtensionField {
                        descriptor: Arc::clone(&ext.descriptor),
                        value: ext.value.clone(),
                    });
                }
            }
        }
        self.unknown.extend_from_slice(&other.unknown);
        Ok(())
    }

    fn merge_field(&mut self, number: u32, value: &Value) -> Result<()> {
        if !self.fields.contains_key(&number) {
            return self.set(number, value.clone());
        }
        let existing = self.fields.get_mut(&number).expect("presence checked");
        merge_value(existing, value)
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) -> Result<()> {
    match (existing, incoming) {
        (Value::Message(a), Value::Message(b)) => a.merge_from(b),
        (Value::List(a), Value::List(b)) => {
            a.extend(b.iter().cloned());
            Ok(())
        }
        (Value::Map(a), Value::Map(b)) => {
            for (k, v) in b {
                a.insert(k.clone(), v.clone());
            }
            Ok(())
        }
        (slot, value) => {
            *slot = value.clone();
            Ok(())
        }
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        if self.descriptor.full_name != other.descriptor.full_name
            || self.fields != other.fields
            || self.unknown != other.unknown
            || self.extensions.len() != other.extensions.len()
        {
            return false;
        }
        self.extensions.iter().all(|(number, ext)| {
            other.extensions.get(number).is_some_and(|o| {
                o.descriptor.full_name == ext.descriptor.full_name && o.value == ext.value
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{
        Cardinality, ExtensionRange, Kind, OneofDescriptor, Syntax,
    };

    fn union_descriptor() -> Arc<MessageDescriptor> {
        Arc::new(
            MessageDescriptor::new(
                "test.Union",
                Syntax::Proto3,
                vec![
                    FieldDescriptor::new("str_value", 1, Kind::String, Cardinality::Singular)
                        .with_oneof(0),
                    FieldDescriptor::new("int_value", 2, Kind::Int32, Cardinality::Singular)
                        .with_oneof(0),
                    FieldDescriptor::new("plain", 3, Kind::Bool, Cardinality::Singular),
                    FieldDescriptor::new("items", 4, Kind::Int32, Cardinality::Repeated),
                ],
                vec![OneofDescriptor::new("union")],
                Vec::new(),
            )
            .unwrap(),
        )
    }

    fn extendable_descriptor() -> Arc<MessageDescriptor> {
        Arc::new(
            MessageDescriptor::new(
                "test.Extendable",
                Syntax::Proto2,
                vec![FieldDescriptor::new("a", 1, Kind::Int32, Cardinality::Optional)],
                Vec::new(),
                vec![ExtensionRange { start: 100, end: 199 }],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_set_get_clear() {
        let mut msg = DynamicMessage::new(union_descriptor());
        assert!(msg.is_empty());

        msg.set(3, Value::Bool(true)).unwrap();
        assert!(msg.has(3));
        assert_eq!(msg.get(3), Some(&Value::Bool(true)));
        assert_eq!(msg.get_by_name("plain"), Some(&Value::Bool(true)));

        assert_eq!(msg.clear(3), Some(Value::Bool(true)));
        assert!(!msg.has(3));
    }

    #[test]
    fn test_set_undeclared_number_rejected() {
        let mut msg = DynamicMessage::new(union_descriptor());
        assert!(msg.set(99, Value::Bool(true)).is_err());
    }

    #[test]
    fn test_oneof_set_clears_sibling() {
        let mut msg = DynamicMessage::new(union_descriptor());
        msg.set(1, Value::String("a".to_string())).unwrap();
        msg.set(2, Value::Int32(5)).unwrap();

        assert!(!msg.has(1), "setting int_value must clear str_value");
        assert_eq!(msg.get(2), Some(&Value::Int32(5)));
    }

    #[test]
    fn test_push_builds_list() {
        let mut msg = DynamicMessage::new(union_descriptor());
        msg.push(4, Value::Int32(1)).unwrap();
        msg.push(4, Value::Int32(2)).unwrap();
        assert_eq!(
            msg.get(4).unwrap().as_list().unwrap(),
            &[Value::Int32(1), Value::Int32(2)]
        );
    }

    #[test]
    fn test_fields_iterate_in_number_order() {
        let mut msg = DynamicMessage::new(union_descriptor());
        msg.set(4, Value::List(vec![])).unwrap();
        msg.set(2, Value::Int32(1)).unwrap();
        let numbers: Vec<u32> = msg.fields().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_extension_admission() {
        let desc = extendable_descriptor();
        let mut msg = DynamicMessage::new(Arc::clone(&desc));

        let ext = Arc::new(
            FieldDescriptor::new("ext_bool", 101, Kind::Bool, Cardinality::Optional)
                .with_extendee("test.Extendable", "test"),
        );
        msg.set_extension(Arc::clone(&ext), Value::Bool(true)).unwrap();
        assert!(msg.has_extension(101));
        assert_eq!(msg.extension(101), Some(&Value::Bool(true)));

        let outside = Arc::new(
            FieldDescriptor::new("ext_far", 500, Kind::Bool, Cardinality::Optional)
                .with_extendee("test.Extendable", "test"),
        );
        assert!(msg.set_extension(outside, Value::Bool(true)).is_err());

        let wrong_type = Arc::new(
            FieldDescriptor::new("ext_other", 101, Kind::Bool, Cardinality::Optional)
                .with_extendee("test.Other", "test"),
        );
        let mut msg2 = DynamicMessage::new(desc);
        assert!(msg2.set_extension(wrong_type, Value::Bool(true)).is_err());
    }

    #[test]
    fn test_unknown_buffer_appends_in_order() {
        let mut msg = DynamicMessage::new(union_descriptor());
        msg.append_unknown(&[0x08, 0x01]);
        msg.append_unknown(&[0x10, 0x02]);
        assert_eq!(msg.unknown(), &[0x08, 0x01, 0x10, 0x02]);
        msg.clear_unknown();
        assert!(msg.unknown().is_empty());
    }

    #[test]
    fn test_merge_scalars_overwrite_lists_concatenate() {
        let desc = union_descriptor();
        let mut a = DynamicMessage::new(Arc::clone(&desc));
        a.set(3, Value::Bool(false)).unwrap();
        a.push(4, Value::Int32(1)).unwrap();

        let mut b = DynamicMessage::new(desc);
        b.set(3, Value::Bool(true)).unwrap();
        b.push(4, Value::Int32(2)).unwrap();
        b.append_unknown(&[0x28, 0x07]);

        a.merge_from(&b).unwrap();
        assert_eq!(a.get(3), Some(&Value::Bool(true)));
        assert_eq!(
            a.get(4).unwrap().as_list().unwrap(),
            &[Value::Int32(1), Value::Int32(2)]
        );
        assert_eq!(a.unknown(), &[0x28, 0x07]);
    }

    #[test]
    fn test_merge_type_mismatch_rejected() {
        let mut a = DynamicMessage::new(union_descriptor());
        let b = DynamicMessage::new(extendable_descriptor());
        assert!(a.merge_from(&b).is_err());
    }

    #[test]
    fn test_map_insert_last_wins() {
        let desc = Arc::new(
            MessageDescriptor::new(
                "test.WithMap",
                Syntax::Proto3,
                vec![FieldDescriptor::new("int32_to_str", 1, Kind::Message, Cardinality::Repeated)
                    .with_type_name("test.WithMap.Int32ToStrEntry")],
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        );
        let mut msg = DynamicMessage::new(desc);
        msg.map_insert(1, MapKey::Int32(0), Value::String("cero".to_string()))
            .unwrap();
        msg.map_insert(1, MapKey::Int32(0), Value::String("zero".to_string()))
            .unwrap();

        let map = msg.get(1).unwrap().as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&MapKey::Int32(0)),
            Some(&Value::String("zero".to_string()))
        );
    }

    #[test]
    fn test_equality_includes_unknown_bytes() {
        let desc = union_descriptor();
        let mut a = DynamicMessage::new(Arc::clone(&desc));
        let mut b = DynamicMessage::new(desc);
        assert_eq!(a, b);

        a.append_unknown(&[0x08, 0x01]);
        assert_ne!(a, b);
        b.append_unknown(&[0x08, 0x01]);
        assert_eq!(a, b);
    }
}
