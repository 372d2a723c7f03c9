//! Message population and the finished [`Packet`].
//!
//! A constructed host object is blank. The only way to get something
//! sendable out of it is [`MessageBuilder::finish`], which refuses to
//! produce a packet until the role's identity slots have been written.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tallyboard_host::{FieldType, Host, HostObject, Value};

use crate::{MessageRole, MessageSchema, ProtocolError, Slot};

// ---------------------------------------------------------------------------
// MessageBuilder
// ---------------------------------------------------------------------------

/// Writes slots into a freshly constructed message.
pub struct MessageBuilder {
    schema: Arc<MessageSchema>,
    object: HostObject,
    identity: Vec<Slot>,
    written: HashSet<usize>,
    host: Arc<dyn Host>,
}

impl MessageBuilder {
    pub(crate) fn new(
        schema: Arc<MessageSchema>,
        object: HostObject,
        identity: Vec<Slot>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            schema,
            object,
            identity,
            written: HashSet::new(),
            host,
        }
    }

    pub fn role(&self) -> MessageRole {
        self.schema.role()
    }

    /// Writes `value` into the field `slot` addresses.
    ///
    /// # Errors
    /// [`ProtocolError::MissingSlot`] if the type has no such field, or a
    /// host error if the value doesn't fit the field.
    pub fn set(&mut self, slot: Slot, value: Value) -> Result<&mut Self, ProtocolError> {
        let index = self.schema.index_of(slot).ok_or(ProtocolError::MissingSlot {
            role: self.role(),
            slot,
        })?;
        self.object.set(index, value)?;
        self.written.insert(index);
        Ok(self)
    }

    pub fn set_text(&mut self, slot: Slot, text: &str) -> Result<&mut Self, ProtocolError> {
        self.set(slot, Value::Text(text.to_string()))
    }

    pub fn set_int(&mut self, slot: Slot, value: i32) -> Result<&mut Self, ProtocolError> {
        self.set(slot, Value::Int(value))
    }

    /// Writes display text, converting it to a chat component when the
    /// addressed field is one.
    pub fn set_display(&mut self, slot: Slot, text: &str) -> Result<&mut Self, ProtocolError> {
        let is_component = self
            .schema
            .field(slot)
            .and_then(|field| self.object.descriptor().fields.get(field.index))
            .is_some_and(|field| field.ty == FieldType::Component);
        let value = if is_component {
            self.host.component_from_text(text)?
        } else {
            Value::Text(text.to_string())
        };
        self.set(slot, value)
    }

    /// Like [`set`](Self::set), but a missing field is skipped. Returns
    /// whether the write happened.
    pub fn set_if_present(&mut self, slot: Slot, value: Value) -> Result<bool, ProtocolError> {
        if !self.schema.has(slot) {
            return Ok(false);
        }
        self.set(slot, value)?;
        Ok(true)
    }

    /// Checks the identity slots and seals the message.
    ///
    /// # Errors
    /// [`ProtocolError::Incomplete`] naming the first unwritten slot.
    pub fn finish(self) -> Result<Packet, ProtocolError> {
        for slot in &self.identity {
            let written = self
                .schema
                .index_of(*slot)
                .is_some_and(|index| self.written.contains(&index));
            if !written {
                return Err(ProtocolError::Incomplete {
                    role: self.role(),
                    slot: *slot,
                });
            }
        }
        Ok(Packet {
            role: self.schema.role(),
            object: self.object,
            schema: self.schema,
        })
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// A fully populated scoreboard message, ready to send.
///
/// Serializes as `{ "role": "Score", "object": { "type": ..., "values": [...] } }`.
#[derive(Debug, Clone, Serialize)]
pub struct Packet {
    role: MessageRole,
    object: HostObject,
    #[serde(skip)]
    schema: Arc<MessageSchema>,
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.object == other.object
    }
}

impl Packet {
    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn object(&self) -> &HostObject {
        &self.object
    }

    pub fn into_object(self) -> HostObject {
        self.object
    }

    /// Reads the value in a slot.
    pub fn get(&self, slot: Slot) -> Option<&Value> {
        self.schema
            .index_of(slot)
            .and_then(|index| self.object.get(index))
    }

    /// Reads a slot's text, whether it is stored as text or a component.
    pub fn display_text(&self, slot: Slot) -> Option<&str> {
        match self.get(slot)? {
            Value::Text(text) => Some(text),
            Value::Component(component) => Some(&component.text),
            _ => None,
        }
    }

    /// Reads a slot's integer.
    pub fn int(&self, slot: Slot) -> Option<i32> {
        self.get(slot).and_then(Value::as_int)
    }

    /// The object nested in a slot, unwrapping an optional wrapper.
    pub fn nested(&self, slot: Slot) -> Option<&HostObject> {
        match self.get(slot)? {
            Value::Object(object) => Some(object),
            Value::Optional(Some(inner)) => match inner.as_ref() {
                Value::Object(object) => Some(object),
                _ => None,
            },
            _ => None,
        }
    }
}
