//! Message schemas: a host type's fields, classified and counted.
//!
//! A schema turns a [`Slot`] ("the 2nd display field") into a concrete
//! field index on the host object. It is computed once per message type
//! and shared read-only.

use std::collections::HashMap;

use serde::Serialize;
use tallyboard_host::{FieldType, TypeDescriptor};

use crate::{EnumRole, MessageRole, Slot, SlotKind};

/// Coarse classification of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldCategory {
    Text,
    Int,
    Component,
    /// An enum whose type plays a known role on this era.
    KnownEnum(EnumRole),
    Collection,
    Optional,
    /// Anything else: booleans, unknown enums, other references.
    Other,
}

/// One non-static field of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    /// Index into the host object's field list (statics included).
    pub index: usize,
    pub name: String,
    pub category: FieldCategory,
    /// Position among fields of the same category.
    pub position: usize,
    /// Position among display-capable fields, if this is one.
    pub display_position: Option<usize>,
}

/// The classified field list of one message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSchema {
    role: MessageRole,
    type_name: String,
    fields: Vec<SchemaField>,
}

impl MessageSchema {
    /// Classifies `ty`'s own non-static fields in declaration order.
    ///
    /// `components_display` decides whether component fields share the
    /// display counter with text fields. `enum_types` maps the host's enum
    /// type names to the roles they play.
    pub fn build(
        role: MessageRole,
        ty: &TypeDescriptor,
        components_display: bool,
        enum_types: &HashMap<String, EnumRole>,
    ) -> Self {
        let mut counters: HashMap<FieldCategory, usize> = HashMap::new();
        let mut display_counter = 0;
        let mut fields = Vec::new();

        for (index, field) in ty.fields.iter().enumerate() {
            if field.is_static {
                continue;
            }
            let category = match &field.ty {
                FieldType::Text => FieldCategory::Text,
                FieldType::Int => FieldCategory::Int,
                FieldType::Component => FieldCategory::Component,
                FieldType::Enum(name) => enum_types
                    .get(name)
                    .map_or(FieldCategory::Other, |role| FieldCategory::KnownEnum(*role)),
                FieldType::Collection => FieldCategory::Collection,
                FieldType::Optional => FieldCategory::Optional,
                FieldType::Bool | FieldType::Object(_) => FieldCategory::Other,
            };

            let counter = counters.entry(category).or_insert(0);
            let position = *counter;
            *counter += 1;

            let is_display = category == FieldCategory::Text
                || (components_display && category == FieldCategory::Component);
            let display_position = is_display.then(|| {
                display_counter += 1;
                display_counter - 1
            });

            fields.push(SchemaField {
                index,
                name: field.name.clone(),
                category,
                position,
                display_position,
            });
        }

        Self {
            role,
            type_name: ty.name.clone(),
            fields,
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Finds the field a slot addresses.
    pub fn field(&self, slot: Slot) -> Option<&SchemaField> {
        self.fields.iter().find(|field| match slot.kind {
            SlotKind::Display => field.display_position == Some(slot.position),
            kind => category_for(kind) == field.category && field.position == slot.position,
        })
    }

    /// The host object field index a slot addresses.
    pub fn index_of(&self, slot: Slot) -> Option<usize> {
        self.field(slot).map(|field| field.index)
    }

    /// Returns `true` if the slot resolves to a field.
    pub fn has(&self, slot: Slot) -> bool {
        self.field(slot).is_some()
    }
}

fn category_for(kind: SlotKind) -> FieldCategory {
    match kind {
        SlotKind::Text => FieldCategory::Text,
        SlotKind::Int => FieldCategory::Int,
        SlotKind::Enum(role) => FieldCategory::KnownEnum(role),
        SlotKind::Collection => FieldCategory::Collection,
        SlotKind::Optional => FieldCategory::Optional,
        // Display slots are matched on display_position instead.
        SlotKind::Display => FieldCategory::Component,
    }
}
