//! Runtime values and host objects.
//!
//! A [`HostObject`] is an instance of a host type: a type descriptor plus
//! one [`Value`] slot per declared field. Writes are checked against the
//! field's declared type, the same way the host's own runtime would refuse
//! to store a component in a string field.

use std::sync::Arc;

use serde::Serialize;

use crate::{FieldType, HostError, TypeDescriptor};

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A chat component: the rich text type used by newer protocol eras for
/// titles, prefixes and suffixes.
///
/// Only the literal form is needed here; legacy formatting codes inside
/// `text` are kept as-is and rendered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Component {
    pub text: String,
}

impl Component {
    /// A component holding `text` verbatim.
    pub fn literal(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns `true` if the component renders nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EnumConstant
// ---------------------------------------------------------------------------

/// One constant of a host enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumConstant {
    /// Full name of the enum type.
    pub type_name: String,
    /// The constant's name.
    pub name: String,
    /// The constant's ordinal (its position in declaration order).
    pub ordinal: usize,
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A value stored in a host object's field.
///
/// `#[serde(tag = "kind", content = "value")]` gives adjacently tagged JSON:
///   `{ "kind": "Text", "value": "sb-1a2b3c4d" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    /// The null reference.
    Null,
    Int(i32),
    Bool(bool),
    Text(String),
    Component(Component),
    Enum(EnumConstant),
    Collection(Vec<Value>),
    Optional(Option<Box<Value>>),
    Object(HostObject),
}

impl Value {
    /// The value a freshly allocated, never-constructed field holds.
    ///
    /// Primitives are zeroed, references are null.
    pub fn zero_for(ty: &FieldType) -> Self {
        match ty {
            FieldType::Int => Self::Int(0),
            FieldType::Bool => Self::Bool(false),
            _ => Self::Null,
        }
    }

    /// Returns `true` if this value can be stored in a field of type `ty`.
    ///
    /// Null fits any reference type but never a primitive.
    pub fn fits(&self, ty: &FieldType) -> bool {
        match (self, ty) {
            (Self::Null, FieldType::Int | FieldType::Bool) => false,
            (Self::Null, _) => true,
            (Self::Int(_), FieldType::Int) => true,
            (Self::Bool(_), FieldType::Bool) => true,
            (Self::Text(_), FieldType::Text) => true,
            (Self::Component(_), FieldType::Component) => true,
            (Self::Enum(c), FieldType::Enum(name)) => &c.type_name == name,
            (Self::Collection(_), FieldType::Collection) => true,
            (Self::Optional(_), FieldType::Optional) => true,
            (Self::Object(o), FieldType::Object(name)) => o.type_name() == name,
            _ => false,
        }
    }

    /// A short label for error messages.
    pub fn kind(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Int(_) => "int".into(),
            Self::Bool(_) => "boolean".into(),
            Self::Text(_) => "String".into(),
            Self::Component(_) => "Component".into(),
            Self::Enum(c) => format!("enum {}", c.type_name),
            Self::Collection(_) => "Collection".into(),
            Self::Optional(_) => "Optional".into(),
            Self::Object(o) => o.type_name().to_string(),
        }
    }

    /// Returns the string if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int` value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// HostObject
// ---------------------------------------------------------------------------

/// An instance of a host type.
///
/// Holds one slot per declared field (statics included, so field indices
/// line up with the descriptor), but static slots are never written.
#[derive(Debug, Clone, Serialize)]
pub struct HostObject {
    #[serde(rename = "type")]
    type_name: String,
    values: Vec<Value>,
    #[serde(skip)]
    descriptor: Arc<TypeDescriptor>,
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.values == other.values
    }
}

impl Eq for HostObject {}

impl HostObject {
    /// An instance whose fields hold zero/null, as if memory were
    /// allocated without running any constructor.
    pub fn zeroed(descriptor: Arc<TypeDescriptor>) -> Self {
        let values = descriptor
            .fields
            .iter()
            .map(|f| Value::zero_for(&f.ty))
            .collect();
        Self {
            type_name: descriptor.name.clone(),
            values,
            descriptor,
        }
    }

    /// The instance's type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The instance's type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// All field values, aligned with the descriptor's field list.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Reads the field at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Writes the field at `index`, checking the value against the
    /// field's declared type.
    ///
    /// # Errors
    /// - [`HostError::NoSuchField`] if `index` is out of range
    /// - [`HostError::StaticField`] if the field is static
    /// - [`HostError::TypeMismatch`] if the value doesn't fit
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), HostError> {
        let field = self.descriptor.fields.get(index).ok_or_else(|| {
            HostError::NoSuchField {
                type_name: self.type_name.clone(),
                index,
            }
        })?;

        if field.is_static {
            return Err(HostError::StaticField {
                type_name: self.type_name.clone(),
                field: field.name.clone(),
            });
        }

        if !value.fits(&field.ty) {
            return Err(HostError::TypeMismatch {
                type_name: self.type_name.clone(),
                field: field.name.clone(),
                expected: field.ty.to_string(),
                actual: value.kind(),
            });
        }

        self.values[index] = value;
        Ok(())
    }

    /// Reads a field by its declared name. Only meant for tests and
    /// diagnostics: names are not stable across host releases.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.descriptor.fields.iter().position(|f| f.name == name)?;
        self.values.get(index)
    }
}
