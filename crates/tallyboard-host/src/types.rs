//! Type descriptors: what the host tells us about one of its internal types.
//!
//! Internal field names are obfuscated and change between releases, so
//! nothing above this layer addresses a field by name. A descriptor is
//! still useful though: the *order* and *types* of the fields are stable
//! enough within one protocol era to locate "the 2nd text field" or "the
//! only optional field".

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The declared type of a field, as far as this crate cares.
///
/// Only the shapes scoreboard messages actually use are modelled. Anything
/// else is `Object` carrying the host's type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// A primitive 32-bit integer.
    Int,
    /// A primitive boolean.
    Bool,
    /// A plain string.
    Text,
    /// A rich chat component (the host's chat base component type).
    Component,
    /// An enum; the payload is the enum type's full name.
    Enum(String),
    /// Any collection (list, set) of values.
    Collection,
    /// An optional wrapper around another value.
    Optional,
    /// Any other reference type, by full name.
    Object(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "boolean"),
            Self::Text => write!(f, "String"),
            Self::Component => write!(f, "Component"),
            Self::Enum(name) => write!(f, "enum {name}"),
            Self::Collection => write!(f, "Collection"),
            Self::Optional => write!(f, "Optional"),
            Self::Object(name) => write!(f, "{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// One declared field of a host type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The field's (usually obfuscated) name. Informational only.
    pub name: String,
    /// The declared type.
    pub ty: FieldType,
    /// `true` for class-level fields, which instances don't carry.
    pub is_static: bool,
}

impl FieldDescriptor {
    /// An instance field.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
        }
    }

    /// A class-level field.
    pub fn new_static(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

/// Everything the host reveals about one of its types.
///
/// `fields` holds the type's *own* declared fields in declaration order,
/// static ones included. Inherited fields are never listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully qualified type name.
    pub name: String,
    /// Own declared fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Full names of the types declared inside this one.
    pub inner_types: Vec<String>,
    /// Constants in ordinal order. Non-empty only for enums.
    pub enum_constants: Vec<String>,
    /// Whether a constructor taking no arguments is accessible.
    pub has_no_arg_constructor: bool,
}

impl TypeDescriptor {
    /// Starts a plain (non-enum) type with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            inner_types: Vec::new(),
            enum_constants: Vec::new(),
            has_no_arg_constructor: false,
        }
    }

    /// Builds an enum type from its constants, in ordinal order.
    pub fn new_enum<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_constants: constants.into_iter().map(Into::into).collect(),
            ..Self::new(name)
        }
    }

    /// Appends an instance field.
    pub fn field(mut self, name: &str, ty: FieldType) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// Appends a static field.
    pub fn static_field(mut self, name: &str, ty: FieldType) -> Self {
        self.fields.push(FieldDescriptor::new_static(name, ty));
        self
    }

    /// Declares an inner type by full name.
    pub fn inner(mut self, name: impl Into<String>) -> Self {
        self.inner_types.push(name.into());
        self
    }

    /// Marks the type as having an accessible no-arg constructor.
    pub fn with_no_arg_constructor(mut self) -> Self {
        self.has_no_arg_constructor = true;
        self
    }

    /// Returns `true` if this type is an enum.
    pub fn is_enum(&self) -> bool {
        !self.enum_constants.is_empty()
    }

    /// Looks up an enum constant's ordinal by name.
    pub fn enum_ordinal(&self, constant: &str) -> Option<usize> {
        self.enum_constants.iter().position(|c| c == constant)
    }
}
