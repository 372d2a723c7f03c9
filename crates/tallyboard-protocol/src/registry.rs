//! The schema registry: everything resolved about the host, once.
//!
//! Building the registry is the whole of initialization. It resolves the
//! era, finds the type for every message role, classifies their fields,
//! checks that every slot the era needs is present, resolves the enum
//! constants and picks a constructor per type. Any failure is fatal. After
//! that the registry is read-only and only hands out message builders.

use std::collections::HashMap;
use std::sync::Arc;

use tallyboard_host::{EnumConstant, Host, TypeDescriptor, Value};

use crate::{
    EnumRole, EraLayout, HostVersion, InitError, MessageBuilder, MessageRole,
    MessageSchema, PacketConstructor, PacketFactory, ProtocolError,
    TypeLocation, VersionResolver,
};

// ---------------------------------------------------------------------------
// Enum constants
// ---------------------------------------------------------------------------

/// Enum constants the layer writes into messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownConstant {
    HealthInteger,
    ScoreChange,
    ScoreRemove,
    ChatReset,
}

impl KnownConstant {
    pub const ALL: [KnownConstant; 4] = [
        Self::HealthInteger,
        Self::ScoreChange,
        Self::ScoreRemove,
        Self::ChatReset,
    ];

    pub fn role(self) -> EnumRole {
        match self {
            Self::HealthInteger => EnumRole::HealthDisplay,
            Self::ScoreChange | Self::ScoreRemove => EnumRole::ScoreAction,
            Self::ChatReset => EnumRole::ChatFormat,
        }
    }

    /// The constant's name on the host.
    pub fn name(self) -> &'static str {
        match self {
            Self::HealthInteger => "INTEGER",
            Self::ScoreChange => "CHANGE",
            Self::ScoreRemove => "REMOVE",
            Self::ChatReset => "RESET",
        }
    }

    /// Ordinal to use when the name isn't found.
    pub fn fallback_ordinal(self) -> usize {
        match self {
            Self::HealthInteger | Self::ScoreChange => 0,
            Self::ScoreRemove => 1,
            Self::ChatReset => 21,
        }
    }
}

/// Resolves a constant by name, falling back to its ordinal.
fn resolve_constant(
    ty: &TypeDescriptor,
    constant: KnownConstant,
) -> Result<EnumConstant, InitError> {
    let fallback = constant.fallback_ordinal();
    let ordinal = ty
        .enum_ordinal(constant.name())
        .or_else(|| (fallback < ty.enum_constants.len()).then_some(fallback))
        .ok_or_else(|| InitError::MissingEnumConstant {
            type_name: ty.name.clone(),
            name: constant.name().to_string(),
            fallback,
        })?;

    Ok(EnumConstant {
        type_name: ty.name.clone(),
        name: ty.enum_constants[ordinal].clone(),
        ordinal,
    })
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

struct RoleEntry {
    schema: Arc<MessageSchema>,
    constructor: PacketConstructor,
}

/// Immutable per-host state: era, schemas, constructors and constants.
pub struct SchemaRegistry {
    host: Arc<dyn Host>,
    version: HostVersion,
    layout: EraLayout,
    roles: HashMap<MessageRole, RoleEntry>,
    constants: HashMap<KnownConstant, EnumConstant>,
    factory: PacketFactory,
}

impl SchemaRegistry {
    /// Resolves everything about `host`. Runs once per layer.
    ///
    /// # Errors
    /// Any [`InitError`]: the host is unsupported and there is no degraded
    /// mode.
    pub fn build(host: Arc<dyn Host>) -> Result<Self, InitError> {
        let version = VersionResolver::resolve(host.as_ref())?;
        let layout = EraLayout::for_era(version.era);
        let factory = PacketFactory::new(Arc::clone(&host));

        let mut enum_types = HashMap::new();
        let mut constants = HashMap::new();
        for constant in KnownConstant::ALL {
            let Some((package, class)) = layout.enum_location(constant.role()) else {
                continue;
            };
            let name = version.names.internal(package, class);
            let ty = host
                .find_type(&name)
                .ok_or_else(|| InitError::MissingType(name.clone()))?;
            constants.insert(constant, resolve_constant(&ty, constant)?);
            enum_types.insert(name, constant.role());
        }

        let mut roles: HashMap<MessageRole, RoleEntry> = HashMap::new();
        for &role in layout.roles() {
            let ty = match layout.location(role) {
                TypeLocation::Named { package, class } => {
                    let name = version.names.internal(package, class);
                    host.find_type(&name).ok_or(InitError::MissingType(name))?
                }
                TypeLocation::FirstNonEnumInnerOf(outer) => {
                    let outer = roles
                        .get(&outer)
                        .map(|entry| entry.constructor.type_descriptor())
                        .ok_or(InitError::MissingType(outer.to_string()))?;
                    first_non_enum_inner(host.as_ref(), outer)?
                }
            };

            let schema = MessageSchema::build(
                role,
                &ty,
                layout.display_includes_components(),
                &enum_types,
            );
            if let Some(slot) = layout
                .required_slots(role)
                .into_iter()
                .find(|slot| !schema.has(*slot))
            {
                return Err(InitError::MissingField {
                    role,
                    type_name: ty.name.clone(),
                    slot,
                });
            }

            let constructor = factory.constructor_for(ty)?;
            roles.insert(
                role,
                RoleEntry {
                    schema: Arc::new(schema),
                    constructor,
                },
            );
        }

        tracing::info!(
            era = %version.era,
            version = version.names.version(),
            roles = roles.len(),
            "schema registry built"
        );

        Ok(Self {
            host,
            version,
            layout,
            roles,
            constants,
            factory,
        })
    }

    pub fn version(&self) -> &HostVersion {
        &self.version
    }

    pub fn layout(&self) -> &EraLayout {
        &self.layout
    }

    pub fn factory(&self) -> &PacketFactory {
        &self.factory
    }

    /// The schema for a role, if this era has one.
    pub fn schema(&self, role: MessageRole) -> Option<&Arc<MessageSchema>> {
        self.roles.get(&role).map(|entry| &entry.schema)
    }

    /// A resolved enum constant as a writable value.
    ///
    /// # Errors
    /// [`ProtocolError::MissingConstant`] if this era doesn't use it.
    pub fn constant(&self, constant: KnownConstant) -> Result<Value, ProtocolError> {
        self.constants
            .get(&constant)
            .cloned()
            .map(Value::Enum)
            .ok_or(ProtocolError::MissingConstant(constant.name()))
    }

    /// Starts a new message of the given role.
    ///
    /// # Errors
    /// [`ProtocolError::UnsupportedRole`] if this era has no such message,
    /// or a host error from instantiation.
    pub fn builder(&self, role: MessageRole) -> Result<MessageBuilder, ProtocolError> {
        let entry = self
            .roles
            .get(&role)
            .ok_or(ProtocolError::UnsupportedRole(role))?;
        let object = entry.constructor.construct()?;
        Ok(MessageBuilder::new(
            Arc::clone(&entry.schema),
            object,
            self.layout.identity_slots(role),
            Arc::clone(&self.host),
        ))
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("version", &self.version)
            .field("roles", &self.roles.len())
            .field("factory", &self.factory)
            .finish()
    }
}

fn first_non_enum_inner(
    host: &dyn Host,
    outer: &TypeDescriptor,
) -> Result<Arc<TypeDescriptor>, InitError> {
    outer
        .inner_types
        .iter()
        .filter_map(|name| host.find_type(name))
        .find(|ty| !ty.is_enum())
        .ok_or_else(|| InitError::NoMatchingInnerType(outer.name.clone()))
}
