//! An in-memory host built from a catalog of type descriptors.
//!
//! [`CatalogHost::release`] models the scoreboard-related internals of real
//! server releases, one per protocol era plus one intermediate release
//! whose team layout differs within an era. It backs the test suites and
//! the demo server, and doubles as documentation of what each era's
//! internal layout looks like.
//!
//! The catalog is also a builder: tests remove types or the raw allocator
//! to exercise the fatal initialization paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{
    Component, EnumConstant, FieldType, Host, HostError, HostObject,
    RawAllocator, TypeDescriptor, Value,
};

/// Package prefix of the server implementation.
pub const SERVER_PACKAGE_ROOT: &str = "org.bukkit.craftbukkit";

/// Chat format constants, in ordinal order.
pub const CHAT_FORMATS: [&str; 22] = [
    "BLACK",
    "DARK_BLUE",
    "DARK_GREEN",
    "DARK_AQUA",
    "DARK_RED",
    "DARK_PURPLE",
    "GOLD",
    "GRAY",
    "DARK_GRAY",
    "BLUE",
    "GREEN",
    "AQUA",
    "RED",
    "LIGHT_PURPLE",
    "YELLOW",
    "WHITE",
    "OBFUSCATED",
    "BOLD",
    "STRIKETHROUGH",
    "UNDERLINE",
    "ITALIC",
    "RESET",
];

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// Server releases the catalog knows how to model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Release {
    /// Plain-string scoreboard packets, integer score actions.
    V1_7R4,
    /// Enum score actions and health display type.
    V1_8R3,
    /// Same era as 1.8, but teams gained a collision rule field.
    V1_12R1,
    /// Chat components for titles and team prefixes.
    V1_16R3,
    /// Repackaged internals; team parameters live in a nested type.
    V1_17R1,
}

impl Release {
    /// Every modelled release, oldest first.
    pub const ALL: [Release; 5] = [
        Self::V1_7R4,
        Self::V1_8R3,
        Self::V1_12R1,
        Self::V1_16R3,
        Self::V1_17R1,
    ];

    /// The version segment of the server package.
    pub fn package_version(self) -> &'static str {
        match self {
            Self::V1_7R4 => "v1_7_R4",
            Self::V1_8R3 => "v1_8_R3",
            Self::V1_12R1 => "v1_12_R1",
            Self::V1_16R3 => "v1_16_R3",
            Self::V1_17R1 => "v1_17_R1",
        }
    }

    fn is_repackaged(self) -> bool {
        matches!(self, Self::V1_17R1)
    }
}

// ---------------------------------------------------------------------------
// CatalogHost
// ---------------------------------------------------------------------------

/// A [`Host`] whose types come from a fixed catalog.
pub struct CatalogHost {
    package: String,
    types: HashMap<String, Arc<TypeDescriptor>>,
    /// Field writes performed by each type's no-arg constructor.
    constructor_effects: HashMap<String, Vec<(usize, Value)>>,
    raw_allocation: bool,
    allocator_lookups: AtomicUsize,
}

impl CatalogHost {
    /// An empty catalog for the given server package.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            types: HashMap::new(),
            constructor_effects: HashMap::new(),
            raw_allocation: true,
            allocator_lookups: AtomicUsize::new(0),
        }
    }

    /// Adds (or replaces) a type.
    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.types.insert(ty.name.clone(), Arc::new(ty));
        self
    }

    /// Records what the type's no-arg constructor writes, by field index.
    pub fn with_constructor_effects(
        mut self,
        type_name: &str,
        effects: Vec<(usize, Value)>,
    ) -> Self {
        self.constructor_effects
            .insert(type_name.to_string(), effects);
        self
    }

    /// Removes a type, simulating a host that lacks it.
    pub fn without_type(mut self, name: &str) -> Self {
        self.types.remove(name);
        self
    }

    /// Makes [`Host::raw_allocator`] fail.
    pub fn without_raw_allocator(mut self) -> Self {
        self.raw_allocation = false;
        self
    }

    /// How many times [`Host::raw_allocator`] has been called.
    pub fn allocator_lookups(&self) -> usize {
        self.allocator_lookups.load(Ordering::SeqCst)
    }

    /// Names of every catalogued type, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the catalog for a real server release.
    pub fn release(release: Release) -> Self {
        let names = Names::for_release(release);
        let host = Self::new(format!(
            "{SERVER_PACKAGE_ROOT}.{}",
            release.package_version()
        ));
        let host = common_types(host, &names);

        match release {
            Release::V1_7R4 => v1_7(host, &names),
            Release::V1_8R3 => v1_8(host, &names, false),
            Release::V1_12R1 => v1_8(host, &names, true),
            Release::V1_16R3 => v1_13(host, &names),
            Release::V1_17R1 => v1_17(host, &names),
        }
    }
}

impl Host for CatalogHost {
    fn server_package(&self) -> &str {
        &self.package
    }

    fn find_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    fn construct(
        &self,
        ty: &Arc<TypeDescriptor>,
    ) -> Result<HostObject, HostError> {
        if !ty.has_no_arg_constructor {
            return Err(HostError::NoSuchConstructor(ty.name.clone()));
        }
        let mut object = HostObject::zeroed(Arc::clone(ty));
        if let Some(effects) = self.constructor_effects.get(&ty.name) {
            for (index, value) in effects {
                object.set(*index, value.clone())?;
            }
        }
        Ok(object)
    }

    fn raw_allocator(&self) -> Result<Arc<dyn RawAllocator>, HostError> {
        self.allocator_lookups.fetch_add(1, Ordering::SeqCst);
        if self.raw_allocation {
            Ok(Arc::new(ZeroingAllocator))
        } else {
            Err(HostError::NoRawAllocator)
        }
    }

    fn component_from_text(&self, text: &str) -> Result<Value, HostError> {
        Ok(Value::Component(Component::literal(text)))
    }
}

/// Allocates instances with every field zeroed or null.
struct ZeroingAllocator;

impl RawAllocator for ZeroingAllocator {
    fn allocate(
        &self,
        ty: &Arc<TypeDescriptor>,
    ) -> Result<HostObject, HostError> {
        Ok(HostObject::zeroed(Arc::clone(ty)))
    }
}

// ---------------------------------------------------------------------------
// Release layouts
// ---------------------------------------------------------------------------

/// Internal type names for one release.
struct Names {
    repackaged: bool,
    version: &'static str,
}

impl Names {
    fn for_release(release: Release) -> Self {
        Self {
            repackaged: release.is_repackaged(),
            version: release.package_version(),
        }
    }

    fn nms(&self, package: Option<&str>, class: &str) -> String {
        match (self.repackaged, package) {
            (true, Some(package)) => format!("net.minecraft.{package}.{class}"),
            (true, None) => format!("net.minecraft.{class}"),
            (false, _) => format!("net.minecraft.server.{}.{class}", self.version),
        }
    }

    fn game(&self, class: &str) -> String {
        self.nms(Some("network.protocol.game"), class)
    }

    fn chat_format(&self) -> String {
        self.nms(None, "EnumChatFormat")
    }

    fn health_display(&self) -> String {
        self.nms(
            Some("world.scores.criteria"),
            "IScoreboardCriteria$EnumScoreboardHealthDisplay",
        )
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn reset(names: &Names) -> Value {
    Value::Enum(EnumConstant {
        type_name: names.chat_format(),
        name: "RESET".into(),
        ordinal: 21,
    })
}

fn common_types(host: CatalogHost, names: &Names) -> CatalogHost {
    let packet = if names.repackaged {
        names.nms(Some("network.protocol"), "Packet")
    } else {
        names.nms(None, "Packet")
    };
    host.with_type(TypeDescriptor::new(packet))
        .with_type(TypeDescriptor::new(
            names.nms(Some("network.chat"), "IChatBaseComponent"),
        ))
        .with_type(TypeDescriptor::new_enum(names.chat_format(), CHAT_FORMATS))
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardDisplayObjective"))
                .field("a", FieldType::Int)
                .field("b", FieldType::Text)
                .with_no_arg_constructor(),
        )
}

fn v1_7(host: CatalogHost, names: &Names) -> CatalogHost {
    let team = names.game("PacketPlayOutScoreboardTeam");
    host.with_type(
        TypeDescriptor::new(names.game("PacketPlayOutScoreboardObjective"))
            .field("a", FieldType::Text)
            .field("b", FieldType::Text)
            .field("c", FieldType::Int)
            .with_no_arg_constructor(),
    )
    .with_type(
        TypeDescriptor::new(names.game("PacketPlayOutScoreboardScore"))
            .field("a", FieldType::Text)
            .field("b", FieldType::Text)
            .field("c", FieldType::Int)
            .field("d", FieldType::Int)
            .with_no_arg_constructor(),
    )
    .with_type(
        TypeDescriptor::new(&team)
            .field("a", FieldType::Text)
            .field("b", FieldType::Text)
            .field("c", FieldType::Text)
            .field("d", FieldType::Text)
            .field("e", FieldType::Collection)
            .field("f", FieldType::Int)
            .field("g", FieldType::Int)
            .with_no_arg_constructor(),
    )
    .with_constructor_effects(
        &team,
        vec![
            (0, text("")),
            (1, text("")),
            (2, text("")),
            (3, text("")),
            (4, Value::Collection(Vec::new())),
        ],
    )
}

fn v1_8(host: CatalogHost, names: &Names, collision_rule: bool) -> CatalogHost {
    let health = names.health_display();
    let action = names.game("PacketPlayOutScoreboardScore$EnumScoreboardAction");
    let team = names.game("PacketPlayOutScoreboardTeam");

    let mut team_type = TypeDescriptor::new(&team)
        .field("a", FieldType::Text)
        .field("b", FieldType::Text)
        .field("c", FieldType::Text)
        .field("d", FieldType::Text)
        .field("e", FieldType::Text);
    let mut effects = vec![
        (0, text("")),
        (1, text("")),
        (2, text("")),
        (3, text("")),
        (4, text("always")),
    ];
    if collision_rule {
        team_type = team_type.field("f", FieldType::Text);
        effects.push((5, text("always")));
    }
    let color = team_type.fields.len();
    let team_type = team_type
        .field("color", FieldType::Int)
        .field("players", FieldType::Collection)
        .field("mode", FieldType::Int)
        .field("options", FieldType::Int)
        .with_no_arg_constructor();
    effects.push((color, Value::Int(-1)));
    effects.push((color + 1, Value::Collection(Vec::new())));

    host.with_type(TypeDescriptor::new_enum(&health, ["INTEGER", "HEARTS"]))
        .with_type(TypeDescriptor::new_enum(&action, ["CHANGE", "REMOVE"]))
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardObjective"))
                .field("a", FieldType::Text)
                .field("b", FieldType::Text)
                .field("c", FieldType::Enum(health.clone()))
                .field("d", FieldType::Int)
                .with_no_arg_constructor(),
        )
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardScore"))
                .inner(&action)
                .field("a", FieldType::Text)
                .field("b", FieldType::Text)
                .field("c", FieldType::Int)
                .field("d", FieldType::Enum(action.clone()))
                .with_no_arg_constructor(),
        )
        .with_type(team_type)
        .with_constructor_effects(&team, effects)
}

fn v1_13(host: CatalogHost, names: &Names) -> CatalogHost {
    let health = names.health_display();
    let action = names.nms(Some("server"), "ScoreboardServer$Action");
    let team = names.game("PacketPlayOutScoreboardTeam");
    let empty = Value::Component(Component::default());

    host.with_type(TypeDescriptor::new_enum(&health, ["INTEGER", "HEARTS"]))
        .with_type(TypeDescriptor::new_enum(&action, ["CHANGE", "REMOVE"]))
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardObjective"))
                .field("a", FieldType::Text)
                .field("b", FieldType::Component)
                .field("c", FieldType::Enum(health.clone()))
                .field("d", FieldType::Int)
                .with_no_arg_constructor(),
        )
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardScore"))
                .field("a", FieldType::Text)
                .field("b", FieldType::Text)
                .field("c", FieldType::Int)
                .field("d", FieldType::Enum(action.clone()))
                .with_no_arg_constructor(),
        )
        .with_type(
            TypeDescriptor::new(&team)
                .field("a", FieldType::Text)
                .field("b", FieldType::Component)
                .field("c", FieldType::Component)
                .field("d", FieldType::Component)
                .field("e", FieldType::Text)
                .field("f", FieldType::Text)
                .field("g", FieldType::Enum(names.chat_format()))
                .field("h", FieldType::Collection)
                .field("i", FieldType::Int)
                .field("j", FieldType::Int)
                .with_no_arg_constructor(),
        )
        .with_constructor_effects(
            &team,
            vec![
                (1, empty.clone()),
                (2, empty.clone()),
                (3, empty),
                (4, text("always")),
                (5, text("always")),
                (6, reset(names)),
                (7, Value::Collection(Vec::new())),
            ],
        )
}

fn v1_17(host: CatalogHost, names: &Names) -> CatalogHost {
    let health = names.health_display();
    let action = names.nms(Some("server"), "ScoreboardServer$Action");
    let team = names.game("PacketPlayOutScoreboardTeam");
    let team_action = format!("{team}$a");
    let parameters = format!("{team}$b");

    host.with_type(TypeDescriptor::new_enum(&health, ["INTEGER", "HEARTS"]))
        .with_type(TypeDescriptor::new_enum(&action, ["CHANGE", "REMOVE"]))
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardObjective"))
                .static_field("a", FieldType::Int)
                .static_field("b", FieldType::Int)
                .static_field("c", FieldType::Int)
                .field("d", FieldType::Text)
                .field("e", FieldType::Component)
                .field("f", FieldType::Enum(health.clone()))
                .field("g", FieldType::Int),
        )
        .with_type(
            TypeDescriptor::new(names.game("PacketPlayOutScoreboardScore"))
                .field("a", FieldType::Text)
                .field("b", FieldType::Text)
                .field("c", FieldType::Int)
                .field("d", FieldType::Enum(action.clone())),
        )
        .with_type(
            TypeDescriptor::new(&team)
                .inner(&team_action)
                .inner(&parameters)
                .static_field("a", FieldType::Int)
                .static_field("b", FieldType::Int)
                .static_field("c", FieldType::Int)
                .static_field("d", FieldType::Int)
                .static_field("e", FieldType::Int)
                .static_field("f", FieldType::Int)
                .field("g", FieldType::Int)
                .field("h", FieldType::Text)
                .field("i", FieldType::Collection)
                .field("j", FieldType::Optional),
        )
        .with_type(TypeDescriptor::new_enum(&team_action, ["ADD", "REMOVE"]))
        .with_type(
            TypeDescriptor::new(&parameters)
                .field("a", FieldType::Component)
                .field("b", FieldType::Component)
                .field("c", FieldType::Component)
                .field("d", FieldType::Text)
                .field("e", FieldType::Text)
                .field("f", FieldType::Enum(names.chat_format()))
                .field("g", FieldType::Int),
        )
}
