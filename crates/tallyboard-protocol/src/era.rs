//! Protocol eras and the resolver that detects them.
//!
//! An era is a capability tier: a range of host releases whose scoreboard
//! internals behave the same way. The resolver probes the host once for
//! marker types, newest era first, and the first marker present wins.

use std::fmt;

use serde::Serialize;
use tallyboard_host::{Host, SERVER_PACKAGE_ROOT};

use crate::InitError;

/// Title length limit on legacy eras, in characters.
pub const LEGACY_TITLE_LIMIT: usize = 32;

/// Line length limit on legacy eras, in characters.
pub const LEGACY_LINE_LIMIT: usize = 30;

/// Team prefix/suffix limit on legacy eras.
pub const LEGACY_AFFIX_LIMIT: usize = 16;

/// Team prefix/suffix limit once chat components are used.
pub const COMPONENT_AFFIX_LIMIT: usize = 1024;

/// Marker type that only exists on repackaged hosts.
const REPACKAGED_MARKER: &str = "net.minecraft.network.protocol.Packet";

// ---------------------------------------------------------------------------
// Era
// ---------------------------------------------------------------------------

/// The host's protocol capability tier. Strictly ordered, oldest first, so
/// every era-dependent decision is a comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub enum Era {
    /// Plain strings everywhere; score actions are integers.
    V1_7,
    /// Enum score actions and the health display type appear.
    V1_8,
    /// Titles and team affixes become chat components.
    V1_13,
    /// Internals are repackaged; team parameters move to a nested type and
    /// most packets lose their no-arg constructor.
    V1_17,
}

impl Era {
    /// Every era, oldest first.
    pub const ALL: [Era; 4] = [Self::V1_7, Self::V1_8, Self::V1_13, Self::V1_17];

    /// Returns `true` if this era is `other` or newer.
    pub fn is_at_least(self, other: Era) -> bool {
        self >= other
    }

    /// Returns `true` for the plain-string eras, where titles, lines and
    /// team affixes have hard length limits.
    pub fn is_legacy(self) -> bool {
        !self.is_at_least(Self::V1_13)
    }

    /// Maximum length of a team prefix or suffix.
    pub fn affix_limit(self) -> usize {
        if self.is_legacy() {
            LEGACY_AFFIX_LIMIT
        } else {
            COMPONENT_AFFIX_LIMIT
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_7 => write!(f, "1.7"),
            Self::V1_8 => write!(f, "1.8"),
            Self::V1_13 => write!(f, "1.13"),
            Self::V1_17 => write!(f, "1.17"),
        }
    }
}

// ---------------------------------------------------------------------------
// HostNames
// ---------------------------------------------------------------------------

/// Builds fully qualified internal type names for the running host.
///
/// Before repackaging every internal type sat in one versioned package
/// (`net.minecraft.server.v1_8_R3.Foo`); afterwards they're spread across
/// functional packages (`net.minecraft.network.protocol.game.Foo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNames {
    repackaged: bool,
    version: String,
}

impl HostNames {
    /// Inspects the host's naming scheme.
    ///
    /// # Errors
    /// [`InitError::MalformedPackage`] if the host isn't repackaged and its
    /// server package carries no version segment.
    pub fn probe(host: &dyn Host) -> Result<Self, InitError> {
        let repackaged = host.find_type(REPACKAGED_MARKER).is_some();
        let package = host.server_package();
        let version = package
            .strip_prefix(SERVER_PACKAGE_ROOT)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or("")
            .to_string();

        if !repackaged && version.is_empty() {
            return Err(InitError::MalformedPackage(package.to_string()));
        }

        Ok(Self {
            repackaged,
            version,
        })
    }

    /// Returns `true` if the host uses the functional package layout.
    pub fn is_repackaged(&self) -> bool {
        self.repackaged
    }

    /// The versioned package segment, e.g. `v1_8_R3`. May be empty on
    /// repackaged hosts.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full name of an internal type. `package` is only used on repackaged
    /// hosts (`None` means the root `net.minecraft` package).
    pub fn internal(&self, package: Option<&str>, class: &str) -> String {
        match (self.repackaged, package) {
            (true, Some(package)) => format!("net.minecraft.{package}.{class}"),
            (true, None) => format!("net.minecraft.{class}"),
            (false, _) => {
                format!("net.minecraft.server.{}.{class}", self.version)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// VersionResolver
// ---------------------------------------------------------------------------

/// The outcome of probing a host: its era and naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersion {
    pub era: Era,
    pub names: HostNames,
}

impl HostVersion {
    /// Shorthand for `self.era.is_at_least(era)`.
    pub fn is_at_least(&self, era: Era) -> bool {
        self.era.is_at_least(era)
    }
}

/// Classifies a host into an [`Era`].
pub struct VersionResolver;

impl VersionResolver {
    /// Probes the host for era markers, newest first.
    ///
    /// Meant to run once; the result is kept by the schema registry.
    ///
    /// # Errors
    /// [`InitError::UnrecognizedHost`] if no marker is present, including
    /// the oldest era's.
    pub fn resolve(host: &dyn Host) -> Result<HostVersion, InitError> {
        let names = HostNames::probe(host)?;
        let present = |class: &str| {
            host.find_type(&names.internal(None, class)).is_some()
        };

        let era = if names.is_repackaged() {
            Era::V1_17
        } else if present("ScoreboardServer$Action") {
            Era::V1_13
        } else if present("IScoreboardCriteria$EnumScoreboardHealthDisplay") {
            Era::V1_8
        } else if present("PacketPlayOutScoreboardObjective") {
            Era::V1_7
        } else {
            return Err(InitError::UnrecognizedHost {
                package: host.server_package().to_string(),
            });
        };

        tracing::debug!(%era, version = names.version(), "resolved host era");
        Ok(HostVersion { era, names })
    }
}
