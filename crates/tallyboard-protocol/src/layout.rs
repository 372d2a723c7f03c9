//! Per-era message layouts.
//!
//! Internal field names are obfuscated, so a field is addressed by a
//! [`Slot`]: a coarse kind plus a position among fields of that kind
//! ("the 2nd display field", "the 1st int field"). [`EraLayout`] is the
//! strategy object holding every era-dependent choice about which type
//! plays which [`MessageRole`] and which slots it must carry.

use std::fmt;

use serde::Serialize;

use crate::Era;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// What a message type is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageRole {
    /// Creates, removes or retitles an objective.
    Objective,
    /// Places an objective in a display slot.
    DisplayObjective,
    /// Sets or removes a score entry.
    Score,
    /// Creates, removes or updates a team.
    Team,
    /// The team's nested display parameters (1.17 and newer).
    TeamParameters,
}

impl MessageRole {
    /// Every role, in resolution order. `TeamParameters` comes after
    /// `Team` because it's found inside the team type.
    pub const ALL: [MessageRole; 5] = [
        Self::Objective,
        Self::DisplayObjective,
        Self::Score,
        Self::Team,
        Self::TeamParameters,
    ];
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Objective => "objective",
            Self::DisplayObjective => "display-objective",
            Self::Score => "score",
            Self::Team => "team",
            Self::TeamParameters => "team-parameters",
        };
        f.write_str(name)
    }
}

/// Host enums the layer writes constants of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EnumRole {
    /// How an objective's scores render (`INTEGER` or `HEARTS`).
    HealthDisplay,
    /// Whether a score packet sets or removes the entry.
    ScoreAction,
    /// Chat colors and formats.
    ChatFormat,
}

impl fmt::Display for EnumRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HealthDisplay => "health-display",
            Self::ScoreAction => "score-action",
            Self::ChatFormat => "chat-format",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// The coarse kind a slot is counted among.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotKind {
    Text,
    Int,
    /// Text-or-component fields on component eras, text fields otherwise.
    /// Titles, prefixes and suffixes are addressed this way.
    Display,
    /// Fields whose type is the host enum playing this role.
    Enum(EnumRole),
    Collection,
    Optional,
}

/// A field address: the `position`-th field of `kind`, statics excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub kind: SlotKind,
    pub position: usize,
}

impl Slot {
    pub const fn text(position: usize) -> Self {
        Self {
            kind: SlotKind::Text,
            position,
        }
    }

    pub const fn int(position: usize) -> Self {
        Self {
            kind: SlotKind::Int,
            position,
        }
    }

    pub const fn display(position: usize) -> Self {
        Self {
            kind: SlotKind::Display,
            position,
        }
    }

    pub const fn enumeration(role: EnumRole, position: usize) -> Self {
        Self {
            kind: SlotKind::Enum(role),
            position,
        }
    }

    pub const fn collection(position: usize) -> Self {
        Self {
            kind: SlotKind::Collection,
            position,
        }
    }

    pub const fn optional(position: usize) -> Self {
        Self {
            kind: SlotKind::Optional,
            position,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SlotKind::Text => write!(f, "text#{}", self.position),
            SlotKind::Int => write!(f, "int#{}", self.position),
            SlotKind::Display => write!(f, "display#{}", self.position),
            SlotKind::Enum(role) => write!(f, "enum({role})#{}", self.position),
            SlotKind::Collection => write!(f, "collection#{}", self.position),
            SlotKind::Optional => write!(f, "optional#{}", self.position),
        }
    }
}

// ---------------------------------------------------------------------------
// Type locations
// ---------------------------------------------------------------------------

/// Where to find the host type playing a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLocation {
    /// A named internal type. `package` only matters on repackaged hosts.
    Named {
        package: Option<&'static str>,
        class: &'static str,
    },
    /// The first non-enum type declared inside another role's type.
    FirstNonEnumInnerOf(MessageRole),
}

const GAME: Option<&str> = Some("network.protocol.game");

// ---------------------------------------------------------------------------
// EraLayout
// ---------------------------------------------------------------------------

/// Every era-dependent layout decision, chosen once from the era.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraLayout {
    era: Era,
}

impl EraLayout {
    pub fn for_era(era: Era) -> Self {
        Self { era }
    }

    pub fn era(&self) -> Era {
        self.era
    }

    /// Whether chat components count as display fields.
    pub fn display_includes_components(&self) -> bool {
        self.era.is_at_least(Era::V1_13)
    }

    /// Roles this era has message types for.
    pub fn roles(&self) -> &'static [MessageRole] {
        if self.has_team_parameters() {
            &MessageRole::ALL
        } else {
            &MessageRole::ALL[..4]
        }
    }

    /// Whether team display fields live in a nested parameters type.
    pub fn has_team_parameters(&self) -> bool {
        self.era.is_at_least(Era::V1_17)
    }

    pub fn location(&self, role: MessageRole) -> TypeLocation {
        let class = match role {
            MessageRole::Objective => "PacketPlayOutScoreboardObjective",
            MessageRole::DisplayObjective => "PacketPlayOutScoreboardDisplayObjective",
            MessageRole::Score => "PacketPlayOutScoreboardScore",
            MessageRole::Team => "PacketPlayOutScoreboardTeam",
            MessageRole::TeamParameters => {
                return TypeLocation::FirstNonEnumInnerOf(MessageRole::Team);
            }
        };
        TypeLocation::Named {
            package: GAME,
            class,
        }
    }

    /// Where the enum playing `role` lives, or `None` if this era doesn't
    /// write that enum.
    pub fn enum_location(
        &self,
        role: EnumRole,
    ) -> Option<(Option<&'static str>, &'static str)> {
        match role {
            EnumRole::HealthDisplay if self.era.is_at_least(Era::V1_8) => Some((
                Some("world.scores.criteria"),
                "IScoreboardCriteria$EnumScoreboardHealthDisplay",
            )),
            EnumRole::ScoreAction if self.era.is_at_least(Era::V1_13) => {
                Some((Some("server"), "ScoreboardServer$Action"))
            }
            EnumRole::ScoreAction if self.era.is_at_least(Era::V1_8) => {
                Some((GAME, "PacketPlayOutScoreboardScore$EnumScoreboardAction"))
            }
            EnumRole::ChatFormat if self.has_team_parameters() => {
                Some((None, "EnumChatFormat"))
            }
            _ => None,
        }
    }

    /// The slot carrying a score packet's action.
    pub fn score_action(&self) -> Slot {
        if self.era.is_at_least(Era::V1_8) {
            Slot::enumeration(EnumRole::ScoreAction, 0)
        } else {
            Slot::int(1)
        }
    }

    /// The slot carrying a team packet's mode. On 1.8 through 1.12 the
    /// team color integer comes first.
    pub fn team_mode(&self) -> Slot {
        if self.era == Era::V1_8 {
            Slot::int(1)
        } else {
            Slot::int(0)
        }
    }

    /// Prefix and suffix slots, on the team type or on the parameters type
    /// when [`has_team_parameters`](Self::has_team_parameters).
    pub fn team_affixes(&self) -> (Slot, Slot) {
        if self.has_team_parameters() {
            (Slot::display(1), Slot::display(2))
        } else {
            (Slot::display(2), Slot::display(3))
        }
    }

    /// Name-tag visibility and collision rule slots. Before 1.17 these are
    /// optional: older releases lack one or both.
    pub fn team_rules(&self) -> (Slot, Slot) {
        if self.has_team_parameters() {
            (Slot::text(0), Slot::text(1))
        } else {
            (Slot::text(4), Slot::text(5))
        }
    }

    /// Slots a role's type must have for this era to be supported.
    pub fn required_slots(&self, role: MessageRole) -> Vec<Slot> {
        match role {
            MessageRole::Objective => {
                let mut slots = vec![Slot::text(0), Slot::int(0), Slot::display(1)];
                if self.era.is_at_least(Era::V1_8) {
                    slots.push(Slot::enumeration(EnumRole::HealthDisplay, 0));
                }
                slots
            }
            MessageRole::DisplayObjective => vec![Slot::int(0), Slot::text(0)],
            MessageRole::Score => {
                vec![Slot::text(0), Slot::text(1), Slot::int(0), self.score_action()]
            }
            MessageRole::Team => {
                let mut slots = vec![Slot::text(0), self.team_mode(), Slot::collection(0)];
                if self.has_team_parameters() {
                    slots.push(Slot::optional(0));
                } else {
                    let (prefix, suffix) = self.team_affixes();
                    slots.extend([prefix, suffix]);
                }
                slots
            }
            MessageRole::TeamParameters => {
                let (prefix, suffix) = self.team_affixes();
                let (visibility, collision) = self.team_rules();
                vec![
                    Slot::display(0),
                    prefix,
                    suffix,
                    visibility,
                    collision,
                    Slot::enumeration(EnumRole::ChatFormat, 0),
                ]
            }
        }
    }

    /// Slots that identify a message; a builder refuses to finish until
    /// all of them are written.
    pub fn identity_slots(&self, role: MessageRole) -> Vec<Slot> {
        match role {
            MessageRole::Objective => vec![Slot::text(0), Slot::int(0)],
            MessageRole::DisplayObjective => vec![Slot::int(0), Slot::text(0)],
            MessageRole::Score => vec![Slot::text(0), self.score_action()],
            MessageRole::Team => vec![Slot::text(0), self.team_mode()],
            MessageRole::TeamParameters => self.required_slots(role),
        }
    }
}
