//! The four scoreboard messages a sidebar is made of.
//!
//! - an **objective** named after the session id, carrying the title;
//! - a **display objective** putting it in the sidebar slot;
//! - one **score** per line, whose entry is that score's formatting code;
//! - one **team** per line, `"{id}:{score}"`, whose prefix and suffix hold
//!   the line's visible text.

use tallyboard_host::Value;
use tallyboard_protocol::format::{CODE_CHARS, COLOR_CHAR};
use tallyboard_protocol::{
    Era, EnumRole, KnownConstant, MessageRole, Packet, ProtocolError, SchemaRegistry, Slot,
};

/// Display slot number of the sidebar.
pub const SIDEBAR_SLOT: i32 = 1;

/// Team option value meaning "always".
const ALWAYS: &str = "always";

/// Objective packet mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveMode {
    Create,
    Remove,
    Update,
}

impl ObjectiveMode {
    pub fn code(self) -> i32 {
        match self {
            Self::Create => 0,
            Self::Remove => 1,
            Self::Update => 2,
        }
    }
}

/// Team packet mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamMode {
    Create,
    Remove,
    Update,
}

impl TeamMode {
    pub fn code(self) -> i32 {
        match self {
            Self::Create => 0,
            Self::Remove => 1,
            Self::Update => 2,
        }
    }
}

/// Score packet action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAction {
    Change,
    Remove,
}

impl ScoreAction {
    pub fn code(self) -> i32 {
        match self {
            Self::Change => 0,
            Self::Remove => 1,
        }
    }

    fn constant(self) -> KnownConstant {
        match self {
            Self::Change => KnownConstant::ScoreChange,
            Self::Remove => KnownConstant::ScoreRemove,
        }
    }
}

/// The score entry shown for `score`: its formatting code, which renders
/// as nothing.
pub fn entry_name(score: usize) -> String {
    let code = CODE_CHARS.get(score).copied().unwrap_or('r');
    format!("{COLOR_CHAR}{code}")
}

/// The team carrying the text for `score` of sidebar `id`.
pub fn team_name(id: &str, score: usize) -> String {
    format!("{id}:{score}")
}

/// Builds sidebar messages against one registry.
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Messages<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    fn era(&self) -> Era {
        self.registry.version().era
    }

    pub fn objective(
        &self,
        id: &str,
        mode: ObjectiveMode,
        title: &str,
    ) -> Result<Packet, ProtocolError> {
        let mut builder = self.registry.builder(MessageRole::Objective)?;
        builder
            .set_text(Slot::text(0), id)?
            .set_int(Slot::int(0), mode.code())?;

        if mode != ObjectiveMode::Remove {
            builder.set_display(Slot::display(1), title)?;
            if self.era().is_at_least(Era::V1_8) {
                builder.set(
                    Slot::enumeration(EnumRole::HealthDisplay, 0),
                    self.registry.constant(KnownConstant::HealthInteger)?,
                )?;
            }
        } else if self.era() == Era::V1_7 {
            builder.set_text(Slot::text(1), "")?;
        }

        builder.finish()
    }

    pub fn display_objective(&self, id: &str) -> Result<Packet, ProtocolError> {
        let mut builder = self.registry.builder(MessageRole::DisplayObjective)?;
        builder
            .set_int(Slot::int(0), SIDEBAR_SLOT)?
            .set_text(Slot::text(0), id)?;
        builder.finish()
    }

    pub fn score(
        &self,
        id: &str,
        score: usize,
        action: ScoreAction,
    ) -> Result<Packet, ProtocolError> {
        let layout = self.registry.layout();
        let mut builder = self.registry.builder(MessageRole::Score)?;
        builder.set_text(Slot::text(0), &entry_name(score))?;

        let action_slot = layout.score_action();
        if self.era().is_at_least(Era::V1_8) {
            builder.set(action_slot, self.registry.constant(action.constant())?)?;
        } else {
            builder.set_int(action_slot, action.code())?;
        }

        if action == ScoreAction::Change {
            builder
                .set_text(Slot::text(1), id)?
                .set_int(Slot::int(0), score_value(score))?;
        }

        builder.finish()
    }

    /// A team packet. `prefix` and `suffix` are ignored for removals.
    pub fn team(
        &self,
        id: &str,
        score: usize,
        mode: TeamMode,
        prefix: &str,
        suffix: &str,
    ) -> Result<Packet, ProtocolError> {
        let layout = self.registry.layout();
        let mut builder = self.registry.builder(MessageRole::Team)?;
        builder
            .set_text(Slot::text(0), &team_name(id, score))?
            .set_int(layout.team_mode(), mode.code())?;

        if mode == TeamMode::Remove {
            return builder.finish();
        }

        let (prefix_slot, suffix_slot) = layout.team_affixes();
        let (visibility, collision) = layout.team_rules();
        if layout.has_team_parameters() {
            let mut params = self.registry.builder(MessageRole::TeamParameters)?;
            params
                .set_display(Slot::display(0), "")?
                .set(
                    Slot::enumeration(EnumRole::ChatFormat, 0),
                    self.registry.constant(KnownConstant::ChatReset)?,
                )?
                .set_display(prefix_slot, prefix)?
                .set_display(suffix_slot, suffix)?
                .set_text(visibility, ALWAYS)?
                .set_text(collision, ALWAYS)?;
            let params = Value::Object(params.finish()?.into_object());
            builder.set(Slot::optional(0), Value::Optional(Some(Box::new(params))))?;
        } else {
            builder
                .set_display(prefix_slot, prefix)?
                .set_display(suffix_slot, suffix)?;
            builder.set_if_present(visibility, Value::Text(ALWAYS.into()))?;
            builder.set_if_present(collision, Value::Text(ALWAYS.into()))?;
        }

        if mode == TeamMode::Create {
            builder.set(
                Slot::collection(0),
                Value::Collection(vec![Value::Text(entry_name(score))]),
            )?;
        }

        builder.finish()
    }
}

fn score_value(score: usize) -> i32 {
    i32::try_from(score).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tallyboard_host::{CatalogHost, Release};

    use super::*;

    fn registry(release: Release) -> SchemaRegistry {
        SchemaRegistry::build(Arc::new(CatalogHost::release(release))).unwrap()
    }

    #[test]
    fn test_entry_and_team_names() {
        assert_eq!(entry_name(0), "§0");
        assert_eq!(entry_name(10), "§a");
        assert_eq!(entry_name(14), "§e");
        assert_eq!(team_name("sb-00000001", 3), "sb-00000001:3");
    }

    #[test]
    fn test_objective_create_sets_title_and_health_display() {
        let registry = registry(Release::V1_8R3);
        let packet = Messages::new(&registry)
            .objective("sb-1", ObjectiveMode::Create, "Title")
            .unwrap();
        let object = packet.object();
        assert_eq!(object.get_by_name("a"), Some(&Value::Text("sb-1".into())));
        assert_eq!(object.get_by_name("b"), Some(&Value::Text("Title".into())));
        assert!(matches!(object.get_by_name("c"), Some(Value::Enum(c)) if c.name == "INTEGER"));
        assert_eq!(object.get_by_name("d"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_objective_remove_on_v1_7_blanks_title() {
        let registry = registry(Release::V1_7R4);
        let packet = Messages::new(&registry)
            .objective("sb-1", ObjectiveMode::Remove, "ignored")
            .unwrap();
        assert_eq!(packet.object().get_by_name("b"), Some(&Value::Text(String::new())));
        assert_eq!(packet.object().get_by_name("c"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_objective_on_v1_17_skips_static_fields() {
        let registry = registry(Release::V1_17R1);
        let packet = Messages::new(&registry)
            .objective("sb-1", ObjectiveMode::Update, "§6Gold")
            .unwrap();
        let object = packet.object();
        assert_eq!(object.get_by_name("d"), Some(&Value::Text("sb-1".into())));
        assert!(matches!(object.get_by_name("e"), Some(Value::Component(c)) if c.text == "§6Gold"));
        assert_eq!(object.get_by_name("g"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_score_on_v1_7_uses_int_action() {
        let registry = registry(Release::V1_7R4);
        let packet = Messages::new(&registry)
            .score("sb-1", 4, ScoreAction::Change)
            .unwrap();
        let object = packet.object();
        assert_eq!(object.get_by_name("a"), Some(&Value::Text("§4".into())));
        assert_eq!(object.get_by_name("b"), Some(&Value::Text("sb-1".into())));
        assert_eq!(object.get_by_name("c"), Some(&Value::Int(4)));
        assert_eq!(object.get_by_name("d"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_score_remove_uses_enum_action() {
        let registry = registry(Release::V1_16R3);
        let packet = Messages::new(&registry)
            .score("sb-1", 2, ScoreAction::Remove)
            .unwrap();
        let object = packet.object();
        assert!(matches!(object.get_by_name("d"), Some(Value::Enum(c)) if c.name == "REMOVE"));
        assert_eq!(object.get_by_name("b"), Some(&Value::Null));
    }

    #[test]
    fn test_team_create_on_v1_8_writes_mode_after_color() {
        let registry = registry(Release::V1_8R3);
        let packet = Messages::new(&registry)
            .team("sb-1", 0, TeamMode::Create, "pre", "suf")
            .unwrap();
        let object = packet.object();
        assert_eq!(object.get_by_name("a"), Some(&Value::Text("sb-1:0".into())));
        assert_eq!(object.get_by_name("c"), Some(&Value::Text("pre".into())));
        assert_eq!(object.get_by_name("d"), Some(&Value::Text("suf".into())));
        assert_eq!(object.get_by_name("mode"), Some(&Value::Int(0)));
        assert_eq!(object.get_by_name("color"), Some(&Value::Int(-1)));
        assert_eq!(
            object.get_by_name("players"),
            Some(&Value::Collection(vec![Value::Text("§0".into())]))
        );
    }

    #[test]
    fn test_team_update_on_v1_12_sets_both_rules() {
        let registry = registry(Release::V1_12R1);
        let packet = Messages::new(&registry)
            .team("sb-1", 1, TeamMode::Update, "p", "")
            .unwrap();
        let object = packet.object();
        assert_eq!(object.get_by_name("e"), Some(&Value::Text("always".into())));
        assert_eq!(object.get_by_name("f"), Some(&Value::Text("always".into())));
        assert_eq!(object.get_by_name("mode"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_team_on_v1_17_nests_parameters() {
        let registry = registry(Release::V1_17R1);
        let packet = Messages::new(&registry)
            .team("sb-1", 0, TeamMode::Create, "§aleft", "right")
            .unwrap();
        assert_eq!(packet.object().get_by_name("g"), Some(&Value::Int(0)));

        let params = packet.nested(Slot::optional(0)).unwrap();
        assert!(matches!(params.get_by_name("a"), Some(Value::Component(c)) if c.is_empty()));
        assert!(matches!(params.get_by_name("b"), Some(Value::Component(c)) if c.text == "§aleft"));
        assert!(matches!(params.get_by_name("c"), Some(Value::Component(c)) if c.text == "right"));
        assert_eq!(params.get_by_name("d"), Some(&Value::Text("always".into())));
        assert!(matches!(params.get_by_name("f"), Some(Value::Enum(c)) if c.ordinal == 21));
    }

    #[test]
    fn test_team_remove_carries_only_identity() {
        let registry = registry(Release::V1_17R1);
        let packet = Messages::new(&registry)
            .team("sb-1", 5, TeamMode::Remove, "", "")
            .unwrap();
        assert_eq!(packet.object().get_by_name("g"), Some(&Value::Int(1)));
        assert_eq!(packet.object().get_by_name("j"), Some(&Value::Null));
    }
}
