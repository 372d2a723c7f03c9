//! Integration tests for sidebars against every modelled host release.
//!
//! Each test registers a `ChannelConnection` for its client and decodes
//! the packets that arrive on the receiver into [`Event`]s, so assertions
//! read as the sequence of scoreboard operations the client saw.

use std::collections::HashSet;
use std::sync::Arc;

use tallyboard_host::{CatalogHost, Release, Value};
use tallyboard_protocol::format::CODE_CHARS;
use tallyboard_protocol::{Era, InitError, MessageRole, Packet, Slot};
use tallyboard_session::{
    PacketLayer, SessionConfig, SessionError, SidebarManager, SidebarStatus,
};
use tallyboard_transport::{ChannelConnection, ClientId, ConnectionRegistry, PacketReceiver};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Objective { mode: i32, title: Option<String> },
    Display,
    ScoreChange(usize),
    ScoreRemove(usize),
    TeamCreate(usize),
    TeamRemove(usize),
    TeamUpdate { score: usize, prefix: String, suffix: String },
}

struct Harness {
    manager: SidebarManager,
    registry: Arc<ConnectionRegistry>,
}

impl Harness {
    fn new(release: Release) -> Self {
        Self::with_config(release, SessionConfig::default())
    }

    fn with_config(release: Release, config: SessionConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let layer = PacketLayer::initialize(
            Arc::new(CatalogHost::release(release)),
            registry.clone(),
        )
        .unwrap();
        Self {
            manager: SidebarManager::new(layer, config),
            registry,
        }
    }

    fn connect(&self, client: ClientId) -> PacketReceiver {
        let (conn, rx) = ChannelConnection::pair(client);
        self.registry.register(Arc::new(conn));
        rx
    }

    fn events(&self, rx: &mut PacketReceiver) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(packet) = rx.try_recv() {
            events.push(self.decode(&packet));
        }
        events
    }

    fn decode(&self, packet: &Packet) -> Event {
        let registry = self.manager.layer().registry();
        let layout = registry.layout();
        match packet.role() {
            MessageRole::Objective => Event::Objective {
                mode: packet.int(Slot::int(0)).unwrap(),
                title: packet.display_text(Slot::display(1)).map(String::from),
            },
            MessageRole::DisplayObjective => {
                assert_eq!(packet.int(Slot::int(0)), Some(1));
                Event::Display
            }
            MessageRole::Score => {
                let entry = packet.display_text(Slot::text(0)).unwrap();
                let code = entry.chars().nth(1).unwrap();
                let score = CODE_CHARS.iter().position(|c| *c == code).unwrap();
                let removed = match packet.get(layout.score_action()).unwrap() {
                    Value::Enum(constant) => constant.ordinal == 1,
                    Value::Int(action) => *action == 1,
                    other => panic!("unexpected score action {other:?}"),
                };
                if removed {
                    Event::ScoreRemove(score)
                } else {
                    assert_eq!(packet.int(Slot::int(0)), Some(score as i32));
                    Event::ScoreChange(score)
                }
            }
            MessageRole::Team => {
                let name = packet.display_text(Slot::text(0)).unwrap();
                let score: usize = name.rsplit(':').next().unwrap().parse().unwrap();
                match packet.int(layout.team_mode()).unwrap() {
                    0 => Event::TeamCreate(score),
                    1 => Event::TeamRemove(score),
                    2 => {
                        let (prefix, suffix) = self.affixes(packet);
                        Event::TeamUpdate {
                            score,
                            prefix,
                            suffix,
                        }
                    }
                    mode => panic!("unexpected team mode {mode}"),
                }
            }
            MessageRole::TeamParameters => panic!("parameters are never sent alone"),
        }
    }

    fn affixes(&self, packet: &Packet) -> (String, String) {
        let registry = self.manager.layer().registry();
        let (prefix, suffix) = registry.layout().team_affixes();
        if !registry.layout().has_team_parameters() {
            return (
                packet.display_text(prefix).unwrap().to_string(),
                packet.display_text(suffix).unwrap().to_string(),
            );
        }
        let schema = registry.schema(MessageRole::TeamParameters).unwrap();
        let params = packet.nested(Slot::optional(0)).unwrap();
        let text = |slot| match params.get(schema.index_of(slot).unwrap()).unwrap() {
            Value::Component(c) => c.text.clone(),
            Value::Text(t) => t.clone(),
            other => panic!("unexpected affix {other:?}"),
        };
        (text(prefix), text(suffix))
    }
}

fn updates(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::TeamUpdate { .. }))
        .count()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[test]
fn test_create_sends_objective_then_display() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let mut rx = h.connect(client);

    let sidebar = h.manager.create(client).unwrap();

    assert_eq!(
        h.events(&mut rx),
        vec![
            Event::Objective {
                mode: 0,
                title: Some(String::new())
            },
            Event::Display,
        ]
    );
    assert_eq!(sidebar.status(), SidebarStatus::Active);
    assert_eq!(sidebar.title(), "");
    assert!(sidebar.is_empty());
    assert!(sidebar.id().starts_with("sb-"));
}

#[test]
fn test_full_lifecycle_on_every_release() {
    for release in Release::ALL {
        let h = Harness::new(release);
        let client = ClientId::new(7);
        let mut rx = h.connect(client);

        let sidebar = h.manager.create(client).unwrap();
        sidebar.update_title("§6Arena").unwrap();
        sidebar.update_lines(["§7Kills: §f3", "§7Deaths: §f1"]).unwrap();
        sidebar.update_line(0, "§7Kills: §f4").unwrap();
        sidebar.remove_line(1).unwrap();
        sidebar.delete().unwrap();

        let events = h.events(&mut rx);
        assert_eq!(
            events.last(),
            Some(&Event::Objective {
                mode: 1,
                title: if release == Release::V1_7R4 { Some(String::new()) } else { None }
            }),
            "{release:?}"
        );
        assert!(events.contains(&Event::TeamUpdate {
            score: 1,
            prefix: "§7Kills: §f4".into(),
            suffix: String::new(),
        }));
    }
}

#[test]
fn test_create_without_connection_is_silent() {
    let h = Harness::new(Release::V1_17R1);
    let sidebar = h.manager.create(ClientId::new(99)).unwrap();
    sidebar.update_lines(["nobody", "is", "watching"]).unwrap();
    assert_eq!(sidebar.len(), 3);
}

#[test]
fn test_initialize_unrecognized_host_fails() {
    let registry = Arc::new(ConnectionRegistry::new());
    let result = PacketLayer::initialize(
        Arc::new(CatalogHost::new("org.bukkit.craftbukkit.v1_5_R3")),
        registry,
    );
    assert!(matches!(result, Err(InitError::UnrecognizedHost { .. })));
}

#[test]
fn test_layer_reports_era() {
    assert_eq!(Harness::new(Release::V1_12R1).manager.layer().era(), Era::V1_8);
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

#[test]
fn test_update_title_same_text_sends_once() {
    let h = Harness::new(Release::V1_16R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_title("Hello").unwrap();
    sidebar.update_title("Hello").unwrap();

    assert_eq!(
        h.events(&mut rx),
        vec![Event::Objective {
            mode: 2,
            title: Some("Hello".into())
        }]
    );
}

#[test]
fn test_update_title_too_long_on_legacy_fails() {
    let title = "x".repeat(33);
    for release in [Release::V1_7R4, Release::V1_8R3, Release::V1_12R1] {
        let h = Harness::new(release);
        let sidebar = h.manager.create(ClientId::new(1)).unwrap();
        assert!(matches!(
            sidebar.update_title(&title),
            Err(SessionError::TitleTooLong { len: 33, max: 32 })
        ));
        assert_eq!(sidebar.title(), "");
    }
}

#[test]
fn test_update_title_long_on_v1_17_succeeds() {
    let h = Harness::new(Release::V1_17R1);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    let title = "x".repeat(33);
    sidebar.update_title(&title).unwrap();
    assert_eq!(sidebar.title(), title);
}

#[test]
fn test_legacy_text_limits_override() {
    let lifted = SessionConfig {
        legacy_text_limits: Some(false),
        ..SessionConfig::default()
    };
    let h = Harness::with_config(Release::V1_8R3, lifted);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    sidebar.update_title(&"x".repeat(40)).unwrap();

    let imposed = SessionConfig {
        legacy_text_limits: Some(true),
        ..SessionConfig::default()
    };
    let h = Harness::with_config(Release::V1_17R1, imposed);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    assert!(matches!(
        sidebar.update_line(0, &"y".repeat(31)),
        Err(SessionError::LineTooLong { index: 0, len: 31, max: 30 })
    ));
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

#[test]
fn test_update_lines_twice_sends_no_line_change() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let mut rx = h.connect(client);
    let sidebar = h.manager.create(client).unwrap();

    sidebar.update_lines(["a", "b", "c"]).unwrap();
    let first = h.events(&mut rx);
    assert_eq!(updates(&first), 3);

    sidebar.update_lines(["a", "b", "c"]).unwrap();
    assert!(h.events(&mut rx).is_empty());
}

#[test]
fn test_update_lines_assigns_scores_bottom_up() {
    let h = Harness::new(Release::V1_16R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_lines(["top", "bottom"]).unwrap();

    assert_eq!(
        h.events(&mut rx),
        vec![
            Event::ScoreChange(0),
            Event::TeamCreate(0),
            Event::ScoreChange(1),
            Event::TeamCreate(1),
            Event::TeamUpdate {
                score: 0,
                prefix: "bottom".into(),
                suffix: String::new()
            },
            Event::TeamUpdate {
                score: 1,
                prefix: "top".into(),
                suffix: String::new()
            },
        ]
    );
}

#[test]
fn test_remove_line_shifts_lines_up() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["a", "b", "c"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.remove_line(1).unwrap();

    assert_eq!(sidebar.lines(), ["a", "c"]);
    assert_eq!(
        h.events(&mut rx),
        vec![
            Event::TeamRemove(2),
            Event::ScoreRemove(2),
            Event::TeamUpdate {
                score: 1,
                prefix: "a".into(),
                suffix: String::new()
            },
        ]
    );
}

#[test]
fn test_remove_line_past_end_is_noop() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["a"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.remove_line(5).unwrap();

    assert_eq!(sidebar.lines(), ["a"]);
    assert!(h.events(&mut rx).is_empty());
}

#[test]
fn test_update_line_past_end_pads_with_empty_lines() {
    let h = Harness::new(Release::V1_12R1);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    sidebar.update_lines(["first"]).unwrap();

    sidebar.update_line(3, "fourth").unwrap();

    assert_eq!(sidebar.lines(), ["first", "", "", "fourth"]);
    assert_eq!(sidebar.line(3).unwrap(), "fourth");
    assert!(matches!(
        sidebar.line(4),
        Err(SessionError::LineOutOfRange { index: 4, len: 4 })
    ));
}

#[test]
fn test_update_line_past_capacity_fails_without_sending() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["a", "b"]).unwrap();
    let mut rx = h.connect(client);

    assert!(matches!(
        sidebar.update_line(15, "x"),
        Err(SessionError::TooManyLines { count: 16, max: 15 })
    ));
    assert!(matches!(
        sidebar.update_line(usize::MAX, "x"),
        Err(SessionError::TooManyLines { count: usize::MAX, max: 15 })
    ));

    assert_eq!(sidebar.lines(), ["a", "b"]);
    assert!(h.events(&mut rx).is_empty());

    sidebar.update_line(14, "last").unwrap();
    assert_eq!(sidebar.len(), 15);
}

#[test]
fn test_update_line_in_range_sends_single_update() {
    let h = Harness::new(Release::V1_17R1);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["a", "b", "c"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_line(0, "A").unwrap();

    assert_eq!(
        h.events(&mut rx),
        vec![Event::TeamUpdate {
            score: 2,
            prefix: "A".into(),
            suffix: String::new()
        }]
    );
}

#[test]
fn test_grow_two_to_five_creates_three_pairs_ascending() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["1", "2"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_lines(["1", "2", "3", "4", "5"]).unwrap();

    let structural: Vec<_> = h
        .events(&mut rx)
        .into_iter()
        .filter(|e| !matches!(e, Event::TeamUpdate { .. }))
        .collect();
    assert_eq!(
        structural,
        vec![
            Event::ScoreChange(2),
            Event::TeamCreate(2),
            Event::ScoreChange(3),
            Event::TeamCreate(3),
            Event::ScoreChange(4),
            Event::TeamCreate(4),
        ]
    );
}

#[test]
fn test_shrink_five_to_two_removes_three_pairs_descending() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["1", "2", "3", "4", "5"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_lines(["4", "5"]).unwrap();

    let events = h.events(&mut rx);
    assert_eq!(
        events,
        vec![
            Event::TeamRemove(4),
            Event::ScoreRemove(4),
            Event::TeamRemove(3),
            Event::ScoreRemove(3),
            Event::TeamRemove(2),
            Event::ScoreRemove(2),
        ]
    );
}

#[test]
fn test_update_lines_too_many_fails_without_sending() {
    let h = Harness::new(Release::V1_16R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    let mut rx = h.connect(client);

    let lines: Vec<String> = (0..16).map(|i| i.to_string()).collect();
    assert!(matches!(
        sidebar.update_lines(lines),
        Err(SessionError::TooManyLines { count: 16, max: 15 })
    ));
    assert!(sidebar.is_empty());
    assert!(h.events(&mut rx).is_empty());
}

#[test]
fn test_update_line_too_long_on_legacy_fails() {
    let h = Harness::new(Release::V1_7R4);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    assert!(matches!(
        sidebar.update_lines(["ok".to_string(), "z".repeat(31)]),
        Err(SessionError::LineTooLong { index: 1, len: 31, max: 30 })
    ));
}

#[test]
fn test_long_line_is_split_on_legacy() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    let mut rx = h.connect(client);

    sidebar.update_lines(["§aabcdefghijklmnopq"]).unwrap();

    assert!(h.events(&mut rx).contains(&Event::TeamUpdate {
        score: 0,
        prefix: "§aabcdefghijklmn".into(),
        suffix: "§aopq".into(),
    }));
}

#[test]
fn test_long_line_fits_prefix_on_component_eras() {
    let h = Harness::new(Release::V1_17R1);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    let mut rx = h.connect(client);
    let line = "§b".to_string() + &"w".repeat(60);

    sidebar.update_lines([line.clone()]).unwrap();

    assert!(h.events(&mut rx).contains(&Event::TeamUpdate {
        score: 0,
        prefix: line,
        suffix: String::new(),
    }));
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[test]
fn test_delete_removes_teams_then_objective() {
    let h = Harness::new(Release::V1_16R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();
    sidebar.update_lines(["a", "b"]).unwrap();
    let mut rx = h.connect(client);

    sidebar.delete().unwrap();

    assert_eq!(
        h.events(&mut rx),
        vec![
            Event::TeamRemove(0),
            Event::TeamRemove(1),
            Event::Objective {
                mode: 1,
                title: None
            },
        ]
    );
    assert!(sidebar.is_deleted());
}

#[test]
fn test_operations_after_delete_fail() {
    let h = Harness::new(Release::V1_8R3);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();
    sidebar.delete().unwrap();

    assert!(matches!(sidebar.update_title("x"), Err(SessionError::Deleted(_))));
    assert!(matches!(sidebar.update_line(0, "x"), Err(SessionError::Deleted(_))));
    assert!(matches!(sidebar.update_lines(["x"]), Err(SessionError::Deleted(_))));
    assert!(matches!(sidebar.remove_line(0), Err(SessionError::Deleted(_))));
    assert!(matches!(sidebar.delete(), Err(SessionError::Deleted(_))));
}

// ---------------------------------------------------------------------------
// Manager and concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_manager_create_replaces_and_deletes_previous() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let first = h.manager.create(client).unwrap();
    let second = h.manager.create(client).unwrap();

    assert!(first.is_deleted());
    assert!(!second.is_deleted());
    assert_ne!(first.id(), second.id());
    assert_eq!(h.manager.len(), 1);
    assert_eq!(h.manager.get(client).unwrap().id(), second.id());
}

#[test]
fn test_manager_remove_deletes_session() {
    let h = Harness::new(Release::V1_8R3);
    let client = ClientId::new(1);
    let sidebar = h.manager.create(client).unwrap();

    assert!(h.manager.remove(client));
    assert!(sidebar.is_deleted());
    assert!(h.manager.get(client).is_none());
    assert!(!h.manager.remove(client));
    assert!(h.manager.is_empty());
}

#[test]
fn test_concurrent_creation_yields_distinct_ids() {
    let h = Harness::new(Release::V1_17R1);

    let ids: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10u64)
            .map(|t| {
                let manager = &h.manager;
                scope.spawn(move || {
                    (0..100u64)
                        .map(|i| {
                            let client = ClientId::new(t * 100 + i + 1);
                            manager.create(client).unwrap().id().to_string()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), 1000);
    assert_eq!(unique.len(), 1000);
    assert_eq!(h.manager.len(), 1000);
}

#[test]
fn test_concurrent_updates_on_one_session_keep_lines_consistent() {
    let h = Harness::new(Release::V1_16R3);
    let sidebar = h.manager.create(ClientId::new(1)).unwrap();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let sidebar = &sidebar;
            scope.spawn(move || {
                for i in 0..50 {
                    let lines: Vec<String> = (0..(i % 15)).map(|n| format!("{t}-{n}")).collect();
                    sidebar.update_lines(lines).unwrap();
                }
            });
        }
    });

    assert!(sidebar.len() < 15);
}
