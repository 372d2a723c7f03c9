//! Integration tests for the sidebar server: a real listener, a real
//! WebSocket client, and the JSON frames the client receives.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tallyboard::prelude::*;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Test handler
// =========================================================================

/// Shows a fixed title and two lines, and reports disconnects.
struct ArenaHandler {
    disconnects: mpsc::UnboundedSender<ClientId>,
}

impl SidebarHandler for ArenaHandler {
    async fn on_connect(&self, sidebar: Arc<ScoreboardSession>) {
        sidebar.update_title("§6Arena").unwrap();
        sidebar.update_lines(["§7Kills: §f0", "§7Deaths: §f0"]).unwrap();
    }

    fn on_disconnect(&self, client: ClientId) {
        let _ = self.disconnects.send(client);
    }
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns its address and the
/// disconnect feed.
async fn start_server(release: Release) -> (String, mpsc::UnboundedReceiver<ClientId>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let server = SidebarServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(
            Arc::new(CatalogHost::release(release)),
            ArenaHandler { disconnects: tx },
        )
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, rx)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn next_json(ws: &mut ClientWs) -> serde_json::Value {
    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("frame should arrive")
        .unwrap()
        .expect("recv");
    serde_json::from_slice(&frame.into_data()).expect("decode")
}

fn carries_text(json: &serde_json::Value, text: &str) -> bool {
    json["object"]["values"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v["value"] == text || v["value"]["text"] == text)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_client_receives_sidebar_in_order() {
    let (addr, _disconnects) = start_server(Release::V1_8R3).await;
    let mut ws = connect(&addr).await;

    let mut roles = Vec::new();
    let mut frames = Vec::new();
    for _ in 0..9 {
        let json = next_json(&mut ws).await;
        roles.push(json["role"].as_str().unwrap().to_string());
        frames.push(json);
    }

    assert_eq!(
        roles,
        [
            "Objective",
            "DisplayObjective",
            "Objective",
            "Score",
            "Team",
            "Score",
            "Team",
            "Team",
            "Team",
        ]
    );
    assert!(carries_text(&frames[2], "§6Arena"));
    assert!(carries_text(&frames[7], "§7Deaths: §f0"));
    assert!(carries_text(&frames[8], "§7Kills: §f0"));
}

#[tokio::test]
async fn test_component_era_title_is_a_component() {
    let (addr, _disconnects) = start_server(Release::V1_16R3).await;
    let mut ws = connect(&addr).await;

    let _create = next_json(&mut ws).await;
    let _display = next_json(&mut ws).await;
    let title = next_json(&mut ws).await;

    assert_eq!(title["role"], "Objective");
    let values = title["object"]["values"].as_array().unwrap();
    assert!(
        values
            .iter()
            .any(|v| v["kind"] == "Component" && v["value"]["text"] == "§6Arena")
    );
}

#[tokio::test]
async fn test_disconnect_removes_sidebar() {
    let (addr, mut disconnects) = start_server(Release::V1_17R1).await;
    let mut ws = connect(&addr).await;
    let _ = next_json(&mut ws).await;

    ws.send(Message::Close(None)).await.unwrap();

    let client = tokio::time::timeout(Duration::from_secs(5), disconnects.recv())
        .await
        .expect("disconnect should be reported")
        .unwrap();
    assert!(client.into_inner() > 0);
}

#[tokio::test]
async fn test_each_client_gets_its_own_sidebar() {
    let (addr, _disconnects) = start_server(Release::V1_12R1).await;
    let mut first = connect(&addr).await;
    let mut second = connect(&addr).await;

    let a = next_json(&mut first).await;
    let b = next_json(&mut second).await;

    let id_a = a["object"]["values"][0]["value"].as_str().unwrap().to_string();
    let id_b = b["object"]["values"][0]["value"].as_str().unwrap().to_string();
    assert!(id_a.starts_with("sb-"));
    assert_ne!(id_a, id_b);
}

#[tokio::test]
async fn test_build_unrecognized_host_fails() {
    let result = SidebarServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(
            Arc::new(CatalogHost::new("org.bukkit.craftbukkit.v1_5_R3")),
            ArenaHandler {
                disconnects: mpsc::unbounded_channel().0,
            },
        )
        .await;
    assert!(matches!(result, Err(TallyboardError::Init(_))));
}
