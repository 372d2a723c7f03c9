use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tallyboard::prelude::*;

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Shows every client a sidebar that refreshes once per tick.
struct LiveSidebar {
    started: Instant,
    tick: Duration,
    visitors: AtomicU64,
}

impl LiveSidebar {
    fn new(tick: Duration) -> Self {
        Self {
            started: Instant::now(),
            tick,
            visitors: AtomicU64::new(0),
        }
    }

    fn lines(&self, client: ClientId, online_for: Duration) -> Vec<String> {
        vec![
            format!("§7Server up: §f{}s", self.started.elapsed().as_secs()),
            format!("§7Online: §f{}s", online_for.as_secs()),
            format!("§7Visitors: §f{}", self.visitors.load(Ordering::Relaxed)),
            String::new(),
            format!("§8{client}"),
        ]
    }
}

impl SidebarHandler for LiveSidebar {
    async fn on_connect(&self, sidebar: Arc<ScoreboardSession>) {
        self.visitors.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = sidebar.update_title("§6§lLive Sidebar") {
            tracing::warn!(error = %e, "title rejected");
            return;
        }

        let joined = Instant::now();
        let mut ticker = tokio::time::interval(self.tick);
        loop {
            ticker.tick().await;
            let lines = self.lines(sidebar.client(), joined.elapsed());
            match sidebar.update_lines(lines) {
                Ok(()) => {}
                Err(SessionError::Deleted(_)) => break,
                Err(e) => {
                    tracing::warn!(client = %sidebar.client(), error = %e, "refresh failed");
                    break;
                }
            }
        }
    }

    fn on_disconnect(&self, client: ClientId) {
        tracing::info!(%client, "visitor left");
    }
}

/// Maps a release name such as `1.8` or `1.17` to a catalog release.
fn parse_release(name: &str) -> Option<Release> {
    match name.trim() {
        "1.7" => Some(Release::V1_7R4),
        "1.8" => Some(Release::V1_8R3),
        "1.12" => Some(Release::V1_12R1),
        "1.16" => Some(Release::V1_16R3),
        "1.17" => Some(Release::V1_17R1),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tallyboard::init_tracing();

    let requested = std::env::var("TALLYBOARD_RELEASE").unwrap_or_else(|_| "1.8".into());
    let release = parse_release(&requested)
        .ok_or_else(|| format!("unknown release {requested}, expected 1.7/1.8/1.12/1.16/1.17"))?;
    tracing::info!(?release, "starting live sidebar on 0.0.0.0:8080");

    let server = SidebarServerBuilder::new()
        .bind("0.0.0.0:8080")
        .build(
            Arc::new(CatalogHost::release(release)),
            LiveSidebar::new(Duration::from_secs(1)),
        )
        .await?;

    server.run().await?;
    Ok(())
}
