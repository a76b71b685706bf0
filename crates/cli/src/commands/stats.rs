use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use bugdesk_client::SessionEvent;
use bugdesk_service::{RefreshOutcome, StatsAggregator};

use super::{App, print_json};

pub(crate) async fn run_stats(app: &App) -> Result<()> {
    let stats = StatsAggregator::new(Arc::clone(&app.client), 0);
    let outcome = stats.refresh().await;
    let view = stats.current();
    print_json(&view)?;
    if outcome == RefreshOutcome::Failed {
        return Err(anyhow!(view.error.unwrap_or_else(|| "stats refresh failed".to_owned())));
    }
    Ok(())
}

/// Streams one JSON line per published view until interrupted, `count`
/// updates were printed, or the session expires.
pub(crate) async fn run_watch(app: &App, interval_ms: i64, count: Option<usize>) -> Result<()> {
    let stats = Arc::new(StatsAggregator::new(Arc::clone(&app.client), interval_ms));
    let mut updates = stats.subscribe();
    let mut session_events = app.session.subscribe();
    let handle = stats.start();
    let mut printed = 0_usize;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                println!("{}", serde_json::to_string(&view)?);
                printed += 1;
                if count.is_some_and(|limit| printed >= limit) || stats.period().is_none() {
                    break;
                }
            },
            event = session_events.recv() => {
                if let Ok(SessionEvent::Expired { redirect_to }) = event {
                    handle.stop().await;
                    bail!("session expired, log in again ({redirect_to})");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            },
        }
    }

    handle.stop().await;
    Ok(())
}
