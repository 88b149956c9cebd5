//! Watch command: run the polling coordinator until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use ejt_client::Client;
use ejt_core::util::minutes_to_human;
use ejt_poll::Coordinator;

use crate::Config;

pub async fn run(client: Arc<Client>, config: &Config) -> Result<()> {
    let coordinator = Coordinator::new(client)
        .with_interval(Duration::from_secs(config.scan_interval_seconds))
        .with_lookahead_days(config.lookahead_days);

    // Surface the first cycle's outcome immediately instead of waiting a
    // full interval to learn the configuration is broken.
    let snapshot = coordinator
        .refresh()
        .await
        .context("first poll cycle failed")?;
    tracing::info!(
        working = snapshot.is_working(),
        worked = ?minutes_to_human(snapshot.work_minutes),
        "initial poll cycle succeeded"
    );

    tracing::info!(
        interval_seconds = config.scan_interval_seconds,
        lookahead_days = config.lookahead_days,
        "polling, press ctrl-c to stop"
    );

    tokio::select! {
        () = coordinator.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("stopping");
        }
    }
    Ok(())
}
