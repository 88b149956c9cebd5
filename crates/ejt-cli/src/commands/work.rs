//! Start/stop work session commands.
//!
//! Neither command guards against double start or double stop; the
//! vendor accepts both and the server-side state wins.

use std::io::Write;

use anyhow::{Context, Result};

use ejt_client::Client;

pub async fn start<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    client
        .start_work()
        .await
        .context("failed to start work session")?;
    writeln!(writer, "Work session started.")?;
    Ok(())
}

pub async fn stop<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    client
        .stop_work()
        .await
        .context("failed to close work session")?;
    writeln!(writer, "Work session closed.")?;
    Ok(())
}
