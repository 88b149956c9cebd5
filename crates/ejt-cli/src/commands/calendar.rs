//! Calendar command: list resource-plan items.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeDelta};

use ejt_client::Client;
use ejt_core::CalendarItem;

use crate::Config;

pub async fn run<W: Write>(
    writer: &mut W,
    client: &Client,
    config: &Config,
    days: i64,
    all: bool,
    json: bool,
) -> Result<()> {
    let start = Local::now().date_naive();
    let end = start + TimeDelta::days(days.max(1));

    // `--all` disables the denylist; otherwise the configured one applies.
    let filter: &[i64] = if all { &[] } else { &config.filtered_idt };
    let items = client
        .fetch_calendar(start, end, Some(filter))
        .await
        .context("failed to fetch calendar items")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&items)?)?;
    } else {
        render(writer, &items)?;
    }
    Ok(())
}

fn render<W: Write>(writer: &mut W, items: &[CalendarItem]) -> Result<()> {
    if items.is_empty() {
        writeln!(writer, "No calendar items.")?;
        return Ok(());
    }

    for item in items {
        let caption = item.caption.as_deref().unwrap_or("(untitled)");
        let start = item.start.as_deref().unwrap_or("?");
        let end = item.end.as_deref().unwrap_or("?");
        writeln!(writer, "{start} .. {end}  {caption}")?;
        if let Some(description) = item.description() {
            for line in description.lines() {
                writeln!(writer, "    {line}")?;
            }
        }
    }
    Ok(())
}
