//! Status command: one details fetch, rendered for humans.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use ejt_client::Client;
use ejt_core::TimecardSnapshot;
use ejt_core::util::minutes_to_human;

pub async fn run<W: Write>(
    writer: &mut W,
    client: &Client,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let snapshot = client
        .fetch_details(date)
        .await
        .context("failed to fetch time-card details")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&snapshot)?)?;
    } else {
        render(writer, &snapshot)?;
    }
    Ok(())
}

fn render<W: Write>(writer: &mut W, snapshot: &TimecardSnapshot) -> Result<()> {
    match &snapshot.work_time {
        Some(since) => writeln!(writer, "State: working (since {since})")?,
        None => writeln!(writer, "State: clocked out")?,
    }
    if let Some(date) = &snapshot.date {
        writeln!(writer, "Date: {date}")?;
    }
    for (label, value) in [
        ("Worked", snapshot.work_minutes),
        ("Planned", snapshot.work_minutes_planned),
        ("Total", snapshot.total_work_minutes),
    ] {
        if let Some(human) = minutes_to_human(value) {
            writeln!(writer, "{label}: {human}")?;
        }
    }
    if let Some(holidays) = snapshot.holidays {
        writeln!(writer, "Holidays: {holidays}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn render_to_string(snapshot: &TimecardSnapshot) -> String {
        let mut output = Vec::new();
        render(&mut output, snapshot).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn render_active_session() {
        let snapshot = TimecardSnapshot {
            date: Some("2025-03-14".to_string()),
            holidays: Some(2),
            total_work_minutes: Some(480),
            work_minutes: Some(123),
            work_minutes_planned: Some(480),
            work_time: Some("07:30".to_string()),
        };

        assert_snapshot!(render_to_string(&snapshot).trim_end(), @r"
        State: working (since 07:30)
        Date: 2025-03-14
        Worked: 2 h 3 m
        Planned: 8 h 0 m
        Total: 8 h 0 m
        Holidays: 2
        ");
    }

    #[test]
    fn render_clocked_out_with_sparse_fields() {
        let snapshot = TimecardSnapshot {
            date: None,
            holidays: None,
            total_work_minutes: None,
            work_minutes: Some(45),
            work_minutes_planned: None,
            work_time: None,
        };

        assert_snapshot!(render_to_string(&snapshot).trim_end(), @r"
        State: clocked out
        Worked: 45 m
        ");
    }
}
