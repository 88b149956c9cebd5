//! Resource-state commands: list the selectable states and save one.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;

use ejt_client::Client;
use ejt_core::{ResourceStateType, type_id_for_caption};

pub async fn list<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    let types = client
        .resource_state_types()
        .await
        .context("failed to fetch resource-state types")?;
    render(writer, &types)?;
    Ok(())
}

/// Translates the caption into its numeric type id and saves the state
/// over `[start, end]`.
pub async fn set_state<W: Write>(
    writer: &mut W,
    client: &Client,
    caption: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<()> {
    if end <= start {
        bail!("'end' must be after 'start'");
    }

    let types = client
        .resource_state_types()
        .await
        .context("failed to fetch resource-state types")?;
    let Some(type_id) = type_id_for_caption(&types, caption) else {
        bail!("resource state '{caption}' not found; run `ejt resource-states` to list captions");
    };

    let result = client
        .save_resource_state(type_id, start, end)
        .await
        .context("failed to save resource state")?;
    writeln!(writer, "Resource state saved. API response: {result}")?;
    Ok(())
}

fn render<W: Write>(writer: &mut W, types: &[ResourceStateType]) -> Result<()> {
    if types.is_empty() {
        writeln!(writer, "No resource states available.")?;
        return Ok(());
    }
    for state in types {
        let caption = state.caption.as_deref().unwrap_or("(unnamed)");
        match state.type_id {
            Some(id) => writeln!(writer, "{caption} (id {id})")?,
            None => writeln!(writer, "{caption}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn render_lists_captions_and_ids() {
        let types: Vec<ResourceStateType> = serde_json::from_str(
            r#"[
                {"Caption": "Vacation", "IdResourceStateType": 4},
                {"Caption": "Sick", "IdResourceStateType": 9},
                {"IdResourceStateType": 11}
            ]"#,
        )
        .unwrap();

        let mut output = Vec::new();
        render(&mut output, &types).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_snapshot!(output.trim_end(), @r"
        Vacation (id 4)
        Sick (id 9)
        (unnamed) (id 11)
        ");
    }

    #[test]
    fn render_reports_empty_list() {
        let mut output = Vec::new();
        render(&mut output, &[]).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No resource states available.\n"
        );
    }
}
