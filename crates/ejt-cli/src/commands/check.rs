//! Check command: validate credentials and timecard eligibility.

use std::io::Write;

use anyhow::{Context, Result};

use ejt_client::{Client, ClientError};

pub async fn run<W: Write>(writer: &mut W, client: &Client) -> Result<()> {
    client
        .check_credentials()
        .await
        .map_err(describe)
        .context("credential check failed")?;
    writeln!(writer, "Credentials OK.")?;

    client
        .validate_timecard_user()
        .await
        .map_err(describe)
        .context("eligibility check failed")?;
    writeln!(writer, "Account is a timecard user.")?;
    Ok(())
}

/// Attaches the remediation matching the error kind.
fn describe(err: ClientError) -> anyhow::Error {
    let hint = match &err {
        ClientError::Auth { .. } => "check base URL, username, and password",
        ClientError::Request { .. } => "server or network fault, try again later",
        ClientError::NotTimecardUser => "this account cannot use the timecard API",
    };
    anyhow::Error::new(err).context(hint.to_string())
}
