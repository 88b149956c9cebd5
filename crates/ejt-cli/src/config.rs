//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use ejt_client::Credentials;
use ejt_core::DEFAULT_FILTERED_IDT;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the easyjob server.
    pub base_url: String,
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Verify the server's TLS certificate.
    pub verify_ssl: bool,
    /// Polling interval for `watch`.
    pub scan_interval_seconds: u64,
    /// Calendar lookahead window in days.
    pub lookahead_days: i64,
    /// Denylist of calendar type ids hidden from filtered views.
    pub filtered_idt: Vec<i64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("verify_ssl", &self.verify_ssl)
            .field("scan_interval_seconds", &self.scan_interval_seconds)
            .field("lookahead_days", &self.lookahead_days)
            .field("filtered_idt", &self.filtered_idt)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            verify_ssl: true,
            scan_interval_seconds: 60,
            lookahead_days: 30,
            filtered_idt: DEFAULT_FILTERED_IDT.to_vec(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    ///
    /// Precedence, lowest to highest: defaults, the default config file,
    /// the given file, `EJT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("EJT_"));

        figment.extract()
    }

    /// Connection settings for the API client.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            verify_ssl: self.verify_ssl,
        }
    }
}

/// Returns the platform-specific config directory for ejt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ejt"))
}
