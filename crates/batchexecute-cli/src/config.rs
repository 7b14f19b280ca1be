//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/batchexecute/config.toml` by default:
//!
//! ```toml
//! [target]
//! host = "news.google.com"
//! app = "DotsSplashUi"
//!
//! [decode]
//! format = "default"   # or "compressed"
//! strict = false
//!
//! [http]
//! timeout = 30
//!
//! [headers]
//! x-same-domain = "1"
//!
//! [query]
//! hl = "en"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use batchexecute_http::{BatchClientConfig, HttpSettings};
use batchexecute_protocol::ResponseFormat;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Configuration for the batchexecute CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Debug mode.
    pub debug: bool,

    /// Target endpoint.
    pub target: TargetSettings,

    /// Response decoding settings.
    pub decode: DecodeSettings,

    /// HTTP transport settings.
    pub http: HttpConfigSettings,

    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,

    /// Extra query parameters sent with every request.
    pub query: BTreeMap<String, String>,
}

/// Target endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Host, e.g. "news.google.com".
    pub host: Option<String>,

    /// Application name, e.g. "DotsSplashUi".
    pub app: Option<String>,
}

/// Response decoding settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeSettings {
    /// Response format.
    pub format: ResponseFormat,

    /// Strict decoding.
    pub strict: bool,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfigSettings {
    /// Request timeout in seconds.
    pub timeout: u64,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for HttpConfigSettings {
    fn default() -> Self {
        Self {
            timeout: HttpSettings::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("batchexecute")
    }

    /// Builds the client configuration, letting `host`/`app` override the file.
    pub fn client_config(
        &self,
        host: Option<&str>,
        app: Option<&str>,
    ) -> CliResult<BatchClientConfig> {
        let host = host.or(self.target.host.as_deref()).ok_or_else(|| {
            CliError::Config("no host configured; set [target] host or pass --host".into())
        })?;
        let app = app.or(self.target.app.as_deref()).ok_or_else(|| {
            CliError::Config("no app configured; set [target] app or pass --app".into())
        })?;

        let mut config = BatchClientConfig::new(host, app)
            .with_response_format(self.decode.format)
            .with_strict(self.decode.strict);
        for (name, value) in &self.headers {
            config = config.with_header(name, value);
        }
        for (name, value) in &self.query {
            config = config.with_query(name, value);
        }
        Ok(config)
    }

    /// Builds the HTTP transport settings.
    pub fn http_settings(&self) -> HttpSettings {
        let settings =
            HttpSettings::default().with_timeout(Duration::from_secs(self.http.timeout));
        match self.http.user_agent {
            Some(ref user_agent) => settings.with_user_agent(user_agent),
            None => settings,
        }
    }
}
