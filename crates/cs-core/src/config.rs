//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and then
//! overridden from the environment. Every section defaults sensibly so a
//! completely empty `{}` file is valid. Components take the sections they
//! need at construction time; nothing reads the environment per request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::media::BYTES_PER_MB;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub share: ShareConfig,
    pub auth: AuthConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Override fields from process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Override fields from an arbitrary variable lookup.
    ///
    /// Unparseable numeric values are logged and ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring {key}={raw}: not a valid number");
                    None
                }
            }
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = parsed(&lookup, "PORT") {
            self.server.port = port;
        }
        if let Some(db) = lookup("DB_PATH") {
            self.server.db_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Some(mb) = parsed(&lookup, "MAX_SIZE_MB") {
            self.limits.max_size_mb = mb;
        }
        if let Some(min) = parsed(&lookup, "MIN_DURATION_SEC") {
            self.limits.min_duration_secs = min;
        }
        if let Some(max) = parsed(&lookup, "MAX_DURATION_SEC") {
            self.limits.max_duration_secs = max;
        }
        if let Some(url) = lookup("BASE_URL") {
            self.share.base_url = Some(url);
        }
        if let Some(token) = lookup("AUTH_TOKEN") {
            self.auth.enabled = true;
            self.auth.token = Some(token);
        }
        if let Some(p) = lookup("FFMPEG_PATH") {
            self.tools.ffmpeg_path = Some(PathBuf::from(p));
        }
        if let Some(p) = lookup("FFPROBE_PATH") {
            self.tools.ffprobe_path = Some(PathBuf::from(p));
        }
        if let Some(secs) = parsed(&lookup, "TOOL_TIMEOUT_SECS") {
            self.tools.timeout_secs = secs;
        }
    }

    /// Public URL under which a share slug is streamed.
    pub fn share_url(&self, slug: &str) -> String {
        let base = match self.share.base_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.server.port),
        };
        format!("{base}/s/{slug}")
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.limits.max_size_mb == 0 {
            warnings.push("limits.max_size_mb is 0; every upload will be rejected".into());
        }

        if self.limits.min_duration_secs > self.limits.max_duration_secs {
            warnings.push(format!(
                "limits.min_duration_secs ({}) is greater than limits.max_duration_secs ({})",
                self.limits.min_duration_secs, self.limits.max_duration_secs
            ));
        }

        if self.auth.enabled && self.auth.token.as_deref().map_or(true, str::is_empty) {
            warnings.push("auth is enabled but no token is set".into());
        }

        if self.share.default_ttl_minutes == 0 {
            warnings.push("share.default_ttl_minutes is 0; new links expire immediately".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            db_path: PathBuf::from("./data/clipshare.db"),
        }
    }
}

/// Where uploaded and generated clips live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
        }
    }
}

/// Upload size and clip duration limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_size_mb: u64,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
}

impl LimitsConfig {
    /// The upload ceiling in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Whether `secs` lies inside the inclusive duration window.
    pub fn duration_allowed(&self, secs: f64) -> bool {
        secs >= self.min_duration_secs && secs <= self.max_duration_secs
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 25,
            min_duration_secs: 1.0,
            max_duration_secs: 25.0,
        }
    }
}

/// Share link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Public base URL; `None` falls back to `http://localhost:{port}`.
    pub base_url: Option<String>,
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: u64,
}

fn default_ttl_minutes() -> u64 {
    1440
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_ttl_minutes: default_ttl_minutes(),
        }
    }
}

/// Static bearer token authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

/// Paths and limits for external CLI tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl ToolsConfig {
    /// Per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout_secs: 300,
        }
    }
}
