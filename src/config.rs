use crate::error::{config_error, env_error, JobResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Default Google Calendar to read jobs from
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Default port for the OAuth loopback redirect
pub const DEFAULT_REDIRECT_PORT: u16 = 8080;

/// Optional file with status options
pub const CONFIG_FILE: &str = "config/jobboard.toml";

/// Where annotations and tokens are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    /// One JSON file per key inside a directory
    File(PathBuf),
    /// Plain string keys in Redis
    Redis(String),
}

/// Main configuration structure for the job board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID (only needed for sign-in)
    pub google_client_id: String,
    /// Google OAuth client secret (only needed for sign-in)
    pub google_client_secret: String,
    /// Google Calendar ID holding the jobs
    pub google_calendar_id: String,
    /// IANA timezone used for day boundaries and clock times
    pub timezone: String,
    /// Storage backend for job annotations and tokens
    pub storage: StorageBackend,
    /// Loopback port for the OAuth redirect
    pub oauth_redirect_port: u16,
    /// Status options offered by the CLI
    pub statuses: Vec<String>,
}

/// Contents of `config/jobboard.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    statuses: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            timezone: "UTC".to_string(),
            storage: StorageBackend::File(PathBuf::from("data")),
            oauth_redirect_port: DEFAULT_REDIRECT_PORT,
            statuses: default_statuses(),
        }
    }
}

/// Status options used when no config file overrides them
pub fn default_statuses() -> Vec<String> {
    ["Scheduled", "In Progress", "Completed", "Cancelled"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> JobResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
        let google_calendar_id = env::var("GOOGLE_CALENDAR_ID")
            .unwrap_or_else(|_| String::from(DEFAULT_CALENDAR_ID));

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let oauth_redirect_port = match env::var("OAUTH_REDIRECT_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|_| env_error("Invalid OAUTH_REDIRECT_PORT format"))?,
            Err(_) => DEFAULT_REDIRECT_PORT,
        };

        let storage = match env::var("JOBBOARD_STORAGE").as_deref() {
            Ok("redis") => StorageBackend::Redis(
                env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            ),
            Ok("file") | Err(_) => StorageBackend::File(PathBuf::from(
                env::var("JOBBOARD_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            )),
            Ok(other) => {
                return Err(config_error(&format!(
                    "Unknown JOBBOARD_STORAGE '{}', expected 'file' or 'redis'",
                    other
                )))
            }
        };

        let mut statuses = default_statuses();
        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            match toml::from_str::<FileConfig>(&content) {
                Ok(FileConfig {
                    statuses: Some(list),
                }) if !list.is_empty() => statuses = list,
                Ok(_) => {}
                Err(e) => warn!("Ignoring malformed {}: {}", CONFIG_FILE, e),
            }
        }

        let config = Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            timezone,
            storage,
            oauth_redirect_port,
            statuses,
        };

        // Fail early on a bad timezone rather than on first use
        config.tz()?;

        Ok(config)
    }

    /// Parsed timezone
    pub fn tz(&self) -> JobResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Whether a status is one of the configured options
    pub fn is_known_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    /// Redirect URI registered for the loopback listener
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.oauth_redirect_port)
    }
}
