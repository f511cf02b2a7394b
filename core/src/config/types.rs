use serde::{Deserialize, Serialize};

use crate::capability::BackendId;

/// Backend pin: `auto` lets the router score candidates; a named backend is
/// returned directly whenever it is healthy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendPreference {
    #[default]
    Auto,
    #[serde(untagged)]
    Pinned(BackendId),
}

impl BackendPreference {
    pub fn pinned(&self) -> Option<BackendId> {
        match self {
            BackendPreference::Auto => None,
            BackendPreference::Pinned(b) => Some(*b),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub preferred_backend: BackendPreference,

    /// Retry hint passed to providers; the core itself never retries a
    /// backend, failover is its sole resilience mechanism.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt timeout applied by providers.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Overall wall-clock cap across the whole fallback sequence. 0 disables.
    #[serde(default)]
    pub deadline_ms: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub lux: LuxConfig,

    #[serde(default)]
    pub steel: SteelConfig,

    #[serde(default = "default_browser_use")]
    pub browser_use: BinaryConfig,

    #[serde(default = "default_agent_browser")]
    pub agent_browser: BinaryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub events_out: EventsOutConfig,
}

fn default_max_retries() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

fn default_browser_use() -> BinaryConfig {
    BinaryConfig {
        binary: "browser-use".to_string(),
    }
}

fn default_agent_browser() -> BinaryConfig {
    BinaryConfig {
        binary: "agent-browser".to_string(),
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendPreference::default(),
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
            deadline_ms: 0,
            headless: true,
            debug: false,
            credentials: Credentials::default(),
            api: ApiConfig::default(),
            lux: LuxConfig::default(),
            steel: SteelConfig::default(),
            browser_use: default_browser_use(),
            agent_browser: default_agent_browser(),
            logging: LoggingConfig::default(),
            events_out: EventsOutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_base_url() -> String {
    "https://www.aura.build".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuxConfig {
    #[serde(default = "default_lux_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_lux_base_url() -> String {
    "http://127.0.0.1:7310".to_string()
}

impl Default for LuxConfig {
    fn default() -> Self {
        Self {
            base_url: default_lux_base_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteelConfig {
    /// Base URL of the self-hosted steel browser API. Empty = not configured.
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryConfig {
    pub binary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_true")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "aura_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            console: true,
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsOutConfig {
    #[serde(default)]
    pub enabled: bool,

    /// JSONL sink path, or "stdout:" for standard output.
    #[serde(default = "default_events_path")]
    pub path: String,

    #[serde(default = "default_events_capacity")]
    pub channel_capacity: usize,

    #[serde(default = "default_true")]
    pub drop_when_full: bool,
}

fn default_events_path() -> String {
    "./run.events.jsonl".to_string()
}

fn default_events_capacity() -> usize {
    1024
}

impl Default for EventsOutConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_events_path(),
            channel_capacity: default_events_capacity(),
            drop_when_full: true,
        }
    }
}
