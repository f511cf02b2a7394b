use std::path::{Path, PathBuf};

use super::types::AgentConfig;
use crate::capability::BackendId;
use crate::config::BackendPreference;

/// Default agent data directory: ~/.aura-agent
pub fn get_agent_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".aura-agent"))
}

/// Load configuration: `~/.aura-agent/config.toml`, then `./config.toml`,
/// then built-in defaults; `AURA_*` environment variables override last.
pub fn load_default() -> anyhow::Result<AgentConfig> {
    let agent_dir = get_agent_data_dir()?;
    let user_config = agent_dir.join("config.toml");
    let local_config = Path::new("config.toml");

    let mut cfg: AgentConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AgentConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AgentConfig>(&s)?
    } else {
        AgentConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut AgentConfig) {
    if let Some(v) = env_nonempty("AURA_BACKEND") {
        cfg.preferred_backend = if v.eq_ignore_ascii_case("auto") {
            BackendPreference::Auto
        } else {
            match v.parse::<BackendId>() {
                Ok(b) => BackendPreference::Pinned(b),
                Err(e) => {
                    tracing::warn!("ignoring AURA_BACKEND: {e}");
                    cfg.preferred_backend.clone()
                }
            }
        };
    }
    if let Some(v) = env_nonempty("AURA_API_TOKEN") {
        cfg.api.token = Some(v);
    }
    if let Some(v) = env_nonempty("AURA_EMAIL") {
        cfg.credentials.email = Some(v);
    }
    if let Some(v) = env_nonempty("AURA_PASSWORD") {
        cfg.credentials.password = Some(v);
    }
    if let Some(v) = env_nonempty("AURA_STEEL_URL") {
        cfg.steel.base_url = v;
    }
    if let Some(v) = env_nonempty("AURA_LUX_URL") {
        cfg.lux.base_url = v;
    }
    if let Some(v) = env_nonempty("AURA_LUX_API_KEY") {
        cfg.lux.api_key = Some(v);
    }
    if let Some(v) = env_nonempty("AURA_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(ms) => cfg.timeout_ms = ms,
            Err(_) => tracing::warn!("ignoring non-numeric AURA_TIMEOUT_MS"),
        }
    }
    if let Some(v) = env_nonempty("AURA_DEADLINE_MS") {
        match v.parse::<u64>() {
            Ok(ms) => cfg.deadline_ms = ms,
            Err(_) => tracing::warn!("ignoring non-numeric AURA_DEADLINE_MS"),
        }
    }
    if let Some(v) = env_nonempty("AURA_HEADLESS") {
        cfg.headless = !v.eq_ignore_ascii_case("false");
    }
    if let Some(v) = env_nonempty("AURA_DEBUG") {
        cfg.debug = v.eq_ignore_ascii_case("true") || v == "1";
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_string())
}
