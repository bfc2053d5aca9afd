use std::path::PathBuf;

use colloquy_agent::DEFAULT_BASE_URL;
use serde::Deserialize;

use crate::error::ToolError;

pub const DEFAULT_AGENT_ID: &str = "6938377d1f3e985c1e365a16";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub agent_id: Option<String>,
    pub rag_id: Option<String>,
}

/// Values given on the command line, highest precedence.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub agent_id: Option<String>,
    pub rag_id: Option<String>,
}

/// Effective settings after merging flags, environment, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub agent_id: String,
    pub rag_id: Option<String>,
}

impl Settings {
    pub fn require_rag_id(&self) -> Result<&str, ToolError> {
        self.rag_id.as_deref().ok_or(ToolError::RagIdNotConfigured)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("colloquy").join("config.toml"))
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    toml::from_str(&content).unwrap_or_default()
}

pub fn resolve_settings(overrides: Overrides) -> Settings {
    resolve_with(overrides, |key| std::env::var(key).ok(), load_config())
}

fn resolve_with(
    overrides: Overrides,
    env: impl Fn(&str) -> Option<String>,
    config: Config,
) -> Settings {
    let pick = |cli: Option<String>, key: &str, file: Option<String>| {
        cli.filter(|v| !v.is_empty())
            .or_else(|| env(key).filter(|v| !v.is_empty()))
            .or(file.filter(|v| !v.is_empty()))
    };

    Settings {
        base_url: pick(overrides.base_url, "COLLOQUY_BASE_URL", config.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        agent_id: pick(overrides.agent_id, "COLLOQUY_AGENT_ID", config.agent_id)
            .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string()),
        rag_id: pick(overrides.rag_id, "COLLOQUY_RAG_ID", config.rag_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = resolve_with(Overrides::default(), no_env, Config::default());
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.agent_id, DEFAULT_AGENT_ID);
        assert!(matches!(settings.require_rag_id(), Err(ToolError::RagIdNotConfigured)));
    }

    #[test]
    fn test_precedence() {
        let config: Config = toml::from_str(
            r#"
            base_url = "http://file"
            agent_id = "file-agent"
            rag_id = "file-kb"
            "#,
        )
        .unwrap();
        let env = |key: &str| (key == "COLLOQUY_AGENT_ID").then(|| "env-agent".to_string());
        let overrides = Overrides {
            rag_id: Some("cli-kb".to_string()),
            ..Default::default()
        };

        let settings = resolve_with(overrides, env, config);
        assert_eq!(settings.base_url, "http://file");
        assert_eq!(settings.agent_id, "env-agent");
        assert_eq!(settings.require_rag_id().unwrap(), "cli-kb");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let overrides = Overrides {
            base_url: Some(String::new()),
            ..Default::default()
        };
        let env = |_: &str| Some(String::new());
        let settings = resolve_with(overrides, env, Config::default());
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.rag_id, None);
    }
}
