use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure loaded from affinity.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleConfig,
    pub scoring: ScoringConfig,
    pub catalogs: CatalogConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Chat-completion endpoint used to interpret free-text answers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-call budget; an expired call is skipped like a malformed reply
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 800,
            timeout_ms: 20_000,
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Knobs for the adjustment step
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Clamp oracle adjustments to [-2, 2] before weighting. Off by default.
    pub clamp_adjustments: bool,
}

/// Optional on-disk replacements for the built-in catalogs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub questions_path: Option<PathBuf>,
    pub archetypes_path: Option<PathBuf>,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            log_level: "affinity_quiz=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "affinity_quiz=info".to_string()),
        }
    }
}

/// Load `.env` (or `AFFINITY_ENV_FILE`) into the process environment; missing files are ignored.
/// Safe to call more than once: dotenvy never overrides variables that are already set.
pub fn load_env_files() {
    if let Ok(env_path) = std::env::var("AFFINITY_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else {
        let _ = dotenvy::dotenv();
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses AFFINITY_CONFIG environment variable or defaults to "affinity.toml"
    pub fn load() -> anyhow::Result<Self> {
        load_env_files();

        let config_path =
            std::env::var("AFFINITY_CONFIG").unwrap_or_else(|_| "affinity.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Env-first: variables win over the TOML file
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("AFFINITY_ORACLE_BASE_URL") {
            self.oracle.base_url = url;
        }
        if let Ok(model) = std::env::var("AFFINITY_ORACLE_MODEL") {
            self.oracle.model = model;
        }
        if let Some(timeout) = std::env::var("AFFINITY_ORACLE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.oracle.timeout_ms = timeout;
        }
        if let Some(temp) = std::env::var("AFFINITY_ORACLE_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
        {
            self.oracle.temperature = temp;
        }
        if let Some(max_tokens) = std::env::var("AFFINITY_ORACLE_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.oracle.max_tokens = max_tokens;
        }
        if let Ok(clamp) = std::env::var("AFFINITY_CLAMP_ADJUSTMENTS") {
            self.scoring.clamp_adjustments = clamp == "1" || clamp.eq_ignore_ascii_case("true");
        }
        if let Ok(path) = std::env::var("AFFINITY_QUESTIONS_PATH") {
            self.catalogs.questions_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("AFFINITY_ARCHETYPES_PATH") {
            self.catalogs.archetypes_path = Some(PathBuf::from(path));
        }
    }

    /// Validate and clamp values that have a sane range
    pub fn validate(&mut self) -> anyhow::Result<()> {
        if !self.oracle.base_url.starts_with("http://")
            && !self.oracle.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "oracle base_url '{}' must start with http:// or https://",
                self.oracle.base_url
            );
        }
        if self.oracle.model.trim().is_empty() {
            anyhow::bail!("oracle model must not be empty");
        }
        if self.oracle.timeout_ms == 0 {
            tracing::warn!("oracle timeout_ms of 0 is not usable, falling back to 20000");
            self.oracle.timeout_ms = 20_000;
        }
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            tracing::warn!(
                "oracle temperature {} outside 0.0..=2.0, clamping",
                self.oracle.temperature
            );
            self.oracle.temperature = self.oracle.temperature.clamp(0.0, 2.0);
        }
        if self.oracle.max_tokens == 0 {
            tracing::warn!("oracle max_tokens of 0 is not usable, falling back to 800");
            self.oracle.max_tokens = 800;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_sections_are_optional() {
        let config: Config = toml::from_str(
            r#"
            [oracle]
            model = "gpt-4.1-mini"

            [scoring]
            clamp_adjustments = true
            "#,
        )
        .unwrap();
        assert_eq!(config.oracle.model, "gpt-4.1-mini");
        assert_eq!(config.oracle.base_url, "https://api.openai.com/v1");
        assert_eq!(config.oracle.timeout_ms, 20_000);
        assert!(config.scoring.clamp_adjustments);
        assert!(config.catalogs.archetypes_path.is_none());
    }

    #[test]
    fn validate_rejects_bad_url_and_clamps_ranges() {
        let mut config = Config::default();
        config.oracle.temperature = 9.0;
        config.oracle.timeout_ms = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle.temperature, 2.0);
        assert_eq!(config.oracle.timeout_ms, 20_000);

        config.oracle.base_url = "api.openai.com".to_string();
        assert!(config.validate().is_err());
    }
}
