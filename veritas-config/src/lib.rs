//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Configuration is resolved once at startup: defaults, an optional YAML
//! file, `VERITAS__`-prefixed environment overrides, and `${VAR}` expansion
//! inside string values, in that order. [`VeritasConfig::from_env`] covers
//! the flat variable names (`GOOGLE_API_KEY`, `GEMINI_API_KEY`, ...) used by
//! existing deployments.
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use veritas_common::{
    LlmConfig, SearchConfig, DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL,
    DEFAULT_TEMPERATURE,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration for the fact-checking service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct VeritasConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Bind address and browser-origin settings for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed by CORS; `*` permits any origin.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Load(#[from] config::ConfigError),
    #[error("{0}")]
    Invalid(String),
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct VeritasConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for VeritasConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VeritasConfigLoader {
    /// Start with sensible defaults: YAML file + `VERITAS__` env overrides.
    ///
    /// ```
    /// use veritas_config::VeritasConfigLoader;
    ///
    /// let config = VeritasConfigLoader::new()
    ///     .with_yaml_str("server:\n  port: 9100")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.port, 9100);
    /// assert_eq!(config.server.host, "127.0.0.1");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `${VAR}` placeholders inside string values are expanded before the
    /// typed structs are materialised.
    ///
    /// ```
    /// use veritas_config::VeritasConfigLoader;
    ///
    /// std::env::set_var("VERITAS_DOCTEST_KEY", "injected-from-env");
    ///
    /// let config = VeritasConfigLoader::new()
    ///     .with_yaml_str("search:\n  api_key: \"${VERITAS_DOCTEST_KEY}\"\n  engine_id: \"cx\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.search.api_key, "injected-from-env");
    /// assert_eq!(config.search.engine_id, "cx");
    ///
    /// std::env::remove_var("VERITAS_DOCTEST_KEY");
    /// ```
    pub fn load(self) -> Result<VeritasConfig, ConfigError> {
        // Environment goes last so `VERITAS__` variables win over file values.
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("VERITAS").separator("__"))
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: VeritasConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(typed)
    }
}

/// Read a variable, treating unset and blank the same way.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn ollama_base_url() -> String {
    match env_var("OLLAMA_BASE_URL").or_else(|| env_var("OLLAMA_HOST")) {
        Some(raw) if raw.starts_with("http") => raw,
        Some(raw) => format!("http://{raw}"),
        None => DEFAULT_OLLAMA_BASE_URL.to_string(),
    }
}

impl VeritasConfig {
    /// Build a configuration from the classic flat environment names.
    ///
    /// Provider selection: `VERITAS_LLM_PROVIDER` forces a provider when
    /// set; otherwise a present `GEMINI_API_KEY` selects Gemini and the
    /// fallback is a local Ollama.
    pub fn from_env() -> Result<Self, ConfigError> {
        let search = SearchConfig {
            api_key: env_var("GOOGLE_API_KEY").unwrap_or_default(),
            engine_id: env_var("GOOGLE_CSE_ID").unwrap_or_default(),
            ..SearchConfig::default()
        };

        let temperature = match env_var("LLM_TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().map_err(|_| {
                ConfigError::Invalid("LLM_TEMPERATURE must be a number if set.".to_string())
            })?,
            None => DEFAULT_TEMPERATURE,
        };

        let gemini_key = env_var("GEMINI_API_KEY");
        let llm = match env_var("VERITAS_LLM_PROVIDER").as_deref() {
            Some("gemini") => {
                let api_key = gemini_key.ok_or_else(|| {
                    ConfigError::Invalid(
                        "GEMINI_API_KEY must be set when LLM provider 'gemini' is selected."
                            .to_string(),
                    )
                })?;
                gemini_config(api_key, temperature)
            }
            Some("ollama") => ollama_config(temperature),
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown LLM provider '{other}'. Expected 'ollama' or 'gemini'."
                )))
            }
            None => match gemini_key {
                Some(api_key) => gemini_config(api_key, temperature),
                None => ollama_config(temperature),
            },
        };

        let server = ServerConfig {
            host: env_var("VERITAS_HOST").unwrap_or_else(default_host),
            port: match env_var("VERITAS_PORT") {
                Some(raw) => raw.parse::<u16>().map_err(|_| {
                    ConfigError::Invalid("VERITAS_PORT must be a port number if set.".to_string())
                })?,
                None => default_port(),
            },
            allowed_origin: env_var("VERITAS_ALLOWED_ORIGIN").unwrap_or_else(default_allowed_origin),
        };

        Ok(Self { server, search, llm })
    }
}

fn gemini_config(api_key: String, temperature: f32) -> LlmConfig {
    LlmConfig::Gemini {
        api_key,
        model: env_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        temperature,
    }
}

fn ollama_config(temperature: f32) -> LlmConfig {
    LlmConfig::Ollama {
        base_url: ollama_base_url(),
        model: env_var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
        temperature,
    }
}
