use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Nutella
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Admin API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// On-disk response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// AI proxy configuration
    #[serde(default)]
    pub ai: AiConfig,
}

/// Admin API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin API (users/domains resources live under it)
    #[serde(default = "default_api_host")]
    pub host: String,
    /// Request timeout in seconds
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

fn default_api_host() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

/// On-disk response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory for cached API responses
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache/nutella")
}

/// AI proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Base URL of the answer-generation proxy
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Environment variable name for the proxy API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Model identifier passed through to the proxy
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Number of completions to request
    #[serde(default = "default_n")]
    pub n: u32,
    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            n: default_n(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_proxy_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_api_key_env() -> String {
    "NUTELLA_AI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_n() -> u32 {
    1
}

fn default_ai_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Apply named environment overrides on top of the loaded file.
    ///
    /// This is the only place the process environment is consulted; components
    /// receive their settings explicitly through constructors.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NUTELLA_API_HOST") {
            if !host.is_empty() {
                self.api.host = host;
            }
        }
        if let Ok(dir) = std::env::var("NUTELLA_CACHE_DIR") {
            if !dir.is_empty() {
                self.cache.dir = PathBuf::from(dir);
            }
        }
        if let Ok(url) = std::env::var("NUTELLA_AI_PROXY_URL") {
            if !url.is_empty() {
                self.ai.proxy_url = url;
            }
        }
        if let Ok(model) = std::env::var("NUTELLA_AI_MODEL") {
            if !model.is_empty() {
                self.ai.model = model;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api.host, "http://localhost:3000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.cache.dir, PathBuf::from(".cache/nutella"));
        assert_eq!(config.ai.proxy_url, "http://localhost:3001");
        assert_eq!(config.ai.api_key_env, "NUTELLA_AI_API_KEY");
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert!((config.ai.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.ai.n, 1);
        assert_eq!(config.ai.timeout_secs, 30);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[api]
host = "https://admin.example.com"
timeout_secs = 10

[cache]
dir = "/tmp/nutella-cache"

[ai]
proxy_url = "https://llm.example.com/v1"
api_key_env = "LLM_KEY"
model = "gpt-4"
temperature = 0.7
n = 2
timeout_secs = 60
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.api.host, "https://admin.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/nutella-cache"));
        assert_eq!(config.ai.proxy_url, "https://llm.example.com/v1");
        assert_eq!(config.ai.api_key_env, "LLM_KEY");
        assert_eq!(config.ai.model, "gpt-4");
        assert!((config.ai.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.ai.n, 2);
        assert_eq!(config.ai.timeout_secs, 60);
    }

    #[test]
    fn test_toml_partial_deserialization() {
        // Only one section, one field; everything else falls back to defaults
        let toml_str = r#"
[api]
host = "https://admin.example.com"
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.api.host, "https://admin.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.cache.dir, PathBuf::from(".cache/nutella"));
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        unsafe {
            std::env::set_var("NUTELLA_API_HOST", "https://override.example.com");
            std::env::set_var("NUTELLA_CACHE_DIR", "/tmp/override-cache");
        }

        config.apply_env_overrides();

        assert_eq!(config.api.host, "https://override.example.com");
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/override-cache"));

        unsafe {
            std::env::remove_var("NUTELLA_API_HOST");
            std::env::remove_var("NUTELLA_CACHE_DIR");
        }
    }
}
