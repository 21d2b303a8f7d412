use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub transcription: EngineConfig,
    pub translation: EngineConfig,
    pub stream: StreamConfig,
    pub defaults: LanguageDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Connection settings for one remote engine (speech-to-text or translation)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the OpenAI-compatible API (trailing slash is stripped)
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Caption delivery channel settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bound on connection establishment
    pub connect_timeout_secs: u64,
    /// Fixed delay before a reconnect attempt after abnormal closure
    pub reconnect_delay_secs: u64,
}

/// Language defaults applied when a message or request omits them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageDefaults {
    pub source_language: String,
    pub target_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            transcription: EngineConfig::default(),
            translation: EngineConfig {
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 60,
                ..EngineConfig::default()
            },
            stream: StreamConfig::default(),
            defaults: LanguageDefaults::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "caption-relay".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "whisper-1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            reconnect_delay_secs: 3,
        }
    }
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self {
            source_language: "auto".to_string(),
            target_language: "english".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
