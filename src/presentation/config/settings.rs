use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, File, builder::DefaultState};
use serde::Deserialize;

use crate::domain::{LabelPolicy, PositionalFallback};

use super::Environment;

/// Development-only key. Startup warns when it is still in effect.
pub const DEFAULT_API_KEY: &str = "sk_test_123456789";

const ENV_PREFIX: &str = "APP";
const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub model: ModelSettings,
    pub audio: AudioSettings,
    pub labels: LabelSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    pub api_key: String,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AuthSettings {
    pub fn uses_default_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Hugging Face model id or a local checkpoint directory.
    pub id: String,
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub min_samples: usize,
    pub transcode_enabled: bool,
    pub ffmpeg_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelSettings {
    pub ai_patterns: Vec<String>,
    pub human_patterns: Vec<String>,
    pub fallback_ai_index: usize,
}

impl LabelSettings {
    pub fn to_policy(&self) -> LabelPolicy {
        LabelPolicy::from_patterns(
            self.ai_patterns.iter().cloned(),
            self.human_patterns.iter().cloned(),
            PositionalFallback {
                ai_index: self.fallback_ai_index,
            },
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Loads settings from the working directory.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::load_from(environment, Path::new("."))
    }

    /// Layers, lowest precedence first: built-in defaults, `appsettings.{env}`
    /// in `config_dir`, `APP_*` variables (`__` nests), then `API_KEY`.
    pub fn load_from(environment: Environment, config_dir: &Path) -> Result<Self, ConfigError> {
        let file = config_dir.join(format!("appsettings.{}", environment.as_str()));

        Self::defaults()?
            .add_source(File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("labels.ai_patterns")
                    .with_list_parse_key("labels.human_patterns"),
            )
            .set_override_option("auth.api_key", std::env::var(API_KEY_VAR).ok())?
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.max_body_bytes", 25 * 1024 * 1024)?
            .set_default("auth.api_key", DEFAULT_API_KEY)?
            .set_default("model.id", "MelodyMachine/Deepfake-audio-detection-V2")?
            .set_default("audio.sample_rate", 16_000)?
            .set_default("audio.min_samples", 16_000)?
            .set_default("audio.transcode_enabled", true)?
            .set_default("audio.ffmpeg_path", "ffmpeg")?
            .set_default("labels.ai_patterns", vec!["fake", "spoof", "ai"])?
            .set_default("labels.human_patterns", vec!["real", "bonafide", "human"])?
            .set_default("labels.fallback_ai_index", 1)?
            .set_default("logging.json", false)
    }
}
