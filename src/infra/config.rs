use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{ModelDescriptor, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_MODEL};
use crate::llm::ModelRegistry;

pub const MODEL_ENV: &str = "BRIEFLY_MODEL";
pub const INFERENCE_URL_ENV: &str = "BRIEFLY_INFERENCE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub defaults: SummaryDefaults,
    pub inference: InferenceConfig,
    pub server: ServerConfig,
    /// Appended to the built-in model table.
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryDefaults {
    pub model: String,
    pub max_length: usize,
    pub min_length: usize,
    pub sampling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    pub inference_url: String,
    pub hub_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on one summarize request. Zero disables the limit.
    pub request_timeout_secs: u64,
    pub sliders: SliderConfig,
}

/// Bounds for the web UI's length sliders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SliderConfig {
    pub max_range: (usize, usize),
    pub max_default: usize,
    pub max_step: usize,
    pub min_range: (usize, usize),
    pub min_default: usize,
    pub min_step: usize,
}

impl Default for SummaryDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
            sampling: false,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            inference_url: "https://api-inference.huggingface.co".to_string(),
            hub_url: "https://huggingface.co".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
            request_timeout_secs: 180,
            sliders: SliderConfig::default(),
        }
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            max_range: (30, 300),
            max_default: 120,
            max_step: 10,
            min_range: (10, 150),
            min_default: 40,
            min_step: 5,
        }
    }
}

impl UserConfig {
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::builtin().with_models(self.models.iter().cloned())
    }
}

pub struct ConfigManager {
    source: Option<PathBuf>,
    config: UserConfig,
}

impl ConfigManager {
    const CONFIG_FILE: &'static str = ".briefly.yml";

    /// Loads from `path`, or searches `./.briefly.yml` then the user config dir.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        };

        let config = match &source {
            Some(p) => Self::load_config(p)?,
            None => UserConfig::default(),
        };

        Ok(Self { source, config })
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(Self::CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("briefly").join("config.yml"));
        }
        paths
    }

    fn load_config(path: &Path) -> Result<UserConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: UserConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Effective configuration, environment overrides applied.
    pub fn get(&self) -> UserConfig {
        let mut config = self.config.clone();

        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                config.defaults.model = model;
            }
        }
        if let Ok(url) = std::env::var(INFERENCE_URL_ENV) {
            if !url.trim().is_empty() {
                config.inference.inference_url = url;
            }
        }

        config
    }

    pub fn create_default(dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let config_path = dir.as_ref().join(Self::CONFIG_FILE);

        if config_path.exists() {
            return Ok(None);
        }

        let default_content = r#"# Briefly configuration

defaults:
  model: bart        # bart, distilbart, t5 or any entry under `models`
  max_length: 60     # max summary length (tokens)
  min_length: 20     # min summary length (tokens)
  sampling: false    # creative mode

inference:
  inference_url: https://api-inference.huggingface.co
  hub_url: https://huggingface.co
  request_timeout_secs: 120

server:
  host: 127.0.0.1
  port: 7860
  request_timeout_secs: 180

# Extra models, no code changes needed:
# models:
#   - identifier: pegasus
#     canonical_name: google/pegasus-xsum
#     requires_task_prefix: false
#     description: Extreme single-sentence summaries
"#;

        std::fs::write(&config_path, default_content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        Ok(Some(config_path))
    }
}
