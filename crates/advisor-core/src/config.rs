use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub assistant: AssistantConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/routine-advisor/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("routine-advisor")
            .join("config.toml")
    }

    /// Data directory for the key-value store and REPL history.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("routine-advisor")
    }

    /// Resolved storage file path.
    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("storage.json"))
    }
}

/// Where the product document comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Filesystem path or absolute http(s) URL of `{ "products": [...] }`.
    pub source: String,
    /// Fetch timeout for http(s) sources. None waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: "products.json".into(),
            timeout_secs: None,
        }
    }
}

/// Remote assistant endpoint and generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    /// Delay before the "modify this routine?" prompt follows a routine.
    pub follow_up_delay_ms: u64,
    /// Request timeout. None waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://lorealworker.rzaw001.workers.dev".into(),
            temperature: 0.7,
            max_tokens: 1500,
            system_prompt: "You are a L'Oréal beauty expert assistant. You specialize in creating \
                personalized beauty routines using L'Oréal products. When provided with selected \
                products, create detailed step-by-step routines that include proper order of \
                application, timing recommendations, specific techniques, and tips for best \
                results. If the prompt is unrelated, don't answer and ask politely for a question \
                about L'Oréal products."
                .into(),
            follow_up_delay_ms: 1000,
            timeout_secs: None,
        }
    }
}

/// Local key-value storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the store (None = data_dir/storage.json).
    pub path: Option<PathBuf>,
}

/// Presentation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// File rewritten with the rendered page after every event.
    pub page_path: Option<PathBuf>,
    /// Language tag override (falls back to $LANG).
    pub language: Option<String>,
}
