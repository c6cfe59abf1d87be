use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

use editcore::history::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_WELCOME: &str = "# Welcome 👋\n\nThis is my **Markdown Editor**!";

const MAX_HISTORY_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Undo snapshots kept before the oldest are dropped.
    pub history_limit: usize,
    /// Buffer shown when nothing was stored yet.
    pub welcome_text: String,
    /// Persist the buffer after every change.
    pub autosave: bool,
    /// Show the rendered preview next to the editor.
    pub preview: bool,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_size: usize,
    pub use_spaces: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            welcome_text: String::from(DEFAULT_WELCOME),
            autosave: true,
            preview: true,
            editor: EditorConfig::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            use_spaces: true,
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, writing defaults");
                            let default_config = Self::default();
                            let _ = default_config.save().await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate()?;
                                log::info!("Loaded config from: {}", config_path.display());
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to back up broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save().await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save().await;
        Ok(default_config)
    }

    pub async fn save(&self) -> Result<()> {
        let Some(config_path) = Self::config_path() else {
            return Ok(());
        };

        let mut config_to_save = self.clone();
        config_to_save.validate()?;

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
        tokio::fs::write(&config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            )
        })?;

        log::info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    /// Repair out-of-range values in place.
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            log::warn!(
                "Invalid history limit: {}, using default",
                self.history_limit
            );
            self.history_limit = DEFAULT_HISTORY_LIMIT;
            has_issues = true;
        }

        if self.editor.tab_size == 0 || self.editor.tab_size > 16 {
            log::warn!("Invalid tab size: {}, using default", self.editor.tab_size);
            self.editor.tab_size = 4;
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    /// Text inserted for the Tab key.
    pub fn indent_unit(&self) -> String {
        if self.editor.use_spaces {
            " ".repeat(self.editor.tab_size)
        } else {
            "\t".to_string()
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MARKNOTE_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("MARKNOTE_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "marknote", "marknote")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
