//! Durable storage for the document and the theme flag.
//!
//! Both live in one small JSON store file so they survive restarts. The
//! application writes the buffer after every change and the theme whenever
//! it is toggled; neither write depends on the other.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::try_exists;

const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// On-disk layout of the store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    theme: Option<Theme>,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// What a session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub buffer: String,
    pub theme: Theme,
    /// `true` when the buffer came from the store rather than the default.
    pub from_store: bool,
}

pub struct Storage {
    path: PathBuf,
    data: StoreData,
}

impl Storage {
    /// Storage in the platform data directory, or `MARKNOTE_DATA_DIR`.
    pub fn new() -> Result<Self> {
        Ok(Self::at(data_dir()?.join(STORE_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: StoreData::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store, falling back to `welcome` and the light theme for
    /// anything that is missing. An unreadable store is moved aside.
    pub async fn load(&mut self, welcome: &str) -> Result<Restored> {
        self.data = StoreData::default();

        if try_exists(&self.path).await? {
            let json = fs::read_to_string(&self.path)
                .await
                .with_context(|| format!("Failed to read store {}", self.path.display()))?;

            match serde_json::from_str::<StoreData>(&json) {
                Ok(data) => {
                    log::info!("Restored session from {}", self.path.display());
                    self.data = data;
                }
                Err(e) => {
                    log::error!("Failed to parse store {}: {}", self.path.display(), e);
                    let backup = self.path.with_extension("bak");
                    if let Err(e) = fs::copy(&self.path, &backup).await {
                        log::warn!("Failed to back up broken store: {}", e);
                    } else {
                        log::info!("Backed up broken store to: {}", backup.display());
                    }
                }
            }
        } else {
            log::info!("No stored session at {}, using defaults", self.path.display());
        }

        let from_store = self.data.markdown.is_some();
        Ok(Restored {
            buffer: self
                .data
                .markdown
                .clone()
                .unwrap_or_else(|| welcome.to_string()),
            theme: self.data.theme.unwrap_or_default(),
            from_store,
        })
    }

    pub async fn save_buffer(&mut self, text: &str) -> Result<()> {
        self.data.markdown = Some(text.to_string());
        self.write().await
    }

    pub async fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.data.theme = Some(theme);
        self.write().await
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.data.saved_at
    }

    async fn write(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create data directory {}", parent.display())
            })?;
        }

        self.data.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&self.data)?;

        // Write next to the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        log::debug!("Persisted store to {}", self.path.display());
        Ok(())
    }
}

/// Directory for the store and the log file.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MARKNOTE_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let dirs = ProjectDirs::from("com", "marknote", "marknote")
        .ok_or_else(|| anyhow::anyhow!("Could not determine the data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}
