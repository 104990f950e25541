use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, str::FromStr};
use tracing::debug;

use crate::i18n::Language;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
    /// No ANSI styling.
    Plain,
}

impl FromStr for ColorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ColorMode::Light),
            "dark" => Ok(ColorMode::Dark),
            "plain" | "none" => Ok(ColorMode::Plain),
            other => Err(anyhow!("unknown color mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSettings {
    pub version: u32,
    pub language: Language,
    pub color_mode: ColorMode,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            version: 1,
            language: Language::default(),
            color_mode: ColorMode::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn load(&self) -> Result<Option<PersistedSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let st = serde_json::from_str(&raw)?;
        Ok(Some(st))
    }

    pub fn save(&self, st: &PersistedSettings) -> Result<()> {
        let raw = serde_json::to_string_pretty(st)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Display settings handed to every render call.
///
/// Lifecycle: `init` loads persisted settings (or defaults), setters persist
/// immediately, `teardown` writes the final state once more.
pub struct RenderContext {
    settings: PersistedSettings,
    store: SettingsStore,
}

impl RenderContext {
    pub fn init(store: SettingsStore) -> Result<Self> {
        let settings = store.load()?.unwrap_or_default();
        debug!(language = settings.language.code(), color = ?settings.color_mode, "settings.init");
        Ok(Self { settings, store })
    }

    pub fn language(&self) -> Language {
        self.settings.language
    }

    pub fn color_mode(&self) -> ColorMode {
        self.settings.color_mode
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.settings.language = language;
        self.persist()
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) -> Result<()> {
        self.settings.color_mode = mode;
        self.persist()
    }

    pub fn persist(&self) -> Result<()> {
        self.store.save(&self.settings)
    }

    pub fn teardown(self) -> Result<()> {
        self.persist()
    }
}
