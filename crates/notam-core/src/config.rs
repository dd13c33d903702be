// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "notam_config.json";

fn default_keywords() -> Vec<String> {
    vec!["CLOSED".to_string(), "CLSD".to_string()]
}

fn default_suppress_keywords() -> Vec<String> {
    [
        "crane",
        "RUSSIAN",
        "CONGO",
        "OBST RIG",
        "CANCELLED",
        "CANCELED",
        "SAFETY AREA NOT STD",
        "GRASS CUTTING",
        "OBST TOWER",
        "SFC MARKINGS NOT STD",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Words emphasised in notice text.
    #[serde(default = "default_keywords")]
    pub highlight_keywords: Vec<String>,
    /// Words that mark a runway closed when they follow `RWY <name>`.
    #[serde(default = "default_keywords")]
    pub closure_keywords: Vec<String>,
    /// Notices containing any of these (case-insensitive) are dropped.
    #[serde(default = "default_suppress_keywords")]
    pub suppress_keywords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            highlight_keywords: default_keywords(),
            closure_keywords: default_keywords(),
            suppress_keywords: default_suppress_keywords(),
        }
    }
}

impl PipelineConfig {
    pub fn is_suppressed(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        self.suppress_keywords
            .iter()
            .filter(|kw| !kw.is_empty())
            .any(|kw| text_lower.contains(&kw.to_lowercase()))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: crate::get_config_root().join(CONFIG_FILE_NAME),
        }
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<PipelineConfig> {
        if !self.config_path.exists() {
            return Ok(PipelineConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.config_path.display()))
    }

    pub fn save(&self, config: &PipelineConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_suppression_is_case_insensitive() {
        let config = PipelineConfig::default();
        assert!(config.is_suppressed("CRANE 200FT AGL 1NM N OF AD"));
        assert!(config.is_suppressed("notam cancelled"));
        assert!(!config.is_suppressed("RWY 09/27 CLSD"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"suppress_keywords": ["BIRD"]}"#).unwrap();
        assert_eq!(config.suppress_keywords, vec!["BIRD".to_string()]);
        assert_eq!(config.closure_keywords, default_keywords());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("cfg.json"));

        // Missing file yields defaults
        assert_eq!(manager.load().unwrap(), PipelineConfig::default());

        let mut config = PipelineConfig::default();
        config.highlight_keywords.push("WIP".to_string());
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ConfigManager::with_path(&path).load().unwrap_err();
        assert!(format!("{:#}", err).contains("cfg.json"));
    }
}
