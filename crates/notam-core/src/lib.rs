// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod classifier;
pub mod config;
pub mod dedup;
pub mod display;
pub mod notice;
pub mod pipeline;
pub mod provider;
pub mod runway;
pub mod sorter;
pub mod time;
pub mod weather;

pub use classifier::{Category, Classifier};
pub use config::{ConfigManager, PipelineConfig};
pub use notice::{NoticeDraft, NoticeRecord};
pub use pipeline::{AirportReport, NotamPipeline};
pub use provider::{CfpsAdapter, FaaAdapter, Provider, ProviderAdapter};
pub use runway::{RunwayDescriptor, RunwayStatus, RunwayTable};
pub use time::{ParsedTime, TimeValue};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Runway table is missing column '{0}'")]
    MissingColumn(String),
}

/// Per-user configuration directory, falling back to the working directory.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "notam-oxide", "NOTAM-Oxide")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Splits user input such as `"cyyc, kteb KJFK,cyyc"` into unique upper-case codes,
/// keeping first-seen order.
pub fn parse_icao_list(input: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
    {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// Reads a provider payload saved as JSON.
pub fn load_payload<P: AsRef<std::path::Path>>(path: P) -> Result<serde_json::Value, NotamError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
