// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Provider adapters turning raw CFPS / FAA payloads into [`NoticeDraft`]s.
//!
//! Payload schemas drift between API revisions (`data`, `items`, `features`,
//! or a bare array), so every field is read defensively.

use crate::notice::NoticeDraft;
use crate::time::{interpret_faa_value, parse_cfps_token, ParsedTime};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

const LOCAL_FORMAT: &str = "LOCAL_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Cfps,
    Faa,
}

impl Provider {
    /// Canadian aerodromes (`C...`) are served by CFPS, everything else by the FAA.
    pub fn for_icao(icao: &str) -> Self {
        if icao.trim().to_uppercase().starts_with('C') {
            Provider::Cfps
        } else {
            Provider::Faa
        }
    }

    pub fn adapter(&self) -> &'static dyn ProviderAdapter {
        match self {
            Provider::Cfps => &CfpsAdapter,
            Provider::Faa => &FaaAdapter,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Cfps => "CFPS",
            Provider::Faa => "FAA",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cfps" | "navcanada" => Ok(Provider::Cfps),
            "faa" => Ok(Provider::Faa),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

pub trait ProviderAdapter: Sync {
    fn provider(&self) -> Provider;

    /// Never fails: unreadable items are skipped.
    fn extract(&self, payload: &Value) -> Vec<NoticeDraft>;
}

/// Locates the item list inside a payload of any observed shape.
pub fn payload_items(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => {
            for key in ["items", "features", "data"] {
                match map.get(key) {
                    Some(Value::Array(items)) => return items,
                    Some(nested @ Value::Object(_)) => return payload_items(nested),
                    _ => {}
                }
            }
            &[]
        }
        _ => &[],
    }
}

pub struct CfpsAdapter;

impl ProviderAdapter for CfpsAdapter {
    fn provider(&self) -> Provider {
        Provider::Cfps
    }

    fn extract(&self, payload: &Value) -> Vec<NoticeDraft> {
        let items = payload_items(payload);
        let drafts: Vec<NoticeDraft> = items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("notam"))
            .filter_map(|item| {
                let text = cfps_body(item.get("text")?)?;
                let (effective_start, effective_end) = cfps_validity(&text);
                Some(NoticeDraft {
                    text,
                    effective_start,
                    effective_end,
                })
            })
            .collect();

        debug!(
            "Extracted CFPS notices; items={} kept={}",
            items.len(),
            drafts.len()
        );
        drafts
    }
}

/// The CFPS `text` field is itself a JSON envelope whose `raw` member carries the
/// notice. Anything that does not decode that way is used verbatim.
fn cfps_body(text: &Value) -> Option<String> {
    let body = match text {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(envelope)) => match envelope.get("raw") {
                Some(Value::String(raw)) => raw.clone(),
                _ => s.clone(),
            },
            _ => s.clone(),
        },
        Value::Object(envelope) => match envelope.get("raw") {
            Some(Value::String(raw)) => raw.clone(),
            _ => text.to_string(),
        },
        _ => return None,
    };

    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Item B) and C) markers embedded in the notice prose.
pub fn cfps_validity(text: &str) -> (ParsedTime, ParsedTime) {
    static RE_START: OnceLock<Regex> = OnceLock::new();
    static RE_END: OnceLock<Regex> = OnceLock::new();
    let re_start = RE_START.get_or_init(|| Regex::new(r"\bB\)\s*(\d{10}|PERM)").unwrap());
    let re_end = RE_END.get_or_init(|| Regex::new(r"\bC\)\s*(\d{10}|PERM)").unwrap());

    let marker = |re: &Regex| {
        re.captures(text)
            .map(|caps| parse_cfps_token(&caps[1]))
            .unwrap_or_default()
    };

    (marker(re_start), marker(re_end))
}

pub struct FaaAdapter;

impl ProviderAdapter for FaaAdapter {
    fn provider(&self) -> Provider {
        Provider::Faa
    }

    fn extract(&self, payload: &Value) -> Vec<NoticeDraft> {
        let items = payload_items(payload);
        let mut skipped_icao_only = 0usize;

        let drafts: Vec<NoticeDraft> = items
            .iter()
            .filter_map(|feature| {
                let core = feature.get("properties")?.get("coreNOTAMData")?;
                let notam = core.get("notam");

                // Only consumer-friendly domestic text is surfaced.
                let Some(text) = local_format_text(core.get("notamTranslation")) else {
                    skipped_icao_only += 1;
                    return None;
                };

                Some(NoticeDraft {
                    text,
                    effective_start: interpret_faa_value(notam.and_then(|n| n.get("effectiveStart"))),
                    effective_end: interpret_faa_value(notam.and_then(|n| n.get("effectiveEnd"))),
                })
            })
            .collect();

        debug!(
            "Extracted FAA notices; items={} kept={} icao_only={}",
            items.len(),
            drafts.len(),
            skipped_icao_only
        );
        drafts
    }
}

/// Last `LOCAL_FORMAT` translation with a non-empty `simpleText`.
fn local_format_text(translations: Option<&Value>) -> Option<String> {
    translations?
        .as_array()?
        .iter()
        .filter(|t| t.get("type").and_then(Value::as_str) == Some(LOCAL_FORMAT))
        .filter_map(|t| t.get("simpleText").and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
        .last()
        .map(str::to_string)
}
