// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::notice::NoticeRecord;
use crate::NotamError;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayDescriptor {
    pub airport_ident: String,
    pub le_ident: String,
    pub he_ident: Option<String>,
    pub length_ft: Option<u32>,
    pub surface: Option<String>,
}

impl RunwayDescriptor {
    /// "09/27", or just "09" for a single-ended runway.
    pub fn full_name(&self) -> String {
        match self.he_ident.as_deref().map(str::trim) {
            Some(he) if !he.is_empty() => format!("{}/{}", self.le_ident.trim(), he),
            _ => self.le_ident.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayStatus {
    pub full_name: String,
    pub length_ft: Option<u32>,
    pub surface: String,
    pub usable: bool,
    pub closed: bool,
}

impl RunwayStatus {
    pub fn status_label(&self) -> &'static str {
        if self.closed {
            "closed"
        } else {
            "open"
        }
    }
}

/// Row as it appears in the reference CSV. Lengths are sometimes written as floats.
#[derive(Debug, Deserialize)]
struct RunwayRow {
    airport_ident: String,
    le_ident: Option<String>,
    he_ident: Option<String>,
    length_ft: Option<String>,
    surface: Option<String>,
}

impl RunwayRow {
    fn into_descriptor(self) -> Option<RunwayDescriptor> {
        let le_ident = self.le_ident?.trim().to_string();
        if le_ident.is_empty() {
            return None;
        }
        let length_ft = self
            .length_ft
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|l| l.is_finite() && *l >= 0.0)
            .map(|l| l.round() as u32);

        Some(RunwayDescriptor {
            airport_ident: self.airport_ident.trim().to_uppercase(),
            le_ident,
            he_ident: self.he_ident.filter(|s| !s.trim().is_empty()),
            length_ft,
            surface: self.surface.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Static runway reference table (OurAirports `runways.csv` layout).
#[derive(Debug, Clone, Default)]
pub struct RunwayTable {
    runways: Vec<RunwayDescriptor>,
}

impl RunwayTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NotamError> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        debug!(
            "Loaded runway table; path={} runways={}",
            path.as_ref().display(),
            table.runways.len()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NotamError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?;
        for required in ["airport_ident", "le_ident"] {
            if !headers.iter().any(|h| h == required) {
                return Err(NotamError::MissingColumn(required.to_string()));
            }
        }

        let mut runways = Vec::new();
        for result in rdr.deserialize::<RunwayRow>() {
            match result {
                Ok(row) => runways.extend(row.into_descriptor()),
                Err(e) => warn!("Skipping unreadable runway row; error={}", e),
            }
        }

        Ok(Self { runways })
    }

    pub fn from_descriptors(runways: Vec<RunwayDescriptor>) -> Self {
        Self { runways }
    }

    pub fn for_airport(&self, icao: &str) -> Vec<RunwayDescriptor> {
        let icao = icao.trim().to_uppercase();
        self.runways
            .iter()
            .filter(|r| r.airport_ident == icao)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.runways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runways.is_empty()
    }
}

/// Closure patterns for one runway, compiled once and reused across notices.
pub struct ClosureMatcher {
    direct: Regex,
    twy_context: Regex,
    keywords: Vec<String>,
}

impl ClosureMatcher {
    /// `None` when there are no closure keywords, since nothing can close the runway.
    pub fn new(runway_name: &str, closure_keywords: &[String]) -> Option<Self> {
        let keywords: Vec<String> = closure_keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return None;
        }

        let runway = regex::escape(&runway_name.trim().to_uppercase());
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let direct = Regex::new(&format!(r"RWY\s+{}\b.*(?:{})", runway, alternation)).ok()?;
        let twy_context = Regex::new(&format!(r"TWY\s+[A-Z0-9]+.*RWY\s+{}", runway)).ok()?;
        Some(Self {
            direct,
            twy_context,
            keywords,
        })
    }

    /// A closure phrased around a taxiway ("TWY A CLSD RWY 09/27") does not count
    /// unless the runway is "AVBL AS TWY", in which case any closure keyword does.
    pub fn is_closed(&self, notice_text: &str) -> bool {
        let text_upper = notice_text.to_uppercase();
        if self.twy_context.is_match(&text_upper) {
            return text_upper.contains("AVBL AS TWY")
                && self.keywords.iter().any(|k| text_upper.contains(k.as_str()));
        }
        self.direct.is_match(&text_upper)
    }
}

/// True when `notice_text` closes `runway_name`. See [`ClosureMatcher::is_closed`].
pub fn is_runway_closed(notice_text: &str, runway_name: &str, closure_keywords: &[String]) -> bool {
    ClosureMatcher::new(runway_name, closure_keywords).is_some_and(|m| m.is_closed(notice_text))
}

/// Maps a free-text surface code to a display name and a usable flag.
/// Only paved surfaces count as usable; this is a display hint, nothing more.
pub fn normalize_surface(surface: Option<&str>) -> (String, bool) {
    let s = surface.unwrap_or("Unknown").to_uppercase();
    if s.contains("ASP") {
        ("Asphalt".to_string(), true)
    } else if s.contains("CON") {
        ("Concrete".to_string(), true)
    } else {
        (title_case(&s), false)
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// One status per runway, in table order.
pub fn runway_status(
    notices: &[NoticeRecord],
    runways: &[RunwayDescriptor],
    closure_keywords: &[String],
) -> Vec<RunwayStatus> {
    runways
        .iter()
        .map(|rwy| {
            let full_name = rwy.full_name();
            let closed = ClosureMatcher::new(&full_name, closure_keywords)
                .is_some_and(|m| notices.iter().any(|n| m.is_closed(&n.text)));
            let (surface, usable) = normalize_surface(rwy.surface.as_deref());

            RunwayStatus {
                full_name,
                length_ft: rwy.length_ft,
                surface,
                usable,
                closed,
            }
        })
        .collect()
}
