// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Runway,
    #[serde(rename = "PPR")]
    Ppr,
    AirspaceNavigation,
    AirportServices,
    Other,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Runway => "Runway",
            Category::Ppr => "PPR",
            Category::AirspaceNavigation => "Airspace/Navigation",
            Category::AirportServices => "Airport Services",
            Category::Other => "Other",
        }
    }

    /// Runway and PPR notices get a heavier card border.
    pub fn is_prominent(&self) -> bool {
        matches!(self, Category::Runway | Category::Ppr)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

const RUNWAY_KEYWORDS: &[&str] = &["RWY", "RUNWAY"];
const AIRSPACE_KEYWORDS: &[&str] = &["SID", "STAR", "APPROACH", "AIRSPACE", "NAVIGATION", "FDC"];
const SERVICE_KEYWORDS: &[&str] = &["TOWER", "APRON", "GROUND", "SERVICE"];

pub struct Classifier;

impl Classifier {
    /// First matching rule wins, so rule order is significant.
    pub fn classify(text: &str) -> Category {
        let text_upper = text.to_uppercase();

        // 1. PPR, whole word only
        if has_ppr_token(&text_upper) {
            return Category::Ppr;
        }

        // 2. Runway
        if contains_any(&text_upper, RUNWAY_KEYWORDS) {
            return Category::Runway;
        }

        // 3. Procedures and airspace. Substring match: "STAR" also hits "START".
        if contains_any(&text_upper, AIRSPACE_KEYWORDS) {
            return Category::AirspaceNavigation;
        }

        // 4. Airport services
        if contains_any(&text_upper, SERVICE_KEYWORDS) {
            return Category::AirportServices;
        }

        Category::Other
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn has_ppr_token(text_upper: &str) -> bool {
    static RE_PPR: OnceLock<regex::Regex> = OnceLock::new();
    let re = RE_PPR.get_or_init(|| regex::Regex::new(r"\bPPR\b").unwrap());
    re.is_match(text_upper)
}
