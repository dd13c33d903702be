// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Render-agnostic helpers for notice cards: keyword highlighting, the free-text
//! filter, and validity duration / time remaining.

use crate::notice::NoticeRecord;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Splits `text` into plain and highlighted runs. Keywords match case-sensitively,
/// the way operational keywords (`CLSD`) are written.
pub fn highlight(text: &str, keywords: &[String]) -> Vec<Segment> {
    mark(text, &text_ranges(text, keywords, false))
}

/// Same as [`highlight`] but case-insensitive, for user search terms.
pub fn highlight_terms(text: &str, terms: &[String]) -> Vec<Segment> {
    mark(text, &text_ranges(text, terms, true))
}

/// An empty term list matches everything.
pub fn matches_filter(text: &str, terms: &[String]) -> bool {
    if terms.iter().all(|t| t.trim().is_empty()) {
        return true;
    }
    let text_lower = text.to_lowercase();
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .any(|t| text_lower.contains(&t))
}

/// Comma-separated filter input.
pub fn parse_filter_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Byte ranges of every keyword occurrence, merged where they overlap.
fn text_ranges(text: &str, keywords: &[String], ignore_case: bool) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    for kw in keywords.iter().filter(|k| !k.is_empty()) {
        let pattern = if ignore_case {
            format!("(?i){}", regex::escape(kw))
        } else {
            regex::escape(kw)
        };
        let Ok(re) = regex::Regex::new(&pattern) else {
            continue;
        };
        ranges.extend(re.find_iter(text).map(|m| (m.start(), m.end())));
    }

    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn mark(text: &str, ranges: &[(usize, usize)]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for &(start, end) in ranges {
        if start > cursor {
            segments.push(Segment {
                text: text[cursor..start].to_string(),
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: text[start..end].to_string(),
            highlighted: true,
        });
        cursor = end;
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            highlighted: false,
        });
    }
    segments
}

impl NoticeRecord {
    /// Validity span, when both ends are concrete times.
    pub fn duration(&self) -> Option<Duration> {
        Some(self.end()? - self.start()?)
    }

    pub fn remaining(&self, now: NaiveDateTime) -> Remaining {
        match self.end() {
            Some(end) if end > now => Remaining::Pending(end - now),
            Some(_) => Remaining::Expired,
            None => Remaining::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Pending(Duration),
    Expired,
    /// PERM or unknown expiry.
    Open,
}

impl Remaining {
    pub fn label(&self) -> String {
        match self {
            Remaining::Pending(d) => format!("(in {})", format_duration(*d)),
            Remaining::Expired => "(expired)".to_string(),
            Remaining::Open => String::new(),
        }
    }
}

/// `{hours}h{minutes:02}m`, e.g. `26h05m`. Negative spans keep their sign.
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes();
    let sign = if total_minutes < 0 { "-" } else { "" };
    let total_minutes = total_minutes.abs();
    format!("{}{}h{:02}m", sign, total_minutes / 60, total_minutes % 60)
}

pub fn duration_label(notice: &NoticeRecord) -> String {
    notice
        .duration()
        .map(format_duration)
        .unwrap_or_else(|| crate::time::NOT_AVAILABLE.to_string())
}
