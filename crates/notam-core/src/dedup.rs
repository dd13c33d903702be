// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::notice::NoticeRecord;
use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Strips the issuing-office boilerplate that differs between copies of the same
/// notice: the leading `!` and `NN/NNN` serial numbers.
pub fn normalize_for_dedup(raw_text: &str) -> String {
    static RE_SERIAL: OnceLock<Regex> = OnceLock::new();
    static RE_SPACE: OnceLock<Regex> = OnceLock::new();
    let re_serial = RE_SERIAL.get_or_init(|| Regex::new(r"\b\d{2}/\d{3}\b").unwrap());
    let re_space = RE_SPACE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let text = raw_text.trim_start_matches('!').trim();
    let text = re_serial.replace_all(text, "");
    let text = re_space.replace_all(&text, " ");
    text.trim().to_string()
}

/// Collapses duplicates, keeping the longest text of each group. Groups keep the
/// position of their first member; equal lengths keep the first seen.
pub fn deduplicate(notices: Vec<NoticeRecord>) -> Vec<NoticeRecord> {
    let before = notices.len();
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    let mut kept: Vec<NoticeRecord> = Vec::with_capacity(notices.len());

    for notice in notices {
        let key = (
            normalize_for_dedup(&notice.text),
            notice.effective_start.label.clone(),
            notice.effective_end.label.clone(),
        );
        match index.get(&key) {
            Some(&i) => {
                if notice.text.len() > kept[i].text.len() {
                    kept[i] = notice;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(notice);
            }
        }
    }

    if kept.len() != before {
        debug!(
            "Collapsed duplicate notices; before={} after={}",
            before,
            kept.len()
        );
    }
    kept
}
