// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::classifier::{Category, Classifier};
use crate::provider::Provider;
use crate::time::ParsedTime;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Output of a provider adapter, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeDraft {
    pub text: String,
    pub effective_start: ParsedTime,
    pub effective_end: ParsedTime,
}

/// A normalized, classified notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeRecord {
    pub text: String,
    pub effective_start: ParsedTime,
    pub effective_end: ParsedTime,
    pub category: Category,
    /// Ordering only. `NaiveDateTime::MIN` when the start is not a concrete time.
    pub sort_key: NaiveDateTime,
    pub provider: Provider,
}

impl NoticeRecord {
    pub fn from_draft(draft: NoticeDraft, provider: Provider) -> Self {
        let category = Classifier::classify(&draft.text);
        let sort_key = draft
            .effective_start
            .datetime()
            .unwrap_or(NaiveDateTime::MIN);
        Self {
            text: draft.text,
            effective_start: draft.effective_start,
            effective_end: draft.effective_end,
            category,
            sort_key,
            provider,
        }
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.effective_start.datetime()
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.effective_end.datetime()
    }
}
