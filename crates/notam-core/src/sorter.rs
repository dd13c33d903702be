// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::classifier::Category;
use crate::notice::NoticeRecord;
use std::cmp::Reverse;

impl Category {
    // Lower value = shown first
    pub fn priority(&self) -> u8 {
        match self {
            Category::Runway => 0,
            Category::Ppr => 1,
            Category::AirspaceNavigation => 2,
            Category::AirportServices => 3,
            Category::Other => 4,
        }
    }
}

/// Orders notices by category priority, then most recent start first.
/// Notices without a concrete start sort last within their category.
pub fn sort_for_display(notices: &mut [NoticeRecord]) {
    // Stable sort: equal keys keep extraction order, so repeated runs agree.
    notices.sort_by_key(|n| (n.category.priority(), Reverse(n.sort_key)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeDraft;
    use crate::provider::Provider;
    use crate::time::{parse_cfps_token, ParsedTime};

    fn record(text: &str, start: &str) -> NoticeRecord {
        NoticeRecord::from_draft(
            NoticeDraft {
                text: text.to_string(),
                effective_start: if start.is_empty() {
                    ParsedTime::not_available()
                } else {
                    parse_cfps_token(start)
                },
                effective_end: ParsedTime::not_available(),
            },
            Provider::Cfps,
        )
    }

    #[test]
    fn test_category_then_newest_first() {
        let mut notices = vec![
            record("BIRD ACTIVITY", "2501050000"),
            record("RWY 09/27 CLSD", "2501010000"),
            record("PPR 24 HR", "2501030000"),
            record("RWY 15/33 CLSD", "2501020000"),
            record("RWY 04/22 WIP", ""),
            record("APRON II CLSD", "2501040000"),
        ];
        sort_for_display(&mut notices);

        let texts: Vec<&str> = notices.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "RWY 15/33 CLSD",
                "RWY 09/27 CLSD",
                "RWY 04/22 WIP",
                "PPR 24 HR",
                "APRON II CLSD",
                "BIRD ACTIVITY",
            ]
        );
    }
}
