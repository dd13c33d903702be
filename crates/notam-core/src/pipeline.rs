// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::PipelineConfig;
use crate::dedup::deduplicate;
use crate::notice::NoticeRecord;
use crate::provider::Provider;
use crate::runway::{runway_status, RunwayDescriptor, RunwayStatus};
use crate::sorter::sort_for_display;
use log::info;
use serde::Serialize;
use serde_json::Value;

/// Everything the dashboard shows for one airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportReport {
    pub icao: String,
    pub provider: Provider,
    pub notices: Vec<NoticeRecord>,
    pub runways: Vec<RunwayStatus>,
}

/// Extract, suppress, classify, deduplicate and order the notices of one airport.
/// Holds only the immutable configuration; each call is independent.
#[derive(Debug, Clone, Default)]
pub struct NotamPipeline {
    config: PipelineConfig,
}

impl NotamPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// `payloads` are the raw response pages for this airport, in fetch order.
    pub fn process(
        &self,
        icao: &str,
        provider: Provider,
        payloads: &[Value],
        runways: &[RunwayDescriptor],
    ) -> AirportReport {
        let notices = self.notices(provider, payloads);
        let runways = self.runway_status(&notices, runways);

        info!(
            "Processed NOTAMs; icao={} provider={} notices={} runways_closed={}",
            icao,
            provider,
            notices.len(),
            runways.iter().filter(|r| r.closed).count()
        );

        AirportReport {
            icao: icao.trim().to_uppercase(),
            provider,
            notices,
            runways,
        }
    }

    /// Runway status over an arbitrary notice subset, e.g. after a text filter.
    pub fn runway_status(
        &self,
        notices: &[NoticeRecord],
        runways: &[RunwayDescriptor],
    ) -> Vec<RunwayStatus> {
        runway_status(notices, runways, &self.config.closure_keywords)
    }

    pub fn notices(&self, provider: Provider, payloads: &[Value]) -> Vec<NoticeRecord> {
        let adapter = provider.adapter();

        let records: Vec<NoticeRecord> = payloads
            .iter()
            .flat_map(|payload| adapter.extract(payload))
            .filter(|draft| !self.config.is_suppressed(&draft.text))
            .map(|draft| NoticeRecord::from_draft(draft, provider))
            .collect();

        let mut records = deduplicate(records);
        sort_for_display(&mut records);
        records
    }
}
