// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz
//
// Regression tests for runway closure matching against the runway reference
// table, including the taxiway-context exception.

use notam_core::notice::{NoticeDraft, NoticeRecord};
use notam_core::provider::Provider;
use notam_core::runway::{is_runway_closed, runway_status, RunwayDescriptor, RunwayTable};
use notam_core::time::ParsedTime;
use std::io::Write;
use tempfile::NamedTempFile;

fn closure_keywords() -> Vec<String> {
    vec!["CLOSED".to_string(), "CLSD".to_string()]
}

fn notice(text: &str) -> NoticeRecord {
    NoticeRecord::from_draft(
        NoticeDraft {
            text: text.to_string(),
            effective_start: ParsedTime::not_available(),
            effective_end: ParsedTime::not_available(),
        },
        Provider::Cfps,
    )
}

fn runway(le: &str, he: Option<&str>, surface: &str) -> RunwayDescriptor {
    RunwayDescriptor {
        airport_ident: "CYYC".to_string(),
        le_ident: le.to_string(),
        he_ident: he.map(str::to_string),
        length_ft: Some(8000),
        surface: Some(surface.to_string()),
    }
}

#[test]
fn test_direct_closure() {
    assert!(is_runway_closed("RWY 09/27 CLSD", "09/27", &closure_keywords()));
}

#[test]
fn test_taxiway_context_is_not_closure() {
    assert!(!is_runway_closed(
        "TWY A CLSD RWY 09/27",
        "09/27",
        &closure_keywords()
    ));
}

#[test]
fn test_available_as_taxiway_is_closure() {
    assert!(is_runway_closed(
        "TWY A CLSD RWY 09/27 AVBL AS TWY",
        "09/27",
        &closure_keywords()
    ));
}

#[test]
fn test_available_as_taxiway_needs_closure_keyword() {
    // Only the closure keyword makes the taxiway-use notice a closure
    assert!(!is_runway_closed(
        "TWY A RWY 09/27 AVBL AS TWY",
        "09/27",
        &closure_keywords()
    ));
    let runways = vec![runway("09", Some("27"), "ASPH")];
    let status = runway_status(
        &[notice("TWY A CLSD RWY 09/27 AVBL AS TWY")],
        &runways,
        &closure_keywords(),
    );
    assert!(status[0].closed);
}

#[test]
fn test_status_per_runway() {
    let runways = vec![
        runway("09", Some("27"), "ASPH"),
        runway("17L", Some("35R"), "CON"),
        runway("H1", None, "GRASS"),
    ];
    let notices = vec![
        notice("RWY 09/27 CLSD DUE TO SNOW REMOVAL"),
        notice("TWY C CLSD BTN RWY 17L/35R AND APRON"),
    ];

    let status = runway_status(&notices, &runways, &closure_keywords());
    assert_eq!(status.len(), 3);

    assert_eq!(status[0].full_name, "09/27");
    assert!(status[0].closed);
    assert_eq!(status[0].status_label(), "closed");
    assert_eq!(status[0].surface, "Asphalt");
    assert!(status[0].usable);

    assert_eq!(status[1].full_name, "17L/35R");
    assert!(!status[1].closed);
    assert_eq!(status[1].surface, "Concrete");

    assert_eq!(status[2].full_name, "H1");
    assert_eq!(status[2].status_label(), "open");
    assert_eq!(status[2].surface, "Grass");
    assert!(!status[2].usable);
}

#[test]
fn test_table_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "airport_ident,le_ident,he_ident,length_ft,surface").unwrap();
    writeln!(file, "CYYC,17L,35R,12675,CON").unwrap();
    writeln!(file, "KTEB,06,24,7000,ASP").unwrap();
    writeln!(file, "KTEB,01,19,6013,ASP").unwrap();
    file.flush().unwrap();

    let table = RunwayTable::load(file.path()).unwrap();
    assert_eq!(table.len(), 3);
    let kteb = table.for_airport("kteb");
    assert_eq!(kteb.len(), 2);
    assert_eq!(kteb[1].full_name(), "01/19");
    assert!(table.for_airport("KJFK").is_empty());
}
