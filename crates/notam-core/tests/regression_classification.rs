// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz
//
// Regression tests for notice categorization. Rules are ordered and the first
// match wins, so precedence between PPR and runway keywords is pinned here.

use notam_core::classifier::{Category, Classifier};

#[test]
fn test_ppr_precedes_runway() {
    assert_eq!(Classifier::classify("RWY 09 PPR REQUIRED"), Category::Ppr);
    assert_eq!(
        Classifier::classify("RUNWAY 09 AVBL FOR PPR OPS ONLY"),
        Category::Ppr
    );
}

#[test]
fn test_services_without_runway_token() {
    assert_eq!(
        Classifier::classify("TOWER CLOSED FOR MAINTENANCE"),
        Category::AirportServices
    );
    assert_eq!(
        Classifier::classify("Ground control frequency changed"),
        Category::AirportServices
    );
}

#[test]
fn test_airspace_navigation() {
    let cases = [
        "FDC 5/1234 SPECIAL NOTICE",
        "ILS APPROACH U/S",
        "RESTRICTED AIRSPACE ACTIVE",
        "VOR NAVIGATION AID U/S",
    ];
    for text in cases {
        assert_eq!(
            Classifier::classify(text),
            Category::AirspaceNavigation,
            "'{}' should be AirspaceNavigation",
            text
        );
    }
}

#[test]
fn test_substring_rules_are_not_word_bound() {
    // Only PPR is whole-word; "STAR" matches inside "START"
    assert_eq!(
        Classifier::classify("ENGINE START PROCEDURES"),
        Category::AirspaceNavigation
    );
}

#[test]
fn test_fallback_other() {
    assert_eq!(Classifier::classify("BIRD ACTIVITY"), Category::Other);
    assert_eq!(Classifier::classify(""), Category::Other);
}

#[test]
fn test_display_names() {
    assert_eq!(Category::AirspaceNavigation.to_string(), "Airspace/Navigation");
    assert_eq!(Category::AirportServices.to_string(), "Airport Services");
    assert!(Category::Ppr.is_prominent());
    assert!(!Category::Other.is_prominent());
}
