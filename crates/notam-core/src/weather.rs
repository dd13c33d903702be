// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! METAR / TAF normalization for aviationweather.gov JSON responses.
//!
//! The API has returned GeoJSON `features`, nested `data` objects and bare arrays
//! at different times, and field names vary (`rawOb` vs `rawMETAR`, `temp` vs
//! `temperature`). Lookups therefore try every known alias.

use crate::time::{interpret_report_time, ParsedTime, NOT_AVAILABLE};
use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

type Record = Map<String, Value>;

const STATION_KEYS: &[&str] = &["station", "stationId", "icaoId", "icao_id"];
const METAR_TIME_KEYS: &[&str] = &["issueTime", "issue_time", "obsTime", "obs_time", "reportTime"];
const TAF_TIME_KEYS: &[&str] = &["issueTime", "issue_time", "obsTime", "obs_time", "bulletinTime"];
const METAR_RAW_KEYS: &[&str] = &["rawMETAR", "rawOb", "rawText", "raw_text", "raw"];
const TAF_RAW_KEYS: &[&str] = &["rawTAF", "rawText", "raw", "raw_text"];

const TEMP_KEYS: &[&str] = &["temp", "temperature", "temperature_c"];
const DEWPOINT_KEYS: &[&str] = &["dewpoint", "dew_point", "dewpoint_c"];
const WIND_DIR_KEYS: &[&str] = &["windDir", "wind_direction", "wind_direction_degrees"];
const WIND_SPEED_KEYS: &[&str] = &["windSpeed", "wind_speed", "wind_speed_kt"];
const WIND_GUST_KEYS: &[&str] = &["windGust", "wind_gust", "wind_gust_kt"];
const VISIBILITY_KEYS: &[&str] = &["visibility", "visibility_statute", "visibility_sm", "visibility_mi"];
const ALTIMETER_KEYS: &[&str] = &["altimeter", "altimeter_in_hg", "altim_in_hg"];
const CEILING_KEYS: &[&str] = &["ceiling", "ceiling_ft_agl"];
const WEATHER_KEYS: &[&str] = &["wxString", "weather", "wx", "wx_string"];

/// Labelled METAR fields, in display order.
const METAR_DETAIL_FIELDS: &[(&[&str], &str)] = &[
    (TEMP_KEYS, "Temperature (°C)"),
    (DEWPOINT_KEYS, "Dewpoint (°C)"),
    (WIND_DIR_KEYS, "Wind Dir (°)"),
    (WIND_SPEED_KEYS, "Wind Speed (kt)"),
    (WIND_GUST_KEYS, "Wind Gust (kt)"),
    (VISIBILITY_KEYS, "Visibility"),
    (ALTIMETER_KEYS, "Altimeter (inHg)"),
    (CEILING_KEYS, "Ceiling (ft)"),
    (WEATHER_KEYS, "Weather"),
];

const TAF_FORECAST_FIELDS: &[(&[&str], &str)] = &[
    (&["changeIndicator"], "Change"),
    (&["probability"], "Probability"),
    (&["windDir"], "Wind Dir (°)"),
    (&["windSpeed"], "Wind Speed (kt)"),
    (&["windGust"], "Wind Gust (kt)"),
    (&["visibility"], "Visibility"),
    (&["vertVisibility"], "Vertical Vis (ft)"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetarReport {
    pub station: String,
    pub raw: String,
    pub issued: ParsedTime,
    pub flight_category: Option<String>,
    pub details: Vec<(String, String)>,
    #[serde(skip)]
    data: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPeriod {
    pub from: ParsedTime,
    pub to: ParsedTime,
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TafReport {
    pub station: String,
    pub raw: String,
    pub issued: ParsedTime,
    pub valid_from: ParsedTime,
    pub valid_to: ParsedTime,
    pub forecast: Vec<ForecastPeriod>,
}

/// Every report-like object in the response, whatever its envelope.
pub fn collect_reports(payload: &Value) -> Vec<&Record> {
    let mut out = Vec::new();
    walk(payload, &mut out);
    out
}

fn walk<'a>(value: &'a Value, out: &mut Vec<&'a Record>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
        Value::Object(map) => {
            for key in ["features", "data"] {
                match map.get(key) {
                    Some(Value::Array(items)) => {
                        items.iter().for_each(|item| walk(item, out));
                        return;
                    }
                    Some(Value::Object(nested)) => {
                        nested.values().for_each(|item| walk(item, out));
                        return;
                    }
                    _ => {}
                }
            }
            match map.get("properties") {
                Some(Value::Object(props)) => out.push(props),
                _ => out.push(map),
            }
        }
        _ => {}
    }
}

/// Latest METAR per station. A report replaces an earlier one when its issue time
/// is newer or equal; unknown times count as the oldest possible.
pub fn parse_metar_reports(payload: &Value) -> BTreeMap<String, MetarReport> {
    let mut reports: BTreeMap<String, MetarReport> = BTreeMap::new();

    for props in collect_reports(payload) {
        let Some(station) = station_of(props) else {
            continue;
        };

        let data = [
            props.get("data"),
            props.get("metarData"),
            props.get("report"),
        ]
        .into_iter()
        .flatten()
        .find(|v| is_present(v))
        .map_or_else(
            || props.clone(),
            |v| v.as_object().cloned().unwrap_or_default(),
        );

        let report = MetarReport {
            station: station.clone(),
            raw: first_string(props, METAR_RAW_KEYS).unwrap_or_default(),
            issued: interpret_report_time(first_present(props, METAR_TIME_KEYS)),
            flight_category: first_string(props, &["flightCategory", "flight_category"]),
            details: build_details(&data, METAR_DETAIL_FIELDS),
            data,
        };

        let newer = reports
            .get(&station)
            .map_or(true, |existing| issued_key(&report.issued) >= issued_key(&existing.issued));
        if newer {
            reports.insert(station, report);
        }
    }

    debug!("Parsed METAR reports; stations={}", reports.len());
    reports
}

/// All TAFs per station, newest first.
pub fn parse_taf_reports(payload: &Value) -> BTreeMap<String, Vec<TafReport>> {
    let mut reports: BTreeMap<String, Vec<TafReport>> = BTreeMap::new();

    for props in collect_reports(payload) {
        let Some(station) = station_of(props) else {
            continue;
        };

        let report = TafReport {
            station: station.clone(),
            raw: first_string(props, TAF_RAW_KEYS).unwrap_or_default(),
            issued: interpret_report_time(first_present(props, TAF_TIME_KEYS)),
            valid_from: interpret_report_time(first_present(props, &["validTimeFrom", "valid_time_from"])),
            valid_to: interpret_report_time(first_present(props, &["validTimeTo", "valid_time_to"])),
            forecast: forecast_periods(props),
        };
        reports.entry(station).or_default().push(report);
    }

    for tafs in reports.values_mut() {
        tafs.sort_by_key(|t| std::cmp::Reverse(issued_key(&t.issued)));
    }

    debug!("Parsed TAF reports; stations={}", reports.len());
    reports
}

fn forecast_periods(props: &Record) -> Vec<ForecastPeriod> {
    let source = [props.get("forecast"), props.get("forecastList"), props.get("periods")]
        .into_iter()
        .flatten()
        .find(|v| is_present(v));

    let periods: Vec<&Value> = match source {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => {
            let nested: Vec<&Value> = ["data", "period", "periods", "forecast"]
                .iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_array))
                .flatten()
                .collect();
            if nested.is_empty() {
                map.values().filter(|v| v.is_object()).collect()
            } else {
                nested
            }
        }
        _ => Vec::new(),
    };

    periods
        .into_iter()
        .filter_map(Value::as_object)
        .map(|fc| {
            let mut details = build_details(fc, TAF_FORECAST_FIELDS);

            if let Some(wx) = first_present(fc, &["wxString", "weather", "wx_string"]) {
                let wx = join_list(wx);
                if !wx.is_empty() {
                    details.push(("Weather".to_string(), wx));
                }
            }

            let clouds = first_present(fc, &["clouds", "cloudList", "skyCondition"])
                .and_then(Value::as_array)
                .map(|layers| {
                    layers
                        .iter()
                        .filter_map(Value::as_object)
                        .filter_map(|c| {
                            let cover = c.get("cover").and_then(scalar_text)?;
                            match first_present(c, &["base", "base_feet"]).and_then(scalar_text) {
                                Some(base) => Some(format!("{} {}ft", cover, base)),
                                None => Some(cover),
                            }
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if !clouds.is_empty() {
                details.push(("Clouds".to_string(), clouds.join(", ")));
            }

            ForecastPeriod {
                from: interpret_report_time(first_present(fc, &["fcstTimeFrom", "timeFrom", "time_from"])),
                to: interpret_report_time(first_present(fc, &["fcstTimeTo", "timeTo", "time_to"])),
                details,
            }
        })
        .collect()
}

/// Short human-readable lines for the METAR card.
pub fn metar_summary(report: &MetarReport) -> Vec<String> {
    let data = &report.data;
    let mut lines = Vec::new();

    if report.issued.label != NOT_AVAILABLE {
        lines.push(format!("Issued {}", report.issued.label));
    }

    let wind_dir_value = first_present(data, WIND_DIR_KEYS);
    if let Some(speed) = first_present(data, WIND_SPEED_KEYS).and_then(|v| format_numeric(v, None)) {
        let mut line = match wind_dir_value.and_then(format_wind_direction) {
            Some(dir) => format!("Wind {} at {} kt", dir, speed),
            None => format!("Wind {} kt", speed),
        };
        if let Some(gust) = first_present(data, WIND_GUST_KEYS).and_then(|v| format_numeric(v, None)) {
            line.push_str(&format!(" (gusting {} kt)", gust));
        }
        lines.push(line);
    } else if let Some(dir) = wind_dir_value {
        if dir.as_str().is_some_and(|s| s.trim().eq_ignore_ascii_case("CALM")) {
            lines.push("Wind calm".to_string());
        } else if let Some(dir) = format_wind_direction(dir) {
            lines.push(format!("Wind {}", dir));
        }
    }

    let temp = first_present(data, TEMP_KEYS).and_then(|v| format_numeric(v, None));
    let dewpoint = first_present(data, DEWPOINT_KEYS).and_then(|v| format_numeric(v, None));
    let mut temp_parts = Vec::new();
    if let Some(t) = temp {
        temp_parts.push(format!("Temp {}°C", t));
    }
    if let Some(d) = dewpoint {
        temp_parts.push(format!("Dew point {}°C", d));
    }
    if !temp_parts.is_empty() {
        lines.push(temp_parts.join(" / "));
    }

    if let Some(vis) = first_present(data, VISIBILITY_KEYS) {
        if let Some(text) = format_numeric(vis, None) {
            // "10+" is still a statute-mile figure
            let numeric = scalar_text(vis)
                .map(|s| s.trim_matches('+').parse::<f64>().is_ok())
                .unwrap_or(false);
            if numeric {
                lines.push(format!("Visibility {} sm", text));
            } else {
                lines.push(format!("Visibility {}", text));
            }
        }
    }

    if let Some(alt) = first_present(data, ALTIMETER_KEYS).and_then(|v| format_numeric(v, Some(2))) {
        lines.push(format!("Altimeter {} inHg", alt));
    }

    if let Some(ceiling) = first_present(data, CEILING_KEYS).and_then(|v| format_numeric(v, None)) {
        lines.push(format!("Ceiling {} ft", ceiling));
    }

    if let Some(wx) = present_weather(data) {
        lines.push(format!("Weather {}", wx));
    }

    if let Some(clouds) = cloud_layers(data) {
        lines.push(format!("Clouds {}", clouds));
    }

    lines
}

fn present_weather(data: &Record) -> Option<String> {
    let weather = first_present(data, WEATHER_KEYS).or_else(|| data.get("presentWeather"))?;
    let text = match weather {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => {
                    let descriptor = ["intensity", "descriptor", "phenomena", "value"]
                        .iter()
                        .filter_map(|k| obj.get(*k).and_then(scalar_text))
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    (!descriptor.is_empty()).then_some(descriptor)
                }
                other => scalar_text(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other).unwrap_or_default(),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn cloud_layers(data: &Record) -> Option<String> {
    for key in ["cloudLayers", "clouds", "cloudList", "skyCondition"] {
        let Some(Value::Array(layers)) = data.get(key) else {
            continue;
        };
        let parts: Vec<String> = layers
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|layer| {
                let cover = first_present(layer, &["cover", "coverage", "amount"]).and_then(scalar_text);
                let base = first_present(
                    layer,
                    &[
                        "base", "base_feet", "baseFeet", "base_feet_agl", "base_agl",
                        "baseHeightFt", "baseHeight", "base_ft_agl", "height", "altitude",
                    ],
                )
                .and_then(|b| match b {
                    Value::Object(obj) => first_present(obj, &["ft", "feet", "value"]),
                    other => Some(other),
                })
                .and_then(|b| format_numeric(b, None));

                match (cover, base) {
                    (Some(c), Some(b)) => Some(format!("{} {} ft", c, b)),
                    (Some(c), None) => Some(c),
                    (None, Some(b)) => Some(format!("{} ft", b)),
                    (None, None) => None,
                }
            })
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(", "));
        }
    }
    None
}

/// Puts each TAF change group (`FM`, `TEMPO`, `BECMG`, `PROBnn`, ...) on its own line.
/// `PROB30 TEMPO` stays together.
pub fn format_taf_for_display(raw_taf: &str) -> String {
    static RE_CHANGE: OnceLock<Regex> = OnceLock::new();
    static RE_PROB: OnceLock<Regex> = OnceLock::new();
    let re_change = RE_CHANGE
        .get_or_init(|| Regex::new(r"^(FM\d{6}|TEMPO|BECMG|PROB\d{2}|RMK|AMD|COR)$").unwrap());
    let re_prob = RE_PROB.get_or_init(|| Regex::new(r"^PROB\d{2}$").unwrap());

    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in raw_taf.split_whitespace() {
        if !current.is_empty() && re_change.is_match(token) {
            let continues_prob = re_prob.is_match(current[0]) && token == "TEMPO";
            if !continues_prob {
                lines.push(current.join(" "));
                current.clear();
            }
        }
        current.push(token);
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines.join("\n")
}

fn issued_key(t: &ParsedTime) -> NaiveDateTime {
    t.datetime().unwrap_or(NaiveDateTime::MIN)
}

fn station_of(props: &Record) -> Option<String> {
    let station = first_string(props, STATION_KEYS)?.trim().to_uppercase();
    (!station.is_empty()).then_some(station)
}

/// Null, empty strings and empty lists count as absent.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Object(_) => true,
    }
}

/// First alias holding a value. Zero is a real reading here, unlike in [`is_present`].
fn first_present<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| record.get(*k)).find(|v| match v {
        Value::Number(_) => true,
        other => is_present(other),
    })
}

fn first_string(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .filter(|v| is_present(v))
        .find_map(scalar_text)
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join_list(v: &Value) -> String {
    match v {
        Value::Array(items) => items
            .iter()
            .filter(|i| is_present(i))
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => v.to_string(),
        other => scalar_text(other).unwrap_or_default(),
    }
}

fn build_details(record: &Record, fields: &[(&[&str], &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(keys, label)| {
            let value = first_present(record, keys)?;
            let text = join_list(value);
            (!text.is_empty()).then(|| (label.to_string(), text))
        })
        .collect()
}

/// Whole numbers print without decimals, others with one, unless `decimals` is given.
/// Non-numeric text passes through; `M` (missing) is dropped.
fn format_numeric(v: &Value, decimals: Option<usize>) -> Option<String> {
    let num = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "M" {
                return None;
            }
            match s.parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => return Some(s.to_string()),
            }
        }
        _ => None,
    }?;

    Some(match decimals {
        Some(d) => format!("{:.*}", d, num),
        None if (num - num.round()).abs() < 1e-6 => format!("{}", num.round() as i64),
        None => format!("{:.1}", num),
    })
}

fn format_wind_direction(v: &Value) -> Option<String> {
    let text = format_numeric(v, None)?;
    match text.parse::<f64>() {
        Ok(deg) => Some(format!("{}°", deg.round() as i64)),
        Err(_) => Some(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_reports_envelopes() {
        let geo = json!({"features": [{"properties": {"icaoId": "KTEB"}}, {"properties": {"icaoId": "KJFK"}}]});
        let nested = json!({"data": {"a": {"icaoId": "CYYC"}}});
        let bare = json!([{"icaoId": "CYVR"}, "junk", 3]);
        assert_eq!(collect_reports(&geo).len(), 2);
        assert_eq!(collect_reports(&nested).len(), 1);
        assert_eq!(collect_reports(&bare).len(), 1);
    }

    #[test]
    fn test_latest_metar_wins() {
        let payload = json!([
            {"icaoId": "kteb", "obsTime": 1735732800, "rawOb": "KTEB 011200Z OLD", "temp": 3},
            {"icaoId": "KTEB", "obsTime": 1735736400, "rawOb": "KTEB 011300Z NEW", "temp": 4},
            {"icaoId": "KTEB", "obsTime": 1735729200, "rawOb": "KTEB 011100Z OLDER"},
            {"rawOb": "no station"}
        ]);
        let reports = parse_metar_reports(&payload);
        assert_eq!(reports.len(), 1);
        let kteb = &reports["KTEB"];
        assert_eq!(kteb.raw, "KTEB 011300Z NEW");
        assert_eq!(kteb.issued.label, "Jan 01 2025, 13:00Z");
    }

    #[test]
    fn test_metar_summary_lines() {
        let payload = json!([{
            "icaoId": "CYYC",
            "reportTime": "2025-01-01T12:00:00Z",
            "rawOb": "CYYC 011200Z 27015G25KT 15SM FEW040 M05/M10 A2992",
            "fltCat": "VFR",
            "wdir": 270,
            "windDir": 270,
            "windSpeed": 15,
            "windGust": 25,
            "temp": -5,
            "dewp": -10,
            "dewpoint": -10.0,
            "visibility": "10+",
            "altimeter": 29.92,
            "clouds": [{"cover": "FEW", "base": 4000}]
        }]);
        let reports = parse_metar_reports(&payload);
        let lines = metar_summary(&reports["CYYC"]);
        assert_eq!(
            lines,
            vec![
                "Issued Jan 01 2025, 12:00Z",
                "Wind 270° at 15 kt (gusting 25 kt)",
                "Temp -5°C / Dew point -10°C",
                "Visibility 10+ sm",
                "Altimeter 29.92 inHg",
                "Clouds FEW 4000 ft",
            ]
        );
    }

    #[test]
    fn test_calm_wind() {
        let payload = json!([{"icaoId": "KTEB", "windDir": "CALM"}]);
        let reports = parse_metar_reports(&payload);
        assert!(metar_summary(&reports["KTEB"]).contains(&"Wind calm".to_string()));
    }

    #[test]
    fn test_taf_reports_and_periods() {
        let payload = json!({"features": [{"properties": {
            "icaoId": "CYYC",
            "issueTime": "2025-01-01T11:40:00Z",
            "validTimeFrom": 1735732800,
            "validTimeTo": 1735819200,
            "rawTAF": "TAF CYYC 011140Z 0112/0212 27015KT P6SM FEW040 TEMPO 0114/0118 BKN020 FM011800 30010KT",
            "fcsts": [],
            "forecast": [
                {"fcstTimeFrom": 1735732800, "fcstTimeTo": 1735754400, "windDir": 270, "windSpeed": 15,
                 "clouds": [{"cover": "FEW", "base": 4000}]},
                {"fcstTimeFrom": 1735754400, "changeIndicator": "FM", "wxString": "-SN"}
            ]
        }}]});
        let reports = parse_taf_reports(&payload);
        let taf = &reports["CYYC"][0];
        assert_eq!(taf.valid_from.label, "Jan 01 2025, 12:00Z");
        assert_eq!(taf.forecast.len(), 2);
        assert!(taf.forecast[0]
            .details
            .contains(&("Clouds".to_string(), "FEW 4000ft".to_string())));
        assert!(taf.forecast[1]
            .details
            .contains(&("Weather".to_string(), "-SN".to_string())));
        assert_eq!(taf.forecast[1].to.label, "N/A");
    }

    #[test]
    fn test_format_taf_line_breaks() {
        let raw = "TAF CYYC 011140Z 0112/0212 27015KT P6SM FEW040 PROB30 TEMPO 0114/0118 -SN BECMG 0120/0122 30010KT FM020300 VRB03KT RMK NXT FCST BY 011800Z";
        assert_eq!(
            format_taf_for_display(raw),
            "TAF CYYC 011140Z 0112/0212 27015KT P6SM FEW040\n\
             PROB30 TEMPO 0114/0118 -SN\n\
             BECMG 0120/0122 30010KT\n\
             FM020300 VRB03KT\n\
             RMK NXT FCST BY 011800Z"
        );
        assert_eq!(format_taf_for_display(""), "");
    }
}
