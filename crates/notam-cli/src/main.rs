// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{warn, LevelFilter};
use notam_core::display::{self, Segment};
use notam_core::weather;
use notam_core::{
    AirportReport, ConfigManager, NotamPipeline, NoticeRecord, PipelineConfig, Provider,
    RunwayTable,
};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pipeline configuration file (keywords and suppression list)
    #[arg(short, long, env = "NOTAM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show NOTAMs and runway status for one or more airports
    Notams {
        /// ICAO codes, comma separated (e.g. "CYYC, KTEB")
        #[arg(short, long)]
        icao: String,
        /// Saved provider response as CODE=FILE (repeat for pages or airports).
        /// A bare FILE is accepted when a single code is given.
        #[arg(short, long = "payload", required = true)]
        payloads: Vec<PayloadArg>,
        /// Force a provider instead of routing by ICAO prefix
        #[arg(long)]
        provider: Option<Provider>,
        /// Runway reference table (runways.csv)
        #[arg(short, long)]
        runways: Option<PathBuf>,
        /// Only show notices containing any of these comma separated terms
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Latest METAR per station from a saved aviationweather.gov response
    Metar {
        #[arg(short, long)]
        payload: PathBuf,
        #[arg(short, long)]
        icao: Option<String>,
    },
    /// TAFs per station from a saved aviationweather.gov response
    Taf {
        #[arg(short, long)]
        payload: PathBuf,
        #[arg(short, long)]
        icao: Option<String>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match cli.command {
        Commands::Notams {
            icao,
            payloads,
            provider,
            runways,
            filter,
        } => {
            let config = manager.load()?;
            let table = match runways {
                Some(path) => RunwayTable::load(&path)
                    .with_context(|| format!("Failed to load runway table {}", path.display()))?,
                None => RunwayTable::default(),
            };
            let codes = notam_core::parse_icao_list(&icao);
            if codes.is_empty() {
                anyhow::bail!("No ICAO codes given");
            }
            if codes.len() > 1 {
                if let Some(bare) = payloads.iter().find(|p| p.icao.is_none()) {
                    anyhow::bail!(
                        "Payload {} has no airport; use CODE=FILE when several codes are given",
                        bare.path.display()
                    );
                }
            }
            for stray in payloads
                .iter()
                .filter(|p| p.icao.as_ref().is_some_and(|c| !codes.contains(c)))
            {
                warn!("Ignoring payload for unlisted airport; path={}", stray.path.display());
            }

            let terms = filter
                .as_deref()
                .map(display::parse_filter_terms)
                .unwrap_or_default();
            let pipeline = NotamPipeline::new(config);

            println!("Processing NOTAMs for {} airport(s)...", codes.len());
            let reports = run_notams(&pipeline, &codes, &payloads, provider, &table);
            for report in &reports {
                print_report(&pipeline, report, &table.for_airport(&report.icao), &terms);
            }
        }
        Commands::Metar { payload, icao } => {
            let payload = notam_core::load_payload(&payload)
                .with_context(|| format!("Failed to read payload {}", payload.display()))?;
            let wanted = icao.as_deref().map(notam_core::parse_icao_list);
            let reports = weather::parse_metar_reports(&payload);
            if reports.is_empty() {
                println!("No METAR data returned for the provided stations.");
            }
            for (station, report) in &reports {
                if !is_wanted(&wanted, station) {
                    continue;
                }
                let mut header = vec![format!("== {} METAR", station)];
                if let Some(cat) = &report.flight_category {
                    header.push(format!("Flight Category: {}", cat));
                }
                println!("{}", header.join(" · "));
                println!("{}", report.raw);
                for line in weather::metar_summary(report) {
                    println!("  - {}", line);
                }
            }
        }
        Commands::Taf { payload, icao } => {
            let payload = notam_core::load_payload(&payload)
                .with_context(|| format!("Failed to read payload {}", payload.display()))?;
            let wanted = icao.as_deref().map(notam_core::parse_icao_list);
            let reports = weather::parse_taf_reports(&payload);
            if reports.is_empty() {
                println!("No TAF data returned for the provided stations.");
            }
            for (station, tafs) in &reports {
                if !is_wanted(&wanted, station) {
                    continue;
                }
                for taf in tafs {
                    println!(
                        "== {} TAF · Issued {} · Valid {} -> {}",
                        station, taf.issued, taf.valid_from, taf.valid_to
                    );
                    println!("{}", weather::format_taf_for_display(&taf.raw));
                    for period in &taf.forecast {
                        let details = period
                            .details
                            .iter()
                            .map(|(label, value)| format!("{}: {}", label, value))
                            .collect::<Vec<_>>()
                            .join("; ");
                        println!("  {} -> {}  {}", period.from, period.to, details);
                    }
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = manager.load()?;
                println!("# {}", manager.path().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Init => {
                if manager.path().exists() {
                    println!("Configuration already exists at {}", manager.path().display());
                } else {
                    manager.save(&PipelineConfig::default())?;
                    println!("Wrote default configuration to {}", manager.path().display());
                }
            }
        },
    }

    Ok(())
}

/// One `--payload` value: `CYYC=cyyc.json`, or a bare path.
#[derive(Debug, Clone, PartialEq)]
struct PayloadArg {
    icao: Option<String>,
    path: PathBuf,
}

impl PayloadArg {
    fn applies_to(&self, code: &str, single_code: bool) -> bool {
        self.icao.as_deref().map_or(single_code, |c| c == code)
    }
}

impl std::str::FromStr for PayloadArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (icao, path) = match s.split_once('=') {
            Some((code, path))
                if !code.trim().is_empty()
                    && code.trim().chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                (Some(code.trim().to_uppercase()), path)
            }
            _ => (None, s),
        };
        if path.trim().is_empty() {
            return Err(format!("missing payload file in '{}'", s));
        }
        Ok(Self {
            icao,
            path: PathBuf::from(path),
        })
    }
}

/// Runs the pipeline once per code over that code's payloads only. An airport whose
/// payloads cannot be read is logged and skipped; the others still report.
fn run_notams(
    pipeline: &NotamPipeline,
    codes: &[String],
    payloads: &[PayloadArg],
    provider: Option<Provider>,
    table: &RunwayTable,
) -> Vec<AirportReport> {
    let single_code = codes.len() == 1;
    let mut reports = Vec::with_capacity(codes.len());

    for code in codes {
        let files: Vec<&PayloadArg> = payloads
            .iter()
            .filter(|p| p.applies_to(code, single_code))
            .collect();
        if files.is_empty() {
            warn!("Skipping airport without payload; icao={}", code);
            continue;
        }

        let loaded = files
            .iter()
            .map(|p| {
                notam_core::load_payload(&p.path)
                    .with_context(|| format!("Failed to read payload {}", p.path.display()))
            })
            .collect::<Result<Vec<_>>>();
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Skipping airport; icao={} error={:#}", code, e);
                continue;
            }
        };

        let provider = provider.unwrap_or_else(|| Provider::for_icao(code));
        let runways = table.for_airport(code);
        reports.push(pipeline.process(code, provider, &loaded, &runways));
    }

    reports
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        eprintln!("Logger already initialized");
    }
}

fn is_wanted(wanted: &Option<Vec<String>>, station: &str) -> bool {
    wanted
        .as_ref()
        .map_or(true, |codes| codes.iter().any(|c| c == station))
}

fn print_report(
    pipeline: &NotamPipeline,
    report: &AirportReport,
    runways: &[notam_core::RunwayDescriptor],
    terms: &[String],
) {
    let notices: Vec<NoticeRecord> = report
        .notices
        .iter()
        .filter(|n| display::matches_filter(&n.text, terms))
        .cloned()
        .collect();
    println!("\n== {} ({}) ==", report.icao, report.provider);
    if report.notices.is_empty() {
        warn!("No notices extracted; icao={} provider={}", report.icao, report.provider);
    }

    // Runway status reflects only the notices being shown
    let status = if terms.is_empty() {
        report.runways.clone()
    } else {
        pipeline.runway_status(&notices, runways)
    };
    if !status.is_empty() {
        println!("{:<10} {:>10} {:<12} {}", "Runway", "Length", "Surface", "Status");
        for rwy in &status {
            let length = rwy
                .length_ft
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string());
            let surface = if rwy.usable {
                rwy.surface.clone()
            } else {
                format!("{}!", rwy.surface)
            };
            println!(
                "{:<10} {:>10} {:<12} {}",
                rwy.full_name,
                length,
                surface,
                rwy.status_label()
            );
        }
    }

    if notices.is_empty() {
        println!("No NOTAMs to show.");
        return;
    }

    let now = chrono::Utc::now().naive_utc();
    let keywords = &pipeline.config().highlight_keywords;
    for notice in &notices {
        let marker = if notice.category.is_prominent() { "##" } else { "--" };
        println!("\n{} [{}]", marker, notice.category);
        let mut segments = display::highlight(&notice.text, keywords);
        if !terms.is_empty() {
            segments = segments
                .into_iter()
                .flat_map(|s| {
                    if s.highlighted {
                        vec![s]
                    } else {
                        display::highlight_terms(&s.text, terms)
                    }
                })
                .collect();
        }
        println!("{}", render(&segments));
        println!(
            "   Effective: {} {}",
            notice.effective_start,
            notice.remaining(now).label()
        );
        println!("   Expires:   {}", notice.effective_end);
        println!("   Duration:  {}", display::duration_label(notice));
    }
}

fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| {
            if s.highlighted {
                format!("**{}**", s.text)
            } else {
                s.text.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::RunwayDescriptor;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn cfps_payload(raws: &[&str]) -> String {
        let items: Vec<_> = raws
            .iter()
            .map(|raw| json!({"type": "notam", "text": json!({"raw": raw}).to_string()}))
            .collect();
        json!({ "data": items }).to_string()
    }

    fn runway(icao: &str, le: &str, he: &str) -> RunwayDescriptor {
        RunwayDescriptor {
            airport_ident: icao.to_string(),
            le_ident: le.to_string(),
            he_ident: Some(he.to_string()),
            length_ft: Some(9000),
            surface: Some("ASP".to_string()),
        }
    }

    fn table() -> RunwayTable {
        RunwayTable::from_descriptors(vec![
            runway("CYYC", "17L", "35R"),
            runway("CYVR", "08L", "26R"),
        ])
    }

    fn codes(list: &str) -> Vec<String> {
        notam_core::parse_icao_list(list)
    }

    #[test]
    fn test_parse_payload_arg() {
        let tagged: PayloadArg = "cyyc=/tmp/cyyc.json".parse().unwrap();
        assert_eq!(tagged.icao.as_deref(), Some("CYYC"));
        assert_eq!(tagged.path, PathBuf::from("/tmp/cyyc.json"));

        let bare: PayloadArg = "/tmp/page1.json".parse().unwrap();
        assert_eq!(bare.icao, None);
        assert!(bare.applies_to("KTEB", true));
        assert!(!bare.applies_to("KTEB", false));

        assert!("CYYC=".parse::<PayloadArg>().is_err());
    }

    #[test]
    fn test_airports_do_not_share_notices() {
        let dir = tempdir().unwrap();
        let cyyc = dir.path().join("cyyc.json");
        let cyvr = dir.path().join("cyvr.json");
        fs::write(
            &cyyc,
            cfps_payload(&["A0001/25 A) CYYC B) 2501011200 C) 2501021200 E) RWY 17L/35R CLSD"]),
        )
        .unwrap();
        fs::write(
            &cyvr,
            cfps_payload(&["A0002/25 A) CYVR B) 2501011200 C) PERM E) RWY 08L/26R CLSD"]),
        )
        .unwrap();

        let payloads = vec![
            PayloadArg { icao: Some("CYYC".into()), path: cyyc },
            PayloadArg { icao: Some("CYVR".into()), path: cyvr },
        ];
        let reports = run_notams(
            &NotamPipeline::default(),
            &codes("CYYC, CYVR"),
            &payloads,
            None,
            &table(),
        );

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].icao, "CYYC");
        assert_eq!(reports[0].notices.len(), 1);
        assert!(reports[0].notices[0].text.contains("A) CYYC"));
        assert_eq!(reports[0].runways.len(), 1);
        assert_eq!(reports[0].runways[0].full_name, "17L/35R");
        assert!(reports[0].runways[0].closed);

        assert_eq!(reports[1].icao, "CYVR");
        assert_eq!(reports[1].notices.len(), 1);
        assert!(reports[1].notices[0].text.contains("A) CYVR"));
        assert_eq!(reports[1].runways.len(), 1);
        assert_eq!(reports[1].runways[0].full_name, "08L/26R");
        assert!(reports[1].runways[0].closed);
    }

    #[test]
    fn test_bad_payload_skips_only_its_airport() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("cyyc.json");
        let corrupt = dir.path().join("cyvr.json");
        fs::write(&good, cfps_payload(&["RWY 17L/35R CLSD B) 2501011200"])).unwrap();
        fs::write(&corrupt, "{ truncated").unwrap();

        let payloads = vec![
            PayloadArg { icao: Some("CYVR".into()), path: corrupt },
            PayloadArg { icao: Some("CYYC".into()), path: good },
            PayloadArg {
                icao: Some("KTEB".into()),
                path: dir.path().join("missing.json"),
            },
        ];
        let reports = run_notams(
            &NotamPipeline::default(),
            &codes("CYVR CYYC KTEB KJFK"),
            &payloads,
            None,
            &table(),
        );

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].icao, "CYYC");
        assert!(reports[0].runways[0].closed);
    }

    #[test]
    fn test_pages_for_one_airport_are_combined() {
        let dir = tempdir().unwrap();
        let page1 = dir.path().join("p1.json");
        let page2 = dir.path().join("p2.json");
        fs::write(&page1, cfps_payload(&["TOWER HOURS CHANGED B) 2501011200"])).unwrap();
        fs::write(&page2, cfps_payload(&["RWY 17L/35R CLSD B) 2501021200"])).unwrap();

        let payloads: Vec<PayloadArg> = [&page1, &page2]
            .iter()
            .map(|p| p.to_str().unwrap().parse().unwrap())
            .collect();
        let reports = run_notams(
            &NotamPipeline::default(),
            &codes("cyyc"),
            &payloads,
            Some(Provider::Cfps),
            &table(),
        );

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].notices.len(), 2);
        assert_eq!(reports[0].notices[0].text, "RWY 17L/35R CLSD B) 2501021200");
    }
}
