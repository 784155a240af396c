//! # Tendon CLI
//!
//! Runs a design batch through tendon_core.
//!
//! ```text
//! tendon_cli [batch.json]
//! ```
//!
//! Without an argument a built-in demonstration batch runs. A text summary
//! and the JSON report go to stdout, errors go to stderr as JSON.
//! `RUST_LOG=debug` traces every search iteration.

use std::process::ExitCode;

use log::info;

use tendon_core::batch::{run_batch, CaseReport, DesignBatch, DesignCase};
use tendon_core::calculations::{EccentricityInput, FlexureInput, LayoutInput, MomentSet, Side, StressLimits};
use tendon_core::section::SectionGeometry;
use tendon_core::units::MegaPascals;
use tendon_core::{TendonError, TendonResult};

fn load_batch(path: &str) -> TendonResult<DesignBatch> {
    let json = std::fs::read_to_string(path).map_err(|e| TendonError::invalid_input("path", path, e.to_string()))?;
    DesignBatch::from_json(&json)
}

/// Box girder pier and midspan cases on a 2.5 m × 2.8 m solid section.
fn demo_batch() -> TendonResult<DesignBatch> {
    let section = SectionGeometry::rectangular(2.5, 2.8)?;
    let limits = StressLimits::from_mpa(MegaPascals(0.0), MegaPascals(22.41), MegaPascals(0.0), MegaPascals(22.4));
    let mut batch = DesignBatch::new("demo", "DEMO-1");

    batch.add_case(
        DesignCase::new("Midspan sagging", section, MomentSet::new(31000.0, 36700.0, 35600.0), limits)
            .with_layout(LayoutInput::new(1.6))
            .with_flexure(FlexureInput {
                side: Side::Bottom,
                factored_moment_knm: 51154.0,
                design_compressive_strength_mpa: 22.4,
                compression_width_m: 2.5,
                eccentricity_m: -1.2,
                stress_block_factor: 1.0,
            }),
    );
    batch.add_case(
        DesignCase::new("Pier hogging", section, MomentSet::new(-46500.0, -54800.0, -53100.0), limits)
            .with_layout(LayoutInput::new(1.6))
            .with_eccentricity(EccentricityInput {
                force_kn: 60000.0,
                group_counts: vec![2, 1],
            }),
    );
    Ok(batch)
}

fn print_case(case: &CaseReport) {
    println!("───────────────────────────────────────");
    println!("  {} {}", case.label, status_icon(case.succeeded()));
    println!("───────────────────────────────────────");

    if let Some(e) = &case.envelope_error {
        println!("  Envelope: {}", e);
        return;
    }
    if let Some(side) = case.side {
        println!("  Tendon side: {}", side.display_name());
    }
    if let Some(range) = case.centroid_range {
        println!(
            "  At centroid: {:.0} kN ≤ F ≤ {:.0} kN {}",
            range.min_force,
            range.max_force,
            status_icon(range.is_feasible())
        );
    }

    match &case.layout {
        Some(Ok(layout)) => {
            println!(
                "  Layout: {} groups × {} strands, F = {:.0} kN at e = {:.3} m",
                layout.total_groups, layout.strands_per_group, layout.total_force_kn, layout.eccentricity_m
            );
            for row in &layout.rows {
                println!("    {:>2} groups at {:.3} m below top", row.groups, row.depth_from_top_m);
            }
        }
        Some(Err(e)) => println!("  Layout: {}", e),
        None => {}
    }

    match &case.eccentricity {
        Some(Ok(band)) => println!(
            "  Eccentricity band for {:.0} kN: [{:.3}, {:.3}] m ({} of {} trials)",
            band.force_kn, band.min_eccentricity_m, band.max_eccentricity_m, band.admissible_count, band.trial_count
        ),
        Some(Err(e)) => println!("  Eccentricity: {}", e),
        None => {}
    }

    match &case.flexure {
        Some(Ok(est)) => println!(
            "  Flexure estimate: {:.0} kN (x = {:.3} m, h0 = {:.3} m)",
            est.required_force_kn, est.compression_depth_m, est.effective_depth_m
        ),
        Some(Err(e)) => println!("  Flexure: {}", e),
        None => {}
    }
}

fn report_error(e: &TendonError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let batch = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading batch from {}", path);
            load_batch(&path)
        }
        None => {
            info!("no batch file given, running the demonstration batch");
            demo_batch()
        }
    };
    let batch = match batch {
        Ok(batch) => batch,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    println!("Tendon CLI - Prestress Envelope and Layout");
    println!("═══════════════════════════════════════");
    println!("  Job: {}  Engineer: {}", batch.meta.job_id, batch.meta.engineer);
    println!("  Cases: {}", batch.case_count());
    println!();

    let report = run_batch(&batch);
    for case in &report.cases {
        print_case(case);
    }
    println!("═══════════════════════════════════════");
    println!(
        "  RESULT: {} of {} cases passed",
        report.cases.len() - report.failed_count(),
        report.cases.len()
    );
    println!("═══════════════════════════════════════");

    println!();
    println!("JSON Output:");
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            report_error(&TendonError::from(e));
            return ExitCode::FAILURE;
        }
    }

    for case in &report.cases {
        for e in case.errors() {
            report_error(e);
        }
    }
    ExitCode::SUCCESS
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}
