//! Service state CLI commands

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, HealthReport};
use crate::output::{color_state, format_timestamp, print_json, print_success, print_warning, OutputFormat};

/// Show server readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

/// Ask the server to reload its artifacts
pub async fn reload(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.reload().await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_success("Artifacts reloaded");
            println!();
            print_report(&report);
        }
    }

    Ok(())
}

fn print_report(report: &HealthReport) {
    println!("{}", "Service Health".bold());
    println!("{}", "=".repeat(50));
    println!("State:            {}", color_state(&report.state));
    println!(
        "Last transition:  {}",
        format_timestamp(&report.last_transition).dimmed()
    );

    if let Some(snapshot) = &report.snapshot {
        println!();
        println!("{}", "Artifacts".bold());
        println!("{}", "-".repeat(50));
        println!("Fingerprint:      {}", snapshot.fingerprint.cyan());
        println!("Loaded at:        {}", format_timestamp(&snapshot.created_at));
        println!("Model:            {}", snapshot.model_kind);
        println!(
            "Features:         {} (model expects {})",
            snapshot.feature_count, snapshot.model_width
        );
    }

    if let Some(error) = &report.last_error {
        println!();
        print_warning(&format!("Last error: {}", error));
    }
}
