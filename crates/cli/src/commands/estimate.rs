//! Prediction-related CLI commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, PriceRequest};
use crate::output::{format_price, print_json, print_table, print_warning, OutputFormat};

/// Row for locations table
#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Location")]
    location: String,
}

/// Request a single price estimate
pub async fn predict(
    client: &ApiClient,
    request: PriceRequest,
    format: OutputFormat,
) -> Result<()> {
    let result = client.predict(&request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Price Estimate".bold());
            println!("{}", "=".repeat(40));
            println!("Location:     {}", request.location.cyan());
            println!("Total sqft:   {}", request.total_sqft);
            println!("BHK:          {}", request.bhk);
            println!("Bathrooms:    {}", request.bath);
            println!();
            println!(
                "{} {}",
                "Estimated Price:".bold(),
                format_price(result.estimated_price).green().bold()
            );
        }
    }

    Ok(())
}

/// List known locations, optionally filtered by substring
pub async fn list_locations(
    client: &ApiClient,
    filter: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut result = client.locations().await?;

    if let Some(needle) = filter.as_deref().map(str::to_lowercase) {
        result.locations.retain(|l| l.contains(&needle));
    }

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.locations.is_empty() {
                print_warning("No matching locations");
                return Ok(());
            }

            let rows: Vec<LocationRow> = result
                .locations
                .iter()
                .enumerate()
                .map(|(i, location)| LocationRow {
                    index: i + 1,
                    location: location.clone(),
                })
                .collect();

            print_table(&rows);
            println!("\nTotal: {} location(s)", rows.len());
        }
    }

    Ok(())
}
