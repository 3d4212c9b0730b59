//! Home Price Estimator CLI
//!
//! A command-line tool for requesting price estimates and inspecting
//! the state of a running price server.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::PriceRequest;
use commands::{estimate, service};

/// Home Price Estimator CLI
#[derive(Parser)]
#[command(name = "hpe")]
#[command(author, version, about = "CLI for the Home Price Estimator", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via HPE_API_URL env var)
    #[arg(long, env = "HPE_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the price of a property
    Predict {
        /// Location name (case-insensitive)
        #[arg(long, short)]
        location: String,

        /// Total floor area in square feet
        #[arg(long)]
        sqft: f64,

        /// Number of rooms (BHK)
        #[arg(long)]
        bhk: u32,

        /// Number of bathrooms
        #[arg(long)]
        bath: u32,
    },

    /// List locations known to the model
    Locations {
        /// Only show locations containing this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show server readiness and loaded artifacts
    Health,

    /// Reload artifacts on the server
    Reload,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Predict {
            location,
            sqft,
            bhk,
            bath,
        } => {
            let request = PriceRequest {
                location,
                total_sqft: sqft,
                bhk,
                bath,
            };
            estimate::predict(&client, request, cli.format).await?;
        }
        Commands::Locations { filter } => {
            estimate::list_locations(&client, filter, cli.format).await?;
        }
        Commands::Health => {
            service::show_health(&client, cli.format).await?;
        }
        Commands::Reload => {
            service::reload(&client, cli.format).await?;
        }
    }

    Ok(())
}
