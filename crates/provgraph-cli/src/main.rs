//! Provgraph CLI
//!
//! One subcommand per source format, each driving the same core pipeline:
//! register nodes, normalize edges, settle ordering, split into base and
//! stream graphs, and append per-input statistics.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod camflow;
mod cdm;
mod emit;
mod stats;
mod streamspot;

#[derive(Parser)]
#[command(name = "provgraph")]
#[command(
    author,
    version,
    about = "Convert provenance captures into canonical base/stream edge lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CamFlow W3C-PROV JSON capture.
    Camflow(camflow::CamflowArgs),

    /// Convert DARPA CDM engagement data (JSON lines or tar.gz archives).
    Cdm(cdm::CdmArgs),

    /// Convert StreamSpot edge-list data, one graph per pipeline.
    Streamspot(streamspot::StreamspotArgs),

    /// Report averages over an accumulated stats file.
    Stats(stats::StatsArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Camflow(args) => camflow::run(args),
        Commands::Cdm(args) => cdm::run(args),
        Commands::Streamspot(args) => streamspot::run(args),
        Commands::Stats(args) => stats::run(args),
    }
}
