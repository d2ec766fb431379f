//! `provgraph stats` — averages over an accumulated stats file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use provgraph_core::output::read_stat_averages;

#[derive(Args)]
pub struct StatsArgs {
    /// Stats CSV accumulated by previous conversions
    #[arg(short, long)]
    file: PathBuf,
}

pub fn run(args: StatsArgs) -> Result<()> {
    let (avg_nodes, avg_edges, rows) = read_stat_averages(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    if rows == 0 {
        println!("{} no stats rows in {}", "[warning]".yellow().bold(), args.file.display());
        return Ok(());
    }
    println!("average number of nodes: {avg_nodes:.2} ({rows} inputs)");
    println!("average number of edges: {avg_edges:.2}");
    Ok(())
}
