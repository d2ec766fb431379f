//! `provgraph camflow` — CamFlow capture conversion.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use provgraph_core::{Converter, OrderingMode, PipelineConfig};
use provgraph_ingest_camflow::{
    convert, role_table, CamflowOptions, EdgelistEncoding, TimestampSource,
};

use crate::emit;

#[derive(Args)]
pub struct CamflowArgs {
    /// Input CamFlow capture (newline-delimited JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path of the base graph
    #[arg(short = 'B', long)]
    base: PathBuf,

    /// Output path of the stream graph
    #[arg(short = 'S', long)]
    stream: PathBuf,

    /// Base graph size in edges (default: 10% of the total)
    #[arg(short = 'b', long)]
    base_size: Option<usize>,

    /// Order edges by the cf:date wall clock (two-pass) instead of the
    /// cf:id sequence counter
    #[arg(long)]
    wall_clock: bool,

    /// Record fingerprint reverse-lookups into this database file
    #[arg(long)]
    label_db: Option<PathBuf>,

    /// Also write the flat intermediate edgelist here
    #[arg(long)]
    edgelist: Option<PathBuf>,

    /// Keep original UIDs in the edgelist instead of hashing them
    #[arg(short, long, requires = "edgelist")]
    noencode: bool,

    /// Append `input,node_count,edge_count` to this CSV
    #[arg(long)]
    stats_file: Option<PathBuf>,
}

pub fn run(args: CamflowArgs) -> Result<()> {
    let label_store = emit::open_store(args.label_db.as_deref())?;
    // cf:id interleaves out of order across lines, so this format sorts
    let config = PipelineConfig {
        ordering: OrderingMode::SortByTimestamp,
        ..PipelineConfig::default()
    };
    let mut converter = Converter::with_stores(role_table(), config, None, label_store);
    let options = CamflowOptions {
        timestamps: if args.wall_clock {
            TimestampSource::WallClock
        } else {
            TimestampSource::SequenceId
        },
    };

    match &args.edgelist {
        Some(path) => {
            let mut writer = BufWriter::new(
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
            );
            let encoding = if args.noencode {
                EdgelistEncoding::Original
            } else {
                EdgelistEncoding::Fingerprint
            };
            convert(&args.input, &mut converter, &options, Some((&mut writer, encoding)))?;
            writer.flush()?;
        }
        None => convert::<std::io::Sink>(&args.input, &mut converter, &options, None)?,
    }

    let conversion = converter.finish()?;
    let policy = emit::split_policy(args.base_size);
    let (base_len, stream_len) = emit::write_split(&conversion, policy, &args.base, &args.stream)?;
    emit::append_stats(
        args.stats_file.as_deref(),
        &args.input.display().to_string(),
        &conversion,
    )?;
    emit::report(
        "CamFlow capture",
        &conversion,
        base_len,
        stream_len,
        &args.base,
        &args.stream,
    );
    Ok(())
}
