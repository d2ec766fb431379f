//! `provgraph streamspot` — StreamSpot edge-list conversion.
//!
//! StreamSpot files interleave hundreds of independent graphs; each graph
//! converts through its own pipeline instance, so `--all-graphs` fans the
//! work out across threads with nothing shared but the input file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use rayon::prelude::*;

use provgraph_core::{Conversion, Converter, PipelineConfig};
use provgraph_ingest_streamspot::{convert_graph, graph_ids, role_table};

use crate::emit;

#[derive(Args)]
pub struct StreamspotArgs {
    /// Input StreamSpot data file (tab-separated)
    #[arg(short, long)]
    input: PathBuf,

    /// Convert only the graph with this ID
    #[arg(short, long, conflicts_with = "all_graphs")]
    graph: Option<String>,

    /// Convert every graph in the file, in parallel
    #[arg(long)]
    all_graphs: bool,

    /// Output directory for per-graph files (with --all-graphs)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output path of the base graph (single-graph mode)
    #[arg(short = 'B', long)]
    base: Option<PathBuf>,

    /// Output path of the stream graph (single-graph mode)
    #[arg(short = 'S', long)]
    stream: Option<PathBuf>,

    /// Base graph size in edges (default: 10% of the total)
    #[arg(short = 'b', long)]
    base_size: Option<usize>,

    /// Append `graph_id,node_count,edge_count` to this CSV
    #[arg(long)]
    stats_file: Option<PathBuf>,
}

pub fn run(args: StreamspotArgs) -> Result<()> {
    if args.all_graphs {
        run_all(&args)
    } else {
        run_single(&args)
    }
}

fn convert_one(input: &Path, graph_id: Option<&str>) -> Result<Conversion> {
    let mut converter = Converter::new(role_table(), PipelineConfig::default());
    convert_graph(input, graph_id, &mut converter)?;
    Ok(converter.finish()?)
}

fn run_single(args: &StreamspotArgs) -> Result<()> {
    let (Some(base), Some(stream)) = (&args.base, &args.stream) else {
        bail!("single-graph mode needs --base and --stream output paths");
    };
    let conversion = convert_one(&args.input, args.graph.as_deref())?;
    let policy = emit::split_policy(args.base_size);
    let (base_len, stream_len) = emit::write_split(&conversion, policy, base, stream)?;
    let label = args.graph.as_deref().unwrap_or("all");
    emit::append_stats(args.stats_file.as_deref(), label, &conversion)?;
    emit::report(
        &format!("StreamSpot graph {label}"),
        &conversion,
        base_len,
        stream_len,
        base,
        stream,
    );
    Ok(())
}

fn run_all(args: &StreamspotArgs) -> Result<()> {
    let Some(out_dir) = &args.out_dir else {
        bail!("--all-graphs needs --out-dir");
    };
    std::fs::create_dir_all(out_dir)?;
    let ids = graph_ids(&args.input)?;
    let policy = emit::split_policy(args.base_size);

    // one independent pipeline per graph; stats appended sequentially after
    let results: Vec<(String, Conversion, usize, usize)> = ids
        .into_par_iter()
        .map(|id| {
            let conversion = convert_one(&args.input, Some(&id))?;
            let base_path = out_dir.join(format!("base-{id}.txt"));
            let stream_path = out_dir.join(format!("stream-{id}.txt"));
            let (base_len, stream_len) =
                emit::write_split(&conversion, policy, &base_path, &stream_path)?;
            Ok((id, conversion, base_len, stream_len))
        })
        .collect::<Result<Vec<_>>>()?;

    for (id, conversion, base_len, stream_len) in &results {
        emit::append_stats(args.stats_file.as_deref(), id, conversion)?;
        emit::report(
            &format!("StreamSpot graph {id}"),
            conversion,
            *base_len,
            *stream_len,
            &out_dir.join(format!("base-{id}.txt")),
            &out_dir.join(format!("stream-{id}.txt")),
        );
    }
    Ok(())
}
