//! Output serialization.
//!
//! Edge lines are `<source_id> <dest_id> <descriptor>` with the descriptor
//! colon-separated in canonical order:
//! `source_fp:dest_fp:edge_fp:timestamp[:new_src:new_dst]`. The novelty
//! fields are present only in stream-graph output — the base graph is fully
//! known by convention, so the flags carry no information there.

use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::record::{CanonicalEdge, NormalizedEdge};

fn novelty(flag: bool) -> u8 {
    u8::from(flag)
}

/// Write one base-graph edge line.
pub fn write_base_edge<W: Write>(w: &mut W, edge: &CanonicalEdge) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}:{}:{}:{}",
        edge.source_id,
        edge.dest_id,
        edge.source_fingerprint,
        edge.dest_fingerprint,
        edge.edge_fingerprint,
        edge.logical_timestamp,
    )
}

/// Write one stream-graph edge line, novelty flags included.
pub fn write_stream_edge<W: Write>(w: &mut W, edge: &CanonicalEdge) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}:{}:{}:{}:{}:{}",
        edge.source_id,
        edge.dest_id,
        edge.source_fingerprint,
        edge.dest_fingerprint,
        edge.edge_fingerprint,
        edge.logical_timestamp,
        novelty(edge.source_is_new),
        novelty(edge.dest_is_new),
    )
}

/// Write a base prefix and stream suffix to their destinations.
pub fn write_outputs<B: Write, S: Write>(
    base: &[CanonicalEdge],
    stream: &[CanonicalEdge],
    base_out: &mut B,
    stream_out: &mut S,
) -> io::Result<()> {
    for edge in base {
        write_base_edge(base_out, edge)?;
    }
    for edge in stream {
        write_stream_edge(stream_out, edge)?;
    }
    base_out.flush()?;
    stream_out.flush()
}

/// Write one pre-canonicalization edge line (the flat intermediate
/// edgelist, endpoints still under their original references).
pub fn write_normalized_edge<W: Write>(w: &mut W, edge: &NormalizedEdge) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}:{}:{}:{}",
        edge.source_ref,
        edge.dest_ref,
        edge.source_fingerprint,
        edge.dest_fingerprint,
        edge.edge_fingerprint,
        edge.logical_timestamp,
    )
}

/// Append-only per-input statistics: `label,node_count,edge_count` rows.
#[derive(Debug)]
pub struct StatsSink {
    path: std::path::PathBuf,
}

impl StatsSink {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, label: &str, node_count: u64, edge_count: u64) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{label},{node_count},{edge_count}")
    }
}

/// Running averages over a stats file: `(avg_nodes, avg_edges, rows)`.
pub fn read_stat_averages(path: &Path) -> io::Result<(f64, f64, u64)> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut avg_nodes = 0.0;
    let mut avg_edges = 0.0;
    let mut count = 0u64;
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split(',');
        let (_label, nodes, edges) = match (fields.next(), fields.next(), fields.next()) {
            (Some(l), Some(n), Some(e)) => (l, n, e),
            _ => continue,
        };
        let (Ok(nodes), Ok(edges)) = (nodes.parse::<f64>(), edges.parse::<f64>()) else {
            continue;
        };
        count += 1;
        avg_nodes += (nodes - avg_nodes) / count as f64;
        avg_edges += (edges - avg_edges) / count as f64;
    }
    Ok((avg_nodes, avg_edges, count))
}
