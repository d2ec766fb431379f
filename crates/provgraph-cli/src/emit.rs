//! Shared output plumbing for the subcommands.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use provgraph_core::output::{write_outputs, StatsSink};
use provgraph_core::{Conversion, DurableStore, KvStore, SplitPolicy};

/// Absolute base size if given, else the 10% default.
pub fn split_policy(base_size: Option<usize>) -> SplitPolicy {
    match base_size {
        Some(n) => SplitPolicy::Absolute(n),
        None => SplitPolicy::default(),
    }
}

/// Open a durable store when a path is configured.
pub fn open_store(path: Option<&Path>) -> Result<Option<Box<dyn KvStore>>> {
    match path {
        Some(p) => {
            let store = DurableStore::open(p)?;
            Ok(Some(Box::new(store)))
        }
        None => Ok(None),
    }
}

/// Split a finished conversion and write both output files. Returns the
/// base and stream sizes.
pub fn write_split(
    conversion: &Conversion,
    policy: SplitPolicy,
    base_path: &Path,
    stream_path: &Path,
) -> Result<(usize, usize)> {
    let (base, stream) = conversion.split(policy);
    let mut base_out = BufWriter::new(
        File::create(base_path).with_context(|| format!("cannot create {}", base_path.display()))?,
    );
    let mut stream_out = BufWriter::new(
        File::create(stream_path)
            .with_context(|| format!("cannot create {}", stream_path.display()))?,
    );
    write_outputs(base, stream, &mut base_out, &mut stream_out)?;
    Ok((base.len(), stream.len()))
}

/// Append a `label,node_count,edge_count` row when a stats file is
/// configured.
pub fn append_stats(stats_file: Option<&Path>, label: &str, conversion: &Conversion) -> Result<()> {
    if let Some(path) = stats_file {
        StatsSink::new(path).append(
            label,
            conversion.registered_nodes,
            conversion.counters.emitted_edges,
        )?;
    }
    Ok(())
}

/// Operator-facing summary lines.
pub fn report(
    label: &str,
    conversion: &Conversion,
    base_len: usize,
    stream_len: usize,
    base_path: &Path,
    stream_path: &Path,
) {
    let counters = &conversion.counters;
    println!(
        "{} {label} processed: {} nodes, {} edges emitted, {} records dropped",
        "[success]".green().bold(),
        conversion.registered_nodes,
        counters.emitted_edges,
        counters.dropped_edges() + counters.nodes_dropped,
    );
    println!(
        "{} base graph of size {base_len} at {}",
        "[success]".green().bold(),
        base_path.display()
    );
    println!(
        "{} stream graph of size {stream_len} at {}",
        "[success]".green().bold(),
        stream_path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use provgraph_core::{Converter, PipelineConfig, RoleRule, RoleTable};
    use provgraph_core::{Direction, EdgeCandidate, NodeRecord};

    #[test]
    fn split_policy_prefers_absolute() {
        assert_eq!(split_policy(Some(5)), SplitPolicy::Absolute(5));
        assert_eq!(split_policy(None), SplitPolicy::default());
    }

    #[test]
    fn write_split_creates_both_files() {
        let table = RoleTable::permissive(RoleRule::directed(Direction::SubjectToObject));
        let mut converter = Converter::new(table, PipelineConfig::default());
        converter.register_node(&NodeRecord::new("a", "process")).unwrap();
        converter.register_node(&NodeRecord::new("b", "file")).unwrap();
        for ts in 0..3 {
            converter
                .ingest_edge(&EdgeCandidate {
                    role_key: "open".to_string(),
                    edge_type: "open".to_string(),
                    flags: Vec::new(),
                    subject: Some("a".to_string()),
                    object1: Some("b".to_string()),
                    object2: None,
                    logical_timestamp: ts,
                })
                .unwrap();
        }
        let conversion = converter.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.txt");
        let stream = dir.path().join("stream.txt");
        let (base_len, stream_len) =
            write_split(&conversion, SplitPolicy::default(), &base, &stream).unwrap();
        assert_eq!(base_len, 1);
        assert_eq!(stream_len, 2);
        assert_eq!(std::fs::read_to_string(&base).unwrap().lines().count(), 1);
        assert_eq!(std::fs::read_to_string(&stream).unwrap().lines().count(), 2);
    }

    #[test]
    fn append_stats_is_optional() {
        let table = RoleTable::permissive(RoleRule::directed(Direction::SubjectToObject));
        let conversion = Converter::new(table, PipelineConfig::default())
            .finish()
            .unwrap();
        append_stats(None, "unused", &conversion).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        append_stats(Some(&path), "input.json", &conversion).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "input.json,0,0\n");
    }
}
