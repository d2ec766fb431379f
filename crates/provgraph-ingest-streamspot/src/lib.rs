//! StreamSpot edge-list adapter.
//!
//! StreamSpot data is already flat: tab-separated rows of
//! `source_id, source_type, dest_id, dest_type, edge_type, graph_id`, with
//! single-character type codes and many independent graphs interleaved in
//! one file. Rows are time-ordered, so the pipeline runs in arrival order
//! with synthetic timestamps counted from 1.
//!
//! There are no explicit node records: endpoints register lazily, on the
//! first edge that references them, using the type codes carried by the
//! row. Edge types are open-ended, so the role table is permissive —
//! every row flows source → destination.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use provgraph_core::{
    Converter, Direction, EdgeCandidate, NodeRecord, RoleRule, RoleTable,
};

/// One parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub source_id: String,
    pub source_type: String,
    pub dest_id: String,
    pub dest_type: String,
    pub edge_type: String,
    pub graph_id: String,
}

/// Open role table: any edge-type code flows source → destination.
pub fn role_table() -> RoleTable {
    RoleTable::permissive(RoleRule::directed(Direction::SubjectToObject))
}

/// Parse one tab-separated row; `None` for a row without six fields.
pub fn parse_row(line: &str) -> Option<Row> {
    let mut fields = line.split('\t');
    let row = Row {
        source_id: fields.next()?.to_string(),
        source_type: fields.next()?.to_string(),
        dest_id: fields.next()?.to_string(),
        dest_type: fields.next()?.to_string(),
        edge_type: fields.next()?.to_string(),
        graph_id: fields.next()?.trim_end().to_string(),
    };
    if fields.next().is_some() {
        return None;
    }
    Some(row)
}

/// Every graph ID present in the file, in sorted order.
pub fn graph_ids(input: &Path) -> Result<BTreeSet<String>> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut ids = BTreeSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(row) = parse_row(&line) {
            ids.insert(row.graph_id);
        }
    }
    Ok(ids)
}

/// Feed one graph's rows through a converter.
///
/// With `graph_id = None` every row is taken; otherwise rows belonging to
/// other graphs are skipped before any accounting. Endpoints register on
/// first reference; later rows may repeat them with the same type code,
/// which the index ignores.
pub fn convert_graph(
    input: &Path,
    graph_id: Option<&str>,
    converter: &mut Converter,
) -> Result<()> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut next_timestamp = 1u64;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(row) = parse_row(&line) else {
            converter.drop_malformed_edge("row");
            continue;
        };
        if let Some(wanted) = graph_id {
            if row.graph_id != wanted {
                continue;
            }
        }

        converter.register_node(&NodeRecord::new(&row.source_id, &row.source_type))?;
        converter.register_node(&NodeRecord::new(&row.dest_id, &row.dest_type))?;

        let candidate = EdgeCandidate {
            role_key: row.edge_type.clone(),
            edge_type: row.edge_type.clone(),
            flags: Vec::new(),
            subject: Some(row.source_id.clone()),
            object1: Some(row.dest_id.clone()),
            object2: None,
            logical_timestamp: next_timestamp,
        };
        next_timestamp += 1;
        converter.ingest_edge(&candidate)?;
    }
    debug!(
        edges = next_timestamp - 1,
        graph = graph_id.unwrap_or("<all>"),
        "graph rows ingested"
    );
    Ok(())
}
