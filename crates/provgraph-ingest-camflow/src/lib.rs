//! CamFlow W3C-PROV JSON adapter.
//!
//! CamFlow emits newline-delimited JSON where each line may carry several
//! provenance objects at once: node maps (`activity`, `entity`) and edge
//! maps (`used`, `wasGeneratedBy`, `wasInformedBy`, `wasDerivedFrom`,
//! `wasAssociatedWith`), each keyed by record UID.
//!
//! Node fingerprints hash `prov:type` plus the SELinux context, mode, and
//! name (`cf:secctx`, `cf:mode`, `cf:name`), absent fields as `N/A`. Edge
//! fingerprints hash `prov:type` plus `cf:flags`. The `link` node type is
//! renamed `nlink` before hashing: CamFlow uses `link` for both a node type
//! and an edge type, and the reverse-lookup table needs them distinct.
//!
//! Edges are ordered by the `cf:id` sequence counter, which interleaves out
//! of order across lines — the pipeline runs in sort mode for this format.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::warn;

use provgraph_core::{
    fingerprint, Converter, Direction, EdgeCandidate, NodeRecord, NormalizedEdge, RoleRule,
    RoleTable, ScanSummary, ABSENT,
};

/// The five PROV relation kinds and their source/destination fields.
///
/// Direction follows the information flow the downstream consumer expects,
/// not the PROV arrow: e.g. `used` flows entity → activity.
pub const RELATIONS: [(&str, &str, &str); 5] = [
    ("used", "prov:entity", "prov:activity"),
    ("wasGeneratedBy", "prov:activity", "prov:entity"),
    ("wasInformedBy", "prov:informant", "prov:informed"),
    ("wasDerivedFrom", "prov:usedEntity", "prov:generatedEntity"),
    ("wasAssociatedWith", "prov:agent", "prov:activity"),
];

/// CamFlow wall-clock format, e.g. `2017:11:02T13:21:46`.
const DATE_FORMAT: &str = "%Y:%m:%dT%H:%M:%S";

/// Role table: relation fields are already oriented by [`RELATIONS`], so
/// every relation kind maps subject → object, none symmetric.
pub fn role_table() -> RoleTable {
    let entries: Vec<(&str, RoleRule)> = RELATIONS
        .iter()
        .map(|(name, _, _)| (*name, RoleRule::directed(Direction::SubjectToObject)))
        .collect();
    RoleTable::from_entries(&entries)
}

/// Which field orders the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampSource {
    /// `cf:id`, CamFlow's per-edge sequence counter.
    #[default]
    SequenceId,
    /// `cf:date` wall clock, offset against the run's minimum (needs a
    /// scan pass first).
    WallClock,
}

/// How endpoint references appear in the intermediate edgelist dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgelistEncoding {
    /// Hash each UID to a 64-bit integer.
    #[default]
    Fingerprint,
    /// Keep the raw CamFlow UIDs.
    Original,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CamflowOptions {
    pub timestamps: TimestampSource,
}

/// Outcome of extracting one node object from a line.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    Record(NodeRecord),
    /// UID of a node object with no `prov:type`.
    MissingType(String),
}

/// Extract every node object (`activity` and `entity`) from one parsed line.
pub fn extract_nodes(value: &Value) -> Vec<NodeOutcome> {
    let mut out = Vec::new();
    for kind in ["activity", "entity"] {
        let Some(map) = value.get(kind).and_then(Value::as_object) else {
            continue;
        };
        for (uid, node) in map {
            match node_record(uid, node) {
                Some(record) => out.push(NodeOutcome::Record(record)),
                None => out.push(NodeOutcome::MissingType(uid.clone())),
            }
        }
    }
    out
}

fn node_record(uid: &str, node: &Value) -> Option<NodeRecord> {
    let prov_type = node.get("prov:type")?.as_str()?;
    // "link" names both a node and an edge type in CamFlow
    let node_type = if prov_type == "link" { "nlink" } else { prov_type };

    let attr = |field: &str| {
        node.get(field)
            .and_then(Value::as_str)
            .unwrap_or(ABSENT)
            .to_string()
    };
    Some(
        NodeRecord::new(uid, node_type).with_attributes(vec![
            attr("cf:secctx"),
            attr("cf:mode"),
            attr("cf:name"),
        ]),
    )
}

/// Outcome of extracting one relation object from a line.
#[derive(Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    Candidate(EdgeCandidate),
    /// Relation kind and missing field.
    Malformed(&'static str, &'static str),
}

/// Extract every edge object from one parsed line.
///
/// In wall-clock mode the scan summary supplies the minimum to offset
/// against; it must come from a completed scan pass over the same input.
pub fn extract_edges(
    value: &Value,
    options: &CamflowOptions,
    scan: Option<&ScanSummary>,
) -> Vec<EdgeOutcome> {
    let mut out = Vec::new();
    for (relation, src_field, dst_field) in RELATIONS {
        let Some(map) = value.get(relation).and_then(Value::as_object) else {
            continue;
        };
        for edge in map.values() {
            out.push(edge_outcome(
                relation, src_field, dst_field, edge, options, scan,
            ));
        }
    }
    out
}

fn edge_outcome(
    relation: &'static str,
    src_field: &'static str,
    dst_field: &'static str,
    edge: &Value,
    options: &CamflowOptions,
    scan: Option<&ScanSummary>,
) -> EdgeOutcome {
    let Some(edge_type) = edge.get("prov:type").and_then(Value::as_str) else {
        return EdgeOutcome::Malformed(relation, "prov:type");
    };
    let logical_timestamp = match options.timestamps {
        TimestampSource::SequenceId => match edge.get("cf:id").and_then(as_u64_field) {
            Some(id) => id,
            None => return EdgeOutcome::Malformed(relation, "cf:id"),
        },
        TimestampSource::WallClock => {
            let Some(ts) = edge
                .get("cf:date")
                .and_then(Value::as_str)
                .and_then(parse_wall_clock)
            else {
                return EdgeOutcome::Malformed(relation, "cf:date");
            };
            scan.map_or(ts, |s| s.normalize(ts))
        }
    };
    let Some(source) = edge.get(src_field).and_then(Value::as_str) else {
        return EdgeOutcome::Malformed(relation, src_field);
    };
    let Some(dest) = edge.get(dst_field).and_then(Value::as_str) else {
        return EdgeOutcome::Malformed(relation, dst_field);
    };
    let flags = edge
        .get("cf:flags")
        .and_then(Value::as_str)
        .map(|f| vec![f.to_string()])
        .unwrap_or_default();

    EdgeOutcome::Candidate(EdgeCandidate {
        role_key: relation.to_string(),
        edge_type: edge_type.to_string(),
        flags,
        subject: Some(source.to_string()),
        object1: Some(dest.to_string()),
        object2: None,
        logical_timestamp,
    })
}

/// `cf:id` arrives as a JSON number or a decimal string depending on the
/// CamFlow version.
fn as_u64_field(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Parse a CamFlow wall-clock string into epoch seconds.
pub fn parse_wall_clock(s: &str) -> Option<u64> {
    let dt = NaiveDateTime::parse_from_str(s, DATE_FORMAT).ok()?;
    u64::try_from(dt.and_utc().timestamp()).ok()
}

/// Register every node in the file. Must complete before any edge pass.
pub fn register_nodes(input: &Path, converter: &mut Converter) -> Result<()> {
    for_each_line(input, |value| {
        for outcome in extract_nodes(value) {
            match outcome {
                NodeOutcome::Record(record) => {
                    converter.register_node(&record)?;
                }
                NodeOutcome::MissingType(uid) => converter.drop_node(&uid),
            }
        }
        Ok(())
    })
}

/// Scan pass for wall-clock mode: find the minimum `cf:date` over edges
/// that will survive normalization (fields present, both endpoints
/// registered).
pub fn scan_timestamps(input: &Path, converter: &Converter) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();
    for_each_line(input, |value| {
        for (relation, src_field, dst_field) in RELATIONS {
            let Some(map) = value.get(relation).and_then(Value::as_object) else {
                continue;
            };
            for edge in map.values() {
                let Some(ts) = edge
                    .get("cf:date")
                    .and_then(Value::as_str)
                    .and_then(parse_wall_clock)
                else {
                    continue;
                };
                if edge.get("prov:type").and_then(Value::as_str).is_none() {
                    continue;
                }
                let registered = |field| {
                    edge.get(field)
                        .and_then(Value::as_str)
                        .map(|r| converter.node_index().fingerprint_of(r))
                        .transpose()
                        .map(|o| o.flatten().is_some())
                };
                if !registered(src_field)? || !registered(dst_field)? {
                    continue;
                }
                summary.observe(ts);
            }
        }
        Ok(())
    })?;
    Ok(summary)
}

/// Edge pass: normalize every relation object into the converter,
/// optionally streaming the intermediate edgelist to `edgelist`.
pub fn ingest_edges<W: Write>(
    input: &Path,
    converter: &mut Converter,
    options: &CamflowOptions,
    scan: Option<&ScanSummary>,
    mut edgelist: Option<(&mut W, EdgelistEncoding)>,
) -> Result<()> {
    for_each_line(input, |value| {
        for outcome in extract_edges(value, options, scan) {
            match outcome {
                EdgeOutcome::Candidate(candidate) => {
                    let normalized = converter.ingest_edge(&candidate)?;
                    if let Some((writer, encoding)) = edgelist.as_mut() {
                        for edge in &normalized {
                            write_edgelist_line(writer, edge, *encoding)?;
                        }
                    }
                }
                EdgeOutcome::Malformed(relation, field) => {
                    converter.drop_malformed_edge(&format!("{relation}/{field}"));
                }
            }
        }
        Ok(())
    })
}

fn write_edgelist_line<W: Write>(
    writer: &mut W,
    edge: &NormalizedEdge,
    encoding: EdgelistEncoding,
) -> Result<()> {
    match encoding {
        EdgelistEncoding::Original => {
            provgraph_core::output::write_normalized_edge(writer, edge)?;
        }
        EdgelistEncoding::Fingerprint => {
            let encoded = NormalizedEdge {
                source_ref: fingerprint(&[edge.source_ref.as_str()]).to_string(),
                dest_ref: fingerprint(&[edge.dest_ref.as_str()]).to_string(),
                ..edge.clone()
            };
            provgraph_core::output::write_normalized_edge(writer, &encoded)?;
        }
    }
    Ok(())
}

/// Full conversion of one CamFlow capture: node pass, optional scan pass,
/// edge pass.
pub fn convert<W: Write>(
    input: &Path,
    converter: &mut Converter,
    options: &CamflowOptions,
    edgelist: Option<(&mut W, EdgelistEncoding)>,
) -> Result<()> {
    register_nodes(input, converter)?;
    let scan = match options.timestamps {
        TimestampSource::WallClock => Some(scan_timestamps(input, converter)?),
        TimestampSource::SequenceId => None,
    };
    ingest_edges(input, converter, options, scan.as_ref(), edgelist)
}

/// Run `handle` over every JSON line of the file. Undecodable lines are
/// logged and skipped — captures truncate mid-line at rotation boundaries.
fn for_each_line<F>(input: &Path, mut handle: F) -> Result<()>
where
    F: FnMut(&Value) -> Result<()>,
{
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let reader = BufReader::new(file);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&line) {
            Ok(value) => handle(&value)?,
            Err(e) => warn!(line = number + 1, error = %e, "skipping undecodable line"),
        }
    }
    Ok(())
}
