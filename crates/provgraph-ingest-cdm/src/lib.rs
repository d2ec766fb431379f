//! DARPA CDM structured-event adapter.
//!
//! CDM records arrive one JSON object per line, wrapped in a `datum`
//! envelope keyed by the record's schema class
//! (`com.bbn.tc.schema.avro.cdm18.Event`, `...FileObject`, …). Node-shaped
//! classes register during a first pass over every input; events normalize
//! into edges during a second pass, so cross-file references resolve no
//! matter which file registered the node. With a durable store injected
//! into the converter, the two passes may even run in separate processes.
//!
//! Event timestamps (`timestampNanos`) are non-decreasing within a file,
//! so the pipeline runs in arrival order. Canonical IDs for this format
//! start at 1.

pub mod archive;
pub mod roles;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use provgraph_core::{Converter, EdgeCandidate, NodeRecord, ABSENT};

pub use roles::role_table;

const SCHEMA_PREFIX: &str = "com.bbn.tc.schema.avro.cdm18.";

/// Nested UUID envelope key.
pub const UUID_KEY: &str = "com.bbn.tc.schema.avro.cdm18.UUID";

/// Record classes, stripped of the schema prefix.
pub const CLASS_EVENT: &str = "Event";
pub const CLASS_SUBJECT: &str = "Subject";
pub const CLASS_FILE: &str = "FileObject";
pub const CLASS_NETFLOW: &str = "NetFlowObject";
pub const CLASS_SRCSINK: &str = "SrcSinkObject";
pub const CLASS_PIPE: &str = "UnnamedPipeObject";
pub const CLASS_PRINCIPAL: &str = "Principal";
pub const CLASS_HOST: &str = "Host";
pub const CLASS_MEMORY: &str = "MemoryObject";

/// Classes carrying neither nodes nor edges.
const PASSTHROUGH_CLASSES: [&str; 6] = [
    "ProvenanceTagNode",
    "RegistryKeyObject",
    "StartMarker",
    "TimeMarker",
    "EndMarker",
    "UnitDependency",
];

/// What one CDM record contributes to the graph.
#[derive(Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    Node(NodeRecord),
    Event(EdgeCandidate),
    /// Event record missing a required field (the field name).
    MalformedEvent(&'static str),
    /// Node record missing its type.
    MalformedNode(String),
    /// A class with nothing to contribute (markers, tags).
    Skip,
    /// A class outside the known schema.
    UnknownClass(String),
}

/// Open the `datum` envelope: `(class, value)`.
pub fn open_envelope(record: &Value) -> Option<(&str, &Value)> {
    let datum = record.get("datum")?.as_object()?;
    let (class, value) = datum.iter().next()?;
    Some((class.strip_prefix(SCHEMA_PREFIX).unwrap_or(class), value))
}

/// Classify one parsed record line.
pub fn classify(record: &Value) -> RecordOutcome {
    let Some((class, value)) = open_envelope(record) else {
        return RecordOutcome::MalformedNode("datum".to_string());
    };
    match class {
        CLASS_EVENT => event_outcome(value),
        CLASS_SUBJECT | CLASS_FILE | CLASS_SRCSINK | CLASS_PRINCIPAL => {
            typed_node_outcome(class, value)
        }
        CLASS_HOST => host_outcome(value),
        CLASS_NETFLOW => netflow_outcome(value),
        CLASS_PIPE => pipe_outcome(value),
        CLASS_MEMORY => memory_outcome(value),
        other if PASSTHROUGH_CLASSES.contains(&other) => RecordOutcome::Skip,
        other => RecordOutcome::UnknownClass(other.to_string()),
    }
}

fn record_uuid(value: &Value) -> Option<String> {
    value.get("uuid").and_then(Value::as_str).map(str::to_string)
}

/// Subject, FileObject, SrcSinkObject, Principal: the `type` field is the
/// whole descriptor.
fn typed_node_outcome(class: &str, value: &Value) -> RecordOutcome {
    let Some(uuid) = record_uuid(value) else {
        return RecordOutcome::MalformedNode(format!("{class}/uuid"));
    };
    let Some(node_type) = value.get("type").and_then(Value::as_str) else {
        return RecordOutcome::MalformedNode(format!("{class}/{uuid}"));
    };
    RecordOutcome::Node(NodeRecord::new(uuid, node_type))
}

fn host_outcome(value: &Value) -> RecordOutcome {
    let Some(uuid) = record_uuid(value) else {
        return RecordOutcome::MalformedNode("Host/uuid".to_string());
    };
    let Some(host_type) = value.get("hostType").and_then(Value::as_str) else {
        return RecordOutcome::MalformedNode(format!("Host/{uuid}"));
    };
    RecordOutcome::Node(NodeRecord::new(uuid, host_type))
}

/// NetFlowObject: fixed type plus address/port attributes.
fn netflow_outcome(value: &Value) -> RecordOutcome {
    let Some(uuid) = record_uuid(value) else {
        return RecordOutcome::MalformedNode("NetFlowObject/uuid".to_string());
    };
    let attr = |field: &str| scalar_attr(value, field);
    RecordOutcome::Node(
        NodeRecord::new(uuid, "NET_FLOW_OBJECT").with_attributes(vec![
            attr("localAddress"),
            attr("localPort"),
            attr("remoteAddress"),
            attr("remotePort"),
        ]),
    )
}

/// UnnamedPipeObject: fixed type plus endpoint UUID attributes.
fn pipe_outcome(value: &Value) -> RecordOutcome {
    let Some(uuid) = record_uuid(value) else {
        return RecordOutcome::MalformedNode("UnnamedPipeObject/uuid".to_string());
    };
    let endpoint = |field: &str| {
        value
            .get(field)
            .and_then(|v| nested_uuid(v))
            .unwrap_or_else(|| ABSENT.to_string())
    };
    RecordOutcome::Node(
        NodeRecord::new(uuid, "UNNAMED_PIPE_OBJECT")
            .with_attributes(vec![endpoint("sourceUUID"), endpoint("sinkUUID")]),
    )
}

fn memory_outcome(value: &Value) -> RecordOutcome {
    let Some(uuid) = record_uuid(value) else {
        return RecordOutcome::MalformedNode("MemoryObject/uuid".to_string());
    };
    RecordOutcome::Node(NodeRecord::new(uuid, "MEMORY_OBJECT"))
}

/// Port numbers arrive as JSON integers, addresses as strings; both land
/// in the attribute list as strings, absent fields as the sentinel.
fn scalar_attr(value: &Value, field: &str) -> String {
    match value.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            debug!(field, "NetFlowObject attribute missing");
            ABSENT.to_string()
        }
    }
}

/// Unwrap a `{ "com.bbn...UUID": "..." }` envelope, which may be null.
fn nested_uuid(value: &Value) -> Option<String> {
    value.get(UUID_KEY).and_then(Value::as_str).map(str::to_string)
}

fn event_outcome(value: &Value) -> RecordOutcome {
    let Some(event_type) = value.get("type").and_then(Value::as_str) else {
        return RecordOutcome::MalformedEvent("type");
    };
    let Some(timestamp) = value.get("timestampNanos").and_then(Value::as_u64) else {
        return RecordOutcome::MalformedEvent("timestampNanos");
    };
    let reference = |field: &str| value.get(field).and_then(nested_uuid);

    RecordOutcome::Event(EdgeCandidate {
        role_key: event_type.to_string(),
        edge_type: event_type.to_string(),
        flags: Vec::new(),
        subject: reference("subject"),
        object1: reference("predicateObject"),
        object2: reference("predicateObject2"),
        logical_timestamp: timestamp,
    })
}

/// Inputs: a single `.json` file, a `.tar.gz` archive, or a directory of
/// either. Directories are walked in name order.
pub fn input_files(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(source)
        .with_context(|| format!("cannot read {}", source.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_archive(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".tar.gz")
}

fn for_each_input_line<F>(path: &Path, mut handle: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    if is_archive(path) {
        archive::for_each_archive_line(path, handle)
    } else {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            handle(&line?)?;
        }
        Ok(())
    }
}

/// Node-registration pass over one input. All inputs that can reference
/// each other's nodes must finish this pass before any edge pass starts.
pub fn register_nodes(path: &Path, converter: &mut Converter) -> Result<()> {
    for_each_input_line(path, |line| {
        let Some(record) = parse_line(line) else {
            return Ok(());
        };
        match classify(&record) {
            RecordOutcome::Node(node) => {
                converter.register_node(&node)?;
            }
            RecordOutcome::MalformedNode(context) => converter.drop_node(&context),
            RecordOutcome::UnknownClass(class) => {
                warn!(class = %class, "record class outside the known schema, skipped");
            }
            RecordOutcome::Event(_) | RecordOutcome::MalformedEvent(_) | RecordOutcome::Skip => {}
        }
        Ok(())
    })
}

/// Edge pass over one input.
pub fn ingest_edges(path: &Path, converter: &mut Converter) -> Result<()> {
    for_each_input_line(path, |line| {
        let Some(record) = parse_line(line) else {
            return Ok(());
        };
        match classify(&record) {
            RecordOutcome::Event(candidate) => {
                converter.ingest_edge(&candidate)?;
            }
            RecordOutcome::MalformedEvent(field) => converter.drop_malformed_edge(field),
            _ => {}
        }
        Ok(())
    })
}

/// Full conversion: node pass over every input, then edge pass over every
/// input, preserving input order within each pass.
pub fn convert(inputs: &[PathBuf], converter: &mut Converter) -> Result<()> {
    for path in inputs {
        register_nodes(path, converter)?;
    }
    for path in inputs {
        ingest_edges(path, converter)?;
    }
    Ok(())
}

fn parse_line(line: &str) -> Option<Value> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "skipping undecodable record line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provgraph_core::{PipelineConfig, RoleTable, SplitPolicy};
    use serde_json::json;

    fn wrap(class: &str, value: Value) -> Value {
        json!({ "datum": { (format!("{SCHEMA_PREFIX}{class}")): value } })
    }

    fn uuid_ref(uuid: &str) -> Value {
        json!({ UUID_KEY: uuid })
    }

    fn cdm_converter() -> Converter {
        Converter::new(
            role_table(),
            PipelineConfig {
                id_base: 1,
                ..PipelineConfig::default()
            },
        )
    }

    #[test]
    fn subject_record_becomes_node() {
        let record = wrap(CLASS_SUBJECT, json!({"uuid": "s-1", "type": "SUBJECT_PROCESS"}));
        assert_eq!(
            classify(&record),
            RecordOutcome::Node(NodeRecord::new("s-1", "SUBJECT_PROCESS"))
        );
    }

    #[test]
    fn netflow_attributes_in_order() {
        let record = wrap(
            CLASS_NETFLOW,
            json!({
                "uuid": "n-1",
                "localAddress": "10.0.0.2",
                "localPort": 53610,
                "remoteAddress": "10.0.0.1",
                "remotePort": 80
            }),
        );
        let RecordOutcome::Node(node) = classify(&record) else {
            panic!("expected a node");
        };
        assert_eq!(node.node_type, "NET_FLOW_OBJECT");
        assert_eq!(
            node.extra_attributes,
            vec!["10.0.0.2", "53610", "10.0.0.1", "80"]
        );
    }

    #[test]
    fn pipe_with_null_endpoint_uses_sentinel() {
        let record = wrap(
            CLASS_PIPE,
            json!({"uuid": "p-1", "sourceUUID": uuid_ref("a"), "sinkUUID": null}),
        );
        let RecordOutcome::Node(node) = classify(&record) else {
            panic!("expected a node");
        };
        assert_eq!(node.extra_attributes, vec!["a", ABSENT]);
    }

    #[test]
    fn typeless_node_is_malformed() {
        let record = wrap(CLASS_FILE, json!({"uuid": "f-1"}));
        assert!(matches!(classify(&record), RecordOutcome::MalformedNode(_)));
    }

    #[test]
    fn markers_are_skipped() {
        let record = wrap("TimeMarker", json!({"tsNanos": 1}));
        assert_eq!(classify(&record), RecordOutcome::Skip);
    }

    #[test]
    fn unknown_class_is_flagged() {
        let record = wrap("FutureObject", json!({}));
        assert_eq!(
            classify(&record),
            RecordOutcome::UnknownClass("FutureObject".to_string())
        );
    }

    #[test]
    fn event_extracts_roles_and_timestamp() {
        let record = wrap(
            CLASS_EVENT,
            json!({
                "uuid": "e-1",
                "type": "EVENT_READ",
                "subject": uuid_ref("proc"),
                "predicateObject": uuid_ref("file"),
                "predicateObject2": null,
                "timestampNanos": 1522706861813350340u64
            }),
        );
        let RecordOutcome::Event(c) = classify(&record) else {
            panic!("expected an event");
        };
        assert_eq!(c.role_key, "EVENT_READ");
        assert_eq!(c.subject.as_deref(), Some("proc"));
        assert_eq!(c.object1.as_deref(), Some("file"));
        assert_eq!(c.object2, None);
        assert_eq!(c.logical_timestamp, 1522706861813350340);
    }

    #[test]
    fn event_without_timestamp_is_malformed() {
        let record = wrap(CLASS_EVENT, json!({"uuid": "e-2", "type": "EVENT_READ"}));
        assert_eq!(
            classify(&record),
            RecordOutcome::MalformedEvent("timestampNanos")
        );
    }

    #[test]
    fn end_to_end_two_pass_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadets.json");
        let lines = [
            wrap(CLASS_SUBJECT, json!({"uuid": "proc", "type": "SUBJECT_PROCESS"})),
            wrap(CLASS_FILE, json!({"uuid": "file", "type": "FILE_OBJECT_FILE"})),
            // a read flows object -> subject
            wrap(
                CLASS_EVENT,
                json!({
                    "uuid": "e-1", "type": "EVENT_READ",
                    "subject": uuid_ref("proc"), "predicateObject": uuid_ref("file"),
                    "timestampNanos": 100u64
                }),
            ),
            // mmap is symmetric: two edges
            wrap(
                CLASS_EVENT,
                json!({
                    "uuid": "e-2", "type": "EVENT_MMAP",
                    "subject": uuid_ref("proc"), "predicateObject": uuid_ref("file"),
                    "timestampNanos": 200u64
                }),
            ),
            // references a node never registered
            wrap(
                CLASS_EVENT,
                json!({
                    "uuid": "e-3", "type": "EVENT_WRITE",
                    "subject": uuid_ref("proc"), "predicateObject": uuid_ref("ghost"),
                    "timestampNanos": 300u64
                }),
            ),
        ];
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        std::fs::write(&path, text).unwrap();

        let mut c = cdm_converter();
        convert(&[path], &mut c).unwrap();
        let out = c.finish().unwrap();

        assert_eq!(out.registered_nodes, 2);
        assert_eq!(out.edges.len(), 3); // read + mmap both ways
        assert_eq!(out.counters.valid_edges, 2);
        assert_eq!(out.counters.dropped_unresolved, 1);
        assert!(out.counters.reconciles());

        // IDs start at 1 for this format; the read's source is the file
        assert_eq!(out.edges[0].source_id, 1);
        assert_eq!(out.edges[0].dest_id, 2);

        let (base, stream) = out.split(SplitPolicy::default());
        assert_eq!(base.len(), 1);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn role_table_is_closed() {
        let table: RoleTable = role_table();
        assert!(table.rule("EVENT_READ").is_some());
        assert!(table.rule("not-an-event").is_none());
    }
}
