//! End-to-end pipeline tests over hand-built inputs.

use provgraph_core::{
    Converter, Direction, EdgeCandidate, NodeRecord, OrderingMode, PipelineConfig, RoleRule,
    RoleTable, SplitPolicy,
};

fn table() -> RoleTable {
    RoleTable::from_entries(&[
        ("open", RoleRule::directed(Direction::SubjectToObject)),
        ("read", RoleRule::directed(Direction::ObjectToSubject)),
        ("mmap", RoleRule::symmetric(Direction::SubjectToObject)),
    ])
}

fn candidate(role: &str, subject: &str, object: &str, ts: u64) -> EdgeCandidate {
    EdgeCandidate {
        role_key: role.to_string(),
        edge_type: role.to_string(),
        flags: Vec::new(),
        subject: Some(subject.to_string()),
        object1: Some(object.to_string()),
        object2: None,
        logical_timestamp: ts,
    }
}

/// Three nodes, ten valid edges, default split: one base edge, nine stream
/// edges, novelty aligned with first references in the full order.
#[test]
fn ten_edge_default_split_scenario() {
    let mut converter = Converter::new(table(), PipelineConfig::default());
    converter.register_node(&NodeRecord::new("A", "process")).unwrap();
    converter.register_node(&NodeRecord::new("B", "file")).unwrap();
    converter.register_node(&NodeRecord::new("C", "file")).unwrap();

    let sequence = [
        ("A", "B"),
        ("A", "C"),
        ("A", "B"),
        ("A", "C"),
        ("A", "B"),
        ("A", "B"),
        ("A", "C"),
        ("A", "B"),
        ("A", "C"),
        ("A", "B"),
    ];
    for (ts, (src, dst)) in sequence.iter().enumerate() {
        converter
            .ingest_edge(&candidate("open", src, dst, ts as u64))
            .unwrap();
    }

    let out = converter.finish().unwrap();
    assert_eq!(out.edges.len(), 10);
    assert!(out.counters.reconciles());

    let (base, stream) = out.split(SplitPolicy::default());
    assert_eq!(base.len(), 1);
    assert_eq!(stream.len(), 9);

    // A and B are first referenced by edge 0 (in the base prefix);
    // C first appears as a destination in edge 1, the first stream edge.
    assert!(out.edges[0].source_is_new && out.edges[0].dest_is_new);
    assert!(!out.edges[1].source_is_new && out.edges[1].dest_is_new);
    for edge in &out.edges[2..] {
        assert!(!edge.source_is_new && !edge.dest_is_new);
    }

    // exactly one first-reference per node across the whole sequence
    let src_novel = out.edges.iter().filter(|e| e.source_is_new).count();
    let dst_novel = out.edges.iter().filter(|e| e.dest_is_new).count();
    assert_eq!(src_novel + dst_novel, 3);
}

/// Sorted mode: IDs and novelty follow timestamp order, not arrival order.
#[test]
fn sorted_pipeline_assigns_ids_in_timestamp_order() {
    let config = PipelineConfig {
        ordering: OrderingMode::SortByTimestamp,
        ..PipelineConfig::default()
    };
    let mut converter = Converter::new(table(), config);
    converter.register_node(&NodeRecord::new("X", "process")).unwrap();
    converter.register_node(&NodeRecord::new("Y", "file")).unwrap();
    converter.register_node(&NodeRecord::new("Z", "file")).unwrap();

    // arrives late, happened first
    converter.ingest_edge(&candidate("open", "Y", "Z", 50)).unwrap();
    converter.ingest_edge(&candidate("open", "X", "Y", 10)).unwrap();

    let out = converter.finish().unwrap();
    assert_eq!(out.edges[0].logical_timestamp, 10);
    assert_eq!(out.edges[0].source_id, 0); // X got the first ID
    assert_eq!(out.edges[0].dest_id, 1); // then Y
    assert_eq!(out.edges[1].source_id, 1);
    assert_eq!(out.edges[1].dest_id, 2); // Z last
    assert!(out.edges[0].source_is_new && out.edges[0].dest_is_new);
    assert!(!out.edges[1].source_is_new && out.edges[1].dest_is_new);
}

/// A symmetric event contributes two edges; the reverse copy can be the
/// first reference of neither endpoint.
#[test]
fn bidirectional_round_trip() {
    let mut converter = Converter::new(table(), PipelineConfig::default());
    converter.register_node(&NodeRecord::new("P", "process")).unwrap();
    converter.register_node(&NodeRecord::new("M", "memory")).unwrap();

    converter.ingest_edge(&candidate("mmap", "P", "M", 1)).unwrap();

    let out = converter.finish().unwrap();
    assert_eq!(out.edges.len(), 2);
    assert_eq!(out.counters.valid_edges, 1);
    assert_eq!(out.counters.emitted_edges, 2);
    assert_eq!(out.edges[0].source_id, out.edges[1].dest_id);
    assert_eq!(out.edges[0].dest_id, out.edges[1].source_id);
    assert_eq!(out.edges[0].edge_fingerprint, out.edges[1].edge_fingerprint);
    assert!(out.edges[0].source_is_new && out.edges[0].dest_is_new);
    assert!(!out.edges[1].source_is_new && !out.edges[1].dest_is_new);
}

/// Unknown event types reach neither output and are counted exactly once.
#[test]
fn unknown_event_type_accounting() {
    let mut converter = Converter::new(table(), PipelineConfig::default());
    converter.register_node(&NodeRecord::new("A", "process")).unwrap();
    converter.register_node(&NodeRecord::new("B", "file")).unwrap();

    converter.ingest_edge(&candidate("open", "A", "B", 1)).unwrap();
    converter.ingest_edge(&candidate("frobnicate", "A", "B", 2)).unwrap();

    let out = converter.finish().unwrap();
    assert_eq!(out.edges.len(), 1);
    assert_eq!(out.counters.dropped_unknown_type, 1);
    assert_eq!(out.counters.candidate_edges, 2);
    assert!(out.counters.reconciles());

    let (base, stream) = out.split(SplitPolicy::default());
    assert_eq!(base.len() + stream.len(), 1);
}

/// Empty input: both outputs empty, books balanced.
#[test]
fn empty_input() {
    let converter = Converter::new(table(), PipelineConfig::default());
    let out = converter.finish().unwrap();
    assert!(out.edges.is_empty());
    assert!(out.counters.reconciles());
    let (base, stream) = out.split(SplitPolicy::default());
    assert!(base.is_empty());
    assert!(stream.is_empty());
}
