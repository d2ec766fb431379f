//! Pipeline assembly.
//!
//! One [`Converter`] per input source (or per independent partition): the
//! adapter pushes node records during the registration phase and edge
//! candidates during the edge phase, then [`Converter::finish`] settles the
//! order, assigns canonical identities, and hands back the final sequence
//! with its accounting.

use tracing::warn;

use crate::counters::Counters;
use crate::error::Result;
use crate::fingerprint::Fingerprinter;
use crate::index::{DuplicatePolicy, NodeIndex};
use crate::normalize::EdgeNormalizer;
use crate::order::{EdgeLog, OrderingMode};
use crate::record::{CanonicalEdge, EdgeCandidate, NodeRecord, NormalizedEdge};
use crate::resolver::IdentityResolver;
use crate::roles::RoleTable;
use crate::split::{split, SplitPolicy};
use crate::store::KvStore;

/// Per-run configuration for the core pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub ordering: OrderingMode,
    /// First canonical ID handed out.
    pub id_base: u64,
    pub duplicates: DuplicatePolicy,
}

/// The generalized converter: registration, normalization, ordering,
/// canonicalization.
pub struct Converter {
    fingerprinter: Fingerprinter,
    index: NodeIndex,
    normalizer: EdgeNormalizer,
    log: EdgeLog,
    id_base: u64,
}

impl Converter {
    /// All-in-memory converter.
    pub fn new(table: RoleTable, config: PipelineConfig) -> Self {
        Self::with_stores(table, config, None, None)
    }

    /// Converter with injected stores: `node_store` backs the registration
    /// index (a durable one shares registrations across files), and
    /// `label_store` turns on fingerprint reverse-lookup recording.
    pub fn with_stores(
        table: RoleTable,
        config: PipelineConfig,
        node_store: Option<Box<dyn KvStore>>,
        label_store: Option<Box<dyn KvStore>>,
    ) -> Self {
        let fingerprinter = match label_store {
            Some(store) => Fingerprinter::with_label_store(store),
            None => Fingerprinter::new(),
        };
        let index = match node_store {
            Some(store) => NodeIndex::with_store(store, config.duplicates),
            None => NodeIndex::with_store(
                Box::new(crate::store::MemStore::new()),
                config.duplicates,
            ),
        };
        Self {
            fingerprinter,
            index,
            normalizer: EdgeNormalizer::new(table),
            log: EdgeLog::new(config.ordering),
            id_base: config.id_base,
        }
    }

    /// Register one node: fingerprint its type and attributes (type first)
    /// and record it under its original ID. Returns whether the ID was new.
    pub fn register_node(&mut self, record: &NodeRecord) -> Result<bool> {
        let fingerprint = self.fingerprinter.digest(&record.fingerprint_parts())?;
        self.index.register(&record.original_id, fingerprint)
    }

    /// Account for a node record dropped before registration (missing type).
    pub fn drop_node(&mut self, context: &str) {
        self.normalizer.counters.nodes_dropped += 1;
        warn!(context, "node record without a type, not registered");
    }

    /// Account for an edge record dropped before it could be shaped into a
    /// candidate (missing type or timestamp).
    pub fn drop_malformed_edge(&mut self, context: &str) {
        self.normalizer.drop_malformed(context);
    }

    /// Normalize one edge candidate and append the result to the log.
    /// Returns the normalized edges (empty if the candidate was dropped)
    /// for callers that also stream an intermediate edgelist.
    pub fn ingest_edge(&mut self, candidate: &EdgeCandidate) -> Result<Vec<NormalizedEdge>> {
        let edges = self
            .normalizer
            .normalize(candidate, &self.index, &mut self.fingerprinter)?;
        self.log.extend(edges.iter().cloned());
        Ok(edges)
    }

    /// Read access to the registration index (for adapters that need to
    /// probe whether a node is known, e.g. lazy edge-time registration).
    pub fn node_index(&self) -> &NodeIndex {
        &self.index
    }

    /// Edges logged so far (bidirectional duplicates included).
    pub fn logged_edges(&self) -> usize {
        self.log.len()
    }

    /// Settle ordering, canonicalize, close stores, and return the result.
    pub fn finish(self) -> Result<Conversion> {
        let mut resolver = IdentityResolver::new(self.id_base);
        let edges = self.log.into_canonical(&mut resolver);

        let mut counters = self.normalizer.counters;
        counters.nodes_registered = self.index.registered();
        counters.nodes_duplicate = self.index.duplicates();

        let registered_nodes = self.index.registered();
        self.index.close()?;
        self.fingerprinter.close()?;

        Ok(Conversion {
            edges,
            counters,
            registered_nodes,
            resolved_nodes: resolver.len() as u64,
        })
    }
}

/// Result of one converter run.
#[derive(Debug)]
pub struct Conversion {
    /// The final ordered canonical sequence.
    pub edges: Vec<CanonicalEdge>,
    pub counters: Counters,
    /// Distinct nodes registered during the node phase.
    pub registered_nodes: u64,
    /// Distinct nodes actually referenced by emitted edges.
    pub resolved_nodes: u64,
}

impl Conversion {
    /// Base prefix and stream suffix under the given policy.
    pub fn split(&self, policy: SplitPolicy) -> (&[CanonicalEdge], &[CanonicalEdge]) {
        split(&self.edges, policy)
    }
}
