//! Canonical edge-list pipeline for system-provenance audit logs.
//!
//! Heterogeneous tracing formats (kernel provenance JSON, DARPA-style
//! structured event logs, pre-flattened edge lists) reduce to one shape: a
//! time-ordered sequence of directed edges between compactly renumbered
//! nodes, each endpoint and edge carrying a deterministic attribute
//! fingerprint, split into a base-graph prefix and a stream-graph suffix
//! for a downstream streaming consumer.
//!
//! Pipeline stages:
//!
//! 1. **Registration** — adapters extract node records; [`index::NodeIndex`]
//!    maps original IDs to attribute fingerprints.
//! 2. **Normalization** — [`normalize::EdgeNormalizer`] resolves each edge
//!    candidate's roles through a [`roles::RoleTable`], looks up endpoint
//!    fingerprints, and fingerprints the edge type and flags.
//! 3. **Ordering** — [`order::EdgeLog`] keeps arrival order or stable-sorts
//!    by logical timestamp, then walks the final sequence assigning
//!    canonical IDs and first-seen flags via [`resolver::IdentityResolver`].
//! 4. **Split & output** — [`split`] cuts the base prefix,
//!    [`output`] serializes edge lines and per-input statistics.
//!
//! [`pipeline::Converter`] wires the stages together; format adapters live
//! in their own crates and feed it.

pub mod counters;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod normalize;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod roles;
pub mod split;
pub mod store;

pub use counters::Counters;
pub use error::{ConvertError, Result};
pub use fingerprint::{fingerprint, Fingerprinter, ABSENT};
pub use index::{DuplicatePolicy, NodeIndex};
pub use normalize::EdgeNormalizer;
pub use order::{EdgeLog, OrderingMode, ScanSummary};
pub use pipeline::{Conversion, Converter, PipelineConfig};
pub use record::{CanonicalEdge, EdgeCandidate, NodeRecord, NormalizedEdge};
pub use resolver::{IdentityResolver, ResolvedNode};
pub use roles::{Direction, RoleRule, RoleTable};
pub use split::{split, SplitPolicy};
pub use store::{DurableStore, KvStore, MemStore};
