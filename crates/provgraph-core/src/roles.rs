//! Role-mapping tables.
//!
//! Which record fields act as an edge's source and destination depends on
//! the event type: most events flow subject → object, some reverse, a few
//! relate two objects directly, a few are symmetric (emitted once in each
//! direction), and a few carry no direction at all. That knowledge is data,
//! not control flow: each format supplies one static table built at startup
//! and the normalizer stays table-driven.

use std::collections::HashMap;

/// How an event type's roles map onto a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// subject → object1
    SubjectToObject,
    /// object1 → subject
    ObjectToSubject,
    /// object1 → object2
    ObjectToObject2,
    /// No resolvable direction; the edge is dropped (and counted).
    Undirected,
}

/// Direction rule plus symmetry flag for one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRule {
    pub direction: Direction,
    /// Symmetric events are emitted twice, source/destination swapped.
    pub bidirectional: bool,
}

impl RoleRule {
    pub const fn directed(direction: Direction) -> Self {
        Self {
            direction,
            bidirectional: false,
        }
    }

    pub const fn symmetric(direction: Direction) -> Self {
        Self {
            direction,
            bidirectional: true,
        }
    }
}

/// Event-type symbol → role rule, with an optional fallback for formats
/// whose edge types are open-ended (StreamSpot's single-character codes).
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    rules: HashMap<String, RoleRule>,
    fallback: Option<RoleRule>,
}

impl RoleTable {
    /// Build a closed table: unlisted event types are unknown (dropped and
    /// logged as a schema-coverage gap).
    pub fn from_entries(entries: &[(&str, RoleRule)]) -> Self {
        Self {
            rules: entries
                .iter()
                .map(|(name, rule)| (name.to_string(), *rule))
                .collect(),
            fallback: None,
        }
    }

    /// Build an open table: any event type maps to `rule`.
    pub fn permissive(rule: RoleRule) -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Some(rule),
        }
    }

    /// Look up the rule for an event type.
    pub fn rule(&self, event_type: &str) -> Option<RoleRule> {
        self.rules.get(event_type).copied().or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.fallback.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_table_rejects_unlisted() {
        let table = RoleTable::from_entries(&[
            ("EVENT_READ", RoleRule::directed(Direction::ObjectToSubject)),
            ("EVENT_WRITE", RoleRule::directed(Direction::SubjectToObject)),
        ]);
        assert_eq!(
            table.rule("EVENT_READ").unwrap().direction,
            Direction::ObjectToSubject
        );
        assert!(table.rule("EVENT_MADE_UP").is_none());
    }

    #[test]
    fn permissive_table_maps_everything() {
        let table = RoleTable::permissive(RoleRule::directed(Direction::SubjectToObject));
        let rule = table.rule("anything").unwrap();
        assert_eq!(rule.direction, Direction::SubjectToObject);
        assert!(!rule.bidirectional);
    }
}
