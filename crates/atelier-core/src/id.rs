use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for node IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for document nodes.
/// Internally a `Spur` index: 4 bytes, `Copy`, O(1) `Eq` and `Hash`.
///
/// Ordering compares the resolved strings so that maps keyed by `NodeId`
/// iterate (and serialize) in the same order on every run.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::intern(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

// ─── Id Generation ───────────────────────────────────────────────────────

/// Source of fresh node ids.
///
/// Every operation that mints nodes (insert from prototype, duplicate,
/// paste) takes one of these so callers choose between deterministic
/// ids and random ones.
pub trait IdGenerator {
    fn next_id(&mut self) -> NodeId;
}

/// Deterministic `prefix-N` ids. Used in tests and debug sessions.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        // Skip anything already interned by someone else (e.g. a loaded document).
        loop {
            let candidate = format!("{}-{}", self.prefix, self.next);
            self.next += 1;
            if INTERNER.get(&candidate).is_none() {
                return NodeId::intern(&candidate);
            }
        }
    }
}

/// Random v4 UUID ids. The production source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> NodeId {
        NodeId::intern(&uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("frame_1");
        let b = NodeId::intern("frame_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "frame_1");
    }

    #[test]
    fn ordering_follows_strings() {
        // intern in reverse order so spur order disagrees with string order
        let z = NodeId::intern("ord-z");
        let a = NodeId::intern("ord-a");
        assert!(a < z);
    }

    #[test]
    fn sequential_ids_are_unique_and_fresh() {
        NodeId::intern("seqtest-0");
        let mut ids = SequentialIds::new("seqtest");
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first.as_str(), "seqtest-1");
        assert_eq!(second.as_str(), "seqtest-2");
    }

    #[test]
    fn uuid_ids_differ() {
        let mut ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = NodeId::intern("rect");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"rect\"");
        let back: NodeId = serde_json::from_str("\"rect\"").unwrap();
        assert_eq!(back, id);
    }
}
