use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for diagram ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter shared by every generated id, so `node_3` and `edge_3` never
/// come from the same draw.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// An interned identifier for a node or edge.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

/// Edges share the node id space; the alias documents intent at call sites.
pub type EdgeId = NodeId;

impl NodeId {
    /// Intern a string as an id, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate an id with a prefix (e.g. `node_4`, `edge_9`).
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Generate a prefixed id that `taken` does not claim.
    ///
    /// Loaded diagrams can already contain ids shaped like generated ones,
    /// so the counter is advanced until a free id comes up.
    pub fn fresh(prefix: &str, taken: impl Fn(NodeId) -> bool) -> Self {
        loop {
            let id = Self::with_prefix(prefix);
            if !taken(id) {
                return id;
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("login_step");
        let b = NodeId::intern("login_step");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "login_step");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("node");
        let b = NodeId::with_prefix("node");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node_"));
    }

    #[test]
    fn fresh_skips_taken_ids() {
        let blocked = NodeId::with_prefix("edge");
        let n: u64 = blocked.as_str()["edge_".len()..].parse().unwrap();
        let next_shape = NodeId::intern(&format!("edge_{}", n + 1));
        let id = NodeId::fresh("edge", |candidate| candidate == next_shape);
        assert_ne!(id, next_shape);
        assert_ne!(id, blocked);
    }

    #[test]
    fn display_is_plain_string() {
        let id = NodeId::intern("start");
        assert_eq!(id.to_string(), "start");
        assert_eq!(format!("{id:?}"), "@start");
    }
}
