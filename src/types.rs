//! Core identifier types for the formweaver flow graph.
//!
//! A [`NodeId`] names one worker registration inside a graph. Unlike schema
//! names (which describe *what* flows along an edge), node ids describe
//! *where* in the topology a worker sits; the same worker type can be
//! registered under several ids.
//!
//! # Examples
//!
//! ```rust
//! use formweaver::types::NodeId;
//!
//! let designer = NodeId::new("designer");
//! assert_eq!(designer.as_str(), "designer");
//!
//! // String literals convert directly where a NodeId is expected.
//! let creator: NodeId = "creator".into();
//! assert_ne!(designer, creator);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node within a flow graph.
///
/// `NodeId` is the key under which a worker is registered with
/// [`GraphBuilder::add_node`](crate::graphs::GraphBuilder::add_node) and the
/// identity reported back by the executor when that worker fails. Ids must be
/// unique within one graph; registering the same id twice is a
/// construction-time error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Developer Experience: allow using string literals where a NodeId is expected.
impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_equality() {
        let a = NodeId::new("designer");
        let b: NodeId = "designer".into();
        let c = NodeId::new("creator");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new("entry").to_string(), "entry");
    }
}
