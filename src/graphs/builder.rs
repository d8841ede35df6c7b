//! GraphBuilder implementation for constructing flow graphs.
//!
//! This module contains the main GraphBuilder type and its fluent API for
//! registering workers, bridging them into edges, and designating the entry
//! and exit nodes before compiling to an executable [`App`](crate::app::App).

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::bridge::Bridge;
use crate::schema::ValidationMode;
use crate::types::NodeId;
use crate::worker::{ErasedWorker, Worker};

/// One directed edge: source node, destination node, and the bridge that
/// adapts the source's output schema into the destination's input schema.
pub struct EdgeSpec {
    /// Source node identifier.
    pub from: NodeId,
    /// Destination node identifier.
    pub to: NodeId,
    /// Adapter sitting on this edge.
    pub bridge: Arc<dyn Bridge>,
}

/// Builder for constructing flow graphs with a fluent API.
///
/// `GraphBuilder` collects workers, edges, and configuration, then
/// [`compile`](Self::compile)s them into an immutable [`App`](crate::app::App).
/// All structural validation happens eagerly at compile time; an invalid
/// wiring never produces a runnable graph.
///
/// # Required Configuration
///
/// Every graph must have:
/// - At least one worker registered via [`add_node`](Self::add_node)
/// - A designated entry node ([`set_entry_node`](Self::set_entry_node)) and
///   exit node ([`set_exit_node`](Self::set_exit_node)), both registered
/// - Edges forming a path from entry to exit
///
/// # Examples
///
/// See the [module documentation](crate::graphs) for a complete example.
pub struct GraphBuilder {
    /// Registry of all workers in the graph, keyed by node identifier.
    pub nodes: FxHashMap<NodeId, Arc<dyn ErasedWorker>>,
    /// Directed edges in registration order.
    pub edges: Vec<EdgeSpec>,
    /// Designated entry node, if set.
    pub entry: Option<NodeId>,
    /// Designated exit node, if set.
    pub exit: Option<NodeId>,
    /// Node registration order, for deterministic validation reports.
    pub(crate) order: Vec<NodeId>,
    /// Ids registered more than once; reported at compile time.
    pub(crate) duplicates: Vec<NodeId>,
    /// Credential provider handed to every invocation context.
    pub(crate) auth: Option<Arc<dyn AuthProvider>>,
    /// Validation mode applied at every schema boundary.
    pub(crate) validation: ValidationMode,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new, empty graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: Vec::new(),
            entry: None,
            exit: None,
            order: Vec::new(),
            duplicates: Vec::new(),
            auth: None,
            validation: ValidationMode::default(),
        }
    }

    /// Registers a worker under the given node id.
    ///
    /// Each id must be unique within the graph; registering an id twice is
    /// reported as a configuration error at compile time rather than
    /// silently replacing the earlier worker.
    #[must_use]
    pub fn add_node(mut self, id: impl Into<NodeId>, worker: impl Worker) -> Self {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            self.duplicates.push(id);
            return self;
        }
        self.order.push(id.clone());
        self.nodes.insert(id, Arc::new(worker));
        self
    }

    /// Connects two nodes with a bridge.
    ///
    /// The bridge adapts the source worker's output schema into the
    /// destination worker's input schema; compatibility is verified at
    /// compile time. Use [`IdentityBridge`](crate::bridge::IdentityBridge)
    /// when both ends already share a schema type.
    ///
    /// A node may have several outgoing edges; the executor follows the
    /// first-registered one.
    #[must_use]
    pub fn bridge(
        mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        bridge: impl Bridge,
    ) -> Self {
        self.edges.push(EdgeSpec {
            from: from.into(),
            to: to.into(),
            bridge: Arc::new(bridge),
        });
        self
    }

    /// Designates the node where every run starts.
    #[must_use]
    pub fn set_entry_node(mut self, id: impl Into<NodeId>) -> Self {
        self.entry = Some(id.into());
        self
    }

    /// Designates the node whose response is the run's final result.
    #[must_use]
    pub fn set_exit_node(mut self, id: impl Into<NodeId>) -> Self {
        self.exit = Some(id.into());
        self
    }

    /// Configures the credential provider workers resolve secrets through.
    ///
    /// Defaults to [`EnvAuthProvider`](crate::auth::EnvAuthProvider) when
    /// not set.
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Configures how unknown fields are treated at schema boundaries.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }
}
