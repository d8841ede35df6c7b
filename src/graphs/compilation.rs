//! Graph compilation logic and validation.
//!
//! This module contains the logic for compiling a [`GraphBuilder`] into an
//! executable [`App`](crate::app::App), including all construction-time
//! structural checks. A graph that compiles cannot fail at run time for
//! wiring reasons: every edge endpoint exists, every bridge is compatible
//! with the schemas at its ends, the exit is reachable from the entry, and
//! no node is unreachable or a dead end.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

use super::builder::GraphBuilder;
use crate::app::App;
use crate::auth::EnvAuthProvider;
use crate::bridge::{Bridge, BridgeError};
use crate::types::NodeId;

/// Construction-time graph configuration errors.
///
/// These abort [`GraphBuilder::compile`] immediately; they are never
/// surfaced as runtime stage failures.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphConfigurationError {
    /// No entry node was designated.
    #[error("graph has no entry node")]
    #[diagnostic(
        code(formweaver::graph::missing_entry),
        help("Call set_entry_node with a registered node id.")
    )]
    MissingEntry,

    /// No exit node was designated.
    #[error("graph has no exit node")]
    #[diagnostic(
        code(formweaver::graph::missing_exit),
        help("Call set_exit_node with a registered node id.")
    )]
    MissingExit,

    /// The designated entry or exit node is not in the node set.
    #[error("{role} node `{node}` is not registered in the graph")]
    #[diagnostic(code(formweaver::graph::unknown_endpoint))]
    UnknownEndpoint { role: &'static str, node: NodeId },

    /// A node id was registered more than once.
    #[error("node `{node}` was registered more than once")]
    #[diagnostic(code(formweaver::graph::duplicate_node))]
    DuplicateNode { node: NodeId },

    /// An edge references a node that was never registered.
    #[error("edge `{from}` -> `{to}` references unregistered node `{node}`")]
    #[diagnostic(code(formweaver::graph::dangling_edge))]
    DanglingEdge {
        from: NodeId,
        to: NodeId,
        node: NodeId,
    },

    /// An edge's bridge cannot adapt the schemas at its ends.
    #[error("bridge on edge `{from}` -> `{to}` is incompatible")]
    #[diagnostic(code(formweaver::graph::incompatible_bridge))]
    IncompatibleBridge {
        from: NodeId,
        to: NodeId,
        #[source]
        source: BridgeError,
    },

    /// There is no path from the entry node to the exit node.
    #[error("no path from entry `{entry}` to exit `{exit}`")]
    #[diagnostic(
        code(formweaver::graph::no_path_to_exit),
        help("Add edges so the exit node is reachable from the entry node.")
    )]
    NoPathToExit { entry: NodeId, exit: NodeId },

    /// A registered node cannot be reached from the entry node.
    #[error("node `{node}` is unreachable from the entry node")]
    #[diagnostic(code(formweaver::graph::unreachable_node))]
    UnreachableNode { node: NodeId },

    /// A non-exit node has no outgoing edge.
    #[error("node `{node}` has no outgoing edge and is not the exit node")]
    #[diagnostic(code(formweaver::graph::dead_end))]
    DeadEnd { node: NodeId },
}

/// Compilation logic for GraphBuilder.
impl GraphBuilder {
    /// Compiles the graph into an executable application.
    ///
    /// Validates the configuration eagerly and converts it into an
    /// [`App`](crate::app::App). Checks, in order: duplicate registrations,
    /// entry/exit designation and membership, edge endpoints, bridge
    /// compatibility, exit reachability, node reachability, and dead ends.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphConfigurationError`] encountered; the
    /// builder is consumed either way.
    pub fn compile(self) -> Result<App, GraphConfigurationError> {
        if let Some(node) = self.duplicates.into_iter().next() {
            return Err(GraphConfigurationError::DuplicateNode { node });
        }

        let entry = self.entry.ok_or(GraphConfigurationError::MissingEntry)?;
        let exit = self.exit.ok_or(GraphConfigurationError::MissingExit)?;
        for (role, node) in [("entry", &entry), ("exit", &exit)] {
            if !self.nodes.contains_key(node) {
                return Err(GraphConfigurationError::UnknownEndpoint {
                    role,
                    node: node.clone(),
                });
            }
        }

        // Edge endpoints and bridge compatibility.
        let mut adjacency: FxHashMap<NodeId, Vec<(NodeId, Arc<dyn Bridge>)>> =
            FxHashMap::default();
        for edge in &self.edges {
            for node in [&edge.from, &edge.to] {
                if !self.nodes.contains_key(node) {
                    return Err(GraphConfigurationError::DanglingEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        node: node.clone(),
                    });
                }
            }
            let source = self.nodes[&edge.from].output_schema();
            let target = self.nodes[&edge.to].input_schema();
            edge.bridge
                .compatibility(&source, &target)
                .map_err(|source| GraphConfigurationError::IncompatibleBridge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    source,
                })?;
            adjacency
                .entry(edge.from.clone())
                .or_default()
                .push((edge.to.clone(), Arc::clone(&edge.bridge)));
        }

        // Reachability from the entry node.
        let mut reachable: FxHashSet<NodeId> = FxHashSet::default();
        let mut frontier: VecDeque<NodeId> = VecDeque::new();
        reachable.insert(entry.clone());
        frontier.push_back(entry.clone());
        while let Some(current) = frontier.pop_front() {
            if let Some(targets) = adjacency.get(&current) {
                for (next, _) in targets {
                    if reachable.insert(next.clone()) {
                        frontier.push_back(next.clone());
                    }
                }
            }
        }

        if !reachable.contains(&exit) {
            return Err(GraphConfigurationError::NoPathToExit { entry, exit });
        }
        for node in &self.order {
            if !reachable.contains(node) {
                return Err(GraphConfigurationError::UnreachableNode {
                    node: node.clone(),
                });
            }
        }
        for node in &self.order {
            if *node != exit && adjacency.get(node).is_none_or(Vec::is_empty) {
                return Err(GraphConfigurationError::DeadEnd { node: node.clone() });
            }
        }

        let auth = self.auth.unwrap_or_else(|| Arc::new(EnvAuthProvider::new()));
        Ok(App::from_parts(
            self.nodes,
            adjacency,
            entry,
            exit,
            auth,
            self.validation,
        ))
    }
}
