//! Search tree arena for candidate exploration.
//!
//! The tree is an append-only, parent-pointer graph held in an arena and
//! addressed by stable [`NodeId`]s rather than raw references, so audit
//! serialization is trivial and acyclicity holds by construction: a child
//! can only ever point at a node that already existed when it was created.
//!
//! Each session owns its own [`SearchTree`]; the arena is written only by
//! that session's single search loop.

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::verdict::{aggregate, AggregateScore, JudgeVerdict};
use crate::domain::errors::{DomainError, DomainResult};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable arena index of a tree node.
///
/// Ids are assigned in creation order and never reused, so comparing two
/// ids also compares creation time. That property backs both deterministic
/// tie-breaking rules in the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// Lifecycle state of one search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Root created and scored; no expansion yet.
    Initialized,
    /// Expansion rounds in progress.
    Expanding,
    /// Terminal: the success threshold was reached.
    Converged,
    /// Terminal: budget, leaves, or the termination policy ran out first.
    Exhausted,
}

impl SearchState {
    /// Whether the session can no longer expand.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::Exhausted)
    }
}

// ---------------------------------------------------------------------------
// TreeNode
// ---------------------------------------------------------------------------

/// One node of the search tree: a candidate plus its evaluation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// This node's arena id.
    pub id: NodeId,
    /// The candidate artifact this node wraps.
    pub candidate: Candidate,
    /// Every verdict received for this candidate, in arrival order.
    pub verdicts: Vec<JudgeVerdict>,
    /// Aggregate score over `verdicts`. Recomputed on every verdict
    /// arrival, so it is never stale.
    pub score: AggregateScore,
    /// Parent node, absent only for the root.
    pub parent: Option<NodeId>,
    /// Children in the order they were attached (selection order).
    pub children: Vec<NodeId>,
    /// How many times the search loop selected this node for expansion.
    pub visits: u32,
    /// Distance from the root (root = 0).
    pub depth: u32,
}

impl TreeNode {
    /// Whether this node currently has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SearchTree
// ---------------------------------------------------------------------------

/// Append-only arena of [`TreeNode`]s for one search session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    coherence_weight: f64,
}

impl SearchTree {
    /// Create a tree containing only the root candidate, unscored.
    pub fn new(root: Candidate, coherence_weight: f64) -> Self {
        let root_node = TreeNode {
            id: NodeId(0),
            candidate: root,
            verdicts: Vec::new(),
            score: AggregateScore::default(),
            parent: None,
            children: Vec::new(),
            visits: 0,
            depth: 0,
        };
        Self {
            nodes: vec![root_node],
            coherence_weight,
        }
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.nodes.get(id.0).ok_or(DomainError::NodeNotFound(id.0))
    }

    /// Attach a new child of `parent` wrapping `candidate`.
    ///
    /// The child starts unscored; callers record verdicts afterwards.
    pub fn add_child(&mut self, parent: NodeId, candidate: Candidate) -> DomainResult<NodeId> {
        let depth = self.node(parent)?.depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            candidate,
            verdicts: Vec::new(),
            score: AggregateScore::default(),
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            depth,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Record verdicts for a node and recompute its aggregate score.
    pub fn record_verdicts(
        &mut self,
        id: NodeId,
        verdicts: impl IntoIterator<Item = JudgeVerdict>,
    ) -> DomainResult<AggregateScore> {
        let weight = self.coherence_weight;
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(DomainError::NodeNotFound(id.0))?;
        node.verdicts.extend(verdicts);
        node.score = aggregate(&node.verdicts, weight);
        Ok(node.score)
    }

    /// Bump a node's visit counter.
    pub fn record_visit(&mut self, id: NodeId) -> DomainResult<()> {
        self.nodes
            .get_mut(id.0)
            .ok_or(DomainError::NodeNotFound(id.0))?
            .visits += 1;
        Ok(())
    }

    /// Ids of all current leaves, in creation order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    /// The node with the highest adjusted score anywhere in the tree.
    /// Ties favor the earlier-created node.
    pub fn best_node(&self) -> NodeId {
        self.nodes
            .iter()
            .max_by(|a, b| {
                a.score
                    .adjusted
                    .partial_cmp(&b.score.adjusted)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // On equal score, prefer the earlier node: max_by keeps
                    // the later operand on Greater, so invert the id order.
                    .then(b.id.cmp(&a.id))
            })
            .map(|n| n.id)
            .unwrap_or(NodeId(0))
    }

    /// All nodes, in creation order. Retained for audit.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

// =========================================================================
// Tests
// =========================================================================
