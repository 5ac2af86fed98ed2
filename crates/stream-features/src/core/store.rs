//! In-memory node table
//!
//! The [`NodeStore`] is built once by the extractor, receives association data
//! in a single batch, and then collects topology labels. Extraction-time fields
//! are immutable, association fields are write-once, and each label can be
//! rewritten independently.

use tracing::{debug, trace};

use super::{FeatureError, Label, NodeId, NodeType, Point, Result};
use crate::classifiers::predicate;

/// Neighbor data computed for one node by the association engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    up_nodes: Vec<NodeId>,
    down_nodes: Vec<NodeId>,
    up_count: usize,
    down_count: usize,
}

impl Association {
    /// Build association data for a node of the given type
    ///
    /// Counts are derived from the lists, with the center's own type adding
    /// one to the matching count.
    pub fn new(node_type: NodeType, up_nodes: Vec<NodeId>, down_nodes: Vec<NodeId>) -> Self {
        let up_count = up_nodes.len() + usize::from(node_type.is_upstream());
        let down_count = down_nodes.len() + usize::from(node_type.is_downstream());
        Self {
            up_nodes,
            down_nodes,
            up_count,
            down_count,
        }
    }

    /// Nearby upstream-typed nodes, ascending by id
    pub fn up_nodes(&self) -> &[NodeId] {
        &self.up_nodes
    }

    /// Nearby downstream-typed nodes, ascending by id
    pub fn down_nodes(&self) -> &[NodeId] {
        &self.down_nodes
    }

    /// Size of the upstream group, including the node itself if upstream
    pub fn up_count(&self) -> usize {
        self.up_count
    }

    /// Size of the downstream group, including the node itself if downstream
    pub fn down_count(&self) -> usize {
        self.down_count
    }
}

/// A line endpoint with its derived attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    line_id: i64,
    node_type: NodeType,
    location: Point,
    association: Option<Association>,
    labels: [Option<bool>; 6],
}

impl Node {
    pub(crate) fn new(id: NodeId, line_id: i64, node_type: NodeType, location: Point) -> Self {
        Self {
            id,
            line_id,
            node_type,
            location,
            association: None,
            labels: [None; 6],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn line_id(&self) -> i64 {
        self.line_id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn location(&self) -> Point {
        self.location
    }

    /// Association data, absent until the association engine has run
    pub fn association(&self) -> Option<&Association> {
        self.association.as_ref()
    }

    pub fn up_nodes(&self) -> Option<&[NodeId]> {
        self.association.as_ref().map(Association::up_nodes)
    }

    pub fn down_nodes(&self) -> Option<&[NodeId]> {
        self.association.as_ref().map(Association::down_nodes)
    }

    pub fn up_count(&self) -> Option<usize> {
        self.association.as_ref().map(Association::up_count)
    }

    pub fn down_count(&self) -> Option<usize> {
        self.association.as_ref().map(Association::down_count)
    }

    /// Value of a label, absent until its classifier has run
    pub fn label(&self, label: Label) -> Option<bool> {
        self.labels[label.index()]
    }

    /// Labels that have been computed, with their values
    pub fn labels(&self) -> impl Iterator<Item = (Label, bool)> + '_ {
        Label::ALL
            .iter()
            .filter_map(move |label| self.label(*label).map(|value| (*label, value)))
    }
}

/// Table of nodes produced by one extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStore {
    nodes: Vec<Node>,
    associated: bool,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            associated: false,
        }
    }

    /// Append a node, assigning the next id
    pub(crate) fn push(&mut self, line_id: i64, node_type: NodeType, location: Point) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, line_id, node_type, location));
        id
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node by id, failing with `NodeNotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or_else(|| FeatureError::node_not_found(id))
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Node locations in id order
    pub fn locations(&self) -> Vec<Point> {
        self.nodes.iter().map(Node::location).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True once association data has been committed
    ///
    /// An empty store counts as associated only after a commit, so classifiers
    /// still refuse to run on a freshly extracted empty store.
    pub fn is_associated(&self) -> bool {
        self.associated
    }

    /// Fail with `MissingAssociationData` unless association has been committed
    pub fn check_associated(&self, feature: &str) -> Result<()> {
        if self.is_associated() {
            Ok(())
        } else {
            Err(FeatureError::missing_association(feature))
        }
    }

    /// Commit association data for every node in one batch
    ///
    /// `associations` must hold exactly one entry per node in id order.
    pub(crate) fn commit_association(&mut self, associations: Vec<Association>) -> Result<()> {
        if self.is_associated() {
            return Err(FeatureError::AlreadyAssociated);
        }
        if associations.len() != self.nodes.len() {
            return Err(FeatureError::BatchSizeMismatch {
                expected: self.nodes.len(),
                actual: associations.len(),
            });
        }

        for (node, association) in self.nodes.iter_mut().zip(associations) {
            node.association = Some(association);
        }
        self.associated = true;
        debug!(node_count = self.nodes.len(), "Committed association data");
        Ok(())
    }

    /// Write `label` on every node from its topology predicate
    ///
    /// Nothing is written when association data is missing. Returns the number
    /// of nodes flagged true.
    pub fn apply_label(&mut self, label: Label) -> Result<usize> {
        self.check_associated(label.attribute_name())?;
        let decide = predicate(label);

        let values = self
            .nodes
            .iter()
            .map(|node| {
                node.association
                    .as_ref()
                    .map(|association| decide(association.up_count, association.down_count))
                    .ok_or_else(|| FeatureError::missing_association(label.attribute_name()))
            })
            .collect::<Result<Vec<bool>>>()?;

        let mut flagged = 0;
        for (node, value) in self.nodes.iter_mut().zip(values) {
            trace!(node_id = node.id, %label, value, "Labelled node");
            node.labels[label.index()] = Some(value);
            flagged += usize::from(value);
        }
        Ok(flagged)
    }

    /// Ids of nodes where `label` is set to true
    pub fn nodes_with(&self, label: Label) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.label(label) == Some(true))
            .map(Node::id)
            .collect()
    }
}

/// Render a list of node ids as comma-separated text, empty for no ids
pub fn format_id_list(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
