//! Core type definitions for stream network processing
//!
//! This module contains the fundamental value types used throughout the crate:
//! points, input lines, node types, and topology labels.

use std::fmt;
use std::str::FromStr;

/// Identifier of a node inside a [`NodeStore`](super::NodeStore)
///
/// Ids are dense and assigned in creation order starting at 0, so an id is
/// also the node's index in the store.
pub type NodeId = usize;

/// An immutable 2D coordinate in the input's coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point (no square root taken)
    pub fn sqr_dist(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns true if both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A polyline feature from the stream network
///
/// Only the first and last vertices are consumed; interior vertices are
/// carried along but ignored by node extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Identifier supplied by the caller (foreign key, not required to be unique)
    pub id: i64,
    /// Ordered vertices of the line
    pub points: Vec<Point>,
}

impl Line {
    /// Create a new line from any collection of points
    pub fn new(id: i64, points: impl IntoIterator<Item = impl Into<Point>>) -> Self {
        Self {
            id,
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    /// First vertex, if any
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last vertex, if any
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }
}

/// Directional role of a line endpoint
///
/// Purely positional: the first vertex of a line is `Upstream`, the last is
/// `Downstream`. No flow computation is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// First vertex of a line
    Upstream,
    /// Last vertex of a line
    Downstream,
}

impl NodeType {
    pub fn is_upstream(&self) -> bool {
        matches!(self, NodeType::Upstream)
    }

    pub fn is_downstream(&self) -> bool {
        matches!(self, NodeType::Downstream)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Upstream => write!(f, "upstream"),
            NodeType::Downstream => write!(f, "downstream"),
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upstream" => Ok(NodeType::Upstream),
            "downstream" => Ok(NodeType::Downstream),
            _ => Err(format!("Unknown node type: {}", s)),
        }
    }
}

/// Topology labels derived from a node's up/down neighbor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Source: no upstream group, at least one downstream
    Well,
    /// At least one upstream, no downstream
    Sink,
    /// At least one upstream, more than one downstream
    Branch,
    /// More than one upstream, at least one downstream
    Confluence,
    /// Exactly one upstream and one downstream
    Pseudo,
    /// Watershed junction
    Watershed,
}

impl Label {
    /// All labels in attribute order
    pub const ALL: [Label; 6] = [
        Label::Well,
        Label::Sink,
        Label::Branch,
        Label::Confluence,
        Label::Pseudo,
        Label::Watershed,
    ];

    /// Attribute name written to the output for this label
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Label::Well => "well",
            Label::Sink => "sink",
            Label::Branch => "branch",
            Label::Confluence => "confluence",
            Label::Pseudo => "pseudo",
            Label::Watershed => "watershed",
        }
    }

    /// Position of this label in [`Label::ALL`]
    pub(crate) fn index(&self) -> usize {
        match self {
            Label::Well => 0,
            Label::Sink => 1,
            Label::Branch => 2,
            Label::Confluence => 3,
            Label::Pseudo => 4,
            Label::Watershed => 5,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}
