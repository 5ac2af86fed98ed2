//! Topology classifiers
//!
//! Each identify operation is a separate [`Classifier`] that reads a node's
//! `(up_count, down_count)` pair and writes one label. Classifiers require
//! association data, are idempotent, and commute with each other.

mod topology;
mod unsupported;

pub use topology::*;
pub use unsupported::*;

use std::fmt;
use std::str::FromStr;

use tracing::{info, span, Level};

use crate::core::{Label, NodeStore, Result};

/// Identify operations that can be requested on a node store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Well,
    Sink,
    Branch,
    Confluence,
    PseudoNode,
    Watershed,
    /// Declared but not implemented; always fails with `NotSupported`
    SelfIntersection,
    /// Declared but not implemented; always fails with `NotSupported`
    SegmentCenter,
}

impl FeatureKind {
    /// The six label-producing classifiers
    pub const TOPOLOGY: [FeatureKind; 6] = [
        FeatureKind::Well,
        FeatureKind::Sink,
        FeatureKind::Branch,
        FeatureKind::Confluence,
        FeatureKind::PseudoNode,
        FeatureKind::Watershed,
    ];

    /// Every identify operation, supported or not
    pub const ALL: [FeatureKind; 8] = [
        FeatureKind::Well,
        FeatureKind::Sink,
        FeatureKind::Branch,
        FeatureKind::Confluence,
        FeatureKind::PseudoNode,
        FeatureKind::Watershed,
        FeatureKind::SelfIntersection,
        FeatureKind::SegmentCenter,
    ];

    /// Label written by this operation, if it writes one
    pub fn label(&self) -> Option<Label> {
        match self {
            FeatureKind::Well => Some(Label::Well),
            FeatureKind::Sink => Some(Label::Sink),
            FeatureKind::Branch => Some(Label::Branch),
            FeatureKind::Confluence => Some(Label::Confluence),
            FeatureKind::PseudoNode => Some(Label::Pseudo),
            FeatureKind::Watershed => Some(Label::Watershed),
            FeatureKind::SelfIntersection | FeatureKind::SegmentCenter => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Well => "well",
            FeatureKind::Sink => "sink",
            FeatureKind::Branch => "branch",
            FeatureKind::Confluence => "confluence",
            FeatureKind::PseudoNode => "pseudo",
            FeatureKind::Watershed => "watershed",
            FeatureKind::SelfIntersection => "self-intersection",
            FeatureKind::SegmentCenter => "segment-center",
        }
    }

    /// One-line description of the condition this operation checks
    pub fn description(&self) -> &'static str {
        match self {
            FeatureKind::Well => "up_count == 0 and down_count > 0",
            FeatureKind::Sink => "up_count > 0 and down_count == 0",
            FeatureKind::Branch => "up_count > 0 and down_count > 1",
            FeatureKind::Confluence => "up_count > 1 and down_count > 0",
            FeatureKind::PseudoNode => "up_count == 1 and down_count == 1",
            FeatureKind::Watershed => "up_count > 0 and down_count > 1",
            FeatureKind::SelfIntersection => "lines crossing themselves",
            FeatureKind::SegmentCenter => "midpoints of line segments",
        }
    }

    pub fn is_supported(&self) -> bool {
        self.label().is_some()
    }

    /// Build the classifier implementing this operation
    pub fn classifier(&self) -> Box<dyn Classifier> {
        match self {
            FeatureKind::Well => Box::new(TopologyClassifier::new(Label::Well)),
            FeatureKind::Sink => Box::new(TopologyClassifier::new(Label::Sink)),
            FeatureKind::Branch => Box::new(TopologyClassifier::new(Label::Branch)),
            FeatureKind::Confluence => Box::new(TopologyClassifier::new(Label::Confluence)),
            FeatureKind::PseudoNode => Box::new(TopologyClassifier::new(Label::Pseudo)),
            FeatureKind::Watershed => Box::new(TopologyClassifier::new(Label::Watershed)),
            FeatureKind::SelfIntersection => Box::new(SelfIntersectionDetector),
            FeatureKind::SegmentCenter => Box::new(SegmentCenterDetector),
        }
    }
}

impl From<Label> for FeatureKind {
    fn from(label: Label) -> Self {
        match label {
            Label::Well => FeatureKind::Well,
            Label::Sink => FeatureKind::Sink,
            Label::Branch => FeatureKind::Branch,
            Label::Confluence => FeatureKind::Confluence,
            Label::Pseudo => FeatureKind::PseudoNode,
            Label::Watershed => FeatureKind::Watershed,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "well" | "wells" => Ok(FeatureKind::Well),
            "sink" | "sinks" => Ok(FeatureKind::Sink),
            "branch" | "branches" => Ok(FeatureKind::Branch),
            "confluence" | "confluences" => Ok(FeatureKind::Confluence),
            "pseudo" | "pseudo-node" | "pseudo-nodes" => Ok(FeatureKind::PseudoNode),
            "watershed" | "watersheds" => Ok(FeatureKind::Watershed),
            "self-intersection" | "self-intersections" => Ok(FeatureKind::SelfIntersection),
            "segment-center" | "segment-centers" => Ok(FeatureKind::SegmentCenter),
            _ => Err(format!("Unknown feature: {}", s)),
        }
    }
}

/// Core trait for identify operations over an associated node store
pub trait Classifier: Send + Sync {
    /// The operation this classifier implements
    fn kind(&self) -> FeatureKind;

    /// Write this classifier's label on every node
    ///
    /// Returns the number of nodes flagged true.
    fn classify(&self, store: &mut NodeStore) -> Result<usize>;

    /// Get the name of this classifier
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Run one identify operation on the store
///
/// # Example
/// ```rust
/// use stream_features::prelude::*;
///
/// let lines = vec![Line::new(1, [(0.0, 0.0), (10.0, 0.0)])];
/// let mut store = extract_nodes(&lines).unwrap();
/// assert!(identify(&mut store, FeatureKind::Well).is_err());
///
/// associate(&mut store, &AssociationConfig::new(1.0)).unwrap();
/// assert_eq!(identify(&mut store, FeatureKind::Well).unwrap(), 1);
/// ```
pub fn identify(store: &mut NodeStore, kind: FeatureKind) -> Result<usize> {
    let classify_span = span!(Level::INFO, "identify", feature = kind.name());
    let _enter = classify_span.enter();

    let flagged = kind.classifier().classify(store)?;
    info!(feature = kind.name(), flagged, "Identify completed");
    Ok(flagged)
}
