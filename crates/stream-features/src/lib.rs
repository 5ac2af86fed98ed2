//! Stream Features - classify the endpoints of a stream line network
//!
//! Every line contributes an upstream node (its first vertex) and a downstream
//! node (its last vertex). The association engine finds, for every node, the
//! other nodes within a squared distance threshold and splits them by type.
//! Classifiers then label nodes as wells, sinks, branches, confluences,
//! pseudo-nodes, or watersheds from those counts.
//!
//! # Quick Start
//!
//! ```rust
//! use stream_features::{analyze, Label, Line};
//!
//! let lines = vec![
//!     Line::new(1, [(0.0, 0.0), (10.0, 0.0)]),
//!     Line::new(2, [(10.0, 0.0), (20.0, 0.0)]),
//! ];
//! let store = analyze(&lines, 1.0).unwrap();
//! assert_eq!(store.nodes_with(Label::Pseudo), vec![1, 2]);
//! ```
//!
//! # Advanced Usage
//!
//! For more control, run the stages individually:
//!
//! ```rust
//! use stream_features::prelude::*;
//!
//! let lines = vec![Line::new(1, [(0.0, 0.0), (10.0, 0.0)])];
//!
//! // Extract endpoint nodes
//! let mut store = extract_nodes(&lines).unwrap();
//! assert_eq!(store.len(), 2);
//!
//! // Associate with a linear radius of 2 map units (squared internally)
//! associate(&mut store, &AssociationConfig::from_distance(2.0)).unwrap();
//!
//! // Run only the classifiers you need
//! identify(&mut store, FeatureKind::Well).unwrap();
//! assert_eq!(store.nodes()[1].label(Label::Well), Some(true));
//! ```

pub mod classifiers;
pub mod core;
pub mod pipeline;

pub use crate::classifiers::{identify, Classifier, FeatureKind};
pub use crate::core::*;
pub use crate::pipeline::Pipeline;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classifiers::{identify, Classifier, FeatureKind, TopologyClassifier};
    pub use crate::core::{
        associate, extract_nodes, nearby_nodes, AnalysisConfig, Association, AssociationConfig,
        FeatureError, IndexStrategy, Label, Line, Node, NodeId, NodeStore, NodeType, Point,
    };
    pub use crate::pipeline::Pipeline;
}

/// Extract, associate, and run every topology classifier
///
/// `squared_distance_threshold` is compared against squared distances; pass
/// `d * d` for a linear radius `d`.
///
/// # Example
/// ```rust
/// use stream_features::{analyze, FeatureError, Line};
///
/// let bad = vec![Line::new(3, [(1.0, 1.0)])];
/// assert!(matches!(
///     analyze(&bad, 5.0),
///     Err(FeatureError::MalformedGeometry { line_id: 3, .. })
/// ));
/// ```
pub fn analyze(lines: &[Line], squared_distance_threshold: f64) -> Result<NodeStore> {
    let config = AnalysisConfig::new(AssociationConfig::new(squared_distance_threshold));
    Pipeline::new(config).run(lines)
}
