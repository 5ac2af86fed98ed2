//! Core error types for stream network processing
//!
//! Every failure of the extraction, association, and classification stages is
//! reported through [`FeatureError`]. Nothing is downgraded to default values.

use std::fmt;

use thiserror::Error;

use super::NodeId;

/// What made a line unusable for node extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryDefect {
    /// Fewer than two vertices
    TooFewVertices,
    /// First or last vertex has a NaN or infinite coordinate
    NonFiniteEndpoint,
}

impl fmt::Display for GeometryDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryDefect::TooFewVertices => write!(f, "need at least 2 vertices"),
            GeometryDefect::NonFiniteEndpoint => {
                write!(f, "an endpoint has a non-finite coordinate")
            }
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Core error types for stream feature extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Malformed geometry: line {line_id} (input position {position}, {vertex_count} vertices): {defect}")]
    MalformedGeometry {
        line_id: i64,
        position: usize,
        vertex_count: usize,
        defect: GeometryDefect,
    },

    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: NodeId },

    #[error("Missing association data: run association before identifying {feature}")]
    MissingAssociationData { feature: String },

    #[error("Not supported: {feature} detection is not implemented")]
    NotSupported { feature: String },

    #[error("Association data already present: association runs once per node store")]
    AlreadyAssociated,

    #[error("Association batch holds {actual} entries for {expected} nodes")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl FeatureError {
    /// Create a new malformed geometry error for a line with too few vertices
    pub fn malformed_geometry(line_id: i64, position: usize, vertex_count: usize) -> Self {
        Self::MalformedGeometry {
            line_id,
            position,
            vertex_count,
            defect: GeometryDefect::TooFewVertices,
        }
    }

    /// Create a new malformed geometry error for a non-finite endpoint
    pub fn non_finite_endpoint(line_id: i64, position: usize, vertex_count: usize) -> Self {
        Self::MalformedGeometry {
            line_id,
            position,
            vertex_count,
            defect: GeometryDefect::NonFiniteEndpoint,
        }
    }

    /// Create a new node not found error
    pub fn node_not_found(node_id: NodeId) -> Self {
        Self::NodeNotFound { node_id }
    }

    /// Create a new missing association data error
    pub fn missing_association(feature: impl Into<String>) -> Self {
        Self::MissingAssociationData {
            feature: feature.into(),
        }
    }

    /// Create a new not supported error
    pub fn not_supported(feature: impl Into<String>) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_geometry() {
        let error = FeatureError::malformed_geometry(42, 3, 1);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Malformed geometry"));
        assert!(error_msg.contains("line 42"));
        assert!(error_msg.contains("position 3"));
        assert!(error_msg.contains("1 vertices"));
        assert!(error_msg.contains("need at least 2 vertices"));
    }

    #[test]
    fn test_non_finite_endpoint() {
        let error = FeatureError::non_finite_endpoint(7, 0, 5);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("line 7"));
        assert!(error_msg.contains("5 vertices"));
        assert!(error_msg.contains("non-finite"));
        assert!(!error_msg.contains("need at least 2"));
    }

    #[test]
    fn test_batch_size_mismatch() {
        let error = FeatureError::BatchSizeMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Association batch holds 3 entries for 4 nodes"
        );
    }

    #[test]
    fn test_node_not_found() {
        let error = FeatureError::node_not_found(99);
        assert_eq!(error.to_string(), "Node not found: 99");
    }

    #[test]
    fn test_missing_association() {
        let error = FeatureError::missing_association("well");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Missing association data"));
        assert!(error_msg.contains("well"));
    }

    #[test]
    fn test_not_supported() {
        let error = FeatureError::not_supported("self-intersection");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Not supported"));
        assert!(error_msg.contains("self-intersection"));
    }

    #[test]
    fn test_invalid_config() {
        let error = FeatureError::invalid_config("threshold is NaN");
        assert!(error.to_string().contains("threshold is NaN"));
    }
}
