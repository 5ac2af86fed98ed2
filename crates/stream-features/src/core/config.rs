//! Configuration for association and full analysis runs

use std::fmt;
use std::str::FromStr;

use super::{FeatureError, Result};
use crate::classifiers::FeatureKind;

/// Squared distance threshold used when no other value is configured
pub const DEFAULT_SQUARED_DISTANCE_THRESHOLD: f64 = 5.0;

/// Spatial lookup used by the association engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum IndexStrategy {
    /// Scan every node for every center, O(N²)
    BruteForce,
    /// Uniform grid hash with cells one search radius wide
    #[default]
    Grid,
}

impl IndexStrategy {
    /// Get all valid strategy names
    pub fn variants() -> &'static [&'static str] {
        &["brute-force", "grid"]
    }
}

impl fmt::Display for IndexStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStrategy::BruteForce => write!(f, "brute-force"),
            IndexStrategy::Grid => write!(f, "grid"),
        }
    }
}

impl FromStr for IndexStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brute-force" | "bruteforce" | "naive" => Ok(IndexStrategy::BruteForce),
            "grid" => Ok(IndexStrategy::Grid),
            _ => Err(format!("Unknown index strategy: {}", s)),
        }
    }
}

/// Settings for the association engine
///
/// The threshold is always a *squared* distance, compared directly against
/// [`Point::sqr_dist`](super::Point::sqr_dist). Use
/// [`AssociationConfig::from_distance`] to configure a linear radius instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociationConfig {
    /// Maximum squared distance (inclusive) at which two nodes associate
    pub squared_distance_threshold: f64,
    /// Spatial lookup used to find candidate neighbors
    pub strategy: IndexStrategy,
    /// Spread centers across the rayon thread pool
    pub parallel: bool,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            squared_distance_threshold: DEFAULT_SQUARED_DISTANCE_THRESHOLD,
            strategy: IndexStrategy::default(),
            parallel: false,
        }
    }
}

impl AssociationConfig {
    /// Create a config with the given squared distance threshold
    pub fn new(squared_distance_threshold: f64) -> Self {
        Self {
            squared_distance_threshold,
            ..Self::default()
        }
    }

    /// Create a config from a linear distance, squaring it
    pub fn from_distance(distance: f64) -> Self {
        Self::new(distance * distance)
    }

    /// Use a specific index strategy
    pub fn with_strategy(mut self, strategy: IndexStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable parallel association
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Linear search radius, or 0 for negative thresholds
    pub fn radius(&self) -> f64 {
        self.squared_distance_threshold.max(0.0).sqrt()
    }

    /// Reject thresholds no distance can be compared against
    pub fn validate(&self) -> Result<()> {
        if !self.squared_distance_threshold.is_finite() {
            return Err(FeatureError::invalid_config(format!(
                "squared distance threshold must be finite, got {}",
                self.squared_distance_threshold
            )));
        }
        Ok(())
    }
}

/// Settings for a full extract, associate, classify run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Association settings
    pub association: AssociationConfig,
    /// Identify operations to run after association, in order
    pub features: Vec<FeatureKind>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            association: AssociationConfig::default(),
            features: FeatureKind::TOPOLOGY.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Create a config running every topology classifier
    pub fn new(association: AssociationConfig) -> Self {
        Self {
            association,
            ..Self::default()
        }
    }

    /// Run only the given identify operations
    pub fn with_features(mut self, features: impl IntoIterator<Item = FeatureKind>) -> Self {
        self.features = features.into_iter().collect();
        self
    }
}
