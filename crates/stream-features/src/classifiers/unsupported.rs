//! Identify operations that are declared but not built
//!
//! These fail with `NotSupported` so callers can tell "not implemented"
//! apart from a computed false.

use super::{Classifier, FeatureKind};
use crate::core::{FeatureError, NodeStore, Result};

/// Detection of lines that cross themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfIntersectionDetector;

impl Classifier for SelfIntersectionDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::SelfIntersection
    }

    fn classify(&self, _store: &mut NodeStore) -> Result<usize> {
        Err(FeatureError::not_supported(self.name()))
    }
}

/// Detection of segment midpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentCenterDetector;

impl Classifier for SegmentCenterDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::SegmentCenter
    }

    fn classify(&self, _store: &mut NodeStore) -> Result<usize> {
        Err(FeatureError::not_supported(self.name()))
    }
}
