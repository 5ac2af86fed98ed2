//! Pipeline for coordinating a full analysis run
//!
//! The pipeline moves one snapshot of line data through every stage:
//! Extractor → Node Store → Association → Classifiers

use tracing::{debug, info, span, Level};

use crate::classifiers::{identify, FeatureKind};
use crate::core::{associate, extract_nodes, AnalysisConfig, Line, NodeStore, Result};

/// Runs extraction, association, and the configured classifiers in order
///
/// Any stage error aborts the run and is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Identify operations this pipeline will run, in order
    pub fn features(&self) -> &[FeatureKind] {
        &self.config.features
    }

    /// Process lines through the complete pipeline
    pub fn run(&self, lines: &[Line]) -> Result<NodeStore> {
        let pipeline_span = span!(
            Level::INFO,
            "pipeline",
            line_count = lines.len(),
            feature_count = self.config.features.len()
        );
        let _enter = pipeline_span.enter();

        info!("Starting stream feature pipeline");

        let mut store = extract_nodes(lines)?;
        associate(&mut store, &self.config.association)?;

        for kind in &self.config.features {
            let flagged = identify(&mut store, *kind)?;
            debug!(feature = kind.name(), flagged, "Pipeline stage completed");
        }

        info!(node_count = store.len(), "Pipeline completed successfully");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AssociationConfig, FeatureError, Label};

    fn chain() -> Vec<Line> {
        vec![
            Line::new(1, [(0.0, 0.0), (10.0, 0.0)]),
            Line::new(2, [(10.0, 0.0), (20.0, 0.0)]),
        ]
    }

    #[test]
    fn test_pipeline_default() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.features().len(), 6);
        assert_eq!(pipeline.config().association.squared_distance_threshold, 5.0);
    }

    #[test]
    fn test_pipeline_runs_all_labels() {
        let store = Pipeline::default().run(&chain()).unwrap();
        assert_eq!(store.len(), 4);
        for node in store.iter() {
            assert_eq!(node.labels().count(), 6);
        }
        assert_eq!(store.nodes_with(Label::Sink), vec![0]);
        assert_eq!(store.nodes_with(Label::Pseudo), vec![1, 2]);
        assert_eq!(store.nodes_with(Label::Well), vec![3]);
    }

    #[test]
    fn test_pipeline_subset_of_features() {
        let config = AnalysisConfig::new(AssociationConfig::new(1.0))
            .with_features([FeatureKind::Well]);
        let store = Pipeline::new(config).run(&chain()).unwrap();
        assert_eq!(store.nodes()[3].label(Label::Well), Some(true));
        assert_eq!(store.nodes()[3].label(Label::Sink), None);
    }

    #[test]
    fn test_pipeline_propagates_not_supported() {
        let config = AnalysisConfig::default().with_features([FeatureKind::SegmentCenter]);
        let result = Pipeline::new(config).run(&chain());
        assert_eq!(result, Err(FeatureError::not_supported("segment-center")));
    }

    #[test]
    fn test_pipeline_propagates_malformed_geometry() {
        let lines = vec![Line::new(1, [(0.0, 0.0)])];
        let result = Pipeline::default().run(&lines);
        assert!(matches!(result, Err(FeatureError::MalformedGeometry { .. })));
    }
}
