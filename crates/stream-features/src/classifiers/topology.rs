//! Label predicates over a node's (up_count, down_count) pair
//!
//! Each predicate is defined on its own even where two conditions currently
//! coincide (branch and watershed).

use tracing::debug;

use super::{Classifier, FeatureKind};
use crate::core::{Label, NodeStore, Result};

/// No upstream group, at least one downstream node
pub fn is_well(up_count: usize, down_count: usize) -> bool {
    up_count == 0 && down_count > 0
}

/// At least one upstream node, no downstream group
pub fn is_sink(up_count: usize, down_count: usize) -> bool {
    up_count > 0 && down_count == 0
}

/// At least one upstream node and more than one downstream node
pub fn is_branch(up_count: usize, down_count: usize) -> bool {
    up_count > 0 && down_count > 1
}

/// More than one upstream node and at least one downstream node
pub fn is_confluence(up_count: usize, down_count: usize) -> bool {
    up_count > 1 && down_count > 0
}

/// Exactly one upstream and one downstream node
pub fn is_pseudo_node(up_count: usize, down_count: usize) -> bool {
    up_count == 1 && down_count == 1
}

// TODO(topology): confirm the intended watershed condition with domain users;
// it currently matches is_branch.
/// At least one upstream node and more than one downstream node
pub fn is_watershed(up_count: usize, down_count: usize) -> bool {
    up_count > 0 && down_count > 1
}

/// Predicate deciding `label`
pub fn predicate(label: Label) -> fn(usize, usize) -> bool {
    match label {
        Label::Well => is_well,
        Label::Sink => is_sink,
        Label::Branch => is_branch,
        Label::Confluence => is_confluence,
        Label::Pseudo => is_pseudo_node,
        Label::Watershed => is_watershed,
    }
}

/// Classifier writing one topology label on every node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyClassifier {
    label: Label,
}

impl TopologyClassifier {
    pub fn new(label: Label) -> Self {
        Self { label }
    }

    pub fn label(&self) -> Label {
        self.label
    }
}

impl Classifier for TopologyClassifier {
    fn kind(&self) -> FeatureKind {
        FeatureKind::from(self.label)
    }

    fn classify(&self, store: &mut NodeStore) -> Result<usize> {
        let flagged = store.apply_label(self.label)?;
        debug!(label = %self.label, flagged, node_count = store.len(), "Classified nodes");
        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{associate, extract_nodes, AssociationConfig, FeatureError, Line};

    #[test]
    fn test_predicate_table() {
        // (up, down) -> [well, sink, branch, confluence, pseudo, watershed]
        let cases = [
            ((0, 1), [true, false, false, false, false, false]),
            ((1, 0), [false, true, false, false, false, false]),
            ((1, 1), [false, false, false, false, true, false]),
            ((1, 2), [false, false, true, false, false, true]),
            ((2, 1), [false, false, false, true, false, false]),
            ((3, 3), [false, false, true, true, false, true]),
            ((0, 0), [false, false, false, false, false, false]),
            ((0, 4), [true, false, false, false, false, false]),
        ];
        for ((up, down), expected) in cases {
            let actual: Vec<bool> = Label::ALL
                .iter()
                .map(|label| predicate(*label)(up, down))
                .collect();
            assert_eq!(actual, expected, "up={up} down={down}");
        }
    }

    #[test]
    fn test_branch_and_watershed_currently_agree() {
        let branch: fn(usize, usize) -> bool = is_branch;
        let watershed: fn(usize, usize) -> bool = is_watershed;
        for up in 0..4 {
            for down in 0..4 {
                assert_eq!(branch(up, down), watershed(up, down));
            }
        }
        assert_eq!(
            TopologyClassifier::new(Label::Watershed).kind(),
            FeatureKind::Watershed
        );
        assert_eq!(
            TopologyClassifier::new(Label::Branch).kind(),
            FeatureKind::Branch
        );
    }

    #[test]
    fn test_classify_before_association_fails() {
        let mut store = extract_nodes(&[Line::new(1, [(0.0, 0.0), (1.0, 0.0)])]).unwrap();
        let result = TopologyClassifier::new(Label::Sink).classify(&mut store);
        assert_eq!(result, Err(FeatureError::missing_association("sink")));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut store = extract_nodes(&[
            Line::new(1, [(0.0, 0.0), (5.0, 0.0)]),
            Line::new(2, [(5.0, 0.0), (9.0, 0.0)]),
        ])
        .unwrap();
        associate(&mut store, &AssociationConfig::new(0.5)).unwrap();

        let classifier = TopologyClassifier::new(Label::Pseudo);
        let first = classifier.classify(&mut store).unwrap();
        let after_first = store.clone();
        let second = classifier.classify(&mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store, after_first);
        assert_eq!(store.nodes_with(Label::Pseudo), vec![1, 2]);
    }
}
