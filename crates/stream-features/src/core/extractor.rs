//! Node extraction
//!
//! Reduces every line to its two endpoints. The first vertex becomes an
//! upstream node and the last vertex a downstream node.

use tracing::{debug, info, span, warn, Level};

use super::{FeatureError, Line, NodeStore, NodeType, Result};

/// Build a node store from lines in input order
///
/// For each line the upstream node is emitted before the downstream node, and
/// ids start at 0. Every line is validated before any node is created, so a
/// malformed line aborts the whole batch and no partial store is returned.
///
/// # Example
/// ```rust
/// use stream_features::{extract_nodes, Line, NodeType};
///
/// let lines = vec![Line::new(10, [(0.0, 0.0), (5.0, 0.0)])];
/// let store = extract_nodes(&lines).unwrap();
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.nodes()[0].node_type(), NodeType::Upstream);
/// assert_eq!(store.nodes()[1].line_id(), 10);
/// ```
pub fn extract_nodes(lines: &[Line]) -> Result<NodeStore> {
    let extract_span = span!(Level::INFO, "extract_nodes", line_count = lines.len());
    let _enter = extract_span.enter();

    let mut endpoints = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let (first, last) = match (line.first(), line.last()) {
            (Some(first), Some(last)) if line.vertex_count() >= 2 => (first, last),
            _ => {
                warn!(line_id = line.id, position, "Line has too few vertices");
                return Err(FeatureError::malformed_geometry(
                    line.id,
                    position,
                    line.vertex_count(),
                ));
            }
        };
        if !first.is_finite() || !last.is_finite() {
            warn!(line_id = line.id, position, "Line endpoint is not finite");
            return Err(FeatureError::non_finite_endpoint(
                line.id,
                position,
                line.vertex_count(),
            ));
        }
        endpoints.push((line.id, first, last));
    }

    let mut store = NodeStore::with_capacity(endpoints.len() * 2);
    for (line_id, first, last) in endpoints {
        store.push(line_id, NodeType::Upstream, first);
        store.push(line_id, NodeType::Downstream, last);
    }

    debug!(node_count = store.len(), "Extracted endpoint nodes");
    info!("Node extraction completed");
    Ok(store)
}
