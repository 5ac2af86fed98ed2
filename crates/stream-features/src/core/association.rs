//! Association engine
//!
//! For every node (the "center") finds all other nodes within the squared
//! distance threshold and splits them by their own type. Results for all
//! centers are computed first and committed to the store in one batch, so no
//! caller can observe a partially associated store.

use rayon::prelude::*;
use tracing::{debug, info, span, trace, Level};

use super::{
    Association, AssociationConfig, BruteForceIndex, FeatureError, GridIndex, IndexStrategy,
    NodeId, NodeStore, Point, ProximityIndex, Result,
};

/// Populate `up_nodes`, `down_nodes`, `up_count`, and `down_count` for every node
///
/// Fails with `InvalidConfig` for a non-finite threshold and with
/// `AlreadyAssociated` if the store already carries association data. On
/// failure the store is left untouched.
///
/// # Example
/// ```rust
/// use stream_features::{associate, extract_nodes, AssociationConfig, Line};
///
/// let lines = vec![
///     Line::new(1, [(0.0, 0.0), (10.0, 0.0)]),
///     Line::new(2, [(10.0, 0.0), (20.0, 0.0)]),
/// ];
/// let mut store = extract_nodes(&lines).unwrap();
/// associate(&mut store, &AssociationConfig::new(1.0)).unwrap();
///
/// let joint = &store.nodes()[1];
/// assert_eq!(joint.up_nodes(), Some(&[2][..]));
/// assert_eq!(joint.up_count(), Some(1));
/// assert_eq!(joint.down_count(), Some(1));
/// ```
pub fn associate(store: &mut NodeStore, config: &AssociationConfig) -> Result<()> {
    let associate_span = span!(
        Level::INFO,
        "associate",
        node_count = store.len(),
        threshold = config.squared_distance_threshold,
        strategy = %config.strategy,
        parallel = config.parallel
    );
    let _enter = associate_span.enter();

    config.validate()?;
    if store.is_associated() {
        return Err(FeatureError::AlreadyAssociated);
    }

    let locations = store.locations();
    let index = build_index(&locations, config);
    debug!(index = index.name(), "Built proximity index");

    let view: &NodeStore = store;
    let associations: Vec<Association> = if config.parallel {
        (0..view.len())
            .into_par_iter()
            .map(|center| associate_center(view, index.as_ref(), center))
            .collect::<Result<_>>()?
    } else {
        (0..view.len())
            .map(|center| associate_center(view, index.as_ref(), center))
            .collect::<Result<_>>()?
    };

    store.commit_association(associations)?;
    info!("Association completed");
    Ok(())
}

/// Nearby nodes of one center, split into (upstream, downstream) ids
///
/// Both lists are ascending by id and never contain `center` itself. An
/// unknown center fails with `NodeNotFound` and a NaN or infinite threshold
/// with `InvalidConfig`, as in [`associate`].
pub fn nearby_nodes(
    store: &NodeStore,
    center: NodeId,
    squared_distance_threshold: f64,
) -> Result<(Vec<NodeId>, Vec<NodeId>)> {
    AssociationConfig::new(squared_distance_threshold).validate()?;
    store.node(center)?;
    let locations = store.locations();
    let index = BruteForceIndex::new(&locations, squared_distance_threshold);
    Ok(split_by_type(store, index.neighbors(center)?))
}

fn build_index<'a>(
    locations: &'a [Point],
    config: &AssociationConfig,
) -> Box<dyn ProximityIndex + 'a> {
    match config.strategy {
        IndexStrategy::BruteForce => Box::new(BruteForceIndex::new(
            locations,
            config.squared_distance_threshold,
        )),
        IndexStrategy::Grid => Box::new(GridIndex::new(
            locations,
            config.squared_distance_threshold,
        )),
    }
}

fn associate_center(
    store: &NodeStore,
    index: &dyn ProximityIndex,
    center: NodeId,
) -> Result<Association> {
    let node_type = store.node(center)?.node_type();
    let (up_nodes, down_nodes) = split_by_type(store, index.neighbors(center)?);
    trace!(
        center,
        up = up_nodes.len(),
        down = down_nodes.len(),
        "Associated center"
    );
    Ok(Association::new(node_type, up_nodes, down_nodes))
}

fn split_by_type(store: &NodeStore, neighbors: Vec<NodeId>) -> (Vec<NodeId>, Vec<NodeId>) {
    neighbors
        .into_iter()
        .partition(|&id| store.nodes()[id].node_type().is_upstream())
}
