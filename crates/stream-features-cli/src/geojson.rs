//! GeoJSON reading and writing for line layers and node tables

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use stream_features::{format_id_list, Label, Line, NodeStore, Point};

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Parse a FeatureCollection of LineString features into lines
///
/// The line id is read from `properties[id_field]`, which may be an integer
/// or a string holding one. Features without that property take their
/// position in the collection as id.
pub fn parse_lines(content: &str, id_field: &str) -> Result<Vec<Line>> {
    let collection: RawCollection =
        serde_json::from_str(content).context("Input is not valid GeoJSON")?;
    if collection.kind != "FeatureCollection" {
        bail!("Expected a FeatureCollection, found {}", collection.kind);
    }

    collection
        .features
        .iter()
        .enumerate()
        .map(|(position, feature)| parse_feature(position, feature, id_field))
        .collect()
}

fn parse_feature(position: usize, feature: &RawFeature, id_field: &str) -> Result<Line> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| anyhow!("Feature {} has no geometry", position))?;
    if geometry.kind != "LineString" {
        bail!(
            "Not a line layer: feature {} has {} geometry",
            position,
            geometry.kind
        );
    }

    let id = match feature.properties.as_ref().and_then(|p| p.get(id_field)) {
        Some(value) => parse_id(value)
            .ok_or_else(|| anyhow!("Feature {}: '{}' is not an integer id", position, id_field))?,
        None => {
            debug!(position, id_field, "Line id missing, using feature position");
            position as i64
        }
    };

    let vertices = geometry
        .coordinates
        .as_array()
        .ok_or_else(|| anyhow!("Feature {}: coordinates must be an array", position))?;
    let points = vertices
        .iter()
        .map(|vertex| {
            parse_point(vertex)
                .ok_or_else(|| anyhow!("Feature {}: bad coordinate {}", position, vertex))
        })
        .collect::<Result<Vec<Point>>>()?;

    Ok(Line { id, points })
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_point(vertex: &Value) -> Option<Point> {
    // Any third ordinate (elevation) is ignored.
    let ordinates = vertex.as_array()?;
    let x = ordinates.first()?.as_f64()?;
    let y = ordinates.get(1)?.as_f64()?;
    Some(Point::new(x, y))
}

/// Output properties for one node, in field order
#[derive(Debug, Serialize)]
struct NodeProperties {
    id: usize,
    line_id: i64,
    node_type: String,
    up_nodes: Option<String>,
    down_nodes: Option<String>,
    up_num: Option<usize>,
    down_num: Option<usize>,
    #[serde(flatten)]
    labels: Map<String, Value>,
}

/// Render the store as a point FeatureCollection
///
/// Each computed label becomes a `0`/`1` property named after the label.
pub fn nodes_to_geojson(store: &NodeStore) -> Result<String> {
    let features = store
        .iter()
        .map(|node| -> Result<Value> {
            let labels = node
                .labels()
                .map(|(label, value)| {
                    (label.attribute_name().to_string(), json!(u8::from(value)))
                })
                .collect();
            let properties = NodeProperties {
                id: node.id(),
                line_id: node.line_id(),
                node_type: node.node_type().to_string(),
                up_nodes: node.up_nodes().map(format_id_list),
                down_nodes: node.down_nodes().map(format_id_list),
                up_num: node.up_count(),
                down_num: node.down_count(),
                labels,
            };
            let location = node.location();
            Ok(json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [location.x, location.y],
                },
                "properties": serde_json::to_value(properties)?,
            }))
        })
        .collect::<Result<Vec<Value>>>()?;

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    Ok(serde_json::to_string_pretty(&collection)?)
}

/// Render the store as a plain text table
pub fn nodes_to_table(store: &NodeStore) -> String {
    let mut out =
        String::from("id\tline_id\tnode_type\tx\ty\tup_nodes\tdown_nodes\tup_num\tdown_num");
    for label in Label::ALL {
        out.push('\t');
        out.push_str(label.attribute_name());
    }
    out.push('\n');

    for node in store.iter() {
        let location = node.location();
        let count = |value: Option<usize>| value.map(|v| v.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            node.id(),
            node.line_id(),
            node.node_type(),
            location.x,
            location.y,
            node.up_nodes().map(format_id_list).unwrap_or_default(),
            node.down_nodes().map(format_id_list).unwrap_or_default(),
            count(node.up_count()),
            count(node.down_count()),
        ));
        for label in Label::ALL {
            out.push('\t');
            if let Some(value) = node.label(label) {
                out.push_str(if value { "1" } else { "0" });
            }
        }
        out.push('\n');
    }
    out
}
