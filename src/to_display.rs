use std::collections::HashMap;

use serde_json::Value;

use crate::display::*;
use crate::ids::{SyntheticIds, edge_display_ids, node_display_ids};
use crate::lenient::is_blank;
use crate::network::*;

/// Project a network document into the renderer's display document.
///
/// Total: missing fields are defaulted, never rejected. Opaque domain fields
/// are not read.
pub fn network_to_display(network: &NetworkDocument) -> DisplayDocument {
    let node_ids = node_display_ids(&network.nodes, &mut SyntheticIds::default());

    // Edges reference nodes by node_id only.
    let mut display_ids: HashMap<i64, &str> = HashMap::new();
    let mut nodes = Vec::with_capacity(network.nodes.len());
    for (node, id) in network.nodes.iter().zip(&node_ids) {
        if let Some(node_id) = node.node_id {
            display_ids.insert(node_id, id);
        }
        nodes.push(node_element(node, id));
    }

    let edge_ids = edge_display_ids(&network.edges, &mut SyntheticIds::default());
    let edges = network
        .edges
        .iter()
        .zip(&edge_ids)
        .map(|(edge, id)| edge_element(edge, id, &display_ids))
        .collect();

    DisplayDocument {
        zoom: Some(network.zoom.unwrap_or(DEFAULT_ZOOM)),
        pan: Some(network.pan.unwrap_or_default()),
        elements: DisplayElements { nodes, edges },
    }
}

fn node_element(node: &NetworkNode, id: &str) -> DisplayElement {
    let mut element = DisplayElement::new(id, node.display.position.unwrap_or_default());
    element
        .data
        .extend(node.display.attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
    element
}

fn edge_element(edge: &NetworkEdge, id: &str, display_ids: &HashMap<i64, &str>) -> DisplayElement {
    let mut data = edge.display.data.clone();
    data.insert("id".to_string(), Value::from(id));

    let endpoint = |node_id: i64| {
        display_ids
            .get(&node_id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| node_id.to_string())
    };
    if is_blank(data.get("source")) {
        if let Some(src) = edge.src_node_id {
            data.insert("source".to_string(), Value::from(endpoint(src)));
        }
    }
    if is_blank(data.get("target")) {
        if let Some(dst) = edge.dst_node_id {
            data.insert("target".to_string(), Value::from(endpoint(dst)));
        }
    }
    if is_blank(data.get("lineType")) {
        data.insert("lineType".to_string(), Value::from(DEFAULT_LINE_TYPE));
    }

    DisplayElement {
        data,
        position: edge.display.position.unwrap_or_default(),
        extra: edge.display.extra.clone(),
    }
}
