use std::collections::HashMap;

use serde_json::Value;

use crate::display::*;
use crate::ids::{IdAllocator, SyntheticIds, edge_display_ids, node_display_ids};
use crate::lenient::{display_id_from, is_blank};
use crate::network::*;

/// Reconcile renderer state against the last known network document.
///
/// Upsert keyed by display id: matched entities get their `display` replaced,
/// unseen ones are appended with freshly allocated ids. Entities missing from
/// `display` are kept. Opaque domain fields are copied through untouched.
pub fn display_to_network(display: &DisplayDocument, base: &NetworkDocument) -> NetworkDocument {
    let mut network = base.clone();
    let nodes_before = network.nodes.len();
    let edges_before = network.edges.len();

    let node_index = reconcile_nodes(&mut network, &display.elements.nodes);
    reconcile_edges(&mut network, &display.elements.edges, &node_index);

    network.zoom = Some(display.zoom.or(base.zoom).unwrap_or(DEFAULT_ZOOM));
    network.pan = Some(display.pan.or(base.pan).unwrap_or_default());

    tracing::debug!(
        nodes = network.nodes.len(),
        new_nodes = network.nodes.len() - nodes_before,
        edges = network.edges.len(),
        new_edges = network.edges.len() - edges_before,
        "reconciled display into network"
    );
    network
}

fn reconcile_nodes(
    network: &mut NetworkDocument,
    elements: &[DisplayElement],
) -> HashMap<String, usize> {
    let mut ids = SyntheticIds::default();
    let assigned = node_display_ids(&network.nodes, &mut ids);

    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, (node, id)) in network.nodes.iter_mut().zip(assigned).enumerate() {
        node.display.id = Some(id.clone());
        node.display.position = Some(node.display.position.unwrap_or_default());
        index.insert(id, i);
    }

    let incoming: Vec<Option<String>> = elements.iter().map(DisplayElement::id).collect();
    ids.reserve_all(incoming.iter().flatten());
    let mut allocator = IdAllocator::new(network.nodes.iter().filter_map(|n| n.node_id));

    for (element, id) in elements.iter().zip(incoming) {
        let display_id = id.unwrap_or_else(|| ids.fresh("node"));
        let i = match index.get(&display_id) {
            Some(&i) => i,
            None => {
                network.nodes.push(NetworkNode::new(allocator.next_id()));
                let i = network.nodes.len() - 1;
                index.insert(display_id.clone(), i);
                i
            }
        };

        let node = &mut network.nodes[i];
        node.display = node_display(element, display_id);
        let node_id = *node.node_id.get_or_insert_with(|| allocator.next_id());
        match node.display.attr_str("name").filter(|name| !name.is_empty()) {
            Some(name) => node.node_name = Some(Value::from(name)),
            None if is_blank(node.node_name.as_ref()) => {
                node.node_name = Some(Value::from(default_node_name(node_id)));
            }
            None => {}
        }
    }
    index
}

fn reconcile_edges(
    network: &mut NetworkDocument,
    elements: &[DisplayElement],
    node_index: &HashMap<String, usize>,
) {
    let mut ids = SyntheticIds::default();
    let assigned = edge_display_ids(&network.edges, &mut ids);

    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, (edge, id)) in network.edges.iter_mut().zip(assigned).enumerate() {
        edge.display.data.insert("id".to_string(), Value::from(id.as_str()));
        edge.display.position = Some(edge.display.position.unwrap_or_default());
        index.insert(id, i);
    }

    let incoming: Vec<Option<String>> = elements.iter().map(DisplayElement::id).collect();
    ids.reserve_all(incoming.iter().flatten());
    let mut allocator = IdAllocator::new(network.edges.iter().filter_map(|e| e.edge_id));

    let resolve = |nodes: &[NetworkNode], reference: Option<&Value>| {
        let display_id = reference.and_then(display_id_from)?;
        node_index.get(&display_id).and_then(|&i| nodes[i].node_id)
    };

    for (element, id) in elements.iter().zip(incoming) {
        let display_id = id.unwrap_or_else(|| ids.fresh("edge"));
        let src = resolve(network.nodes.as_slice(), element.data.get("source"));
        let dst = resolve(network.nodes.as_slice(), element.data.get("target"));

        let i = match index.get(&display_id) {
            Some(&i) => i,
            None => {
                network.edges.push(NetworkEdge::new(allocator.next_id()));
                let i = network.edges.len() - 1;
                index.insert(display_id.clone(), i);
                i
            }
        };

        let edge = &mut network.edges[i];
        edge.display = edge_display(element, display_id);
        edge.edge_id.get_or_insert_with(|| allocator.next_id());
        // An unresolved endpoint keeps whatever link the edge already had.
        if src.is_some() {
            edge.src_node_id = src;
        }
        if dst.is_some() {
            edge.dst_node_id = dst;
        }
    }
}

fn node_display(element: &DisplayElement, display_id: String) -> NodeDisplay {
    NodeDisplay {
        id: Some(display_id),
        attrs: element
            .data
            .iter()
            .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "position")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        position: Some(element.position),
    }
}

fn edge_display(element: &DisplayElement, display_id: String) -> EdgeDisplay {
    let mut data = element.data.clone();
    data.insert("id".to_string(), Value::from(display_id));
    if is_blank(data.get("lineType")) {
        data.insert("lineType".to_string(), Value::from(DEFAULT_LINE_TYPE));
    }
    EdgeDisplay {
        data,
        position: Some(element.position),
        extra: element.extra.clone(),
    }
}
