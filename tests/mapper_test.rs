use netview::display::Position;
use netview::{DisplayDocument, NetworkDocument, display_to_network, network_to_display};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn network(value: Value) -> NetworkDocument {
    serde_json::from_value(value).unwrap()
}

fn display(value: Value) -> DisplayDocument {
    serde_json::from_value(value).unwrap()
}

fn cache_node_network() -> NetworkDocument {
    network(json!({
        "nodes": [{
            "node_id": 1,
            "node_name": "Test Node",
            "node_features": ["feature1", "feature2"],
            "cache": {
                "capacity": 1024,
                "num_sets": 4,
                "replacement_policy": "LRU",
                "states": "MESI"
            },
            "display": {
                "id": "node-1",
                "type": "round-rectangle",
                "name": "Node 1",
                "width": 100,
                "height": 50,
                "position": { "x": 10, "y": 20 },
                "bg": "#1890FF"
            }
        }],
        "edges": [],
        "zoom": 0.7,
        "pan": { "x": 50, "y": 100 }
    }))
}

fn two_node_display() -> DisplayDocument {
    display(json!({
        "elements": {
            "nodes": [
                { "data": { "id": "n1", "type": "ellipse", "width": 50, "height": 50 }, "position": { "x": 0, "y": 0 } },
                { "data": { "id": "n2", "type": "ellipse", "width": 50, "height": 50 }, "position": { "x": 100, "y": 0 } }
            ],
            "edges": [{
                "data": { "id": "e1", "source": "n1", "target": "n2", "lineType": "bezier" },
                "position": { "x": 50, "y": 25 }
            }]
        }
    }))
}

// =============================================================================
// Network to display
// =============================================================================

#[test]
fn empty_network_projects_to_defaults() {
    let out = serde_json::to_value(network_to_display(&NetworkDocument::default())).unwrap();
    assert_eq!(
        out,
        json!({
            "zoom": 1.0,
            "pan": { "x": 0.0, "y": 0.0 },
            "elements": { "nodes": [], "edges": [] }
        })
    );
}

#[test]
fn nodes_project_display_fields() {
    let out = network_to_display(&cache_node_network());
    let node = &out.elements.nodes[0];
    assert_eq!(out.elements.nodes.len(), 1);
    assert_eq!(node.id().as_deref(), Some("node-1"));
    assert_eq!(node.attr_str("type"), Some("round-rectangle"));
    assert_eq!(node.attr_str("name"), Some("Node 1"));
    assert_eq!(node.position, Position::new(10.0, 20.0));
    assert!(!node.data.contains_key("position"));
    assert!(!node.data.contains_key("cache"), "domain fields never reach the renderer");
}

#[test]
fn edges_project_their_data() {
    let n = network(json!({
        "nodes": [
            { "node_id": 1, "display": { "id": "n1", "position": { "x": 0, "y": 0 } } },
            { "node_id": 2, "display": { "id": "n2", "position": { "x": 100, "y": 0 } } }
        ],
        "edges": [{
            "edge_id": 1, "src_node_id": 1, "dst_node_id": 2, "src_port_id": 0, "dst_port_id": 0,
            "packet_types": [],
            "display": { "data": { "id": "e1", "source": "n1", "target": "n2", "lineType": "bezier" }, "position": { "x": 50, "y": 25 } }
        }]
    }));
    let edge = &network_to_display(&n).elements.edges[0];
    assert_eq!(edge.id().as_deref(), Some("e1"));
    assert_eq!(edge.source().as_deref(), Some("n1"));
    assert_eq!(edge.target().as_deref(), Some("n2"));
}

#[test]
fn node_id_is_the_fallback_display_id() {
    let n = network(json!({ "nodes": [{ "node_id": 1, "display": { "type": "ellipse" } }] }));
    assert_eq!(network_to_display(&n).elements.nodes[0].id().as_deref(), Some("1"));
}

#[test]
fn nodes_without_any_id_get_distinct_display_ids() {
    let n = network(json!({ "nodes": [{ "display": {} }, { "display": {} }] }));
    let out = network_to_display(&n);
    let a = out.elements.nodes[0].id().unwrap();
    let b = out.elements.nodes[1].id().unwrap();
    assert_ne!(a, b);
}

#[test]
fn edge_endpoints_fill_from_node_ids() {
    let n = network(json!({
        "nodes": [
            { "node_id": 1, "display": { "id": "n1" } },
            { "node_id": 2, "display": { "id": "n2" } }
        ],
        "edges": [{ "edge_id": 5, "src_node_id": 1, "dst_node_id": 2, "display": {} }]
    }));
    let edge = &network_to_display(&n).elements.edges[0];
    assert_eq!(edge.id().as_deref(), Some("5"));
    assert_eq!(edge.source().as_deref(), Some("n1"));
    assert_eq!(edge.target().as_deref(), Some("n2"));
    assert_eq!(edge.attr_str("lineType"), Some("bezier"));
}

#[test]
fn zoom_and_pan_survive_projection() {
    let out = network_to_display(&network(json!({ "zoom": 0.5, "pan": { "x": 100, "y": 200 } })));
    assert_eq!(out.zoom, Some(0.5));
    assert_eq!(out.pan, Some(Position::new(100.0, 200.0)));
}

#[test]
fn malformed_fields_are_defaulted() {
    let n = network(json!({
        "nodes": "nope",
        "edges": [{ "edge_id": "x", "display": 7 }],
        "zoom": -3,
        "pan": "left"
    }));
    let out = network_to_display(&n);
    assert!(out.elements.nodes.is_empty());
    assert_eq!(out.elements.edges.len(), 1);
    assert_eq!(out.zoom, Some(1.0));
    assert_eq!(out.pan, Some(Position::new(0.0, 0.0)));
}

// =============================================================================
// Display to network
// =============================================================================

#[test]
fn empty_display_gives_empty_network() {
    let out = display_to_network(&DisplayDocument::default(), &NetworkDocument::default());
    assert!(out.nodes.is_empty());
    assert!(out.edges.is_empty());
}

#[test]
fn new_display_node_becomes_network_node() {
    let d = display(json!({
        "elements": {
            "nodes": [{
                "data": { "id": "node-1", "type": "round-rectangle", "name": "Test Node", "width": 100, "height": 50, "bg": "#1890FF" },
                "position": { "x": 10, "y": 20 }
            }]
        }
    }));
    let out = display_to_network(&d, &NetworkDocument::default());
    let node = &out.nodes[0];
    assert_eq!(out.nodes.len(), 1);
    assert_eq!(node.node_id, Some(1));
    assert_eq!(node.name(), Some("Test Node"));
    assert_eq!(node.display_id(), Some("node-1"));
    assert_eq!(node.display.attr_str("type"), Some("round-rectangle"));
    assert_eq!(node.display.position, Some(Position::new(10.0, 20.0)));
}

#[test]
fn new_display_edge_becomes_network_edge() {
    let out = display_to_network(&two_node_display(), &NetworkDocument::default());
    let edge = &out.edges[0];
    assert_eq!(out.edges.len(), 1);
    assert_eq!(edge.edge_id, Some(1));
    assert_eq!(edge.display_id().as_deref(), Some("e1"));
    assert_eq!(edge.display.attr_str("source"), Some("n1"));
    assert_eq!(edge.display.attr_str("target"), Some("n2"));
}

#[test]
fn edge_endpoints_resolve_to_node_ids() {
    let out = display_to_network(&two_node_display(), &NetworkDocument::default());
    assert_eq!(out.edges[0].src_node_id, Some(1));
    assert_eq!(out.edges[0].dst_node_id, Some(2));
}

#[test]
fn matching_display_id_updates_in_place() {
    let base = network(json!({
        "nodes": [{
            "node_id": 1,
            "node_name": "Original Name",
            "node_features": ["feature1"],
            "cache": { "capacity": 64 },
            "display": { "id": "node-1", "type": "ellipse", "width": 50, "height": 50, "position": { "x": 0, "y": 0 } }
        }]
    }));
    let d = display(json!({
        "elements": {
            "nodes": [{
                "data": { "id": "node-1", "type": "round-rectangle", "name": "Updated Name", "width": 100, "height": 50 },
                "position": { "x": 10, "y": 20 }
            }]
        }
    }));
    let out = display_to_network(&d, &base);
    let node = &out.nodes[0];
    assert_eq!(out.nodes.len(), 1);
    assert_eq!(node.node_id, Some(1));
    assert_eq!(node.name(), Some("Updated Name"));
    assert_eq!(node.node_features, Some(json!(["feature1"])));
    assert_eq!(node.extra.get("cache"), Some(&json!({ "capacity": 64 })));
    assert_eq!(node.display.attr_str("type"), Some("round-rectangle"));
    assert_eq!(node.display.position, Some(Position::new(10.0, 20.0)));
}

#[test]
fn display_attributes_are_replaced_not_merged() {
    let base = network(json!({
        "nodes": [{ "node_id": 1, "display": { "id": "a", "bg": "#000", "type": "ellipse" } }]
    }));
    let d = display(json!({ "elements": { "nodes": [{ "data": { "id": "a", "type": "diamond" } }] } }));
    let out = display_to_network(&d, &base);
    assert_eq!(out.nodes[0].display.attr_str("bg"), None);
    assert_eq!(out.nodes[0].display.attr_str("type"), Some("diamond"));
}

#[test]
fn nodes_missing_from_display_are_kept() {
    let base = network(json!({
        "nodes": [
            { "node_id": 1, "display": { "id": "a" } },
            { "node_id": 2, "display": { "id": "b" } }
        ]
    }));
    let d = display(json!({ "elements": { "nodes": [{ "data": { "id": "a" } }] } }));
    let out = display_to_network(&d, &base);
    assert_eq!(out.nodes.len(), 2);
    assert_eq!(out.nodes[1].display_id(), Some("b"));
}

#[test]
fn new_ids_count_up_from_one() {
    let d = display(json!({ "elements": { "nodes": [{ "data": { "id": "x" } }, { "data": { "id": "y" } }] } }));
    let out = display_to_network(&d, &NetworkDocument::default());
    let ids: Vec<Option<i64>> = out.nodes.iter().map(|n| n.node_id).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    assert_eq!(out.nodes[1].name(), Some("Node 2"));
}

#[test]
fn new_ids_skip_ids_already_in_base() {
    let base = network(json!({
        "nodes": [
            { "node_id": 1, "display": { "id": "a" } },
            { "node_id": 3, "display": { "id": "c" } }
        ]
    }));
    let d = display(json!({
        "elements": { "nodes": [{ "data": { "id": "new-1" } }, { "data": { "id": "new-2" } }] }
    }));
    let out = display_to_network(&d, &base);
    let ids: Vec<Option<i64>> = out.nodes.iter().map(|n| n.node_id).collect();
    assert_eq!(ids, vec![Some(1), Some(3), Some(2), Some(4)]);
}

#[test]
fn unresolved_endpoint_keeps_previous_link() {
    let base = network(json!({
        "nodes": [{ "node_id": 1, "display": { "id": "a" } }, { "node_id": 2, "display": { "id": "b" } }],
        "edges": [{ "edge_id": 9, "src_node_id": 1, "dst_node_id": 2, "display": { "data": { "id": "ab" } } }]
    }));
    let d = display(json!({
        "elements": {
            "nodes": [{ "data": { "id": "a" } }],
            "edges": [{ "data": { "id": "ab", "source": "a", "target": "ghost" } }]
        }
    }));
    let out = display_to_network(&d, &base);
    assert_eq!(out.edges[0].edge_id, Some(9));
    assert_eq!(out.edges[0].src_node_id, Some(1));
    assert_eq!(out.edges[0].dst_node_id, Some(2));
}

#[test]
fn base_network_is_not_mutated() {
    let base = cache_node_network();
    let before = base.clone();
    let d = display(json!({ "elements": { "nodes": [{ "data": { "id": "node-1", "name": "Renamed" } }] } }));
    let _ = display_to_network(&d, &base);
    assert_eq!(base, before);
}

#[test]
fn zoom_and_pan_come_from_display() {
    let d = display(json!({ "zoom": 0.5, "pan": { "x": 100, "y": 200 } }));
    let out = display_to_network(&d, &NetworkDocument::default());
    assert_eq!(out.zoom, Some(0.5));
    assert_eq!(out.pan, Some(Position::new(100.0, 200.0)));
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn round_trip_against_empty_base() {
    let original = cache_node_network();
    let out = display_to_network(&network_to_display(&original), &NetworkDocument::default());
    let node = &out.nodes[0];
    assert_eq!(node.node_id, Some(1));
    assert_eq!(node.name(), Some("Node 1"));
    assert_eq!(node.display_id(), Some("node-1"));
    assert_eq!(node.display.attr_str("type"), Some("round-rectangle"));
    assert_eq!(node.display.position, Some(Position::new(10.0, 20.0)));
    assert_eq!(out.zoom, Some(0.7));
    assert_eq!(out.pan, Some(Position::new(50.0, 100.0)));
}

#[test]
fn round_trip_against_source_keeps_opaque_fields() {
    let original = cache_node_network();
    let out = display_to_network(&network_to_display(&original), &original);
    let node = &out.nodes[0];
    assert_eq!(node.node_features, Some(json!(["feature1", "feature2"])));
    assert_eq!(node.extra.get("cache"), original.nodes[0].extra.get("cache"));
    assert_eq!(node.display.attr_str("type"), Some("round-rectangle"));
    assert_eq!(node.display.position, Some(Position::new(10.0, 20.0)));
    assert_eq!(out.zoom, Some(0.7));
    assert_eq!(out.pan, Some(Position::new(50.0, 100.0)));
}

#[test]
fn round_trip_keeps_edge_link_status() {
    let original = network(json!({
        "nodes": [{ "node_id": 1, "display": { "id": "a" } }, { "node_id": 2, "display": { "id": "b" } }],
        "edges": [{
            "edge_id": 1, "src_node_id": 1, "dst_node_id": 2, "src_port_id": 3, "dst_port_id": 4,
            "packet_types": ["read"],
            "display": { "data": { "id": "ab", "source": "a", "target": "b", "lineType": "taxi" }, "link_status": "up" }
        }]
    }));
    let out = display_to_network(&network_to_display(&original), &original);
    let edge = &out.edges[0];
    assert_eq!(edge.display.extra.get("link_status"), Some(&json!("up")));
    assert_eq!(edge.src_port_id, Some(json!(3)));
    assert_eq!(edge.packet_types, Some(json!(["read"])));
    assert_eq!(edge.display.attr_str("lineType"), Some("taxi"));
}

#[test]
fn round_trip_is_stable() {
    let original = cache_node_network();
    let once = display_to_network(&network_to_display(&original), &original);
    let twice = display_to_network(&network_to_display(&once), &once);
    assert_eq!(once, twice);
}

// =============================================================================
// Opaque domain fields
// =============================================================================

fn round_trip_json(input: &str) -> Value {
    let original = netview::parse_network(input).unwrap();
    let out = display_to_network(&network_to_display(&original), &original);
    serde_json::to_value(out).unwrap()
}

#[test]
fn non_array_node_features_survive() {
    let out = round_trip_json(
        r#"{ "nodes": [{ "node_id": 1, "node_name": "L1", "node_features": { "l1": true }, "display": { "id": "a" } }] }"#,
    );
    assert_eq!(out["nodes"][0]["node_features"], json!({ "l1": true }));
}

#[test]
fn string_ports_and_packet_types_survive() {
    let out = round_trip_json(
        r#"{
            "nodes": [{ "node_id": 1, "display": { "id": "a" } }, { "node_id": 2, "display": { "id": "b" } }],
            "edges": [{
                "edge_id": 1, "src_node_id": 1, "dst_node_id": 2,
                "src_port_id": "p0", "dst_port_id": "p1", "packet_types": "all",
                "display": { "data": { "id": "ab", "source": "a", "target": "b" } }
            }]
        }"#,
    );
    let edge = &out["edges"][0];
    assert_eq!(edge["src_port_id"], json!("p0"));
    assert_eq!(edge["dst_port_id"], json!("p1"));
    assert_eq!(edge["packet_types"], json!("all"));
}

#[test]
fn null_feature_list_stays_null() {
    let out = round_trip_json(
        r#"{ "nodes": [{ "node_id": 1, "node_name": "A", "node_features": null, "display": { "id": "a" } }] }"#,
    );
    let node = out["nodes"][0].as_object().unwrap();
    assert_eq!(node.get("node_features"), Some(&Value::Null));
}

#[test]
fn non_string_node_name_is_kept_verbatim() {
    let out = round_trip_json(
        r#"{ "nodes": [{ "node_id": 1, "node_name": 7, "display": { "id": "a" } }] }"#,
    );
    assert_eq!(out["nodes"][0]["node_name"], json!(7));
}
