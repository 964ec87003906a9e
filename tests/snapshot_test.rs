use pretty_assertions::assert_eq;

#[test]
fn snapshot_cache_hierarchy() {
    let input = r##"{
  "zoom": 0.5,
  "pan": { "x": 100, "y": -20 },
  "nodes": [
    { "node_id": 1, "node_name": "Switch", "display": { "id": "n1", "type": "ellipse", "position": { "x": 10, "y": 20 } } },
    { "node_id": 2, "node_name": "交换机", "display": { "id": "n2", "position": { "x": -5.5, "y": 0 } } },
    { "node_id": 3, "node_name": "Node 3", "display": { "id": "3", "type": "round-rectangle", "position": { "x": 40, "y": 60 } } }
  ],
  "edges": [
    { "edge_id": 1, "src_node_id": 1, "dst_node_id": 2, "display": { "data": { "id": "e1", "lineType": "taxi" } } },
    { "edge_id": 2, "src_node_id": 2, "dst_node_id": 3, "display": { "data": { "id": "2", "lineType": "bezier" } } }
  ]
}"##;
    let output = netview::show(input).unwrap();
    let expected = "\
zoom: 0.5  pan: (100, -20)

Nodes (3)
┌────┬─────────┬────────┬─────────────────┬───────────┐
│ id │ display │ name   │ type            │ position  │
├────┼─────────┼────────┼─────────────────┼───────────┤
│ 1  │ n1      │ Switch │ ellipse         │ (10, 20)  │
│ 2  │ n2      │ 交换机 │ -               │ (-5.5, 0) │
│ 3  │ 3       │ Node 3 │ round-rectangle │ (40, 60)  │
└────┴─────────┴────────┴─────────────────┴───────────┘

Edges (2)
┌────┬─────────┬────────┬────────┬────────┐
│ id │ display │ source │ target │ line   │
├────┼─────────┼────────┼────────┼────────┤
│ 1  │ e1      │ 1      │ 2      │ taxi   │
│ 2  │ 2       │ 2      │ 3      │ bezier │
└────┴─────────┴────────┴────────┴────────┘
";
    assert_eq!(output, expected);
}

#[test]
fn snapshot_after_reconciliation() {
    let display = r#"{
  "elements": {
    "nodes": [
      { "data": { "id": "a", "type": "diamond", "name": "Dir" }, "position": { "x": 0, "y": 0 } },
      { "data": { "id": "b" }, "position": { "x": 120, "y": 40 } }
    ],
    "edges": [{ "data": { "id": "ab", "source": "a", "target": "b" } }]
  }
}"#;
    let network = netview::network_json(display, None).unwrap();
    let output = netview::show(&network).unwrap();
    let expected = "\
zoom: 1  pan: (0, 0)

Nodes (2)
┌────┬─────────┬────────┬─────────┬───────────┐
│ id │ display │ name   │ type    │ position  │
├────┼─────────┼────────┼─────────┼───────────┤
│ 1  │ a       │ Dir    │ diamond │ (0, 0)    │
│ 2  │ b       │ Node 2 │ -       │ (120, 40) │
└────┴─────────┴────────┴─────────┴───────────┘

Edges (1)
┌────┬─────────┬────────┬────────┬────────┐
│ id │ display │ source │ target │ line   │
├────┼─────────┼────────┼────────┼────────┤
│ 1  │ ab      │ 1      │ 2      │ bezier │
└────┴─────────┴────────┴────────┴────────┘
";
    assert_eq!(output, expected);
}

#[test]
fn show_rejects_broken_json() {
    let err = netview::show("{").unwrap_err();
    assert!(err.starts_with("failed to parse network JSON"), "got: {err}");
}
