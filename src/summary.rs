use serde_json::Value;

use crate::display::{DEFAULT_ZOOM, Position};
use crate::display_width::{display_width, pad};
use crate::network::{NetworkDocument, NetworkEdge, NetworkNode};

const BOX_TL: char = '┌';
const BOX_TR: char = '┐';
const BOX_BL: char = '└';
const BOX_BR: char = '┘';
const BOX_H: char = '─';
const BOX_V: char = '│';
const BOX_TD: char = '┬';
const BOX_TU: char = '┴';
const BOX_LT: char = '├';
const BOX_RT: char = '┤';
const BOX_X: char = '┼';
const MISSING: &str = "-";

const NODE_HEADERS: [&str; 5] = ["id", "display", "name", "type", "position"];
const EDGE_HEADERS: [&str; 5] = ["id", "display", "source", "target", "line"];

/// Text overview of a network: viewport line, then node and edge tables.
pub fn render(network: &NetworkDocument) -> String {
    let zoom = network.zoom.unwrap_or(DEFAULT_ZOOM);
    let pan = network.pan.unwrap_or_default();
    let node_rows: Vec<Vec<String>> = network.nodes.iter().map(node_row).collect();
    let edge_rows: Vec<Vec<String>> = network.edges.iter().map(edge_row).collect();

    let mut out = format!("zoom: {zoom}  pan: {}\n", point(pan));
    out.push_str(&format!("\nNodes ({})\n", node_rows.len()));
    out.push_str(&table(&NODE_HEADERS, &node_rows));
    out.push_str(&format!("\nEdges ({})\n", edge_rows.len()));
    out.push_str(&table(&EDGE_HEADERS, &edge_rows));
    out
}

fn node_row(node: &NetworkNode) -> Vec<String> {
    vec![
        number(node.node_id),
        text(node.display_id()),
        name(node.node_name.as_ref()),
        text(node.display.attr_str("type")),
        node.display.position.map(point).unwrap_or_else(|| MISSING.to_string()),
    ]
}

fn edge_row(edge: &NetworkEdge) -> Vec<String> {
    vec![
        number(edge.edge_id),
        text(edge.display_id().as_deref()),
        number(edge.src_node_id),
        number(edge.dst_node_id),
        text(edge.display.attr_str("lineType")),
    ]
}

fn number(n: Option<i64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| MISSING.to_string())
}

fn text(s: Option<&str>) -> String {
    match s {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => MISSING.to_string(),
    }
}

fn name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => text(Some(s.as_str())),
        Some(Value::Null) | None => MISSING.to_string(),
        Some(other) => other.to_string(),
    }
}

fn point(p: Position) -> String {
    format!("({}, {})", p.x, p.y)
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| display_width(&row[i]))
                .fold(display_width(header), usize::max)
        })
        .collect();

    let rule = |left: char, mid: char, right: char| {
        let segments: Vec<String> =
            widths.iter().map(|w| BOX_H.to_string().repeat(w + 2)).collect();
        format!("{left}{}{right}\n", segments.join(&mid.to_string()))
    };
    let line = |cells: &[String]| {
        let cells: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {} ", pad(cell, *w)))
            .collect();
        format!("{BOX_V}{}{BOX_V}\n", cells.join(&BOX_V.to_string()))
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = rule(BOX_TL, BOX_TD, BOX_TR);
    out.push_str(&line(&header));
    out.push_str(&rule(BOX_LT, BOX_X, BOX_RT));
    for row in rows {
        out.push_str(&line(row));
    }
    out.push_str(&rule(BOX_BL, BOX_TU, BOX_BR));
    out
}
