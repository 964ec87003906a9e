pub mod canvas;
pub mod command;
pub mod config;
pub mod display;
pub mod display_width;
pub mod editor;
pub mod history;
pub mod ids;
pub mod lenient;
pub mod network;
pub mod summary;
pub mod to_display;
pub mod to_network;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use config::EditorConfig;
pub use display::DisplayDocument;
pub use editor::{Editor, LoadOptions, NetworkChange};
pub use network::NetworkDocument;
pub use to_display::network_to_display;
pub use to_network::display_to_network;

/// Parse a network document. Blank input and non-object JSON give an empty
/// network; only unparseable JSON is an error.
pub fn parse_network(input: &str) -> Result<NetworkDocument, String> {
    parse_document(input, "network")
}

pub fn parse_display(input: &str) -> Result<DisplayDocument, String> {
    parse_document(input, "display")
}

fn parse_document<T: DeserializeOwned + Default>(input: &str, what: &str) -> Result<T, String> {
    if input.trim().is_empty() {
        return Ok(T::default());
    }
    let value: Value =
        serde_json::from_str(input).map_err(|e| format!("failed to parse {what} JSON: {e}"))?;
    if !value.is_object() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| format!("failed to read {what} JSON: {e}"))
}

fn to_json(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to write JSON: {e}"))
}

/// Network JSON in, display JSON out.
pub fn display_json(network_json: &str) -> Result<String, String> {
    let network = parse_network(network_json)?;
    to_json(&network_to_display(&network))
}

/// Display JSON reconciled against an optional base network.
pub fn network_json(display_json: &str, base_json: Option<&str>) -> Result<String, String> {
    let display = parse_display(display_json)?;
    let base = match base_json {
        Some(base) => parse_network(base)?,
        None => NetworkDocument::default(),
    };
    to_json(&display_to_network(&display, &base))
}

/// Load `network_json` into an editor, run `script` and return the network.
pub fn edit(
    network_json: &str,
    script: &str,
    config: EditorConfig,
) -> Result<NetworkDocument, String> {
    let network = parse_network(network_json)?;
    let commands = command::parse_script(script)?;
    let mut editor = Editor::new(config);
    editor.load_network(&network, LoadOptions::default());
    editor.run(&commands)?;
    Ok(editor.network().clone())
}

pub fn show(network_json: &str) -> Result<String, String> {
    let network = parse_network(network_json)?;
    Ok(summary::render(&network))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_and_non_object_inputs_are_empty() {
        assert_eq!(parse_network("").unwrap(), NetworkDocument::default());
        assert_eq!(parse_network("null").unwrap(), NetworkDocument::default());
        assert_eq!(parse_display("[1, 2]").unwrap(), DisplayDocument::default());
    }

    #[test]
    fn broken_json_is_an_error() {
        let err = parse_network("{ nodes: ").unwrap_err();
        assert!(err.contains("failed to parse network JSON"), "got: {err}");
    }

    #[test]
    fn display_json_of_empty_network() {
        let out: Value = serde_json::from_str(&display_json("{}").unwrap()).unwrap();
        assert_eq!(
            out,
            serde_json::json!({
                "zoom": 1.0,
                "pan": { "x": 0.0, "y": 0.0 },
                "elements": { "nodes": [], "edges": [] }
            })
        );
    }

    #[test]
    fn network_json_without_base_numbers_new_nodes() {
        let display = r#"{ "elements": { "nodes": [{ "data": { "id": "a" }, "position": { "x": 1, "y": 2 } }] } }"#;
        let out = parse_network(&network_json(display, None).unwrap()).unwrap();
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].node_id, Some(1));
        assert_eq!(out.nodes[0].name(), Some("Node 1"));
    }

    #[test]
    fn edit_runs_a_script() {
        let script = "add node a at 0,0\nadd node b at 100,0\nadd edge ab a -> b\n";
        let network = edit("{}", script, EditorConfig::default()).unwrap();
        assert_eq!(network.nodes.len(), 2);
        assert_eq!(network.edges[0].src_node_id, Some(1));
        assert_eq!(network.edges[0].dst_node_id, Some(2));
    }
}
