use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::display::{Attrs, Position};
use crate::lenient;

/// Domain-level graph: the persisted source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub nodes: Vec<NetworkNode>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub edges: Vec<NetworkEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::zoom")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Position>,
    #[serde(flatten)]
    pub extra: Attrs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::id")]
    pub node_id: Option<i64>,
    /// Usually a string; any other value is kept as given.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opaque")]
    pub node_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opaque")]
    pub node_features: Option<Value>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub display: NodeDisplay,
    #[serde(flatten)]
    pub extra: Attrs,
}

/// Flat visual attributes of a node. `id` is the renderer identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplay {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::display_id")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::id")]
    pub edge_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::id")]
    pub src_node_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opaque")]
    pub src_port_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::id")]
    pub dst_node_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opaque")]
    pub dst_port_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opaque")]
    pub packet_types: Option<Value>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub display: EdgeDisplay,
    #[serde(flatten)]
    pub extra: Attrs,
}

/// Edge visuals: renderer `data` (id, source, target, lineType, ...) plus
/// position and any per-edge renderer state such as `link_status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeDisplay {
    #[serde(default, deserialize_with = "lenient::object")]
    pub data: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub extra: Attrs,
}

impl NetworkNode {
    /// A node created for a display entry the network has never seen.
    pub fn new(node_id: i64) -> Self {
        Self {
            node_id: Some(node_id),
            node_name: Some(Value::from(default_node_name(node_id))),
            node_features: Some(Value::Array(Vec::new())),
            ..Self::default()
        }
    }

    pub fn display_id(&self) -> Option<&str> {
        self.display.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.node_name.as_ref().and_then(Value::as_str)
    }
}

impl NodeDisplay {
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }
}

impl NetworkEdge {
    /// An edge created for a display entry the network has never seen.
    /// Endpoints start at 0 until they resolve against a node.
    pub fn new(edge_id: i64) -> Self {
        Self {
            edge_id: Some(edge_id),
            src_node_id: Some(0),
            src_port_id: Some(Value::from(0)),
            dst_node_id: Some(0),
            dst_port_id: Some(Value::from(0)),
            packet_types: Some(Value::Array(Vec::new())),
            ..Self::default()
        }
    }

    pub fn display_id(&self) -> Option<String> {
        self.display.id()
    }
}

impl EdgeDisplay {
    pub fn id(&self) -> Option<String> {
        self.data.get("id").and_then(lenient::display_id_from)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

pub fn default_node_name(node_id: i64) -> String {
    format!("Node {node_id}")
}
