use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Free-form attribute map, as handed to and read back from the renderer.
pub type Attrs = Map<String, Value>;

pub const DEFAULT_ZOOM: f64 = 1.0;
pub const DEFAULT_LINE_TYPE: &str = "bezier";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coerce a JSON value into a position. Non-objects yield `None`;
    /// missing or non-numeric components default to 0.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let coord = |key: &str| object.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        Some(Self::new(coord("x"), coord("y")))
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Position::from_value(&value).unwrap_or_default())
    }
}

/// Renderer-facing graph document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayDocument {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::zoom")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Position>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub elements: DisplayElements,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayElements {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub nodes: Vec<DisplayElement>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub edges: Vec<DisplayElement>,
}

/// One node or edge as the renderer sees it. `extra` keeps top-level keys
/// other than `data` and `position` (for edges, `link_status`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayElement {
    #[serde(default, deserialize_with = "lenient::object")]
    pub data: Attrs,
    #[serde(default)]
    pub position: Position,
    #[serde(flatten)]
    pub extra: Attrs,
}

impl DisplayElement {
    pub fn new(id: &str, position: Position) -> Self {
        let mut data = Attrs::new();
        data.insert("id".to_string(), Value::from(id));
        Self {
            data,
            position,
            extra: Attrs::new(),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.data.get("id").and_then(lenient::display_id_from)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    pub fn source(&self) -> Option<String> {
        self.data.get("source").and_then(lenient::display_id_from)
    }

    pub fn target(&self) -> Option<String> {
        self.data.get("target").and_then(lenient::display_id_from)
    }
}

impl DisplayDocument {
    pub fn zoom_or_default(&self) -> f64 {
        self.zoom.unwrap_or(DEFAULT_ZOOM)
    }

    pub fn pan_or_default(&self) -> Position {
        self.pan.unwrap_or_default()
    }
}
