use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NODE_TYPE: &str = "round-rectangle";
pub const DEFAULT_NODE_WIDTH: f64 = 100.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;
pub const DEFAULT_NODE_BG: &str = "#1890FF";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Bezier,
    Taxi,
    Straight,
}

impl LineType {
    pub fn as_str(self) -> &'static str {
        match self {
            LineType::Bezier => "bezier",
            LineType::Taxi => "taxi",
            LineType::Straight => "straight",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` shows every toolbar command, `false` none, a list only those named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toolbar {
    Enabled(bool),
    Items(Vec<String>),
}

impl Default for Toolbar {
    fn default() -> Self {
        Toolbar::Enabled(true)
    }
}

impl Toolbar {
    pub fn has(&self, command: &str) -> bool {
        match self {
            Toolbar::Enabled(enabled) => *enabled,
            Toolbar::Items(items) => items.iter().any(|item| item == command),
        }
    }
}

/// A node shape offered by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(default)]
    pub build_in: bool,
}

impl NodeType {
    fn builtin(name: &str, width: f64, height: f64) -> Self {
        Self {
            name: name.to_string(),
            width: Some(width),
            height: Some(height),
            points: None,
            build_in: true,
        }
    }

    fn polygon(name: &str, points: &[f64]) -> Self {
        Self {
            points: Some(points.to_vec()),
            ..Self::builtin(name, 80.0, 80.0)
        }
    }
}

pub fn default_node_types() -> Vec<NodeType> {
    vec![
        NodeType::builtin("ellipse", 80.0, 80.0),
        NodeType::builtin("rectangle", DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT),
        NodeType::builtin("round-rectangle", DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT),
        NodeType::builtin("diamond", 80.0, 80.0),
        NodeType::builtin("triangle", 80.0, 80.0),
        NodeType::builtin("hexagon", 80.0, 80.0),
        NodeType::builtin("star", 80.0, 80.0),
        NodeType::polygon(
            "polygon",
            &[
                -0.33, -1.0, 0.33, -1.0, 0.33, -0.33, 1.0, -0.33, 1.0, 0.33, 0.33, 0.33, 0.33, 1.0,
                -0.33, 1.0, -0.33, 0.33, -1.0, 0.33, -1.0, -0.33, -0.33, -0.33,
            ],
        ),
    ]
}

/// Editor options. Keys use the camelCase names of the editor's JSON options;
/// unrecognised keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Zoom step for zoom in/out, in (0, 1). Default 0.2.
    pub zoom_rate: f64,
    /// Line type for new edges. Default bezier.
    pub line_type: LineType,
    /// Start with snap-to-grid on. Default true.
    pub snap_grid: bool,
    /// Grid step in model units. Default 20.
    pub grid_spacing: f64,
    /// Toolbar commands; decides which plugins are attached. Default true.
    pub toolbar: Toolbar,
    /// Attach the context menu. Default true.
    pub context_menu: bool,
    /// Prepend the built-in shapes to `node_types`. Default true.
    pub use_default_node_types: bool,
    /// Extra node shapes. Default empty.
    pub node_types: Vec<NodeType>,
    /// Viewport width of the canvas. Default 800.
    pub width: f64,
    /// Viewport height of the canvas. Default 600.
    pub height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_rate: 0.2,
            line_type: LineType::Bezier,
            snap_grid: true,
            grid_spacing: 20.0,
            toolbar: Toolbar::default(),
            context_menu: true,
            use_default_node_types: true,
            node_types: Vec::new(),
            width: 800.0,
            height: 600.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(input: &str) -> Result<Self, String> {
        serde_json::from_str(input).map_err(|e| format!("failed to parse editor config: {e}"))
    }

    /// Shapes available to the editor: configured ones replace the built-ins
    /// unless `use_default_node_types` asks for both.
    pub fn effective_node_types(&self) -> Vec<NodeType> {
        if self.node_types.is_empty() {
            default_node_types()
        } else if self.use_default_node_types {
            let mut types = default_node_types();
            types.extend(self.node_types.iter().cloned());
            types
        } else {
            self.node_types.clone()
        }
    }

    /// Problems worth a warning. None of them stop the editor.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(self.zoom_rate > 0.0 && self.zoom_rate < 1.0) {
            warnings.push(format!("zoomRate must be > 0 and < 1, got {}", self.zoom_rate));
        }
        if !(self.grid_spacing > 0.0) {
            warnings.push(format!("gridSpacing must be positive, got {}", self.grid_spacing));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            warnings.push(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if let Toolbar::Items(items) = &self.toolbar {
            if items.is_empty() {
                warnings.push("toolbar list is empty".to_string());
            }
        }
        for node_type in &self.node_types {
            if node_type.name.trim().is_empty() {
                warnings.push("nodeTypes entry without a type name".to_string());
            }
        }
        warnings
    }
}
