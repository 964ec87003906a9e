//! Editing session: one canvas, one network document, one change stream.
//!
//! Every mutating action reads the canvas back through the mapper exactly
//! once and notifies subscribers exactly once.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

use crate::canvas::{self, Canvas, ElementSink, ElementSource, Group};
use crate::command::{Command, ToolbarCommand};
use crate::config::*;
use crate::display::*;
use crate::history::{History, Snapshot};
use crate::ids::SyntheticIds;
use crate::lenient::{display_id_from, is_blank};
use crate::network::NetworkDocument;

const FIT_PADDING: f64 = 30.0;
const RESIZE_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Load,
    Add,
    Remove,
    Position,
    Shape,
    LineType,
    Viewport,
    Undo,
    Redo,
    Paste,
}

impl ChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeReason::Load => "load",
            ChangeReason::Add => "add",
            ChangeReason::Remove => "remove",
            ChangeReason::Position => "position",
            ChangeReason::Shape => "change-shape",
            ChangeReason::LineType => "line-type",
            ChangeReason::Viewport => "viewport",
            ChangeReason::Undo => "undo",
            ChangeReason::Redo => "redo",
            ChangeReason::Paste => "paste",
        }
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivered to subscribers after each reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkChange {
    pub reason: ChangeReason,
    pub network: NetworkDocument,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Load without emitting a network change.
    pub silent: bool,
}

/// Which editing plugins are attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub undo_redo: bool,
    pub clipboard: bool,
    pub snap_grid: bool,
    pub context_menu: bool,
}

impl Capabilities {
    pub fn from_config(config: &EditorConfig) -> Self {
        let toolbar = &config.toolbar;
        Self {
            undo_redo: toolbar.has("undo") || toolbar.has("redo"),
            clipboard: toolbar.has("copy") || toolbar.has("paste"),
            snap_grid: config.snap_grid || toolbar.has("gridon"),
            context_menu: config.context_menu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    fn sign(self) -> f64 {
        match self {
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

/// An element about to be added. Ids left out are generated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    pub group: Group,
    pub data: Attrs,
    pub position: Option<Position>,
    pub rendered_position: Option<Position>,
}

impl NewElement {
    pub fn node() -> Self {
        Self {
            group: Group::Node,
            data: Attrs::new(),
            position: None,
            rendered_position: None,
        }
    }

    pub fn edge(source: &str, target: &str) -> Self {
        Self {
            group: Group::Edge,
            ..Self::node()
        }
        .with("source", source)
        .with("target", target)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with("id", id)
    }

    /// Place at a model position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Place at a screen position; converted through the current viewport.
    pub fn at_rendered(mut self, position: Position) -> Self {
        self.rendered_position = Some(position);
        self
    }
}

type BeforeAdd = Box<dyn FnMut(&DisplayElement) -> bool>;
type AfterAdd = Box<dyn FnMut(&DisplayElement)>;
type Listener = Box<dyn FnMut(&NetworkChange)>;

pub struct Editor {
    canvas: Canvas,
    network: NetworkDocument,
    config: EditorConfig,
    capabilities: Capabilities,
    node_types: Vec<NodeType>,
    grid_on: bool,
    history: History,
    clipboard: Vec<(Group, DisplayElement)>,
    pastes: u32,
    fit_status: Option<(f64, Position)>,
    before_add: Option<BeforeAdd>,
    after_add: Option<AfterAdd>,
    listeners: Vec<Listener>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        for warning in config.validate() {
            tracing::warn!("editor config: {warning}");
        }
        let capabilities = Capabilities::from_config(&config);
        tracing::debug!(?capabilities, "editor ready");
        Self {
            canvas: Canvas::new(config.width, config.height),
            network: NetworkDocument::default(),
            node_types: config.effective_node_types(),
            grid_on: capabilities.snap_grid,
            capabilities,
            config,
            history: History::default(),
            clipboard: Vec::new(),
            pastes: 0,
            fit_status: None,
            before_add: None,
            after_add: None,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&NetworkChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Veto hook: returning false drops the element.
    pub fn on_before_add(&mut self, hook: impl FnMut(&DisplayElement) -> bool + 'static) {
        self.before_add = Some(Box::new(hook));
    }

    pub fn on_after_add(&mut self, hook: impl FnMut(&DisplayElement) + 'static) {
        self.after_add = Some(Box::new(hook));
    }

    pub fn network(&self) -> &NetworkDocument {
        &self.network
    }

    pub fn display_state(&self) -> DisplayDocument {
        self.canvas.snapshot()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn grid_on(&self) -> bool {
        self.grid_on
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the change the next undo reverts, for toolbar tooltips.
    pub fn next_undo(&self) -> Option<&'static str> {
        self.history.next_undo()
    }

    pub fn next_redo(&self) -> Option<&'static str> {
        self.history.next_redo()
    }

    /// Replace the whole session with `network`. History is dropped.
    pub fn load_network(&mut self, network: &NetworkDocument, options: LoadOptions) {
        self.network = network.clone();
        canvas::show_network(&mut self.canvas, network);
        self.history.clear();
        self.fit_status = None;
        self.commit(ChangeReason::Load, !options.silent);
    }

    /// Add a node or edge. `Ok(None)` means the before-add hook refused it.
    pub fn add(&mut self, element: NewElement) -> Result<Option<String>, String> {
        let NewElement {
            group,
            mut data,
            position,
            rendered_position,
        } = element;

        let id = match data.get("id").and_then(display_id_from) {
            Some(id) => id,
            None => self.fresh_id(group),
        };
        data.insert("id".to_string(), Value::from(id.as_str()));

        let position = match rendered_position {
            Some(rendered) => self.canvas.to_model(rendered),
            None => position.unwrap_or_default(),
        };
        let position = match group {
            Group::Node => {
                self.apply_node_defaults(&mut data);
                self.snap(position)
            }
            Group::Edge => {
                if is_blank(data.get("lineType")) {
                    data.insert(
                        "lineType".to_string(),
                        Value::from(self.config.line_type.as_str()),
                    );
                }
                position
            }
        };

        let element = DisplayElement {
            data,
            position,
            extra: Attrs::new(),
        };
        if let Some(hook) = self.before_add.as_mut() {
            if !hook(&element) {
                tracing::debug!(%id, "add refused by before-add hook");
                return Ok(None);
            }
        }

        let before = self.snapshot();
        self.canvas.add(group, element.clone())?;
        self.record(ChangeReason::Add, before);
        if let Some(hook) = self.after_add.as_mut() {
            hook(&element);
        }
        self.commit(ChangeReason::Add, true);
        Ok(Some(id))
    }

    /// Remove elements from the canvas and from the network. Reconciliation
    /// never deletes, so removal is done explicitly here.
    pub fn remove(&mut self, ids: &[String]) -> Result<(), String> {
        if let Some(missing) = ids.iter().find(|id| !self.canvas.contains(id)) {
            return Err(format!("unknown element: {missing}"));
        }
        if ids.is_empty() {
            return Ok(());
        }
        let before = self.snapshot();
        let removed = self.canvas.remove(ids);
        self.forget(&removed);
        self.record(ChangeReason::Remove, before);
        self.commit(ChangeReason::Remove, true);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), String> {
        let selected = self.canvas.selected_ids();
        self.remove(&selected)
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), String> {
        if self.canvas.node(id).is_none() {
            return Err(format!("unknown node: {id}"));
        }
        let position = self.snap(position);
        let before = self.snapshot();
        self.canvas.set_position(id, position);
        self.record(ChangeReason::Position, before);
        self.commit(ChangeReason::Position, true);
        Ok(())
    }

    /// Switch a node to another known shape. A node still at the default
    /// size takes the new shape's size; polygon points follow the shape.
    pub fn change_node_shape(&mut self, id: &str, shape: &str) -> Result<(), String> {
        let node = self
            .canvas
            .node(id)
            .ok_or_else(|| format!("unknown node: {id}"))?;
        let node_type = self
            .node_type(shape)
            .cloned()
            .ok_or_else(|| format!("unknown node type: {shape}"))?;
        let width = node.attr_f64("width").unwrap_or(DEFAULT_NODE_WIDTH);
        let height = node.attr_f64("height").unwrap_or(DEFAULT_NODE_HEIGHT);
        let had_points = node.data.contains_key("points");

        let before = self.snapshot();
        self.canvas.set_data(id, "type", Value::from(shape));
        if let (Some(w), Some(h)) = (node_type.width, node_type.height) {
            if (width - DEFAULT_NODE_WIDTH).abs() < RESIZE_TOLERANCE
                && (height - DEFAULT_NODE_HEIGHT).abs() < RESIZE_TOLERANCE
            {
                self.canvas.set_data(id, "width", Value::from(w));
                self.canvas.set_data(id, "height", Value::from(h));
            }
        }
        match node_type.points {
            Some(points) => {
                self.canvas.set_data(id, "points", Value::from(points));
            }
            None if had_points => {
                self.canvas.remove_data(id, "points");
            }
            None => {}
        }
        self.record(ChangeReason::Shape, before);
        self.commit(ChangeReason::Shape, true);
        Ok(())
    }

    /// Set the line type for new edges and restyle the selected edges,
    /// or every edge when none is selected.
    pub fn set_line_type(&mut self, line_type: LineType) {
        self.config.line_type = line_type;
        let selected: Vec<String> = self
            .canvas
            .edges()
            .iter()
            .filter_map(DisplayElement::id)
            .filter(|id| self.canvas.is_selected(id))
            .collect();
        let targets = if selected.is_empty() {
            self.canvas.edges().iter().filter_map(DisplayElement::id).collect()
        } else {
            selected
        };
        if targets.is_empty() {
            return;
        }

        let before = self.snapshot();
        for id in &targets {
            self.canvas.set_data(id, "lineType", Value::from(line_type.as_str()));
        }
        self.record(ChangeReason::LineType, before);
        self.commit(ChangeReason::LineType, true);
    }

    pub fn set_snap_grid(&mut self, on: bool) {
        if !self.capabilities.snap_grid {
            tracing::warn!("cannot toggle grid: snap-to-grid is not enabled");
            return;
        }
        self.grid_on = on;
    }

    pub fn toggle_grid(&mut self) {
        self.set_snap_grid(!self.grid_on);
    }

    pub fn select(&mut self, ids: &[String]) -> Result<(), String> {
        self.canvas.select(ids)
    }

    /// Zoom by one `zoom_rate` step about the viewport centre.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let step = self.config.zoom_rate * direction.sign();
        let zoom = self.canvas.zoom() + step;
        if zoom <= 0.0 {
            tracing::warn!(zoom, "cannot zoom out any further");
            return;
        }
        let pan = self.canvas.pan();
        let pan = Position::new(
            pan.x - self.canvas.width() * step / 2.0,
            pan.y - self.canvas.height() * step / 2.0,
        );
        self.canvas.set_viewport(zoom, pan);
        self.commit(ChangeReason::Viewport, true);
    }

    /// Fit all nodes into view; a second call restores the previous viewport.
    pub fn fit(&mut self) {
        match self.fit_status.take() {
            None => {
                self.fit_status = Some((self.canvas.zoom(), self.canvas.pan()));
                self.canvas.fit(FIT_PADDING);
            }
            Some((zoom, pan)) => self.canvas.set_viewport(zoom, pan),
        }
        self.commit(ChangeReason::Viewport, true);
    }

    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        if !self.capabilities.undo_redo {
            tracing::warn!("cannot undo: undo/redo is not enabled by the toolbar option");
            return false;
        }
        let action = self.history.next_undo();
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(snapshot) => {
                tracing::info!(action, "undo");
                self.restore(snapshot);
                self.commit(ChangeReason::Undo, true);
                true
            }
            None => false,
        }
    }

    /// Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        if !self.capabilities.undo_redo {
            tracing::warn!("cannot redo: undo/redo is not enabled by the toolbar option");
            return false;
        }
        let action = self.history.next_redo();
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(snapshot) => {
                tracing::info!(action, "redo");
                self.restore(snapshot);
                self.commit(ChangeReason::Redo, true);
                true
            }
            None => false,
        }
    }

    /// Copy the selected nodes and the edges running between them.
    /// Returns the number of elements copied.
    pub fn copy(&mut self) -> usize {
        if !self.capabilities.clipboard {
            tracing::warn!("cannot copy: clipboard is not enabled by the toolbar option");
            return 0;
        }
        let nodes: Vec<DisplayElement> = self
            .canvas
            .nodes()
            .iter()
            .filter(|n| n.id().is_some_and(|id| self.canvas.is_selected(&id)))
            .cloned()
            .collect();
        if nodes.is_empty() {
            return 0;
        }
        let copied: HashSet<String> = nodes.iter().filter_map(DisplayElement::id).collect();
        let inside = |end: Option<String>| end.is_some_and(|end| copied.contains(&end));
        let edges: Vec<DisplayElement> = self
            .canvas
            .edges()
            .iter()
            .filter(|e| inside(e.source()) && inside(e.target()))
            .cloned()
            .collect();

        self.clipboard = nodes
            .into_iter()
            .map(|n| (Group::Node, n))
            .chain(edges.into_iter().map(|e| (Group::Edge, e)))
            .collect();
        self.pastes = 0;
        self.clipboard.len()
    }

    /// Paste the clipboard with fresh ids, shifted by one grid step per
    /// paste. The pasted elements become the selection.
    pub fn paste(&mut self) -> Result<Vec<String>, String> {
        if !self.capabilities.clipboard {
            tracing::warn!("cannot paste: clipboard is not enabled by the toolbar option");
            return Ok(Vec::new());
        }
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        self.pastes += 1;
        let offset = self.config.grid_spacing * f64::from(self.pastes);

        let before = self.snapshot();
        let mut renamed: HashMap<String, String> = HashMap::new();
        let mut pasted = Vec::new();
        for (group, original) in self.clipboard.clone() {
            let id = self.fresh_id(group);
            let mut element = original.clone();
            element.data.insert("id".to_string(), Value::from(id.as_str()));
            match group {
                Group::Node => {
                    element.position = Position::new(
                        element.position.x + offset,
                        element.position.y + offset,
                    );
                    if let Some(old) = original.id() {
                        renamed.insert(old, id.clone());
                    }
                }
                Group::Edge => {
                    for key in ["source", "target"] {
                        let end = element.data.get(key).and_then(display_id_from);
                        if let Some(new_end) = end.and_then(|end| renamed.get(&end)) {
                            element.data.insert(key.to_string(), Value::from(new_end.as_str()));
                        }
                    }
                }
            }
            self.canvas.add(group, element)?;
            pasted.push(id);
        }
        self.canvas.select(&pasted)?;
        self.record(ChangeReason::Paste, before);
        self.commit(ChangeReason::Paste, true);
        Ok(pasted)
    }

    pub fn handle_command(&mut self, command: ToolbarCommand) -> Result<(), String> {
        match command {
            ToolbarCommand::Undo => {
                self.undo();
            }
            ToolbarCommand::Redo => {
                self.redo();
            }
            ToolbarCommand::GridOn => self.toggle_grid(),
            ToolbarCommand::ZoomIn => self.zoom(ZoomDirection::In),
            ToolbarCommand::ZoomOut => self.zoom(ZoomDirection::Out),
            ToolbarCommand::Copy => {
                self.copy();
            }
            ToolbarCommand::Paste => {
                self.paste()?;
            }
            ToolbarCommand::Fit => self.fit(),
            ToolbarCommand::Delete => self.delete_selected()?,
            ToolbarCommand::Line(line_type) => self.set_line_type(line_type),
        }
        Ok(())
    }

    /// Context menu item on `target`, or on the first selected element.
    pub fn handle_context_menu(&mut self, item: &str, target: Option<&str>) -> Result<(), String> {
        if !self.capabilities.context_menu {
            return Err("context menu is not enabled".to_string());
        }
        let target = target
            .map(str::to_string)
            .or_else(|| self.canvas.selected_ids().into_iter().next());
        let target_node = target.filter(|id| self.canvas.group_of(id) == Some(Group::Node));

        if let Some(shape) = item.strip_prefix("change-shape-") {
            let id = target_node.ok_or_else(|| "change-shape needs a node target".to_string())?;
            return self.change_node_shape(&id, shape);
        }
        match item {
            "remove" => match target_node {
                Some(id) => self.remove(&[id]),
                None => self.delete_selected(),
            },
            other => Err(format!("unknown context menu item: {other}")),
        }
    }

    pub fn run(&mut self, commands: &[Command]) -> Result<(), String> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, command: &Command) -> Result<(), String> {
        match command {
            Command::AddNode {
                id,
                position,
                shape,
                name,
            } => {
                let mut element = NewElement::node().with_id(id);
                if let Some(position) = position {
                    element = element.at(*position);
                }
                if let Some(shape) = shape {
                    element = element.with("type", shape.as_str());
                }
                if let Some(name) = name {
                    element = element.with("name", name.as_str());
                }
                self.add(element)?;
            }
            Command::AddEdge { id, source, target } => {
                self.add(NewElement::edge(source, target).with_id(id))?;
            }
            Command::Move { id, position } => self.move_node(id, *position)?,
            Command::Shape { id, shape } => self.change_node_shape(id, shape)?,
            Command::Remove(ids) => self.remove(ids)?,
            Command::Select(ids) => self.select(ids)?,
            Command::Line(line_type) => self.set_line_type(*line_type),
            Command::Toolbar(toolbar) => self.handle_command(*toolbar)?,
        }
        Ok(())
    }

    fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.node_types.iter().find(|t| t.name == name)
    }

    fn apply_node_defaults(&self, data: &mut Attrs) {
        if is_blank(data.get("type")) {
            data.insert("type".to_string(), Value::from(DEFAULT_NODE_TYPE));
        }
        let shape = data.get("type").and_then(Value::as_str).unwrap_or(DEFAULT_NODE_TYPE);
        let node_type = self.node_type(shape).cloned();
        let width = node_type.as_ref().and_then(|t| t.width).unwrap_or(DEFAULT_NODE_WIDTH);
        let height = node_type.as_ref().and_then(|t| t.height).unwrap_or(DEFAULT_NODE_HEIGHT);
        if is_blank(data.get("width")) {
            data.insert("width".to_string(), Value::from(width));
        }
        if is_blank(data.get("height")) {
            data.insert("height".to_string(), Value::from(height));
        }
        if let Some(points) = node_type.and_then(|t| t.points) {
            data.entry("points").or_insert_with(|| Value::from(points));
        }
        if is_blank(data.get("bg")) {
            data.insert("bg".to_string(), Value::from(DEFAULT_NODE_BG));
        }
    }

    fn snap(&self, position: Position) -> Position {
        let step = self.config.grid_spacing;
        if !self.grid_on || !(step > 0.0) {
            return position;
        }
        Position::new((position.x / step).round() * step, (position.y / step).round() * step)
    }

    /// A display id unused by both the canvas and the network.
    fn fresh_id(&self, group: Group) -> String {
        let mut ids = SyntheticIds::default();
        match group {
            Group::Node => {
                ids.reserve_all(self.canvas.nodes().iter().filter_map(DisplayElement::id));
                ids.reserve_all(self.network.nodes.iter().filter_map(|n| n.display_id()));
                ids.fresh("node")
            }
            Group::Edge => {
                ids.reserve_all(self.canvas.edges().iter().filter_map(DisplayElement::id));
                ids.reserve_all(self.network.edges.iter().filter_map(|e| e.display_id()));
                ids.fresh("edge")
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.canvas.snapshot(),
            network: self.network.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.canvas.load(snapshot.display);
        self.network = snapshot.network;
    }

    fn record(&mut self, reason: ChangeReason, before: Snapshot) {
        if self.capabilities.undo_redo {
            self.history.record(reason.as_str(), before);
        }
    }

    /// Drop removed elements from the network, plus edges left pointing at
    /// removed nodes.
    fn forget(&mut self, removed: &[String]) {
        let removed: HashSet<&str> = removed.iter().map(String::as_str).collect();
        let mut gone: HashSet<i64> = HashSet::new();
        self.network.nodes.retain(|node| match node.display_id() {
            Some(id) if removed.contains(id) => {
                gone.extend(node.node_id);
                false
            }
            _ => true,
        });
        self.network.edges.retain(|edge| {
            let named = edge.display_id().is_some_and(|id| removed.contains(id.as_str()));
            let dangling = [edge.src_node_id, edge.dst_node_id]
                .into_iter()
                .flatten()
                .any(|n| gone.contains(&n));
            !(named || dangling)
        });
    }

    fn commit(&mut self, reason: ChangeReason, notify: bool) {
        self.network = canvas::read_network(&self.canvas, &self.network);
        if !notify {
            return;
        }
        tracing::info!(
            reason = reason.as_str(),
            nodes = self.network.nodes.len(),
            edges = self.network.edges.len(),
            "network change"
        );
        let change = NetworkChange {
            reason,
            network: self.network.clone(),
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}
