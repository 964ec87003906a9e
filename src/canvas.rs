//! Headless stand-in for the rendering collaborator.
//!
//! The mapping core only needs two capabilities from a renderer: reading the
//! current visual elements and replacing them. `Canvas` provides those plus
//! the element editing the editor performs on behalf of the user.

use std::collections::HashSet;

use serde_json::Value;

use crate::display::*;
use crate::network::NetworkDocument;
use crate::to_display::network_to_display;
use crate::to_network::display_to_network;

/// Read the current visual elements.
pub trait ElementSource {
    fn snapshot(&self) -> DisplayDocument;
}

/// Replace the visual element set.
pub trait ElementSink {
    fn load(&mut self, display: DisplayDocument);
}

/// Project `network` and hand the result to the renderer.
pub fn show_network(sink: &mut impl ElementSink, network: &NetworkDocument) {
    sink.load(network_to_display(network));
}

/// Reconcile whatever the renderer currently shows against `base`.
pub fn read_network(source: &impl ElementSource, base: &NetworkDocument) -> NetworkDocument {
    display_to_network(&source.snapshot(), base)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    nodes: Vec<DisplayElement>,
    edges: Vec<DisplayElement>,
    zoom: f64,
    pan: Position,
    width: f64,
    height: f64,
    selected: HashSet<String>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            zoom: DEFAULT_ZOOM,
            pan: Position::default(),
            width,
            height,
            selected: HashSet::new(),
        }
    }

    pub fn nodes(&self) -> &[DisplayElement] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DisplayElement] {
        &self.edges
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Position {
        self.pan
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_viewport(&mut self, zoom: f64, pan: Position) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
        self.pan = pan;
    }

    pub fn group_of(&self, id: &str) -> Option<Group> {
        if find(&self.nodes, id).is_some() {
            Some(Group::Node)
        } else if find(&self.edges, id).is_some() {
            Some(Group::Edge)
        } else {
            None
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.group_of(id).is_some()
    }

    pub fn node(&self, id: &str) -> Option<&DisplayElement> {
        find(&self.nodes, id).map(|i| &self.nodes[i])
    }

    pub fn edge(&self, id: &str) -> Option<&DisplayElement> {
        find(&self.edges, id).map(|i| &self.edges[i])
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut DisplayElement> {
        if let Some(i) = find(&self.nodes, id) {
            return Some(&mut self.nodes[i]);
        }
        find(&self.edges, id).map(|i| &mut self.edges[i])
    }

    /// Add an element. Ids must be unique and edge endpoints must exist.
    pub fn add(&mut self, group: Group, element: DisplayElement) -> Result<(), String> {
        let id = element
            .id()
            .ok_or_else(|| "cannot add an element without an id".to_string())?;
        if self.contains(&id) {
            return Err(format!("element already exists: {id}"));
        }
        match group {
            Group::Node => self.nodes.push(element),
            Group::Edge => {
                for end in [element.source(), element.target()] {
                    match end {
                        Some(end) if find(&self.nodes, &end).is_some() => {}
                        Some(end) => {
                            return Err(format!("edge {id} references unknown node: {end}"));
                        }
                        None => return Err(format!("edge {id} needs a source and a target")),
                    }
                }
                self.edges.push(element);
            }
        }
        Ok(())
    }

    /// Remove elements by id. Removing a node also removes its edges.
    /// Returns every id actually removed.
    pub fn remove(&mut self, ids: &[String]) -> Vec<String> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut removed = Vec::new();

        self.nodes.retain(|node| match node.id() {
            Some(id) if doomed.contains(id.as_str()) => {
                removed.push(id);
                false
            }
            _ => true,
        });
        let removed_nodes: HashSet<String> = removed.iter().cloned().collect();
        self.edges.retain(|edge| {
            let touches = |end: Option<String>| end.is_some_and(|end| removed_nodes.contains(&end));
            match edge.id() {
                Some(id)
                    if doomed.contains(id.as_str())
                        || touches(edge.source())
                        || touches(edge.target()) =>
                {
                    removed.push(id);
                    false
                }
                _ => true,
            }
        });

        for id in &removed {
            self.selected.remove(id);
        }
        removed
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match find(&self.nodes, id) {
            Some(i) => {
                self.nodes[i].position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_data(&mut self, id: &str, key: &str, value: Value) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.data.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn remove_data(&mut self, id: &str, key: &str) -> bool {
        match self.element_mut(id) {
            Some(element) => element.data.remove(key).is_some(),
            None => false,
        }
    }

    /// Replace the selection. Unknown ids are an error and leave it unchanged.
    pub fn select(&mut self, ids: &[String]) -> Result<(), String> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(id)) {
            return Err(format!("unknown element: {missing}"));
        }
        self.selected = ids.iter().cloned().collect();
        Ok(())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in canvas order, nodes first.
    pub fn selected_ids(&self) -> Vec<String> {
        self.nodes
            .iter()
            .chain(&self.edges)
            .filter_map(DisplayElement::id)
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    /// Bounds of all nodes as (top-left, bottom-right), using each node's
    /// `width`/`height` around its centre.
    pub fn bounding_box(&self) -> Option<(Position, Position)> {
        let mut bounds: Option<(Position, Position)> = None;
        for node in &self.nodes {
            let half_w = node.attr_f64("width").unwrap_or(0.0) / 2.0;
            let half_h = node.attr_f64("height").unwrap_or(0.0) / 2.0;
            let lo = Position::new(node.position.x - half_w, node.position.y - half_h);
            let hi = Position::new(node.position.x + half_w, node.position.y + half_h);
            bounds = Some(match bounds {
                None => (lo, hi),
                Some((min, max)) => (
                    Position::new(min.x.min(lo.x), min.y.min(lo.y)),
                    Position::new(max.x.max(hi.x), max.y.max(hi.y)),
                ),
            });
        }
        bounds
    }

    /// Zoom and pan so every node is visible with `padding` pixels spare.
    pub fn fit(&mut self, padding: f64) {
        let Some((min, max)) = self.bounding_box() else {
            return;
        };
        let box_w = (max.x - min.x).max(1.0);
        let box_h = (max.y - min.y).max(1.0);
        let avail_w = (self.width - 2.0 * padding).max(1.0);
        let avail_h = (self.height - 2.0 * padding).max(1.0);
        let zoom = (avail_w / box_w).min(avail_h / box_h);
        let pan = Position::new(
            (self.width - zoom * (min.x + max.x)) / 2.0,
            (self.height - zoom * (min.y + max.y)) / 2.0,
        );
        self.set_viewport(zoom, pan);
    }

    /// Convert a rendered (screen) position into model coordinates.
    pub fn to_model(&self, rendered: Position) -> Position {
        Position::new(
            (rendered.x - self.pan.x) / self.zoom,
            (rendered.y - self.pan.y) / self.zoom,
        )
    }
}

impl ElementSource for Canvas {
    fn snapshot(&self) -> DisplayDocument {
        DisplayDocument {
            zoom: Some(self.zoom),
            pan: Some(self.pan),
            elements: DisplayElements {
                nodes: self.nodes.clone(),
                edges: self.edges.clone(),
            },
        }
    }
}

impl ElementSink for Canvas {
    fn load(&mut self, display: DisplayDocument) {
        self.zoom = display.zoom_or_default();
        self.pan = display.pan_or_default();
        self.nodes = display.elements.nodes;
        self.edges = display.elements.edges;
        self.selected.clear();
    }
}

fn find(elements: &[DisplayElement], id: &str) -> Option<usize> {
    elements.iter().position(|e| e.id().as_deref() == Some(id))
}
