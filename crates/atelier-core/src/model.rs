//! Core document data model.
//!
//! A document is a forest of nodes. `links` maps each parent to its
//! ordered children; the reverse (child → parent) direction is derived
//! in [`crate::context::DocumentContext`]. Scenes are ordinary entries in
//! `nodes` (variant [`NodeKind::Scene`]) listed in `scenes_ref`, which
//! lets root-level children be handled through the same code paths as
//! nested ones.

use crate::error::DocumentError;
use crate::id::NodeId;
use crate::math::{CubicSegment, Rect, Vector2};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Format version written into archives and JSON snapshots.
pub const DOCUMENT_VERSION: &str = "0.1.0";

fn yes() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
    Fill,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    Solid { color: Color },
    Image { src: String, fit: ImageFit },
}

/// Visual properties carried through mutations untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Paint>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default = "Style::default_opacity")]
    pub opacity: f64,
}

impl Style {
    fn default_opacity() -> f64 {
        1.0
    }

    pub fn solid(color: Color) -> Self {
        Self {
            fill: Some(Paint::Solid { color }),
            ..Self::default()
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position is relative to the parent; `absolute_position` is a cache the
/// renderer may fill and is never trusted by structural code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Degrees, clockwise, around the box origin.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_position: Option<Vector2>,
}

impl Geometry {
    pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            ..Self::default()
        }
    }

    /// Local box, relative to the parent.
    pub fn local_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

// ─── Vector Data ─────────────────────────────────────────────────────────

/// Vertices plus cubic segments between them (tangent-offset form).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorNetwork {
    pub vertices: Vec<Vector2>,
    pub segments: Vec<NetworkSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub a: usize,
    pub b: usize,
    #[serde(default)]
    pub ta: Vector2,
    #[serde(default)]
    pub tb: Vector2,
}

impl VectorNetwork {
    /// Resolve segment `i` into absolute endpoints. `None` for bad indices.
    pub fn segment(&self, i: usize) -> Option<CubicSegment> {
        let seg = self.segments.get(i)?;
        let a = *self.vertices.get(seg.a)?;
        let b = *self.vertices.get(seg.b)?;
        Some(CubicSegment::new(a, b, seg.ta, seg.tb))
    }

    /// Exact bounds of every segment and vertex.
    pub fn bounds(&self) -> Option<Rect> {
        let mut rects: Vec<Rect> = (0..self.segments.len())
            .filter_map(|i| self.segment(i))
            .map(|s| s.bbox())
            .collect();
        if let Some(points) = Rect::from_points(&self.vertices) {
            rects.push(points);
        }
        Rect::union(&rects)
    }
}

/// Variable stroke width: `r` (half-width) at curve position `u ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthStop {
    pub u: f64,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidthProfile {
    pub stops: Vec<WidthStop>,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Child-count rule of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildrenConstraint {
    Single,
    #[default]
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneConstraints {
    #[serde(default)]
    pub children: ChildrenConstraint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Scene {
        #[serde(default)]
        constraints: SceneConstraints,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background: Option<Color>,
    },
    Container {
        #[serde(default)]
        style: Style,
        #[serde(default)]
        clips_content: bool,
    },
    Group,
    Rectangle {
        #[serde(default)]
        style: Style,
        #[serde(default)]
        corner_radius: f64,
    },
    Ellipse {
        #[serde(default)]
        style: Style,
    },
    Vector {
        #[serde(default)]
        style: Style,
        #[serde(default)]
        network: VectorNetwork,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width_profile: Option<WidthProfile>,
    },
    Text {
        #[serde(default)]
        style: Style,
        text: String,
        font_family: String,
        font_size: f64,
        #[serde(default = "NodeKind::default_font_weight")]
        font_weight: u16,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(default)]
        fit: ImageFit,
    },
    Bitmap {
        image_ref: String,
    },
}

impl NodeKind {
    fn default_font_weight() -> u16 {
        400
    }

    /// Short lowercase tag, same as the serialized `type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Scene { .. } => "scene",
            NodeKind::Container { .. } => "container",
            NodeKind::Group => "group",
            NodeKind::Rectangle { .. } => "rectangle",
            NodeKind::Ellipse { .. } => "ellipse",
            NodeKind::Vector { .. } => "vector",
            NodeKind::Text { .. } => "text",
            NodeKind::Image { .. } => "image",
            NodeKind::Bitmap { .. } => "bitmap",
        }
    }

    pub fn is_scene(&self) -> bool {
        matches!(self, NodeKind::Scene { .. })
    }

    /// Whether nodes of this kind may hold children.
    pub fn accepts_children(&self) -> bool {
        matches!(
            self,
            NodeKind::Scene { .. } | NodeKind::Container { .. } | NodeKind::Group
        )
    }

    pub fn text(text: &str, font_family: &str, font_size: f64) -> Self {
        NodeKind::Text {
            style: Style::solid(Color::BLACK),
            text: text.to_string(),
            font_family: font_family.to_string(),
            font_size,
            font_weight: 400,
        }
    }
}

/// A single addressable element of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub removable: bool,
    #[serde(default)]
    pub geometry: Geometry,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            name: kind.type_name().to_string(),
            active: true,
            locked: false,
            removable: true,
            geometry: Geometry::default(),
            kind,
        }
    }

    pub fn scene(id: NodeId, name: &str, children: ChildrenConstraint) -> Self {
        Self {
            name: name.to_string(),
            ..Self::new(
                id,
                NodeKind::Scene {
                    constraints: SceneConstraints { children },
                    background: None,
                },
            )
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn is_scene(&self) -> bool {
        self.kind.is_scene()
    }

    /// `Some` only for scenes.
    pub fn scene_constraints(&self) -> Option<SceneConstraints> {
        match &self.kind {
            NodeKind::Scene { constraints, .. } => Some(*constraints),
            _ => None,
        }
    }

    /// Font family in use, for text nodes.
    pub fn font_family(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { font_family, .. } => Some(font_family),
            _ => None,
        }
    }
}

// ─── Assets ──────────────────────────────────────────────────────────────

/// Metadata of an image asset referenced by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub bytes: u64,
    #[serde(rename = "type")]
    pub mime: String,
}

/// Raw RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterBitmap {
    #[serde(default)]
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterBitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            version: 0,
            width,
            height,
            data,
        }
    }

    /// `data` holds exactly `width * height` RGBA pixels.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() as u64 == u64::from(self.width) * u64::from(self.height) * 4
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The node store plus parent → ordered-children links.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, Node>,
    #[serde(default)]
    pub links: BTreeMap<NodeId, Vec<NodeId>>,
    #[serde(default)]
    pub scenes_ref: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_scene_id: Option<NodeId>,
    #[serde(default)]
    pub images: BTreeMap<String, ImageRef>,
    #[serde(default)]
    pub bitmaps: BTreeMap<String, RasterBitmap>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene node. The first scene becomes the entry scene.
    pub fn add_scene(&mut self, scene: Node) -> NodeId {
        let id = scene.id;
        self.nodes.insert(id, scene);
        self.scenes_ref.push(id);
        if self.entry_scene_id.is_none() {
            self.entry_scene_id = Some(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ordered children of `id` (empty for leaves and unknown ids).
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.links.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_scene(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_scene)
    }

    /// Check the structural invariants: every linked id exists, each child
    /// has one parent, scenes are never children, and no node is its own
    /// ancestor.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut parent_of: HashMap<NodeId, NodeId> = HashMap::new();
        let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::new();

        for (&parent, children) in &self.links {
            if !self.contains(parent) {
                return Err(DocumentError::DanglingLink(parent));
            }
            graph.add_node(parent);
            for &child in children {
                let node = self.get(child).ok_or(DocumentError::DanglingLink(child))?;
                if node.is_scene() {
                    return Err(DocumentError::NestedScene(child));
                }
                if parent_of.insert(child, parent).is_some() {
                    return Err(DocumentError::MultipleParents(child));
                }
                if child == parent {
                    return Err(DocumentError::Cycle(child));
                }
                graph.add_edge(parent, child, ());
            }
        }

        for id in &self.scenes_ref {
            if !self.is_scene(*id) {
                return Err(DocumentError::NodeNotFound(*id));
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(DocumentError::Cycle(cycle.node_id()));
        }
        Ok(())
    }
}

/// A packed, not-yet-attached fragment: nodes, their internal links, and
/// the ids that become children of the attach point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubDocument {
    pub nodes: BTreeMap<NodeId, Node>,
    #[serde(default)]
    pub links: BTreeMap<NodeId, Vec<NodeId>>,
    pub roots: Vec<NodeId>,
}

impl SubDocument {
    /// A fragment holding one childless node.
    pub fn single(node: Node) -> Self {
        let id = node.id;
        let mut nodes = BTreeMap::new();
        nodes.insert(id, node);
        Self {
            nodes,
            links: BTreeMap::new(),
            roots: vec![id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str) -> Node {
        Node::new(
            NodeId::intern(id),
            NodeKind::Rectangle {
                style: Style::default(),
                corner_radius: 0.0,
            },
        )
    }

    fn doc_with_scene() -> (Document, NodeId) {
        let mut doc = Document::new();
        let scene = doc.add_scene(Node::scene(
            NodeId::intern("model-scene"),
            "Page",
            ChildrenConstraint::Multiple,
        ));
        (doc, scene)
    }

    #[test]
    fn first_scene_is_entry() {
        let (doc, scene) = doc_with_scene();
        assert_eq!(doc.entry_scene_id, Some(scene));
        assert!(doc.is_scene(scene));
    }

    #[test]
    fn validate_accepts_tree() {
        let (mut doc, scene) = doc_with_scene();
        let a = rect("model-a");
        let b = rect("model-b");
        doc.links.insert(scene, vec![a.id]);
        doc.links.insert(a.id, vec![b.id]);
        doc.nodes.insert(a.id, a);
        doc.nodes.insert(b.id, b);
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_two_parents() {
        let (mut doc, scene) = doc_with_scene();
        let a = rect("model-p1");
        let b = rect("model-p2");
        doc.links.insert(scene, vec![a.id, b.id]);
        doc.links.insert(a.id, vec![b.id]);
        doc.nodes.insert(a.id, a);
        doc.nodes.insert(b.id, b);
        assert!(matches!(doc.validate(), Err(DocumentError::MultipleParents(_))));
    }

    #[test]
    fn validate_rejects_cycle() {
        let mut doc = Document::new();
        let a = rect("model-c1");
        let b = rect("model-c2");
        doc.links.insert(a.id, vec![b.id]);
        doc.links.insert(b.id, vec![a.id]);
        doc.nodes.insert(a.id, a);
        doc.nodes.insert(b.id, b);
        assert!(matches!(doc.validate(), Err(DocumentError::Cycle(_))));
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let (mut doc, scene) = doc_with_scene();
        doc.links.insert(scene, vec![NodeId::intern("model-ghost")]);
        assert_eq!(
            doc.validate(),
            Err(DocumentError::DanglingLink(NodeId::intern("model-ghost")))
        );
    }

    #[test]
    fn node_json_shape() {
        let node = rect("model-json");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"]["type"], "rectangle");
        assert!(json.get("active").is_none(), "defaults are omitted");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn network_bounds_use_curves() {
        let network = VectorNetwork {
            vertices: vec![Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0)],
            segments: vec![NetworkSegment {
                a: 0,
                b: 1,
                ta: Vector2::new(0.0, 10.0),
                tb: Vector2::new(0.0, 10.0),
            }],
        };
        let bounds = network.bounds().unwrap();
        assert!((bounds.height - 7.5).abs() < 1e-9);
    }

    #[test]
    fn bitmap_shape_check() {
        assert!(RasterBitmap::new(2, 1, vec![0; 8]).is_well_formed());
        assert!(!RasterBitmap::new(2, 2, vec![0; 8]).is_well_formed());
    }
}
