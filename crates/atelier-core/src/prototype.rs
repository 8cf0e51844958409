//! Portable, parent-free snapshots of node subtrees.
//!
//! Prototypes are what the clipboard carries and what duplicate/paste
//! re-materialize. They hold no ids; fresh ones are minted on the way
//! back in.

use crate::context::DocumentContext;
use crate::id::{IdGenerator, NodeId};
use crate::model::{Document, Geometry, Node, NodeKind, SubDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePrototype {
    #[serde(default)]
    pub name: String,
    #[serde(default = "NodePrototype::yes")]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "NodePrototype::yes")]
    pub removable: bool,
    #[serde(default)]
    pub geometry: Geometry,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodePrototype>,
}

impl NodePrototype {
    fn yes() -> bool {
        true
    }

    /// Leaf prototype from a kind, with default flags and geometry.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: kind.type_name().to_string(),
            active: true,
            locked: false,
            removable: true,
            geometry: Geometry::default(),
            kind,
            children: Vec::new(),
        }
    }

    fn from_node(node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            active: node.active,
            locked: node.locked,
            removable: node.removable,
            geometry: node.geometry.clone(),
            kind: node.kind.clone(),
            children: Vec::new(),
        }
    }

    /// Capture `id` and its descendants. Scenes can't be captured; `None`
    /// for them and for unknown ids.
    pub fn snapshot(document: &Document, context: &DocumentContext, id: NodeId) -> Option<Self> {
        let node = document.get(id)?;
        if node.is_scene() {
            return None;
        }
        let mut proto = Self::from_node(node);
        proto.children = context
            .get_children(id)
            .iter()
            .filter_map(|child| Self::snapshot(document, context, *child))
            .collect();
        Some(proto)
    }

    /// Materialize into a packed fragment with one root. Ids come from
    /// `ids`; the root is minted first, then descendants in pre-order.
    pub fn to_sub_document(&self, ids: &mut dyn IdGenerator) -> SubDocument {
        let root = ids.next_id();
        self.to_sub_document_with_root(root, ids)
    }

    /// Same as [`Self::to_sub_document`] with a caller-chosen root id.
    pub fn to_sub_document_with_root(&self, root: NodeId, ids: &mut dyn IdGenerator) -> SubDocument {
        let mut nodes = BTreeMap::new();
        let mut links = BTreeMap::new();
        self.materialize(root, ids, &mut nodes, &mut links);
        SubDocument {
            nodes,
            links,
            roots: vec![root],
        }
    }

    fn materialize(
        &self,
        id: NodeId,
        ids: &mut dyn IdGenerator,
        nodes: &mut BTreeMap<NodeId, Node>,
        links: &mut BTreeMap<NodeId, Vec<NodeId>>,
    ) {
        nodes.insert(
            id,
            Node {
                id,
                name: self.name.clone(),
                active: self.active,
                locked: self.locked,
                removable: self.removable,
                geometry: self.geometry.clone(),
                kind: self.kind.clone(),
            },
        );
        if self.children.is_empty() {
            return;
        }
        let mut child_ids = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let child_id = ids.next_id();
            child.materialize(child_id, ids, nodes, links);
            child_ids.push(child_id);
        }
        links.insert(id, child_ids);
    }

    /// Text of the text nodes in this subtree, pre-order.
    pub fn plain_text(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let NodeKind::Text { text, .. } = &self.kind {
            out.push(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;
    use crate::model::ChildrenConstraint;
    use crate::tree;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn card() -> NodePrototype {
        let mut frame = NodePrototype::new(NodeKind::Group);
        frame.name = "Card".into();
        frame.children = vec![
            NodePrototype::new(NodeKind::text("Title", "Inter", 18.0)),
            NodePrototype::new(NodeKind::text("Body", "Inter", 12.0)),
        ];
        frame
    }

    #[test]
    fn materialize_mints_ids_in_preorder() {
        let mut ids = SequentialIds::new("proto-mint");
        let sub = card().to_sub_document(&mut ids);
        assert_eq!(sub.roots, vec![id("proto-mint-0")]);
        assert_eq!(
            sub.links[&id("proto-mint-0")],
            vec![id("proto-mint-1"), id("proto-mint-2")]
        );
        assert_eq!(sub.nodes.len(), 3);
        assert_eq!(sub.nodes[&id("proto-mint-0")].name, "Card");
    }

    #[test]
    fn snapshot_then_materialize_preserves_shape() {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(id("proto-scene"), "Page", ChildrenConstraint::Multiple));
        let mut ids = SequentialIds::new("proto-a");
        let sub = card().to_sub_document(&mut ids);
        let root = sub.roots[0];
        let ctx = tree::import(&mut doc, sub, id("proto-scene"), None).unwrap();

        let snap = NodePrototype::snapshot(&doc, &ctx, root).unwrap();
        assert_eq!(snap, card());
        assert!(NodePrototype::snapshot(&doc, &ctx, id("proto-scene")).is_none());
    }

    #[test]
    fn plain_text_in_order() {
        assert_eq!(card().plain_text(), vec!["Title", "Body"]);
    }

    #[test]
    fn json_omits_empty_children() {
        let json = serde_json::to_value(NodePrototype::new(NodeKind::Group)).unwrap();
        assert!(json.get("children").is_none());
    }
}
