//! Read-only projections over a document and its context.
//!
//! Consumed by renderers and inspectors; nothing here mutates.

use crate::context::DocumentContext;
use crate::id::NodeId;
use crate::math::{Rect, Transform};
use crate::model::{Document, Node, NodeKind};
use std::collections::BTreeSet;

pub struct DocumentQuery<'a> {
    pub document: &'a Document,
    pub context: &'a DocumentContext,
}

impl<'a> DocumentQuery<'a> {
    pub fn new(document: &'a Document, context: &'a DocumentContext) -> Self {
        Self { document, context }
    }

    pub fn get_node_by_id(&self, id: NodeId) -> Option<&'a Node> {
        self.document.get(id)
    }

    pub fn get_parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.context.get_parent_id(id)
    }

    /// A node counts as visible when it and all of its ancestors are active.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let active = |n: NodeId| self.document.get(n).is_some_and(|node| node.active);
        active(id) && self.context.get_ancestors(id).iter().all(|a| active(*a))
    }

    /// Default traversal: `lu_keys` order, inactive subtrees skipped.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.context
            .lu_keys
            .iter()
            .filter(|id| self.is_visible(**id))
            .filter_map(|id| self.document.get(*id))
    }

    /// Distinct font families used by visible text nodes, sorted.
    pub fn fonts(&self) -> BTreeSet<String> {
        self.visible_nodes()
            .filter_map(Node::font_family)
            .map(str::to_string)
            .collect()
    }

    /// Local → canvas transform: translation and rotation of every ancestor
    /// below the scene, then of the node itself.
    pub fn absolute_transform(&self, id: NodeId) -> Transform {
        let mut chain: Vec<NodeId> = self.context.get_ancestors(id).into_iter().rev().collect();
        chain.push(id);
        chain
            .into_iter()
            .filter_map(|n| self.document.get(n))
            .filter(|n| !n.is_scene())
            .fold(Transform::IDENTITY, |acc, n| {
                let g = &n.geometry;
                acc.multiply(&Transform::translate(g.left, g.top))
                    .multiply(&Transform::rotate(g.rotation))
            })
    }

    /// Canvas-space bounding box of a node.
    pub fn absolute_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.document.get(id)?;
        if node.is_scene() {
            return None;
        }
        let g = &node.geometry;
        let local = match &node.kind {
            NodeKind::Vector { network, .. } if g.width == 0.0 && g.height == 0.0 => {
                network.bounds()?
            }
            _ => Rect::new(0.0, 0.0, g.width, g.height),
        };
        Some(local.transform(&self.absolute_transform(id)))
    }

    /// Union of the absolute rects of `ids`. Unknown ids are skipped.
    pub fn bounding_rect(&self, ids: &[NodeId]) -> Option<Rect> {
        let rects: Vec<Rect> = ids.iter().filter_map(|id| self.absolute_rect(*id)).collect();
        Rect::union(&rects)
    }

    /// Text of every text node under `ids` (inclusive), pre-order.
    pub fn text_content(&self, ids: &[NodeId]) -> Vec<&'a str> {
        let mut out = Vec::new();
        for &id in ids {
            let subtree = std::iter::once(id).chain(self.context.get_descendants(id));
            for n in subtree {
                if let Some(Node {
                    kind: NodeKind::Text { text, .. },
                    ..
                }) = self.document.get(n)
                {
                    out.push(text.as_str());
                }
            }
        }
        out
    }

    /// The scene a node belongs to.
    pub fn scene_of(&self, id: NodeId) -> Option<NodeId> {
        let top = self.context.get_top_id(id);
        self.document.is_scene(top).then_some(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildrenConstraint, Geometry, Style};
    use crate::tree;
    use crate::model::SubDocument;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn setup() -> (Document, DocumentContext) {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(id("q-scene"), "Page", ChildrenConstraint::Multiple));

        let frame = Node::new(
            id("q-frame"),
            NodeKind::Container {
                style: Style::default(),
                clips_content: false,
            },
        )
        .with_geometry(Geometry::rect(100.0, 50.0, 200.0, 200.0));
        let label = Node::new(id("q-label"), NodeKind::text("Hi", "Inter", 14.0))
            .with_geometry(Geometry::rect(10.0, 10.0, 40.0, 20.0));
        let hidden = Node {
            active: false,
            ..Node::new(id("q-hidden"), NodeKind::text("Boo", "Roboto", 12.0))
        };

        let mut sub = SubDocument::single(frame);
        sub.nodes.insert(label.id, label);
        sub.nodes.insert(hidden.id, hidden);
        sub.links.insert(id("q-frame"), vec![id("q-label"), id("q-hidden")]);
        let ctx = tree::import(&mut doc, sub, id("q-scene"), None).unwrap();
        (doc, ctx)
    }

    #[test]
    fn fonts_skip_inactive() {
        let (doc, ctx) = setup();
        let q = DocumentQuery::new(&doc, &ctx);
        assert_eq!(q.fonts().into_iter().collect::<Vec<_>>(), vec!["Inter".to_string()]);
    }

    #[test]
    fn absolute_rect_accumulates_parents() {
        let (doc, ctx) = setup();
        let q = DocumentQuery::new(&doc, &ctx);
        assert_eq!(
            q.absolute_rect(id("q-label")),
            Some(Rect::new(110.0, 60.0, 40.0, 20.0))
        );
        assert_eq!(q.absolute_rect(id("q-scene")), None);
    }

    #[test]
    fn bounding_rect_unions() {
        let (doc, ctx) = setup();
        let q = DocumentQuery::new(&doc, &ctx);
        assert_eq!(
            q.bounding_rect(&[id("q-frame"), id("q-label")]),
            Some(Rect::new(100.0, 50.0, 200.0, 200.0))
        );
    }

    #[test]
    fn text_content_walks_subtree() {
        let (doc, ctx) = setup();
        let q = DocumentQuery::new(&doc, &ctx);
        assert_eq!(q.text_content(&[id("q-frame")]), vec!["Hi", "Boo"]);
        assert_eq!(q.scene_of(id("q-label")), Some(id("q-scene")));
    }
}
