//! Integration tests: document graph, derived context, and queries.
//!
//! Loads a realistic landing-page document and exercises the structural
//! primitives end to end.

use atelier_core::math::bezier;
use atelier_core::tree;
use atelier_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn landing() -> Document {
    serde_json::from_str(include_str!("fixtures/landing.json")).unwrap()
}

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn fixture_is_valid() {
    let doc = landing();
    assert_eq!(doc.validate(), Ok(()));
    assert_eq!(doc.nodes.len(), 6);
    assert!(!doc.get(id("logo")).unwrap().removable);
    assert!(!doc.get(id("footer-note")).unwrap().active);
}

#[test]
fn json_roundtrip_is_lossless() {
    let doc = landing();
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

// ─── Context ─────────────────────────────────────────────────────────────

#[test]
fn context_orders_keys_by_tree() {
    let doc = landing();
    let ctx = DocumentContext::new(&doc);
    let keys: Vec<&str> = ctx.lu_keys.iter().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["page", "hero", "headline", "cta", "footer-note", "logo"]
    );
    assert_eq!(ctx.get_parent_id(id("cta")), Some(id("hero")));
}

#[test]
fn pruning_keeps_outermost() {
    let ctx = DocumentContext::new(&landing());
    assert_eq!(
        ctx.prune_nested_nodes(&[id("headline"), id("hero"), id("logo")]),
        vec![id("hero"), id("logo")]
    );
}

// ─── Queries ─────────────────────────────────────────────────────────────

#[test]
fn fonts_ignore_inactive_text() {
    let doc = landing();
    let ctx = DocumentContext::new(&doc);
    let fonts: Vec<String> = DocumentQuery::new(&doc, &ctx).fonts().into_iter().collect();
    assert_eq!(fonts, vec!["Inter".to_string()]);
}

#[test]
fn vector_bounds_come_from_curves() {
    let doc = landing();
    let ctx = DocumentContext::new(&doc);
    let rect = DocumentQuery::new(&doc, &ctx).absolute_rect(id("logo")).unwrap();
    assert_eq!(rect.x, 40.0);
    assert_eq!(rect.width, 48.0);
    assert!((rect.height - 24.0).abs() < 1e-9);
}

// ─── Structural edits ────────────────────────────────────────────────────

#[test]
fn remove_then_rebuild_leaves_no_stale_entries() {
    let mut doc = landing();
    let removed = tree::remove(&mut doc, id("hero")).unwrap();
    assert_eq!(
        removed,
        vec![id("hero"), id("headline"), id("cta"), id("footer-note")]
    );
    let ctx = DocumentContext::new(&doc);
    for gone in &removed {
        assert!(!ctx.contains(*gone));
        assert_eq!(ctx.get_parent_id(*gone), None);
    }
    assert_eq!(doc.children_of(id("page")), &[id("logo")]);
    assert_eq!(doc.validate(), Ok(()));
}

#[test]
fn duplicate_via_prototype_gets_fresh_ids() {
    let mut doc = landing();
    let ctx = DocumentContext::new(&doc);
    let proto = NodePrototype::snapshot(&doc, &ctx, id("hero")).unwrap();
    let mut ids = SequentialIds::new("graph-copy");
    let sub = proto.to_sub_document(&mut ids);
    let root = sub.roots[0];
    let ctx = tree::import(&mut doc, sub, id("page"), None).unwrap();

    assert_eq!(ctx.get_children(root).len(), 3);
    assert_eq!(doc.nodes.len(), 10);
    assert_eq!(doc.validate(), Ok(()));
}

#[test]
fn importing_a_scene_is_refused() {
    let mut doc = landing();
    let scene = Node::scene(id("graph-scene-2"), "Other", ChildrenConstraint::Multiple);
    assert_eq!(
        tree::import(&mut doc, SubDocument::single(scene), id("hero"), None),
        Err(DocumentError::NestedScene(id("graph-scene-2")))
    );
}

// ─── Laws ────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pruned_selection_has_no_nested_pairs(picks in proptest::collection::vec(0usize..6, 0..8)) {
        let doc = landing();
        let ctx = DocumentContext::new(&doc);
        let ids: Vec<NodeId> = picks.iter().map(|i| ctx.lu_keys[*i]).collect();
        let pruned = ctx.prune_nested_nodes(&ids);
        for a in &pruned {
            for b in &pruned {
                prop_assert!(!ctx.is_ancestor_of(*a, *b));
            }
        }
        for original in &ids {
            let covered = pruned.contains(original)
                || pruned.iter().any(|p| ctx.is_ancestor_of(*p, *original));
            prop_assert!(covered);
        }
    }

    #[test]
    fn evaluate_zero_tangent_landmarks(ax in -1e3f64..1e3, ay in -1e3f64..1e3, bx in -1e3f64..1e3, by in -1e3f64..1e3) {
        let (a, b) = (Vector2::new(ax, ay), Vector2::new(bx, by));
        let z = Vector2::ZERO;
        prop_assert_eq!(bezier::evaluate(a, b, z, z, 0.0), a);
        prop_assert_eq!(bezier::evaluate(a, b, z, z, 1.0), b);
        prop_assert!(bezier::evaluate(a, b, z, z, 0.5).distance(a.lerp(b, 0.5)) < 1e-9);
    }
}
