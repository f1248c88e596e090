//! Property-based invariant tests for focus traversal.
//!
//! These verify:
//!
//! 1. A directional selection is always an eligible node strictly ahead of
//!    the current one, and `None` exactly when nothing is ahead.
//! 2. A lone ahead candidate always wins.
//! 3. An on-axis candidate outranks any off-axis candidate for the same
//!    direction, regardless of raw Euclidean distance.
//! 4. Tab order only ever yields eligible nodes, and `Next`/`Previous` are
//!    inverse cyclic permutations of the eligible sequence.
//! 5. `Next`/`Previous` traversal always invalidates the directional
//!    session cache.

use fovea_core::{NodeFlags, NodeId, Rect, SceneTree};
use fovea_traversal::{Algorithm, Direction, SpatialNav, TraversalContext};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_rect() -> impl Strategy<Value = Rect> {
    (0.0f64..900.0, 0.0f64..900.0, 5.0f64..120.0, 5.0f64..120.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn arb_flags() -> impl Strategy<Value = NodeFlags> {
    // Mostly plain traversable leaves, with a sprinkling of disabled and
    // hidden ones.
    prop_oneof![
        5 => Just(NodeFlags::TRAVERSABLE),
        1 => Just(NodeFlags::TRAVERSABLE.union(NodeFlags::DISABLED)),
        1 => Just(NodeFlags::TRAVERSABLE.union(NodeFlags::HIDDEN)),
        1 => Just(NodeFlags::empty()),
    ]
}

/// Mirror of the direction-specific "strictly ahead" candidacy filter.
fn is_ahead(dir: Direction, cur: &Rect, tgt: &Rect) -> bool {
    match dir {
        Direction::Up => cur.min_y > tgt.max_y,
        Direction::Down => cur.max_y < tgt.min_y,
        Direction::Left => cur.min_x > tgt.min_x,
        Direction::Right => cur.max_x < tgt.max_x,
        _ => false,
    }
}

fn build_flat_scene(rects: &[Rect], flags: &[NodeFlags]) -> (SceneTree, NodeId, Vec<NodeId>) {
    let mut tree = SceneTree::new();
    let root = tree
        .insert(None, Rect::new(0.0, 0.0, 1200.0, 1200.0), NodeFlags::empty())
        .unwrap();
    let ids = rects
        .iter()
        .zip(flags)
        .map(|(r, f)| tree.insert(Some(root), *r, *f).unwrap())
        .collect();
    (tree, root, ids)
}

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Selection soundness over random flat layouts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn selection_is_sound(
        rects in proptest::collection::vec(arb_rect(), 2..14),
        flags in proptest::collection::vec(arb_flags(), 14),
        current_index in 0usize..14,
        dir in arb_direction(),
    ) {
        let current_index = current_index % rects.len();
        let flags = &flags[..rects.len()];
        let (mut tree, root, ids) = build_flat_scene(&rects, flags);
        let current = ids[current_index];
        // The traversal starts somewhere real: force the current node
        // eligible.
        tree.set_flags(current, NodeFlags::TRAVERSABLE).unwrap();

        let cur_rect = rects[current_index];
        let ahead: Vec<NodeId> = ids
            .iter()
            .enumerate()
            .filter(|(i, id)| **id != current && tree.is_eligible(ids[*i]))
            .filter(|(i, _)| is_ahead(dir, &cur_rect, &rects[*i]))
            .map(|(_, id)| *id)
            .collect();

        let ctx = TraversalContext::new(&tree, root);
        let got = SpatialNav::new().select(current, dir, &ctx);

        match got {
            None => prop_assert!(
                ahead.is_empty(),
                "returned None with {} candidates ahead", ahead.len()
            ),
            Some(picked) => {
                prop_assert!(
                    ahead.contains(&picked),
                    "picked {picked} which is not an eligible ahead candidate"
                );
                if ahead.len() == 1 {
                    prop_assert_eq!(picked, ahead[0]);
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. On-axis candidates dominate off-axis ones
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn on_axis_beats_off_axis(
        cur in arb_rect(),
        dir in arb_direction(),
        far in 200.0f64..800.0,
        near in 1.0f64..30.0,
        gap in 5.0f64..80.0,
        size in 10.0f64..80.0,
    ) {
        // One candidate aligned with the current node but far away in the
        // travel direction; one candidate just ahead but fully off the
        // perpendicular band. The off-axis one is much closer in raw
        // distance and must still lose.
        let (on_rect, off_rect) = match dir {
            Direction::Down => (
                Rect::new(cur.min_x, cur.max_y + far, cur.width(), size),
                Rect::new(cur.max_x + gap, cur.max_y + near, size, size),
            ),
            Direction::Up => (
                Rect::new(cur.min_x, cur.min_y - far - size, cur.width(), size),
                Rect::new(cur.max_x + gap, cur.min_y - near - size, size, size),
            ),
            Direction::Right => (
                Rect::new(cur.max_x + far, cur.min_y, size, cur.height()),
                Rect::new(cur.max_x + near, cur.max_y + gap, size, size),
            ),
            _ => (
                Rect::new(cur.min_x - far - size, cur.min_y, size, cur.height()),
                Rect::new(cur.min_x - near - size, cur.max_y + gap, size, size),
            ),
        };

        let mut tree = SceneTree::new();
        let root = tree
            .insert(None, Rect::new(-2000.0, -2000.0, 5000.0, 5000.0), NodeFlags::empty())
            .unwrap();
        let current = tree.insert(Some(root), cur, NodeFlags::TRAVERSABLE).unwrap();
        let on_axis = tree.insert(Some(root), on_rect, NodeFlags::TRAVERSABLE).unwrap();
        let off_axis = tree.insert(Some(root), off_rect, NodeFlags::TRAVERSABLE).unwrap();

        let ctx = TraversalContext::new(&tree, root);
        let got = SpatialNav::new().select(current, dir, &ctx);
        prop_assert_eq!(
            got, Some(on_axis),
            "dir {:?}: off-axis {:?} beat on-axis {:?}", dir, off_axis, on_axis
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Tab order is a cyclic permutation of the eligible nodes
// ═════════════════════════════════════════════════════════════════════════

/// Eligible leaves in pre-order, honoring the subtree skip rules.
fn eligible_sequence(tree: &SceneTree, root: NodeId) -> Vec<NodeId> {
    fn walk(tree: &SceneTree, node: NodeId, out: &mut Vec<NodeId>) {
        if tree.is_disabled(node) || !tree.is_tree_visible(node) {
            return;
        }
        if tree.is_eligible(node) {
            out.push(node);
        }
        for &child in tree.children(node) {
            walk(tree, child, out);
        }
    }
    let mut out = Vec::new();
    for &child in tree.children(root) {
        walk(tree, child, &mut out);
    }
    out
}

proptest! {
    #[test]
    fn tab_order_cycles_through_eligible_nodes(
        shape in proptest::collection::vec(0usize..5, 1..5),
        flags in proptest::collection::vec(arb_flags(), 30),
    ) {
        // Containers are not traversable themselves, so Next and Previous
        // are exact cyclic inverses over the eligible leaves.
        let mut tree = SceneTree::new();
        let root = tree
            .insert(None, Rect::new(0.0, 0.0, 100.0, 100.0), NodeFlags::empty())
            .unwrap();
        let mut flag_iter = flags.into_iter();
        for &leaves in &shape {
            let panel = tree
                .insert(Some(root), Rect::default(), NodeFlags::empty())
                .unwrap();
            for _ in 0..leaves {
                let f = flag_iter.next().unwrap_or(NodeFlags::TRAVERSABLE);
                tree.insert(Some(panel), Rect::default(), f).unwrap();
            }
        }

        let seq = eligible_sequence(&tree, root);
        prop_assume!(!seq.is_empty());

        let ctx = TraversalContext::new(&tree, root);
        let mut nav = SpatialNav::new();
        for (i, &node) in seq.iter().enumerate() {
            let next = nav.select(node, Direction::Next, &ctx);
            prop_assert_eq!(next, Some(seq[(i + 1) % seq.len()]));
            let prev = nav.select(node, Direction::Previous, &ctx);
            prop_assert_eq!(prev, Some(seq[(i + seq.len() - 1) % seq.len()]));
            if let Some(n) = next {
                prop_assert!(ctx.tree().is_eligible(n));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Tab traversal invalidates the directional session
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tab_always_clears_the_session(
        rects in proptest::collection::vec(arb_rect(), 3..10),
        dir in arb_direction(),
    ) {
        let flags = vec![NodeFlags::TRAVERSABLE; rects.len()];
        let (tree, root, ids) = build_flat_scene(&rects, &flags);
        let ctx = TraversalContext::new(&tree, root);
        let mut nav = SpatialNav::new();
        // Seed a directional run (may or may not find a target).
        let _ = nav.select(ids[0], dir, &ctx);
        let _ = nav.select(ids[1], Direction::Next, &ctx);
        prop_assert!(nav.session().anchor().is_none());
        prop_assert_eq!(nav.session().history_len(), 0);
    }
}
