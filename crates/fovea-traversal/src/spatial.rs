#![forbid(unsafe_code)]

//! Directional (2D) focus navigation.
//!
//! # Design
//!
//! Given the focused node and an arrow direction, every eligible node in
//! scope is filtered to those strictly ahead in that direction, then scored
//! against *two* reference rectangles: the literal current bounds and a
//! biased rectangle that keeps the anchor's position on the cross axis (so
//! a run of same-direction moves stays in the anchor's visual column or
//! row). Seven independent "best so far" winners are tracked because no
//! single metric is right for every layout:
//!
//! 1. nearest on the anchor's perpendicular band
//! 2. nearest on the current node's perpendicular band
//! 3. best simple 2D metric measured from the biased rectangle
//! 4. best simple 2D metric measured from the current bounds
//! 5. best averaged corner/mid distance (tolerates partial misalignment)
//! 6. closest leading corner
//! 7. shortest distance of any corner/mid combination, anywhere
//!
//! The winners are then run through a fixed preference cascade. The cascade
//! precedence is empirically tuned; the branch order is load-bearing and is
//! deliberately kept as-is. Do not reorder without scenario coverage.
//!
//! Reversing direction mid-run (e.g. Down, Down, Up) retraces the recorded
//! path exactly instead of re-scoring, so a reversal always undoes the
//! previous move even when the scoring would have picked another node.
//!
//! `Next`/`Previous` fall back to document order and clear the session.

use fovea_core::{NodeId, Point, Rect};

use crate::context::TraversalContext;
use crate::direction::Direction;
use crate::engine::Algorithm;
use crate::metrics::{min_of, out_distance, simple_2d_metric};
use crate::order::DocumentOrder;
use crate::session::TraversalSession;

/// The directional navigation algorithm with its per-run session cache.
#[derive(Debug, Clone, Default)]
pub struct SpatialNav {
    session: TraversalSession,
}

impl SpatialNav {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the session cache (diagnostics and tests).
    #[must_use]
    pub fn session(&self) -> &TraversalSession {
        &self.session
    }
}

impl Algorithm for SpatialNav {
    fn select(
        &mut self,
        current: NodeId,
        dir: Direction,
        ctx: &TraversalContext<'_>,
    ) -> Option<NodeId> {
        if !dir.is_directional() {
            // Tab traversal cancels any directional run.
            self.session.invalidate();
            return DocumentOrder.select(current, dir, ctx);
        }
        self.select_directional(current, dir, ctx)
    }

    fn select_first(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId> {
        DocumentOrder.select_first(ctx)
    }

    fn select_last(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId> {
        DocumentOrder.select_last(ctx)
    }
}

impl SpatialNav {
    fn select_directional(
        &mut self,
        current: NodeId,
        dir: Direction,
        ctx: &TraversalContext<'_>,
    ) -> Option<NodeId> {
        let reversing = self.session.advance(current, dir);

        // The anchor went stale or stopped being traversable: restart the
        // run from the current node.
        if let Some(anchor) = self.session.anchor() {
            if !ctx.tree().is_focus_traversable(anchor) || ctx.bounds(anchor).is_none() {
                self.session.reanchor(current, dir);
            }
        }

        let mut retrace = None;
        if reversing {
            match self.session.peek_retrace() {
                Some(top) if ctx.tree().is_focus_traversable(top) => {
                    retrace = self.session.pop_retrace();
                }
                _ => {
                    // The recorded path is no longer walkable.
                    self.session.invalidate();
                    self.session.reanchor(current, dir);
                }
            }
        }

        let current_bounds = ctx.bounds(current)?;
        let anchor_bounds = self
            .session
            .anchor()
            .and_then(|a| ctx.bounds(a))
            .unwrap_or(current_bounds);

        let targets = ctx.targets(current);
        if targets.is_empty() {
            self.session.invalidate();
            return None;
        }

        // Reversal short-circuit: exactly undo the previous same-axis move.
        if let Some(found) = retrace {
            self.session.record(current, found);
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "spatial.retrace", from = %current, to = %found);
            return Some(found);
        }

        let (found, bands_empty) = if dir.is_vertical() {
            nearest_vertical(ctx, &targets, current_bounds, anchor_bounds, dir)
        } else {
            nearest_horizontal(ctx, &targets, current_bounds, anchor_bounds, dir)
        };

        if bands_empty {
            // Nothing on either perpendicular band: the run has left the
            // column/row the anchor pinned, so the cache no longer helps.
            self.session.invalidate();
        }
        if let Some(to) = found {
            self.session.record(current, to);
        }
        #[cfg(feature = "tracing")]
        match found {
            Some(to) => {
                tracing::trace!(message = "spatial.select", from = %current, to = %to, dir = ?dir);
            }
            None => tracing::trace!(message = "spatial.select", from = %current, dir = ?dir),
        }
        found
    }
}

/// Per-candidate scoring record. Lives for one selection call.
#[derive(Debug, Clone)]
struct TargetScore {
    node: NodeId,
    bounds: Rect,
    /// Simple 2D metric measured from the biased rectangle.
    biased_metric: f64,
    /// Simple 2D metric measured from the literal current bounds.
    current_metric: f64,
    /// Leading-corner distance on the cross-axis start side
    /// (left corner for vertical travel, top corner for horizontal).
    start_corner_distance: f64,
    /// Mid-point distance, biased by the anchor's cross-axis extent.
    mid_distance: f64,
    /// Far-corner distance on the cross-axis end side, biased by the anchor.
    end_corner_distance: f64,
    /// Minimum over the nine current-referenced corner/mid combinations.
    shortest_distance: f64,
    /// Minimum over the nine anchor-biased combinations.
    bias_shortest_distance: f64,
    /// Mean of seven representative corner/mid distances.
    average_distance: f64,
    /// Distance from the anchor's leading corner; filled in for the band
    /// and average winners after the scan.
    origin_corner_distance: f64,
}

impl TargetScore {
    fn new(node: NodeId, bounds: Rect) -> Self {
        Self {
            node,
            bounds,
            biased_metric: f64::MAX,
            current_metric: f64::MAX,
            start_corner_distance: f64::MAX,
            mid_distance: f64::MAX,
            end_corner_distance: f64::MAX,
            shortest_distance: f64::MAX,
            bias_shortest_distance: f64::MAX,
            average_distance: f64::MAX,
            origin_corner_distance: f64::MAX,
        }
    }
}

/// Scan and select for `Up`/`Down`. Returns the winner and whether both
/// perpendicular bands came up empty.
fn nearest_vertical(
    ctx: &TraversalContext<'_>,
    targets: &[NodeId],
    cur: Rect,
    origin: Rect,
    dir: Direction,
) -> (Option<NodeId>, bool) {
    let down = dir == Direction::Down;
    let y_in_dir = |r: &Rect| if down { r.max_y } else { r.min_y };
    let y_opposite = |r: &Rect| if down { r.min_y } else { r.max_y };

    // Anchor's horizontal band at the current vertical position.
    let biased = Rect::from_edges(origin.min_x, cur.min_y, origin.max_x, cur.max_y);

    let cur_mid = Point::new(cur.center_x(), cur.min_y);
    let cur_start = Point::new(cur.min_x, y_in_dir(&cur));
    let cur_end = Point::new(cur.max_x, y_in_dir(&cur));
    let origin_start = Point::new(origin.min_x, y_in_dir(&origin));

    let mut on_anchor_band: Option<TargetScore> = None;
    let mut on_current_band: Option<TargetScore> = None;
    let mut anchor_simple: Option<TargetScore> = None;
    let mut current_simple: Option<TargetScore> = None;
    let mut best_average: Option<TargetScore> = None;
    let mut best_corner: Option<TargetScore> = None;
    let mut best_anywhere: Option<TargetScore> = None;

    for &id in targets {
        let Some(tb) = ctx.bounds(id) else { continue };
        // Keep only targets strictly ahead in the travel direction.
        let ahead = if down {
            cur.max_y < tb.min_y
        } else {
            cur.min_y > tb.max_y
        };
        if !ahead {
            continue;
        }

        let out_biased = out_distance(dir, &biased, &tb);
        let out_current = out_distance(dir, &cur, &tb);

        let mut score = TargetScore::new(id, tb);
        score.biased_metric = simple_2d_metric(dir, &biased, &tb);
        score.current_metric = simple_2d_metric(dir, &cur, &tb);

        let ty = y_opposite(&tb);
        score.start_corner_distance = cur_start.distance_to(tb.min_x, ty);
        score.mid_distance = cur_mid.distance_to(tb.min_x + origin.width() / 2.0, ty);
        score.end_corner_distance = cur_end.distance_to(origin.max_x, ty);

        let cur_start_to_mid = cur_start.distance_to(tb.center_x(), ty);
        let cur_start_to_end = cur_start.distance_to(tb.max_x, ty);
        let cur_end_to_start = cur_end.distance_to(tb.min_x, ty);
        let cur_end_to_mid = cur_end.distance_to(tb.center_x(), ty);
        let cur_end_to_end = cur_end.distance_to(tb.max_x, ty);
        let cur_mid_to_start = cur_mid.distance_to(tb.min_x, ty);
        let cur_mid_to_mid = cur_mid.distance_to(tb.center_x(), ty);
        let cur_mid_to_end = cur_mid.distance_to(tb.max_x, ty);

        let bias_start_to_mid = cur_start.distance_to(tb.min_x + origin.width() / 2.0, ty);
        let bias_start_to_end = cur_start.distance_to(origin.max_x, ty);
        let bias_end_to_mid = cur_end.distance_to(tb.min_x + origin.width() / 2.0, ty);
        let bias_mid_to_end = cur_mid.distance_to(origin.max_x, ty);

        score.average_distance = (score.start_corner_distance
            + bias_start_to_mid
            + bias_start_to_end
            + cur_end_to_start
            + score.end_corner_distance
            + bias_end_to_mid
            + score.mid_distance)
            / 7.0;

        score.bias_shortest_distance = min_of(&[
            score.start_corner_distance,
            bias_start_to_mid,
            bias_start_to_end,
            cur_end_to_start,
            bias_end_to_mid,
            score.end_corner_distance,
            cur_mid_to_start,
            score.mid_distance,
            bias_mid_to_end,
        ]);
        score.shortest_distance = min_of(&[
            score.start_corner_distance,
            cur_start_to_mid,
            cur_start_to_end,
            cur_end_to_start,
            cur_end_to_mid,
            cur_end_to_end,
            cur_mid_to_start,
            cur_mid_to_mid,
            cur_mid_to_end,
        ]);

        if out_biased >= 0.0
            && anchor_simple
                .as_ref()
                .is_none_or(|b| score.biased_metric < b.biased_metric)
        {
            anchor_simple = Some(score.clone());
        }
        if out_current >= 0.0
            && current_simple
                .as_ref()
                .is_none_or(|b| score.current_metric < b.current_metric)
        {
            current_simple = Some(score.clone());
        }
        if origin.max_x > tb.min_x
            && tb.max_x > origin.min_x
            && on_anchor_band
                .as_ref()
                .is_none_or(|b| b.bias_shortest_distance > score.bias_shortest_distance)
        {
            on_anchor_band = Some(score.clone());
        }
        if cur.max_x > tb.min_x
            && tb.max_x > cur.min_x
            && on_current_band
                .as_ref()
                .is_none_or(|b| b.bias_shortest_distance > score.bias_shortest_distance)
        {
            on_current_band = Some(score.clone());
        }
        // Corner and average winners only count when the target sits on the
        // same side of the current node as the anchor does.
        let same_side = (origin.min_x >= cur.min_x && tb.min_x >= cur.min_x)
            || (origin.min_x <= cur.min_x && tb.min_x <= cur.min_x);
        if same_side
            && best_corner
                .as_ref()
                .is_none_or(|b| b.start_corner_distance > score.start_corner_distance)
        {
            best_corner = Some(score.clone());
        }
        if same_side
            && best_average
                .as_ref()
                .is_none_or(|b| b.average_distance > score.average_distance)
        {
            best_average = Some(score.clone());
        }
        if best_anywhere
            .as_ref()
            .is_none_or(|b| b.shortest_distance > score.shortest_distance)
        {
            best_anywhere = Some(score);
        }
    }

    for winner in [&mut on_anchor_band, &mut on_current_band, &mut best_average] {
        if let Some(s) = winner.as_mut() {
            s.origin_corner_distance = origin_start.distance_to(s.bounds.min_x, y_opposite(&s.bounds));
        }
    }

    let bands_empty = on_anchor_band.is_none() && on_current_band.is_none();

    // ── Selection cascade ────────────────────────────────────────────────
    // The precedence below is empirically tuned; the branch order matters.

    match &on_anchor_band {
        Some(oa) if oa.bias_shortest_distance < f64::MAX => {
            let current_band_agrees = on_current_band.as_ref().is_some_and(|oc| oc.node == oa.node);
            let smoother_agrees = best_average.as_ref().is_some_and(|w| w.node == oa.node)
                || anchor_simple.as_ref().is_some_and(|w| w.node == oa.node)
                || best_corner.as_ref().is_some_and(|w| w.node == oa.node)
                || best_anywhere.as_ref().is_some_and(|w| w.node == oa.node);
            if current_band_agrees && smoother_agrees {
                return (Some(oa.node), bands_empty);
            }
            if best_average.as_ref().is_some_and(|w| w.node == oa.node) {
                return (Some(oa.node), bands_empty);
            }
            if let Some(oc) = &on_current_band {
                if oc.bias_shortest_distance < f64::MAX {
                    if oc.start_corner_distance < oa.start_corner_distance
                        && oc.origin_corner_distance < oa.origin_corner_distance
                        && (oc.bounds.min_x - cur_start.x) < (oa.bounds.min_x - cur_start.x)
                    {
                        return (Some(oc.node), bands_empty);
                    }
                    if best_average
                        .as_ref()
                        .is_none_or(|w| oa.average_distance < w.average_distance)
                    {
                        return (Some(oa.node), bands_empty);
                    }
                }
            }
        }
        _ => {
            if on_anchor_band.is_none() && on_current_band.is_none() {
                if let Some(c2) = &current_simple {
                    if let (Some(avg), Some(corner)) = (&best_average, &best_corner) {
                        if avg.node == corner.node
                            && best_anywhere.as_ref().is_some_and(|w| w.node == avg.node)
                        {
                            return (Some(avg.node), bands_empty);
                        }
                    }
                    return (Some(c2.node), bands_empty);
                }
            } else if let (Some(avg), Some(corner), Some(any)) =
                (&best_average, &best_corner, &best_anywhere)
            {
                if avg.bias_shortest_distance == corner.bias_shortest_distance
                    && avg.bias_shortest_distance == any.bias_shortest_distance
                    && avg.bias_shortest_distance < f64::MAX
                {
                    if let Some(oa) = &on_anchor_band {
                        if oa.origin_corner_distance < avg.origin_corner_distance {
                            return (Some(oa.node), bands_empty);
                        }
                    }
                    return (Some(avg.node), bands_empty);
                }
            }
        }
    }

    // Is the average-distance winner closer than the anchor band's?
    if let Some(avg) = &best_average {
        if on_anchor_band
            .as_ref()
            .is_none_or(|oa| avg.bias_shortest_distance < oa.bias_shortest_distance)
        {
            // ...unless a band winner physically sits in the way.
            if let Some(oa) = &on_anchor_band {
                if y_opposite(&oa.bounds) >= y_opposite(&avg.bounds) {
                    return (Some(oa.node), bands_empty);
                }
            }
            if let Some(a2) = &anchor_simple {
                if a2.current_metric <= avg.current_metric {
                    return (Some(a2.node), bands_empty);
                }
                if y_opposite(&a2.bounds) >= y_opposite(&avg.bounds) {
                    return (Some(a2.node), bands_empty);
                }
            }
            return (Some(avg.node), bands_empty);
        }
    }

    // When every current-referenced criterion agrees on one node, take it,
    // even though it is neither band winner. Odd, but it reads better in
    // most layouts.
    if let (Some(c2), Some(oc), Some(avg), Some(corner), Some(any)) = (
        &current_simple,
        &on_current_band,
        &best_average,
        &best_corner,
        &best_anywhere,
    ) {
        if c2.node == oc.node && c2.node == avg.node && c2.node == corner.node && c2.node == any.node
        {
            return (Some(c2.node), bands_empty);
        }
    }

    if let Some(oa) = &on_anchor_band {
        if on_current_band
            .as_ref()
            .is_none_or(|oc| oa.end_corner_distance < oc.end_corner_distance)
        {
            return (Some(oa.node), bands_empty);
        }
    }

    // No clear winner: strict priority over the remaining contenders.
    let fallback = [
        &on_anchor_band,
        &anchor_simple,
        &on_current_band,
        &best_average,
        &best_corner,
        &best_anywhere,
    ]
    .into_iter()
    .find_map(|w| w.as_ref().map(|s| s.node));
    (fallback, bands_empty)
}

/// Scan and select for `Left`/`Right`: the vertical pass with axis roles
/// swapped, plus the horizontal-specific cascade branches.
fn nearest_horizontal(
    ctx: &TraversalContext<'_>,
    targets: &[NodeId],
    cur: Rect,
    origin: Rect,
    dir: Direction,
) -> (Option<NodeId>, bool) {
    let left = dir == Direction::Left;
    let x_in_dir = |r: &Rect| if left { r.min_x } else { r.max_x };
    let x_opposite = |r: &Rect| if left { r.max_x } else { r.min_x };

    // Anchor's vertical band at the current horizontal position.
    let biased = Rect::new(x_in_dir(&cur), origin.min_y, cur.width(), origin.height());

    let cur_mid = Point::new(x_in_dir(&cur), cur.center_y());
    let cur_start = Point::new(x_in_dir(&cur), cur.min_y);
    let cur_end = Point::new(x_in_dir(&cur), cur.max_y);
    let origin_start = Point::new(x_in_dir(&origin), origin.min_y);

    let mut on_anchor_band: Option<TargetScore> = None;
    let mut on_current_band: Option<TargetScore> = None;
    let mut anchor_simple: Option<TargetScore> = None;
    let mut current_simple: Option<TargetScore> = None;
    let mut best_average: Option<TargetScore> = None;
    let mut best_corner: Option<TargetScore> = None;
    let mut best_anywhere: Option<TargetScore> = None;

    for &id in targets {
        let Some(tb) = ctx.bounds(id) else { continue };
        // Keep only targets strictly ahead in the travel direction.
        let ahead = if left {
            cur.min_x > tb.min_x
        } else {
            cur.max_x < tb.max_x
        };
        if !ahead {
            continue;
        }

        let out_biased = out_distance(dir, &biased, &tb);
        let out_current = out_distance(dir, &cur, &tb);

        let mut score = TargetScore::new(id, tb);
        score.biased_metric = simple_2d_metric(dir, &biased, &tb);
        score.current_metric = simple_2d_metric(dir, &cur, &tb);

        let tx = x_opposite(&tb);
        score.start_corner_distance = cur_start.distance_to(tx, tb.min_y);
        score.mid_distance = cur_mid.distance_to(tx, tb.min_y + origin.height() / 2.0);
        score.end_corner_distance = cur_end.distance_to(x_opposite(&origin), tb.max_y);

        let cur_start_to_end = cur_start.distance_to(tx, tb.max_y);
        let cur_start_to_mid = cur_start.distance_to(tx, tb.center_y());
        let cur_end_to_start = cur_end.distance_to(tx, tb.min_y);
        let cur_end_to_end = cur_end.distance_to(tx, tb.max_y);
        let cur_end_to_mid = cur_end.distance_to(tx, tb.center_y());
        let cur_mid_to_start = cur_mid.distance_to(tx, tb.min_y);
        let cur_mid_to_end = cur_mid.distance_to(tx, tb.max_y);
        let cur_mid_to_mid = cur_mid.distance_to(tx, tb.center_y());

        let bias_start_to_end = cur_start.distance_to(x_opposite(&origin), tb.max_y);
        let bias_start_to_mid = cur_start.distance_to(tx, tb.min_y + origin.height() / 2.0);
        let bias_end_to_mid = cur_end.distance_to(tx, tb.min_y + origin.height() / 2.0);
        let bias_mid_to_end = cur_mid.distance_to(x_opposite(&origin), tb.max_y);

        score.average_distance = (score.start_corner_distance
            + bias_start_to_end
            + bias_start_to_mid
            + cur_end_to_start
            + score.end_corner_distance
            + bias_end_to_mid
            + score.mid_distance)
            / 7.0;

        score.bias_shortest_distance = min_of(&[
            score.start_corner_distance,
            bias_start_to_end,
            bias_start_to_mid,
            cur_end_to_start,
            score.end_corner_distance,
            bias_end_to_mid,
            cur_mid_to_start,
            bias_mid_to_end,
            score.mid_distance,
        ]);
        score.shortest_distance = min_of(&[
            score.start_corner_distance,
            cur_start_to_end,
            cur_start_to_mid,
            cur_end_to_start,
            cur_end_to_end,
            cur_end_to_mid,
            cur_mid_to_start,
            cur_mid_to_end,
            cur_mid_to_mid,
        ]);

        if out_biased >= 0.0
            && anchor_simple
                .as_ref()
                .is_none_or(|b| score.biased_metric < b.biased_metric)
        {
            anchor_simple = Some(score.clone());
        }
        if out_current >= 0.0
            && current_simple
                .as_ref()
                .is_none_or(|b| score.current_metric < b.current_metric)
        {
            current_simple = Some(score.clone());
        }
        if origin.max_y > tb.min_y
            && tb.max_y > origin.min_y
            && on_anchor_band
                .as_ref()
                .is_none_or(|b| b.start_corner_distance > score.start_corner_distance)
        {
            on_anchor_band = Some(score.clone());
        }
        if cur.max_y > tb.min_y
            && tb.max_y > cur.min_y
            && on_current_band
                .as_ref()
                .is_none_or(|b| b.start_corner_distance > score.start_corner_distance)
        {
            on_current_band = Some(score.clone());
        }
        if best_corner
            .as_ref()
            .is_none_or(|b| b.start_corner_distance > score.start_corner_distance)
        {
            best_corner = Some(score.clone());
        }
        if best_average
            .as_ref()
            .is_none_or(|b| b.average_distance > score.average_distance)
        {
            best_average = Some(score.clone());
        }
        if best_anywhere
            .as_ref()
            .is_none_or(|b| b.shortest_distance > score.shortest_distance)
        {
            best_anywhere = Some(score);
        }
    }

    for winner in [&mut on_anchor_band, &mut on_current_band, &mut best_average] {
        if let Some(s) = winner.as_mut() {
            s.origin_corner_distance =
                origin_start.distance_to(x_opposite(&s.bounds), s.bounds.min_y);
        }
    }

    let bands_empty = on_anchor_band.is_none() && on_current_band.is_none();

    // ── Selection cascade ────────────────────────────────────────────────
    // Same skeleton as the vertical pass; the extra band-vs-band branches
    // in the middle exist only on this axis. Keep the branch order as-is.

    match &on_anchor_band {
        Some(oa) if oa.bias_shortest_distance < f64::MAX => {
            let current_band_agrees = on_current_band.as_ref().is_some_and(|oc| oc.node == oa.node);
            let smoother_agrees = best_average.as_ref().is_some_and(|w| w.node == oa.node)
                || best_corner.as_ref().is_some_and(|w| w.node == oa.node)
                || best_anywhere.as_ref().is_some_and(|w| w.node == oa.node);
            if current_band_agrees && smoother_agrees {
                return (Some(oa.node), bands_empty);
            }
            if best_average.as_ref().is_some_and(|w| w.node == oa.node) {
                return (Some(oa.node), bands_empty);
            }
            if let Some(oc) = &on_current_band {
                if oc.bias_shortest_distance < f64::MAX {
                    if oc.end_corner_distance < oa.end_corner_distance
                        && oc.origin_corner_distance < oa.origin_corner_distance
                        && (oc.bounds.min_y - cur_start.y) < (oa.bounds.min_y - cur_start.y)
                    {
                        return (Some(oc.node), bands_empty);
                    }
                    if best_average
                        .as_ref()
                        .is_none_or(|w| oa.average_distance < w.average_distance)
                    {
                        return (Some(oa.node), bands_empty);
                    }
                }
            }
        }
        _ => {
            if on_anchor_band.is_none() && on_current_band.is_none() {
                if let Some(c2) = &current_simple {
                    if let (Some(avg), Some(corner)) = (&best_average, &best_corner) {
                        if avg.node == corner.node
                            && best_anywhere.as_ref().is_some_and(|w| w.node == avg.node)
                        {
                            return (Some(avg.node), bands_empty);
                        }
                    }
                    return (Some(c2.node), bands_empty);
                }
            } else if let (Some(avg), Some(corner), Some(any)) =
                (&best_average, &best_corner, &best_anywhere)
            {
                if avg.bias_shortest_distance == corner.bias_shortest_distance
                    && avg.bias_shortest_distance == any.bias_shortest_distance
                    && avg.bias_shortest_distance < f64::MAX
                {
                    if let Some(oa) = &on_anchor_band {
                        if oa.origin_corner_distance < avg.origin_corner_distance {
                            return (Some(oa.node), bands_empty);
                        }
                    }
                    return (Some(avg.node), bands_empty);
                }
            }
        }
    }

    // Is the average-distance winner closer than the anchor band's?
    if let Some(avg) = &best_average {
        if on_anchor_band
            .as_ref()
            .is_none_or(|oa| avg.bias_shortest_distance < oa.bias_shortest_distance)
        {
            // ...unless a band winner physically sits in the way.
            if let Some(oa) = &on_anchor_band {
                if x_opposite(&oa.bounds) >= x_opposite(&avg.bounds) {
                    return (Some(oa.node), bands_empty);
                }
            }
            if let (Some(oa), Some(oc)) = (&on_anchor_band, &on_current_band) {
                if oa.bias_shortest_distance < f64::MAX && oa.node == oc.node {
                    return (Some(oa.node), bands_empty);
                }
                if oc.bias_shortest_distance < f64::MAX
                    && oc.bias_shortest_distance < oa.bias_shortest_distance
                {
                    return (Some(oc.node), bands_empty);
                }
            }
            if let Some(oa) = &on_anchor_band {
                if oa.bias_shortest_distance < f64::MAX
                    && oa.origin_corner_distance < avg.origin_corner_distance
                {
                    return (Some(oa.node), bands_empty);
                }
            }
            return (Some(avg.node), bands_empty);
        }
    }

    if let (Some(oa), Some(oc)) = (&on_anchor_band, &on_current_band) {
        if oa.end_corner_distance < oc.end_corner_distance {
            return (Some(oa.node), bands_empty);
        }
    }

    if let (Some(oc), Some(corner)) = (&on_current_band, &best_corner) {
        if oc.bias_shortest_distance < f64::MAX && oc.node == corner.node {
            return (Some(oc.node), bands_empty);
        }
    }

    // No clear winner: strict priority over the remaining contenders.
    let fallback = [
        &on_anchor_band,
        &anchor_simple,
        &on_current_band,
        &best_average,
        &best_corner,
        &best_anywhere,
    ]
    .into_iter()
    .find_map(|w| w.as_ref().map(|s| s.node));
    (fallback, bands_empty)
}
