#![forbid(unsafe_code)]

//! Geometric scoring primitives for directional navigation.
//!
//! Pure functions over axis-aligned rects, parameterized by the travel
//! direction. Vertical moves (`Up`/`Down`) operate on the Y axis with X as
//! the perpendicular axis; horizontal moves swap the roles.

use fovea_core::Rect;

use crate::direction::Direction;

/// Off-axis candidates start at this penalty so that any on-axis candidate
/// outranks every off-axis one under the simple 2D metric.
pub const OFF_AXIS_PENALTY: f64 = 100_000.0;

/// Whether `target`'s span on the axis perpendicular to `dir` overlaps
/// `current`'s span on that axis, i.e. the target is roughly in line with
/// the current node along the direction of travel.
#[must_use]
pub fn is_on_axis(dir: Direction, current: &Rect, target: &Rect) -> bool {
    let (cmin, cmax, tmin, tmax) = if dir.is_vertical() {
        (current.min_x, current.max_x, target.min_x, target.max_x)
    } else {
        (current.min_y, current.max_y, target.min_y, target.max_y)
    };
    tmin <= cmax && tmax >= cmin
}

/// Signed distance from `current`'s leading edge in `dir` to `target`'s
/// near edge. Negative means the target is behind the current node.
#[must_use]
pub fn out_distance(dir: Direction, current: &Rect, target: &Rect) -> f64 {
    match dir {
        Direction::Up => current.min_y - target.max_y,
        Direction::Down => target.min_y - current.max_y,
        Direction::Left => current.min_x - target.max_x,
        _ => target.min_x - current.max_x,
    }
}

/// Absolute distance between the two centers along the perpendicular axis.
/// Only meaningful for on-axis targets.
#[must_use]
pub fn center_side_distance(dir: Direction, current: &Rect, target: &Rect) -> f64 {
    let (cc, tc) = if dir.is_vertical() {
        (current.center_x(), target.center_x())
    } else {
        (current.center_y(), target.center_y())
    };
    (tc - cc).abs()
}

/// Perpendicular-axis gap between the nearest corners of `current` and
/// `target`. Only meaningful for off-axis targets.
#[must_use]
pub fn corner_side_distance(dir: Direction, current: &Rect, target: &Rect) -> f64 {
    if dir.is_vertical() {
        if target.min_x > current.max_x {
            // to the right of current
            target.min_x - current.max_x
        } else {
            // to the left
            current.min_x - target.max_x
        }
    } else if target.min_y > current.max_y {
        // below current
        target.min_y - current.max_y
    } else {
        // above
        current.min_y - target.max_y
    }
}

/// The simple 2D metric: out-distance dominates, with the perpendicular
/// center offset as a weak tiebreaker on-axis and a quadratic penalty
/// off-axis. Lower is better.
#[must_use]
pub fn simple_2d_metric(dir: Direction, current: &Rect, target: &Rect) -> f64 {
    let outd = out_distance(dir, current, target);
    if is_on_axis(dir, current, target) {
        outd + center_side_distance(dir, current, target) / 100.0
    } else {
        let cosd = corner_side_distance(dir, current, target);
        OFF_AXIS_PENALTY + outd * outd + 9.0 * cosd * cosd
    }
}

/// Minimum of a slice of distances.
#[must_use]
pub fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MAX, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Down, Left, Right, Up};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn on_axis_is_perpendicular_overlap() {
        let cur = rect(0.0, 0.0, 50.0, 20.0);
        // Same column, below: on-axis for vertical moves.
        assert!(is_on_axis(Down, &cur, &rect(10.0, 100.0, 30.0, 20.0)));
        // Shifted fully right: off-axis vertically, on-axis horizontally.
        let side = rect(60.0, 0.0, 50.0, 20.0);
        assert!(!is_on_axis(Down, &cur, &side));
        assert!(is_on_axis(Right, &cur, &side));
    }

    #[test]
    fn out_distance_signs() {
        let cur = rect(0.0, 0.0, 50.0, 20.0);
        let below = rect(0.0, 30.0, 50.0, 20.0);
        assert_eq!(out_distance(Down, &cur, &below), 10.0);
        assert!(out_distance(Up, &cur, &below) < 0.0);
        let right = rect(70.0, 0.0, 10.0, 20.0);
        assert_eq!(out_distance(Right, &cur, &right), 20.0);
        assert!(out_distance(Left, &cur, &right) < 0.0);
    }

    #[test]
    fn center_side_distance_uses_perpendicular_axis() {
        let cur = rect(0.0, 0.0, 50.0, 20.0);
        let tgt = rect(30.0, 100.0, 50.0, 20.0);
        // centers at x=25 and x=55
        assert_eq!(center_side_distance(Down, &cur, &tgt), 30.0);
        let tgt_h = rect(100.0, 6.0, 50.0, 20.0);
        // centers at y=10 and y=16
        assert_eq!(center_side_distance(Right, &cur, &tgt_h), 6.0);
    }

    #[test]
    fn corner_side_distance_picks_near_side() {
        let cur = rect(0.0, 0.0, 50.0, 20.0);
        let right_of = rect(80.0, 100.0, 10.0, 10.0);
        assert_eq!(corner_side_distance(Down, &cur, &right_of), 30.0);
        let left_of = rect(-40.0, 100.0, 10.0, 10.0);
        assert_eq!(corner_side_distance(Down, &cur, &left_of), 30.0);
        let above = rect(100.0, -50.0, 10.0, 10.0);
        assert_eq!(corner_side_distance(Right, &cur, &above), 40.0);
        let below = rect(100.0, 60.0, 10.0, 10.0);
        assert_eq!(corner_side_distance(Right, &cur, &below), 40.0);
    }

    #[test]
    fn on_axis_always_beats_off_axis_in_simple_metric() {
        let cur = rect(0.0, 0.0, 50.0, 20.0);
        // Far but aligned.
        let aligned = rect(0.0, 900.0, 50.0, 20.0);
        // Near but diagonal.
        let diagonal = rect(60.0, 30.0, 50.0, 20.0);
        assert!(simple_2d_metric(Down, &cur, &aligned) < simple_2d_metric(Down, &cur, &diagonal));
    }

    #[test]
    fn min_of_ignores_order() {
        assert_eq!(min_of(&[3.0, 1.0, 2.0]), 1.0);
        assert_eq!(min_of(&[]), f64::MAX);
    }
}
