//! Winding roads
//!
//! A straight line is cut into waypoints, the inner waypoints are nudged
//! around while spacing and turn angles stay acceptable, and the result
//! is joined back together with straight 4-connected segments.

use crate::map::{Point, Rect, TileGrid, TileKind, TileState, line, orthogonalize};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadParams {
    /// Distance between waypoints along the initial line
    pub step: usize,
    /// Allowed distance between neighbouring waypoints
    pub min_spacing: f64,
    pub max_spacing: f64,
    /// Perturbation passes over all inner waypoints
    pub passes: u32,
    /// Minimum squared cosine of any turn; 0.5 is 45 degrees
    pub min_cos_sq: f64,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            step: 6,
            min_spacing: 3.0,
            max_spacing: 10.0,
            passes: 6,
            min_cos_sq: 0.5,
        }
    }
}

/// True when turning from direction `u` to `v` stays within the angle
fn gentle(u: (i64, i64), v: (i64, i64), min_cos_sq: f64) -> bool {
    let dot = u.0 * v.0 + u.1 * v.1;
    if dot <= 0 {
        return false;
    }
    let uu = u.0 * u.0 + u.1 * u.1;
    let vv = v.0 * v.0 + v.1 * v.1;
    (dot * dot) as f64 >= min_cos_sq * (uu * vv) as f64
}

fn dir(a: Point, b: Point) -> (i64, i64) {
    (i64::from(b.x - a.x), i64::from(b.y - a.y))
}

/// Turn at `pts[i]` between its neighbours is acceptable
fn turn_ok(pts: &[Point], i: usize, params: &RoadParams) -> bool {
    if i == 0 || i + 1 >= pts.len() {
        return true;
    }
    gentle(dir(pts[i - 1], pts[i]), dir(pts[i], pts[i + 1]), params.min_cos_sq)
}

fn spacing_ok(a: Point, b: Point, params: &RoadParams) -> bool {
    let d = a.distance(b);
    d >= params.min_spacing && d <= params.max_spacing
}

/// Waypoints along the straight line from `a` to `b`, ends included
fn waypoints(a: Point, b: Point, step: usize) -> Vec<Point> {
    let base = line(a, b);
    let step = step.max(1);
    let mut pts: Vec<Point> = base.iter().step_by(step).copied().collect();
    // drop a stub before the end so the last leg is not too short
    if pts.len() > 1 && (base.len() - 1) % step < step / 2 {
        pts.pop();
    }
    if pts.last() != Some(&b) {
        pts.push(b);
    }
    pts
}

/// A 4-connected winding path from `a` to `b`. Ends are exact and every
/// cell lies inside `area` when both ends do.
pub fn winding_road<R: RandomSource>(
    a: Point,
    b: Point,
    area: Rect,
    params: &RoadParams,
    rng: &mut R,
) -> Vec<Point> {
    if a == b {
        return vec![a];
    }
    let mut pts = waypoints(a, b, params.step);

    for _ in 0..params.passes {
        for i in 1..pts.len().saturating_sub(1) {
            let old = pts[i];
            let moved = old.offset(rng.range(-1, 1), rng.range(-1, 1));
            if moved == old || !area.contains(moved) {
                continue;
            }
            if !spacing_ok(pts[i - 1], moved, params) || !spacing_ok(moved, pts[i + 1], params) {
                continue;
            }
            pts[i] = moved;
            if !(turn_ok(&pts, i - 1, params) && turn_ok(&pts, i, params) && turn_ok(&pts, i + 1, params)) {
                pts[i] = old;
            }
        }
    }

    let mut path = vec![a];
    for w in pts.windows(2) {
        path.extend(line(w[0], w[1]).into_iter().skip(1));
    }
    orthogonalize(&path)
}

/// Paint a road path and mark it as known ground
pub fn draw_road(grid: &mut TileGrid, path: &[Point], kind: TileKind) {
    for &p in path {
        grid.set(p, kind);
        grid.clear_foreground(p);
        grid.mark(p, TileState::VISITED | TileState::SEEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    #[test]
    fn test_gentle_turns() {
        assert!(gentle((1, 0), (1, 0), 0.5));
        assert!(gentle((1, 0), (1, 1), 0.5));
        assert!(!gentle((1, 0), (1, 2), 0.5));
        assert!(!gentle((1, 0), (0, 1), 0.5));
        assert!(!gentle((1, 0), (-1, 0), 0.5));
    }

    #[test]
    fn test_waypoints_keep_ends() {
        let pts = waypoints(Point::new(0, 0), Point::new(20, 0), 6);
        assert_eq!(pts.first(), Some(&Point::new(0, 0)));
        assert_eq!(pts.last(), Some(&Point::new(20, 0)));
        for w in pts.windows(2) {
            assert!(w[0].distance(w[1]) >= 3.0);
        }
    }

    #[test]
    fn test_road_connects_and_winds() {
        let area = Rect::new(0, 0, 59, 29);
        let a = Point::new(2, 15);
        let b = Point::new(57, 15);
        let mut straight = true;
        for seed in 0..5 {
            let mut rng = GameRng::new(seed);
            let path = winding_road(a, b, area, &RoadParams::default(), &mut rng);
            assert_eq!(path.first(), Some(&a));
            assert_eq!(path.last(), Some(&b));
            for w in path.windows(2) {
                assert_eq!(w[0].manhattan(w[1]), 1);
            }
            straight &= path.iter().all(|p| p.y == 15);
        }
        assert!(!straight);
    }

    #[test]
    fn test_draw_road_marks_cells() {
        let mut grid = TileGrid::new(10, 10, TileKind::Grass);
        let path = [Point::new(1, 1), Point::new(2, 1)];
        draw_road(&mut grid, &path, TileKind::Road);
        assert_eq!(grid.background(Point::new(2, 1)), TileKind::Road);
        assert!(grid.state(Point::new(1, 1)).contains(TileState::VISITED | TileState::SEEN));
        assert!(!grid.state(Point::new(3, 1)).contains(TileState::SEEN));
    }
}
