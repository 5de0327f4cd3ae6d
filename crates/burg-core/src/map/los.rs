//! Lines, line of sight and field of view

use super::geom::Point;
use super::grid::TileGrid;
use super::tile::TileState;

/// Bresenham line from `start` to `end`, both inclusive
pub fn line(start: Point, end: Point) -> Vec<Point> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (start.x, start.y);
    let (x1, y1) = (end.x, end.y);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        points.push(Point::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

/// Turn an 8-connected path into a 4-connected one by inserting the corner
/// cell at every diagonal step
pub fn orthogonalize(path: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(path.len() * 2);
    for &p in path {
        if let Some(&prev) = out.last() {
            if prev == p {
                continue;
            }
            if prev.x != p.x && prev.y != p.y {
                out.push(Point::new(p.x, prev.y));
            }
        }
        out.push(p);
    }
    out
}

/// True when no cell strictly between `from` and `to` blocks sight
pub fn has_line_of_sight(grid: &TileGrid, from: Point, to: Point) -> bool {
    if !grid.in_bounds(from) || !grid.in_bounds(to) {
        return false;
    }
    let cells = line(from, to);
    let inner = cells.len().saturating_sub(1);
    cells[..inner].iter().skip(1).all(|&p| !grid.is_block_los(p))
}

/// Cast rays from `origin` to every cell of the square perimeter at
/// `radius`. Every reached cell is marked SEEN, including the first
/// blocking cell of each ray. Returns the visible cells.
pub fn compute_fov(grid: &mut TileGrid, origin: Point, radius: i32) -> Vec<Point> {
    let mut visible = Vec::new();
    if !grid.in_bounds(origin) {
        return visible;
    }
    let mut seen = vec![false; (grid.width() * grid.height()) as usize];
    let mut reach = |grid: &mut TileGrid, p: Point, visible: &mut Vec<Point>| {
        let i = (p.y * grid.width() + p.x) as usize;
        if !seen[i] {
            seen[i] = true;
            visible.push(p);
            grid.mark(p, TileState::SEEN);
        }
    };
    reach(grid, origin, &mut visible);

    let r = radius.max(0);
    let rr = (r as i64) * (r as i64);
    let perimeter = (-r..=r).flat_map(|d| {
        [
            origin.offset(d, -r),
            origin.offset(d, r),
            origin.offset(-r, d),
            origin.offset(r, d),
        ]
    });
    let targets: Vec<Point> = perimeter.collect();
    for target in targets {
        for p in line(origin, target).into_iter().skip(1) {
            if !grid.in_bounds(p) || p.dist_sq(origin) > rr {
                break;
            }
            reach(grid, p, &mut visible);
            if grid.is_block_los(p) {
                break;
            }
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Rect, TileKind};

    #[test]
    fn test_line_endpoints() {
        let pts = line(Point::new(0, 0), Point::new(5, 2));
        assert_eq!(pts.first(), Some(&Point::new(0, 0)));
        assert_eq!(pts.last(), Some(&Point::new(5, 2)));
        assert_eq!(pts.len(), 6);
    }

    #[test]
    fn test_orthogonalize_is_four_connected() {
        let path = orthogonalize(&line(Point::new(0, 0), Point::new(4, 3)));
        for w in path.windows(2) {
            assert_eq!(w[0].manhattan(w[1]), 1);
        }
        assert_eq!(path.last(), Some(&Point::new(4, 3)));
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut grid = TileGrid::new(9, 3, TileKind::Floor);
        assert!(has_line_of_sight(&grid, Point::new(0, 1), Point::new(8, 1)));
        grid.set(Point::new(4, 1), TileKind::WallStone);
        assert!(!has_line_of_sight(&grid, Point::new(0, 1), Point::new(8, 1)));
        // the wall itself is visible
        assert!(has_line_of_sight(&grid, Point::new(0, 1), Point::new(4, 1)));
    }

    #[test]
    fn test_fov_stops_at_walls() {
        let mut grid = TileGrid::new(11, 11, TileKind::Floor);
        grid.fill_border(Rect::new(3, 3, 7, 7), TileKind::WallStone);
        let visible = compute_fov(&mut grid, Point::new(5, 5), 8);

        assert!(visible.contains(&Point::new(5, 5)));
        assert!(visible.contains(&Point::new(3, 5)));
        assert!(!visible.contains(&Point::new(1, 5)));
        assert!(grid.state(Point::new(7, 7)).contains(TileState::SEEN));
        assert!(!grid.state(Point::new(0, 0)).contains(TileState::SEEN));
    }
}
