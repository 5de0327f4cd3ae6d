//! Cave carving
//!
//! Random wall removal, one erosion and one pruning pass, then corridors
//! between disconnected floor regions until a single region is left.

use tracing::debug;

use crate::error::{GenError, Result};
use crate::map::{Point, Rect, TileGrid, TileKind, line, orthogonalize};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaveParams {
    /// Chance (percent) that a wall cell is removed initially
    pub open_chance: u32,
    /// Walls with at least this many open 4-neighbours are eroded
    pub erode_min_open: usize,
    /// Floor with fewer open 4-neighbours is walled up again
    pub prune_min_open: usize,
    pub floor: TileKind,
    pub wall: TileKind,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            open_chance: 50,
            erode_min_open: 3,
            prune_min_open: 2,
            floor: TileKind::CaveFloor,
            wall: TileKind::Rock,
        }
    }
}

/// Carve a cave into `area`. The border ring of `area` stays solid.
/// Returns the number of floor cells.
pub fn carve_cave<R: RandomSource>(
    grid: &mut TileGrid,
    area: Rect,
    params: &CaveParams,
    rng: &mut R,
) -> Result<usize> {
    grid.check_area(&area)?;
    let inner = area.shrink(1).ok_or(GenError::AreaTooSmall { area, min: 3 })?;

    for p in area.points() {
        grid.set_background(p, params.floor);
        grid.set_foreground(p, params.wall);
    }
    for p in inner.points() {
        if rng.percent(params.open_chance) {
            grid.clear_foreground(p);
        }
    }

    let is_open = |grid: &TileGrid, p: Point| inner.contains(p) && grid.foreground(p) == TileKind::Nothing;
    let open_neighbours =
        |grid: &TileGrid, p: Point| p.neighbors4().into_iter().filter(|&n| is_open(grid, n)).count();

    let eroded: Vec<Point> = inner
        .points()
        .filter(|&p| !is_open(grid, p) && open_neighbours(grid, p) >= params.erode_min_open)
        .collect();
    for p in eroded {
        grid.clear_foreground(p);
    }

    let pruned: Vec<Point> = inner
        .points()
        .filter(|&p| is_open(grid, p) && open_neighbours(grid, p) < params.prune_min_open)
        .collect();
    for p in pruned {
        grid.set_foreground(p, params.wall);
    }

    if !inner.points().any(|p| is_open(grid, p)) {
        grid.clear_foreground(inner.center());
    }

    let mut tunnels = 0;
    loop {
        let regions = floor_regions(grid, inner, &is_open);
        if regions.len() <= 1 {
            break;
        }
        let rest: Vec<Point> = regions[1..].iter().flatten().copied().collect();
        let (a, b) = nearest_pair(&regions[0], &rest);
        for p in orthogonalize(&line(a, b)) {
            grid.clear_foreground(p);
        }
        tunnels += 1;
    }

    let floor = inner.points().filter(|&p| is_open(grid, p)).count();
    debug!(?area, floor, tunnels, "cave carved");
    Ok(floor)
}

/// Connected open regions inside `inner`
fn floor_regions<F>(grid: &TileGrid, inner: Rect, is_open: &F) -> Vec<Vec<Point>>
where
    F: Fn(&TileGrid, Point) -> bool,
{
    let index = |p: Point| ((p.y - inner.top) * inner.width() + (p.x - inner.left)) as usize;
    let mut seen = vec![false; inner.area() as usize];
    let mut regions = Vec::new();
    for p in inner.points() {
        if seen[index(p)] || !is_open(grid, p) {
            continue;
        }
        let region = grid.flood_fill(p, |c| is_open(grid, c));
        for &c in &region {
            seen[index(c)] = true;
        }
        regions.push(region);
    }
    regions
}

fn nearest_pair(from: &[Point], to: &[Point]) -> (Point, Point) {
    let mut best = (from[0], to[0]);
    let mut best_d = i64::MAX;
    for &a in from {
        for &b in to {
            let d = a.dist_sq(b);
            if d < best_d {
                best_d = d;
                best = (a, b);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    fn region_count(grid: &TileGrid, area: Rect) -> usize {
        let inner = area.grow(-1);
        let is_open = |g: &TileGrid, p: Point| inner.contains(p) && g.foreground(p) == TileKind::Nothing;
        floor_regions(grid, inner, &is_open).len()
    }

    #[test]
    fn test_cave_is_connected() {
        for seed in 0..8 {
            let mut grid = TileGrid::new(30, 30, TileKind::Grass);
            let mut rng = GameRng::new(seed);
            let area = grid.bounds();
            let floor = carve_cave(&mut grid, area, &CaveParams::default(), &mut rng).unwrap();
            assert!(floor > 0);
            assert_eq!(region_count(&grid, area), 1, "seed {seed}");
        }
    }

    #[test]
    fn test_border_stays_solid() {
        let mut grid = TileGrid::new(20, 15, TileKind::Grass);
        let mut rng = GameRng::new(4);
        let area = Rect::new(2, 2, 17, 12);
        carve_cave(&mut grid, area, &CaveParams::default(), &mut rng).unwrap();
        assert!(area.border_points().all(|p| grid.foreground(p) == TileKind::Rock));
        assert_eq!(grid.background(Point::new(0, 0)), TileKind::Grass);
    }

    #[test]
    fn test_closed_cave_gets_a_floor() {
        let mut grid = TileGrid::new(9, 9, TileKind::Grass);
        let mut rng = GameRng::new(1);
        let params = CaveParams {
            open_chance: 0,
            ..CaveParams::default()
        };
        let area = grid.bounds();
        let floor = carve_cave(&mut grid, area, &params, &mut rng).unwrap();
        assert_eq!(floor, 1);
        assert_eq!(grid.foreground(Point::new(4, 4)), TileKind::Nothing);
    }

    #[test]
    fn test_rejects_tiny_area() {
        let mut grid = TileGrid::new(9, 9, TileKind::Grass);
        let mut rng = GameRng::new(1);
        let err = carve_cave(&mut grid, Rect::new(0, 0, 1, 8), &CaveParams::default(), &mut rng);
        assert!(matches!(err, Err(GenError::AreaTooSmall { .. })));
    }
}
