//! A* search over the tile grid
//!
//! The open/closed status and the back pointer live in the tiles' scratch
//! fields, so a search allocates only its frontier.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::geom::Point;
use super::grid::TileGrid;
use super::tile::{PATH_CLOSED, PATH_OPEN, PATH_UNVISITED};

/// Cheapest 4-connected route from `from` to `to`, both included.
///
/// Both ends must be passable. Scratch fields of every tile are reset
/// before the search starts.
pub fn find_path(grid: &mut TileGrid, from: Point, to: Point) -> Option<Vec<Point>> {
    grid.path_cost(from)?;
    grid.path_cost(to)?;

    for tile in grid.tiles_mut() {
        tile.reset_path();
    }

    let width = grid.width();
    let mut g_scores = vec![u32::MAX; (width * grid.height()) as usize];
    let idx = |p: Point| (p.y * width + p.x) as usize;

    let mut open = BinaryHeap::new();
    g_scores[idx(from)] = 0;
    open.push(Reverse((from.manhattan(to) as u32, 0u32, from)));
    if let Some(t) = grid.tile_mut(from) {
        t.path_status = PATH_OPEN;
    }

    while let Some(Reverse((_, g, current))) = open.pop() {
        if grid.tile(current).map(|t| t.path_status) == Some(PATH_CLOSED) {
            continue;
        }
        if current == to {
            return Some(trace_back(grid, to));
        }
        if let Some(t) = grid.tile_mut(current) {
            t.path_status = PATH_CLOSED;
        }

        for next in current.neighbors4() {
            let Some(cost) = grid.path_cost(next) else {
                continue;
            };
            let status = grid.tile(next).map_or(PATH_CLOSED, |t| t.path_status);
            if status == PATH_CLOSED {
                continue;
            }
            let tentative = g + cost;
            if status != PATH_UNVISITED && tentative >= g_scores[idx(next)] {
                continue;
            }
            g_scores[idx(next)] = tentative;
            if let Some(t) = grid.tile_mut(next) {
                t.path_status = PATH_OPEN;
                t.path_prev = Some(current);
            }
            let f = tentative + next.manhattan(to) as u32;
            open.push(Reverse((f, tentative, next)));
        }
    }
    None
}

fn trace_back(grid: &TileGrid, to: Point) -> Vec<Point> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(prev) = grid.tile(current).and_then(|t| t.path_prev) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
