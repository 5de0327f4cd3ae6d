//! Special districts and empty lots

use crate::map::{Furniture, Point, Rect, Side, TileGrid, TileKind};
use crate::rng::RandomSource;
use crate::world::EntityIds;

use super::bsp::{BspTree, SizeBounds};
use super::fill::put_furniture;
use super::river::grow_lake;

/// Grass with scattered trees and bushes; larger parks may get a pond.
/// Water already on the ground is left alone.
pub fn park<R: RandomSource>(grid: &mut TileGrid, area: Rect, tree_chance: u32, rng: &mut R) {
    let dry: Vec<Point> = area
        .points()
        .filter(|&p| grid.background(p) != TileKind::Water)
        .collect();
    for &p in &dry {
        grid.set_background(p, TileKind::Grass);
        grid.clear_foreground(p);
    }
    if area.width() >= 12 && area.height() >= 12 && rng.one_in(3) {
        if let Some(pond) = area.shrink(4) {
            grow_lake(grid, pond, rng);
        }
    }
    for p in dry {
        if grid.background(p) == TileKind::Water {
            continue;
        }
        if rng.percent(tree_chance) {
            grid.set_foreground(p, TileKind::Tree);
        } else if rng.percent(tree_chance / 2) {
            grid.set_foreground(p, TileKind::Bush);
        }
    }
}

/// Paved square with a fountain in the middle
pub fn square(grid: &mut TileGrid, ids: &mut EntityIds, area: Rect) {
    grid.fill(area, TileKind::Paving);
    grid.clear_foreground_area(area);
    put_furniture(grid, ids, area.center(), Furniture::Fountain);
}

/// Fenced graveyard with a gate on each of `gates` and rows of
/// tombstones in nested plots. Returns the number of tombstones.
pub fn graveyard<R: RandomSource>(
    grid: &mut TileGrid,
    ids: &mut EntityIds,
    area: Rect,
    gates: &[Side],
    rng: &mut R,
) -> usize {
    grid.fill(area, TileKind::Grass);
    grid.clear_foreground_area(area);
    grid.fill_border(area, TileKind::Fence);
    for &side in gates {
        let gate = area.side_mid(side);
        grid.clear_foreground(gate);
        grid.set_background(gate, TileKind::Paving);
    }

    let Some(inner) = area.shrink(2) else {
        return 0;
    };
    let plots = BspTree::build(inner, SizeBounds::new(3, 6), false, rng);
    let mut stones = 0;
    for id in plots.leaves() {
        let plot = plots.node(id).area;
        for x in (plot.left..=plot.right).step_by(2) {
            put_furniture(grid, ids, Point::new(x, plot.top), Furniture::Tombstone);
            stones += 1;
        }
    }
    stones
}

/// A lot without street access: grass, maybe a tree
pub fn yard<R: RandomSource>(grid: &mut TileGrid, area: Rect, rng: &mut R) {
    grid.fill(area, TileKind::Grass);
    grid.clear_foreground_area(area);
    if rng.one_in(2) {
        grid.set_foreground(area.center(), TileKind::Tree);
    }
}
