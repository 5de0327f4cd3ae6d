//! Rivers, paths and lakes

use hashbrown::HashSet;
use tracing::debug;

use crate::error::Result;
use crate::map::{Point, Rect, Side, TileGrid, TileKind, line, orthogonalize};
use crate::rng::RandomSource;

/// Axis-aligned random walk from `from` to `to`, clamped to `area`.
///
/// `wideness` is the percent chance of a fully random step; the other
/// steps move toward the target. If the walk has not arrived after a
/// step budget it finishes in a straight line.
pub fn walk_path<R: RandomSource>(
    from: Point,
    to: Point,
    area: Rect,
    wideness: u32,
    rng: &mut R,
) -> Vec<Point> {
    let target = area.clamp(to);
    let mut cur = area.clamp(from);
    let mut path = vec![cur];
    let budget = (area.width() + area.height()) as usize * 8;

    for _ in 0..budget {
        if cur == target {
            break;
        }
        let side = if rng.percent(wideness) {
            Side::ALL[rng.rn2(4) as usize]
        } else {
            toward(cur, target, rng)
        };
        let next = area.clamp(cur.step(side));
        if next != cur {
            cur = next;
            path.push(cur);
        }
    }
    if cur != target {
        path.extend(orthogonalize(&line(cur, target)).into_iter().skip(1));
    }
    path
}

/// Step toward `target`, choosing the axis in proportion to the distance
/// left along it
fn toward<R: RandomSource>(cur: Point, target: Point, rng: &mut R) -> Side {
    let (dx, dy) = (target.x - cur.x, target.y - cur.y);
    let horizontal = match (dx, dy) {
        (_, 0) => true,
        (0, _) => false,
        _ => (rng.below((dx.abs() + dy.abs()) as u32) as i32) < dx.abs(),
    };
    match horizontal {
        true if dx > 0 => Side::Right,
        true => Side::Left,
        false if dy > 0 => Side::Bottom,
        false => Side::Top,
    }
}

/// Run a river of `width` cells across `area`, along its longer side.
/// Returns the centre line.
pub fn draw_river<R: RandomSource>(
    grid: &mut TileGrid,
    area: Rect,
    width: i32,
    wideness: u32,
    rng: &mut R,
) -> Result<Vec<Point>> {
    grid.check_area(&area)?;
    let (from, to) = if area.width() >= area.height() {
        (
            Point::new(area.left, rng.range(area.top, area.bottom)),
            Point::new(area.right, rng.range(area.top, area.bottom)),
        )
    } else {
        (
            Point::new(rng.range(area.left, area.right), area.top),
            Point::new(rng.range(area.left, area.right), area.bottom),
        )
    };
    let path = walk_path(from, to, area, wideness, rng);
    let w = width.max(1);
    for &p in &path {
        let brush = Rect::new(p.x, p.y, p.x + w - 1, p.y + w - 1);
        if let Some(cells) = brush.intersection(&area) {
            grid.fill(cells, TileKind::Water);
            grid.clear_foreground_area(cells);
        }
    }
    debug!(?from, ?to, len = path.len(), "river drawn");
    Ok(path)
}

/// Grow a lake from the centre of `area` by random sparse growth inside
/// the inscribed circle. The lake covers about a third of `area`.
/// Returns the number of water cells.
pub fn grow_lake<R: RandomSource>(grid: &mut TileGrid, area: Rect, rng: &mut R) -> usize {
    let Some(area) = area.intersection(&grid.bounds()) else {
        return 0;
    };
    let center = area.center();
    let r = i64::from(area.width().min(area.height()) / 2);
    let budget = (area.area() / 3).max(1) as usize;

    let mut cells = vec![center];
    let mut taken: HashSet<Point> = HashSet::new();
    taken.insert(center);
    let mut attempts = budget * 16;
    while cells.len() < budget && attempts > 0 {
        attempts -= 1;
        let Some(i) = rng.choose_index(cells.len()) else { break };
        let next = cells[i].neighbors4()[rng.rn2(4) as usize];
        if area.contains(next) && next.dist_sq(center) <= r * r && taken.insert(next) {
            cells.push(next);
        }
    }

    for &p in &cells {
        grid.set_background(p, TileKind::Water);
        grid.clear_foreground(p);
    }
    cells.len()
}
