//! The tile grid every generator writes into

use serde::{Deserialize, Serialize};

use super::feature::{Feature, Features};
use super::geom::{Point, Rect};
use super::los::line;
use super::tile::{Layer, Tile, TileId, TileKind, TileSet, TileState};
use crate::consts::FREE_LOCATION_TRIES;
use crate::error::{GenError, Result};
use crate::rng::RandomSource;

/// A rectangular level: tiles, their metadata table and placed features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    tileset: TileSet,
    pub features: Features,
}

impl TileGrid {
    /// Create a grid filled with `fill` as background
    pub fn new(width: i32, height: i32, fill: TileKind) -> Self {
        Self::with_tileset(width, height, fill, TileSet::default())
    }

    pub fn with_tileset(width: i32, height: i32, fill: TileKind, tileset: TileSet) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let bg = tileset.translate(fill);
        Self {
            width,
            height,
            tiles: vec![Tile::new(bg); (width * height) as usize],
            tileset,
            features: Features::default(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The whole grid as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }

    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Error unless `area` lies inside the grid
    pub fn check_area(&self, area: &Rect) -> Result<()> {
        if area.is_valid() && self.bounds().contains_rect(area) {
            Ok(())
        } else {
            Err(GenError::OutOfBounds {
                area: *area,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    pub fn tile(&self, p: Point) -> Option<&Tile> {
        self.index(p).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, p: Point) -> Option<&mut Tile> {
        self.index(p).map(move |i| &mut self.tiles[i])
    }

    /// Translate a logical tile kind through this grid's tile set
    pub fn translate(&self, kind: TileKind) -> TileId {
        self.tileset.translate(kind)
    }

    pub fn background(&self, p: Point) -> TileKind {
        self.tile(p)
            .map_or(TileKind::Nothing, |t| self.tileset.kind(t.background))
    }

    pub fn foreground(&self, p: Point) -> TileKind {
        self.tile(p)
            .map_or(TileKind::Nothing, |t| self.tileset.kind(t.foreground))
    }

    /// Set a tile kind on the layer it belongs to
    pub fn set(&mut self, p: Point, kind: TileKind) {
        let id = self.translate(kind);
        if let Some(tile) = self.tile_mut(p) {
            match kind.layer() {
                Layer::Background => tile.background = id,
                Layer::Foreground => tile.foreground = id,
            }
        }
    }

    pub fn set_background(&mut self, p: Point, kind: TileKind) {
        let id = self.translate(kind);
        if let Some(tile) = self.tile_mut(p) {
            tile.background = id;
        }
    }

    pub fn set_foreground(&mut self, p: Point, kind: TileKind) {
        let id = self.translate(kind);
        if let Some(tile) = self.tile_mut(p) {
            tile.foreground = id;
        }
    }

    pub fn clear_foreground(&mut self, p: Point) {
        if let Some(tile) = self.tile_mut(p) {
            tile.foreground = TileId::NONE;
        }
    }

    /// Set every cell of `area` that lies on the map
    pub fn fill(&mut self, area: Rect, kind: TileKind) {
        for p in area.points() {
            self.set(p, kind);
        }
    }

    pub fn clear_foreground_area(&mut self, area: Rect) {
        for p in area.points() {
            self.clear_foreground(p);
        }
    }

    /// Set the one-cell border ring of `area`
    pub fn fill_border(&mut self, area: Rect, kind: TileKind) {
        for p in area.border_points() {
            self.set(p, kind);
        }
    }

    /// Set every cell on the straight line from `a` to `b`
    pub fn draw_line(&mut self, a: Point, b: Point, kind: TileKind) {
        for p in line(a, b) {
            self.set(p, kind);
        }
    }

    pub fn mark(&mut self, p: Point, state: TileState) {
        if let Some(tile) = self.tile_mut(p) {
            tile.state |= state;
        }
    }

    pub fn mark_area(&mut self, area: Rect, state: TileState) {
        for p in area.points() {
            self.mark(p, state);
        }
    }

    pub fn unmark_area(&mut self, area: Rect, state: TileState) {
        for p in area.points() {
            if let Some(tile) = self.tile_mut(p) {
                tile.state.remove(state);
            }
        }
    }

    pub fn state(&self, p: Point) -> TileState {
        self.tile(p).map_or(TileState::empty(), |t| t.state)
    }

    /// Off-map cells count as barriers
    pub fn is_barrier(&self, p: Point) -> bool {
        match self.tile(p) {
            Some(t) => {
                self.tileset.info(t.background).barrier || self.tileset.info(t.foreground).barrier
            }
            None => true,
        }
    }

    pub fn is_block_los(&self, p: Point) -> bool {
        match self.tile(p) {
            Some(t) => {
                self.tileset.info(t.background).blocks_los
                    || self.tileset.info(t.foreground).blocks_los
            }
            None => true,
        }
    }

    /// Cost of entering `p`, `None` when it cannot be entered
    pub fn path_cost(&self, p: Point) -> Option<u32> {
        if self.is_barrier(p) {
            return None;
        }
        let t = self.tile(p)?;
        let bg = self.tileset.info(t.background).move_cost as u32;
        let fg = if t.has_foreground() {
            self.tileset.info(t.foreground).move_cost as u32
        } else {
            0
        };
        Some(bg.max(fg).max(1))
    }

    /// A cell where something new may be put: passable, empty foreground,
    /// not reserved
    pub fn is_free(&self, p: Point) -> bool {
        match self.tile(p) {
            Some(t) => {
                !t.has_foreground()
                    && !t.state.contains(TileState::NOT_FREE)
                    && !self.is_barrier(p)
            }
            None => false,
        }
    }

    /// Find a free cell inside `area`: random picks first, then a scan
    /// starting at a random cell
    pub fn search_free_location<R: RandomSource>(&self, area: Rect, rng: &mut R) -> Option<Point> {
        let area = area.intersection(&self.bounds())?;
        for _ in 0..FREE_LOCATION_TRIES {
            let p = Point::new(
                rng.range(area.left, area.right),
                rng.range(area.top, area.bottom),
            );
            if self.is_free(p) {
                return Some(p);
            }
        }
        let cells: Vec<Point> = area.points().collect();
        let start = rng.choose_index(cells.len())?;
        (0..cells.len())
            .map(|i| cells[(start + i) % cells.len()])
            .find(|&p| self.is_free(p))
    }

    /// Cells 4-connected to `start` for which `passable` holds
    pub fn flood_fill<F>(&self, start: Point, mut passable: F) -> Vec<Point>
    where
        F: FnMut(Point) -> bool,
    {
        let mut cells = Vec::new();
        if !self.in_bounds(start) || !passable(start) {
            return cells;
        }
        let mut visited = vec![false; self.tiles.len()];
        let mut stack = vec![start];
        if let Some(i) = self.index(start) {
            visited[i] = true;
        }
        while let Some(current) = stack.pop() {
            cells.push(current);
            for next in current.neighbors4() {
                let Some(i) = self.index(next) else { continue };
                if visited[i] || !passable(next) {
                    continue;
                }
                visited[i] = true;
                stack.push(next);
            }
        }
        cells
    }

    /// Number of cells in `area` whose background or foreground is `kind`
    pub fn count_kind(&self, area: Rect, kind: TileKind) -> usize {
        area.points()
            .filter(|&p| self.background(p) == kind || self.foreground(p) == kind)
            .count()
    }

    pub fn any_kind(&self, area: Rect, kind: TileKind) -> bool {
        area.points()
            .any(|p| self.background(p) == kind || self.foreground(p) == kind)
    }

    pub fn add_feature(&mut self, feature: Feature) -> crate::world::EntityId {
        self.features.add(feature)
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Render the grid as text, one line per row
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x, y);
                let kind = match self.foreground(p) {
                    TileKind::Nothing => self.background(p),
                    fg => fg,
                };
                out.push(kind.symbol());
            }
            out.push('\n');
        }
        out
    }
}
