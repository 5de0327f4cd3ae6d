//! Points, sides and inclusive rectangles
//!
//! Every area in the generator is an axis-aligned [`Rect`] with inclusive
//! bounds, so a rectangle with `left == right` is one cell wide.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A map coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point moved by `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Point one step towards `side`
    pub fn step(self, side: Side) -> Self {
        let (dx, dy) = side.delta();
        self.offset(dx, dy)
    }

    pub fn dist_sq(self, other: Point) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.dist_sq(other) as f64).sqrt()
    }

    pub fn manhattan(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbours, in top/right/bottom/left order
    pub fn neighbors4(self) -> [Point; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }
}

/// Orientation of a wall, street or split line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Axis {
    /// Runs along x (a top or bottom wall)
    Horizontal,
    /// Runs along y (a left or right wall)
    Vertical,
}

impl Axis {
    pub fn flip(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Unit step perpendicular to a line with this orientation
    pub fn normal(self) -> (i32, i32) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
        }
    }
}

/// One edge of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Outward unit step
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Orientation of the wall lying on this side
    pub const fn axis(self) -> Axis {
        match self {
            Side::Top | Side::Bottom => Axis::Horizontal,
            Side::Left | Side::Right => Axis::Vertical,
        }
    }
}

/// Axis-aligned rectangle with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from inclusive bounds
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from its top-left corner and size
    pub const fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width - 1, y + height - 1)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    /// Number of cells, 0 for an inverted rectangle
    pub fn area(&self) -> i64 {
        if self.is_valid() {
            self.width() as i64 * self.height() as i64
        } else {
            0
        }
    }

    /// Bounds are not inverted
    pub const fn is_valid(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    pub const fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn len(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    pub const fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top <= other.top
            && self.bottom >= other.bottom
    }

    pub const fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }

    /// Rectangle grown by `n` cells on every side (negative shrinks)
    pub const fn grow(&self, n: i32) -> Rect {
        Rect::new(self.left - n, self.top - n, self.right + n, self.bottom + n)
    }

    /// Rectangle shrunk by `n` cells on every side, `None` if nothing is left
    pub fn shrink(&self, n: i32) -> Option<Rect> {
        let r = self.grow(-n);
        r.is_valid().then_some(r)
    }

    /// Coordinate of the edge on `side`
    pub const fn edge(&self, side: Side) -> i32 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// The one-cell line of the rectangle on `side`
    pub const fn side_line(&self, side: Side) -> Rect {
        match side {
            Side::Top => Rect::new(self.left, self.top, self.right, self.top),
            Side::Bottom => Rect::new(self.left, self.bottom, self.right, self.bottom),
            Side::Left => Rect::new(self.left, self.top, self.left, self.bottom),
            Side::Right => Rect::new(self.right, self.top, self.right, self.bottom),
        }
    }

    /// Midpoint of the edge on `side`
    pub const fn side_mid(&self, side: Side) -> Point {
        let c = self.center();
        match side {
            Side::Top => Point::new(c.x, self.top),
            Side::Bottom => Point::new(c.x, self.bottom),
            Side::Left => Point::new(self.left, c.y),
            Side::Right => Point::new(self.right, c.y),
        }
    }

    /// Sides of `self` lying on the matching edge of `outer`
    pub fn shared_sides(&self, outer: &Rect) -> Vec<Side> {
        Side::ALL
            .into_iter()
            .filter(|&s| self.edge(s) == outer.edge(s))
            .collect()
    }

    /// All cells, row by row
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let (l, r) = (self.left, self.right);
        (self.top..=self.bottom).flat_map(move |y| (l..=r).map(move |x| Point::new(x, y)))
    }

    /// Cells of the one-cell border ring
    pub fn border_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points().filter(|p| {
            p.x == self.left || p.x == self.right || p.y == self.top || p.y == self.bottom
        })
    }

    /// Clamp a point into the rectangle
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(self.left, self.right), p.y.clamp(self.top, self.bottom))
    }
}
