//! Map model
//!
//! Geometry, tiles, the tile grid and the queries other systems run on it
//! (line of sight, field of view, path search).

mod feature;
mod geom;
mod grid;
mod los;
mod path;
mod tile;

pub use feature::{Feature, FeatureKind, Features, Furniture};
pub use geom::{Axis, Point, Rect, Side};
pub use grid::TileGrid;
pub use los::{compute_fov, has_line_of_sight, line, orthogonalize};
pub use path::find_path;
pub use tile::{Layer, Tile, TileId, TileInfo, TileKind, TileSet, TileState};
