//! Generator errors
//!
//! Optional features that cannot be placed are not errors; generators skip
//! them. A [`GenError`] means a building or a whole city could not be built.

use thiserror::Error;

use crate::map::Rect;
use crate::mapgen::BuildingId;
use crate::world::LevelId;

/// Errors raised while generating a world
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("area {area:?} does not fit in a {width}x{height} map")]
    OutOfBounds { area: Rect, width: i32, height: i32 },

    #[error("area {area:?} is smaller than the required {min} cells per side")]
    AreaTooSmall { area: Rect, min: i32 },

    #[error("invalid generator options: {0}")]
    InvalidOptions(String),

    #[error("level {0:?} does not exist")]
    UnknownLevel(LevelId),

    #[error("building {0:?} is already populated")]
    AlreadyPopulated(BuildingId),
}

pub type Result<T> = core::result::Result<T, GenError>;
