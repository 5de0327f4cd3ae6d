//! burg-core: world generation for the burg roguelike family
//!
//! Contains the tile map model and every generator that writes into it:
//! BSP partitioning, city and district layout, building and room layout,
//! interior population, and the road, cave and river passes.
//! Nothing here performs terminal I/O.

pub mod error;
pub mod map;
pub mod mapgen;
pub mod options;
pub mod progress;
pub mod world;

mod consts;
mod rng;

pub use consts::*;
pub use error::{GenError, Result};
pub use options::{GenOptions, OptionsError};
pub use progress::{LogProgress, NoProgress, Progress};
pub use rng::{GameRng, RandomSource};
pub use world::{EntityId, EntityIds, LevelId, LevelPos, World};
