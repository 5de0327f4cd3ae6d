//! World context
//!
//! Owns every generated level and the entity id counter. Generators receive
//! it explicitly instead of reaching for process-wide state.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::map::{Point, TileGrid};

/// Unique id of a generated entity (feature, resident)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Index of a level inside a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId(pub usize);

/// A position on a specific level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelPos {
    pub level: LevelId,
    pub pos: Point,
}

impl LevelPos {
    pub fn new(level: LevelId, pos: Point) -> Self {
        Self { level, pos }
    }
}

/// Monotonic entity id counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u64,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    levels: Vec<TileGrid>,
    ids: EntityIds,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next entity id
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// A level together with the id counter, for generators that place
    /// features while editing tiles
    pub fn level_and_ids(&mut self, id: LevelId) -> Result<(&mut TileGrid, &mut EntityIds)> {
        let grid = self.levels.get_mut(id.0).ok_or(GenError::UnknownLevel(id))?;
        Ok((grid, &mut self.ids))
    }

    pub fn add_level(&mut self, grid: TileGrid) -> LevelId {
        self.levels.push(grid);
        LevelId(self.levels.len() - 1)
    }

    pub fn level(&self, id: LevelId) -> Result<&TileGrid> {
        self.levels.get(id.0).ok_or(GenError::UnknownLevel(id))
    }

    pub fn level_mut(&mut self, id: LevelId) -> Result<&mut TileGrid> {
        self.levels.get_mut(id.0).ok_or(GenError::UnknownLevel(id))
    }

    pub fn levels(&self) -> impl Iterator<Item = (LevelId, &TileGrid)> {
        self.levels.iter().enumerate().map(|(i, g)| (LevelId(i), g))
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileKind;

    #[test]
    fn test_ids_increase() {
        let mut world = World::new();
        let a = world.next_id();
        let b = world.next_id();
        assert_eq!(a, EntityId(1));
        assert!(b > a);
    }

    #[test]
    fn test_levels() {
        let mut world = World::new();
        let id = world.add_level(TileGrid::new(4, 4, TileKind::Grass));
        assert_eq!(id, LevelId(0));
        assert_eq!(world.level(id).unwrap().width(), 4);
        assert_eq!(world.level(LevelId(3)).unwrap_err(), GenError::UnknownLevel(LevelId(3)));
    }
}
