//! Placed map objects
//!
//! Doors, windows, stairs and furniture are registered in the map's
//! feature list so renderers and interaction code can find them without
//! knowing which building owns them.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::geom::{Axis, Point};
use crate::world::{EntityId, LevelPos};

/// Furniture pieces placed by interior fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Furniture {
    Bed,
    Table,
    Stove,
    Tombstone,
    Fountain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Door { axis: Axis, open: bool, main: bool },
    Window { axis: Axis },
    Stairs { up: bool, destination: Option<LevelPos> },
    Furniture(Furniture),
}

/// A placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: EntityId,
    pub pos: Point,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn new(id: EntityId, pos: Point, kind: FeatureKind) -> Self {
        Self { id, pos, kind }
    }

    pub fn is_door(&self) -> bool {
        matches!(self.kind, FeatureKind::Door { .. })
    }

    pub fn is_stairs(&self) -> bool {
        matches!(self.kind, FeatureKind::Stairs { .. })
    }
}

/// Ordered collection of the features of one level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Features {
    items: Vec<Feature>,
}

impl Features {
    pub fn add(&mut self, feature: Feature) -> EntityId {
        let id = feature.id;
        self.items.push(feature);
        id
    }

    /// Drop the feature with `id`, keeping the order of the rest
    pub fn remove(&mut self, id: EntityId) -> Option<Feature> {
        let i = self.items.iter().position(|f| f.id == id)?;
        Some(self.items.remove(i))
    }

    pub fn get(&self, id: EntityId) -> Option<&Feature> {
        self.items.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Feature> {
        self.items.iter_mut().find(|f| f.id == id)
    }

    pub fn at(&self, pos: Point) -> impl Iterator<Item = &Feature> {
        self.items.iter().filter(move |f| f.pos == pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
