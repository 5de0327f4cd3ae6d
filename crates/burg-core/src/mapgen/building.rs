//! Building, room and opening records
//!
//! A [`Building`] owns its blocks, rooms, doors and windows. Doors and
//! windows are also registered in the level's feature list; the building
//! keeps the feature id so both sides can be matched up.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::map::{Axis, Point, Rect, Side, TileGrid, TileKind, TileState};
use crate::world::{EntityId, LevelId};

use super::city::StreetId;
use super::fill::Human;

/// Index of a building in its city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub usize);

/// Wealth tier of a district or building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum Prosperity {
    #[default]
    Poor,
    Good,
    Lux,
}

impl Prosperity {
    /// Material of the building shell
    pub const fn outer_wall(self) -> TileKind {
        match self {
            Prosperity::Poor => TileKind::WallWood,
            Prosperity::Good => TileKind::WallBrick,
            Prosperity::Lux => TileKind::WallStone,
        }
    }

    /// Material of the walls between rooms
    pub const fn inner_wall(self) -> TileKind {
        match self {
            Prosperity::Poor | Prosperity::Good => TileKind::WallWood,
            Prosperity::Lux => TileKind::WallBrick,
        }
    }

    pub const fn floor(self) -> TileKind {
        match self {
            Prosperity::Poor => TileKind::Floor,
            Prosperity::Good => TileKind::WoodFloor,
            Prosperity::Lux => TileKind::Carpet,
        }
    }
}

/// What a finished building is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum HouseStatus {
    /// Not laid out yet
    #[default]
    Unknown,
    Shack,
    House,
    Detached,
    Mansion,
}

/// Which boundary a room touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum RoomLocation {
    /// Touches no block boundary
    #[default]
    Inner,
    /// Touches its block's boundary, but not the outside
    BlockOuter,
    /// Has at least one wall on the building exterior
    HouseOuter,
}

bitflags! {
    /// Room usage, not exclusive
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoomTypes: u32 {
        const HALL = 1 << 0;
        const BEDROOM = 1 << 1;
        const KITCHEN = 1 << 2;
        const LIVING = 1 << 3;
        const STORAGE = 1 << 4;
    }
}

impl RoomTypes {
    /// Lowercase names of the set flags, in bit order, comma-joined.
    /// Empty for no flags.
    pub fn signature(&self) -> String {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Serialize for RoomTypes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoomTypes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(RoomTypes::from_bits_truncate(bits))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Floor plus surrounding wall cells
    pub area: Rect,
    pub types: RoomTypes,
    pub location: RoomLocation,
    /// Sides on the boundary of the room's block
    pub outer_sides: Vec<Side>,
    /// Sides whose wall is part of the building shell
    pub exterior_sides: Vec<Side>,
    /// Index into [`Building::blocks`]
    pub block: usize,
}

impl Room {
    pub fn new(floor: Rect, block: usize) -> Self {
        Self {
            area: floor.grow(1),
            types: RoomTypes::empty(),
            location: RoomLocation::Inner,
            outer_sides: Vec::new(),
            exterior_sides: Vec::new(),
            block,
        }
    }

    /// Floor cells
    pub fn inner(&self) -> Rect {
        self.area.grow(-1)
    }

    pub fn is_house_outer(&self) -> bool {
        self.location == RoomLocation::HouseOuter
    }

    /// Wall cells of `side` without the corners
    pub fn wall_span(&self, side: Side) -> Rect {
        let inner = self.inner();
        match side {
            Side::Top | Side::Bottom => {
                let y = self.area.edge(side);
                Rect::new(inner.left, y, inner.right, y)
            }
            Side::Left | Side::Right => {
                let x = self.area.edge(side);
                Rect::new(x, inner.top, x, inner.bottom)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub pos: Point,
    /// Orientation of the wall the door interrupts
    pub axis: Axis,
    pub main: bool,
    /// Rooms on either side; `None` for the outside
    pub rooms: [Option<usize>; 2],
    pub feature: EntityId,
}

impl Door {
    pub fn connects(&self, a: usize, b: usize) -> bool {
        self.rooms == [Some(a), Some(b)] || self.rooms == [Some(b), Some(a)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub pos: Point,
    pub axis: Axis,
    pub room: usize,
    pub feature: EntityId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    /// Footprint, outer walls included
    pub area: Rect,
    /// Private grounds around the footprint
    pub privathand: Option<Rect>,
    pub prosperity: Prosperity,
    pub status: HouseStatus,
    pub street: Option<StreetId>,
    pub facade: Side,
    pub number: Option<u32>,
    pub district: Option<usize>,
    /// Floor areas of the blocks; one block unless lux
    pub blocks: Vec<Rect>,
    pub rooms: Vec<Room>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
    /// Paved path from the main door to the edge of the grounds
    pub alley: Option<Rect>,
    pub residents: Vec<Human>,
    pub populated: bool,
    pub cellar: Option<LevelId>,
}

impl Building {
    pub fn new(id: BuildingId, area: Rect, prosperity: Prosperity) -> Self {
        Self {
            id,
            area,
            privathand: None,
            prosperity,
            status: HouseStatus::Unknown,
            street: None,
            facade: Side::Bottom,
            number: None,
            district: None,
            blocks: Vec::new(),
            rooms: Vec::new(),
            doors: Vec::new(),
            windows: Vec::new(),
            alley: None,
            residents: Vec::new(),
            populated: false,
            cellar: None,
        }
    }

    pub fn main_door(&self) -> Option<&Door> {
        self.doors.iter().find(|d| d.main)
    }

    pub fn hall(&self) -> Option<usize> {
        self.rooms.iter().position(|r| r.types.contains(RoomTypes::HALL))
    }

    /// Ground covered by the building and its grounds
    pub fn lot(&self) -> Rect {
        self.privathand.unwrap_or(self.area)
    }

    /// Rooms carrying every flag of `types`
    pub fn rooms_with(&self, types: RoomTypes) -> impl Iterator<Item = (usize, &Room)> {
        self.rooms
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.types.contains(types))
    }

    /// Room whose floor contains `p`
    pub fn room_at(&self, p: Point) -> Option<usize> {
        self.rooms.iter().position(|r| r.inner().contains(p))
    }

    /// Forget the layout. Door and window features leave `grid` with it,
    /// and so do the reservations in front of doors.
    pub(crate) fn clear_layout(&mut self, grid: &mut TileGrid) {
        let features = self.doors.iter().map(|d| d.feature).chain(self.windows.iter().map(|w| w.feature));
        for id in features {
            grid.features.remove(id);
        }
        grid.unmark_area(self.area, TileState::NOT_FREE);
        self.status = HouseStatus::Unknown;
        self.blocks.clear();
        self.rooms.clear();
        self.doors.clear();
        self.windows.clear();
        self.alley = None;
    }
}
