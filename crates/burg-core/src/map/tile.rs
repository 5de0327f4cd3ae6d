//! Tile types and the per-tile metadata table
//!
//! Generators speak in logical [`TileKind`]s; a map stores compact
//! [`TileId`]s obtained through its [`TileSet`]. Games of the family may
//! ship different tile sets, the generator only ever calls
//! [`TileSet::translate`].

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::geom::{Axis, Point};

/// Index into a [`TileSet`]. `TileId(0)` is the empty tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u16);

impl TileId {
    pub const NONE: TileId = TileId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Which layer a tile kind is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Foreground,
}

/// Logical tile types used by the generators
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Nothing,
    // Ground
    Grass,
    Dirt,
    Floor,
    WoodFloor,
    Carpet,
    Road,
    Paving,
    Sand,
    Water,
    CaveFloor,
    // Structures and plants
    Rock,
    Tree,
    Bush,
    Fence,
    WallWood,
    WallBrick,
    WallStone,
    DoorOpenH,
    DoorOpenV,
    DoorClosedH,
    DoorClosedV,
    WindowH,
    WindowV,
    StairsUp,
    StairsDown,
    // Furniture
    Bed,
    Table,
    Stove,
    Tombstone,
    Fountain,
}

impl TileKind {
    pub const fn layer(self) -> Layer {
        match self {
            TileKind::Nothing
            | TileKind::Grass
            | TileKind::Dirt
            | TileKind::Floor
            | TileKind::WoodFloor
            | TileKind::Carpet
            | TileKind::Road
            | TileKind::Paving
            | TileKind::Sand
            | TileKind::Water
            | TileKind::CaveFloor => Layer::Background,
            _ => Layer::Foreground,
        }
    }

    /// Cannot be walked through
    pub const fn is_barrier(self) -> bool {
        matches!(
            self,
            TileKind::Water
                | TileKind::Rock
                | TileKind::Tree
                | TileKind::Fence
                | TileKind::WallWood
                | TileKind::WallBrick
                | TileKind::WallStone
                | TileKind::DoorClosedH
                | TileKind::DoorClosedV
                | TileKind::WindowH
                | TileKind::WindowV
                | TileKind::Stove
                | TileKind::Tombstone
                | TileKind::Fountain
        )
    }

    /// Blocks line of sight
    pub const fn blocks_los(self) -> bool {
        matches!(
            self,
            TileKind::Rock
                | TileKind::Tree
                | TileKind::WallWood
                | TileKind::WallBrick
                | TileKind::WallStone
                | TileKind::DoorClosedH
                | TileKind::DoorClosedV
        )
    }

    pub const fn is_wall(self) -> bool {
        matches!(
            self,
            TileKind::WallWood | TileKind::WallBrick | TileKind::WallStone | TileKind::Rock
        )
    }

    pub const fn is_door(self) -> bool {
        matches!(
            self,
            TileKind::DoorOpenH | TileKind::DoorOpenV | TileKind::DoorClosedH | TileKind::DoorClosedV
        )
    }

    /// Movement cost for passable tiles
    pub const fn move_cost(self) -> u8 {
        match self {
            TileKind::Road | TileKind::Paving => 1,
            TileKind::Floor | TileKind::WoodFloor | TileKind::Carpet => 1,
            TileKind::DoorOpenH | TileKind::DoorOpenV => 1,
            TileKind::Grass | TileKind::Dirt | TileKind::CaveFloor => 2,
            TileKind::Sand | TileKind::Bush => 3,
            TileKind::Bed | TileKind::Table => 4,
            _ => 1,
        }
    }

    /// Display character
    pub const fn symbol(self) -> char {
        match self {
            TileKind::Nothing => ' ',
            TileKind::Grass => '"',
            TileKind::Dirt => ',',
            TileKind::Floor | TileKind::WoodFloor | TileKind::Carpet => '.',
            TileKind::Road => ':',
            TileKind::Paving => '_',
            TileKind::Sand => '~',
            TileKind::Water => '=',
            TileKind::CaveFloor => '.',
            TileKind::Rock => '#',
            TileKind::Tree => 'T',
            TileKind::Bush => '*',
            TileKind::Fence => '%',
            TileKind::WallWood | TileKind::WallBrick | TileKind::WallStone => '#',
            TileKind::DoorOpenH => '/',
            TileKind::DoorOpenV => '\\',
            TileKind::DoorClosedH | TileKind::DoorClosedV => '+',
            TileKind::WindowH => '-',
            TileKind::WindowV => '|',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
            TileKind::Bed => 'b',
            TileKind::Table => 't',
            TileKind::Stove => 's',
            TileKind::Tombstone => '&',
            TileKind::Fountain => '{',
        }
    }

    /// Closed door interrupting a wall with the given orientation
    pub const fn closed_door(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => TileKind::DoorClosedH,
            Axis::Vertical => TileKind::DoorClosedV,
        }
    }

    pub const fn open_door(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => TileKind::DoorOpenH,
            Axis::Vertical => TileKind::DoorOpenV,
        }
    }

    pub const fn window(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => TileKind::WindowH,
            Axis::Vertical => TileKind::WindowV,
        }
    }
}

/// Metadata of one tile id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    pub kind: TileKind,
    pub symbol: char,
    pub layer: Layer,
    pub barrier: bool,
    pub blocks_los: bool,
    pub move_cost: u8,
}

impl From<TileKind> for TileInfo {
    fn from(kind: TileKind) -> Self {
        Self {
            kind,
            symbol: kind.symbol(),
            layer: kind.layer(),
            barrier: kind.is_barrier(),
            blocks_los: kind.blocks_los(),
            move_cost: kind.move_cost(),
        }
    }
}

/// Table of tile ids and their metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSet {
    infos: Vec<TileInfo>,
    ids: HashMap<TileKind, TileId>,
}

impl Default for TileSet {
    fn default() -> Self {
        Self::from_kinds(TileKind::iter())
    }
}

impl TileSet {
    /// Build a tile set assigning ids in iteration order.
    ///
    /// `TileKind::Nothing` always gets id 0 whether or not it is listed.
    pub fn from_kinds(kinds: impl IntoIterator<Item = TileKind>) -> Self {
        let mut set = Self {
            infos: vec![TileInfo::from(TileKind::Nothing)],
            ids: HashMap::new(),
        };
        set.ids.insert(TileKind::Nothing, TileId::NONE);
        for kind in kinds {
            if set.ids.contains_key(&kind) {
                continue;
            }
            let id = TileId(set.infos.len() as u16);
            set.infos.push(TileInfo::from(kind));
            set.ids.insert(kind, id);
        }
        set
    }

    /// Id for a logical tile kind, the empty tile if the set lacks it
    pub fn translate(&self, kind: TileKind) -> TileId {
        self.ids.get(&kind).copied().unwrap_or(TileId::NONE)
    }

    pub fn info(&self, id: TileId) -> &TileInfo {
        self.infos.get(id.0 as usize).unwrap_or(&self.infos[0])
    }

    pub fn kind(&self, id: TileId) -> TileKind {
        self.info(id).kind
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.len() <= 1
    }
}

bitflags! {
    /// Per-tile state bits
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TileState: u8 {
        const SEEN = 0x01;
        const VISITED = 0x02;
        /// Reserved by a generator; free-location searches skip it
        const NOT_FREE = 0x04;
    }
}

impl Serialize for TileState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(TileState::from_bits_truncate(bits))
    }
}

/// Path search status values stored in [`Tile::path_status`]
pub const PATH_UNVISITED: u8 = 0;
pub const PATH_OPEN: u8 = 1;
pub const PATH_CLOSED: u8 = 2;

/// A single map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub background: TileId,
    pub foreground: TileId,

    /// Variant bytes for the background and foreground (wall joins, colours)
    pub bg_ext: u8,
    pub fg_ext: u8,

    pub state: TileState,

    /// Path search scratch: status byte
    #[serde(skip)]
    pub path_status: u8,

    /// Path search scratch: previous point on the best known route
    #[serde(skip)]
    pub path_prev: Option<Point>,
}

impl Tile {
    pub const fn new(background: TileId) -> Self {
        Self {
            background,
            foreground: TileId::NONE,
            bg_ext: 0,
            fg_ext: 0,
            state: TileState::empty(),
            path_status: PATH_UNVISITED,
            path_prev: None,
        }
    }

    pub fn has_foreground(&self) -> bool {
        !self.foreground.is_none()
    }

    pub fn reset_path(&mut self) {
        self.path_status = PATH_UNVISITED;
        self.path_prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tileset_translates_every_kind() {
        let set = TileSet::default();
        for kind in TileKind::iter() {
            let id = set.translate(kind);
            assert_eq!(set.kind(id), kind);
        }
        assert_eq!(set.translate(TileKind::Nothing), TileId::NONE);
        assert_eq!(set.len(), TileKind::iter().count());
    }

    #[test]
    fn test_partial_tileset_falls_back_to_nothing() {
        let set = TileSet::from_kinds([TileKind::Floor, TileKind::WallStone]);
        assert_eq!(set.translate(TileKind::Floor), TileId(1));
        assert_eq!(set.translate(TileKind::Water), TileId::NONE);
        assert_eq!(set.info(TileId(99)).kind, TileKind::Nothing);
    }

    #[test]
    fn test_door_flags() {
        assert!(TileKind::DoorClosedH.blocks_los());
        assert!(TileKind::DoorClosedV.is_barrier());
        assert!(!TileKind::DoorOpenV.is_barrier());
        assert!(TileKind::WindowH.is_barrier());
        assert!(!TileKind::WindowH.blocks_los());
        assert_eq!(TileKind::closed_door(Axis::Vertical), TileKind::DoorClosedV);
    }

    #[test]
    fn test_only_closed_doors_draw_as_plus() {
        let plus: Vec<TileKind> = TileKind::iter().filter(|k| k.symbol() == '+').collect();
        assert_eq!(plus, vec![TileKind::DoorClosedH, TileKind::DoorClosedV]);
        assert_eq!(TileKind::Tombstone.symbol(), '&');
    }

    #[test]
    fn test_tile_state_serde() {
        let state = TileState::SEEN | TileState::VISITED;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "3");
        let back: TileState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
