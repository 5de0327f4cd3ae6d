//! World generation
//!
//! Generation runs in strictly ordered phases over one [`crate::World`]:
//! districts and streets, buildings, interiors, then decoration. Each
//! phase writes into the level's [`crate::map::TileGrid`].

mod apartment;
mod bsp;
mod building;
mod cave;
mod city;
mod decor;
mod fill;
mod river;
mod road;

pub use apartment::ApartmentGenerator;
pub use bsp::{
    BspNode, BspTree, DefaultSplit, NodeId, NodeType, SizeBounds, Split, SplitEvent, SplitPolicy,
};
pub use building::{
    Building, BuildingId, Door, HouseStatus, Prosperity, Room, RoomLocation, RoomTypes, Window,
};
pub use cave::{CaveParams, carve_cave};
pub use city::{City, CityGenerator, District, DistrictKind, Street, StreetId};
pub use decor::{graveyard, park, square, yard};
pub use fill::{Human, InteriorFill, Role, link_spouses, unlink_spouse};
pub use river::{draw_river, grow_lake, walk_path};
pub use road::{RoadParams, draw_road, winding_road};
