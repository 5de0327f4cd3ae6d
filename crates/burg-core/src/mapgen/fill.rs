//! Interior fill
//!
//! Moves a family into a laid-out building: bedrooms with beds, one
//! kitchen, and for mansions a cellar level reached by a pair of stairs.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::consts::{CHILD_CHANCES, SPOUSE_CHANCE};
use crate::error::{GenError, Result};
use crate::map::{Feature, FeatureKind, Furniture, Point, Rect, TileGrid, TileKind};
use crate::options::GenOptions;
use crate::rng::RandomSource;
use crate::world::{EntityId, EntityIds, LevelId, LevelPos, World};

use super::building::{Building, HouseStatus, RoomTypes};
use super::cave::{CaveParams, carve_cave};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Role {
    Owner,
    Spouse,
    Child,
}

/// A resident of a building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Human {
    pub id: EntityId,
    pub role: Role,
    pub spouse: Option<EntityId>,
    /// Room index in the owning building
    pub bedroom: Option<usize>,
}

impl Human {
    pub fn new(id: EntityId, role: Role) -> Self {
        Self {
            id,
            role,
            spouse: None,
            bedroom: None,
        }
    }
}

/// Marry `people[a]` and `people[b]`, divorcing any previous partners
pub fn link_spouses(people: &mut [Human], a: usize, b: usize) {
    if a == b || a >= people.len() || b >= people.len() {
        return;
    }
    unlink_spouse(people, a);
    unlink_spouse(people, b);
    people[a].spouse = Some(people[b].id);
    people[b].spouse = Some(people[a].id);
}

/// Clear the spouse of `people[i]` on both sides
pub fn unlink_spouse(people: &mut [Human], i: usize) {
    let Some(spouse) = people.get_mut(i).and_then(|h| h.spouse.take()) else {
        return;
    };
    if let Some(other) = people.iter_mut().find(|h| h.id == spouse) {
        other.spouse = None;
    }
}

/// Residents that need a bed of their own: everyone except the second
/// partner of a couple
fn bed_units(people: &[Human]) -> Vec<usize> {
    let mut covered = Vec::new();
    let mut units = Vec::new();
    for (i, h) in people.iter().enumerate() {
        if covered.contains(&h.id) {
            continue;
        }
        units.push(i);
        if let Some(spouse) = h.spouse {
            covered.push(spouse);
        }
    }
    units
}

fn furniture_tile(furniture: Furniture) -> TileKind {
    match furniture {
        Furniture::Bed => TileKind::Bed,
        Furniture::Table => TileKind::Table,
        Furniture::Stove => TileKind::Stove,
        Furniture::Tombstone => TileKind::Tombstone,
        Furniture::Fountain => TileKind::Fountain,
    }
}

/// Put `furniture` on a free cell of `area` and register it
pub(crate) fn place_furniture<R: RandomSource>(
    grid: &mut TileGrid,
    ids: &mut EntityIds,
    area: Rect,
    furniture: Furniture,
    rng: &mut R,
) -> Option<Point> {
    let pos = grid.search_free_location(area, rng)?;
    put_furniture(grid, ids, pos, furniture);
    Some(pos)
}

pub(crate) fn put_furniture(grid: &mut TileGrid, ids: &mut EntityIds, pos: Point, furniture: Furniture) {
    grid.set(pos, furniture_tile(furniture));
    grid.add_feature(Feature::new(ids.next_id(), pos, FeatureKind::Furniture(furniture)));
}

pub struct InteriorFill<'a> {
    options: &'a GenOptions,
}

impl<'a> InteriorFill<'a> {
    pub fn new(options: &'a GenOptions) -> Self {
        Self { options }
    }

    /// Populate `building`, which stands on `level`. A building is
    /// populated at most once.
    pub fn fill<R: RandomSource>(
        &self,
        world: &mut World,
        level: LevelId,
        building: &mut Building,
        rng: &mut R,
    ) -> Result<()> {
        if building.populated {
            return Err(GenError::AlreadyPopulated(building.id));
        }
        {
            let (grid, ids) = world.level_and_ids(level)?;
            grid.check_area(&building.area)?;
            building.populated = true;
            building.residents = Self::family(ids, rng);
            Self::assign_bedrooms(building, grid, ids, rng);
            Self::place_kitchen(building, grid, ids, rng);
        }
        if building.status == HouseStatus::Mansion && self.options.cellars {
            Self::dig_cellar(world, level, building, rng)?;
        }
        debug!(
            building = building.id.0,
            residents = building.residents.len(),
            cellar = building.cellar.is_some(),
            "building populated"
        );
        Ok(())
    }

    fn family<R: RandomSource>(ids: &mut EntityIds, rng: &mut R) -> Vec<Human> {
        let mut people = vec![Human::new(ids.next_id(), Role::Owner)];
        if rng.percent(SPOUSE_CHANCE) {
            people.push(Human::new(ids.next_id(), Role::Spouse));
            link_spouses(&mut people, 0, 1);
        }
        for chance in CHILD_CHANCES {
            if rng.percent(chance) {
                people.push(Human::new(ids.next_id(), Role::Child));
            }
        }
        people
    }

    fn assign_bedrooms<R: RandomSource>(
        building: &mut Building,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) {
        // a shack is one room that everybody shares
        let shared = building.status == HouseStatus::Shack;
        let mut eligible: Vec<usize> = building
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| shared || (r.is_house_outer() && !r.types.contains(RoomTypes::HALL)))
            .map(|(i, _)| i)
            .collect();

        for unit in bed_units(&building.residents) {
            let Some(k) = rng.choose_index(eligible.len()) else {
                debug!(building = building.id.0, resident = building.residents[unit].id.0, "no bedroom left");
                continue;
            };
            let room = if shared { eligible[k] } else { eligible.remove(k) };
            building.rooms[room].types |= RoomTypes::BEDROOM;

            let owner = building.residents[unit].id;
            let spouse = building.residents[unit].spouse;
            for h in &mut building.residents {
                if h.id == owner || Some(h.id) == spouse {
                    h.bedroom = Some(room);
                }
            }
            if place_furniture(grid, ids, building.rooms[room].inner(), Furniture::Bed, rng).is_none() {
                debug!(building = building.id.0, room, "no space for a bed");
            }
        }
    }

    fn place_kitchen<R: RandomSource>(
        building: &mut Building,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) {
        if building.rooms_with(RoomTypes::KITCHEN).next().is_some() {
            return;
        }
        let candidates: Vec<usize> = building
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.types.intersects(RoomTypes::BEDROOM | RoomTypes::HALL))
            .map(|(i, _)| i)
            .collect();
        let Some(&room) = rng.choose(&candidates) else {
            debug!(building = building.id.0, "no room for a kitchen");
            return;
        };
        building.rooms[room].types |= RoomTypes::KITCHEN;
        let inner = building.rooms[room].inner();
        place_furniture(grid, ids, inner, Furniture::Stove, rng);
        place_furniture(grid, ids, inner, Furniture::Table, rng);
    }

    /// Cave level the size of the grounds, linked by stairs
    fn dig_cellar<R: RandomSource>(
        world: &mut World,
        surface: LevelId,
        building: &mut Building,
        rng: &mut R,
    ) -> Result<()> {
        let Some(grounds) = building.privathand else {
            debug!(building = building.id.0, "no grounds, no cellar");
            return Ok(());
        };
        let Some(down) = world.level(surface)?.search_free_location(building.area.grow(-1), rng) else {
            debug!(building = building.id.0, "no space for cellar stairs");
            return Ok(());
        };

        let mut cellar = TileGrid::new(grounds.width(), grounds.height(), TileKind::CaveFloor);
        let bounds = cellar.bounds();
        carve_cave(&mut cellar, bounds, &CaveParams::default(), rng)?;
        let Some(up) = cellar.search_free_location(bounds, rng) else {
            debug!(building = building.id.0, "cellar has no floor");
            return Ok(());
        };
        let cellar_id = world.add_level(cellar);
        let down_id = world.next_id();
        let up_id = world.next_id();

        let grid = world.level_mut(surface)?;
        grid.set(down, TileKind::StairsDown);
        grid.add_feature(Feature::new(
            down_id,
            down,
            FeatureKind::Stairs {
                up: false,
                destination: Some(LevelPos::new(cellar_id, up)),
            },
        ));
        let grid = world.level_mut(cellar_id)?;
        grid.set(up, TileKind::StairsUp);
        grid.add_feature(Feature::new(
            up_id,
            up,
            FeatureKind::Stairs {
                up: true,
                destination: Some(LevelPos::new(surface, down)),
            },
        ));
        building.cellar = Some(cellar_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: u64, role: Role) -> Human {
        Human::new(EntityId(id), role)
    }

    #[test]
    fn test_link_spouses_is_symmetric() {
        let mut people = vec![person(1, Role::Owner), person(2, Role::Spouse), person(3, Role::Child)];
        link_spouses(&mut people, 0, 1);
        assert_eq!(people[0].spouse, Some(EntityId(2)));
        assert_eq!(people[1].spouse, Some(EntityId(1)));

        // remarrying divorces the old partner
        link_spouses(&mut people, 0, 2);
        assert_eq!(people[0].spouse, Some(EntityId(3)));
        assert_eq!(people[2].spouse, Some(EntityId(1)));
        assert_eq!(people[1].spouse, None);

        unlink_spouse(&mut people, 2);
        assert!(people.iter().all(|h| h.spouse.is_none()));
    }

    #[test]
    fn test_bed_units_skip_second_partner() {
        let mut people = vec![
            person(1, Role::Owner),
            person(2, Role::Spouse),
            person(3, Role::Child),
            person(4, Role::Child),
        ];
        assert_eq!(bed_units(&people), vec![0, 1, 2, 3]);
        link_spouses(&mut people, 0, 1);
        assert_eq!(bed_units(&people), vec![0, 2, 3]);
    }

    #[test]
    fn test_furniture_tiles() {
        assert_eq!(furniture_tile(Furniture::Stove), TileKind::Stove);
        assert_eq!(furniture_tile(Furniture::Bed), TileKind::Bed);
    }
}
