//! Building interiors
//!
//! Lays out the rooms of one building footprint: blocks (lux only), rooms,
//! connecting doors, the main entrance on the facade, windows on the
//! exterior walls, and finally the building status.
//!
//! Room floors are BSP leaves over the footprint's interior; the gaps
//! between leaves are the inner walls. Block gaps are drawn in the shell
//! material, so blocks read as thicker walls.

use tracing::debug;

use crate::error::{GenError, Result};
use crate::map::{Axis, Feature, FeatureKind, Point, Rect, Side, TileGrid, TileKind, TileState};
use crate::options::GenOptions;
use crate::rng::RandomSource;
use crate::world::EntityIds;

use super::bsp::{BspTree, SizeBounds, Split};
use super::building::{
    Building, Door, HouseStatus, Prosperity, Room, RoomLocation, RoomTypes, Window,
};

/// Room index of every floor cell of a building
struct RoomMap {
    area: Rect,
    cells: Vec<Option<usize>>,
}

impl RoomMap {
    fn new(area: Rect, rooms: &[Room]) -> Self {
        let mut cells = vec![None; area.area() as usize];
        for (i, room) in rooms.iter().enumerate() {
            for p in room.inner().points() {
                if let Some(idx) = Self::index(&area, p) {
                    cells[idx] = Some(i);
                }
            }
        }
        Self { area, cells }
    }

    fn index(area: &Rect, p: Point) -> Option<usize> {
        area.contains(p)
            .then(|| ((p.y - area.top) * area.width() + (p.x - area.left)) as usize)
    }

    fn get(&self, p: Point) -> Option<usize> {
        Self::index(&self.area, p).and_then(|i| self.cells[i])
    }
}

/// Cells of a split's gap with floor of two different rooms on either side.
/// Cells where another wall meets the gap are never candidates.
fn door_candidates(split: &Split, map: &RoomMap) -> Vec<(Point, usize, usize)> {
    let (nx, ny) = split.axis.normal();
    split
        .gap
        .points()
        .filter_map(|p| {
            let a = map.get(p.offset(-nx, -ny))?;
            let b = map.get(p.offset(nx, ny))?;
            (a != b).then_some((p, a, b))
        })
        .collect()
}

pub struct ApartmentGenerator<'a> {
    options: &'a GenOptions,
}

impl<'a> ApartmentGenerator<'a> {
    pub fn new(options: &'a GenOptions) -> Self {
        Self { options }
    }

    /// Lay out `building` and draw it into `grid`.
    ///
    /// Any previous layout of the building is discarded. On error the
    /// building and the grid may be left partially drawn.
    pub fn generate<R: RandomSource>(
        &self,
        building: &mut Building,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) -> Result<()> {
        grid.check_area(&building.lot())?;
        let interior = building.area.shrink(1).ok_or(GenError::AreaTooSmall {
            area: building.area,
            min: 3,
        })?;
        building.clear_layout(grid);
        let prosperity = building.prosperity;

        if let Some(grounds) = building.privathand {
            grid.fill(grounds, TileKind::Grass);
            grid.clear_foreground_area(grounds);
            grid.fill_border(grounds, TileKind::Fence);
        }
        grid.fill(building.area, prosperity.floor());
        grid.clear_foreground_area(building.area);
        grid.fill_border(building.area, prosperity.outer_wall());

        let block_tree = (prosperity == Prosperity::Lux).then(|| {
            let bounds = SizeBounds::new(self.options.block_min, self.options.block_max);
            BspTree::build(interior, bounds, true, rng)
        });
        building.blocks = match &block_tree {
            Some(tree) => tree.leaves().into_iter().map(|id| tree.node(id).area).collect(),
            None => vec![interior],
        };
        if let Some(tree) = &block_tree {
            for gap in tree.gaps() {
                grid.fill(gap, prosperity.outer_wall());
            }
        }

        let room_bounds = SizeBounds::new(self.options.room_min, self.options.room_max);
        let mut room_trees = Vec::with_capacity(building.blocks.len());
        for (block, area) in building.blocks.iter().enumerate() {
            let tree = BspTree::build(*area, room_bounds, true, rng);
            for id in tree.leaves() {
                let leaf = tree.node(id);
                let mut room = Room::new(leaf.area, block);
                if leaf.is_outer() {
                    room.location = RoomLocation::BlockOuter;
                    room.outer_sides = leaf.sides.clone();
                }
                building.rooms.push(room);
            }
            for gap in tree.gaps() {
                grid.fill(gap, prosperity.inner_wall());
            }
            room_trees.push(tree);
        }
        let map = RoomMap::new(building.area, &building.rooms);

        for tree in &room_trees {
            for id in tree.internal_nodes() {
                let Some(split) = tree.node(id).split else { continue };
                let candidates = door_candidates(&split, &map);
                match rng.choose(&candidates) {
                    Some(&(pos, a, b)) => {
                        let open = rng.one_in(2);
                        add_door(building, grid, ids, pos, split.axis, open, false, [Some(a), Some(b)]);
                    }
                    None => debug!(building = building.id.0, gap = ?split.gap, "no valid door position"),
                }
            }
        }

        Self::classify_rooms(building);

        if let Some(tree) = &block_tree {
            Self::connect_blocks(building, tree, &map, grid, ids, rng);
        }
        Self::place_main_door(building, grid, ids, rng);
        Self::place_windows(building, grid, ids, rng);

        building.status = match prosperity {
            Prosperity::Poor if building.rooms.len() <= 1 => HouseStatus::Shack,
            Prosperity::Poor => HouseStatus::House,
            Prosperity::Good => HouseStatus::Detached,
            Prosperity::Lux => HouseStatus::Mansion,
        };
        debug!(
            building = building.id.0,
            status = %building.status,
            blocks = building.blocks.len(),
            rooms = building.rooms.len(),
            doors = building.doors.len(),
            windows = building.windows.len(),
            "building laid out"
        );
        Ok(())
    }

    /// Block-outer rooms whose wall is part of the shell become house-outer
    fn classify_rooms(building: &mut Building) {
        let area = building.area;
        for room in &mut building.rooms {
            if room.location != RoomLocation::BlockOuter {
                continue;
            }
            room.exterior_sides = room
                .outer_sides
                .iter()
                .copied()
                .filter(|&side| !area.contains(room.area.side_mid(side).step(side)))
                .collect();
            if !room.exterior_sides.is_empty() {
                room.location = RoomLocation::HouseOuter;
            }
        }
    }

    /// One door across every block split, between house-outer rooms when
    /// such a position exists
    fn connect_blocks<R: RandomSource>(
        building: &mut Building,
        tree: &BspTree,
        map: &RoomMap,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) {
        for id in tree.internal_nodes() {
            let Some(split) = tree.node(id).split else { continue };
            let candidates = door_candidates(&split, map);
            let outer: Vec<_> = candidates
                .iter()
                .copied()
                .filter(|&(_, a, b)| {
                    building.rooms[a].is_house_outer() && building.rooms[b].is_house_outer()
                })
                .collect();
            let pool = if outer.is_empty() { &candidates } else { &outer };
            match rng.choose(pool) {
                Some(&(pos, a, b)) => {
                    add_door(building, grid, ids, pos, split.axis, true, false, [Some(a), Some(b)]);
                }
                None => debug!(building = building.id.0, gap = ?split.gap, "blocks left unconnected"),
            }
        }
    }

    fn place_main_door<R: RandomSource>(
        building: &mut Building,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) {
        let facade = building.facade;
        let halls: Vec<usize> = building
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_house_outer() && r.exterior_sides.contains(&facade))
            .map(|(i, _)| i)
            .collect();
        let Some(&hall) = rng.choose(&halls) else {
            debug!(building = building.id.0, side = %facade, "no room on the facade");
            return;
        };

        let span = building.rooms[hall].wall_span(facade);
        let pos = Point::new(
            rng.range(span.left, span.right),
            rng.range(span.top, span.bottom),
        );
        building.rooms[hall].types |= RoomTypes::HALL;
        add_door(building, grid, ids, pos, facade.axis(), false, true, [Some(hall), None]);

        let Some(grounds) = building.privathand else { return };
        let alley = match facade {
            Side::Top => Rect::new(pos.x, grounds.top, pos.x, pos.y - 1),
            Side::Bottom => Rect::new(pos.x, pos.y + 1, pos.x, grounds.bottom),
            Side::Left => Rect::new(grounds.left, pos.y, pos.x - 1, pos.y),
            Side::Right => Rect::new(pos.x + 1, pos.y, grounds.right, pos.y),
        };
        if let Some(alley) = alley.is_valid().then(|| alley.intersection(&grounds)).flatten() {
            grid.fill(alley, TileKind::Paving);
            grid.clear_foreground_area(alley);
            building.alley = Some(alley);
        }
    }

    fn place_windows<R: RandomSource>(
        building: &mut Building,
        grid: &mut TileGrid,
        ids: &mut EntityIds,
        rng: &mut R,
    ) {
        let main = building.main_door().map(|d| d.pos);
        for room in 0..building.rooms.len() {
            if !building.rooms[room].is_house_outer() {
                continue;
            }
            for side in building.rooms[room].exterior_sides.clone() {
                let span = building.rooms[room].wall_span(side);
                let pos = Point::new(
                    rng.range(span.left, span.right),
                    rng.range(span.top, span.bottom),
                );
                if Some(pos) == main {
                    continue;
                }
                let axis = side.axis();
                grid.set(pos, TileKind::window(axis));
                let feature = grid.add_feature(Feature::new(ids.next_id(), pos, FeatureKind::Window { axis }));
                building.windows.push(Window {
                    pos,
                    axis,
                    room,
                    feature,
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn add_door(
    building: &mut Building,
    grid: &mut TileGrid,
    ids: &mut EntityIds,
    pos: Point,
    axis: Axis,
    open: bool,
    main: bool,
    rooms: [Option<usize>; 2],
) {
    let kind = if open {
        TileKind::open_door(axis)
    } else {
        TileKind::closed_door(axis)
    };
    grid.set(pos, kind);
    // keep furniture out of the way in
    let (nx, ny) = axis.normal();
    for p in [pos.offset(-nx, -ny), pos.offset(nx, ny)] {
        if building.area.contains(p) {
            grid.mark(p, TileState::NOT_FREE);
        }
    }
    let feature = grid.add_feature(Feature::new(
        ids.next_id(),
        pos,
        FeatureKind::Door { axis, open, main },
    ));
    building.doors.push(Door {
        pos,
        axis,
        main,
        rooms,
        feature,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::BuildingId;
    use crate::rng::GameRng;

    fn build(area: Rect, prosperity: Prosperity, facade: Side, seed: u64) -> (Building, TileGrid) {
        let options = GenOptions::default();
        let mut grid = TileGrid::new(60, 60, TileKind::Grass);
        let mut ids = EntityIds::default();
        let mut rng = GameRng::new(seed);
        let mut building = Building::new(BuildingId(0), area, prosperity);
        building.facade = facade;
        ApartmentGenerator::new(&options)
            .generate(&mut building, &mut grid, &mut ids, &mut rng)
            .unwrap();
        (building, grid)
    }

    #[test]
    fn test_single_room_shack() {
        let (b, grid) = build(Rect::new(2, 2, 9, 9), Prosperity::Poor, Side::Bottom, 1);
        assert_eq!(b.rooms.len(), 1);
        assert_eq!(b.status, HouseStatus::Shack);
        assert_eq!(b.rooms[0].location, RoomLocation::HouseOuter);
        assert_eq!(b.rooms[0].exterior_sides.len(), 4);

        let main = b.main_door().unwrap();
        assert_eq!(main.pos.y, 9);
        assert!(b.rooms[0].types.contains(RoomTypes::HALL));
        assert!(grid.foreground(main.pos).is_door());
        // no grounds, no alley
        assert!(b.alley.is_none());
    }

    #[test]
    fn test_windows_on_exterior_walls() {
        let (b, grid) = build(Rect::new(0, 0, 24, 18), Prosperity::Poor, Side::Left, 7);
        assert!(!b.windows.is_empty());
        for w in &b.windows {
            let room = &b.rooms[w.room];
            assert!(room.is_house_outer());
            assert!(room.area.border_points().any(|p| p == w.pos));
            assert!(b.area.border_points().any(|p| p == w.pos));
            assert_eq!(grid.foreground(w.pos), TileKind::window(w.axis));
        }
    }

    #[test]
    fn test_good_building_gets_alley() {
        let options = GenOptions::default();
        let mut grid = TileGrid::new(40, 40, TileKind::Grass);
        let mut ids = EntityIds::default();
        let mut rng = GameRng::new(3);
        let mut b = Building::new(BuildingId(4), Rect::new(7, 7, 24, 20), Prosperity::Good);
        b.privathand = Some(Rect::new(5, 5, 26, 22));
        b.facade = Side::Top;
        ApartmentGenerator::new(&options)
            .generate(&mut b, &mut grid, &mut ids, &mut rng)
            .unwrap();

        assert_eq!(b.status, HouseStatus::Detached);
        let door = b.main_door().unwrap().pos;
        let alley = b.alley.unwrap();
        assert_eq!(alley, Rect::new(door.x, 5, door.x, 6));
        assert_eq!(grid.background(Point::new(door.x, 5)), TileKind::Paving);
        assert_eq!(grid.foreground(Point::new(door.x, 5)), TileKind::Nothing);
        assert_eq!(grid.foreground(Point::new(5, 5)), TileKind::Fence);
    }

    #[test]
    fn test_too_small_footprint() {
        let options = GenOptions::default();
        let mut grid = TileGrid::new(10, 10, TileKind::Grass);
        let mut ids = EntityIds::default();
        let mut rng = GameRng::new(1);
        let mut b = Building::new(BuildingId(0), Rect::new(0, 0, 1, 5), Prosperity::Poor);
        let err = ApartmentGenerator::new(&options)
            .generate(&mut b, &mut grid, &mut ids, &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenError::AreaTooSmall { .. }));

        let mut b = Building::new(BuildingId(1), Rect::new(5, 5, 14, 14), Prosperity::Poor);
        let err = ApartmentGenerator::new(&options)
            .generate(&mut b, &mut grid, &mut ids, &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenError::OutOfBounds { .. }));
    }

    #[test]
    fn test_doors_registered_as_features() {
        let (b, grid) = build(Rect::new(0, 0, 30, 24), Prosperity::Good, Side::Right, 12);
        for door in &b.doors {
            let feature = grid.features.get(door.feature).unwrap();
            assert_eq!(feature.pos, door.pos);
            assert!(feature.is_door());
        }
        for w in &b.windows {
            assert_eq!(grid.features.get(w.feature).unwrap().pos, w.pos);
        }
    }

    #[test]
    fn test_regenerate_drops_old_features() {
        let options = GenOptions::default();
        let mut grid = TileGrid::new(40, 40, TileKind::Grass);
        let mut ids = EntityIds::default();
        let mut rng = GameRng::new(5);
        let mut b = Building::new(BuildingId(0), Rect::new(2, 2, 30, 24), Prosperity::Poor);
        let generator = ApartmentGenerator::new(&options);
        generator.generate(&mut b, &mut grid, &mut ids, &mut rng).unwrap();
        generator.generate(&mut b, &mut grid, &mut ids, &mut rng).unwrap();

        let owned: Vec<_> = b
            .doors
            .iter()
            .map(|d| d.feature)
            .chain(b.windows.iter().map(|w| w.feature))
            .collect();
        assert_eq!(grid.features.len(), owned.len());
        assert!(grid.features.iter().all(|f| owned.contains(&f.id)));
    }

    #[test]
    fn test_door_approaches_are_reserved() {
        let (b, grid) = build(Rect::new(0, 0, 30, 24), Prosperity::Poor, Side::Bottom, 4);
        for door in &b.doors {
            let (nx, ny) = door.axis.normal();
            for p in [door.pos.offset(-nx, -ny), door.pos.offset(nx, ny)] {
                if b.area.contains(p) {
                    assert!(!grid.is_free(p), "door {:?} approach {:?}", door.pos, p);
                }
            }
        }
    }
}
