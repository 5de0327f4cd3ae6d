//! City generation
//!
//! The city rectangle is partitioned into districts; the gaps between them
//! are the streets, wide near the root of the partition and narrow deeper
//! down. Districts are banded by distance from the centre into prosperity
//! tiers, a few become parks, squares or a graveyard, and the rest are cut
//! into lots that receive buildings.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, warn};

use crate::consts::{RAD_GOOD, RAD_INNER, RAD_LUX, RAD_OUTER};
use crate::error::{GenError, Result};
use crate::map::{Axis, Point, Rect, Side, TileGrid, TileKind, TileState};
use crate::options::GenOptions;
use crate::progress::Progress;
use crate::rng::RandomSource;
use crate::world::{LevelId, World};

use super::apartment::ApartmentGenerator;
use super::bsp::{BspTree, SizeBounds, SplitEvent, SplitPolicy};
use super::building::{Building, BuildingId, Prosperity};
use super::decor::{graveyard, park, square, yard};
use super::fill::InteriorFill;
use super::river::draw_river;
use super::road::{RoadParams, draw_road, winding_road};

/// Index of a street in its city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreetId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
    pub id: StreetId,
    pub area: Rect,
    pub axis: Axis,
    /// Depth of the split that opened the street
    pub depth: u32,
    last_number: u32,
}

impl Street {
    pub fn new(id: StreetId, area: Rect, axis: Axis, depth: u32) -> Self {
        Self {
            id,
            area,
            axis,
            depth,
            last_number: 0,
        }
    }

    /// Allocate the next house number, starting at 1
    pub fn next_number(&mut self) -> u32 {
        self.last_number += 1;
        self.last_number
    }

    pub fn numbers_issued(&self) -> u32 {
        self.last_number
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum DistrictKind {
    #[default]
    Default,
    Park,
    Square,
    Graveyard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub area: Rect,
    pub prosperity: Prosperity,
    pub kind: DistrictKind,
    pub has_water: bool,
    /// Distance of the district centre from the city centre
    pub distance: f64,
    pub buildings: Vec<BuildingId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub area: Rect,
    pub center: Point,
    pub radius: f64,
    pub districts: Vec<District>,
    pub streets: Vec<Street>,
    pub buildings: Vec<Building>,
    /// Roads leading from the city edge to the map edge
    pub roads: Vec<Vec<Point>>,
}

impl City {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            center: area.center(),
            radius: 0.0,
            districts: Vec::new(),
            streets: Vec::new(),
            buildings: Vec::new(),
            roads: Vec::new(),
        }
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.0)
    }

    pub fn street_at(&self, p: Point) -> Option<StreetId> {
        self.streets.iter().find(|s| s.area.contains(p)).map(|s| s.id)
    }

    pub fn district_at(&self, p: Point) -> Option<usize> {
        self.districts.iter().position(|d| d.area.contains(p))
    }

    /// Sides of `area` whose neighbouring cells belong to a street
    pub fn street_sides(&self, area: Rect) -> Vec<(Side, StreetId)> {
        Side::ALL
            .into_iter()
            .filter_map(|side| {
                self.street_at(area.side_mid(side).step(side))
                    .map(|street| (side, street))
            })
            .collect()
    }
}

/// Gap widths by depth; every gap becomes a street
struct StreetPolicy<'a> {
    options: &'a GenOptions,
    streets: Vec<Street>,
}

impl SplitPolicy for StreetPolicy<'_> {
    fn split_width<R: RandomSource>(&mut self, depth: u32, rng: &mut R) -> i32 {
        let o = self.options;
        if depth <= o.street_wide_depth {
            rng.range(o.street_wide_min, o.street_wide_max)
        } else {
            rng.range(o.street_narrow_min, o.street_narrow_max)
        }
    }

    fn on_split(&mut self, event: &SplitEvent) {
        if event.gap.is_valid() {
            let id = StreetId(self.streets.len());
            self.streets.push(Street::new(id, event.gap, event.axis, event.depth));
        }
    }
}

pub struct CityGenerator {
    options: GenOptions,
}

impl CityGenerator {
    pub fn new(options: GenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenOptions {
        &self.options
    }

    /// Generate `city` on `level`.
    ///
    /// A building that fails is logged and left as far as it got; errors
    /// at city or district level abort generation.
    pub fn generate<R, P>(
        &self,
        world: &mut World,
        level: LevelId,
        city: &mut City,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<()>
    where
        R: RandomSource,
        P: Progress,
    {
        self.options
            .validate()
            .map_err(|e| GenError::InvalidOptions(e.to_string()))?;
        let min = self.options.district_min;
        if city.area.width() < min || city.area.height() < min {
            return Err(GenError::AreaTooSmall { area: city.area, min });
        }
        world.level(level)?.check_area(&city.area)?;
        *city = City::new(city.area);

        progress.set_stage("layout", 1);
        self.layout(world.level_mut(level)?, city, rng)?;
        progress.complete(1);

        progress.set_stage("districts", city.districts.len());
        for i in 0..city.districts.len() {
            self.build_district(world, level, city, i, rng)?;
            progress.complete(1);
        }

        progress.set_stage("buildings", city.buildings.len());
        for building in &mut city.buildings {
            if let Err(err) = self.build_one(world, level, building, rng) {
                warn!(building = building.id.0, area = ?building.area, %err, "building abandoned");
            }
            progress.complete(1);
        }

        progress.set_stage("roads", 1);
        self.approach_roads(world.level_mut(level)?, city, rng);
        progress.complete(1);

        info!(
            districts = city.districts.len(),
            streets = city.streets.len(),
            buildings = city.buildings.len(),
            roads = city.roads.len(),
            "city generated"
        );
        Ok(())
    }

    /// Districts, streets and their classification
    fn layout<R: RandomSource>(&self, grid: &mut TileGrid, city: &mut City, rng: &mut R) -> Result<()> {
        let area = city.area;
        city.center = area.center();
        city.radius = if rng.one_in(2) {
            f64::from(area.height() / 2)
        } else {
            f64::from(area.width() / 2)
        };

        grid.fill(area, TileKind::Dirt);
        grid.clear_foreground_area(area);
        if self.options.river {
            draw_river(grid, area, 2, 30, rng)?;
        }

        let mut policy = StreetPolicy {
            options: &self.options,
            streets: Vec::new(),
        };
        let bounds = SizeBounds::new(self.options.district_min, self.options.district_max);
        let tree = BspTree::build_with(area, bounds, true, &mut policy, rng);
        city.streets = policy.streets;

        let r = city.radius;
        for id in tree.leaves() {
            let area = tree.node(id).area;
            let distance = area.center().distance(city.center);
            let has_water = grid.any_kind(area, TileKind::Water);
            let prosperity = if distance < r * RAD_LUX && !has_water {
                Prosperity::Lux
            } else if distance < r * RAD_GOOD {
                Prosperity::Good
            } else {
                Prosperity::Poor
            };
            city.districts.push(District {
                area,
                prosperity,
                kind: DistrictKind::Default,
                has_water,
                distance,
                buildings: Vec::new(),
            });
        }
        self.pick_special(city, rng);

        for street in &city.streets {
            grid.fill(street.area, TileKind::Road);
            grid.clear_foreground_area(street.area);
            grid.mark_area(street.area, TileState::VISITED | TileState::SEEN);
        }
        debug!(radius = city.radius, districts = city.districts.len(), streets = city.streets.len(), "city laid out");
        Ok(())
    }

    /// Parks and squares from the middle band, one graveyard far out
    fn pick_special<R: RandomSource>(&self, city: &mut City, rng: &mut R) {
        let inner = city.radius * RAD_INNER;
        let outer = city.radius * RAD_OUTER;
        let mut candidates: Vec<usize> = city
            .districts
            .iter()
            .enumerate()
            .filter(|(_, d)| d.distance > inner && d.distance < outer)
            .map(|(i, _)| i)
            .collect();

        let wanted = [
            (DistrictKind::Park, self.options.park_count),
            (DistrictKind::Square, self.options.square_count),
        ];
        for (kind, count) in wanted {
            for _ in 0..count {
                let Some(k) = rng.choose_index(candidates.len()) else {
                    debug!(%kind, "no district left");
                    break;
                };
                let i = candidates.remove(k);
                city.districts[i].kind = kind;
            }
        }

        if self.options.graveyard {
            let far: Vec<usize> = city
                .districts
                .iter()
                .enumerate()
                .filter(|(_, d)| d.kind == DistrictKind::Default && d.distance >= outer && !d.has_water)
                .map(|(i, _)| i)
                .collect();
            match rng.choose(&far) {
                Some(&i) => city.districts[i].kind = DistrictKind::Graveyard,
                None => debug!("no district for a graveyard"),
            }
        }
    }

    fn build_district<R: RandomSource>(
        &self,
        world: &mut World,
        level: LevelId,
        city: &mut City,
        index: usize,
        rng: &mut R,
    ) -> Result<()> {
        let (grid, ids) = world.level_and_ids(level)?;
        let area = city.districts[index].area;
        grid.check_area(&area)?;
        match city.districts[index].kind {
            DistrictKind::Park => park(grid, area, self.options.tree_chance, rng),
            DistrictKind::Square => square(grid, ids, area),
            DistrictKind::Graveyard => {
                let gates: Vec<Side> = city.street_sides(area).into_iter().map(|(s, _)| s).collect();
                graveyard(grid, ids, area, &gates, rng);
            }
            DistrictKind::Default => self.place_lots(grid, city, index, rng),
        }
        Ok(())
    }

    /// Cut a district into lots and register a building on every lot
    /// that faces a street
    fn place_lots<R: RandomSource>(&self, grid: &mut TileGrid, city: &mut City, index: usize, rng: &mut R) {
        let o = &self.options;
        let area = city.districts[index].area;
        let prosperity = city.districts[index].prosperity;

        let ground = match prosperity {
            Prosperity::Poor => TileKind::Dirt,
            _ => TileKind::Grass,
        };
        for p in area.points() {
            if grid.background(p) != TileKind::Water {
                grid.set_background(p, ground);
                grid.clear_foreground(p);
            }
        }

        let (lots, margin) = match prosperity {
            Prosperity::Lux => (vec![area], o.grounds_margin_lux),
            Prosperity::Good => (lot_areas(area, o.lot_good_min, o.lot_good_max, rng), o.grounds_margin_good),
            Prosperity::Poor => (lot_areas(area, o.lot_poor_min, o.lot_poor_max, rng), 0),
        };

        for lot in lots {
            let facades = city.street_sides(lot);
            let Some(&(facade, street)) = rng.choose(&facades) else {
                yard(grid, lot, rng);
                continue;
            };
            if grid.any_kind(lot, TileKind::Water) {
                debug!(?lot, "lot on water rejected");
                continue;
            }
            let (footprint, grounds) = match lot.shrink(margin) {
                Some(inset) if margin > 0 && inset.width() >= 5 && inset.height() >= 5 => (inset, Some(lot)),
                _ => (lot, None),
            };

            let id = BuildingId(city.buildings.len());
            let mut building = Building::new(id, footprint, prosperity);
            building.privathand = grounds;
            building.facade = facade;
            building.street = Some(street);
            building.number = Some(city.streets[street.0].next_number());
            building.district = Some(index);
            city.districts[index].buildings.push(id);
            city.buildings.push(building);
        }
    }

    fn build_one<R: RandomSource>(
        &self,
        world: &mut World,
        level: LevelId,
        building: &mut Building,
        rng: &mut R,
    ) -> Result<()> {
        let (grid, ids) = world.level_and_ids(level)?;
        ApartmentGenerator::new(&self.options).generate(building, grid, ids, rng)?;
        InteriorFill::new(&self.options).fill(world, level, building, rng)
    }

    /// Winding roads from both ends of the main street to the map edge,
    /// where the map leaves room around the city
    fn approach_roads<R: RandomSource>(&self, grid: &mut TileGrid, city: &mut City, rng: &mut R) {
        let Some((main, axis)) = city.streets.first().map(|s| (s.area, s.axis)) else {
            return;
        };
        let (bounds, area) = (grid.bounds(), city.area);
        let ends: Vec<Side> = Side::ALL.into_iter().filter(|s| s.axis() != axis).collect();

        for side in ends {
            let outside = match side {
                Side::Top => Rect::new(bounds.left, bounds.top, bounds.right, area.top - 1),
                Side::Bottom => Rect::new(bounds.left, area.bottom + 1, bounds.right, bounds.bottom),
                Side::Left => Rect::new(bounds.left, bounds.top, area.left - 1, bounds.bottom),
                Side::Right => Rect::new(area.right + 1, bounds.top, bounds.right, bounds.bottom),
            };
            let depth = outside.len(side.axis().flip());
            if !outside.is_valid() || depth < 2 {
                continue;
            }
            let start = main.side_mid(side).step(side);
            let end = match side {
                Side::Top | Side::Bottom => Point::new(
                    (start.x + rng.range(-depth, depth)).clamp(outside.left, outside.right),
                    outside.edge(side),
                ),
                Side::Left | Side::Right => Point::new(
                    outside.edge(side),
                    (start.y + rng.range(-depth, depth)).clamp(outside.top, outside.bottom),
                ),
            };
            let path = winding_road(start, end, outside, &RoadParams::default(), rng);
            draw_road(grid, &path, TileKind::Road);
            city.roads.push(path);
        }
    }
}

fn lot_areas<R: RandomSource>(area: Rect, min: i32, max: i32, rng: &mut R) -> Vec<Rect> {
    let tree = BspTree::build(area, SizeBounds::new(min, max), false, rng);
    tree.leaves().into_iter().map(|id| tree.node(id).area).collect()
}
