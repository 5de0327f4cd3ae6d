//! Support code for the `burg` binary: option loading and the JSON
//! summary of a generated city.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use burg_core::mapgen::{Building, City, RoomTypes};
use burg_core::{GenOptions, OptionsError, World};

/// Load options from a JSON file, an rc file, or the defaults.
/// The JSON file wins when both are given.
pub fn load_options(config: Option<&Path>, rc: Option<&Path>) -> Result<GenOptions, OptionsError> {
    match (config, rc) {
        (Some(path), _) => GenOptions::load_json(path),
        (None, Some(path)) => GenOptions::load_rc(path),
        (None, None) => Ok(GenOptions::default()),
    }
}

/// Counts describing a generated city
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub levels: usize,
    pub streets: usize,
    pub districts: BTreeMap<String, usize>,
    pub prosperity: BTreeMap<String, usize>,
    pub buildings: BTreeMap<String, usize>,
    pub rooms: usize,
    pub kitchens: usize,
    pub doors: usize,
    pub windows: usize,
    pub residents: usize,
    pub cellars: usize,
    pub roads: usize,
}

impl Summary {
    pub fn new(seed: u64, city: &City, world: &World) -> Self {
        let mut districts = BTreeMap::new();
        let mut prosperity = BTreeMap::new();
        for d in &city.districts {
            *districts.entry(d.kind.to_string()).or_insert(0) += 1;
            *prosperity.entry(d.prosperity.to_string()).or_insert(0) += 1;
        }
        let mut buildings = BTreeMap::new();
        for b in &city.buildings {
            *buildings.entry(b.status.to_string()).or_insert(0) += 1;
        }
        let sum = |f: &dyn Fn(&Building) -> usize| -> usize { city.buildings.iter().map(f).sum() };

        Self {
            seed,
            width: city.area.width(),
            height: city.area.height(),
            levels: world.level_count(),
            streets: city.streets.len(),
            districts,
            prosperity,
            buildings,
            rooms: sum(&|b| b.rooms.len()),
            kitchens: sum(&|b| b.rooms_with(RoomTypes::KITCHEN).count()),
            doors: sum(&|b| b.doors.len()),
            windows: sum(&|b| b.windows.len()),
            residents: sum(&|b| b.residents.len()),
            cellars: sum(&|b| usize::from(b.cellar.is_some())),
            roads: city.roads.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burg_core::map::{Rect, TileGrid, TileKind};
    use burg_core::mapgen::CityGenerator;
    use burg_core::{GameRng, NoProgress};

    #[test]
    fn test_summary_counts() {
        let mut world = World::new();
        let level = world.add_level(TileGrid::new(100, 70, TileKind::Grass));
        let mut city = City::new(Rect::new(0, 0, 99, 69));
        let mut rng = GameRng::new(17);
        CityGenerator::new(GenOptions::default())
            .generate(&mut world, level, &mut city, &mut rng, &mut NoProgress)
            .unwrap();

        let summary = Summary::new(17, &city, &world);
        assert_eq!(summary.width, 100);
        assert_eq!(summary.districts.values().sum::<usize>(), city.districts.len());
        assert_eq!(summary.buildings.values().sum::<usize>(), city.buildings.len());
        assert!(summary.kitchens <= city.buildings.len());
        assert_eq!(summary.levels, 1 + summary.cellars);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"seed\":17"));
    }

    #[test]
    fn test_default_options_without_files() {
        assert_eq!(load_options(None, None).unwrap(), GenOptions::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_options(None, Some(Path::new("/nonexistent/burgrc"))).unwrap_err();
        assert!(matches!(err, OptionsError::Io(_)));
    }
}
