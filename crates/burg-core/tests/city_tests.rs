use std::collections::HashSet;

use burg_core::map::{Rect, TileKind, TileGrid};
use burg_core::mapgen::{City, CityGenerator, DistrictKind, Prosperity, RoomTypes};
use burg_core::{GameRng, GenOptions, NoProgress, World};

fn generate(options: GenOptions, seed: u64) -> (City, World) {
    let (w, h) = (options.city_width, options.city_height);
    let mut world = World::new();
    let level = world.add_level(TileGrid::new(w + 16, h + 16, TileKind::Grass));
    let mut city = City::new(Rect::with_size(8, 8, w, h));
    let mut rng = GameRng::new(seed);
    CityGenerator::new(options)
        .generate(&mut world, level, &mut city, &mut rng, &mut NoProgress)
        .unwrap();
    (city, world)
}

#[test]
fn test_buildings_do_not_overlap() {
    for seed in [1, 9, 23] {
        let (city, _) = generate(GenOptions::default(), seed);
        assert!(!city.buildings.is_empty());
        for (i, a) in city.buildings.iter().enumerate() {
            assert!(city.area.contains_rect(&a.lot()));
            for b in &city.buildings[i + 1..] {
                assert!(!a.lot().intersects(&b.lot()), "seed {seed}: {:?} and {:?}", a.area, b.area);
            }
        }
    }
}

#[test]
fn test_buildings_stay_off_streets() {
    let (city, _) = generate(GenOptions::default(), 5);
    for b in &city.buildings {
        for street in &city.streets {
            assert!(!b.lot().intersects(&street.area));
        }
    }
}

#[test]
fn test_building_invariants() {
    let (city, _) = generate(GenOptions::default(), 42);
    let mut addresses = HashSet::new();
    for b in &city.buildings {
        assert!(b.rooms_with(RoomTypes::KITCHEN).count() <= 1);
        assert!(b.populated);
        for room in &b.rooms {
            assert!(b.area.contains_rect(&room.area));
        }
        if let (Some(street), Some(number)) = (b.street, b.number) {
            assert!(addresses.insert((street, number)), "number {number} issued twice");
        }
        let district = &city.districts[b.district.unwrap()];
        assert_eq!(district.kind, DistrictKind::Default);
        assert_eq!(district.prosperity, b.prosperity);
        assert!(district.buildings.contains(&b.id));
    }
}

#[test]
fn test_same_seed_same_city() {
    let (a, wa) = generate(GenOptions::default(), 2024);
    let (b, wb) = generate(GenOptions::default(), 2024);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    assert_eq!(wa.level_count(), wb.level_count());
    for ((_, ga), (_, gb)) in wa.levels().zip(wb.levels()) {
        assert_eq!(ga.to_ascii(), gb.to_ascii());
    }
}

#[test]
fn test_river_keeps_lux_dry() {
    let options = GenOptions {
        river: true,
        ..GenOptions::default()
    };
    let (city, world) = generate(options, 77);
    let grid = world.levels().next().unwrap().1;
    assert!(grid.count_kind(city.area, TileKind::Water) > 0);
    for d in &city.districts {
        if d.has_water {
            assert_ne!(d.prosperity, Prosperity::Lux);
        }
    }
}

#[test]
fn test_cellars_are_levels() {
    let (city, world) = generate(GenOptions::default(), 8);
    let cellars: Vec<_> = city.buildings.iter().filter_map(|b| b.cellar).collect();
    assert_eq!(world.level_count(), 1 + cellars.len());
    for id in cellars {
        assert!(world.level(id).is_ok());
    }
}

#[test]
fn test_furniture_never_blocks_a_door() {
    for seed in [1, 8, 9, 17] {
        let (city, world) = generate(GenOptions::default(), seed);
        let (_, grid) = world.levels().next().unwrap();
        for b in &city.buildings {
            for door in &b.doors {
                let (nx, ny) = door.axis.normal();
                for p in [door.pos.offset(-nx, -ny), door.pos.offset(nx, ny)] {
                    if b.area.contains(p) {
                        assert!(
                            !grid.is_barrier(p),
                            "seed {seed}: building {} door {:?} blocked at {:?}",
                            b.id.0,
                            door.pos,
                            p
                        );
                    }
                }
            }
        }
    }
}
