use burg_core::GameRng;
use burg_core::map::{Point, Rect, TileGrid, TileKind};
use burg_core::mapgen::{CaveParams, RoadParams, carve_cave, draw_river, walk_path, winding_road};
use proptest::prelude::*;

fn four_connected(path: &[Point]) -> bool {
    path.windows(2).all(|w| w[0].manhattan(w[1]) == 1)
}

#[test]
fn test_river_crosses_longer_side() {
    let mut grid = TileGrid::new(60, 30, TileKind::Grass);
    let mut rng = GameRng::new(4);
    let area = grid.bounds();
    let path = draw_river(&mut grid, area, 2, 30, &mut rng).unwrap();
    assert_eq!(path.first().unwrap().x, 0);
    assert_eq!(path.last().unwrap().x, 59);
    assert!(grid.count_kind(area, TileKind::Water) >= 60);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cave_is_one_region(seed in any::<u64>()) {
        let mut grid = TileGrid::new(30, 30, TileKind::Grass);
        let area = grid.bounds();
        let floor = carve_cave(&mut grid, area, &CaveParams::default(), &mut GameRng::new(seed)).unwrap();
        prop_assert!(floor > 0);

        let open = |p: Point| grid.foreground(p) == TileKind::Nothing;
        let start = area.points().find(|&p| open(p)).unwrap();
        prop_assert_eq!(grid.flood_fill(start, open).len(), floor);
        prop_assert!(area.border_points().all(|p| grid.foreground(p) == TileKind::Rock));
    }

    #[test]
    fn winding_road_keeps_ends(
        ax in 0i32..50, ay in 0i32..40,
        bx in 0i32..50, by in 0i32..40,
        seed in any::<u64>(),
    ) {
        let area = Rect::new(0, 0, 49, 39);
        let (a, b) = (Point::new(ax, ay), Point::new(bx, by));
        let path = winding_road(a, b, area, &RoadParams::default(), &mut GameRng::new(seed));
        prop_assert_eq!(path.first(), Some(&a));
        prop_assert_eq!(path.last(), Some(&b));
        prop_assert!(path.iter().all(|&p| area.contains(p)));
        prop_assert!(four_connected(&path));
    }

    #[test]
    fn walk_reaches_target(
        fx in 0i32..40, fy in 0i32..25,
        tx in 0i32..40, ty in 0i32..25,
        wideness in 0u32..100,
        seed in any::<u64>(),
    ) {
        let area = Rect::new(0, 0, 39, 24);
        let to = Point::new(tx, ty);
        let path = walk_path(Point::new(fx, fy), to, area, wideness, &mut GameRng::new(seed));
        prop_assert_eq!(path.last(), Some(&to));
        prop_assert!(path.iter().all(|&p| area.contains(p)));
        prop_assert!(four_connected(&path));
    }
}
