use burg_core::GameRng;
use burg_core::map::Rect;
use burg_core::mapgen::{BspTree, SizeBounds};
use proptest::prelude::*;

/// How many leaves and gaps cover each cell of `area`
fn coverage(tree: &BspTree, area: Rect) -> Vec<u32> {
    let mut cover = vec![0u32; area.area() as usize];
    let idx = |x: i32, y: i32| ((y - area.top) * area.width() + (x - area.left)) as usize;
    for id in tree.leaves() {
        for p in tree.node(id).area.points() {
            cover[idx(p.x, p.y)] += 1;
        }
    }
    for gap in tree.gaps() {
        for p in gap.points() {
            cover[idx(p.x, p.y)] += 1;
        }
    }
    cover
}

#[test]
fn test_40x30_leaves_within_5_to_10() {
    let bounds = SizeBounds::new(5, 10);
    for seed in 0..20 {
        let mut rng = GameRng::new(seed);
        let tree = BspTree::build(Rect::new(0, 0, 39, 29), bounds, true, &mut rng);
        for id in tree.leaves() {
            let area = tree.node(id).area;
            assert!((5..=10).contains(&area.width()), "seed {seed}: {area:?}");
            assert!((5..=10).contains(&area.height()), "seed {seed}: {area:?}");
        }
    }
}

#[test]
fn test_outer_sides_match_root() {
    let root = Rect::new(3, 4, 52, 37);
    let mut rng = GameRng::new(77);
    let tree = BspTree::build(root, SizeBounds::new(5, 10), true, &mut rng);
    for id in tree.leaves() {
        let node = tree.node(id);
        assert_eq!(node.is_outer(), !node.sides.is_empty());
        assert_eq!(node.sides, node.area.shared_sides(&root));
    }
}

proptest! {
    #[test]
    fn leaves_and_gaps_partition_the_area(
        w in 1i32..70,
        h in 1i32..70,
        min in 1i32..9,
        max in 1i32..25,
        seed in any::<u64>(),
    ) {
        let area = Rect::new(0, 0, w - 1, h - 1);
        let mut rng = GameRng::new(seed);
        let tree = BspTree::build(area, SizeBounds::new(min, max), true, &mut rng);
        prop_assert!(coverage(&tree, area).iter().all(|&c| c == 1));
        prop_assert_eq!(tree.leaves().len(), tree.internal_nodes().len() + 1);
    }

    #[test]
    fn leaves_respect_feasible_bounds(
        w in 20i32..80,
        h in 20i32..80,
        min in 2i32..6,
        extra in 1i32..9,
        seed in any::<u64>(),
    ) {
        let bounds = SizeBounds::new(min, 2 * min + extra);
        let mut rng = GameRng::new(seed);
        let tree = BspTree::build(Rect::new(0, 0, w - 1, h - 1), bounds, false, &mut rng);
        for id in tree.leaves() {
            let area = tree.node(id).area;
            prop_assert!(bounds.holds(&area), "{:?} outside {:?}", area, bounds);
        }
    }

    #[test]
    fn same_seed_same_tree(seed in any::<u64>()) {
        let area = Rect::new(0, 0, 63, 47);
        let bounds = SizeBounds::new(5, 12);
        let a = BspTree::build(area, bounds, true, &mut GameRng::new(seed));
        let b = BspTree::build(area, bounds, true, &mut GameRng::new(seed));
        prop_assert_eq!(a, b);
    }
}
