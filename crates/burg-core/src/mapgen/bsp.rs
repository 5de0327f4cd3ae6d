//! Binary space partitioning
//!
//! Splits a rectangle recursively until every leaf fits the size bounds.
//! Children of a split are separated by a gap (a wall line for rooms, a
//! street for districts) whose width is chosen by a [`SplitPolicy`].
//!
//! Nodes live in an arena and refer to each other by [`NodeId`].

use serde::{Deserialize, Serialize};

use crate::map::{Axis, Point, Rect, Side};
use crate::rng::RandomSource;

/// Index of a node in its [`BspTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Whether a node touches the boundary of the root rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Inner,
    Outer,
}

/// Leaf size bounds, applied to both dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: i32,
    pub max: i32,
}

impl SizeBounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn fits(&self, area: &Rect) -> bool {
        area.width() <= self.max && area.height() <= self.max
    }

    pub fn holds(&self, area: &Rect) -> bool {
        let ok = |n: i32| n >= self.min && n <= self.max;
        ok(area.width()) && ok(area.height())
    }
}

/// How a node was split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Orientation of the gap line between the children
    pub axis: Axis,
    /// Cells between the two children; invalid when the gap width is 0
    pub gap: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BspNode {
    pub area: Rect,
    pub depth: u32,
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    pub children: Option<[NodeId; 2]>,
    pub split: Option<Split>,
    /// Sides lying on the root rectangle's boundary
    pub sides: Vec<Side>,
}

impl BspNode {
    fn new(area: Rect, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            area,
            depth,
            node_type: NodeType::Inner,
            parent,
            children: None,
            split: None,
            sides: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_outer(&self) -> bool {
        self.node_type == NodeType::Outer
    }
}

/// Reported to [`SplitPolicy::on_split`] once per split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitEvent {
    pub area: Rect,
    pub depth: u32,
    pub axis: Axis,
    pub gap: Rect,
    pub first: Rect,
    pub second: Rect,
}

/// Caller hooks into the partitioning
pub trait SplitPolicy {
    /// Width of the gap inserted when splitting a node at `depth`
    fn split_width<R: RandomSource>(&mut self, _depth: u32, _rng: &mut R) -> i32 {
        1
    }

    /// Called after each split with the two new rectangles
    fn on_split(&mut self, _event: &SplitEvent) {}
}

/// One-cell gaps, no callbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSplit;

impl SplitPolicy for DefaultSplit {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    bounds: SizeBounds,
}

impl BspTree {
    /// Partition `area` with one-cell gaps
    pub fn build<R: RandomSource>(area: Rect, bounds: SizeBounds, classify: bool, rng: &mut R) -> Self {
        Self::build_with(area, bounds, classify, &mut DefaultSplit, rng)
    }

    /// Partition `area`, asking `policy` for gap widths and reporting splits.
    ///
    /// Infeasible bounds are not an error: with `min > max`, or for a node
    /// narrower than `min` on either axis, the node stays a leaf even if it
    /// is larger than `bounds.max`.
    pub fn build_with<P, R>(area: Rect, bounds: SizeBounds, classify: bool, policy: &mut P, rng: &mut R) -> Self
    where
        P: SplitPolicy,
        R: RandomSource,
    {
        let mut tree = Self {
            nodes: vec![BspNode::new(area, 0, None)],
            bounds,
        };
        tree.split_node(NodeId(0), policy, rng);
        if classify {
            tree.classify();
        }
        tree
    }

    fn split_node<P: SplitPolicy, R: RandomSource>(&mut self, id: NodeId, policy: &mut P, rng: &mut R) {
        let area = self.nodes[id.0].area;
        let depth = self.nodes[id.0].depth;
        if !area.is_valid() || self.bounds.fits(&area) {
            return;
        }
        // infeasible bounds or an area already below min: leave it whole
        let SizeBounds { min, max } = self.bounds;
        if min > max || area.width() < min || area.height() < min {
            return;
        }

        let gap = policy.split_width(depth, rng).max(0);
        let min = self.bounds.min.max(1);
        let splittable = |len: i32| len > self.bounds.max && len >= 2 * min + gap;
        let (w, h) = (area.width(), area.height());

        let axis = match (splittable(w), splittable(h)) {
            (true, true) => {
                if (w - h).abs() <= w.min(h) / 4 {
                    if rng.one_in(2) { Axis::Vertical } else { Axis::Horizontal }
                } else if w > h {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                }
            }
            (true, false) => Axis::Vertical,
            (false, true) => Axis::Horizontal,
            (false, false) => return,
        };

        // A vertical gap line cuts the width, a horizontal one the height
        let len = match axis {
            Axis::Vertical => w,
            Axis::Horizontal => h,
        };
        let offset = self.pick_offset(len, gap, min, rng);
        let (first, gap_rect, second) = match axis {
            Axis::Vertical => {
                let x = area.left + offset;
                (
                    Rect::new(area.left, area.top, x - 1, area.bottom),
                    Rect::new(x, area.top, x + gap - 1, area.bottom),
                    Rect::new(x + gap, area.top, area.right, area.bottom),
                )
            }
            Axis::Horizontal => {
                let y = area.top + offset;
                (
                    Rect::new(area.left, area.top, area.right, y - 1),
                    Rect::new(area.left, y, area.right, y + gap - 1),
                    Rect::new(area.left, y + gap, area.right, area.bottom),
                )
            }
        };

        let a = NodeId(self.nodes.len());
        let b = NodeId(self.nodes.len() + 1);
        self.nodes.push(BspNode::new(first, depth + 1, Some(id)));
        self.nodes.push(BspNode::new(second, depth + 1, Some(id)));
        let node = &mut self.nodes[id.0];
        node.children = Some([a, b]);
        node.split = Some(Split { axis, gap: gap_rect });

        policy.on_split(&SplitEvent {
            area,
            depth,
            axis,
            gap: gap_rect,
            first,
            second,
        });

        self.split_node(a, policy, rng);
        self.split_node(b, policy, rng);
    }

    /// Length of the first child. Prefers offsets after which both children
    /// can still end up as leaves within bounds.
    fn pick_offset<R: RandomSource>(&self, len: i32, gap: i32, min: i32, rng: &mut R) -> i32 {
        let lo = min;
        let hi = len - gap - min;
        let max = self.bounds.max.max(min);
        let ok = |n: i32| decomposable(n, min, max, gap);
        let good: Vec<i32> = (lo..=hi).filter(|&a| ok(a) && ok(len - gap - a)).collect();
        match rng.choose(&good) {
            Some(&a) => a,
            None => rng.range(lo, hi),
        }
    }

    fn classify(&mut self) {
        let root = self.nodes[0].area;
        for node in &mut self.nodes {
            node.sides = node.area.shared_sides(&root);
            node.node_type = if node.sides.is_empty() {
                NodeType::Inner
            } else {
                NodeType::Outer
            };
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> SizeBounds {
        self.bounds
    }

    /// Leaves in depth-first order, first child before second
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.nodes[id.0].children {
                Some([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
                None => out.push(id),
            }
        }
        out
    }

    /// Nodes with children, parents before their descendants
    pub fn internal_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if let Some([a, b]) = self.nodes[id.0].children {
                out.push(id);
                stack.push(b);
                stack.push(a);
            }
        }
        out
    }

    /// Leaves below `id` (itself when it is a leaf)
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.nodes[id.0].children {
                Some([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
                None => out.push(id),
            }
        }
        out
    }

    /// Parent chain of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.nodes[p.0].parent;
        }
        out
    }

    /// Leaf containing `p`, `None` for gap cells and outside points
    pub fn leaf_at(&self, p: Point) -> Option<NodeId> {
        let mut id = self.root();
        if !self.nodes[0].area.contains(p) {
            return None;
        }
        loop {
            match self.nodes[id.0].children {
                Some([a, b]) => {
                    if self.nodes[a.0].area.contains(p) {
                        id = a;
                    } else if self.nodes[b.0].area.contains(p) {
                        id = b;
                    } else {
                        return None;
                    }
                }
                None => return Some(id),
            }
        }
    }

    /// Gap rectangles of every split
    pub fn gaps(&self) -> Vec<Rect> {
        self.nodes
            .iter()
            .filter_map(|n| n.split.map(|s| s.gap))
            .filter(Rect::is_valid)
            .collect()
    }
}

/// `n` cells can be cut into parts of `min..=max` cells separated by
/// `gap` wide gaps. `k` parts take between `k*(min+gap)-gap` and
/// `k*(max+gap)-gap` cells; the fewest parts that can reach `n` is the
/// only count worth checking.
fn decomposable(n: i32, min: i32, max: i32, gap: i32) -> bool {
    let (lo, hi) = (min + gap, max + gap);
    if n < min || hi <= 0 {
        return false;
    }
    let parts = (n + gap + hi - 1) / hi;
    parts * lo - gap <= n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    #[test]
    fn test_small_area_is_single_leaf() {
        let mut rng = GameRng::new(1);
        let tree = BspTree::build(Rect::new(0, 0, 7, 7), SizeBounds::new(5, 10), true, &mut rng);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaves(), vec![NodeId(0)]);
        assert_eq!(tree.node(NodeId(0)).sides.len(), 4);
    }

    #[test]
    fn test_degenerate_bounds_terminate() {
        let mut rng = GameRng::new(2);
        // min > max and an area too small to split
        let tree = BspTree::build(Rect::new(0, 0, 30, 3), SizeBounds::new(8, 4), true, &mut rng);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaves(), vec![NodeId(0)]);
        let tree = BspTree::build(Rect::new(0, 0, 2, 2), SizeBounds::new(5, 10), false, &mut rng);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_thinner_than_min_stays_whole() {
        let mut rng = GameRng::new(4);
        // long enough to split on x, but only 3 high with min 5
        let tree = BspTree::build(Rect::new(0, 0, 29, 2), SizeBounds::new(5, 10), true, &mut rng);
        assert_eq!(tree.len(), 1);
        assert!(tree.gaps().is_empty());
        let tree = BspTree::build(Rect::new(0, 0, 3, 40), SizeBounds::new(5, 10), true, &mut rng);
        assert_eq!(tree.leaves().len(), 1);
    }

    #[test]
    fn test_leaves_within_bounds() {
        let mut rng = GameRng::new(42);
        let bounds = SizeBounds::new(5, 10);
        let tree = BspTree::build(Rect::new(0, 0, 39, 29), bounds, true, &mut rng);
        for id in tree.leaves() {
            let area = tree.node(id).area;
            assert!(bounds.holds(&area), "leaf {area:?} out of bounds");
        }
    }

    #[test]
    fn test_inner_and_outer_classification() {
        let mut rng = GameRng::new(9);
        let root = Rect::new(0, 0, 39, 39);
        let tree = BspTree::build(root, SizeBounds::new(5, 10), true, &mut rng);
        let mut inner = 0;
        for id in tree.leaves() {
            let node = tree.node(id);
            for side in &node.sides {
                assert_eq!(node.area.edge(*side), root.edge(*side));
            }
            if node.node_type == NodeType::Inner {
                inner += 1;
                assert!(node.sides.is_empty());
            }
        }
        // a 40x40 area split into leaves of at most 10 must have a middle
        assert!(inner > 0);
    }

    #[test]
    fn test_decomposable_lengths() {
        // parts of 5 or 6 with one-cell gaps: 5..=6, 11..=13, 17..=20, ...
        let ok: Vec<i32> = (1..=21).filter(|&n| decomposable(n, 5, 6, 1)).collect();
        assert_eq!(ok, vec![5, 6, 11, 12, 13, 17, 18, 19, 20]);
        assert!(!decomposable(14, 5, 6, 1));
        assert!(decomposable(14, 5, 10, 1));
    }

    #[test]
    fn test_narrow_bounds_leaves() {
        let bounds = SizeBounds::new(5, 6);
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            let tree = BspTree::build(Rect::new(0, 0, 19, 5), bounds, false, &mut rng);
            for id in tree.leaves() {
                let area = tree.node(id).area;
                assert!(bounds.holds(&area), "seed {seed}: {area:?}");
            }
        }
    }

    struct Recorder {
        events: Vec<SplitEvent>,
    }

    impl SplitPolicy for Recorder {
        fn split_width<R: RandomSource>(&mut self, depth: u32, _rng: &mut R) -> i32 {
            if depth == 0 { 3 } else { 1 }
        }

        fn on_split(&mut self, event: &SplitEvent) {
            self.events.push(*event);
        }
    }

    #[test]
    fn test_policy_receives_every_split() {
        let mut rng = GameRng::new(5);
        let mut rec = Recorder { events: Vec::new() };
        let tree = BspTree::build_with(
            Rect::new(0, 0, 49, 19),
            SizeBounds::new(4, 12),
            false,
            &mut rec,
            &mut rng,
        );
        assert_eq!(rec.events.len(), tree.internal_nodes().len());
        let first = rec.events[0];
        assert_eq!(first.depth, 0);
        assert_eq!(first.gap.len(first.axis.flip()), 3);
        assert_eq!(tree.leaves().len(), tree.internal_nodes().len() + 1);
    }

    #[test]
    fn test_leaf_at_and_ancestors() {
        let mut rng = GameRng::new(11);
        let tree = BspTree::build(Rect::new(0, 0, 29, 29), SizeBounds::new(5, 10), true, &mut rng);
        for id in tree.leaves() {
            let c = tree.node(id).area.center();
            assert_eq!(tree.leaf_at(c), Some(id));
            assert_eq!(tree.ancestors(id).last(), Some(&tree.root()));
        }
        for gap in tree.gaps() {
            assert_eq!(tree.leaf_at(gap.center()), None);
        }
    }

    #[test]
    fn test_serializes() {
        let mut rng = GameRng::new(3);
        let tree = BspTree::build(Rect::new(0, 0, 25, 15), SizeBounds::new(5, 10), true, &mut rng);
        let json = serde_json::to_string(&tree).unwrap();
        let back: BspTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
