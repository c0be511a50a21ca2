pub mod worldgen;

use std::ops::{Add, Range, Sub};

pub use worldgen::{FieldConfig, Generation, Progress, Spread, Stage};

/// Default pickup radius around the cursor, in world units.
pub const COLLECTION_RANGE: f32 = 7.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Metal,
    Wood,
    Water,
    Energy,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Metal,
        ResourceType::Wood,
        ResourceType::Water,
        ResourceType::Energy,
    ];

    pub const fn index(self) -> usize {
        match self {
            ResourceType::Metal => 0,
            ResourceType::Wood => 1,
            ResourceType::Water => 2,
            ResourceType::Energy => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceType::Metal => "Metal",
            ResourceType::Wood => "Wood",
            ResourceType::Water => "Water",
            ResourceType::Energy => "Energy",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `x` follows the sine and `y` the cosine of `angle`.
    pub fn from_angle(angle: f32, distance: f32) -> Self {
        Self::new(angle.sin() * distance, angle.cos() * distance)
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The rectangle of the world currently on screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(origin: Vec2, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn centered_on(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            Vec2::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            height,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.origin = self.origin + delta;
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.height
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let nearest = Vec2::new(
            center.x.clamp(self.origin.x, self.origin.x + self.width),
            center.y.clamp(self.origin.y, self.origin.y + self.height),
        );
        nearest.distance_squared(center) <= radius * radius
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResourceNode {
    pub pos: Vec2,
    pub kind: ResourceType,
    pub visible: bool,
}

impl ResourceNode {
    pub const fn new(pos: Vec2, kind: ResourceType) -> Self {
        Self {
            pos,
            kind,
            visible: true,
        }
    }

    pub fn on_screen(&self, view: &Viewport) -> bool {
        self.visible && view.contains(self.pos)
    }
}

/// A cluster of nodes. `nodes` indexes into [`Field::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResourcePatch {
    pub base: Vec2,
    pub kind: ResourceType,
    pub radius: f32,
    pub nodes: Range<usize>,
    pub empty: bool,
}

impl ResourcePatch {
    pub fn on_screen(&self, view: &Viewport) -> bool {
        !self.empty && view.intersects_circle(self.base, self.radius)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Field {
    pub patches: Vec<ResourcePatch>,
    pub nodes: Vec<ResourceNode>,
}

impl Field {
    pub fn visible_patches<'a>(
        &'a self,
        view: &'a Viewport,
    ) -> impl Iterator<Item = &'a ResourcePatch> + 'a {
        self.patches.iter().filter(move |patch| patch.on_screen(view))
    }

    pub fn visible_nodes<'a>(
        &'a self,
        view: &'a Viewport,
    ) -> impl Iterator<Item = &'a ResourceNode> + 'a {
        self.visible_patches(view).flat_map(move |patch| {
            self.nodes[patch.nodes.clone()]
                .iter()
                .filter(move |node| node.on_screen(view))
        })
    }

    /// Hides every visible node within `radius` of `center`.
    pub fn collect(&mut self, view: &Viewport, center: Vec2, radius: f32) -> Harvest {
        let mut harvest = Harvest::default();
        let reach = radius * radius;
        let Self { patches, nodes } = self;
        for patch in patches.iter().filter(|patch| patch.on_screen(view)) {
            for node in &mut nodes[patch.nodes.clone()] {
                if node.on_screen(view) && node.pos.distance_squared(center) <= reach {
                    node.visible = false;
                    harvest.counts[node.kind.index()] += 1;
                }
            }
        }
        harvest
    }

    /// Marks on-screen patches with no visible nodes left as empty, returning
    /// how many were emptied.
    pub fn update_depletion(&mut self, view: &Viewport) -> usize {
        let Self { patches, nodes } = self;
        let mut emptied = 0;
        for patch in patches.iter_mut().filter(|patch| patch.on_screen(view)) {
            if !nodes[patch.nodes.clone()].iter().any(|node| node.visible) {
                patch.empty = true;
                emptied += 1;
            }
        }
        emptied
    }

    pub fn remaining(&self) -> usize {
        self.nodes.iter().filter(|node| node.visible).count()
    }
}

/// Node counts from one collection, indexed by [`ResourceType::index`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Harvest {
    pub counts: [u32; 4],
}

impl Harvest {
    pub fn get(&self, kind: ResourceType) -> u32 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stockpile {
    totals: [u64; 4],
}

impl Stockpile {
    pub fn add(&mut self, harvest: &Harvest) {
        for (total, count) in self.totals.iter_mut().zip(harvest.counts) {
            *total += u64::from(count);
        }
    }

    pub fn get(&self, kind: ResourceType) -> u64 {
        self.totals[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(base: Vec2, kind: ResourceType, nodes: Range<usize>) -> ResourcePatch {
        ResourcePatch {
            base,
            kind,
            radius: 5.0,
            nodes,
            empty: false,
        }
    }

    fn field() -> Field {
        Field {
            patches: vec![
                patch(Vec2::new(10.0, 10.0), ResourceType::Metal, 0..3),
                patch(Vec2::new(500.0, 500.0), ResourceType::Water, 3..4),
            ],
            nodes: vec![
                ResourceNode::new(Vec2::new(10.0, 10.0), ResourceType::Metal),
                ResourceNode::new(Vec2::new(12.0, 10.0), ResourceType::Metal),
                ResourceNode::new(Vec2::new(14.0, 14.0), ResourceType::Metal),
                ResourceNode::new(Vec2::new(500.0, 500.0), ResourceType::Water),
            ],
        }
    }

    fn view() -> Viewport {
        Viewport::new(Vec2::ZERO, 100.0, 100.0)
    }

    #[test]
    fn only_patches_touching_the_view_are_visible() {
        let field = field();
        let view = view();
        assert_eq!(field.visible_patches(&view).count(), 1);
        assert_eq!(field.visible_nodes(&view).count(), 3);
    }

    #[test]
    fn patch_circle_overlapping_an_edge_counts() {
        let view = Viewport::new(Vec2::new(13.0, 0.0), 50.0, 50.0);
        let field = field();
        assert_eq!(field.visible_patches(&view).count(), 1);
        assert_eq!(field.visible_nodes(&view).count(), 1);
    }

    #[test]
    fn collecting_hides_nodes_in_range() {
        let mut field = field();
        let view = view();
        let harvest = field.collect(&view, Vec2::new(11.0, 10.0), 2.0);
        assert_eq!(harvest.get(ResourceType::Metal), 2);
        assert_eq!(harvest.total(), 2);
        assert_eq!(field.visible_nodes(&view).count(), 1);
        assert!(field.collect(&view, Vec2::new(11.0, 10.0), 2.0).is_empty());
    }

    #[test]
    fn off_screen_nodes_are_not_collected() {
        let mut field = field();
        let harvest = field.collect(&view(), Vec2::new(500.0, 500.0), 10.0);
        assert!(harvest.is_empty());
        assert_eq!(field.remaining(), 4);
    }

    #[test]
    fn depleted_patches_become_empty() {
        let mut field = field();
        let view = view();
        assert_eq!(field.update_depletion(&view), 0);
        field.collect(&view, Vec2::new(12.0, 12.0), COLLECTION_RANGE);
        assert_eq!(field.update_depletion(&view), 1);
        assert!(field.patches[0].empty);
        assert!(!field.patches[1].empty);
        assert_eq!(field.visible_patches(&view).count(), 0);
    }

    #[test]
    fn stockpile_accumulates() {
        let mut stockpile = Stockpile::default();
        let mut harvest = Harvest::default();
        harvest.counts[ResourceType::Wood.index()] = 3;
        stockpile.add(&harvest);
        stockpile.add(&harvest);
        assert_eq!(stockpile.get(ResourceType::Wood), 6);
        assert_eq!(stockpile.get(ResourceType::Energy), 0);
    }

    #[test]
    fn angles_follow_sine_then_cosine() {
        let offset = Vec2::from_angle(0.0, 3.0);
        assert!(offset.x.abs() < 1e-6);
        assert!((offset.y - 3.0).abs() < 1e-6);
    }
}
