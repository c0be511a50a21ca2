use std::collections::{HashMap, HashSet};

use bracket_geometry::prelude::Point;
use smallvec::SmallVec;
use specs::prelude::Entity;

use crate::{map::Direction, rules::PropertySet, words::Property};

use super::resources::Bounds;

pub type Occupants = SmallVec<[Entity; 4]>;

/// A per-system snapshot of who stands where, used to resolve pushes, pulls
/// and per-cell interactions without holding storage borrows.
#[derive(Clone, Debug)]
pub struct Board {
    bounds: Bounds,
    cells: HashMap<Point, Occupants>,
    positions: HashMap<Entity, Point>,
    properties: HashMap<Entity, PropertySet>,
    moved: Vec<Entity>,
}

impl Board {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            cells: HashMap::new(),
            positions: HashMap::new(),
            properties: HashMap::new(),
            moved: Vec::new(),
        }
    }

    pub fn insert(&mut self, entity: Entity, point: Point, properties: PropertySet) {
        self.cells.entry(point).or_default().push(entity);
        self.positions.insert(entity, point);
        self.properties.insert(entity, properties);
    }

    pub fn position(&self, entity: Entity) -> Option<Point> {
        self.positions.get(&entity).copied()
    }

    pub fn properties(&self, entity: Entity) -> PropertySet {
        self.properties.get(&entity).copied().unwrap_or_default()
    }

    pub fn occupants(&self, point: Point) -> &[Entity] {
        self.cells.get(&point).map(|cell| cell.as_slice()).unwrap_or(&[])
    }

    /// Non-empty cells, top-to-bottom then left-to-right.
    pub fn cells(&self) -> Vec<(Point, Occupants)> {
        let mut cells: Vec<(Point, Occupants)> = self
            .cells
            .iter()
            .filter(|(_, occupants)| !occupants.is_empty())
            .map(|(point, occupants)| (*point, occupants.clone()))
            .collect();
        cells.sort_by_key(|(point, _)| (point.y, point.x));
        cells
    }

    pub fn relocate(&mut self, entity: Entity, to: Point) {
        let Some(from) = self.positions.get(&entity).copied() else {
            return;
        };
        if let Some(cell) = self.cells.get_mut(&from) {
            cell.retain(|other| *other != entity);
        }
        self.cells.entry(to).or_default().push(entity);
        self.positions.insert(entity, to);
        if !self.moved.contains(&entity) {
            self.moved.push(entity);
        }
    }

    /// Entities displaced so far, with where they ended up.
    pub fn moved_positions(&self) -> Vec<(Entity, Point)> {
        self.moved
            .iter()
            .filter_map(|entity| self.position(*entity).map(|point| (*entity, point)))
            .collect()
    }

    /// Moves `entity` one cell, pushing and pulling neighbours. Nothing moves
    /// when the move is blocked.
    pub fn advance(&mut self, entity: Entity, direction: Direction) -> bool {
        if !self.can_move(entity, direction, &mut HashSet::new()) {
            return false;
        }
        self.shift(entity, direction, &mut HashSet::new());
        true
    }

    fn can_move(&self, entity: Entity, direction: Direction, visiting: &mut HashSet<Entity>) -> bool {
        if !visiting.insert(entity) {
            return true;
        }
        let Some(from) = self.position(entity) else {
            return false;
        };
        let to = direction.step_from(from);
        if !self.bounds.in_bounds(to) {
            return false;
        }
        for &other in self.occupants(to) {
            let properties = self.properties(other);
            if properties.contains(Property::Push) {
                if !self.can_move(other, direction, visiting) {
                    return false;
                }
            } else if properties.contains(Property::Stop) {
                return false;
            }
        }
        true
    }

    fn shift(&mut self, entity: Entity, direction: Direction, moved_now: &mut HashSet<Entity>) {
        if !moved_now.insert(entity) {
            return;
        }
        let Some(from) = self.position(entity) else {
            return;
        };
        let to = direction.step_from(from);
        if !self.bounds.in_bounds(to) {
            return;
        }

        let pushed: Occupants = self
            .occupants(to)
            .iter()
            .copied()
            .filter(|other| self.properties(*other).contains(Property::Push))
            .collect();
        for other in pushed {
            self.shift(other, direction, moved_now);
        }
        self.relocate(entity, to);

        let behind = direction.reverse().step_from(from);
        let pulled: Occupants = self
            .occupants(behind)
            .iter()
            .copied()
            .filter(|other| {
                !moved_now.contains(other) && self.properties(*other).contains(Property::Pull)
            })
            .collect();
        for other in pulled {
            if self.can_move(other, direction, &mut HashSet::new()) {
                self.shift(other, direction, moved_now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use specs::prelude::{Builder, World, WorldExt};

    use super::*;

    fn props(list: &[Property]) -> PropertySet {
        list.iter().copied().collect()
    }

    fn board_with(width: i32, height: i32, count: usize) -> (Board, Vec<Entity>) {
        let mut world = World::new();
        let entities = (0..count).map(|_| world.create_entity().build()).collect();
        (Board::new(Bounds { width, height }), entities)
    }

    #[test]
    fn walks_into_empty_cells() {
        let (mut board, e) = board_with(3, 1, 1);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        assert!(board.advance(e[0], Direction::Right));
        assert_eq!(board.position(e[0]), Some(Point::new(1, 0)));
        assert_eq!(board.moved_positions(), vec![(e[0], Point::new(1, 0))]);
    }

    #[test]
    fn edges_block() {
        let (mut board, e) = board_with(3, 1, 1);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        assert!(!board.advance(e[0], Direction::Left));
        assert!(board.moved_positions().is_empty());
    }

    #[test]
    fn pushes_a_chain() {
        let (mut board, e) = board_with(5, 1, 3);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        board.insert(e[1], Point::new(1, 0), props(&[Property::Push]));
        board.insert(e[2], Point::new(2, 0), props(&[Property::Push]));
        assert!(board.advance(e[0], Direction::Right));
        assert_eq!(board.position(e[1]), Some(Point::new(2, 0)));
        assert_eq!(board.position(e[2]), Some(Point::new(3, 0)));
    }

    #[test]
    fn chain_against_stop_moves_nothing() {
        let (mut board, e) = board_with(5, 1, 3);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        board.insert(e[1], Point::new(1, 0), props(&[Property::Push]));
        board.insert(e[2], Point::new(2, 0), props(&[Property::Stop]));
        assert!(!board.advance(e[0], Direction::Right));
        assert_eq!(board.position(e[0]), Some(Point::new(0, 0)));
        assert_eq!(board.position(e[1]), Some(Point::new(1, 0)));
    }

    #[test]
    fn push_wins_over_stop() {
        let (mut board, e) = board_with(3, 1, 2);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        board.insert(e[1], Point::new(1, 0), props(&[Property::Push, Property::Stop]));
        assert!(board.advance(e[0], Direction::Right));
        assert_eq!(board.position(e[1]), Some(Point::new(2, 0)));
    }

    #[test]
    fn drags_pullable_neighbours() {
        let (mut board, e) = board_with(4, 1, 3);
        board.insert(e[0], Point::new(0, 0), props(&[Property::Pull]));
        board.insert(e[1], Point::new(1, 0), props(&[Property::Pull]));
        board.insert(e[2], Point::new(2, 0), props(&[Property::You]));
        assert!(board.advance(e[2], Direction::Right));
        assert_eq!(board.position(e[2]), Some(Point::new(3, 0)));
        assert_eq!(board.position(e[1]), Some(Point::new(2, 0)));
        assert_eq!(board.position(e[0]), Some(Point::new(1, 0)));
    }

    #[test]
    fn plain_objects_are_walked_over() {
        let (mut board, e) = board_with(3, 1, 2);
        board.insert(e[0], Point::new(0, 0), props(&[Property::You]));
        board.insert(e[1], Point::new(1, 0), PropertySet::empty());
        assert!(board.advance(e[0], Direction::Right));
        assert_eq!(board.occupants(Point::new(1, 0)), &[e[1], e[0]]);
    }

    #[test]
    fn cells_are_listed_in_reading_order() {
        let (mut board, e) = board_with(3, 3, 3);
        board.insert(e[0], Point::new(2, 2), PropertySet::empty());
        board.insert(e[1], Point::new(1, 0), PropertySet::empty());
        board.insert(e[2], Point::new(0, 2), PropertySet::empty());
        let order: Vec<Point> = board.cells().into_iter().map(|(point, _)| point).collect();
        assert_eq!(order, vec![Point::new(1, 0), Point::new(0, 2), Point::new(2, 2)]);
    }
}
