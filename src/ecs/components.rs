use bracket_geometry::prelude::Point;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::map::{Direction, Thing};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// What an entity currently is. Conversion rules rewrite this in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity(pub Thing);

impl Component for Identity {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Facing(pub Direction);

impl Component for Facing {
    type Storage = VecStorage<Self>;
}

/// Displaced during the current step.
#[derive(Default)]
pub struct Moved;

impl Component for Moved {
    type Storage = NullStorage<Self>;
}

/// Marked for removal at the end of the step.
#[derive(Default)]
pub struct Destroyed;

impl Component for Destroyed {
    type Storage = NullStorage<Self>;
}
