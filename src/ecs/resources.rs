use bracket_geometry::prelude::Point;

use crate::map::Direction;

#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

/// Player input for the step being dispatched. `None` waits in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepInput {
    pub direction: Option<Direction>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StepOutcome {
    pub won: bool,
}

#[derive(Default)]
pub struct StepLog {
    pub entries: Vec<String>,
}

impl StepLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}
