use log::{debug, info};

use crate::{
    ecs::{Outcome, PuzzleWorld},
    error::Result,
    map::{Direction, Level},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Step(Direction),
    Wait,
    Undo,
    Restart,
}

/// A level being played, with undo history.
pub struct PuzzleSession {
    initial: Level,
    world: PuzzleWorld,
    /// Board snapshots paired with the turn they were taken on.
    history: Vec<(Level, u64)>,
}

impl PuzzleSession {
    pub fn new(level: Level) -> Result<Self> {
        let world = PuzzleWorld::from_level(&level)?;
        info!("started level {:?}", level.name);
        Ok(Self {
            initial: level,
            world,
            history: Vec::new(),
        })
    }

    pub fn world(&self) -> &PuzzleWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PuzzleWorld {
        &mut self.world
    }

    pub fn outcome(&self) -> Outcome {
        self.world.outcome()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Step(direction) => self.advance(Some(direction)),
            Command::Wait => self.advance(None),
            Command::Undo => {
                if let Some((previous, turn)) = self.history.pop() {
                    self.world = PuzzleWorld::restore(&previous)?;
                    self.world.set_turn(turn);
                    debug!("undo to turn {}", self.world.turn());
                }
                Ok(self.world.outcome())
            }
            Command::Restart => {
                self.remember();
                self.world = PuzzleWorld::from_level(&self.initial)?;
                info!("restarted level {:?}", self.initial.name);
                Ok(self.world.outcome())
            }
        }
    }

    fn advance(&mut self, direction: Option<Direction>) -> Result<Outcome> {
        if self.world.outcome() == Outcome::Won {
            return Ok(Outcome::Won);
        }
        self.remember();
        Ok(self.world.step(direction))
    }

    fn remember(&mut self) {
        self.history.push((self.world.snapshot(), self.world.turn()));
    }

    pub fn run_script<I: IntoIterator<Item = Command>>(&mut self, commands: I) -> Result<Outcome> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(self.world.outcome())
    }
}
