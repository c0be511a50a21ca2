pub mod board;
pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use log::debug;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    error::Result,
    map::{Direction, Level, Placement, Thing},
    rules::{Rule, RuleBook},
    words::Property,
};

use self::{
    components::{Destroyed, Facing, Identity, Moved, Position},
    resources::{Bounds, StepInput, StepLog, StepOutcome},
    systems::{
        AftermathSystem, ConversionSystem, InteractionSystem, MovementSystem, RuleScanSystem,
    },
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    /// Nothing is YOU any more. Undo or restart still work.
    Lost,
}

pub fn label(thing: &Thing) -> String {
    match thing {
        Thing::Object(noun) => noun.as_str().to_string(),
        Thing::Text(word) => format!("\"{word}\" text"),
    }
}

pub struct PuzzleWorld {
    specs_world: SpecsWorld,
    settle: Dispatcher<'static, 'static>,
    step: Dispatcher<'static, 'static>,
    refresh: Dispatcher<'static, 'static>,
    name: String,
    outcome: Outcome,
    turn: u64,
}

impl PuzzleWorld {
    /// Spawns the level and applies its opening conversions.
    pub fn from_level(level: &Level) -> Result<Self> {
        let mut world = Self::spawn(level)?;
        world.settle.dispatch(&world.specs_world);
        world.specs_world.maintain();
        world.outcome = world.evaluate();
        Ok(world)
    }

    /// Spawns a snapshot exactly as saved; conversions wait for the next step.
    pub fn restore(level: &Level) -> Result<Self> {
        let mut world = Self::spawn(level)?;
        world.refresh.dispatch(&world.specs_world);
        world.specs_world.maintain();
        world.outcome = world.evaluate();
        Ok(world)
    }

    fn spawn(level: &Level) -> Result<Self> {
        level.validate()?;

        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(Bounds {
            width: level.width,
            height: level.height,
        });
        specs_world.insert(StepInput::default());
        specs_world.insert(StepOutcome::default());
        specs_world.insert(StepLog::default());
        specs_world.insert(RuleBook::default());

        for placement in &level.things {
            Self::spawn_placement(&mut specs_world, placement);
        }

        let settle = DispatcherBuilder::new()
            .with(RuleScanSystem::default(), "scan", &[])
            .with(ConversionSystem::default(), "convert", &["scan"])
            .with(RuleScanSystem::default(), "rescan", &["convert"])
            .build();
        let step = DispatcherBuilder::new()
            .with(MovementSystem::default(), "movement", &[])
            .with(RuleScanSystem::default(), "scan", &["movement"])
            .with(ConversionSystem::default(), "convert", &["scan"])
            .with(InteractionSystem::default(), "interaction", &["convert"])
            .with(AftermathSystem::default(), "aftermath", &["interaction"])
            .build();
        let refresh = DispatcherBuilder::new()
            .with(RuleScanSystem::default(), "scan", &[])
            .build();

        Ok(Self {
            specs_world,
            settle,
            step,
            refresh,
            name: level.name.clone(),
            outcome: Outcome::Playing,
            turn: 0,
        })
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Identity>();
        world.register::<Facing>();
        world.register::<Moved>();
        world.register::<Destroyed>();
    }

    fn spawn_placement(world: &mut SpecsWorld, placement: &Placement) {
        world
            .create_entity()
            .with(Position {
                point: placement.point(),
            })
            .with(Identity(placement.thing))
            .with(Facing(placement.facing))
            .build();
    }

    /// Advances one turn. `None` waits, which still lets MOVE objects act.
    pub fn step(&mut self, direction: Option<Direction>) -> Outcome {
        self.specs_world.insert(StepInput { direction });
        self.step.dispatch(&self.specs_world);
        self.specs_world.maintain();
        self.refresh.dispatch(&self.specs_world);
        self.specs_world.maintain();
        self.turn = self.turn.wrapping_add(1);
        self.outcome = self.evaluate();
        debug!(
            "turn {} of {:?}: {:?} with {} rules",
            self.turn,
            self.name,
            self.outcome,
            self.rules().len()
        );
        self.outcome
    }

    fn evaluate(&self) -> Outcome {
        if self.specs_world.read_resource::<StepOutcome>().won {
            return Outcome::Won;
        }
        let book = self.specs_world.read_resource::<RuleBook>();
        let identities = self.specs_world.read_component::<Identity>();
        let destroyed = self.specs_world.read_component::<Destroyed>();
        let anyone_is_you = (&identities, !&destroyed)
            .join()
            .any(|(identity, _)| book.has_property(identity.0.noun(), Property::You));
        if anyone_is_you {
            Outcome::Playing
        } else {
            Outcome::Lost
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub(crate) fn set_turn(&mut self, turn: u64) {
        self.turn = turn;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Bounds {
        *self.specs_world.read_resource::<Bounds>()
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.specs_world.read_resource::<RuleBook>().rules().to_vec()
    }

    pub fn rule_book(&self) -> RuleBook {
        (*self.specs_world.read_resource::<RuleBook>()).clone()
    }

    /// Everything on the board, in reading order.
    pub fn things(&self) -> Vec<(Point, Thing, Direction)> {
        let positions = self.specs_world.read_component::<Position>();
        let identities = self.specs_world.read_component::<Identity>();
        let facings = self.specs_world.read_component::<Facing>();
        let mut things: Vec<(Point, Thing, Direction)> = (&positions, &identities, &facings)
            .join()
            .map(|(pos, identity, facing)| (pos.point, identity.0, facing.0))
            .collect();
        things.sort_by_key(|(point, _, _)| (point.y, point.x));
        things
    }

    pub fn things_at(&self, point: Point) -> Vec<Thing> {
        self.things()
            .into_iter()
            .filter(|(at, _, _)| *at == point)
            .map(|(_, thing, _)| thing)
            .collect()
    }

    pub fn snapshot(&self) -> Level {
        let bounds = self.bounds();
        let positions = self.specs_world.read_component::<Position>();
        let identities = self.specs_world.read_component::<Identity>();
        let facings = self.specs_world.read_component::<Facing>();
        let things = (&positions, &identities, &facings)
            .join()
            .map(|(pos, identity, facing)| Placement {
                x: pos.point.x,
                y: pos.point.y,
                thing: identity.0,
                facing: facing.0,
            })
            .collect();
        Level {
            name: self.name.clone(),
            width: bounds.width,
            height: bounds.height,
            things,
        }
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        let mut log = self.specs_world.write_resource::<StepLog>();
        std::mem::take(&mut log.entries)
    }
}
