use std::collections::BTreeMap;

use bracket_geometry::prelude::Point;
use log::{debug, info};
use specs::prelude::*;

use crate::{
    map::{Direction, Thing},
    rules::{RuleBook, TextLayout},
    words::{Noun, Property, Word},
};

use super::{
    board::Board,
    components::{Destroyed, Facing, Identity, Moved, Position},
    label,
    resources::{Bounds, StepInput, StepLog, StepOutcome},
};

/// Rebuilds the rule book from the text that is still on the board.
#[derive(Default)]
pub struct RuleScanSystem;

impl<'a> System<'a> for RuleScanSystem {
    type SystemData = (
        ReadStorage<'a, Position>,
        ReadStorage<'a, Identity>,
        ReadStorage<'a, Destroyed>,
        WriteExpect<'a, RuleBook>,
        WriteExpect<'a, StepLog>,
    );

    fn run(&mut self, (positions, identities, destroyed, mut book, mut log): Self::SystemData) {
        let layout: TextLayout = (&positions, &identities, !&destroyed)
            .join()
            .filter_map(|(pos, identity, _)| identity.0.word().map(|word| (pos.point, word)))
            .collect();
        let next = RuleBook::from_rules(layout.scan());

        for rule in next.rules() {
            if !book.rules().contains(rule) {
                info!("rule formed: {rule}");
                log.push(format!("Formed {rule}"));
            }
        }
        for rule in book.rules() {
            if !next.rules().contains(rule) {
                info!("rule broken: {rule}");
                log.push(format!("Broke {rule}"));
            }
        }
        *book = next;
    }
}

/// Applies "X IS Y" to every X. Targets are read from kinds before the pass,
/// so conversions never chain within one pass.
#[derive(Default)]
pub struct ConversionSystem;

impl<'a> System<'a> for ConversionSystem {
    type SystemData = (
        WriteStorage<'a, Identity>,
        ReadStorage<'a, Destroyed>,
        ReadExpect<'a, RuleBook>,
        WriteExpect<'a, StepLog>,
    );

    fn run(&mut self, (mut identities, destroyed, book, mut log): Self::SystemData) {
        let mut tally: BTreeMap<(Noun, Noun), usize> = BTreeMap::new();
        for (identity, _) in (&mut identities, !&destroyed).join() {
            let noun = identity.0.noun();
            let Some(target) = book.conversion_for(noun) else {
                continue;
            };
            let next = match (identity.0, target) {
                (Thing::Object(own), Noun::Text) => Thing::Text(Word::Noun(own)),
                (Thing::Text(_), Noun::Text) => continue,
                (_, other) => Thing::Object(other),
            };
            identity.0 = next;
            *tally.entry((noun, target)).or_default() += 1;
        }

        for ((from, to), count) in tally {
            debug!("converted {count} {} into {}", from.as_str(), to.as_str());
            log.push(format!("{count} {} became {}", from.as_str(), to.as_str()));
        }
    }
}

/// Moves YOU objects with the input, then MOVE objects along their facing.
#[derive(Default)]
pub struct MovementSystem;

impl<'a> System<'a> for MovementSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        ReadStorage<'a, Identity>,
        WriteStorage<'a, Facing>,
        WriteStorage<'a, Moved>,
        ReadStorage<'a, Destroyed>,
        ReadExpect<'a, RuleBook>,
        ReadExpect<'a, StepInput>,
        ReadExpect<'a, Bounds>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            identities,
            mut facings,
            mut moved,
            destroyed,
            book,
            input,
            bounds,
        ): Self::SystemData,
    ) {
        moved.clear();

        let mut board = Board::new(*bounds);
        let mut players = Vec::new();
        let mut movers = Vec::new();
        for (entity, pos, identity, _) in (&entities, &positions, &identities, !&destroyed).join() {
            let properties = book.properties_of(identity.0.noun());
            board.insert(entity, pos.point, properties);
            if properties.contains(Property::You) {
                players.push(entity);
            }
            if properties.contains(Property::Move) {
                movers.push(entity);
            }
        }

        if let Some(direction) = input.direction {
            for entity in players {
                if let Some(facing) = facings.get_mut(entity) {
                    facing.0 = direction;
                }
                board.advance(entity, direction);
            }
        }

        for entity in movers {
            let heading = facings.get(entity).map(|facing| facing.0).unwrap_or_default();
            if board.advance(entity, heading) {
                continue;
            }
            let back = heading.reverse();
            if let Some(facing) = facings.get_mut(entity) {
                facing.0 = back;
            }
            board.advance(entity, back);
        }

        for (entity, point) in board.moved_positions() {
            if let Some(pos) = positions.get_mut(entity) {
                pos.point = point;
            }
            let _ = moved.insert(entity, Moved);
        }
    }
}

/// Resolves what happens to things that share a cell after movement.
#[derive(Default)]
pub struct InteractionSystem;

impl<'a> System<'a> for InteractionSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        ReadStorage<'a, Identity>,
        ReadStorage<'a, Moved>,
        WriteStorage<'a, Destroyed>,
        ReadExpect<'a, RuleBook>,
        ReadExpect<'a, Bounds>,
        WriteExpect<'a, StepOutcome>,
        WriteExpect<'a, StepLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            identities,
            moved,
            mut destroyed,
            book,
            bounds,
            mut outcome,
            mut log,
        ): Self::SystemData,
    ) {
        outcome.won = false;

        let mut board = Board::new(*bounds);
        let mut travellers = Vec::new();
        for (entity, pos, identity, _) in (&entities, &positions, &identities, !&destroyed).join() {
            board.insert(entity, pos.point, book.properties_of(identity.0.noun()));
            if moved.contains(entity) {
                travellers.push(entity);
            }
        }

        let noun_of = |entity: Entity| identities.get(entity).map(|identity| identity.0.noun());
        let thing_of = |entity: Entity| identities.get(entity).map(|identity| identity.0);

        for entity in travellers {
            if board.properties(entity).contains(Property::Tele) {
                continue;
            }
            let Some(here) = board.position(entity) else {
                continue;
            };
            let pad = board
                .occupants(here)
                .iter()
                .copied()
                .find(|other| *other != entity && board.properties(*other).contains(Property::Tele));
            let Some(pad_noun) = pad.and_then(|pad| noun_of(pad)) else {
                continue;
            };
            let Some(destination) = next_pad(&board, here, pad_noun, &noun_of) else {
                continue;
            };
            board.relocate(entity, destination);
            if let Some(pos) = positions.get_mut(entity) {
                pos.point = destination;
            }
            if let Some(thing) = thing_of(entity) {
                log.push(format!("{} teleported", label(&thing)));
            }
        }

        let mut doomed: Vec<(Entity, &'static str)> = Vec::new();
        for (_, occupants) in board.cells() {
            let any = |property: Property| {
                occupants
                    .iter()
                    .any(|entity| board.properties(*entity).contains(property))
            };

            if any(Property::Sink) && occupants.len() > 1 {
                doomed.extend(occupants.iter().map(|entity| (*entity, "sank")));
                continue;
            }
            for &entity in &occupants {
                let properties = board.properties(entity);
                if properties.contains(Property::You) && any(Property::Defeat) {
                    doomed.push((entity, "was defeated"));
                } else if properties.contains(Property::Melt) && any(Property::Hot) {
                    doomed.push((entity, "melted"));
                }
            }
            let survivor_is_you = occupants.iter().any(|entity| {
                board.properties(*entity).contains(Property::You)
                    && !doomed.iter().any(|(gone, _)| gone == entity)
            });
            if survivor_is_you && any(Property::Win) {
                outcome.won = true;
            }
        }

        for (entity, verb) in doomed {
            if destroyed.contains(entity) {
                continue;
            }
            let _ = destroyed.insert(entity, Destroyed);
            if let Some(thing) = thing_of(entity) {
                log.push(format!("{} {verb}", label(&thing)));
            }
        }

        if outcome.won {
            info!("win condition reached");
            log.push("Victory!");
        }
    }
}

/// The next pad of the same kind in reading order, wrapping around.
fn next_pad(
    board: &Board,
    here: Point,
    noun: Noun,
    noun_of: &impl Fn(Entity) -> Option<Noun>,
) -> Option<Point> {
    let pads: Vec<Point> = board
        .cells()
        .into_iter()
        .filter(|(point, occupants)| {
            *point != here
                && occupants.iter().any(|entity| {
                    board.properties(*entity).contains(Property::Tele)
                        && noun_of(*entity) == Some(noun)
                })
        })
        .map(|(point, _)| point)
        .collect();
    let key = |point: &Point| (point.y, point.x);
    pads.iter()
        .find(|point| key(point) > key(&here))
        .or_else(|| pads.first())
        .copied()
}

/// Spawns HAS results for destroyed things, then deletes them.
#[derive(Default)]
pub struct AftermathSystem;

impl<'a> System<'a> for AftermathSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, Identity>,
        WriteStorage<'a, Facing>,
        ReadStorage<'a, Destroyed>,
        ReadExpect<'a, RuleBook>,
        WriteExpect<'a, StepLog>,
    );

    fn run(
        &mut self,
        (entities, mut positions, mut identities, mut facings, destroyed, book, mut log): Self::SystemData,
    ) {
        let doomed: Vec<(Entity, Point, Thing, Direction)> =
            (&entities, &positions, &identities, &destroyed)
                .join()
                .map(|(entity, pos, identity, _)| {
                    let facing = facings.get(entity).map(|f| f.0).unwrap_or_default();
                    (entity, pos.point, identity.0, facing)
                })
                .collect();

        for (entity, point, thing, facing) in doomed {
            for &target in book.spawns_for(thing.noun()) {
                let spawned = match (thing, target) {
                    (Thing::Object(own), Noun::Text) => Thing::Text(Word::Noun(own)),
                    (Thing::Text(word), Noun::Text) => Thing::Text(word),
                    (_, other) => Thing::Object(other),
                };
                entities
                    .build_entity()
                    .with(Position { point }, &mut positions)
                    .with(Identity(spawned), &mut identities)
                    .with(Facing(facing), &mut facings)
                    .build();
                log.push(format!("{} left behind {}", label(&thing), label(&spawned)));
            }
            let _ = entities.delete(entity);
        }
    }
}
