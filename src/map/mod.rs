use std::{fs, path::Path};

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SketchError},
    words::{Noun, Property, Verb, Word},
};

pub const MAX_LEVEL_WIDTH: i32 = 13;
pub const MAX_LEVEL_HEIGHT: i32 = 36;

/// Facing in 90-degree clockwise increments, starting from up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn delta(&self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Right => Point::new(1, 0),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
        }
    }

    pub fn rotation(&self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Only the low two bits count.
    pub fn from_rotation(rotation: u8) -> Self {
        Self::ALL[(rotation & 3) as usize]
    }

    pub fn rotate_cw(self) -> Self {
        Self::from_rotation(self.rotation() + 1)
    }

    pub fn reverse(self) -> Self {
        Self::from_rotation(self.rotation() + 2)
    }

    pub fn step_from(&self, point: Point) -> Point {
        let delta = self.delta();
        Point::new(point.x + delta.x, point.y + delta.y)
    }
}

/// What occupies a placement: an object, or a tile of text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Thing {
    Object(Noun),
    Text(Word),
}

impl Thing {
    pub fn noun(&self) -> Noun {
        match self {
            Thing::Object(noun) => *noun,
            Thing::Text(_) => Noun::Text,
        }
    }

    pub fn word(&self) -> Option<Word> {
        match self {
            Thing::Text(word) => Some(*word),
            Thing::Object(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Thing::Text(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    #[serde(flatten)]
    pub thing: Thing,
    #[serde(default)]
    pub facing: Direction,
}

impl Placement {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub name: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub things: Vec<Placement>,
}

impl Level {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            things: Vec::new(),
        }
    }

    pub fn with_text(mut self, x: i32, y: i32, word: impl Into<Word>) -> Self {
        self.things.push(Placement {
            x,
            y,
            thing: Thing::Text(word.into()),
            facing: Direction::default(),
        });
        self
    }

    pub fn with_object(self, x: i32, y: i32, noun: Noun) -> Self {
        self.with_object_facing(x, y, noun, Direction::default())
    }

    pub fn with_object_facing(mut self, x: i32, y: i32, noun: Noun, facing: Direction) -> Self {
        self.things.push(Placement {
            x,
            y,
            thing: Thing::Object(noun),
            facing,
        });
        self
    }

    /// Places `subject verb complement` left to right starting at `x, y`.
    pub fn with_sentence(self, x: i32, y: i32, words: &[Word]) -> Self {
        words
            .iter()
            .enumerate()
            .fold(self, |level, (offset, word)| {
                level.with_text(x + offset as i32, y, *word)
            })
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(SketchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if let Some(outside) = self.things.iter().find(|p| !self.in_bounds(p.point())) {
            return Err(SketchError::OutOfBounds {
                x: outside.x,
                y: outside.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn fits_screen(&self) -> bool {
        self.width <= MAX_LEVEL_WIDTH && self.height <= MAX_LEVEL_HEIGHT
    }

    pub fn demo() -> Self {
        let is = Word::Verb(Verb::Is);
        let mut level = Level::new("Where Do I Go?", 13, 9)
            .with_sentence(1, 0, &[Noun::Baba.into(), is, Property::You.into()])
            .with_sentence(9, 0, &[Noun::Flag.into(), is, Property::Win.into()])
            .with_sentence(1, 1, &[Noun::Wall.into(), is, Property::Stop.into()])
            .with_sentence(9, 1, &[Noun::Rock.into(), is, Property::Push.into()]);
        for y in 3..=7 {
            level = level.with_object(7, y, Noun::Wall);
        }
        level
            .with_object(3, 5, Noun::Baba)
            .with_object(5, 5, Noun::Rock)
            .with_object(10, 5, Noun::Flag)
    }
}
