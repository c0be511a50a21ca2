use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SketchError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Noun {
    Baba,
    Key,
    Wall,
    Rock,
    Text,
    Love,
    Flag,
    Water,
    Lava,
}

impl Noun {
    pub const ALL: [Noun; 9] = [
        Noun::Baba,
        Noun::Key,
        Noun::Wall,
        Noun::Rock,
        Noun::Text,
        Noun::Love,
        Noun::Flag,
        Noun::Water,
        Noun::Lava,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Noun::Baba => "BABA",
            Noun::Key => "KEY",
            Noun::Wall => "WALL",
            Noun::Rock => "ROCK",
            Noun::Text => "TEXT",
            Noun::Love => "LOVE",
            Noun::Flag => "FLAG",
            Noun::Water => "WATER",
            Noun::Lava => "LAVA",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Is,
    Has,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Is => "IS",
            Verb::Has => "HAS",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Property {
    You,
    Move,
    Win,
    Push,
    Pull,
    Stop,
    Defeat,
    Tele,
    Melt,
    Hot,
    Sink,
}

impl Property {
    pub const ALL: [Property; 11] = [
        Property::You,
        Property::Move,
        Property::Win,
        Property::Push,
        Property::Pull,
        Property::Stop,
        Property::Defeat,
        Property::Tele,
        Property::Melt,
        Property::Hot,
        Property::Sink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Property::You => "YOU",
            Property::Move => "MOVE",
            Property::Win => "WIN",
            Property::Push => "PUSH",
            Property::Pull => "PULL",
            Property::Stop => "STOP",
            Property::Defeat => "DEFEAT",
            Property::Tele => "TELE",
            Property::Melt => "MELT",
            Property::Hot => "HOT",
            Property::Sink => "SINK",
        }
    }

    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordClass {
    Noun,
    Verb,
    Linker,
    Property,
}

/// A word printed on a text tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Word {
    Noun(Noun),
    Verb(Verb),
    And,
    Property(Property),
}

impl Word {
    pub fn class(&self) -> WordClass {
        match self {
            Word::Noun(_) => WordClass::Noun,
            Word::Verb(_) => WordClass::Verb,
            Word::And => WordClass::Linker,
            Word::Property(_) => WordClass::Property,
        }
    }

    pub fn as_noun(&self) -> Option<Noun> {
        match self {
            Word::Noun(noun) => Some(*noun),
            _ => None,
        }
    }

    pub fn as_verb(&self) -> Option<Verb> {
        match self {
            Word::Verb(verb) => Some(*verb),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<Property> {
        match self {
            Word::Property(property) => Some(*property),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Word::Noun(noun) => noun.as_str(),
            Word::Verb(verb) => verb.as_str(),
            Word::And => "AND",
            Word::Property(property) => property.as_str(),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Word {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper == "AND" {
            return Ok(Word::And);
        }
        if let Some(noun) = Noun::ALL.iter().find(|noun| noun.as_str() == upper) {
            return Ok(Word::Noun(*noun));
        }
        if let Some(verb) = [Verb::Is, Verb::Has].iter().find(|verb| verb.as_str() == upper) {
            return Ok(Word::Verb(*verb));
        }
        Property::ALL
            .iter()
            .find(|property| property.as_str() == upper)
            .map(|property| Word::Property(*property))
            .ok_or_else(|| SketchError::UnknownWord(s.to_string()))
    }
}

impl TryFrom<String> for Word {
    type Error = SketchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_string()
    }
}

impl From<Noun> for Word {
    fn from(noun: Noun) -> Self {
        Word::Noun(noun)
    }
}

impl From<Verb> for Word {
    fn from(verb: Verb) -> Self {
        Word::Verb(verb)
    }
}

impl From<Property> for Word {
    fn from(property: Property) -> Self {
        Word::Property(property)
    }
}
