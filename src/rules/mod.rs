pub mod scan;

use std::{collections::HashMap, fmt};

use crate::words::{Noun, Property, Verb};

pub use scan::TextLayout;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Complement {
    Noun(Noun),
    Property(Property),
}

impl Complement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complement::Noun(noun) => noun.as_str(),
            Complement::Property(property) => property.as_str(),
        }
    }
}

/// A single statement. "AND" never survives into a rule, it only fans a
/// sentence out into several of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    pub subject: Noun,
    pub verb: Verb,
    pub complement: Complement,
}

impl Rule {
    pub const fn new(subject: Noun, verb: Verb, complement: Complement) -> Self {
        Self {
            subject,
            verb,
            complement,
        }
    }

    pub const fn property(subject: Noun, property: Property) -> Self {
        Self::new(subject, Verb::Is, Complement::Property(property))
    }

    pub const fn conversion(subject: Noun, target: Noun) -> Self {
        Self::new(subject, Verb::Is, Complement::Noun(target))
    }

    pub const fn has(subject: Noun, target: Noun) -> Self {
        Self::new(subject, Verb::Has, Complement::Noun(target))
    }

    pub fn is_valid(&self) -> bool {
        match self.verb {
            Verb::Is => true,
            Verb::Has => matches!(self.complement, Complement::Noun(_)),
        }
    }

    /// Target becomes another type. Does not include HAS.
    pub fn is_conversion(&self) -> bool {
        self.verb == Verb::Is && matches!(self.complement, Complement::Noun(_))
    }

    pub fn is_property(&self) -> bool {
        self.verb == Verb::Is && matches!(self.complement, Complement::Property(_))
    }

    pub fn spawns_on_destroy(&self) -> bool {
        self.verb == Verb::Has && matches!(self.complement, Complement::Noun(_))
    }

    /// Applied once per instance.
    pub fn is_one_off(&self) -> bool {
        self.is_conversion() || self.spawns_on_destroy()
    }

    /// Applied every step.
    pub fn is_active(&self) -> bool {
        self.is_property()
            && matches!(
                self.complement,
                Complement::Property(Property::You) | Complement::Property(Property::Move)
            )
    }

    /// Applied only through interactions.
    pub fn is_passive(&self) -> bool {
        !self.is_active() && !self.is_one_off()
    }

    pub fn target_noun(&self) -> Option<Noun> {
        match self.complement {
            Complement::Noun(noun) => Some(noun),
            Complement::Property(_) => None,
        }
    }

    pub fn granted_property(&self) -> Option<Property> {
        match (self.verb, self.complement) {
            (Verb::Is, Complement::Property(property)) => Some(property),
            _ => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.subject.as_str(),
            self.verb.as_str(),
            self.complement.as_str()
        )
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySet(u16);

impl PropertySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, property: Property) {
        self.0 |= property.bit();
    }

    pub fn contains(&self, property: Property) -> bool {
        self.0 & property.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: PropertySet) -> PropertySet {
        PropertySet(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        Property::ALL
            .into_iter()
            .filter(move |property| self.contains(*property))
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut set = PropertySet::empty();
        for property in iter {
            set.insert(property);
        }
        set
    }
}

/// Text is always pushable, whether or not a rule says so.
const BASELINE: Rule = Rule::property(Noun::Text, Property::Push);

#[derive(Clone, Debug, Default)]
pub struct RuleBook {
    rules: Vec<Rule>,
    properties: HashMap<Noun, PropertySet>,
    conversions: HashMap<Noun, Noun>,
    locked: Vec<Noun>,
    spawns: HashMap<Noun, Vec<Noun>>,
}

impl RuleBook {
    /// Earlier rules take precedence; duplicates keep their first slot.
    pub fn from_rules<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        let mut book = RuleBook::default();
        for rule in rules {
            if !rule.is_valid() || book.rules.contains(&rule) {
                continue;
            }
            book.rules.push(rule);
        }

        for rule in book.rules.iter().chain(std::iter::once(&BASELINE)) {
            if let Some(property) = rule.granted_property() {
                book.properties
                    .entry(rule.subject)
                    .or_default()
                    .insert(property);
            } else if rule.is_conversion() {
                let target = rule.target_noun().unwrap_or(rule.subject);
                if target == rule.subject {
                    book.locked.push(rule.subject);
                } else {
                    book.conversions.entry(rule.subject).or_insert(target);
                }
            } else if rule.spawns_on_destroy() {
                if let Some(target) = rule.target_noun() {
                    book.spawns.entry(rule.subject).or_default().push(target);
                }
            }
        }
        book
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn properties_of(&self, noun: Noun) -> PropertySet {
        self.properties.get(&noun).copied().unwrap_or_default()
    }

    pub fn has_property(&self, noun: Noun, property: Property) -> bool {
        self.properties_of(noun).contains(property)
    }

    /// `None` when the noun is locked by "X IS X" or nothing converts it.
    pub fn conversion_for(&self, noun: Noun) -> Option<Noun> {
        if self.locked.contains(&noun) {
            return None;
        }
        self.conversions.get(&noun).copied()
    }

    pub fn spawns_for(&self, noun: Noun) -> &[Noun] {
        self.spawns.get(&noun).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_rules() {
        let you = Rule::property(Noun::Baba, Property::You);
        assert!(you.is_property() && you.is_active() && !you.is_passive());

        let stop = Rule::property(Noun::Wall, Property::Stop);
        assert!(stop.is_passive());

        let convert = Rule::conversion(Noun::Rock, Noun::Flag);
        assert!(convert.is_conversion() && convert.is_one_off() && !convert.is_passive());

        let has = Rule::has(Noun::Rock, Noun::Key);
        assert!(has.spawns_on_destroy() && has.is_one_off() && !has.is_conversion());
    }

    #[test]
    fn has_requires_a_noun() {
        let bad = Rule::new(Noun::Baba, Verb::Has, Complement::Property(Property::You));
        assert!(!bad.is_valid());
        let book = RuleBook::from_rules([bad]);
        assert!(book.is_empty());
    }

    #[test]
    fn displays_as_a_sentence() {
        assert_eq!(Rule::property(Noun::Baba, Property::You).to_string(), "BABA IS YOU");
        assert_eq!(Rule::has(Noun::Key, Noun::Love).to_string(), "KEY HAS LOVE");
    }

    #[test]
    fn text_is_always_push() {
        let book = RuleBook::from_rules([]);
        assert!(book.has_property(Noun::Text, Property::Push));
        assert!(book.rules().is_empty());
    }

    #[test]
    fn book_dedups_and_keeps_precedence() {
        let book = RuleBook::from_rules([
            Rule::conversion(Noun::Rock, Noun::Flag),
            Rule::property(Noun::Baba, Property::You),
            Rule::conversion(Noun::Rock, Noun::Wall),
            Rule::property(Noun::Baba, Property::You),
        ]);
        assert_eq!(book.rules().len(), 3);
        assert_eq!(book.conversion_for(Noun::Rock), Some(Noun::Flag));
    }

    #[test]
    fn identity_rule_locks_conversion() {
        let book = RuleBook::from_rules([
            Rule::conversion(Noun::Baba, Noun::Rock),
            Rule::conversion(Noun::Baba, Noun::Baba),
        ]);
        assert_eq!(book.conversion_for(Noun::Baba), None);
    }

    #[test]
    fn collects_spawns_in_order() {
        let book = RuleBook::from_rules([
            Rule::has(Noun::Rock, Noun::Key),
            Rule::has(Noun::Rock, Noun::Love),
        ]);
        assert_eq!(book.spawns_for(Noun::Rock), &[Noun::Key, Noun::Love]);
        assert!(book.spawns_for(Noun::Baba).is_empty());
    }

    #[test]
    fn property_set_iterates_in_vocabulary_order() {
        let set: PropertySet = [Property::Stop, Property::You].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Property::You, Property::Stop]);
        assert!(!set.is_empty());
    }
}
