use std::collections::HashMap;

use bracket_geometry::prelude::Point;
use smallvec::SmallVec;

use crate::words::{Noun, Verb, Word};

use super::{Complement, Rule};

const READING_DIRECTIONS: [Point; 2] = [Point { x: 1, y: 0 }, Point { x: 0, y: 1 }];

/// Words on the board, keyed by cell. Words stacked on one cell keep the
/// order they were added in.
#[derive(Clone, Debug, Default)]
pub struct TextLayout {
    cells: HashMap<Point, SmallVec<[Word; 2]>>,
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, point: Point, word: Word) {
        self.cells.entry(point).or_default().push(word);
    }

    pub fn words_at(&self, point: Point) -> &[Word] {
        self.cells.get(&point).map(|words| words.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn first_matching<T>(&self, point: Point, pick: impl Fn(&Word) -> Option<T>) -> Option<T> {
        self.words_at(point).iter().find_map(pick)
    }

    fn has_and(&self, point: Point) -> bool {
        self.words_at(point).contains(&Word::And)
    }

    fn origins(&self) -> Vec<Point> {
        let mut origins: Vec<Point> = self
            .cells
            .iter()
            .filter(|(_, words)| words.iter().any(|word| word.as_noun().is_some()))
            .map(|(point, _)| *point)
            .collect();
        origins.sort_by_key(|point| (point.y, point.x));
        origins
    }

    /// Reads every sentence on the board, top-leftmost first.
    pub fn scan(&self) -> Vec<Rule> {
        let mut rules = Vec::new();
        for origin in self.origins() {
            for direction in READING_DIRECTIONS {
                for rule in self.read_sentence(origin, direction) {
                    if !rules.contains(&rule) {
                        rules.push(rule);
                    }
                }
            }
        }
        rules
    }

    fn read_sentence(&self, origin: Point, direction: Point) -> Vec<Rule> {
        let step = |point: Point| Point::new(point.x + direction.x, point.y + direction.y);

        let Some(first) = self.first_matching(origin, Word::as_noun) else {
            return Vec::new();
        };
        let mut subjects: SmallVec<[Noun; 4]> = SmallVec::new();
        subjects.push(first);
        let mut cursor = step(origin);

        while self.has_and(cursor) {
            match self.first_matching(step(cursor), Word::as_noun) {
                Some(noun) => {
                    subjects.push(noun);
                    cursor = step(step(cursor));
                }
                None => break,
            }
        }

        let Some(verb) = self.first_matching(cursor, Word::as_verb) else {
            return Vec::new();
        };
        cursor = step(cursor);

        let Some(first) = self.first_matching(cursor, |word| complement_for(verb, word)) else {
            return Vec::new();
        };
        let mut complements: SmallVec<[Complement; 4]> = SmallVec::new();
        complements.push(first);

        while self.has_and(step(cursor)) {
            let next = step(step(cursor));
            match self.first_matching(next, |word| complement_for(verb, word)) {
                Some(complement) => {
                    complements.push(complement);
                    cursor = next;
                }
                None => break,
            }
        }

        let mut rules = Vec::with_capacity(subjects.len() * complements.len());
        for subject in &subjects {
            for complement in &complements {
                rules.push(Rule::new(*subject, verb, *complement));
            }
        }
        rules
    }
}

impl FromIterator<(Point, Word)> for TextLayout {
    fn from_iter<I: IntoIterator<Item = (Point, Word)>>(iter: I) -> Self {
        let mut layout = TextLayout::new();
        for (point, word) in iter {
            layout.place(point, word);
        }
        layout
    }
}

fn complement_for(verb: Verb, word: &Word) -> Option<Complement> {
    match (verb, word) {
        (_, Word::Noun(noun)) => Some(Complement::Noun(*noun)),
        (Verb::Is, Word::Property(property)) => Some(Complement::Property(*property)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::Property;

    fn layout(words: &[(i32, i32, &str)]) -> TextLayout {
        words
            .iter()
            .map(|(x, y, name)| (Point::new(*x, *y), name.parse::<Word>().unwrap()))
            .collect()
    }

    fn sentences(words: &[(i32, i32, &str)]) -> Vec<String> {
        layout(words).scan().iter().map(Rule::to_string).collect()
    }

    #[test]
    fn reads_horizontal_sentence() {
        let rules = sentences(&[(0, 0, "BABA"), (1, 0, "IS"), (2, 0, "YOU")]);
        assert_eq!(rules, vec!["BABA IS YOU"]);
    }

    #[test]
    fn reads_vertical_sentence() {
        let rules = sentences(&[(4, 2, "WALL"), (4, 3, "IS"), (4, 4, "STOP")]);
        assert_eq!(rules, vec!["WALL IS STOP"]);
    }

    #[test]
    fn shares_a_word_across_directions() {
        let rules = sentences(&[
            (0, 0, "BABA"),
            (1, 0, "IS"),
            (2, 0, "YOU"),
            (0, 1, "IS"),
            (0, 2, "WIN"),
        ]);
        assert_eq!(rules, vec!["BABA IS YOU", "BABA IS WIN"]);
    }

    #[test]
    fn and_links_subjects_and_complements() {
        let rules = sentences(&[
            (0, 0, "ROCK"),
            (1, 0, "AND"),
            (2, 0, "WALL"),
            (3, 0, "IS"),
            (4, 0, "PUSH"),
            (5, 0, "AND"),
            (6, 0, "STOP"),
        ]);
        assert_eq!(
            rules,
            vec![
                "ROCK IS PUSH",
                "ROCK IS STOP",
                "WALL IS PUSH",
                "WALL IS STOP",
            ]
        );
    }

    #[test]
    fn dangling_and_breaks_the_subject_list() {
        let rules = sentences(&[(0, 0, "ROCK"), (1, 0, "AND"), (2, 0, "IS"), (3, 0, "PUSH")]);
        assert!(rules.is_empty());
    }

    #[test]
    fn dangling_and_ends_the_complement_list() {
        let rules = sentences(&[(0, 0, "ROCK"), (1, 0, "IS"), (2, 0, "PUSH"), (3, 0, "AND")]);
        assert_eq!(rules, vec!["ROCK IS PUSH"]);
    }

    #[test]
    fn has_rejects_properties() {
        let rules = sentences(&[(0, 0, "ROCK"), (1, 0, "HAS"), (2, 0, "YOU")]);
        assert!(rules.is_empty());
        let rules = sentences(&[(0, 0, "ROCK"), (1, 0, "HAS"), (2, 0, "KEY")]);
        assert_eq!(rules, vec!["ROCK HAS KEY"]);
    }

    #[test]
    fn has_with_and_stops_at_a_property() {
        let rules = sentences(&[
            (0, 0, "ROCK"),
            (1, 0, "HAS"),
            (2, 0, "KEY"),
            (3, 0, "AND"),
            (4, 0, "WIN"),
        ]);
        assert_eq!(rules, vec!["ROCK HAS KEY"]);
    }

    #[test]
    fn top_left_sentences_come_first() {
        let rules = sentences(&[
            (5, 3, "FLAG"),
            (6, 3, "IS"),
            (7, 3, "WIN"),
            (0, 1, "BABA"),
            (1, 1, "IS"),
            (2, 1, "YOU"),
        ]);
        assert_eq!(rules, vec!["BABA IS YOU", "FLAG IS WIN"]);
    }

    #[test]
    fn stacked_words_pick_the_first_of_the_needed_class() {
        let mut text = layout(&[(0, 0, "BABA"), (2, 0, "YOU")]);
        text.place(Point::new(1, 0), Word::Property(Property::Win));
        text.place(Point::new(1, 0), Word::Verb(Verb::Is));
        let rules = text.scan();
        assert_eq!(rules, vec![Rule::property(Noun::Baba, Property::You)]);
    }

    #[test]
    fn middle_subject_also_starts_a_sentence() {
        let rules = sentences(&[
            (0, 0, "KEY"),
            (1, 0, "IS"),
            (2, 0, "ROCK"),
            (3, 0, "AND"),
            (4, 0, "BABA"),
            (5, 0, "IS"),
            (6, 0, "YOU"),
        ]);
        assert!(rules.contains(&"KEY IS ROCK".to_string()));
        assert!(rules.contains(&"KEY IS BABA".to_string()));
        assert!(rules.contains(&"BABA IS YOU".to_string()));
    }

    #[test]
    fn empty_layout_reads_nothing() {
        assert!(TextLayout::new().scan().is_empty());
    }
}
