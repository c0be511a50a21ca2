use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::warn;

use crate::{map::Direction, session::Command};

pub struct MoveScript {
    script_commands: Vec<Command>,
    current_command_index: usize,
}

impl MoveScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut script_commands = Vec::new();
        for line in reader.lines() {
            let line = line?;
            script_commands.extend(parse_line(&line));
        }
        Ok(Self {
            script_commands,
            current_command_index: 0,
        })
    }

    pub fn parse(script: &str) -> Self {
        Self {
            script_commands: script.lines().flat_map(parse_line).collect(),
            current_command_index: 0,
        }
    }

    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.script_commands.get(self.current_command_index).copied();
        if command.is_some() {
            self.current_command_index += 1;
        }
        command
    }

    pub fn len(&self) -> usize {
        self.script_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script_commands.is_empty()
    }
}

impl Iterator for MoveScript {
    type Item = Command;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_command()
    }
}

fn parse_line(line: &str) -> Vec<Command> {
    let trimmed_line = line.trim_end();
    if trimmed_line.trim_start().starts_with('#') {
        return Vec::new();
    }
    trimmed_line
        .chars()
        .filter_map(|c| {
            let command = char_to_command(c);
            if command.is_none() {
                warn!("unknown key in script: {c:?}");
            }
            command
        })
        .collect()
}

fn char_to_command(c: char) -> Option<Command> {
    match c {
        'w' | 'W' | 'k' | 'K' => Some(Command::Step(Direction::Up)),
        'a' | 'A' | 'h' | 'H' => Some(Command::Step(Direction::Left)),
        's' | 'S' | 'j' | 'J' => Some(Command::Step(Direction::Down)),
        'd' | 'D' | 'l' | 'L' => Some(Command::Step(Direction::Right)),
        '.' | ' ' => Some(Command::Wait),
        'z' | 'Z' | 'u' | 'U' => Some(Command::Undo),
        'r' | 'R' => Some(Command::Restart),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_and_skips_comments() {
        let script = MoveScript::parse("# walk around\nwwd\n  # indented comment\n.z r\n");
        let commands: Vec<Command> = script.collect();
        assert_eq!(
            commands,
            vec![
                Command::Step(Direction::Up),
                Command::Step(Direction::Up),
                Command::Step(Direction::Right),
                Command::Wait,
                Command::Undo,
                Command::Wait,
                Command::Restart,
            ]
        );
    }

    #[test]
    fn vi_keys_match_wasd() {
        let vi: Vec<Command> = MoveScript::parse("hjkl").collect();
        let wasd: Vec<Command> = MoveScript::parse("aswd").collect();
        assert_eq!(vi, wasd);
    }

    #[test_log::test]
    fn unknown_keys_are_skipped() {
        let script = MoveScript::parse("d?d");
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn reads_from_any_buffered_reader() {
        let script = MoveScript::from_reader("dd\n#x\ns".as_bytes()).unwrap();
        assert_eq!(script.len(), 3);
        assert!(!script.is_empty());
    }
}
