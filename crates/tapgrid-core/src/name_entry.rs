//! Arcade-style name picker shown when a game ends.

use serde::{Deserialize, Serialize};

/// Number of letter slots.
pub const NAME_SLOTS: usize = 5;

/// Letters a slot cycles through, in order.
pub const ALPHABET: [char; 27] = [
    ' ', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameEntry {
    slots: [char; NAME_SLOTS],
    cursor: usize,
}

impl Default for NameEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameEntry {
    pub fn new() -> Self {
        Self {
            slots: ['A'; NAME_SLOTS],
            cursor: 0,
        }
    }

    /// Index of the slot being edited.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slots(&self) -> &[char; NAME_SLOTS] {
        &self.slots
    }

    /// Next letter in the alphabet, wrapping after `Z`.
    pub fn cycle_up(&mut self) {
        self.rotate(1);
    }

    /// Previous letter in the alphabet, wrapping before space.
    pub fn cycle_down(&mut self) {
        self.rotate(ALPHABET.len() - 1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1) % NAME_SLOTS;
    }

    pub fn move_left(&mut self) {
        self.cursor = (self.cursor + NAME_SLOTS - 1) % NAME_SLOTS;
    }

    /// Writes `c` at the cursor and moves right.
    ///
    /// Only ASCII letters and space are accepted; returns whether `c` was.
    pub fn type_char(&mut self, c: char) -> bool {
        if !(c.is_ascii_alphabetic() || c == ' ') {
            return false;
        }
        self.slots[self.cursor] = c.to_ascii_uppercase();
        self.move_right();
        true
    }

    /// The picked name, padding included.
    pub fn name(&self) -> String {
        self.slots.iter().collect()
    }

    fn rotate(&mut self, step: usize) {
        let current = self.slots[self.cursor];
        let index = ALPHABET.iter().position(|&c| c == current).unwrap_or(0);
        self.slots[self.cursor] = ALPHABET[(index + step) % ALPHABET.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_as_aaaaa() {
        let entry = NameEntry::new();
        assert_eq!(entry.name(), "AAAAA");
        assert_eq!(entry.cursor(), 0);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut entry = NameEntry::new();
        entry.cycle_down();
        assert_eq!(entry.slots()[0], ' ');
        entry.cycle_down();
        assert_eq!(entry.slots()[0], 'Z');
        entry.cycle_up();
        entry.cycle_up();
        entry.cycle_up();
        assert_eq!(entry.slots()[0], 'A');
    }

    #[test]
    fn test_cursor_wraps() {
        let mut entry = NameEntry::new();
        entry.move_left();
        assert_eq!(entry.cursor(), NAME_SLOTS - 1);
        entry.move_right();
        assert_eq!(entry.cursor(), 0);
    }

    #[test]
    fn test_typing() {
        let mut entry = NameEntry::new();
        for c in "bob".chars() {
            assert!(entry.type_char(c));
        }
        assert!(!entry.type_char('7'));
        assert!(entry.type_char(' '));
        assert!(entry.type_char(' '));
        assert_eq!(entry.name(), "BOB  ");
        assert_eq!(entry.cursor(), 0);
    }
}
