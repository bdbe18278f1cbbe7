//! Conversation history management
//!
//! Ordered, capped list of turns with FIFO eviction.

use std::collections::VecDeque;

use crate::core::Turn;

/// Manages conversation history
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Turn history, oldest first
    turns: VecDeque<Turn>,
    /// Maximum history length
    max_length: usize,
}

impl Conversation {
    /// Create a new conversation. A cap of zero is treated as one.
    pub fn new(max_length: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_length: max_length.max(1),
        }
    }

    /// Append a turn and maintain the size limit
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);

        while self.turns.len() > self.max_length {
            self.turns.pop_front();
        }
    }

    /// All retained turns, oldest first
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> + DoubleEndedIterator {
        self.turns.iter()
    }

    /// Get the last N turns
    pub fn last_n(&self, n: usize) -> Vec<&Turn> {
        self.turns.iter().rev().take(n).rev().collect()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    /// Get the last user turn
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.is_user())
    }

    /// Get the last assistant turn
    pub fn last_assistant_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| !t.is_user())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Get turn count
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Configured cap
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_basic() {
        let mut conv = Conversation::new(10);
        conv.push(Turn::user("Hello", None));
        conv.push(Turn::assistant("Hi there!"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.last_user_turn().unwrap().text, "Hello");
        assert_eq!(conv.last_assistant_turn().unwrap().text, "Hi there!");
    }

    #[test]
    fn test_conversation_limit() {
        let mut conv = Conversation::new(3);
        for text in ["1", "2", "3", "4"] {
            conv.push(Turn::user(text, None));
        }

        assert_eq!(conv.len(), 3);
        // Oldest turn is dropped first
        let texts: Vec<&str> = conv.turns().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let mut conv = Conversation::new(5);
        for i in 0..100 {
            conv.push(Turn::assistant(i.to_string()));
            assert!(conv.len() <= 5);
        }
        assert_eq!(conv.last().unwrap().text, "99");
        assert_eq!(conv.last_n(2)[0].text, "98");
    }

    #[test]
    fn test_zero_cap() {
        let mut conv = Conversation::new(0);
        conv.push(Turn::user("a", None));
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.max_length(), 1);
    }

    #[test]
    fn test_clear() {
        let mut conv = Conversation::default();
        conv.clear();
        assert!(conv.is_empty());

        conv.push(Turn::user("a", None));
        conv.clear();
        assert!(conv.is_empty());
        assert_eq!(conv.max_length(), 50);
    }
}
