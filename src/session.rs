//! Which level is being played out of a set of levels.

use log::debug;

use crate::{MalformedLevel, Puzzle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSource {
  pub name: String,
  pub text: String,
}

impl LevelSource {
  pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      text: text.into(),
    }
  }
}

/// An ordered set of levels and a cursor into it.
#[derive(Debug, Clone)]
pub struct LevelSession {
  levels: Vec<LevelSource>,
  current: usize,
}

impl LevelSession {
  /// Returns `None` if there are no levels.
  pub fn new(levels: Vec<LevelSource>) -> Option<Self> {
    if levels.is_empty() {
      return None;
    }
    Some(Self { levels, current: 0 })
  }

  pub fn current(&self) -> &LevelSource {
    &self.levels[self.current]
  }

  pub fn index(&self) -> usize {
    self.current
  }

  pub fn len(&self) -> usize {
    self.levels.len()
  }

  pub fn is_at_last(&self) -> bool {
    self.current + 1 == self.levels.len()
  }

  /// Jump to level `index`. Returns false, and stays put, if there is no such
  /// level.
  pub fn select(&mut self, index: usize) -> bool {
    if index >= self.levels.len() {
      return false;
    }
    self.current = index;
    debug!("selected level {} ({})", index, self.current().name);
    true
  }

  pub fn next_level(&mut self) -> bool {
    self.select(self.current + 1)
  }

  pub fn previous_level(&mut self) -> bool {
    match self.current.checked_sub(1) {
      Some(index) => self.select(index),
      None => false,
    }
  }

  /// Decode the current level into a fresh puzzle.
  pub fn load(&self) -> Result<Puzzle, MalformedLevel> {
    Puzzle::load(&self.current().text)
  }
}
