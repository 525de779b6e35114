use aglet::Coord;

use crate::{board::Board, Colour, Direction};

/// The player's token and everything it carries between moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
  position: Coord,
  colour: Colour,
  erasing: bool,
  can_move: bool,
  last_direction: Direction,
  extra_move: Option<Direction>,
}

impl Player {
  pub fn new(start: Coord) -> Self {
    Self {
      position: start,
      colour: Colour::White,
      erasing: false,
      can_move: true,
      last_direction: Direction::Left,
      extra_move: None,
    }
  }

  pub fn position(&self) -> Coord {
    self.position
  }

  pub fn colour(&self) -> Colour {
    self.colour
  }

  pub fn is_erasing(&self) -> bool {
    self.erasing
  }

  pub fn can_move(&self) -> bool {
    self.can_move
  }

  pub fn last_direction(&self) -> Direction {
    self.last_direction
  }

  pub fn pending_extra_move(&self) -> Option<Direction> {
    self.extra_move
  }

  /// Pick up a colour. This always puts the eraser down.
  pub fn set_colour(&mut self, colour: Colour) {
    self.colour = colour;
    self.erasing = false;
  }

  pub fn begin_erase(&mut self) {
    self.erasing = true;
    self.colour = Colour::White;
  }

  /// Queue a move the player didn't ask for, to run once the current one
  /// settles.
  pub fn make_extra_move(&mut self, direction: Direction) {
    self.extra_move = Some(direction);
  }

  pub(crate) fn take_extra_move(&mut self) -> Option<Direction> {
    self.extra_move.take()
  }

  pub(crate) fn face(&mut self, direction: Direction) {
    self.last_direction = direction;
  }

  pub(crate) fn place(&mut self, at: Coord) {
    self.position = at;
  }

  pub(crate) fn freeze(&mut self) {
    self.can_move = false;
  }

  /// Paint or erase the cell underneath the player.
  pub(crate) fn mark(&self, board: &mut Board) {
    if self.erasing {
      board.erase(self.position);
    } else {
      board.paint(self.position, self.colour);
    }
  }
}
