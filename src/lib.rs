pub mod board;
mod colour;
mod error;
pub mod movement;
mod parse;
pub mod player;
pub mod puzzle;
pub mod session;
pub mod tools;

pub use colour::{Colour, Direction, Tile, TileType};
pub use error::{MalformedLevel, MalformedReason};
pub use parse::parse_to_level;
pub use puzzle::{Event, MoveOutcome, Puzzle, Step};

use aglet::Coord;
use board::Board;
use tools::ToolRegistry;

/// A freshly decoded level: nothing painted, player at the start.
#[derive(Debug, Clone)]
pub struct Level {
  board: Board,
  tools: ToolRegistry,
  start: Coord,
}

impl Level {
  pub fn new(board: Board, tools: ToolRegistry, start: Coord) -> Self {
    Self {
      board,
      tools,
      start,
    }
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn tools(&self) -> &ToolRegistry {
    &self.tools
  }

  pub fn start(&self) -> Coord {
    self.start
  }
}
