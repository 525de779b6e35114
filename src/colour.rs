use aglet::{Coord, CoordVec};

/// Paint colours. White doubles as "no paint".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
  Red,
  Blue,
  Yellow,
  Orange,
  Purple,
  Green,
  White,
}

impl Colour {
  pub const ALL: [Colour; 7] = [
    Colour::Red,
    Colour::Blue,
    Colour::Yellow,
    Colour::Orange,
    Colour::Purple,
    Colour::Green,
    Colour::White,
  ];

  /// Reads a colour code from level text. Anything unrecognised is white.
  pub fn from_code(c: char) -> Self {
    match c {
      'r' => Colour::Red,
      'b' => Colour::Blue,
      'y' => Colour::Yellow,
      'o' => Colour::Orange,
      'p' => Colour::Purple,
      'g' => Colour::Green,
      _ => Colour::White,
    }
  }

  pub fn is_white(self) -> bool {
    self == Colour::White
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
  /// Paintable; stops the player.
  Default,
  /// Paintable; the player slides over it.
  Ice,
  /// Stops the player but never takes paint.
  Dark,
  /// Not part of the playfield.
  Blank,
}

impl TileType {
  /// Reads a tile code from level text. Anything unrecognised is blank.
  pub fn from_code(c: char) -> Self {
    match c {
      'd' => TileType::Default,
      'i' => TileType::Ice,
      'r' => TileType::Dark,
      _ => TileType::Blank,
    }
  }

  pub fn is_paintable(self) -> bool {
    matches!(self, TileType::Default | TileType::Ice)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
  pub kind: TileType,
  pub colour: Colour,
}

impl Tile {
  /// A fresh, unpainted tile.
  pub fn new(kind: TileType) -> Self {
    Self {
      kind,
      colour: Colour::White,
    }
  }
}

/// Grid directions. `Up` is towards larger y; the origin is the bottom-left
/// corner of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  pub const ALL: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
  ];

  /// Reads a direction code from level text. Anything other than `u`, `d` or
  /// `l` is right.
  pub fn from_code(c: char) -> Self {
    match c {
      'u' => Direction::Up,
      'd' => Direction::Down,
      'l' => Direction::Left,
      _ => Direction::Right,
    }
  }

  pub fn deltas(self) -> CoordVec {
    match self {
      Direction::Up => CoordVec::new(0, 1),
      Direction::Down => CoordVec::new(0, -1),
      Direction::Left => CoordVec::new(-1, 0),
      Direction::Right => CoordVec::new(1, 0),
    }
  }

  /// The neighbouring coordinate in this direction, if it isn't negative.
  /// This does not know about grid bounds.
  pub fn step(self, coord: Coord) -> Option<Coord> {
    (coord.to_icoord() + self.deltas()).to_coord()
  }
}
