//! The tile grid: what the player has painted, and what they should paint.

use aglet::{Coord, Grid};

use crate::{Colour, Direction, Tile, TileType};

#[derive(Debug, Clone)]
pub struct Board {
  tiles: Grid<Tile>,
  solution: Grid<Tile>,
  /// Cells whose colour matches the solution. Kept up to date on every
  /// single-cell change.
  correct_tiles: u32,
  /// Cells whose colour changed since the last `take_changes`.
  changes: Vec<Coord>,
}

impl Board {
  /// Both grids must be fully populated and share dimensions and tile types.
  pub(crate) fn new(tiles: Grid<Tile>, solution: Grid<Tile>) -> Self {
    debug_assert_eq!(tiles.width(), solution.width());
    debug_assert_eq!(tiles.height(), solution.height());
    let mut board = Self {
      tiles,
      solution,
      correct_tiles: 0,
      changes: Vec::new(),
    };
    board.correct_tiles = board.count_correct();
    board
  }

  pub fn width(&self) -> u32 {
    self.tiles.width()
  }

  pub fn height(&self) -> u32 {
    self.tiles.height()
  }

  /// Total number of cells, which is also the count needed to win.
  pub fn area(&self) -> u32 {
    self.width() * self.height()
  }

  pub fn contains(&self, coord: Coord) -> bool {
    coord.x < self.width() && coord.y < self.height()
  }

  pub fn tile(&self, coord: Coord) -> Option<Tile> {
    if !self.contains(coord) {
      return None;
    }
    self.tiles.get(coord).copied()
  }

  pub fn tile_type(&self, coord: Coord) -> Option<TileType> {
    self.tile(coord).map(|t| t.kind)
  }

  pub fn colour(&self, coord: Coord) -> Option<Colour> {
    self.tile(coord).map(|t| t.colour)
  }

  pub fn solution(&self, coord: Coord) -> Option<Tile> {
    if !self.contains(coord) {
      return None;
    }
    self.solution.get(coord).copied()
  }

  pub fn solution_colour(&self, coord: Coord) -> Option<Colour> {
    self.solution(coord).map(|t| t.colour)
  }

  pub fn correct_tiles(&self) -> u32 {
    self.correct_tiles
  }

  pub fn is_complete(&self) -> bool {
    self.correct_tiles == self.area()
  }

  /// Count correct cells from scratch.
  pub fn count_correct(&self) -> u32 {
    let mut count = 0;
    for y in 0..self.height() {
      for x in 0..self.width() {
        let coord = Coord::new(x, y);
        if self.colour(coord) == self.solution_colour(coord) {
          count += 1;
        }
      }
    }
    count
  }

  /// Paint a cell. White paint and unpaintable tiles are ignored.
  ///
  /// Returns whether the paint was applied.
  pub fn paint(&mut self, coord: Coord, colour: Colour) -> bool {
    if colour.is_white() {
      return false;
    }
    self.recolour(coord, colour)
  }

  /// Strip the paint off a cell. Unpaintable tiles are ignored.
  pub fn erase(&mut self, coord: Coord) -> bool {
    self.recolour(coord, Colour::White)
  }

  fn recolour(&mut self, coord: Coord, colour: Colour) -> bool {
    let (Some(tile), Some(target)) =
      (self.tile(coord), self.solution_colour(coord))
    else {
      return false;
    };
    if !tile.kind.is_paintable() {
      return false;
    }

    let was_correct = tile.colour == target;
    let now_correct = colour == target;
    match (was_correct, now_correct) {
      (true, false) => self.correct_tiles -= 1,
      (false, true) => self.correct_tiles += 1,
      _ => {}
    }

    if tile.colour != colour {
      self.changes.push(coord);
    }
    self.tiles.insert(coord, Tile { colour, ..tile });
    true
  }

  /// Paint every cell within `radius` steps (Manhattan distance) of `centre`.
  pub fn splash(&mut self, centre: Coord, radius: u32, colour: Colour) {
    let radius = radius as i64;
    for dx in -radius..=radius {
      for dy in -radius..=radius {
        if dx.abs() + dy.abs() > radius {
          continue;
        }
        let x = centre.x as i64 + dx;
        let y = centre.y as i64 + dy;
        if x < 0 || y < 0 {
          continue;
        }
        let coord = Coord::new(x as u32, y as u32);
        if self.contains(coord) {
          self.paint(coord, colour);
        }
      }
    }
  }

  /// Paint a straight line from `start` (inclusive) until a blank tile or the
  /// edge of the grid.
  pub fn paint_line(
    &mut self,
    start: Coord,
    direction: Direction,
    colour: Colour,
  ) {
    let mut here = Some(start);
    while let Some(coord) = here {
      match self.tile_type(coord) {
        None | Some(TileType::Blank) => break,
        Some(_) => {
          self.paint(coord, colour);
        }
      }
      here = direction.step(coord);
    }
  }

  /// Wipe every cell back to white and restore a known correct count.
  pub(crate) fn clear(&mut self, correct_tiles: u32) {
    for y in 0..self.height() {
      for x in 0..self.width() {
        let coord = Coord::new(x, y);
        if let Some(tile) = self.tile(coord) {
          self.tiles.insert(coord, Tile::new(tile.kind));
        }
      }
    }
    self.correct_tiles = correct_tiles;
    self.changes.clear();
  }

  /// Drain the list of cells recoloured since the last call.
  pub fn take_changes(&mut self) -> Vec<Coord> {
    std::mem::take(&mut self.changes)
  }
}
