use aglet::Coord;

use crate::{board::Board, tools::ToolRegistry, Direction, TileType};

/// Where a move ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
  pub destination: Coord,
  /// Cells crossed to get there. Zero means the move goes nowhere.
  pub units: u32,
}

/// Work out where the player stops when moving from `from` in `direction`.
///
/// - Default and dark tiles are stepped onto, and stop the move.
/// - Ice is slid over, unless a tool on it can redirect the player, in which
///   case the move stops on top of the tool.
/// - Blank tiles and the grid edge stop the move short.
pub fn resolve(
  board: &Board,
  tools: &ToolRegistry,
  from: Coord,
  direction: Direction,
) -> Resolution {
  let mut here = from;
  let mut units = 0;
  while let Some(next) = direction.step(here) {
    match board.tile_type(next) {
      Some(TileType::Default | TileType::Dark) => {
        here = next;
        units += 1;
        break;
      }
      Some(TileType::Ice) => {
        here = next;
        units += 1;
        if tools.can_redirect_at(next) {
          break;
        }
      }
      Some(TileType::Blank) | None => break,
    }
  }
  Resolution {
    destination: here,
    units,
  }
}
