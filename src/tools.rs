//! Things on the grid that do something when the player lands on them.

use aglet::Coord;
use ahash::AHashMap;
use log::trace;

use crate::{board::Board, player::Player, Colour, Direction, TileType};

/// Radius of a splash when the level doesn't give one.
pub const DEFAULT_SPLASH_RADIUS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
  /// Hands the player a colour.
  ColourPicker { colour: Colour },
  /// Hands the player a colour and paints a diamond around itself.
  Splash { colour: Colour, radius: u32 },
  /// Hands the player a colour and paints straight lines out of itself.
  LineShot {
    colour: Colour,
    directions: Vec<Direction>,
  },
  /// Makes the player erase instead of paint.
  Eraser,
  /// Pushes the player onwards in a fixed direction.
  Redirection { direction: Direction },
  /// Sends the player to its partner.
  Teleporter { partner: Coord, pair: usize },
}

/// The idle animation a presentation layer should play for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
  Rotate,
  Pulse,
}

impl Tool {
  /// Fire the tool, which sits at `at`, on the player standing on it.
  pub fn perform_action(
    &self,
    at: Coord,
    player: &mut Player,
    board: &mut Board,
  ) {
    match self {
      Tool::ColourPicker { colour } => player.set_colour(*colour),
      Tool::Splash { colour, radius } => {
        player.set_colour(*colour);
        board.splash(at, *radius, *colour);
      }
      Tool::LineShot { colour, directions } => {
        player.set_colour(*colour);
        for &d in directions {
          board.paint_line(at, d, *colour);
        }
      }
      Tool::Eraser => player.begin_erase(),
      Tool::Redirection { direction } => player.make_extra_move(*direction),
      Tool::Teleporter { partner, .. } => {
        // Leave a mark on this end before jumping.
        player.mark(board);
        player.place(*partner);
        if board.tile_type(*partner) == Some(TileType::Ice) {
          player.make_extra_move(player.last_direction());
        }
      }
    }
  }

  /// Whether this tool can change where the player ends up, and so must stop
  /// a slide on top of it.
  pub fn can_redirect(&self) -> bool {
    matches!(self, Tool::Redirection { .. } | Tool::Teleporter { .. })
  }

  pub fn animation(&self) -> Animation {
    match self {
      Tool::ColourPicker { .. } | Tool::Splash { .. } => Animation::Rotate,
      Tool::LineShot { .. }
      | Tool::Eraser
      | Tool::Redirection { .. }
      | Tool::Teleporter { .. } => Animation::Pulse,
    }
  }

  /// The colour the tool is drawn in. Teleporter pairs cycle through the
  /// palette in load order.
  pub fn colour(&self) -> Colour {
    match self {
      Tool::ColourPicker { colour }
      | Tool::Splash { colour, .. }
      | Tool::LineShot { colour, .. } => *colour,
      Tool::Teleporter { pair, .. } => Colour::ALL[pair % Colour::ALL.len()],
      Tool::Eraser | Tool::Redirection { .. } => Colour::White,
    }
  }
}

/// Tools keyed by the cell they sit on. At most one tool per cell.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
  tools: AHashMap<Coord, Tool>,
}

impl ToolRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Place a tool. If the cell is taken, nothing changes and the tool is
  /// handed back.
  pub fn insert(&mut self, at: Coord, tool: Tool) -> Result<(), Tool> {
    if self.tools.contains_key(&at) {
      return Err(tool);
    }
    trace!("placing {:?} at {}", tool, at);
    self.tools.insert(at, tool);
    Ok(())
  }

  pub fn get(&self, at: Coord) -> Option<&Tool> {
    self.tools.get(&at)
  }

  pub fn can_redirect_at(&self, at: Coord) -> bool {
    self.get(at).is_some_and(Tool::can_redirect)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tool)> + '_ {
    self.tools.iter().map(|(c, t)| (*c, t))
  }

  pub fn len(&self) -> usize {
    self.tools.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tools.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::board::tests::board;

  #[test]
  fn teleporters_send_to_partner_both_ways() {
    let mut b = board(&["dddd"], &["...."]);
    let a = Coord::new(0, 0);
    let z = Coord::new(3, 0);
    let to_z = Tool::Teleporter {
      partner: z,
      pair: 0,
    };
    let to_a = Tool::Teleporter {
      partner: a,
      pair: 0,
    };

    let mut p = Player::new(a);
    to_z.perform_action(a, &mut p, &mut b);
    assert_eq!(p.position(), z);
    to_a.perform_action(z, &mut p, &mut b);
    assert_eq!(p.position(), a);

    let mut p = Player::new(z);
    to_a.perform_action(z, &mut p, &mut b);
    assert_eq!(p.position(), a);
    assert_eq!(p.pending_extra_move(), None);
  }

  #[test]
  fn teleporter_paints_its_own_cell_and_keeps_sliding_on_ice() {
    let mut b = board(&["ddi"], &["..."]);
    let mut p = Player::new(Coord::new(0, 0));
    p.set_colour(Colour::Red);
    p.face(Direction::Right);
    let tool = Tool::Teleporter {
      partner: Coord::new(2, 0),
      pair: 0,
    };
    tool.perform_action(Coord::new(0, 0), &mut p, &mut b);
    assert_eq!(b.colour(Coord::new(0, 0)), Some(Colour::Red));
    // The far end is painted by whoever moved the player, not the tool.
    assert_eq!(b.colour(Coord::new(2, 0)), Some(Colour::White));
    assert_eq!(p.pending_extra_move(), Some(Direction::Right));
  }

  #[test]
  fn colour_tools_hand_over_colour() {
    let mut b = board(&["ddd", "ddd", "ddd"], &["...", "...", "..."]);
    let mut p = Player::new(Coord::new(1, 1));
    p.begin_erase();

    Tool::ColourPicker {
      colour: Colour::Blue,
    }
    .perform_action(Coord::new(1, 1), &mut p, &mut b);
    assert_eq!(p.colour(), Colour::Blue);
    assert!(!p.is_erasing());
    assert_eq!(b.colour(Coord::new(1, 1)), Some(Colour::White));

    Tool::LineShot {
      colour: Colour::Green,
      directions: vec![Direction::Up, Direction::Left],
    }
    .perform_action(Coord::new(1, 1), &mut p, &mut b);
    assert_eq!(p.colour(), Colour::Green);
    assert_eq!(b.colour(Coord::new(1, 2)), Some(Colour::Green));
    assert_eq!(b.colour(Coord::new(0, 1)), Some(Colour::Green));
    assert_eq!(b.colour(Coord::new(2, 1)), Some(Colour::White));
    assert_eq!(b.colour(Coord::new(1, 0)), Some(Colour::White));

    Tool::Splash {
      colour: Colour::Red,
      radius: 1,
    }
    .perform_action(Coord::new(1, 1), &mut p, &mut b);
    assert_eq!(p.colour(), Colour::Red);
    assert_eq!(b.colour(Coord::new(1, 0)), Some(Colour::Red));
    assert_eq!(b.colour(Coord::new(0, 0)), Some(Colour::White));
  }

  #[test]
  fn eraser_and_redirection() {
    let mut b = board(&["d"], &["."]);
    let mut p = Player::new(Coord::new(0, 0));
    p.set_colour(Colour::Yellow);
    Tool::Eraser.perform_action(Coord::new(0, 0), &mut p, &mut b);
    assert!(p.is_erasing());
    assert_eq!(p.colour(), Colour::White);

    Tool::Redirection {
      direction: Direction::Down,
    }
    .perform_action(Coord::new(0, 0), &mut p, &mut b);
    assert_eq!(p.pending_extra_move(), Some(Direction::Down));
    assert_eq!(p.position(), Coord::new(0, 0));
  }

  #[test]
  fn only_movers_redirect() {
    let partner = Coord::new(0, 0);
    assert!(Tool::Teleporter { partner, pair: 0 }.can_redirect());
    assert!(Tool::Redirection {
      direction: Direction::Up
    }
    .can_redirect());
    assert!(!Tool::Eraser.can_redirect());
    assert!(!Tool::ColourPicker {
      colour: Colour::Red
    }
    .can_redirect());
    assert_eq!(
      Tool::Splash {
        colour: Colour::Red,
        radius: 2
      }
      .animation(),
      Animation::Rotate
    );
    assert_eq!(Tool::Teleporter { partner, pair: 8 }.colour(), Colour::Blue);
  }

  #[test]
  fn registry_refuses_a_second_tool() {
    let mut tools = ToolRegistry::new();
    let at = Coord::new(1, 1);
    assert!(tools.insert(at, Tool::Eraser).is_ok());
    let back = tools.insert(
      at,
      Tool::ColourPicker {
        colour: Colour::Red,
      },
    );
    assert_eq!(
      back,
      Err(Tool::ColourPicker {
        colour: Colour::Red
      })
    );
    assert_eq!(tools.get(at), Some(&Tool::Eraser));
    assert_eq!(tools.len(), 1);
    assert!(!tools.can_redirect_at(at));
    assert!(!tools.can_redirect_at(Coord::new(0, 0)));
  }
}
