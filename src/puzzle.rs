//! Playing a level: moving the player, firing tools, painting, and noticing
//! when the picture is finished.
//!
//! Moves resolve instantly, but are applied one cell at a time through
//! [`Puzzle::step`] so a front end can pace them however it likes.
//! [`Puzzle::move_player`] runs a whole move in one go.

use aglet::Coord;
use ahash::AHashSet;
use log::{debug, info, trace};

use crate::{
  board::Board,
  movement,
  player::Player,
  tools::{Animation, Tool, ToolRegistry},
  Colour, Direction, Level, MalformedLevel, TileType,
};

/// Something the front end may want to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// The player moved one cell.
  Stepped { to: Coord },
  ToolActivated { at: Coord, tool: Tool },
  Teleported { from: Coord, to: Coord },
  Painted { at: Coord, colour: Colour },
  /// A tool's idle animation should start or stop.
  ToolAnimation {
    at: Coord,
    animation: Animation,
    running: bool,
  },
  Solved,
  Reset,
}

/// What a call to [`Puzzle::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// No move in flight.
  Idle,
  /// A move is in flight but the game is paused.
  Paused,
  /// The player crossed a cell and is still moving.
  Moved(Coord),
  /// The player crossed a cell and the move is over.
  Settled(Coord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
  /// Where the player was after each cell crossed, in order.
  pub cells_crossed: Vec<Coord>,
  pub solved: bool,
}

impl MoveOutcome {
  pub fn moved(&self) -> bool {
    !self.cells_crossed.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Motion {
  direction: Direction,
  remaining: u32,
}

#[derive(Debug, Clone)]
pub struct Puzzle {
  board: Board,
  tools: ToolRegistry,
  player: Player,
  start: Coord,
  /// Correct count straight after decoding, for resets.
  initial_correct: u32,
  motion: Option<Motion>,
  /// Every (cell, direction) the current move chain has set off from.
  launches: AHashSet<(Coord, Direction)>,
  moves: u32,
  solved: bool,
  paused: bool,
  events: Vec<Event>,
}

impl Puzzle {
  pub fn new(level: Level) -> Self {
    let start = level.start();
    let Level { board, tools, .. } = level;
    Self {
      initial_correct: board.correct_tiles(),
      board,
      tools,
      player: Player::new(start),
      start,
      motion: None,
      launches: AHashSet::new(),
      moves: 0,
      solved: false,
      paused: false,
      events: Vec::new(),
    }
  }

  /// Decode a level and start playing it.
  pub fn load(text: &str) -> Result<Self, MalformedLevel> {
    crate::parse_to_level(text).map(Self::new)
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn tools(&self) -> &ToolRegistry {
    &self.tools
  }

  pub fn player(&self) -> &Player {
    &self.player
  }

  pub fn start(&self) -> Coord {
    self.start
  }

  pub fn width(&self) -> u32 {
    self.board.width()
  }

  pub fn height(&self) -> u32 {
    self.board.height()
  }

  pub fn tile_colour(&self, at: Coord) -> Option<Colour> {
    self.board.colour(at)
  }

  pub fn tile_type(&self, at: Coord) -> Option<TileType> {
    self.board.tile_type(at)
  }

  pub fn solution_colour(&self, at: Coord) -> Option<Colour> {
    self.board.solution_colour(at)
  }

  /// Player-initiated moves so far.
  pub fn moves(&self) -> u32 {
    self.moves
  }

  pub fn is_solved(&self) -> bool {
    self.solved
  }

  pub fn is_paused(&self) -> bool {
    self.paused
  }

  pub fn is_moving(&self) -> bool {
    self.motion.is_some()
  }

  /// Whether a new movement intent would be listened to right now.
  pub fn accepts_input(&self) -> bool {
    self.player.can_move() && !self.paused && self.motion.is_none()
  }

  /// Take everything that happened since the last call.
  pub fn drain_events(&mut self) -> Vec<Event> {
    std::mem::take(&mut self.events)
  }

  /// Start a player-initiated move. Returns the number of cells the first
  /// leg of the move will cross; zero means the intent was ignored.
  pub fn begin_move(&mut self, direction: Direction) -> u32 {
    if !self.accepts_input() {
      debug!("ignoring {:?}: input is latched", direction);
      return 0;
    }
    self.launches.clear();
    self.launches.insert((self.player.position(), direction));
    let units = self.launch(direction);
    if units == 0 {
      trace!("{:?} from {} goes nowhere", direction, self.player.position());
    }
    units
  }

  fn launch(&mut self, direction: Direction) -> u32 {
    let from = self.player.position();
    let resolution =
      movement::resolve(&self.board, &self.tools, from, direction);
    if resolution.units > 0 {
      debug!(
        "moving {:?} from {} to {} ({} cells)",
        direction, from, resolution.destination, resolution.units
      );
      self.player.face(direction);
      self.motion = Some(Motion {
        direction,
        remaining: resolution.units,
      });
    }
    resolution.units
  }

  /// Carry the move in flight across one more cell.
  pub fn step(&mut self) -> Step {
    let Some(motion) = self.motion else {
      return Step::Idle;
    };
    if self.paused {
      return Step::Paused;
    }

    if !self.cross(motion.direction) {
      // The path was checked when the move began, so this only happens if
      // something moved the player off it.
      self.motion = None;
      return self.settle();
    }
    let here = self.player.position();

    let remaining = motion.remaining - 1;
    if remaining > 0 {
      self.motion = Some(Motion {
        remaining,
        ..motion
      });
      return Step::Moved(here);
    }

    self.motion = None;
    if let Some(extra) = self.player.take_extra_move() {
      // Tools that bounce the player between each other would never let the
      // chain end.
      if !self.launches.insert((here, extra)) {
        debug!("move chain repeats {:?} from {}, stopping", extra, here);
      } else if self.launch(extra) > 0 {
        return Step::Moved(here);
      }
    }
    self.settle()
  }

  /// Move onto the next cell, fire whatever tool is there, then paint.
  fn cross(&mut self, direction: Direction) -> bool {
    let from = self.player.position();
    let Some(to) = direction.step(from).filter(|c| self.board.contains(*c))
    else {
      return false;
    };
    self.player.place(to);
    self.events.push(Event::Stepped { to });

    if let Some(tool) = self.tools.get(to) {
      trace!("activating {:?} at {}", tool, to);
      self.events.push(Event::ToolActivated {
        at: to,
        tool: tool.clone(),
      });
      tool.perform_action(to, &mut self.player, &mut self.board);
      let landed = self.player.position();
      if landed != to {
        self.events.push(Event::Teleported {
          from: to,
          to: landed,
        });
      }
    }

    self.player.mark(&mut self.board);
    for at in self.board.take_changes() {
      if let Some(colour) = self.board.colour(at) {
        self.events.push(Event::Painted { at, colour });
      }
    }
    true
  }

  fn settle(&mut self) -> Step {
    self.moves += 1;
    self.check_solved();
    Step::Settled(self.player.position())
  }

  /// Run a whole player-initiated move, including any moves tools tack on.
  pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
    let mut cells_crossed = Vec::new();
    if self.begin_move(direction) > 0 {
      loop {
        match self.step() {
          Step::Moved(at) => cells_crossed.push(at),
          Step::Settled(at) => {
            cells_crossed.push(at);
            break;
          }
          Step::Idle | Step::Paused => break,
        }
      }
    }
    MoveOutcome {
      cells_crossed,
      solved: self.solved,
    }
  }

  /// See whether the picture is finished. Returns true only the first time it
  /// is noticed.
  pub fn check_solved(&mut self) -> bool {
    if self.solved || !self.board.is_complete() {
      return false;
    }
    info!("puzzle solved in {} moves", self.moves);
    self.solved = true;
    self.player.freeze();
    self.events.push(Event::Solved);
    true
  }

  /// Put everything back the way it was when the level was loaded. A move in
  /// flight is dropped where it is.
  pub fn reset(&mut self) {
    if self.motion.is_some() {
      debug!("reset abandons a move at {}", self.player.position());
    }
    self.board.clear(self.initial_correct);
    self.player = Player::new(self.start);
    self.motion = None;
    self.launches.clear();
    self.moves = 0;
    self.solved = false;
    self.paused = false;

    self.events.clear();
    self.events.push(Event::Reset);
    self.cue_animations(true);
    debug!("puzzle reset");
  }

  /// Freeze movement and tool animations. Does nothing once solved.
  pub fn pause(&mut self) {
    if self.paused || self.solved {
      return;
    }
    debug!("paused");
    self.paused = true;
    self.cue_animations(false);
  }

  pub fn resume(&mut self) {
    if !self.paused {
      return;
    }
    debug!("resumed");
    self.paused = false;
    self.cue_animations(true);
  }

  pub fn toggle_pause(&mut self) {
    if self.paused {
      self.resume();
    } else {
      self.pause();
    }
  }

  fn cue_animations(&mut self, running: bool) {
    for (at, tool) in self.tools.iter() {
      self.events.push(Event::ToolAnimation {
        at,
        animation: tool.animation(),
        running,
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn c(x: u32, y: u32) -> Coord {
    Coord::new(x, y)
  }

  /// Picker at (1, 0); both default cells want red.
  const PICK_AND_PAINT: &str = "3\n1\ndd.\n0\n0\n1\ncr\n1\n0\nrr.\n";

  /// Slide right over ice into an up-arrow at (2, 0), which carries on to
  /// (2, 1).
  const REDIRECT: &str = "3\n2\n..d\ndii\n0\n0\n1\nru\n2\n0\n...\nr..\n";

  /// Teleporters at (1, 0) and (3, 0), the far one on ice.
  const TELEPORT: &str = "5\n1\ndd.ii\n0\n0\n1\nt\n1\n0\n3\n0\nr....\n";

  /// 2x2, red wanted in the bottom-left corner, picker at (1, 0).
  const CORNER: &str = "2\n2\ndd\ndd\n0\n0\n1\ncr\n1\n0\n..\nr.\n";

  #[test]
  fn moving_paints_and_counts() {
    let mut p = Puzzle::load(PICK_AND_PAINT).unwrap();
    assert_eq!(p.board().correct_tiles(), 1);

    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(1, 0)]);
    assert!(!out.solved);
    assert_eq!(p.player().colour(), Colour::Red);
    assert_eq!(p.tile_colour(c(1, 0)), Some(Colour::Red));
    assert_eq!(p.moves(), 1);

    // Blank ahead: nothing happens, and it isn't a move.
    let out = p.move_player(Direction::Right);
    assert!(!out.moved());
    assert_eq!(p.moves(), 1);

    let out = p.move_player(Direction::Left);
    assert!(out.solved);
    assert!(p.is_solved());
    assert_eq!(p.moves(), 2);
    assert!(!p.player().can_move());
    assert!(!p.accepts_input());

    let events = p.drain_events();
    assert_eq!(events.iter().filter(|e| **e == Event::Solved).count(), 1);
    assert!(events.contains(&Event::Painted {
      at: c(0, 0),
      colour: Colour::Red
    }));
  }

  #[test]
  fn win_is_only_signalled_once() {
    let mut p = Puzzle::load(PICK_AND_PAINT).unwrap();
    p.move_player(Direction::Right);
    p.move_player(Direction::Left);
    assert!(p.is_solved());
    p.drain_events();

    assert!(!p.check_solved());
    assert!(!p.check_solved());
    assert!(p.drain_events().is_empty());
    // Input is frozen, so moving does nothing either.
    assert!(!p.move_player(Direction::Right).moved());
    assert_eq!(p.moves(), 2);
  }

  #[test]
  fn redirection_is_not_a_move() {
    let mut p = Puzzle::load(REDIRECT).unwrap();
    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(1, 0), c(2, 0), c(2, 1)]);
    assert_eq!(p.player().position(), c(2, 1));
    assert_eq!(p.moves(), 1);
    assert_eq!(p.player().pending_extra_move(), None);

    // Back down onto the arrow, which sends the player straight back up.
    let out = p.move_player(Direction::Down);
    assert_eq!(out.cells_crossed, vec![c(2, 0), c(2, 1)]);
    assert_eq!(p.moves(), 2);
    assert_eq!(p.player().last_direction(), Direction::Up);
  }

  #[test]
  fn teleporting_onto_ice_keeps_going() {
    let mut p = Puzzle::load(TELEPORT).unwrap();
    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(3, 0), c(4, 0)]);
    assert_eq!(p.moves(), 1);
    assert!(p.drain_events().contains(&Event::Teleported {
      from: c(1, 0),
      to: c(3, 0)
    }));

    // Sliding left stops on the teleporter, which lands on default ground.
    let out = p.move_player(Direction::Left);
    assert_eq!(out.cells_crossed, vec![c(1, 0)]);
    assert_eq!(p.player().position(), c(1, 0));
    assert_eq!(p.moves(), 2);
  }

  #[test]
  fn reset_restores_the_loaded_count() {
    let mut p = Puzzle::load(CORNER).unwrap();
    let initial = p.board().correct_tiles();
    assert_eq!(initial, 3);

    p.move_player(Direction::Right);
    assert_eq!(p.board().correct_tiles(), 2);
    p.move_player(Direction::Left);
    assert_eq!(p.board().correct_tiles(), 3);
    p.move_player(Direction::Up);
    assert_eq!(p.board().correct_tiles(), 2);

    p.reset();
    assert_eq!(p.board().correct_tiles(), initial);
    assert_eq!(p.board().correct_tiles(), p.board().count_correct());
    for y in 0..2 {
      for x in 0..2 {
        assert_eq!(p.tile_colour(c(x, y)), Some(Colour::White));
      }
    }
    assert_eq!(p.player(), &Player::new(c(0, 0)));
    assert_eq!(p.moves(), 0);
    assert!(!p.is_solved());

    let events = p.drain_events();
    assert_eq!(events[0], Event::Reset);
    assert!(events.contains(&Event::ToolAnimation {
      at: c(1, 0),
      animation: Animation::Rotate,
      running: true
    }));
  }

  #[test]
  fn reset_after_solving_unfreezes() {
    let mut p = Puzzle::load(PICK_AND_PAINT).unwrap();
    p.move_player(Direction::Right);
    p.move_player(Direction::Left);
    assert!(p.is_solved());
    p.reset();
    assert!(!p.is_solved());
    assert!(p.accepts_input());
    assert!(p.move_player(Direction::Right).moved());
  }

  #[test]
  fn pause_holds_a_move_in_place() {
    let mut p = Puzzle::load(REDIRECT).unwrap();
    assert_eq!(p.begin_move(Direction::Right), 2);
    assert_eq!(p.step(), Step::Moved(c(1, 0)));

    p.pause();
    assert_eq!(p.step(), Step::Paused);
    assert_eq!(p.step(), Step::Paused);
    assert_eq!(p.player().position(), c(1, 0));
    assert_eq!(p.begin_move(Direction::Left), 0);

    p.resume();
    assert_eq!(p.step(), Step::Moved(c(2, 0)));
    assert_eq!(p.step(), Step::Settled(c(2, 1)));
    assert_eq!(p.step(), Step::Idle);
    assert_eq!(p.moves(), 1);
  }

  #[test]
  fn input_is_latched_while_moving() {
    let mut p = Puzzle::load(REDIRECT).unwrap();
    p.begin_move(Direction::Right);
    assert!(p.is_moving());
    assert_eq!(p.begin_move(Direction::Up), 0);
    assert!(!p.move_player(Direction::Up).moved());
  }

  #[test]
  fn reset_abandons_a_move() {
    let mut p = Puzzle::load(REDIRECT).unwrap();
    p.begin_move(Direction::Right);
    p.step();
    p.pause();
    p.reset();
    assert!(!p.is_moving());
    assert!(!p.is_paused());
    assert_eq!(p.step(), Step::Idle);
    assert_eq!(p.player().position(), c(0, 0));
    assert_eq!(p.tile_colour(c(1, 0)), Some(Colour::White));
    assert_eq!(p.moves(), 0);
  }

  #[test]
  fn pause_is_refused_once_solved() {
    let mut p = Puzzle::load(PICK_AND_PAINT).unwrap();
    p.move_player(Direction::Right);
    p.move_player(Direction::Left);
    p.pause();
    assert!(!p.is_paused());

    let mut p = Puzzle::load(PICK_AND_PAINT).unwrap();
    p.toggle_pause();
    assert!(p.is_paused());
    assert!(!p.move_player(Direction::Right).moved());
    p.toggle_pause();
    assert!(!p.is_paused());
    let events = p.drain_events();
    let cues: Vec<bool> = events
      .iter()
      .filter_map(|e| match e {
        Event::ToolAnimation { running, .. } => Some(*running),
        _ => None,
      })
      .collect();
    assert_eq!(cues, vec![false, true]);
  }

  #[test]
  fn eraser_wipes_as_it_goes() {
    let mut p =
      Puzzle::load("3\n1\nddd\n1\n0\n2\ncr\n0\n0\ne\n2\n0\n...\n").unwrap();
    p.move_player(Direction::Left);
    p.move_player(Direction::Right);
    assert_eq!(p.tile_colour(c(0, 0)), Some(Colour::Red));
    assert_eq!(p.tile_colour(c(1, 0)), Some(Colour::Red));

    p.move_player(Direction::Right);
    assert!(p.player().is_erasing());
    p.move_player(Direction::Left);
    assert_eq!(p.tile_colour(c(1, 0)), Some(Colour::White));
    assert_eq!(p.tile_colour(c(0, 0)), Some(Colour::Red));
    assert_eq!(p.board().correct_tiles(), p.board().count_correct());
  }

  #[test]
  fn dark_tiles_stop_but_stay_white() {
    let mut p = Puzzle::load("3\n1\ndrd\n0\n0\n1\ncb\n0\n0\n..b\n").unwrap();
    // The picker under the start cell only fires when walked onto.
    assert_eq!(p.player().colour(), Colour::White);
    p.move_player(Direction::Right);
    p.move_player(Direction::Left);
    assert_eq!(p.player().colour(), Colour::Blue);
    p.move_player(Direction::Right);
    assert_eq!(p.player().position(), c(1, 0));
    assert_eq!(p.tile_colour(c(1, 0)), Some(Colour::White));
  }

  /// Arrows at (1, 0) and (2, 0) pointing at each other.
  const PING_PONG: &str = "3\n1\nddd\n0\n0\n2\nrr\n1\n0\nrl\n2\n0\n.r.\n";

  #[test]
  fn arrows_bouncing_the_player_still_settle() {
    let mut p = Puzzle::load(PING_PONG).unwrap();
    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(1, 0), c(2, 0), c(1, 0)]);
    assert!(!out.solved);
    assert_eq!(p.moves(), 1);
    assert!(!p.is_moving());
    assert!(p.accepts_input());
    assert_eq!(p.player().pending_extra_move(), None);

    // The same chain again from where it stopped also ends.
    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(2, 0), c(1, 0)]);
    assert_eq!(p.moves(), 2);
  }

  #[test]
  fn bouncing_by_hand_ends_and_can_be_reset() {
    let mut p = Puzzle::load(PING_PONG).unwrap();
    assert_eq!(p.begin_move(Direction::Right), 1);
    let mut settled = None;
    for _ in 0..100 {
      match p.step() {
        Step::Moved(_) => {}
        Step::Settled(at) => {
          settled = Some(at);
          break;
        }
        other => panic!("unexpected {:?}", other),
      }
    }
    assert_eq!(settled, Some(c(1, 0)));
    assert_eq!(p.step(), Step::Idle);

    p.begin_move(Direction::Right);
    p.step();
    p.reset();
    assert_eq!(p.step(), Step::Idle);
    assert_eq!(p.player().position(), c(0, 0));
  }

  #[test]
  fn pickers_on_ice_recolour_the_rest_of_the_slide() {
    let mut p =
      Puzzle::load("5\n1\ndiiid\n0\n0\n1\ncr\n2\n0\n.....\n").unwrap();
    let out = p.move_player(Direction::Right);
    assert_eq!(out.cells_crossed, vec![c(1, 0), c(2, 0), c(3, 0), c(4, 0)]);
    let row: Vec<_> = (0..5).filter_map(|x| p.tile_colour(c(x, 0))).collect();
    use Colour::{Red, White};
    assert_eq!(row, vec![White, White, Red, Red, Red]);
    assert_eq!(p.board().correct_tiles(), p.board().count_correct());
  }

  #[test]
  fn erasers_on_ice_wipe_the_rest_of_the_slide() {
    let mut p =
      Puzzle::load("5\n1\ndiiid\n0\n0\n2\ncr\n1\n0\ne\n3\n0\n.....\n")
        .unwrap();
    p.move_player(Direction::Right);
    let row: Vec<_> = (0..5).filter_map(|x| p.tile_colour(c(x, 0))).collect();
    use Colour::{Red, White};
    assert_eq!(row, vec![White, Red, Red, White, White]);
    assert!(p.player().is_erasing());
    assert_eq!(p.player().position(), c(4, 0));
  }
}
