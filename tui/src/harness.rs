//! Play harness

use std::{
  io::{self, Stdout, Write},
  time::{Duration, Instant},
};

use aglet::Coord;
use crossterm::{
  cursor::{Hide, MoveTo, Show},
  event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers},
  style::{
    Attribute, Attributes, Color, Colors, Print, ResetColor, SetAttributes,
    SetColors, SetForegroundColor,
  },
  terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
  },
  QueueableCommand,
};
use log::{debug, error, info, trace};
use terminal_paintslide::{
  session::LevelSession, tools::Tool, Colour, Direction, Event, Puzzle,
  TileType,
};

const START_X: u16 = 2;
const START_Y: u16 = 1;

const TILE_STRIDE_X: u16 = 2;

const BOARD_X: u16 = 4;
const BOARD_Y: u16 = 3;

const PANEL_GAP: u16 = 4;
const PANEL_WIDTH: usize = 36;

/// How long to wait for a key when nothing is moving.
const IDLE_POLL: Duration = Duration::from_millis(500);

pub struct PlayHarness {
  session: LevelSession,
  puzzle: Puzzle,
  step_time: Duration,
  last_step: Instant,

  show_solution: bool,
  animating: bool,
  /// Shown under the panel until the next key.
  notice: Option<String>,

  must_redraw: bool,
}

impl PlayHarness {
  /// Transfer runtime to the harness.
  /// This will only return once the player quits.
  pub fn enter(
    session: LevelSession,
    puzzle: Puzzle,
    step_time: Duration,
  ) -> io::Result<()> {
    let mut harness = Self {
      session,
      puzzle,
      step_time,
      last_step: Instant::now(),
      show_solution: false,
      animating: true,
      notice: None,
      must_redraw: true,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.queue(EnterAlternateScreen)?.queue(Hide)?.flush()?;

    let spun = harness.spin(&mut stdout);

    stdout.queue(Show)?.queue(LeaveAlternateScreen)?.flush()?;
    disable_raw_mode()?;

    spun
  }

  fn spin(&mut self, stdout: &mut Stdout) -> io::Result<()> {
    loop {
      self.draw(stdout)?;

      let stepping = self.puzzle.is_moving() && !self.puzzle.is_paused();
      let timeout = if stepping {
        self.step_time.saturating_sub(self.last_step.elapsed())
      } else {
        IDLE_POLL
      };

      if event::poll(timeout)? {
        if let TermEvent::Key(ev) = event::read()? {
          if matches!(ev.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            let quit = self.update(ev.code, ev.modifiers);
            if quit {
              break;
            }
          }
        }
      }

      if self.puzzle.is_moving()
        && !self.puzzle.is_paused()
        && self.last_step.elapsed() >= self.step_time
      {
        let step = self.puzzle.step();
        trace!("{:?}", step);
        self.last_step = Instant::now();
      }
      self.handle_events();
    }

    Ok(())
  }

  /// return whether to quit
  fn update(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
    self.notice = None;

    if key == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
      return true;
    }
    if key == KeyCode::Char('l') && mods.contains(KeyModifiers::CONTROL) {
      self.must_redraw = true;
      return false;
    }

    let direction = match key {
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => {
        Some(Direction::Left)
      }
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => {
        Some(Direction::Right)
      }
      KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
        Some(Direction::Up)
      }
      KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
        Some(Direction::Down)
      }
      _ => None,
    };
    if let Some(direction) = direction {
      if self.puzzle.begin_move(direction) > 0 {
        self.last_step = Instant::now();
      }
      return false;
    }

    match key {
      KeyCode::Char('q') => return true,
      KeyCode::Char('r') => self.puzzle.reset(),
      KeyCode::Char('p') | KeyCode::Esc => {
        if self.puzzle.is_solved() {
          self.notice = Some("Nothing to pause.".to_owned());
        }
        self.puzzle.toggle_pause();
      }
      KeyCode::Tab => self.show_solution = !self.show_solution,
      KeyCode::Char('n') => self.change_level(true),
      KeyCode::Char('b') => self.change_level(false),
      _ => {}
    }
    false
  }

  fn change_level(&mut self, forward: bool) {
    let moved = if forward {
      self.session.next_level()
    } else {
      self.session.previous_level()
    };
    if !moved {
      self.notice = Some(if forward {
        "That was the last level.".to_owned()
      } else {
        "This is the first level.".to_owned()
      });
      return;
    }

    let name = self.session.current().name.clone();
    match self.session.load() {
      Ok(puzzle) => {
        info!("playing {}", name);
        self.puzzle = puzzle;
        self.show_solution = false;
        self.animating = true;
        self.must_redraw = true;
      }
      Err(e) => {
        error!("refusing {}: {}", name, e);
        self.notice = Some(format!("{} is malformed: {}", name, e));
        // Step back onto the level still being played.
        if forward {
          self.session.previous_level();
        } else {
          self.session.next_level();
        }
      }
    }
  }

  fn handle_events(&mut self) {
    for ev in self.puzzle.drain_events() {
      match ev {
        Event::ToolAnimation { running, .. } => self.animating = running,
        Event::Solved => {
          let name = &self.session.current().name;
          info!("solved {} in {} moves", name, self.puzzle.moves());
        }
        Event::Reset => self.must_redraw = true,
        Event::Teleported { from, to } => {
          debug!("teleported from {} to {}", from, to)
        }
        other => trace!("{:?}", other),
      }
    }
  }

  fn draw(&mut self, stdout: &mut Stdout) -> io::Result<()> {
    if self.must_redraw {
      stdout.queue(ResetColor)?.queue(Clear(ClearType::All))?;
      self.must_redraw = false;
    }

    let title = format!(
      "{} ({} of {}){}",
      self.session.current().name,
      self.session.index() + 1,
      self.session.len(),
      if self.show_solution { " - solution" } else { "" },
    );
    stdout
      .queue(MoveTo(START_X, START_Y))?
      .queue(ResetColor)?
      .queue(SetAttributes(Attribute::Bold.into()))?
      .queue(Print(format!("{:<width$}", title, width = PANEL_WIDTH)))?
      .queue(SetAttributes(Attribute::Reset.into()))?;

    let width = self.puzzle.width();
    let height = self.puzzle.height();
    let player = self.puzzle.player().position();
    for y in 0..height {
      for x in 0..width {
        let coord = Coord::new(x, y);
        let (text, cols, fmt) = self.cell_display(coord, coord == player);
        let screenpos = grid_to_screen(coord, height);
        stdout
          .queue(MoveTo(screenpos.0, screenpos.1))?
          .queue(SetColors(cols))?
          .queue(SetAttributes(fmt))?
          .queue(Print(text))?;
      }
    }
    stdout
      .queue(SetAttributes(Attribute::Reset.into()))?
      .queue(ResetColor)?;

    self.draw_panel(stdout, width)?;
    stdout.flush()?;
    Ok(())
  }

  fn draw_panel(&self, stdout: &mut Stdout, width: u32) -> io::Result<()> {
    let x = clamp_u16(width)
      .saturating_mul(TILE_STRIDE_X)
      .saturating_add(BOARD_X + PANEL_GAP);
    let held = self.puzzle.player();
    let brush = if held.is_erasing() {
      "eraser".to_owned()
    } else {
      format!("{:?}", held.colour())
    };

    let mut lines = vec![
      (format!("Moves: {}", self.puzzle.moves()), Color::Reset),
      (
        format!(
          "Correct: {}/{}",
          self.puzzle.board().correct_tiles(),
          self.puzzle.board().area()
        ),
        Color::Reset,
      ),
      (
        format!("Holding: {}", brush),
        colour_rgb(held.colour(), TileType::Default),
      ),
      (String::new(), Color::Reset),
    ];
    if self.puzzle.is_solved() {
      let next = if self.session.is_at_last() {
        "That was the last level!"
      } else {
        "Press N for the next level."
      };
      lines.push(("Solved!".to_owned(), Color::Green));
      lines.push((next.to_owned(), Color::Green));
    } else if self.puzzle.is_paused() {
      lines.push(("Paused. P to resume.".to_owned(), Color::Yellow));
      lines.push(("R reset, Q quit.".to_owned(), Color::Yellow));
    } else {
      lines.push((String::new(), Color::Reset));
      lines.push((String::new(), Color::Reset));
    }
    lines.push((String::new(), Color::Reset));
    lines.push((self.notice.clone().unwrap_or_default(), Color::Red));

    for (i, (text, color)) in lines.into_iter().enumerate() {
      stdout
        .queue(MoveTo(x, BOARD_Y + i as u16))?
        .queue(SetForegroundColor(color))?
        .queue(Print(format!("{:<width$}", text, width = PANEL_WIDTH)))?;
    }
    stdout.queue(ResetColor)?;
    Ok(())
  }

  fn cell_display(
    &self,
    coord: Coord,
    has_player: bool,
  ) -> (String, Colors, Attributes) {
    let Some(tile) = self.puzzle.board().tile(coord) else {
      return blank_display();
    };
    if tile.kind == TileType::Blank {
      return blank_display();
    }

    let colour = if self.show_solution {
      self.puzzle.solution_colour(coord).unwrap_or(Colour::White)
    } else {
      tile.colour
    };
    let bg = if tile.kind == TileType::Dark {
      Color::DarkGrey
    } else {
      colour_rgb(colour, tile.kind)
    };

    if has_player {
      let ink = colour_rgb(self.puzzle.player().colour(), TileType::Default);
      let ink = if self.puzzle.player().colour().is_white() {
        Color::Black
      } else {
        ink
      };
      return (
        "@ ".to_owned(),
        Colors::new(ink, bg),
        Attributes::default() | Attribute::Bold,
      );
    }

    if let Some(tool) = self.puzzle.tools().get(coord) {
      let fmt = if self.animating {
        Attributes::default() | Attribute::Bold
      } else {
        Attribute::Dim.into()
      };
      let ink = match tool.colour() {
        Colour::White => Color::Black,
        c => colour_rgb(c, TileType::Default),
      };
      return (
        format!("{} ", tool_glyph(tool)),
        Colors::new(ink, bg),
        fmt,
      );
    }

    let text = if tile.kind == TileType::Dark { "::" } else { "  " };
    (
      text.to_owned(),
      Colors::new(Color::Grey, bg),
      Attribute::NormalIntensity.into(),
    )
  }
}

fn tool_glyph(tool: &Tool) -> char {
  match tool {
    Tool::ColourPicker { .. } => 'c',
    Tool::Splash { .. } => '*',
    Tool::LineShot { .. } => '+',
    Tool::Eraser => 'x',
    Tool::Redirection { direction } => match direction {
      Direction::Up => '^',
      Direction::Down => 'v',
      Direction::Left => '<',
      Direction::Right => '>',
    },
    Tool::Teleporter { .. } => 'O',
  }
}

/// Ice is drawn in a paler tint of the same colour.
fn colour_rgb(colour: Colour, kind: TileType) -> Color {
  let ice = kind == TileType::Ice;
  let (r, g, b) = match (colour, ice) {
    (Colour::Red, false) => (255, 33, 33),
    (Colour::Blue, false) => (0, 114, 188),
    (Colour::Yellow, false) => (253, 253, 34),
    (Colour::Orange, false) => (255, 111, 24),
    (Colour::Purple, false) => (170, 79, 238),
    (Colour::Green, false) => (52, 204, 63),
    (Colour::White, false) => (255, 255, 255),
    (Colour::Red, true) => (255, 113, 113),
    (Colour::Blue, true) => (108, 163, 199),
    (Colour::Yellow, true) => (255, 255, 148),
    (Colour::Orange, true) => (255, 161, 105),
    (Colour::Purple, true) => (193, 135, 236),
    (Colour::Green, true) => (124, 221, 131),
    (Colour::White, true) => (212, 236, 250),
  };
  Color::Rgb { r, g, b }
}

fn blank_display() -> (String, Colors, Attributes) {
  (
    "  ".to_owned(),
    Colors::new(Color::Reset, Color::Reset),
    Attribute::NormalIntensity.into(),
  )
}

/// Row 0 is the bottom of the board. Cells past the edge of what a terminal
/// can address pile up on its last column or row.
fn grid_to_screen(coord: Coord, height: u32) -> (u16, u16) {
  let row = height.saturating_sub(1).saturating_sub(coord.y);
  (
    clamp_u16(coord.x)
      .saturating_mul(TILE_STRIDE_X)
      .saturating_add(BOARD_X),
    clamp_u16(row).saturating_add(BOARD_Y),
  )
}

fn clamp_u16(n: u32) -> u16 {
  u16::try_from(n).unwrap_or(u16::MAX)
}
