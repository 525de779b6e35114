use aglet::{Coord, Grid};
use log::debug;
use nom::{
  branch::alt,
  character::complete::{
    line_ending, not_line_ending, one_of, satisfy, space0,
    u32 as decimal,
  },
  combinator::{consumed, eof, map, verify},
  error::{context, VerboseError},
  multi::count,
  sequence::{delimited, pair, terminated},
  Finish, IResult, Parser,
};

use crate::{
  board::Board,
  tools::{Tool, ToolRegistry, DEFAULT_SPLASH_RADIUS},
  Colour, Direction, Level, MalformedLevel, MalformedReason, Tile, TileType,
};

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Parse a string into a level.
pub fn parse_to_level(s: &str) -> Result<Level, MalformedLevel> {
  let (rest, raw) = level(s)
    .finish()
    .map_err(|e| MalformedLevel::from_verbose(s, e))?;
  if !rest.trim().is_empty() {
    debug!("ignoring {} bytes after the solution rows", rest.len());
  }
  raw.build(s)
}

/// A level as it is written, before any cross-checking.
struct RawLevel<'a> {
  width: u32,
  height: u32,
  /// Top row first.
  tiles: Vec<Vec<TileType>>,
  start: (&'a str, Coord),
  tools: Vec<(&'a str, Placement)>,
  /// Top row first.
  solution: Vec<Vec<Colour>>,
}

enum Placement {
  Single(Coord, Tool),
  Teleporters(Coord, Coord),
}

fn level(s: &str) -> PResult<RawLevel> {
  let (s, width) = dimension("width")(s)?;
  let (s, height) = dimension("height")(s)?;
  let (s, tiles) = count(
    row("a row of tile codes", width, TileType::from_code),
    height as usize,
  )(s)?;
  let (s, start) = consumed(coord("player start x", "player start y"))(s)?;
  let (s, tool_count) = number("tool count")(s)?;
  let (s, tools) = count(consumed(tool), tool_count as usize)(s)?;
  let (s, solution) = count(
    row("a row of solution colours", width, Colour::from_code),
    height as usize,
  )(s)?;

  Ok((
    s,
    RawLevel {
      width,
      height,
      tiles,
      start,
      tools,
      solution,
    },
  ))
}

fn tool(s: &str) -> PResult<Placement> {
  let (s, kind) =
    context("tool type (c, s, l, e, t or r)", one_of("cslter"))(s)?;
  match kind {
    'c' => {
      let (s, colour) = header(Colour::from_code)(s)?;
      let (s, at) = coord("tool x", "tool y")(s)?;
      Ok((s, Placement::Single(at, Tool::ColourPicker { colour })))
    }
    's' => {
      let (s, colour) = header(Colour::from_code)(s)?;
      let (s, at) = coord("tool x", "tool y")(s)?;
      let splash = Tool::Splash {
        colour,
        radius: DEFAULT_SPLASH_RADIUS,
      };
      Ok((s, Placement::Single(at, splash)))
    }
    'l' => {
      let (s, colour) = header(Colour::from_code)(s)?;
      let (s, n) = number("line-shot direction count")(s)?;
      let (s, directions) = context(
        "line-shot directions",
        line(count(map(code_char, Direction::from_code), n as usize)),
      )(s)?;
      let (s, at) = coord("tool x", "tool y")(s)?;
      let shot = Tool::LineShot { colour, directions };
      Ok((s, Placement::Single(at, shot)))
    }
    'e' => {
      let (s, _) = line(space0)(s)?;
      let (s, at) = coord("tool x", "tool y")(s)?;
      Ok((s, Placement::Single(at, Tool::Eraser)))
    }
    't' => {
      let (s, _) = line(space0)(s)?;
      let (s, a) = coord("teleporter x", "teleporter y")(s)?;
      let (s, b) = coord("partner teleporter x", "partner teleporter y")(s)?;
      Ok((s, Placement::Teleporters(a, b)))
    }
    // one_of only lets 'r' through to here
    _ => {
      let (s, direction) = header(Direction::from_code)(s)?;
      let (s, at) = coord("tool x", "tool y")(s)?;
      Ok((s, Placement::Single(at, Tool::Redirection { direction })))
    }
  }
}

/// The code character straight after a tool's type character.
fn header<'a, O>(
  decode: fn(char) -> O,
) -> impl FnMut(&'a str) -> PResult<'a, O> {
  context("tool code", line(map(code_char, decode)))
}

fn code_char(s: &str) -> PResult<char> {
  satisfy(|c| c != '\r' && c != '\n')(s)
}

fn coord<'a>(
  x_label: &'static str,
  y_label: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, Coord> {
  map(pair(number(x_label), number(y_label)), |(x, y)| Coord::new(x, y))
}

fn dimension<'a>(
  label: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, u32> {
  context(label, verify(number(label), |n: &u32| *n > 0))
}

fn number<'a>(
  label: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, u32> {
  context(label, terminated(delimited(space0, decimal, space0), end_of_line))
}

/// At least `width` codes; anything past them on the line is ignored.
fn row<'a, T>(
  label: &'static str,
  width: u32,
  decode: fn(char) -> T,
) -> impl FnMut(&'a str) -> PResult<'a, Vec<T>> {
  let width = width as usize;
  context(
    label,
    map(
      terminated(
        verify(not_line_ending, move |l: &str| l.chars().count() >= width),
        end_of_line,
      ),
      move |l: &str| l.chars().take(width).map(decode).collect(),
    ),
  )
}

/// Run `inner`, then throw away the rest of the line.
fn line<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
  F: Parser<&'a str, O, VerboseError<&'a str>>,
{
  terminated(inner, pair(not_line_ending, end_of_line))
}

fn end_of_line(s: &str) -> PResult<&str> {
  alt((line_ending, eof))(s)
}

impl<'a> RawLevel<'a> {
  fn build(self, text: &str) -> Result<Level, MalformedLevel> {
    let mut tiles = Grid::new(self.width, self.height);
    let mut solution = Grid::new(self.width, self.height);
    let rows = self.tiles.iter().zip(&self.solution);
    for (row, (kinds, colours)) in rows.enumerate() {
      // The first line written is the top of the grid.
      let y = self.height - 1 - row as u32;
      for (x, (&kind, &colour)) in kinds.iter().zip(colours).enumerate() {
        let coord = Coord::new(x as u32, y);
        tiles.insert(coord, Tile::new(kind));
        solution.insert(coord, Tile { kind, colour });
      }
    }
    let board = Board::new(tiles, solution);

    let (start_text, start) = self.start;
    check_bounds(text, start_text, &board, "player start", start)?;

    let mut tools = ToolRegistry::new();
    let mut pairs = 0;
    for (tool_text, placement) in self.tools {
      match placement {
        Placement::Single(at, tool) => {
          place(text, tool_text, &board, &mut tools, at, tool)?;
        }
        Placement::Teleporters(a, b) => {
          let there = Tool::Teleporter {
            partner: b,
            pair: pairs,
          };
          let back = Tool::Teleporter {
            partner: a,
            pair: pairs,
          };
          place(text, tool_text, &board, &mut tools, a, there)?;
          place(text, tool_text, &board, &mut tools, b, back)?;
          pairs += 1;
        }
      }
    }

    debug!(
      "decoded {}x{} level: {} tools, {} teleporter pairs, {}/{} correct",
      board.width(),
      board.height(),
      tools.len(),
      pairs,
      board.correct_tiles(),
      board.area(),
    );
    Ok(Level::new(board, tools, start))
  }
}

fn check_bounds(
  text: &str,
  at_text: &str,
  board: &Board,
  what: &'static str,
  at: Coord,
) -> Result<(), MalformedLevel> {
  if board.contains(at) {
    Ok(())
  } else {
    Err(MalformedLevel::at(
      text,
      at_text,
      MalformedReason::OutOfBounds {
        what,
        x: at.x,
        y: at.y,
      },
    ))
  }
}

fn place(
  text: &str,
  tool_text: &str,
  board: &Board,
  tools: &mut ToolRegistry,
  at: Coord,
  tool: Tool,
) -> Result<(), MalformedLevel> {
  check_bounds(text, tool_text, board, "tool", at)?;
  tools.insert(at, tool).map_err(|_| {
    MalformedLevel::at(
      text,
      tool_text,
      MalformedReason::ToolOverlap { x: at.x, y: at.y },
    )
  })
}
