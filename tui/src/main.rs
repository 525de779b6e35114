mod harness;

use std::{
  fs,
  ops::Range,
  path::{Path, PathBuf},
  time::Duration,
};

use ariadne::{Label, Report, ReportKind, Source};
use argh::FromArgs;
use eyre::{eyre, WrapErr};
use harness::PlayHarness;
use log::info;
use terminal_paintslide::{
  session::{LevelSession, LevelSource},
  MalformedLevel,
};

fn main() -> eyre::Result<()> {
  let args: ArgsEntrypoint = argh::from_env();

  match args.sub {
    Subcommands::Play(play) => play.run()?,
    Subcommands::Check(check) => check.run()?,
  }

  Ok(())
}

#[derive(FromArgs, Debug)]
/// A terminal tile-painting puzzle. Slide around, pick up colours, and make
/// the floor match the picture.
struct ArgsEntrypoint {
  #[argh(subcommand)]
  sub: Subcommands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Subcommands {
  Play(CmdPlay),
  Check(CmdCheck),
}

/// Play a level, or a directory of `level-N.txt` files, in the terminal.
///
/// Controls:
/// - Arrow keys or HJKL to move.
/// - R to reset the level.
/// - P or Esc to pause.
/// - Tab to show the solution.
/// - N and B for the next and previous level.
/// - Q or Ctrl+C to quit.
/// - Ctrl+L to redraw the screen.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "play")]
struct CmdPlay {
  /// path to a level file, or a directory of them.
  #[argh(positional)]
  path: PathBuf,

  /// which level of the directory to start on.
  #[argh(option, default = "0")]
  level: usize,

  /// write logs to this file.
  #[argh(option)]
  log: Option<PathBuf>,

  /// milliseconds the player takes to cross one cell.
  #[argh(option, default = "120")]
  step_ms: u64,
}

impl CmdPlay {
  fn run(&self) -> eyre::Result<()> {
    if let Some(log) = &self.log {
      init_logging(log)?;
    }

    let levels = collect_levels(&self.path)?;
    let mut session = LevelSession::new(levels)
      .ok_or_else(|| eyre!("no levels found in {}", self.path.display()))?;
    if !session.select(self.level) {
      return Err(eyre!(
        "there is no level {}; found {}",
        self.level,
        session.len()
      ));
    }

    let puzzle = match session.load() {
      Ok(puzzle) => puzzle,
      Err(e) => {
        report(&session.current().name, &session.current().text, &e);
        return Err(eyre!("could not load {}", session.current().name));
      }
    };
    info!("playing {}", session.current().name);

    PlayHarness::enter(session, puzzle, Duration::from_millis(self.step_ms))?;
    Ok(())
  }
}

/// Decode level files and report anything wrong with them.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "check")]
struct CmdCheck {
  /// level files to check.
  #[argh(positional)]
  paths: Vec<PathBuf>,
}

impl CmdCheck {
  fn run(&self) -> eyre::Result<()> {
    let mut failed = 0;
    for path in &self.paths {
      let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading {}", path.display()))?;
      let name = path.display().to_string();
      match terminal_paintslide::parse_to_level(&text) {
        Ok(level) => println!(
          "{}: ok, {}x{} with {} tools",
          name,
          level.board().width(),
          level.board().height(),
          level.tools().len()
        ),
        Err(e) => {
          report(&name, &text, &e);
          failed += 1;
        }
      }
    }

    if failed > 0 {
      let total = self.paths.len();
      return Err(eyre!("{} of {} levels are malformed", failed, total));
    }
    Ok(())
  }
}

fn init_logging(path: &Path) -> eyre::Result<()> {
  let file = fs::File::create(path)
    .wrap_err_with(|| format!("creating log file {}", path.display()))?;
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  )
  .target(env_logger::Target::Pipe(Box::new(file)))
  .try_init()?;
  Ok(())
}

/// A directory yields its `level-N.txt` files ordered by N; anything else is
/// read as a single level.
fn collect_levels(path: &Path) -> eyre::Result<Vec<LevelSource>> {
  if !path.is_dir() {
    let text = fs::read_to_string(path)
      .wrap_err_with(|| format!("reading {}", path.display()))?;
    let name = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());
    return Ok(vec![LevelSource::new(name, text)]);
  }

  let mut numbered = Vec::new();
  for entry in fs::read_dir(path)? {
    let entry = entry?;
    let file_path = entry.path();
    let Some(n) = file_path
      .file_name()
      .and_then(|n| n.to_str())
      .and_then(level_number)
    else {
      continue;
    };
    let text = fs::read_to_string(&file_path)
      .wrap_err_with(|| format!("reading {}", file_path.display()))?;
    numbered.push((n, LevelSource::new(format!("level-{}", n), text)));
  }
  numbered.sort_by_key(|(n, _)| *n);
  Ok(numbered.into_iter().map(|(_, level)| level).collect())
}

fn level_number(file_name: &str) -> Option<u32> {
  file_name
    .strip_prefix("level-")?
    .strip_suffix(".txt")?
    .parse()
    .ok()
}

/// The rest of the line from `offset`, or at least one character, as a char
/// range. ariadne counts chars, not bytes.
fn error_span(text: &str, offset: usize) -> Range<usize> {
  let start = offset.min(text.len());
  let end = match text[start..].find(['\n', '\r']) {
    Some(0) => start + 1,
    Some(n) => start + n,
    None => text.len(),
  };
  let char_start = text[..start].chars().count();
  char_start..char_start + text[start..end].chars().count()
}

fn report(name: &str, text: &str, err: &MalformedLevel) {
  let span = error_span(text, err.offset);
  Report::build(ReportKind::Error, (), span.start)
    .with_message(format!("{} is malformed", name))
    .with_label(Label::new(span).with_message(err.reason.to_string()))
    .finish()
    .eprint(Source::from(text))
    .unwrap_or_else(|_| eprintln!("{}: {}", name, err));
}
