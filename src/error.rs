use nom::{
  error::{VerboseError, VerboseErrorKind},
  Offset,
};

/// A level's text could not be decoded. Nothing of the level is usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed level at line {line}: {reason}")]
pub struct MalformedLevel {
  /// Byte offset into the level text.
  pub offset: usize,
  /// One-based line number.
  pub line: usize,
  pub reason: MalformedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
  #[error("expected {0}")]
  Expected(&'static str),
  #[error("{what} ({x}, {y}) lies outside the grid")]
  OutOfBounds { what: &'static str, x: u32, y: u32 },
  #[error("more than one tool at ({x}, {y})")]
  ToolOverlap { x: u32, y: u32 },
}

impl MalformedLevel {
  /// `at` must be a slice of `text`.
  pub(crate) fn at(text: &str, at: &str, reason: MalformedReason) -> Self {
    let offset = text.offset(at);
    let line = text[..offset].matches('\n').count() + 1;
    Self {
      offset,
      line,
      reason,
    }
  }

  /// Pick the innermost context label out of a parse failure.
  pub(crate) fn from_verbose(text: &str, err: VerboseError<&str>) -> Self {
    let expected = err
      .errors
      .iter()
      .find_map(|(_, kind)| match kind {
        VerboseErrorKind::Context(label) => Some(*label),
        _ => None,
      })
      .unwrap_or("a well-formed level");
    let at = err.errors.first().map_or(text, |(input, _)| *input);
    Self::at(text, at, MalformedReason::Expected(expected))
  }
}
