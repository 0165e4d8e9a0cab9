use derive_more::{Deref, DerefMut, From};
use std::fmt::{self, Display, Formatter};

/// The offset of a character in a string as the number of bytes preceding it in
/// UTF-8 encoding.
#[derive(
    Clone, Copy, Debug, Default, Deref, DerefMut, Eq, From, Hash, Ord, PartialEq, PartialOrd,
)]
#[from(forward)]
pub struct Offset(pub usize);

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position {
    /// Zero-based line index (`\n`-separated)
    pub line: usize,
    /// Zero-based character index (counting Unicode scalar values)
    pub character: usize,
}
impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}
impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Where an operation or item came from.
///
/// Operations created by passes inherit the location of the operation they
/// were derived from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Location {
    #[default]
    Unknown,
    Source(Position),
}
impl From<Position> for Location {
    fn from(position: Position) -> Self {
        Self::Source(position)
    }
}
impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "<unknown>"),
            Self::Source(position) => write!(f, "{position}"),
        }
    }
}
