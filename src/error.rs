//! Error types for coordinates, parsing, and tree mutation.

use thiserror::Error;

use crate::constants::MAX_BOARD_SIZE;
use crate::node::NodeId;

/// An argument outside the bounds of the coordinate codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("coordinate must be between 1 and {max}: {0}", max = MAX_BOARD_SIZE)]
    CoordinateOutOfRange(u32),

    #[error("a letter coordinate must be made of 1 or 2 characters: '{0}'")]
    LetterLength(String),

    #[error("a letter coordinate must be made of uppercase letters excluding 'I': '{0}'")]
    InvalidLetter(String),

    #[error("a letter coordinate must be between 'A' and 'CY': '{0}'")]
    LetterOutOfRange(String),

    #[error("a number coordinate must be an integer between 1 and {max}: '{0}'", max = MAX_BOARD_SIZE)]
    InvalidNumber(String),

    #[error("board size must be between 1 and {max}: {0}", max = MAX_BOARD_SIZE)]
    BoardSizeOutOfRange(u32),

    #[error("a position must be made of 2 to 4 characters: '{0}'")]
    PositionLength(String),

    #[error("position not valid for board size {board_size}: '{position}'")]
    PositionOffBoard { position: String, board_size: u32 },

    #[error("location not valid for board size {board_size}: {location}")]
    LocationOffBoard { location: u32, board_size: u32 },

    #[error("SGF point '{point}' is not on a {board_size}x{board_size} board")]
    InvalidSgfPoint { point: String, board_size: u32 },
}

/// What went wrong while reading SGF text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("no game tree found")]
    NoGameTree,

    #[error("game tree is not closed")]
    UnclosedTree,

    #[error("')' without a matching '('")]
    UnexpectedClose,

    #[error("property value is missing its closing ']'")]
    UnclosedValue,

    #[error("node marker outside of a game tree")]
    NodeOutsideTree,

    #[error("game tree holds no node")]
    EmptyGameTree,

    #[error("property has no value")]
    MissingValue,

    #[error("node after a variation in the same game tree")]
    NodeAfterSubtree,

    #[error("unexpected character")]
    UnexpectedChar,
}

/// A parse failure with the byte offset, line and column (both 1-based) of the
/// offending character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column} (offset {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error for `offset` in `text`, computing line and column.
    pub fn at(kind: ParseErrorKind, text: &str, offset: usize) -> Self {
        let before = &text[..offset.min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Self {
            kind,
            offset,
            line,
            column,
        }
    }
}

/// Misuse of the tree mutators. These indicate a bug in the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {child:?} is already a child of {parent:?}")]
    DuplicateChild { parent: NodeId, child: NodeId },

    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    #[error("node {child:?} is the root of the game and cannot become a child")]
    RootAsChild { child: NodeId },

    #[error("linking {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

/// Any error raised by this crate.
#[derive(Error, Debug)]
pub enum SgfError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
