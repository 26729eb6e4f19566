//! SGF-Rust: Go game records in the Smart Game Format.
//!
//! This crate loads SGF records into a navigable tree, numbers their moves,
//! writes them back out and compares two records for structural equivalence.
//!
//! ## Modules
//!
//! - [`constants`] - Board bounds, property keys and numbering sentinels
//! - [`coord`] - Flat locations and "Q16"-style board positions
//! - [`node`] - Nodes of the game tree
//! - [`game`] - The record: game properties, node arena, post-processing
//! - [`parser`] - SGF text to [`game::Game`]
//! - [`render`] - [`game::Game`] to SGF text
//! - [`compare`] - Structural equivalence of two games
//! - [`files`] - Loading from and saving to disk
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use sgf_rust::parser::parse;
//!
//! let mut game = parse("(;GM[1]SZ[19];B[pd](;W[dp])(;W[dd]))").unwrap();
//! game.post_process();
//!
//! let first = game.first_move().unwrap();
//! assert_eq!(game.node(first).move_position(19).unwrap().as_deref(), Some("Q16"));
//! assert_eq!(game.children(first).len(), 2);
//!
//! let mut again = parse(&game.render()).unwrap();
//! again.post_process();
//! assert!(game.is_same_game(&again));
//! ```

pub mod compare;
pub mod constants;
pub mod coord;
pub mod error;
pub mod files;
pub mod game;
pub mod node;
pub mod parser;
pub mod render;

pub use compare::ChildMatching;
pub use error::{CoordError, ParseError, ParseErrorKind, SgfError, TreeError};
pub use game::{Game, TreeTotals};
pub use node::{Color, Node, NodeId};
pub use parser::{parse, parse_collection};
