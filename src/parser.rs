//! SGF text to [`Game`].
//!
//! The grammar accepted here is the usual SGF one:
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Node { Node } { GameTree } ")"
//! Node       = ";" { Property }
//! Property   = UcLetter { UcLetter } "[" Value "]" { "[" Value "]" }
//! ```
//!
//! Whitespace may appear between any two tokens. Inside a value, `\` escapes
//! the next character and a backslash followed by a line break is dropped.
//!
//! Parsing is iterative, so neither deep nor wide trees touch the call stack.
//! Root and game-info properties (player names, board size, ...) go to the
//! game, not to the node they were found in. When the first node of the tree
//! held nothing else it disappears; deeper nodes stay in place, empty.

use std::iter::Peekable;
use std::str::CharIndices;

use tracing::{debug, warn};

use crate::constants::{GAME_PROPERTY_SEPARATOR, is_game_info_key};
use crate::error::{ParseError, ParseErrorKind};
use crate::game::Game;
use crate::node::NodeId;

/// Parse the first game tree of `text`.
///
/// Further game trees are checked for well-formedness and dropped. The game
/// is returned as parsed; call [`Game::post_process`] before relying on move
/// numbers or counts.
///
/// ```
/// let mut game = sgf_rust::parser::parse("(;GM[1]SZ[9];B[ee];W[ce])").unwrap();
/// game.post_process();
/// assert_eq!(game.no_moves(), 2);
/// assert_eq!(game.board_size(), 9);
/// ```
pub fn parse(text: &str) -> Result<Game, ParseError> {
    let mut games = parse_trees(text)?;
    if games.len() > 1 {
        warn!(
            ignored = games.len() - 1,
            "collection holds several game trees, keeping the first"
        );
    }
    let (mut game, _) = games.swap_remove(0);
    game.set_original_sgf(text);
    Ok(game)
}

/// Parse every game tree of an SGF collection. Each game keeps the source
/// text of its own tree.
pub fn parse_collection(text: &str) -> Result<Vec<Game>, ParseError> {
    Ok(parse_trees(text)?
        .into_iter()
        .map(|(mut game, span)| {
            game.set_original_sgf(&text[span.0..span.1]);
            game
        })
        .collect())
}

/// Top level: whitespace and game trees only.
fn parse_trees(text: &str) -> Result<Vec<(Game, (usize, usize))>, ParseError> {
    let body_start = if text.starts_with('\u{feff}') { 3 } else { 0 };
    let mut reader = Reader::new(text, body_start);
    let mut games = Vec::new();

    while let Some((offset, c)) = reader.skip_whitespace() {
        match c {
            '(' => {
                let game = TreeBuilder::new().build(&mut reader)?;
                games.push((game, (offset, reader.offset())));
            }
            ';' => return Err(reader.error(ParseErrorKind::NodeOutsideTree, offset)),
            ')' => return Err(reader.error(ParseErrorKind::UnexpectedClose, offset)),
            _ => return Err(reader.error(ParseErrorKind::UnexpectedChar, offset)),
        }
    }

    if games.is_empty() {
        return Err(reader.error(ParseErrorKind::NoGameTree, text.len()));
    }
    debug!(games = games.len(), bytes = text.len(), "parsed SGF text");
    Ok(games)
}

/// Character cursor over the source text.
struct Reader<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        Self {
            text,
            chars: text[start..].char_indices().peekable(),
            base: start,
        }
    }

    /// Skip whitespace and return the next character without consuming it.
    fn skip_whitespace(&mut self) -> Option<(usize, char)> {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }
        self.peek()
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        let base = self.base;
        self.chars.peek().map(|&(i, c)| (i + base, c))
    }

    fn next(&mut self) -> Option<(usize, char)> {
        let base = self.base;
        self.chars.next().map(|(i, c)| (i + base, c))
    }

    /// Offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.peek().map_or(self.text.len(), |(i, _)| i)
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::at(kind, self.text, offset)
    }

    /// Read an uppercase property identifier.
    fn read_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some((_, c)) = self.peek() {
            if !c.is_ascii_uppercase() {
                break;
            }
            ident.push(c);
            self.next();
        }
        ident
    }

    /// Read one bracketed value; the cursor sits on the opening '['.
    fn read_value(&mut self) -> Result<String, ParseError> {
        let (open, _) = self
            .next()
            .ok_or_else(|| self.error(ParseErrorKind::MissingValue, self.text.len()))?;
        let mut value = String::new();

        loop {
            match self.next() {
                None => return Err(self.error(ParseErrorKind::UnclosedValue, open)),
                Some((_, ']')) => return Ok(value),
                Some((_, '\\')) => match self.next() {
                    None => return Err(self.error(ParseErrorKind::UnclosedValue, open)),
                    // soft line break
                    Some((_, '\n')) => {
                        if let Some((_, '\r')) = self.peek() {
                            self.next();
                        }
                    }
                    Some((_, '\r')) => {
                        if let Some((_, '\n')) = self.peek() {
                            self.next();
                        }
                    }
                    Some((_, c)) => value.push(c),
                },
                Some((_, c)) => value.push(c),
            }
        }
    }
}

/// One open '(' while building a tree.
struct Frame {
    /// Node the variation hangs below, `None` at the top of the tree.
    attach_to: Option<NodeId>,
    /// Whether a ';' was seen since the '('.
    has_node: bool,
    /// Whether a nested '(' was seen; no node may follow it.
    has_subtree: bool,
}

/// Builds one game from a single parenthesized game tree.
struct TreeBuilder {
    game: Game,
    root: Option<NodeId>,
    /// Structural root created to hold several top-level nodes.
    synthetic_root: Option<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            game: Game::new(String::new()),
            root: None,
            synthetic_root: None,
        }
    }

    /// Consume one game tree; the reader sits on its opening '('.
    fn build(mut self, reader: &mut Reader) -> Result<Game, ParseError> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut current: Option<NodeId> = None;

        while let Some((offset, c)) = reader.skip_whitespace() {
            match c {
                '(' => {
                    reader.next();
                    if let Some(parent) = stack.last_mut() {
                        if !parent.has_node {
                            return Err(reader.error(ParseErrorKind::EmptyGameTree, offset));
                        }
                        parent.has_subtree = true;
                    }
                    stack.push(Frame {
                        attach_to: current,
                        has_node: false,
                        has_subtree: false,
                    });
                }
                ')' => {
                    reader.next();
                    let frame = stack
                        .pop()
                        .ok_or_else(|| reader.error(ParseErrorKind::UnexpectedClose, offset))?;
                    if !frame.has_node {
                        return Err(reader.error(ParseErrorKind::EmptyGameTree, offset));
                    }
                    current = frame.attach_to;
                    if stack.is_empty() {
                        return Ok(self.finish());
                    }
                }
                ';' => {
                    reader.next();
                    let frame = stack
                        .last_mut()
                        .ok_or_else(|| reader.error(ParseErrorKind::NodeOutsideTree, offset))?;
                    if frame.has_subtree {
                        return Err(reader.error(ParseErrorKind::NodeAfterSubtree, offset));
                    }
                    frame.has_node = true;
                    if let Some(id) = self.read_node(reader)? {
                        self.attach(current, id);
                        current = Some(id);
                    }
                }
                _ => return Err(reader.error(ParseErrorKind::UnexpectedChar, offset)),
            }
        }

        Err(reader.error(ParseErrorKind::UnclosedTree, reader.text.len()))
    }

    /// Read the properties following a ';'. Returns `None` when the first
    /// node of the tree held only game-level properties.
    fn read_node(&mut self, reader: &mut Reader) -> Result<Option<NodeId>, ParseError> {
        let leading = self.root.is_none();
        let id = self.game.new_node();
        let mut game_info_only = false;

        while let Some((offset, c)) = reader.skip_whitespace() {
            if !c.is_ascii_uppercase() {
                break;
            }
            let key = reader.read_ident();

            let mut values = Vec::new();
            while let Some((_, '[')) = reader.skip_whitespace() {
                values.push(reader.read_value()?);
            }
            if values.is_empty() {
                return Err(reader.error(ParseErrorKind::MissingValue, offset));
            }
            if is_game_info_key(&key) {
                self.game
                    .add_property(key, &values.join(GAME_PROPERTY_SEPARATOR));
                game_info_only = self.game.node(id).properties().is_empty();
            } else {
                self.game.node_mut(id).add_property_values(key, values);
                game_info_only = false;
            }
        }

        Ok((!(leading && game_info_only)).then_some(id))
    }

    /// Link a freshly read node below `parent`, or make it a top-level node.
    fn attach(&mut self, parent: Option<NodeId>, id: NodeId) {
        let parent = match (parent, self.root, self.synthetic_root) {
            (Some(parent), _, _) => parent,
            (None, None, _) => {
                self.root = Some(id);
                return;
            }
            (None, Some(_), Some(synthetic)) => synthetic,
            (None, Some(first), None) => {
                let synthetic = self.game.new_node();
                self.link(synthetic, first);
                self.root = Some(synthetic);
                self.synthetic_root = Some(synthetic);
                synthetic
            }
        };
        self.link(parent, id);
    }

    /// Fresh nodes are never linked twice, so linking cannot fail.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        let linked = self.game.add_child(parent, child);
        debug_assert!(linked.is_ok(), "parser produced an invalid link: {linked:?}");
    }

    fn finish(mut self) -> Game {
        // the arena starts with an empty node; keep it when nothing else was read
        let root = self.root.unwrap_or_else(|| self.game.root());
        self.game.set_root(root);
        self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> ParseErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn test_parse_main_line() {
        let game = parse("(;FF[4]GM[1]SZ[19]PB[Black]PW[White];B[pd];W[dp];B[pp])").unwrap();
        assert_eq!(game.property("PB"), Some("Black"));
        assert_eq!(game.board_size(), 19);

        // the info-only first node is gone, the first move is the root
        let root = game.root();
        assert_eq!(game.node(root).property("B"), Some("pd"));
        assert_eq!(game.main_line().count(), 3);
    }

    #[test]
    fn test_parse_variations() {
        let game = parse("(;C[start];B[aa](;W[bb];B[cc])(;W[dd]))").unwrap();
        let root = game.root();
        assert_eq!(game.node(root).comment(), "start");
        let branch = game.next_node(root).unwrap();
        let children = game.children(branch);
        assert_eq!(children.len(), 2);
        assert_eq!(game.node(children[0]).property("W"), Some("bb"));
        assert_eq!(game.node(children[1]).property("W"), Some("dd"));
        assert_eq!(game.parent(children[1]), Some(branch));
    }

    #[test]
    fn test_parse_escapes() {
        let game = parse("(;C[a \\] b \\\\ c\\\nd]B[aa])").unwrap();
        assert_eq!(game.node(game.root()).comment(), "a ] b \\ cd");
    }

    #[test]
    fn test_parse_multiple_values() {
        let game = parse("(;AB[aa][bb] [cc]AW[dd])").unwrap();
        let root = game.node(game.root());
        assert_eq!(root.property("AB"), Some("aa,bb,cc"));
        assert!(root.is_placement());
    }

    #[test]
    fn test_parse_top_level_variations_get_a_root() {
        let game = parse("(;GM[1](;B[aa])(;B[bb]))").unwrap();
        let root = game.root();
        assert!(game.node(root).is_structural());
        assert_eq!(game.children(root).len(), 2);
        assert_eq!(game.property("GM"), Some("1"));
    }

    #[test]
    fn test_parse_info_only_game() {
        let game = parse("(;GM[1]SZ[9])").unwrap();
        assert!(game.node(game.root()).is_empty());
        assert_eq!(game.board_size(), 9);
    }

    #[test]
    fn test_parse_info_node_inside_tree_stays() {
        let game = parse("(;B[aa];PB[x];W[bb])").unwrap();
        assert_eq!(game.property("PB"), Some("x"));
        let line: Vec<_> = game.main_line().collect();
        assert_eq!(line.len(), 3);
        assert!(game.node(line[1]).properties().is_empty());
        assert_eq!(game.node(line[2]).property("W"), Some("bb"));
    }

    #[test]
    fn test_parse_keeps_original_text() {
        let text = "  (;B[aa])\n";
        assert_eq!(parse(text).unwrap().original_sgf(), text);
    }

    #[test]
    fn test_parse_collection() {
        let games = parse_collection("(;B[aa])\n(;W[bb];B[cc])").unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].original_sgf(), "(;B[aa])");
        assert_eq!(games[1].original_sgf(), "(;W[bb];B[cc])");
        assert_eq!(parse("(;B[aa])(;W[bb])").unwrap().main_line().count(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(kind(""), ParseErrorKind::NoGameTree);
        assert_eq!(kind("   "), ParseErrorKind::NoGameTree);
        assert_eq!(kind("(;B[aa]"), ParseErrorKind::UnclosedTree);
        assert_eq!(kind("(;B[aa]))"), ParseErrorKind::UnexpectedClose);
        assert_eq!(kind("(;B[aa)"), ParseErrorKind::UnclosedValue);
        assert_eq!(kind(";B[aa]"), ParseErrorKind::NodeOutsideTree);
        assert_eq!(kind("()"), ParseErrorKind::EmptyGameTree);
        assert_eq!(kind("(;B[aa]())"), ParseErrorKind::EmptyGameTree);
        assert_eq!(kind("((;B[aa]))"), ParseErrorKind::EmptyGameTree);
        assert_eq!(kind("(;B[aa](;W[bb]);B[cc])"), ParseErrorKind::NodeAfterSubtree);
        assert_eq!(kind("(;B[aa](;W[bb])(;W[cc]);B[dd])"), ParseErrorKind::NodeAfterSubtree);
        assert_eq!(kind("(;B)"), ParseErrorKind::MissingValue);
        assert_eq!(kind("(;b[aa])"), ParseErrorKind::UnexpectedChar);
        assert_eq!(kind("x(;B[aa])"), ParseErrorKind::UnexpectedChar);
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("(;B[aa]\n;W[bb]\n;C[oops").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedValue);
        assert_eq!(err.offset, 17);
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_parse_deep_tree() {
        let mut text = String::from("(;GM[1]");
        for i in 0..20_000 {
            text.push_str(if i % 2 == 0 { ";B[aa]" } else { ";W[bb]" });
        }
        text.push(')');
        let game = parse(&text).unwrap();
        assert_eq!(game.main_line().count(), 20_000);
    }

    #[test]
    fn test_parse_deep_nesting() {
        let depth = 5_000;
        let mut text = String::new();
        for _ in 0..depth {
            text.push_str("(;B[aa]");
        }
        text.push_str(&")".repeat(depth));
        let game = parse(&text).unwrap();
        assert_eq!(game.main_line().count(), depth);
    }
}
