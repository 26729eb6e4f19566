//! [`Game`] back to SGF text.
//!
//! The output has the same tree shape as the parsed source but is not a
//! byte-for-byte copy of it; the source text is kept in
//! [`Game::original_sgf`] for that purpose.

use std::fmt::{self, Write};

use crate::game::Game;
use crate::node::NodeId;

/// Pending output while walking the tree.
enum Step {
    Node(NodeId),
    Open,
    Close,
}

/// Write `game` as SGF into `out`.
///
/// Game-level properties share the first node with the opening parenthesis.
/// A node with a single child continues inline; a node with several children
/// puts each of them, main line first, in its own parenthesized group.
pub fn write_game<W: Write>(game: &Game, out: &mut W) -> fmt::Result {
    out.write_char('(')?;
    if !game.properties().is_empty() {
        out.write_char(';')?;
        for (key, value) in game.properties() {
            write_property(out, key, std::slice::from_ref(value))?;
        }
    }

    let mut stack = vec![Step::Node(game.root())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Open => out.write_char('(')?,
            Step::Close => out.write_str(")\n")?,
            Step::Node(id) => {
                out.write_char(';')?;
                for (key, values) in game.node(id).value_lists() {
                    write_property(out, key, values)?;
                }
                out.write_char('\n')?;

                match game.children(id) {
                    [] => {}
                    [only] => stack.push(Step::Node(*only)),
                    children => {
                        for &child in children.iter().rev() {
                            stack.push(Step::Close);
                            stack.push(Step::Node(child));
                            stack.push(Step::Open);
                        }
                    }
                }
            }
        }
    }

    out.write_char(')')
}

/// Render `game` as an SGF string.
pub fn render(game: &Game) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_game(game, &mut out);
    out
}

/// `KEY[v1][v2]...`, one bracket per value.
fn write_property<W: Write>(out: &mut W, key: &str, values: &[String]) -> fmt::Result {
    out.write_str(key)?;
    for value in values {
        write_value(out, value)?;
    }
    Ok(())
}

fn write_value<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('[')?;
    for c in value.chars() {
        if c == ']' || c == '\\' {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char(']')
}

impl Game {
    /// Render the game as SGF text.
    pub fn render(&self) -> String {
        render(self)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_game(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_render_main_line() {
        let mut game = parse("(;GM[1]SZ[19];B[pd];W[dp])").unwrap();
        game.post_process();
        assert_eq!(game.render(), "(;GM[1]SZ[19];\n;B[pd]\n;W[dp]\n)");
    }

    #[test]
    fn test_render_variations() {
        let mut game = parse("(;B[aa](;W[bb])(;W[cc];B[dd]))").unwrap();
        game.post_process();
        assert_eq!(
            game.render(),
            "(;\n;B[aa]\n(;W[bb]\n)\n(;W[cc]\n;B[dd]\n)\n)"
        );
    }

    #[test]
    fn test_render_escapes_and_lists() {
        let game = parse("(;C[x\\]y\\\\z]AB[aa][bb])").unwrap();
        assert_eq!(game.render(), "(;AB[aa][bb]C[x\\]y\\\\z]\n)");
        assert_eq!(game.to_string(), game.render());
    }

    #[test]
    fn test_render_keeps_label_values_apart() {
        let game = parse("(;B[aa]LB[bb:1][cc:2])").unwrap();
        assert_eq!(game.render(), "(;B[aa]LB[bb:1][cc:2]\n)");

        let source = "(;LB[aa:x,y][bb:z]C[a, b])";
        let game = parse(source).unwrap();
        assert_eq!(game.render(), "(;C[a, b]LB[aa:x,y][bb:z]\n)");
        let again = parse(&game.render()).unwrap();
        let root = again.node(again.root());
        assert_eq!(
            root.property_values("LB"),
            Some(&["aa:x,y".to_string(), "bb:z".to_string()][..])
        );
    }

    #[test]
    fn test_render_reparses_to_same_shape() {
        let source = "(;GM[1]PB[a]PB[b];C[root](;B[aa];W[bb](;B[cc])(;B[dd]))(;B[ee]))";
        let mut game = parse(source).unwrap();
        game.post_process();

        let mut again = parse(&game.render()).unwrap();
        again.post_process();
        assert_eq!(again.property("PB"), Some("a,b"));
        assert_eq!(again.no_nodes(), game.no_nodes());
        assert_eq!(again.no_moves(), game.no_moves());
        assert_eq!(again.tree_totals(), game.tree_totals());
        assert_eq!(again.render(), game.render());
    }
}
