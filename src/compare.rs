//! Structural equivalence of two games.
//!
//! Two games are the same record when their game-level properties, counters
//! and trees match. Generated ids and node numbers are ignored, and the order
//! of variations below a node does not matter; the main line (first child)
//! still has to line up.
//!
//! [`ChildMatching::Bijective`] compares trees through canonical subtree
//! signatures, so every variation on one side pairs with exactly one on the
//! other. [`ChildMatching::ExistenceOnly`] reproduces the older check, which
//! only asks whether each child has *some* shallow counterpart and then walks
//! children pairwise in order.

use std::collections::HashMap;

use tracing::trace;

use crate::game::Game;
use crate::node::NodeId;

/// How children of two nodes are paired up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ChildMatching {
    /// One-to-one matching of variations, order-insensitive.
    #[default]
    Bijective,
    /// Every child must have a shallow match, then children are compared in
    /// order. Kept for compatibility with previously stored results.
    ExistenceOnly,
}

/// Whether `a` and `b` hold the same record.
pub fn is_same_game(a: &Game, b: &Game, matching: ChildMatching) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }

    if a.properties().len() != b.properties().len() {
        trace!(
            a = a.properties().len(),
            b = b.properties().len(),
            "game property count mismatch"
        );
        return false;
    }
    for (key, value) in a.properties() {
        if b.property(key) != Some(value.as_str()) {
            trace!(key = %key, a = %value, b = ?b.property(key), "game property mismatch");
            return false;
        }
    }

    if a.no_nodes() != b.no_nodes() {
        trace!(a = a.no_nodes(), b = b.no_nodes(), "node count mismatch");
        return false;
    }
    if a.no_moves() != b.no_moves() {
        trace!(a = a.no_moves(), b = b.no_moves(), "move count mismatch");
        return false;
    }

    match matching {
        ChildMatching::Bijective => same_tree(a, b),
        ChildMatching::ExistenceOnly => same_tree_legacy(a, b),
    }
}

/// Node-level equality: content of both nodes and of their parent chains.
pub fn is_same_node(a: &Game, na: NodeId, b: &Game, nb: NodeId) -> bool {
    let mut pair = (Some(na), Some(nb));
    loop {
        match pair {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !a.node(x).same_content(b.node(y)) {
                    return false;
                }
                pair = (a.parent(x), b.parent(y));
            }
            _ => return false,
        }
    }
}

// =============================================================================
// Bijective matching
// =============================================================================

/// Everything that identifies a subtree up to reordering of variations.
#[derive(PartialEq, Eq, Hash)]
struct SignatureKey {
    properties: Vec<(String, Vec<String>)>,
    move_no: i32,
    visual_depth: i32,
    main_line: Option<u32>,
    variations: Vec<u32>,
}

/// Hands out the same number to structurally equal subtrees of either game.
#[derive(Default)]
struct Signatures {
    interned: HashMap<SignatureKey, u32>,
}

impl Signatures {
    /// Signature of the subtree at the root of `game`, computed bottom-up.
    fn of_tree(&mut self, game: &Game) -> u32 {
        let mut sigs: Vec<Option<u32>> = vec![None; game.arena_len()];
        let mut stack = vec![(game.root(), false)];

        while let Some((id, expanded)) = stack.pop() {
            if !expanded {
                stack.push((id, true));
                stack.extend(game.children(id).iter().map(|&c| (c, false)));
                continue;
            }

            let child_sig = |c: &NodeId| sigs[c.index()].unwrap_or(u32::MAX);
            let main_line = game.next_node(id).map(|c| child_sig(&c));
            let mut variations: Vec<u32> = game.variations(id).iter().map(child_sig).collect();
            variations.sort_unstable();

            let node = game.node(id);
            let key = SignatureKey {
                properties: node
                    .value_lists()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                move_no: node.move_no(),
                visual_depth: node.visual_depth(),
                main_line,
                variations,
            };
            let next = self.interned.len() as u32;
            sigs[id.index()] = Some(*self.interned.entry(key).or_insert(next));
        }

        sigs[game.root().index()].unwrap_or(u32::MAX)
    }
}

fn same_tree(a: &Game, b: &Game) -> bool {
    if !is_same_node(a, a.root(), b, b.root()) {
        trace!("root nodes differ");
        return false;
    }
    let mut signatures = Signatures::default();
    let same = signatures.of_tree(a) == signatures.of_tree(b);
    if !same {
        trace!("trees differ below the root");
    }
    same
}

// =============================================================================
// Existence-only matching
// =============================================================================

fn same_tree_legacy(a: &Game, b: &Game) -> bool {
    let mut pending = vec![(a.root(), b.root())];

    while let Some((na, nb)) = pending.pop() {
        if !is_same_node(a, na, b, nb) {
            trace!(a = %a.node(na), b = %b.node(nb), "nodes differ");
            return false;
        }

        match (a.next_node(na), b.next_node(nb)) {
            (None, None) => {}
            (Some(x), Some(y)) if is_same_node(a, x, b, y) => {}
            _ => {
                trace!(a = %a.node(na), "next nodes differ");
                return false;
            }
        }

        let (ca, cb) = (a.children(na), b.children(nb));
        if ca.len() != cb.len() {
            trace!(a = ca.len(), b = cb.len(), "child counts differ");
            return false;
        }
        let all_found = ca
            .iter()
            .all(|&x| cb.iter().any(|&y| is_same_node(a, x, b, y)));
        if !all_found {
            trace!(a = %a.node(na), "children differ");
            return false;
        }

        pending.extend(ca.iter().copied().zip(cb.iter().copied()));
    }
    true
}

impl Game {
    /// Whether `other` holds the same record, ignoring generated ids and the
    /// order of variations.
    pub fn is_same_game(&self, other: &Game) -> bool {
        is_same_game(self, other, ChildMatching::Bijective)
    }

    pub fn is_same_game_with(&self, other: &Game, matching: ChildMatching) -> bool {
        is_same_game(self, other, matching)
    }
}
