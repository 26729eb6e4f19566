//! A whole game record: game-level properties plus the node tree.
//!
//! The game owns every node in an arena. Links between nodes are [`NodeId`]s,
//! so a parent link never keeps anything alive and the tree can be walked
//! upwards without reference cycles.
//!
//! Branching works as follows:
//! - [`Game::next_node`] is the next node on the same line of play (the first
//!   child). `None` means the line has no further nodes.
//! - Any further children are variations branching off at that node.
//!
//! After parsing, [`Game::post_process`] must run once. It makes sure the root
//! is never a move, counts the main line and numbers every node of the tree.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::constants::{
    BOARD_SIZE, DEFAULT_BOARD_SIZE, FIRST_MOVE_NO, FIRST_NODE_NO, GAME_PROPERTY_SEPARATOR,
};
use crate::error::TreeError;
use crate::node::{Node, NodeId};

/// Move and node counts over every node of a tree, variations included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeTotals {
    pub moves: usize,
    pub nodes: usize,
}

#[derive(Clone, Debug)]
pub struct Game {
    id: u64,
    properties: BTreeMap<String, String>,
    nodes: Vec<Node>,
    root: NodeId,
    no_moves: usize,
    no_nodes: usize,
    post_processed: bool,
    original_sgf: String,
}

impl Game {
    /// Create a game holding only an empty root node.
    pub fn new(original_sgf: impl Into<String>) -> Self {
        Self {
            id: fastrand::u64(..),
            properties: BTreeMap::new(),
            nodes: vec![Node::new()],
            root: NodeId(0),
            no_moves: 0,
            no_nodes: 0,
            post_processed: false,
            original_sgf: original_sgf.into(),
        }
    }

    /// Generated record id, used by stores that persist games.
    pub fn id(&self) -> u64 {
        self.id
    }

    // =========================================================================
    // Game-level properties
    // =========================================================================

    /// Set a game-level property. Unlike node properties, a key given more
    /// than once accumulates its values, separated by a comma.
    pub fn add_property(&mut self, key: impl Into<String>, value: &str) {
        self.properties
            .entry(key.into())
            .and_modify(|current| {
                current.push_str(GAME_PROPERTY_SEPARATOR);
                current.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.property(key).unwrap_or(default)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Board size from `SZ`, or 19 when absent or unreadable. A rectangular
    /// size ("19:13") yields its first dimension.
    pub fn board_size(&self) -> u32 {
        self.property(BOARD_SIZE)
            .and_then(|sz| sz.split(':').next())
            .and_then(|sz| sz.trim().parse().ok())
            .unwrap_or(DEFAULT_BOARD_SIZE)
    }

    pub fn original_sgf(&self) -> &str {
        &self.original_sgf
    }

    pub fn set_original_sgf(&mut self, sgf: impl Into<String>) {
        self.original_sgf = sgf.into();
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Make `id` the root. The node keeps its children; it is detached from
    /// any parent it had.
    pub fn set_root(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
        self.root = id;
    }

    /// # Panics
    /// If `id` does not belong to this game.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// # Panics
    /// If `id` does not belong to this game.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes allocated in the arena, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a new unattached node.
    pub fn new_node(&mut self) -> NodeId {
        self.nodes.push(Node::new());
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to the children of `parent`.
    ///
    /// Fails if `child` is already a child of `parent`, already hangs below
    /// another node, is the root, or is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.nodes[parent.0].children.contains(&child) {
            return Err(TreeError::DuplicateChild { parent, child });
        }
        if child == self.root {
            return Err(TreeError::RootAsChild { child });
        }
        if let Some(existing) = self.nodes[child.0].parent {
            return Err(TreeError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.ancestors(parent).any(|a| a == child) || parent == child {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Main-line continuation of `id`, i.e. its first child.
    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Children of `id` other than the main line.
    pub fn variations(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.get(1..).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.nodes[id.0].has_children()
    }

    /// Walk from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Walk the main line, starting at `from` itself.
    pub fn main_line_from(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(from), move |&n| self.next_node(n))
    }

    /// Walk the main line from the root.
    pub fn main_line(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.main_line_from(self.root)
    }

    /// Every node reachable from the root, in pre-order (main line first).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// First move on the main line.
    pub fn first_move(&self) -> Option<NodeId> {
        self.main_line().find(|&n| self.node(n).is_move())
    }

    /// Last move on the main line.
    pub fn last_move(&self) -> Option<NodeId> {
        self.main_line().filter(|&n| self.node(n).is_move()).last()
    }

    pub fn set_visual_depth(&mut self, id: NodeId, depth: i32) {
        self.nodes[id.0].visual_depth = depth;
    }

    /// Display ordering of two nodes: visual depth, then move number, then
    /// node identity.
    pub fn display_order(&self, a: NodeId, b: NodeId) -> Ordering {
        let (na, nb) = (self.node(a), self.node(b));
        na.visual_depth
            .cmp(&nb.visual_depth)
            .then(na.move_no.cmp(&nb.move_no))
            .then(a.cmp(&b))
    }

    // =========================================================================
    // Post-processing
    // =========================================================================

    /// Moves on the main line, as counted by [`Game::post_process`].
    pub fn no_moves(&self) -> usize {
        self.no_moves
    }

    /// Nodes on the main line (root included), as counted by
    /// [`Game::post_process`].
    pub fn no_nodes(&self) -> usize {
        self.no_nodes
    }

    pub fn is_post_processed(&self) -> bool {
        self.post_processed
    }

    /// Normalize the root and number the tree. Runs once; later calls are
    /// ignored.
    ///
    /// `no_moves` and `no_nodes` only cover the main line, while numbering
    /// reaches every variation. See [`Game::tree_totals`] for whole-tree counts.
    pub fn post_process(&mut self) {
        if self.post_processed {
            warn!(game = self.id, "post_process called more than once, ignoring");
            return;
        }
        self.post_processed = true;

        if self.node(self.root).is_move() {
            let old_root = self.root;
            let new_root = self.new_node();
            self.nodes[new_root.0].children.push(old_root);
            self.nodes[old_root.0].parent = Some(new_root);
            self.root = new_root;
        }

        let (moves, nodes) = self.main_line().fold((0, 0), |(moves, nodes), n| {
            (moves + usize::from(self.node(n).is_move()), nodes + 1)
        });
        self.no_moves = moves;
        self.no_nodes = nodes;

        self.number_nodes();

        debug!(
            game = self.id,
            no_moves = self.no_moves,
            no_nodes = self.no_nodes,
            "post-processed game"
        );
    }

    /// Assign `move_no` to moves and `node_no` to every node. Each child
    /// continues from the counters left by its parent, so sibling variations
    /// start from the same numbers.
    fn number_nodes(&mut self) {
        let mut stack = vec![(self.root, FIRST_MOVE_NO, FIRST_NODE_NO)];

        while let Some((id, move_no, node_no)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            let mut next_move_no = move_no;
            if node.is_move() {
                node.move_no = move_no;
                next_move_no += 1;
            }
            node.node_no = node_no;

            for &child in node.children.iter().rev() {
                stack.push((child, next_move_no, node_no + 1));
            }
        }
    }

    /// Count moves and nodes over the whole tree, variations included.
    pub fn tree_totals(&self) -> TreeTotals {
        self.preorder()
            .into_iter()
            .fold(TreeTotals::default(), |mut totals, id| {
                totals.nodes += 1;
                if self.node(id).is_move() {
                    totals.moves += 1;
                }
                totals
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNNUMBERED;

    /// Build a chain of moves below `parent`, returning the created nodes.
    fn chain(game: &mut Game, parent: NodeId, moves: &[(&str, &str)]) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut current = parent;
        for (key, value) in moves {
            let id = game.new_node();
            game.node_mut(id).add_property(*key, *value);
            game.add_child(current, id).unwrap();
            ids.push(id);
            current = id;
        }
        ids
    }

    #[test]
    fn test_game_property_concatenates() {
        let mut game = Game::new("");
        game.add_property("PB", "Alice");
        game.add_property("PB", "Bob");
        assert_eq!(game.property("PB"), Some("Alice,Bob"));
        assert_eq!(game.property_or("PW", "?"), "?");
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let mut game = Game::new("");
        let root = game.root();
        let child = game.new_node();
        game.add_child(root, child).unwrap();
        assert_eq!(
            game.add_child(root, child),
            Err(TreeError::DuplicateChild {
                parent: root,
                child
            })
        );
    }

    #[test]
    fn test_reparent_and_cycle_rejected() {
        let mut game = Game::new("");
        let root = game.root();
        let ids = chain(&mut game, root, &[("B", "aa"), ("W", "bb")]);
        let other = game.new_node();
        assert!(matches!(
            game.add_child(other, ids[1]),
            Err(TreeError::AlreadyParented { .. })
        ));
        assert_eq!(
            game.add_child(ids[1], root),
            Err(TreeError::RootAsChild { child: root })
        );
        assert_eq!(
            game.add_child(other, root),
            Err(TreeError::RootAsChild { child: root })
        );
        assert!(game.parent(root).is_none());
        assert!(matches!(
            game.add_child(ids[1], ids[0]),
            Err(TreeError::AlreadyParented { .. })
        ));
        assert!(matches!(
            game.add_child(other, other),
            Err(TreeError::WouldCycle { .. })
        ));

        let below = game.new_node();
        game.add_child(other, below).unwrap();
        assert_eq!(
            game.add_child(below, other),
            Err(TreeError::WouldCycle {
                parent: below,
                child: other
            })
        );
    }

    #[test]
    fn test_move_root_is_wrapped() {
        let mut game = Game::new("");
        let first = game.root();
        game.node_mut(first).add_property("B", "aa");
        chain(&mut game, first, &[("W", "bb")]);

        game.post_process();

        let root = game.root();
        assert_ne!(root, first);
        assert!(game.node(root).is_structural());
        assert_eq!(game.children(root), &[first]);
        assert_eq!(game.parent(first), Some(root));
        assert_eq!(game.no_moves(), 2);
        assert_eq!(game.no_nodes(), 3);
        assert_eq!(game.node(first).move_no(), 1);
        assert_eq!(game.node(root).node_no(), 0);
        assert_eq!(game.node(root).move_no(), UNNUMBERED);
    }

    #[test]
    fn test_numbering_restarts_per_branch() {
        let mut game = Game::new("");
        let root = game.root();
        let main = chain(&mut game, root, &[("B", "aa"), ("W", "bb"), ("B", "cc")]);
        let alt = chain(&mut game, main[0], &[("W", "dd"), ("B", "ee")]);

        game.post_process();

        assert_eq!(game.node(main[1]).move_no(), 2);
        assert_eq!(game.node(alt[0]).move_no(), 2);
        assert_eq!(game.node(main[2]).move_no(), 3);
        assert_eq!(game.node(alt[1]).move_no(), 3);
        assert_eq!(game.node(alt[1]).node_no(), 3);

        // main-line counters miss the variation, the totals do not
        assert_eq!(game.no_moves(), 3);
        assert_eq!(game.no_nodes(), 4);
        assert_eq!(game.tree_totals(), TreeTotals { moves: 5, nodes: 6 });
    }

    #[test]
    fn test_post_process_runs_once() {
        let mut game = Game::new("");
        let root = game.root();
        game.node_mut(root).add_property("B", "aa");
        game.post_process();
        let wrapped = game.root();
        game.post_process();
        assert_eq!(game.root(), wrapped);
        assert_eq!(game.no_nodes(), 2);
    }

    #[test]
    fn test_first_and_last_move() {
        let mut game = Game::new("");
        let root = game.root();
        let ids = chain(
            &mut game,
            root,
            &[("C", "setup"), ("B", "aa"), ("W", "bb"), ("C", "end")],
        );
        assert_eq!(game.first_move(), Some(ids[1]));
        assert_eq!(game.last_move(), Some(ids[2]));
    }

    #[test]
    fn test_display_order() {
        let mut game = Game::new("");
        let root = game.root();
        let ids = chain(&mut game, root, &[("B", "aa"), ("W", "bb")]);
        game.post_process();
        assert_eq!(game.display_order(ids[0], ids[1]), Ordering::Less);
        game.set_visual_depth(ids[0], 1);
        assert_eq!(game.display_order(ids[0], ids[1]), Ordering::Greater);
        assert_eq!(game.display_order(ids[1], ids[1]), Ordering::Equal);
    }

    #[test]
    fn test_board_size() {
        let mut game = Game::new("");
        assert_eq!(game.board_size(), 19);
        game.add_property("SZ", "13");
        assert_eq!(game.board_size(), 13);
    }
}
