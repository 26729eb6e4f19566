//! Game-record nodes.
//!
//! A node is any SGF node: a played move, a setup of stones, or an empty
//! structural node carrying only comments or markup. Nodes live in the arena
//! of their [`Game`](crate::game::Game) and refer to each other through
//! [`NodeId`]s; the game owns every node, and a parent link is only a way back
//! up the tree.

use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    ADD_BLACK, ADD_WHITE, BLACK_MOVE, COMMENT, GAME_PROPERTY_SEPARATOR, PASS_POINT, UNNUMBERED,
    WHITE_MOVE, is_list_valued_key,
};
use crate::coord::{sgf_point_to_location, to_board_position};
use crate::error::CoordError;

/// Index of a node in its game's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The SGF move key for this color.
    pub fn move_key(self) -> &'static str {
        match self {
            Color::Black => BLACK_MOVE,
            Color::White => WHITE_MOVE,
        }
    }
}

/// One node of a game tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// Joined view: several values of one key are separated by a comma.
    properties: BTreeMap<String, String>,
    /// The individual values behind each entry of `properties`.
    values: BTreeMap<String, Vec<String>>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) move_no: i32,
    pub(crate) node_no: i32,
    pub(crate) visual_depth: i32,
    id: u64,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create an unattached, unnumbered node with a freshly generated id.
    pub fn new() -> Self {
        Self {
            properties: BTreeMap::new(),
            values: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            move_no: UNNUMBERED,
            node_no: UNNUMBERED,
            visual_depth: UNNUMBERED,
            id: fastrand::u64(..),
        }
    }

    /// Set a property. A key set twice keeps the last value.
    ///
    /// For list-valued keys ("AB", "LB", ...) a comma-separated value is taken
    /// as several items; use [`Node::add_property_values`] when an item may
    /// itself contain a comma.
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let values = if is_list_valued_key(&key) {
            value.split(GAME_PROPERTY_SEPARATOR).map(str::to_string).collect()
        } else {
            vec![value.clone()]
        };
        self.values.insert(key.clone(), values);
        self.properties.insert(key, value);
    }

    /// Set a property from its individual values, as read from `KEY[a][b]`.
    pub fn add_property_values(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        self.properties
            .insert(key.clone(), values.join(GAME_PROPERTY_SEPARATOR));
        self.values.insert(key, values);
    }

    /// Individual values of `key`.
    pub fn property_values(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Every property with its individual values, ordered by key.
    pub fn value_lists(&self) -> &BTreeMap<String, Vec<String>> {
        &self.values
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

    /// A node that plays a stone for either color.
    pub fn is_move(&self) -> bool {
        self.is_black() || self.is_white()
    }

    /// A node that sets up stones without playing a move.
    pub fn is_placement(&self) -> bool {
        !self.is_move()
            && (self.properties.contains_key(ADD_BLACK) || self.properties.contains_key(ADD_WHITE))
    }

    /// Neither a move nor a placement.
    pub fn is_structural(&self) -> bool {
        !self.is_move() && !self.is_placement()
    }

    pub fn is_black(&self) -> bool {
        self.properties.contains_key(BLACK_MOVE)
    }

    pub fn is_white(&self) -> bool {
        self.properties.contains_key(WHITE_MOVE)
    }

    /// Color of the move played at this node. White wins if a malformed node
    /// carries both keys.
    pub fn color(&self) -> Option<Color> {
        if self.is_white() {
            Some(Color::White)
        } else if self.is_black() {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// The raw SGF point of the move, e.g. "pd".
    pub fn move_string(&self) -> Option<&str> {
        self.color().and_then(|c| self.property(c.move_key()))
    }

    /// An empty move value, or "tt" (the FF[3] pass).
    pub fn is_pass(&self) -> bool {
        matches!(self.move_string(), Some("") | Some(PASS_POINT))
    }

    /// Flat board location of the move, `None` for passes and non-moves.
    pub fn move_location(&self, board_size: u32) -> Result<Option<u32>, CoordError> {
        match self.move_string() {
            Some(point) if !self.is_pass() => sgf_point_to_location(point, board_size).map(Some),
            _ => Ok(None),
        }
    }

    /// Board position of the move ("Q16"), `None` for passes and non-moves.
    pub fn move_position(&self, board_size: u32) -> Result<Option<String>, CoordError> {
        self.move_location(board_size)?
            .map(|loc| to_board_position(loc, board_size))
            .transpose()
    }

    pub fn comment(&self) -> &str {
        self.property_or(COMMENT, "")
    }

    /// No properties and no children.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.children.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn move_no(&self) -> i32 {
        self.move_no
    }

    pub fn node_no(&self) -> i32 {
        self.node_no
    }

    pub fn visual_depth(&self) -> i32 {
        self.visual_depth
    }

    pub fn set_visual_depth(&mut self, depth: i32) {
        self.visual_depth = depth;
    }

    /// Generated identifier, not part of structural comparison.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Node-local part of structural equality: properties, move number and
    /// visual depth. Ids, node numbers and links are not compared.
    pub fn same_content(&self, other: &Node) -> bool {
        self.move_no == other.move_no
            && self.visual_depth == other.visual_depth
            && self.values == other.values
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "props: {:?} move_no: {} children: {} vdepth: {}",
            self.properties,
            self.move_no,
            self.children.len(),
            self.visual_depth
        )
    }
}
