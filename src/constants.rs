//! Constants for board bounds, SGF property keys, and numbering sentinels.
//!
//! Board positions are encoded with at most two characters per axis, which
//! caps the board size at 99. Property keys are the SGF identifiers this crate
//! interprets; every other key is carried through untouched.

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported board size (two-character coordinate ceiling).
pub const MAX_BOARD_SIZE: u32 = 99;

/// Board size assumed when a record carries no `SZ` property.
pub const DEFAULT_BOARD_SIZE: u32 = 19;

/// Number of usable row letters: A-Z without 'I'.
pub const LETTER_RADIX: u32 = 25;

/// Row letters up to and including 'H' map straight to their ordinal.
pub const LAST_LETTER_BEFORE_GAP: u32 = 8;

// =============================================================================
// Numbering
// =============================================================================

/// Value of `move_no`, `node_no` and `visual_depth` before assignment.
pub const UNNUMBERED: i32 = -1;

/// Move number given to the first move of a record.
pub const FIRST_MOVE_NO: i32 = 1;

/// Node number given to the root node.
pub const FIRST_NODE_NO: i32 = 0;

// =============================================================================
// Property Keys
// =============================================================================

/// Black plays a stone.
pub const BLACK_MOVE: &str = "B";

/// White plays a stone.
pub const WHITE_MOVE: &str = "W";

/// Black stones set up without being played.
pub const ADD_BLACK: &str = "AB";

/// White stones set up without being played.
pub const ADD_WHITE: &str = "AW";

/// Node comment.
pub const COMMENT: &str = "C";

/// Board size.
pub const BOARD_SIZE: &str = "SZ";

/// Legacy pass encoding on boards up to 19x19.
pub const PASS_POINT: &str = "tt";

/// Separator used when a game-level key is set more than once, and when a
/// property carries several values.
pub const GAME_PROPERTY_SEPARATOR: &str = ",";

/// Root and game-info properties. These are stored on the game, not on nodes.
pub const GAME_INFO_KEYS: &[&str] = &[
    "AN", "AP", "BR", "BT", "CA", "CP", "DT", "EV", "FF", "GC", "GM", "GN", "HA", "KM", "ON",
    "OT", "PB", "PC", "PW", "RE", "RO", "RU", "SO", "ST", "SZ", "TM", "US", "WR", "WT",
];

/// Properties whose value is a list (of points, or of point:text labels).
pub const LIST_VALUED_KEYS: &[&str] = &[
    "AB", "AE", "AR", "AW", "CR", "DD", "LB", "LN", "MA", "SL", "SQ", "TB", "TR", "TW", "VW",
];

/// Whether `key` belongs to the game rather than to an individual node.
pub fn is_game_info_key(key: &str) -> bool {
    GAME_INFO_KEYS.contains(&key)
}

/// Whether `key` holds a list of values.
pub fn is_list_valued_key(key: &str) -> bool {
    LIST_VALUED_KEYS.contains(&key)
}
