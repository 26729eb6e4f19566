//! Conversion between flat board locations and human-readable positions.
//!
//! A location is a single integer that only makes sense together with a board
//! size: the row letter is turned into its ordinal (A = 1, B = 2, ...), the
//! previous ordinal is multiplied by the board size and the column number is
//! added. On a 19x19 board A1 is 1, tengen (K10) is 181 and T19 is 361.
//!
//! Letters skip 'I' to avoid confusion with 'J', leaving 25 letters per
//! character. Two letters give `first * 25 + second`, so the largest row is
//! "CY" (99), which is also the largest supported board size.

use crate::constants::{LAST_LETTER_BEFORE_GAP, LETTER_RADIX, MAX_BOARD_SIZE};
use crate::error::CoordError;

type Result<T> = std::result::Result<T, CoordError>;

fn check_coordinate(coord: u32) -> Result<u32> {
    if coord < 1 || coord > MAX_BOARD_SIZE {
        return Err(CoordError::CoordinateOutOfRange(coord));
    }
    Ok(coord)
}

fn check_board_size(board_size: u32) -> Result<u32> {
    if board_size < 1 || board_size > MAX_BOARD_SIZE {
        return Err(CoordError::BoardSizeOutOfRange(board_size));
    }
    Ok(board_size)
}

/// Value of one row letter in the 'I'-less alphabet (A = 1 .. Z = 25).
fn letter_digit(letter: u8, letters: &str) -> Result<u32> {
    if !letter.is_ascii_uppercase() || letter == b'I' {
        return Err(CoordError::InvalidLetter(letters.to_string()));
    }
    let digit = (letter - b'A' + 1) as u32;
    Ok(if digit > LAST_LETTER_BEFORE_GAP {
        digit - 1
    } else {
        digit
    })
}

/// Letter for a zero-based digit in the 'I'-less alphabet.
fn digit_letter(digit: u32) -> char {
    let skip = if digit < LAST_LETTER_BEFORE_GAP { 0 } else { 1 };
    (b'A' + (digit + skip) as u8) as char
}

/// Convert 1 or 2 row letters into a coordinate ("A" is 1, "AB" is 27).
pub fn letter_to_coordinate(letters: &str) -> Result<u32> {
    let bytes = letters.as_bytes();
    if bytes.is_empty() || bytes.len() > 2 {
        return Err(CoordError::LetterLength(letters.to_string()));
    }

    let mut coord = letter_digit(bytes[0], letters)?;
    if let Some(&second) = bytes.get(1) {
        coord = coord * LETTER_RADIX + letter_digit(second, letters)?;
    }

    if coord > MAX_BOARD_SIZE {
        return Err(CoordError::LetterOutOfRange(letters.to_string()));
    }
    Ok(coord)
}

/// Convert a coordinate into its row letters (1 is "A", 27 is "AB").
pub fn coordinate_to_letter(coord: u32) -> Result<String> {
    check_coordinate(coord)?;
    let high = (coord - 1) / LETTER_RADIX;
    let low = (coord - 1) % LETTER_RADIX;

    let mut letters = String::with_capacity(2);
    if high > 0 {
        // high never exceeds 3 within MAX_BOARD_SIZE, so it is below the gap
        letters.push(digit_letter(high - 1));
    }
    letters.push(digit_letter(low));
    Ok(letters)
}

/// Parse a decimal column number.
pub fn number_to_coordinate(number: &str) -> Result<u32> {
    let coord: u32 = number
        .parse()
        .map_err(|_| CoordError::InvalidNumber(number.to_string()))?;
    if coord < 1 || coord > MAX_BOARD_SIZE {
        return Err(CoordError::InvalidNumber(number.to_string()));
    }
    Ok(coord)
}

/// Render a column number in decimal.
pub fn coordinate_to_number(coord: u32) -> Result<String> {
    Ok(check_coordinate(coord)?.to_string())
}

/// Render a flat location as "LetterNumber" for the given board size.
///
/// ```
/// use sgf_rust::coord::to_board_position;
///
/// assert_eq!(to_board_position(181, 19).unwrap(), "K10");
/// assert_eq!(to_board_position(9801, 99).unwrap(), "CY99");
/// ```
pub fn to_board_position(location: u32, board_size: u32) -> Result<String> {
    check_board_size(board_size)?;
    if location < 1 || location > board_size * board_size {
        return Err(CoordError::LocationOffBoard {
            location,
            board_size,
        });
    }
    let row = (location - 1) / board_size + 1;
    let col = (location - 1) % board_size + 1;
    Ok(format!(
        "{}{}",
        coordinate_to_letter(row)?,
        coordinate_to_number(col)?
    ))
}

/// Parse a "LetterNumber" position back into a flat location.
///
/// The row prefix is two letters when the second character is itself an
/// uppercase letter, one letter otherwise.
pub fn from_board_position(position: &str, board_size: u32) -> Result<u32> {
    check_board_size(board_size)?;
    if !position.is_ascii() || position.len() < 2 || position.len() > 4 {
        return Err(CoordError::PositionLength(position.to_string()));
    }

    let split = if position.as_bytes()[1].is_ascii_uppercase() {
        2
    } else {
        1
    };
    let (letters, number) = position.split_at(split);
    let row = letter_to_coordinate(letters)?;
    let col = number_to_coordinate(number)?;

    if row > board_size || col > board_size {
        return Err(CoordError::PositionOffBoard {
            position: position.to_string(),
            board_size,
        });
    }
    Ok((row - 1) * board_size + col)
}

/// Line index of one SGF point letter: 'a'..='z' are 0..=25 and 'A'..='Z'
/// continue with 26..=51 for boards larger than 26.
fn point_index(letter: u8) -> Option<u32> {
    match letter {
        b'a'..=b'z' => Some((letter - b'a') as u32),
        b'A'..=b'Z' => Some((letter - b'A') as u32 + 26),
        _ => None,
    }
}

/// Convert an SGF point ("pd": column letter then row letter from the top,
/// 'a' being the first line) into a flat location.
///
/// The column becomes the row-letter coordinate and the row, counted from the
/// bottom, becomes the number, so "pd" on 19x19 is Q16.
pub fn sgf_point_to_location(point: &str, board_size: u32) -> Result<u32> {
    check_board_size(board_size)?;
    let invalid = || CoordError::InvalidSgfPoint {
        point: point.to_string(),
        board_size,
    };

    let &[col, row] = point.as_bytes() else {
        return Err(invalid());
    };
    let (Some(x), Some(y)) = (point_index(col), point_index(row)) else {
        return Err(invalid());
    };
    if x >= board_size || y >= board_size {
        return Err(invalid());
    }

    Ok(x * board_size + (board_size - y))
}
