//! Loading and saving records on disk.
//!
//! Text is UTF-8 unless an encoding label ("gb2312", "shift_jis",
//! "iso-8859-1", ...) is given; labels follow the WHATWG Encoding Standard.
//! Loading always post-processes the game, so callers get numbered trees.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::error::SgfError;
use crate::game::Game;
use crate::parser::parse;

/// Encoding used when none is given.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Parse and post-process a record held in memory.
pub fn load_from_str(text: &str) -> Result<Game, SgfError> {
    let mut game = parse(text)?;
    game.post_process();
    Ok(game)
}

/// Read, parse and post-process the UTF-8 record at `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Game> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let game = load_from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), moves = game.no_moves(), "loaded game");
    Ok(game)
}

/// Read the record at `path`, decoding it with the encoding named by `label`.
///
/// A byte order mark overrides the label. Bytes that are not valid in the
/// encoding are an error rather than being replaced.
pub fn load_from_path_with_encoding(path: impl AsRef<Path>, label: &str) -> Result<Game> {
    let path = path.as_ref();
    let encoding = encoding_for(label)?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        bail!("{} is not valid {}", path.display(), used.name());
    }
    let game = load_from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(
        path = %path.display(),
        encoding = used.name(),
        moves = game.no_moves(),
        "loaded game"
    );
    Ok(game)
}

/// Read a whole UTF-8 record from `reader`.
pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Game> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("failed to read SGF input")?;
    Ok(load_from_str(&text)?)
}

fn encoding_for(label: &str) -> Result<&'static Encoding> {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => bail!("unknown encoding '{label}'"),
    }
}

/// Path of the backup copy made before overwriting `path`.
pub fn backup_path(path: &Path, millis: i64) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".orig.{millis}"));
    PathBuf::from(name)
}

/// Write `game` to `path` as UTF-8. With `keep_original`, an existing file is
/// first copied to `<path>.orig.<unix millis>`; the backup path is returned.
pub fn save_to_path(
    game: &Game,
    path: impl AsRef<Path>,
    keep_original: bool,
) -> Result<Option<PathBuf>> {
    save_to_path_with_encoding(game, path, DEFAULT_ENCODING, keep_original)
}

/// Like [`save_to_path`], encoding the text with the encoding named by
/// `label`. Characters the encoding cannot represent are an error.
///
/// Labels of the UTF-16 family write UTF-8, as encoders for them do not exist.
pub fn save_to_path_with_encoding(
    game: &Game,
    path: impl AsRef<Path>,
    label: &str,
    keep_original: bool,
) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let encoding = encoding_for(label)?;

    let text = game.render();
    let (bytes, used, had_errors) = encoding.encode(&text);
    if had_errors {
        bail!("{} cannot hold every character of the game", used.name());
    }

    let backup = if keep_original && path.exists() {
        let backup = backup_path(path, chrono::Utc::now().timestamp_millis());
        fs::copy(path, &backup)
            .with_context(|| format!("failed to back up {}", path.display()))?;
        info!(from = %path.display(), to = %backup.display(), "kept original");
        Some(backup)
    } else {
        None
    };

    fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), encoding = used.name(), "saved game");
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sgf-rust-{}-{}", fastrand::u64(..), name))
    }

    #[test]
    fn test_save_and_load() {
        let game = load_from_str("(;GM[1];B[aa];W[bb])").unwrap();
        let path = temp_path("save.sgf");

        assert_eq!(save_to_path(&game, &path, true).unwrap(), None);
        let loaded = load_from_path(&path).unwrap();
        assert!(loaded.is_same_game(&game));

        let before = chrono::Utc::now().timestamp_millis();
        let backup = save_to_path(&game, &path, true).unwrap().unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), game.render());
        let stamp: i64 = backup
            .to_string_lossy()
            .rsplit(".orig.")
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(stamp >= before);

        fs::remove_file(&path).unwrap();
        fs::remove_file(&backup).unwrap();
    }

    #[test]
    fn test_load_from_reader() {
        let game = load_from_reader("(;B[aa];W[bb])".as_bytes()).unwrap();
        assert_eq!(game.no_moves(), 2);
        assert!(load_from_reader("(;B[aa]".as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_from_path(temp_path("missing.sgf")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_save_and_load_with_encoding() {
        let game = load_from_str("(;GM[1]PB[芝野虎丸]PW[井山裕太];B[pd];W[dp])").unwrap();
        let path = temp_path("sjis.sgf");

        save_to_path_with_encoding(&game, &path, "shift_jis", false).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(std::str::from_utf8(&bytes).is_err());

        let loaded = load_from_path_with_encoding(&path, "Shift_JIS").unwrap();
        assert_eq!(loaded.property("PB"), Some("芝野虎丸"));
        assert!(loaded.is_same_game(&game));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unknown_or_unfit_encoding() {
        let game = load_from_str("(;C[黑];B[aa])").unwrap();
        let path = temp_path("latin1.sgf");

        let err = save_to_path_with_encoding(&game, &path, "klingon", false).unwrap_err();
        assert!(err.to_string().contains("unknown encoding"));
        assert!(save_to_path_with_encoding(&game, &path, "iso-8859-1", false).is_err());
        assert!(!path.exists());

        assert!(load_from_path_with_encoding(&path, "klingon").is_err());
    }

    #[test]
    fn test_backup_path() {
        let path = Path::new("/tmp/game.sgf");
        assert_eq!(backup_path(path, 42), PathBuf::from("/tmp/game.sgf.orig.42"));
    }
}
