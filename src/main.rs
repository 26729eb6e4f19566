//! SGF-Rust: inspect, rewrite and compare Go game records.
//!
//! ## Usage
//!
//! - `sgf-rust info <FILE>` - Show game properties, counts and the main line
//! - `sgf-rust render <FILE>` - Re-serialize a record
//! - `sgf-rust compare <A> <B>` - Check whether two records are the same game
//! - `sgf-rust coord <VALUE>` - Convert between locations and board positions
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sgf_rust::compare::ChildMatching;
use sgf_rust::constants::DEFAULT_BOARD_SIZE;
use sgf_rust::coord::{from_board_position, to_board_position};
use sgf_rust::files::{
    DEFAULT_ENCODING, load_from_path_with_encoding, save_to_path_with_encoding,
};

/// SGF-Rust: Go game record tool
#[derive(Parser)]
#[command(name = "sgf-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Character encoding of the record files ("utf-8", "gb2312", "shift_jis", ...)
    #[arg(short, long, global = true, default_value = DEFAULT_ENCODING)]
    encoding: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show game properties, counts and the main line of a record
    Info {
        file: PathBuf,
    },
    /// Parse a record and write it back out
    Render {
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Back up an existing output file before overwriting it
        #[arg(long, requires = "output")]
        keep_original: bool,
    },
    /// Check whether two records hold the same game
    Compare {
        a: PathBuf,
        b: PathBuf,
        /// Use the older order-sensitive child matching
        #[arg(long)]
        legacy: bool,
    },
    /// Convert a flat location to a board position, or a position to a location
    Coord {
        value: String,
        #[arg(short, long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command, &cli.encoding) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Run one command. `Ok(false)` reports a negative answer, not a failure.
fn run(command: Commands, encoding: &str) -> Result<bool> {
    let load = |path: &PathBuf| load_from_path_with_encoding(path, encoding);
    match command {
        Commands::Info { file } => {
            let game = load(&file)?;
            print_info(&game)?;
        }
        Commands::Render {
            file,
            output,
            keep_original,
        } => {
            let game = load(&file)?;
            match output {
                Some(path) => {
                    if let Some(backup) =
                        save_to_path_with_encoding(&game, &path, encoding, keep_original)?
                    {
                        println!("original kept as {}", backup.display());
                    }
                }
                None => println!("{game}"),
            }
        }
        Commands::Compare { a, b, legacy } => {
            let matching = if legacy {
                ChildMatching::ExistenceOnly
            } else {
                ChildMatching::Bijective
            };
            let same = load(&a)?.is_same_game_with(&load(&b)?, matching);
            println!("{}", if same { "same game" } else { "different games" });
            return Ok(same);
        }
        Commands::Coord { value, size } => {
            let converted = if value.bytes().all(|b| b.is_ascii_digit()) {
                let location = value.parse().context("location does not fit in u32")?;
                to_board_position(location, size)?
            } else {
                from_board_position(&value, size)?.to_string()
            };
            println!("{converted}");
        }
    }
    Ok(true)
}

fn print_info(game: &sgf_rust::Game) -> Result<()> {
    for (key, value) in game.properties() {
        println!("{key}: {value}");
    }
    let totals = game.tree_totals();
    println!("main line: {} moves, {} nodes", game.no_moves(), game.no_nodes());
    println!("whole tree: {} moves, {} nodes", totals.moves, totals.nodes);

    let board_size = game.board_size();
    let mut line = Vec::new();
    for id in game.main_line() {
        let node = game.node(id);
        let Some(color) = node.color() else { continue };
        let position = node
            .move_position(board_size)?
            .unwrap_or_else(|| "pass".to_string());
        line.push(format!("{}{} {}", node.move_no(), color.move_key(), position));
    }
    if !line.is_empty() {
        println!("{}", line.join(" "));
    }
    Ok(())
}
