//! go-record: game record shell for Go.
//!
//! ## Usage
//!
//! - `go-record` - Show a demo
//! - `go-record shell` - Read GTP-style commands from stdin
//! - `go-record demo` - Build a random game with variations and print it

use std::io::{self, Write};

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};

use go_record::board::{GoColor, Move};
use go_record::clock::ClockTicker;
use go_record::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use go_record::game::Game;
use go_record::node_util;
use go_record::shell::Shell;
use go_record::time_settings::TimeSettings;

/// go-record: Go game tree and clock
#[derive(Parser)]
#[command(name = "go-record")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the command shell on stdin/stdout
    Shell {
        /// Board size
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Komi
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f64,
        /// Time settings, e.g. "10" or "5+1/3" (minutes unless suffixed)
        #[arg(long)]
        time: Option<TimeSettings>,
    },
    /// Build a random game with variations and print it
    Demo {
        /// Board size
        #[arg(long, default_value_t = 9)]
        size: usize,
        /// Number of moves to play
        #[arg(long, default_value_t = 40)]
        moves: usize,
        /// Random seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Some(Commands::Shell { size, komi, time }) => {
            check_size(size)?;
            log::info!("shell started, size {size}");
            let mut shell = Shell::new(size, Some(komi), time);
            let _ticker = match time {
                Some(_) => Some(ClockTicker::spawn(shell.game().shared_clock(), |display| {
                    log::trace!("clock: {display}")
                })?),
                None => None,
            };
            shell.run(io::stdin().lock(), io::stdout().lock())
        }
        Some(Commands::Demo { size, moves, seed }) => run_demo(size, moves, seed),
        None => run_demo(9, 40, 1),
    }
}

/// Logs go to stderr so stdout stays clean for the protocol.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn check_size(size: usize) -> Result<()> {
    ensure!(
        (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
        "board size must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}, got {size}"
    );
    Ok(())
}

fn run_demo(size: usize, moves: usize, seed: u64) -> Result<()> {
    check_size(size)?;
    println!("go-record: game tree demo (seed {seed})\n");

    let mut rng = fastrand::Rng::with_seed(seed);
    let mut game = Game::new(size);
    for i in 0..moves {
        // Now and then step back and start a variation
        if i > 0 && rng.u32(0..8) == 0 {
            game.backward(rng.usize(1..=3));
        }
        let empty = game.board().stones(GoColor::Empty);
        let color = game.to_move();
        let mv = if empty.is_empty() {
            Move::pass(color)
        } else {
            Move::play(color, empty[rng.usize(..empty.len())])
        };
        game.play(mv);
    }

    let tree = game.tree();
    println!("=== Final position ===");
    println!("{}", game.board());
    println!(
        "Nodes: {}, move number {}",
        tree.node_count(),
        node_util::move_number(tree, game.current())
    );

    println!("\n=== Variations ===");
    let root = tree.root();
    let mut node = Some(root);
    while let Some(id) = node {
        let father = tree.node(id).father();
        let starts_line = father.is_some_and(|f| tree.node(f).child_count() > 1);
        if starts_line {
            let info = tree
                .node(id)
                .get_move()
                .map(|mv| mv.to_string())
                .unwrap_or_default();
            println!(
                "{:>8}  move {:>3}  {info}",
                node_util::variation_string(tree, id),
                node_util::move_number(tree, id)
            );
        }
        node = node_util::next_node(tree, id);
    }

    println!("\n=== Current node ===");
    print!("{}", node_util::node_info(tree, game.current()));
    Ok(())
}
