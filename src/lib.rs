//! go-record: the in-memory game record of a Go front end.
//!
//! A [`GameTree`](tree::GameTree) of moves and variations with per-node
//! annotations, a [`Game`](game::Game) facade that keeps a cursor, a live
//! board and a byoyomi-aware game [`Clock`](clock::Clock) consistent, and a
//! GTP-style [`Shell`](shell::Shell) driving it over text.
//!
//! ## Modules
//!
//! - [`constants`] - Board size limits, default komi, time units
//! - [`board`] - Colors, points, moves, the `Board` trait and `Goban`
//! - [`node`] - Tree nodes and their annotations
//! - [`tree`] - The node arena and game information
//! - [`node_util`] - Navigation, search and variation strings
//! - [`board_updater`] - Replays a node's path onto a board
//! - [`time_settings`] - Main time and byoyomi, with parsing
//! - [`clock`] - The game clock and its display ticker
//! - [`game`] - The game facade
//! - [`shell`] - GTP-style command interpreter
//!
//! ## Example
//!
//! ```
//! use go_record::board::{Board, GoColor, Move, Point};
//! use go_record::game::Game;
//! use go_record::node_util;
//!
//! let mut game = Game::new(9);
//! game.play(Move::play(GoColor::Black, Point::new(4, 4)));
//! game.play(Move::play(GoColor::White, Point::new(2, 2)));
//!
//! // Try a different answer to the first move
//! game.backward(1);
//! game.play(Move::play(GoColor::White, Point::new(6, 6)));
//! assert_eq!(node_util::variation_string(game.tree(), game.current()), "2");
//! assert_eq!(game.board().color(Point::new(2, 2)), GoColor::Empty);
//! ```

pub mod board;
pub mod board_updater;
pub mod clock;
pub mod constants;
pub mod game;
pub mod node;
pub mod node_util;
pub mod shell;
pub mod time_settings;
pub mod tree;
