//! A GTP-style command shell over a [`Game`].
//!
//! The shell speaks the framing of the Go Text Protocol version 2: one
//! command per line with an optional numeric id, answered by `=id result` or
//! `?id error` followed by a blank line. On top of the standard commands it
//! exposes the tree editing and clock operations of [`Game`].
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`,
//!   `known_command <cmd>`, `quit`
//! - `boardsize <size>`, `clear_board`, `komi <value>`
//! - `play <color> <vertex>` - Append a move below the current node
//! - `undo`, `backward [n]`, `forward [n]` - Move the cursor
//! - `goto_move <n>`, `goto_variation <string>`, `variation`
//! - `truncate`, `make_main_variation`, `keep_only_main_variation`
//! - `setup <color|empty> <vertex>`, `comment [text]`
//! - `showboard`, `nodeinfo`
//! - `time_settings <main> <byoyomi> <stones>` - Seconds, as in GTP
//! - `time_left <color> <time> <stones>` - `stones` 0 means main time
//! - `clock`, `restore_clock`
//!
//! ## Example
//!
//! ```
//! use go_record::shell::Shell;
//!
//! let mut shell = Shell::new(9, None, None);
//! let input = "1 play black E5\n2 variation\nquit\n";
//! let mut output = Vec::new();
//! shell.run(input.as_bytes(), &mut output).unwrap();
//! assert!(String::from_utf8(output).unwrap().starts_with("=1 \n\n=2 \n\n"));
//! ```

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail, ensure};

use crate::board::{Board, GoColor, Move, Point};
use crate::clock::ByoyomiState;
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, MSEC_PER_SEC};
use crate::game::Game;
use crate::node_util;
use crate::time_settings::TimeSettings;
use crate::tree::GameInfo;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "backward",
    "boardsize",
    "clear_board",
    "clock",
    "comment",
    "forward",
    "goto_move",
    "goto_variation",
    "keep_only_main_variation",
    "known_command",
    "komi",
    "list_commands",
    "make_main_variation",
    "name",
    "nodeinfo",
    "play",
    "protocol_version",
    "quit",
    "restore_clock",
    "setup",
    "showboard",
    "time_left",
    "time_settings",
    "truncate",
    "undo",
    "variation",
    "version",
];

/// Command interpreter state.
pub struct Shell {
    game: Game,
}

impl Shell {
    /// A shell on an empty board of `size` with optional komi and time
    /// settings.
    pub fn new(size: usize, komi: Option<f64>, time: Option<TimeSettings>) -> Self {
        let info = GameInfo {
            komi,
            time_settings: time,
            ..GameInfo::default()
        };
        Self {
            game: Game::with_game_info(size, info),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (prefix, message) = match self.execute(&command, args) {
                Ok(message) => ('=', message),
                Err(err) => {
                    log::debug!("command {command} failed: {err:#}");
                    ('?', format!("{err:#}"))
                }
            };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n").context("failed to write response")?;
            output.flush().context("failed to flush response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute one command and return its response text.
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let known = KNOWN_COMMANDS.contains(&arg(args, 0)?.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "boardsize" => {
                let size: usize = arg(args, 0)?.parse().context("invalid size")?;
                ensure!(
                    (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
                    "unacceptable size {size}"
                );
                self.new_game(size);
                Ok(String::new())
            }

            "clear_board" => {
                self.new_game(self.game.size());
                Ok(String::new())
            }

            "komi" => {
                let komi: f64 = arg(args, 0)?.parse().context("invalid komi")?;
                self.game.set_komi(komi);
                Ok(String::new())
            }

            "play" => {
                let color = stone_color(arg(args, 0)?)?;
                let vertex = arg(args, 1)?;
                let mv = Move::parse(color, vertex, self.game.size())
                    .ok_or_else(|| anyhow!("invalid vertex {vertex}"))?;
                if let Some(p) = mv.point {
                    ensure!(
                        self.game.board().color(p) == GoColor::Empty,
                        "illegal move"
                    );
                }
                self.game.play(mv);
                Ok(String::new())
            }

            "undo" => {
                ensure!(self.game.current_node().father().is_some(), "cannot undo");
                self.game.backward(1);
                Ok(String::new())
            }

            "backward" => {
                self.game.backward(count(args)?);
                Ok(String::new())
            }

            "forward" => {
                self.game.forward(count(args)?);
                Ok(String::new())
            }

            "goto_move" => {
                let n: usize = arg(args, 0)?.parse().context("invalid move number")?;
                let node = node_util::find_by_move_number(self.game.tree(), self.game.current(), n)
                    .ok_or_else(|| anyhow!("no move number {n}"))?;
                self.game.goto_node(node);
                Ok(String::new())
            }

            "goto_variation" => {
                let variation = args.first().copied().unwrap_or("");
                let tree = self.game.tree();
                let node = node_util::find_by_variation(tree, tree.root(), variation)
                    .ok_or_else(|| anyhow!("no variation {variation}"))?;
                self.game.goto_node(node);
                Ok(String::new())
            }

            "variation" => Ok(node_util::variation_string(
                self.game.tree(),
                self.game.current(),
            )),

            "truncate" => {
                ensure!(
                    self.game.current_node().father().is_some(),
                    "cannot truncate the root"
                );
                self.game.truncate();
                Ok(String::new())
            }

            "make_main_variation" => {
                self.game.make_main_variation();
                Ok(String::new())
            }

            "keep_only_main_variation" => {
                self.game.keep_only_main_variation();
                Ok(String::new())
            }

            "setup" => {
                let color = arg(args, 0)?;
                let color = GoColor::parse(color).ok_or_else(|| anyhow!("invalid color {color}"))?;
                let point = self.point(arg(args, 1)?)?;
                self.game.setup(point, color);
                Ok(String::new())
            }

            "comment" => {
                if args.is_empty() {
                    return Ok(self.game.current_node().comment().unwrap_or("").to_string());
                }
                self.game.set_comment(Some(&args.join(" ")));
                Ok(String::new())
            }

            "showboard" => Ok(format!("\n{}", self.game.board())),

            "nodeinfo" => Ok(node_util::node_info(self.game.tree(), self.game.current())
                .trim_end()
                .to_string()),

            "time_settings" => {
                let main = seconds(arg(args, 0)?)?;
                let byoyomi = seconds(arg(args, 1)?)?;
                let stones: u32 = arg(args, 2)?.parse().context("invalid stones")?;
                ensure!(main >= 0 && byoyomi >= 0, "negative time");
                let settings = if byoyomi > 0 && stones > 0 {
                    Some(TimeSettings::with_byoyomi(main, byoyomi, stones))
                } else if byoyomi > 0 {
                    // byoyomi time without stones means no time limit
                    None
                } else if main > 0 {
                    Some(TimeSettings::new(main))
                } else {
                    None
                };
                self.game.set_time_settings(settings);
                Ok(String::new())
            }

            "time_left" => {
                let color = stone_color(arg(args, 0)?)?;
                let time = seconds(arg(args, 1)?)?;
                let stones: u32 = arg(args, 2)?.parse().context("invalid stones")?;
                let state = match stones {
                    0 => ByoyomiState::NotInByoyomi,
                    n => ByoyomiState::InByoyomi(n),
                };
                let mut clock = self.game.clock();
                ensure!(clock.is_initialized(), "no time settings");
                clock.set_time_left(color, time, state);
                Ok(String::new())
            }

            "clock" => Ok(self.game.clock().display().to_string()),

            "restore_clock" => {
                self.game.restore_clock();
                Ok(String::new())
            }

            _ => bail!("unknown command: {command}"),
        }
    }

    fn new_game(&mut self, size: usize) {
        let current = self.game.game_info();
        let info = GameInfo {
            komi: current.komi,
            time_settings: current.time_settings,
            ..GameInfo::default()
        };
        self.game.new_game(size, info);
    }

    fn point(&self, vertex: &str) -> Result<Point> {
        Point::parse(vertex, self.game.size()).ok_or_else(|| anyhow!("invalid vertex {vertex}"))
    }
}

fn arg<'a>(args: &[&'a str], i: usize) -> Result<&'a str> {
    args.get(i).copied().context("missing argument")
}

fn count(args: &[&str]) -> Result<usize> {
    match args.first() {
        Some(n) => n.parse().context("invalid count"),
        None => Ok(1),
    }
}

fn stone_color(s: &str) -> Result<GoColor> {
    GoColor::parse(s)
        .filter(|c| c.is_stone())
        .ok_or_else(|| anyhow!("invalid color {s}"))
}

/// GTP times are whole seconds.
fn seconds(s: &str) -> Result<i64> {
    let secs: i64 = s.parse().with_context(|| format!("invalid time {s}"))?;
    secs.checked_mul(MSEC_PER_SEC)
        .with_context(|| format!("time out of range: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(9, Some(6.5), None)
    }

    fn run(shell: &mut Shell, input: &str) -> String {
        let mut output = Vec::new();
        shell.run(input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Shell::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Shell::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_and_protocol_version() {
        let mut shell = shell();
        assert_eq!(shell.execute("name", &[]).unwrap(), "go-record");
        assert_eq!(shell.execute("protocol_version", &[]).unwrap(), "2");
    }

    #[test]
    fn test_known_command() {
        let mut shell = shell();
        assert_eq!(shell.execute("known_command", &["truncate"]).unwrap(), "true");
        assert_eq!(shell.execute("known_command", &["genmove"]).unwrap(), "false");
        assert!(shell.execute("known_command", &[]).is_err());
    }

    #[test]
    fn test_boardsize() {
        let mut shell = shell();
        assert!(shell.execute("boardsize", &["13"]).is_ok());
        assert_eq!(shell.game().size(), 13);
        assert_eq!(shell.game().game_info().komi, Some(6.5));
        assert!(shell.execute("boardsize", &["26"]).is_err());
        assert!(shell.execute("boardsize", &["x"]).is_err());
    }

    #[test]
    fn test_play_and_undo() {
        let mut shell = shell();
        assert!(shell.execute("play", &["black", "E5"]).is_ok());
        assert!(shell.execute("play", &["white", "E5"]).is_err());
        assert!(shell.execute("play", &["empty", "D4"]).is_err());
        assert!(shell.execute("play", &["white", "Z9"]).is_err());
        assert!(shell.execute("play", &["w", "pass"]).is_ok());
        assert!(shell.execute("undo", &[]).is_ok());
        assert!(shell.execute("undo", &[]).is_ok());
        assert!(shell.execute("undo", &[]).is_err());
        // undo keeps the moves in the tree
        assert_eq!(shell.game().tree().node_count(), 3);
        assert!(shell.execute("forward", &["2"]).is_ok());
        assert_eq!(shell.game().to_move(), GoColor::Black);
    }

    #[test]
    fn test_variations() {
        let mut shell = shell();
        shell.execute("play", &["b", "E5"]).unwrap();
        shell.execute("play", &["w", "C3"]).unwrap();
        shell.execute("undo", &[]).unwrap();
        shell.execute("play", &["w", "G7"]).unwrap();
        assert_eq!(shell.execute("variation", &[]).unwrap(), "2");
        shell.execute("goto_variation", &["1"]).unwrap();
        assert_eq!(shell.game().board().color(Point::new(2, 2)), GoColor::White);
        assert!(shell.execute("goto_variation", &["3"]).is_err());
        shell.execute("goto_move", &["0"]).unwrap();
        assert_eq!(shell.game().current(), shell.game().tree().root());
    }

    #[test]
    fn test_truncate() {
        let mut shell = shell();
        assert!(shell.execute("truncate", &[]).is_err());
        shell.execute("play", &["b", "E5"]).unwrap();
        assert!(shell.execute("truncate", &[]).is_ok());
        assert_eq!(shell.game().tree().node_count(), 1);
    }

    #[test]
    fn test_setup_and_comment() {
        let mut shell = shell();
        shell.execute("setup", &["black", "D4"]).unwrap();
        assert_eq!(shell.game().board().color(Point::new(3, 3)), GoColor::Black);
        assert!(shell.execute("setup", &["red", "D4"]).is_err());
        shell.execute("comment", &["good", "shape"]).unwrap();
        assert_eq!(shell.execute("comment", &[]).unwrap(), "good shape");
    }

    #[test]
    fn test_time_commands() {
        let mut shell = shell();
        assert!(shell.execute("time_left", &["b", "30", "0"]).is_err());
        shell.execute("time_settings", &["300", "60", "5"]).unwrap();
        let settings = shell.game().game_info().time_settings.unwrap();
        assert_eq!(settings, TimeSettings::with_byoyomi(300_000, 60_000, 5));
        shell.execute("time_left", &["white", "45", "3"]).unwrap();
        assert_eq!(shell.execute("clock", &[]).unwrap(), "B 05:00 W 00:45/3");
        let err = shell
            .execute("time_left", &["b", "9223372036854776", "0"])
            .unwrap_err();
        assert!(err.to_string().starts_with("time out of range"));
        assert!(shell.execute("time_settings", &["9223372036854776", "0", "0"]).is_err());
        shell.execute("time_settings", &["0", "0", "0"]).unwrap();
        assert!(shell.game().game_info().time_settings.is_none());
    }

    #[test]
    fn test_run_loop() {
        let mut shell = shell();
        let output = run(&mut shell, "# comment\n\n1 name\nbogus\n2 quit\nname\n");
        assert_eq!(output, "=1 go-record\n\n? unknown command: bogus\n\n=2 \n\n");
    }
}
