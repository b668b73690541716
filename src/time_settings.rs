//! Time control settings: main time plus optional Japanese byoyomi.
//!
//! The compact text form is `<main>[+<byoyomi>/<moves>]`, e.g. `5+1/3` for
//! five minutes main time followed by one minute per three moves. Numbers are
//! minutes unless suffixed with `s`/`sec`, `m`/`min` or `h`.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MSEC_PER_HOUR, MSEC_PER_MIN, MSEC_PER_SEC};

/// Error returned by [`TimeSettings::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    #[error("empty time specification")]
    Empty,

    #[error("invalid time value '{0}'")]
    InvalidTime(String),

    #[error("invalid number of byoyomi moves '{0}'")]
    InvalidMoves(String),

    #[error("byoyomi needs a number of moves ('<main>+<byoyomi>/<moves>')")]
    MissingMoves,

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Main time and optional byoyomi, all durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeSettings {
    pre_byoyomi: i64,
    byoyomi: i64,
    byoyomi_moves: u32,
}

impl TimeSettings {
    /// Sudden death: `total` milliseconds for the whole game.
    ///
    /// # Panics
    /// Panics if `total` is not positive.
    pub fn new(total: i64) -> Self {
        assert!(total > 0, "main time must be positive");
        Self {
            pre_byoyomi: total,
            byoyomi: 0,
            byoyomi_moves: 0,
        }
    }

    /// Main time followed by periods of `byoyomi` ms per `byoyomi_moves` moves.
    ///
    /// # Panics
    /// Panics on a negative main time or a non-positive byoyomi period.
    pub fn with_byoyomi(pre_byoyomi: i64, byoyomi: i64, byoyomi_moves: u32) -> Self {
        assert!(pre_byoyomi >= 0, "main time must not be negative");
        assert!(byoyomi > 0, "byoyomi time must be positive");
        assert!(byoyomi_moves > 0, "byoyomi moves must be positive");
        Self {
            pre_byoyomi,
            byoyomi,
            byoyomi_moves,
        }
    }

    pub fn pre_byoyomi(&self) -> i64 {
        self.pre_byoyomi
    }

    pub fn use_byoyomi(&self) -> bool {
        self.byoyomi_moves > 0
    }

    /// Length of one byoyomi period.
    ///
    /// # Panics
    /// Panics if byoyomi is not used.
    pub fn byoyomi(&self) -> i64 {
        assert!(self.use_byoyomi(), "byoyomi not configured");
        self.byoyomi
    }

    /// Moves per byoyomi period.
    ///
    /// # Panics
    /// Panics if byoyomi is not used.
    pub fn byoyomi_moves(&self) -> u32 {
        assert!(self.use_byoyomi(), "byoyomi not configured");
        self.byoyomi_moves
    }

    /// Parse the compact form, e.g. `"10"`, `"5+1/3"`, `"90s+30s/1"`.
    pub fn parse(s: &str) -> Result<Self, ParseTimeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseTimeError::Empty);
        }
        let Some((main, overtime)) = s.split_once('+') else {
            if s.contains('/') {
                return Err(ParseTimeError::InvalidTime(s.to_string()));
            }
            let pre = parse_duration(s)?;
            if pre <= 0 {
                return Err(ParseTimeError::NotPositive("main time"));
            }
            return Ok(Self::new(pre));
        };

        let pre = parse_duration(main)?;
        let (byoyomi, moves) = overtime
            .split_once('/')
            .ok_or(ParseTimeError::MissingMoves)?;
        let byoyomi = parse_duration(byoyomi)?;
        if byoyomi <= 0 {
            return Err(ParseTimeError::NotPositive("byoyomi time"));
        }
        let moves = moves.trim();
        let moves: u32 = moves
            .parse()
            .map_err(|_| ParseTimeError::InvalidMoves(moves.to_string()))?;
        if moves == 0 {
            return Err(ParseTimeError::NotPositive("byoyomi moves"));
        }
        Ok(Self::with_byoyomi(pre, byoyomi, moves))
    }
}

impl FromStr for TimeSettings {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_duration(f, self.pre_byoyomi)?;
        if self.use_byoyomi() {
            f.write_str("+")?;
            write_duration(f, self.byoyomi)?;
            write!(f, "/{}", self.byoyomi_moves)?;
        }
        Ok(())
    }
}

/// Parse one duration with an optional unit suffix; minutes by default.
fn parse_duration(s: &str) -> Result<i64, ParseTimeError> {
    let t = s.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = t.strip_suffix("min") {
        (n, MSEC_PER_MIN)
    } else if let Some(n) = t.strip_suffix("sec") {
        (n, MSEC_PER_SEC)
    } else if let Some(n) = t.strip_suffix('m') {
        (n, MSEC_PER_MIN)
    } else if let Some(n) = t.strip_suffix('s') {
        (n, MSEC_PER_SEC)
    } else if let Some(n) = t.strip_suffix('h') {
        (n, MSEC_PER_HOUR)
    } else {
        (t.as_str(), MSEC_PER_MIN)
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseTimeError::InvalidTime(s.trim().to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ParseTimeError::InvalidTime(s.trim().to_string()));
    }
    Ok((value * factor as f64).round() as i64)
}

fn write_duration(f: &mut fmt::Formatter<'_>, ms: i64) -> fmt::Result {
    if ms % MSEC_PER_MIN == 0 {
        write!(f, "{}", ms / MSEC_PER_MIN)
    } else if ms % MSEC_PER_SEC == 0 {
        write!(f, "{}s", ms / MSEC_PER_SEC)
    } else {
        write!(f, "{}s", ms as f64 / MSEC_PER_SEC as f64)
    }
}
