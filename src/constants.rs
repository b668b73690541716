//! Constants for board geometry, game defaults and clock timing.
//!
//! Board size is a runtime property of each [`GameTree`](crate::tree::GameTree);
//! the values here only bound and seed it.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when nothing else is requested.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Smallest board the coordinate system accepts.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest board expressible with the letters A-Z minus I.
pub const MAX_BOARD_SIZE: usize = 25;

/// Column letters, skipping 'I' (Go convention to avoid confusion with 'J').
pub const COLUMN_LETTERS: &[u8; MAX_BOARD_SIZE] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Game Defaults
// =============================================================================

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f64 = 6.5;

// =============================================================================
// Time Units
// =============================================================================

pub const MSEC_PER_SEC: i64 = 1_000;

pub const MSEC_PER_MIN: i64 = 60 * MSEC_PER_SEC;

pub const MSEC_PER_HOUR: i64 = 60 * MSEC_PER_MIN;

/// Period of the display-only clock ticker.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);
