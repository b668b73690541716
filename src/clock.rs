//! Game clock for two players with Japanese byoyomi.
//!
//! Each color has its own record and moves independently through
//! not started -> main time -> byoyomi (if configured). In byoyomi a period
//! of `byoyomi` milliseconds covers `byoyomi_moves` moves; when all moves of a
//! period are played the period starts over, whether or not it was overrun.
//! Overrunning a period sets a sticky `exceeded` flag.
//!
//! At most one color runs at a time. Time is read from a [`TimeSource`] so
//! tests can drive the clock without sleeping.
//!
//! Without [`TimeSettings`] the clock still counts up but never runs out.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, select};
use parking_lot::Mutex;

use crate::board::{BLACK_WHITE, GoColor};
use crate::constants::{CLOCK_TICK, MSEC_PER_SEC};
use crate::time_settings::TimeSettings;

/// Monotonic millisecond source.
pub trait TimeSource: Send {
    fn current_millis(&self) -> i64;
}

/// Wall-clock time since the source was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn current_millis(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// A source that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicI64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn current_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Byoyomi status reported by [`Clock::set_time_left`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByoyomiState {
    NotInByoyomi,
    InByoyomi(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TimeRecord {
    /// Milliseconds used in main time, or in the current byoyomi period.
    time: i64,
    in_byoyomi: bool,
    moves_left: u32,
    exceeded: bool,
}

pub struct Clock {
    settings: Option<TimeSettings>,
    records: [TimeRecord; 2],
    running: Option<GoColor>,
    start_time: i64,
    source: Box<dyn TimeSource>,
}

/// A clock shared between the session and a [`ClockTicker`].
pub type SharedClock = Arc<Mutex<Clock>>;

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("settings", &self.settings)
            .field("records", &self.records)
            .field("running", &self.running)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

impl Clock {
    /// An uninitialized clock reading system time.
    pub fn new() -> Self {
        Self::with_time_source(SystemTimeSource::default())
    }

    pub fn with_time_source(source: impl TimeSource + 'static) -> Self {
        Self {
            settings: None,
            records: [TimeRecord::default(); 2],
            running: None,
            start_time: 0,
            source: Box::new(source),
        }
    }

    fn now(&self) -> i64 {
        self.source.current_millis()
    }

    pub fn time_settings(&self) -> Option<&TimeSettings> {
        self.settings.as_ref()
    }

    /// True once time settings are configured.
    pub fn is_initialized(&self) -> bool {
        self.settings.is_some()
    }

    /// Install new settings and reset both records.
    pub fn set_time_settings(&mut self, settings: Option<TimeSettings>) {
        self.settings = settings;
        self.reset();
    }

    /// Stop the clock and clear both records. Settings are kept.
    pub fn reset(&mut self) {
        self.records = [TimeRecord::default(); 2];
        self.running = None;
        self.start_time = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn running_color(&self) -> Option<GoColor> {
        self.running
    }

    fn byoyomi_settings(&self) -> Option<TimeSettings> {
        self.settings.filter(TimeSettings::use_byoyomi)
    }

    /// Start timing a move for `color`, stopping the other color first.
    /// Starting the color that already runs changes nothing.
    ///
    /// # Panics
    /// Panics if `color` is `Empty`.
    pub fn start_move(&mut self, color: GoColor) {
        assert!(color.is_stone(), "cannot start the clock for {color}");
        match self.running {
            Some(running) if running == color => return,
            Some(_) => self.stop_move(),
            None => {}
        }
        self.running = Some(color);
        self.start_time = self.now();
    }

    /// Finish the running color's move and do the byoyomi bookkeeping.
    pub fn stop_move(&mut self) {
        let Some(color) = self.running.take() else {
            return;
        };
        let elapsed = self.now() - self.start_time;
        let byoyomi = self.byoyomi_settings();
        let record = &mut self.records[color.index()];
        record.time += elapsed;
        let Some(settings) = byoyomi else {
            return;
        };
        if !record.in_byoyomi && record.time > settings.pre_byoyomi() {
            record.in_byoyomi = true;
            record.time -= settings.pre_byoyomi();
            record.moves_left = settings.byoyomi_moves();
            log::debug!("{color} entered byoyomi");
        }
        if record.in_byoyomi {
            if record.time > settings.byoyomi() && !record.exceeded {
                record.exceeded = true;
                log::debug!("{color} exceeded byoyomi period");
            }
            record.moves_left = record.moves_left.saturating_sub(1);
            if record.moves_left == 0 {
                record.time = 0;
                record.moves_left = settings.byoyomi_moves();
            }
        }
    }

    /// Pause: book the running color's elapsed time without finishing its
    /// move. Resume with [`start_move`](Self::start_move).
    pub fn halt(&mut self) {
        let Some(color) = self.running.take() else {
            return;
        };
        let elapsed = self.now() - self.start_time;
        self.records[color.index()].time += elapsed;
    }

    /// Override the remaining time for `color`, e.g. from an engine's own
    /// clock report. `InByoyomi(0)` starts a fresh period. A running clock
    /// keeps running with the new values.
    ///
    /// Ignored while the clock has no settings.
    pub fn set_time_left(&mut self, color: GoColor, time_left: i64, state: ByoyomiState) {
        let Some(settings) = self.settings else {
            log::debug!("ignoring time left for {color}: clock has no time settings");
            return;
        };
        let state = match state {
            ByoyomiState::InByoyomi(_) if !settings.use_byoyomi() => {
                log::warn!("ignoring byoyomi state for {color}: byoyomi not configured");
                ByoyomiState::NotInByoyomi
            }
            ByoyomiState::InByoyomi(0) => ByoyomiState::InByoyomi(settings.byoyomi_moves()),
            other => other,
        };
        let was_running = self.running;
        self.halt();
        let record = &mut self.records[color.index()];
        match state {
            ByoyomiState::NotInByoyomi => {
                record.in_byoyomi = false;
                record.time = settings.pre_byoyomi() - time_left;
            }
            ByoyomiState::InByoyomi(moves_left) => {
                record.in_byoyomi = true;
                record.time = settings.byoyomi() - time_left;
                record.moves_left = moves_left;
            }
        }
        if let Some(running) = was_running {
            self.start_move(running);
        }
    }

    fn used_time(&self, color: GoColor) -> i64 {
        let mut time = self.records[color.index()].time;
        if self.running == Some(color) {
            time += self.now() - self.start_time;
        }
        time
    }

    /// Milliseconds left in main time or in the current byoyomi period,
    /// counting a running move. `None` without settings.
    pub fn time_left(&self, color: GoColor) -> Option<i64> {
        let settings = self.settings?;
        let used = self.used_time(color);
        if self.records[color.index()].in_byoyomi {
            Some(settings.byoyomi() - used)
        } else {
            Some(settings.pre_byoyomi() - used)
        }
    }

    /// # Panics
    /// Panics if byoyomi is not configured.
    pub fn is_in_byoyomi(&self, color: GoColor) -> bool {
        assert!(self.byoyomi_settings().is_some(), "byoyomi not configured");
        self.records[color.index()].in_byoyomi
    }

    /// Moves left in the current byoyomi period; a full period before
    /// byoyomi is reached.
    ///
    /// # Panics
    /// Panics if byoyomi is not configured.
    pub fn moves_left(&self, color: GoColor) -> u32 {
        let settings = self.byoyomi_settings().expect("byoyomi not configured");
        let record = &self.records[color.index()];
        if record.in_byoyomi {
            record.moves_left
        } else {
            settings.byoyomi_moves()
        }
    }

    pub fn lost_on_time(&self, color: GoColor) -> bool {
        let Some(settings) = self.settings else {
            return false;
        };
        let record = &self.records[color.index()];
        if settings.use_byoyomi() {
            record.exceeded
        } else {
            record.time > settings.pre_byoyomi()
        }
    }

    /// `MM:SS` or `H:MM:SS`, with `/<moves>` in byoyomi. Counts up without
    /// settings.
    pub fn time_string(&self, color: GoColor) -> String {
        let record = &self.records[color.index()];
        let used = self.used_time(color);
        match self.settings {
            None => format_time(used / MSEC_PER_SEC),
            Some(settings) if record.in_byoyomi => format!(
                "{}/{}",
                format_time((settings.byoyomi() - used) / MSEC_PER_SEC),
                record.moves_left
            ),
            Some(settings) => format_time((settings.pre_byoyomi() - used) / MSEC_PER_SEC),
        }
    }

    /// Display strings for both colors.
    pub fn display(&self) -> ClockDisplay {
        let [black, white] = BLACK_WHITE.map(|c| self.time_string(c));
        ClockDisplay {
            black,
            white,
            running: self.running,
        }
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` when there are hours.
pub fn format_time(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let (hours, minutes, seconds) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}")
    }
}

/// Snapshot of what a clock widget shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDisplay {
    pub black: String,
    pub white: String,
    pub running: Option<GoColor>,
}

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |c: GoColor| if self.running == Some(c) { "*" } else { "" };
        write!(
            f,
            "B {}{} W {}{}",
            self.black,
            mark(GoColor::Black),
            self.white,
            mark(GoColor::White)
        )
    }
}

/// Background thread that hands a fresh [`ClockDisplay`] to a listener once
/// per tick. It only reads the clock.
///
/// Dropping the ticker stops the thread.
pub struct ClockTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ClockTicker {
    /// Tick every [`CLOCK_TICK`].
    pub fn spawn<F>(clock: SharedClock, listener: F) -> std::io::Result<Self>
    where
        F: FnMut(&ClockDisplay) + Send + 'static,
    {
        Self::spawn_with_period(clock, CLOCK_TICK, listener)
    }

    pub fn spawn_with_period<F>(
        clock: SharedClock,
        period: Duration,
        mut listener: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut(&ClockDisplay) + Send + 'static,
    {
        let (stop, stopped) = crossbeam_channel::bounded::<()>(0);
        let ticks = crossbeam_channel::tick(period);
        let handle = std::thread::Builder::new()
            .name("clock-ticker".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticks) -> _ => {
                            let display = clock.lock().display();
                            listener(&display);
                        }
                        // a message or a dropped sender both stop the thread
                        recv(stopped) -> _ => break,
                    }
                }
                log::trace!("clock ticker stopped");
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to finish.
    pub fn stop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("clock ticker listener panicked");
            }
        }
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
