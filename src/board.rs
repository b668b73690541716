//! Value types for points, colors and moves, plus the board abstraction the
//! tree replays into.
//!
//! The [`Board`] trait is all the game tree needs from a board: it is cleared,
//! has setup stones placed, has moves played and gets told whose turn it is.
//! [`Goban`] is a plain 2D implementation that resolves captures; it does not
//! enforce ko or reject occupied points, because recorded data is replayed as
//! given.

use std::fmt;

use crate::constants::{COLUMN_LETTERS, MAX_BOARD_SIZE, MIN_BOARD_SIZE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GoColor {
    Black,
    White,
    Empty,
}

impl GoColor {
    /// The opponent color. `Empty` has no opponent and maps to itself.
    pub fn other(self) -> GoColor {
        match self {
            GoColor::Black => GoColor::White,
            GoColor::White => GoColor::Black,
            GoColor::Empty => GoColor::Empty,
        }
    }

    pub fn is_stone(self) -> bool {
        self != GoColor::Empty
    }

    /// Index into per-player arrays (Black = 0, White = 1).
    ///
    /// # Panics
    /// Panics for `Empty`, which has no per-player slot.
    pub fn index(self) -> usize {
        match self {
            GoColor::Black => 0,
            GoColor::White => 1,
            GoColor::Empty => panic!("GoColor::Empty has no player index"),
        }
    }

    /// Parse `b`/`black`, `w`/`white`, `e`/`empty` (case-insensitive).
    pub fn parse(s: &str) -> Option<GoColor> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(GoColor::Black),
            "w" | "white" => Some(GoColor::White),
            "e" | "empty" => Some(GoColor::Empty),
            _ => None,
        }
    }

    pub fn uppercase_letter(self) -> char {
        match self {
            GoColor::Black => 'B',
            GoColor::White => 'W',
            GoColor::Empty => 'E',
        }
    }
}

impl fmt::Display for GoColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoColor::Black => "black",
            GoColor::White => "white",
            GoColor::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// Both player colors in the order setup lists and clock records use.
pub const BLACK_WHITE: [GoColor; 2] = [GoColor::Black, GoColor::White];

/// A point on the board. `(0, 0)` is the lower-left corner, `A1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn is_on_board(self, size: usize) -> bool {
        self.x < size && self.y < size
    }

    /// Parse a coordinate string (e.g. "D4") for a board of the given size.
    ///
    /// Columns use letters A-Z skipping I; rows count from 1 at the bottom.
    /// Returns `None` for malformed input or points off the board. "pass" is
    /// not a point; see [`Move::parse`].
    pub fn parse(s: &str, size: usize) -> Option<Point> {
        let bytes = s.trim().as_bytes();
        if bytes.len() < 2 {
            return None;
        }
        let col_char = bytes[0].to_ascii_uppercase();
        let x = COLUMN_LETTERS.iter().position(|&c| c == col_char)?;
        let digits = std::str::from_utf8(&bytes[1..]).ok()?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: usize = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        let p = Point::new(x, row - 1);
        p.is_on_board(size).then_some(p)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match COLUMN_LETTERS.get(self.x) {
            Some(&c) => write!(f, "{}{}", c as char, self.y + 1),
            None => write!(f, "({},{})", self.x, self.y),
        }
    }
}

/// A move: a point or a pass, played by a color.
///
/// Moves of color `Empty` only occur in flattened setup sequences
/// (see [`Node::all_as_moves`](crate::node::Node::all_as_moves)), where they
/// stand for removing a stone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub point: Option<Point>,
    pub color: GoColor,
}

impl Move {
    pub const fn play(color: GoColor, point: Point) -> Self {
        Self {
            point: Some(point),
            color,
        }
    }

    pub const fn pass(color: GoColor) -> Self {
        Self { point: None, color }
    }

    pub fn is_pass(&self) -> bool {
        self.point.is_none()
    }

    /// Parse a vertex ("D4" or "pass") for the given color and board size.
    pub fn parse(color: GoColor, vertex: &str, size: usize) -> Option<Move> {
        if vertex.trim().eq_ignore_ascii_case("pass") {
            return Some(Move::pass(color));
        }
        Point::parse(vertex, size).map(|p| Move::play(color, p))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(p) => write!(f, "{} {p}", self.color.uppercase_letter()),
            None => write!(f, "{} pass", self.color.uppercase_letter()),
        }
    }
}

/// The board operations the game tree drives.
///
/// Implementations own all Go-rules semantics; callers never validate.
pub trait Board {
    /// Clear the board and resize it. Black is to move afterwards.
    fn init(&mut self, size: usize);

    fn play(&mut self, mv: Move);

    /// Place setup stones without captures. `empty` removes stones.
    fn setup(&mut self, black: &[Point], white: &[Point], empty: &[Point]);

    fn set_to_move(&mut self, color: GoColor);

    fn color(&self, p: Point) -> GoColor;

    fn size(&self) -> usize;

    fn to_move(&self) -> GoColor;
}

/// Outcome of placing a stone on a [`Goban`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// Opponent stones removed by the move.
    pub captures: usize,
    /// The move left its own group without liberties and that group was removed.
    pub suicide: bool,
}

/// A simple 2D board with capture resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goban {
    size: usize,
    cells: Vec<GoColor>,
    to_move: GoColor,
    /// Stones captured by Black and White.
    captured: [usize; 2],
}

impl Goban {
    pub fn new(size: usize) -> Self {
        let mut board = Self {
            size: 0,
            cells: Vec::new(),
            to_move: GoColor::Black,
            captured: [0; 2],
        };
        board.init(size);
        board
    }

    fn idx(&self, p: Point) -> usize {
        p.y * self.size + p.x
    }

    fn check_on_board(&self, p: Point) {
        assert!(
            p.is_on_board(self.size),
            "point {p} is off the {0}x{0} board",
            self.size
        );
    }

    /// Number of stones the given color has captured.
    pub fn captured(&self, color: GoColor) -> usize {
        self.captured[color.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == GoColor::Empty)
    }

    /// All points holding a stone of the given color, in row-major order.
    pub fn stones(&self, color: GoColor) -> Vec<Point> {
        (0..self.size)
            .flat_map(|y| (0..self.size).map(move |x| Point::new(x, y)))
            .filter(|&p| self.color(p) == color)
            .collect()
    }

    fn neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if p.x > 0 {
            v.push(Point::new(p.x - 1, p.y));
        }
        if p.x + 1 < s {
            v.push(Point::new(p.x + 1, p.y));
        }
        if p.y > 0 {
            v.push(Point::new(p.x, p.y - 1));
        }
        if p.y + 1 < s {
            v.push(Point::new(p.x, p.y + 1));
        }
        v.into_iter()
    }

    /// Put a stone of `color` on `p`, removing opponent groups left without
    /// liberties, then the own group if it has none either.
    ///
    /// An occupied point is overwritten. `Empty` clears the point.
    ///
    /// # Panics
    /// Panics if `p` is off the board.
    pub fn place(&mut self, p: Point, color: GoColor) -> MoveResult {
        self.check_on_board(p);
        let idx = self.idx(p);
        self.cells[idx] = color;
        if color == GoColor::Empty {
            return MoveResult {
                captures: 0,
                suicide: false,
            };
        }

        let opp = color.other();
        let mut to_remove: Vec<Point> = Vec::new();
        let neighbors: Vec<Point> = self.neighbors(p).collect();
        for n in neighbors {
            if self.color(n) == opp && !to_remove.contains(&n) && self.group_liberties(n) == 0 {
                self.collect_group(n, &mut to_remove);
            }
        }
        let captures = to_remove.len();
        for r in to_remove {
            let i = self.idx(r);
            self.cells[i] = GoColor::Empty;
        }
        self.captured[color.index()] += captures;

        if captures == 0 && self.group_liberties(p) == 0 {
            let mut own = Vec::new();
            self.collect_group(p, &mut own);
            for r in &own {
                let i = self.idx(*r);
                self.cells[i] = GoColor::Empty;
            }
            self.captured[opp.index()] += own.len();
            return MoveResult {
                captures: 0,
                suicide: true,
            };
        }
        MoveResult {
            captures,
            suicide: false,
        }
    }

    fn collect_group(&self, start: Point, out: &mut Vec<Point>) -> usize {
        let color = self.color(start);
        let mut stack = vec![start];
        let mut visited = vec![false; self.size * self.size];
        let mut count = 0;
        while let Some(p) = stack.pop() {
            let i = self.idx(p);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.color(p) == color {
                out.push(p);
                count += 1;
                for n in self.neighbors(p) {
                    if !visited[self.idx(n)] && self.color(n) == color {
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    fn group_liberties(&self, start: Point) -> usize {
        let color = self.color(start);
        if color == GoColor::Empty {
            return 0;
        }
        let mut stack = vec![start];
        let mut visited = vec![false; self.size * self.size];
        let mut liberty_seen = vec![false; self.size * self.size];
        let mut liberties = 0;
        while let Some(p) = stack.pop() {
            let i = self.idx(p);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.neighbors(p) {
                let ni = self.idx(n);
                match self.color(n) {
                    GoColor::Empty => {
                        if !liberty_seen[ni] {
                            liberty_seen[ni] = true;
                            liberties += 1;
                        }
                    }
                    c if c == color && !visited[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        liberties
    }
}

impl Board for Goban {
    fn init(&mut self, size: usize) {
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
            "board size {size} out of range"
        );
        self.size = size;
        self.cells.clear();
        self.cells.resize(size * size, GoColor::Empty);
        self.to_move = GoColor::Black;
        self.captured = [0; 2];
    }

    fn play(&mut self, mv: Move) {
        if let Some(p) = mv.point {
            self.place(p, mv.color);
        }
        if mv.color.is_stone() {
            self.to_move = mv.color.other();
        }
    }

    fn setup(&mut self, black: &[Point], white: &[Point], empty: &[Point]) {
        for (points, color) in [
            (black, GoColor::Black),
            (white, GoColor::White),
            (empty, GoColor::Empty),
        ] {
            for &p in points {
                self.check_on_board(p);
                let i = self.idx(p);
                self.cells[i] = color;
            }
        }
    }

    fn set_to_move(&mut self, color: GoColor) {
        self.to_move = color;
    }

    fn color(&self, p: Point) -> GoColor {
        if !p.is_on_board(self.size) {
            return GoColor::Empty;
        }
        self.cells[self.idx(p)]
    }

    fn size(&self) -> usize {
        self.size
    }

    fn to_move(&self) -> GoColor {
        self.to_move
    }
}

impl fmt::Display for Goban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..self.size {
            write!(f, " {}", COLUMN_LETTERS[x] as char)?;
        }
        writeln!(f)?;
        for y in (0..self.size).rev() {
            write!(f, "{:>2}", y + 1)?;
            for x in 0..self.size {
                let ch = match self.color(Point::new(x, y)) {
                    GoColor::Black => 'X',
                    GoColor::White => 'O',
                    GoColor::Empty => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
