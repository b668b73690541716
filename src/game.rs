//! The game facade: a tree, a cursor into it, a live board and a clock.
//!
//! Every change goes through [`Game`], which keeps three things consistent:
//! the board always shows the current node's position, the modified flag is
//! set whenever tree content (not just the cursor) changes, and the clock
//! follows the moves being played.

use parking_lot::MutexGuard;
use std::sync::Arc;

use crate::board::{BLACK_WHITE, Board, GoColor, Goban, Move, Point};
use crate::board_updater::BoardUpdater;
use crate::clock::{ByoyomiState, Clock, SharedClock};
use crate::node::{MarkType, Node, NodeId};
use crate::node_util;
use crate::time_settings::TimeSettings;
use crate::tree::{GameInfo, GameTree};

pub struct Game<B: Board = Goban> {
    tree: GameTree,
    current: NodeId,
    board: B,
    updater: BoardUpdater,
    clock: SharedClock,
    modified: bool,
}

impl Game<Goban> {
    pub fn new(board_size: usize) -> Self {
        Self::with_game_info(board_size, GameInfo::default())
    }

    pub fn with_game_info(board_size: usize, info: GameInfo) -> Self {
        Self::with_parts(
            Goban::new(board_size),
            GameTree::with_game_info(board_size, info),
            Clock::new(),
        )
    }
}

impl<B: Board> Game<B> {
    /// Build a game around an existing tree. The cursor starts at the root
    /// and the clock takes the root's time settings.
    pub fn with_parts(board: B, tree: GameTree, mut clock: Clock) -> Self {
        let root = tree.root();
        clock.set_time_settings(tree.game_information(root).time_settings);
        let mut game = Self {
            tree,
            current: root,
            board,
            updater: BoardUpdater::new(),
            clock: Arc::new(parking_lot::Mutex::new(clock)),
            modified: false,
        };
        game.update_board();
        game
    }

    /// Start over with an empty tree.
    pub fn new_game(&mut self, board_size: usize, info: GameInfo) {
        log::debug!("new game, size {board_size}");
        self.set_tree(GameTree::with_game_info(board_size, info));
    }

    /// Replace the tree, e.g. with one built by a file reader.
    pub fn set_tree(&mut self, tree: GameTree) {
        self.tree = tree;
        self.current = self.tree.root();
        let settings = self.tree.game_information(self.current).time_settings;
        self.clock.lock().set_time_settings(settings);
        self.modified = false;
        self.update_board();
    }

    // -------------------------------------------------------------------------
    // Read-only views
    // -------------------------------------------------------------------------

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn size(&self) -> usize {
        self.tree.board_size()
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &Node {
        self.tree.node(self.current)
    }

    pub fn to_move(&self) -> GoColor {
        self.board.to_move()
    }

    /// Game information in effect at the current node.
    pub fn game_info(&self) -> &GameInfo {
        self.tree.game_information(self.current)
    }

    pub fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock()
    }

    /// Handle for a [`ClockTicker`](crate::clock::ClockTicker).
    pub fn shared_clock(&self) -> SharedClock {
        Arc::clone(&self.clock)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    fn update_board(&mut self) {
        self.updater
            .update(&self.tree, self.current, &mut self.board);
    }

    // -------------------------------------------------------------------------
    // Playing and navigation
    // -------------------------------------------------------------------------

    /// Append `mv` as a new child of the current node and make it current.
    ///
    /// # Panics
    /// Panics if the move's color is `Empty` or its point is off the board.
    pub fn play(&mut self, mv: Move) {
        assert!(mv.color.is_stone(), "move color must be black or white");
        if let Some(p) = mv.point {
            assert!(p.is_on_board(self.size()), "move {mv} is off the board");
        }
        self.clock.lock().stop_move();
        let id = self.tree.create_move_node(mv);
        {
            let clock = self.clock.lock();
            if clock.is_initialized() {
                let color = mv.color;
                let node = self.tree.node_mut(id);
                node.set_time_left(color, clock.time_left(color));
                if clock.time_settings().is_some_and(TimeSettings::use_byoyomi)
                    && clock.is_in_byoyomi(color)
                {
                    node.set_moves_left(color, Some(clock.moves_left(color)));
                }
            }
        }
        self.tree.append(self.current, id);
        self.current = id;
        self.modified = true;
        self.update_board();
        let next = self.board.to_move();
        self.clock.lock().start_move(next);
        log::debug!("played {mv}, {} to move", next);
    }

    /// Up to `n` steps toward the root.
    pub fn backward(&mut self, n: usize) {
        self.current = node_util::backward(&self.tree, self.current, n);
        self.update_board();
    }

    /// Up to `n` steps along the main variation.
    pub fn forward(&mut self, n: usize) {
        self.current = node_util::forward(&self.tree, self.current, n);
        self.update_board();
    }

    /// # Panics
    /// Panics if `node` is not a live node of this game's tree.
    pub fn goto_node(&mut self, node: NodeId) {
        assert!(
            self.tree.contains(node),
            "node {node} is not part of this game's tree"
        );
        self.current = node;
        self.update_board();
    }

    /// Step to the father and delete the old current node with its subtree.
    ///
    /// # Panics
    /// Panics at the root.
    pub fn truncate(&mut self) {
        let old = self.current;
        let father = self
            .current_node()
            .father()
            .expect("cannot truncate the root");
        self.current = father;
        self.tree.remove_child(father, old);
        self.modified = true;
        self.update_board();
        log::debug!("truncated {old}, {} nodes left", self.tree.node_count());
    }

    /// Delete all children of the current node.
    pub fn truncate_children(&mut self) {
        if self.current_node().has_children() {
            self.tree.remove_children(self.current);
            self.modified = true;
        }
    }

    // -------------------------------------------------------------------------
    // Editing the current node
    // -------------------------------------------------------------------------

    /// Make `p` show `color` by editing the current node's setup. When the
    /// father's position already has `color` at `p`, no setup entry is kept.
    pub fn setup(&mut self, p: Point, color: GoColor) {
        assert!(p.is_on_board(self.size()), "setup point {p} is off the board");
        self.tree.node_mut(self.current).remove_setup(p);
        let previous = match self.current_node().father() {
            Some(father) => {
                self.updater.update(&self.tree, father, &mut self.board);
                self.board.color(p)
            }
            None => GoColor::Empty,
        };
        if previous != color {
            self.tree.node_mut(self.current).add_stone(color, p);
        }
        self.modified = true;
        self.update_board();
    }

    /// Set the explicit player to move at the current node.
    pub fn set_to_move(&mut self, color: GoColor) {
        self.tree.node_mut(self.current).set_player(Some(color));
        self.modified = true;
        self.update_board();
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        let node = self.tree.node_mut(self.current);
        let before = node.comment().map(str::to_string);
        node.set_comment(comment);
        if node.comment() != before.as_deref() {
            self.modified = true;
        }
    }

    pub fn set_label(&mut self, p: Point, label: Option<&str>) {
        self.tree.node_mut(self.current).set_label(p, label);
        self.modified = true;
    }

    pub fn add_mark(&mut self, p: Point, mark: MarkType) {
        self.tree.node_mut(self.current).add_marked(p, mark);
        self.modified = true;
    }

    pub fn remove_mark(&mut self, p: Point, mark: MarkType) {
        self.tree.node_mut(self.current).remove_marked(p, mark);
        self.modified = true;
    }

    // -------------------------------------------------------------------------
    // Tree reshaping
    // -------------------------------------------------------------------------

    /// Reorder variations so the current node lies on the main variation.
    pub fn make_main_variation(&mut self) {
        node_util::make_main_variation(&mut self.tree, self.current);
        self.modified = true;
    }

    /// Delete all side variations. A cursor inside one moves back to where
    /// it branched off.
    pub fn keep_only_main_variation(&mut self) {
        self.current = node_util::back_to_main_variation(&self.tree, self.current);
        self.tree.keep_only_main_variation();
        self.modified = true;
        self.update_board();
    }

    /// Replace the tree with a single root whose setup reproduces the
    /// current position.
    pub fn keep_only_position(&mut self) {
        let info = self.game_info().clone();
        let size = self.size();
        let mut tree = GameTree::with_game_info(size, info);
        let root = tree.root();
        let node = tree.node_mut(root);
        for y in 0..size {
            for x in 0..size {
                let p = Point::new(x, y);
                let color = self.board.color(p);
                if color.is_stone() {
                    node.add_stone(color, p);
                }
            }
        }
        node.set_player(Some(self.board.to_move()));
        self.tree = tree;
        self.current = root;
        self.modified = true;
        self.update_board();
    }

    // -------------------------------------------------------------------------
    // Game information
    // -------------------------------------------------------------------------

    pub fn set_komi(&mut self, komi: f64) {
        self.tree.game_information_mut(self.current).komi = Some(komi);
        self.modified = true;
    }

    /// Store time settings in the game information in effect and reconfigure
    /// the clock with them.
    pub fn set_time_settings(&mut self, settings: Option<TimeSettings>) {
        self.tree.game_information_mut(self.current).time_settings = settings;
        self.clock.lock().set_time_settings(settings);
        self.modified = true;
    }

    /// Replace the game information in effect at the current node.
    pub fn set_game_info(&mut self, info: GameInfo) {
        let settings = info.time_settings;
        let node = self.tree.game_information_node(self.current);
        self.tree.set_game_information(node, Some(info));
        self.clock.lock().set_time_settings(settings);
        self.modified = true;
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Start the clock for the color to move.
    pub fn start_clock(&mut self) {
        let color = self.board.to_move();
        self.clock.lock().start_move(color);
    }

    pub fn halt_clock(&mut self) {
        self.clock.lock().halt();
    }

    /// Reset the clock to the time settings in effect at the current node.
    pub fn reset_clock(&mut self) {
        let settings = self.game_info().time_settings;
        self.clock.lock().set_time_settings(settings);
    }

    /// Rebuild the clock from the time-left annotations on the path from
    /// the root to the current node. The clock is left halted.
    pub fn restore_clock(&mut self) {
        let root = self.tree.root();
        let mut clock = self.clock.lock();
        clock.halt();
        for id in node_util::path_to_root(&self.tree, self.current).into_iter().rev() {
            let node = self.tree.node(id);
            if id == root || node.game_info().is_some() {
                clock.set_time_settings(node.game_info().and_then(|info| info.time_settings));
            }
            for color in BLACK_WHITE {
                if let Some(time_left) = node.time_left(color) {
                    let state = node
                        .moves_left(color)
                        .map_or(ByoyomiState::NotInByoyomi, ByoyomiState::InByoyomi);
                    clock.set_time_left(color, time_left, state);
                }
            }
        }
    }
}
