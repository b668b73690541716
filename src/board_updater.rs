//! Rebuild a [`Board`] for any node by replaying the path from the root.
//!
//! Each node on the path contributes, in order: its setup stones, its move,
//! and its explicit player to move. The result only depends on the tree, so
//! updating twice for the same node gives identical boards.

use crate::board::{Board, GoColor, Point};
use crate::node::NodeId;
use crate::node_util;
use crate::tree::GameTree;

/// Replays nodes into a board. Keeps the root-to-node path buffer between
/// calls to avoid reallocating it on every cursor move.
#[derive(Debug, Default)]
pub struct BoardUpdater {
    path: Vec<NodeId>,
}

impl BoardUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `board` to the tree's size and replay root..=`node` into it.
    ///
    /// # Panics
    /// Panics if a node on the path holds a setup stone or move off the
    /// tree's board.
    pub fn update<B: Board + ?Sized>(&mut self, tree: &GameTree, node: NodeId, board: &mut B) {
        let size = tree.board_size();
        board.init(size);
        node_util::path_from_root_into(tree, node, &mut self.path);
        for &id in &self.path {
            let n = tree.node(id);
            let setup = [GoColor::Black, GoColor::White, GoColor::Empty]
                .into_iter()
                .flat_map(|c| n.setup(c).iter().copied());
            for p in setup.chain(n.get_move().and_then(|mv| mv.point)) {
                check_on_board(id, p, size);
            }
            if n.has_setup() {
                board.setup(
                    n.setup(GoColor::Black),
                    n.setup(GoColor::White),
                    n.setup(GoColor::Empty),
                );
            }
            if let Some(mv) = n.get_move() {
                board.play(mv);
            }
            if let Some(player) = n.player() {
                board.set_to_move(player);
            }
        }
        log::trace!("board updated to {node} ({} nodes replayed)", self.path.len());
    }
}

fn check_on_board(id: NodeId, p: Point, size: usize) {
    assert!(
        p.is_on_board(size),
        "node {id} holds point {p} off the {size}x{size} board"
    );
}
