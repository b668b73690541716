//! The game tree: an arena of [`Node`]s addressed by [`NodeId`] handles.
//!
//! The tree owns every node. Structural changes (append, remove, reorder)
//! go through `&mut GameTree`; read-only collaborators only ever see
//! `&GameTree` and `&Node` and cannot touch the structure.
//!
//! Handles carry the id of the tree that created them. Using a handle with a
//! different tree, or after its node was removed, is a bug in the caller and
//! panics.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::board::Move;
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::node::{Node, NodeId};
use crate::time_settings::TimeSettings;

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(1);

/// Game metadata that applies to a node and its descendants until another
/// node overrides it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameInfo {
    pub komi: Option<f64>,
    pub rules: Option<String>,
    pub handicap: Option<u32>,
    pub time_settings: Option<TimeSettings>,
    pub player_black: Option<String>,
    pub player_white: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
}

impl GameInfo {
    pub fn with_komi(komi: f64) -> Self {
        Self {
            komi: Some(komi),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct GameTree {
    id: u32,
    board_size: usize,
    root: NodeId,
    /// Removed nodes leave `None` behind; slots are never reused so stale
    /// handles are detected instead of aliasing a new node.
    nodes: Vec<Option<Node>>,
    live: usize,
}

impl GameTree {
    /// A tree with an empty root carrying default game information.
    pub fn new(board_size: usize) -> Self {
        Self::with_game_info(board_size, GameInfo::default())
    }

    /// # Panics
    /// Panics if `board_size` is outside the supported range.
    pub fn with_game_info(board_size: usize, info: GameInfo) -> Self {
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size),
            "board size {board_size} out of range"
        );
        let id = NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
        let mut root = Node::new();
        root.set_game_info(Some(info));
        Self {
            id,
            board_size,
            root: NodeId { tree: id, index: 0 },
            nodes: vec![Some(root)],
            live: 1,
        }
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree, including detached ones not yet appended.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// True if `id` was created by this tree and has not been removed.
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.id && self.nodes.get(id.slot()).is_some_and(Option::is_some)
    }

    fn check(&self, id: NodeId) {
        assert!(id.tree == self.id, "node {id} belongs to another tree");
    }

    /// # Panics
    /// Panics if `id` belongs to another tree or was removed.
    pub fn node(&self, id: NodeId) -> &Node {
        self.check(id);
        match self.nodes.get(id.slot()) {
            Some(Some(node)) => node,
            _ => panic!("node {id} was removed"),
        }
    }

    /// Mutable access to a node's own fields. Structure stays read-only
    /// through this reference.
    ///
    /// # Panics
    /// Panics if `id` belongs to another tree or was removed.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.check(id);
        match self.nodes.get_mut(id.slot()) {
            Some(Some(node)) => node,
            _ => panic!("node {id} was removed"),
        }
    }

    /// Allocate a detached node. It joins the tree with [`append`](Self::append).
    pub fn create_node(&mut self) -> NodeId {
        self.insert(Node::new())
    }

    pub fn create_move_node(&mut self, mv: Move) -> NodeId {
        self.insert(Node::with_move(mv))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let index = u32::try_from(self.nodes.len()).expect("node arena exhausted");
        self.nodes.push(Some(node));
        self.live += 1;
        NodeId {
            tree: self.id,
            index,
        }
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `father`.
    ///
    /// # Panics
    /// Panics if `child` already has a father or is the root.
    pub fn append(&mut self, father: NodeId, child: NodeId) {
        assert!(child != self.root, "cannot append the root");
        assert!(father != child, "cannot append a node to itself");
        assert!(
            self.node(child).father.is_none(),
            "node {child} already has a father"
        );
        let mut ancestor = Some(father);
        while let Some(id) = ancestor {
            assert!(id != child, "appending {child} under {father} would create a cycle");
            ancestor = self.node(id).father;
        }
        self.node_mut(child).father = Some(father);
        self.node_mut(father).children.push(child);
    }

    /// Remove `child` and its whole subtree from `father`.
    ///
    /// # Panics
    /// Panics if `child` is not a child of `father`.
    pub fn remove_child(&mut self, father: NodeId, child: NodeId) {
        let index = self
            .node(father)
            .child_index(child)
            .unwrap_or_else(|| panic!("node {child} is not a child of {father}"));
        self.node_mut(father).children.remove(index);
        self.free_subtree(child);
    }

    /// Remove all children of `father` and their subtrees.
    pub fn remove_children(&mut self, father: NodeId) {
        let children = std::mem::take(&mut self.node_mut(father).children);
        for child in children {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, top: NodeId) {
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes[id.slot()].take() {
                self.live -= 1;
                stack.extend(node.children);
            }
        }
    }

    /// Move `child` to index 0 of `father`'s children, keeping the relative
    /// order of the others.
    ///
    /// # Panics
    /// Panics if `child` is not a child of `father`.
    pub fn make_first_child(&mut self, father: NodeId, child: NodeId) {
        let index = self
            .node(father)
            .child_index(child)
            .unwrap_or_else(|| panic!("node {child} is not a child of {father}"));
        self.node_mut(father).children[..=index].rotate_right(1);
    }

    /// Sibling before `child` in its father's children.
    pub fn variation_before(&self, child: NodeId) -> Option<NodeId> {
        let father = self.node(self.node(child).father?);
        let index = father.child_index(child)?;
        index.checked_sub(1).map(|i| father.child(i))
    }

    /// Sibling after `child` in its father's children.
    pub fn variation_after(&self, child: NodeId) -> Option<NodeId> {
        let father = self.node(self.node(child).father?);
        let index = father.child_index(child)?;
        father.children().get(index + 1).copied()
    }

    /// True if the main variation passes a node with more than one child.
    pub fn has_variations(&self) -> bool {
        let mut node = self.root;
        loop {
            let n = self.node(node);
            if n.child_count() > 1 {
                return true;
            }
            match n.first_child() {
                Some(child) => node = child,
                None => return false,
            }
        }
    }

    /// Drop every variation off the main line.
    pub fn keep_only_main_variation(&mut self) {
        let mut node = self.root;
        loop {
            let children = &mut self.node_mut(node).children;
            if children.len() > 1 {
                let dropped: Vec<NodeId> = children.drain(1..).collect();
                for child in dropped {
                    self.free_subtree(child);
                }
            }
            match self.node(node).first_child() {
                Some(child) => node = child,
                None => break,
            }
        }
        log::debug!("kept only main variation, {} nodes left", self.live);
    }

    // -------------------------------------------------------------------------
    // Game information
    // -------------------------------------------------------------------------

    /// Nearest ancestor-or-self carrying game information.
    pub fn game_information_node(&self, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let n = self.node(current);
            if n.game_info().is_some() {
                return current;
            }
            match n.father() {
                Some(father) => current = father,
                None => return self.root,
            }
        }
    }

    /// Game information in effect at `node`.
    pub fn game_information(&self, node: NodeId) -> &GameInfo {
        let info_node = self.game_information_node(node);
        self.node(info_node)
            .game_info()
            .expect("root always carries game information")
    }

    /// Attach game information to `node`; for the root, `None` resets to
    /// defaults since the root always carries some.
    pub fn set_game_information(&mut self, node: NodeId, info: Option<GameInfo>) {
        let info = if node == self.root {
            Some(info.unwrap_or_default())
        } else {
            info
        };
        self.node_mut(node).set_game_info(info);
    }

    /// Mutable game information in effect at `node`.
    pub fn game_information_mut(&mut self, node: NodeId) -> &mut GameInfo {
        let info_node = self.game_information_node(node);
        self.node_mut(info_node)
            .game_info_mut()
            .expect("root always carries game information")
    }
}
