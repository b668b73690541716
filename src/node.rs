//! A single position in the game tree.
//!
//! A [`Node`] holds what happened at one position: an optional move, setup
//! edits, comment, markup and annotations. Nodes live in the arena of a
//! [`GameTree`](crate::tree::GameTree) and refer to each other through
//! [`NodeId`] handles. The father link is a lookup handle only; the tree owns
//! every node.
//!
//! Most nodes in a recorded game carry nothing but a move (engine self-play
//! traces can have hundreds of thousands of them), so everything else lives
//! in a lazily allocated [`ExtraInfo`].

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

use crate::board::{GoColor, Move, Point};
use crate::tree::GameInfo;

/// Stable handle to a node of one particular tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) tree: u32,
    pub(crate) index: u32,
}

impl NodeId {
    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Kinds of point markup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkType {
    Mark,
    Circle,
    Square,
    Triangle,
    Select,
    TerritoryBlack,
    TerritoryWhite,
}

impl MarkType {
    pub const ALL: [MarkType; 7] = [
        MarkType::Mark,
        MarkType::Circle,
        MarkType::Square,
        MarkType::Triangle,
        MarkType::Select,
        MarkType::TerritoryBlack,
        MarkType::TerritoryWhite,
    ];
}

/// Rarely used node data, allocated on first write.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExtraInfo {
    /// Setup stones: black, white, empty.
    setup: [Vec<Point>; 3],
    player: Option<GoColor>,
    /// Milliseconds left for Black and White after this node's move.
    time_left: [Option<i64>; 2],
    /// Byoyomi moves left for Black and White.
    moves_left: [Option<u32>; 2],
    marked: BTreeMap<MarkType, Vec<Point>>,
    labels: BTreeMap<Point, String>,
    properties: BTreeMap<String, Vec<String>>,
    game_info: Option<GameInfo>,
}

impl ExtraInfo {
    fn is_empty(&self) -> bool {
        self.setup.iter().all(Vec::is_empty)
            && self.player.is_none()
            && self.time_left.iter().all(Option::is_none)
            && self.moves_left.iter().all(Option::is_none)
            && self.marked.values().all(Vec::is_empty)
            && self.labels.is_empty()
            && self.properties.is_empty()
            && self.game_info.is_none()
    }
}

fn setup_slot(color: GoColor) -> usize {
    match color {
        GoColor::Black => 0,
        GoColor::White => 1,
        GoColor::Empty => 2,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    mv: Option<Move>,
    comment: Option<String>,
    pub(crate) father: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 1]>,
    extra: Option<Box<ExtraInfo>>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_move(mv: Move) -> Self {
        Self {
            mv: Some(mv),
            ..Self::default()
        }
    }

    fn extra_mut(&mut self) -> &mut ExtraInfo {
        self.extra.get_or_insert_with(Box::default)
    }

    // -------------------------------------------------------------------------
    // Structure (read-only; mutation goes through GameTree)
    // -------------------------------------------------------------------------

    pub fn father(&self) -> Option<NodeId> {
        self.father
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The `i`-th child.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn child(&self, i: usize) -> NodeId {
        self.children[i]
    }

    /// First child, i.e. the continuation of the main variation.
    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn child_index(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    // -------------------------------------------------------------------------
    // Move and comment
    // -------------------------------------------------------------------------

    pub fn get_move(&self) -> Option<Move> {
        self.mv
    }

    pub fn set_move(&mut self, mv: Option<Move>) {
        self.mv = mv;
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Set the comment; `None` or whitespace-only text removes it.
    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string);
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    pub fn add_black(&mut self, p: Point) {
        self.add_stone(GoColor::Black, p);
    }

    pub fn add_white(&mut self, p: Point) {
        self.add_stone(GoColor::White, p);
    }

    pub fn add_empty(&mut self, p: Point) {
        self.add_stone(GoColor::Empty, p);
    }

    /// Add `p` to the setup list of `color`. A point is kept in at most one
    /// setup list, so it is removed from the other two.
    pub fn add_stone(&mut self, color: GoColor, p: Point) {
        let extra = self.extra_mut();
        let slot = setup_slot(color);
        for (i, list) in extra.setup.iter_mut().enumerate() {
            if i != slot {
                list.retain(|&q| q != p);
            }
        }
        let list = &mut extra.setup[slot];
        if !list.contains(&p) {
            list.push(p);
        }
    }

    /// Remove `p` from all setup lists.
    pub fn remove_setup(&mut self, p: Point) {
        if let Some(extra) = self.extra.as_mut() {
            for list in &mut extra.setup {
                list.retain(|&q| q != p);
            }
        }
    }

    /// Setup points of the given color, in insertion order.
    pub fn setup(&self, color: GoColor) -> &[Point] {
        match &self.extra {
            Some(extra) => &extra.setup[setup_slot(color)],
            None => &[],
        }
    }

    pub fn has_setup(&self) -> bool {
        self.extra
            .as_ref()
            .is_some_and(|e| e.setup.iter().any(|l| !l.is_empty()))
    }

    // -------------------------------------------------------------------------
    // Player to move
    // -------------------------------------------------------------------------

    /// Explicit player-to-move override.
    pub fn player(&self) -> Option<GoColor> {
        self.extra.as_ref().and_then(|e| e.player)
    }

    /// Set or clear the explicit player to move.
    ///
    /// # Panics
    /// Panics if `color` is `Some(Empty)`.
    pub fn set_player(&mut self, color: Option<GoColor>) {
        assert!(color != Some(GoColor::Empty), "player to move must be a stone color");
        if color.is_none() && self.extra.is_none() {
            return;
        }
        self.extra_mut().player = color;
    }

    /// Effective color to move: the explicit override, else the opponent of
    /// this node's move, else unknown.
    pub fn to_move(&self) -> Option<GoColor> {
        self.player().or_else(|| self.mv.map(|m| m.color.other()))
    }

    // -------------------------------------------------------------------------
    // Markup
    // -------------------------------------------------------------------------

    pub fn add_marked(&mut self, p: Point, mark: MarkType) {
        let list = self.extra_mut().marked.entry(mark).or_default();
        if !list.contains(&p) {
            list.push(p);
        }
    }

    pub fn remove_marked(&mut self, p: Point, mark: MarkType) {
        if let Some(extra) = self.extra.as_mut() {
            if let Some(list) = extra.marked.get_mut(&mark) {
                list.retain(|&q| q != p);
                if list.is_empty() {
                    extra.marked.remove(&mark);
                }
            }
        }
    }

    pub fn marked(&self, mark: MarkType) -> &[Point] {
        self.extra
            .as_ref()
            .and_then(|e| e.marked.get(&mark))
            .map_or(&[], Vec::as_slice)
    }

    /// Set the label of `p`; `None` or empty text clears it.
    pub fn set_label(&mut self, p: Point, label: Option<&str>) {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(text) => {
                self.extra_mut().labels.insert(p, text.to_string());
            }
            None => {
                if let Some(extra) = self.extra.as_mut() {
                    extra.labels.remove(&p);
                }
            }
        }
    }

    pub fn label(&self, p: Point) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|e| e.labels.get(&p))
            .map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = (Point, &str)> + '_ {
        self.extra
            .iter()
            .flat_map(|e| e.labels.iter().map(|(p, s)| (*p, s.as_str())))
    }

    // -------------------------------------------------------------------------
    // Time annotations
    // -------------------------------------------------------------------------

    /// Milliseconds left for `color` after this node, if recorded.
    pub fn time_left(&self, color: GoColor) -> Option<i64> {
        self.extra.as_ref().and_then(|e| e.time_left[color.index()])
    }

    pub fn set_time_left(&mut self, color: GoColor, ms: Option<i64>) {
        if ms.is_none() && self.extra.is_none() {
            return;
        }
        self.extra_mut().time_left[color.index()] = ms;
    }

    /// Byoyomi moves left for `color` after this node, if recorded.
    pub fn moves_left(&self, color: GoColor) -> Option<u32> {
        self.extra.as_ref().and_then(|e| e.moves_left[color.index()])
    }

    pub fn set_moves_left(&mut self, color: GoColor, moves: Option<u32>) {
        if moves.is_none() && self.extra.is_none() {
            return;
        }
        self.extra_mut().moves_left[color.index()] = moves;
    }

    // -------------------------------------------------------------------------
    // Free-form properties and game info
    // -------------------------------------------------------------------------

    pub fn property(&self, key: &str) -> Option<&[String]> {
        self.extra
            .as_ref()
            .and_then(|e| e.properties.get(key))
            .map(Vec::as_slice)
    }

    pub fn add_property(&mut self, key: &str, value: &str) {
        self.extra_mut()
            .properties
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn remove_property(&mut self, key: &str) {
        if let Some(extra) = self.extra.as_mut() {
            extra.properties.remove(key);
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.extra
            .iter()
            .flat_map(|e| e.properties.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }

    pub fn game_info(&self) -> Option<&GameInfo> {
        self.extra.as_ref().and_then(|e| e.game_info.as_ref())
    }

    pub(crate) fn game_info_mut(&mut self) -> Option<&mut GameInfo> {
        self.extra.as_mut().and_then(|e| e.game_info.as_mut())
    }

    pub(crate) fn set_game_info(&mut self, info: Option<GameInfo>) {
        if info.is_none() && self.extra.is_none() {
            return;
        }
        self.extra_mut().game_info = info;
    }

    /// True if the node holds no move, comment or side data.
    pub fn is_empty(&self) -> bool {
        self.mv.is_none()
            && self.comment.is_none()
            && self.extra.as_ref().is_none_or(|e| e.is_empty())
    }

    /// Setup and move flattened into a move sequence for alternating-play
    /// consumers.
    ///
    /// Setup black, then white, then empty (as moves of color `Empty`), then
    /// the node's move. When the color to move is known and the sequence does
    /// not end with a stone of the opposite color, a pass of that color is
    /// appended.
    pub fn all_as_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = [GoColor::Black, GoColor::White, GoColor::Empty]
            .into_iter()
            .flat_map(|c| self.setup(c).iter().map(move |&p| Move::play(c, p)))
            .collect();
        if let Some(mv) = self.mv {
            moves.push(mv);
        }
        if let Some(to_move) = self.to_move() {
            let last_color = moves.iter().rev().map(|m| m.color).find(|c| c.is_stone());
            if let Some(last_color) = last_color {
                if last_color != to_move.other() {
                    moves.push(Move::pass(to_move.other()));
                }
            }
        }
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: Point = Point::new(2, 2);
    const P2: Point = Point::new(6, 6);

    #[test]
    fn test_plain_move_node_has_no_extra() {
        let node = Node::with_move(Move::play(GoColor::Black, P1));
        assert!(node.extra.is_none());
        assert_eq!(node.to_move(), Some(GoColor::White));
        assert!(!node.is_empty());
        assert!(Node::new().is_empty());
    }

    #[test]
    fn test_setup_lists_are_exclusive() {
        let mut node = Node::new();
        node.add_black(P1);
        node.add_black(P1);
        assert_eq!(node.setup(GoColor::Black), &[P1]);
        node.add_white(P1);
        assert!(node.setup(GoColor::Black).is_empty());
        assert_eq!(node.setup(GoColor::White), &[P1]);
        node.remove_setup(P1);
        assert!(!node.has_setup());
    }

    #[test]
    fn test_all_as_moves_unknown_to_move() {
        let mut node = Node::new();
        node.add_black(P1);
        node.add_white(P2);
        assert_eq!(node.to_move(), None);
        assert_eq!(
            node.all_as_moves(),
            vec![Move::play(GoColor::Black, P1), Move::play(GoColor::White, P2)]
        );
    }

    #[test]
    fn test_all_as_moves_black_to_move_needs_no_pass() {
        let mut node = Node::new();
        node.add_black(P1);
        node.add_white(P2);
        node.set_player(Some(GoColor::Black));
        assert_eq!(
            node.all_as_moves(),
            vec![Move::play(GoColor::Black, P1), Move::play(GoColor::White, P2)]
        );
    }

    #[test]
    fn test_all_as_moves_white_to_move_appends_black_pass() {
        let mut node = Node::new();
        node.add_black(P1);
        node.add_white(P2);
        node.set_player(Some(GoColor::White));
        assert_eq!(
            node.all_as_moves(),
            vec![
                Move::play(GoColor::Black, P1),
                Move::play(GoColor::White, P2),
                Move::pass(GoColor::Black),
            ]
        );
    }

    #[test]
    fn test_all_as_moves_empty_setup_after_stones() {
        let mut node = Node::new();
        node.add_black(P1);
        node.add_empty(P2);
        node.set_player(Some(GoColor::White));
        let moves = node.all_as_moves();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1], Move::play(GoColor::Empty, P2));
    }

    #[test]
    fn test_all_as_moves_with_move() {
        let mut node = Node::with_move(Move::play(GoColor::White, P2));
        node.add_black(P1);
        assert_eq!(
            node.all_as_moves(),
            vec![Move::play(GoColor::Black, P1), Move::play(GoColor::White, P2)]
        );
    }

    #[test]
    fn test_comment_clears_on_blank() {
        let mut node = Node::new();
        node.set_comment(Some("good move"));
        assert_eq!(node.comment(), Some("good move"));
        node.set_comment(Some("  "));
        assert!(!node.has_comment());
    }

    #[test]
    fn test_marks_and_labels() {
        let mut node = Node::new();
        node.add_marked(P1, MarkType::Triangle);
        node.add_marked(P1, MarkType::Triangle);
        assert_eq!(node.marked(MarkType::Triangle), &[P1]);
        assert!(node.marked(MarkType::Circle).is_empty());
        node.remove_marked(P1, MarkType::Triangle);
        assert!(node.marked(MarkType::Triangle).is_empty());

        node.set_label(P2, Some("A"));
        assert_eq!(node.label(P2), Some("A"));
        assert_eq!(node.labels().count(), 1);
        node.set_label(P2, None);
        assert_eq!(node.label(P2), None);
        assert!(node.is_empty());
    }

    #[test]
    fn test_time_annotations() {
        let mut node = Node::new();
        node.set_time_left(GoColor::Black, Some(12_000));
        node.set_moves_left(GoColor::Black, Some(4));
        assert_eq!(node.time_left(GoColor::Black), Some(12_000));
        assert_eq!(node.moves_left(GoColor::Black), Some(4));
        assert_eq!(node.time_left(GoColor::White), None);
    }

    #[test]
    fn test_properties() {
        let mut node = Node::new();
        node.add_property("GN", "first");
        node.add_property("GN", "second");
        assert_eq!(node.property("GN").unwrap().len(), 2);
        node.remove_property("GN");
        assert!(node.property("GN").is_none());
    }
}
