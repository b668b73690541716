//! Stateless algorithms over a [`GameTree`].
//!
//! Everything here takes a tree and node handles and never keeps state
//! between calls. Traversal follows one fixed order: depth-first, first
//! child first, backtracking to the nearest ancestor with a later sibling
//! variation. It visits every node of the tree exactly once.

use std::fmt::Write as _;

use crate::board::{BLACK_WHITE, GoColor, Move};
use crate::node::{MarkType, NodeId};
use crate::tree::GameTree;

pub fn root(tree: &GameTree, node: NodeId) -> NodeId {
    let mut node = node;
    while let Some(father) = tree.node(node).father() {
        node = father;
    }
    node
}

/// Number of father links to the root.
pub fn depth(tree: &GameTree, node: NodeId) -> usize {
    let mut depth = 0;
    let mut node = node;
    while let Some(father) = tree.node(node).father() {
        depth += 1;
        node = father;
    }
    depth
}

/// Number of nodes with a move on the path from the root to `node`,
/// including `node` itself.
pub fn move_number(tree: &GameTree, node: NodeId) -> usize {
    let mut count = 0;
    let mut current = Some(node);
    while let Some(id) = current {
        let n = tree.node(id);
        if n.get_move().is_some() {
            count += 1;
        }
        current = n.father();
    }
    count
}

/// Number of moves in the main variation after `node`.
pub fn moves_left(tree: &GameTree, node: NodeId) -> usize {
    let mut count = 0;
    let mut node = node;
    while let Some(child) = tree.node(node).first_child() {
        if tree.node(child).get_move().is_some() {
            count += 1;
        }
        node = child;
    }
    count
}

/// End of the main variation starting at `node`.
pub fn last(tree: &GameTree, node: NodeId) -> NodeId {
    let mut node = node;
    while let Some(child) = tree.node(node).first_child() {
        node = child;
    }
    node
}

/// Up to `n` steps toward the root.
pub fn backward(tree: &GameTree, node: NodeId, n: usize) -> NodeId {
    let mut node = node;
    for _ in 0..n {
        match tree.node(node).father() {
            Some(father) => node = father,
            None => break,
        }
    }
    node
}

/// Up to `n` steps along the main variation.
pub fn forward(tree: &GameTree, node: NodeId, n: usize) -> NodeId {
    let mut node = node;
    for _ in 0..n {
        match tree.node(node).first_child() {
            Some(child) => node = child,
            None => break,
        }
    }
    node
}

/// Path from `node` up to and including the root.
pub fn path_to_root(tree: &GameTree, node: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        path.push(id);
        current = tree.node(id).father();
    }
    path
}

/// Fill `path` with the nodes from the root down to `node`, reusing its
/// allocation.
pub fn path_from_root_into(tree: &GameTree, node: NodeId, path: &mut Vec<NodeId>) {
    path.clear();
    let mut current = Some(node);
    while let Some(id) = current {
        path.push(id);
        current = tree.node(id).father();
    }
    path.reverse();
}

/// Deepest node that is an ancestor-or-self of both `a` and `b`.
pub fn common_ancestor(tree: &GameTree, a: NodeId, b: NodeId) -> NodeId {
    let (mut a, mut b) = (a, b);
    let (mut depth_a, mut depth_b) = (depth(tree, a), depth(tree, b));
    while depth_a > depth_b {
        a = tree.node(a).father().expect("depth above zero");
        depth_a -= 1;
    }
    while depth_b > depth_a {
        b = tree.node(b).father().expect("depth above zero");
        depth_b -= 1;
    }
    while a != b {
        a = tree.node(a).father().expect("nodes of one tree share the root");
        b = tree.node(b).father().expect("nodes of one tree share the root");
    }
    a
}

/// Next node in traversal order, `None` after the last node.
pub fn next_node(tree: &GameTree, node: NodeId) -> Option<NodeId> {
    if let Some(child) = tree.node(node).first_child() {
        return Some(child);
    }
    let mut node = node;
    loop {
        if let Some(sibling) = tree.variation_after(node) {
            return Some(sibling);
        }
        node = tree.node(node).father()?;
    }
}

/// Like [`next_node`], but never leaves the subtree of `subtree_root`.
pub fn next_node_in_subtree(
    tree: &GameTree,
    node: NodeId,
    subtree_root: NodeId,
) -> Option<NodeId> {
    if let Some(child) = tree.node(node).first_child() {
        return Some(child);
    }
    let mut node = node;
    loop {
        if node == subtree_root {
            return None;
        }
        if let Some(sibling) = tree.variation_after(node) {
            return Some(sibling);
        }
        node = tree.node(node).father()?;
    }
}

/// Previous node in traversal order, `None` at the root.
pub fn previous_node(tree: &GameTree, node: NodeId) -> Option<NodeId> {
    let father = tree.node(node).father()?;
    match tree.variation_before(node) {
        Some(sibling) => {
            let mut node = sibling;
            while let Some(&child) = tree.node(node).children().last() {
                node = child;
            }
            Some(node)
        }
        None => Some(father),
    }
}

/// Number of nodes in the subtree of `node`, including `node`.
pub fn subtree_size(tree: &GameTree, node: NodeId) -> usize {
    let mut count = 0;
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        count += 1;
        stack.extend_from_slice(tree.node(id).children());
    }
    count
}

/// True if the subtree of `node` has more than `limit` nodes. Stops counting
/// as soon as the limit is passed.
pub fn subtree_greater_than(tree: &GameTree, node: NodeId, limit: usize) -> bool {
    let mut count = 0;
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        count += 1;
        if count > limit {
            return true;
        }
        stack.extend_from_slice(tree.node(id).children());
    }
    false
}

/// True if every node from the root to `node` is a first child.
pub fn is_in_main_variation(tree: &GameTree, node: NodeId) -> bool {
    let mut node = node;
    while let Some(father) = tree.node(node).father() {
        if tree.node(father).first_child() != Some(node) {
            return false;
        }
        node = father;
    }
    true
}

/// Last ancestor-or-self of `node` that lies on the main variation.
pub fn back_to_main_variation(tree: &GameTree, node: NodeId) -> NodeId {
    let mut result = node;
    let mut current = node;
    while let Some(father) = tree.node(current).father() {
        if tree.node(father).first_child() != Some(current) {
            result = father;
        }
        current = father;
    }
    result
}

/// Reorder children along the path to `node` so it lies on the main
/// variation.
pub fn make_main_variation(tree: &mut GameTree, node: NodeId) {
    let mut node = node;
    while let Some(father) = tree.node(node).father() {
        tree.make_first_child(father, node);
        node = father;
    }
}

/// First child of `node` holding exactly `mv`.
pub fn child_with_move(tree: &GameTree, node: NodeId, mv: Move) -> Option<NodeId> {
    tree.node(node)
        .children()
        .iter()
        .copied()
        .find(|&c| tree.node(c).get_move() == Some(mv))
}

/// Variation string of `node`: the 1-based child index taken at every
/// ancestor with more than one child, joined by `.`.
pub fn variation_string(tree: &GameTree, node: NodeId) -> String {
    let mut indices = Vec::new();
    let mut node = node;
    while let Some(father) = tree.node(node).father() {
        let f = tree.node(father);
        if f.child_count() > 1 {
            let index = f.child_index(node).expect("father lists its child");
            indices.push(index + 1);
        }
        node = father;
    }
    let mut s = String::new();
    for (i, index) in indices.iter().rev().enumerate() {
        if i > 0 {
            s.push('.');
        }
        let _ = write!(s, "{index}");
    }
    s
}

/// Inverse of [`variation_string`]: the first node of the variation line the
/// string names. Empty string gives `root`; a malformed or out-of-range token
/// gives `None`.
pub fn find_by_variation(tree: &GameTree, root: NodeId, variation: &str) -> Option<NodeId> {
    let variation = variation.trim();
    if variation.is_empty() {
        return Some(root);
    }
    let indices = variation
        .split('.')
        .map(|token| token.trim().parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    let mut node = root;
    for index in indices {
        while tree.node(node).child_count() == 1 {
            node = tree.node(node).child(0);
        }
        let n = tree.node(node);
        if index < 1 || index > n.child_count() {
            return None;
        }
        node = n.child(index - 1);
    }
    Some(node)
}

/// Node holding move number `n`, searching back toward the root when `n` is
/// at most the move number of `node`, else forward along the main variation.
/// `n == 0` finds the root. `None` if `n` is past the end of the main
/// variation.
pub fn find_by_move_number(tree: &GameTree, node: NodeId, n: usize) -> Option<NodeId> {
    let mut number = move_number(tree, node);
    if n > number + moves_left(tree, node) {
        return None;
    }
    let mut node = node;
    if n <= number {
        loop {
            let current = tree.node(node);
            if number <= n && current.get_move().is_some() {
                break;
            }
            let Some(father) = current.father() else {
                break;
            };
            if current.get_move().is_some() {
                number -= 1;
            }
            node = father;
        }
    } else {
        while number < n {
            let child = tree.node(node).first_child()?;
            if tree.node(child).get_move().is_some() {
                number += 1;
            }
            node = child;
        }
    }
    Some(node)
}

/// Next node after `start` in traversal order whose comment contains
/// `pattern`, ignoring case.
pub fn find_in_comments(tree: &GameTree, start: NodeId, pattern: &str) -> Option<NodeId> {
    let pattern = pattern.to_lowercase();
    let mut node = next_node(tree, start);
    while let Some(id) = node {
        if let Some(comment) = tree.node(id).comment() {
            if comment.to_lowercase().contains(&pattern) {
                return Some(id);
            }
        }
        node = next_node(tree, id);
    }
    None
}

/// Multi-line summary of a node for debugging front ends.
pub fn node_info(tree: &GameTree, node: NodeId) -> String {
    let n = tree.node(node);
    let mut s = String::new();
    let _ = writeln!(s, "NodeId: {node}");
    let _ = writeln!(s, "Depth: {}", depth(tree, node));
    let _ = writeln!(s, "MoveNumber: {}", move_number(tree, node));
    let _ = writeln!(s, "Variation: {}", variation_string(tree, node));
    let _ = writeln!(s, "Children: {}", n.child_count());
    if let Some(mv) = n.get_move() {
        let _ = writeln!(s, "Move: {mv}");
    }
    for color in [GoColor::Black, GoColor::White, GoColor::Empty] {
        let setup = n.setup(color);
        if !setup.is_empty() {
            let points: Vec<String> = setup.iter().map(ToString::to_string).collect();
            let _ = writeln!(s, "Add{}: {}", color.uppercase_letter(), points.join(" "));
        }
    }
    if let Some(player) = n.player() {
        let _ = writeln!(s, "Player: {player}");
    }
    for mark in MarkType::ALL {
        let marked = n.marked(mark);
        if !marked.is_empty() {
            let points: Vec<String> = marked.iter().map(ToString::to_string).collect();
            let _ = writeln!(s, "{mark:?}: {}", points.join(" "));
        }
    }
    for color in BLACK_WHITE {
        if let Some(ms) = n.time_left(color) {
            let _ = writeln!(s, "TimeLeft{}: {ms}ms", color.uppercase_letter());
        }
        if let Some(moves) = n.moves_left(color) {
            let _ = writeln!(s, "MovesLeft{}: {moves}", color.uppercase_letter());
        }
    }
    if let Some(comment) = n.comment() {
        let _ = writeln!(s, "Comment: {comment}");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    fn mv(color: GoColor, x: usize) -> Move {
        Move::play(color, Point::new(x, 0))
    }

    fn add(tree: &mut GameTree, father: NodeId, mv: Option<Move>) -> NodeId {
        let id = match mv {
            Some(mv) => tree.create_move_node(mv),
            None => tree.create_node(),
        };
        tree.append(father, id);
        id
    }

    /// root -> a -> b -> c, with b2 a second child of a, and d2 a second
    /// child of b2's only child d.
    struct Sample {
        tree: GameTree,
        root: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        b2: NodeId,
        d: NodeId,
        d2: NodeId,
        e: NodeId,
    }

    fn sample() -> Sample {
        let mut tree = GameTree::new(9);
        let root = tree.root();
        let a = add(&mut tree, root, Some(mv(GoColor::Black, 0)));
        let b = add(&mut tree, a, Some(mv(GoColor::White, 1)));
        let c = add(&mut tree, b, Some(mv(GoColor::Black, 2)));
        let b2 = add(&mut tree, a, Some(mv(GoColor::White, 3)));
        let d = add(&mut tree, b2, None);
        let e = add(&mut tree, d, Some(mv(GoColor::Black, 4)));
        let d2 = add(&mut tree, d, Some(mv(GoColor::Black, 5)));
        Sample {
            tree,
            root,
            a,
            b,
            c,
            b2,
            d,
            d2,
            e,
        }
    }

    #[test]
    fn test_traversal_order() {
        let s = sample();
        let mut order = vec![s.root];
        let mut node = s.root;
        while let Some(next) = next_node(&s.tree, node) {
            order.push(next);
            node = next;
        }
        assert_eq!(order, vec![s.root, s.a, s.b, s.c, s.b2, s.d, s.e, s.d2]);

        let mut reverse = vec![node];
        while let Some(prev) = previous_node(&s.tree, node) {
            reverse.push(prev);
            node = prev;
        }
        reverse.reverse();
        assert_eq!(reverse, order);
    }

    #[test]
    fn test_next_node_in_subtree() {
        let s = sample();
        assert_eq!(next_node_in_subtree(&s.tree, s.b, s.b), Some(s.c));
        assert_eq!(next_node_in_subtree(&s.tree, s.c, s.b), None);
        assert_eq!(next_node_in_subtree(&s.tree, s.e, s.b2), Some(s.d2));
        assert_eq!(next_node_in_subtree(&s.tree, s.d2, s.b2), None);
    }

    #[test]
    fn test_depth_and_move_number() {
        let s = sample();
        assert_eq!(depth(&s.tree, s.root), 0);
        assert_eq!(depth(&s.tree, s.e), 4);
        assert_eq!(move_number(&s.tree, s.root), 0);
        assert_eq!(move_number(&s.tree, s.c), 3);
        assert_eq!(move_number(&s.tree, s.d), 2);
        assert_eq!(move_number(&s.tree, s.e), 3);
        assert_eq!(moves_left(&s.tree, s.root), 3);
        assert_eq!(moves_left(&s.tree, s.b2), 1);
        assert_eq!(last(&s.tree, s.root), s.c);
        assert_eq!(root(&s.tree, s.d2), s.root);
    }

    #[test]
    fn test_backward_forward_stop_at_ends() {
        let s = sample();
        assert_eq!(backward(&s.tree, s.c, 2), s.a);
        assert_eq!(backward(&s.tree, s.c, 10), s.root);
        assert_eq!(forward(&s.tree, s.root, 2), s.b);
        assert_eq!(forward(&s.tree, s.root, 10), s.c);
        assert_eq!(forward(&s.tree, s.c, 0), s.c);
    }

    #[test]
    fn test_variation_string() {
        let s = sample();
        assert_eq!(variation_string(&s.tree, s.root), "");
        assert_eq!(variation_string(&s.tree, s.a), "");
        assert_eq!(variation_string(&s.tree, s.b), "1");
        assert_eq!(variation_string(&s.tree, s.c), "1");
        assert_eq!(variation_string(&s.tree, s.b2), "2");
        assert_eq!(variation_string(&s.tree, s.e), "2.1");
        assert_eq!(variation_string(&s.tree, s.d2), "2.2");
    }

    #[test]
    fn test_find_by_variation() {
        let s = sample();
        let t = &s.tree;
        assert_eq!(find_by_variation(t, s.root, ""), Some(s.root));
        assert_eq!(find_by_variation(t, s.root, "1"), Some(s.b));
        assert_eq!(find_by_variation(t, s.root, "2"), Some(s.b2));
        assert_eq!(find_by_variation(t, s.root, "2.1"), Some(s.e));
        assert_eq!(find_by_variation(t, s.root, "2.2"), Some(s.d2));
        assert_eq!(find_by_variation(t, s.root, "3"), None);
        assert_eq!(find_by_variation(t, s.root, "0"), None);
        assert_eq!(find_by_variation(t, s.root, "1.1"), None);
        assert_eq!(find_by_variation(t, s.root, "x"), None);
        assert_eq!(find_by_variation(t, s.root, "2..1"), None);
    }

    #[test]
    fn test_find_by_move_number() {
        let s = sample();
        let t = &s.tree;
        assert_eq!(find_by_move_number(t, s.root, 0), Some(s.root));
        assert_eq!(find_by_move_number(t, s.root, 2), Some(s.b));
        assert_eq!(find_by_move_number(t, s.root, 3), Some(s.c));
        assert_eq!(find_by_move_number(t, s.root, 4), None);
        assert_eq!(find_by_move_number(t, s.c, 1), Some(s.a));
        assert_eq!(find_by_move_number(t, s.c, 0), Some(s.root));
        // d has no move; searching back from e skips it
        assert_eq!(find_by_move_number(t, s.e, 2), Some(s.b2));
        assert_eq!(find_by_move_number(t, s.d, 3), Some(s.e));
        assert_eq!(find_by_move_number(t, s.d, 2), Some(s.b2));
    }

    #[test]
    fn test_subtree_size() {
        let s = sample();
        assert_eq!(subtree_size(&s.tree, s.root), 8);
        assert_eq!(subtree_size(&s.tree, s.b2), 4);
        assert!(subtree_greater_than(&s.tree, s.root, 7));
        assert!(!subtree_greater_than(&s.tree, s.root, 8));
        assert!(!subtree_greater_than(&s.tree, s.c, 1));
    }

    #[test]
    fn test_main_variation_helpers() {
        let mut s = sample();
        assert!(is_in_main_variation(&s.tree, s.c));
        assert!(!is_in_main_variation(&s.tree, s.e));
        assert_eq!(back_to_main_variation(&s.tree, s.e), s.a);
        assert_eq!(back_to_main_variation(&s.tree, s.c), s.c);
        assert_eq!(common_ancestor(&s.tree, s.c, s.d2), s.a);
        assert_eq!(common_ancestor(&s.tree, s.e, s.d2), s.d);

        make_main_variation(&mut s.tree, s.d2);
        assert!(is_in_main_variation(&s.tree, s.d2));
        assert_eq!(last(&s.tree, s.root), s.d2);
        assert_eq!(variation_string(&s.tree, s.d2), "1.1");
    }

    #[test]
    fn test_child_with_move() {
        let s = sample();
        assert_eq!(child_with_move(&s.tree, s.a, mv(GoColor::White, 3)), Some(s.b2));
        assert_eq!(child_with_move(&s.tree, s.a, mv(GoColor::Black, 3)), None);
    }

    #[test]
    fn test_find_in_comments() {
        let mut s = sample();
        s.tree.node_mut(s.c).set_comment(Some("Black Resigns"));
        s.tree.node_mut(s.d2).set_comment(Some("resigns too"));
        assert_eq!(find_in_comments(&s.tree, s.root, "resigns"), Some(s.c));
        assert_eq!(find_in_comments(&s.tree, s.c, "RESIGNS"), Some(s.d2));
        assert_eq!(find_in_comments(&s.tree, s.d2, "resigns"), None);
    }

    #[test]
    fn test_node_info() {
        let s = sample();
        let info = node_info(&s.tree, s.e);
        assert!(info.contains("Variation: 2.1"));
        assert!(info.contains("Move: B E1"));
        assert!(!info.contains("Triangle"));
    }

    #[test]
    fn test_node_info_lists_markup() {
        let mut s = sample();
        s.tree.node_mut(s.e).add_marked(Point::new(2, 2), MarkType::Triangle);
        s.tree.node_mut(s.e).add_marked(Point::new(3, 3), MarkType::Triangle);
        s.tree.node_mut(s.e).add_marked(Point::new(0, 0), MarkType::TerritoryWhite);
        let info = node_info(&s.tree, s.e);
        assert!(info.contains("Triangle: C3 D4"));
        assert!(info.contains("TerritoryWhite: A1"));
        assert!(!info.contains("Circle"));
    }
}
