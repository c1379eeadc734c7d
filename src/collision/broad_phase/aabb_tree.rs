use core::cmp::Ordering;
use std::collections::BinaryHeap;

use indexmap::IndexSet;
use slab::Slab;

use crate::{data_structures::pair_key::PairKey, prelude::*};

/// A handle to a node in an [`AabbTree`].
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
enum NodeKind {
    Leaf(BodyId),
    Internal { child1: NodeId, child2: NodeId },
}

#[derive(Clone, Debug)]
struct Node {
    aabb: Aabb,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// A dynamic bounding volume hierarchy over body AABBs.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Every internal node
/// has exactly two children and bounds their union. Leaves store one body and the
/// body's enlarged AABB as of its last insertion, so small motions do not require
/// any tree update.
///
/// New leaves are placed with a branch-and-bound search for the sibling that
/// minimizes the total increase in internal node area.
#[derive(Clone, Debug, Default)]
pub struct AabbTree {
    nodes: Slab<Node>,
    root: Option<NodeId>,
    leaf_count: usize,
}

/// A sibling candidate in the insertion search, ordered so that the
/// [`BinaryHeap`] pops the lowest cost bound first.
struct Candidate {
    node: NodeId,
    inherited_cost: Scalar,
    lower_bound: Scalar,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.lower_bound.total_cmp(&other.lower_bound) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.lower_bound.total_cmp(&self.lower_bound)
    }
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.leaf_count = 0;
    }

    /// Returns the body stored in a leaf.
    pub fn body(&self, node: NodeId) -> Option<BodyId> {
        match self.nodes.get(node)?.kind {
            NodeKind::Leaf(body) => Some(body),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Returns the enlarged AABB stored in a node.
    pub fn fat_aabb(&self, node: NodeId) -> Option<Aabb> {
        self.nodes.get(node).map(|n| n.aabb)
    }

    /// Inserts a leaf for `body` with its tight `aabb` grown by `margin` on every side.
    pub fn insert(&mut self, body: BodyId, aabb: Aabb, margin: Scalar) -> NodeId {
        let leaf = self.nodes.insert(Node {
            aabb: aabb.grow(margin),
            parent: None,
            kind: NodeKind::Leaf(body),
        });
        self.leaf_count += 1;
        self.insert_leaf(leaf);
        leaf
    }

    /// Removes a leaf. Nodes that are not leaves of this tree are ignored.
    pub fn remove(&mut self, node: NodeId) {
        if !matches!(
            self.nodes.get(node).map(|n| n.kind),
            Some(NodeKind::Leaf(_))
        ) {
            return;
        }
        self.detach_leaf(node);
        self.nodes.remove(node);
        self.leaf_count -= 1;
    }

    /// Moves a leaf to a new tight `aabb`.
    ///
    /// The leaf is only reinserted if `aabb` escapes the enlarged box stored in the tree.
    /// Returns `true` if the tree structure changed.
    pub fn update(&mut self, node: NodeId, aabb: Aabb, margin: Scalar) -> bool {
        let Some(stored) = self.nodes.get(node) else {
            return false;
        };
        if !matches!(stored.kind, NodeKind::Leaf(_)) || stored.aabb.contains(&aabb) {
            return false;
        }

        self.detach_leaf(node);
        self.nodes[node].aabb = aabb.grow(margin);
        self.insert_leaf(node);
        true
    }

    /// Returns the bodies whose enlarged AABB contains `point`.
    pub fn query_point(&self, point: Vector) -> Vec<BodyId> {
        self.query(|aabb| aabb.contains_point(point))
    }

    /// Returns the bodies whose enlarged AABB intersects `region`.
    pub fn query_region(&self, region: Aabb) -> Vec<BodyId> {
        self.query(|aabb| aabb.intersects(&region))
    }

    fn query(&self, overlaps: impl Fn(&Aabb) -> bool) -> Vec<BodyId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !overlaps(&node.aabb) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(body) => result.push(body),
                NodeKind::Internal { child1, child2 } => {
                    stack.push(child1);
                    stack.push(child2);
                }
            }
        }

        result
    }

    /// Finds every pair of leaves whose enlarged AABBs overlap.
    ///
    /// Each pair is reported once, in no particular order of its two bodies.
    pub fn collision_pairs(&self) -> Vec<(BodyId, BodyId)> {
        enum Task {
            Within(NodeId),
            Between(NodeId, NodeId),
        }

        let mut pairs = IndexSet::<PairKey>::new();
        let mut stack: Vec<Task> = self.root.map(Task::Within).into_iter().collect();

        while let Some(task) = stack.pop() {
            match task {
                Task::Within(index) => {
                    if let NodeKind::Internal { child1, child2 } = self.nodes[index].kind {
                        stack.push(Task::Within(child1));
                        stack.push(Task::Within(child2));
                        stack.push(Task::Between(child1, child2));
                    }
                }
                Task::Between(a, b) => {
                    let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
                    if !node_a.aabb.intersects(&node_b.aabb) {
                        continue;
                    }
                    match (node_a.kind, node_b.kind) {
                        (NodeKind::Leaf(body_a), NodeKind::Leaf(body_b)) => {
                            pairs.insert(PairKey::new(body_a, body_b));
                        }
                        (NodeKind::Leaf(_), NodeKind::Internal { child1, child2 }) => {
                            stack.push(Task::Between(a, child1));
                            stack.push(Task::Between(a, child2));
                        }
                        (NodeKind::Internal { child1, child2 }, NodeKind::Leaf(_)) => {
                            stack.push(Task::Between(child1, b));
                            stack.push(Task::Between(child2, b));
                        }
                        (
                            NodeKind::Internal {
                                child1: a1,
                                child2: a2,
                            },
                            NodeKind::Internal {
                                child1: b1,
                                child2: b2,
                            },
                        ) => {
                            stack.push(Task::Between(a1, b1));
                            stack.push(Task::Between(a1, b2));
                            stack.push(Task::Between(a2, b1));
                            stack.push(Task::Between(a2, b2));
                        }
                    }
                }
            }
        }

        pairs.into_iter().map(|key| key.get()).collect()
    }

    /// The sum of the areas of all internal nodes. Lower is better.
    pub fn cost(&self) -> Scalar {
        self.nodes
            .iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Internal { .. }))
            .map(|(_, node)| node.aabb.area())
            .sum()
    }

    /// The number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((index, depth)) = stack.pop() {
            height = height.max(depth);
            if let NodeKind::Internal { child1, child2 } = self.nodes[index].kind {
                stack.push((child1, depth + 1));
                stack.push((child2, depth + 1));
            }
        }
        height
    }

    /// Asserts that the tree is well formed.
    ///
    /// Every internal node must bound exactly the union of its children, every child
    /// must point back to its parent, and every stored node must be reachable from the root.
    ///
    /// # Panics
    ///
    /// Panics if the tree is malformed.
    pub fn validate(&self) {
        let Some(root) = self.root else {
            assert!(self.nodes.is_empty(), "empty tree has stray nodes");
            assert_eq!(self.leaf_count, 0);
            return;
        };
        assert_eq!(self.nodes[root].parent, None, "root has a parent");

        let mut visited = 0;
        let mut leaves = 0;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            visited += 1;
            let node = &self.nodes[index];
            match node.kind {
                NodeKind::Leaf(_) => leaves += 1,
                NodeKind::Internal { child1, child2 } => {
                    assert_eq!(self.nodes[child1].parent, Some(index));
                    assert_eq!(self.nodes[child2].parent, Some(index));
                    assert_eq!(
                        node.aabb,
                        self.nodes[child1].aabb.merged(self.nodes[child2].aabb),
                        "internal node {index} does not bound its children"
                    );
                    stack.push(child1);
                    stack.push(child2);
                }
            }
        }

        assert_eq!(visited, self.nodes.len(), "unreachable nodes in tree");
        assert_eq!(leaves, self.leaf_count);
    }

    fn insert_leaf(&mut self, leaf: NodeId) {
        let Some(root) = self.root else {
            self.nodes[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_aabb = self.nodes[leaf].aabb;
        let sibling = self.find_best_sibling(root, leaf_aabb);

        let old_parent = self.nodes[sibling].parent;
        let parent_aabb = self.nodes[sibling].aabb.merged(leaf_aabb);
        let new_parent = self.nodes.insert(Node {
            aabb: parent_aabb,
            parent: old_parent,
            kind: NodeKind::Internal {
                child1: sibling,
                child2: leaf,
            },
        });
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        match old_parent {
            Some(grandparent) => {
                self.replace_child(grandparent, sibling, new_parent);
                self.refit(Some(grandparent));
            }
            None => self.root = Some(new_parent),
        }
    }

    fn find_best_sibling(&self, root: NodeId, leaf_aabb: Aabb) -> NodeId {
        let leaf_area = leaf_aabb.area();

        let mut best = root;
        let mut best_cost = self.nodes[root].aabb.merged(leaf_aabb).area();

        let mut heap = BinaryHeap::new();
        heap.push(Candidate {
            node: root,
            inherited_cost: 0.0,
            lower_bound: leaf_area,
        });

        while let Some(candidate) = heap.pop() {
            if candidate.lower_bound >= best_cost {
                break;
            }

            let node = &self.nodes[candidate.node];
            let direct_cost = node.aabb.merged(leaf_aabb).area();
            let cost = direct_cost + candidate.inherited_cost;
            if cost < best_cost {
                best = candidate.node;
                best_cost = cost;
            }

            if let NodeKind::Internal { child1, child2 } = node.kind {
                let inherited_cost = candidate.inherited_cost + direct_cost - node.aabb.area();
                let lower_bound = leaf_area + inherited_cost;
                if lower_bound < best_cost {
                    for child in [child1, child2] {
                        heap.push(Candidate {
                            node: child,
                            inherited_cost,
                            lower_bound,
                        });
                    }
                }
            }
        }

        best
    }

    /// Unlinks a leaf from the tree without freeing it. Its sibling takes the place of the parent.
    fn detach_leaf(&mut self, leaf: NodeId) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }
        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };
        let NodeKind::Internal { child1, child2 } = self.nodes[parent].kind else {
            return;
        };
        let sibling = if child1 == leaf { child2 } else { child1 };
        let grandparent = self.nodes[parent].parent;

        self.nodes[sibling].parent = grandparent;
        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, parent, sibling);
                self.refit(Some(grandparent));
            }
            None => self.root = Some(sibling),
        }

        self.nodes.remove(parent);
        self.nodes[leaf].parent = None;
    }

    fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: NodeId) {
        if let NodeKind::Internal { child1, child2 } = &mut self.nodes[parent].kind {
            if *child1 == old_child {
                *child1 = new_child;
            } else {
                debug_assert_eq!(*child2, old_child);
                *child2 = new_child;
            }
        }
    }

    /// Recomputes the AABBs of `node` and all of its ancestors.
    fn refit(&mut self, mut node: Option<NodeId>) {
        while let Some(index) = node {
            if let NodeKind::Internal { child1, child2 } = self.nodes[index].kind {
                self.nodes[index].aabb = self.nodes[child1].aabb.merged(self.nodes[child2].aabb);
            }
            node = self.nodes[index].parent;
        }
    }
}
