//! Parent-linked binary tree used for expressions.
//!
//! # Design
//!
//! Nodes live in an arena of generation-tagged slots and link to each other
//! by `NodeId`. A [`TreeIter`] is a copyable handle that may be null; every
//! accessor validates it against the arena, so a handle to an erased node
//! fails with `Tree node is empty.` instead of reading a reused slot.
//!
//! Structural edits keep `parent`, `left`, `right` and the root mutually
//! consistent. Freed slots are recycled; cloning compacts the arena.

use std::fmt;

use cov_value::{ensure_sufficient_stack, RuntimeError};

/// Arena slot index plus the generation it was allocated in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Handle to a tree position. The default handle is null.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TreeIter(Option<NodeId>);

impl TreeIter {
    pub const NULL: TreeIter = TreeIter(None);

    pub fn is_null(self) -> bool {
        self.0.is_none()
    }

    pub fn node_id(self) -> Option<NodeId> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

struct Node<T> {
    data: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<T> Node<T> {
    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

pub struct BinaryTree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> Default for BinaryTree<T> {
    fn default() -> Self {
        BinaryTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }
}

impl<T> BinaryTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-node tree.
    pub fn with_root(data: T) -> Self {
        let mut tree = Self::new();
        let id = tree.alloc(data, None);
        tree.root = Some(id);
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn root(&self) -> TreeIter {
        TreeIter(self.root)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn swap(&mut self, other: &mut BinaryTree<T>) {
        std::mem::swap(self, other);
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn resolve(&self, it: TreeIter) -> Result<NodeId, RuntimeError> {
        it.0.filter(|&id| self.node(id).is_some())
            .ok_or_else(RuntimeError::empty_tree_node)
    }

    /// Whether `it` denotes a live node of this tree.
    pub fn usable(&self, it: TreeIter) -> bool {
        self.resolve(it).is_ok()
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "trees never approach u32::MAX nodes"
    )]
    fn alloc(&mut self, data: T, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            data,
            parent,
            left: None,
            right: None,
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Release `id` and everything below it.
    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index as usize)
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.len -= 1;
                pending.extend(node.left);
                pending.extend(node.right);
            }
        }
    }

    /// Point whichever link referenced `old` (a parent's child or the root)
    /// at `new`.
    fn relink(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent.and_then(|p| self.node_mut(p)) {
            Some(node) if node.left == Some(old) => node.left = new,
            Some(node) if node.right == Some(old) => node.right = new,
            _ => self.root = new,
        }
    }

    fn set_parent(&mut self, id: Option<NodeId>, parent: Option<NodeId>) {
        if let Some(node) = id.and_then(|id| self.node_mut(id)) {
            node.parent = parent;
        }
    }

    pub fn data(&self, it: TreeIter) -> Result<&T, RuntimeError> {
        let id = self.resolve(it)?;
        self.node(id)
            .map(|node| &node.data)
            .ok_or_else(RuntimeError::empty_tree_node)
    }

    pub fn data_mut(&mut self, it: TreeIter) -> Result<&mut T, RuntimeError> {
        let id = self.resolve(it)?;
        self.node_mut(id)
            .map(|node| &mut node.data)
            .ok_or_else(RuntimeError::empty_tree_node)
    }

    pub fn left(&self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        let id = self.resolve(it)?;
        Ok(TreeIter(self.node(id).and_then(|node| node.left)))
    }

    pub fn right(&self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        let id = self.resolve(it)?;
        Ok(TreeIter(self.node(id).and_then(|node| node.right)))
    }

    /// Parent of `it`; null for the root.
    pub fn parent(&self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        let id = self.resolve(it)?;
        Ok(TreeIter(self.node(id).and_then(|node| node.parent)))
    }

    fn insert_root(&mut self, it: TreeIter, data: T, side: Side) -> Result<TreeIter, RuntimeError> {
        if it.0 == self.root {
            let old_root = self.root;
            let id = self.alloc(data, None);
            if let Some(node) = self.node_mut(id) {
                *node.child_mut(side) = old_root;
            }
            self.set_parent(old_root, Some(id));
            self.root = Some(id);
            return Ok(TreeIter(Some(id)));
        }
        let target = self.resolve(it)?;
        let parent = self.node(target).and_then(|node| node.parent);
        let id = self.alloc(data, parent);
        if let Some(node) = self.node_mut(id) {
            *node.child_mut(side) = Some(target);
        }
        self.relink(parent, target, Some(id));
        self.set_parent(Some(target), Some(id));
        Ok(TreeIter(Some(id)))
    }

    /// New node above `it` with `it` as its left child. At the root (or on
    /// an empty tree) this creates a new root.
    pub fn insert_root_left(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_root(it, data, Side::Left)
    }

    /// New node above `it` with `it` as its right child.
    pub fn insert_root_right(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_root(it, data, Side::Right)
    }

    /// New node in `it`'s `at` position, chaining the old child on `chain`.
    fn insert_below(
        &mut self,
        it: TreeIter,
        data: T,
        at: Side,
        chain: Side,
    ) -> Result<TreeIter, RuntimeError> {
        let target = self.resolve(it)?;
        let old = self.node(target).and_then(|node| node.child(at));
        let id = self.alloc(data, Some(target));
        if let Some(node) = self.node_mut(id) {
            *node.child_mut(chain) = old;
        }
        self.set_parent(old, Some(id));
        if let Some(node) = self.node_mut(target) {
            *node.child_mut(at) = Some(id);
        }
        Ok(TreeIter(Some(id)))
    }

    pub fn insert_left_left(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_below(it, data, Side::Left, Side::Left)
    }

    pub fn insert_left_right(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_below(it, data, Side::Left, Side::Right)
    }

    pub fn insert_right_left(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_below(it, data, Side::Right, Side::Left)
    }

    pub fn insert_right_right(&mut self, it: TreeIter, data: T) -> Result<TreeIter, RuntimeError> {
        self.insert_below(it, data, Side::Right, Side::Right)
    }

    /// Remove `it` with its subtree; returns the parent (null at the root).
    pub fn erase(&mut self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        let target = self.resolve(it)?;
        let parent = self.node(target).and_then(|node| node.parent);
        self.relink(parent, target, None);
        self.free_subtree(target);
        Ok(TreeIter(parent))
    }

    fn erase_child(&mut self, it: TreeIter, side: Side) -> Result<TreeIter, RuntimeError> {
        let target = self.resolve(it)?;
        let child = self
            .node_mut(target)
            .and_then(|node| node.child_mut(side).take());
        if let Some(child) = child {
            self.free_subtree(child);
        }
        Ok(it)
    }

    pub fn erase_left(&mut self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        self.erase_child(it, Side::Left)
    }

    pub fn erase_right(&mut self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        self.erase_child(it, Side::Right)
    }

    fn reserve(&mut self, it: TreeIter, keep: Side) -> Result<TreeIter, RuntimeError> {
        let target = self.resolve(it)?;
        let (parent, promoted) = match self.node_mut(target) {
            Some(node) => (node.parent, node.child_mut(keep).take()),
            None => return Err(RuntimeError::empty_tree_node()),
        };
        self.relink(parent, target, promoted);
        self.set_parent(promoted, parent);
        self.free_subtree(target);
        Ok(TreeIter(promoted))
    }

    /// Replace `it` by its left child; the right subtree is destroyed.
    pub fn reserve_left(&mut self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        self.reserve(it, Side::Left)
    }

    /// Replace `it` by its right child; the left subtree is destroyed.
    pub fn reserve_right(&mut self, it: TreeIter) -> Result<TreeIter, RuntimeError> {
        self.reserve(it, Side::Right)
    }

    /// Handles in pre-order starting at `it`.
    pub fn preorder(&self, it: TreeIter) -> Vec<TreeIter> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = it.0.into_iter().collect();
        while let Some(id) = pending.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push(TreeIter(Some(id)));
            pending.extend(node.right);
            pending.extend(node.left);
        }
        out
    }
}

impl<T: Clone> BinaryTree<T> {
    fn copy_from(&mut self, other: &BinaryTree<T>, src: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
        let node = other.node(src)?;
        let id = self.alloc(node.data.clone(), parent);
        let left = node
            .left
            .and_then(|left| ensure_sufficient_stack(|| self.copy_from(other, left, Some(id))));
        let right = node
            .right
            .and_then(|right| ensure_sufficient_stack(|| self.copy_from(other, right, Some(id))));
        if let Some(node) = self.node_mut(id) {
            node.left = left;
            node.right = right;
        }
        Some(id)
    }

    /// Overwrite the data at `it` with `other`'s root and replace `it`'s
    /// children by deep copies of `other`'s.
    pub fn merge(&mut self, it: TreeIter, other: &BinaryTree<T>) -> Result<(), RuntimeError> {
        let target = self.resolve(it)?;
        let source = other.resolve(other.root())?;
        let Some(source_node) = other.node(source) else {
            return Err(RuntimeError::empty_tree_node());
        };
        let (old_left, old_right) = match self.node_mut(target) {
            Some(node) => {
                node.data = source_node.data.clone();
                (node.left.take(), node.right.take())
            }
            None => return Err(RuntimeError::empty_tree_node()),
        };
        for child in [old_left, old_right].into_iter().flatten() {
            self.free_subtree(child);
        }
        let left = source_node
            .left
            .and_then(|left| self.copy_from(other, left, Some(target)));
        let right = source_node
            .right
            .and_then(|right| self.copy_from(other, right, Some(target)));
        if let Some(node) = self.node_mut(target) {
            node.left = left;
            node.right = right;
        }
        Ok(())
    }

    /// Deep copy of the subtree at `it` as a standalone tree.
    pub fn from_subtree(&self, it: TreeIter) -> Result<BinaryTree<T>, RuntimeError> {
        let source = self.resolve(it)?;
        let mut tree = BinaryTree::new();
        tree.root = tree.copy_from(self, source, None);
        Ok(tree)
    }
}

impl<T: Clone> Clone for BinaryTree<T> {
    fn clone(&self) -> Self {
        let mut tree = BinaryTree::new();
        if let Some(root) = self.root {
            tree.root = tree.copy_from(self, root, None);
        }
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for BinaryTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<&T> = self
            .preorder(self.root())
            .into_iter()
            .filter_map(|it| self.data(it).ok())
            .collect();
        f.debug_struct("BinaryTree")
            .field("len", &self.len)
            .field("preorder", &nodes)
            .finish()
    }
}
