// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena nodes and the read-only [`NodeRef`] view.

use alloc::vec::Vec;
use core::fmt::{self, Debug};

use crate::region::{Quadrant, Region};
use crate::tree::QuadTree;

/// Index of a node slot in the tree's arena.
///
/// Parent links are stored as `NodeIdx` and never own anything. A slot released by a
/// merge goes on the free list; nothing keeps an index to it afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind<H> {
    /// Bucket of entity handles.
    Leaf(Vec<H>),
    /// Children in [`Quadrant::ALL`] order.
    Internal([NodeIdx; 4]),
}

#[derive(Clone, Debug)]
pub(crate) struct Node<H> {
    pub(crate) region: Region,
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) depth: usize,
    pub(crate) kind: NodeKind<H>,
}

impl<H> Node<H> {
    pub(crate) fn leaf(region: Region, parent: Option<NodeIdx>, depth: usize) -> Self {
        Self {
            region,
            parent,
            depth,
            kind: NodeKind::Leaf(Vec::new()),
        }
    }
}

/// Borrowed view of one node, for inspection and tests.
///
/// Obtained from [`QuadTree::root`]. A node is either a leaf holding a bucket of
/// handles or an internal node with exactly four children, never both.
pub struct NodeRef<'a, H> {
    tree: &'a QuadTree<H>,
    idx: NodeIdx,
}

impl<H> Clone for NodeRef<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for NodeRef<'_, H> {}

impl<'a, H> NodeRef<'a, H> {
    pub(crate) fn new(tree: &'a QuadTree<H>, idx: NodeIdx) -> Self {
        Self { tree, idx }
    }

    fn node(&self) -> &'a Node<H> {
        self.tree.node(self.idx)
    }

    /// Whether this node stores entities directly.
    pub fn is_leaf(&self) -> bool {
        matches!(self.node().kind, NodeKind::Leaf(_))
    }

    /// The region covered by this node.
    pub fn region(&self) -> Region {
        self.node().region
    }

    /// Distance from the root (the root has depth 0).
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    /// The parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|idx| Self::new(self.tree, idx))
    }

    /// The four children in [`Quadrant::ALL`] order, or `None` for a leaf.
    pub fn children(&self) -> Option<[Self; 4]> {
        match &self.node().kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal(children) => Some(children.map(|idx| Self::new(self.tree, idx))),
        }
    }

    /// The child covering `quadrant`, or `None` for a leaf.
    pub fn child(&self, quadrant: Quadrant) -> Option<Self> {
        self.children().map(|children| children[quadrant.slot()])
    }

    /// Handles stored in this leaf, or `None` for an internal node.
    pub fn entities(&self) -> Option<&'a [H]> {
        match &self.node().kind {
            NodeKind::Leaf(bucket) => Some(bucket.as_slice()),
            NodeKind::Internal(_) => None,
        }
    }

    /// Number of handles stored anywhere in this subtree.
    pub fn subtree_len(&self) -> usize {
        let mut total = 0;
        let mut stack = alloc::vec![self.idx];
        while let Some(idx) = stack.pop() {
            match &self.tree.node(idx).kind {
                NodeKind::Leaf(bucket) => total += bucket.len(),
                NodeKind::Internal(children) => stack.extend_from_slice(children),
            }
        }
        total
    }
}

impl<H> Debug for NodeRef<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        let bucket = match &node.kind {
            NodeKind::Leaf(bucket) => Some(bucket.len()),
            NodeKind::Internal(_) => None,
        };
        f.debug_struct("NodeRef")
            .field("slot", &self.idx.get())
            .field("region", &node.region.rect())
            .field("depth", &node.depth)
            .field("bucket_len", &bucket)
            .finish_non_exhaustive()
    }
}
