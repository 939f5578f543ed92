// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, insertion, incremental update, merging.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{self, Debug};

use kurbo::Point;

use crate::config::QuadTreeConfig;
use crate::entity::PositionSource;
use crate::error::QuadTreeError;
use crate::node::{Node, NodeIdx, NodeKind, NodeRef};
use crate::region::Region;

/// Work done by one [`QuadTree::update`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Entities moved to a different leaf.
    pub relocated: usize,
    /// Leaves that split because a relocation overflowed them.
    pub split: usize,
    /// Internal nodes collapsed back into leaves.
    pub merged: usize,
}

impl UpdateSummary {
    /// True if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.relocated == 0 && self.split == 0 && self.merged == 0
    }
}

/// Bookkeeping for one mutating operation.
struct Pass<H> {
    /// Handles that must be re-placed, with the node they were taken from.
    strays: Vec<(H, NodeIdx)>,
    summary: UpdateSummary,
    /// First position found outside the root region.
    escaped: Option<Point>,
}

impl<H> Pass<H> {
    fn new() -> Self {
        Self {
            strays: Vec::new(),
            summary: UpdateSummary::default(),
            escaped: None,
        }
    }

    fn finish(self) -> Result<UpdateSummary, QuadTreeError> {
        match self.escaped {
            Some(position) => Err(QuadTreeError::MisplacedEntity { position }),
            None => Ok(self.summary),
        }
    }
}

/// A region quadtree over movable points.
///
/// The tree stores handles of type `H` and reads positions through a
/// [`PositionSource`] passed to each operation. Leaves hold at most
/// [`bucket_size`](Self::bucket_size) handles (except at
/// [`max_depth`](Self::max_depth)); an overflowing leaf splits into four equal
/// quadrants. After the caller moves entities, [`update`](Self::update) re-indexes
/// only the entities that left their leaf and collapses sparse subtrees.
///
/// The tree is single-writer: positions must not change while an operation runs.
pub struct QuadTree<H> {
    nodes: Vec<Option<Node<H>>>,
    free_list: Vec<usize>,
    root: NodeIdx,
    config: QuadTreeConfig,
    len: usize,
}

impl<H> QuadTree<H> {
    /// Access a node; panics if `idx` was released.
    pub(crate) fn node(&self, idx: NodeIdx) -> &Node<H> {
        self.nodes[idx.get()].as_ref().expect("dangling NodeIdx")
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<H> {
        self.nodes[idx.get()].as_mut().expect("dangling NodeIdx")
    }

    pub(crate) fn root_idx(&self) -> NodeIdx {
        self.root
    }

    /// Read-only view of the root node.
    pub fn root(&self) -> NodeRef<'_, H> {
        NodeRef::new(self, self.root)
    }

    /// The region covered by the tree, fixed at construction.
    pub fn region(&self) -> Region {
        self.node(self.root).region
    }

    /// Leaf capacity.
    pub fn bucket_size(&self) -> usize {
        self.config.bucket_size
    }

    /// Depth at which leaves stop splitting.
    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// The configuration the tree was built with.
    pub fn config(&self) -> QuadTreeConfig {
        self.config
    }

    /// Number of stored handles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no handles are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.nodes.iter().flatten().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Remove every handle; the root becomes an empty leaf.
    pub fn clear(&mut self) {
        let region = self.region();
        self.nodes.clear();
        self.nodes.push(Some(Node::leaf(region, None, 0)));
        self.free_list.clear();
        self.root = NodeIdx::new(0);
        self.len = 0;
    }

    fn alloc(&mut self, node: Node<H>) -> NodeIdx {
        if let Some(i) = self.free_list.pop() {
            self.nodes[i] = Some(node);
            NodeIdx::new(i)
        } else {
            self.nodes.push(Some(node));
            NodeIdx::new(self.nodes.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) -> Option<Node<H>> {
        let node = self.nodes[idx.get()].take();
        if node.is_some() {
            self.free_list.push(idx.get());
        }
        node
    }

    pub(crate) fn child_containing(&self, children: &[NodeIdx; 4], position: Point) -> Option<NodeIdx> {
        children
            .iter()
            .copied()
            .find(|&c| self.node(c).region.contains(position))
    }

    /// Walk from `from` towards the root and return the first strict ancestor whose
    /// region contains `position`.
    fn ancestor_containing(&self, from: NodeIdx, position: Point) -> Option<NodeIdx> {
        let mut cur = self.node(from).parent;
        while let Some(idx) = cur {
            let node = self.node(idx);
            if node.region.contains(position) {
                return Some(idx);
            }
            cur = node.parent;
        }
        None
    }

    fn leaf_containing(&self, position: Point) -> Option<NodeIdx> {
        if !self.region().contains(position) {
            return None;
        }
        let mut idx = self.root;
        loop {
            match &self.node(idx).kind {
                NodeKind::Leaf(_) => return Some(idx),
                NodeKind::Internal(children) => idx = self.child_containing(children, position)?,
            }
        }
    }

    /// Collapse `idx` into a leaf if its four children are leaves that together fit
    /// in one bucket. Returns whether a merge happened.
    fn try_merge(&mut self, idx: NodeIdx) -> bool {
        let children = match &self.node(idx).kind {
            NodeKind::Internal(children) => *children,
            NodeKind::Leaf(_) => return false,
        };
        let mut total = 0;
        for &c in &children {
            match &self.node(c).kind {
                NodeKind::Leaf(bucket) => total += bucket.len(),
                NodeKind::Internal(_) => return false,
            }
        }
        if total > self.config.bucket_size {
            return false;
        }
        let mut merged = Vec::with_capacity(total);
        for c in children {
            if let Some(Node {
                kind: NodeKind::Leaf(bucket),
                ..
            }) = self.release(c)
            {
                merged.extend(bucket);
            }
        }
        log::trace!("merged node {} into a leaf of {total}", idx.get());
        self.node_mut(idx).kind = NodeKind::Leaf(merged);
        true
    }

    /// Merge `start` and then its ancestors for as long as merging succeeds.
    fn merge_upward(&mut self, start: Option<NodeIdx>) -> usize {
        let mut merged = 0;
        let mut cur = start;
        while let Some(idx) = cur {
            if !self.try_merge(idx) {
                break;
            }
            merged += 1;
            cur = self.node(idx).parent;
        }
        merged
    }
}

impl<H: Copy + PartialEq + Debug> QuadTree<H> {
    /// Create an empty tree over `region` with the given leaf capacity.
    ///
    /// Fails with [`QuadTreeError::InvalidBucketSize`] if `bucket_size` is zero.
    pub fn new(region: Region, bucket_size: usize) -> Result<Self, QuadTreeError> {
        Self::with_config(region, QuadTreeConfig::with_bucket_size(bucket_size))
    }

    /// Create an empty tree over `region` with an explicit configuration.
    pub fn with_config(region: Region, config: QuadTreeConfig) -> Result<Self, QuadTreeError> {
        config.validate()?;
        log::debug!(
            "quadtree over {:?}: bucket size {}, max depth {}",
            region.rect(),
            config.bucket_size,
            config.max_depth
        );
        Ok(Self {
            nodes: vec![Some(Node::leaf(region, None, 0))],
            free_list: Vec::new(),
            root: NodeIdx::new(0),
            config,
            len: 0,
        })
    }

    /// Insert a batch of handles, in order.
    ///
    /// Every position is checked against the root region first; if any lies outside,
    /// nothing is inserted and [`QuadTreeError::MisplacedEntity`] names the first
    /// offending position. Inserting a handle that is already present stores it twice.
    ///
    /// Splitting a leaf also re-places handles in it that moved since the last
    /// [`update`](Self::update). If one of those moved out of the root region it is
    /// dropped and reported as [`QuadTreeError::MisplacedEntity`] once the batch is in.
    pub fn insert<S, I>(&mut self, src: &S, handles: I) -> Result<(), QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
        I: IntoIterator<Item = H>,
    {
        let region = self.region();
        let mut batch = Vec::new();
        for handle in handles {
            let position = src.position(handle);
            if !region.contains(position) {
                return Err(QuadTreeError::MisplacedEntity { position });
            }
            batch.push((handle, position));
        }
        let mut pass = Pass::new();
        for (handle, position) in batch.iter().copied() {
            self.insert_at(src, self.root, handle, position, &mut pass)?;
            self.len += 1;
            self.settle(src, &mut pass)?;
        }
        log::debug!(
            "inserted {} entities ({} splits, {} relocated)",
            batch.len(),
            pass.summary.split,
            pass.summary.relocated
        );
        pass.finish().map(|_| ())
    }

    /// Restore leaf membership after entities moved.
    ///
    /// Visits the tree depth-first. Every leaf drops the handles whose current
    /// position is outside its region and re-inserts each one right away, starting at
    /// the nearest ancestor that contains the new position; this may split leaves,
    /// including leaves not yet visited in this pass. After all four children of an
    /// internal node are processed, the node is merged back into a leaf when the
    /// children are leaves holding at most [`bucket_size`](Self::bucket_size) handles
    /// in total, so merges cascade towards the root.
    ///
    /// An entity that left the root region is dropped from the index. The pass still
    /// completes for everyone else, then fails with
    /// [`QuadTreeError::MisplacedEntity`] naming the first escaped position.
    pub fn update<S>(&mut self, src: &S) -> Result<UpdateSummary, QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        let mut pass = Pass::new();
        let mut stack = vec![(self.root, false)];
        while let Some((idx, children_done)) = stack.pop() {
            if children_done {
                if self.try_merge(idx) {
                    pass.summary.merged += 1;
                }
                continue;
            }
            let children = match &self.node(idx).kind {
                NodeKind::Internal(children) => Some(*children),
                NodeKind::Leaf(_) => None,
            };
            match children {
                Some(children) => {
                    stack.push((idx, true));
                    stack.extend(children.iter().rev().map(|&c| (c, false)));
                }
                None => {
                    self.evict_strays(src, idx, &mut pass);
                    self.settle(src, &mut pass)?;
                }
            }
        }
        if !pass.summary.is_empty() {
            log::debug!("update: {:?}", pass.summary);
        }
        pass.finish()
    }

    /// Remove one occurrence of `handle`.
    ///
    /// The leaf is located from the handle's current position, falling back to a full
    /// scan when the position is stale. Sparse ancestors are merged afterwards.
    /// Returns `false` if the handle is not stored.
    pub fn remove<S>(&mut self, src: &S, handle: H) -> bool
    where
        S: PositionSource<H> + ?Sized,
    {
        let position = src.position(handle);
        let mut leaf = self.leaf_containing(position);
        if !leaf.is_some_and(|idx| self.remove_from_leaf(idx, handle)) {
            leaf = self.leaf_holding(handle);
            let Some(idx) = leaf else {
                return false;
            };
            self.remove_from_leaf(idx, handle);
        }
        let Some(idx) = leaf else {
            return false;
        };
        self.len -= 1;
        let merged = self.merge_upward(self.node(idx).parent);
        log::trace!("removed {handle:?}, merged {merged} nodes");
        true
    }

    /// Handles whose position lies in `area`.
    ///
    /// Subtrees whose region does not intersect `area` are skipped. Results are exact
    /// as long as the tree has been updated since entities last moved.
    pub fn query_region<S>(&self, src: &S, area: &Region) -> Vec<H>
    where
        S: PositionSource<H> + ?Sized,
    {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = self.node(idx);
            if !node.region.intersects(area) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(bucket) => out.extend(
                    bucket
                        .iter()
                        .copied()
                        .filter(|&h| area.contains(src.position(h))),
                ),
                NodeKind::Internal(children) => stack.extend(children.iter().rev()),
            }
        }
        out
    }

    /// All stored handles, leaf by leaf in depth-first quadrant order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match &self.node(idx).kind {
                NodeKind::Leaf(bucket) => out.extend_from_slice(bucket),
                NodeKind::Internal(children) => stack.extend(children.iter().rev()),
            }
        }
        out.into_iter()
    }

    /// Place `handle` in the subtree rooted at `start`.
    ///
    /// `start` must contain `position`. A full leaf first sheds handles that no longer
    /// belong to it (queued on `pass.strays`); if still full it splits, unless it is
    /// already at the depth limit or too narrow for [`Region::quarter`] to shrink it.
    fn insert_at<S>(
        &mut self,
        src: &S,
        start: NodeIdx,
        handle: H,
        position: Point,
        pass: &mut Pass<H>,
    ) -> Result<(), QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        if !self.node(start).region.contains(position) {
            return Err(QuadTreeError::MisplacedEntity { position });
        }
        let mut idx = start;
        loop {
            let node = self.node(idx);
            let depth = node.depth;
            let divisible = depth < self.config.max_depth && node.region.is_divisible();
            let full = match &node.kind {
                NodeKind::Internal(children) => {
                    idx = self
                        .child_containing(children, position)
                        .ok_or(QuadTreeError::MisplacedEntity { position })?;
                    continue;
                }
                NodeKind::Leaf(bucket) => bucket.len() >= self.config.bucket_size,
            };
            if full {
                if self.evict_strays(src, idx, pass) > 0 {
                    continue;
                }
                if divisible {
                    self.subdivide(src, idx, pass)?;
                    continue;
                }
                log::warn!(
                    "leaf {} at depth {} cannot split further; it holds more than {} entities",
                    idx.get(),
                    depth,
                    self.config.bucket_size
                );
            }
            if let NodeKind::Leaf(bucket) = &mut self.node_mut(idx).kind {
                bucket.push(handle);
            }
            return Ok(());
        }
    }

    /// Turn leaf `idx` into an internal node with four empty leaf children and
    /// redistribute its handles among them.
    fn subdivide<S>(&mut self, src: &S, idx: NodeIdx, pass: &mut Pass<H>) -> Result<(), QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        let (region, depth) = {
            let node = self.node(idx);
            (node.region, node.depth)
        };
        let children = region
            .quarter()
            .map(|r| self.alloc(Node::leaf(r, Some(idx), depth + 1)));
        let old = core::mem::replace(&mut self.node_mut(idx).kind, NodeKind::Internal(children));
        pass.summary.split += 1;
        log::trace!("split node {} at depth {depth}", idx.get());
        if let NodeKind::Leaf(bucket) = old {
            for handle in bucket {
                let position = src.position(handle);
                let child = self
                    .child_containing(&children, position)
                    .ok_or(QuadTreeError::MisplacedEntity { position })?;
                self.insert_at(src, child, handle, position, pass)?;
            }
        }
        Ok(())
    }

    /// Move handles of leaf `idx` whose position left its region onto `pass.strays`.
    fn evict_strays<S>(&mut self, src: &S, idx: NodeIdx, pass: &mut Pass<H>) -> usize
    where
        S: PositionSource<H> + ?Sized,
    {
        let node = self.node_mut(idx);
        let region = node.region;
        let NodeKind::Leaf(bucket) = &mut node.kind else {
            return 0;
        };
        let before = pass.strays.len();
        bucket.retain(|&h| {
            if region.contains(src.position(h)) {
                true
            } else {
                pass.strays.push((h, idx));
                false
            }
        });
        pass.strays.len() - before
    }

    /// Re-insert every queued stray through its ancestor chain.
    fn settle<S>(&mut self, src: &S, pass: &mut Pass<H>) -> Result<(), QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        while let Some((handle, from)) = pass.strays.pop() {
            let position = src.position(handle);
            match self.ancestor_containing(from, position) {
                Some(target) => {
                    log::trace!("relocating {handle:?} to node {}", target.get());
                    pass.summary.relocated += 1;
                    self.insert_at(src, target, handle, position, pass)?;
                }
                None => {
                    log::warn!("{handle:?} at {position:?} left the tree region; dropping it");
                    self.len -= 1;
                    pass.escaped.get_or_insert(position);
                }
            }
        }
        Ok(())
    }

    fn remove_from_leaf(&mut self, idx: NodeIdx, handle: H) -> bool {
        let NodeKind::Leaf(bucket) = &mut self.node_mut(idx).kind else {
            return false;
        };
        match bucket.iter().position(|h| *h == handle) {
            Some(i) => {
                bucket.swap_remove(i);
                true
            }
            None => false,
        }
    }

    fn leaf_holding(&self, handle: H) -> Option<NodeIdx> {
        self.nodes.iter().enumerate().find_map(|(i, slot)| match slot {
            Some(Node {
                kind: NodeKind::Leaf(bucket),
                ..
            }) if bucket.contains(&handle) => Some(NodeIdx::new(i)),
            _ => None,
        })
    }
}

impl<H> Debug for QuadTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuadTree")
            .field("region", &self.region().rect())
            .field("bucket_size", &self.config.bucket_size)
            .field("max_depth", &self.config.max_depth)
            .field("len", &self.len)
            .field("nodes_alive", &self.node_count())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}
