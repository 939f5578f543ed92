// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact k-nearest-neighbor search with best-first traversal.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use kurbo::Point;

use crate::entity::PositionSource;
use crate::error::QuadTreeError;
use crate::node::{NodeIdx, NodeKind};
use crate::tree::QuadTree;

/// Node waiting to be expanded, keyed by the lower bound of its region.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    bound: f64,
    idx: NodeIdx,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed: `BinaryHeap` pops the smallest bound first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.bound.total_cmp(&self.bound)
    }
}

/// Entity kept among the best `k`; the heap top is the farthest one.
#[derive(Clone, Copy, Debug)]
struct Candidate<H> {
    distance: f64,
    handle: H,
}

impl<H> PartialEq for Candidate<H> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<H> Eq for Candidate<H> {}

impl<H> PartialOrd for Candidate<H> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<H> Ord for Candidate<H> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

/// Bounded max-heap of the `k` closest candidates seen so far.
struct Best<H> {
    k: usize,
    heap: BinaryHeap<Candidate<H>>,
}

impl<H> Best<H> {
    fn new(k: usize, capacity: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// True once `k` candidates are held and the farthest is closer than `bound`.
    fn excludes(&self, bound: f64) -> bool {
        self.heap.len() == self.k && self.heap.peek().is_some_and(|worst| bound > worst.distance)
    }

    fn offer(&mut self, handle: H, distance: f64) {
        if self.heap.len() < self.k {
            self.heap.push(Candidate { distance, handle });
        } else if self.heap.peek().is_some_and(|worst| distance < worst.distance) {
            self.heap.pop();
            self.heap.push(Candidate { distance, handle });
        }
    }
}

impl<H: Copy + PartialEq + Debug> QuadTree<H> {
    /// The `k` handles closest to `query`, nearest first.
    ///
    /// Returns fewer than `k` handles only when the tree holds fewer. Equidistant
    /// candidates come back in unspecified order. Fails with
    /// [`QuadTreeError::InvalidQuery`] if `query` is not finite.
    pub fn knn<S>(&self, src: &S, query: Point, k: usize) -> Result<Vec<H>, QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        Ok(self
            .knn_with_distances(src, query, k)?
            .into_iter()
            .map(|(handle, _)| handle)
            .collect())
    }

    /// Like [`knn`](Self::knn), paired with each handle's distance to `query`.
    ///
    /// Nodes are expanded in order of [`Region::lower_bound_distance`]. Once `k`
    /// candidates are held, any node whose bound exceeds the farthest of them cannot
    /// hold a strictly closer entity and is skipped; because the frontier is ordered,
    /// the first such node ends the search.
    ///
    /// [`Region::lower_bound_distance`]: crate::Region::lower_bound_distance
    pub fn knn_with_distances<S>(
        &self,
        src: &S,
        query: Point,
        k: usize,
    ) -> Result<Vec<(H, f64)>, QuadTreeError>
    where
        S: PositionSource<H> + ?Sized,
    {
        if !(query.x.is_finite() && query.y.is_finite()) {
            return Err(QuadTreeError::InvalidQuery { query });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let root = self.root_idx();
        let mut frontier = BinaryHeap::new();
        frontier.push(Frontier {
            bound: self.node(root).region.lower_bound_distance(query),
            idx: root,
        });
        let mut best = Best::new(k, k.min(self.len()));

        while let Some(Frontier { bound, idx }) = frontier.pop() {
            if best.excludes(bound) {
                break;
            }
            match &self.node(idx).kind {
                NodeKind::Leaf(bucket) => {
                    for &handle in bucket {
                        best.offer(handle, query.distance(src.position(handle)));
                    }
                }
                NodeKind::Internal(children) => {
                    for &child in children {
                        let bound = self.node(child).region.lower_bound_distance(query);
                        if !best.excludes(bound) {
                            frontier.push(Frontier { bound, idx: child });
                        }
                    }
                }
            }
        }

        Ok(best
            .heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.handle, c.distance))
            .collect())
    }
}
