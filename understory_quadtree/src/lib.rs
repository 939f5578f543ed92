// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_quadtree --heading-base-level=0

//! Understory Quadtree: a dynamic region quadtree for moving points.
//!
//! The tree partitions a fixed rectangular [`Region`] into quadrants on demand and
//! answers exact k-nearest-neighbor queries over a population of moving entities.
//!
//! - Leaves hold up to a configurable number of entity handles; a full leaf splits
//!   into four equal quadrants.
//! - After entities move, [`QuadTree::update`] re-indexes only the entities that left
//!   their leaf, then collapses subtrees that became sparse.
//! - [`QuadTree::knn`] runs a best-first search ordered by the lower-bound distance
//!   from the query to each node's region.
//!
//! The tree never owns entities. It stores copyable handles (slot indices by default)
//! and reads positions through a [`PositionSource`] borrowed for each call, so the
//! caller keeps the entity storage and mutates it freely between calls.
//!
//! # Example
//!
//! ```rust
//! use understory_quadtree::{Particle, Point, QuadTree, Region, Vec2};
//!
//! let domain = Region::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)).unwrap();
//! let mut particles = vec![
//!     Particle::new(Point::new(10.0, 10.0), Vec2::new(5.0, 0.0)),
//!     Particle::new(Point::new(20.0, 20.0), Vec2::new(0.0, 5.0)),
//!     Particle::at_rest(Point::new(90.0, 90.0)),
//! ];
//!
//! let mut tree = QuadTree::new(domain, 2).unwrap();
//! tree.insert(&particles, 0..particles.len()).unwrap();
//! assert_eq!(tree.knn(&particles, Point::ZERO, 1).unwrap(), vec![0]);
//!
//! // Move everything, then re-index.
//! for p in &mut particles {
//!     p.advance(1.0, domain.rect());
//! }
//! let summary = tree.update(&particles).unwrap();
//! assert_eq!(summary.relocated, 0);
//! assert_eq!(tree.knn(&particles, Point::new(100.0, 100.0), 1).unwrap(), vec![2]);
//! ```
//!
//! ## Region boundaries
//!
//! Regions are closed on their lower edges and half-open on their upper edges, except
//! where the upper edge is also the outer boundary of the tree; see [`ClosedEdges`].
//! This makes the four children of a node disjoint while still covering every point
//! of the parent, so each position belongs to exactly one leaf.
//!
//! ## Handles
//!
//! Any `Copy + PartialEq + Debug` type works as a handle. Slices and vectors of
//! [`HasPosition`] values are position sources for `usize` handles; closures can be
//! wrapped in [`PositionFn`].
//!
//! This crate is `no_std` and uses `alloc`. Enable the `libm` feature instead of `std`
//! for targets without a standard library.

#![no_std]

extern crate alloc;

mod config;
mod entity;
mod error;
mod knn;
mod node;
mod particle;
mod region;
mod tree;

#[cfg(test)]
mod test_util;

pub use config::QuadTreeConfig;
pub use entity::{HasPosition, PositionFn, PositionSource};
pub use error::QuadTreeError;
pub use node::NodeRef;
pub use particle::Particle;
pub use region::{ClosedEdges, Quadrant, Region};
pub use tree::{QuadTree, UpdateSummary};

pub use kurbo::{Point, Rect, Vec2};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn handles_of_any_copy_type() {
        #[derive(Clone, Copy, Debug, PartialEq)]
        struct Id(u16);

        let src = PositionFn(|id: Id| Point::new(f64::from(id.0), f64::from(id.0)));
        let domain = Region::new(Point::ZERO, Point::new(64.0, 64.0)).unwrap();
        let mut tree = QuadTree::new(domain, 1).unwrap();
        tree.insert(&src, [Id(1), Id(40), Id(63)]).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.knn(&src, Point::new(64.0, 64.0), 2).unwrap(), vec![Id(63), Id(40)]);
        assert!(tree.remove(&src, Id(40)));
        assert_eq!(tree.knn(&src, Point::new(64.0, 64.0), 2).unwrap(), vec![Id(63), Id(1)]);
    }
}
