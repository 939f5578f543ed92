// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by region construction and tree operations.

use kurbo::Point;
use thiserror::Error;

/// Contract violations reported by the quadtree.
///
/// All variants are deterministic programmer errors; retrying the same call with the
/// same inputs fails the same way.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum QuadTreeError {
    /// A region was built with `min > max` on some axis, or with a non-finite corner.
    #[error("invalid region geometry: min {min:?} is not below max {max:?}")]
    InvalidGeometry {
        /// Requested minimum corner.
        min: Point,
        /// Requested maximum corner.
        max: Point,
    },
    /// An entity position is not contained by the node it must be placed in,
    /// typically because it lies outside the tree's root region.
    #[error("entity at {position:?} is outside every candidate region")]
    MisplacedEntity {
        /// Position that could not be placed.
        position: Point,
    },
    /// A nearest-neighbor query point has a non-finite coordinate.
    #[error("query point {query:?} is not finite")]
    InvalidQuery {
        /// The rejected query point.
        query: Point,
    },
    /// The tree was configured with a bucket size of zero.
    #[error("bucket size must be at least 1")]
    InvalidBucketSize,
}
