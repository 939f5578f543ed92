// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

use crate::error::QuadTreeError;

/// Parameters fixed for the lifetime of a [`QuadTree`](crate::QuadTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuadTreeConfig {
    /// Maximum number of entities a leaf holds before it splits. Must be at least 1.
    pub bucket_size: usize,
    /// Depth at which leaves stop splitting (the root has depth 0).
    ///
    /// A leaf at this depth keeps accepting entities past `bucket_size`. This only
    /// matters when more than `bucket_size` entities crowd into a tiny area, for
    /// example when they share one position.
    pub max_depth: usize,
}

impl QuadTreeConfig {
    /// Default leaf capacity.
    pub const DEFAULT_BUCKET_SIZE: usize = 6;
    /// Default subdivision limit.
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    /// Configuration with the given bucket size and the default depth limit.
    pub const fn with_bucket_size(bucket_size: usize) -> Self {
        Self {
            bucket_size,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), QuadTreeError> {
        if self.bucket_size == 0 {
            return Err(QuadTreeError::InvalidBucketSize);
        }
        Ok(())
    }
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self::with_bucket_size(Self::DEFAULT_BUCKET_SIZE)
    }
}
