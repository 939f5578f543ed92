// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read access to entity positions.
//!
//! The tree stores caller-chosen handles, never the entities themselves. Every
//! operation that needs coordinates borrows a [`PositionSource`] that maps a handle to
//! the entity's current position.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

/// Something with a readable 2D position.
pub trait HasPosition {
    /// Current position.
    fn position(&self) -> Point;
}

impl HasPosition for Point {
    fn position(&self) -> Point {
        *self
    }
}

/// Resolves handles of type `H` to current positions.
///
/// Positions must not change while a tree operation borrowing the source is running.
pub trait PositionSource<H> {
    /// Current position of the entity behind `handle`.
    fn position(&self, handle: H) -> Point;
}

/// Slot-indexed storage: the handle is the index into the slice.
impl<E: HasPosition> PositionSource<usize> for [E] {
    fn position(&self, handle: usize) -> Point {
        self[handle].position()
    }
}

impl<E: HasPosition> PositionSource<usize> for Vec<E> {
    fn position(&self, handle: usize) -> Point {
        self.as_slice()[handle].position()
    }
}

/// Adapter that turns a closure into a [`PositionSource`].
///
/// ```
/// use kurbo::Point;
/// use understory_quadtree::{PositionFn, PositionSource};
///
/// let src = PositionFn(|id: u32| Point::new(f64::from(id), 0.0));
/// assert_eq!(src.position(3), Point::new(3.0, 0.0));
/// ```
#[derive(Clone, Copy)]
pub struct PositionFn<F>(pub F);

impl<H, F: Fn(H) -> Point> PositionSource<H> for PositionFn<F> {
    fn position(&self, handle: H) -> Point {
        (self.0)(handle)
    }
}

impl<F> fmt::Debug for PositionFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionFn").finish_non_exhaustive()
    }
}
