// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving point entities with wall reflection.
//!
//! This is the simulation-side collaborator of the index. The tree only reads
//! [`HasPosition::position`]; motion is driven by the caller between calls to
//! [`QuadTree::update`](crate::QuadTree::update).

use kurbo::{Point, Rect, Vec2};

use crate::entity::HasPosition;

/// Upper bound on reflections resolved per axis in a single step.
const MAX_BOUNCES: usize = 64;

/// A point mass moving at constant velocity inside a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position.
    pub position: Point,
    /// Displacement per unit of time.
    pub velocity: Vec2,
}

impl Particle {
    /// Create a particle.
    pub const fn new(position: Point, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Create a particle at rest.
    pub const fn at_rest(position: Point) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Move for `dt` units of time, reflecting off the walls of `bounds`.
    ///
    /// Each bounce flips the velocity component normal to the wall and spends the
    /// remaining time travelling back, so the particle never leaves `bounds`.
    /// `bounds` must be ordered (`x0 <= x1`, `y0 <= y1`).
    pub fn advance(&mut self, dt: f64, bounds: Rect) {
        let (x, vx) = fold_axis(self.position.x, self.velocity.x, dt, bounds.x0, bounds.x1);
        let (y, vy) = fold_axis(self.position.y, self.velocity.y, dt, bounds.y0, bounds.y1);
        self.position = Point::new(x, y);
        self.velocity = Vec2::new(vx, vy);
    }
}

impl HasPosition for Particle {
    fn position(&self) -> Point {
        self.position
    }
}

fn fold_axis(p: f64, v: f64, dt: f64, lo: f64, hi: f64) -> (f64, f64) {
    let mut p = p.clamp(lo, hi);
    let mut v = v;
    let mut t = dt;
    for _ in 0..MAX_BOUNCES {
        let next = p + v * t;
        if next < lo {
            t -= (lo - p) / v;
            p = lo;
            v = -v;
        } else if next > hi {
            t -= (hi - p) / v;
            p = hi;
            v = -v;
        } else {
            return (next, v);
        }
    }
    (p.clamp(lo, hi), v)
}
