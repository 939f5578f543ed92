// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic inputs shared by the unit tests.

use kurbo::Point;

use crate::region::Region;

/// Xorshift generator; reproducible without an RNG dependency.
#[derive(Clone)]
pub(crate) struct Rng(pub(crate) u64);

impl Rng {
    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1_u64 << 53) as f64)
    }

    /// Uniform in the square `[lo, hi)²`.
    pub(crate) fn point_in(&mut self, lo: f64, hi: f64) -> Point {
        Point::new(
            lo + (hi - lo) * self.next_f64(),
            lo + (hi - lo) * self.next_f64(),
        )
    }
}

/// The closed square `[0, 100]²` most tests index.
pub(crate) fn domain() -> Region {
    Region::new(Point::ZERO, Point::new(100.0, 100.0)).unwrap()
}
