// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned regions with an exact four-way split.
//!
//! A [`Region`] is a Kurbo [`Rect`] plus a record of which upper edges belong to it.
//! Lower edges are always closed. Upper edges are closed only where they lie on the
//! tree's outer boundary, so every point of a region falls into exactly one of the
//! four regions produced by [`Region::quarter`].

use kurbo::{Point, Rect, Vec2};

use crate::error::QuadTreeError;

bitflags::bitflags! {
    /// Upper edges that are part of a region.
    ///
    /// A region built with [`Region::new`] has both flags set. Children produced by
    /// [`Region::quarter`] keep a flag only when their upper edge coincides with the
    /// parent's closed upper edge.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClosedEdges: u8 {
        /// The edge at `max.x` is included.
        const MAX_X = 0b0000_0001;
        /// The edge at `max.y` is included.
        const MAX_Y = 0b0000_0010;
    }
}

/// One of the four child slots of a subdivided region.
///
/// North is towards larger `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Low `x`, high `y`.
    NorthWest,
    /// High `x`, high `y`.
    NorthEast,
    /// Low `x`, low `y`.
    SouthWest,
    /// High `x`, low `y`.
    SouthEast,
}

impl Quadrant {
    /// All quadrants in child slot order.
    pub const ALL: [Self; 4] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// Slot of this quadrant in the array returned by [`Region::quarter`].
    pub const fn slot(self) -> usize {
        match self {
            Self::NorthWest => 0,
            Self::NorthEast => 1,
            Self::SouthWest => 2,
            Self::SouthEast => 3,
        }
    }
}

/// Axis-aligned rectangle with half-open containment on internal edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    rect: Rect,
    closed: ClosedEdges,
}

impl Region {
    /// Create a closed region from its min and max corners.
    ///
    /// Fails with [`QuadTreeError::InvalidGeometry`] if `min` exceeds `max` on either
    /// axis, any coordinate is not finite, or the width or height overflows `f64`.
    /// Inverted corners are never normalized.
    pub fn new(min: Point, max: Point) -> Result<Self, QuadTreeError> {
        let finite = min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite();
        if !finite || min.x > max.x || min.y > max.y {
            return Err(QuadTreeError::InvalidGeometry { min, max });
        }
        // Midpoints are taken as `lo + extent / 2`, so the extent must be finite too.
        if !((max.x - min.x).is_finite() && (max.y - min.y).is_finite()) {
            return Err(QuadTreeError::InvalidGeometry { min, max });
        }
        Ok(Self {
            rect: Rect::new(min.x, min.y, max.x, max.y),
            closed: ClosedEdges::all(),
        })
    }

    /// Create a closed region from a Kurbo rectangle, which must already be ordered.
    pub fn from_rect(rect: Rect) -> Result<Self, QuadTreeError> {
        Self::new(Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }

    /// Minimum corner.
    pub fn min(&self) -> Point {
        Point::new(self.rect.x0, self.rect.y0)
    }

    /// Maximum corner.
    pub fn max(&self) -> Point {
        Point::new(self.rect.x1, self.rect.y1)
    }

    /// The underlying rectangle (edge ownership is not represented).
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Which upper edges belong to this region.
    pub fn closed_edges(&self) -> ClosedEdges {
        self.closed
    }

    /// Center point.
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Extent along `x`.
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Extent along `y`.
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.rect.area()
    }

    /// Whether the point lies in this region.
    ///
    /// Lower edges are inclusive; an upper edge is inclusive only if it is closed.
    /// NaN coordinates are never contained.
    pub fn contains(&self, point: Point) -> bool {
        axis_contains(
            self.rect.x0,
            self.rect.x1,
            self.closed.contains(ClosedEdges::MAX_X),
            point.x,
        ) && axis_contains(
            self.rect.y0,
            self.rect.y1,
            self.closed.contains(ClosedEdges::MAX_Y),
            point.y,
        )
    }

    /// Whether some point is contained in both regions.
    pub fn intersects(&self, other: &Self) -> bool {
        axis_overlaps(
            (self.rect.x0, self.rect.x1, self.closed.contains(ClosedEdges::MAX_X)),
            (other.rect.x0, other.rect.x1, other.closed.contains(ClosedEdges::MAX_X)),
        ) && axis_overlaps(
            (self.rect.y0, self.rect.y1, self.closed.contains(ClosedEdges::MAX_Y)),
            (other.rect.y0, other.rect.y1, other.closed.contains(ClosedEdges::MAX_Y)),
        )
    }

    /// Whether every point of this region is also contained in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        let x = (self.rect.x0, self.rect.x1, self.closed.contains(ClosedEdges::MAX_X));
        let y = (self.rect.y0, self.rect.y1, self.closed.contains(ClosedEdges::MAX_Y));
        if axis_is_empty(x) || axis_is_empty(y) {
            return true;
        }
        axis_within(
            x,
            (other.rect.x0, other.rect.x1, other.closed.contains(ClosedEdges::MAX_X)),
        ) && axis_within(
            y,
            (other.rect.y0, other.rect.y1, other.closed.contains(ClosedEdges::MAX_Y)),
        )
    }

    /// Smallest possible distance from `point` to any point of this region.
    ///
    /// Each axis contributes the gap to the nearer edge (zero when the coordinate is
    /// inside the interval), and the gaps are combined with the Euclidean norm. The
    /// result never exceeds the true distance to a contained point, which makes it an
    /// admissible pruning bound for nearest-neighbor search.
    pub fn lower_bound_distance(&self, point: Point) -> f64 {
        let dx = (self.rect.x0 - point.x).max(point.x - self.rect.x1).max(0.0);
        let dy = (self.rect.y0 - point.y).max(point.y - self.rect.y1).max(0.0);
        Vec2::new(dx, dy).hypot()
    }

    /// Split into four equal regions in [`Quadrant::ALL`] order.
    ///
    /// The children share the exact midpoint coordinates. West and south children do
    /// not own the midpoint edge; east and north children inherit this region's outer
    /// edge ownership.
    pub fn quarter(&self) -> [Self; 4] {
        let Rect { x0, y0, x1, y1 } = self.rect;
        let mid_x = x0 + (x1 - x0) * 0.5;
        let mid_y = y0 + (y1 - y0) * 0.5;
        let east = self.closed & ClosedEdges::MAX_X;
        let north = self.closed & ClosedEdges::MAX_Y;
        [
            Self {
                rect: Rect::new(x0, mid_y, mid_x, y1),
                closed: north,
            },
            Self {
                rect: Rect::new(mid_x, mid_y, x1, y1),
                closed: east | north,
            },
            Self {
                rect: Rect::new(x0, y0, mid_x, mid_y),
                closed: ClosedEdges::empty(),
            },
            Self {
                rect: Rect::new(mid_x, y0, x1, mid_y),
                closed: east,
            },
        ]
    }

    /// Whether [`quarter`](Self::quarter) yields a strictly smaller region on at least
    /// one axis. False once the region is about one ulp wide in both directions.
    pub(crate) fn is_divisible(&self) -> bool {
        let Rect { x0, y0, x1, y1 } = self.rect;
        let mid_x = x0 + (x1 - x0) * 0.5;
        let mid_y = y0 + (y1 - y0) * 0.5;
        (x0 < mid_x && mid_x < x1) || (y0 < mid_y && mid_y < y1)
    }
}

fn axis_contains(lo: f64, hi: f64, closed: bool, v: f64) -> bool {
    lo <= v && (v < hi || (closed && v == hi))
}

fn axis_includes_upper(hi: f64, closed: bool, v: f64) -> bool {
    v < hi || (closed && v == hi)
}

fn axis_overlaps(a: (f64, f64, bool), b: (f64, f64, bool)) -> bool {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo > hi {
        return false;
    }
    axis_includes_upper(a.1, a.2, lo) && axis_includes_upper(b.1, b.2, lo)
}

fn axis_is_empty(a: (f64, f64, bool)) -> bool {
    a.0 == a.1 && !a.2
}

fn axis_within(a: (f64, f64, bool), b: (f64, f64, bool)) -> bool {
    if a.0 < b.0 {
        return false;
    }
    a.1 < b.1 || (a.1 == b.1 && (!a.2 || b.2))
}
