// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Quadtree: insert, move, update, and query neighbors.

use understory_quadtree::{Point, QuadTree, Quadrant, Region};

fn main() {
    let domain = Region::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)).unwrap();
    let mut points = vec![
        Point::new(10.0, 10.0),
        Point::new(20.0, 20.0),
        Point::new(90.0, 90.0),
    ];

    let mut tree = QuadTree::new(domain, 2).unwrap();
    tree.insert(&points, 0..points.len()).unwrap();
    let sw = tree.root().child(Quadrant::SouthWest).unwrap();
    println!("south-west leaf holds {:?}", sw.entities());

    // A fourth point crowds the south-west quadrant and splits it.
    points.push(Point::new(15.0, 15.0));
    tree.insert(&points, [3]).unwrap();
    println!("after insert: {} nodes, depth {}", tree.node_count(), tree.depth());

    // Move two points across the domain and re-index.
    points[1] = Point::new(80.0, 80.0);
    points[3] = Point::new(70.0, 70.0);
    let summary = tree.update(&points).unwrap();
    println!(
        "update: relocated={}, split={}, merged={}",
        summary.relocated, summary.split, summary.merged
    );

    let near = tree.knn_with_distances(&points, Point::new(75.0, 75.0), 2).unwrap();
    println!("two nearest to (75,75): {:?}", near);
}
