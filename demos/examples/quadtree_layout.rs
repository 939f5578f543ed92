// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Print the node layout of a small quadtree, before and after entities move.
//!
//! Run:
//! - `cargo run -p understory_examples --example quadtree_layout`

use kurbo::Point;
use understory_quadtree::{NodeRef, QuadTree, Quadrant, Region};

fn print_subtree(node: NodeRef<'_, usize>, label: &str) {
    let indent = "  ".repeat(node.depth());
    let r = node.region().rect();
    match node.entities() {
        Some(bucket) => println!(
            "{indent}{label} [{:.1},{:.1} .. {:.1},{:.1}] leaf {:?}",
            r.x0, r.y0, r.x1, r.y1, bucket
        ),
        None => {
            println!(
                "{indent}{label} [{:.1},{:.1} .. {:.1},{:.1}] ({} entities)",
                r.x0,
                r.y0,
                r.x1,
                r.y1,
                node.subtree_len()
            );
            for q in Quadrant::ALL {
                if let Some(child) = node.child(q) {
                    print_subtree(child, &format!("{q:?}"));
                }
            }
        }
    }
}

fn main() {
    env_logger::init();

    let domain = Region::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)).unwrap();
    let mut points = vec![
        Point::new(10.0, 10.0),
        Point::new(20.0, 20.0),
        Point::new(15.0, 15.0),
        Point::new(90.0, 90.0),
        Point::new(60.0, 20.0),
    ];
    let mut tree = QuadTree::new(domain, 2).unwrap();
    tree.insert(&points, 0..points.len()).unwrap();
    println!("initial layout:");
    print_subtree(tree.root(), "root");

    points[1] = Point::new(80.0, 80.0);
    points[2] = Point::new(85.0, 70.0);
    let summary = tree.update(&points).unwrap();
    println!("\nafter update {summary:?}:");
    print_subtree(tree.root(), "root");
}
