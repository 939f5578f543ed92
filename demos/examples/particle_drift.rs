// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Particles drifting in a box, re-indexed every step.
//!
//! Run:
//! - `cargo run -p understory_examples --example particle_drift`
//! - `RUST_LOG=understory_quadtree=debug cargo run -p understory_examples --example particle_drift`

use kurbo::{Point, Rect, Vec2};
use understory_quadtree::{Particle, QuadTree, QuadTreeConfig, Region};

const WORLD: Rect = Rect::new(0.0, 0.0, 512.0, 512.0);
const PARTICLES: usize = 2_000;
const STEPS: usize = 20;
const DT: f64 = 0.5;

struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1_u64 << 53) as f64)
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut rng = Rng(0x5EED_1234_ABCD_0001);
    let mut particles: Vec<Particle> = (0..PARTICLES)
        .map(|_| {
            let p = Point::new(rng.next_f64() * WORLD.x1, rng.next_f64() * WORLD.y1);
            let v = Vec2::new(rng.next_f64() * 40.0 - 20.0, rng.next_f64() * 40.0 - 20.0);
            Particle::new(p, v)
        })
        .collect();

    let domain = Region::from_rect(WORLD).expect("world rect is ordered");
    let config = QuadTreeConfig {
        bucket_size: 8,
        ..QuadTreeConfig::default()
    };
    let mut tree = QuadTree::with_config(domain, config).expect("bucket size is non-zero");
    tree.insert(&particles, 0..particles.len())
        .expect("particles start inside the world");
    log::info!(
        "indexed {} particles: {} nodes, depth {}",
        tree.len(),
        tree.node_count(),
        tree.depth()
    );

    let probe = WORLD.center();
    for step in 1..=STEPS {
        for p in &mut particles {
            p.advance(DT, WORLD);
        }
        let summary = tree.update(&particles).expect("particles stay inside the world");
        let nearest = tree
            .knn_with_distances(&particles, probe, 3)
            .expect("probe is finite");
        log::info!(
            "step {step:2}: relocated {:4}, split {:3}, merged {:3}, nodes {:4}",
            summary.relocated,
            summary.split,
            summary.merged,
            tree.node_count()
        );
        for (handle, distance) in nearest {
            log::debug!("  #{handle} at {distance:.2} from the center");
        }
    }
}
