// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_quadtree::{Particle, Point, QuadTree, Region, Vec2};

const SIDE: f64 = 1000.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn domain() -> Region {
    Region::new(Point::ZERO, Point::new(SIDE, SIDE)).unwrap()
}

fn gen_uniform_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * SIDE, rng.next_f64() * SIDE))
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    for _ in 0..n_clusters {
        let (cx, cy) = (rng.next_f64() * SIDE, rng.next_f64() * SIDE);
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Point::new((cx + dx).clamp(0.0, SIDE), (cy + dy).clamp(0.0, SIDE)));
        }
    }
    out
}

fn gen_particles(count: usize, speed: f64) -> Vec<Particle> {
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    (0..count)
        .map(|_| {
            let p = Point::new(rng.next_f64() * SIDE, rng.next_f64() * SIDE);
            let v = Vec2::new((rng.next_f64() - 0.5) * speed, (rng.next_f64() - 0.5) * speed);
            Particle::new(p, v)
        })
        .collect()
}

fn build(points: &[Point], bucket: usize) -> QuadTree<usize> {
    let mut tree = QuadTree::new(domain(), bucket).unwrap();
    tree.insert(points, 0..points.len()).unwrap();
    tree
}

fn brute_force_knn(points: &[Point], query: Point, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| query.distance(points[a]).total_cmp(&query.distance(points[b])));
    order.truncate(k);
    order
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000, 100_000] {
        let uniform = gen_uniform_points(n, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        for bucket in [4usize, 16] {
            group.bench_function(format!("uniform_n{}_b{}", n, bucket), |b| {
                b.iter(|| black_box(build(&uniform, bucket).node_count()));
            });
        }
    }
    let clustered = gen_clustered_points(20, 500, 40.0);
    group.throughput(Throughput::Elements(clustered.len() as u64));
    group.bench_function("clustered_b8", |b| {
        b.iter(|| black_box(build(&clustered, 8).node_count()));
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let bounds = domain().rect();
    for &n in &[1_000usize, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        for speed in [1.0_f64, 50.0] {
            let particles = gen_particles(n, speed);
            group.bench_function(format!("step_n{}_speed{}", n, speed), |b| {
                b.iter_batched(
                    || {
                        let mut tree = QuadTree::new(domain(), 8).unwrap();
                        tree.insert(&particles, 0..particles.len()).unwrap();
                        let mut moved = particles.clone();
                        for p in &mut moved {
                            p.advance(1.0, bounds);
                        }
                        (tree, moved)
                    },
                    |(mut tree, moved)| {
                        let summary = tree.update(&moved).unwrap();
                        black_box(summary.relocated);
                    },
                    BatchSize::LargeInput,
                )
            });
        }
        let particles = gen_particles(n, 1.0);
        let mut tree = QuadTree::new(domain(), 8).unwrap();
        tree.insert(&particles, 0..particles.len()).unwrap();
        group.bench_function(format!("idle_n{}", n), |b| {
            b.iter(|| black_box(tree.update(&particles).unwrap()));
        });
    }
    group.finish();
}

fn bench_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn");
    let queries = gen_uniform_points(64, 0x1234_5678_9ABC_DEF0);
    for &n in &[1_000usize, 10_000, 100_000] {
        let points = gen_uniform_points(n, 0xBADC_F00D_1234_5678);
        let tree = build(&points, 8);
        group.throughput(Throughput::Elements(queries.len() as u64));
        for k in [1usize, 10, 50] {
            group.bench_function(format!("quadtree_n{}_k{}", n, k), |b| {
                b.iter(|| {
                    for &q in &queries {
                        black_box(tree.knn(&points, q, k).unwrap());
                    }
                });
            });
        }
        if n <= 10_000 {
            group.bench_function(format!("brute_force_n{}_k10", n), |b| {
                b.iter(|| {
                    for &q in &queries {
                        black_box(brute_force_knn(&points, q, 10));
                    }
                });
            });
        }
    }
    group.finish();
}

fn bench_query_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_region");
    let points = gen_uniform_points(50_000, 0xDEAD_BEEF_0BAD_F00D);
    let tree = build(&points, 8);
    for side in [10.0_f64, 100.0, 400.0] {
        let area = Region::new(Point::new(300.0, 300.0), Point::new(300.0 + side, 300.0 + side))
            .unwrap();
        group.bench_function(format!("square_{}", side), |b| {
            b.iter(|| black_box(tree.query_region(&points, &area).len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_knn, bench_query_region);
criterion_main!(benches);
