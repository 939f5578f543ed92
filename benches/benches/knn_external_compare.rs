// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_quadtree::{Point, QuadTree, Region};

use rstar::RTree;

const SIDE: f64 = 1000.0;

struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = Rng(seed);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * SIDE, rng.next_f64() * SIDE))
        .collect()
}

fn to_rstar_points(v: &[Point]) -> Vec<[f64; 2]> {
    v.iter().map(|p| [p.x, p.y]).collect()
}

fn bench_knn_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_external_compare");
    let domain = Region::new(Point::ZERO, Point::new(SIDE, SIDE)).unwrap();
    let queries = gen_points(64, 0x1234_5678_9ABC_DEF0);
    for &n in &[10_000usize, 100_000] {
        let points = gen_points(n, 0xCAFE_F00D_DEAD_BEEF);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("understory_build_n{}", n), |b| {
            b.iter(|| {
                let mut tree = QuadTree::new(domain, 8).unwrap();
                tree.insert(&points, 0..points.len()).unwrap();
                black_box(tree.node_count());
            })
        });
        group.bench_function(format!("rstar_build_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_points(&points),
                |pts| black_box(RTree::bulk_load(pts).size()),
                BatchSize::LargeInput,
            )
        });

        let mut tree = QuadTree::new(domain, 8).unwrap();
        tree.insert(&points, 0..points.len()).unwrap();
        let rtree = RTree::bulk_load(to_rstar_points(&points));

        group.throughput(Throughput::Elements(queries.len() as u64));
        for k in [1usize, 16] {
            group.bench_function(format!("understory_knn_n{}_k{}", n, k), |b| {
                b.iter(|| {
                    for &q in &queries {
                        black_box(tree.knn(&points, q, k).unwrap());
                    }
                })
            });
            group.bench_function(format!("rstar_knn_n{}_k{}", n, k), |b| {
                b.iter(|| {
                    for &q in &queries {
                        let hits: Vec<_> = rtree.nearest_neighbor_iter(&[q.x, q.y]).take(k).collect();
                        black_box(hits);
                    }
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_knn_external_compare);
criterion_main!(benches);
