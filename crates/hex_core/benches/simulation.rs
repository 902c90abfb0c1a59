//! Hot-path benchmarks for hex_core.
//!
//! Run with: `cargo bench -p hex_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hex_core::error::Result;
use hex_core::hex::HexCoord;
use hex_core::math::Fixed;
use hex_core::pathfinding::{find_path, HexPathValidator};
use hex_core::tick::{TickManager, Tickable};
use hex_test_utils::fixtures::{grassland_grid, mixed_terrain_grid};

struct Accumulator {
    priority: i32,
    total: Fixed,
}

impl Tickable for Accumulator {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn tick(&mut self, delta: Fixed) -> Result<()> {
        self.total = self.total.wrapping_add(delta);
        Ok(())
    }
}

/// Neighbour lookups through the reusable buffer.
pub fn neighbor_benchmark(c: &mut Criterion) {
    let grid = grassland_grid(64, 64);
    let coords = grid.sorted_coords();
    let mut buffer = Vec::with_capacity(6);

    c.bench_function("neighbors_into_64x64", |b| {
        b.iter(|| {
            let mut total = 0;
            for coord in &coords {
                grid.neighbors_into(black_box(*coord), &mut buffer);
                total += buffer.len();
            }
            black_box(total)
        });
    });

    c.bench_function("visible_tiles_into_64x64", |b| {
        let mut out = Vec::with_capacity(coords.len());
        b.iter(|| {
            grid.visible_tiles_into(black_box(0), &mut out);
            black_box(out.len())
        });
    });
}

/// One tick through a hundred tickables of mixed priority.
pub fn tick_benchmark(c: &mut Criterion) {
    let manager = TickManager::new();
    let tickables: Vec<_> = (0..100)
        .map(|i| {
            Rc::new(RefCell::new(Accumulator {
                priority: (i * 37) % 11,
                total: Fixed::ZERO,
            }))
        })
        .collect();
    for tickable in &tickables {
        manager.register(tickable);
    }

    c.bench_function("process_tick_100", |b| {
        b.iter(|| manager.process_tick(black_box(Fixed::ONE)));
    });
}

/// A* across a mixed-terrain map.
pub fn pathfinding_benchmark(c: &mut Criterion) {
    let grid = mixed_terrain_grid(32, 32);
    let validator = HexPathValidator::new();

    c.bench_function("find_path_32x32", |b| {
        b.iter(|| {
            black_box(find_path(
                &grid,
                &validator,
                HexCoord::new(0, 0),
                HexCoord::new(31, 31),
            ))
        });
    });
}

criterion_group!(benches, neighbor_benchmark, tick_benchmark, pathfinding_benchmark);
criterion_main!(benches);
