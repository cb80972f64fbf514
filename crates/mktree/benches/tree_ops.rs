//! Benchmarks for tree construction, proof generation and mutation.
#![allow(missing_docs)]
#![allow(unused_crate_dependencies)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mktree::{BinaryMerkleTree, Sha256Hasher, Sha256MerkleTree};

/// Generates distinct blocks from sequential indices.
fn generate_blocks(count: usize) -> Vec<Vec<u8>> {
    (0..count).map(|i| i.to_le_bytes().to_vec()).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [16, 1024, 16384] {
        let blocks = generate_blocks(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &blocks, |b, blocks| {
            b.iter(|| {
                let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(blocks)
                    .expect("build failed");
                black_box(tree);
            });
        });
    }
    group.finish();
}

fn bench_prove(c: &mut Criterion) {
    let mut group = c.benchmark_group("prove");
    for size in [16, 1024, 16384] {
        let blocks = generate_blocks(size);
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(&blocks).expect("build failed");
        let target = blocks[size / 2].clone();
        group.bench_with_input(BenchmarkId::from_parameter(size), &target, |b, target| {
            b.iter(|| black_box(tree.gen_proof_for_block(target).expect("prove failed")));
        });
    }
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_rebuild");
    for size in [16, 1024] {
        let blocks = generate_blocks(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &blocks, |b, blocks| {
            b.iter_batched(
                || Sha256MerkleTree::new(blocks).expect("build failed"),
                |mut tree| {
                    tree.insert(b"extra").expect("insert failed");
                    black_box(tree.root());
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_prove, bench_insert);
criterion_main!(benches);
