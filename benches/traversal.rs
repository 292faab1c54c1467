use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gentrie::{merge_plan, Hash, HashTrie, TrieEncoding, TrieShape, TrieWriter};

/// A full trie of the given depth, leaves numbered left to right
fn full_shape(depth: usize, next_page: &mut u32) -> TrieShape {
    if depth == 0 {
        *next_page += 1;
        return TrieShape::Leaf(*next_page - 1);
    }
    TrieShape::Branch((0..4).map(|_| Some(full_shape(depth - 1, next_page))).collect())
}

fn encoding(depth: usize) -> TrieEncoding {
    TrieWriter::encode(&full_shape(depth, &mut 0))
}

fn bench_find_leaf(c: &mut Criterion) {
    let enc = encoding(6);
    let trie = HashTrie::new(&enc);
    let hashes: Vec<Hash> = (0..1024u32).map(|i| Hash::digest(&i.to_le_bytes())).collect();

    c.bench_function("find_leaf depth 6", |b| {
        b.iter(|| {
            for hash in &hashes {
                black_box(trie.find_leaf(hash));
            }
        })
    });
}

fn bench_leaves(c: &mut Criterion) {
    let enc = encoding(6);
    let trie = HashTrie::new(&enc);

    c.bench_function("leaves depth 6", |b| b.iter(|| black_box(trie.leaves().len())));
}

fn bench_merge_plan(c: &mut Criterion) {
    let shallow = encoding(3);
    let deep = encoding(5);
    let tries = [HashTrie::new(&shallow), HashTrie::new(&deep)];

    c.bench_function("merge_plan 3+5", |b| b.iter(|| black_box(merge_plan(&tries).len())));
}

criterion_group!(benches, bench_find_leaf, bench_leaves, bench_merge_plan);
criterion_main!(benches);
