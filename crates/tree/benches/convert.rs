//! Benchmarks for MDX ⇄ tree conversion.
//! Run with: cargo bench -p mdxdoc-tree

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdxdoc_tree::{
    DeserializeOptions, SequentialIds, SerializeOptions, deserialize, serialize_document,
};

fn sample_document() -> String {
    let section = "## Section\n\nLorem ipsum *dolor* sit **amet**, consectetur `adipiscing` elit.\n\n\
- first item\n- second item\n  1. nested\n  2. nested again\n\n\
<Callout type=\"info\" data={{ level: 2, tags: [\"a\", \"b\"] }}>\n\nInside the **callout**.\n\n</Callout>\n\n\
```rust\nfn main() {}\n```\n\n";
    section.repeat(100)
}

fn bench_deserialize(c: &mut Criterion) {
    let source = sample_document();
    let options = DeserializeOptions::default();
    c.bench_function("deserialize_mixed_mdx", |b| {
        b.iter(|| {
            let mut ids = SequentialIds::default();
            black_box(deserialize(black_box(&source), &options, &mut ids))
        })
    });
}

fn bench_serialize(c: &mut Criterion) {
    let source = sample_document();
    let tree = deserialize(
        &source,
        &DeserializeOptions::default(),
        &mut SequentialIds::default(),
    );
    let options = SerializeOptions::default();
    c.bench_function("serialize_mixed_tree", |b| {
        b.iter(|| black_box(serialize_document(black_box(&tree.nodes), &options).unwrap()))
    });
}

criterion_group!(benches, bench_deserialize, bench_serialize);
criterion_main!(benches);
