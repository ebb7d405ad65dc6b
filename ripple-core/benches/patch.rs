use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ripple_core::config::DocumentConfig;
use ripple_core::render::{Document, VNode};
use ripple_core::{h, mount, patch, props};

fn list(len: usize, generation: usize) -> VNode {
    h(
        "ul",
        None,
        (0..len)
            .map(|i| h("li", props! { "class" => "row" }, format!("{i}:{generation}")))
            .collect::<Vec<_>>(),
    )
}

fn bench_patch_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch_text");
    for len in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let doc = Document::with_config(DocumentConfig {
                record_mutations: false,
                ..DocumentConfig::default()
            });
            let mut current = list(len, 0);
            mount(&doc, &mut current, doc.root()).unwrap();
            let mut generation = 0;

            b.iter(|| {
                generation += 1;
                let mut next = list(len, generation);
                patch(&doc, &current, &mut next).unwrap();
                current = black_box(next);
            });
        });
    }
    group.finish();
}

fn bench_patch_resize(c: &mut Criterion) {
    c.bench_function("patch_grow_shrink_100", |b| {
        let doc = Document::new();
        let mut current = list(50, 0);
        mount(&doc, &mut current, doc.root()).unwrap();
        let mut grow = true;

        b.iter(|| {
            let mut next = list(if grow { 100 } else { 50 }, 0);
            patch(&doc, &current, &mut next).unwrap();
            doc.take_mutations();
            current = next;
            grow = !grow;
        });
    });
}

criterion_group!(benches, bench_patch_text, bench_patch_resize);
criterion_main!(benches);
