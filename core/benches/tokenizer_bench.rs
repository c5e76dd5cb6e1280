use criterion::{criterion_group, criterion_main, Criterion};
use index_core::IndexBuilder;

const TEXT: &str = "Preliminary Report-International Algebraic Language\n\
    Compiling techniques for boolean expressions and conditional statements\n\
    in ALGOL 60 are described, with the running times of 2023 test programs.\n\
    The indexer tokenizes, filters, stems and counts every word it sees.\n";

fn bench_ingest(c: &mut Criterion) {
    let text = TEXT.repeat(200);
    c.bench_function("ingest_text", |b| {
        b.iter(|| {
            let mut builder = IndexBuilder::default();
            let doc = builder.new_document("bench.txt");
            builder.ingest_text(doc, &text)
        })
    });
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
