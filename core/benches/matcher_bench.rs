use criterion::{criterion_group, criterion_main, Criterion};
use mpn_core::{match_parts, Corpus, MatchConfig, PartRecord};

fn synthetic_datasheet(seed: usize) -> String {
    (0..4000)
        .map(|i| match i % 50 {
            0 => format!("MPN-{seed}-{i}-TR"),
            _ => format!("word{}", (i * 31 + seed) % 997),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_match(c: &mut Criterion) {
    let corpus = Corpus::from_texts((0..20).map(|d| (format!("https://example.com/{d}.pdf"), synthetic_datasheet(d))));
    let parts: Vec<PartRecord> = (0..200)
        .map(|i| {
            let part = format!("MPN-{}-{}", i % 20, (i * 50) % 4000);
            if i % 2 == 0 { PartRecord::scoped(part, format!("https://example.com/{}.pdf", i % 20)) } else { PartRecord::unscoped(part) }
        })
        .collect();
    let config = MatchConfig::default();
    c.bench_function("match_200_parts_20_docs", |b| b.iter(|| match_parts(&corpus, &parts, &config)));
}

criterion_group!(benches, bench_match);
criterion_main!(benches);
