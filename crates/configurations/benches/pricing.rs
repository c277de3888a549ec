use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ausbau_catalog::ItemId;
use ausbau_configurations::pricing::{PricedLine, price_line, total};
use ausbau_core::Cents;

fn fixture(lines: usize) -> Vec<PricedLine> {
    (0..lines)
        .map(|i| {
            price_line(
                ItemId::new(),
                Cents::new(1000 + (i as i64 % 97) * 13),
                Some(1 + (i as u32 % 8)),
            )
            .unwrap()
        })
        .collect()
}

fn bench_total(c: &mut Criterion) {
    for size in [10usize, 100, 1000] {
        let lines = fixture(size);
        c.bench_function(&format!("price_total/{size}"), |b| {
            b.iter(|| total(black_box(&lines)).unwrap())
        });
    }
}

criterion_group!(benches, bench_total);
criterion_main!(benches);
