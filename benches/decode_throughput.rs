use std::fmt::Write as _;

use chrono::{Duration, NaiveDate};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use csv_quotes::{decode_reader, quote::Quote};

fn generate_quotes(rows: usize) -> String {
    let mut text = String::from("Date,Open,High,Low,Close,Volume,Adj Close\n");
    let start = NaiveDate::from_ymd_opt(2014, 10, 21).expect("valid date");
    for i in 0..rows {
        let date = start - Duration::days(i as i64);
        let open = 20.0 + (i % 500) as f64 / 100.0;
        writeln!(
            text,
            "{},{open:.2},{:.2},{:.2},{:.2},{},{:.2}",
            date.format("%-d-%b-%y"),
            open + 0.75,
            open - 0.40,
            open + 0.10,
            40_000 + i * 7,
            open + 0.05
        )
        .expect("row");
    }
    text
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_quotes");
    for rows in [1_000usize, 50_000] {
        let text = generate_quotes(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("{rows}_rows"), |b| {
            b.iter_batched(
                || Vec::<Quote>::with_capacity(rows),
                |mut quotes| {
                    decode_reader(text.as_bytes(), &mut quotes).expect("decode");
                    quotes
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
