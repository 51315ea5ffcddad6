//! Benchmarks for channel parsing and subscription counters.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use giztoy_pubsub::{Channel, Counters, Ssid};

const STATIC_CHANNEL: &str = "xm54Sj0srWlSEctra-yU6ZA6Z2e6pp7c/a/roman/is/da/best/";
const OPTIONS_CHANNEL: &str = "xm54Sj0srWlSEctra-yU6ZA6Z2e6pp7c/a/roman/is/da/best/?opt1=true&opt2=false";
const WILDCARD_CHANNEL: &str = "xm54Sj0srWlSEctra-yU6ZA6Z2e6pp7c/device/+/sensor/#";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_parse");

    for (name, input) in [
        ("static", STATIC_CHANNEL),
        ("options", OPTIONS_CHANNEL),
        ("wildcard", WILDCARD_CHANNEL),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(Channel::parse(black_box(input.as_bytes()))));
        });
    }

    group.finish();
}

fn bench_ssid(c: &mut Criterion) {
    let channel = Channel::parse(STATIC_CHANNEL.as_bytes());

    c.bench_function("ssid_new_hash_code", |b| {
        b.iter(|| {
            let ssid = Ssid::new(black_box(42), &channel);
            black_box(ssid.hash_code())
        });
    });
}

fn bench_counters(c: &mut Criterion) {
    let mut group = c.benchmark_group("counters");

    for size in [100u32, 1000, 10000].iter() {
        let ssids: Vec<Ssid> = (0..*size).map(|i| Ssid::from(vec![1, i, i / 10])).collect();

        group.bench_with_input(BenchmarkId::new("increment_decrement", size), size, |b, _| {
            let counters = Counters::new();
            b.iter(|| {
                for ssid in &ssids {
                    black_box(counters.increment(ssid, b"a/b"));
                }
                for ssid in &ssids {
                    black_box(counters.decrement(ssid));
                }
            });
        });

        let counters = Counters::new();
        for ssid in &ssids {
            counters.increment(ssid, b"a/b");
        }
        group.bench_with_input(BenchmarkId::new("all", size), size, |b, _| {
            b.iter(|| black_box(counters.all()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_ssid, bench_counters);

criterion_main!(benches);
