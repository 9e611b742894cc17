use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use recipient_link::caps::{CapabilityPayload, KeyMaterial, TokenKey, decode, encode};
use recipient_link::eligibility::validate;
use chrono::{TimeZone, Utc};
use std::hint::black_box;

// Token sealing and opening dominate link issuance; the age check is here as a baseline.

fn keys() -> KeyMaterial {
    KeyMaterial::new(
        TokenKey::derive(1, "benchmark-secret-0123456789abcdef"),
        "https://delivery.example.com/",
    )
    .unwrap()
}

fn payload() -> CapabilityPayload {
    CapabilityPayload::new(
        123_456,
        "0xA1b2C3d4E5F67890abcdef1234567890ABCDEF12".parse().unwrap(),
    )
    .unwrap()
}

fn token_benchmark(c: &mut Criterion) {
    let keys = keys();
    let payload = payload();
    let token = encode(&payload, &keys).unwrap();

    let mut group = c.benchmark_group("token");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode", |b| b.iter(|| encode(black_box(&payload), &keys).unwrap()));
    group.bench_function("decode", |b| b.iter(|| decode(black_box(&token), &keys).unwrap()));
    group.bench_function("decode_tampered", |b| {
        let mut bytes = token.as_str().to_owned().into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap().into();
        b.iter(|| decode(black_box(&tampered), &keys).unwrap_err())
    });

    group.finish();
}

fn age_window_benchmark(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let birth = Utc.with_ymd_and_hms(1990, 6, 15, 0, 0, 0).unwrap();

    c.bench_function("age_window/validate", |b| {
        b.iter(|| validate(black_box(birth), black_box(now)))
    });
}

criterion_group!(benches, token_benchmark, age_window_benchmark);
criterion_main!(benches);
