//! Criterion benchmarks for the per-request hot path: the challenge hash and
//! the datagram codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package fortune-core --bench challenge_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fortune_core::{
    challenge_hash, decode, encode, encode_varint, ContentRequest, HandoffInfo, HashResponse,
    NonceChallenge,
};

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_varint");
    for value in [0i64, 1984, 1 << 40, i64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(value), &value, |b, &v| {
            b.iter(|| encode_varint(black_box(v)))
        });
    }
    group.finish();
}

fn bench_challenge_hash(c: &mut Criterion) {
    c.bench_function("challenge_hash", |b| {
        b.iter(|| challenge_hash(black_box(5_577_006_791_947_779_410), black_box(1984)))
    });
}

fn bench_codec(c: &mut Criterion) {
    let hash = HashResponse {
        hash: challenge_hash(42, 1984),
    };
    let info = HandoffInfo {
        content_server: "127.0.0.1:7071".to_string(),
        access_token: 8_674_665_223_082_153_551,
    };
    let hash_bytes = encode(&hash).unwrap();
    let info_bytes = encode(&info).unwrap();

    c.bench_function("encode_nonce_challenge", |b| {
        b.iter(|| encode(black_box(&NonceChallenge { nonce: 42 })).unwrap())
    });
    c.bench_function("decode_hash_response", |b| {
        b.iter(|| decode::<HashResponse>(black_box(&hash_bytes)).unwrap())
    });
    c.bench_function("decode_handoff_info", |b| {
        b.iter(|| decode::<HandoffInfo>(black_box(&info_bytes)).unwrap())
    });
    c.bench_function("reject_probe_as_content_request", |b| {
        b.iter(|| decode::<ContentRequest>(black_box(b"{}")).is_err())
    });
}

criterion_group!(benches, bench_varint, bench_challenge_hash, bench_codec);
criterion_main!(benches);
