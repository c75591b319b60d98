//! # wifi-check Collector Benchmarks
//!
//! Hot paths on the client side of a diagnostic run:
//!
//! | Area | Operation |
//! |------|-----------|
//! | wc-01 Address Discovery | candidate line parsing, STUN response decoding |
//! | wc-03 Score | latency statistics, score aggregation |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{HeaderSet, ScoreRequest};
use wc_01_address_discovery::adapters::stun_codec::{
    decode_binding_response, encode_binding_success, new_transaction_id,
};
use wc_01_address_discovery::{reflexive_address, CandidateDescriptor, CandidateSet};
use wc_03_score::{compute_score, LatencyStats};

const SRFLX: &str = "candidate:842163049 1 udp 1677729535 203.0.113.7 51734 typ srflx raddr 192.168.1.20 rport 51734 generation 0";
const HOST: &str = "candidate:1 1 udp 2122260223 192.168.1.20 51734 typ host generation 0";

// ============================================================================
// WC-01: Address Discovery
// ============================================================================

fn bench_candidate_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("wc-01-candidates");

    group.bench_function("descriptor_parse_srflx", |b| {
        b.iter(|| black_box(CandidateDescriptor::parse(black_box(SRFLX))))
    });

    group.bench_function("reflexive_address_host", |b| {
        b.iter(|| black_box(reflexive_address(black_box(HOST))))
    });

    // Gathering typically yields a handful of lines per interface.
    for count in [4usize, 16, 64] {
        let lines: Vec<String> = (0..count)
            .map(|i| {
                if i % 4 == 0 {
                    format!(
                        "candidate:{i} 1 udp 1677729535 203.0.113.{} 51734 typ srflx raddr 192.168.1.20 rport 51734",
                        i % 250
                    )
                } else {
                    format!("candidate:{i} 1 udp 2122260223 192.168.1.{} 51734 typ host", i % 250)
                }
            })
            .collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("candidate_set_observe", count), &lines, |b, lines| {
            b.iter(|| {
                let mut set = CandidateSet::new();
                for line in lines {
                    set.observe(line);
                }
                black_box(set.len())
            })
        });
    }

    group.finish();
}

fn bench_stun_decoding(c: &mut Criterion) {
    let txn = new_transaction_id();
    let response = encode_binding_success(&txn, "203.0.113.7:51734".parse().unwrap());

    c.bench_function("wc-01-stun/decode_binding_success", |b| {
        b.iter(|| black_box(decode_binding_response(black_box(&response))))
    });
}

// ============================================================================
// WC-03: Score
// ============================================================================

fn random_samples(count: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen_range(5.0..1500.0)).collect()
}

fn bench_latency_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("wc-03-latency-stats");

    for count in [5usize, 50, 500] {
        let samples = random_samples(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| black_box(LatencyStats::from_samples(black_box(samples))))
        });
    }

    group.finish();
}

fn bench_compute_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("wc-03-score");

    let clean = ScoreRequest {
        https_secure: true,
        public_ip: Some("203.0.113.7".into()),
        latency_samples: Some(random_samples(5)),
        ..Default::default()
    };
    group.bench_function("clean_connection", |b| {
        b.iter(|| black_box(compute_score(black_box(&clean))))
    });

    let proxy_headers: HeaderSet = [
        ("via".to_string(), "1.1 proxy.example.net".to_string()),
        ("x-forwarded-for".to_string(), "198.51.100.20".to_string()),
    ]
    .into_iter()
    .collect();
    let penalised = ScoreRequest {
        https_secure: false,
        public_ip: Some("203.0.113.7".into()),
        latency_samples: Some(vec![900.0, 950.0, 1000.0, 870.0, 910.0]),
        raw_headers: proxy_headers.clone(),
        proxy_headers,
    };
    group.bench_function("every_penalty", |b| {
        b.iter(|| black_box(compute_score(black_box(&penalised))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_candidate_parsing,
    bench_stun_decoding,
    bench_latency_stats,
    bench_compute_score,
);
criterion_main!(benches);
