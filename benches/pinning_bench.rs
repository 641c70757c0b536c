//! Trust evaluation and multipart assembly benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netlayer::http::multipart::build;
use netlayer::tls::{Certificate, Challenge, PinningMaterial, TrustValidator};
use netlayer::MultipartField;
use std::sync::Arc;

const PINNED_RSA_PEM: &[u8] = include_bytes!("../tests/fixtures/pinned_rsa.pem");
const OTHER_EC_PEM: &[u8] = include_bytes!("../tests/fixtures/other_ec.pem");
const HOST: &str = "pinned.example.com";

fn trust_evaluation(c: &mut Criterion) {
    let rsa = Certificate::from_pem(PINNED_RSA_PEM).unwrap();
    let ec = Certificate::from_pem(OTHER_EC_PEM).unwrap();
    let chain = vec![ec.clone(), rsa.clone()];

    let by_cert = TrustValidator::new(Arc::new(
        PinningMaterial::new().certificate(rsa.clone()).host(HOST),
    ));
    c.bench_function("evaluate_certificate_pin", |b| {
        b.iter(|| by_cert.evaluate(&Challenge::server_trust(black_box(HOST), &chain)))
    });

    let pin = rsa.public_key_hash().unwrap();
    let by_key = TrustValidator::new(Arc::new(PinningMaterial::new().public_key_hash(pin).host(HOST)));
    c.bench_function("evaluate_public_key_pin", |b| {
        b.iter(|| by_key.evaluate(&Challenge::server_trust(black_box(HOST), &chain)))
    });

    c.bench_function("evaluate_unpinned_host", |b| {
        b.iter(|| by_key.evaluate(&Challenge::server_trust(black_box("other.example.com"), &chain)))
    });
}

fn multipart_assembly(c: &mut Criterion) {
    let payload = vec![0xabu8; 64 * 1024];
    let fields: Vec<(String, MultipartField)> = (0..8)
        .map(|i| {
            let field = if i % 2 == 0 {
                MultipartField::text(format!("value {}", i))
            } else {
                MultipartField::file(payload.clone(), format!("part{}.bin", i), "application/octet-stream")
            };
            (format!("field{}", i), field)
        })
        .collect();

    c.bench_function("multipart_build_256k", |b| {
        b.iter(|| build(black_box(&fields), "bench-boundary").unwrap())
    });
}

criterion_group!(benches, trust_evaluation, multipart_assembly);
criterion_main!(benches);
