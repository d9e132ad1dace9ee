use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unchained_signer::{
    decode_qr_data, derive_public_key, derive_short_public_key, encode_attestation, encode_qr_data,
    generate_secure_random_scalar, sign, verify, Attestation, PrivateKey, QrData,
};

fn sample_attestation() -> Attestation {
    Attestation::new(1_717_000_000, vec![0x42; 64], vec![0x1c; 64], true)
}

fn bench_sign(c: &mut Criterion) {
    let key = PrivateKey::generate();
    let message = encode_attestation(&sample_attestation()).unwrap_or_default();

    c.bench_function("bls_short_sign", |b| {
        b.iter(|| sign(black_box(&message), black_box(&key)));
    });
}

fn bench_verify(c: &mut Criterion) {
    let key = PrivateKey::generate();
    let message = [7u8; 32];
    let sig = sign(&message, &key);
    let pk = key.public_key();

    c.bench_function("bls_short_verify", |b| {
        b.iter(|| verify(black_box(&message), black_box(&sig), black_box(&pk)));
    });
}

fn bench_derive(c: &mut Criterion) {
    let key = PrivateKey::generate();

    c.bench_function("derive_public_keys", |b| {
        b.iter(|| {
            let _ = derive_public_key(black_box(&key));
            let _ = derive_short_public_key(black_box(&key));
        });
    });
}

fn bench_random_scalar(c: &mut Criterion) {
    c.bench_function("secure_random_scalar", |b| {
        b.iter(generate_secure_random_scalar);
    });
}

fn bench_qr_codec(c: &mut Criterion) {
    let qr = QrData {
        data: sample_attestation(),
        url: "https://shinobi.brokers.kenshi.io/0.11.21".to_owned(),
    };
    let bytes = encode_qr_data(&qr).unwrap_or_default();

    c.bench_function("qr_encode", |b| {
        b.iter(|| encode_qr_data(black_box(&qr)));
    });
    c.bench_function("qr_decode", |b| {
        b.iter(|| decode_qr_data(black_box(&bytes)));
    });
}

criterion_group!(
    benches,
    bench_sign,
    bench_verify,
    bench_derive,
    bench_random_scalar,
    bench_qr_codec
);
criterion_main!(benches);
