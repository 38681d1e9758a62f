use filelock_crypto::{decrypt_with_params, encrypt_with_params, KdfParams};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

// Single-round KDF so the numbers reflect AES-CBC + SHA-256 throughput.
fn fast() -> KdfParams {
    KdfParams { iterations: 1 }
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let password = SecretString::from("bench-password");
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt_with_params(
                divan::black_box(&data),
                divan::black_box(&password),
                &fast(),
            )
            .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let password = SecretString::from("bench-password");
    let data = make_data(size);
    let container = encrypt_with_params(&data, &password, &fast()).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt_with_params(
                divan::black_box(&container),
                divan::black_box(&password),
                &fast(),
            )
            .unwrap()
        });
}

#[divan::bench]
fn bench_derive_key_default() -> filelock_crypto::DerivedKey {
    filelock_crypto::derive_key(
        divan::black_box(&SecretString::from("bench-password")),
        divan::black_box(&[9u8; 16]),
        &KdfParams::default(),
    )
}

fn main() {
    divan::main();
}
