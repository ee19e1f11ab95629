use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fano_cyclic::cs::channel::NoFlips;
use fano_cyclic::cs::compression::build_codebook;
use fano_cyclic::cs::ecc::{decode, derive_codewords, encode_file, split_blocks, Generator};
use fano_cyclic::cs::transmission::{receive, send};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn sample_data(len: usize) -> Vec<u8> {
    let mut rng = ChaCha20Rng::seed_from_u64(0xC0DE);
    (0..len).map(|_| b'a' + (rng.gen::<u8>() % 26)).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclic_encode");
    let generator = Generator::default();

    for size in [1_000, 10_000, 100_000] {
        let data = sample_data(size);
        let codebook = build_codebook(&data).unwrap();
        let codewords = derive_codewords(&codebook, &generator).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| encode_file(black_box(data), &codewords).unwrap())
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyclic_decode");
    let generator = Generator::default();

    for size in [1_000, 10_000, 100_000] {
        let data = sample_data(size);
        let codebook = build_codebook(&data).unwrap();
        let codewords = derive_codewords(&codebook, &generator).unwrap();
        let stream = encode_file(&data, &codewords).unwrap();
        let blocks = split_blocks(&stream, codewords.width()).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &blocks, |b, blocks| {
            b.iter(|| decode(black_box(blocks), &generator, "cyclic").unwrap())
        });
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let data = sample_data(10_000);
    let generator = Generator::default();

    c.bench_function("send_receive_10k", |b| {
        b.iter(|| {
            let envelope = send(black_box(&data), &generator, &mut NoFlips).unwrap();
            receive(&envelope).unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_round_trip);
criterion_main!(benches);
