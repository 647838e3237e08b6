use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use msdecomp::mszip::{self, MszipState};
use msdecomp::{expand_bytes, SzddHeader, MSZIP_BLOCK_SIZE};
use std::hint::black_box;
use std::io::Write;
use std::time::Duration;

fn generate_data(size: usize, pattern: &str) -> Vec<u8> {
    match pattern {
        "text" => {
            let base = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
            base.iter().cycle().take(size).copied().collect()
        }
        "binary" => (0..size).map(|i| ((i * 17 + 11) % 256) as u8).collect(),
        "random" => {
            let mut seed = 0x1234_5678u32;
            (0..size)
                .map(|_| {
                    seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                    (seed >> 24) as u8
                })
                .collect()
        }
        _ => panic!("Unknown pattern: {}", pattern),
    }
}

fn mszip_blocks(data: &[u8]) -> Vec<(Vec<u8>, usize)> {
    data.chunks(MSZIP_BLOCK_SIZE)
        .map(|chunk| {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(chunk).expect("Compression failed");
            let mut block = b"CK".to_vec();
            block.extend(encoder.finish().expect("Compression failed"));
            (block, chunk.len())
        })
        .collect()
}

/// SZDD file made of literal groups only
fn szdd_file(data: &[u8]) -> Vec<u8> {
    let header = SzddHeader {
        compression_type: b'A',
        missing_char: 0,
        real_length: data.len() as u32,
    };
    let mut file = header.to_bytes().to_vec();
    for chunk in data.chunks(8) {
        file.push(0xFF);
        file.extend_from_slice(chunk);
    }
    file
}

fn mszip_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("mszip_throughput");
    group.measurement_time(Duration::from_secs(10));

    for size in [32768, 327680, 3276800].iter() {
        let size_label = match *size {
            32768 => "32KB",
            327680 => "320KB",
            3276800 => "3.2MB",
            _ => "unknown",
        };

        for pattern in ["text", "binary", "random"].iter() {
            let blocks = mszip_blocks(&generate_data(*size, pattern));
            let benchmark_id = BenchmarkId::new(*pattern, size_label);

            group.throughput(Throughput::Bytes(*size as u64));
            group.bench_with_input(benchmark_id, &blocks, |b, blocks| {
                let mut output = vec![0u8; MSZIP_BLOCK_SIZE];
                b.iter(|| {
                    let mut state = MszipState::new();
                    for (block, len) in blocks {
                        mszip::decompress(
                            &mut state,
                            black_box(block),
                            block.len(),
                            &mut output,
                            *len,
                        )
                        .expect("Decompression failed");
                    }
                });
            });
        }
    }

    group.finish();
}

fn szdd_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("szdd_throughput");
    group.measurement_time(Duration::from_secs(5));

    for size in [1024, 102400, 1048576].iter() {
        let size_label = match *size {
            1024 => "1KB",
            102400 => "100KB",
            1048576 => "1MB",
            _ => "unknown",
        };
        let file = szdd_file(&generate_data(*size, "text"));

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_label), &file, |b, file| {
            b.iter(|| expand_bytes(black_box(file)).expect("Decompression failed"));
        });
    }

    group.finish();
}

criterion_group!(benches, mszip_throughput, szdd_throughput);
criterion_main!(benches);
