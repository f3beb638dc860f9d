//! Throughput benchmarks for the console core.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use famicore_core::Console;

/// Minimal 32 KiB NROM image: a tight JMP loop at $8000.
fn minimal_rom() -> Vec<u8> {
    let mut data = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0x00, 0];
    data.extend_from_slice(&[0; 8]);

    let mut prg = vec![0xEA; 2 * 16 * 1024];
    prg[0x0000] = 0x4C; // JMP $8000
    prg[0x0001] = 0x00;
    prg[0x0002] = 0x80;
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    data.extend_from_slice(&prg);
    data.extend(std::iter::repeat(0).take(8 * 1024));
    data
}

fn bench_instruction_stepping(c: &mut Criterion) {
    let mut console = Console::new(&minimal_rom()).expect("build console");
    console.reset().expect("reset console");

    let mut group = c.benchmark_group("console");
    group.throughput(Throughput::Elements(1));

    group.bench_function("step_instruction", |b| {
        b.iter(|| {
            black_box(console.step().expect("step"));
        });
    });

    group.bench_function("master_tick", |b| {
        b.iter(|| {
            console.tick().expect("tick");
        });
    });

    group.finish();
}

criterion_group!(benches, bench_instruction_stepping);
criterion_main!(benches);
