// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tomasulo_rob_sim::engine::{EngineConfig, TomasuloEngine};
use tomasulo_rob_sim::instructions::{Instruction, Op, RegRef};

fn independent_adds(n: usize) -> Vec<Instruction> {
    (1..=n)
        .map(|id| {
            Instruction::new(
                id,
                Op::Add,
                Some(RegRef::Fp((id % 30) as u8 + 1)),
                Some(RegRef::Fp(0)),
                Some(RegRef::Fp(0)),
                None,
            )
        })
        .collect()
}

fn mixed_dependency_chain(n: usize) -> Vec<Instruction> {
    let mut program = Vec::with_capacity(n);
    for id in 1..=n {
        let op = match id % 4 {
            0 => Op::Mul,
            1 => Op::Add,
            2 => Op::Sub,
            _ => Op::Div,
        };
        let dest = RegRef::Fp((id % 30) as u8 + 1);
        let src = RegRef::Fp(((id.saturating_sub(1)) % 30) as u8 + 1);
        program.push(Instruction::new(id, op, Some(dest), Some(src), Some(RegRef::Fp(0)), None));
    }
    program
}

fn bench_tick_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");
    for &n in &[16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::new("independent_adds", n), &n, |b, &n| {
            b.iter(|| {
                let mut engine =
                    TomasuloEngine::new(independent_adds(n), EngineConfig::new().with_cycle_limit(10_000));
                black_box(engine.run());
            });
        });
    }
    group.finish();
}

fn bench_dependency_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run_dependent");
    for &n in &[16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::new("mixed_chain", n), &n, |b, &n| {
            b.iter(|| {
                let mut engine = TomasuloEngine::new(
                    mixed_dependency_chain(n),
                    EngineConfig::new().with_cycle_limit(100_000),
                );
                black_box(engine.run());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick_throughput, bench_dependency_chain);
criterion_main!(benches);
