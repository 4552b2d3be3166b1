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

use proptest::prelude::*;
use quickcheck::TestResult;
use tomasulo_rob_sim::engine::rob::{ReorderBuffer, RobIndex};
use tomasulo_rob_sim::engine::{EngineConfig, TomasuloEngine};
use tomasulo_rob_sim::instructions::{Instruction, Op, RegRef};
use tomasulo_rob_sim::registers::RegisterFile;
use tomasulo_rob_sim::Memory;

fn straight_line_adds(n: usize) -> Vec<Instruction> {
    (1..=n)
        .map(|id| {
            Instruction::new(
                id,
                Op::Add,
                Some(RegRef::Fp(id as u8)),
                Some(RegRef::Fp(30)),
                Some(RegRef::Fp(31)),
                None,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn test_memory_read_write_consistency(
        addr in 0i64..1024,
        value in -1.0e6f32..1.0e6f32,
    ) {
        let mut memory = Memory::new(1024);
        prop_assert!(memory.write(addr, value));
        prop_assert_eq!(memory.read(addr), Some(value));
    }

    #[test]
    fn test_memory_out_of_range_is_a_no_op(
        addr in 1024i64..100_000,
        value in any::<f32>(),
    ) {
        let mut memory = Memory::new(1024);
        prop_assert!(!memory.write(addr, value));
        prop_assert_eq!(memory.read(addr), None);
    }

    #[test]
    fn test_register_rename_then_commit_always_clears_to_ready(
        reg in 0u8..32,
        tag in 0usize..16,
        value in -1.0e6f32..1.0e6f32,
    ) {
        let mut regs = RegisterFile::new_seeded(1);
        let r = RegRef::Fp(reg);
        let t = RobIndex::new(tag);
        regs.set_producer(r, t);
        prop_assert!(!regs.get(r).is_ready());
        regs.commit(r, t, value);
        prop_assert!(regs.get(r).is_ready());
        prop_assert_eq!(regs.value(r), value);
    }

    #[test]
    fn test_independent_adds_compute_the_same_sum_regardless_of_count(
        n in 1usize..16,
        a in -100.0f32..100.0,
        b in -100.0f32..100.0,
    ) {
        let program = straight_line_adds(n);
        let mut engine = TomasuloEngine::new(program, EngineConfig::new().with_seed(3));
        engine.set_register(RegRef::Fp(30), a);
        engine.set_register(RegRef::Fp(31), b);
        engine.run();

        for id in 1..=n {
            prop_assert_eq!(engine.registers().value(RegRef::Fp(id as u8)), a + b);
        }
        for instr in engine.program() {
            prop_assert!(instr.stamps.commit.is_some());
        }
    }
}

// QuickCheck-based tests: structural invariants of the reorder buffer that
// must hold after an arbitrary sequence of allocate/retire calls.

fn qc_rob_free_count_matches_busy_entries(size: u8, ops: Vec<bool>) -> TestResult {
    let size = (size % 8) as usize + 1;
    if ops.len() > 64 {
        return TestResult::discard();
    }

    let mut rob = ReorderBuffer::new(size);
    let mut next_id = 1usize;
    for allocate in ops {
        if allocate {
            if !rob.is_full() {
                rob.allocate(next_id, Op::Add, Some(RegRef::Fp(1)), None);
                next_id += 1;
            }
        } else if !rob.is_empty() {
            rob.retire_head();
        }
        if rob.busy_entries().len() != size - rob.free_count() {
            return TestResult::from_bool(false);
        }
    }
    TestResult::from_bool(true)
}

fn qc_rob_never_exceeds_its_declared_size(size: u8, allocations: u8) -> TestResult {
    let size = (size % 16) as usize + 1;
    let mut rob = ReorderBuffer::new(size);
    let mut admitted = 0;
    for i in 0..allocations {
        if rob.is_full() {
            break;
        }
        rob.allocate(i as usize + 1, Op::Add, Some(RegRef::Fp(1)), None);
        admitted += 1;
    }
    TestResult::from_bool(admitted <= size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_quickcheck_tests() {
        quickcheck::QuickCheck::new()
            .tests(50)
            .quickcheck(qc_rob_free_count_matches_busy_entries as fn(u8, Vec<bool>) -> TestResult);

        quickcheck::QuickCheck::new()
            .tests(50)
            .quickcheck(qc_rob_never_exceeds_its_declared_size as fn(u8, u8) -> TestResult);
    }
}
