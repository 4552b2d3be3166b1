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

// tomasulo.rs
//
// The pipeline control engine. One `tick()` runs the four sub-phases in
// the mandated order — Commit, Writeback, Issue, Execute — so that a
// retirement this cycle frees resources Issue can use this same cycle,
// and a broadcast this cycle is visible to Issue as a ready register,
// while a newly issued station doesn't start counting down until next
// cycle. Getting this order wrong silently breaks the worked examples
// without producing any panic.

use crate::engine::cdb::{CdbEntry, CommonDataBus};
use crate::engine::config::EngineConfig;
use crate::engine::rob::{ReorderBuffer, RobIndex, RobState};
use crate::engine::station::{Operand, Pool, ReservationStation, StationPools};
use crate::instructions::{Instruction, Op, RegRef};
use crate::memory::Memory;
use crate::registers::RegisterFile;
use std::collections::VecDeque;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All four structures drained naturally.
    Completed { cycles_run: usize },
    /// The safety bound (spec.md §4.5) fired first.
    Watchdog { cycles_run: usize },
}

impl RunOutcome {
    pub fn cycles_run(self) -> usize {
        match self {
            RunOutcome::Completed { cycles_run } | RunOutcome::Watchdog { cycles_run } => {
                cycles_run
            }
        }
    }
}

pub struct TomasuloEngine {
    config: EngineConfig,
    cycle: usize,
    pending_ids: VecDeque<usize>,
    program: Vec<Instruction>,
    registers: RegisterFile,
    memory: Memory,
    rob: ReorderBuffer,
    stations: StationPools,
    cdb: CommonDataBus,
}

impl TomasuloEngine {
    pub fn new(program: Vec<Instruction>, config: EngineConfig) -> Self {
        let pending_ids = program.iter().map(|i| i.id).collect();
        Self {
            registers: RegisterFile::new_seeded(config.seed),
            memory: Memory::new(config.memory_size),
            rob: ReorderBuffer::new(config.rob_size),
            stations: StationPools::new(
                config.add_pool_size,
                config.mult_pool_size,
                config.load_pool_size,
                config.store_pool_size,
            ),
            cdb: CommonDataBus::new(),
            pending_ids,
            program,
            cycle: 1,
            config,
        }
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn program(&self) -> &[Instruction] {
        &self.program
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn rob(&self) -> &ReorderBuffer {
        &self.rob
    }

    pub fn stations(&self) -> &StationPools {
        &self.stations
    }

    pub fn cdb(&self) -> &CommonDataBus {
        &self.cdb
    }

    /// Preloads a register's value before the first `tick()`. Useful for
    /// reproducing a known starting state (a worked example, a test
    /// fixture) on top of the seeded random initialization.
    pub fn set_register(&mut self, r: RegRef, value: f32) {
        self.registers.set_value(r, value);
    }

    pub fn is_quiescent(&self) -> bool {
        self.pending_ids.is_empty()
            && self.stations.all_idle()
            && self.cdb.is_empty()
            && self.rob.is_empty()
    }

    /// Runs to completion or watchdog, with no per-cycle observer.
    pub fn run(&mut self) -> RunOutcome {
        self.run_with(|_| {})
    }

    /// Runs to completion or watchdog, calling `on_cycle` once after every
    /// tick — the CLI uses this to print a snapshot per cycle.
    pub fn run_with<F: FnMut(&TomasuloEngine)>(&mut self, mut on_cycle: F) -> RunOutcome {
        loop {
            if self.is_quiescent() {
                return RunOutcome::Completed {
                    cycles_run: self.cycle - 1,
                };
            }
            if self.cycle > self.config.cycle_limit {
                log::warn!(
                    "watchdog: cycle limit ({}) exceeded with the pipeline still active, terminating",
                    self.config.cycle_limit
                );
                return RunOutcome::Watchdog {
                    cycles_run: self.cycle - 1,
                };
            }
            self.tick();
            on_cycle(self);
        }
    }

    /// Runs exactly one cycle: Commit, Writeback, Issue, Execute, then
    /// advances the clock.
    pub fn tick(&mut self) {
        log::debug!("=== cycle {} ===", self.cycle);
        self.commit_phase();
        self.writeback_phase();
        self.issue_phase();
        self.execute_phase();
        self.cycle += 1;
    }

    // ---- Commit (spec.md §4.4) ----

    fn commit_phase(&mut self) {
        if self.rob.is_empty() {
            return;
        }
        let head_tag = self.rob.head_index();
        if !self.rob.get(head_tag).is_ready_to_retire() {
            return;
        }

        let entry = self.rob.get(head_tag);
        let instr_id = entry.instr_id.expect("busy entry has an instr_id");
        let op = entry.op.expect("busy entry has an op");
        let dest_reg = entry.dest_reg;
        let address = entry.address;
        let value = entry.value;

        match op {
            Op::Store => {
                if let Some(addr) = address {
                    if !self.memory.write(addr, value) {
                        log::warn!(
                            "cycle {}: store at commit for instr {} targets out-of-range address {}, dropped",
                            self.cycle, instr_id, addr
                        );
                    }
                }
            }
            _ => {
                if let Some(dest) = dest_reg {
                    self.registers.commit(dest, head_tag, value);
                }
            }
        }

        self.program[instr_id - 1].stamps.commit = Some(self.cycle);
        log::info!(
            "cycle {}: commit instr {} ({}) from rob {}",
            self.cycle,
            instr_id,
            op,
            head_tag
        );
        self.rob.retire_head();
    }

    // ---- Writeback / CDB (spec.md §4.3) ----

    fn writeback_phase(&mut self) {
        let Some(CdbEntry {
            instr_id,
            value,
            rob_tag,
        }) = self.cdb.pop()
        else {
            return;
        };

        {
            let entry = self.rob.get_mut(rob_tag);
            entry.value = value;
            entry.value_ready = true;
            entry.state = RobState::WriteResult;
        }

        self.registers.writeback(rob_tag, value);
        Self::resolve_pending_operands(&mut self.stations, rob_tag, value);
        Self::release_stations_for(&mut self.stations, rob_tag);

        self.program[instr_id - 1].stamps.write = Some(self.cycle);
        log::debug!(
            "cycle {}: writeback rob {} value {} (instr {})",
            self.cycle,
            rob_tag,
            value,
            instr_id
        );
    }

    fn resolve_pending_operands(stations: &mut StationPools, tag: RobIndex, value: f32) {
        for station in stations.iter_all_mut() {
            if !station.busy {
                continue;
            }
            if let Some(Operand::Pending(t)) = station.vj {
                if t == tag {
                    station.vj = Some(Operand::Value(value));
                }
            }
            if let Some(Operand::Pending(t)) = station.vk {
                if t == tag {
                    station.vk = Some(Operand::Value(value));
                }
            }
        }
    }

    /// Full release of the station that produced this result. Execute
    /// already cleared `busy`; this is the second half of the two-stage
    /// release and is what actually wipes `rob_tag` so the station can't
    /// be mistaken for still belonging to this ROB entry.
    fn release_stations_for(stations: &mut StationPools, tag: RobIndex) {
        for station in stations.iter_all_mut() {
            if station.rob_tag == Some(tag) {
                *station = ReservationStation::empty();
            }
        }
    }

    // ---- Issue (spec.md §4.1) ----

    fn issue_phase(&mut self) {
        let Some(&id) = self.pending_ids.front() else {
            return;
        };
        let op = self.program[id - 1].op;

        if self.rob.is_full() {
            return;
        }
        if self.stations.find_free(op).is_none() {
            return;
        }

        let instr = &self.program[id - 1];
        if op != Op::Store {
            if let Some(dest) = instr.dest {
                if !self.registers.get(dest).is_ready() {
                    return;
                }
            }
        }
        for reg in Self::raw_check_registers(instr) {
            if !self.registers.get(reg).is_ready() {
                return;
            }
        }

        let address = match op {
            Op::Load | Op::Store => Some(match instr.mem_operand() {
                Some((offset, base)) => offset + self.registers.value(base).trunc() as i64,
                None => 0,
            }),
            _ => None,
        };

        let dest_reg = if op == Op::Store { None } else { instr.dest };
        let rob_tag = self.rob.allocate(id, op, dest_reg, address);

        let (vj, vk) = match op {
            Op::Add | Op::Sub | Op::Mul | Op::Div => (
                Some(Self::capture_operand(
                    &self.registers,
                    instr.src1.expect("arithmetic op has src1"),
                )),
                Some(Self::capture_operand(
                    &self.registers,
                    instr.src2.expect("arithmetic op has src2"),
                )),
            ),
            Op::Load => (None, None),
            Op::Store => (
                Some(Self::capture_operand(
                    &self.registers,
                    instr.dest.expect("store has a value register"),
                )),
                None,
            ),
        };

        let latency = self.config.latencies.get(op);
        let pool = self.stations.pool_for_mut(op);
        let slot_idx = pool
            .iter()
            .position(|s| !s.busy)
            .expect("free slot already checked above");
        let station = &mut pool[slot_idx];
        station.busy = true;
        station.op = Some(op);
        station.instr_id = Some(id);
        station.vj = vj;
        station.vk = vk;
        station.rob_tag = Some(rob_tag);
        station.address = address;
        station.cycles_left = latency;
        station.just_issued = true;

        if op != Op::Store {
            if let Some(dest) = instr.dest {
                self.registers.set_producer(dest, rob_tag);
            }
        }

        self.pending_ids.pop_front();
        self.program[id - 1].stamps.issue = Some(self.cycle);
        log::info!(
            "cycle {}: issue instr {} ({}) into rob {}",
            self.cycle,
            id,
            op,
            rob_tag
        );
    }

    /// Registers whose readiness gates Issue under the conservative RAW
    /// rule (spec.md §4.1 precondition 5). LOAD's base register is read
    /// regardless of its busy state, so it's excluded; STORE's value
    /// register (parsed into `dest`, see `instructions.rs`) is included.
    fn raw_check_registers(instr: &Instruction) -> Vec<RegRef> {
        match instr.op {
            Op::Add | Op::Sub | Op::Mul | Op::Div => {
                vec![instr.src1.unwrap(), instr.src2.unwrap()]
            }
            Op::Load => vec![],
            Op::Store => vec![instr.dest.unwrap()],
        }
    }

    fn capture_operand(registers: &RegisterFile, r: RegRef) -> Operand {
        let reg = registers.get(r);
        match reg.producer {
            Some(tag) => Operand::Pending(tag),
            None => Operand::Value(reg.value),
        }
    }

    // ---- Execute (spec.md §4.2) ----

    fn execute_phase(&mut self) {
        for (pool_kind, pool) in self.stations.pools_mut_in_order() {
            Self::execute_pool(
                self.cycle,
                pool_kind,
                pool,
                &mut self.memory,
                &mut self.cdb,
                &mut self.program,
                &mut self.rob,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_pool(
        cycle: usize,
        pool_kind: Pool,
        pool: &mut [ReservationStation],
        memory: &mut Memory,
        cdb: &mut CommonDataBus,
        program: &mut [Instruction],
        rob: &mut ReorderBuffer,
    ) {
        for (idx, station) in pool.iter_mut().enumerate() {
            if !station.busy {
                continue;
            }
            if station.just_issued {
                station.just_issued = false;
                continue;
            }
            if !station.operands_ready() {
                continue;
            }

            let instr_id = station.instr_id.expect("busy station has an instr_id");
            if program[instr_id - 1].stamps.exec_start.is_none() {
                program[instr_id - 1].stamps.exec_start = Some(cycle);
                let tag = station.rob_tag.expect("busy station has a rob_tag");
                rob.get_mut(tag).state = RobState::Execute;
            }

            station.cycles_left = station.cycles_left.saturating_sub(1);
            if station.cycles_left > 0 {
                continue;
            }

            program[instr_id - 1].stamps.exec_end = Some(cycle);
            let op = station.op.expect("busy station has an op");
            let vj = station.vj.map(Operand::value).unwrap_or(0.0);
            let vk = station.vk.map(Operand::value).unwrap_or(0.0);

            let result = match op {
                Op::Add => vj + vk,
                Op::Sub => vj - vk,
                Op::Mul => vj * vk,
                Op::Div => {
                    if vk == 0.0 {
                        log::warn!(
                            "cycle {}: division by zero in instr {}, substituting 0",
                            cycle, instr_id
                        );
                        0.0
                    } else {
                        vj / vk
                    }
                }
                Op::Load => memory.read(station.address.unwrap_or(0)).unwrap_or(0.0),
                Op::Store => {
                    // Redundant with Commit's authoritative write (spec.md
                    // §4.2/§4.4); kept so an observer diffing memory
                    // mid-run sees the same timing the source did.
                    memory.write(station.address.unwrap_or(0), vj);
                    vj
                }
            };

            log::debug!(
                "cycle {}: {:?}[{}] completes instr {} -> {}",
                cycle, pool_kind, idx, instr_id, result
            );

            cdb.push(CdbEntry {
                instr_id,
                value: result,
                rob_tag: station.rob_tag.expect("busy station has a rob_tag"),
            });
            station.busy = false;
        }
    }
}
