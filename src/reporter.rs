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

// reporter.rs
//
// The human-readable (and machine-readable) per-cycle dump. Takes a
// read-only snapshot of the engine and renders the four station pools,
// the float register file, the ROB's busy entries, the CDB queue, and
// any non-zero memory cells. Exact formatting is unspecified by design;
// this module just needs to expose something a person or a `--json`
// consumer can use.

use crate::engine::rob::RobState;
use crate::engine::station::Pool;
use crate::engine::TomasuloEngine;
use colored::Colorize;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct StationView {
    pub pool: &'static str,
    pub index: usize,
    pub busy: bool,
    pub op: Option<String>,
    pub instr_id: Option<usize>,
    pub vj: Option<String>,
    pub vk: Option<String>,
    pub rob_tag: Option<usize>,
    pub cycles_left: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterView {
    pub name: String,
    pub value: f32,
    pub ready: bool,
    pub producer: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RobEntryView {
    pub tag: usize,
    pub instr_id: usize,
    pub op: String,
    pub state: String,
    pub value: f32,
    pub value_ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryCellView {
    pub address: usize,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub cycle: usize,
    pub stations: Vec<StationView>,
    pub fp_registers: Vec<RegisterView>,
    pub int_registers: Vec<RegisterView>,
    pub rob_entries: Vec<RobEntryView>,
    pub cdb_queue: Vec<(usize, f32, usize)>,
    pub nonzero_memory: Vec<MemoryCellView>,
}

fn pool_name(pool: Pool) -> &'static str {
    match pool {
        Pool::Add => "ADD/SUB",
        Pool::Mult => "MUL/DIV",
        Pool::Load => "LOAD",
        Pool::Store => "STORE",
    }
}

fn operand_view(op: Option<crate::engine::station::Operand>) -> Option<String> {
    use crate::engine::station::Operand;
    match op {
        Some(Operand::Value(v)) => Some(format!("{v}")),
        Some(Operand::Pending(tag)) => Some(format!("{tag}")),
        None => None,
    }
}

/// Builds a read-only snapshot of `engine`'s current state.
pub fn snapshot(engine: &TomasuloEngine) -> Snapshot {
    let mut stations = Vec::new();
    for (pool, idx, s) in engine.stations().iter_all() {
        stations.push(StationView {
            pool: pool_name(pool),
            index: idx,
            busy: s.busy,
            op: s.op.map(|o| o.to_string()),
            instr_id: s.instr_id,
            vj: operand_view(s.vj),
            vk: operand_view(s.vk),
            rob_tag: s.rob_tag.map(|t| t.get()),
            cycles_left: s.cycles_left,
        });
    }

    let fp_registers = engine
        .registers()
        .fp_lanes()
        .map(|(n, r)| RegisterView {
            name: format!("F{n}"),
            value: r.value,
            ready: r.is_ready(),
            producer: r.producer.map(|t| t.get()),
        })
        .collect();

    let int_registers = engine
        .registers()
        .int_lanes()
        .map(|(n, r)| RegisterView {
            name: format!("R{n}"),
            value: r.value,
            ready: r.is_ready(),
            producer: r.producer.map(|t| t.get()),
        })
        .collect();

    let rob_entries = engine
        .rob()
        .busy_entries()
        .into_iter()
        .map(|(tag, e)| RobEntryView {
            tag: tag.get(),
            instr_id: e.instr_id.unwrap_or(0),
            op: e.op.map(|o| o.to_string()).unwrap_or_default(),
            state: match e.state {
                RobState::Empty => "EMPTY",
                RobState::Issue => "ISSUE",
                RobState::Execute => "EXECUTE",
                RobState::WriteResult => "WRITE_RESULT",
            }
            .to_string(),
            value: e.value,
            value_ready: e.value_ready,
        })
        .collect();

    let cdb_queue = engine
        .cdb()
        .iter()
        .map(|e| (e.instr_id, e.value, e.rob_tag.get()))
        .collect();

    let nonzero_memory = (0..engine.memory().len() as i64)
        .filter_map(|addr| {
            let v = engine.memory().read(addr)?;
            (v != 0.0).then_some(MemoryCellView {
                address: addr as usize,
                value: v,
            })
        })
        .collect();

    Snapshot {
        cycle: engine.cycle(),
        stations,
        fp_registers,
        int_registers,
        rob_entries,
        cdb_queue,
        nonzero_memory,
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", format!("== cycle {} ==", self.cycle).bold())?;

        writeln!(f, "{}", "reservation stations:".underline())?;
        for s in &self.stations {
            if !s.busy {
                continue;
            }
            let line = format!(
                "  {} [{}] instr={} op={} vj={} vk={} rob={} left={}",
                s.pool,
                s.index,
                s.instr_id.unwrap_or(0),
                s.op.clone().unwrap_or_default(),
                s.vj.clone().unwrap_or_else(|| "-".into()),
                s.vk.clone().unwrap_or_else(|| "-".into()),
                s.rob_tag.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                s.cycles_left,
            );
            writeln!(f, "{}", line.yellow())?;
        }

        writeln!(f, "{}", "float registers:".underline())?;
        for r in &self.fp_registers {
            let line = format!("  {} = {}", r.name, r.value);
            if r.ready {
                writeln!(f, "{}", line.green())?;
            } else {
                writeln!(f, "{} (pending {})", line, r.producer.unwrap_or(0))?;
            }
        }

        writeln!(f, "{}", "reorder buffer:".underline())?;
        for e in &self.rob_entries {
            writeln!(
                f,
                "  #{} instr={} op={} state={} value={} ready={}",
                e.tag, e.instr_id, e.op, e.state, e.value, e.value_ready
            )?;
        }

        writeln!(f, "{}", "common data bus:".underline())?;
        for (instr_id, value, tag) in &self.cdb_queue {
            writeln!(f, "  instr={instr_id} value={value} rob=#{tag}")?;
        }

        writeln!(f, "{}", "memory (non-zero):".underline())?;
        for cell in &self.nonzero_memory {
            writeln!(f, "{}", format!("  [{}] = {}", cell.address, cell.value).cyan())?;
        }

        Ok(())
    }
}

/// Renders `snapshot` as pretty-printed JSON, for `--json`.
pub fn to_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}
