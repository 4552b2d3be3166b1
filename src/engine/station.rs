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

// station.rs
//
// Reservation stations, grouped into four typed pools. A functional unit
// is not a separate object here: its latency counter lives directly on
// the station occupying it, since nothing in this design ever needs a
// pool of functional units distinct from the stations that hold them.

use crate::engine::rob::RobIndex;
use crate::instructions::Op;

/// One reservation-station operand slot: either a value already captured,
/// or the tag of the ROB entry that will eventually produce it. Folding
/// `vj`/`qj` into one type makes "holds exactly one of value or tag" a
/// structural property instead of a convention two separate fields have
/// to uphold by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Value(f32),
    Pending(RobIndex),
}

impl Operand {
    pub fn is_ready(self) -> bool {
        matches!(self, Operand::Value(_))
    }

    pub fn value(self) -> f32 {
        match self {
            Operand::Value(v) => v,
            Operand::Pending(_) => 0.0,
        }
    }
}

/// A single reservation-station slot. `vj`/`vk` are `None` when the op
/// has no such operand (LOAD uses neither; STORE uses only `vj`, for the
/// value being stored).
#[derive(Debug, Clone)]
pub struct ReservationStation {
    pub busy: bool,
    pub op: Option<Op>,
    pub instr_id: Option<usize>,
    pub vj: Option<Operand>,
    pub vk: Option<Operand>,
    pub rob_tag: Option<RobIndex>,
    pub address: Option<i64>,
    pub cycles_left: usize,
    /// True only during the cycle a station is allocated, so Execute
    /// doesn't decrement `cycles_left` the same cycle Issue set it —
    /// Issue runs before Execute within a tick (spec.md §4.5), so without
    /// this flag a freshly issued station would lose a cycle of latency.
    pub just_issued: bool,
}

impl ReservationStation {
    pub fn empty() -> Self {
        Self {
            busy: false,
            op: None,
            instr_id: None,
            vj: None,
            vk: None,
            rob_tag: None,
            address: None,
            cycles_left: 0,
            just_issued: false,
        }
    }

    /// `qj` and `qk` both cleared (or not applicable) — the station may
    /// advance its latency countdown.
    pub fn operands_ready(&self) -> bool {
        self.vj.map_or(true, Operand::is_ready) && self.vk.map_or(true, Operand::is_ready)
    }
}

impl Default for ReservationStation {
    fn default() -> Self {
        Self::empty()
    }
}

/// Which pool a station belongs to, used for tie-breaking simultaneous
/// Execute completions (spec.md §4.2: Add, Mult, Load, Store, then index
/// within the pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Add,
    Mult,
    Load,
    Store,
}

#[derive(Debug, Clone)]
pub struct StationPools {
    pub add: Vec<ReservationStation>,
    pub mult: Vec<ReservationStation>,
    pub load: Vec<ReservationStation>,
    pub store: Vec<ReservationStation>,
}

impl StationPools {
    pub fn new(add_n: usize, mult_n: usize, load_n: usize, store_n: usize) -> Self {
        Self {
            add: (0..add_n).map(|_| ReservationStation::empty()).collect(),
            mult: (0..mult_n).map(|_| ReservationStation::empty()).collect(),
            load: (0..load_n).map(|_| ReservationStation::empty()).collect(),
            store: (0..store_n).map(|_| ReservationStation::empty()).collect(),
        }
    }

    fn pool_kind_for(op: Op) -> Pool {
        match op {
            Op::Add | Op::Sub => Pool::Add,
            Op::Mul | Op::Div => Pool::Mult,
            Op::Load => Pool::Load,
            Op::Store => Pool::Store,
        }
    }

    pub fn pool_for(&self, op: Op) -> &Vec<ReservationStation> {
        match Self::pool_kind_for(op) {
            Pool::Add => &self.add,
            Pool::Mult => &self.mult,
            Pool::Load => &self.load,
            Pool::Store => &self.store,
        }
    }

    pub fn pool_for_mut(&mut self, op: Op) -> &mut Vec<ReservationStation> {
        match Self::pool_kind_for(op) {
            Pool::Add => &mut self.add,
            Pool::Mult => &mut self.mult,
            Pool::Load => &mut self.load,
            Pool::Store => &mut self.store,
        }
    }

    pub fn find_free(&self, op: Op) -> Option<usize> {
        self.pool_for(op).iter().position(|s| !s.busy)
    }

    /// All four pools in the static tie-break order (Add, Mult, Load,
    /// Store), for phases that touch every station regardless of pool.
    pub fn pools_mut_in_order(&mut self) -> [(Pool, &mut Vec<ReservationStation>); 4] {
        [
            (Pool::Add, &mut self.add),
            (Pool::Mult, &mut self.mult),
            (Pool::Load, &mut self.load),
            (Pool::Store, &mut self.store),
        ]
    }

    pub fn iter_all(&self) -> impl Iterator<Item = (Pool, usize, &ReservationStation)> {
        self.add
            .iter()
            .enumerate()
            .map(|(i, s)| (Pool::Add, i, s))
            .chain(self.mult.iter().enumerate().map(|(i, s)| (Pool::Mult, i, s)))
            .chain(self.load.iter().enumerate().map(|(i, s)| (Pool::Load, i, s)))
            .chain(
                self.store
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (Pool::Store, i, s)),
            )
    }

    pub fn iter_all_mut(&mut self) -> impl Iterator<Item = &mut ReservationStation> {
        self.add
            .iter_mut()
            .chain(self.mult.iter_mut())
            .chain(self.load.iter_mut())
            .chain(self.store.iter_mut())
    }

    pub fn all_idle(&self) -> bool {
        self.iter_all().all(|(_, _, s)| !s.busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_ready_when_both_values() {
        let mut s = ReservationStation::empty();
        s.vj = Some(Operand::Value(1.0));
        s.vk = Some(Operand::Value(2.0));
        assert!(s.operands_ready());
    }

    #[test]
    fn operands_not_ready_while_pending() {
        let mut s = ReservationStation::empty();
        s.vj = Some(Operand::Value(1.0));
        s.vk = Some(Operand::Pending(RobIndex::new(0)));
        assert!(!s.operands_ready());
    }

    #[test]
    fn load_has_no_operands_to_wait_on() {
        let s = ReservationStation::empty();
        assert!(s.operands_ready());
    }

    #[test]
    fn find_free_respects_pool_routing() {
        let mut pools = StationPools::new(1, 1, 1, 1);
        assert_eq!(pools.find_free(Op::Add), Some(0));
        pools.add[0].busy = true;
        assert_eq!(pools.find_free(Op::Add), None);
        assert_eq!(pools.find_free(Op::Mul), Some(0));
    }

    #[test]
    fn all_idle_true_for_fresh_pools() {
        let pools = StationPools::new(3, 2, 2, 2);
        assert!(pools.all_idle());
    }
}
