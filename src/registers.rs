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

// registers.rs
//
// The architectural register file plus its rename/alias tracking. Each
// bank (integer, floating-point) holds 32 lanes; a lane's `producer`
// tag, when set, names the ROB entry that will supply its next value —
// this is the "alias table" half of Tomasulo's register renaming, kept
// alongside the committed value rather than as a separate structure.

use crate::engine::rob::RobIndex;
use crate::instructions::RegRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One architectural register lane: its last-committed value, and the
/// ROB entry (if any) that will next overwrite it.
#[derive(Debug, Clone, Copy)]
pub struct Register {
    pub value: f32,
    pub producer: Option<RobIndex>,
}

impl Register {
    fn new(value: f32) -> Self {
        Self {
            value,
            producer: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.producer.is_none()
    }
}

/// The full register file: 32 integer lanes, 32 floating-point lanes.
/// `R0`/`F0` are ordinary read-write lanes here — spec.md never hardwires
/// either bank's zero lane to zero, unlike the MIPS convention.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    int: [Register; 32],
    fp: [Register; 32],
}

impl RegisterFile {
    /// Builds a fresh file with every lane seeded to a small random value,
    /// drawn from `seed` so runs are reproducible. spec.md §6 bakes the
    /// initializer in as `(rand() mod 10) * 10.0`, and spec.md §3 requires
    /// lane `i` of the int bank and lane `i` of the fp bank to start
    /// identical (`original_source/main.cpp`'s `RegisterFile` constructor
    /// assigns the same draw to `R[i]` and `F[i]`) — so one value per
    /// index is drawn once and shared across both banks rather than
    /// drawing independently per bank.
    pub fn new_seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values: [f32; 32] = std::array::from_fn(|_| (rng.gen_range(0..10) as f32) * 10.0);
        Self {
            int: values.map(Register::new),
            fp: values.map(Register::new),
        }
    }

    fn bank(&self, r: RegRef) -> &[Register; 32] {
        match r {
            RegRef::Int(_) => &self.int,
            RegRef::Fp(_) => &self.fp,
        }
    }

    fn bank_mut(&mut self, r: RegRef) -> &mut [Register; 32] {
        match r {
            RegRef::Int(_) => &mut self.int,
            RegRef::Fp(_) => &mut self.fp,
        }
    }

    fn index(r: RegRef) -> usize {
        match r {
            RegRef::Int(n) | RegRef::Fp(n) => n as usize,
        }
    }

    pub fn get(&self, r: RegRef) -> Register {
        self.bank(r)[Self::index(r)]
    }

    pub fn value(&self, r: RegRef) -> f32 {
        self.get(r).value
    }

    pub fn producer(&self, r: RegRef) -> Option<RobIndex> {
        self.get(r).producer
    }

    /// Overwrites `r`'s value directly, leaving its producer tag alone.
    /// Used to preload architectural state (e.g. a known register file for
    /// a worked example) before a run starts; not used by the pipeline
    /// phases themselves, which all go through `set_producer`/`commit`.
    pub fn set_value(&mut self, r: RegRef, value: f32) {
        let idx = Self::index(r);
        self.bank_mut(r)[idx].value = value;
    }

    /// Renames `r` onto `tag`: future readers of `r` will see `Pending(tag)`
    /// until a commit clears it. Called during Issue for the destination
    /// register of an arithmetic or LOAD instruction.
    pub fn set_producer(&mut self, r: RegRef, tag: RobIndex) {
        let idx = Self::index(r);
        self.bank_mut(r)[idx].producer = Some(tag);
    }

    /// Early copy performed by Writeback (§4.3): every lane, in either
    /// bank, currently aliased to `tag` gets `value` and is marked ready.
    /// Commit repeats this write at retirement for the one lane it names
    /// directly; both are kept, matching the source's observable per-cycle
    /// register snapshots (spec.md §9).
    pub fn writeback(&mut self, tag: RobIndex, value: f32) {
        for lane in self.int.iter_mut().chain(self.fp.iter_mut()) {
            if lane.producer == Some(tag) {
                lane.value = value;
                lane.producer = None;
            }
        }
    }

    /// Writes a committed value into `r` and clears its rename tag, but
    /// only if `r` is still aliased to `tag` — a later instruction may
    /// have already renamed it onto a newer tag, in which case this
    /// write must not clobber that newer alias (spec.md §4.4).
    pub fn commit(&mut self, r: RegRef, tag: RobIndex, value: f32) {
        let idx = Self::index(r);
        let lane = &mut self.bank_mut(r)[idx];
        lane.value = value;
        if lane.producer == Some(tag) {
            lane.producer = None;
        }
    }

    /// The 32 floating-point lanes, for the reporter's register dump.
    pub fn fp_lanes(&self) -> impl Iterator<Item = (u8, Register)> + '_ {
        self.fp.iter().enumerate().map(|(i, r)| (i as u8, *r))
    }

    /// The 32 integer lanes, for the reporter's register dump.
    pub fn int_lanes(&self) -> impl Iterator<Item = (u8, Register)> + '_ {
        self.int.iter().enumerate().map(|(i, r)| (i as u8, *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_lanes_are_ready() {
        let regs = RegisterFile::new_seeded(42);
        assert!(regs.get(RegRef::Int(3)).is_ready());
        assert!(regs.get(RegRef::Fp(7)).is_ready());
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = RegisterFile::new_seeded(7);
        let b = RegisterFile::new_seeded(7);
        for n in 0..32 {
            assert_eq!(a.value(RegRef::Int(n)), b.value(RegRef::Int(n)));
            assert_eq!(a.value(RegRef::Fp(n)), b.value(RegRef::Fp(n)));
        }
    }

    #[test]
    fn rename_then_commit_clears_producer() {
        let mut regs = RegisterFile::new_seeded(1);
        let tag = RobIndex::new(2);
        regs.set_producer(RegRef::Fp(4), tag);
        assert!(!regs.get(RegRef::Fp(4)).is_ready());
        regs.commit(RegRef::Fp(4), tag, 3.5);
        assert!(regs.get(RegRef::Fp(4)).is_ready());
        assert_eq!(regs.value(RegRef::Fp(4)), 3.5);
    }

    #[test]
    fn stale_commit_does_not_clobber_newer_alias() {
        let mut regs = RegisterFile::new_seeded(1);
        let old_tag = RobIndex::new(1);
        let new_tag = RobIndex::new(2);
        regs.set_producer(RegRef::Int(5), old_tag);
        regs.set_producer(RegRef::Int(5), new_tag);
        regs.commit(RegRef::Int(5), old_tag, 99.0);
        assert_eq!(regs.producer(RegRef::Int(5)), Some(new_tag));
    }
}
