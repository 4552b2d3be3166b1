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

// rob.rs
//
// The reorder buffer: a fixed-size circular queue that is the machine's
// single in-order retirement point. Allocation happens only at `tail`
// (by Issue), retirement only at `head` (by Commit); a separate free
// counter disambiguates empty from full since both leave `head == tail`.

use crate::instructions::{Op, RegRef};
use std::fmt;

/// An index into the reorder buffer, used everywhere else in the engine
/// as a producer tag. A plain integer newtype — the source this was
/// ported from stringifies these, which would be an odd thing to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RobIndex(usize);

impl RobIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for RobIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobState {
    Empty,
    Issue,
    Execute,
    WriteResult,
}

/// One slot in the reorder buffer.
#[derive(Debug, Clone)]
pub struct ReorderBufferEntry {
    pub busy: bool,
    pub instr_id: Option<usize>,
    pub op: Option<Op>,
    pub state: RobState,
    pub dest_reg: Option<RegRef>,
    pub value: f32,
    pub address: Option<i64>,
    pub value_ready: bool,
}

impl ReorderBufferEntry {
    fn empty() -> Self {
        Self {
            busy: false,
            instr_id: None,
            op: None,
            state: RobState::Empty,
            dest_reg: None,
            value: 0.0,
            address: None,
            value_ready: false,
        }
    }

    pub fn is_ready_to_retire(&self) -> bool {
        self.busy && self.state == RobState::WriteResult && self.value_ready
    }
}

#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    entries: Vec<ReorderBufferEntry>,
    head: usize,
    tail: usize,
    free: usize,
}

impl ReorderBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            entries: (0..size).map(|_| ReorderBufferEntry::empty()).collect(),
            head: 0,
            tail: 0,
            free: size,
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn free_count(&self) -> usize {
        self.free
    }

    pub fn is_full(&self) -> bool {
        self.free == 0
    }

    pub fn is_empty(&self) -> bool {
        self.free == self.entries.len()
    }

    pub fn head_index(&self) -> RobIndex {
        RobIndex(self.head)
    }

    pub fn get(&self, tag: RobIndex) -> &ReorderBufferEntry {
        &self.entries[tag.get()]
    }

    pub fn get_mut(&mut self, tag: RobIndex) -> &mut ReorderBufferEntry {
        &mut self.entries[tag.get()]
    }

    /// The busy entries, in circular order starting at `head`. Used by the
    /// reporter; carries no meaning for engine logic.
    pub fn busy_entries(&self) -> Vec<(RobIndex, &ReorderBufferEntry)> {
        let mut out = Vec::with_capacity(self.entries.len() - self.free);
        let mut i = self.head;
        for _ in 0..(self.entries.len() - self.free) {
            out.push((RobIndex(i), &self.entries[i]));
            i = (i + 1) % self.entries.len();
        }
        out
    }

    /// Allocates the next free slot at `tail`. Panics if the buffer is
    /// full; callers must check `is_full()` first (Issue's precondition 2).
    pub fn allocate(
        &mut self,
        instr_id: usize,
        op: Op,
        dest_reg: Option<RegRef>,
        address: Option<i64>,
    ) -> RobIndex {
        assert!(!self.is_full(), "allocate called on a full reorder buffer");
        let idx = self.tail;
        self.entries[idx] = ReorderBufferEntry {
            busy: true,
            instr_id: Some(instr_id),
            op: Some(op),
            state: RobState::Issue,
            dest_reg,
            value: 0.0,
            address,
            value_ready: false,
        };
        self.tail = (self.tail + 1) % self.entries.len();
        self.free -= 1;
        RobIndex(idx)
    }

    /// Retires the head entry, resetting it to empty and advancing `head`.
    /// Callers must have already checked `get(head_index()).is_ready_to_retire()`.
    pub fn retire_head(&mut self) {
        let idx = self.head;
        self.entries[idx] = ReorderBufferEntry::empty();
        self.head = (self.head + 1) % self.entries.len();
        self.free += 1;
    }
}
