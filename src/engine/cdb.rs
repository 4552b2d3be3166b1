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

// cdb.rs
//
// The common data bus: a single-port broadcast channel. Execute may push
// several completions in one cycle (one per qualifying station); Writeback
// drains exactly one per cycle, FIFO, which is what makes the bus
// single-port despite multiple producers.

use crate::engine::rob::RobIndex;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub struct CdbEntry {
    pub instr_id: usize,
    pub value: f32,
    pub rob_tag: RobIndex,
}

#[derive(Debug, Clone, Default)]
pub struct CommonDataBus {
    queue: VecDeque<CdbEntry>,
}

impl CommonDataBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CdbEntry) {
        self.queue.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<CdbEntry> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CdbEntry> {
        self.queue.iter()
    }
}
