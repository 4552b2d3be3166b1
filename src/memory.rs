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

// memory.rs
//
// A flat, word-addressed data memory. spec.md §3 sizes it at 1024 f32
// words and treats out-of-range accesses as no-ops rather than faults —
// there's no MMU, no alignment requirement beyond "integer word index",
// and no byte addressing.

const DEFAULT_WORDS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Memory {
    words: Vec<f32>,
}

impl Memory {
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0.0; words],
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads word `addr`, or `None` if out of range. LOAD at Writeback
    /// uses this; spec.md only mandates bounds-checking for STORE at
    /// commit, but an out-of-range LOAD is given the same treatment here
    /// rather than panicking.
    pub fn read(&self, addr: i64) -> Option<f32> {
        let idx = usize::try_from(addr).ok()?;
        self.words.get(idx).copied()
    }

    /// Writes `value` to word `addr`. Returns `false` (a silent no-op)
    /// if `addr` is out of range, per spec.md §7's out-of-range store row.
    pub fn write(&mut self, addr: i64, value: f32) -> bool {
        match usize::try_from(addr).ok().and_then(|i| self.words.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut mem = Memory::default();
        assert!(mem.write(10, 4.5));
        assert_eq!(mem.read(10), Some(4.5));
    }

    #[test]
    fn negative_address_is_out_of_range() {
        let mut mem = Memory::default();
        assert!(!mem.write(-1, 1.0));
        assert_eq!(mem.read(-1), None);
    }

    #[test]
    fn address_past_end_is_out_of_range() {
        let mut mem = Memory::new(4);
        assert!(!mem.write(4, 1.0));
        assert_eq!(mem.read(4), None);
        assert!(mem.write(3, 2.0));
    }
}
