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

// instructions.rs
//
// The decoded instruction record and its register-reference helpers. An
// `Instruction` is created once by the parser and never mutates its own
// identity fields; only the per-stage cycle stamps change as the engine
// drives it through Issue, Execute, Writeback and Commit.

use std::fmt;

/// One of the six operations this machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Load,
    Store,
}

impl Op {
    /// Latency in cycles, per spec.md §4.5.
    pub fn latency(self) -> usize {
        match self {
            Op::Add => 2,
            Op::Sub => 2,
            Op::Mul => 10,
            Op::Div => 40,
            Op::Load => 3,
            Op::Store => 3,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Load => "LOAD",
            Op::Store => "STORE",
        };
        write!(f, "{s}")
    }
}

/// A reference to one architectural register: either the integer bank
/// (`R0..R31`) or the floating-point bank (`F0..F31`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegRef {
    Int(u8),
    Fp(u8),
}

impl fmt::Display for RegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegRef::Int(n) => write!(f, "R{n}"),
            RegRef::Fp(n) => write!(f, "F{n}"),
        }
    }
}

/// Parses `R0`..`R31` or `F0`..`F31`. Any other token is rejected — spec.md
/// §6 allows no other register syntax.
pub fn parse_register(token: &str) -> Option<RegRef> {
    let (bank, digits) = token.split_at(1);
    let n: u8 = digits.parse().ok()?;
    if n > 31 {
        return None;
    }
    match bank {
        "R" => Some(RegRef::Int(n)),
        "F" => Some(RegRef::Fp(n)),
        _ => None,
    }
}

/// Splits `offset(base)` into a signed offset and a base register. Returns
/// `None` on any malformed input; the caller (Issue) falls through to
/// address 0 per spec.md §7's "Malformed offset(base)" row.
pub fn parse_mem_operand(token: &str) -> Option<(i64, RegRef)> {
    let open = token.find('(')?;
    let close = token.find(')')?;
    if close < open {
        return None;
    }
    let offset: i64 = token[..open].parse().ok()?;
    let base = parse_register(&token[open + 1..close])?;
    Some((offset, base))
}

/// Per-stage cycle stamps. All unset until the instruction passes through
/// the corresponding phase; `exec_start`/`exec_end` bracket the Execute
/// countdown (spec.md §9 leaves the exact stamping point to the
/// implementer — stamped here on transition into Execute and when
/// `cycles_left` reaches zero).
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStamps {
    pub issue: Option<usize>,
    pub exec_start: Option<usize>,
    pub exec_end: Option<usize>,
    pub write: Option<usize>,
    pub commit: Option<usize>,
}

/// A decoded instruction. `id` is 1-based and assigned by the parser in
/// program order; it never changes after creation.
///
/// `dest`/`src1`/`src2` follow the textual grammar `OP DEST SRC1 [SRC2]`
/// positionally, which means for STORE the register parsed into `dest`
/// is actually the *value* being stored (there's no destination register
/// to rename for a STORE) — see DESIGN.md for why this is the intended
/// reading rather than a parsing quirk. `addr_literal` carries the raw
/// `offset(base)` text for LOAD/STORE; the engine parses it at Issue.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub id: usize,
    pub op: Op,
    pub dest: Option<RegRef>,
    pub src1: Option<RegRef>,
    pub src2: Option<RegRef>,
    pub addr_literal: Option<String>,
    pub stamps: CycleStamps,
}

impl Instruction {
    pub fn new(
        id: usize,
        op: Op,
        dest: Option<RegRef>,
        src1: Option<RegRef>,
        src2: Option<RegRef>,
        addr_literal: Option<String>,
    ) -> Self {
        Self {
            id,
            op,
            dest,
            src1,
            src2,
            addr_literal,
            stamps: CycleStamps::default(),
        }
    }

    /// For LOAD/STORE, the parsed `(offset, base)` pair, or `None` if
    /// `addr_literal` is absent or malformed.
    pub fn mem_operand(&self) -> Option<(i64, RegRef)> {
        parse_mem_operand(self.addr_literal.as_deref()?)
    }

    /// The register whose value a STORE writes to memory. By the grammar
    /// this is parsed into the `dest` slot (see struct docs above).
    pub fn store_value_reg(&self) -> Option<RegRef> {
        debug_assert_eq!(self.op, Op::Store);
        self.dest
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Store => write!(
                f,
                "STORE {} {}",
                self.dest.map(|r| r.to_string()).unwrap_or_default(),
                self.addr_literal.as_deref().unwrap_or("?")
            ),
            Op::Load => write!(
                f,
                "LOAD {} {}",
                self.dest.map(|r| r.to_string()).unwrap_or_default(),
                self.addr_literal.as_deref().unwrap_or("?")
            ),
            _ => write!(
                f,
                "{} {} {} {}",
                self.op,
                self.dest.map(|r| r.to_string()).unwrap_or_default(),
                self.src1.map(|r| r.to_string()).unwrap_or_default(),
                self.src2.map(|r| r.to_string()).unwrap_or_default(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_int_and_fp_registers() {
        assert_eq!(parse_register("R0"), Some(RegRef::Int(0)));
        assert_eq!(parse_register("F31"), Some(RegRef::Fp(31)));
        assert_eq!(parse_register("R32"), None);
        assert_eq!(parse_register("X3"), None);
        assert_eq!(parse_register("Rabc"), None);
    }

    #[test]
    fn parses_mem_operand() {
        assert_eq!(parse_mem_operand("0(R1)"), Some((0, RegRef::Int(1))));
        assert_eq!(parse_mem_operand("-4(R2)"), Some((-4, RegRef::Int(2))));
        assert_eq!(parse_mem_operand("garbage"), None);
        assert_eq!(parse_mem_operand("4(R99)"), None);
    }

    #[test]
    fn latencies_match_spec() {
        assert_eq!(Op::Add.latency(), 2);
        assert_eq!(Op::Sub.latency(), 2);
        assert_eq!(Op::Mul.latency(), 10);
        assert_eq!(Op::Div.latency(), 40);
        assert_eq!(Op::Load.latency(), 3);
        assert_eq!(Op::Store.latency(), 3);
    }
}
