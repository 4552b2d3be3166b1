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

// parser.rs
//
// The textual assembly parser. Deliberately forgiving: blank lines and
// `#` comments are skipped, trailing commas are stripped from every
// token, and an unrecognized opcode just drops the line rather than
// aborting the run.

use crate::instructions::{parse_register, Instruction, Op};
use std::io::BufRead;

fn strip_comma(token: &str) -> &str {
    token.trim_end_matches(',')
}

fn parse_op(token: &str) -> Option<Op> {
    match token {
        "ADD" => Some(Op::Add),
        "SUB" => Some(Op::Sub),
        "MUL" => Some(Op::Mul),
        "DIV" => Some(Op::Div),
        "LOAD" => Some(Op::Load),
        "STORE" => Some(Op::Store),
        _ => None,
    }
}

/// Parses one non-comment, non-blank line into an instruction, or `None`
/// if the opcode isn't recognized (the line is silently skipped).
fn parse_line(line: &str, id: usize) -> Option<Instruction> {
    let tokens: Vec<&str> = line.split_whitespace().map(strip_comma).collect();
    let op = parse_op(tokens.first()?)?;

    match op {
        Op::Add | Op::Sub | Op::Mul | Op::Div => {
            let dest = parse_register(tokens.get(1)?)?;
            let src1 = parse_register(tokens.get(2)?)?;
            let src2 = parse_register(tokens.get(3)?)?;
            Some(Instruction::new(
                id,
                op,
                Some(dest),
                Some(src1),
                Some(src2),
                None,
            ))
        }
        Op::Load | Op::Store => {
            let reg = parse_register(tokens.get(1)?)?;
            let addr_literal = tokens.get(2)?.to_string();
            Some(Instruction::new(id, op, Some(reg), None, None, Some(addr_literal)))
        }
    }
}

/// Reads a full program from `reader`, line by line. Blank lines and
/// lines starting with `#` are ignored before tokenizing. Instruction
/// ids are assigned 1-based, in the order lines that *parse* appear —
/// a skipped line does not consume an id.
pub fn parse_program<R: BufRead>(reader: R) -> Vec<Instruction> {
    let mut program = Vec::new();
    let mut next_id = 1;

    for line in reader.lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(instr) = parse_line(trimmed, next_id) {
            program.push(instr);
            next_id += 1;
        }
    }

    program
}
