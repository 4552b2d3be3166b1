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

// main.rs
//
// This file contains the main entry point for the Tomasulo+ROB simulator.
// It provides a command-line interface: a program file may be named on
// the command line, or the process prompts for one on standard input.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tomasulo_rob_sim::{parser, reporter, EngineConfig, RunOutcome, SimError, TomasuloEngine};

#[derive(Parser)]
#[command(name = "tomasulo_rob_sim")]
#[command(about = "A cycle-accurate Tomasulo + reorder-buffer simulator")]
#[command(version)]
struct Cli {
    /// Input program file. If omitted, the filename is read from stdin.
    file: Option<PathBuf>,

    /// Seed for the register file's pseudo-random initial values.
    #[arg(long)]
    seed: Option<u64>,

    /// Safety bound on cycles before the watchdog terminates the run.
    #[arg(long)]
    cycle_limit: Option<usize>,

    /// Emit the final state snapshot as JSON instead of text.
    #[arg(long)]
    json: bool,
}

const USAGE_BANNER: &str = "\
Expected file format:
# Comments start with #
ADD F1 F2 F3
SUB F4 F1 F5
MUL F6 F2 F4
DIV F7 F6 F3
LOAD F8 0(R1)
STORE F2 4(R2)

Supported operations: ADD, SUB, MUL, DIV, LOAD, STORE";

fn prompt_for_filename() -> io::Result<String> {
    print!("Enter the instruction file name: ");
    io::stdout().flush()?;
    let mut filename = String::new();
    io::stdin().lock().read_line(&mut filename)?;
    Ok(filename.trim().to_string())
}

fn load_program(path: &str) -> Result<Vec<tomasulo_rob_sim::Instruction>, SimError> {
    let file = std::fs::File::open(path)?;
    Ok(parser::parse_program(io::BufReader::new(file)))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    println!("========== TOMASULO + REORDER BUFFER SIMULATOR ==========");

    let filename = match cli.file {
        Some(path) => path.display().to_string(),
        None => match prompt_for_filename() {
            Ok(name) => name,
            Err(err) => {
                eprintln!("failed to read filename from stdin: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let program = match load_program(&filename) {
        Ok(program) => program,
        Err(err) => {
            println!("Error: could not open file '{filename}': {err}");
            println!("\n{USAGE_BANNER}");
            return ExitCode::FAILURE;
        }
    };
    println!("File loaded successfully ({} instructions).", program.len());

    let mut config = EngineConfig::new();
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(limit) = cli.cycle_limit {
        config = config.with_cycle_limit(limit);
    }

    let mut engine = TomasuloEngine::new(program, config);
    let outcome = engine.run_with(|engine| {
        println!("{}", reporter::snapshot(engine));
    });

    match outcome {
        RunOutcome::Completed { cycles_run } => {
            println!("Simulation completed in {cycles_run} cycles.");
        }
        RunOutcome::Watchdog { cycles_run } => {
            println!("Simulation terminated by watchdog after {cycles_run} cycles.");
        }
    }

    if cli.json {
        match reporter::to_json(&reporter::snapshot(&engine)) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to render JSON snapshot: {err}"),
        }
    }

    ExitCode::SUCCESS
}
