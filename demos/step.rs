//! Interactive single-step debugger. Each line of input steps the hart
//! once and prints its non-zero registers; `q` quits.

use itertools::Itertools;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use rv32i_core::{Cpu, Memory};

const MEMORY_SIZE: usize = 1 << 20;

fn print_state(cpu: &Cpu) {
    println!("pc = 0x{:08x}", cpu.registers.get_pc());
    let nonzero: Vec<(u8, u32)> = (0..32u8)
        .filter_map(|n| {
            let value = cpu.registers.get_gpr(n).unwrap();
            (value != 0).then_some((n, value))
        })
        .collect();
    for row in &nonzero.into_iter().chunks(4) {
        let line = row
            .map(|(n, value)| format!("x{n:<2} = 0x{value:08x}"))
            .join("  ");
        println!("{line}");
    }
}

fn main() {
    env_logger::init();
    let path = std::env::args().nth(1).expect("usage: rv32i-step <image>");
    let program = std::fs::read(&path).expect("could not read input file");

    let mut memory = Memory::new(MEMORY_SIZE);
    memory.load_image(0, &program).expect("image too large for memory");
    let mut cpu = Cpu::new(memory);

    let mut rl = DefaultEditor::new().expect("failed to start line editor");
    println!("ready. press enter to step, 'q' to quit.");
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if line.trim() == "q" {
                    break;
                }
                match cpu.step() {
                    Ok(outcome) => {
                        println!("pc 0x{:08x} -> 0x{:08x}", outcome.pc_before, outcome.pc_after);
                        print_state(&cpu);
                    }
                    Err(fault) => {
                        println!("stopped: {fault}");
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("readline error: {err}");
                break;
            }
        }
    }
}
