//! Load a program image and run it to completion, reporting how it
//! stopped. Accepts a raw little-endian binary, or an ELF file (detected
//! by its magic) whose `.text` section is extracted and loaded instead.

use clap::Parser;
use clap_num::maybe_hex;
use elf::endian::AnyEndian;
use elf::ElfBytes;
use rv32i_core::{Cpu, Fault, Memory};

const ELF_MAGIC: &[u8] = &[0x7f, b'E', b'L', b'F'];

/// Run an RV32I program image to completion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the program image (raw binary or ELF)
    input: String,

    /// Memory size in bytes
    #[arg(long, default_value_t = 1 << 20)]
    memory_size: usize,

    /// Address the image is loaded at (use 0x prefix for hex)
    #[arg(long, value_parser=maybe_hex::<u32>, default_value = "0x0")]
    load_addr: u32,
}

fn read_program(path: &str) -> Vec<u8> {
    let bytes = std::fs::read(path).expect("could not read input file");
    if bytes.starts_with(ELF_MAGIC) {
        read_text_section(&bytes)
    } else {
        bytes
    }
}

fn read_text_section(bytes: &[u8]) -> Vec<u8> {
    let file = ElfBytes::<AnyEndian>::minimal_parse(bytes).expect("not a valid ELF file");
    let text_shdr = file
        .section_header_by_name(".text")
        .expect("section .text should be parseable")
        .expect("file should have a .text section");
    let (data, compression) = file
        .section_data(&text_shdr)
        .expect("valid section data in .text");
    if compression.is_some() {
        panic!("unexpected compression in .text section");
    }
    data.to_vec()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let program = read_program(&args.input);
    let mut memory = Memory::new(args.memory_size);
    memory
        .load_image(args.load_addr, &program)
        .expect("program image does not fit in memory");

    let mut cpu = Cpu::new(memory);
    cpu.registers.set_pc(args.load_addr);

    match cpu.run() {
        Fault::Halted { reason, pc } => {
            println!("halted: {reason:?} at pc=0x{pc:08x}");
        }
        fault => {
            println!("fault: {fault} at pc=0x{:08x}", fault.pc());
            std::process::exit(1);
        }
    }
}
