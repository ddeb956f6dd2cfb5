//! Error taxonomy for the emulator core, per the error handling design:
//! decode failure, memory range violation, register index violation,
//! halt signal, value range violation.

use thiserror::Error;

/// Failures raised by [`crate::memory::Memory`] accessors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address 0x{addr:x} with width {width} falls outside [0, {size})")]
    OutOfBounds { addr: u32, width: u32, size: u32 },
    #[error("value {value} does not fit in {width}-bit signed range")]
    ValueOutOfRange { value: i64, width: u32 },
}

/// Failures raised by [`crate::registers::Registers`] accessors. These are
/// programmer errors, not architectural traps: a correctly decoded
/// instruction can never produce one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    #[error("GPR index {0} is out of range (0..31)")]
    InvalidGpr(u8),
    #[error("CSR index 0x{0:x} is out of range (0..4095)")]
    InvalidCsr(u16),
}

/// Failure raised by [`crate::decode::decode`] when a word does not match
/// any known opcode/funct combination.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no known instruction matches word 0x{word:08x} (opcode 0x{opcode:02x})")]
pub struct DecodeError {
    pub word: u32,
    pub opcode: u32,
}

/// The two architectural halt signals. Not errors: a halt is a normal,
/// expected way for `step()` to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Ecall,
    Ebreak,
}

/// The outcome of a successful, non-halting `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub pc_before: u32,
    pub pc_after: u32,
}

/// Everything that can terminate `Cpu::step` other than normal completion,
/// paired with enough context (faulting PC, instruction word) for a host
/// to report it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("halt: {reason:?} at pc=0x{pc:08x}")]
    Halted { reason: HaltReason, pc: u32 },

    #[error("illegal instruction at pc=0x{pc:08x}: {source}")]
    IllegalInstruction {
        pc: u32,
        #[source]
        source: DecodeError,
    },

    #[error("memory fault at pc=0x{pc:08x}: {source}")]
    MemoryFault {
        pc: u32,
        #[source]
        source: MemoryError,
    },

    #[error("register fault at pc=0x{pc:08x}: {source}")]
    RegisterFault {
        pc: u32,
        #[source]
        source: RegisterError,
    },

    #[error("unsupported instruction at pc=0x{pc:08x}: {mnemonic}")]
    UnsupportedInstruction { pc: u32, mnemonic: &'static str },
}

impl Fault {
    /// The program counter active when this fault was raised.
    pub fn pc(&self) -> u32 {
        match self {
            Fault::Halted { pc, .. }
            | Fault::IllegalInstruction { pc, .. }
            | Fault::MemoryFault { pc, .. }
            | Fault::RegisterFault { pc, .. }
            | Fault::UnsupportedInstruction { pc, .. } => *pc,
        }
    }

    /// True for ECALL/EBREAK — an architectural signal, not a bug.
    pub fn is_halt(&self) -> bool {
        matches!(self, Fault::Halted { .. })
    }
}
