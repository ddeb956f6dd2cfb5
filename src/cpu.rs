//! The fetch-decode-execute driver: a single hart, stepped synchronously.

use queues::{IsQueue, Queue};

use crate::decode::decode;
use crate::error::{Fault, StepOutcome};
use crate::instruction::Effect;
use crate::memory::Memory;
use crate::registers::Registers;

const TRACE_DEPTH: usize = 16;

/// The single-hart state machine named in the concurrency model: a hart
/// starts `Running`, and moves to `Halted` on ECALL/EBREAK or `Faulted`
/// on any other fault. Once not `Running`, `step()` keeps returning the
/// same terminal fault without touching architectural state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted,
}

pub struct Cpu {
    pub registers: Registers,
    pub memory: Memory,
    state: State,
    /// The fault that most recently ended a `step()`. Re-returned if the
    /// host keeps calling `step()` after the hart left `Running`.
    last_fault: Option<Fault>,
    /// Bounded trace of recently fetched program counters, surfaced to
    /// the host alongside a fault for extra context.
    trace: Queue<u32>,
}

impl Cpu {
    pub fn new(memory: Memory) -> Self {
        Self {
            registers: Registers::new(),
            memory,
            state: State::Running,
            last_fault: None,
            trace: Queue::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The most recently fetched program counters, oldest first.
    pub fn recent_pcs(&mut self) -> Vec<u32> {
        let mut drained = Vec::with_capacity(self.trace.size());
        while let Ok(pc) = self.trace.remove() {
            drained.push(pc);
        }
        for pc in &drained {
            let _ = self.trace.add(*pc);
        }
        drained
    }

    /// Reset registers and return to the `Running` state. Memory is left
    /// untouched: whether a program image survives a reset is a host
    /// policy decision, not a core one (`spec.md` §4.5).
    pub fn reset(&mut self) {
        self.registers.reset();
        self.state = State::Running;
        self.last_fault = None;
        self.trace = Queue::new();
    }

    fn record_pc(&mut self, pc: u32) {
        if self.trace.size() >= TRACE_DEPTH {
            let _ = self.trace.remove();
        }
        let _ = self.trace.add(pc);
    }

    /// Fetch, decode, and execute exactly one instruction. Advances PC by
    /// four unless the instruction transferred control itself.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        if self.state != State::Running {
            return Err(self.last_fault.expect("non-Running state always has a recorded fault"));
        }

        let pc = self.registers.get_pc();
        self.record_pc(pc);
        log::trace!("fetch pc=0x{pc:08x}");

        let result = self.step_inner(pc);
        if let Err(fault) = &result {
            self.state = if fault.is_halt() {
                State::Halted
            } else {
                State::Faulted
            };
            self.last_fault = Some(*fault);
            log::debug!("fault: {fault}");
        }
        result
    }

    fn step_inner(&mut self, pc: u32) -> Result<StepOutcome, Fault> {
        let word = self
            .memory
            .fetch_word(pc)
            .map_err(|source| Fault::MemoryFault { pc, source })?;

        let instr = decode(word).map_err(|source| Fault::IllegalInstruction { pc, source })?;
        log::trace!("decode pc=0x{pc:08x} word=0x{word:08x} -> {instr:?}");

        let effect = instr.execute(pc, &mut self.registers, &mut self.memory)?;
        if effect == Effect::Continue {
            self.registers.increment_pc();
        }
        Ok(StepOutcome { pc_before: pc, pc_after: self.registers.get_pc() })
    }

    /// Step until a halt or fault condition terminates the hart.
    pub fn run(&mut self) -> Fault {
        loop {
            if let Err(fault) = self.step() {
                return fault;
            }
        }
    }
}
