mod instruction;

use core::fmt;

use tracing::{debug, trace, warn};

pub use instruction::{Instruction, Opcode};

use crate::memory::Memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    AddressOutOfRange(usize),
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressOutOfRange(_) => write!(f, "Address out of range"),
        }
    }
}

/// Accumulator machine holding the emitted bytecode alongside its memory.
///
/// Instructions are appended with [`Machine::generate`] while a program is
/// being compiled and are read-only once [`Machine::run`] starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    bytecode: Vec<Instruction>,
    memory: Memory,
    accumulator: i32,
}

impl Machine {
    /// Memory size used when no other capacity is requested
    pub const DEFAULT_MEMORY_SIZE: usize = 10;

    pub fn new(memory_size: usize) -> Self {
        Self {
            bytecode: Vec::new(),
            memory: Memory::new(memory_size),
            accumulator: 0,
        }
    }

    /// Appends an instruction to the bytecode being generated
    pub fn generate(&mut self, inst: Instruction) {
        debug!(%inst, index = self.bytecode.len(), "instruction generated");
        self.bytecode.push(inst);
    }

    /// Runs the bytecode against memory, stopping at the first store outside of memory.
    /// Values stored before the failing instruction remain in memory
    ///
    /// # Panics
    ///
    /// A `Load` of an address outside of memory is not range-checked and panics.
    /// Compiled programs reach this when a statement past the end of memory reads
    /// its own target on first assignment (`x = x + 1`), since that `Load` runs
    /// before the `Store` that would have halted.
    pub fn run(&mut self) -> Result<(), MachineError> {
        for i in 0..self.bytecode.len() {
            let inst = self.bytecode[i];
            trace!(index = i, %inst, accumulator = self.accumulator, "executing");

            if let Err(e) = self.execute(inst) {
                warn!(index = i, %inst, "execution halted - {e}");
                return Err(e);
            }
        }

        debug!(memory = %self.memory, "execution complete");
        Ok(())
    }

    fn execute(&mut self, inst: Instruction) -> Result<(), MachineError> {
        match inst {
            Instruction::Load(addr) => {
                self.accumulator = self.accumulator.wrapping_add(self.memory[addr]);
            }
            Instruction::LoadImmediate(val) => {
                self.accumulator = self.accumulator.wrapping_add(val);
            }
            Instruction::Store(addr) => {
                self.memory.set(addr, self.accumulator)?;
                self.accumulator = 0;
            }
        }

        Ok(())
    }

    /// Clears memory and the accumulator, leaving the bytecode intact
    pub fn reset(&mut self) {
        self.memory.reset();
        self.accumulator = 0;
    }

    pub fn get_bytecode(&self) -> &[Instruction] {
        &self.bytecode
    }

    /// Provides the bytecode as flat `[opcode, operand, ...]` words
    pub fn get_bytecode_words(&self) -> Vec<i32> {
        self.bytecode.iter().flat_map(|i| i.get_words()).collect()
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    pub fn get_memory_size(&self) -> usize {
        self.memory.len()
    }

    pub fn get_accumulator(&self) -> i32 {
        self.accumulator
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Machine{{bytecode={:?}, memory={}, accumulator={}, memorySize={}}}",
            self.get_bytecode_words(),
            self.memory,
            self.accumulator,
            self.get_memory_size()
        )
    }
}
