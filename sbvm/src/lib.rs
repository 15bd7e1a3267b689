pub mod cpu;
pub mod memory;

pub use cpu::{Instruction, Machine, MachineError, Opcode};
pub use memory::Memory;
