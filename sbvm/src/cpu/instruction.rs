use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    Load,
    LoadImmediate,
    Store,
}

impl Opcode {
    pub fn get_id(&self) -> i32 {
        match self {
            Self::Load => 0,
            Self::LoadImmediate => 1,
            Self::Store => 2,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Load => "LOAD",
            Self::LoadImmediate => "LOADI",
            Self::Store => "STORE",
        };

        write!(f, "{s}")
    }
}

/// A single compiled operation and its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Adds the value at the memory address to the accumulator
    Load(usize),
    /// Adds the literal value to the accumulator
    LoadImmediate(i32),
    /// Writes the accumulator to the memory address and clears the accumulator
    Store(usize),
}

impl Instruction {
    /// Number of bytecode words used by each encoded instruction
    pub const NUM_WORDS: usize = 2;

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Load(_) => Opcode::Load,
            Self::LoadImmediate(_) => Opcode::LoadImmediate,
            Self::Store(_) => Opcode::Store,
        }
    }

    /// Provides the operand as a bytecode word. Addresses above `i32::MAX`
    /// do not fit a word and are capped at `i32::MAX`
    pub fn operand(&self) -> i32 {
        match self {
            Self::Load(addr) | Self::Store(addr) => i32::try_from(*addr).unwrap_or(i32::MAX),
            Self::LoadImmediate(v) => *v,
        }
    }

    pub fn get_words(&self) -> [i32; Self::NUM_WORDS] {
        [self.opcode().get_id(), self.operand()]
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.opcode(), self.operand())
    }
}
