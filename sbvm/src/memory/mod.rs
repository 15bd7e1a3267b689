use core::fmt;
use std::ops::Index;

use crate::cpu::MachineError;

/// Provides a fixed-size, zero-initialized bank of integer memory slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    data: Vec<i32>,
}

impl Memory {
    /// Defines a new memory bank with zero in each memory location
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Sets the value at the requested memory location
    pub fn set(&mut self, addr: usize, val: i32) -> Result<(), MachineError> {
        match self.data.get_mut(addr) {
            Some(slot) => {
                *slot = val;
                Ok(())
            }
            None => Err(MachineError::AddressOutOfRange(addr)),
        }
    }

    /// Resets every memory location to zero
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

impl Index<usize> for Memory {
    type Output = i32;

    fn index(&self, addr: usize) -> &Self::Output {
        &self.data[addr]
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test the initialization of the memory bank
    #[test]
    fn test_init() {
        let size = 10;
        let mut mem = Memory::new(size);

        assert_eq!(mem.len(), size);
        assert!(mem.as_slice().iter().all(|v| *v == 0));

        for i in 0..2 * size {
            assert_eq!(mem.set(i, 1).is_ok(), i < size);
        }
    }

    /// Test setting a memory location above the top address
    #[test]
    fn test_set_above() {
        let mut mem = Memory::new(4);
        let result = mem.set(mem.len(), 32);
        assert!(matches!(result, Err(MachineError::AddressOutOfRange(4))));
        assert_eq!(mem.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_set_and_reset() {
        let mut mem = Memory::new(3);

        for i in 0..mem.len() {
            assert!(mem.set(i, (i as i32 + 1) * 10).is_ok());
        }

        assert_eq!(mem.as_slice(), &[10, 20, 30]);
        assert_eq!(mem[1], 20);
        assert_eq!(mem.to_string(), "[10, 20, 30]");

        mem.reset();
        assert_eq!(mem.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn test_empty() {
        let mut mem = Memory::new(0);
        assert!(mem.is_empty());
        assert!(mem.set(0, 1).is_err());
    }
}
