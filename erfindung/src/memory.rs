//! The console's RAM: a fixed array of 16 Ki 32-bit words.

use crate::isa::Inst;

#[cfg(test)]
#[path = "./memory_test.rs"]
mod memory_test;

pub const MEMORY_CAPACITY: usize = 65_536;
pub const MEMORY_WORDS: usize = MEMORY_CAPACITY / 4;

#[derive(Clone)]
pub struct MemorySpace {
    words: Vec<u32>,
}

impl MemorySpace {
    pub fn new() -> Self {
        MemorySpace { words: vec![0; MEMORY_WORDS] }
    }

    pub fn size(&self) -> usize {
        self.words.len()
    }

    pub fn read(&self, address: u32) -> Option<u32> {
        self.words.get(address as usize).cloned()
    }

    /// returns false when the address is outside of RAM
    pub fn write(&mut self, address: u32, data: u32) -> bool {
        match self.words.get_mut(address as usize) {
            Some(cell) => {
                *cell = data;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// copies a program to offset zero; false when it does not fit
    pub fn load_program(&mut self, program: &[Inst]) -> bool {
        if program.len() > self.words.len() {
            return false;
        }
        self.reset();
        for (cell, inst) in self.words.iter_mut().zip(program) {
            *cell = inst.bits();
        }
        true
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.words
    }
}

impl Default for MemorySpace {
    fn default() -> Self {
        MemorySpace::new()
    }
}
