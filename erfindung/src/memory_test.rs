use pretty_assertions::assert_eq;

use crate::isa::Inst;
use crate::memory::{MemorySpace, MEMORY_WORDS};

#[test]
fn fresh_memory_is_zeroed() {
    let mem = MemorySpace::new();
    assert_eq!(MEMORY_WORDS, mem.size());
    assert_eq!(Some(0), mem.read(0));
    assert_eq!(Some(0), mem.read(MEMORY_WORDS as u32 - 1));
}

#[test]
fn reads_and_writes_stay_in_bounds() {
    let mut mem = MemorySpace::new();
    assert!(mem.write(12, 0xDEAD_BEEF));
    assert_eq!(Some(0xDEAD_BEEF), mem.read(12));
    assert!(!mem.write(MEMORY_WORDS as u32, 1));
    assert_eq!(None, mem.read(MEMORY_WORDS as u32));
}

#[test]
fn programs_load_at_offset_zero() {
    let mut mem = MemorySpace::new();
    let program = [Inst::from_bits(1), Inst::from_bits(2), Inst::from_bits(3)];
    assert!(mem.load_program(&program));
    assert_eq!(Some(1), mem.read(0));
    assert_eq!(Some(3), mem.read(2));
    assert_eq!(Some(0), mem.read(3));
}

#[test]
fn oversized_programs_are_refused() {
    let mut mem = MemorySpace::new();
    let too_big = vec![Inst::from_bits(0); MEMORY_WORDS + 1];
    assert!(!mem.load_program(&too_big));
}
