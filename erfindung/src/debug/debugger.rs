//! A read-only programmer's device: it watches a register snapshot against
//! the instruction-to-source-line map the assembler produced.

use crate::asm::DebugInfo;
use crate::debug::Breakpoints;
use crate::fixed_point::to_f64;
use crate::isa::{Reg, REG_COUNT};
use crate::memory::MemorySpace;

#[cfg(test)]
#[path = "./debugger_test.rs"]
mod debugger_test;

pub const NO_LINE: usize = usize::max_value();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpretation {
    AsInt,
    AsFp,
}

pub struct Debugger {
    inst_to_line: Vec<usize>,
    break_points: Breakpoints,
    regs: [u32; REG_COUNT],
    at_break_point: bool,
}

impl Debugger {
    pub fn new(info: DebugInfo) -> Self {
        Debugger {
            inst_to_line: info.inst_to_line,
            break_points: Breakpoints::new(),
            regs: [0; REG_COUNT],
            at_break_point: false,
        }
    }

    pub fn at_break_point(&self) -> bool {
        self.at_break_point
    }

    pub fn is_outside_program(&self) -> bool {
        self.regs[Reg::PC.index()] as usize >= self.inst_to_line.len()
    }

    /// snaps the requested line to the nearest line that actually has an
    /// instruction; answers the line the break point landed on
    pub fn add_break_point(&mut self, line_number: usize) -> usize {
        match nearest_mapped_line(&self.inst_to_line, line_number) {
            Some(line) => {
                self.break_points.add(line);
                line
            }
            None => NO_LINE,
        }
    }

    pub fn remove_break_point(&mut self, line_number: usize) -> bool {
        self.break_points.remove(line_number)
    }

    pub fn break_points(&self) -> &[usize] {
        self.break_points.get()
    }

    /// called per step with the fresh register file
    pub fn update(&mut self, regs: &[u32; REG_COUNT]) {
        self.regs = *regs;
        let pc = self.regs[Reg::PC.index()] as usize;
        self.at_break_point = match self.inst_to_line.get(pc) {
            Some(&line) => self.break_points.hit(line),
            None => false,
        };
    }

    /// formats a register, or the RAM cell it points at when memory is
    /// supplied and the register holds a valid address
    pub fn interpret_register(&self, reg: Reg, interpretation: Interpretation,
                              memory: Option<&MemorySpace>) -> String {
        let reg_value = self.regs[reg.index()];
        let source = match memory {
            Some(memory) => memory.read(reg_value).unwrap_or(reg_value),
            None => reg_value,
        };
        match interpretation {
            Interpretation::AsInt => format!("{}: {}", reg.as_str(), source as i32),
            Interpretation::AsFp => format!("{}: {}", reg.as_str(), to_f64(source)),
        }
    }

    /// one human readable frame of the machine state
    pub fn frame_report(&self) -> String {
        let mut out = String::new();
        for i in 0..REG_COUNT {
            let reg = Reg::from_bits(i as u32);
            let value = self.regs[i];
            out.push_str(&format!("{:<2} | {:>11} | {:.3}\n",
                                  reg.as_str(), value as i32, to_f64(value)));
        }
        match self.inst_to_line.get(self.regs[Reg::PC.index()] as usize) {
            Some(line) => out.push_str(&format!("on source line: {}\n", line)),
            None => out.push_str("outside of the program\n"),
        }
        out
    }
}

/// binary search for the mapped line closest to the request; the map is
/// sorted because instructions are emitted in source order
fn nearest_mapped_line(map: &[usize], wanted: usize) -> Option<usize> {
    if map.is_empty() {
        return None;
    }
    match map.binary_search(&wanted) {
        Ok(_) => Some(wanted),
        Err(at) => {
            let below = if at > 0 { Some(map[at - 1]) } else { None };
            let above = map.get(at).cloned();
            match (below, above) {
                (Some(b), Some(a)) => {
                    if wanted - b <= a - wanted { Some(b) } else { Some(a) }
                }
                (Some(b), None) => Some(b),
                (None, Some(a)) => Some(a),
                (None, None) => None,
            }
        }
    }
}
