//! The fetch-decode-execute core. Each step fetches at PC, decodes by
//! opcode class and mutates the register file and the console pack it is
//! handed; faults abort the cycle with the pc of the offending
//! instruction.

use std::fmt;

use crate::console::{do_read, do_write, ConsolePack};
use crate::fixed_point::{fp_compare, fp_divide, fp_multiply, fp_remainder, int_compare,
                         to_f64, FixedPointError};
use crate::isa::*;

#[cfg(test)]
#[path = "./cpu_test.rs"]
mod cpu_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    IllegalInstruction,
    DivideByZero,
    AccessViolation,
    HaltRequested,
}

impl RuntimeErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeErrorKind::IllegalInstruction => "illegal instruction",
            RuntimeErrorKind::DivideByZero => "divide by zero",
            RuntimeErrorKind::AccessViolation => "memory access violation",
            RuntimeErrorKind::HaltRequested => "halt requested",
        }
    }
}

/// a runtime fault, carrying the program counter it happened at
#[derive(Clone, Debug, PartialEq)]
pub struct ErfiError {
    pub pc: usize,
    pub kind: RuntimeErrorKind,
    pub message: String,
}

impl fmt::Display for ErfiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at program location {}: {}",
               self.kind.as_str(), self.pc, self.message)
    }
}

pub struct ErfiCpu {
    registers: [u32; REG_COUNT],
    wait_called: bool,
}

impl ErfiCpu {
    pub fn new() -> Self {
        ErfiCpu {
            registers: [0; REG_COUNT],
            wait_called: false,
        }
    }

    pub fn reset(&mut self) {
        self.registers = [0; REG_COUNT];
        self.wait_called = false;
    }

    pub fn registers(&self) -> &[u32; REG_COUNT] {
        &self.registers
    }

    pub fn reg(&self, r: Reg) -> u32 {
        self.registers[r.index()]
    }

    pub fn set_reg(&mut self, r: Reg, value: u32) {
        self.registers[r.index()] = value;
    }

    pub fn wait_was_called(&self) -> bool {
        self.wait_called
    }

    pub fn clear_wait(&mut self) {
        self.wait_called = false;
    }

    /// runs one instruction against the pack
    pub fn step(&mut self, pack: &mut ConsolePack) -> Result<(), ErfiError> {
        let pc = self.reg(Reg::PC) as usize;
        let word = pack.ram.read(pc as u32).ok_or_else(|| ErfiError {
            pc,
            kind: RuntimeErrorKind::AccessViolation,
            message: "program counter left the memory space".to_string(),
        })?;
        self.set_reg(Reg::PC, (pc as u32).wrapping_add(1));

        let inst = Inst::from_bits(word);
        let op = match decode_op_code(inst) {
            Some(op) => op,
            None => return Err(illegal(pc, inst)),
        };
        match op {
            OpCode::Plus => self.do_arith(inst, pc,
                |x, y| Ok(x.wrapping_add(y)),
                |x, y| Ok(x.wrapping_add(y))),
            OpCode::Minus => self.do_arith(inst, pc,
                |x, y| Ok(x.wrapping_sub(y)),
                |x, y| Ok(x.wrapping_sub(y))),
            OpCode::Times => self.do_arith(inst, pc,
                |x, y| Ok(fp_multiply(x, y)),
                |x, y| Ok(x.wrapping_mul(y))),
            OpCode::Divide => self.do_arith(inst, pc, div_fp, div_int),
            OpCode::Modulus => self.do_arith(inst, pc, mod_fp, mod_int),
            OpCode::And => self.do_arith(inst, pc,
                |x, y| Ok(x & y), |x, y| Ok(x & y)),
            OpCode::Or => self.do_arith(inst, pc,
                |x, y| Ok(x | y), |x, y| Ok(x | y)),
            OpCode::Xor => self.do_arith(inst, pc,
                |x, y| Ok(x ^ y), |x, y| Ok(x ^ y)),
            OpCode::Comp => self.do_arith(inst, pc,
                |x, y| Ok(fp_compare(x, y)),
                |x, y| Ok(int_compare(x, y))),
            OpCode::Rotate => {
                self.do_rotate(inst);
                Ok(())
            }
            OpCode::Not => {
                let r0 = decode_reg0(inst);
                self.set_reg(r0, !self.reg(r0));
                Ok(())
            }
            OpCode::Set => self.do_set(inst),
            OpCode::Load => self.do_load(inst, pc, pack),
            OpCode::Save => self.do_save(inst, pc, pack),
            OpCode::Skip => self.do_skip(inst),
            OpCode::Call => self.do_call(inst, pc, pack),
            OpCode::SystemCall => self.do_syscall(inst, pc, pack),
        }
    }

    fn do_arith<Fp, Int>(&mut self, inst: Inst, pc: usize, fp: Fp, int: Int)
        -> Result<(), ErfiError>
        where Fp: Fn(u32, u32) -> Result<u32, RuntimeErrorKind>,
              Int: Fn(u32, u32) -> Result<u32, RuntimeErrorKind>
    {
        use crate::isa::RTypeParamForm::*;
        let r1 = self.reg(decode_reg1(inst));
        let result = match decode_r_type_pf(inst) {
            ThreeRegsInt => int(r1, self.reg(decode_reg2(inst))),
            TwoRegsImmdInt => int(r1, decode_immd_int(inst) as u32),
            ThreeRegsFp => fp(r1, self.reg(decode_reg2(inst))),
            TwoRegsImmdFp => fp(r1, decode_immd_fp(inst)),
        };
        let result = result.map_err(|kind| ErfiError {
            pc,
            kind,
            message: format!("while executing \"{}\"", disassemble(inst)),
        })?;
        self.set_reg(decode_reg0(inst), result);
        Ok(())
    }

    /// negative counts rotate left, positive right, both modulo 32
    fn do_rotate(&mut self, inst: Inst) {
        use crate::isa::RTypeParamForm::*;
        let value = self.reg(decode_reg1(inst));
        let count = match decode_r_type_pf(inst) {
            ThreeRegsInt | ThreeRegsFp => self.reg(decode_reg2(inst)) as i32,
            TwoRegsImmdInt | TwoRegsImmdFp => decode_immd_int(inst),
        };
        let count = i64::from(count);
        let rotated = if count < 0 {
            value.rotate_left(((-count) % 32) as u32)
        } else {
            value.rotate_right((count % 32) as u32)
        };
        self.set_reg(decode_reg0(inst), rotated);
    }

    fn do_set(&mut self, inst: Inst) -> Result<(), ErfiError> {
        use crate::isa::STypeParamForm::*;
        let r0 = decode_reg0(inst);
        let value = match decode_s_type_pf(inst) {
            TwoRegs => self.reg(decode_reg1(inst)),
            OneRegImmdInt => decode_immd_int(inst) as u32,
            OneRegImmdFp => decode_immd_fp(inst),
            // the addressing form used for resolved labels
            TwoRegsImmd => self.reg(decode_reg1(inst))
                .wrapping_add(decode_immd_int(inst) as u32),
        };
        self.set_reg(r0, value);
        Ok(())
    }

    fn effective_address(&self, inst: Inst, pc: usize) -> Result<u32, ErfiError> {
        use crate::isa::MTypeParamForm::*;
        match decode_m_type_pf(inst) {
            TwoRegsImmd => Ok(self.reg(decode_reg1(inst))
                .wrapping_add(decode_immd_int(inst) as u32)),
            TwoRegs => Ok(self.reg(decode_reg1(inst))),
            OneRegImmd => Ok(decode_immd_addr(inst)),
            Invalid => Err(illegal(pc, inst)),
        }
    }

    fn do_load(&mut self, inst: Inst, pc: usize, pack: &mut ConsolePack)
        -> Result<(), ErfiError>
    {
        let address = self.effective_address(inst, pc)?;
        let value = do_read(pack, address).map_err(|fault| ErfiError {
            pc,
            kind: RuntimeErrorKind::AccessViolation,
            message: format!("cannot load from address 0x{:08X}", fault.0),
        })?;
        self.set_reg(decode_reg0(inst), value);
        Ok(())
    }

    fn do_save(&mut self, inst: Inst, pc: usize, pack: &mut ConsolePack)
        -> Result<(), ErfiError>
    {
        let address = self.effective_address(inst, pc)?;
        let value = self.reg(decode_reg0(inst));
        do_write(pack, address, value).map_err(|fault| ErfiError {
            pc,
            kind: RuntimeErrorKind::AccessViolation,
            message: format!("cannot save to address 0x{:08X}", fault.0),
        })
    }

    /// a set register bit under the mask skips the next instruction; the
    /// register form treats any set bit as a hit
    fn do_skip(&mut self, inst: Inst) -> Result<(), ErfiError> {
        let r0 = self.reg(decode_reg0(inst));
        let hit = match decode_j_type_pf(inst) {
            JTypeParamForm::Reg => r0 != 0,
            JTypeParamForm::Immd => r0 & (decode_immd_int(inst) as u32) != 0,
        };
        if hit {
            let pc = self.reg(Reg::PC);
            self.set_reg(Reg::PC, pc.wrapping_add(1));
        }
        Ok(())
    }

    /// pushes the return address, then jumps to the target
    fn do_call(&mut self, inst: Inst, pc: usize, pack: &mut ConsolePack)
        -> Result<(), ErfiError>
    {
        let target = match decode_j_type_pf(inst) {
            JTypeParamForm::Reg => self.reg(decode_reg0(inst)),
            JTypeParamForm::Immd => decode_immd_addr(inst),
        };
        let sp = self.reg(Reg::SP).wrapping_add(1);
        self.set_reg(Reg::SP, sp);
        let return_address = self.reg(Reg::PC);
        do_write(pack, sp, return_address).map_err(|fault| ErfiError {
            pc,
            kind: RuntimeErrorKind::AccessViolation,
            message: format!("cannot push the return address to 0x{:08X}", fault.0),
        })?;
        self.set_reg(Reg::PC, target);
        Ok(())
    }

    /// deprecated register addressed device access, kept for tests; the
    /// memory mapped streams are the canonical interface
    fn do_syscall(&mut self, inst: Inst, pc: usize, pack: &mut ConsolePack)
        -> Result<(), ErfiError>
    {
        let x = self.reg(Reg::X);
        let y = self.reg(Reg::Y);
        let z = self.reg(Reg::Z);
        match SystemCallValue::from_immd(decode_immd_int(inst)) {
            Some(SystemCallValue::UploadSprite) => {
                let index = pack.gpu.upload_sprite(x, y, z);
                self.set_reg(Reg::A, index);
            }
            Some(SystemCallValue::UnloadSprite) => pack.gpu.unload_sprite(x),
            Some(SystemCallValue::DrawSprite) => pack.gpu.draw_sprite(x, y, z),
            Some(SystemCallValue::ScreenClear) => pack.gpu.screen_clear(),
            Some(SystemCallValue::WaitForFrame) => {
                self.wait_called = true;
                pack.dev.wait(1);
            }
            Some(SystemCallValue::ReadInput) => {
                let buttons = pack.pad.decode();
                self.set_reg(Reg::A, buttons);
            }
            None => return Err(illegal(pc, inst)),
        }
        Ok(())
    }

    /// every register, shown as an integer and as fixed point
    pub fn print_registers(&self) -> String {
        let mut out = String::new();
        for i in 0..REG_COUNT {
            let reg = Reg::from_bits(i as u32);
            let value = self.registers[i];
            out.push_str(&format!("{:<2} | {:>11} | {:.3}\n",
                                  reg.as_str(), value as i32, to_f64(value)));
        }
        out
    }
}

impl Default for ErfiCpu {
    fn default() -> Self {
        ErfiCpu::new()
    }
}

fn illegal(pc: usize, inst: Inst) -> ErfiError {
    ErfiError {
        pc,
        kind: RuntimeErrorKind::IllegalInstruction,
        message: format!("unsupported instruction \"{}\"", disassemble(inst)),
    }
}

fn div_fp(x: u32, y: u32) -> Result<u32, RuntimeErrorKind> {
    fp_divide(x, y).map_err(|e| match e {
        FixedPointError::DivideByZero => RuntimeErrorKind::DivideByZero,
        FixedPointError::Overflow => RuntimeErrorKind::IllegalInstruction,
    })
}

fn div_int(x: u32, y: u32) -> Result<u32, RuntimeErrorKind> {
    if y == 0 {
        return Err(RuntimeErrorKind::DivideByZero);
    }
    Ok((x as i32).wrapping_div(y as i32) as u32)
}

fn mod_fp(x: u32, y: u32) -> Result<u32, RuntimeErrorKind> {
    let quot = div_fp(x, y)?;
    Ok(fp_remainder(quot, y, x))
}

/// the remainder takes the sign of the quotient, regardless of how the
/// host language rounds
fn mod_int(x: u32, y: u32) -> Result<u32, RuntimeErrorKind> {
    if y == 0 {
        return Err(RuntimeErrorKind::DivideByZero);
    }
    let x = x as i32;
    let y = y as i32;
    let magnitude = x.wrapping_abs().wrapping_rem(y.wrapping_abs());
    let sign = x.signum() * y.signum();
    Ok(sign.wrapping_mul(magnitude) as u32)
}
