//! Instruction word layout and the pure encode/decode functions over it.
//!
//! Bit layout, msb to lsb:
//!  - bits 27-31: opcode (5 bits)
//!  - bit 26: fixed point flag; for R- and S-type instructions this bit
//!    doubles as the upper parameter form bit
//!  - bit 25: lower parameter form bit (M-type uses bits 25-26 as a plain
//!    two bit selector, it never carries the fixed point flag)
//!  - bits 22-24, 18-20, 14-16: register slots r0, r1, r2
//!  - bits 0-15: immediate

use std::fmt;

use crate::fixed_point::to_fixed;
use crate::isa::op::{JTypeParamForm, MTypeParamForm, OpCode, ParamForm, RTypeParamForm,
                     STypeParamForm};
use crate::isa::register::Reg;

#[cfg(test)]
#[path = "./instruction_test.rs"]
mod instruction_test;

pub const OP_CODE_POS: u32 = 27;
pub const PARAM_FORM_POS: u32 = 25;
pub const IS_FIXED_POINT_MASK: u32 = 0x0400_0000;

const REG0_POS: u32 = 22;
const REG1_POS: u32 = 18;
const REG2_POS: u32 = 14;

/// one 32-bit instruction word
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Inst(u32);

impl Inst {
    pub fn from_bits(bits: u32) -> Inst {
        Inst(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn with(self, bits: u32) -> Inst {
        Inst(self.0 | bits)
    }
}

impl fmt::Debug for Inst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Inst({:08X})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    IllegalParamForm(OpCode, ParamForm),
    ImmdOverflow(i64),
    AddrOverflow(u32),
    FpOverflow(f64),
    FpUnderflow(f64),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::IllegalParamForm(op, pf) =>
                write!(f, "parameter form {:?} is invalid for {}", pf, op.as_str()),
            EncodeError::ImmdOverflow(v) =>
                write!(f, "cannot store number \"{}\" in an immediate", v),
            EncodeError::AddrOverflow(v) =>
                write!(f, "cannot store address \"0x{:08X}\" in an immediate", v),
            EncodeError::FpOverflow(v) =>
                write!(f, "value \"{}\" too large for a 9/6 fixed point immediate", v),
            EncodeError::FpUnderflow(v) =>
                write!(f, "value \"{}\" too small for a 9/6 fixed point immediate", v),
        }
    }
}

pub fn encode_op_with_pf(op: OpCode, pf: ParamForm) -> Result<Inst, EncodeError> {
    use crate::isa::op::OpCode::*;
    use crate::isa::op::ParamForm::*;
    let base = op.bits() << OP_CODE_POS;
    let pf_bits = match op {
        Plus | Minus | Times | Divide | Modulus | And | Or | Xor | Rotate | Comp => match pf {
            RegRegReg => 0,
            RegRegImmd => 1,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        Set => match pf {
            RegReg => 0,
            RegImmd => 1,
            // the addressing form, r0 = r1 + immd
            RegRegImmd => 2,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        Save | Load => match pf {
            RegRegImmd => 0,
            RegReg => 1,
            RegImmd => 2,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        Skip => match pf {
            Reg => 0,
            RegImmd => 1,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        Call => match pf {
            Reg => 0,
            Immd => 1,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        Not => match pf {
            Reg => 0,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
        SystemCall => match pf {
            Immd => 0,
            _ => return Err(EncodeError::IllegalParamForm(op, pf)),
        },
    };
    Ok(Inst(base | (pf_bits << PARAM_FORM_POS)))
}

pub fn encode_reg(r0: Reg) -> u32 {
    (r0.index() as u32) << REG0_POS
}

pub fn encode_reg_reg(r0: Reg, r1: Reg) -> u32 {
    encode_reg(r0) | ((r1.index() as u32) << REG1_POS)
}

pub fn encode_reg_reg_reg(r0: Reg, r1: Reg, r2: Reg) -> u32 {
    encode_reg_reg(r0, r1) | ((r2.index() as u32) << REG2_POS)
}

/// sign-magnitude 16 bit integer immediate; -1 maps onto the bare sign bit
pub fn encode_immd_int(i: i64) -> Result<u32, EncodeError> {
    if i > 0x7FFF || i < -0x8000 {
        return Err(EncodeError::ImmdOverflow(i));
    }
    if i < 0 {
        Ok(0x8000 | ((-(i + 1)) as u32 & 0x7FFF))
    } else {
        Ok(i as u32 & 0x7FFF)
    }
}

/// embeds an address: immediate bit 15 mirrors the device high bit
pub fn encode_immd_addr(addr: u32) -> Result<u32, EncodeError> {
    let high_bit_set = addr & 0x8000_0000 != 0;
    let first_bits = addr & 0x7FFF_FFFF;
    if first_bits > 0x7FFF {
        return Err(EncodeError::AddrOverflow(addr));
    }
    Ok(if high_bit_set { 0x8000 | first_bits } else { first_bits })
}

/// truncates a full width fixed point value to the 9/6 immediate form;
/// the returned bits include the fixed point flag
pub fn encode_immd_fp(d: f64) -> Result<u32, EncodeError> {
    let fullwidth = to_fixed(d).map_err(|_| EncodeError::FpOverflow(d))?;
    let sign_part = (fullwidth & 0x8000_0000) >> 16;
    // nothing of the integer part may be lost
    if (fullwidth >> 16) & !0x1FF != 0 {
        return Err(EncodeError::FpOverflow(d));
    }
    // the significand must survive the truncation
    let partial = (fullwidth >> 10) & 0x7FFF;
    if partial == 0 {
        return Err(EncodeError::FpUnderflow(d));
    }
    Ok(sign_part | partial | IS_FIXED_POINT_MASK)
}

// wholesale encoders

pub fn encode_r(op: OpCode, r0: Reg) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::Reg)?.with(encode_reg(r0)))
}

pub fn encode_rr(op: OpCode, r0: Reg, r1: Reg) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::RegReg)?.with(encode_reg_reg(r0, r1)))
}

pub fn encode_rrr(op: OpCode, r0: Reg, r1: Reg, r2: Reg) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::RegRegReg)?.with(encode_reg_reg_reg(r0, r1, r2)))
}

pub fn encode_ri(op: OpCode, r0: Reg, immd: u32) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::RegImmd)?.with(encode_reg(r0)).with(immd))
}

pub fn encode_rri(op: OpCode, r0: Reg, r1: Reg, immd: u32) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::RegRegImmd)?
        .with(encode_reg_reg(r0, r1))
        .with(immd))
}

pub fn encode_i(op: OpCode, immd: u32) -> Result<Inst, EncodeError> {
    Ok(encode_op_with_pf(op, ParamForm::Immd)?.with(immd))
}

// decoders

pub fn decode_op_code(inst: Inst) -> Option<OpCode> {
    OpCode::from_bits(inst.bits() >> OP_CODE_POS)
}

pub fn decode_reg0(inst: Inst) -> Reg {
    Reg::from_bits(inst.bits() >> REG0_POS)
}

pub fn decode_reg1(inst: Inst) -> Reg {
    Reg::from_bits(inst.bits() >> REG1_POS)
}

pub fn decode_reg2(inst: Inst) -> Reg {
    Reg::from_bits(inst.bits() >> REG2_POS)
}

pub fn decode_is_fp(inst: Inst) -> bool {
    inst.bits() & IS_FIXED_POINT_MASK != 0
}

fn pf_bits(inst: Inst) -> u32 {
    (inst.bits() >> PARAM_FORM_POS) & 0x3
}

pub fn decode_r_type_pf(inst: Inst) -> RTypeParamForm {
    match pf_bits(inst) {
        0 => RTypeParamForm::ThreeRegsInt,
        1 => RTypeParamForm::TwoRegsImmdInt,
        2 => RTypeParamForm::ThreeRegsFp,
        3 => RTypeParamForm::TwoRegsImmdFp,
        _ => unreachable!(),
    }
}

pub fn decode_m_type_pf(inst: Inst) -> MTypeParamForm {
    match pf_bits(inst) {
        0 => MTypeParamForm::TwoRegsImmd,
        1 => MTypeParamForm::TwoRegs,
        2 => MTypeParamForm::OneRegImmd,
        _ => MTypeParamForm::Invalid,
    }
}

pub fn decode_s_type_pf(inst: Inst) -> STypeParamForm {
    match pf_bits(inst) {
        0 => STypeParamForm::TwoRegs,
        1 => STypeParamForm::OneRegImmdInt,
        2 => STypeParamForm::TwoRegsImmd,
        3 => STypeParamForm::OneRegImmdFp,
        _ => unreachable!(),
    }
}

pub fn decode_j_type_pf(inst: Inst) -> JTypeParamForm {
    if (inst.bits() >> PARAM_FORM_POS) & 0x1 == 0 {
        JTypeParamForm::Reg
    } else {
        JTypeParamForm::Immd
    }
}

/// reverses the sign-magnitude integer immediate
pub fn decode_immd_int(inst: Inst) -> i32 {
    let bits = inst.bits() & 0xFFFF;
    if bits & 0x8000 != 0 {
        -((bits & 0x7FFF) as i32) - 1
    } else {
        (bits & 0x7FFF) as i32
    }
}

pub fn decode_immd_addr(inst: Inst) -> u32 {
    let bits = inst.bits() & 0xFFFF;
    if bits & 0x8000 != 0 {
        0x8000_0000 | (bits & 0x7FFF)
    } else {
        bits & 0x7FFF
    }
}

/// re-expands a 9/6 immediate back to the full 15/16 representation
pub fn decode_immd_fp(inst: Inst) -> u32 {
    let bits = inst.bits() & 0xFFFF;
    let significand = (bits & 0x7FFF) << 10;
    let sign_part = (bits & 0x8000) << 16;
    sign_part | significand
}
