//! Renders instruction words back to source text. The output is chosen so
//! that feeding it back through the assembler reproduces the exact bits:
//! fixed point operands select the `-fp` suffixed mnemonics, absolute
//! device addresses print as hex literals.

use std::fmt;

use crate::fixed_point::to_f64;
use crate::isa::instruction::*;
use crate::isa::op::{JTypeParamForm, MTypeParamForm, OpCode, RTypeParamForm, STypeParamForm};

fn fmt_fp_immd(inst: Inst) -> String {
    let v = to_f64(decode_immd_fp(inst));
    let mut s = format!("{}", v);
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn fmt_addr_immd(inst: Inst) -> String {
    let addr = decode_immd_addr(inst);
    if addr & 0x8000_0000 != 0 {
        format!("0x{:x}", addr)
    } else {
        format!("{}", addr)
    }
}

/// true for operations where a bare three register form needs a numeric
/// assumption at assembly time
fn needs_numeric_suffix(op: OpCode) -> bool {
    match op {
        OpCode::Times | OpCode::Divide | OpCode::Modulus | OpCode::Comp => true,
        _ => false,
    }
}

fn r_type(inst: Inst, op: OpCode) -> String {
    let name = op.as_str();
    let r0 = decode_reg0(inst).as_str();
    let r1 = decode_reg1(inst).as_str();
    match decode_r_type_pf(inst) {
        RTypeParamForm::ThreeRegsInt => {
            let suffix = if needs_numeric_suffix(op) { "-int" } else { "" };
            format!("{}{} {} {} {}", name, suffix, r0, r1, decode_reg2(inst).as_str())
        }
        RTypeParamForm::ThreeRegsFp => {
            format!("{}-fp {} {} {}", name, r0, r1, decode_reg2(inst).as_str())
        }
        RTypeParamForm::TwoRegsImmdInt => {
            format!("{} {} {} {}", name, r0, r1, decode_immd_int(inst))
        }
        RTypeParamForm::TwoRegsImmdFp => {
            format!("{} {} {} {}", name, r0, r1, fmt_fp_immd(inst))
        }
    }
}

pub fn disassemble(inst: Inst) -> String {
    let op = match decode_op_code(inst) {
        Some(op) => op,
        None => return format!("<invalid {:08X}>", inst.bits()),
    };
    let r0 = decode_reg0(inst);
    match op {
        OpCode::Plus | OpCode::Minus | OpCode::Times | OpCode::Divide | OpCode::Modulus
        | OpCode::And | OpCode::Or | OpCode::Xor | OpCode::Rotate | OpCode::Comp =>
            r_type(inst, op),
        OpCode::Set => match decode_s_type_pf(inst) {
            STypeParamForm::TwoRegs =>
                format!("set {} {}", r0.as_str(), decode_reg1(inst).as_str()),
            STypeParamForm::OneRegImmdInt =>
                format!("set {} {}", r0.as_str(), decode_immd_int(inst)),
            STypeParamForm::OneRegImmdFp =>
                format!("set {} {}", r0.as_str(), fmt_fp_immd(inst)),
            STypeParamForm::TwoRegsImmd =>
                format!("set {} {} {}", r0.as_str(), decode_reg1(inst).as_str(),
                        decode_immd_int(inst)),
        },
        OpCode::Save | OpCode::Load => match decode_m_type_pf(inst) {
            MTypeParamForm::TwoRegsImmd =>
                format!("{} {} {} {}", op.as_str(), r0.as_str(),
                        decode_reg1(inst).as_str(), decode_immd_int(inst)),
            MTypeParamForm::TwoRegs =>
                format!("{} {} {}", op.as_str(), r0.as_str(), decode_reg1(inst).as_str()),
            MTypeParamForm::OneRegImmd =>
                format!("{} {} {}", op.as_str(), r0.as_str(), fmt_addr_immd(inst)),
            MTypeParamForm::Invalid =>
                format!("<invalid {:08X}>", inst.bits()),
        },
        OpCode::Skip => match decode_j_type_pf(inst) {
            JTypeParamForm::Reg => format!("skip {}", r0.as_str()),
            JTypeParamForm::Immd => format!("skip {} {}", r0.as_str(), decode_immd_int(inst)),
        },
        OpCode::Call => match decode_j_type_pf(inst) {
            JTypeParamForm::Reg => format!("call {}", r0.as_str()),
            JTypeParamForm::Immd => format!("call {}", decode_immd_int(inst)),
        },
        OpCode::Not => format!("not {}", r0.as_str()),
        // legacy form, not part of the source surface
        OpCode::SystemCall => format!("syscall {}", decode_immd_int(inst)),
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", disassemble(*self))
    }
}
