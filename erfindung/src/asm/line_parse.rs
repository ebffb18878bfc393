//! Classification of one statement's operand tokens.

use crate::asm::state::TextState;
use crate::asm::{AsmError, AsmErrorKind};
use crate::isa::Reg;
use crate::numeric::{parse_number, NumericParse};

#[cfg(test)]
#[path = "./line_parse_test.rs"]
mod line_parse_test;

/// the operand shape of a source line, before an opcode narrows it down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtendedParamForm {
    ThreeRegs,
    TwoRegsInt,
    TwoRegsFp,
    TwoRegsLabel,
    TwoRegs,
    OneRegInt,
    OneRegFp,
    OneRegLabel,
    OneReg,
    Int,
    Fp,
    Label,
    Invalid,
}

impl ExtendedParamForm {
    pub fn as_str(self) -> &'static str {
        use self::ExtendedParamForm::*;
        match self {
            ThreeRegs => "3 registers",
            TwoRegsInt => "2 registers and an integer",
            TwoRegsFp => "2 registers and a fixed point number",
            TwoRegsLabel => "2 registers and a label",
            TwoRegs => "2 registers",
            OneRegInt => "a register and an integer",
            OneRegFp => "a register and a fixed point number",
            OneRegLabel => "a register and a label",
            OneReg => "a register",
            Int => "an integer",
            Fp => "a fixed point number",
            Label => "a label",
            Invalid => "an invalid parameter form",
        }
    }
}

pub fn string_to_register(token: &str) -> Option<Reg> {
    match token {
        "x" => Some(Reg::X),
        "y" => Some(Reg::Y),
        "z" => Some(Reg::Z),
        "a" => Some(Reg::A),
        "b" => Some(Reg::B),
        "c" => Some(Reg::C),
        "sp" => Some(Reg::SP),
        "pc" => Some(Reg::PC),
        _ => None,
    }
}

pub fn string_to_register_or_err(state: &TextState, token: &str) -> Result<Reg, AsmError> {
    string_to_register(token).ok_or_else(|| state.make_error(
        AsmErrorKind::BadParameterForm,
        format!(": \"{}\" is not a register", token),
    ))
}

/// index of the newline token closing the statement at `pos`
pub fn get_eol(tokens: &[String], mut pos: usize) -> usize {
    while pos < tokens.len() && tokens[pos] != "\n" {
        pos += 1;
    }
    pos
}

/// classifies the operands in `tokens[beg..eol]`; the numeric parse of the
/// final operand rides along so callers never parse a token twice
pub fn lines_param_form(tokens: &[String], beg: usize, eol: usize)
    -> (ExtendedParamForm, NumericParse)
{
    use self::ExtendedParamForm::*;
    let arg_count = eol.saturating_sub(beg);
    match arg_count {
        2 | 3 => {
            for i in 0..arg_count - 1 {
                if string_to_register(&tokens[beg + i]).is_none() {
                    return (Invalid, NumericParse::NotNumeric);
                }
            }
            let last = &tokens[eol - 1];
            if string_to_register(last).is_some() {
                return (if arg_count == 2 { TwoRegs } else { ThreeRegs },
                        NumericParse::NotNumeric);
            }
            let npi = parse_number(last);
            let form = match npi {
                NumericParse::Integer(_) => if arg_count == 2 { OneRegInt } else { TwoRegsInt },
                NumericParse::Decimal(_) => if arg_count == 2 { OneRegFp } else { TwoRegsFp },
                NumericParse::NotNumeric => if arg_count == 2 { OneRegLabel } else { TwoRegsLabel },
            };
            (form, npi)
        }
        1 => {
            if string_to_register(&tokens[beg]).is_some() {
                return (OneReg, NumericParse::NotNumeric);
            }
            let npi = parse_number(&tokens[beg]);
            let form = match npi {
                NumericParse::Integer(_) => Int,
                NumericParse::Decimal(_) => Fp,
                NumericParse::NotNumeric => Label,
            };
            (form, npi)
        }
        _ => (Invalid, NumericParse::NotNumeric),
    }
}
