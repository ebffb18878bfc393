//! Per-mnemonic encoders and the statement dispatch loop. Dispatch is a
//! static table of alias lists scanned linearly; the alias set includes
//! the `-int`/`-fp` suffixes that force a numeric assumption for a single
//! instruction.

use crate::asm::data::process_data;
use crate::asm::io_line::make_sysio;
use crate::asm::line_parse::*;
use crate::asm::state::*;
use crate::asm::{AsmError, AsmErrorKind};
use crate::fixed_point::{COMP_EQUAL_MASK, COMP_GREATER_THAN_MASK, COMP_LESS_THAN_MASK,
                         COMP_NOT_EQUAL_MASK};
use crate::isa::*;
use crate::numeric::NumericParse;

#[cfg(test)]
#[path = "./encoders_test.rs"]
mod encoders_test;

pub(crate) type LineHandler = fn(&mut TextState, &[String], usize) -> Result<usize, AsmError>;

struct HandlerEntry {
    aliases: &'static [&'static str],
    func: LineHandler,
}

static HANDLER_TABLE: &[HandlerEntry] = &[
    HandlerEntry { aliases: &["and", "&"], func: make_and },
    HandlerEntry { aliases: &["or", "|"], func: make_or },
    HandlerEntry { aliases: &["xor", "^"], func: make_xor },
    HandlerEntry { aliases: &["not", "!", "~"], func: make_not },
    HandlerEntry { aliases: &["plus", "add", "+"], func: make_plus },
    HandlerEntry { aliases: &["minus", "sub", "-"], func: make_minus },
    HandlerEntry { aliases: &["skip", "?"], func: make_skip },
    HandlerEntry { aliases: &["save", "sav", "<<"], func: make_save },
    HandlerEntry { aliases: &["load", "ld", ">>"], func: make_load },
    HandlerEntry { aliases: &["set", "="], func: make_set },
    HandlerEntry { aliases: &["rotate", "rot", "@"], func: make_rotate },
    HandlerEntry { aliases: &["io"], func: make_sysio },
    HandlerEntry { aliases: &["call"], func: make_call },
    HandlerEntry { aliases: &["jump"], func: make_jump },
    HandlerEntry { aliases: &["times", "mul", "multiply", "*"], func: make_multiply },
    HandlerEntry {
        aliases: &["times-int", "mul-int", "multiply-int", "*-int"],
        func: make_multiply_int,
    },
    HandlerEntry {
        aliases: &["times-fp", "mul-fp", "multiply-fp", "*-fp"],
        func: make_multiply_fp,
    },
    HandlerEntry { aliases: &["div", "divmod", "divide", "/"], func: make_divide },
    HandlerEntry { aliases: &["div-int", "divide-int", "/-int"], func: make_divide_int },
    HandlerEntry { aliases: &["div-fp", "divide-fp", "/-fp"], func: make_divide_fp },
    HandlerEntry { aliases: &["comp", "compare", "cmp", "<=>"], func: make_cmp },
    HandlerEntry {
        aliases: &["comp-int", "compare-int", "cmp-int", "<=>-int"],
        func: make_cmp_int,
    },
    HandlerEntry {
        aliases: &["comp-fp", "compare-fp", "cmp-fp", "<=>-fp"],
        func: make_cmp_fp,
    },
    HandlerEntry { aliases: &["mod", "modulus", "%"], func: make_modulus },
    HandlerEntry { aliases: &["mod-int", "modulus-int", "%-int"], func: make_modulus_int },
    HandlerEntry { aliases: &["mod-fp", "modulus-fp", "%-fp"], func: make_modulus_fp },
    HandlerEntry { aliases: &["plus-int", "add-int"], func: make_plus_int },
    HandlerEntry { aliases: &["plus-fp", "add-fp"], func: make_plus_fp },
    HandlerEntry { aliases: &["minus-int", "sub-int"], func: make_minus_int },
    HandlerEntry { aliases: &["minus-fp", "sub-fp"], func: make_minus_fp },
    HandlerEntry { aliases: &["and-int"], func: make_and_int },
    HandlerEntry { aliases: &["and-fp"], func: make_and_fp },
    HandlerEntry { aliases: &["or-int"], func: make_or_int },
    HandlerEntry { aliases: &["or-fp"], func: make_or_fp },
    HandlerEntry { aliases: &["xor-int"], func: make_xor_int },
    HandlerEntry { aliases: &["xor-fp"], func: make_xor_fp },
    HandlerEntry { aliases: &["rotate-int", "rot-int"], func: make_rotate_int },
    HandlerEntry { aliases: &["rotate-fp", "rot-fp"], func: make_rotate_fp },
    HandlerEntry { aliases: &["assume"], func: assume_directive },
    HandlerEntry { aliases: &["push"], func: make_push },
    HandlerEntry { aliases: &["pop"], func: make_pop },
];

pub(crate) fn line_processing_function(mnemonic: &str) -> Option<LineHandler> {
    for entry in HANDLER_TABLE {
        if entry.aliases.iter().any(|a| *a == mnemonic) {
            return Some(entry.func);
        }
    }
    None
}

/// drives the whole token stream through the per-line encoders
pub(crate) fn process_tokens(state: &mut TextState, tokens: &[String])
    -> Result<(), AsmError>
{
    let mut pos = 0;
    loop {
        state.handle_newlines(tokens, &mut pos);
        if pos == tokens.len() {
            return Ok(());
        }
        let token = &tokens[pos];
        if let Some(func) = line_processing_function(token) {
            pos = func(state, tokens, pos)?;
        } else if token == "data" {
            pos = process_data(state, tokens, pos)?;
        } else if token == ":" {
            pos = state.process_label(tokens, pos)?;
        } else {
            return Err(state.make_error(
                AsmErrorKind::UnknownMnemonic,
                format!(": first token \"{}\" is neither directive, label, or \
                         instruction", token)));
        }
    }
}

// <----------------------- arithmetic operations ---------------------------->

fn make_plus(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Plus, state, tokens, pos)
}

fn make_plus_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Plus, s, tokens, pos))
}

fn make_plus_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Plus, s, tokens, pos))
}

fn make_minus(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Minus, state, tokens, pos)
}

fn make_minus_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Minus, s, tokens, pos))
}

fn make_minus_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Minus, s, tokens, pos))
}

fn make_multiply(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Times, state, tokens, pos)
}

fn make_multiply_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Times, s, tokens, pos))
}

fn make_multiply_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Times, s, tokens, pos))
}

fn make_divide(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Divide, state, tokens, pos)
}

fn make_divide_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Divide, s, tokens, pos))
}

fn make_divide_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Divide, s, tokens, pos))
}

fn make_modulus(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Modulus, state, tokens, pos)
}

fn make_modulus_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Modulus, s, tokens, pos))
}

fn make_modulus_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Modulus, s, tokens, pos))
}

// <------------------------- logic operations ------------------------------->

fn make_and(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::And, state, tokens, pos)
}

fn make_and_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::And, s, tokens, pos))
}

fn make_and_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::And, s, tokens, pos))
}

fn make_or(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Or, state, tokens, pos)
}

fn make_or_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Or, s, tokens, pos))
}

fn make_or_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Or, s, tokens, pos))
}

fn make_xor(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Xor, state, tokens, pos)
}

fn make_xor_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Xor, s, tokens, pos))
}

fn make_xor_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Xor, s, tokens, pos))
}

fn make_rotate(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Rotate, state, tokens, pos)
}

fn make_rotate_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Rotate, s, tokens, pos))
}

fn make_rotate_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Rotate, s, tokens, pos))
}

fn make_not(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    match lines_param_form(tokens, beg, eol).0 {
        ExtendedParamForm::OneReg => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let inst = encode_r(OpCode::Not, reg).map_err(|e| state.encode_error(e))?;
            state.add_instruction(inst, None);
            Ok(eol)
        }
        _ => Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": exactly one argument permitted for logical complement (not)")),
    }
}

fn make_cmp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_arithmetic(OpCode::Comp, state, tokens, pos)
}

fn make_cmp_int(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_INT, |s| make_generic_arithmetic(OpCode::Comp, s, tokens, pos))
}

fn make_cmp_fp(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    state.with_assumption(USING_FP, |s| make_generic_arithmetic(OpCode::Comp, s, tokens, pos))
}

// <--------------------- flow control operations ---------------------------->

fn comparison_mask_for(token: &str) -> Option<u32> {
    match token {
        "==" => Some(COMP_EQUAL_MASK),
        "<" => Some(COMP_LESS_THAN_MASK),
        ">" => Some(COMP_GREATER_THAN_MASK),
        "<=" => Some(COMP_LESS_THAN_MASK | COMP_EQUAL_MASK),
        ">=" => Some(COMP_GREATER_THAN_MASK | COMP_EQUAL_MASK),
        "!=" => Some(COMP_NOT_EQUAL_MASK),
        _ => None,
    }
}

fn make_skip(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    use crate::asm::line_parse::ExtendedParamForm::*;
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);
    let inst = match pf {
        OneReg => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            encode_r(OpCode::Skip, reg)
        }
        OneRegInt => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            let immd = encode_immd_int(value).map_err(|e| state.encode_error(e))?;
            encode_ri(OpCode::Skip, reg, immd)
        }
        OneRegLabel => {
            let mask = comparison_mask_for(&tokens[beg + 1]).ok_or_else(|| state.make_error(
                AsmErrorKind::BadParameterForm,
                ": labels are not supported with skip instructions"))?;
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            encode_ri(OpCode::Skip, reg, mask)
        }
        OneRegFp => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": a fixed point is not an appropriate mask")),
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm, ": unsupported parameters")),
    };
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, None);
    Ok(eol)
}

fn make_call(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    use crate::asm::line_parse::ExtendedParamForm::*;
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);
    let mut label = None;
    let inst = match pf {
        OneReg => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            encode_op_with_pf(OpCode::Call, ParamForm::Reg)
                .map(|i| i.with(encode_reg(reg)))
        }
        Int => {
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            match encode_immd_int(value) {
                Ok(immd) => encode_i(OpCode::Call, immd),
                Err(e) => Err(e),
            }
        }
        Label => {
            label = Some(tokens[beg].as_str());
            encode_op_with_pf(OpCode::Call, ParamForm::Immd)
        }
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": requires exactly one argument, an immediate or register")),
    };
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, label);
    Ok(eol)
}

// <------------------------- move operations -------------------------------->

fn make_set(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    use crate::asm::line_parse::ExtendedParamForm::*;
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);
    let mut label = None;
    let inst = match pf {
        TwoRegs => {
            let r0 = string_to_register_or_err(state, &tokens[beg])?;
            let r1 = string_to_register_or_err(state, &tokens[beg + 1])?;
            encode_rr(OpCode::Set, r0, r1)
        }
        OneRegInt => {
            let r0 = string_to_register_or_err(state, &tokens[beg])?;
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            match encode_immd_int(value) {
                Ok(immd) => encode_ri(OpCode::Set, r0, immd),
                Err(e) => Err(e),
            }
        }
        OneRegFp => {
            let r0 = string_to_register_or_err(state, &tokens[beg])?;
            let value = match npi {
                NumericParse::Decimal(d) => d,
                _ => unreachable!(),
            };
            match encode_immd_fp(value) {
                Ok(immd) => encode_ri(OpCode::Set, r0, immd),
                Err(e) => Err(e),
            }
        }
        OneRegLabel => {
            let r0 = string_to_register_or_err(state, &tokens[beg])?;
            label = Some(tokens[beg + 1].as_str());
            encode_op_with_pf(OpCode::Set, ParamForm::RegImmd)
                .map(|i| i.with(encode_reg(r0)))
        }
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": set instruction may only have exactly two arguments, the first \
             being a register")),
    };
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, label);
    Ok(eol)
}

fn make_load(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_memory_access(OpCode::Load, state, tokens, pos)
}

fn make_save(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_generic_memory_access(OpCode::Save, state, tokens, pos)
}

// <----------------------- pseudo instructions ------------------------------>

fn make_jump(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    use crate::asm::line_parse::ExtendedParamForm::*;
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);
    let mut label = None;
    let inst = match pf {
        OneReg => {
            let target = string_to_register_or_err(state, &tokens[beg])?;
            encode_rr(OpCode::Set, Reg::PC, target)
        }
        Int => {
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            match encode_immd_int(value) {
                Ok(immd) => encode_ri(OpCode::Set, Reg::PC, immd),
                Err(e) => Err(e),
            }
        }
        Label => {
            label = Some(tokens[beg].as_str());
            encode_op_with_pf(OpCode::Set, ParamForm::RegImmd)
                .map(|i| i.with(encode_reg(Reg::PC)))
        }
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": jump only accepts one argument, the destination")),
    };
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, label);
    Ok(eol)
}

fn assume_directive(state: &mut TextState, tokens: &[String], pos: usize)
    -> Result<usize, AsmError>
{
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    if eol - beg != 1 {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm, ": too many assumptions/arguments"));
    }
    match tokens[beg].as_str() {
        "fp" | "fixed-point" => state.include_assumption(USING_FP),
        "int" | "integer" => state.include_assumption(USING_INT),
        "none" | "nothing" => state.include_assumption(NO_ASSUMPTIONS),
        "io-throw-away" | "io-throw-away-registers" =>
            state.exclude_assumption(SAVE_AND_RESTORE_REGISTERS),
        "io-save-and-restore" | "io-save-and-restore-registers" =>
            state.include_assumption(SAVE_AND_RESTORE_REGISTERS),
        other => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            format!(": \"{}\" is not a valid assumption", other))),
    }
    Ok(eol)
}

fn make_push(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_stack_op(state, tokens, pos, OpCode::Save)
}

fn make_pop(state: &mut TextState, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
    make_stack_op(state, tokens, pos, OpCode::Load)
}

/// push saves argument i at SP+(n+1-i) and bumps SP afterwards; pop lowers
/// SP before its loads so `pop pc` is a working return
fn make_stack_op(state: &mut TextState, tokens: &[String], pos: usize, val_op: OpCode)
    -> Result<usize, AsmError>
{
    debug_assert!(val_op == OpCode::Save || val_op == OpCode::Load);
    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let arg_count = eol - beg;
    if arg_count == 0 {
        return Ok(eol);
    }

    let count_immd = encode_immd_int(arg_count as i64).map_err(|e| state.encode_error(e))?;
    let change_sp = encode_rri(
        if val_op == OpCode::Load { OpCode::Minus } else { OpCode::Plus },
        Reg::SP, Reg::SP, count_immd,
    ).map_err(|e| state.encode_error(e))?;

    if val_op == OpCode::Load {
        state.add_instruction(change_sp, None);
    }

    let mut stack_offset = arg_count as i64;
    for i in 0..arg_count {
        let reg = string_to_register_or_err(state, &tokens[beg + i])?;
        let immd = encode_immd_int(stack_offset).map_err(|e| state.encode_error(e))?;
        let inst = encode_rri(val_op, reg, Reg::SP, immd)
            .map_err(|e| state.encode_error(e))?;
        state.add_instruction(inst, None);
        stack_offset -= 1;
    }

    if val_op == OpCode::Save {
        state.add_instruction(change_sp, None);
    }
    Ok(eol)
}

// <-------------------------- generic encoders ------------------------------>

#[derive(Clone, Copy, PartialEq)]
enum TypeIdentity {
    Fp,
    Int,
    Indeterminate,
}

/// times, divide, modulus and comp emit different operations for integers
/// and fixed point, so bare register forms need an active assumption
fn numeric_assumption_matters(op: OpCode) -> bool {
    match op {
        OpCode::Plus | OpCode::Minus | OpCode::And | OpCode::Or | OpCode::Xor
        | OpCode::Not | OpCode::Rotate => false,
        _ => true,
    }
}

fn op_supports_fp_immd(op: OpCode) -> bool {
    match op {
        OpCode::Plus | OpCode::Minus | OpCode::Times | OpCode::Divide
        | OpCode::Modulus | OpCode::Comp => true,
        _ => false,
    }
}

fn op_supports_int_immd(op: OpCode) -> bool {
    match op {
        OpCode::Plus | OpCode::Minus | OpCode::Times | OpCode::Divide
        | OpCode::Modulus | OpCode::And | OpCode::Or | OpCode::Xor
        | OpCode::Rotate | OpCode::Comp => true,
        _ => false,
    }
}

fn warn_if_rotate_and_assuming_fp(state: &mut TextState, pf: ExtendedParamForm, op: OpCode) {
    use crate::asm::line_parse::ExtendedParamForm::*;
    if op != OpCode::Rotate {
        return;
    }
    match pf {
        TwoRegsFp | TwoRegsInt | TwoRegsLabel | OneRegFp | OneRegInt | OneRegLabel => return,
        _ => (),
    }
    if state.assumptions() & USING_FP != 0 {
        state.push_warning(": rotate is being used while the fixed point \
                            assumption is active");
    }
}

fn make_generic_arithmetic(op: OpCode, state: &mut TextState, tokens: &[String], pos: usize)
    -> Result<usize, AsmError>
{
    use crate::asm::line_parse::ExtendedParamForm::*;

    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);

    warn_if_rotate_and_assuming_fp(state, pf, op);
    match pf {
        ThreeRegs | TwoRegs => {
            if numeric_assumption_matters(op)
                && state.assumptions() & (USING_FP | USING_INT) == 0
            {
                return Err(state.make_error(
                    AsmErrorKind::AmbiguousNumericAssumption,
                    ": cannot deduce whether a fixed point or integer operation \
                     was meant; the assembler doesn't know which instruction to \
                     construct"));
            }
        }
        TwoRegsFp | TwoRegsInt | TwoRegsLabel | OneRegFp | OneRegInt | OneRegLabel => (),
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm, ": unsupported parameters")),
    }

    // the first register is always the answer
    let ans = string_to_register_or_err(state, &tokens[beg])?;

    let mut type_identity = match pf {
        TwoRegsFp | OneRegFp => TypeIdentity::Fp,
        TwoRegsInt | OneRegInt | TwoRegsLabel | OneRegLabel => TypeIdentity::Int,
        _ => TypeIdentity::Indeterminate,
    };
    if type_identity == TypeIdentity::Indeterminate {
        if state.assumptions() & USING_FP != 0 {
            type_identity = TypeIdentity::Fp;
        } else if state.assumptions() & USING_INT != 0 {
            type_identity = TypeIdentity::Int;
        }
    }

    let mut label = None;
    let immd = match pf {
        TwoRegsFp | OneRegFp => {
            if !op_supports_fp_immd(op) {
                return Err(state.make_error(
                    AsmErrorKind::BadParameterForm,
                    ": instruction does not support fixed point immediates"));
            }
            let value = match npi {
                NumericParse::Decimal(d) => d,
                _ => unreachable!(),
            };
            encode_immd_fp(value).map_err(|e| state.encode_error(e))?
        }
        TwoRegsInt | OneRegInt => {
            if !op_supports_int_immd(op) {
                return Err(state.make_error(
                    AsmErrorKind::BadParameterForm,
                    ": instruction does not support integer immediates"));
            }
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            encode_immd_int(value).map_err(|e| state.encode_error(e))?
        }
        TwoRegsLabel | OneRegLabel => {
            label = Some(tokens[eol - 1].as_str());
            0
        }
        _ => 0,
    };

    let inst = match pf {
        TwoRegs => {
            let a2 = string_to_register_or_err(state, &tokens[beg + 1])?;
            encode_rrr(op, ans, ans, a2)
        }
        ThreeRegs => {
            let a1 = string_to_register_or_err(state, &tokens[beg + 1])?;
            let a2 = string_to_register_or_err(state, &tokens[beg + 2])?;
            encode_rrr(op, ans, a1, a2)
        }
        TwoRegsFp | TwoRegsInt | TwoRegsLabel => {
            let a1 = string_to_register_or_err(state, &tokens[beg + 1])?;
            encode_rri(op, ans, a1, immd)
        }
        OneRegFp | OneRegInt | OneRegLabel => encode_rri(op, ans, ans, immd),
        _ => unreachable!(),
    };
    let mut inst = inst.map_err(|e| state.encode_error(e))?;
    if type_identity == TypeIdentity::Fp {
        inst = inst.with(IS_FIXED_POINT_MASK);
    }
    state.add_instruction(inst, label);
    Ok(eol)
}

fn make_generic_memory_access(op: OpCode, state: &mut TextState, tokens: &[String], pos: usize)
    -> Result<usize, AsmError>
{
    use crate::asm::line_parse::ExtendedParamForm::*;
    debug_assert!(op == OpCode::Load || op == OpCode::Save);

    let beg = pos + 1;
    let eol = get_eol(tokens, beg);
    let (pf, npi) = lines_param_form(tokens, beg, eol);

    if pf == OneReg && op == OpCode::Save {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": the dereference pseudo instruction is only available for loading"));
    }

    let mut label = None;
    let inst = match pf {
        // dereference: the register addresses itself
        OneReg => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            encode_rr(op, reg, reg)
        }
        TwoRegs => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let addr_reg = string_to_register_or_err(state, &tokens[beg + 1])?;
            encode_rr(op, reg, addr_reg)
        }
        TwoRegsInt => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let addr_reg = string_to_register_or_err(state, &tokens[beg + 1])?;
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            match encode_immd_int(value) {
                Ok(immd) => encode_rri(op, reg, addr_reg, immd),
                Err(e) => Err(e),
            }
        }
        TwoRegsLabel => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let addr_reg = string_to_register_or_err(state, &tokens[beg + 1])?;
            label = Some(tokens[eol - 1].as_str());
            encode_rri(op, reg, addr_reg, 0)
        }
        // absolute addressing
        OneRegInt => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            let value = match npi {
                NumericParse::Integer(i) => i,
                _ => unreachable!(),
            };
            if value < 0 || value > i64::from(u32::max_value()) {
                return Err(state.make_error(
                    AsmErrorKind::Overflow,
                    format!(": \"{}\" is not a valid absolute address", value)));
            }
            match encode_immd_addr(value as u32) {
                Ok(immd) => encode_ri(op, reg, immd),
                Err(e) => Err(e),
            }
        }
        OneRegLabel => {
            let reg = string_to_register_or_err(state, &tokens[beg])?;
            label = Some(tokens[eol - 1].as_str());
            encode_op_with_pf(op, ParamForm::RegImmd).map(|i| i.with(encode_reg(reg)))
        }
        TwoRegsFp | OneRegFp => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": fixed points are not valid address offsets")),
        _ => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            format!(": {} does not support {} for parameters",
                    op.as_str(), pf.as_str()))),
    };
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, label);
    Ok(eol)
}
