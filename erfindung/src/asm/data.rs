//! `data binary [ ... ]` and `data numbers [ ... ]` blocks: raw words
//! appended straight into the program buffer.

use crate::asm::state::TextState;
use crate::asm::{AsmError, AsmErrorKind};
use crate::fixed_point::to_fixed;
use crate::isa::Inst;
use crate::numeric::{parse_number, NumericParse};

#[cfg(test)]
#[path = "./data_test.rs"]
mod data_test;

const BAD_CHAR_MSG: &str =
    ": binary encodings only handle the characters '1', 'x' for one and \
     '_', 'o', '0', '.' for zero";
const SOURCE_ENDED_TOO_SOON_MSG: &str =
    ": source code ended without ending the current data sequence, it must \
     be closed with a \"]\"";

pub(crate) fn process_data(state: &mut TextState, tokens: &[String], pos: usize)
    -> Result<usize, AsmError>
{
    debug_assert!(tokens[pos] == "data");
    let mut pos = pos + 1;
    if pos >= tokens.len() {
        return Err(state.make_error(
            AsmErrorKind::UnclosedDataBlock,
            ": stray data directive found at the end of the source code"));
    }
    let mut numbers = false;
    if tokens[pos] != "[" && tokens[pos] != "\n" {
        match tokens[pos].as_str() {
            "binary" => (),
            "numbers" => numbers = true,
            other => return Err(state.make_error(
                AsmErrorKind::BadParameterForm,
                format!(": encoding scheme \"{}\" not recognized", other))),
        }
        pos += 1;
    }
    state.handle_newlines(tokens, &mut pos);
    if pos >= tokens.len() {
        return Err(state.make_error(
            AsmErrorKind::UnclosedDataBlock, SOURCE_ENDED_TOO_SOON_MSG));
    }
    if tokens[pos] != "[" {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": expected square bracket to indicate the start of data"));
    }
    pos += 1;
    if numbers {
        process_numbers(state, tokens, pos)
    } else {
        process_binary(state, tokens, pos)
    }
}

/// packs '1'/'x' and '_'/'o'/'0'/'.' characters msb-first into 32-bit words
fn process_binary(state: &mut TextState, tokens: &[String], mut pos: usize)
    -> Result<usize, AsmError>
{
    let mut data: Vec<u32> = Vec::new();
    let mut bit_pos = 0u32;
    loop {
        if pos >= tokens.len() {
            return Err(state.make_error(
                AsmErrorKind::UnclosedDataBlock, SOURCE_ENDED_TOO_SOON_MSG));
        }
        let token = &tokens[pos];
        if token == "]" {
            break;
        }
        if token == "\n" {
            state.handle_newlines(tokens, &mut pos);
            continue;
        }
        for c in token.bytes() {
            match c {
                b'1' | b'x' => {
                    if bit_pos == 0 {
                        data.push(0);
                    }
                    if let Some(last) = data.last_mut() {
                        *last |= 1 << (31 - bit_pos);
                    }
                    bit_pos = (bit_pos + 1) % 32;
                }
                b'_' | b'o' | b'0' | b'.' => {
                    if bit_pos == 0 {
                        data.push(0);
                    }
                    bit_pos = (bit_pos + 1) % 32;
                }
                _ => return Err(state.make_error(
                    AsmErrorKind::BadDataCharacter, BAD_CHAR_MSG)),
            }
        }
        pos += 1;
    }
    if bit_pos != 0 {
        return Err(state.make_error(
            AsmErrorKind::MisalignedDataBlock,
            format!(": all data sequences must be divisible by 32 bits, this \
                     data sequence is off by {} bits", 32 - bit_pos)));
    }
    for datum in data {
        state.add_instruction(Inst::from_bits(datum), None);
    }
    Ok(pos + 1)
}

fn process_numbers(state: &mut TextState, tokens: &[String], mut pos: usize)
    -> Result<usize, AsmError>
{
    let mut data: Vec<u32> = Vec::new();
    loop {
        if pos >= tokens.len() {
            return Err(state.make_error(
                AsmErrorKind::UnclosedDataBlock, SOURCE_ENDED_TOO_SOON_MSG));
        }
        let token = &tokens[pos];
        if token == "]" {
            break;
        }
        if token == "\n" {
            state.handle_newlines(tokens, &mut pos);
            continue;
        }
        match parse_number(token) {
            NumericParse::Integer(i) => {
                if i < i64::from(i32::min_value()) || i > i64::from(u32::max_value()) {
                    return Err(state.make_error(
                        AsmErrorKind::Overflow,
                        format!(": \"{}\" does not fit in one word", token)));
                }
                data.push(i as u32);
            }
            NumericParse::Decimal(d) => {
                let fp = to_fixed(d).map_err(|_| state.make_error(
                    AsmErrorKind::Overflow,
                    format!(": \"{}\" is outside the fixed point range", token)))?;
                data.push(fp);
            }
            NumericParse::NotNumeric => return Err(state.make_error(
                AsmErrorKind::BadDataCharacter,
                ": all entries in the data sequence must be numeric")),
        }
        pos += 1;
    }
    for datum in data {
        state.add_instruction(Inst::from_bits(datum), None);
    }
    Ok(pos + 1)
}
