//! The `io` pseudo instruction mini-language. Every form expands into
//! plain SET/SAVE/LOAD/PLUS/MINUS sequences against the memory mapped
//! device streams; there is no runtime dispatch.

use crate::asm::line_parse::{get_eol, string_to_register_or_err};
use crate::asm::state::{TextState, SAVE_AND_RESTORE_REGISTERS};
use crate::asm::{AsmError, AsmErrorKind};
use crate::isa::*;
use crate::numeric::{parse_number, NumericParse};

#[cfg(test)]
#[path = "./io_line_test.rs"]
mod io_line_test;

pub(crate) fn make_sysio(state: &mut TextState, tokens: &[String], pos: usize)
    -> Result<usize, AsmError>
{
    let sub = pos + 1;
    if sub >= tokens.len() || tokens[sub] == "\n" {
        return Err(state.make_error(
            AsmErrorKind::UnknownMnemonic, ": io requires a sub operation"));
    }
    match tokens[sub].as_str() {
        "read" => make_io_read(state, tokens, sub),
        "upload" => make_io_gpu_command(state, tokens, sub, GPU_CMD_UPLOAD),
        "draw" => make_io_gpu_command(state, tokens, sub, GPU_CMD_DRAW),
        "clear" => make_io_clear_screen(state, tokens, sub),
        "halt" => make_io_halt(state, tokens, sub),
        "wait" => make_io_wait(state, tokens, sub),
        "triangle" | "pulse" | "noise" => make_io_apu_inst(state, tokens, sub),
        other => Err(state.make_error(
            AsmErrorKind::UnknownMnemonic,
            format!(": io contains no sub operation \"{}\"", other))),
    }
}

fn addr_immd(state: &TextState, address: u32) -> Result<u32, AsmError> {
    encode_immd_addr(address).map_err(|e| state.encode_error(e))
}

fn int_immd(state: &TextState, value: i64) -> Result<u32, AsmError> {
    encode_immd_int(value).map_err(|e| state.encode_error(e))
}

fn push_inst(state: &mut TextState, inst: Result<Inst, EncodeError>)
    -> Result<(), AsmError>
{
    let inst = inst.map_err(|e| state.encode_error(e))?;
    state.add_instruction(inst, None);
    Ok(())
}

/// writes a command identity word to a device stream through a scratch
/// register; `preserve` round-trips the old register value over the stack
fn emit_command_id(state: &mut TextState, device_address: u32, command: u32,
                   scratch: Reg, preserve: bool) -> Result<(), AsmError>
{
    let one = int_immd(state, 1)?;
    if preserve {
        push_inst(state, encode_rri(OpCode::Plus, Reg::SP, Reg::SP, one))?;
        push_inst(state, encode_rr(OpCode::Save, scratch, Reg::SP))?;
    }
    let command_immd = int_immd(state, i64::from(command))?;
    push_inst(state, encode_ri(OpCode::Set, scratch, command_immd))?;
    let device_immd = addr_immd(state, device_address)?;
    push_inst(state, encode_ri(OpCode::Save, scratch, device_immd))?;
    if preserve {
        push_inst(state, encode_rr(OpCode::Load, scratch, Reg::SP))?;
        push_inst(state, encode_rri(OpCode::Minus, Reg::SP, Reg::SP, one))?;
    }
    Ok(())
}

fn make_io_read(state: &mut TextState, tokens: &[String], beg: usize)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg + 1);
    let src = beg + 1;
    if src >= eol {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm, ": read expects a source device"));
    }
    let source_address = match tokens[src].as_str() {
        "controller" => READ_CONTROLLER,
        "timer" => TIMER_QUERY_SYNC_ET,
        "random" => RANDOM_NUMBER_GENERATOR,
        "gpu" => GPU_RESPONSE,
        "bus-error" => BUS_ERROR,
        other => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            format!(": \"{}\" is not a valid source", other))),
    };
    if eol - (src + 1) < 1 {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": no parameters were given, read expects at least one register"));
    }
    let device_immd = addr_immd(state, source_address)?;
    for i in src + 1..eol {
        let reg = string_to_register_or_err(state, &tokens[i])?;
        push_inst(state, encode_ri(OpCode::Load, reg, device_immd))?;
    }
    Ok(eol)
}

fn make_io_gpu_command(state: &mut TextState, tokens: &[String], beg: usize, command: u32)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg + 1);
    if eol - (beg + 1) != 3 {
        let message = if command == GPU_CMD_UPLOAD {
            ": upload expects exactly three arguments: the width, height and address"
        } else {
            ": draw expects exactly three arguments: the x, y and sprite index"
        };
        return Err(state.make_error(AsmErrorKind::BadParameterForm, message));
    }
    let mut args = [Reg::X; 3];
    for (i, arg) in args.iter_mut().enumerate() {
        *arg = string_to_register_or_err(state, &tokens[beg + 1 + i])?;
    }
    // the scratch register doubles as a payload, its value must survive
    emit_command_id(state, GPU_INPUT_STREAM, command, args[0], true)?;
    let device_immd = addr_immd(state, GPU_INPUT_STREAM)?;
    for &arg in &args {
        push_inst(state, encode_ri(OpCode::Save, arg, device_immd))?;
    }
    Ok(eol)
}

fn make_io_clear_screen(state: &mut TextState, tokens: &[String], beg: usize)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg + 1);
    if eol - (beg + 1) != 1 {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": clear screen needs exactly one register argument for the \
             emitted save instruction"));
    }
    let reg = string_to_register_or_err(state, &tokens[beg + 1])?;
    let preserve = state.assumptions() & SAVE_AND_RESTORE_REGISTERS != 0;
    emit_command_id(state, GPU_INPUT_STREAM, GPU_CMD_CLEAR, reg, preserve)?;
    Ok(eol)
}

fn make_io_halt(state: &mut TextState, tokens: &[String], beg: usize)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg + 1);
    if eol - (beg + 1) != 1 {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": halt io command must have exactly one register argument"));
    }
    let reg = string_to_register_or_err(state, &tokens[beg + 1])?;
    let one = int_immd(state, 1)?;
    push_inst(state, encode_ri(OpCode::Set, reg, one))?;
    let device_immd = addr_immd(state, HALT_SIGNAL)?;
    push_inst(state, encode_ri(OpCode::Save, reg, device_immd))?;
    Ok(eol)
}

fn make_io_wait(state: &mut TextState, tokens: &[String], beg: usize)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg + 1);
    if eol - (beg + 1) != 1 {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": wait io command must have exactly one register argument"));
    }
    let reg = string_to_register_or_err(state, &tokens[beg + 1])?;
    let device_immd = addr_immd(state, TIMER_WAIT_AND_SYNC)?;
    push_inst(state, encode_ri(OpCode::Save, reg, device_immd))?;
    Ok(eol)
}

/// `io <channel> <note|tempo|duty-cycle-window> reg [value]` writes the
/// channel, rate type and value words to the apu stream in order
fn make_io_apu_inst(state: &mut TextState, tokens: &[String], beg: usize)
    -> Result<usize, AsmError>
{
    let eol = get_eol(tokens, beg);
    let mut cur = beg;
    let channel = match tokens[cur].as_str() {
        "triangle" => Channel::Triangle,
        "noise" => Channel::Noise,
        "pulse" => {
            cur += 1;
            if cur >= eol {
                return Err(state.make_error(
                    AsmErrorKind::BadParameterForm,
                    ": pulse channels are \"one\" and \"two\""));
            }
            match tokens[cur].as_str() {
                "one" => Channel::PulseOne,
                "two" => Channel::PulseTwo,
                other => return Err(state.make_error(
                    AsmErrorKind::BadParameterForm,
                    format!(": \"{}\" is not a valid pulse channel", other))),
            }
        }
        other => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            format!(": \"{}\" is not a valid channel", other))),
    };
    cur += 1;
    if cur >= eol {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": expected a channel command: note, tempo or duty-cycle-window"));
    }
    let rate_type = match tokens[cur].as_str() {
        "note" => ApuRateType::Note,
        "tempo" => ApuRateType::Tempo,
        "duty-cycle-window" => ApuRateType::DutyCycleWindow,
        other => return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            format!(": channel command \"{}\" is not recognized", other))),
    };
    cur += 1;
    if cur >= eol {
        return Err(state.make_error(
            AsmErrorKind::BadParameterForm,
            ": expected a register carrying the value to write"));
    }
    let reg = string_to_register_or_err(state, &tokens[cur])?;
    cur += 1;

    // optional explicit value loaded into the register first
    if cur < eol {
        if eol - cur != 1 {
            return Err(state.make_error(
                AsmErrorKind::BadParameterForm, ": too many arguments"));
        }
        match parse_number(&tokens[cur]) {
            NumericParse::Integer(i) => {
                let immd = int_immd(state, i)?;
                push_inst(state, encode_ri(OpCode::Set, reg, immd))?;
            }
            NumericParse::Decimal(_) => return Err(state.make_error(
                AsmErrorKind::BadParameterForm,
                ": decimal values are not supported for apu io, though you \
                 could write one directly with a save instruction yourself")),
            NumericParse::NotNumeric => {
                let inst = encode_op_with_pf(OpCode::Set, ParamForm::RegImmd)
                    .map(|i| i.with(encode_reg(reg)))
                    .map_err(|e| state.encode_error(e))?;
                state.add_instruction(inst, Some(tokens[cur].as_str()));
            }
        }
    }

    // the register is the payload, so the channel and type words go out
    // through a stack stash of it
    let one = int_immd(state, 1)?;
    let apu_immd = addr_immd(state, APU_INPUT_STREAM)?;
    push_inst(state, encode_rri(OpCode::Plus, Reg::SP, Reg::SP, one))?;
    push_inst(state, encode_rr(OpCode::Save, reg, Reg::SP))?;
    let channel_immd = int_immd(state, i64::from(channel.bits()))?;
    push_inst(state, encode_ri(OpCode::Set, reg, channel_immd))?;
    push_inst(state, encode_ri(OpCode::Save, reg, apu_immd))?;
    let type_immd = int_immd(state, i64::from(rate_type.bits()))?;
    push_inst(state, encode_ri(OpCode::Set, reg, type_immd))?;
    push_inst(state, encode_ri(OpCode::Save, reg, apu_immd))?;
    push_inst(state, encode_rr(OpCode::Load, reg, Reg::SP))?;
    push_inst(state, encode_rri(OpCode::Minus, Reg::SP, Reg::SP, one))?;
    push_inst(state, encode_ri(OpCode::Save, reg, apu_immd))?;
    Ok(eol)
}
