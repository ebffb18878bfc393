use pretty_assertions::assert_eq;

use crate::asm::{Assembler, AsmErrorKind};
use crate::fixed_point::to_fixed;

fn assemble(source: &str) -> Assembler {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string(source).unwrap();
    asmr
}

fn assemble_err(source: &str) -> AsmErrorKind {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string(source).unwrap_err().kind
}

#[test]
fn packs_binary_blocks_msb_first() {
    let asmr = assemble("data binary [ ____xxxx ____x_xxx___x__x xx__x_x_ ]");
    assert_eq!(1, asmr.program_data().len());
    assert_eq!(252_414_410, asmr.program_data()[0].bits());
}

#[test]
fn binary_blocks_span_lines() {
    let asmr = assemble("data binary [\n____xxxxxx__x_x_\n___x_xxx____x__x\n]");
    assert_eq!(1, asmr.program_data().len());
    assert_eq!(264_902_409, asmr.program_data()[0].bits());
}

#[test]
fn the_encoding_name_is_optional() {
    let asmr = assemble("data [ xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx ]");
    assert_eq!(0xFFFF_FFFF, asmr.program_data()[0].bits());
}

#[test]
fn zeros_have_four_spellings() {
    let asmr = assemble("data binary [ _o0._o0. _o0._o0. _o0._o0. _o0._o0. ]");
    assert_eq!(0, asmr.program_data()[0].bits());
}

#[test]
fn incomplete_packs_are_misaligned() {
    assert_eq!(AsmErrorKind::MisalignedDataBlock,
               assemble_err("data binary [ xxxx ]"));
}

#[test]
fn unclosed_blocks_are_detected() {
    assert_eq!(AsmErrorKind::UnclosedDataBlock,
               assemble_err("data binary [ xxxx"));
    assert_eq!(AsmErrorKind::UnclosedDataBlock, assemble_err("data"));
}

#[test]
fn stray_characters_are_rejected(){
    assert_eq!(AsmErrorKind::BadDataCharacter,
               assemble_err("data binary [ xyzw ]"));
}

#[test]
fn number_blocks_accept_integers_and_fixed_points() {
    let asmr = assemble("data numbers [ 1 -1 0x10 2.5 ]");
    let words = asmr.program_data();
    assert_eq!(1, words[0].bits());
    assert_eq!((-1i32) as u32, words[1].bits());
    assert_eq!(0x10, words[2].bits());
    assert_eq!(to_fixed(2.5).unwrap(), words[3].bits());
}

#[test]
fn number_blocks_reject_non_numbers() {
    assert_eq!(AsmErrorKind::BadDataCharacter,
               assemble_err("data numbers [ pears ]"));
}

#[test]
fn unknown_encodings_are_rejected() {
    assert_eq!(AsmErrorKind::BadParameterForm,
               assemble_err("data strings [ x ]"));
}
