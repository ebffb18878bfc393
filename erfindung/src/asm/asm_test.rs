use pretty_assertions::assert_eq;

use crate::asm::{Assembler, AsmErrorKind};
use crate::isa::*;

#[test]
fn a_small_program_assembles_to_the_expected_words() {
    let source = "     = x 1.0 # hello there\n     = y 1.44\n:inc + x y x\n     = pc inc";
    let mut asmr = Assembler::new();
    asmr.assemble_from_string(source).unwrap();
    let pdata = asmr.program_data();
    assert_eq!(4, pdata.len());
    assert_eq!(encode_ri(OpCode::Set, Reg::X, encode_immd_fp(1.0).unwrap()).unwrap(),
               pdata[0]);
    assert_eq!(encode_ri(OpCode::Set, Reg::Y, encode_immd_fp(1.44).unwrap()).unwrap(),
               pdata[1]);
    assert_eq!(encode_rrr(OpCode::Plus, Reg::X, Reg::Y, Reg::X).unwrap(), pdata[2]);
    assert_eq!(encode_ri(OpCode::Set, Reg::PC, encode_immd_int(2).unwrap()).unwrap(),
               pdata[3]);
}

#[test]
fn the_line_map_tracks_every_emitted_instruction() {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string("set x 1\n\n# comment\nset y 2\npush a b").unwrap();
    assert_eq!(Some(1), asmr.translate_to_line_number(0));
    assert_eq!(Some(4), asmr.translate_to_line_number(1));
    // the push expansion owns three instructions on line 5
    assert_eq!(Some(5), asmr.translate_to_line_number(2));
    assert_eq!(Some(5), asmr.translate_to_line_number(4));
    assert_eq!(None, asmr.translate_to_line_number(5));
}

#[test]
fn errors_carry_the_right_source_line() {
    let mut asmr = Assembler::new();
    let err = asmr.assemble_from_string("set x 1\n# note\n\nset x 99999").unwrap_err();
    assert_eq!(AsmErrorKind::Overflow, err.kind);
    assert_eq!(4, err.line);
}

#[test]
fn a_failed_assembly_keeps_no_partial_program() {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string("set x 1").unwrap();
    assert!(asmr.assemble_from_string("set x 1\nbogus y").is_err());
    assert!(asmr.program_data().is_empty());
}

#[test]
fn debug_info_snapshots_the_line_map() {
    let mut asmr = Assembler::new();
    asmr.assemble_from_string("set x 1\nset y 2").unwrap();
    assert_eq!(vec![1, 2], asmr.debug_info().inst_to_line);
}

#[test]
fn case_is_insignificant() {
    let mut lower = Assembler::new();
    lower.assemble_from_string("set x 10\nadd x y").unwrap();
    let mut upper = Assembler::new();
    upper.assemble_from_string("SET X 10\nADD X Y").unwrap();
    assert_eq!(lower.program_data(), upper.program_data());
}
