use pretty_assertions::assert_eq;

use crate::asm::state::*;
use crate::asm::AsmErrorKind;
use crate::isa::{decode_immd_int, encode_rr, encode_ri, encode_reg, encode_op_with_pf,
                 OpCode, ParamForm, Reg};

fn newline() -> String {
    "\n".to_string()
}

#[test]
fn labels_bind_to_the_current_program_location() {
    let mut state = TextState::new();
    state.add_instruction(encode_rr(OpCode::Set, Reg::X, Reg::Y).unwrap(), None);
    let tokens: Vec<String> = vec![":".into(), "hello".into(), newline()];
    let pos = state.process_label(&tokens, 0).unwrap();
    assert_eq!(2, pos);

    // a jump to the label resolves to index 1
    let jump = encode_op_with_pf(OpCode::Set, ParamForm::RegImmd).unwrap()
        .with(encode_reg(Reg::PC));
    state.add_instruction(jump, Some("hello"));
    state.resolve_labels().unwrap();
    assert_eq!(1, decode_immd_int(state.program_data()[1]));
}

#[test]
fn duplicate_labels_are_an_error() {
    let mut state = TextState::new();
    let tokens: Vec<String> = vec![":".into(), "twice".into(), newline(),
                                   ":".into(), "twice".into(), newline()];
    state.process_label(&tokens, 0).unwrap();
    let err = state.process_label(&tokens, 3).unwrap_err();
    assert_eq!(AsmErrorKind::DuplicateLabel, err.kind);
}

#[test]
fn register_names_cannot_be_labels() {
    let mut state = TextState::new();
    let tokens: Vec<String> = vec![":".into(), "sp".into(), newline()];
    let err = state.process_label(&tokens, 0).unwrap_err();
    assert_eq!(AsmErrorKind::BadParameterForm, err.kind);
}

#[test]
fn unresolved_labels_fail_the_second_pass() {
    let mut state = TextState::new();
    let jump = encode_op_with_pf(OpCode::Set, ParamForm::RegImmd).unwrap()
        .with(encode_reg(Reg::PC));
    state.add_instruction(jump, Some("nowhere"));
    let err = state.resolve_labels().unwrap_err();
    assert_eq!(AsmErrorKind::UndefinedLabel, err.kind);
}

#[test]
fn newline_tokens_advance_the_line_counter() {
    let mut state = TextState::new();
    let tokens: Vec<String> = vec![newline(), newline(), "add".into()];
    let mut pos = 0;
    state.handle_newlines(&tokens, &mut pos);
    assert_eq!(2, pos);
    assert_eq!(3, state.current_source_line());
}

#[test]
fn with_assumption_restores_the_previous_set() {
    let mut state = TextState::new();
    state.include_assumption(USING_INT);
    let _ = state.with_assumption(USING_FP, |s| {
        assert!(s.assumptions() & USING_FP != 0);
        assert!(s.assumptions() & USING_INT == 0);
        Ok(0)
    });
    assert!(state.assumptions() & USING_INT != 0);
}

#[test]
fn numeric_assumptions_replace_each_other() {
    let mut state = TextState::new();
    state.include_assumption(USING_FP);
    state.include_assumption(USING_INT);
    assert!(state.assumptions() & USING_INT != 0);
    assert!(state.assumptions() & USING_FP == 0);
    // io save/restore stays untouched by numeric changes
    assert!(state.assumptions() & SAVE_AND_RESTORE_REGISTERS != 0);
    state.include_assumption(NO_ASSUMPTIONS);
    assert!(state.assumptions() & (USING_INT | USING_FP) == 0);
    assert!(state.assumptions() & SAVE_AND_RESTORE_REGISTERS != 0);
}

#[test]
fn fixups_leave_their_immediate_bits_clear() {
    let mut state = TextState::new();
    state.add_instruction(encode_ri(OpCode::Set, Reg::X, 0).unwrap(), Some("later"));
    let tokens: Vec<String> = vec![":".into(), "later".into(), newline()];
    state.process_label(&tokens, 0).unwrap();
    assert_eq!(0, state.program_data()[0].bits() & 0xFFFF);
    state.resolve_labels().unwrap();
    // label is at index 1, so the patched immediate is one
    assert_eq!(1, decode_immd_int(state.program_data()[0]));
}
