use pretty_assertions::assert_eq;

use crate::isa::*;

#[test]
fn integer_immediates_round_trip() {
    for &i in &[0i64, 1, 2, 123, 1234, 0x7FFF, -1, -2, -123, -0x7FFF, -0x8000] {
        let bits = encode_immd_int(i).unwrap();
        let inst = Inst::from_bits(bits);
        assert_eq!(i as i32, decode_immd_int(inst), "immediate {}", i);
    }
}

#[test]
fn minus_one_maps_onto_the_bare_sign_bit() {
    assert_eq!(0x8000, encode_immd_int(-1).unwrap());
}

#[test]
fn out_of_range_integers_do_not_encode() {
    assert!(encode_immd_int(0x8000).is_err());
    assert!(encode_immd_int(-0x8001).is_err());
}

#[test]
fn device_addresses_round_trip() {
    let device_list = [
        RESERVED_NULL, GPU_INPUT_STREAM, GPU_RESPONSE, APU_INPUT_STREAM,
        TIMER_WAIT_AND_SYNC, TIMER_QUERY_SYNC_ET, RANDOM_NUMBER_GENERATOR,
        READ_CONTROLLER, HALT_SIGNAL, BUS_ERROR,
    ];
    for &addr in &device_list {
        let bits = encode_immd_addr(addr).unwrap();
        assert_eq!(addr, decode_immd_addr(Inst::from_bits(bits)),
                   "failed to encode {:?}", device_address_to_str(addr));
    }
    // plain memory addresses survive too
    assert_eq!(0x1234, decode_immd_addr(Inst::from_bits(encode_immd_addr(0x1234).unwrap())));
}

#[test]
fn addresses_above_the_immediate_range_do_not_encode() {
    assert!(encode_immd_addr(0x8000).is_err());
    assert!(encode_immd_addr(0x8000_8000).is_err());
}

#[test]
fn fp_immediates_set_the_flag_and_keep_their_significand() {
    let bits = encode_immd_fp(12.34).unwrap();
    assert!(bits & IS_FIXED_POINT_MASK != 0);
    assert!(bits & 0x7FFF != 0);
    let inst = Inst::from_bits(bits);
    assert!(decode_is_fp(inst));
    // 9/6 precision: within 1/64
    let back = crate::fixed_point::to_f64(decode_immd_fp(inst));
    assert!((back - 12.34).abs() < 1.0 / 64.0 + 1e-9, "got {}", back);
}

#[test]
fn fp_immediates_reject_magnitudes_outside_nine_integer_bits() {
    assert!(encode_immd_fp(512.0).is_err());
    assert!(encode_immd_fp(-512.0).is_err());
    assert!(encode_immd_fp(511.5).is_ok());
}

#[test]
fn fp_immediates_reject_vanishing_significands() {
    assert!(encode_immd_fp(0.0).is_err());
    assert!(encode_immd_fp(0.001).is_err()); // below 1/64
}

#[test]
fn negative_fp_immediates_keep_their_sign() {
    let bits = encode_immd_fp(-1.5).unwrap();
    let decoded = decode_immd_fp(Inst::from_bits(bits));
    assert_eq!(-1.5, crate::fixed_point::to_f64(decoded));
}

#[test]
fn register_slots_are_recovered_exactly() {
    let regs = [Reg::X, Reg::Y, Reg::Z, Reg::A, Reg::B, Reg::C, Reg::SP, Reg::PC];
    for &r0 in &regs {
        for &r1 in &regs {
            for &r2 in &regs {
                let inst = encode_rrr(OpCode::Plus, r0, r1, r2).unwrap();
                assert_eq!(r0, decode_reg0(inst));
                assert_eq!(r1, decode_reg1(inst));
                assert_eq!(r2, decode_reg2(inst));
            }
        }
    }
}

#[test]
fn every_legal_op_pf_pair_round_trips() {
    use crate::isa::OpCode::*;
    use crate::isa::ParamForm::*;
    let r_type = [Plus, Minus, Times, Divide, Modulus, And, Or, Xor, Rotate, Comp];
    for &op in &r_type {
        for &pf in &[RegRegReg, RegRegImmd] {
            let inst = encode_op_with_pf(op, pf).unwrap();
            assert_eq!(Some(op), decode_op_code(inst));
        }
        assert!(encode_op_with_pf(op, Reg).is_err());
    }

    for &pf in &[RegReg, RegImmd, RegRegImmd] {
        let inst = encode_op_with_pf(Set, pf).unwrap();
        assert_eq!(Some(Set), decode_op_code(inst));
    }
    for &op in &[Save, Load] {
        for &pf in &[RegRegImmd, RegReg, RegImmd] {
            let inst = encode_op_with_pf(op, pf).unwrap();
            assert_eq!(Some(op), decode_op_code(inst));
        }
        assert!(encode_op_with_pf(op, Immd).is_err());
    }
    assert!(encode_op_with_pf(Skip, Reg).is_ok());
    assert!(encode_op_with_pf(Skip, RegImmd).is_ok());
    assert!(encode_op_with_pf(Skip, RegRegReg).is_err());
    assert!(encode_op_with_pf(Call, Reg).is_ok());
    assert!(encode_op_with_pf(Call, Immd).is_ok());
    assert!(encode_op_with_pf(Not, Reg).is_ok());
    assert!(encode_op_with_pf(Not, RegReg).is_err());
}

#[test]
fn m_type_param_forms_decode_by_class() {
    let inst = encode_rri(OpCode::Load, Reg::X, Reg::Y, encode_immd_int(4).unwrap()).unwrap();
    assert_eq!(MTypeParamForm::TwoRegsImmd, decode_m_type_pf(inst));
    let inst = encode_rr(OpCode::Load, Reg::X, Reg::Y).unwrap();
    assert_eq!(MTypeParamForm::TwoRegs, decode_m_type_pf(inst));
    let inst = encode_ri(OpCode::Save, Reg::X, encode_immd_addr(HALT_SIGNAL).unwrap()).unwrap();
    assert_eq!(MTypeParamForm::OneRegImmd, decode_m_type_pf(inst));
}

#[test]
fn s_type_param_forms_cover_all_three_set_behaviors() {
    let inst = encode_rr(OpCode::Set, Reg::X, Reg::Y).unwrap();
    assert_eq!(STypeParamForm::TwoRegs, decode_s_type_pf(inst));
    let inst = encode_ri(OpCode::Set, Reg::X, encode_immd_int(1234).unwrap()).unwrap();
    assert_eq!(STypeParamForm::OneRegImmdInt, decode_s_type_pf(inst));
    let inst = encode_rri(OpCode::Set, Reg::X, Reg::Y, encode_immd_int(2).unwrap()).unwrap();
    assert_eq!(STypeParamForm::TwoRegsImmd, decode_s_type_pf(inst));
    let inst = encode_ri(OpCode::Set, Reg::X, encode_immd_fp(1.5).unwrap()).unwrap();
    assert_eq!(STypeParamForm::OneRegImmdFp, decode_s_type_pf(inst));
}

#[test]
fn r_type_param_forms_split_on_the_fp_flag() {
    let rrr = encode_rrr(OpCode::Times, Reg::A, Reg::X, Reg::Y).unwrap();
    assert_eq!(RTypeParamForm::ThreeRegsInt, decode_r_type_pf(rrr));
    let fp_rrr = rrr.with(IS_FIXED_POINT_MASK);
    assert_eq!(RTypeParamForm::ThreeRegsFp, decode_r_type_pf(fp_rrr));
    let rri = encode_rri(OpCode::Times, Reg::A, Reg::X, encode_immd_int(3).unwrap()).unwrap();
    assert_eq!(RTypeParamForm::TwoRegsImmdInt, decode_r_type_pf(rri));
    let fp_rri = encode_rri(OpCode::Times, Reg::A, Reg::X, encode_immd_fp(1.5).unwrap()).unwrap();
    assert_eq!(RTypeParamForm::TwoRegsImmdFp, decode_r_type_pf(fp_rri));
}

#[test]
fn set_with_an_integer_immediate_matches_the_reference_word() {
    let inst = encode_ri(OpCode::Set, Reg::X, encode_immd_int(1234).unwrap()).unwrap();
    assert_eq!(0x04D2, inst.bits() & 0xFFFF);
}
