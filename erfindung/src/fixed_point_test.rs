use pretty_assertions::assert_eq;

use crate::fixed_point::*;

const MAX_ERROR: f64 = 0.00002;

fn assert_round_trip(value: f64) {
    let fp = to_fixed(value).unwrap();
    let out = to_f64(fp);
    assert!((out - value).abs() < MAX_ERROR,
            "round trip of {} produced {} (encoded {:08X})", value, out, fp);
}

#[test]
fn round_trips_within_a_fraction_step() {
    for &v in &[2.0, -1.0, 10.0, 0.1, -10.0, -0.1, 32767.0, -32767.0,
                0.00001525878, -0.00001525878, 32767.9999923706, -32767.9999923706] {
        assert_round_trip(v);
    }
}

#[test]
fn zero_has_a_canonical_encoding() {
    assert_eq!(0, to_fixed(0.0).unwrap());
    assert_eq!(0.0, to_f64(0));
}

#[test]
fn out_of_range_values_overflow() {
    assert_eq!(Err(FixedPointError::Overflow), to_fixed(32768.0));
    assert_eq!(Err(FixedPointError::Overflow), to_fixed(-1.0e9));
    assert_eq!(Err(FixedPointError::Overflow), to_fixed(std::f64::INFINITY));
}

fn check_op(a: f64, b: f64, expected: f64, res: u32) {
    let out = to_f64(res);
    assert!((out - expected).abs() < MAX_ERROR,
            "{} op {} gave {}, expected {}", a, b, out, expected);
}

#[test]
fn multiplies_like_doubles() {
    for &(a, b) in &[(2.0, 2.0), (-1.0, 1.0), (10.0, 10.0), (100.0, 100.0),
                     (0.5, 0.5), (1.1, 1.1), (200.0, 0.015625)] {
        let res = fp_multiply(to_fixed(a).unwrap(), to_fixed(b).unwrap());
        check_op(a, b, a * b, res);
    }
}

#[test]
fn divides_like_doubles() {
    for &(a, b) in &[(2.0, 1.0), (2.0, 4.0), (10.0, 3.0), (2.0, 0.5),
                     (0.5, 2.0), (1.1, 1.1)] {
        let res = fp_divide(to_fixed(a).unwrap(), to_fixed(b).unwrap()).unwrap();
        check_op(a, b, a / b, res);
    }
}

#[test]
fn divide_by_zero_magnitude_fails() {
    let one = to_fixed(1.0).unwrap();
    assert_eq!(Err(FixedPointError::DivideByZero), fp_divide(one, 0));
    assert_eq!(Err(FixedPointError::DivideByZero), fp_divide(one, 0x8000_0000));
}

#[test]
fn zero_numerator_divides_to_zero() {
    let three = to_fixed(3.0).unwrap();
    assert_eq!(Ok(0), fp_divide(0, three));
}

#[test]
fn multiply_sign_is_the_xor_of_the_operand_signs() {
    let values = [0.25, 1.0, 1.5, 12.34, 100.0, 1024.5];
    for &a in &values {
        for &b in &values {
            for &(sa, sb) in &[(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                let fa = to_fixed(a * sa).unwrap();
                let fb = to_fixed(b * sb).unwrap();
                let expect_neg = (sa < 0.0) != (sb < 0.0);
                let res = fp_multiply(fa, fb);
                assert_eq!(expect_neg, res & 0x8000_0000 != 0,
                           "sign of {} * {}", a * sa, b * sb);
            }
        }
    }
}

#[test]
fn inverse_is_division_into_one() {
    let four = to_fixed(4.0).unwrap();
    let inv = fp_inverse(four).unwrap();
    assert!((to_f64(inv) - 0.25).abs() < MAX_ERROR);
    assert_eq!(Err(FixedPointError::DivideByZero), fp_inverse(0));
}

#[test]
fn remainder_matches_the_quotient_identity() {
    // n - (q with fraction cleared)*d
    let n = to_fixed(10.0).unwrap();
    let d = to_fixed(3.0).unwrap();
    let q = fp_divide(n, d).unwrap();
    let r = fp_remainder(q, d, n);
    check_op(10.0, 3.0, 1.0, r);
}

#[test]
fn compares_in_sign_magnitude_order() {
    let one = to_fixed(1.0).unwrap();
    let two = to_fixed(2.0).unwrap();
    let neg_one = to_fixed(-1.0).unwrap();
    let neg_two = to_fixed(-2.0).unwrap();

    assert_eq!(COMP_EQUAL_MASK, fp_compare(one, one));
    assert_eq!(COMP_LESS_THAN_MASK | COMP_NOT_EQUAL_MASK, fp_compare(one, two));
    assert_eq!(COMP_GREATER_THAN_MASK | COMP_NOT_EQUAL_MASK, fp_compare(two, one));
    // a negative is always below a positive
    assert_eq!(COMP_LESS_THAN_MASK | COMP_NOT_EQUAL_MASK, fp_compare(neg_one, one));
    assert_eq!(COMP_GREATER_THAN_MASK | COMP_NOT_EQUAL_MASK, fp_compare(one, neg_one));
    // larger magnitude is more negative
    assert_eq!(COMP_LESS_THAN_MASK | COMP_NOT_EQUAL_MASK, fp_compare(neg_two, neg_one));
    // negative zero equals zero
    assert_eq!(COMP_EQUAL_MASK, fp_compare(0x8000_0000, 0));
}

#[test]
fn integer_compare_uses_twos_complement_order() {
    assert_eq!(COMP_EQUAL_MASK, int_compare(5, 5));
    assert_eq!(COMP_LESS_THAN_MASK | COMP_NOT_EQUAL_MASK, int_compare(3, 5));
    assert_eq!(COMP_GREATER_THAN_MASK | COMP_NOT_EQUAL_MASK, int_compare(5, 3));
    let neg_one = (-1i32) as u32;
    assert_eq!(COMP_LESS_THAN_MASK | COMP_NOT_EQUAL_MASK, int_compare(neg_one, 0));
}
