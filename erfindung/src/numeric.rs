//! Numeric literal parsing for the assembler: decimal, hex (`0x`) and
//! binary (`0b`) integers plus decimal fixed point literals with a single
//! `.`. Digits are read right to left, mirroring how the values are
//! accumulated into a word.

#[cfg(test)]
#[path = "./numeric_test.rs"]
mod numeric_test;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericParse {
    Integer(i64),
    Decimal(f64),
    NotNumeric,
}

impl NumericParse {
    pub fn is_numeric(self) -> bool {
        match self {
            NumericParse::NotNumeric => false,
            _ => true,
        }
    }
}

/// classifies and parses a token in one pass: an optional leading `-`,
/// an optional `0x`/`0b` base prefix, and a `.` selecting fixed point
pub fn parse_number(token: &str) -> NumericParse {
    let (digits, base, is_neg) = match split_prefix(token) {
        Some(parts) => parts,
        None => return NumericParse::NotNumeric,
    };
    if digits.contains('.') {
        match string_to_decimal(digits, base) {
            Some(d) => NumericParse::Decimal(if is_neg { -d } else { d }),
            None => NumericParse::NotNumeric,
        }
    } else {
        match string_to_integer(digits, base) {
            Some(i) => NumericParse::Integer(if is_neg { -i } else { i }),
            None => NumericParse::NotNumeric,
        }
    }
}

fn split_prefix(token: &str) -> Option<(&str, u32, bool)> {
    let mut rest = token;
    let is_neg = rest.starts_with('-');
    if is_neg {
        rest = &rest[1..];
    }
    let base: u32 = if rest.starts_with("0x") {
        rest = &rest[2..];
        16
    } else if rest.starts_with("0b") {
        rest = &rest[2..];
        2
    } else {
        10
    };
    // at least one real digit required
    if rest.bytes().any(|c| c != b'.') {
        Some((rest, base, is_neg))
    } else {
        None
    }
}

fn digit_value(c: u8, base: u32) -> Option<u32> {
    let v = match c {
        b'0'..=b'9' => u32::from(c - b'0'),
        b'a'..=b'f' => u32::from(c - b'a') + 10,
        _ => return None,
    };
    if v < base { Some(v) } else { None }
}

/// right-to-left integer accumulation; a fractional part is permitted and
/// rounds to nearest by weighing the first fraction digit against base/2
pub fn string_to_integer(digits: &str, base: u32) -> Option<i64> {
    let mut working: i64 = 0;
    let mut multi: i64 = 1;
    let mut adder: i64 = 0;
    let mut found_dot = false;
    for &c in digits.as_bytes().iter().rev() {
        if c == b'.' {
            if found_dot {
                return None;
            }
            found_dot = true;
            working = if adder >= i64::from(base) / 2 { 1 } else { 0 };
            multi = 1;
            adder = 0;
            continue;
        }
        adder = i64::from(digit_value(c, base)?);
        working = working.checked_add(adder.checked_mul(multi)?)?;
        multi = multi.checked_mul(i64::from(base))?;
    }
    Some(working)
}

pub fn string_to_decimal(digits: &str, base: u32) -> Option<f64> {
    let mut working = 0.0f64;
    let mut multi = 1.0f64;
    let mut found_dot = false;
    for &c in digits.as_bytes().iter().rev() {
        if c == b'.' {
            if found_dot {
                return None;
            }
            found_dot = true;
            working /= multi;
            multi = 1.0;
            continue;
        }
        working += f64::from(digit_value(c, base)?) * multi;
        multi *= f64::from(base);
    }
    if working.is_finite() { Some(working) } else { None }
}
