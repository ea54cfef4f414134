use num_bigint::BigInt;
use num_traits::{FromPrimitive, Num, ToPrimitive};

use crate::errors::CalcError;

/// Numeric base for Programmer mode input and display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Base {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Octal => 8,
            Base::Decimal => 10,
            Base::Hexadecimal => 16,
        }
    }

    /// Checks a single character against the base alphabet. Letter digits
    /// are uppercase only: the display never produces lowercase hex.
    pub fn digit_legal(self, c: char) -> bool {
        let v = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='F' => c as u32 - 'A' as u32 + 10,
            _ => return false,
        };
        v < self.radix()
    }
}

/// Interprets a digit string in the given base. Every digit is validated
/// against the base alphabet even though the session already filters
/// input, so a stray illegal digit fails cleanly instead of parsing to
/// garbage. A single leading `-` is accepted.
pub fn digits_to_decimal(digits: &str, base: Base) -> Result<BigInt, CalcError> {
    let (neg, body) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    };
    if body.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    for c in body.chars() {
        if !base.digit_legal(c) {
            return Err(CalcError::InvalidDigit(c, base.radix()));
        }
    }
    let i = BigInt::from_str_radix(body, base.radix())
        .map_err(|_| CalcError::ParseFailed(digits.to_string()))?;
    Ok(if neg { -i } else { i })
}

/// Renders an integer in the given base: uppercase letter digits, no
/// zero-padding, a leading `-` for negative values (no fixed bit width
/// is modeled, so there is no two's-complement wrapping).
pub fn decimal_to_digits(value: &BigInt, base: Base) -> String {
    let s = value.to_str_radix(base.radix());
    if base == Base::Hexadecimal {
        s.to_uppercase()
    } else {
        s
    }
}

pub fn f64_to_int(f: f64) -> Result<BigInt, CalcError> {
    match BigInt::from_f64(f) {
        Some(i) => Ok(i),
        None => Err(CalcError::FloatToInt(f)),
    }
}

pub fn int_to_f64(i: &BigInt) -> Result<f64, CalcError> {
    match i.to_f64() {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(CalcError::IntToFloat(i.to_string())),
    }
}
