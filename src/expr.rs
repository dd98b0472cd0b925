//! Size-expression evaluation.
//!
//! Array bounds and range bounds may be written as `2^N` or `2^N-1` shorthand. The
//! evaluator never fails outright: a malformed expression yields value `0` alongside
//! the error, so the caller still runs its own size checks and reports their
//! consequence as well.

use thiserror::Error;

/// Largest accepted exponent.
pub const MAX_EXPONENT: u64 = 32;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("Exponent out of range")]
    ExponentOutOfRange,
    #[error("Bad exponent")]
    BadExponent,
    #[error("Number out of range")]
    NumberOutOfRange,
}

/// Result of evaluating a size expression: always a concrete value, plus the error
/// that forced it to zero, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluated {
    pub value: u64,
    pub error: Option<EvalError>,
}

impl Evaluated {
    pub fn ok(value: u64) -> Self {
        Evaluated { value, error: None }
    }

    pub fn failed(error: EvalError) -> Self {
        Evaluated { value: 0, error: Some(error) }
    }

}

/// Parse a decimal or `0x` hexadecimal integer literal.
pub fn parse_int(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Evaluate a decimal or hexadecimal literal; values past `u64::MAX` are out of range.
pub fn evaluate_literal(text: &str) -> Evaluated {
    match parse_int(text) {
        Some(value) => Evaluated::ok(value),
        None => Evaluated::failed(EvalError::NumberOutOfRange),
    }
}

/// Evaluate a power literal `base^exponent[-subtrahend]`.
///
/// Accepted forms are byte-aligned powers of two: base `2`, exponent a multiple of 8
/// no larger than [`MAX_EXPONENT`], subtrahend (when present) exactly `1`.
pub fn evaluate_power(text: &str) -> Evaluated {
    let Some((base, rest)) = text.split_once('^') else {
        return Evaluated::failed(EvalError::BadExponent);
    };
    let (exponent, subtrahend) = match rest.split_once('-') {
        Some((e, s)) => (e, Some(s)),
        None => (rest, None),
    };

    let exponent = match exponent.parse::<u64>() {
        Ok(e) if e <= MAX_EXPONENT => e,
        _ => return Evaluated::failed(EvalError::ExponentOutOfRange),
    };
    if base != "2" || exponent % 8 != 0 {
        return Evaluated::failed(EvalError::BadExponent);
    }
    let power = 1u64 << exponent;
    match subtrahend {
        None => Evaluated::ok(power),
        Some("1") => Evaluated::ok(power - 1),
        Some(_) => Evaluated::failed(EvalError::BadExponent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_aligned_powers() {
        assert_eq!(evaluate_power("2^8-1"), Evaluated::ok(255));
        assert_eq!(evaluate_power("2^16-1"), Evaluated::ok(65535));
        assert_eq!(evaluate_power("2^24"), Evaluated::ok(1 << 24));
        assert_eq!(evaluate_power("2^32-1"), Evaluated::ok(u32::MAX as u64));
    }

    #[test]
    fn zero_exponent_evaluates_to_zero_without_error() {
        let e = evaluate_power("2^0-1");
        assert_eq!(e, Evaluated::ok(0));
    }

    #[test]
    fn exponent_out_of_range() {
        assert_eq!(
            evaluate_power("2^33-1"),
            Evaluated::failed(EvalError::ExponentOutOfRange)
        );
        assert_eq!(
            evaluate_power("2^99999999999999999999"),
            Evaluated::failed(EvalError::ExponentOutOfRange)
        );
    }

    #[test]
    fn bad_exponent_forms() {
        for text in ["2^3-1", "2^3-2", "2^8-2", "3^8", "10^16-1"] {
            let e = evaluate_power(text);
            assert_eq!(e.error, Some(EvalError::BadExponent), "{}", text);
            assert_eq!(e.value, 0);
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(EvalError::ExponentOutOfRange.to_string(), "Exponent out of range");
        assert_eq!(EvalError::BadExponent.to_string(), "Bad exponent");
    }

    #[test]
    fn integer_literals() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("99999999999999999999999"), None);
    }

    #[test]
    fn oversized_literal_evaluates_to_zero() {
        assert_eq!(evaluate_literal("18446744073709551615"), Evaluated::ok(u64::MAX));
        assert_eq!(
            evaluate_literal("18446744073709551616"),
            Evaluated::failed(EvalError::NumberOutOfRange)
        );
        assert_eq!(
            evaluate_literal("0x10000000000000000"),
            Evaluated::failed(EvalError::NumberOutOfRange)
        );
        assert_eq!(EvalError::NumberOutOfRange.to_string(), "Number out of range");
    }
}
