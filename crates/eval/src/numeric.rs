//! Decimal arithmetic and text-to-number coercion.
//!
//! All arithmetic uses `rust_decimal::Decimal` with checked operations.
//! There is no `f64` anywhere in the evaluation path.

use std::str::FromStr;

use relocost_core::BinaryOp;
use rust_decimal::Decimal;

use crate::error::EvalError;

/// Parse a table cell as a number.
///
/// Thousands separators, currency and percent signs (`,` `$` `%`) are
/// stripped first, so `"$1,250.50"` is 1250.50 and `"15%"` is 15. Returns
/// `None` for empty or non-numeric text.
pub fn coerce_numeric(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .ok()
}

/// Canonical text of a lookup key: no trailing zeros, so `1.0` matches `"1"`.
pub fn canonical_key(key: Decimal) -> String {
    key.normalize().to_string()
}

/// Whether a key cell matches `key`, textually or numerically.
pub fn key_matches(cell: &str, key: Decimal) -> bool {
    if cell == canonical_key(key) {
        return true;
    }
    match Decimal::from_str(cell.trim()) {
        Ok(n) => n == key,
        Err(_) => false,
    }
}

/// Apply a binary operator with overflow and division-by-zero checks.
pub fn apply(op: BinaryOp, left: Decimal, right: Decimal) -> Result<Decimal, EvalError> {
    let result = match op {
        BinaryOp::Add => left.checked_add(right),
        BinaryOp::Sub => left.checked_sub(right),
        BinaryOp::Mul => left.checked_mul(right),
        BinaryOp::Div => {
            if right.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            left.checked_div(right)
        }
    };
    result.ok_or_else(|| EvalError::Overflow {
        message: format!("{} {} {}", left, op, right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn coerce_strips_currency_and_separators() {
        assert_eq!(coerce_numeric("$1,250.50"), Some(dec("1250.50")));
        assert_eq!(coerce_numeric("15%"), Some(dec("15")));
        assert_eq!(coerce_numeric(" 42 "), Some(dec("42")));
        assert_eq!(coerce_numeric("-3.5"), Some(dec("-3.5")));
    }

    #[test]
    fn coerce_accepts_exponents() {
        assert_eq!(coerce_numeric("1e3"), Some(dec("1000")));
    }

    #[test]
    fn coerce_rejects_text() {
        assert_eq!(coerce_numeric("n/a"), None);
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("$"), None);
    }

    #[test]
    fn keys_match_textually_or_numerically() {
        assert!(key_matches("1", dec("1")));
        assert!(key_matches("1", dec("1.00")));
        assert!(key_matches("1.0", dec("1")));
        assert!(key_matches(" 2 ", dec("2")));
        assert!(!key_matches("2", dec("1")));
        assert!(!key_matches("one", dec("1")));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            apply(BinaryOp::Div, dec("5"), Decimal::ZERO),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let err = apply(BinaryOp::Mul, Decimal::MAX, dec("2")).unwrap_err();
        assert!(matches!(err, EvalError::Overflow { .. }));
    }

    #[test]
    fn exact_decimal_arithmetic() {
        assert_eq!(apply(BinaryOp::Add, dec("0.1"), dec("0.2")), Ok(dec("0.3")));
        assert_eq!(apply(BinaryOp::Mul, dec("1000"), dec("0.3")), Ok(dec("300")));
    }
}
