//! arbitrary-base numerals
//!
//! share values arrive as digit strings in any base from 2 to 36 using the
//! alphabet `0-9` then `a-z` (case-insensitive). values routinely exceed
//! native integer widths, so everything decodes straight into a `BigUint`.

use num_bigint::BigUint;

use crate::{Error, Result};

/// smallest supported base
pub const MIN_BASE: u32 = 2;

/// largest supported base (`0-9` + `a-z`)
pub const MAX_BASE: u32 = 36;

fn check_base(base: u32) -> Result<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(Error::InvalidBase(base))
    }
}

/// decode a digit string in `base` into an exact non-negative integer
pub fn decode(raw: &str, base: u32) -> Result<BigUint> {
    check_base(base)?;
    if raw.is_empty() {
        return Err(Error::EmptyNumeral);
    }

    let digits = raw
        .chars()
        .enumerate()
        .map(|(position, digit)| {
            digit
                .to_digit(base)
                .map(|d| d as u8)
                .ok_or(Error::InvalidDigit {
                    digit,
                    position,
                    base,
                })
        })
        .collect::<Result<Vec<u8>>>()?;

    BigUint::from_radix_be(&digits, base).ok_or(Error::InvalidBase(base))
}

/// encode `value` as a lowercase digit string in `base`
///
/// inverse of [`decode`]; used to build fixtures and by the cli.
pub fn encode(value: &BigUint, base: u32) -> Result<String> {
    check_base(base)?;
    Ok(value.to_str_radix(base))
}
