//! Kubernetes resource quantity parsing
//!
//! Converts the textual quantities used in NodePool limits ("100", "500m",
//! "1000Gi", "1e3") into exact magnitudes. Values are held as integer
//! nano-units so binary and decimal suffixes compare without float error.

use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::Error;

const NANOS_PER_UNIT: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Multiplier encoded by a quantity suffix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scale {
    /// Power of two (Ki, Mi, ...)
    Binary(u32),
    /// Power of ten (m, k, M, ..., or an explicit exponent)
    Decimal(i32),
}

fn parse_suffix(suffix: &str) -> Option<Scale> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            Scale::Decimal(exponent.parse::<i32>().ok()?)
        }
    };
    Some(scale)
}

/// An exactly-parsed resource quantity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParsedQuantity {
    nanos: i128,
}

impl ParsedQuantity {
    /// Parse a quantity string such as "100", "250m", "1000Gi" or "5e3".
    ///
    /// Fractions finer than one nano-unit round up, matching the API server.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let s = input.trim();
        let (negative, unsigned) = match s.as_bytes().first() {
            None => return Err(Error::quantity(input, "empty quantity")),
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);
        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(Error::quantity(input, "missing numeric value"));
        }
        if frac_part.contains('.') {
            return Err(Error::quantity(input, "more than one decimal point"));
        }
        let scale = parse_suffix(suffix)
            .ok_or_else(|| Error::quantity(input, format!("unknown suffix '{suffix}'")))?;

        let overflow = || Error::quantity(input, "value out of range");

        let mut mantissa: i128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        let frac_digits = i32::try_from(frac_part.len()).map_err(|_| overflow())?;
        let (binary_shift, decimal_exp) = match scale {
            Scale::Binary(shift) => (shift, 0),
            Scale::Decimal(exp) => (0, exp),
        };

        let mut value = mantissa
            .checked_mul(1i128 << binary_shift)
            .ok_or_else(overflow)?;

        // nanos = mantissa * 2^shift * 10^(exp + 9 - frac_digits)
        let exp10 = decimal_exp
            .checked_add(9)
            .and_then(|e| e.checked_sub(frac_digits))
            .ok_or_else(overflow)?;
        if exp10 >= 0 {
            let factor = 10i128
                .checked_pow(exp10.unsigned_abs())
                .ok_or_else(overflow)?;
            value = value.checked_mul(factor).ok_or_else(overflow)?;
        } else {
            value = match 10i128.checked_pow(exp10.unsigned_abs()) {
                Some(divisor) => {
                    let whole = value / divisor;
                    if value % divisor == 0 {
                        whole
                    } else {
                        whole + 1
                    }
                }
                None => i128::from(value != 0),
            };
        }

        Ok(Self {
            nanos: if negative { -value } else { value },
        })
    }

    /// Magnitude in nano-units
    pub fn as_nanos(&self) -> i128 {
        self.nanos
    }

    /// Magnitude in milli-units, if exactly representable
    pub fn as_millis(&self) -> Option<i128> {
        (self.nanos % NANOS_PER_MILLI == 0).then_some(self.nanos / NANOS_PER_MILLI)
    }

    /// Magnitude in whole units (cores, bytes, pods), if exactly representable
    pub fn as_whole_units(&self) -> Option<i128> {
        (self.nanos % NANOS_PER_UNIT == 0).then_some(self.nanos / NANOS_PER_UNIT)
    }

    /// Returns true for quantities below zero
    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Returns true for a zero quantity
    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }
}

impl FromStr for ParsedQuantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&Quantity> for ParsedQuantity {
    type Error = Error;

    fn try_from(quantity: &Quantity) -> Result<Self, Self::Error> {
        Self::parse(&quantity.0)
    }
}
