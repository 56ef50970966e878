//! Decimal and currency parsing for chain amount strings.
//!
//! Amounts are carried as an arbitrary-precision integer mantissa plus the
//! number of fractional digits: `"44.55"` becomes `(4455, 2)` and the value is
//! always `numeric × 10^-exp`. The original text is kept next to the parsed
//! form so amounts can be redisplayed without loss.
//!
//! Log attributes may join several coins into one string
//! (`"2896ukrw,16uluna,1umnt"`); [`parse_amount_list`] splits those first.

use std::sync::OnceLock;

use num_bigint::{BigInt, Sign};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DecimalError;

/// Fractional digits carried by the chain's fixed-point `Dec` type.
pub const DEC_PRECISION: i32 = 18;

// ─── DecimalAmount ────────────────────────────────────────────────────────────

/// An amount with optional currency denomination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalAmount {
    /// Text the amount was parsed from (without currency).
    pub text: String,
    /// Integer mantissa.
    #[serde(with = "numeric_text")]
    pub numeric: BigInt,
    /// Number of fractional digits.
    pub exp: i32,
    /// Denomination, e.g. `uluna`. Empty when unknown.
    #[serde(default)]
    pub currency: String,
}

impl DecimalAmount {
    /// Parse a plain decimal string such as `"44.55"` or `"100"`.
    pub fn parse(text: &str, currency: impl Into<String>) -> Result<Self, DecimalError> {
        let (numeric, exp) = parse_decimal(text)?;
        Ok(Self {
            text: text.trim().to_string(),
            numeric,
            exp,
            currency: currency.into(),
        })
    }

    /// Build from a fixed-point integer string scaled by `10^precision`
    /// (how the chain serialises `Dec` values).
    pub fn from_scaled(
        int_text: &str,
        precision: i32,
        currency: impl Into<String>,
    ) -> Result<Self, DecimalError> {
        let (numeric, exp) = parse_decimal(int_text)?;
        if exp != 0 {
            return Err(DecimalError::NotNumeric(int_text.to_string()));
        }
        let mut amount = Self {
            text: String::new(),
            numeric,
            exp: precision,
            currency: currency.into(),
        };
        amount.text = amount.to_decimal_string();
        Ok(amount)
    }

    /// Parse a decimal text (`"12.5"`) into the chain's 18-digit fixed
    /// point, so every `Dec` amount shares the same `exp`.
    pub fn parse_dec(text: &str, currency: impl Into<String>) -> Result<Self, DecimalError> {
        let (numeric, exp) = parse_decimal(text)?;
        if exp > DEC_PRECISION {
            return Err(DecimalError::NotNumeric(text.to_string()));
        }
        let scale = BigInt::from(10u8).pow((DEC_PRECISION - exp) as u32);
        Ok(Self {
            text: text.trim().to_string(),
            numeric: numeric * scale,
            exp: DEC_PRECISION,
            currency: currency.into(),
        })
    }

    /// Parse a `<amount><currency>` token such as `"123ukrw"`.
    pub fn parse_coin(token: &str) -> Result<Self, DecimalError> {
        let (amount, currency) = split_amount(token)?;
        Self::parse(&amount, currency)
    }

    /// Reconstruct the decimal text from `numeric` and `exp`.
    pub fn to_decimal_string(&self) -> String {
        let negative = self.numeric.sign() == Sign::Minus;
        let digits = self.numeric.magnitude().to_string();
        let mut out = String::with_capacity(digits.len() + 2);
        if negative {
            out.push('-');
        }

        if self.exp <= 0 {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(self.exp.unsigned_abs() as usize));
            return out;
        }

        let exp = self.exp as usize;
        let padded = if digits.len() <= exp {
            format!("{}{}", "0".repeat(exp - digits.len() + 1), digits)
        } else {
            digits
        };
        let split = padded.len() - exp;
        out.push_str(&padded[..split]);
        out.push('.');
        out.push_str(&padded[split..]);
        out
    }
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse `"I.F"` into `(digits(I) ++ digits(F), len(F))`.
///
/// `,` is accepted as the separator too. More than one separator is an error.
pub fn parse_decimal(input: &str) -> Result<(BigInt, i32), DecimalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DecimalError::Empty);
    }

    let normalized = trimmed.replace(',', ".");
    let parts: Vec<&str> = normalized.split('.').collect();
    let (int_part, frac_part) = match parts.as_slice() {
        [int_part] => (*int_part, ""),
        [int_part, frac_part] => (*int_part, *frac_part),
        _ => return Err(DecimalError::TooManySeparators(input.to_string())),
    };

    let (negative, int_digits) = match int_part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, int_part),
    };

    let digits = format!("{int_digits}{frac_part}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecimalError::NotNumeric(input.to_string()));
    }

    let mut numeric = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| DecimalError::NotNumeric(input.to_string()))?;
    if negative {
        numeric = -numeric;
    }

    Ok((numeric, frac_part.len() as i32))
}

fn currency_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([0-9.,\-]+)\s*([^0-9\s]\S*)$").ok())
        .as_ref()
}

/// Split `"123ukrw"` into `("123", "ukrw")`.
///
/// A bare number yields an empty currency. Anything else is rejected.
pub fn split_amount(token: &str) -> Result<(String, String), DecimalError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecimalError::Empty);
    }
    if let Some(caps) = currency_pattern().and_then(|p| p.captures(token)) {
        return Ok((caps[1].to_string(), caps[2].to_string()));
    }
    if parse_decimal(token).is_ok() {
        return Ok((token.to_string(), String::new()));
    }
    Err(DecimalError::Unrecognized(token.to_string()))
}

/// Parse a comma-joined coin list such as `"2896ukrw,16uluna,1umnt"`.
pub fn parse_amount_list(input: &str) -> Result<Vec<DecimalAmount>, DecimalError> {
    input
        .split(',')
        .filter(|t| !t.trim().is_empty())
        .map(DecimalAmount::parse_coin)
        .collect()
}

mod numeric_text {
    use num_bigint::BigInt;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(d)?;
        text.parse::<BigInt>().map_err(D::Error::custom)
    }
}
