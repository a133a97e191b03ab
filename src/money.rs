//! Brazilian real amounts, kept in centavos.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An error that can occur when parsing a pt-BR amount such as `"1.234,56"`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseBrlError {
    /// Not a number in pt-BR notation (e.g., "abc", "1,2,3").
    #[error("invalid BRL amount format")]
    InvalidFormat,
    /// More than two decimal places (e.g., "1,234").
    #[error("too many decimal places for BRL")]
    TooManyDecimals,
}

/// A monetary value in Brazilian reais.
///
/// Stored as a signed count of centavos so that sums never drift. The
/// `Display` implementation matches the browser's `pt-BR` currency format,
/// including the non-breaking space after the symbol: `R$ 1.234,56`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brl(i64);

impl Brl {
    pub const ZERO: Brl = Brl(0);

    /// Creates an amount directly from centavos.
    ///
    /// # Example
    /// ```
    /// use talho::money::Brl;
    ///
    /// assert_eq!(Brl::from_minor(12345).to_string(), "R$\u{a0}123,45");
    /// ```
    pub fn from_minor(centavos: i64) -> Self {
        Brl(centavos)
    }

    /// Rounds a float amount in reais to the nearest centavo.
    pub fn from_float(reais: f64) -> Self {
        Brl((reais * 100.0).round() as i64)
    }

    pub fn as_minor_units(&self) -> i64 {
        self.0
    }

    /// Parses user input in pt-BR notation. The `R$` symbol and thousands
    /// separators are optional.
    ///
    /// # Examples
    /// ```
    /// use talho::money::{Brl, ParseBrlError};
    ///
    /// assert_eq!(Brl::parse("R$ 1.234,5").unwrap().as_minor_units(), 123450);
    /// assert_eq!(Brl::parse("0,123"), Err(ParseBrlError::TooManyDecimals));
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseBrlError> {
        let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        let (negative, unsigned) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let unsigned = unsigned.strip_prefix("R$").unwrap_or(unsigned);

        let mut parts = unsigned.split(',');
        let major = parts.next().unwrap_or("").replace('.', "");
        let minor = parts.next().unwrap_or("");

        if parts.next().is_some() || major.is_empty() {
            return Err(ParseBrlError::InvalidFormat);
        }
        if !major.chars().all(|c| c.is_ascii_digit()) || !minor.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseBrlError::InvalidFormat);
        }
        if minor.len() > 2 {
            return Err(ParseBrlError::TooManyDecimals);
        }

        let reais: i64 = major.parse().map_err(|_| ParseBrlError::InvalidFormat)?;
        let centavos: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| ParseBrlError::InvalidFormat)? * 10,
            _ => minor.parse().map_err(|_| ParseBrlError::InvalidFormat)?,
        };

        let total = reais
            .checked_mul(100)
            .and_then(|r| r.checked_add(centavos))
            .ok_or(ParseBrlError::InvalidFormat)?;

        Ok(Brl(if negative { -total } else { total }))
    }

    pub fn checked_add(self, other: Brl) -> Option<Brl> {
        self.0.checked_add(other.0).map(Brl)
    }

    /// Price of `quantity` units. `None` on overflow.
    pub fn checked_mul(self, quantity: i64) -> Option<Brl> {
        self.0.checked_mul(quantity).map(Brl)
    }

    pub fn saturating_sub(self, other: Brl) -> Brl {
        Brl(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Brl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = (abs / 100).to_string();
        let centavos = abs % 100;

        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, digit) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        write!(f, "{}R$\u{a0}{},{:02}", sign, grouped, centavos)
    }
}
