use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An amount in whole yen. JPY has no minor unit in everyday use, so receipts
/// never print one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Yen(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseYenError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid amount: '{0}'")]
    Invalid(String),
    #[error("Amount has a fractional yen part: '{0}'")]
    Fractional(String),
}

impl Yen {
    pub fn new(amount: i64) -> Self {
        Yen(amount)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Yen(0)
    }

    /// Display form used on receipts and in the UI: `¥2,671`.
    pub fn format_jpy(self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            format!("-¥{grouped}")
        } else {
            format!("¥{grouped}")
        }
    }
}

/// Bare digits, no symbol or separators. This is the wire form of an amount.
impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts what a user types into the amount field after OCR prefill:
/// `2671`, `2,671`, `¥2,671`, `2671円`, `3240.00`.
impl FromStr for Yen {
    type Err = ParseYenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean: String = s
            .chars()
            .filter(|c| !matches!(c, '¥' | '￥' | '\\' | ',' | '，' | '円') && !c.is_whitespace())
            .collect();
        if clean.is_empty() {
            return Err(ParseYenError::Empty);
        }
        let dec = Decimal::from_str(&clean).map_err(|_| ParseYenError::Invalid(s.to_string()))?;
        if !dec.fract().is_zero() {
            return Err(ParseYenError::Fractional(s.to_string()));
        }
        dec.to_i64()
            .map(Yen)
            .ok_or_else(|| ParseYenError::Invalid(s.to_string()))
    }
}

impl Serialize for Yen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Yen {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Yen(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_digits() {
        assert_eq!(Yen::new(2671).to_string(), "2671");
        assert_eq!(Yen::zero().to_string(), "0");
    }

    #[test]
    fn format_jpy_groups_thousands() {
        assert_eq!(Yen::new(450).format_jpy(), "¥450");
        assert_eq!(Yen::new(2671).format_jpy(), "¥2,671");
        assert_eq!(Yen::new(1234567).format_jpy(), "¥1,234,567");
        assert_eq!(Yen::new(-1000).format_jpy(), "-¥1,000");
    }

    #[test]
    fn parse_strips_symbols_and_separators() {
        assert_eq!("2671".parse::<Yen>().unwrap(), Yen::new(2671));
        assert_eq!("¥2,671".parse::<Yen>().unwrap(), Yen::new(2671));
        assert_eq!("￥2，671".parse::<Yen>().unwrap(), Yen::new(2671));
        assert_eq!("\\980".parse::<Yen>().unwrap(), Yen::new(980));
        assert_eq!("450円".parse::<Yen>().unwrap(), Yen::new(450));
        assert_eq!("3240.00".parse::<Yen>().unwrap(), Yen::new(3240));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Yen>(), Err(ParseYenError::Empty));
        assert_eq!("¥ ".parse::<Yen>(), Err(ParseYenError::Empty));
        assert!(matches!("abc".parse::<Yen>(), Err(ParseYenError::Invalid(_))));
        assert!(matches!("12.5".parse::<Yen>(), Err(ParseYenError::Fractional(_))));
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Yen::new(450)).unwrap();
        assert_eq!(json, "\"450\"");
        let from_str: Yen = serde_json::from_str("\"¥1,200\"").unwrap();
        assert_eq!(from_str, Yen::new(1200));
        let from_num: Yen = serde_json::from_str("980").unwrap();
        assert_eq!(from_num, Yen::new(980));
    }
}
