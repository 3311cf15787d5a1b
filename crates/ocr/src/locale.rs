//! Keyword tables that make the extractor locale-aware.
//!
//! The extraction algorithm never names a keyword directly: everything that
//! depends on the receipt's language lives in a [`LocaleTable`]. Supporting a
//! new locale means shipping a new table, usually as a TOML file loaded with
//! [`LocaleTable::from_toml_str`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse locale table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to compile locale pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Locale table has no {0}")]
    Empty(&'static str),
    #[error("Amount window is empty: min {min} > max {max}")]
    InvalidWindow { min: i64, max: i64 },
}

/// A calendar era and the western year that precedes its first year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    pub name: String,
    /// Western year = `offset + era_year`.
    pub offset: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleTable {
    /// Labels printed next to the amount actually paid.
    pub total_keywords: Vec<String>,
    /// Labels of tax breakdown lines. They also contain total-ish words, so a
    /// line carrying one of these is never a first-tier anchor.
    pub tax_keywords: Vec<String>,
    /// Cash tendered and change given back. These lines never supply an amount.
    pub tendered_keywords: Vec<String>,
    pub currency_prefixes: Vec<String>,
    pub currency_suffixes: Vec<String>,
    /// Substrings that disqualify a line from being the store name.
    pub store_reject_markers: Vec<String>,
    /// Header words that are not a store name when they stand alone.
    pub store_boilerplate: Vec<String>,
    pub eras: Vec<Era>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl LocaleTable {
    pub fn japanese() -> Self {
        LocaleTable {
            total_keywords: strings(&[
                "合計", "総計", "決済金額", "お支払い", "お支払金額", "お会計",
                "合計金額", "請求金額", "ご請求額",
            ]),
            tax_keywords: strings(&["税合計", "税込合計", "消費税", "税額", "内税", "外税"]),
            tendered_keywords: strings(&["お預り", "お預かり", "お釣り", "おつり", "釣銭"]),
            currency_prefixes: strings(&["¥", "￥", "\\"]),
            currency_suffixes: strings(&["円"]),
            store_reject_markers: strings(&[
                "TEL", "電話", "〒", "住所", "登録番号", "レジ", "担当", "責任者",
            ]),
            store_boilerplate: strings(&[
                "領収書", "領収証", "レシート", "receipt", "invoice",
                "株式会社", "有限会社", "合同会社",
            ]),
            eras: vec![
                Era { name: "令和".to_string(), offset: 2018 },
                Era { name: "平成".to_string(), offset: 1988 },
            ],
        }
    }

    /// Missing keys keep their Japanese defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let table: LocaleTable = toml::from_str(s)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_keywords.iter().all(|k| k.is_empty()) {
            return Err(ConfigError::Empty("total keywords"));
        }
        if self.currency_prefixes.is_empty() && self.currency_suffixes.is_empty() {
            return Err(ConfigError::Empty("currency markers"));
        }
        Ok(())
    }

    pub fn is_total_line(&self, line: &str) -> bool {
        contains_any(line, &self.total_keywords)
    }

    pub fn is_tax_line(&self, line: &str) -> bool {
        contains_any(line, &self.tax_keywords)
    }

    pub fn is_tendered_line(&self, line: &str) -> bool {
        contains_any(line, &self.tendered_keywords)
    }

    /// Case-insensitive, so `tel:` and `Tel` are caught by `TEL`. A marker
    /// spelled in Latin letters only counts as a word of its own: `TEL03` is a
    /// phone line, `Hotel` and `Castella` are not.
    pub fn has_store_reject_marker(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.store_reject_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| m.to_lowercase())
            .any(|marker| {
                lower.match_indices(marker.as_str()).any(|(at, _)| {
                    let before = lower[..at].chars().next_back();
                    let after = lower[at + marker.len()..].chars().next();
                    !(is_latin(marker.chars().next()) && is_latin(before))
                        && !(is_latin(marker.chars().next_back()) && is_latin(after))
                })
            })
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        let bare: String = line
            .chars()
            .filter(|c| !c.is_whitespace() && !is_bracket(*c))
            .flat_map(char::to_lowercase)
            .collect();
        self.store_boilerplate
            .iter()
            .any(|b| !b.is_empty() && bare == b.to_lowercase())
    }

    pub fn era_offset(&self, name: &str) -> Option<i32> {
        self.eras.iter().find(|e| e.name == name).map(|e| e.offset)
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::japanese()
    }
}

fn contains_any(line: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.is_empty() && line.contains(k.as_str()))
}

fn is_bracket(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '[' | ']' | '<' | '>' | '【' | '】' | '「' | '」' | '《' | '》' | '〈' | '〉' | '*' | '-'
    )
}

fn is_latin(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphabetic())
}
