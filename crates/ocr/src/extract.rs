use kakeibo_core::Yen;
use thiserror::Error;

use crate::amount::{AmountPatterns, AmountScanner};
use crate::date::DateMatcher;
use crate::lines::{split_lines, Line};
use crate::locale::{ConfigError, LocaleTable};
use crate::types::{AmountWindow, ExtractionResult};

/// Store names are printed in the receipt header.
const STORE_NAME_SCAN_LINES: usize = 5;
const STORE_NAME_MIN_CHARS: usize = 3;
const STORE_NAME_MAX_CHARS: usize = 50;

re!(re_numeric_only, r"^[\d\s\-/\\:.,()#*]+$");
re!(re_date_shaped, r"\d{4}\s*[/\-.年]");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The transcript is empty or whitespace only. Distinct from a receipt
    /// whose fields could not be read, which is an `Ok` with `None` fields.
    #[error("No text detected in OCR transcript")]
    NoTextDetected,
}

/// Turns a raw OCR transcript into amount, store name and date.
///
/// Built once from a [`LocaleTable`] and shared; `extract` takes `&self` and
/// keeps no state between calls.
pub struct Extractor {
    table: LocaleTable,
    window: AmountWindow,
    amounts: AmountPatterns,
    dates: DateMatcher,
}

impl Extractor {
    pub fn new(table: LocaleTable, window: AmountWindow) -> Result<Self, ConfigError> {
        table.validate()?;
        if window.min > window.max {
            return Err(ConfigError::InvalidWindow { min: window.min, max: window.max });
        }
        let amounts = AmountPatterns::compile(&table)?;
        let dates = DateMatcher::compile(&table)?;
        Ok(Self { table, window, amounts, dates })
    }

    pub fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError> {
        let lines = split_lines(raw_text);
        if lines.is_empty() {
            return Err(ExtractError::NoTextDetected);
        }

        let amount = AmountScanner {
            patterns: &self.amounts,
            table: &self.table,
            window: self.window,
        }
        .best(&lines)
        .map(|c| Yen::new(c.value()));

        Ok(ExtractionResult {
            amount,
            store_name: self.store_name(&lines),
            date: self.dates.find(&self.table, &lines),
            raw_text: raw_text.to_string(),
        })
    }

    // ── Store name ────────────────────────────────────────────────────────────

    /// Unlike amount and date, a questionable store name beats none: when every
    /// header line is filtered out the first line is returned as-is.
    fn store_name(&self, lines: &[Line]) -> Option<String> {
        lines
            .iter()
            .take(STORE_NAME_SCAN_LINES)
            .find(|l| self.is_store_name(l))
            .or_else(|| lines.first())
            .map(|l| l.text.clone())
    }

    fn is_store_name(&self, line: &Line) -> bool {
        let text = line.normalized.as_str();
        let len = text.chars().count();
        if !(STORE_NAME_MIN_CHARS..=STORE_NAME_MAX_CHARS).contains(&len) {
            return false;
        }
        !(re_numeric_only().is_match(text)
            || re_date_shaped().is_match(text)
            || self.amounts.starts_with_prefixed(text)
            || self.table.is_total_line(text)
            || self.table.is_tax_line(text)
            || self.table.is_tendered_line(text)
            || self.table.has_store_reject_marker(text)
            || self.table.is_boilerplate(text))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(LocaleTable::japanese(), AmountWindow::default())
            .expect("built-in Japanese locale table is valid")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extract(text: &str) -> ExtractionResult {
        Extractor::default().extract(text).unwrap()
    }

    #[test]
    fn supermarket_receipt() {
        let text = "スーパーマーケット田中\n2024年7月28日\nお茶 150円\nパン 300円\n合計\n¥450";
        let r = extract(text);
        assert_eq!(r.amount, Some(Yen::new(450)));
        assert_eq!(r.store_name.as_deref(), Some("スーパーマーケット田中"));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 7, 28));
        assert_eq!(r.raw_text, text);
    }

    #[test]
    fn convenience_store_receipt() {
        let text = "\
領収書
ファミリーマート渋谷店
〒150-0002 東京都渋谷区渋谷1-2-3
TEL 03-1234-5678
2024年 8月 3日(土) 12:41
レジ0002 担当 山田
おにぎり 160円
お茶 128円
小計 ¥288
(8%対象 ¥288)
(内消費税等 ¥21)
合計 ¥288
お預り ¥1,000
お釣り ¥712";
        let r = extract(text);
        assert_eq!(r.amount, Some(Yen::new(288)));
        assert_eq!(r.store_name.as_deref(), Some("ファミリーマート渋谷店"));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 8, 3));
    }

    #[test]
    fn total_on_next_lines_takes_largest() {
        let text = "ABC薬局\n2024/01/14 16:45\n風邪薬 1,200\n合計\n1,200\n2,671\n";
        let r = extract(text);
        assert_eq!(r.amount, Some(Yen::new(2671)));
    }

    #[test]
    fn total_keyword_beats_tax_keyword() {
        let text = "ABC薬局\n消費税合計 ¥120\n合計 ¥1,580";
        assert_eq!(extract(text).amount, Some(Yen::new(1580)));
        let text = "ABC薬局\n合計\n¥1,580\n消費税 ¥120";
        assert_eq!(extract(text).amount, Some(Yen::new(1580)));
    }

    #[test]
    fn global_scan_respects_window() {
        let r = extract("雑貨屋さん\n5円\n9,999,999円\n");
        assert_eq!(r.amount, None);
    }

    #[test]
    fn no_numbers_means_no_amount() {
        let r = extract("いつもありがとうございます\nまたお越しください");
        assert_eq!(r.amount, None);
        assert_eq!(r.date, None);
        assert_eq!(r.store_name.as_deref(), Some("いつもありがとうございます"));
    }

    #[test]
    fn store_name_falls_back_to_first_line() {
        let text = "2024/07/28\nTEL 03-1234-5678\n〒150-0001\nレジ01\n12:30\n合計 ¥500";
        assert_eq!(extract(text).store_name.as_deref(), Some("2024/07/28"));
    }

    #[test]
    fn store_name_skips_header_noise() {
        let text = "RECEIPT\n¥1,200\n株式会社\nカフェ・ド・モカ\n合計 ¥1,200";
        assert_eq!(extract(text).store_name.as_deref(), Some("カフェ・ド・モカ"));
    }

    #[test]
    fn store_name_with_latin_tel_inside_a_word() {
        let r = extract("Hotel Gracery 新宿\n2024/07/28\n合計 ¥1,200");
        assert_eq!(r.store_name.as_deref(), Some("Hotel Gracery 新宿"));
        assert_eq!(r.amount, Some(Yen::new(1200)));

        let r = extract("領収書\nCafe Stella\n2024/07/28\n合計 ¥650");
        assert_eq!(r.store_name.as_deref(), Some("Cafe Stella"));
    }

    #[test]
    fn store_name_skips_amount_lines() {
        let text = "¥1,200\n合計 ¥1,200\n消費税 ¥109\nお預り ¥2,000\n喫茶ルノアール";
        assert_eq!(extract(text).store_name.as_deref(), Some("喫茶ルノアール"));
    }

    #[test]
    fn weights_are_not_amounts() {
        let r = extract("肉のハナマサ\n豚バラ 0.500kg\n¥398");
        assert_eq!(r.amount, Some(Yen::new(398)));
        assert_eq!(r.store_name.as_deref(), Some("肉のハナマサ"));
    }

    #[test]
    fn store_name_length_limits() {
        let long = "あ".repeat(51);
        let text = format!("店\n{long}\nパン屋ブーランジェ");
        assert_eq!(extract(&text).store_name.as_deref(), Some("パン屋ブーランジェ"));
    }

    #[test]
    fn store_name_only_from_first_five_lines() {
        let text = "12:30\n0001\n#123\n***\n---\nパン屋ブーランジェ";
        assert_eq!(extract(text).store_name.as_deref(), Some("12:30"));
    }

    #[test]
    fn era_date_is_converted() {
        let r = extract("和菓子 松屋\n令和6年7月28日\n合計 ¥864");
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 7, 28));
        assert_eq!(r.amount, Some(Yen::new(864)));
    }

    #[test]
    fn backslash_yen_substitute() {
        let r = extract("ラーメン一番\nお会計 \\980");
        assert_eq!(r.amount, Some(Yen::new(980)));
    }

    #[test]
    fn empty_text_is_no_text_detected() {
        let e = Extractor::default();
        assert_eq!(e.extract(""), Err(ExtractError::NoTextDetected));
        assert_eq!(e.extract("  \n\t \n"), Err(ExtractError::NoTextDetected));
    }

    #[test]
    fn extraction_is_idempotent() {
        let e = Extractor::default();
        let text = "スーパー田中\n2024-07-28\n合計\n1,200\n2,671";
        assert_eq!(e.extract(text), e.extract(text));
    }

    #[test]
    fn no_panic_on_garbage_input() {
        let _ = Extractor::default().extract("!@#$%^&*()\n\0\x01\x02\n¥\n円円\n令和年月日");
    }

    #[test]
    fn custom_window_applies_everywhere() {
        let e = Extractor::new(LocaleTable::japanese(), AmountWindow::new(10, 1_000_000)).unwrap();
        assert_eq!(e.extract("店\n合計 ¥20").unwrap().amount, Some(Yen::new(20)));
        assert_eq!(e.extract("店\n120,000円").unwrap().amount, Some(Yen::new(120_000)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = Extractor::new(LocaleTable::japanese(), AmountWindow::new(100, 10)).err();
        assert!(matches!(err, Some(ConfigError::InvalidWindow { min: 100, max: 10 })));
    }

    #[test]
    fn swapped_locale_table() {
        let table = LocaleTable::from_toml_str(
            r#"
            total_keywords = ["TOTAL", "AMOUNT DUE"]
            tax_keywords = ["TAX"]
            tendered_keywords = ["CASH", "CHANGE"]
            currency_prefixes = ["$"]
            currency_suffixes = []
            store_reject_markers = ["TEL", "REGISTER"]
            store_boilerplate = ["RECEIPT"]
            eras = []
            "#,
        )
        .unwrap();
        let e = Extractor::new(table, AmountWindow::default()).unwrap();
        let r = e
            .extract("RECEIPT\nCORNER DELI\n2024-03-15\nSALES TAX $1.20\nTOTAL $64.50\nCASH $100.00")
            .unwrap();
        assert_eq!(r.amount, Some(Yen::new(64)));
        assert_eq!(r.store_name.as_deref(), Some("CORNER DELI"));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }
}
