//! Picking the amount paid out of every number printed on a receipt.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::lines::Line;
use crate::locale::{ConfigError, LocaleTable};
use crate::types::{AmountCandidate, AmountWindow};

/// How many lines below an anchor may still hold its amount.
const LINES_AFTER_ANCHOR: usize = 3;

/// A digit run, possibly with `,` / `.` separators, ending on a digit.
const NUMBER: &str = r"(\d[\d,.]*\d|\d)";

re!(re_number_run, r"\d[\d,.]*\d|\d");
/// `1,200` or `2.671`, never `0.500` (a weight or volume).
re!(re_grouped, r"^[1-9]\d{0,2}(?:[,.]\d{3})+$");

/// Token tiers, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    /// `¥1,200`
    Prefixed,
    /// `1,200円`
    Suffixed,
    /// `1,200`
    Grouped,
}

#[derive(Debug)]
struct Token<'a> {
    tier: Tier,
    /// Byte span of the digits within the line.
    span: (usize, usize),
    number: &'a str,
    text: &'a str,
}

/// Currency regexes compiled from a locale table.
pub(crate) struct AmountPatterns {
    prefixed: Option<Regex>,
    suffixed: Option<Regex>,
}

impl AmountPatterns {
    pub(crate) fn compile(table: &LocaleTable) -> Result<Self, ConfigError> {
        let prefixed = alternation(&table.currency_prefixes)
            .map(|alt| Regex::new(&format!(r"(?:{alt})\s*{NUMBER}")))
            .transpose()?;
        let suffixed = alternation(&table.currency_suffixes)
            .map(|alt| Regex::new(&format!(r"{NUMBER}\s*(?:{alt})")))
            .transpose()?;
        Ok(Self { prefixed, suffixed })
    }

    /// All amount-shaped tokens on a line. A weaker tier never claims digits
    /// already claimed by a stronger one.
    fn tokens<'a>(&self, line: &'a str) -> Vec<Token<'a>> {
        let mut tokens: Vec<Token<'a>> = Vec::new();
        let mut push = |token: Token<'a>| {
            let overlaps = tokens
                .iter()
                .any(|t| token.span.0 < t.span.1 && t.span.0 < token.span.1);
            if !overlaps {
                tokens.push(token);
            }
        };

        for (tier, re) in [(Tier::Prefixed, &self.prefixed), (Tier::Suffixed, &self.suffixed)] {
            let Some(re) = re else { continue };
            for c in re.captures_iter(line) {
                let (Some(whole), Some(number)) = (c.get(0), c.get(1)) else { continue };
                push(Token {
                    tier,
                    span: (number.start(), number.end()),
                    number: number.as_str(),
                    text: whole.as_str(),
                });
            }
        }

        for m in re_number_run().find_iter(line) {
            if re_grouped().is_match(m.as_str()) {
                push(Token {
                    tier: Tier::Grouped,
                    span: (m.start(), m.end()),
                    number: m.as_str(),
                    text: m.as_str(),
                });
            }
        }

        tokens
    }

    /// Whether the line opens with a currency-prefixed number, like `¥1,200`.
    pub(crate) fn starts_with_prefixed(&self, line: &str) -> bool {
        self.prefixed
            .as_ref()
            .and_then(|re| re.find(line))
            .is_some_and(|m| m.start() == 0)
    }
}

/// Runs the anchor / fallback / global-scan policy over a transcript.
pub(crate) struct AmountScanner<'a> {
    pub patterns: &'a AmountPatterns,
    pub table: &'a LocaleTable,
    pub window: AmountWindow,
}

impl AmountScanner<'_> {
    pub(crate) fn best(&self, lines: &[Line]) -> Option<AmountCandidate> {
        let table = self.table;
        let total_anchor = |l: &Line| {
            table.is_total_line(&l.normalized)
                && !table.is_tax_line(&l.normalized)
                && !table.is_tendered_line(&l.normalized)
        };
        let tax_anchor =
            |l: &Line| table.is_tax_line(&l.normalized) && !table.is_tendered_line(&l.normalized);

        self.from_anchors(lines, total_anchor)
            .or_else(|| self.from_anchors(lines, tax_anchor))
            .or_else(|| self.largest(lines.iter()))
    }

    fn from_anchors(&self, lines: &[Line], is_anchor: impl Fn(&Line) -> bool) -> Option<AmountCandidate> {
        lines
            .iter()
            .filter(|l| is_anchor(l))
            .find_map(|anchor| self.at_anchor(lines, anchor))
    }

    /// Same line currency amount first; otherwise the largest amount on the
    /// anchor line and the lines just below it.
    fn at_anchor(&self, lines: &[Line], anchor: &Line) -> Option<AmountCandidate> {
        if let Some(c) = self.same_line(anchor) {
            return Some(c);
        }
        let end = (anchor.index + LINES_AFTER_ANCHOR + 1).min(lines.len());
        self.largest(lines[anchor.index..end].iter())
    }

    fn same_line(&self, line: &Line) -> Option<AmountCandidate> {
        let tokens = self.patterns.tokens(&line.normalized);
        [Tier::Prefixed, Tier::Suffixed].into_iter().find_map(|tier| {
            tokens
                .iter()
                .filter(|t| t.tier == tier)
                .find_map(|t| self.candidate(t, line.index))
        })
    }

    fn largest<'l>(&self, lines: impl Iterator<Item = &'l Line>) -> Option<AmountCandidate> {
        lines
            .filter(|l| !self.table.is_tendered_line(&l.normalized))
            .flat_map(|l| {
                self.patterns
                    .tokens(&l.normalized)
                    .into_iter()
                    .filter_map(|t| self.candidate(&t, l.index))
                    .collect::<Vec<_>>()
            })
            .max_by_key(AmountCandidate::value)
    }

    fn candidate(&self, token: &Token<'_>, line_index: usize) -> Option<AmountCandidate> {
        let value = read_amount(token.number, self.window)?;
        AmountCandidate::within(self.window, value, token.text, line_index)
    }
}

/// Read a printed number as whole yen.
///
/// Commas are always thousands separators. A `.` is read as a thousands
/// separator when every group after it has three digits (a common OCR
/// confusion), else as a decimal point. The first reading that lands inside
/// the window wins.
pub(crate) fn read_amount(number: &str, window: AmountWindow) -> Option<i64> {
    let digits: String = number.chars().filter(|c| *c != ',').collect();
    if !digits.contains('.') {
        return digits.parse::<i64>().ok().filter(|v| window.contains(*v));
    }

    let groups: Vec<&str> = digits.split('.').collect();
    let as_thousands = (!groups[0].starts_with('0') && groups[1..].iter().all(|g| g.len() == 3))
        .then(|| groups.concat().parse::<i64>().ok())
        .flatten();
    let as_decimal = (groups.len() == 2)
        .then(|| Decimal::from_str(&digits).ok())
        .flatten()
        .and_then(|d| d.trunc().to_i64());

    [as_thousands, as_decimal]
        .into_iter()
        .flatten()
        .find(|v| window.contains(*v))
}

fn alternation(markers: &[String]) -> Option<String> {
    let escaped: Vec<String> = markers
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| regex::escape(m))
        .collect();
    (!escaped.is_empty()).then(|| escaped.join("|"))
}
