use chrono::NaiveDate;
use kakeibo_core::{ExpenseDraft, Yen};
use serde::{Deserialize, Serialize};

/// Bounds outside of which a printed number is not taken for a receipt total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountWindow {
    pub min: i64,
    pub max: i64,
}

impl AmountWindow {
    pub const DEFAULT_MIN: i64 = 50;
    pub const DEFAULT_MAX: i64 = 50_000;

    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for AmountWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }
}

/// A number read off the transcript that could be the amount paid.
/// Only constructible inside an [`AmountWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountCandidate {
    value: i64,
    original_text: String,
    line_index: usize,
}

impl AmountCandidate {
    pub fn within(
        window: AmountWindow,
        value: i64,
        original_text: impl Into<String>,
        line_index: usize,
    ) -> Option<Self> {
        window.contains(value).then(|| AmountCandidate {
            value,
            original_text: original_text.into(),
            line_index,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// The matched token including any currency glyph, e.g. `¥2,671`.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }
}

/// Fields read from one receipt transcript. Each field is independently
/// optional; `amount` and `date` are `None` rather than a doubtful guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Serialized as bare digits: `"2671"`.
    pub amount: Option<Yen>,
    pub store_name: Option<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub raw_text: String,
}

impl ExtractionResult {
    /// The all-`None` record for a transcript that carried no text.
    pub fn empty(raw_text: impl Into<String>) -> Self {
        ExtractionResult {
            amount: None,
            store_name: None,
            date: None,
            raw_text: raw_text.into(),
        }
    }

    /// Prefill an expense form; category and emotion are chosen by the user.
    pub fn into_draft(self) -> ExpenseDraft {
        ExpenseDraft::prefilled(self.amount, self.store_name, self.date)
    }
}
