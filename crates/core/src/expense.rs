use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Yen;

/// Largest amount a single expense may carry.
pub const MAX_EXPENSE_YEN: i64 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "食費")]
    Food,
    #[serde(rename = "交通費")]
    Transport,
    #[serde(rename = "娯楽")]
    Entertainment,
    #[serde(rename = "日用品")]
    Household,
    #[serde(rename = "医療費")]
    Medical,
    #[serde(rename = "わんちゃん")]
    Pet,
    #[serde(rename = "その他")]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Household,
        Category::Medical,
        Category::Pet,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "食費",
            Category::Transport => "交通費",
            Category::Entertainment => "娯楽",
            Category::Household => "日用品",
            Category::Medical => "医療費",
            Category::Pet => "わんちゃん",
            Category::Other => "その他",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Positive => write!(f, "positive"),
            Emotion::Neutral => write!(f, "neutral"),
            Emotion::Negative => write!(f, "negative"),
        }
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Emotion::Positive),
            "neutral" => Ok(Emotion::Neutral),
            "negative" => Ok(Emotion::Negative),
            other => Err(format!("Unknown emotion: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("Amount is required")]
    MissingAmount,
    #[error("Amount {0} is outside 1..=999999")]
    AmountOutOfRange(Yen),
    #[error("Store name is required")]
    MissingStoreName,
    #[error("Category is required")]
    MissingCategory,
    #[error("Emotion is required")]
    MissingEmotion,
}

/// An expense as the user is editing it: prefilled from a receipt, any field
/// may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub amount: Option<Yen>,
    pub store_name: String,
    pub date: Option<NaiveDate>,
    pub category: Option<Category>,
    pub emotion: Option<Emotion>,
    pub notes: Option<String>,
}

/// An expense whose required fields are all present and in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedExpense {
    pub amount: Yen,
    pub store_name: String,
    pub date: Option<NaiveDate>,
    pub category: Category,
    pub emotion: Emotion,
    pub notes: Option<String>,
}

impl ExpenseDraft {
    pub fn prefilled(amount: Option<Yen>, store_name: Option<String>, date: Option<NaiveDate>) -> Self {
        ExpenseDraft {
            amount,
            store_name: store_name.unwrap_or_default(),
            date,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn confirm(self) -> Result<ConfirmedExpense, ExpenseError> {
        let amount = self.amount.ok_or(ExpenseError::MissingAmount)?;
        if amount.value() <= 0 || amount.value() > MAX_EXPENSE_YEN {
            return Err(ExpenseError::AmountOutOfRange(amount));
        }

        let store_name = self.store_name.trim();
        if store_name.is_empty() {
            return Err(ExpenseError::MissingStoreName);
        }

        let category = self.category.ok_or(ExpenseError::MissingCategory)?;
        let emotion = self.emotion.ok_or(ExpenseError::MissingEmotion)?;

        Ok(ConfirmedExpense {
            amount,
            store_name: store_name.to_string(),
            date: self.date,
            category,
            emotion,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}
