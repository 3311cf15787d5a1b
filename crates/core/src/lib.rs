pub mod expense;
pub mod money;

pub use expense::{Category, ConfirmedExpense, Emotion, ExpenseDraft, ExpenseError, MAX_EXPENSE_YEN};
pub use money::{ParseYenError, Yen};
