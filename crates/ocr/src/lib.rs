// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

mod amount;
mod date;
pub mod extract;
pub mod lines;
pub mod locale;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use extract::{ExtractError, Extractor};
pub use lines::{split_lines, Line};
pub use locale::{ConfigError, Era, LocaleTable};
pub use pipeline::{PipelineError, ReceiptPipeline};
pub use recognizer::{FixedTranscript, OcrBackend, OcrError};
pub use types::{AmountCandidate, AmountWindow, ExtractionResult};
