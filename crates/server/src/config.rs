use anyhow::Context;
use kakeibo_ocr::{AmountWindow, Extractor, LocaleTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "KAKEIBO_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for request bodies, receipt photos included.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_amount: i64,
    pub max_amount: i64,
    /// Replaces the built-in Japanese keyword table.
    pub locale_file: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_amount: AmountWindow::DEFAULT_MIN,
            max_amount: AmountWindow::DEFAULT_MAX,
            locale_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// Only `/api/ocr/text` is served.
    #[default]
    None,
    Tesseract,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackendKind,
    pub data_path: Option<String>,
    pub lang: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::None,
            data_path: None,
            lang: "jpn".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the file named by `KAKEIBO_CONFIG` (if set), then
    /// `HOST` / `PORT` from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: '{port}'"))?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn amount_window(&self) -> AmountWindow {
        AmountWindow::new(self.extraction.min_amount, self.extraction.max_amount)
    }

    pub fn build_extractor(&self) -> anyhow::Result<Extractor> {
        let table = match &self.extraction.locale_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read locale file {}", path.display()))?;
                LocaleTable::from_toml_str(&text)?
            }
            None => LocaleTable::japanese(),
        };
        Ok(Extractor::new(table, self.amount_window())?)
    }
}
