use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use stop_words::LANGUAGE;

use crate::analysis::AnalysisSettings;
use crate::sentiment::{api, onnx};
use crate::text::{StopwordSet, TokenFilter};

/// Which sentiment classifier backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierBackend {
    /// Local ONNX model (default); no token needed, no rate limits
    Onnx,
    /// Hosted inference API; requires HF_API_TOKEN
    Api,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierBackend::Onnx => "onnx",
            ClassifierBackend::Api => "api",
        }
    }
}

/// Which built-in stopword list the token filter starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum StopwordChoice {
    Korean,
    English,
    None,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every field has a
/// default; only the API backend needs a secret.
pub struct Config {
    /// Where regional CSV files are read from (and downloaded to)
    pub data_dir: PathBuf,
    pub db_path: String,
    pub classifier_backend: ClassifierBackend,
    /// Directory holding the ONNX sentiment model
    pub model_dir: PathBuf,
    /// Model name for the hosted inference API
    pub api_model: String,
    pub api_token: String,
    pub stopwords: StopwordChoice,
    /// Comma-separated words added to the stopword list
    pub extra_stopwords: Vec<String>,
    pub seed: u64,
    pub topic_count: usize,
    pub topic_passes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `load` passes the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AnalysisSettings::default();

        let classifier_backend = match lookup("DCX_CLASSIFIER").as_deref() {
            Some("api") => ClassifierBackend::Api,
            // "onnx" or unset both default to ONNX
            _ => ClassifierBackend::Onnx,
        };

        let stopwords = match lookup("DCX_STOPWORDS").as_deref() {
            Some("english") => StopwordChoice::English,
            Some("none") => StopwordChoice::None,
            _ => StopwordChoice::Korean,
        };

        let extra_stopwords = lookup("DCX_EXTRA_STOPWORDS")
            .map(|raw| {
                raw.split(',')
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            data_dir: lookup("DCX_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(crate::dataset::download::default_data_dir),
            db_path: lookup("DCX_DB_PATH").unwrap_or_else(|| "./dcx.db".to_string()),
            classifier_backend,
            model_dir: lookup("DCX_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_model_dir),
            api_model: lookup("DCX_API_MODEL").unwrap_or_else(|| api::DEFAULT_MODEL.to_string()),
            api_token: lookup("HF_API_TOKEN").unwrap_or_default(),
            stopwords,
            extra_stopwords,
            seed: parse_var(&lookup, "DCX_SEED")?.unwrap_or(defaults.seed),
            topic_count: parse_var(&lookup, "DCX_TOPICS")?.unwrap_or(defaults.topic_count),
            topic_passes: parse_var(&lookup, "DCX_PASSES")?.unwrap_or(defaults.topic_passes),
        })
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            seed: self.seed,
            topic_count: self.topic_count,
            topic_passes: self.topic_passes,
            ..Default::default()
        }
    }

    /// The token filter every analysis shares.
    pub fn token_filter(&self) -> TokenFilter {
        let base = match self.stopwords {
            StopwordChoice::Korean => StopwordSet::korean_reviews(),
            StopwordChoice::English => StopwordSet::for_language(LANGUAGE::English),
            StopwordChoice::None => StopwordSet::empty(),
        };
        TokenFilter::new(base.with_extra(&self.extra_stopwords))
    }

    /// Check that the API token is configured.
    pub fn require_api_token(&self) -> Result<()> {
        if self.api_token.is_empty() {
            anyhow::bail!(
                "HF_API_TOKEN not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Validate that the chosen classifier backend has what it needs.
    pub fn require_classifier(&self) -> Result<()> {
        match self.classifier_backend {
            ClassifierBackend::Onnx => {
                if !onnx::model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX sentiment model not found in {}\n\
                         Export the model there (model.onnx + tokenizer.json),\n\
                         or set DCX_CLASSIFIER=api to use the hosted inference API instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ClassifierBackend::Api => self.require_api_token(),
        }
    }
}

/// Default ONNX model location: ~/.local/share/dcx/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dcx")
        .join("models")
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a number, got '{raw}'"))
        })
        .transpose()
}
