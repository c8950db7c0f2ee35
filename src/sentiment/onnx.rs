// Local ONNX sentiment classifier.
//
// Runs a binary sequence-classification model (an ONNX export of a Korean
// sentiment model such as matthewburke/korean_sentiment) entirely on the
// local CPU. The model directory must contain `model.onnx` and
// `tokenizer.json`, e.g. as written by `optimum-cli export onnx`.
//
// Output: two logits per text; softmax gives the class probabilities, with
// index 1 the positive class.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::{Classification, SentimentClassifier, SentimentLabel};

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// BERT-family encoders accept at most 512 positions.
const MAX_TOKENS: usize = 512;

/// Whether a directory holds both files the classifier needs.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

pub struct OnnxSentimentClassifier {
    // ort's Session::run takes &mut self, and spawn_blocking needs 'static
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxSentimentClassifier {
    /// Load the model and tokenizer from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                anyhow::bail!(
                    "Model file not found: {}\nExport the sentiment model to ONNX into {} \
                     or set DCX_CLASSIFIER=api.",
                    path.display(),
                    model_dir.display()
                );
            }
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        debug!("Loaded ONNX sentiment model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

            let len = encoding.get_ids().len().min(MAX_TOKENS);
            let input_ids: Vec<i64> = encoding.get_ids()[..len].iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding.get_attention_mask()[..len]
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids = vec![0i64; len];

            let shape = [1i64, len as i64];
            let input_ids = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask = Tensor::from_array((shape, attention_mask))
                .context("Failed to create attention_mask tensor")?;
            let token_type_ids = Tensor::from_array((shape, token_type_ids))
                .context("Failed to create token_type_ids tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids,
                        "attention_mask" => attention_mask,
                        "token_type_ids" => token_type_ids
                    })
                    .context("ONNX inference failed")?;

                // Output shape: [1, 2]
                let (_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;
                data.to_vec()
            };

            classification_from_logits(&logits)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn classification_from_logits(logits: &[f32]) -> Result<Classification> {
    if logits.len() != 2 {
        anyhow::bail!(
            "Expected 2 logits from a binary sentiment model, got {}",
            logits.len()
        );
    }
    let probs = softmax(&[logits[0] as f64, logits[1] as f64]);

    Ok(if probs[1] >= probs[0] {
        Classification {
            label: SentimentLabel::Positive,
            score: probs[1],
        }
    } else {
        Classification {
            label: SentimentLabel::Negative,
            score: probs[0],
        }
    })
}
