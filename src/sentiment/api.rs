// Hosted inference API classifier.
//
// Sends each text to the Hugging Face inference endpoint of a text
// classification model and takes the highest-scoring label. Useful when
// no local ONNX export is available, at the cost of one HTTP round trip
// per sentence.
//
// API docs: https://huggingface.co/docs/api-inference/tasks/text-classification

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use super::traits::{Classification, SentimentClassifier, SentimentLabel};

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Model the dashboard has always used.
pub const DEFAULT_MODEL: &str = "matthewburke/korean_sentiment";

/// The free inference tier throttles bursts; one request per sentence.
const REQUESTS_PER_SECOND: f64 = 5.0;

/// Spaces requests to the inference endpoint. Each caller reserves the next
/// free slot under the lock and sleeps outside it.
struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RequestPacer {
    fn per_second(requests: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / requests),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn wait_turn(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.interval;
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

pub struct ApiSentimentClassifier {
    client: Client,
    model: String,
    api_token: String,
    pacer: RequestPacer,
}

impl ApiSentimentClassifier {
    pub fn new(model: String, api_token: String) -> Self {
        Self {
            client: Client::new(),
            model,
            api_token,
            pacer: RequestPacer::per_second(REQUESTS_PER_SECOND),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", INFERENCE_BASE_URL, self.model)
    }
}

#[async_trait]
impl SentimentClassifier for ApiSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        self.pacer.wait_turn().await;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_token)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .context("Failed to call inference API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Inference API returned {}: {}", status, body);
        }

        let body: InferenceResponse = response
            .json()
            .await
            .context("Failed to parse inference API response")?;

        let classification = best_classification(body.into_scores())?;
        debug!(
            model = %self.model,
            label = %classification.label,
            score = classification.score,
            "Inference API classified text"
        );
        Ok(classification)
    }
}

/// Pick the top label and map it onto our two classes.
fn best_classification(scores: Vec<LabelScore>) -> Result<Classification> {
    let best = scores
        .into_iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .context("Inference API returned no labels")?;

    let label = SentimentLabel::from_model_label(&best.label)
        .with_context(|| format!("Unrecognized sentiment label '{}'", best.label))?;

    Ok(Classification {
        label,
        score: best.score,
    })
}

// --- Inference API request/response types ---

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// The endpoint answers `[[{label, score}, ...]]` for a single input, and
/// some deployments drop the outer list.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(rows) => rows.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}
