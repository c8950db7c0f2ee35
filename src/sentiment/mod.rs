// Sentiment analysis — classifier backends, per-store aggregation, and the
// regional baseline a store is compared against.

pub mod aggregate;
pub mod api;
pub mod baseline;
pub mod onnx;
pub mod traits;

pub use aggregate::{analyze_sentiment, Progress, SentimentResult};
pub use baseline::{RegionBaseline, SentimentComparison};
pub use traits::{Classification, SentimentClassifier, SentimentLabel};
