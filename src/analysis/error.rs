// Analysis outcomes that are notices rather than failures.
//
// Both variants are expected, user-facing results: a store with too few
// reviews, or a column whose text is filtered down to nothing. The caller
// shows the message and moves on; other analyses are unaffected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The store has fewer reviews than the analysis needs.
    #[error("{analysis} needs at least {required} reviews, but this store has {found}")]
    InsufficientData {
        analysis: &'static str,
        required: usize,
        found: usize,
    },

    /// Filtering left nothing to analyze.
    #[error("no data available for {what}")]
    EmptyResult { what: String },
}

impl AnalysisError {
    pub fn empty(what: impl Into<String>) -> Self {
        AnalysisError::EmptyResult { what: what.into() }
    }
}

/// Fail with `InsufficientData` unless `found >= required`.
pub fn require_reviews(
    analysis: &'static str,
    required: usize,
    found: usize,
) -> Result<(), AnalysisError> {
    if found < required {
        return Err(AnalysisError::InsufficientData {
            analysis,
            required,
            found,
        });
    }
    Ok(())
}

/// Whether an `anyhow` error is one of the analysis notices above.
pub fn as_notice(err: &anyhow::Error) -> Option<&AnalysisError> {
    err.downcast_ref::<AnalysisError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reviews_boundary() {
        assert!(require_reviews("Network analysis", 20, 20).is_ok());
        let err = require_reviews("Network analysis", 20, 19).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Network analysis needs at least 20 reviews, but this store has 19"
        );
    }

    #[test]
    fn test_notice_survives_anyhow() {
        let err: anyhow::Error = AnalysisError::empty("Price").into();
        assert_eq!(as_notice(&err), Some(&AnalysisError::empty("Price")));
    }
}
