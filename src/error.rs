use thiserror::Error;

/// Request-failing errors on the prediction path. These surface to the
/// caller; none of them is retried or defaulted away.
#[derive(Debug, Error)]
pub enum PredictError {
    /// A categorical value outside its fixed vocabulary: the caller's
    /// offered choices have drifted from the trained vocabulary.
    #[error("unknown category `{label}` for feature `{feature}`")]
    UnknownCategory { feature: &'static str, label: String },

    #[error("{field} out of range: {value} (allowed {min} to {max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("model inference failed: {0}")]
    Inference(String),
}

/// History file I/O failures. Both are best-effort: a read failure falls
/// back to an empty log, a write failure is logged and swallowed — losing
/// the history must never fail a prediction the user already received.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history file: {0}")]
    Read(#[source] csv::Error),

    #[error("failed to write history file: {0}")]
    Write(#[source] csv::Error),
}
