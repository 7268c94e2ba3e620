pub mod encoders;
pub mod error;
pub mod features;
pub mod history;
pub mod model;

pub use encoders::EncoderRegistry;
pub use error::{HistoryError, PredictError};
pub use features::{build_vector, OrderInput, TimePeriod, FEATURE_DIM, FEATURE_ORDER};
pub use history::{HistoryStore, PredictionRecord, HISTORY_CAPACITY};
pub use model::{PredictionService, Regressor, TorchModel};
