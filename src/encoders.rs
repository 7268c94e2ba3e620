use crate::error::PredictError;

/// Fixed vocabularies, exactly as fit at training time. Order here is the
/// declaration order; codes come from the lexicographic sort below.
pub const WEATHER_CONDITIONS: [&str; 6] =
    ["Sunny", "Sandstorms", "Cloudy", "Fog", "Windy", "Stormy"];
pub const ROAD_TRAFFIC_DENSITY: [&str; 4] = ["High", "Low", "Medium", "Jam"];
pub const VEHICLE_TYPES: [&str; 4] = ["motorcycle", "scooter", "electric_scooter", "bicycle"];
pub const CITY_TYPES: [&str; 3] = ["Urban", "Semi-Urban", "Metropolitian"];
pub const TIME_PERIODS: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

/// Deterministic label -> integer code mapping for one categorical feature.
///
/// Codes are assigned by lexicographic ascending order of the labels, which
/// is what the training pipeline's label encoder produced. The mapping is
/// fixed for the lifetime of the process; any unknown label is an error,
/// never a default code.
#[derive(Debug, Clone)]
pub struct LabelCodec {
    feature: &'static str,
    labels: Vec<&'static str>,
}

impl LabelCodec {
    fn new(feature: &'static str, vocab: &[&'static str]) -> Self {
        let mut labels = vocab.to_vec();
        labels.sort_unstable();
        Self { feature, labels }
    }

    pub fn encode(&self, label: &str) -> Result<u32, PredictError> {
        self.labels
            .binary_search(&label)
            .map(|i| i as u32)
            .map_err(|_| PredictError::UnknownCategory {
                feature: self.feature,
                label: label.to_string(),
            })
    }
}

/// One codec per categorical feature, built once at startup and read-only
/// thereafter. Passed by reference into the feature vector builder rather
/// than living in global state.
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    pub weather: LabelCodec,
    pub traffic: LabelCodec,
    pub vehicle: LabelCodec,
    pub city: LabelCodec,
    pub time_period: LabelCodec,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self {
            weather: LabelCodec::new("Weatherconditions", &WEATHER_CONDITIONS),
            traffic: LabelCodec::new("Road_traffic_density", &ROAD_TRAFFIC_DENSITY),
            vehicle: LabelCodec::new("Type_of_vehicle", &VEHICLE_TYPES),
            city: LabelCodec::new("City", &CITY_TYPES),
            time_period: LabelCodec::new("Time_Period", &TIME_PERIODS),
        }
    }

    /// Drop-first one-hot for the binary `multiple_deliveries` feature:
    /// "0" is the reference category (dropped, 0.0), "1" maps to 1.0.
    pub fn encode_multi_delivery(&self, raw: &str) -> Result<f32, PredictError> {
        match raw {
            "0" => Ok(0.0),
            "1" => Ok(1.0),
            other => Err(PredictError::UnknownCategory {
                feature: "multiple_deliveries",
                label: other.to_string(),
            }),
        }
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
