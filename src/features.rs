use serde::{Deserialize, Serialize};

use crate::encoders::EncoderRegistry;
use crate::error::PredictError;

pub const FEATURE_DIM: usize = 10;

/// Authoritative model input column order. The trained model has no schema
/// of its own; this constant is the contract, and the artifact's metadata
/// file is checked against it at load time. Reordering anything here
/// silently corrupts predictions.
pub const FEATURE_ORDER: [&str; FEATURE_DIM] = [
    "Delivery_person_Age",
    "Delivery_person_Ratings",
    "Weatherconditions",
    "Road_traffic_density",
    "Type_of_vehicle",
    "City",
    "Hour_order_picked",
    "Time_Period",
    "distance_km",
    "multiple_deliveries",
];

/// Time-of-day bucket derived from the order pickup hour. The model was
/// trained on this exact derivation, so it belongs to the pipeline, not
/// to whatever UI collects the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    /// [5,12) Morning, [12,17) Afternoon, [17,21) Evening, rest Night.
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            5..=11 => TimePeriod::Morning,
            12..=16 => TimePeriod::Afternoon,
            17..=20 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::Morning => "Morning",
            TimePeriod::Afternoon => "Afternoon",
            TimePeriod::Evening => "Evening",
            TimePeriod::Night => "Night",
        }
    }
}

/// One prediction request's raw inputs. Immutable once built; only the
/// resulting prediction record is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub age: u32,
    pub rating: f64,
    pub weather: String,
    pub traffic: String,
    pub vehicle: String,
    pub city: String,
    pub order_hour: u8,
    pub distance_km: f64,
    /// Raw binary flag, "0" or "1".
    pub multiple_deliveries: String,
}

impl OrderInput {
    /// Basic range limits, mirroring the bounds the original input form
    /// enforced on its widgets.
    pub fn validate(&self) -> Result<(), PredictError> {
        check_range("age", f64::from(self.age), 18.0, 45.0)?;
        check_range("rating", self.rating, 1.0, 4.9)?;
        check_range("distance_km", self.distance_km, 0.0, 100.0)?;
        check_range("order_hour", f64::from(self.order_hour), 0.0, 23.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), PredictError> {
    if value < min || value > max {
        return Err(PredictError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Assemble the ordered numeric row the model expects, per FEATURE_ORDER.
/// Encoder failures propagate unchanged.
pub fn build_vector(
    registry: &EncoderRegistry,
    input: &OrderInput,
) -> Result<[f32; FEATURE_DIM], PredictError> {
    let period = TimePeriod::from_hour(input.order_hour);
    // Narrowing to f32 happens only here, at the model boundary
    Ok([
        input.age as f32,
        input.rating as f32,
        registry.weather.encode(&input.weather)? as f32,
        registry.traffic.encode(&input.traffic)? as f32,
        registry.vehicle.encode(&input.vehicle)? as f32,
        registry.city.encode(&input.city)? as f32,
        f32::from(input.order_hour),
        registry.time_period.encode(period.label())? as f32,
        input.distance_km as f32,
        registry.encode_multi_delivery(&input.multiple_deliveries)?,
    ])
}
