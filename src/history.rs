use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::HistoryError;
use crate::features::{OrderInput, TimePeriod};

/// Most recent predictions kept and displayed.
pub const HISTORY_CAPACITY: usize = 10;

/// One row of the history file. Column names match the original history
/// CSV so an existing file keeps loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "Delivery_person_Age")]
    pub age: u32,
    #[serde(rename = "Delivery_person_Ratings")]
    pub rating: f64,
    #[serde(rename = "Weatherconditions")]
    pub weather: String,
    #[serde(rename = "Road_traffic_density")]
    pub traffic: String,
    #[serde(rename = "Type_of_vehicle")]
    pub vehicle: String,
    #[serde(rename = "multiple_deliveries")]
    pub multiple_deliveries: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Hour_order_picked")]
    pub order_hour: u8,
    #[serde(rename = "Time_Period")]
    pub time_period: String,
    #[serde(rename = "distance_km")]
    pub distance_km: f64,
    #[serde(rename = "Predicted_time_min")]
    pub predicted_minutes: i64,
}

impl PredictionRecord {
    pub fn from_input(input: &OrderInput, period: TimePeriod, predicted_minutes: i64) -> Self {
        Self {
            age: input.age,
            rating: input.rating,
            weather: input.weather.clone(),
            traffic: input.traffic.clone(),
            vehicle: input.vehicle.clone(),
            multiple_deliveries: input.multiple_deliveries.clone(),
            city: input.city.clone(),
            order_hour: input.order_hour,
            time_period: period.label().to_string(),
            distance_km: input.distance_km,
            predicted_minutes,
        }
    }
}

/// Bounded most-recent-first log of past predictions, backed by a flat CSV
/// file that is fully rewritten after every append.
///
/// Single-writer: callers serialize the append + persist sequence (the
/// server holds the store behind a mutex). A second process on the same
/// path would race with last-writer-wins.
pub struct HistoryStore {
    path: PathBuf,
    log: VecDeque<PredictionRecord>,
}

impl HistoryStore {
    /// Open the store at `path`. A missing file is a valid initial state
    /// (empty log); an unreadable or malformed file is logged and also
    /// yields an empty log, so history problems never block predictions.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let log = match Self::read_log(&path) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!("history at {} unreadable, starting empty: {e}", path.display());
                VecDeque::new()
            }
        };
        Self { path, log }
    }

    fn read_log(path: &Path) -> Result<VecDeque<PredictionRecord>, HistoryError> {
        if !path.exists() {
            return Ok(VecDeque::new());
        }
        let mut rdr = csv::Reader::from_path(path).map_err(HistoryError::Read)?;
        let mut log = VecDeque::with_capacity(HISTORY_CAPACITY);
        for row in rdr.deserialize() {
            let record: PredictionRecord = row.map_err(HistoryError::Read)?;
            log.push_back(record);
            if log.len() == HISTORY_CAPACITY {
                break;
            }
        }
        Ok(log)
    }

    /// Prepend `record`, dropping the oldest entries beyond capacity.
    pub fn append(&mut self, record: PredictionRecord) {
        self.log.push_front(record);
        self.log.truncate(HISTORY_CAPACITY);
    }

    /// Rewrite the backing file with the current log, header + newest-first
    /// rows. Not atomic.
    pub fn persist(&self) -> Result<(), HistoryError> {
        let mut wtr = csv::Writer::from_path(&self.path).map_err(HistoryError::Write)?;
        for record in &self.log {
            wtr.serialize(record).map_err(HistoryError::Write)?;
        }
        wtr.flush()
            .map_err(|e| HistoryError::Write(csv::Error::from(e)))?;
        Ok(())
    }

    /// Records newest first.
    pub fn records(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.log.iter()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
