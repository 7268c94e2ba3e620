use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::encoders::EncoderRegistry;
use crate::error::PredictError;
use crate::features::{build_vector, OrderInput, TimePeriod, FEATURE_DIM, FEATURE_ORDER};
use crate::history::{HistoryStore, PredictionRecord};

/// Sidecar schema shipped next to the model artifact. `feature_order` pins
/// the training-time column order so drift is caught at load, not at
/// predict time.
#[derive(Deserialize)]
struct MetaJson {
    feature_order: Vec<String>,
    in_dim: Option<usize>,
}

/// Single-row regression seam. The production implementation wraps the
/// TorchScript artifact; tests substitute a fixed-output stand-in.
pub trait Regressor: Send + Sync {
    fn infer_row(&self, x: &[f32; FEATURE_DIM]) -> Result<f32, PredictError>;
}

pub struct TorchModel {
    model: CModule,
    device: Device,
}

impl TorchModel {
    /// Load the TorchScript artifact and its meta.json. Any failure here is
    /// fatal: the service must not start without a usable model, and must
    /// not start against a model trained on a different column order.
    pub fn load(model_path: &str, meta_path: &str) -> Result<Self> {
        let device = Device::Cpu;

        let meta_txt = fs::read_to_string(Path::new(meta_path))
            .with_context(|| format!("failed to read meta at {}", meta_path))?;
        let meta: MetaJson =
            serde_json::from_str(&meta_txt).with_context(|| "failed to parse meta.json")?;

        if meta.feature_order.len() != FEATURE_DIM
            || meta
                .feature_order
                .iter()
                .zip(FEATURE_ORDER)
                .any(|(got, want)| got.as_str() != want)
        {
            bail!(
                "feature order mismatch: meta has {:?}, expected {:?}",
                meta.feature_order,
                FEATURE_ORDER
            );
        }
        if let Some(in_dim) = meta.in_dim {
            if in_dim != FEATURE_DIM {
                bail!("meta.in_dim is {}, expected {}", in_dim, FEATURE_DIM);
            }
        }

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path))?;

        // Probe output shape with a dummy forward — expect a single value
        let dummy = Tensor::zeros([1, FEATURE_DIM as i64], (Kind::Float, device));
        let out = model.forward_ts(&[dummy])?;
        let sz = out.size();
        if sz != [1i64] && sz != [1i64, 1] {
            bail!("unexpected model output size: {:?}", sz);
        }

        Ok(Self { model, device })
    }
}

impl Regressor for TorchModel {
    fn infer_row(&self, x: &[f32; FEATURE_DIM]) -> Result<f32, PredictError> {
        let input = Tensor::from_slice(x)
            .reshape([1, FEATURE_DIM as i64])
            .to_device(self.device);

        let out = self
            .model
            .forward_ts(&[input])
            .map_err(|e| PredictError::Inference(e.to_string()))?;

        let out = out.reshape([-1]).to_kind(Kind::Float);
        if out.size() != [1i64] {
            return Err(PredictError::Inference(format!(
                "unexpected output size: {:?}",
                out.size()
            )));
        }
        Ok(out.double_value(&[0]) as f32)
    }
}

/// Glue from raw order input to a user-facing duration: validate, encode,
/// run inference, round.
pub struct PredictionService {
    registry: EncoderRegistry,
    model: Box<dyn Regressor>,
}

impl PredictionService {
    pub fn new(registry: EncoderRegistry, model: Box<dyn Regressor>) -> Self {
        Self { registry, model }
    }

    /// Predicted duration in whole minutes. Rounds half-to-even, matching
    /// the rounding the original evaluation pipeline used for display.
    pub fn predict(&self, input: &OrderInput) -> Result<i64, PredictError> {
        input.validate()?;
        let row = build_vector(&self.registry, input)?;
        let minutes = self.model.infer_row(&row)?;
        Ok(f64::from(minutes).round_ties_even() as i64)
    }

    /// Predict and record the result in the history log. The prediction is
    /// the service guarantee; the history write is best-effort, so a failed
    /// persist is logged and the prediction still succeeds. A failed
    /// prediction leaves the history untouched.
    pub fn predict_and_record(
        &self,
        history: &mut HistoryStore,
        input: &OrderInput,
    ) -> Result<PredictionRecord, PredictError> {
        let minutes = self.predict(input)?;
        let period = TimePeriod::from_hour(input.order_hour);
        let record = PredictionRecord::from_input(input, period, minutes);
        history.append(record.clone());
        if let Err(e) = history.persist() {
            tracing::error!("failed to persist history: {e}");
        }
        Ok(record)
    }
}
