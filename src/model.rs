use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::ModelError;
use crate::types::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};

/// Contract between the prediction shaper and a loaded classifier.
/// Both operations run the model; neither mutates it.
pub trait Classifier {
    /// Predicted class index (0/1 binary, 0..n_classes multi-class).
    fn classify(&self, readings: &FeatureRecord) -> Result<usize, ModelError>;
    /// Probability per class index. Trusted to sum to 1, not re-validated.
    fn classify_proba(&self, readings: &FeatureRecord) -> Result<Vec<f32>, ModelError>;
}

#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
    n_classes: usize,
}

/// Per-model figures reported by GET /status.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStatus {
    pub artifact: String,
    pub classes: usize,
    pub features: usize,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

/// A pre-trained classifier loaded from an ONNX artifact, plus the sidecar
/// meta declaring the feature order it was trained on. Loaded once at startup,
/// immutable afterwards; the session mutex exists only because the runtime's
/// run call wants exclusive access.
pub struct OnnxModel {
    session: Mutex<Session>,
    artifact: String,
    feat_list: Vec<String>, // authoritative input order
    n_classes: usize,
    label_output: String,
    proba_output: String,
    inference_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl OnnxModel {
    /// Load an artifact and its meta. `expected_classes` is what the caller's
    /// task demands (2 for binary, 5 for multi-class); a disagreeing meta is
    /// fatal here rather than garbage at request time.
    pub fn load(model_path: &Path, meta_path: &Path, expected_classes: usize) -> Result<Self> {
        let meta_txt = std::fs::read_to_string(meta_path)
            .with_context(|| format!("failed to read meta at {}", meta_path.display()))?;
        let meta: MetaJson = serde_json::from_str(&meta_txt)
            .with_context(|| format!("failed to parse {}", meta_path.display()))?;

        if meta.n_classes != expected_classes {
            bail!(
                "{}: meta declares {} classes, expected {}",
                model_path.display(),
                meta.n_classes,
                expected_classes
            );
        }
        if meta.feat_list.len() != FEATURE_COUNT {
            tracing::warn!(
                "meta feat_list has {} entries, canonical layout has {}",
                meta.feat_list.len(),
                FEATURE_COUNT
            );
        }
        for name in &meta.feat_list {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                tracing::warn!("meta lists unknown feature '{}'; requests will fail", name);
            }
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ONNX model {}", model_path.display()))?;

        // XGBoost-converted graphs expose two outputs: label, probabilities.
        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if outputs.len() < 2 {
            bail!("unexpected model outputs {:?} (want label + probabilities)", outputs);
        }

        let artifact = model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_path.display().to_string());

        tracing::info!(
            "loaded {}; feat_list[{}]: {:?}",
            artifact,
            meta.feat_list.len(),
            meta.feat_list
        );

        Ok(Self {
            session: Mutex::new(session),
            artifact,
            label_output: outputs[0].clone(),
            proba_output: outputs[1].clone(),
            feat_list: meta.feat_list,
            n_classes: meta.n_classes,
            inference_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        })
    }

    /// One forward pass with dummy readings so runtime or meta problems
    /// surface at startup, not on the first operator request.
    pub fn warmup(&self) -> Result<()> {
        let record = FeatureRecord::new([1.0; FEATURE_COUNT]);
        self.classify_proba(&record)?;
        Ok(())
    }

    pub fn status(&self) -> ModelStatus {
        let count = self.inference_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        ModelStatus {
            artifact: self.artifact.clone(),
            classes: self.n_classes,
            features: self.feat_list.len(),
            inference_count: count,
            avg_latency_ms: avg,
        }
    }

    // Map named readings into the order this model was trained on.
    fn order_features(&self, readings: &FeatureRecord) -> Result<Vec<f32>, ModelError> {
        let mut ordered = Vec::with_capacity(self.feat_list.len());
        for name in &self.feat_list {
            let value = readings
                .get(name)
                .ok_or_else(|| ModelError::FeatureMismatch(name.clone()))?;
            ordered.push(value);
        }
        Ok(ordered)
    }

    fn record_latency(&self, started: Instant) {
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us
            .fetch_add(started.elapsed().as_micros() as u64, Ordering::Relaxed);
    }
}

impl Classifier for OnnxModel {
    fn classify(&self, readings: &FeatureRecord) -> Result<usize, ModelError> {
        let started = Instant::now();
        let ordered = self.order_features(readings)?;

        let array = Array2::<f32>::from_shape_vec((1, ordered.len()), ordered)
            .map_err(|e| ModelError::Inference(format!("input shape: {}", e)))?;
        let input = Value::from_array(array)
            .map_err(|e| ModelError::Inference(format!("input tensor: {}", e)))?;

        let index = {
            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| ModelError::Inference(e.to_string()))?;
            let label = outputs.get(&self.label_output).ok_or_else(|| {
                ModelError::UnexpectedOutput(format!("missing output '{}'", self.label_output))
            })?;
            let (_, data) = label
                .try_extract_tensor::<i64>()
                .map_err(|e| ModelError::UnexpectedOutput(e.to_string()))?;
            data.first().copied().ok_or_else(|| {
                ModelError::UnexpectedOutput("empty label tensor".to_string())
            })?
        };
        self.record_latency(started);

        if index < 0 {
            return Err(ModelError::UnexpectedOutput(format!(
                "negative class index {}",
                index
            )));
        }
        Ok(index as usize)
    }

    fn classify_proba(&self, readings: &FeatureRecord) -> Result<Vec<f32>, ModelError> {
        let started = Instant::now();
        let ordered = self.order_features(readings)?;

        let array = Array2::<f32>::from_shape_vec((1, ordered.len()), ordered)
            .map_err(|e| ModelError::Inference(format!("input shape: {}", e)))?;
        let input = Value::from_array(array)
            .map_err(|e| ModelError::Inference(format!("input tensor: {}", e)))?;

        let proba = {
            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| ModelError::Inference(e.to_string()))?;
            let probs = outputs.get(&self.proba_output).ok_or_else(|| {
                ModelError::UnexpectedOutput(format!("missing output '{}'", self.proba_output))
            })?;
            let (_, data) = probs
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::UnexpectedOutput(e.to_string()))?;
            data.to_vec()
        };
        self.record_latency(started);

        if proba.len() != self.n_classes {
            return Err(ModelError::UnexpectedOutput(format!(
                "distribution has {} entries for {} classes",
                proba.len(),
                self.n_classes
            )));
        }
        Ok(proba)
    }
}
