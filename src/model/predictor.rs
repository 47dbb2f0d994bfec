//! Shared, lazily loaded classifier handle and risk thresholding.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::classifier::Classifier;
use super::features::FeatureVector;
use crate::error::ModelError;
use crate::metrics;

/// Probability at or above which a prediction is labelled high risk.
pub const RISK_THRESHOLD: f64 = 0.5;

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Positive-class probability in `[0, 1]`.
    pub risk_prob: f64,
    /// 1 iff `risk_prob >= RISK_THRESHOLD`.
    pub risk_label: u8,
}

impl Prediction {
    /// Derive the label from a probability.
    pub fn from_probability(risk_prob: f64) -> Self {
        let risk_label = u8::from(risk_prob >= RISK_THRESHOLD);
        Self {
            risk_prob,
            risk_label,
        }
    }

    /// Whether the label is high risk.
    pub fn is_high_risk(&self) -> bool {
        self.risk_label == 1
    }
}

/// Process-wide classifier handle.
///
/// Loads the artifact on first use and keeps it for the life of the value.
/// Concurrent first callers wait on the same initialization; a failed load
/// leaves the cell empty so a later call can pick up a freshly trained model.
#[derive(Debug)]
pub struct Predictor {
    model_path: PathBuf,
    classifier: OnceCell<Classifier>,
    loads: AtomicUsize,
}

impl Predictor {
    /// Create an unloaded handle for the artifact at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            classifier: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Create a handle that is already loaded.
    pub fn with_classifier(model_path: impl Into<PathBuf>, classifier: Classifier) -> Self {
        Self {
            model_path: model_path.into(),
            classifier: OnceCell::with_value(classifier),
            loads: AtomicUsize::new(0),
        }
    }

    /// Whether the classifier has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.classifier.get().is_some()
    }

    /// Number of times the artifact has been deserialized.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Get the classifier, loading it on first call.
    pub fn classifier(&self) -> Result<&Classifier, ModelError> {
        self.classifier.get_or_try_init(|| {
            let start = Instant::now();
            let classifier = Classifier::load(&self.model_path)?;
            self.loads.fetch_add(1, Ordering::SeqCst);
            metrics::record_model_load(start);
            info!(
                path = %self.model_path.display(),
                n_samples = classifier.n_samples,
                "Model loaded"
            );
            Ok(classifier)
        })
    }

    /// Load eagerly; same semantics as the first [`Predictor::classifier`] call.
    pub fn preload(&self) -> Result<(), ModelError> {
        self.classifier().map(|_| ())
    }

    /// Score one feature vector.
    #[instrument(skip(self), level = "debug")]
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let start = Instant::now();
        let classifier = self.classifier()?;
        let prediction = Prediction::from_probability(classifier.predict_proba(features));
        metrics::record_prediction(start, prediction.is_high_risk());
        debug!(
            risk_prob = prediction.risk_prob,
            risk_label = prediction.risk_label,
            "Prediction computed"
        );
        Ok(prediction)
    }

    /// Convenience wrapper taking the five raw inputs.
    pub fn predict_risk(
        &self,
        age: f64,
        bmi: f64,
        smoker: u8,
        exercise_mins: f64,
        systolic_bp: f64,
    ) -> Result<Prediction, ModelError> {
        self.predict(&FeatureVector::new(age, bmi, smoker, exercise_mins, systolic_bp))
    }
}
