//! Fitted logistic-regression classifier and its persisted artifact form.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use super::features::{feature_names, FeatureVector, NUM_FEATURES};
use crate::error::{ModelError, TrainingError};

/// Artifact layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Binary logistic-regression model over standardized features.
///
/// `p(risk=1 | x) = logistic(intercept + Σ coefficients[i] * (x[i] - means[i]) / scales[i])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    /// Artifact layout version.
    pub format_version: u32,
    /// Feature names in training order.
    pub feature_names: Vec<String>,
    /// Per-feature training mean.
    pub means: [f64; NUM_FEATURES],
    /// Per-feature training standard deviation (never zero).
    pub scales: [f64; NUM_FEATURES],
    /// Weights in standardized space.
    pub coefficients: [f64; NUM_FEATURES],
    /// Bias term.
    pub intercept: f64,
    /// Rows used for the fit.
    pub n_samples: usize,
    /// When the fit finished.
    #[serde(with = "time::serde::rfc3339")]
    pub trained_at: OffsetDateTime,
}

impl Classifier {
    /// Positive-class probability for one input.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let z = features
            .as_array()
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, ((x, (mean, scale)), w)| {
                acc + w * (x - mean) / scale
            });
        logistic(z).clamp(0.0, 1.0)
    }

    /// Read and check an artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ModelError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let classifier: Classifier =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(path, e.to_string()))?;
        classifier.check().map_err(|reason| corrupt(path, reason))?;

        debug!(path = %path.display(), n_samples = classifier.n_samples, "Classifier deserialized");
        Ok(classifier)
    }

    /// Write the artifact, creating parent directories.
    ///
    /// The JSON goes to a sibling temp file first and is renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<(), TrainingError> {
        let persist = |source: std::io::Error| TrainingError::Persist {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist)?;
        }

        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| persist(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let tmp = temp_path(path);
        fs::write(&tmp, json).map_err(persist)?;
        fs::rename(&tmp, path).map_err(persist)?;
        Ok(())
    }

    fn check(&self) -> Result<(), String> {
        if self.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, FORMAT_VERSION
            ));
        }
        if self.feature_names != feature_names() {
            return Err(format!(
                "feature order {:?} does not match {:?}",
                self.feature_names,
                feature_names()
            ));
        }
        let all_finite = self
            .means
            .iter()
            .chain(&self.scales)
            .chain(&self.coefficients)
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err("non-finite parameter".to_string());
        }
        if self.scales.iter().any(|s| *s <= 0.0) {
            return Err("scales must be positive".to_string());
        }
        Ok(())
    }
}

/// Numerically stable logistic function.
pub fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn corrupt(path: &Path, reason: String) -> ModelError {
    ModelError::Corrupt {
        path: path.to_path_buf(),
        reason,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
