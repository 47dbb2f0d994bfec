//! Logistic-regression fitting and artifact persistence.

use std::path::Path;
use std::time::Instant;

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2, Axis};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dataset::{load_csv, TrainingData};
use crate::error::{AppError, TrainingError};
use crate::model::classifier::FORMAT_VERSION;
use crate::model::features::feature_names;
use crate::model::{Classifier, FeatureVector, Prediction, NUM_FEATURES};

/// L2 penalty strength.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// L-BFGS iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u64 = 200;

/// Fitting parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// L2 penalty strength.
    pub alpha: f64,
    /// L-BFGS iteration cap.
    pub max_iterations: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// The fitted model as written to disk.
    pub classifier: Classifier,
    /// Fraction of training rows classified correctly.
    pub accuracy: f64,
}

/// Fit a classifier on loaded data.
///
/// Features are standardized with the training mean and population standard
/// deviation before fitting; both are stored in the returned classifier.
pub fn fit(data: &TrainingData, config: TrainerConfig) -> Result<Classifier, TrainingError> {
    let (means, scales) = standardization(&data.features);
    let standardized =
        (&data.features - &Array1::from(means.to_vec())) / &Array1::from(scales.to_vec());

    let dataset = Dataset::new(standardized, data.targets.clone());
    let fitted = LogisticRegression::default()
        .alpha(config.alpha)
        .max_iterations(config.max_iterations)
        .fit(&dataset)
        .map_err(|e| TrainingError::Fit(e.to_string()))?;

    let params = fitted.params();
    if params.len() != NUM_FEATURES {
        return Err(TrainingError::Fit(format!(
            "expected {} coefficients, got {}",
            NUM_FEATURES,
            params.len()
        )));
    }
    // linfa treats the majority class as positive; orient towards risk=1.
    let sign = if fitted.labels().pos.class == 1 { 1.0 } else { -1.0 };
    let mut coefficients = [0.0; NUM_FEATURES];
    for (slot, w) in coefficients.iter_mut().zip(params.iter()) {
        *slot = sign * *w;
    }
    let intercept = sign * fitted.intercept();

    if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
        return Err(TrainingError::Diverged);
    }

    Ok(Classifier {
        format_version: FORMAT_VERSION,
        feature_names: feature_names(),
        means,
        scales,
        coefficients,
        intercept,
        n_samples: data.len(),
        trained_at: OffsetDateTime::now_utc(),
    })
}

/// Fraction of rows whose thresholded prediction matches the target.
pub fn accuracy(classifier: &Classifier, data: &TrainingData) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let correct = data
        .features
        .axis_iter(Axis(0))
        .zip(data.targets.iter())
        .filter(|(row, target)| {
            let mut values = [0.0; NUM_FEATURES];
            for (slot, v) in values.iter_mut().zip(row.iter()) {
                *slot = *v;
            }
            let p = classifier.predict_proba(&FeatureVector::from_array(values));
            usize::from(Prediction::from_probability(p).risk_label) == **target
        })
        .count();
    correct as f64 / data.len() as f64
}

/// Read the CSV at `data_path`, fit, and write the artifact to `model_path`.
#[instrument(skip_all, fields(data = %data_path.display(), model = %model_path.display()))]
pub fn train_and_save(
    data_path: &Path,
    model_path: &Path,
    config: TrainerConfig,
) -> Result<TrainingReport, AppError> {
    let start = Instant::now();

    let data = load_csv(data_path)?;
    info!(rows = data.len(), positives = data.positives(), "Loaded training data");

    let classifier = fit(&data, config)?;
    let accuracy = accuracy(&classifier, &data);

    classifier.save(model_path)?;
    info!(
        accuracy = %format!("{:.3}", accuracy),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model trained and saved"
    );

    Ok(TrainingReport {
        classifier,
        accuracy,
    })
}

fn standardization(features: &Array2<f64>) -> ([f64; NUM_FEATURES], [f64; NUM_FEATURES]) {
    let mut means = [0.0; NUM_FEATURES];
    let mut scales = [1.0; NUM_FEATURES];
    for (i, column) in features.axis_iter(Axis(1)).enumerate().take(NUM_FEATURES) {
        let mean = column.mean().unwrap_or(0.0);
        let std = column.std(0.0);
        means[i] = mean;
        scales[i] = if std.is_finite() && std > 0.0 { std } else { 1.0 };
    }
    (means, scales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::dataset::read_csv;

    fn low_risk_row(i: usize) -> String {
        format!("{},{},0,{},{},0\n", 25 + i, 21.0 + i as f64 * 0.1, 60 - i, 110 + i)
    }

    fn high_risk_row(i: usize) -> String {
        format!("{},{},1,{},{},1\n", 55 + i, 31.0 + i as f64 * 0.1, i, 150 + i)
    }

    fn rows(negatives: usize, positives: usize) -> TrainingData {
        let mut csv = String::from("age,bmi,smoker,exercise_mins,systolic_bp,risk\n");
        (0..negatives).for_each(|i| csv.push_str(&low_risk_row(i)));
        (0..positives).for_each(|i| csv.push_str(&high_risk_row(i)));
        read_csv(csv.as_bytes()).unwrap()
    }

    fn separable() -> TrainingData {
        rows(20, 20)
    }

    fn assert_oriented_towards_risk(classifier: &Classifier) {
        let high = classifier.predict_proba(&FeatureVector::new(70.0, 34.0, 1, 0.0, 165.0));
        let low = classifier.predict_proba(&FeatureVector::new(25.0, 21.0, 0, 60.0, 110.0));
        assert!(high >= 0.5, "high-risk profile scored {high}");
        assert_eq!(Prediction::from_probability(high).risk_label, 1);
        assert!(low < 0.5, "low-risk profile scored {low}");
        assert_eq!(Prediction::from_probability(low).risk_label, 0);
    }

    #[test]
    fn standardization_handles_constant_column() {
        let x = ndarray::array![[1.0, 2.0, 0.0, 4.0, 5.0], [3.0, 2.0, 0.0, 6.0, 7.0]];
        let (means, scales) = standardization(&x);
        assert_eq!(means, [2.0, 2.0, 0.0, 5.0, 6.0]);
        assert_eq!(scales, [1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn fit_learns_direction_of_risk() {
        let data = separable();
        let classifier = fit(&data, TrainerConfig::default()).unwrap();
        assert!(classifier.coefficients[0] > 0.0, "age should raise risk");
        assert!(classifier.coefficients[3] < 0.0, "exercise should lower risk");
        assert!(accuracy(&classifier, &data) > 0.9);
    }

    #[test]
    fn balanced_negatives_first_scores_high_risk_as_positive() {
        let classifier = fit(&separable(), TrainerConfig::default()).unwrap();
        assert_oriented_towards_risk(&classifier);
    }

    #[test]
    fn minority_positive_scores_high_risk_as_positive() {
        let data = rows(30, 6);
        assert_eq!(data.positives(), 6);
        let classifier = fit(&data, TrainerConfig::default()).unwrap();
        assert_oriented_towards_risk(&classifier);
        assert!(classifier.coefficients[2] > 0.0, "smoking should raise risk");
        assert!(accuracy(&classifier, &data) > 0.9);
    }

    #[test]
    fn majority_positive_scores_high_risk_as_positive() {
        let classifier = fit(&rows(6, 30), TrainerConfig::default()).unwrap();
        assert_oriented_towards_risk(&classifier);
    }

    #[test]
    fn fit_is_deterministic() {
        let data = separable();
        let a = fit(&data, TrainerConfig::default()).unwrap();
        let b = fit(&data, TrainerConfig::default()).unwrap();
        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercept, b.intercept);
    }

    #[test]
    fn train_and_save_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("samples.csv");
        let mut csv = String::from("age,bmi,smoker,exercise_mins,systolic_bp,risk\n");
        for i in 0..10 {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                30 + i * 4,
                24 + i,
                i % 2,
                50 - i * 5,
                115 + i * 5,
                u8::from(i >= 5)
            ));
        }
        std::fs::write(&data_path, csv).unwrap();

        let model_path = dir.path().join("models").join("health_model.json");
        let report = train_and_save(&data_path, &model_path, TrainerConfig::default()).unwrap();
        assert_eq!(report.classifier.n_samples, 10);
        let loaded = Classifier::load(&model_path).unwrap();
        assert_eq!(loaded.coefficients, report.classifier.coefficients);
        assert_eq!(loaded.intercept, report.classifier.intercept);
        assert_eq!(loaded.means, report.classifier.means);
    }

    #[test]
    fn train_and_save_propagates_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let err = train_and_save(
            &dir.path().join("absent.csv"),
            &dir.path().join("model.json"),
            TrainerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Data(_)));
        assert!(!dir.path().join("model.json").exists());
    }
}
