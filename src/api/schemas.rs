//! Request and response bodies for the prediction API.
//!
//! Request bodies are checked field by field before a [`HealthInput`] is
//! built, so a constructed value always satisfies the input constraints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldViolation, ValidationError};
use crate::model::{Feature, FeatureVector, Prediction, FEATURE_ORDER, NUM_FEATURES};

/// Validated `POST /predict` input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthInput {
    /// Age in years.
    pub age: f64,
    /// Body mass index.
    pub bmi: f64,
    /// 0 = non-smoker, 1 = smoker.
    pub smoker: u8,
    /// Average exercise minutes per day.
    pub exercise_mins: f64,
    /// Systolic blood pressure (mmHg).
    pub systolic_bp: f64,
}

impl HealthInput {
    /// Build from raw values, checking every field.
    pub fn new(
        age: f64,
        bmi: f64,
        smoker: u8,
        exercise_mins: f64,
        systolic_bp: f64,
    ) -> Result<Self, ValidationError> {
        let checks = [
            (Feature::Age, check_measurement(age)),
            (Feature::Bmi, check_measurement(bmi)),
            (Feature::Smoker, check_smoker(f64::from(smoker))),
            (Feature::ExerciseMins, check_measurement(exercise_mins)),
            (Feature::SystolicBp, check_measurement(systolic_bp)),
        ];
        let violations: Vec<FieldViolation> = checks
            .into_iter()
            .filter_map(|(feature, result)| {
                result
                    .err()
                    .map(|message| FieldViolation::new(feature.name(), message))
            })
            .collect();

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }
        Ok(Self {
            age,
            bmi,
            smoker,
            exercise_mins,
            systolic_bp,
        })
    }

    /// Build from a decoded JSON body, reporting every bad or missing field.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let Some(object) = body.as_object() else {
            return Err(ValidationError {
                violations: vec![FieldViolation::new("body", "must be a JSON object")],
            });
        };

        let mut violations = Vec::new();
        let mut values = [0.0; NUM_FEATURES];
        for feature in FEATURE_ORDER {
            match field(object, feature) {
                Ok(v) => values[feature.index()] = v,
                Err(message) => violations.push(FieldViolation::new(feature.name(), message)),
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        let [age, bmi, smoker, exercise_mins, systolic_bp] = values;
        Self::new(age, bmi, smoker as u8, exercise_mins, systolic_bp)
    }

    /// Model input in training order.
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector::new(
            self.age,
            self.bmi,
            self.smoker,
            self.exercise_mins,
            self.systolic_bp,
        )
    }
}

fn field(object: &Map<String, Value>, feature: Feature) -> Result<f64, &'static str> {
    let value = match object.get(feature.name()) {
        None | Some(Value::Null) => return Err("field required"),
        Some(v) => v,
    };
    if feature == Feature::Smoker {
        return match value.as_u64() {
            Some(flag @ (0 | 1)) => Ok(flag as f64),
            _ if value.is_number() => Err("must be 0 or 1"),
            _ => Err("must be an integer"),
        };
    }

    let number = value.as_f64().ok_or("must be a number")?;
    check_measurement(number)?;
    Ok(number)
}

fn check_smoker(value: f64) -> Result<(), &'static str> {
    if value == 0.0 || value == 1.0 {
        Ok(())
    } else {
        Err("must be 0 or 1")
    }
}

fn check_measurement(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        Err("must be a finite number")
    } else if value < 0.0 {
        Err("must be greater than or equal to 0")
    } else {
        Ok(())
    }
}

/// `POST /predict` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPrediction {
    /// Predicted probability of high risk, in `[0, 1]`.
    pub risk_prob: f64,
    /// 0 = low risk, 1 = high risk.
    pub risk_label: u8,
    /// Model version identifier.
    pub model_version: String,
}

impl HealthPrediction {
    /// Attach a version to a prediction.
    pub fn new(prediction: Prediction, model_version: impl Into<String>) -> Self {
        Self {
            risk_prob: prediction.risk_prob,
            risk_label: prediction.risk_label,
            model_version: model_version.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}
