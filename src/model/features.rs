//! Feature vector construction in the fixed training order.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Number of model inputs.
pub const NUM_FEATURES: usize = 5;

/// Model input, in the order the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    /// Age in years.
    Age,
    /// Body mass index.
    Bmi,
    /// 0 = non-smoker, 1 = smoker.
    Smoker,
    /// Average exercise minutes per day.
    ExerciseMins,
    /// Systolic blood pressure (mmHg).
    SystolicBp,
}

/// Column order shared by the CSV loader, the trainer and the predictor.
pub const FEATURE_ORDER: [Feature; NUM_FEATURES] = [
    Feature::Age,
    Feature::Bmi,
    Feature::Smoker,
    Feature::ExerciseMins,
    Feature::SystolicBp,
];

impl Feature {
    /// Column / field name.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Position in [`FEATURE_ORDER`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Names of [`FEATURE_ORDER`], as stored in the artifact.
pub fn feature_names() -> Vec<String> {
    FEATURE_ORDER.iter().map(|f| f.name().to_string()).collect()
}

/// Fixed-order model input. Built per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; NUM_FEATURES]);

impl FeatureVector {
    /// Assemble `[age, bmi, smoker, exercise_mins, systolic_bp]`.
    pub fn new(age: f64, bmi: f64, smoker: u8, exercise_mins: f64, systolic_bp: f64) -> Self {
        Self([age, bmi, f64::from(smoker), exercise_mins, systolic_bp])
    }

    /// Wrap an already-ordered row.
    pub fn from_array(values: [f64; NUM_FEATURES]) -> Self {
        Self(values)
    }

    /// Value of a single feature.
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Values in [`FEATURE_ORDER`].
    pub fn as_array(&self) -> &[f64; NUM_FEATURES] {
        &self.0
    }
}
