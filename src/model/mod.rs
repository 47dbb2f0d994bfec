//! Classifier, feature assembly and the shared predictor handle.

pub mod classifier;
pub mod features;
pub mod predictor;

pub use classifier::Classifier;
pub use features::{Feature, FeatureVector, FEATURE_ORDER, NUM_FEATURES};
pub use predictor::{Prediction, Predictor, RISK_THRESHOLD};
