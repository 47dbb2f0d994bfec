//! Health risk index: a logistic-regression trainer and prediction API.
//!
//! A classifier is fitted offline on a CSV of
//! `age,bmi,smoker,exercise_mins,systolic_bp,risk` rows and persisted as a
//! JSON artifact. The HTTP service loads that artifact once, on first use,
//! and scores requests against it:
//!
//! ```text
//! POST /predict {"age":52,"bmi":29.8,"smoker":1,"exercise_mins":5,"systolic_bp":150}
//!   -> {"risk_prob":0.83,"risk_label":1,"model_version":"0.1.0"}
//! ```
//!
//! `risk_label` is 1 exactly when `risk_prob >= 0.5`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`model`]: Feature vectors, classifier artifact, shared predictor
//! - [`training`]: CSV loading and model fitting
//! - [`api`]: HTTP API for health and prediction
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod training;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
