//! Offline training: CSV loading, fitting, and artifact output.

pub mod dataset;
pub mod trainer;

pub use dataset::{load_csv, read_csv, TrainingData};
pub use trainer::{fit, train_and_save, TrainerConfig, TrainingReport};
