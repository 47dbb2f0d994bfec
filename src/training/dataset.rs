//! Training CSV loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::error::DataLoadError;
use crate::model::{FEATURE_ORDER, NUM_FEATURES};

/// Name of the target column.
pub const TARGET_COLUMN: &str = "risk";

/// Feature matrix and 0/1 targets, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    /// `n_samples x NUM_FEATURES`, columns in [`FEATURE_ORDER`].
    pub features: Array2<f64>,
    /// Target class per row.
    pub targets: Array1<usize>,
}

impl TrainingData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of rows with `risk = 1`.
    pub fn positives(&self) -> usize {
        self.targets.iter().filter(|&&t| t == 1).count()
    }
}

/// Load `age,bmi,smoker,exercise_mins,systolic_bp,risk` rows from a file.
pub fn load_csv(path: &Path) -> Result<TrainingData, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let data = read_csv(file)?;
    debug!(path = %path.display(), rows = data.len(), "Training data loaded");
    Ok(data)
}

/// Load training rows from any reader. Columns are matched by header name.
pub fn read_csv<R: Read>(reader: R) -> Result<TrainingData, DataLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DataLoadError::MissingColumn(name))
    };

    let mut feature_cols = [0usize; NUM_FEATURES];
    for (slot, feature) in feature_cols.iter_mut().zip(FEATURE_ORDER) {
        *slot = column(feature.name())?;
    }
    let target_col = column(TARGET_COLUMN)?;

    let mut values = Vec::new();
    let mut targets = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        for (&col, feature) in feature_cols.iter().zip(FEATURE_ORDER) {
            let cell = record.get(col).unwrap_or_default();
            let value = cell
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DataLoadError::InvalidField {
                    line,
                    column: feature.name(),
                    value: cell.to_string(),
                })?;
            values.push(value);
        }

        let cell = record.get(target_col).unwrap_or_default();
        let target = match cell {
            "0" => 0,
            "1" => 1,
            _ => {
                return Err(DataLoadError::InvalidTarget {
                    line,
                    value: cell.to_string(),
                })
            }
        };
        targets.push(target);
    }

    if targets.is_empty() {
        return Err(DataLoadError::Empty);
    }
    if let Some(&only) = targets.first().filter(|&&t| targets.iter().all(|&o| o == t)) {
        return Err(DataLoadError::SingleClass(only as u8));
    }

    let rows = targets.len();
    let features = Array2::from_shape_fn((rows, NUM_FEATURES), |(r, c)| values[r * NUM_FEATURES + c]);
    Ok(TrainingData {
        features,
        targets: Array1::from(targets),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
age,bmi,smoker,exercise_mins,systolic_bp,risk
40,31.3,1,24,136,1
25,25.5,0,28,131,0
";

    #[test]
    fn reads_rows_in_feature_order() {
        let data = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.positives(), 1);
        assert_eq!(data.features.row(0).to_vec(), vec![40.0, 31.3, 1.0, 24.0, 136.0]);
        assert_eq!(data.targets.to_vec(), vec![1, 0]);
    }

    #[test]
    fn column_order_in_file_is_irrelevant() {
        let csv = "risk,systolic_bp,age,smoker,bmi,exercise_mins,notes\n0,120,30,0,22.5,45,x\n1,150,60,1,30,0,y\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.features.row(1).to_vec(), vec![60.0, 30.0, 1.0, 0.0, 150.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "age,bmi,smoker,exercise_mins,risk\n40,31.3,1,24,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("systolic_bp")));
    }

    #[test]
    fn non_numeric_field_reports_line_and_column() {
        let csv = "age,bmi,smoker,exercise_mins,systolic_bp,risk\n40,31.3,1,24,136,1\n25,heavy,0,28,131,0\n";
        match read_csv(csv.as_bytes()).unwrap_err() {
            DataLoadError::InvalidField { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "bmi");
                assert_eq!(value, "heavy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_target_is_rejected() {
        let csv = "age,bmi,smoker,exercise_mins,systolic_bp,risk\n40,31.3,1,24,136,2\n";
        assert!(matches!(
            read_csv(csv.as_bytes()).unwrap_err(),
            DataLoadError::InvalidTarget { .. }
        ));
    }

    #[test]
    fn header_only_is_empty() {
        let csv = "age,bmi,smoker,exercise_mins,systolic_bp,risk\n";
        assert!(matches!(read_csv(csv.as_bytes()).unwrap_err(), DataLoadError::Empty));
    }

    #[test]
    fn single_class_is_rejected() {
        let csv = "age,bmi,smoker,exercise_mins,systolic_bp,risk\n40,31.3,1,24,136,0\n50,28,0,10,140,0\n";
        assert!(matches!(
            read_csv(csv.as_bytes()).unwrap_err(),
            DataLoadError::SingleClass(0)
        ));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Open { .. }));
    }
}
