//! CSV dataset loading.
//!
//! The dataset is read once, validated, and then kept immutable for the rest of the
//! run. Validation happens up front: missing columns are reported from the header
//! row before any record is parsed, so a malformed file never yields a partial
//! dataset.

use std::{io, path::Path};

use serde::Deserialize;

use crate::feature::VitalFeature;

/// Name of the binary label column.
pub const LABEL_COLUMN: &str = "deterioration_next_12h";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("failed to read dataset {path}")]
    Csv { path: String, source: csv::Error },
    #[display("dataset {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: &'static str },
    #[display("invalid label {value} on data row {row} (expected 0 or 1)")]
    InvalidLabel { row: usize, value: f64 },
    #[display("dataset {path} contains no rows")]
    Empty { path: String },
}

/// One raw CSV record. Extra columns in the file are ignored.
#[derive(Debug, Deserialize)]
struct VitalsRecord {
    heart_rate: f64,
    spo2_pct: f64,
    respiratory_rate: f64,
    systolic_bp: f64,
    diastolic_bp: f64,
    temperature_c: f64,
    deterioration_next_12h: f64,
}

impl VitalsRecord {
    fn features(&self) -> [f64; VitalFeature::LEN] {
        [
            self.heart_rate,
            self.spo2_pct,
            self.respiratory_rate,
            self.systolic_bp,
            self.diastolic_bp,
            self.temperature_c,
        ]
    }
}

#[expect(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn parse_label(value: f64) -> Option<u8> {
    (value == 0.0 || value == 1.0).then_some(value as u8)
}

/// Feature matrix and label vector for the whole run.
///
/// Rows store the six vitals in [`VitalFeature::ALL`] order. Labels are `0`
/// (no deterioration) or `1` (deterioration within 12 hours).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<[f64; VitalFeature::LEN]>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Loads and validates the dataset at `path`.
    pub fn load<P>(path: P) -> Result<Self, DatasetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let display_path = path.display().to_string();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| DatasetError::Csv {
                path: display_path.clone(),
                source,
            })?;
        let dataset = Self::from_csv_reader(reader, &display_path)?;
        log::debug!("loaded {} rows from {display_path}", dataset.len());
        Ok(dataset)
    }

    /// Parses a dataset from any CSV source; `name` is used in error messages.
    pub fn from_reader<R>(reader: R, name: &str) -> Result<Self, DatasetError>
    where
        R: io::Read,
    {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv_reader(reader, name)
    }

    fn from_csv_reader<R>(mut reader: csv::Reader<R>, name: &str) -> Result<Self, DatasetError>
    where
        R: io::Read,
    {
        let csv_error = |source| DatasetError::Csv {
            path: name.to_owned(),
            source,
        };

        let headers = reader.headers().map_err(csv_error)?.clone();
        let required = VitalFeature::ALL
            .iter()
            .map(|f| f.dataset_column())
            .chain([LABEL_COLUMN]);
        for column in required {
            if !headers.iter().any(|h| h == column) {
                return Err(DatasetError::MissingColumn {
                    path: name.to_owned(),
                    column,
                });
            }
        }

        let mut dataset = Self::default();
        for (row, record) in reader.deserialize::<VitalsRecord>().enumerate() {
            let record = record.map_err(csv_error)?;
            let value = record.deterioration_next_12h;
            let label =
                parse_label(value).ok_or(DatasetError::InvalidLabel { row: row + 1, value })?;
            dataset.rows.push(record.features());
            dataset.labels.push(label);
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty {
                path: name.to_owned(),
            });
        }
        Ok(dataset)
    }

    /// Builds a dataset from in-memory rows.
    ///
    /// # Panics
    ///
    /// Panics if `rows` and `labels` differ in length or a label is not 0 or 1.
    #[must_use]
    pub fn from_parts(rows: Vec<[f64; VitalFeature::LEN]>, labels: Vec<u8>) -> Self {
        assert_eq!(rows.len(), labels.len(), "rows and labels must align");
        assert!(labels.iter().all(|&l| l <= 1), "labels must be 0 or 1");
        Self { rows, labels }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature rows in canonical feature order.
    #[must_use]
    pub fn rows(&self) -> &[[f64; VitalFeature::LEN]] {
        &self.rows
    }

    /// Binary labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Labels as `0.0`/`1.0`, for numeric routines.
    #[must_use]
    pub fn labels_f64(&self) -> Vec<f64> {
        self.labels.iter().map(|&l| f64::from(l)).collect()
    }

    /// All values of one feature column.
    #[must_use]
    pub fn column(&self, feature: VitalFeature) -> Vec<f64> {
        self.rows.iter().map(|row| row[feature.index()]).collect()
    }

    /// Splits one feature column by label into `(normal, deteriorating)` values.
    #[must_use]
    pub fn column_by_label(&self, feature: VitalFeature) -> (Vec<f64>, Vec<f64>) {
        let mut normal = vec![];
        let mut deteriorating = vec![];
        for (row, &label) in self.rows.iter().zip(&self.labels) {
            let value = row[feature.index()];
            if label == 1 {
                deteriorating.push(value);
            } else {
                normal.push(value);
            }
        }
        (normal, deteriorating)
    }

    /// Number of rows labelled as deterioration.
    #[must_use]
    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    /// Share of rows labelled as deterioration (`NaN` when empty).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn positive_rate(&self) -> f64 {
        self.positive_count() as f64 / self.len() as f64
    }

    /// New dataset containing the given rows, in the given order.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const HEADER: &str =
        "heart_rate,spo2_pct,respiratory_rate,systolic_bp,diastolic_bp,temperature_c,deterioration_next_12h";

    #[test]
    fn test_parses_rows_in_canonical_order() {
        let csv = format!("{HEADER}\n80,97,16,120,80,36.8,0\n120,88,28,90,55,38.9,1\n");
        let dataset = Dataset::from_reader(csv.as_bytes(), "inline").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1], [120.0, 88.0, 28.0, 90.0, 55.0, 38.9]);
        assert_eq!(dataset.labels(), &[0, 1]);
        assert_eq!(dataset.positive_count(), 1);
        assert_eq!(dataset.column(VitalFeature::Spo2), vec![97.0, 88.0]);
    }

    #[test]
    fn test_extra_columns_and_order_are_tolerated() {
        let csv = "patient_id,deterioration_next_12h,temperature_c,diastolic_bp,systolic_bp,respiratory_rate,spo2_pct,heart_rate\n\
                   7,1.0,37.5,70,110,20,95,90\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), "inline").unwrap();
        assert_eq!(dataset.rows()[0], [90.0, 95.0, 20.0, 110.0, 70.0, 37.5]);
        assert_eq!(dataset.labels(), &[1]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "heart_rate,spo2_pct,respiratory_rate,systolic_bp,diastolic_bp,deterioration_next_12h\n\
                   80,97,16,120,80,0\n";
        let err = Dataset::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: "temperature_c",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_label_is_rejected() {
        let csv = format!("{HEADER}\n80,97,16,120,80,36.8,2\n");
        let err = Dataset::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { row: 1, .. }));
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let csv = format!("{HEADER}\n");
        let err = Dataset::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DatasetError::Empty { .. }));
    }

    #[test]
    fn test_non_numeric_value_is_csv_error() {
        let csv = format!("{HEADER}\nfast,97,16,120,80,36.8,0\n");
        let err = Dataset::from_reader(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DatasetError::Csv { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "80,97,16,120,80,36.8,0").unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Csv { .. }));
    }

    #[test]
    fn test_column_by_label_and_subset() {
        let dataset = Dataset::from_parts(
            vec![[1.0; 6], [2.0; 6], [3.0; 6], [4.0; 6]],
            vec![0, 1, 0, 1],
        );
        let (normal, deteriorating) = dataset.column_by_label(VitalFeature::HeartRate);
        assert_eq!(normal, vec![1.0, 3.0]);
        assert_eq!(deteriorating, vec![2.0, 4.0]);

        let subset = dataset.subset(&[3, 0]);
        assert_eq!(subset.labels(), &[1, 0]);
        assert_eq!(subset.rows()[0], [4.0; 6]);
        assert!((dataset.positive_rate() - 0.5).abs() < 1e-12);
    }
}
