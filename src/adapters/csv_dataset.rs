//! CSV dataset adapter.
//!
//! Columns are located by header name, so the file may order them freely;
//! every row comes out in raw schema order. Values are trimmed. Age must be a
//! whole number in the accepted range.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::schema::{self, AGE, LABEL_COLUMN, RAW_COLUMNS};
use crate::domain::FeatureRow;
use crate::ports::{DatasetError, DatasetSource, LabeledDataset};

/// Labelled dataset stored as a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read feature rows only; a label column, if present, is ignored.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or a row is malformed.
    pub fn load_features(&self) -> Result<Vec<FeatureRow>, DatasetError> {
        let file = std::fs::File::open(&self.path)?;
        Ok(read_csv(file, false)?.rows)
    }
}

impl DatasetSource for CsvDataset {
    fn load(&self) -> Result<LabeledDataset, DatasetError> {
        let file = std::fs::File::open(&self.path)?;
        let dataset = read_csv(file, true)?;
        tracing::info!(
            "Loaded {} rows from {}",
            dataset.len(),
            self.path.display()
        );
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse CSV from any reader. With `labelled`, the `Recurred` column is
/// required and returned as labels; otherwise labels are left empty.
pub(crate) fn read_csv<R: Read>(reader: R, labelled: bool) -> Result<LabeledDataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let locate = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DatasetError::MissingColumn(column.to_string()))
    };

    let feature_idx = RAW_COLUMNS
        .iter()
        .map(|&c| locate(c))
        .collect::<Result<Vec<_>, _>>()?;
    let label_idx = if labelled { Some(locate(LABEL_COLUMN)?) } else { None };

    let mut dataset = LabeledDataset::default();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based data row number, header excluded
        let row_no = i + 1;

        let mut row = FeatureRow::new();
        for (column, &idx) in RAW_COLUMNS.iter().zip(&feature_idx) {
            let raw = cell(&record, idx, row_no, column)?;
            if *column == AGE {
                let age: f64 = raw.parse().map_err(|_| DatasetError::InvalidValue {
                    row: row_no,
                    column: AGE.to_string(),
                    reason: format!("'{raw}' is not a number"),
                })?;
                let age = schema::validate_age(age).map_err(|source| DatasetError::Row {
                    row: row_no,
                    source,
                })?;
                row.push(*column, age);
            } else {
                row.push(*column, raw);
            }
        }

        if let Some(idx) = label_idx {
            dataset
                .labels
                .push(cell(&record, idx, row_no, LABEL_COLUMN)?.to_string());
        }
        dataset.rows.push(row);
    }

    if dataset.rows.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(dataset)
}

fn cell<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    row: usize,
    column: &str,
) -> Result<&'r str, DatasetError> {
    match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DatasetError::MissingValue {
            row,
            column: column.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSchema, FeatureValue};

    const HEADER: &str = "Age,Gender,Smoking,Hx Smoking,Hx Radiothreapy,Thyroid Function,Physical Examination,Adenopathy,Pathology,Focality,Risk,T,N,M,Stage,Response,Recurred";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_reads_rows_in_schema_order() {
        let text = csv_text(&[
            "27,F,No,No,No,Euthyroid,Single nodular goiter-left,No,Micropapillary,Uni-Focal,Low,T1a,N0,M0,I,Indeterminate,No",
            "51,M,Yes,No,No,Euthyroid,Multinodular goiter,Right,Papillary,Multi-Focal,High,T4a,N1b,M1,IVB,Structural Incomplete,Yes",
        ]);
        let dataset = read_csv(text.as_bytes(), true).expect("Should parse");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels, vec!["No", "Yes"]);
        let row = &dataset.rows[1];
        assert!(row.ensure_schema(&FeatureSchema::raw(), "test").is_ok());
        assert_eq!(row.get("Age"), Some(&FeatureValue::Numeric(51.0)));
        assert_eq!(row.get("Stage").and_then(FeatureValue::as_category), Some("IVB"));
    }

    #[test]
    fn test_columns_located_by_name() {
        let text = "Recurred,Response,Stage,M,N,T,Risk,Focality,Pathology,Adenopathy,Physical Examination,Thyroid Function,Hx Radiothreapy,Hx Smoking,Smoking,Gender,Age\n\
                    No,Excellent,I,M0,N0,T1b,Low,Uni-Focal,Papillary,No,Normal,Euthyroid,No,No,No,F,34";
        let dataset = read_csv(text.as_bytes(), true).expect("Should parse");
        let columns: Vec<&str> = dataset.rows[0].columns().collect();
        assert_eq!(columns, RAW_COLUMNS.to_vec());
        assert_eq!(dataset.rows[0].get("T").and_then(FeatureValue::as_category), Some("T1b"));
    }

    #[test]
    fn test_missing_label_column() {
        let text = "Age,Gender\n30,F";
        assert!(matches!(
            read_csv(text.as_bytes(), true),
            Err(DatasetError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_unlabelled_ignores_label() {
        let header = &HEADER[..HEADER.len() - ",Recurred".len()];
        let text = format!(
            "{header}\n40,F,No,No,No,Euthyroid,Normal,No,Papillary,Uni-Focal,Low,T2,N0,M0,I,Excellent"
        );
        let dataset = read_csv(text.as_bytes(), false).expect("Should parse");
        assert_eq!(dataset.rows.len(), 1);
        assert!(dataset.labels.is_empty());
    }

    #[test]
    fn test_bad_age_and_empty_cell() {
        let over = csv_text(&[
            "111,F,No,No,No,Euthyroid,Normal,No,Papillary,Uni-Focal,Low,T2,N0,M0,I,Excellent,No",
        ]);
        assert!(matches!(
            read_csv(over.as_bytes(), true),
            Err(DatasetError::Row { row: 1, .. })
        ));

        let text = csv_text(&[
            "forty,F,No,No,No,Euthyroid,Normal,No,Papillary,Uni-Focal,Low,T2,N0,M0,I,Excellent,No",
        ]);
        assert!(matches!(
            read_csv(text.as_bytes(), true),
            Err(DatasetError::InvalidValue { row: 1, .. })
        ));

        let empty = csv_text(&[
            "40,F,No,No,No,Euthyroid,Normal,No,Papillary,,Low,T2,N0,M0,I,Excellent,No",
        ]);
        assert!(matches!(
            read_csv(empty.as_bytes(), true),
            Err(DatasetError::MissingValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            read_csv(HEADER.as_bytes(), true),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            csv_text(&["40,F,No,No,No,Euthyroid,Normal,No,Papillary,Uni-Focal,Low,T2,N0,M0,I,Excellent,No"]),
        )
        .expect("write");

        let source = CsvDataset::new(&path);
        assert_eq!(source.load().expect("load").len(), 1);
        assert_eq!(source.load_features().expect("features").len(), 1);
    }
}
