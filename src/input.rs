//! Input table parsing.
//!
//! The input is a CSV with a header row and at least three columns; the
//! third column (index 2) holds one peptide sequence per row. Rows are
//! returned in file order, with no deduplication.

use crate::error::{EmbedError, Result};
use polars::prelude::*;
use std::path::Path;

/// Index of the sequence column in the input table.
pub const SEQUENCE_COLUMN: usize = 2;

/// Read the sequence column from `path`, preserving row order.
pub fn read_sequences(path: &Path) -> Result<Vec<String>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| EmbedError::DataFormat(format!("{}: {}", path.display(), e)))?
        .finish()
        .map_err(|e| EmbedError::DataFormat(format!("{}: {}", path.display(), e)))?;

    if df.width() <= SEQUENCE_COLUMN {
        return Err(EmbedError::DataFormat(format!(
            "{}: expected at least {} columns, found {}",
            path.display(),
            SEQUENCE_COLUMN + 1,
            df.width()
        )));
    }
    if df.height() == 0 {
        return Err(EmbedError::DataFormat(format!(
            "{}: table has no rows",
            path.display()
        )));
    }

    let column = df
        .select_at_idx(SEQUENCE_COLUMN)
        .ok_or_else(|| {
            EmbedError::DataFormat(format!(
                "{}: missing column {}",
                path.display(),
                SEQUENCE_COLUMN
            ))
        })?
        .as_materialized_series();
    let column = column.str().map_err(|_| {
        EmbedError::DataFormat(format!(
            "{}: column {} is not a string column",
            path.display(),
            SEQUENCE_COLUMN
        ))
    })?;

    column
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(str::to_string).ok_or_else(|| {
                EmbedError::DataFormat(format!(
                    "{}: empty sequence cell at row {}",
                    path.display(),
                    row
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_sequences_come_from_third_column_in_row_order() {
        let file = write_csv(
            "id,score,sequence\n\
             pep1,0.81,MKTAYIAK\n\
             pep2,0.12,AGVLDNQR\n\
             pep3,0.55,PLDWKETS\n",
        );
        let seqs = read_sequences(file.path()).unwrap();
        assert_eq!(seqs, vec!["MKTAYIAK", "AGVLDNQR", "PLDWKETS"]);
    }

    #[test]
    fn test_two_column_table_is_rejected() {
        let file = write_csv("id,score\npep1,0.81\n");
        let err = read_sequences(file.path()).unwrap_err();
        assert!(err.to_string().contains("at least 3 columns"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let file = write_csv("id,score,sequence\n");
        let err = read_sequences(file.path()).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn test_missing_file_is_a_data_format_error() {
        let err = read_sequences(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, EmbedError::DataFormat(_)));
    }
}
