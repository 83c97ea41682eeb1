//! Embedding artifact serialization.
//!
//! One artifact per model: a safetensors file holding a single f32 tensor
//! named `embeddings` of shape (input rows, hidden dimension), row-major,
//! row i corresponding to input row i.

use crate::error::{EmbedError, Result};
use ndarray::Array2;
use ndarray_safetensors::TensorViewWithDataBuffer;
use std::path::Path;

/// Tensor name used inside the artifact.
pub const TENSOR_NAME: &str = "embeddings";

/// Write the embedding matrix to `path` and return its (rows, cols) shape.
pub fn write_embeddings(path: &Path, rows: &[Vec<f32>]) -> Result<(usize, usize)> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);

    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for (row, vector) in rows.iter().enumerate() {
        if vector.len() != n_cols {
            return Err(EmbedError::Artifact(format!(
                "row {} has {} values, expected {}",
                row,
                vector.len(),
                n_cols
            )));
        }
        flat.extend_from_slice(vector);
    }

    let matrix = Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| EmbedError::Artifact(e.to_string()))?
        .into_dyn();
    let data = vec![(TENSOR_NAME, TensorViewWithDataBuffer::new(&matrix))];
    let serialized = safetensors::serialize(data, &None)
        .map_err(|e| EmbedError::Artifact(e.to_string()))?;
    std::fs::write(path, serialized)?;

    Ok((n_rows, n_cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_written_artifact_round_trips_with_shape_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embs.safetensors");
        let rows = vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]];

        let shape = write_embeddings(&path, &rows).unwrap();
        assert_eq!(shape, (2, 3));

        let tensors = candle_core::safetensors::load(&path, &Device::Cpu).unwrap();
        let matrix = tensors.get(TENSOR_NAME).unwrap();
        assert_eq!(matrix.dims(), &[2, 3]);
        let values = matrix.to_vec2::<f32>().unwrap();
        assert_eq!(values[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(values[1], vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embs.safetensors");
        let rows = vec![vec![1.0f32, 2.0], vec![3.0]];
        let err = write_embeddings(&path, &rows).unwrap_err();
        assert!(matches!(err, EmbedError::Artifact(_)));
    }
}
