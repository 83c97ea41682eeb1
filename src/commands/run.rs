//! Batch runner: one input table, one artifact per configured model.

use crate::error::{EmbedError, Result};
use crate::esm2::Esm2Runner;
use crate::registry::{self, EmbeddingModel, ModelConfig};
use crate::{input, output};
use candle_core::Device;
use std::path::Path;

/// Embed every sequence in `input_table` with each configured model (or
/// the single named one) and write one artifact per model into `out_dir`.
///
/// The table is read and validated before any model is loaded. Models run
/// sequentially in registry order; a failure ends the whole run.
pub fn execute(
    input_table: &Path,
    out_dir: &Path,
    model: Option<&str>,
    device: Device,
) -> Result<()> {
    let sequences = input::read_sequences(input_table)?;
    println!("Number of sequences: {}", sequences.len());

    let configs = match model {
        Some(name) => vec![registry::resolve(name)?],
        None => EmbeddingModel::all(),
    };

    for config in &configs {
        process_model(config, &sequences, out_dir, &device)?;
    }
    Ok(())
}

fn process_model(
    config: &ModelConfig,
    sequences: &[String],
    out_dir: &Path,
    device: &Device,
) -> Result<()> {
    println!("Loading model: {}", config.model);
    let runner = Esm2Runner::load(config, device.clone())?;

    let mut seq_embs = Vec::with_capacity(sequences.len());
    for (row, sequence) in sequences.iter().enumerate() {
        let embedding = runner.embed(sequence).map_err(|e| {
            EmbedError::Inference(format!("model {}, row {}: {}", config.model, row, e))
        })?;
        seq_embs.push(embedding);
    }

    let path = config.output_path(out_dir);
    let (rows, cols) = output::write_embeddings(&path, &seq_embs)?;
    println!("Embeddings saved to: {}", path.display());
    println!("Shape of embeddings: ({}, {})", rows, cols);
    Ok(())
}
