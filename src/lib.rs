//! lasso-embed
//!
//! Mean-pooled ESM2 embeddings for lasso peptide sequence tables.
//!
//! For each configured model the pipeline loads the checkpoint, runs every
//! sequence of the input CSV through one forward pass, averages the final
//! hidden-state layer over token positions, and writes a (rows × hidden)
//! f32 matrix to a safetensors artifact.
//!
//! ```shell
//! cargo run --release -- run --input Ubonodin_full_seq_with_score.csv
//! ```

pub mod cli;
pub mod commands;
pub mod device;
pub mod error;
pub mod esm2;
pub mod input;
pub mod output;
pub mod registry;

pub use error::{EmbedError, Result};
pub use esm2::{ESM2Config, Esm2Runner, ModelOutput, ESM2};
pub use registry::{resolve, EmbeddingModel, ModelConfig};
