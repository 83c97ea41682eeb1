//! ESM2
//!
//! Candle port of the ESM2 protein language model trunk plus a runner for
//! embedding extraction.
//!
//! - [GH ESM Code](https://github.com/facebookresearch/esm)
//! - [HF - 650M Model](https://huggingface.co/facebook/esm2_t33_650M_UR50D)
//! - [Paper](https://www.science.org/doi/10.1126/science.ade2574)

pub mod config;
pub mod encoder;
pub mod model;
pub mod rotary;
pub mod runner;

pub use config::ESM2Config;
pub use model::{ModelOutput, ESM2};
pub use runner::Esm2Runner;
