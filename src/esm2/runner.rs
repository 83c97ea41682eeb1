//! Esm2Runner
//!
//! Loads an ESM2 checkpoint with its tokenizer and extracts mean-pooled
//! sequence embeddings.

use super::config::ESM2Config;
use super::model::ESM2;
use crate::error::{EmbedError, Result};
use crate::registry::ModelConfig;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;

pub const DTYPE: DType = DType::F32;

pub struct Esm2Runner {
    model: ESM2,
    tokenizer: Tokenizer,
    device: Device,
}

impl Esm2Runner {
    /// Fetch `config.json` and `model.safetensors` for the configured
    /// checkpoint and load the model onto `device`.
    pub fn load(config: &ModelConfig, device: Device) -> Result<Esm2Runner> {
        let load_err =
            |e: &dyn std::fmt::Display| EmbedError::ModelLoad(format!("{}: {}", config.repo_id, e));

        let repo = Repo::with_revision(
            config.repo_id.to_string(),
            RepoType::Model,
            config.revision.to_string(),
        );
        let (config_filename, weights_filename) = {
            let api = Api::new().map_err(|e| load_err(&e))?;
            let api = api.repo(repo);
            let config = api.get("config.json").map_err(|e| load_err(&e))?;
            let weights = api.get("model.safetensors").map_err(|e| load_err(&e))?;
            (config, weights)
        };
        let config_str = std::fs::read_to_string(config_filename)?;
        let esm_config: ESM2Config =
            serde_json::from_str(&config_str).map_err(|e| load_err(&e))?;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_filename], DTYPE, &device)
                .map_err(|e| load_err(&e))?
        };
        let model = ESM2::load(vb, &esm_config).map_err(|e| load_err(&e))?;
        let tokenizer = Self::load_tokenizer()?;
        Ok(Esm2Runner {
            model,
            tokenizer,
            device,
        })
    }

    /// Assemble a runner from already-loaded parts.
    pub fn from_parts(model: ESM2, tokenizer: Tokenizer, device: Device) -> Esm2Runner {
        Esm2Runner {
            model,
            tokenizer,
            device,
        }
    }

    /// The ESM2 tokenizer is bundled with the crate; all three registry
    /// checkpoints share it.
    pub fn load_tokenizer() -> Result<Tokenizer> {
        let tokenizer_bytes = include_bytes!("tokenizer.json");
        Tokenizer::from_bytes(tokenizer_bytes)
            .map_err(|e| EmbedError::ModelLoad(format!("failed to load tokenizer: {}", e)))
    }

    pub fn hidden_size(&self) -> usize {
        self.model.hidden_size()
    }

    /// Mean-pooled embedding for one sequence: tokenize to a [1, L]
    /// batch, run the forward pass, and average the last hidden-state
    /// layer over every token position. The `<cls>`/`<eos>` markers the
    /// tokenizer inserts are part of the mean. An empty sequence encodes
    /// to those two markers alone and pools over them.
    pub fn embed(&self, sequence: &str) -> Result<Vec<f32>> {
        let tokens = self
            .tokenizer
            .encode(sequence, true)
            .map_err(|e| EmbedError::Inference(format!("tokenization failed: {}", e)))?;
        self.mean_pool(tokens.get_ids())
            .map_err(|e| EmbedError::Inference(format!("forward pass failed: {}", e)))
    }

    fn mean_pool(&self, token_ids: &[u32]) -> candle_core::Result<Vec<f32>> {
        let token_ids = Tensor::new(token_ids, &self.device)?.unsqueeze(0)?;
        // last_hidden_state is hidden_states[-1]: the final layer's
        // output after the closing layer norm.
        let results = self.model.forward(&token_ids, false)?;
        let representations = results.last_hidden_state.i(0)?;
        let mean_embedding = representations.mean(0)?;
        mean_embedding.to_device(&Device::Cpu)?.to_vec1::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_vocabulary_and_specials() -> Result<()> {
        let tokenizer = Esm2Runner::load_tokenizer()?;
        let encoding = tokenizer
            .encode("MLKLRV", true)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        assert_eq!(
            encoding.get_ids(),
            &[0u32, 20, 4, 15, 4, 10, 7, 2],
            "expected <cls> M L K L R V <eos>"
        );
        Ok(())
    }

    #[test]
    fn test_tokenizer_without_specials_matches_residues() -> Result<()> {
        let tokenizer = Esm2Runner::load_tokenizer()?;
        let encoding = tokenizer
            .encode("MLKLRV", false)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        assert_eq!(encoding.get_tokens(), &["M", "L", "K", "L", "R", "V"]);
        Ok(())
    }

    #[test]
    fn test_empty_sequence_encodes_to_cls_eos() -> Result<()> {
        let tokenizer = Esm2Runner::load_tokenizer()?;
        let encoding = tokenizer
            .encode("", true)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        assert_eq!(encoding.get_ids(), &[0u32, 2]);
        Ok(())
    }

    #[test]
    fn test_unknown_residue_maps_to_unk() -> Result<()> {
        let tokenizer = Esm2Runner::load_tokenizer()?;
        let encoding = tokenizer
            .encode("M1V", true)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        assert_eq!(encoding.get_ids(), &[0u32, 20, 3, 7, 2]);
        Ok(())
    }
}
