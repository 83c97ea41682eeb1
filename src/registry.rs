//! Model registry.
//!
//! Static mapping from each configured protein language model to the
//! HuggingFace checkpoint it loads and the artifact file it writes. All
//! three checkpoints are ESM2-650M fine-tunes and share the same
//! architecture and tokenizer.
//!
//! - [LassoESM](https://huggingface.co/ShuklaGroupIllinois/LassoESM)
//! - [ESM2](https://huggingface.co/facebook/esm2_t33_650M_UR50D)
//! - [PeptideESM](https://huggingface.co/ShuklaGroupIllinois/PeptideESM2_650M)

use crate::error::{EmbedError, Result};
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The configured embedding models, in run order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum EmbeddingModel {
    #[strum(serialize = "LassoESM")]
    LassoEsm,
    #[strum(serialize = "VanillaESM")]
    VanillaEsm,
    #[strum(serialize = "PeptideESM")]
    PeptideEsm,
}

/// Where a model's weights come from and where its embeddings go.
#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub model: EmbeddingModel,
    pub repo_id: &'static str,
    pub revision: &'static str,
    pub output_file: &'static str,
}

impl ModelConfig {
    /// Artifact path inside `out_dir`.
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(self.output_file)
    }
}

impl EmbeddingModel {
    pub fn config(&self) -> ModelConfig {
        let (repo_id, output_file) = match self {
            EmbeddingModel::LassoEsm => (
                "ShuklaGroupIllinois/LassoESM",
                "Ubonodin_embs_from_LassoESM.safetensors",
            ),
            EmbeddingModel::VanillaEsm => (
                "facebook/esm2_t33_650M_UR50D",
                "Ubonodin_embs_from_VanillaESM.safetensors",
            ),
            EmbeddingModel::PeptideEsm => (
                "ShuklaGroupIllinois/PeptideESM2_650M",
                "Ubonodin_embs_from_PeptideESM.safetensors",
            ),
        };
        ModelConfig {
            model: *self,
            repo_id,
            revision: "main",
            output_file,
        }
    }

    /// Every registry entry, in declaration order.
    pub fn all() -> Vec<ModelConfig> {
        EmbeddingModel::iter().map(|m| m.config()).collect()
    }
}

/// Look up a model by name. Fails with a `Configuration` error that
/// enumerates the valid identifiers.
pub fn resolve(name: &str) -> Result<ModelConfig> {
    name.parse::<EmbeddingModel>()
        .map(|model| model.config())
        .map_err(|_| {
            let valid = EmbeddingModel::iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            EmbedError::Configuration(format!(
                "model `{}` not configured; available models: {}",
                name, valid
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_output_files_are_unique() {
        let files: HashSet<_> = EmbeddingModel::all()
            .iter()
            .map(|c| c.output_file)
            .collect();
        assert_eq!(files.len(), EmbeddingModel::all().len());
    }

    #[test]
    fn test_resolve_known_models() {
        let config = resolve("LassoESM").unwrap();
        assert_eq!(config.model, EmbeddingModel::LassoEsm);
        assert_eq!(config.repo_id, "ShuklaGroupIllinois/LassoESM");

        let config = resolve("VanillaESM").unwrap();
        assert_eq!(config.repo_id, "facebook/esm2_t33_650M_UR50D");

        let config = resolve("PeptideESM").unwrap();
        assert_eq!(config.output_file, "Ubonodin_embs_from_PeptideESM.safetensors");
    }

    #[test]
    fn test_resolve_unknown_model_lists_valid_names() {
        let err = resolve("Unknown").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("LassoESM"));
        assert!(msg.contains("VanillaESM"));
        assert!(msg.contains("PeptideESM"));
    }

    #[test]
    fn test_run_order_is_declaration_order() {
        let order: Vec<_> = EmbeddingModel::all().iter().map(|c| c.model).collect();
        assert_eq!(
            order,
            vec![
                EmbeddingModel::LassoEsm,
                EmbeddingModel::VanillaEsm,
                EmbeddingModel::PeptideEsm
            ]
        );
    }
}
