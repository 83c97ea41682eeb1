//! Candle port of the ESM2 protein language model, trunk only.
//!
//! Loads the published `facebook/esm2_*` checkpoint layout (and its
//! fine-tunes) from safetensors. The masked-LM and contact heads are not
//! instantiated; embedding extraction needs only the encoder trunk. The
//! port has no dropout layers and no gradient tracking, so a loaded model
//! is in inference mode by construction.
//!
//! - [ESM2](https://github.com/facebookresearch/esm)
//! - [HF checkpoint](https://huggingface.co/facebook/esm2_t33_650M_UR50D)

use super::config::ESM2Config;
use super::encoder::EsmLayer;
use candle_core::{DType, Module, Result, Tensor, D};
use candle_nn::{self as nn, Embedding, LayerNorm, VarBuilder};

// Training-time masking rate (0.15 * 0.8), baked into the token-dropout
// rescale of the reference implementation.
const MASK_RATIO_TRAIN: f32 = 0.15 * 0.8;

#[derive(Debug)]
pub struct ESM2 {
    word_embeddings: Embedding,
    emb_layer_norm_before: Option<LayerNorm>,
    layers: Vec<EsmLayer>,
    emb_layer_norm_after: LayerNorm,
    config: ESM2Config,
}

/// Forward-pass output.
///
/// `hidden_states`, when requested, holds the embedding output followed by
/// each layer's output; its final entry is taken after the closing
/// LayerNorm and equals `last_hidden_state`.
#[derive(Debug)]
pub struct ModelOutput {
    pub last_hidden_state: Tensor,
    pub hidden_states: Option<Vec<Tensor>>,
}

impl ESM2 {
    pub fn load(vb: VarBuilder, config: &ESM2Config) -> Result<Self> {
        if config.position_embedding_type != "rotary" {
            return Err(candle_core::Error::Msg(format!(
                "unsupported position embedding type: {}",
                config.position_embedding_type
            )));
        }
        let vb = vb.pp("esm");
        let word_embeddings = nn::embedding(
            config.vocab_size,
            config.hidden_size,
            vb.pp("embeddings").pp("word_embeddings"),
        )?;
        let ln_conf = nn::LayerNormConfig {
            eps: config.layer_norm_eps,
            remove_mean: true,
            affine: true,
        };
        let emb_layer_norm_before = if config.emb_layer_norm_before {
            Some(nn::layer_norm(
                config.hidden_size,
                ln_conf,
                vb.pp("embeddings").pp("layer_norm"),
            )?)
        } else {
            None
        };

        let encoder = vb.pp("encoder");
        let mut layers = Vec::with_capacity(config.num_hidden_layers);
        for i in 0..config.num_hidden_layers {
            layers.push(EsmLayer::load(encoder.pp("layer").pp(i), config)?);
        }
        let emb_layer_norm_after = nn::layer_norm(
            config.hidden_size,
            ln_conf,
            encoder.pp("emb_layer_norm_after"),
        )?;

        Ok(Self {
            word_embeddings,
            emb_layer_norm_before,
            layers,
            emb_layer_norm_after,
            config: config.clone(),
        })
    }

    pub fn forward(&self, src: &Tensor, output_hidden_states: bool) -> Result<ModelOutput> {
        let mut hidden_states = vec![];
        let mut x = self.embed_tokens(src)?;
        if let Some(layer_norm) = &self.emb_layer_norm_before {
            x = layer_norm.forward(&x)?;
        }
        for layer in self.layers.iter() {
            if output_hidden_states {
                hidden_states.push(x.clone());
            }
            x = layer.forward(&x)?;
        }
        let x = self.emb_layer_norm_after.forward(&x)?;
        if output_hidden_states {
            hidden_states.push(x.clone());
        }

        Ok(ModelOutput {
            last_hidden_state: x,
            hidden_states: if output_hidden_states {
                Some(hidden_states)
            } else {
                None
            },
        })
    }

    // Token embedding with the ESM2 token-dropout rescale: masked
    // positions are zeroed and the batch is rescaled by
    // (1 - mask_ratio_train) / (1 - observed mask ratio). With no <mask>
    // tokens present the factor is a constant 0.88, exactly as in the
    // reference implementation.
    fn embed_tokens(&self, src: &Tensor) -> Result<Tensor> {
        let mut x = self.word_embeddings.forward(src)?;
        if self.config.token_dropout {
            let mask = src.eq(self.config.mask_token_id)?;
            let n_masked = mask.to_dtype(DType::F32)?.sum_all()?.to_scalar::<f32>()?;
            if n_masked > 0.0 {
                let keep = src
                    .ne(self.config.mask_token_id)?
                    .to_dtype(x.dtype())?
                    .unsqueeze(D::Minus1)?;
                x = x.broadcast_mul(&keep)?;
            }
            let mask_ratio_observed = n_masked / src.elem_count() as f32;
            let scale = (1.0 - MASK_RATIO_TRAIN) / (1.0 - mask_ratio_observed);
            x = (x * scale as f64)?;
        }
        Ok(x)
    }

    pub fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }
}
