use super::config::ESM2Config;
use super::rotary::RotaryEmbedding;
use candle_core::{Module, Result, Tensor, D};
use candle_nn::{self as nn, ops::softmax_last_dim, LayerNorm, Linear, VarBuilder};

/// One ESM2 transformer layer: pre-LayerNorm rotary self-attention and a
/// pre-LayerNorm GELU feed-forward block, each with a residual add.
///
/// Weight names follow the published checkpoints
/// (`attention.self.query` ... `output.dense` / `LayerNorm`).
#[derive(Debug)]
pub struct EsmLayer {
    query: Linear,
    key: Linear,
    value: Linear,
    attn_output: Linear,
    attn_layer_norm: LayerNorm,
    intermediate: Linear,
    output: Linear,
    final_layer_norm: LayerNorm,
    rotary: RotaryEmbedding,
    num_heads: usize,
    head_dim: usize,
}

impl EsmLayer {
    pub fn load(vb: VarBuilder, config: &ESM2Config) -> Result<Self> {
        let hidden = config.hidden_size;
        let head_dim = hidden / config.num_attention_heads;
        let ln_conf = nn::LayerNormConfig {
            eps: config.layer_norm_eps,
            remove_mean: true,
            affine: true,
        };

        let attn = vb.pp("attention");
        let query = nn::linear(hidden, hidden, attn.pp("self").pp("query"))?;
        let key = nn::linear(hidden, hidden, attn.pp("self").pp("key"))?;
        let value = nn::linear(hidden, hidden, attn.pp("self").pp("value"))?;
        let attn_output = nn::linear(hidden, hidden, attn.pp("output").pp("dense"))?;
        let attn_layer_norm = nn::layer_norm(hidden, ln_conf, attn.pp("LayerNorm"))?;

        let intermediate = nn::linear(
            hidden,
            config.intermediate_size,
            vb.pp("intermediate").pp("dense"),
        )?;
        let output = nn::linear(
            config.intermediate_size,
            hidden,
            vb.pp("output").pp("dense"),
        )?;
        let final_layer_norm = nn::layer_norm(hidden, ln_conf, vb.pp("LayerNorm"))?;

        let rotary = RotaryEmbedding::new(head_dim, config.max_position_embeddings, vb.device())?;

        Ok(Self {
            query,
            key,
            value,
            attn_output,
            attn_layer_norm,
            intermediate,
            output,
            final_layer_norm,
            rotary,
            num_heads: config.num_attention_heads,
            head_dim,
        })
    }

    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let normed = self.attn_layer_norm.forward(x)?;
        let attn = self.attention_block(&normed)?;
        let x = x.add(&attn)?;

        let normed = self.final_layer_norm.forward(&x)?;
        let hidden = self.intermediate.forward(&normed)?.gelu_erf()?;
        let ff = self.output.forward(&hidden)?;
        x.add(&ff)
    }

    fn attention_block(&self, x: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len, hidden) = x.dims3()?;
        let heads_shape = (batch_size, seq_len, self.num_heads, self.head_dim);

        let xq = self
            .query
            .forward(x)?
            .reshape(heads_shape)?
            .transpose(1, 2)?
            .contiguous()?;
        let xk = self
            .key
            .forward(x)?
            .reshape(heads_shape)?
            .transpose(1, 2)?
            .contiguous()?;
        let xv = self
            .value
            .forward(x)?
            .reshape(heads_shape)?
            .transpose(1, 2)?
            .contiguous()?;

        // The query is scaled before rotation, matching the checkpoint's
        // training-time order of operations.
        let scaling = (self.head_dim as f64).powf(-0.5);
        let xq = (xq * scaling)?;
        let (xq, xk) = self.rotary.apply(&xq, &xk)?;

        // (batch, heads, seq, seq)
        let scores = xq
            .contiguous()?
            .matmul(&xk.transpose(D::Minus2, D::Minus1)?.contiguous()?)?;
        let probs = softmax_last_dim(&scores)?;
        let context = probs.matmul(&xv)?;

        let context = context
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch_size, seq_len, hidden))?;
        self.attn_output.forward(&context)
    }
}
