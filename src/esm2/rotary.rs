//! Rotary position embedding as used by ESM2 attention.

use candle_core::{DType, Device, Result, Tensor, D};

fn rotate_half(x: &Tensor) -> Result<Tensor> {
    let chunks = x.chunk(2, D::Minus1)?;
    let neg_x2 = chunks[1].neg()?;
    Tensor::cat(&[&neg_x2, &chunks[0]], D::Minus1)
}

fn apply_rotary_pos_emb(x: &Tensor, cos: &Tensor, sin: &Tensor) -> Result<Tensor> {
    let x_cos = x.broadcast_mul(cos)?;
    let x_sin = rotate_half(x)?.broadcast_mul(sin)?;
    x_cos.add(&x_sin)
}

/// Cos/sin tables are precomputed to the model maximum length at load
/// time and narrowed per forward, so application takes `&self`.
#[derive(Debug, Clone)]
pub struct RotaryEmbedding {
    cos: Tensor,
    sin: Tensor,
}

impl RotaryEmbedding {
    // inv_freq is keyed to the per-head dimension; the checkpoint carries
    // the same values as a buffer, which therefore need not be loaded.
    pub fn new(head_dim: usize, max_positions: usize, device: &Device) -> Result<Self> {
        let inv_freq = (0..head_dim)
            .step_by(2)
            .map(|i| 1f32 / 10000f32.powf(i as f32 / head_dim as f32))
            .collect::<Vec<_>>();
        let inv_freq = Tensor::new(inv_freq, device)?;
        let t = Tensor::arange(0u32, max_positions as u32, device)?.to_dtype(DType::F32)?;
        let freqs = t.unsqueeze(1)?.matmul(&inv_freq.unsqueeze(0)?)?;
        let emb = Tensor::cat(&[&freqs, &freqs], D::Minus1)?;
        Ok(Self {
            cos: emb.cos()?,
            sin: emb.sin()?,
        })
    }

    /// Rotate query and key, both shaped [batch, heads, seq, head_dim].
    pub fn apply(&self, q: &Tensor, k: &Tensor) -> Result<(Tensor, Tensor)> {
        let seq_len = q.dim(D::Minus2)?;
        let cos = self.cos.narrow(0, 0, seq_len)?.unsqueeze(0)?.unsqueeze(0)?;
        let sin = self.sin.narrow(0, 0, seq_len)?.unsqueeze(0)?.unsqueeze(0)?;
        Ok((
            apply_rotary_pos_emb(q, &cos, &sin)?,
            apply_rotary_pos_emb(k, &cos, &sin)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_preserves_shape() -> Result<()> {
        let device = Device::Cpu;
        let rotary = RotaryEmbedding::new(8, 16, &device)?;
        let q = Tensor::ones((1, 2, 5, 8), DType::F32, &device)?;
        let k = Tensor::ones((1, 2, 5, 8), DType::F32, &device)?;
        let (q_rot, k_rot) = rotary.apply(&q, &k)?;
        assert_eq!(q_rot.dims(), &[1, 2, 5, 8]);
        assert_eq!(k_rot.dims(), &[1, 2, 5, 8]);
        Ok(())
    }

    #[test]
    fn test_position_zero_is_identity() -> Result<()> {
        // cos(0) = 1, sin(0) = 0, so the first position must pass through.
        let device = Device::Cpu;
        let rotary = RotaryEmbedding::new(4, 8, &device)?;
        let x = Tensor::new(&[[[[1f32, 2., 3., 4.]]]], &device)?;
        let (x_rot, _) = rotary.apply(&x, &x)?;
        let values = x_rot.flatten_all()?.to_vec1::<f32>()?;
        assert_eq!(values, vec![1., 2., 3., 4.]);
        Ok(())
    }
}
