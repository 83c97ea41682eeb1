use serde::Deserialize;

/// ESM2 model hyperparameters, deserialized from a checkpoint's
/// `config.json`. Fields the embedding path does not consume are ignored.
///
/// - [ESM2 config](https://huggingface.co/facebook/esm2_t33_650M_UR50D/blob/main/config.json)
#[derive(Debug, Clone, Deserialize)]
pub struct ESM2Config {
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    pub vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default = "default_max_position_embeddings")]
    pub max_position_embeddings: usize,
    #[serde(default = "default_pad_token_id")]
    pub pad_token_id: u32,
    #[serde(default = "default_mask_token_id")]
    pub mask_token_id: u32,
    #[serde(default)]
    pub emb_layer_norm_before: bool,
    #[serde(default = "default_token_dropout")]
    pub token_dropout: bool,
    #[serde(default = "default_position_embedding_type")]
    pub position_embedding_type: String,
}

fn default_layer_norm_eps() -> f64 {
    1e-5
}
fn default_max_position_embeddings() -> usize {
    1026
}
fn default_pad_token_id() -> u32 {
    1
}
fn default_mask_token_id() -> u32 {
    32
}
fn default_token_dropout() -> bool {
    true
}
fn default_position_embedding_type() -> String {
    "rotary".to_string()
}

impl ESM2Config {
    /// The published esm2_t33_650M_UR50D configuration, shared by every
    /// registry checkpoint.
    pub fn esm2_t33_650m() -> Self {
        Self {
            hidden_size: 1280,
            num_hidden_layers: 33,
            num_attention_heads: 20,
            intermediate_size: 5120,
            vocab_size: 33,
            layer_norm_eps: 1e-5,
            max_position_embeddings: 1026,
            pad_token_id: 1,
            mask_token_id: 32,
            emb_layer_norm_before: false,
            token_dropout: true,
            position_embedding_type: "rotary".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses_from_checkpoint_json() {
        // Abridged from the published esm2_t33_650M_UR50D config.json.
        let json = r#"{
            "architectures": ["EsmForMaskedLM"],
            "attention_probs_dropout_prob": 0.0,
            "hidden_size": 1280,
            "intermediate_size": 5120,
            "mask_token_id": 32,
            "max_position_embeddings": 1026,
            "model_type": "esm",
            "num_attention_heads": 20,
            "num_hidden_layers": 33,
            "pad_token_id": 1,
            "position_embedding_type": "rotary",
            "token_dropout": true,
            "vocab_size": 33
        }"#;
        let config: ESM2Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.hidden_size, 1280);
        assert_eq!(config.num_hidden_layers, 33);
        assert!(config.token_dropout);
        assert!(!config.emb_layer_norm_before);
        assert_eq!(config.position_embedding_type, "rotary");
    }
}
