mod candle_classifier_test;

use std::collections::HashMap;

use candle_core::{DType, Device};
use candle_nn::{Activation, VarBuilder, VarMap};
use voice_detector::infrastructure::classifier::{
    Config, FeatExtractNorm, Wav2Vec2ForSequenceClassification,
};

/// A randomly initialised model small enough to run in a unit test.
pub fn tiny_config() -> Config {
    Config {
        hidden_size: 8,
        num_hidden_layers: 2,
        num_attention_heads: 2,
        intermediate_size: 16,
        hidden_act: Activation::Gelu,
        layer_norm_eps: 1e-5,
        feat_extract_norm: FeatExtractNorm::Group,
        feat_extract_activation: Activation::Gelu,
        conv_dim: vec![4, 4],
        conv_stride: vec![5, 4],
        conv_kernel: vec![10, 4],
        conv_bias: false,
        num_conv_pos_embeddings: 4,
        num_conv_pos_embedding_groups: 2,
        do_stable_layer_norm: false,
        use_weighted_layer_sum: false,
        classifier_proj_size: 4,
        id2label: HashMap::from([
            ("0".to_string(), "bonafide".to_string()),
            ("1".to_string(), "spoof".to_string()),
        ]),
    }
}

pub fn tiny_model(config: &Config) -> (VarMap, Wav2Vec2ForSequenceClassification) {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let model = Wav2Vec2ForSequenceClassification::load(vb, config).unwrap();
    (varmap, model)
}

pub fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 0.05).sin() * 0.5 + (i as f32 * 0.013).cos() * 0.2)
        .collect()
}
