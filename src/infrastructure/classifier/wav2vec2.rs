//! Wav2Vec2 audio sequence classifier in the Hugging Face
//! `Wav2Vec2ForSequenceClassification` checkpoint layout.
//!
//! Covers the base (group-norm feature encoder, post-norm transformer) and the
//! large "stable layer norm" variants, with optional weighted layer sum.

use std::collections::HashMap;

use candle_core::{Module, Result, Tensor, bail};
use candle_nn::{
    Activation, Conv1d, Conv1dConfig, GroupNorm, Init, LayerNorm, Linear, VarBuilder,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatExtractNorm {
    Group,
    Layer,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    pub hidden_act: Activation,
    pub layer_norm_eps: f64,
    pub feat_extract_norm: FeatExtractNorm,
    pub feat_extract_activation: Activation,
    pub conv_dim: Vec<usize>,
    pub conv_stride: Vec<usize>,
    pub conv_kernel: Vec<usize>,
    pub conv_bias: bool,
    pub num_conv_pos_embeddings: usize,
    pub num_conv_pos_embedding_groups: usize,
    pub do_stable_layer_norm: bool,
    pub use_weighted_layer_sum: bool,
    pub classifier_proj_size: usize,
    pub id2label: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden_size: 768,
            num_hidden_layers: 12,
            num_attention_heads: 12,
            intermediate_size: 3072,
            hidden_act: Activation::Gelu,
            layer_norm_eps: 1e-5,
            feat_extract_norm: FeatExtractNorm::Group,
            feat_extract_activation: Activation::Gelu,
            conv_dim: vec![512; 7],
            conv_stride: vec![5, 2, 2, 2, 2, 2, 2],
            conv_kernel: vec![10, 3, 3, 3, 3, 2, 2],
            conv_bias: false,
            num_conv_pos_embeddings: 128,
            num_conv_pos_embedding_groups: 16,
            do_stable_layer_norm: false,
            use_weighted_layer_sum: false,
            classifier_proj_size: 256,
            id2label: HashMap::new(),
        }
    }
}

impl Config {
    /// Label names ordered by index. Missing entries get the `LABEL_{i}` name
    /// transformers assigns by default.
    pub fn labels(&self) -> Vec<String> {
        let num_labels = if self.id2label.is_empty() {
            2
        } else {
            self.id2label.len()
        };
        (0..num_labels)
            .map(|i| {
                self.id2label
                    .get(&i.to_string())
                    .cloned()
                    .unwrap_or_else(|| format!("LABEL_{i}"))
            })
            .collect()
    }
}

// Both torch norms in the feature encoder use their default epsilon.
const CONV_NORM_EPS: f64 = 1e-5;

enum ConvNorm {
    Group(GroupNorm),
    Layer(LayerNorm),
}

struct FeatureEncoderLayer {
    conv: Conv1d,
    norm: Option<ConvNorm>,
    activation: Activation,
}

impl FeatureEncoderLayer {
    fn load(layer_id: usize, cfg: &Config, vb: VarBuilder) -> Result<Self> {
        let in_dim = if layer_id == 0 {
            1
        } else {
            cfg.conv_dim[layer_id - 1]
        };
        let out_dim = cfg.conv_dim[layer_id];
        let conv_cfg = Conv1dConfig {
            stride: cfg.conv_stride[layer_id],
            ..Default::default()
        };
        let kernel = cfg.conv_kernel[layer_id];

        let conv = if cfg.conv_bias {
            candle_nn::conv1d(in_dim, out_dim, kernel, conv_cfg, vb.pp("conv"))?
        } else {
            candle_nn::conv1d_no_bias(in_dim, out_dim, kernel, conv_cfg, vb.pp("conv"))?
        };

        let norm = match cfg.feat_extract_norm {
            FeatExtractNorm::Group if layer_id == 0 => Some(ConvNorm::Group(
                candle_nn::group_norm(out_dim, out_dim, CONV_NORM_EPS, vb.pp("layer_norm"))?,
            )),
            FeatExtractNorm::Group => None,
            FeatExtractNorm::Layer => Some(ConvNorm::Layer(candle_nn::layer_norm(
                out_dim,
                CONV_NORM_EPS,
                vb.pp("layer_norm"),
            )?)),
        };

        Ok(Self {
            conv,
            norm,
            activation: cfg.feat_extract_activation,
        })
    }
}

impl Module for FeatureEncoderLayer {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = self.conv.forward(xs)?;
        let xs = match &self.norm {
            Some(ConvNorm::Group(norm)) => norm.forward(&xs)?,
            Some(ConvNorm::Layer(norm)) => norm
                .forward(&xs.transpose(1, 2)?.contiguous()?)?
                .transpose(1, 2)?,
            None => xs,
        };
        self.activation.forward(&xs)
    }
}

struct FeatureProjection {
    layer_norm: LayerNorm,
    projection: Linear,
}

impl FeatureProjection {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        let conv_out = *cfg.conv_dim.last().unwrap_or(&cfg.hidden_size);
        Ok(Self {
            layer_norm: candle_nn::layer_norm(conv_out, cfg.layer_norm_eps, vb.pp("layer_norm"))?,
            projection: candle_nn::linear(conv_out, cfg.hidden_size, vb.pp("projection"))?,
        })
    }
}

impl Module for FeatureProjection {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.projection.forward(&self.layer_norm.forward(xs)?)
    }
}

/// Grouped convolution over time with a weight-normalized kernel.
struct PositionalConvEmbedding {
    conv: Conv1d,
    drop_last_frame: bool,
    activation: Activation,
}

impl PositionalConvEmbedding {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        let vb = vb.pp("conv");
        let kernel = cfg.num_conv_pos_embeddings;
        let groups = cfg.num_conv_pos_embedding_groups;
        let hidden = cfg.hidden_size;
        if groups == 0 || hidden % groups != 0 {
            bail!("hidden_size {hidden} is not divisible by {groups} positional conv groups");
        }
        let weight_shape = (hidden, hidden / groups, kernel);

        // Older checkpoints store weight_g/weight_v, newer ones use torch parametrizations.
        let (magnitude, direction) = if vb.contains_tensor("weight_g") {
            (
                vb.get_with_hints((1, 1, kernel), "weight_g", Init::Const(1.0))?,
                vb.get_with_hints(weight_shape, "weight_v", candle_nn::init::DEFAULT_KAIMING_NORMAL)?,
            )
        } else {
            let vb = vb.pp("parametrizations").pp("weight");
            (
                vb.get_with_hints((1, 1, kernel), "original0", Init::Const(1.0))?,
                vb.get_with_hints(weight_shape, "original1", candle_nn::init::DEFAULT_KAIMING_NORMAL)?,
            )
        };

        // weight_norm(dim=2): the norm spans every axis except the kernel axis.
        let norm = direction
            .sqr()?
            .sum_keepdim(0)?
            .sum_keepdim(1)?
            .sqrt()?;
        let weight = direction.broadcast_mul(&magnitude.broadcast_div(&norm)?)?;
        let bias = vb.get_with_hints(hidden, "bias", Init::Const(0.0))?;

        let conv_cfg = Conv1dConfig {
            padding: kernel / 2,
            groups,
            ..Default::default()
        };

        Ok(Self {
            conv: Conv1d::new(weight, Some(bias), conv_cfg),
            drop_last_frame: kernel % 2 == 0,
            activation: cfg.feat_extract_activation,
        })
    }
}

impl Module for PositionalConvEmbedding {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = self.conv.forward(&xs.transpose(1, 2)?.contiguous()?)?;
        let xs = if self.drop_last_frame {
            let frames = xs.dim(2)?;
            xs.narrow(2, 0, frames.saturating_sub(1))?
        } else {
            xs
        };
        self.activation.forward(&xs)?.transpose(1, 2)
    }
}

struct Attention {
    q_proj: Linear,
    k_proj: Linear,
    v_proj: Linear,
    out_proj: Linear,
    num_heads: usize,
    head_dim: usize,
    scaling: f64,
}

impl Attention {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        let hidden = cfg.hidden_size;
        let num_heads = cfg.num_attention_heads;
        if num_heads == 0 || hidden % num_heads != 0 {
            bail!("hidden_size {hidden} is not divisible by {num_heads} attention heads");
        }
        let head_dim = hidden / num_heads;
        Ok(Self {
            q_proj: candle_nn::linear(hidden, hidden, vb.pp("q_proj"))?,
            k_proj: candle_nn::linear(hidden, hidden, vb.pp("k_proj"))?,
            v_proj: candle_nn::linear(hidden, hidden, vb.pp("v_proj"))?,
            out_proj: candle_nn::linear(hidden, hidden, vb.pp("out_proj"))?,
            num_heads,
            head_dim,
            scaling: (head_dim as f64).powf(-0.5),
        })
    }

    fn split_heads(&self, xs: &Tensor, batch: usize, frames: usize) -> Result<Tensor> {
        xs.reshape((batch, frames, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }
}

impl Module for Attention {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let (batch, frames, hidden) = xs.dims3()?;

        let q = (self.q_proj.forward(xs)? * self.scaling)?;
        let q = self.split_heads(&q, batch, frames)?;
        let k = self.split_heads(&self.k_proj.forward(xs)?, batch, frames)?;
        let v = self.split_heads(&self.v_proj.forward(xs)?, batch, frames)?;

        let weights = candle_nn::ops::softmax_last_dim(&q.matmul(&k.t()?.contiguous()?)?)?;
        let attended = weights
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, frames, hidden))?;

        self.out_proj.forward(&attended)
    }
}

struct FeedForward {
    intermediate_dense: Linear,
    output_dense: Linear,
    activation: Activation,
}

impl FeedForward {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            intermediate_dense: candle_nn::linear(
                cfg.hidden_size,
                cfg.intermediate_size,
                vb.pp("intermediate_dense"),
            )?,
            output_dense: candle_nn::linear(
                cfg.intermediate_size,
                cfg.hidden_size,
                vb.pp("output_dense"),
            )?,
            activation: cfg.hidden_act,
        })
    }
}

impl Module for FeedForward {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = self.activation.forward(&self.intermediate_dense.forward(xs)?)?;
        self.output_dense.forward(&xs)
    }
}

struct EncoderLayer {
    attention: Attention,
    layer_norm: LayerNorm,
    feed_forward: FeedForward,
    final_layer_norm: LayerNorm,
    pre_norm: bool,
}

impl EncoderLayer {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            attention: Attention::load(cfg, vb.pp("attention"))?,
            layer_norm: candle_nn::layer_norm(cfg.hidden_size, cfg.layer_norm_eps, vb.pp("layer_norm"))?,
            feed_forward: FeedForward::load(cfg, vb.pp("feed_forward"))?,
            final_layer_norm: candle_nn::layer_norm(
                cfg.hidden_size,
                cfg.layer_norm_eps,
                vb.pp("final_layer_norm"),
            )?,
            pre_norm: cfg.do_stable_layer_norm,
        })
    }
}

impl Module for EncoderLayer {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        if self.pre_norm {
            let attended = self.attention.forward(&self.layer_norm.forward(xs)?)?;
            let xs = (xs + attended)?;
            let ff = self
                .feed_forward
                .forward(&self.final_layer_norm.forward(&xs)?)?;
            xs + ff
        } else {
            let attended = self.attention.forward(xs)?;
            let xs = self.layer_norm.forward(&(xs + attended)?)?;
            let ff = self.feed_forward.forward(&xs)?;
            self.final_layer_norm.forward(&(xs + ff)?)
        }
    }
}

struct Encoder {
    pos_conv_embed: PositionalConvEmbedding,
    layer_norm: LayerNorm,
    layers: Vec<EncoderLayer>,
    pre_norm: bool,
}

impl Encoder {
    fn load(cfg: &Config, vb: VarBuilder) -> Result<Self> {
        let layers = (0..cfg.num_hidden_layers)
            .map(|i| EncoderLayer::load(cfg, vb.pp("layers").pp(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pos_conv_embed: PositionalConvEmbedding::load(cfg, vb.pp("pos_conv_embed"))?,
            layer_norm: candle_nn::layer_norm(cfg.hidden_size, cfg.layer_norm_eps, vb.pp("layer_norm"))?,
            layers,
            pre_norm: cfg.do_stable_layer_norm,
        })
    }

    /// Returns the embedding output followed by the output of every layer.
    fn forward_hidden_states(&self, xs: &Tensor) -> Result<Vec<Tensor>> {
        let mut xs = (xs + self.pos_conv_embed.forward(xs)?)?;
        let mut states = Vec::with_capacity(self.layers.len() + 1);

        if self.pre_norm {
            for layer in &self.layers {
                states.push(xs.clone());
                xs = layer.forward(&xs)?;
            }
            states.push(self.layer_norm.forward(&xs)?);
        } else {
            xs = self.layer_norm.forward(&xs)?;
            states.push(xs.clone());
            for layer in &self.layers {
                xs = layer.forward(&xs)?;
                states.push(xs.clone());
            }
        }

        Ok(states)
    }
}

pub struct Wav2Vec2ForSequenceClassification {
    feature_encoder: Vec<FeatureEncoderLayer>,
    feature_projection: FeatureProjection,
    encoder: Encoder,
    layer_weights: Option<Tensor>,
    projector: Linear,
    classifier: Linear,
    num_labels: usize,
}

impl Wav2Vec2ForSequenceClassification {
    pub fn load(vb: VarBuilder, cfg: &Config) -> Result<Self> {
        let conv_layers = cfg.conv_dim.len();
        if conv_layers == 0
            || cfg.conv_stride.len() != conv_layers
            || cfg.conv_kernel.len() != conv_layers
        {
            bail!(
                "conv_dim, conv_stride and conv_kernel must be non-empty and of equal length, got {}/{}/{}",
                conv_layers,
                cfg.conv_stride.len(),
                cfg.conv_kernel.len()
            );
        }

        let base = vb.pp("wav2vec2");
        let feature_encoder = (0..conv_layers)
            .map(|i| {
                FeatureEncoderLayer::load(i, cfg, base.pp("feature_extractor").pp("conv_layers").pp(i))
            })
            .collect::<Result<Vec<_>>>()?;

        let layer_weights = if cfg.use_weighted_layer_sum {
            let num_states = cfg.num_hidden_layers + 1;
            Some(vb.get_with_hints(
                num_states,
                "layer_weights",
                Init::Const(1.0 / num_states as f64),
            )?)
        } else {
            None
        };

        let num_labels = cfg.labels().len();

        Ok(Self {
            feature_encoder,
            feature_projection: FeatureProjection::load(cfg, base.pp("feature_projection"))?,
            encoder: Encoder::load(cfg, base.pp("encoder"))?,
            layer_weights,
            projector: candle_nn::linear(cfg.hidden_size, cfg.classifier_proj_size, vb.pp("projector"))?,
            classifier: candle_nn::linear(cfg.classifier_proj_size, num_labels, vb.pp("classifier"))?,
            num_labels,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }
}

impl Module for Wav2Vec2ForSequenceClassification {
    /// `input_values`: (batch, samples) → logits: (batch, num_labels).
    fn forward(&self, input_values: &Tensor) -> Result<Tensor> {
        let mut xs = input_values.unsqueeze(1)?;
        for layer in &self.feature_encoder {
            xs = layer.forward(&xs)?;
        }
        let xs = self
            .feature_projection
            .forward(&xs.transpose(1, 2)?.contiguous()?)?;

        let mut states = self.encoder.forward_hidden_states(&xs)?;
        let hidden = match &self.layer_weights {
            Some(weights) => {
                let num_states = states.len();
                let weights = candle_nn::ops::softmax_last_dim(weights)?.reshape((1, num_states, 1, 1))?;
                Tensor::stack(&states, 1)?.broadcast_mul(&weights)?.sum(1)?
            }
            None => match states.pop() {
                Some(last) => last,
                None => bail!("encoder produced no hidden states"),
            },
        };

        let pooled = self.projector.forward(&hidden)?.mean(1)?;
        self.classifier.forward(&pooled)
    }
}
