use serde::Deserialize;

const NORMALIZATION_EPS: f32 = 1e-7;

/// The subset of `preprocessor_config.json` that affects raw waveform input.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureExtractorConfig {
    pub do_normalize: bool,
    pub sampling_rate: u32,
}

impl Default for FeatureExtractorConfig {
    fn default() -> Self {
        Self {
            do_normalize: true,
            sampling_rate: 16_000,
        }
    }
}

impl FeatureExtractorConfig {
    pub fn extract(&self, samples: &[f32]) -> Vec<f32> {
        if self.do_normalize {
            zero_mean_unit_variance(samples)
        } else {
            samples.to_vec()
        }
    }
}

pub fn zero_mean_unit_variance(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let n = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n;
    let std = (variance + NORMALIZATION_EPS).sqrt();
    samples.iter().map(|s| (s - mean) / std).collect()
}
