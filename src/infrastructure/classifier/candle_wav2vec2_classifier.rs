use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};

use crate::application::ports::{ClassifierError, VoiceClassifier};
use crate::domain::{InferenceResult, Waveform};

use super::feature_extractor::FeatureExtractorConfig;
use super::wav2vec2::{Config, Wav2Vec2ForSequenceClassification};

pub const DEFAULT_MODEL_ID: &str = "MelodyMachine/Deepfake-audio-detection-V2";

const EXPECTED_LABELS: usize = 2;

/// Files that make up a classification checkpoint.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub preprocessor_config: Option<PathBuf>,
    pub weights: ModelWeights,
}

#[derive(Debug, Clone)]
pub enum ModelWeights {
    SafeTensors(PathBuf),
    PyTorch(PathBuf),
}

impl ModelFiles {
    /// Resolves the checkpoint from a local directory, or else from the
    /// Hugging Face hub (downloaded once into the local cache).
    pub fn resolve(model_id: &str, revision: Option<&str>) -> Result<Self, ClassifierError> {
        let local = Path::new(model_id);
        if local.is_dir() {
            return Self::from_dir(local);
        }
        Self::from_hub(model_id, revision)
    }

    pub fn from_dir(dir: &Path) -> Result<Self, ClassifierError> {
        let config = dir.join("config.json");
        if !config.is_file() {
            return Err(ClassifierError::ModelLoadFailed(format!(
                "config.json not found in {}",
                dir.display()
            )));
        }

        let preprocessor_config = Some(dir.join("preprocessor_config.json")).filter(|p| p.is_file());

        let safetensors = dir.join("model.safetensors");
        let pytorch = dir.join("pytorch_model.bin");
        let weights = if safetensors.is_file() {
            ModelWeights::SafeTensors(safetensors)
        } else if pytorch.is_file() {
            ModelWeights::PyTorch(pytorch)
        } else {
            return Err(ClassifierError::ModelLoadFailed(format!(
                "no model.safetensors or pytorch_model.bin in {}",
                dir.display()
            )));
        };

        Ok(Self {
            config,
            preprocessor_config,
            weights,
        })
    }

    fn from_hub(model_id: &str, revision: Option<&str>) -> Result<Self, ClassifierError> {
        let api = Api::new().map_err(|e| ClassifierError::ModelLoadFailed(e.to_string()))?;
        let repo = match revision {
            Some(rev) => Repo::with_revision(model_id.to_string(), RepoType::Model, rev.to_string()),
            None => Repo::new(model_id.to_string(), RepoType::Model),
        };
        let repo = api.repo(repo);

        let config = repo
            .get("config.json")
            .map_err(|e| ClassifierError::ModelLoadFailed(format!("config.json: {}", e)))?;

        let preprocessor_config = match repo.get("preprocessor_config.json") {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "preprocessor_config.json unavailable, using defaults");
                None
            }
        };

        let weights = match repo.get("model.safetensors") {
            Ok(path) => ModelWeights::SafeTensors(path),
            Err(safetensors_err) => {
                tracing::debug!(error = %safetensors_err, "model.safetensors unavailable, trying pytorch_model.bin");
                let path = repo.get("pytorch_model.bin").map_err(|e| {
                    ClassifierError::ModelLoadFailed(format!(
                        "model.safetensors: {}; pytorch_model.bin: {}",
                        safetensors_err, e
                    ))
                })?;
                ModelWeights::PyTorch(path)
            }
        };

        Ok(Self {
            config,
            preprocessor_config,
            weights,
        })
    }
}

/// Wav2Vec2 deepfake-speech classifier running on Candle.
///
/// Loaded once at startup. `classify` only needs `&self`, so a single instance
/// is shared across request threads without locking.
pub struct CandleWav2Vec2Classifier {
    model: Wav2Vec2ForSequenceClassification,
    feature_extractor: FeatureExtractorConfig,
    labels: Vec<String>,
    model_id: String,
    device: Device,
    dtype: DType,
}

impl std::fmt::Debug for CandleWav2Vec2Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleWav2Vec2Classifier")
            .field("model_id", &self.model_id)
            .field("labels", &self.labels)
            .field("device", &self.device)
            .finish()
    }
}

impl CandleWav2Vec2Classifier {
    pub fn new(model_id: &str, revision: Option<&str>) -> Result<Self, ClassifierError> {
        let files = ModelFiles::resolve(model_id, revision)?;
        Self::from_files(model_id, &files)
    }

    pub fn from_files(model_id: &str, files: &ModelFiles) -> Result<Self, ClassifierError> {
        let device = Self::select_device();
        let dtype = Self::select_dtype(&device);

        tracing::info!(
            device = ?device,
            model = model_id,
            "Initializing Candle Wav2Vec2 classifier"
        );

        let config_contents = std::fs::read_to_string(&files.config)
            .map_err(|e| ClassifierError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| ClassifierError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let feature_extractor = match &files.preprocessor_config {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    ClassifierError::ModelLoadFailed(format!("read preprocessor config: {}", e))
                })?;
                serde_json::from_str(&contents).map_err(|e| {
                    ClassifierError::ModelLoadFailed(format!("parse preprocessor config: {}", e))
                })?
            }
            None => FeatureExtractorConfig::default(),
        };

        let labels = config.labels();
        if labels.len() != EXPECTED_LABELS {
            return Err(ClassifierError::ModelLoadFailed(format!(
                "expected a {}-label checkpoint, found {} labels: {:?}",
                EXPECTED_LABELS,
                labels.len(),
                labels
            )));
        }

        let vb = match &files.weights {
            // SAFETY: safetensors files are memory-mapped read-only
            ModelWeights::SafeTensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(std::slice::from_ref(path), dtype, &device)
                    .map_err(|e| ClassifierError::ModelLoadFailed(format!("weights: {}", e)))?
            },
            ModelWeights::PyTorch(path) => VarBuilder::from_pth(path, dtype, &device)
                .map_err(|e| ClassifierError::ModelLoadFailed(format!("weights: {}", e)))?,
        };

        let model = Wav2Vec2ForSequenceClassification::load(vb, &config)
            .map_err(|e| ClassifierError::ModelLoadFailed(format!("model: {}", e)))?;

        Self::from_parts(model_id, model, feature_extractor, labels, device, dtype)
    }

    /// Assembles a classifier from an already constructed model.
    pub fn from_parts(
        model_id: &str,
        model: Wav2Vec2ForSequenceClassification,
        feature_extractor: FeatureExtractorConfig,
        labels: Vec<String>,
        device: Device,
        dtype: DType,
    ) -> Result<Self, ClassifierError> {
        if model.num_labels() != labels.len() {
            return Err(ClassifierError::ModelLoadFailed(format!(
                "model has {} outputs but {} label names",
                model.num_labels(),
                labels.len()
            )));
        }

        tracing::info!(
            model = model_id,
            labels = ?labels,
            sampling_rate = feature_extractor.sampling_rate,
            "Candle Wav2Vec2 classifier loaded successfully"
        );

        Ok(Self {
            model,
            feature_extractor,
            labels,
            model_id: model_id.to_string(),
            device,
            dtype,
        })
    }

    fn select_device() -> Device {
        Device::new_metal(0).unwrap_or(Device::Cpu)
    }

    pub fn select_dtype(device: &Device) -> DType {
        if device.is_cpu() {
            DType::F32
        } else {
            DType::F16
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Softmax distribution over the label indices for one waveform.
    pub fn probabilities(&self, waveform: &Waveform) -> Result<Vec<f32>, ClassifierError> {
        if waveform.is_empty() {
            return Err(ClassifierError::InvalidInput("empty waveform".to_string()));
        }
        if waveform.sample_rate() != self.feature_extractor.sampling_rate {
            return Err(ClassifierError::InvalidInput(format!(
                "expected {} Hz audio, got {} Hz",
                self.feature_extractor.sampling_rate,
                waveform.sample_rate()
            )));
        }

        let features = self.feature_extractor.extract(waveform.samples());
        let num_samples = features.len();

        let input = Tensor::from_vec(features, (1, num_samples), &self.device)
            .and_then(|t| t.to_dtype(self.dtype))
            .map_err(|e| ClassifierError::InferenceFailed(format!("input tensor: {}", e)))?;

        let logits = self
            .model
            .forward(&input)
            .and_then(|t| t.to_dtype(DType::F32))
            .map_err(|e| ClassifierError::InferenceFailed(format!("forward: {}", e)))?;

        candle_nn::ops::softmax_last_dim(&logits)
            .and_then(|p| p.squeeze(0))
            .and_then(|p| p.to_vec1::<f32>())
            .map_err(|e| ClassifierError::InferenceFailed(format!("softmax: {}", e)))
    }
}

impl VoiceClassifier for CandleWav2Vec2Classifier {
    #[tracing::instrument(skip(self, waveform), fields(samples = waveform.len()))]
    fn classify(&self, waveform: &Waveform) -> Result<InferenceResult, ClassifierError> {
        let probabilities = self.probabilities(waveform)?;

        let (label_index, probability) = argmax(&probabilities).ok_or_else(|| {
            ClassifierError::InferenceFailed("classifier returned no probabilities".to_string())
        })?;

        let label_name = self.labels.get(label_index).cloned().ok_or_else(|| {
            ClassifierError::InferenceFailed(format!("no label for index {}", label_index))
        })?;

        tracing::debug!(probabilities = ?probabilities, "Classifier output");

        Ok(InferenceResult::new(label_index, label_name, probability))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// First index holding the maximum value, mirroring `torch.argmax`.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, best_v)) if best_v >= v => best,
            _ => Some((i, v)),
        })
}
