mod candle_wav2vec2_classifier;
mod feature_extractor;
mod mock_classifier;
mod wav2vec2;

pub use candle_wav2vec2_classifier::{
    CandleWav2Vec2Classifier, DEFAULT_MODEL_ID, ModelFiles, ModelWeights, argmax,
};
pub use feature_extractor::{FeatureExtractorConfig, zero_mean_unit_variance};
pub use mock_classifier::MockVoiceClassifier;
pub use wav2vec2::{Config, FeatExtractNorm, Wav2Vec2ForSequenceClassification};
