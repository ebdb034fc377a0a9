use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device};
use voice_detector::application::ports::{ClassifierError, VoiceClassifier};
use voice_detector::domain::Waveform;
use voice_detector::infrastructure::classifier::{
    CandleWav2Vec2Classifier, Config, FeatureExtractorConfig, ModelFiles, ModelWeights,
};

use super::{test_signal, tiny_config, tiny_model};

fn classifier_from(config: &Config) -> CandleWav2Vec2Classifier {
    let (_varmap, model) = tiny_model(config);
    CandleWav2Vec2Classifier::from_parts(
        "tiny-random",
        model,
        FeatureExtractorConfig::default(),
        config.labels(),
        Device::Cpu,
        DType::F32,
    )
    .unwrap()
}

fn config_json(id2label: &[(&str, &str)]) -> String {
    let labels: HashMap<&str, &str> = id2label.iter().copied().collect();
    serde_json::json!({
        "hidden_size": 8,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "conv_dim": [4, 4],
        "conv_stride": [5, 4],
        "conv_kernel": [10, 4],
        "num_conv_pos_embeddings": 4,
        "num_conv_pos_embedding_groups": 2,
        "classifier_proj_size": 4,
        "id2label": labels,
    })
    .to_string()
}

/// Writes a complete checkpoint directory for the tiny model.
fn write_checkpoint(dir: &Path, id2label: &[(&str, &str)]) {
    let json = config_json(id2label);
    let config: Config = serde_json::from_str(&json).unwrap();
    let (varmap, _model) = tiny_model(&Config {
        id2label: HashMap::from([
            ("0".to_string(), "bonafide".to_string()),
            ("1".to_string(), "spoof".to_string()),
        ]),
        ..config
    });
    std::fs::write(dir.join("config.json"), json).unwrap();
    std::fs::write(
        dir.join("preprocessor_config.json"),
        r#"{"do_normalize": true, "sampling_rate": 16000, "feature_size": 1}"#,
    )
    .unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();
}

#[test]
fn given_waveform_when_classifying_then_probability_is_the_softmax_max() {
    let classifier = classifier_from(&tiny_config());
    let waveform = Waveform::new(test_signal(16_000), 16_000);

    let probabilities = classifier.probabilities(&waveform).unwrap();
    let result = classifier.classify(&waveform).unwrap();

    assert_eq!(probabilities.len(), 2);
    assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    assert!(result.probability >= 0.5);
    assert_eq!(result.probability, probabilities[result.label_index]);
}

#[test]
fn given_waveform_when_classifying_then_label_name_comes_from_id2label() {
    let classifier = classifier_from(&tiny_config());

    let result = classifier
        .classify(&Waveform::new(test_signal(16_000), 16_000))
        .unwrap();

    let expected = if result.label_index == 0 { "bonafide" } else { "spoof" };
    assert_eq!(result.label_name, expected);
}

#[test]
fn given_same_waveform_when_classifying_twice_then_results_are_identical() {
    let classifier = classifier_from(&tiny_config());
    let waveform = Waveform::new(test_signal(16_000), 16_000);

    let first = classifier.classify(&waveform).unwrap();
    let second = classifier.classify(&waveform).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_wrong_sample_rate_when_classifying_then_returns_invalid_input() {
    let classifier = classifier_from(&tiny_config());

    let result = classifier.classify(&Waveform::new(test_signal(8_000), 8_000));

    assert!(matches!(result, Err(ClassifierError::InvalidInput(_))));
}

#[test]
fn given_empty_waveform_when_classifying_then_returns_invalid_input() {
    let classifier = classifier_from(&tiny_config());

    let result = classifier.classify(&Waveform::new(Vec::new(), 16_000));

    assert!(matches!(result, Err(ClassifierError::InvalidInput(_))));
}

#[test]
fn given_label_count_mismatch_when_assembling_then_fails() {
    let (_varmap, model) = tiny_model(&tiny_config());

    let result = CandleWav2Vec2Classifier::from_parts(
        "tiny-random",
        model,
        FeatureExtractorConfig::default(),
        vec!["only-one".to_string()],
        Device::Cpu,
        DType::F32,
    );

    assert!(matches!(result, Err(ClassifierError::ModelLoadFailed(_))));
}

#[test]
fn given_checkpoint_directory_when_loading_then_classifies_with_its_labels() {
    let dir = tempfile::tempdir().unwrap();
    write_checkpoint(dir.path(), &[("0", "real"), ("1", "fake")]);
    let model_id = dir.path().to_str().unwrap();

    let classifier = CandleWav2Vec2Classifier::new(model_id, None).unwrap();
    let result = classifier
        .classify(&Waveform::new(test_signal(16_000), 16_000))
        .unwrap();

    assert_eq!(classifier.model_id(), model_id);
    assert_eq!(classifier.labels(), ["real", "fake"]);
    assert!(result.label_index < 2);
    assert!((0.5..=1.0).contains(&result.probability));
}

#[test]
fn given_checkpoint_directory_when_resolving_files_then_prefers_safetensors() {
    let dir = tempfile::tempdir().unwrap();
    write_checkpoint(dir.path(), &[("0", "real"), ("1", "fake")]);
    std::fs::write(dir.path().join("pytorch_model.bin"), b"unused").unwrap();

    let files = ModelFiles::from_dir(dir.path()).unwrap();

    assert!(matches!(files.weights, ModelWeights::SafeTensors(_)));
    assert!(files.preprocessor_config.is_some());
}

#[test]
fn given_three_label_checkpoint_when_loading_then_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_checkpoint(dir.path(), &[("0", "real"), ("1", "fake"), ("2", "unknown")]);

    let result = CandleWav2Vec2Classifier::new(dir.path().to_str().unwrap(), None);

    match result {
        Err(ClassifierError::ModelLoadFailed(message)) => assert!(message.contains("3 labels")),
        other => panic!("expected ModelLoadFailed, got {other:?}"),
    }
}

#[test]
fn given_directory_without_config_when_loading_then_model_load_fails() {
    let dir = tempfile::tempdir().unwrap();

    let result = ModelFiles::from_dir(dir.path());

    assert!(matches!(result, Err(ClassifierError::ModelLoadFailed(_))));
}

#[test]
fn given_directory_without_weights_when_loading_then_model_load_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), config_json(&[("0", "a"), ("1", "b")])).unwrap();

    let result = ModelFiles::from_dir(dir.path());

    assert!(matches!(result, Err(ClassifierError::ModelLoadFailed(_))));
}

#[test]
#[ignore = "downloads the production checkpoint from the Hugging Face hub"]
fn given_hub_model_when_loading_then_classifies_tone() {
    let classifier = CandleWav2Vec2Classifier::new(
        voice_detector::infrastructure::classifier::DEFAULT_MODEL_ID,
        None,
    )
    .unwrap();

    let result = classifier
        .classify(&Waveform::new(test_signal(16_000), 16_000))
        .unwrap();

    assert!(result.label_index < 2);
}
