use std::sync::Arc;

use voice_detector::application::ports::{AudioDecoder, AudioDecoderError};
use voice_detector::application::services::{DetectionError, DetectionService};
use voice_detector::domain::{Classification, LabelPolicy, Waveform};
use voice_detector::infrastructure::audio::{
    MockFailingTranscoder, PassthroughTranscoder, SymphoniaAudioDecoder,
};
use voice_detector::infrastructure::classifier::MockVoiceClassifier;

use crate::helpers;

const MIN_SAMPLES: usize = 16_000;

/// Returns a fixed waveform regardless of input.
struct FixedDecoder(Vec<f32>);

impl AudioDecoder for FixedDecoder {
    fn decode(&self, _data: &[u8]) -> Result<Waveform, AudioDecoderError> {
        Ok(Waveform::new(self.0.clone(), 16_000))
    }
}

fn service_with(classifier: Arc<MockVoiceClassifier>) -> DetectionService {
    DetectionService::new(
        Arc::new(PassthroughTranscoder),
        Arc::new(SymphoniaAudioDecoder::default()),
        classifier,
        LabelPolicy::default(),
        MIN_SAMPLES,
    )
}

#[test]
fn given_wav_clip_when_analyzing_then_returns_mapped_verdict() {
    let service = service_with(Arc::new(MockVoiceClassifier::returning(1, "spoof", 0.93)));

    let verdict = service.analyze(&helpers::tone_clip_base64()).unwrap();

    assert_eq!(verdict.classification, Classification::AiGenerated);
    assert_eq!(verdict.confidence.value(), 0.93);
}

#[test]
fn given_failing_transcoder_when_analyzing_then_falls_back_to_original_bytes() {
    let transcoder = Arc::new(MockFailingTranscoder::new());
    let service = DetectionService::new(
        transcoder.clone(),
        Arc::new(SymphoniaAudioDecoder::default()),
        Arc::new(MockVoiceClassifier::returning(0, "real", 0.8)),
        LabelPolicy::default(),
        MIN_SAMPLES,
    );

    let verdict = service.analyze(&helpers::tone_clip_base64()).unwrap();

    assert_eq!(transcoder.call_count(), 1);
    assert_eq!(verdict.classification, Classification::Human);
}

#[test]
fn given_invalid_base64_when_analyzing_then_payload_error_and_no_inference() {
    let classifier = Arc::new(MockVoiceClassifier::returning(0, "real", 0.8));
    let service = service_with(Arc::clone(&classifier));

    let result = service.analyze("@@@@");

    assert!(matches!(result, Err(DetectionError::Payload(_))));
    assert_eq!(classifier.call_count(), 0);
}

#[test]
fn given_undecodable_bytes_when_analyzing_then_decoding_error() {
    let service = service_with(Arc::new(MockVoiceClassifier::returning(0, "real", 0.8)));

    let result = service.analyze(&helpers::encode(b"not an audio container"));

    assert!(matches!(result, Err(DetectionError::Decoding(_))));
}

#[test]
fn given_failing_classifier_when_analyzing_then_classification_error_is_explicit() {
    let service = service_with(Arc::new(MockVoiceClassifier::failing("boom")));

    let result = service.analyze(&helpers::tone_clip_base64());

    match result {
        Err(DetectionError::Classification(e)) => assert!(e.to_string().contains("boom")),
        other => panic!("expected classification error, got {other:?}"),
    }
}

#[test]
fn given_same_input_twice_when_analyzing_then_verdicts_are_identical() {
    let service = service_with(Arc::new(MockVoiceClassifier::returning(1, "LABEL_1", 0.777)));
    let clip = helpers::tone_clip_base64();

    let first = service.analyze(&clip).unwrap();
    let second = service.analyze(&clip).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_short_decoded_audio_when_preprocessing_then_pads_to_min_samples_and_normalizes() {
    let service = DetectionService::new(
        Arc::new(PassthroughTranscoder),
        Arc::new(FixedDecoder(vec![0.25, -0.5, 0.1])),
        Arc::new(MockVoiceClassifier::returning(0, "real", 0.8)),
        LabelPolicy::default(),
        MIN_SAMPLES,
    );

    let waveform = service.preprocess(b"ignored").unwrap();

    assert_eq!(waveform.len(), MIN_SAMPLES);
    assert_eq!(&waveform.samples()[..3], &[0.5, -1.0, 0.2]);
    assert!(waveform.samples()[3..].iter().all(|&s| s == 0.0));
}

#[test]
fn given_half_second_wav_when_preprocessing_then_waveform_is_one_second() {
    let service = service_with(Arc::new(MockVoiceClassifier::returning(0, "real", 0.8)));
    let wav = helpers::build_wav(16_000, 1, &helpers::sine(220.0, 16_000, 8_000, 4_000));

    let waveform = service.preprocess(&wav).unwrap();

    assert_eq!(waveform.len(), MIN_SAMPLES);
    assert_eq!(waveform.sample_rate(), 16_000);
    assert!((waveform.peak() - 1.0).abs() < 1e-6);
}

#[test]
fn given_mp3_clip_and_passthrough_transcoder_when_analyzing_then_returns_verdict() {
    let classifier = Arc::new(MockVoiceClassifier::returning(0, "real", 0.82));
    let service = service_with(Arc::clone(&classifier));

    let verdict = service.analyze(&helpers::tone_mp3_base64()).unwrap();

    assert_eq!(verdict.classification, Classification::Human);
    assert_eq!(verdict.confidence.value(), 0.82);
    assert_eq!(classifier.call_count(), 1);
}

#[test]
fn given_service_when_asking_model_id_then_reports_classifier_model() {
    let service = service_with(Arc::new(MockVoiceClassifier::returning(0, "real", 0.9)));

    assert_eq!(service.model_id(), "mock");
}
