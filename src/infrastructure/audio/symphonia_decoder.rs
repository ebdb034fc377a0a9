use std::io::Cursor;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoder, AudioDecoderError};
use crate::domain::Waveform;

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_CHUNK_SIZE: usize = 1024;

/// Probes the container, decodes every packet of the default track, down-mixes
/// to mono and resamples to `target_rate`.
#[derive(Debug, Clone, Copy)]
pub struct SymphoniaAudioDecoder {
    target_rate: u32,
}

impl SymphoniaAudioDecoder {
    pub fn new(target_rate: u32) -> Self {
        Self { target_rate }
    }
}

impl Default for SymphoniaAudioDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl AudioDecoder for SymphoniaAudioDecoder {
    fn decode(&self, data: &[u8]) -> Result<Waveform, AudioDecoderError> {
        let (samples, source_rate) = decode_to_mono(data)?;

        let samples = if source_rate != self.target_rate {
            resample(&samples, source_rate, self.target_rate)?
        } else {
            samples
        };

        let waveform = Waveform::new(samples, self.target_rate);

        tracing::debug!(
            source_rate = source_rate,
            samples = waveform.len(),
            duration_secs = waveform.duration_secs(),
            "Audio decoded to mono PCM"
        );

        Ok(waveform)
    }
}

fn decode_to_mono(data: &[u8]) -> Result<(Vec<f32>, u32), AudioDecoderError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioDecoderError::DecodingFailed(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioDecoderError::DecodingFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioDecoderError::DecodingFailed("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioDecoderError::DecodingFailed(format!("codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AudioDecoderError::DecodingFailed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(AudioDecoderError::DecodingFailed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        // Channel count can differ from the codec params for some mp3 streams.
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        append_mono(&mut mono, sample_buf.samples(), channels);
    }

    if mono.is_empty() {
        return Err(AudioDecoderError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ));
    }

    Ok((mono, source_rate))
}

/// Averages interleaved frames into a single channel.
pub fn append_mono(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioDecoderError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK_SIZE, 1)
        .map_err(|e| AudioDecoderError::ResamplingFailed(format!("init: {}", e)))?;

    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected_len + delay + RESAMPLE_CHUNK_SIZE);

    // Extra zero chunks flush the filter delay out of the resampler.
    let flush = vec![0.0f32; delay.div_ceil(RESAMPLE_CHUNK_SIZE).max(1) * RESAMPLE_CHUNK_SIZE];
    for chunk in samples.chunks(RESAMPLE_CHUNK_SIZE).chain(flush.chunks(RESAMPLE_CHUNK_SIZE)) {
        let mut input = chunk.to_vec();
        input.resize(RESAMPLE_CHUNK_SIZE, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| AudioDecoderError::ResamplingFailed(e.to_string()))?;

        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    let start = delay.min(output.len());
    let end = (start + expected_len).min(output.len());
    Ok(output[start..end].to_vec())
}
