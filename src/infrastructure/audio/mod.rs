mod ffmpeg_transcoder;
mod mock_transcoder;
mod passthrough_transcoder;
mod symphonia_decoder;

pub use ffmpeg_transcoder::{DEFAULT_FFMPEG_BINARY, FfmpegTranscoder, check_ffmpeg_binary};
pub use mock_transcoder::MockFailingTranscoder;
pub use passthrough_transcoder::PassthroughTranscoder;
pub use symphonia_decoder::{DEFAULT_SAMPLE_RATE, SymphoniaAudioDecoder, append_mono};
