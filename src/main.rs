use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use voice_detector::application::ports::{AudioTranscoder, VoiceClassifier};
use voice_detector::application::services::DetectionService;
use voice_detector::infrastructure::audio::{
    FfmpegTranscoder, PassthroughTranscoder, SymphoniaAudioDecoder, check_ffmpeg_binary,
};
use voice_detector::infrastructure::classifier::CandleWav2Vec2Classifier;
use voice_detector::infrastructure::observability::{TracingConfig, init_tracing};
use voice_detector::presentation::config::AudioSettings;
use voice_detector::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.json || TracingConfig::default().json_format,
    ));

    tracing::info!(environment = %environment, "Application starting");

    if settings.auth.uses_default_key() {
        tracing::warn!("API_KEY is not set, using the insecure development key");
    }

    let model_id = settings.model.id.clone();
    let revision = settings.model.revision.clone();
    let classifier = tokio::task::spawn_blocking(move || {
        CandleWav2Vec2Classifier::new(&model_id, revision.as_deref())
    })
    .await
    .context("Model loading task failed")?
    .context("Failed to load voice classifier")?;
    let classifier: Arc<dyn VoiceClassifier> = Arc::new(classifier);

    let detection_service = Arc::new(DetectionService::new(
        select_transcoder(&settings.audio),
        Arc::new(SymphoniaAudioDecoder::new(settings.audio.sample_rate)),
        classifier,
        settings.labels.to_policy(),
        settings.audio.min_samples,
    ));

    tracing::info!(model = detection_service.model_id(), "Detection service ready");

    let state = AppState::new(
        detection_service,
        settings.auth.api_key.as_str(),
        settings.server.max_body_bytes,
    );
    let router = create_router(state);

    let ip = settings
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host '{}'", settings.server.host))?;
    let addr = SocketAddr::new(ip, settings.server.port);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn select_transcoder(audio: &AudioSettings) -> Arc<dyn AudioTranscoder> {
    if !audio.transcode_enabled {
        tracing::info!("Transcoding disabled, decoding uploads directly");
        return Arc::new(PassthroughTranscoder);
    }

    match check_ffmpeg_binary(&audio.ffmpeg_path) {
        Ok(()) => {
            tracing::info!(binary = %audio.ffmpeg_path.display(), "ffmpeg available");
            Arc::new(FfmpegTranscoder::new(audio.ffmpeg_path.clone()))
        }
        Err(e) => {
            tracing::warn!(error = %e, "ffmpeg unavailable, decoding uploads directly");
            Arc::new(PassthroughTranscoder)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
