//! Text-to-speech endpoints.
//!
//! Whole-text synthesis returns one complete WAV body. Streamed synthesis splits
//! the text into sentence batches and writes each batch's PCM as soon as it (and
//! every batch before it) is ready, behind an open-ended WAV header.

use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::app::AppState;
use crate::db::models::parse_object_id;
use crate::db::repository::PostRepository;
use crate::error::AppError;
use crate::speech::pool::SynthesisPool;
use crate::speech::text::{batch_sentences, post_speech_text, split_sentences};
use crate::speech::wav::{encode_wav, pcm_bytes, streaming_header};

const AUDIO_WAV: &str = "audio/wav";

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub batch_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SpeakQuery {
    pub text: String,
}

/// Fetch a post and build the text to read aloud.
pub async fn load_post_text(repo: &dyn PostRepository, raw_id: &str) -> Result<String, AppError> {
    let id = parse_object_id(raw_id, "post")?;

    let post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    post_speech_text(&post.description_brief, &post.description_detail)
        .ok_or_else(|| AppError::NotFound("No description available".into()))
}

fn synthesis_failed(err: AppError) -> AppError {
    tracing::error!(error = %err, "Speech synthesis failed");
    AppError::Synthesis("Speech synthesis failed".into())
}

/// Synthesize the whole text in one engine call and encode it as WAV.
pub async fn synthesize_whole(pool: &SynthesisPool, text: String) -> Result<Vec<u8>, AppError> {
    let audio = pool.synthesize(text).await.map_err(synthesis_failed)?;
    encode_wav(&audio)
}

/// Synthesize sentence batches and produce the streamed WAV body.
///
/// The first batch is awaited before returning so an engine failure still
/// becomes an error response; later failures end the stream.
pub async fn synthesize_stream(
    pool: SynthesisPool,
    text: String,
    batch_size: usize,
) -> Result<impl Stream<Item = Result<Bytes, AppError>> + Send + 'static, AppError> {
    let sentences = split_sentences(&text);
    let batches = batch_sentences(&sentences, batch_size);
    let total = batches.len();

    let mut chunks = Box::pin(pool.synthesize_batches(batches));
    let first = match chunks.next().await {
        Some(chunk) => chunk.map_err(synthesis_failed)?,
        None => return Err(AppError::NotFound("No description available".into())),
    };

    Ok(async_stream::try_stream! {
        yield Bytes::from(streaming_header(first.sample_rate, first.channels));
        yield Bytes::from(pcm_bytes(&first.samples));

        let mut index = 1;
        while let Some(chunk) = chunks.next().await {
            let audio = chunk.map_err(synthesis_failed)?;
            if !audio.same_format(&first) {
                Err::<(), _>(synthesis_failed(AppError::Synthesis(format!(
                    "chunk {index} is {} Hz x{}, stream started at {} Hz x{}",
                    audio.sample_rate, audio.channels, first.sample_rate, first.channels
                ))))?;
            }
            yield Bytes::from(pcm_bytes(&audio.samples));
            index += 1;
        }

        tracing::debug!(chunks = index, total, "Streamed synthesis finished");
    })
}

fn wav_response(body: impl Into<Body>) -> Response {
    (
        [
            (header::CONTENT_TYPE, AUDIO_WAV),
            (header::CONTENT_DISPOSITION, "inline; filename=\"tts.wav\""),
        ],
        body.into(),
    )
        .into_response()
}

/// Axum handler for `GET /tts/post/{post_id}`.
pub async fn tts_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let text = load_post_text(state.post_repo.as_ref(), &post_id).await?;
    let wav = synthesize_whole(&state.synthesizer, text).await?;
    Ok(wav_response(wav))
}

/// Axum handler for `GET /tts/post/{post_id}/stream`.
pub async fn tts_post_stream_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<Response, AppError> {
    let batch_size = query.batch_size.unwrap_or(state.default_batch_size);
    if batch_size == 0 {
        return Err(AppError::BadRequest("batch_size must be at least 1".into()));
    }

    let text = load_post_text(state.post_repo.as_ref(), &post_id).await?;
    let stream = synthesize_stream(state.synthesizer.clone(), text, batch_size).await?;
    Ok(wav_response(Body::from_stream(stream)))
}

/// Axum handler for `GET /tts/speak?text=`.
pub async fn tts_speak_handler(
    State(state): State<AppState>,
    Query(query): Query<SpeakQuery>,
) -> Result<Response, AppError> {
    let text = query.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Text must not be empty".into()));
    }

    let wav = synthesize_whole(&state.synthesizer, text.to_string()).await?;
    Ok(wav_response(wav))
}
