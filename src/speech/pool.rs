use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::Semaphore;

use crate::error::AppError;
use crate::speech::engine::{SpeechEngine, SynthesizedAudio};

/// Runs blocking synthesis on Tokio's blocking threads, at most `workers` calls
/// at a time across all requests sharing the pool.
#[derive(Clone)]
pub struct SynthesisPool {
    engine: Arc<dyn SpeechEngine>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl SynthesisPool {
    pub fn new(engine: Arc<dyn SpeechEngine>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            engine,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Synthesize one piece of text, waiting for a free worker first.
    pub async fn synthesize(&self, text: String) -> Result<SynthesizedAudio, AppError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Internal("Synthesis pool closed".into()))?;

        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            engine.synthesize(&text)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Synthesis worker failed: {e}")))?
    }

    /// Synthesize each batch independently, keeping up to `workers` in flight.
    ///
    /// Results are yielded in the order of `batches`, whatever order they finish in.
    pub fn synthesize_batches(
        &self,
        batches: Vec<String>,
    ) -> impl Stream<Item = Result<SynthesizedAudio, AppError>> + Send + 'static {
        let pool = self.clone();
        futures::stream::iter(batches)
            .map(move |batch| {
                let pool = pool.clone();
                async move { pool.synthesize(batch).await }
            })
            .buffered(self.workers)
    }
}
