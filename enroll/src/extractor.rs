//! Background feature extraction with a synchronous fallback.
//!
//! Extraction is the only CPU-heavy step in the pipeline, so it runs on a
//! dedicated worker task reached over a request/response channel. Each
//! request carries a correlation id for tracing. Because the underlying
//! computation is a pure function, the in-process fallback produces
//! byte-identical output; a failed or closed worker degrades silently to
//! that path instead of surfacing an error.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;
use voicegate_features::{extract_features, VoiceFeatures};

struct ExtractRequest {
    id: Uuid,
    samples: Vec<f32>,
    sample_rate: u32,
    reply: oneshot::Sender<VoiceFeatures>,
}

/// Handle to the feature extraction execution context.
///
/// Cheap to clone; all clones share one worker. Dropping every clone (or
/// calling [`Extractor::close`]) stops the worker task.
#[derive(Clone)]
pub struct Extractor {
    tx: Option<mpsc::Sender<ExtractRequest>>,
}

impl Extractor {
    /// Spawns a worker task and returns a handle that routes extraction
    /// through it. Must be called inside a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel::<ExtractRequest>(8);
        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                debug!(correlation = %req.id, samples = req.samples.len(), "extracting features");
                let features = extract_features(&req.samples, req.sample_rate);
                // Receiver may have given up (cancelled session); fine.
                let _ = req.reply.send(features);
            }
        });
        Self { tx: Some(tx) }
    }

    /// Returns a handle that always extracts in-process. Output is
    /// identical to the worker path.
    pub fn sync() -> Self {
        Self { tx: None }
    }

    /// True when requests are routed to a worker task.
    pub fn is_background(&self) -> bool {
        self.tx.is_some()
    }

    /// Extracts a fingerprint, preferring the worker and falling back to
    /// the calling task if the worker is unavailable.
    pub async fn extract(&self, samples: &[f32], sample_rate: u32) -> VoiceFeatures {
        if let Some(tx) = &self.tx {
            let id = Uuid::new_v4();
            let (reply_tx, reply_rx) = oneshot::channel();
            let req = ExtractRequest {
                id,
                samples: samples.to_vec(),
                sample_rate,
                reply: reply_tx,
            };
            match tx.send(req).await {
                Ok(()) => match reply_rx.await {
                    Ok(features) => return features,
                    Err(_) => {
                        warn!(correlation = %id, "extraction worker dropped the request, extracting in-process");
                    }
                },
                Err(_) => {
                    warn!(correlation = %id, "extraction worker unavailable, extracting in-process");
                }
            }
        }
        extract_features(samples, sample_rate)
    }

    /// Detaches from the worker. Subsequent calls use the in-process path;
    /// the worker task exits once all handles are closed or dropped.
    pub fn close(&mut self) {
        self.tx = None;
    }
}
