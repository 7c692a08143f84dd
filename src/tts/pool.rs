use super::interface::{SynthesisEngine, SynthesisResult, SynthesisSpec, TtsError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

/// Access gate for the shared synthesis engine(s).
///
/// The engine contract gives no thread-safety guarantee for concurrent
/// inference, so every instance sits behind its own mutex: with one instance
/// (the default) all synthesis calls are fully serialized; with more,
/// requests are dispatched round-robin across independently loaded
/// instances, each still exclusive.
///
/// Admission is bounded: at most `queue_depth` requests may be in flight or
/// waiting for an engine slot, and each gated call runs under a timeout.
pub struct EnginePool {
    slots: Vec<Arc<Mutex<Box<dyn SynthesisEngine>>>>,
    next: AtomicUsize,
    admission: Arc<Semaphore>,
    timeout: Duration,
}

impl EnginePool {
    pub fn new(
        engines: Vec<Box<dyn SynthesisEngine>>,
        queue_depth: usize,
        timeout: Duration,
    ) -> Self {
        assert!(!engines.is_empty(), "EnginePool requires at least one engine");
        Self {
            slots: engines
                .into_iter()
                .map(|e| Arc::new(Mutex::new(e)))
                .collect(),
            next: AtomicUsize::new(0),
            admission: Arc::new(Semaphore::new(queue_depth.max(1))),
            timeout,
        }
    }

    pub fn instances(&self) -> usize {
        self.slots.len()
    }

    /// Run one synthesis call through the gate.
    ///
    /// Fails with `Busy` when the admission queue is full and with `Timeout`
    /// when the call outlives the configured deadline; timing out drops the
    /// in-flight future, which aborts the underlying engine call.
    pub async fn synthesize(&self, spec: &SynthesisSpec) -> Result<SynthesisResult, TtsError> {
        let _permit = self
            .admission
            .clone()
            .try_acquire_owned()
            .map_err(|_| TtsError::Busy("synthesis queue is full, retry later".to_string()))?;

        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let slot = Arc::clone(&self.slots[idx]);

        let gated = async move {
            let engine = slot.lock().await;
            tracing::debug!("[Pool] slot {} ({}) acquired", idx, engine.id());
            engine.synthesize(spec).await
        };

        match tokio::time::timeout(self.timeout, gated).await {
            Ok(result) => result,
            Err(_) => Err(TtsError::Timeout(format!(
                "synthesis exceeded {:?}",
                self.timeout
            ))),
        }
    }

    /// True if any engine instance is reachable. An instance currently held
    /// by an in-flight call counts as alive.
    pub async fn is_available(&self) -> bool {
        for slot in &self.slots {
            match slot.try_lock() {
                Ok(engine) => {
                    if engine.is_available().await {
                        return true;
                    }
                }
                Err(_) => return true,
            }
        }
        false
    }
}
