//! # Preview Regeneration
//!
//! Regenerates the code whenever options change and publishes the newest
//! result on a `tokio::sync::watch` channel.
//!
//! Every [`Regenerator::trigger`] takes the next ticket. A finished generation
//! is published only when its ticket is newer than the one already published,
//! so a slow early request can never overwrite a later one.
//!
//! ```text
//!   trigger(A) ─► ticket 1 ──────────────────────────► done (stale, dropped)
//!   trigger(B) ─► ticket 2 ────► done ─► published
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::QreativeError;
use crate::pipeline::{Pipeline, QrOptions, RenderedCode};

/// State of the published preview.
#[derive(Debug, Clone)]
pub enum Preview {
    /// Nothing generated yet.
    Pending,
    Ready(Arc<RenderedCode>),
    /// The last accepted generation failed.
    Unavailable { reason: String },
}

/// The published preview and the ticket that produced it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub ticket: u64,
    pub preview: Preview,
}

impl Snapshot {
    pub fn code(&self) -> Option<&Arc<RenderedCode>> {
        match &self.preview {
            Preview::Ready(code) => Some(code),
            _ => None,
        }
    }
}

/// A triggered generation.
#[derive(Debug)]
pub struct Generation {
    pub ticket: u64,
    handle: JoinHandle<bool>,
}

impl Generation {
    /// Wait for the generation; `true` if its result was published.
    pub async fn published(self) -> Result<bool, QreativeError> {
        self.handle
            .await
            .map_err(|e| QreativeError::Task(e.to_string()))
    }
}

/// Runs generations and keeps the newest result.
pub struct Regenerator {
    pipeline: Pipeline,
    next_ticket: AtomicU64,
    tx: Arc<watch::Sender<Snapshot>>,
}

impl Regenerator {
    pub fn new(pipeline: Pipeline) -> Self {
        let (tx, _rx) = watch::channel(Snapshot {
            ticket: 0,
            preview: Preview::Pending,
        });
        Self {
            pipeline,
            next_ticket: AtomicU64::new(1),
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Currently published snapshot.
    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Ticket of the most recent trigger (0 before the first).
    pub fn latest_ticket(&self) -> u64 {
        self.next_ticket.load(Ordering::SeqCst) - 1
    }

    /// True when the newest trigger has been published.
    pub fn is_settled(&self) -> bool {
        self.tx.borrow().ticket == self.latest_ticket()
    }

    /// Start a generation for `options` on the current runtime.
    pub fn trigger(&self, options: QrOptions) -> Generation {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let pipeline = self.pipeline.clone();
        let tx = Arc::clone(&self.tx);

        let handle = tokio::spawn(async move {
            let preview = match pipeline.generate(&options).await {
                Ok(code) => Preview::Ready(Arc::new(code)),
                Err(e) => Preview::Unavailable {
                    reason: e.to_string(),
                },
            };
            publish(&tx, ticket, preview)
        });

        Generation { ticket, handle }
    }
}

fn publish(tx: &watch::Sender<Snapshot>, ticket: u64, preview: Preview) -> bool {
    tx.send_if_modified(|current| {
        if ticket <= current.ticket {
            debug!(ticket, published = current.ticket, "dropping stale generation");
            return false;
        }
        *current = Snapshot { ticket, preview };
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadConfig;
    use crate::symbol::{EncodeError, EncodeRequest, QrCodeEncoder, Symbol, SymbolEncoder};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds back encoding of one data string until the gate opens.
    struct GatedEncoder {
        gated: String,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl SymbolEncoder for GatedEncoder {
        async fn encode(&self, request: &EncodeRequest) -> Result<Symbol, EncodeError> {
            if request.data == self.gated {
                self.gate.notified().await;
            }
            QrCodeEncoder::new().encode_now(request)
        }
    }

    fn text(body: &str) -> QrOptions {
        QrOptions {
            payload: PayloadConfig::Text { body: body.into() },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_starts_pending() {
        let regen = Regenerator::new(Pipeline::default());
        let snapshot = regen.current();
        assert_eq!(snapshot.ticket, 0);
        assert!(matches!(snapshot.preview, Preview::Pending));
        assert!(regen.is_settled());
    }

    #[tokio::test]
    async fn test_publishes_result() {
        let regen = Regenerator::new(Pipeline::default());
        let mut rx = regen.subscribe();

        let generation = regen.trigger(text("hello"));
        assert_eq!(generation.ticket, 1);
        assert!(generation.published().await.unwrap());

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.ticket, 1);
        assert_eq!(snapshot.code().unwrap().data, "hello");
        assert!(regen.is_settled());
    }

    #[tokio::test]
    async fn test_late_stale_result_is_dropped() {
        let gate = Arc::new(Notify::new());
        let encoder = GatedEncoder {
            gated: "A".into(),
            gate: Arc::clone(&gate),
        };
        let regen = Regenerator::new(Pipeline::new(Arc::new(encoder)));

        let a = regen.trigger(text("A"));
        let b = regen.trigger(text("B"));
        assert_eq!((a.ticket, b.ticket), (1, 2));

        assert!(b.published().await.unwrap());
        assert_eq!(regen.current().code().unwrap().data, "B");

        gate.notify_one();
        assert!(!a.published().await.unwrap());

        let snapshot = regen.current();
        assert_eq!(snapshot.ticket, 2);
        assert_eq!(snapshot.code().unwrap().data, "B");
    }

    #[tokio::test]
    async fn test_failure_is_published_as_unavailable() {
        let regen = Regenerator::new(Pipeline::default());
        let generation = regen.trigger(text(&"x".repeat(4000)));
        assert!(generation.published().await.unwrap());
        assert!(matches!(regen.current().preview, Preview::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_unsettled_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let encoder = GatedEncoder {
            gated: "slow".into(),
            gate: Arc::clone(&gate),
        };
        let regen = Regenerator::new(Pipeline::new(Arc::new(encoder)));

        let generation = regen.trigger(text("slow"));
        assert!(!regen.is_settled());
        gate.notify_one();
        generation.published().await.unwrap();
        assert!(regen.is_settled());
    }
}
