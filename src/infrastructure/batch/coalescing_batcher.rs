use crate::shared::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Receives the drained events when an identity crosses the threshold.
///
/// The handler runs on the recording task, so a slow flush is paid for
/// by the caller that tipped the batch over.
#[async_trait]
pub trait FlushHandler<P>: Send + Sync {
    async fn on_flush(&self, identity: &str, events: Vec<P>) -> Result<()>;
}

/// Accumulates events per identity and flushes synchronously once the
/// count for that identity reaches the threshold.
///
/// Events are taken out of the accumulator before the handler runs.
/// A failed flush does not re-queue them; those events are lost.
///
/// Identities are never evicted. The map grows with the set of
/// identities seen over the process lifetime, which is accepted for a
/// single-process deployment with a bounded article catalogue.
pub struct CoalescingBatcher<P> {
    threshold: usize,
    pending: Mutex<HashMap<String, Vec<P>>>,
    handler: Arc<dyn FlushHandler<P>>,
}

impl<P> CoalescingBatcher<P>
where
    P: Send + 'static,
{
    /// A threshold of 0 is treated as 1: flush on every record.
    pub fn new(threshold: usize, handler: Arc<dyn FlushHandler<P>>) -> Self {
        Self {
            threshold: threshold.max(1),
            pending: Mutex::new(HashMap::new()),
            handler,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Appends an event for `identity`. When the pending count reaches
    /// the threshold the whole batch is handed to the flush handler on
    /// this task, and the pending sequence is reset to empty.
    pub async fn record(&self, identity: &str, payload: P) -> Result<()> {
        // Drain under the lock, flush outside it.
        let drained = {
            let mut pending = self.pending.lock().await;
            let events = pending.entry(identity.to_string()).or_default();
            events.push(payload);
            if events.len() >= self.threshold {
                Some(std::mem::take(events))
            } else {
                None
            }
        };

        if let Some(events) = drained {
            self.handler.on_flush(identity, events).await?;
        }

        Ok(())
    }

    /// 指定 identity の保留イベント数
    pub async fn pending_count(&self, identity: &str) -> usize {
        let pending = self.pending.lock().await;
        pending.get(identity).map(|events| events.len()).unwrap_or(0)
    }

    /// 追跡中の identity 数（フラッシュ済みで空のものも含む）
    pub async fn tracked_identities(&self) -> usize {
        let pending = self.pending.lock().await;
        pending.len()
    }
}
