use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Broadcast topic with bounded capacity.
/// Messages are shared as `Arc<T>` so a point cloud is never copied per subscriber.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    name: &'static str,
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { name, tx }
    }

    /// Publishes `msg`, returning how many subscribers received it.
    pub fn publish(&self, msg: T) -> usize {
        match self.tx.send(Arc::new(msg)) {
            Ok(n) => n,
            Err(_) => {
                warn!(topic = self.name, "Published with no subscribers, message dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}
