use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Serializes seed reset against regular store traffic
///
/// Repository calls hold the shared side for their whole operation. Seed
/// initialization and reset hold the exclusive side, so no request ever sees a
/// store that is half cleared or half reloaded.
#[derive(Debug, Clone, Default)]
pub struct ResetGate {
    lock: Arc<RwLock<()>>,
}

impl ResetGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().await
    }

    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_exclusive_waits_for_readers() {
        let gate = ResetGate::new();
        let reader = gate.shared().await;

        let writer_gate = gate.clone();
        let writer = tokio::spawn(async move {
            let _guard = writer_gate.exclusive().await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!writer.is_finished());

        drop(reader);
        writer.await.unwrap();
    }
}
