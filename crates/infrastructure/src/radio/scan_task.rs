use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The one discovery task a radio may have running
#[derive(Default)]
pub(crate) struct ScanTask {
    current: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl ScanTask {
    /// Cancel whatever runs and spawn `scan` with a fresh token
    pub(crate) async fn start<F, Fut>(&self, scan: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut current = self.current.lock().await;
        if let Some((token, _)) = current.take() {
            token.cancel();
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(scan(token.clone()));
        *current = Some((token, handle));
    }

    pub(crate) async fn cancel(&self) {
        if let Some((token, _)) = self.current.lock().await.take() {
            token.cancel();
        }
    }

    pub(crate) async fn is_running(&self) -> bool {
        match &*self.current.lock().await {
            Some((token, handle)) => !token.is_cancelled() && !handle.is_finished(),
            None => false,
        }
    }
}
