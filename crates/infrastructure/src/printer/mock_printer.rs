use async_trait::async_trait;
use domain::{PrinterConnection, PrinterError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Failure injection for `MockPrinter`
#[derive(Debug, Clone, Default)]
pub struct MockPrinterBehavior {
    pub fail_connect: Option<String>,
    pub fail_write: Option<String>,
    /// `connect` never completes
    pub hang_connect: bool,
    /// `send_commands` never completes
    pub hang_write: bool,
}

/// In-memory printer. Clones share the recorded data and call counts, so a
/// test can keep one clone while the engine consumes others.
#[derive(Clone, Default)]
pub struct MockPrinter {
    pub connected: bool,
    /// One entry per successful `send_commands`
    pub jobs: Arc<Mutex<Vec<Vec<u8>>>>,
    pub behavior: Arc<std::sync::Mutex<MockPrinterBehavior>>,
    connects: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
    open_links: Arc<AtomicUsize>,
    peak_open_links: Arc<AtomicUsize>,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockPrinterBehavior) -> Self {
        let printer = Self::default();
        printer.set_behavior(behavior);
        printer
    }

    pub fn set_behavior(&self, behavior: MockPrinterBehavior) {
        if let Ok(mut current) = self.behavior.lock() {
            *current = behavior;
        }
    }

    fn behavior(&self) -> MockPrinterBehavior {
        self.behavior
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Highest number of links that were open at the same time
    pub fn peak_open_links(&self) -> usize {
        self.peak_open_links.load(Ordering::SeqCst)
    }

    pub async fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl PrinterConnection for MockPrinter {
    async fn connect(&mut self, _service: Uuid) -> Result<(), PrinterError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior();
        if behavior.hang_connect {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = behavior.fail_connect {
            return Err(PrinterError::ConnectionFailed(reason));
        }
        let open = self.open_links.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open_links.fetch_max(open, Ordering::SeqCst);
        self.connected = true;
        // Give a competing session the chance to run while this link is open
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PrinterError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.connected {
            self.open_links.fetch_sub(1, Ordering::SeqCst);
        }
        self.connected = false;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), PrinterError> {
        if !self.connected {
            return Err(PrinterError::NotConnected);
        }
        let behavior = self.behavior();
        if behavior.hang_write {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = behavior.fail_write {
            return Err(PrinterError::WriteFailed(reason));
        }

        self.jobs.lock().await.push(commands.to_vec());
        Ok(())
    }
}
