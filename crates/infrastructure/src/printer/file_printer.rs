use async_trait::async_trait;
use domain::{PrinterConnection, PrinterError};
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use uuid::Uuid;

/// Dry-run printer: appends every payload to a file instead of a radio link
pub struct FilePrinter {
    path: PathBuf,
    file: Option<File>,
}

impl FilePrinter {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            file: None,
        }
    }
}

#[async_trait]
impl PrinterConnection for FilePrinter {
    async fn connect(&mut self, _service: Uuid) -> Result<(), PrinterError> {
        info!("Opening ticket output file {:?}", self.path);
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
        {
            Ok(file) => {
                self.file = Some(file);
                Ok(())
            }
            Err(e) => {
                error!("Failed to open ticket output file {:?}: {}", self.path, e);
                Err(PrinterError::ConnectionFailed(e.to_string()))
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), PrinterError> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| PrinterError::WriteFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.file.is_some()
    }

    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), PrinterError> {
        let Some(file) = self.file.as_mut() else {
            return Err(PrinterError::NotConnected);
        };

        if let Err(e) = file.write_all(commands).await {
            error!("Failed to write ticket to file: {}", e);
            return Err(PrinterError::WriteFailed(e.to_string()));
        }
        if let Err(e) = file.flush().await {
            error!("Failed to flush ticket file: {}", e);
            return Err(PrinterError::WriteFailed(e.to_string()));
        }
        Ok(())
    }
}
