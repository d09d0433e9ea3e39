//! Native channel adapters
//!
//! The embedded host exposes a single write-only method taking a text
//! payload. There is no response path: a channel can only report that the
//! local transport failed, never whether a printer produced the job.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::error::{BridgeError, BridgeResult};

/// One-way send capability of the embedded host
pub trait NativeChannel: Send + Sync {
    /// Post a serialized message. Fire-and-forget.
    fn post_message(&self, payload: &str) -> BridgeResult<()>;
}

impl<T: NativeChannel + ?Sized> NativeChannel for Arc<T> {
    fn post_message(&self, payload: &str) -> BridgeResult<()> {
        (**self).post_message(payload)
    }
}

impl<T: NativeChannel + ?Sized> NativeChannel for Box<T> {
    fn post_message(&self, payload: &str) -> BridgeResult<()> {
        (**self).post_message(payload)
    }
}

/// Newline-delimited payloads on any writer (stdout pipe to the native shell)
pub struct WriterChannel<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterChannel<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterChannel<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> NativeChannel for WriterChannel<W> {
    #[instrument(skip_all, fields(payload_len = payload.len()))]
    fn post_message(&self, payload: &str) -> BridgeResult<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", payload)
            .and_then(|_| writer.flush())
            .map_err(|e| BridgeError::Channel(format!("Write failed: {}", e)))?;
        debug!("Payload posted");
        Ok(())
    }
}

/// Channel keeping every payload in memory
#[derive(Debug, Default)]
pub struct MemoryChannel {
    sent: Mutex<Vec<String>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl NativeChannel for MemoryChannel {
    fn post_message(&self, payload: &str) -> BridgeResult<()> {
        self.sent.lock().push(payload.to_string());
        Ok(())
    }
}
