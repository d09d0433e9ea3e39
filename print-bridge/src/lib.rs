//! # print-bridge
//!
//! Routes invoice print jobs from a web page either to the embedded mobile
//! host's native channel or to a standalone browser-print fallback.
//!
//! ## Scope
//!
//! This crate decides WHERE a job goes:
//! - Host detection from an injected environment
//! - Native channel wire contract (one JSON text per message)
//! - Fallback print view and page restore
//! - Bounded print history and draft text in per-origin storage
//!
//! It does not talk to printers. Once a message is posted, the embedded host
//! owns it; nothing comes back.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use print_bridge::{
//!     BridgeConfig, DispatchBridge, HostDetector, HostEnvironment, HtmlFileRenderer,
//!     PrintJob, PrinterTarget, TracingNotifier, WriterChannel,
//! };
//!
//! let config = BridgeConfig::default();
//! let env = HostEnvironment::new("Mozilla/5.0 Flutter").with_binding("NativePrinter");
//! let bridge = DispatchBridge::new(
//!     HostDetector::new(env, &config),
//!     Arc::new(HtmlFileRenderer::new("print.html").with_print_command(Some("lp"))),
//!     Arc::new(TracingNotifier),
//!     config,
//! )
//! .with_channel(Arc::new(WriterChannel::stdout()));
//!
//! let job = PrintJob::new("INV-1", "Invoice")
//!     .with_targets(vec![PrinterTarget::new("10.0.0.5", 2)]);
//! bridge.dispatch(&job).await;
//! ```

mod channel;
mod config;
mod content;
mod dispatch;
mod error;
mod history;
mod host;
mod job;
mod message;
mod notify;
mod renderer;
mod session;
mod storage;

// Re-exports
pub use channel::{MemoryChannel, NativeChannel, WriterChannel};
pub use config::{
    BridgeConfig, DEFAULT_NATIVE_BINDINGS, DEFAULT_USER_AGENT_MARKER, DRAFT_KEY,
    EMBEDDED_IMAGE_MARKER, HISTORY_KEY, MAX_HISTORY, NATIVE_CHANNEL_BINDING,
};
pub use content::{ContentSource, FileContentSource, HttpContentSource, InvoiceSource};
pub use dispatch::{DispatchBridge, FailureKind, JobState};
pub use error::{BridgeError, BridgeResult};
pub use history::{DraftStore, HistoryEntry, HistoryStatus, HistoryStore, PrintHistory};
pub use host::{HostDetector, HostEnvironment};
pub use job::{PrintJob, PrinterTarget, collect_targets};
pub use message::NativeMessage;
pub use notify::{MemoryNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use renderer::{FallbackRenderer, HtmlFileRenderer, PrintView, RecordingRenderer};
pub use session::{AUTO_INVOICE_TITLE, INVOICE_TITLE, MANUAL_TITLE, PrintSession};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
