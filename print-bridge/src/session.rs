//! Operator flows: manual print, print from the invoice source, automatic
//! load-and-print at startup, draft and history upkeep.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::content::ContentSource;
use crate::dispatch::{DispatchBridge, FailureKind, JobState};
use crate::error::BridgeResult;
use crate::history::{DraftStore, HistoryStatus, HistoryStore, PrintHistory};
use crate::job::{PrintJob, PrinterTarget};
use crate::notify::Notification;
use crate::storage::LocalStorage;

pub const MANUAL_TITLE: &str = "Manual print";
pub const INVOICE_TITLE: &str = "Invoice";
pub const AUTO_INVOICE_TITLE: &str = "Electronic invoice";

pub struct PrintSession {
    bridge: DispatchBridge,
    history: HistoryStore<Arc<dyn LocalStorage>>,
    drafts: DraftStore<Arc<dyn LocalStorage>>,
}

impl PrintSession {
    pub fn new(bridge: DispatchBridge, storage: Arc<dyn LocalStorage>) -> Self {
        let capacity = bridge.config().history_capacity;
        Self {
            history: HistoryStore::load(storage.clone(), capacity),
            drafts: DraftStore::new(storage),
            bridge,
        }
    }

    pub fn bridge(&self) -> &DispatchBridge {
        &self.bridge
    }

    pub fn history(&self) -> &PrintHistory {
        self.history.history()
    }

    /// Print operator-typed text
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn print_text(&mut self, text: &str, targets: Vec<PrinterTarget>) -> JobState {
        let content = text.trim();
        if content.is_empty() {
            self.bridge
                .notify(Notification::error("Write something before printing"));
            return JobState::Failed(FailureKind::EmptyContent);
        }

        let job = PrintJob::new(content, MANUAL_TITLE).with_targets(targets);
        self.run(job).await
    }

    /// Fetch the invoice and print it right away
    #[instrument(skip_all, fields(source = %source.location()))]
    pub async fn print_from_source<C: ContentSource>(
        &mut self,
        source: &C,
        targets: Vec<PrinterTarget>,
    ) -> JobState {
        let Some(content) = self.fetch(source).await else {
            return JobState::Failed(FailureKind::ContentLoad);
        };

        let job = PrintJob::new(content, INVOICE_TITLE).with_targets(targets);
        self.run(job).await
    }

    /// Startup flow: fetch the invoice, keep it as the draft, print after a pause
    #[instrument(skip_all, fields(source = %source.location()))]
    pub async fn load_and_print<C: ContentSource>(
        &mut self,
        source: &C,
        targets: Vec<PrinterTarget>,
    ) -> JobState {
        let Some(content) = self.fetch(source).await else {
            return JobState::Failed(FailureKind::ContentLoad);
        };

        if let Err(e) = self.drafts.save(&content) {
            warn!(error = %e, "Could not store invoice as draft");
        }

        let job = PrintJob::new(content, AUTO_INVOICE_TITLE).with_targets(targets);
        let image_job = job.contains_marker(&self.bridge.config().image_marker)
            && self.bridge.is_embedded_host();
        if !image_job {
            tokio::time::sleep(self.bridge.config().auto_print_delay).await;
        }

        self.run(job).await
    }

    pub fn save_draft(&self, text: &str) -> BridgeResult<()> {
        self.drafts.save(text)
    }

    pub fn draft(&self) -> Option<String> {
        self.drafts.load().unwrap_or_else(|e| {
            warn!(error = %e, "Draft unavailable");
            None
        })
    }

    pub fn clear_history(&mut self) -> BridgeResult<()> {
        self.history.clear()?;
        self.bridge.notify(Notification::info("History cleared"));
        Ok(())
    }

    async fn fetch<C: ContentSource>(&self, source: &C) -> Option<String> {
        match source.fetch_text().await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(error = %e, "Invoice content load failed");
                self.bridge
                    .notify(Notification::error("Could not load invoice content"));
                None
            }
        }
    }

    async fn run(&mut self, job: PrintJob) -> JobState {
        let state = self.bridge.dispatch(&job).await;

        let status = match state {
            JobState::Delivered { .. } => HistoryStatus::Webview,
            JobState::Rendered => HistoryStatus::Success,
            JobState::Failed(FailureKind::EmptyContent) => return state,
            _ => HistoryStatus::Error,
        };

        match self.history.record(job.content, status, job.targets) {
            Ok(entry) => info!(id = entry.id, status = %entry.status, "Print recorded"),
            Err(e) => warn!(error = %e, "Could not persist print history"),
        }
        state
    }
}
