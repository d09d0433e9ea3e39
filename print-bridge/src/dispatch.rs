//! Dispatch bridge: route a print job to the native channel or the fallback renderer
//!
//! Per job: `Idle -> Dispatching -> {Delivered, Rendered, Failed}`. Every
//! terminal state is final; a new print action builds a new job.
//!
//! Failures never surface as errors to the caller. The operator is told
//! through a [`Notification`] and the returned [`JobState`] says what
//! happened.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::channel::NativeChannel;
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::host::HostDetector;
use crate::job::{PrintJob, PrinterTarget};
use crate::message::NativeMessage;
use crate::notify::{Notification, Notifier};
use crate::renderer::{FallbackRenderer, PrintView};

/// Why a job ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyContent,
    NoTargetsConfigured,
    ChannelUnavailable,
    /// Invoice content could not be fetched
    ContentLoad,
    /// Every post to the channel failed
    Channel,
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Dispatching,
    /// Handed to the native channel, fire-and-forget
    Delivered { delivered: usize, failed: usize },
    /// Fallback print view shown and printed
    Rendered,
    Failed(FailureKind),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Dispatching)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Dispatching => f.write_str("dispatching"),
            Self::Delivered { delivered, failed } => {
                write!(f, "delivered ({} sent, {} failed)", delivered, failed)
            }
            Self::Rendered => f.write_str("rendered"),
            Self::Failed(kind) => write!(f, "failed ({:?})", kind),
        }
    }
}

pub struct DispatchBridge {
    detector: HostDetector,
    channel: Option<Arc<dyn NativeChannel>>,
    renderer: Arc<dyn FallbackRenderer>,
    notifier: Arc<dyn Notifier>,
    config: BridgeConfig,
}

impl DispatchBridge {
    /// Bridge without a native channel binding
    pub fn new(
        detector: HostDetector,
        renderer: Arc<dyn FallbackRenderer>,
        notifier: Arc<dyn Notifier>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            detector,
            channel: None,
            renderer,
            notifier,
            config,
        }
    }

    /// Attach the native channel binding
    ///
    /// The detector stays authoritative: hosts that expose the channel also
    /// list its binding in their [`crate::HostEnvironment`].
    pub fn with_channel(mut self, channel: Arc<dyn NativeChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn is_embedded_host(&self) -> bool {
        self.detector.is_embedded_host()
    }

    pub fn mark_embedded_host(&self) {
        self.detector.mark_embedded_host();
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Dispatch a job and return its terminal state
    #[instrument(skip_all, fields(title = %job.title, targets = job.targets.len()))]
    pub async fn dispatch(&self, job: &PrintJob) -> JobState {
        info!(from = %JobState::Idle, to = %JobState::Dispatching, "Job state");

        let state = if !job.has_content() {
            self.notify(Notification::error("No invoice content to print"));
            JobState::Failed(FailureKind::EmptyContent)
        } else if job.targets.is_empty() {
            self.notify(Notification::error("No printers configured"));
            JobState::Failed(FailureKind::NoTargetsConfigured)
        } else if self.detector.is_embedded_host() {
            self.deliver(job)
        } else {
            self.render_fallback(job).await
        };

        info!(from = %JobState::Dispatching, to = %state, "Job state");
        state
    }

    fn deliver(&self, job: &PrintJob) -> JobState {
        let Some(channel) = self.channel.as_deref() else {
            error!("Embedded host detected but native channel is missing");
            self.notify(Notification::error("Native print channel unavailable"));
            return JobState::Failed(FailureKind::ChannelUnavailable);
        };

        if job.contains_marker(&self.config.image_marker) {
            return match post(channel, &NativeMessage::process_with_image(job)) {
                Ok(()) => {
                    self.notify(Notification::success(
                        "Invoice with image sent for processing",
                    ));
                    JobState::Delivered {
                        delivered: 1,
                        failed: 0,
                    }
                }
                Err(e) => {
                    error!(error = %e, "Image job not delivered");
                    self.notify(Notification::error(format!("Could not send invoice: {}", e)));
                    JobState::Failed(FailureKind::Channel)
                }
            };
        }

        let mut delivered = 0;
        let mut failed = 0;
        for target in &job.targets {
            match self.deliver_to(channel, &job.content, target) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // Next target is still attempted
                    warn!(printer = %target.address, error = %e, "Delivery failed");
                    self.notify(Notification::error(format!(
                        "Could not send to {}: {}",
                        target.address, e
                    )));
                    failed += 1;
                }
            }
        }

        if delivered == 0 {
            JobState::Failed(FailureKind::Channel)
        } else {
            JobState::Delivered { delivered, failed }
        }
    }

    fn deliver_to(
        &self,
        channel: &dyn NativeChannel,
        content: &str,
        target: &PrinterTarget,
    ) -> BridgeResult<()> {
        post(channel, &NativeMessage::print_to_printer(content, target))?;
        self.notify(Notification::success(format!(
            "Invoice sent to {} ({} copies)",
            target.address, target.copies
        )));
        Ok(())
    }

    async fn render_fallback(&self, job: &PrintJob) -> JobState {
        let view = PrintView::new(&job.title, &job.content);

        if let Err(e) = self.renderer.render(&view) {
            error!(error = %e, "Fallback render failed");
            if let Err(e) = self.renderer.restore() {
                warn!(error = %e, "Restore after failed render");
            }
            self.notify(Notification::error(format!("Browser print failed: {}", e)));
            return JobState::Failed(FailureKind::Render);
        }

        // No print-completion signal exists; the delay stands in for it
        tokio::time::sleep(self.config.restore_delay).await;
        if let Err(e) = self.renderer.restore() {
            warn!(error = %e, "Could not restore page after printing");
        }

        self.notify(Notification::success("Sent to browser print"));
        JobState::Rendered
    }
}

fn post(channel: &dyn NativeChannel, message: &NativeMessage) -> BridgeResult<()> {
    let payload = message.to_payload()?;
    channel.post_message(&payload)?;
    info!(kind = message.kind(), bytes = payload.len(), "Posted to native channel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::error::BridgeError;
    use crate::host::HostEnvironment;
    use crate::notify::{MemoryNotifier, NotificationLevel};
    use crate::renderer::{HtmlFileRenderer, RecordingRenderer};

    struct Fixture {
        channel: Arc<MemoryChannel>,
        renderer: Arc<RecordingRenderer>,
        notifier: Arc<MemoryNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                channel: Arc::new(MemoryChannel::new()),
                renderer: Arc::new(RecordingRenderer::new()),
                notifier: Arc::new(MemoryNotifier::new()),
            }
        }

        fn bridge(&self, env: HostEnvironment, with_channel: bool) -> DispatchBridge {
            let config = BridgeConfig::immediate();
            let bridge = DispatchBridge::new(
                HostDetector::new(env, &config),
                self.renderer.clone(),
                self.notifier.clone(),
                config,
            );
            if with_channel {
                bridge.with_channel(self.channel.clone())
            } else {
                bridge
            }
        }
    }

    fn embedded() -> HostEnvironment {
        HostEnvironment::new("Mozilla/5.0 Flutter").with_binding("NativePrinter")
    }

    fn standalone() -> HostEnvironment {
        HostEnvironment::new("Mozilla/5.0 (Windows NT 10.0) Chrome/126.0")
    }

    fn invoice() -> PrintJob {
        PrintJob::new("INV-1", "Factura").with_targets(vec![PrinterTarget::new("10.0.0.5", 2)])
    }

    #[tokio::test]
    async fn test_embedded_delivers_one_message_per_target() {
        let fx = Fixture::new();
        let state = fx.bridge(embedded(), true).dispatch(&invoice()).await;

        assert_eq!(
            state,
            JobState::Delivered {
                delivered: 1,
                failed: 0
            }
        );
        let sent = fx.channel.sent();
        assert_eq!(sent.len(), 1);
        let msg: NativeMessage = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(
            msg,
            NativeMessage::PrintToPrinter {
                ip: "10.0.0.5".into(),
                content: "INV-1".into(),
                copies: 2,
            }
        );
        assert!(fx.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_standalone_renders_without_channel_call() {
        let fx = Fixture::new();
        let state = fx.bridge(standalone(), true).dispatch(&invoice()).await;

        assert_eq!(state, JobState::Rendered);
        assert!(fx.channel.is_empty());
        assert_eq!(fx.renderer.rendered(), vec![PrintView::new("Factura", "INV-1")]);
        assert_eq!(fx.renderer.restore_count(), 1);
    }

    #[tokio::test]
    async fn test_standalone_without_print_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("print-view.html");
        let notifier = Arc::new(MemoryNotifier::new());
        let config = BridgeConfig::immediate();
        let bridge = DispatchBridge::new(
            HostDetector::new(standalone(), &config),
            Arc::new(HtmlFileRenderer::new(&page).with_print_command(None)),
            notifier.clone(),
            config,
        );

        let state = bridge.dispatch(&invoice()).await;

        assert_eq!(state, JobState::Failed(FailureKind::Render));
        assert!(!page.exists());
        let received = notifier.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].is_error());
        assert!(received[0].text.contains("no print command configured"));
    }

    #[tokio::test]
    async fn test_empty_content_never_reaches_channel() {
        let fx = Fixture::new();
        let bridge = fx.bridge(embedded(), true);
        for content in ["", "   \n"] {
            let job = PrintJob::new(content, "t").with_targets(vec![PrinterTarget::new("p", 1)]);
            assert_eq!(
                bridge.dispatch(&job).await,
                JobState::Failed(FailureKind::EmptyContent)
            );
        }
        assert!(fx.channel.is_empty());
        assert_eq!(fx.notifier.errors().len(), 2);
    }

    #[tokio::test]
    async fn test_no_targets_never_reaches_channel() {
        let fx = Fixture::new();
        let state = fx
            .bridge(embedded(), true)
            .dispatch(&PrintJob::new("INV-1", "t"))
            .await;

        assert_eq!(state, JobState::Failed(FailureKind::NoTargetsConfigured));
        assert!(fx.channel.is_empty());
        assert!(fx.renderer.rendered().is_empty());
        let errors = fx.notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "No printers configured");
    }

    #[tokio::test]
    async fn test_embedded_without_channel_is_unavailable() {
        let fx = Fixture::new();
        let env = HostEnvironment::new("Mozilla/5.0 Flutter");
        let state = fx.bridge(env, false).dispatch(&invoice()).await;

        assert_eq!(state, JobState::Failed(FailureKind::ChannelUnavailable));
        assert!(fx.renderer.rendered().is_empty());
        assert_eq!(fx.notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_manual_override_routes_to_channel() {
        let fx = Fixture::new();
        let bridge = fx.bridge(standalone(), true);
        bridge.mark_embedded_host();

        bridge.dispatch(&invoice()).await;
        assert_eq!(fx.channel.len(), 1);
        assert!(fx.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_image_content_goes_as_single_message() {
        let fx = Fixture::new();
        let job = PrintJob::new("FACTURA <imagen_grande>iVBOR</imagen_grande>", "Factura")
            .with_targets(vec![
                PrinterTarget::new("10.0.0.5", 1),
                PrinterTarget::new("10.0.0.6", 3),
            ]);
        fx.bridge(embedded(), true).dispatch(&job).await;

        let sent = fx.channel.sent();
        assert_eq!(sent.len(), 1);
        let msg: NativeMessage = serde_json::from_str(&sent[0]).unwrap();
        assert!(matches!(
            msg,
            NativeMessage::ProcessInvoiceWithImage { ref printers, .. } if printers.len() == 2
        ));
    }

    /// Fails for one address, records the rest
    struct FlakyChannel {
        bad: &'static str,
        inner: MemoryChannel,
    }

    impl NativeChannel for FlakyChannel {
        fn post_message(&self, payload: &str) -> BridgeResult<()> {
            if payload.contains(self.bad) {
                return Err(BridgeError::Channel("pipe closed".into()));
            }
            self.inner.post_message(payload)
        }
    }

    #[tokio::test]
    async fn test_failed_target_does_not_block_the_next() {
        let fx = Fixture::new();
        let flaky = Arc::new(FlakyChannel {
            bad: "10.0.0.5",
            inner: MemoryChannel::new(),
        });
        let bridge = fx.bridge(embedded(), false).with_channel(flaky.clone());
        let job = PrintJob::new("INV-1", "t").with_targets(vec![
            PrinterTarget::new("10.0.0.5", 1),
            PrinterTarget::new("10.0.0.6", 1),
        ]);

        let state = bridge.dispatch(&job).await;
        assert_eq!(
            state,
            JobState::Delivered {
                delivered: 1,
                failed: 1
            }
        );
        assert_eq!(flaky.inner.len(), 1);

        let levels: Vec<_> = fx.notifier.received().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NotificationLevel::Error, NotificationLevel::Success]);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Idle.is_terminal());
        assert!(!JobState::Dispatching.is_terminal());
        assert!(JobState::Rendered.is_terminal());
        assert!(JobState::Failed(FailureKind::Render).is_terminal());
    }
}
