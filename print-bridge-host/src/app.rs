//! Wires the bridge to the host's real adapters and runs one command

use std::sync::Arc;

use print_bridge::{
    DispatchBridge, FailureKind, FileStorage, HostDetector, HtmlFileRenderer, InvoiceSource,
    JobState, MemoryNotifier, Notification, PrintSession, WriterChannel,
};
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::{ChannelMode, Config};

/// Result of one command run
#[derive(Debug)]
pub struct Outcome {
    pub state: Option<JobState>,
    pub notifications: Vec<Notification>,
    /// Operator-facing listing (history); stdout belongs to the native channel
    pub report: Vec<String>,
}

impl Outcome {
    /// Jobs that ended in `Failed` make the process exit non-zero
    pub fn is_failure(&self) -> bool {
        matches!(self.state, Some(JobState::Failed(_)))
    }
}

pub struct App {
    config: Config,
    session: PrintSession,
    notifier: Arc<MemoryNotifier>,
}

impl App {
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let storage = Arc::new(FileStorage::open(config.storage_dir())?);
        let bridge_config = config.bridge_config();
        let detector = HostDetector::new(config.host_environment(), &bridge_config);
        let renderer = HtmlFileRenderer::new(config.print_view_path())
            .with_print_command(config.print_command.as_deref());
        let notifier = Arc::new(MemoryNotifier::new());

        let mut bridge =
            DispatchBridge::new(detector, Arc::new(renderer), notifier.clone(), bridge_config);
        if config.native_channel == ChannelMode::Stdout {
            bridge = bridge.with_channel(Arc::new(WriterChannel::stdout()));
        }

        info!(
            embedded = bridge.is_embedded_host(),
            channel = bridge.has_channel(),
            storage = %storage.dir().display(),
            "Print bridge ready"
        );

        Ok(Self {
            session: PrintSession::new(bridge, storage),
            config,
            notifier,
        })
    }

    /// Apply command-line overrides on top of the environment config
    pub fn from_cli(mut config: Config, cli: &Cli) -> anyhow::Result<Self> {
        if !cli.printers.is_empty() {
            config.printers = cli.printers.clone();
        }
        if let Some(source) = &cli.source {
            config.content_source = source.clone();
        }

        let app = Self::build(config)?;
        if cli.embedded {
            app.session.bridge().mark_embedded_host();
        }
        Ok(app)
    }

    pub fn session(&self) -> &PrintSession {
        &self.session
    }

    pub async fn run(&mut self, command: Command) -> anyhow::Result<Outcome> {
        let targets = self.config.printers.clone();
        let source = InvoiceSource::from_location(&self.config.content_source);
        let mut report = Vec::new();

        let state = match command {
            Command::Auto => Some(self.session.load_and_print(&source, targets).await),
            Command::Fetch => Some(self.session.print_from_source(&source, targets).await),
            Command::Print { text } => {
                let text = match text {
                    Some(text) => text,
                    None => self.session.draft().unwrap_or_default(),
                };
                Some(self.session.print_text(&text, targets).await)
            }
            Command::Draft { text } => {
                self.session.save_draft(&text)?;
                None
            }
            Command::History => {
                report = self
                    .session
                    .history()
                    .entries()
                    .map(|entry| {
                        format!(
                            "{}  {:<7}  {}  {}",
                            entry
                                .timestamp
                                .with_timezone(&chrono::Local)
                                .format("%Y-%m-%d %H:%M:%S"),
                            entry.status,
                            entry.preview().replace('\n', " "),
                            entry.printers_summary()
                        )
                    })
                    .collect();
                None
            }
            Command::ClearHistory => {
                self.session.clear_history()?;
                None
            }
        };

        match state {
            Some(JobState::Failed(FailureKind::ChannelUnavailable)) => {
                tracing::warn!("Set NATIVE_CHANNEL=stdout or drop the embedded override");
            }
            Some(JobState::Failed(FailureKind::Render)) if self.config.print_command.is_none() => {
                tracing::warn!("Set PRINT_COMMAND (e.g. lp) to print the fallback view");
            }
            _ => {}
        }

        Ok(Outcome {
            state,
            notifications: self.notifier.take(),
            report,
        })
    }
}
