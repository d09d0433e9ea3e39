//! End-to-end print flows against file-backed adapters

use std::fs;
use std::sync::Arc;

use print_bridge::{
    BridgeConfig, DispatchBridge, FileContentSource, FileStorage, HISTORY_KEY, HistoryStatus,
    HostDetector, HostEnvironment, HtmlFileRenderer, JobState, LocalStorage, MemoryChannel,
    MemoryNotifier, NativeMessage, PrintSession, PrinterTarget, collect_targets,
};

struct Harness {
    _dir: tempfile::TempDir,
    page: std::path::PathBuf,
    invoice: std::path::PathBuf,
    storage: Arc<FileStorage>,
    channel: Arc<MemoryChannel>,
    notifier: Arc<MemoryNotifier>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, "<form>printers</form>").unwrap();
        let invoice = dir.path().join("content.txt");
        fs::write(&invoice, "FACTURA ELECTRONICA\nTotal: 42,00 EUR").unwrap();
        let storage = Arc::new(FileStorage::open(dir.path().join("origin")).unwrap());

        Self {
            page,
            invoice,
            storage,
            channel: Arc::new(MemoryChannel::new()),
            notifier: Arc::new(MemoryNotifier::new()),
            _dir: dir,
        }
    }

    fn session(&self, env: HostEnvironment) -> PrintSession {
        let config = BridgeConfig::immediate();
        let bridge = DispatchBridge::new(
            HostDetector::new(env, &config),
            Arc::new(HtmlFileRenderer::new(&self.page).with_print_command(Some("true"))),
            self.notifier.clone(),
            config,
        )
        .with_channel(self.channel.clone());
        PrintSession::new(bridge, self.storage.clone())
    }
}

#[tokio::test]
async fn test_standalone_flow_prints_and_restores_page() {
    let h = Harness::new();
    let mut session = h.session(HostEnvironment::new("Mozilla/5.0 Firefox/128.0"));
    let targets = collect_targets([("192.168.1.20", "1")]);

    let state = session
        .print_from_source(&FileContentSource::new(&h.invoice), targets)
        .await;

    assert_eq!(state, JobState::Rendered);
    assert!(h.channel.is_empty());
    assert_eq!(fs::read_to_string(&h.page).unwrap(), "<form>printers</form>");
    assert_eq!(
        session.history().newest().unwrap().status,
        HistoryStatus::Success
    );
}

#[tokio::test]
async fn test_embedded_flow_posts_wire_messages() {
    let h = Harness::new();
    let mut session = h.session(
        HostEnvironment::new("Mozilla/5.0 (Linux; Android 14) Flutter")
            .with_binding("NativePrinter"),
    );

    let state = session
        .load_and_print(
            &FileContentSource::new(&h.invoice),
            vec![
                PrinterTarget::new("10.0.0.5", 2),
                PrinterTarget::new("10.0.0.6", 1),
            ],
        )
        .await;

    assert_eq!(
        state,
        JobState::Delivered {
            delivered: 2,
            failed: 0
        }
    );
    let messages: Vec<NativeMessage> = h
        .channel
        .sent()
        .iter()
        .map(|p| serde_json::from_str(p).unwrap())
        .collect();
    assert_eq!(
        messages[0],
        NativeMessage::PrintToPrinter {
            ip: "10.0.0.5".into(),
            content: "FACTURA ELECTRONICA\nTotal: 42,00 EUR".into(),
            copies: 2,
        }
    );
    assert!(matches!(
        &messages[1],
        NativeMessage::PrintToPrinter { ip, copies: 1, .. } if ip == "10.0.0.6"
    ));
    // Page untouched on the embedded path
    assert_eq!(fs::read_to_string(&h.page).unwrap(), "<form>printers</form>");
    assert_eq!(
        session.draft().as_deref(),
        Some("FACTURA ELECTRONICA\nTotal: 42,00 EUR")
    );
}

#[tokio::test]
async fn test_history_survives_a_new_session() {
    let h = Harness::new();
    {
        let mut session = h.session(HostEnvironment::default().with_embedded_override(true));
        for i in 0..25 {
            session
                .print_text(&format!("INV-{}", i), vec![PrinterTarget::new("10.0.0.5", 1)])
                .await;
        }
        assert_eq!(session.history().len(), 20);
    }

    let session = h.session(HostEnvironment::default());
    let history = session.history();
    assert_eq!(history.len(), 20);
    assert_eq!(history.newest().unwrap().text, "INV-24");
    assert_eq!(history.entries().last().unwrap().text, "INV-5");
}

#[tokio::test]
async fn test_corrupt_history_is_ignored() {
    let h = Harness::new();
    h.storage.set_item(HISTORY_KEY, "[{\"id\":").unwrap();

    let mut session = h.session(HostEnvironment::default());
    assert!(session.history().is_empty());
    assert!(h.notifier.received().is_empty());

    session
        .print_text("INV-1", vec![PrinterTarget::new("10.0.0.5", 1)])
        .await;
    assert_eq!(session.history().len(), 1);
}
