//! Bridge tuning knobs

use std::time::Duration;

/// User-agent marker set by the embedded WebView
pub const DEFAULT_USER_AGENT_MARKER: &str = "Flutter";

/// Global bindings whose presence means we run inside the embedded host
pub const DEFAULT_NATIVE_BINDINGS: &[&str] =
    &["NativePrinter", "flutter_inappwebview", "flutter_cuenti"];

/// Binding name of the native print channel itself
pub const NATIVE_CHANNEL_BINDING: &str = "NativePrinter";

/// Marker for invoices carrying an inline image the native side must rasterize
pub const EMBEDDED_IMAGE_MARKER: &str = "<imagen_grande>";

/// Storage key of the serialized print history
pub const HISTORY_KEY: &str = "printHistory";

/// Storage key of the draft text
pub const DRAFT_KEY: &str = "savedText";

/// Maximum number of history entries kept
pub const MAX_HISTORY: usize = 20;

/// Bridge configuration
///
/// Every field has a default matching the embedded host's expectations; hosts
/// only override what they need.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub user_agent_marker: String,
    pub native_bindings: Vec<String>,
    /// Delay before the page is restored after the fallback print action
    pub restore_delay: Duration,
    /// Delay before the automatic load-and-print flow dispatches
    pub auto_print_delay: Duration,
    pub history_capacity: usize,
    pub image_marker: String,
}

impl BridgeConfig {
    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    pub fn with_auto_print_delay(mut self, delay: Duration) -> Self {
        self.auto_print_delay = delay;
        self
    }

    /// No delays at all (tests, batch hosts)
    pub fn immediate() -> Self {
        Self::default()
            .with_restore_delay(Duration::ZERO)
            .with_auto_print_delay(Duration::ZERO)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            user_agent_marker: DEFAULT_USER_AGENT_MARKER.to_string(),
            native_bindings: DEFAULT_NATIVE_BINDINGS
                .iter()
                .map(|b| b.to_string())
                .collect(),
            restore_delay: Duration::from_millis(100),
            auto_print_delay: Duration::from_millis(1000),
            history_capacity: MAX_HISTORY,
            image_marker: EMBEDDED_IMAGE_MARKER.to_string(),
        }
    }
}
