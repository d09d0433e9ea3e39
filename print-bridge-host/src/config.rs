use std::path::PathBuf;
use std::time::Duration;

use print_bridge::{BridgeConfig, HostEnvironment, NATIVE_CHANNEL_BINDING, PrinterTarget};

/// Where native channel payloads go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Newline-delimited JSON on stdout, read by the native shell
    Stdout,
    /// No binding exposed
    None,
}

impl ChannelMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "none" | "off" | "" => Some(Self::None),
            _ => None,
        }
    }
}

/// Host configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (or a `.env` file):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | Storage origin and print view location |
/// | USER_AGENT | (empty) | User agent reported by the page host |
/// | EMBEDDED_HOST | false | Manual embedded-host override |
/// | NATIVE_BINDINGS | (empty) | Extra global bindings, comma separated |
/// | NATIVE_CHANNEL | stdout | `stdout` (exposes `NativePrinter`) or `none` |
/// | CONTENT_SOURCE | content.txt | Invoice URL or file path |
/// | PRINTERS | (empty) | `ip[:copies]`, comma separated |
/// | PRINT_COMMAND | (unset) | Command run on the fallback print view, e.g. `lp`; required for fallback printing |
/// | RESTORE_DELAY_MS | 100 | Page restore delay after fallback print |
/// | AUTO_PRINT_DELAY_MS | 1000 | Delay before automatic print |
/// | LOG_LEVEL | info | Log level when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | Daily rotating log files |
///
/// With the default `NATIVE_CHANNEL=stdout` the host exposes the
/// `NativePrinter` binding, so every job counts as embedded whatever
/// `USER_AGENT` says. The browser-print fallback only runs with
/// `NATIVE_CHANNEL=none`, and then needs `PRINT_COMMAND`.
///
/// # Example
///
/// ```ignore
/// PRINTERS=10.0.0.5:2,10.0.0.6 USER_AGENT="Flutter" print-bridge-host auto
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub user_agent: String,
    pub embedded_host: bool,
    pub native_bindings: Vec<String>,
    pub native_channel: ChannelMode,
    pub content_source: String,
    pub printers: Vec<PrinterTarget>,
    pub print_command: Option<String>,
    pub restore_delay_ms: u64,
    pub auto_print_delay_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            work_dir: non_empty("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./work_dir")),
            user_agent: lookup("USER_AGENT").unwrap_or_default(),
            embedded_host: non_empty("EMBEDDED_HOST")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            native_bindings: non_empty("NATIVE_BINDINGS")
                .map(|v| split_list(&v).map(str::to_string).collect())
                .unwrap_or_default(),
            native_channel: non_empty("NATIVE_CHANNEL")
                .and_then(|v| ChannelMode::parse(&v))
                .unwrap_or(ChannelMode::Stdout),
            content_source: non_empty("CONTENT_SOURCE").unwrap_or_else(|| "content.txt".into()),
            printers: non_empty("PRINTERS")
                .map(|v| parse_printers(&v))
                .unwrap_or_default(),
            print_command: non_empty("PRINT_COMMAND"),
            restore_delay_ms: non_empty("RESTORE_DELAY_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(100),
            auto_print_delay_ms: non_empty("AUTO_PRINT_DELAY_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1000),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: non_empty("LOG_JSON")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            log_dir: non_empty("LOG_DIR"),
        }
    }

    /// Signals the page host would expose
    pub fn host_environment(&self) -> HostEnvironment {
        let mut env = HostEnvironment::new(self.user_agent.clone())
            .with_embedded_override(self.embedded_host);
        for binding in &self.native_bindings {
            env = env.with_binding(binding.clone());
        }
        if self.native_channel == ChannelMode::Stdout {
            env = env.with_binding(NATIVE_CHANNEL_BINDING);
        }
        env
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::default()
            .with_restore_delay(Duration::from_millis(self.restore_delay_ms))
            .with_auto_print_delay(Duration::from_millis(self.auto_print_delay_ms))
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.work_dir.join("storage")
    }

    pub fn print_view_path(&self) -> PathBuf {
        self.work_dir.join("print-view.html")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `ip[:copies],...`, skipping blank entries
pub fn parse_printers(value: &str) -> Vec<PrinterTarget> {
    split_list(value)
        .filter_map(PrinterTarget::parse_spec)
        .collect()
}
