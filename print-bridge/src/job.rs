//! Print job types

use serde::{Deserialize, Serialize};

/// One printer a job is sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterTarget {
    /// Printer address as typed by the operator (not validated)
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_copies() -> u32 {
    1
}

impl PrinterTarget {
    pub fn new(address: impl Into<String>, copies: u32) -> Self {
        Self {
            address: address.into(),
            copies: copies.max(1),
        }
    }

    /// Build a target from raw row input
    ///
    /// Returns `None` for a blank address. Copies are read from the leading
    /// integer of the input (`"2.5"` is 2); anything without one, or not
    /// positive, falls back to 1.
    pub fn from_input(address: &str, copies: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        Some(Self::new(address, parse_copies(copies)))
    }

    /// Parse `ip[:copies]`
    pub fn parse_spec(value: &str) -> Option<Self> {
        match value.trim().rsplit_once(':') {
            Some((ip, copies)) => Self::from_input(ip, copies),
            None => Self::from_input(value, ""),
        }
    }
}

fn parse_copies(raw: &str) -> u32 {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end]
        .parse::<u32>()
        .ok()
        .filter(|c| *c > 0)
        .unwrap_or(1)
}

/// Collect targets from `(address, copies)` input rows, skipping blank ones
pub fn collect_targets<'a, I>(rows: I) -> Vec<PrinterTarget>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    rows.into_iter()
        .filter_map(|(address, copies)| PrinterTarget::from_input(address, copies))
        .collect()
}

/// A print job, built fresh for each print action
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub content: String,
    pub title: String,
    pub targets: Vec<PrinterTarget>,
}

impl PrintJob {
    pub fn new(content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<PrinterTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    pub fn contains_marker(&self, marker: &str) -> bool {
        !marker.is_empty() && self.content.contains(marker)
    }
}
