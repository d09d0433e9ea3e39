//! Embedded host detection
//!
//! The page can run inside the mobile app's WebView or in a plain browser.
//! Detection works on an explicit [`HostEnvironment`] handed in by the host,
//! never on process-wide state.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::config::BridgeConfig;

/// Ambient signals of the runtime host
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    user_agent: String,
    bindings: BTreeSet<String>,
    embedded_override: bool,
}

impl HostEnvironment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    /// Declare a global binding as present
    pub fn with_binding(mut self, name: impl Into<String>) -> Self {
        self.bindings.insert(name.into());
        self
    }

    /// Start with the manual override already set
    pub fn with_embedded_override(mut self, embedded: bool) -> Self {
        self.embedded_override = embedded;
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains(name)
    }
}

/// Classifies the host as embedded or standalone
#[derive(Debug)]
pub struct HostDetector {
    env: HostEnvironment,
    marker: String,
    bindings: Vec<String>,
    forced: AtomicBool,
}

impl HostDetector {
    pub fn new(env: HostEnvironment, config: &BridgeConfig) -> Self {
        let forced = AtomicBool::new(env.embedded_override);
        Self {
            env,
            marker: config.user_agent_marker.clone(),
            bindings: config.native_bindings.clone(),
            forced,
        }
    }

    /// True when any embedded-host signal is present
    pub fn is_embedded_host(&self) -> bool {
        if self.forced.load(Ordering::Relaxed) {
            return true;
        }
        if !self.marker.is_empty() && self.env.user_agent.contains(&self.marker) {
            return true;
        }
        let bound = self.bindings.iter().find(|b| self.env.has_binding(b));
        if let Some(name) = bound {
            debug!(binding = %name, "Native binding present");
            return true;
        }
        false
    }

    /// Force embedded-host mode when automatic detection is unreliable
    pub fn mark_embedded_host(&self) {
        if !self.forced.swap(true, Ordering::Relaxed) {
            info!("Embedded host marked manually");
        }
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.env
    }
}
