//! Standalone fallback: render the invoice as a full page and print it

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use crate::error::{BridgeError, BridgeResult};

const VIEW_STYLE: &str = "font-family:Arial,sans-serif; font-size:12pt; line-height:1.5; \
     margin:2cm; color:#000; white-space:pre-wrap; word-wrap:break-word;";

/// Full-page transient view of a print job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintView {
    pub title: String,
    pub content: String,
}

impl PrintView {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Render as a standalone HTML document
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div class=\"text-content\" style=\"{}\">{}</div>\n</body>\n</html>\n",
            escape_html(&self.title),
            VIEW_STYLE,
            escape_html(&self.content),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shows a print view and triggers the platform print action
pub trait FallbackRenderer: Send + Sync {
    /// Replace the current page with `view` and invoke printing
    fn render(&self, view: &PrintView) -> BridgeResult<()>;

    /// Bring back the page shown before the last `render`
    fn restore(&self) -> BridgeResult<()>;
}

impl<T: FallbackRenderer + ?Sized> FallbackRenderer for std::sync::Arc<T> {
    fn render(&self, view: &PrintView) -> BridgeResult<()> {
        (**self).render(view)
    }

    fn restore(&self) -> BridgeResult<()> {
        (**self).restore()
    }
}

/// Writes the view to an HTML page file and runs the print command on it
///
/// Without a print command nothing would reach a printer, so `render` fails
/// with [`BridgeError::Render`] after writing the page.
pub struct HtmlFileRenderer {
    page: PathBuf,
    print_command: Option<Vec<String>>,
    previous: Mutex<Option<Option<String>>>,
}

impl HtmlFileRenderer {
    pub fn new(page: impl Into<PathBuf>) -> Self {
        Self {
            page: page.into(),
            print_command: None,
            previous: Mutex::new(None),
        }
    }

    /// Command line run with the page path appended, e.g. `lp -d receipts`
    pub fn with_print_command(mut self, command: Option<&str>) -> Self {
        self.print_command = command
            .map(|c| c.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty());
        self
    }

    pub fn page(&self) -> &Path {
        &self.page
    }

    fn run_print_command(&self) -> BridgeResult<()> {
        let Some((program, args)) = self.print_command.as_ref().and_then(|c| c.split_first())
        else {
            warn!(page = %self.page.display(), "Print view written, no print command configured");
            return Err(BridgeError::Render("no print command configured".into()));
        };

        let status = Command::new(program)
            .args(args)
            .arg(&self.page)
            .status()
            .map_err(|e| BridgeError::Render(format!("{}: {}", program, e)))?;

        if !status.success() {
            return Err(BridgeError::Render(format!(
                "{} exited with {}",
                program, status
            )));
        }
        info!(program = %program, "Print command finished");
        Ok(())
    }
}

impl FallbackRenderer for HtmlFileRenderer {
    #[instrument(skip_all, fields(page = %self.page.display()))]
    fn render(&self, view: &PrintView) -> BridgeResult<()> {
        let prior = match fs::read_to_string(&self.page) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = self.page.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.page, view.to_html())?;

        // Only the first render of a cycle owns the snapshot
        let mut previous = self.previous.lock();
        if previous.is_none() {
            *previous = Some(prior);
        }
        drop(previous);

        self.run_print_command()
    }

    #[instrument(skip_all, fields(page = %self.page.display()))]
    fn restore(&self) -> BridgeResult<()> {
        match self.previous.lock().take() {
            Some(Some(prior)) => fs::write(&self.page, prior)?,
            Some(None) => {
                if let Err(e) = fs::remove_file(&self.page)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    return Err(e.into());
                }
            }
            None => warn!("Restore without a rendered view"),
        }
        Ok(())
    }
}

/// Renderer keeping the rendered views in memory
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<PrintView>>,
    restores: Mutex<usize>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<PrintView> {
        self.rendered.lock().clone()
    }

    pub fn restore_count(&self) -> usize {
        *self.restores.lock()
    }
}

impl FallbackRenderer for RecordingRenderer {
    fn render(&self, view: &PrintView) -> BridgeResult<()> {
        self.rendered.lock().push(view.clone());
        Ok(())
    }

    fn restore(&self) -> BridgeResult<()> {
        *self.restores.lock() += 1;
        Ok(())
    }
}
