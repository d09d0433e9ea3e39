//! Native channel wire contract
//!
//! One JSON text per message, tagged on `"type"`:
//!
//! ```json
//! {"type":"printToPrinter","ip":"10.0.0.5","content":"INV-1","copies":2}
//! {"type":"processInvoiceWithImage","content":"...","title":"...","printers":[{"ip":"10.0.0.5","copies":1}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BridgeResult;
use crate::job::{PrintJob, PrinterTarget};

/// Message posted to the native channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NativeMessage {
    /// Print `content` on one printer
    PrintToPrinter {
        ip: String,
        content: String,
        copies: u32,
    },
    /// Hand the whole invoice to the native side for image processing
    ProcessInvoiceWithImage {
        content: String,
        title: String,
        printers: Vec<PrinterTarget>,
    },
}

impl NativeMessage {
    pub fn print_to_printer(content: &str, target: &PrinterTarget) -> Self {
        Self::PrintToPrinter {
            ip: target.address.clone(),
            content: content.to_string(),
            copies: target.copies,
        }
    }

    pub fn process_with_image(job: &PrintJob) -> Self {
        Self::ProcessInvoiceWithImage {
            content: job.content.clone(),
            title: job.title.clone(),
            printers: job.targets.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PrintToPrinter { .. } => "printToPrinter",
            Self::ProcessInvoiceWithImage { .. } => "processInvoiceWithImage",
        }
    }

    /// Serialize to the text payload the channel carries
    pub fn to_payload(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
