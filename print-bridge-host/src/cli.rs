use clap::{Parser, Subcommand};

use print_bridge::PrinterTarget;

/// Print bridge host CLI
#[derive(Parser, Debug)]
#[command(
    name = "print-bridge-host",
    about = "Routes invoice print jobs to the embedded app's native channel or to a browser-print fallback."
)]
pub struct Cli {
    /// Printer as ip[:copies] (repeatable, replaces PRINTERS)
    #[arg(short, long = "printer", value_parser = parse_target)]
    pub printers: Vec<PrinterTarget>,

    /// Force embedded-host mode
    #[arg(long)]
    pub embedded: bool,

    /// Invoice URL or file path (replaces CONTENT_SOURCE)
    #[arg(long)]
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load the invoice, keep it as the draft and print it
    Auto,
    /// Print the given text, or the saved draft
    Print { text: Option<String> },
    /// Fetch the invoice and print it now
    Fetch,
    /// Save draft text
    Draft { text: String },
    /// List the print history, newest first
    History,
    /// Clear the print history
    ClearHistory,
}

fn parse_target(value: &str) -> Result<PrinterTarget, String> {
    PrinterTarget::parse_spec(value).ok_or_else(|| format!("invalid printer: {:?}", value))
}
