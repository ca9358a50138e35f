//! Output rendering for the event stream.
//!
//! The renderer owns presentation and nothing else: it consumes the
//! run's event channel and prints warnings and errors as they arrive (text
//! mode) or a single JSON report at the end (json mode). Color honors
//! `--no-color` and the `NO_COLOR` environment variable; emoji decoration
//! is dropped when `CI` is set, which changes nothing but the dressing.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cli::args::{Args, OutputFormat};
use crate::engine::outcome::{Event, Summary};

/// Machine-readable run report, errors grouped before warnings.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    errors: &'a [String],
    warnings: &'a [String],
    summary: Summary,
}

/// Event-stream renderer.
pub struct Renderer {
    format: OutputFormat,
    color: bool,
    decorated: bool,
    quiet: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat, quiet: bool, no_color: bool) -> Self {
        Renderer {
            format,
            color: !no_color && std::env::var_os("NO_COLOR").is_none(),
            decorated: std::env::var_os("CI").is_none(),
            quiet,
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Renderer::new(args.format, args.quiet, args.no_color)
    }

    /// Consume events until the run is done; returns the final summary,
    /// or `None` if the channel closed without one.
    pub async fn render(&self, mut events: UnboundedReceiver<Event>) -> Option<Summary> {
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        while let Some(event) = events.recv().await {
            match event {
                Event::Status(message) => {
                    if self.format == OutputFormat::Text && !self.quiet {
                        println!("{}", self.cyan(&format!("Status: {message}")));
                    }
                }
                Event::Warning(message) => {
                    if self.format == OutputFormat::Text {
                        println!(
                            "{}{} {}",
                            self.decoration("\u{26a0}\u{fe0f}  "),
                            self.yellow("Warning:"),
                            message
                        );
                    }
                    warnings.push(message);
                }
                Event::Error(message) => {
                    if self.format == OutputFormat::Text {
                        println!(
                            "{}{} {}",
                            self.decoration("\u{274c} "),
                            self.red("Error:"),
                            message
                        );
                    }
                    errors.push(message);
                }
                Event::Done(summary) => {
                    match self.format {
                        OutputFormat::Text => self.print_summary(&summary),
                        OutputFormat::Json => self.print_json(&errors, &warnings, summary),
                    }
                    return Some(summary);
                }
            }
        }

        None
    }

    fn print_summary(&self, summary: &Summary) {
        let banner = if summary.success {
            format!("{}{} ", self.decoration("\u{1f389} "), self.green("Success!"))
        } else {
            String::new()
        };

        println!(
            "{}Done with {} and {}.",
            banner,
            self.red(&pluralize(summary.errors, "error")),
            self.yellow(&pluralize(summary.warnings, "warning"))
        );
    }

    fn print_json(&self, errors: &[String], warnings: &[String], summary: Summary) {
        let report = JsonReport {
            errors,
            warnings,
            summary,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("could not serialize report: {e}"),
        }
    }

    fn decoration<'a>(&self, emoji: &'a str) -> &'a str {
        if self.decorated {
            emoji
        } else {
            ""
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn yellow(&self, text: &str) -> String {
        self.colorize(text, "33")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn cyan(&self, text: &str) -> String {
        self.colorize(text, "36")
    }
}

/// "0 errors", "1 error", "2 errors"
fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
