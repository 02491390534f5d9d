//! # Dashgraft Terminal Output (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Plain-text formatting for everything dashgraft shows the user on stdout:
//! section headings, step lines, and the notices collected while a pipeline
//! runs. Diagnostics go through `tracing` to stderr instead; this module is
//! only for the report the user is meant to read.
//!
//! Formatting functions return `String` so they can be tested; the `print_*`
//! wrappers write them out.
//!

/// How much attention a notice needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal outcome reported in the final summary. `instructions`
/// carries manual steps the user still has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub instructions: Option<String>,
}

impl Notice {
    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Info,
            title: title.into(),
            detail: detail.into(),
            instructions: None,
        }
    }

    pub fn warning(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Warning,
            title: title.into(),
            detail: detail.into(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

pub fn format_heading(title: &str) -> String {
    format!("\n==> {}", title)
}

/// `  label: value`, with labels padded to a common width.
pub fn format_field(label: &str, value: &str) -> String {
    format!("  {:<16} {}", format!("{}:", label), value)
}

pub fn format_notice(notice: &Notice) -> String {
    let marker = match notice.severity {
        Severity::Info => "-",
        Severity::Warning => "!",
    };
    let mut out = format!("  {} {}: {}", marker, notice.title, notice.detail);
    if let Some(instructions) = &notice.instructions {
        for line in instructions.lines() {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str("      ");
                out.push_str(line);
            }
        }
    }
    out
}

pub fn print_heading(title: &str) {
    println!("{}", format_heading(title));
}

pub fn print_field(label: &str, value: &str) {
    println!("{}", format_field(label, value));
}

pub fn print_step(text: &str) {
    println!("  - {}", text);
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{}", format_notice(notice));
    }
}
