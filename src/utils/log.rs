// src/utils/log.rs

//! Console progress output with server-style formatting.
//!
//! Diagnostics go through the `log` facade; this module renders the
//! user-facing run progress (headers, per-group steps, result lines and the
//! final summary) with timestamps.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;

use crate::models::{ProbeResult, ProbeStatus};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress all console output (used with `--json`).
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn enabled() -> bool {
    !QUIET.load(Ordering::Relaxed)
}

/// Format a line with timestamp and tag
fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

/// Print an informational line
pub fn info(message: &str) {
    if enabled() {
        println!("{}", format_line("INFO", message));
    }
}

/// Print a success line
pub fn success(message: &str) {
    if enabled() {
        println!("{}", format_line("INFO", &format!("✓ {}", message)));
    }
}

/// Print a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    if enabled() {
        let msg = format!("[STEP {}/{}] {}", step_num, total, message);
        println!("{}", format_line("INFO", &msg));
    }
}

/// Print a header
pub fn header(title: &str) {
    if enabled() {
        let border = "═".repeat(60);
        println!("{}", format_line("INFO", &border));
        println!("{}", format_line("INFO", &format!("  {}", title)));
        println!("{}", format_line("INFO", &border));
    }
}

/// Print a sub-item (indented)
pub fn sub_item(message: &str) {
    if enabled() {
        println!("{}", format_line("INFO", &format!("    {}", message)));
    }
}

/// Render one probe result as a single line.
pub fn result_line(result: &ProbeResult) -> String {
    let country = &result.country;
    let mark = match result.status {
        ProbeStatus::Accessible => "✓",
        ProbeStatus::Blocked => "✗",
        ProbeStatus::Error => "!",
    };
    let mut line = format!(
        "{} {} {:<15} {:<10}",
        mark, country.flag, country.name, result.status
    );
    if let Some(status) = result.http_status {
        line.push_str(&format!(" HTTP {status}"));
    }
    if let Some(ms) = result.load_time {
        line.push_str(&format!(" {ms}ms"));
    }
    if let Some(cdn) = &result.cdn {
        line.push_str(&format!(" via {cdn}"));
    }
    if result.vpn_detected {
        line.push_str(" [VPN detected]");
    }
    if let Some(error) = &result.error {
        line.push_str(&format!(" - {error}"));
    }
    line
}

/// Print a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if enabled() {
        println!();
        println!("{}", format_line("SUMMARY", title));
        for (key, value) in items {
            println!("{}", format_line("SUMMARY", &format!("    {}: {}", key, value)));
        }
    }
}
