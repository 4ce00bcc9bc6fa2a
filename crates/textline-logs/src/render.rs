//! Renderers turning a [`QueryResult`] into response bodies.
//!
//! Each renderer is a pure function of its input. JSON output is the serde
//! form of the result itself, so only plaintext and HTML live here.

#![allow(clippy::format_push_string)]

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::LogError;
use crate::query::QueryResult;
use crate::types::{iso_millis, LogEntry, LogLevel};

/// Output format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Structured JSON
    Json,
    /// One line per entry
    Text,
    /// Styled HTML document
    Html,
    /// Condensed diagnosis for automated agents
    Summary,
}

impl OutputFormat {
    /// Parses a format, falling back to `default` when absent or unknown.
    #[must_use]
    pub fn parse_or(raw: Option<&str>, default: Self) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(default)
    }

    /// Returns the `Content-Type` for this format.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json | Self::Summary => "application/json",
            Self::Text => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "summary" => Ok(Self::Summary),
            other => Err(LogError::UnknownFormat(other.to_string())),
        }
    }
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats one entry as `[timestamp] [LEVEL] message {data}`.
///
/// The payload is omitted when empty.
#[must_use]
pub fn format_line(entry: &LogEntry) -> String {
    let mut line = format!("[{}] [{}] {}", entry.timestamp_iso(), entry.level, entry.message);
    if entry.has_data() {
        line.push(' ');
        line.push_str(&entry.data_json());
    }
    line
}

/// Renders one line per entry, newest first.
#[must_use]
pub fn render_text(result: &QueryResult) -> String {
    result
        .entries
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

const STYLE: &str = r"
        body { font-family: 'Courier New', monospace; margin: 20px; background: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }
        .log-entry { margin: 10px 0; padding: 10px; border-left: 4px solid #ccc; background: #f9f9f9; }
        .log-entry.ERROR { border-left-color: #e74c3c; background: #fdf2f2; }
        .log-entry.WARN { border-left-color: #f39c12; background: #fefbf3; }
        .log-entry.INFO { border-left-color: #3498db; background: #f3f8fd; }
        .log-entry.DEBUG { border-left-color: #95a5a6; background: #f8f9fa; }
        .timestamp { color: #666; font-size: 0.9em; }
        .level { font-weight: bold; padding: 2px 6px; border-radius: 3px; font-size: 0.8em; color: white; }
        .level.ERROR { background: #e74c3c; }
        .level.WARN { background: #f39c12; }
        .level.INFO { background: #3498db; }
        .level.DEBUG { background: #95a5a6; }
        .message { margin: 5px 0; }
        .data { background: #ecf0f1; padding: 8px; border-radius: 4px; margin-top: 5px; font-size: 0.9em; white-space: pre-wrap; }
        .request-id { color: #7f8c8d; font-size: 0.8em; }
        h1 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
        h2 { color: #2c3e50; font-size: 1.1em; }
        .stats { background: #ecf0f1; padding: 10px; border-radius: 4px; margin-bottom: 20px; }
";

/// Renders a standalone HTML document with entries grouped by level.
///
/// Message, payload and request id are escaped, since they may carry text
/// from inbound messages.
#[must_use]
pub fn render_html(result: &QueryResult, generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <title>Textline Logs</title>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("    <style>{STYLE}    </style>\n</head>\n<body>\n"));
    html.push_str("    <div class=\"container\">\n        <h1>Textline Logs</h1>\n");
    html.push_str(&format!(
        "        <div class=\"stats\"><strong>Total Entries:</strong> {} | <strong>Generated:</strong> {}</div>\n",
        result.stats.total,
        iso_millis::format(&generated_at)
    ));

    for level in LogLevel::ALL {
        let group: Vec<&LogEntry> = result.entries.iter().filter(|e| e.level == level).collect();
        if group.is_empty() {
            continue;
        }
        html.push_str(&format!(
            "        <section class=\"group {level}\">\n            <h2>{level} ({})</h2>\n",
            group.len()
        ));
        for entry in group {
            html.push_str(&render_html_entry(entry));
        }
        html.push_str("        </section>\n");
    }

    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

fn render_html_entry(entry: &LogEntry) -> String {
    let mut out = format!(
        "            <div class=\"log-entry {level}\">\n                <div><span class=\"timestamp\">{ts}</span> <span class=\"level {level}\">{level}</span>",
        level = entry.level,
        ts = entry.timestamp_iso(),
    );
    if let Some(ref request_id) = entry.request_id {
        out.push_str(&format!(
            " <span class=\"request-id\">Request: {}</span>",
            escape_html(request_id)
        ));
    }
    out.push_str("</div>\n");
    out.push_str(&format!(
        "                <div class=\"message\">{}</div>\n",
        escape_html(&entry.message)
    ));
    if entry.has_data() {
        let pretty = serde_json::to_string_pretty(&entry.data).unwrap_or_else(|_| entry.data_json());
        out.push_str(&format!(
            "                <div class=\"data\">{}</div>\n",
            escape_html(&pretty)
        ));
    }
    out.push_str("            </div>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default()
    }

    #[test_case(Some("json"), OutputFormat::Json ; "json")]
    #[test_case(Some("TEXT"), OutputFormat::Text ; "upper text")]
    #[test_case(Some("html"), OutputFormat::Html ; "html")]
    #[test_case(Some("summary"), OutputFormat::Summary ; "summary")]
    #[test_case(Some("xml"), OutputFormat::Json ; "unknown falls back")]
    #[test_case(None, OutputFormat::Json ; "absent falls back")]
    fn output_format_parse(raw: Option<&str>, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse_or(raw, OutputFormat::Json), expected);
    }

    #[test]
    fn escape_covers_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn line_format_with_and_without_data() {
        let entry = LogEntry::new(LogLevel::Warn, "slow").with_timestamp(fixed_time());
        assert_eq!(format_line(&entry), "[2025-06-01T12:00:00.000Z] [WARN] slow");

        let entry = entry.with_field("ms", json!(900));
        assert_eq!(
            format_line(&entry),
            "[2025-06-01T12:00:00.000Z] [WARN] slow {\"ms\":900}"
        );
    }

    #[test]
    fn text_is_one_line_per_entry() {
        let result = QueryResult::new(vec![
            LogEntry::new(LogLevel::Error, "b"),
            LogEntry::new(LogLevel::Info, "a"),
        ]);
        let text = render_text(&result);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().is_some_and(|l| l.contains("[ERROR] b")));
    }

    #[test]
    fn html_escapes_script_tags() {
        let result = QueryResult::new(vec![LogEntry::new(
            LogLevel::Info,
            "<script>alert(1)</script>",
        )
        .with_field("body", json!("<img onerror='x'>"))]);
        let html = render_html(&result, fixed_time());

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;img onerror=&#039;x&#039;&gt;"));
    }

    #[test]
    fn html_groups_by_level_in_severity_order() {
        let result = QueryResult::new(vec![
            LogEntry::new(LogLevel::Info, "info one"),
            LogEntry::new(LogLevel::Error, "error one"),
            LogEntry::new(LogLevel::Info, "info two"),
        ]);
        let html = render_html(&result, fixed_time());

        let error_at = html.find("<h2>ERROR (1)</h2>");
        let info_at = html.find("<h2>INFO (2)</h2>");
        assert!(error_at.is_some());
        assert!(info_at.is_some());
        assert!(error_at < info_at);
        assert!(!html.contains("<h2>WARN"));
        assert!(html.contains("Total Entries:</strong> 3"));
    }

    #[test]
    fn html_shows_request_id() {
        let result = QueryResult::new(vec![
            LogEntry::new(LogLevel::Debug, "x").with_request_id("req-42"),
        ]);
        let html = render_html(&result, fixed_time());
        assert!(html.contains("Request: req-42"));
    }

    #[test]
    fn content_types() {
        assert_eq!(OutputFormat::Json.content_type(), "application/json");
        assert!(OutputFormat::Html.content_type().starts_with("text/html"));
        assert!(OutputFormat::Text.content_type().starts_with("text/plain"));
    }
}
