//! Keyword-driven error classification.
//!
//! [`analyze`] is a pure function of its input: it scans the ERROR entries in
//! order, counts them per [`Category`], and derives issues, guidance and a
//! health status from the counts.

use std::collections::HashSet;

use textline_logs::{LogEntry, LogLevel};
use tracing::debug;

use crate::types::{Category, Diagnosis, ErrorPatterns, HealthStatus};

/// Analyses `entries` and produces a [`Diagnosis`].
#[must_use]
pub fn analyze(entries: &[LogEntry]) -> Diagnosis {
    let errors: Vec<&LogEntry> = entries.iter().filter(|e| e.level == LogLevel::Error).collect();
    let warn_count = entries.iter().filter(|e| e.level == LogLevel::Warn).count();

    let mut patterns = ErrorPatterns::default();
    let mut specific_issues = Vec::new();
    let mut seen = HashSet::new();

    for entry in &errors {
        let message = entry.message.to_lowercase();
        let data = entry.data_json().to_lowercase();
        for category in Category::ALL {
            if category.matches(&message, &data) {
                patterns.increment(category);
                if seen.insert(category) {
                    specific_issues.push(category.issue().to_string());
                }
            }
        }
    }

    let error_count = errors.len();
    patterns.other = error_count as i64 - patterns.categorised() as i64;

    let (recommendations, next_steps) = guidance(&patterns, error_count, warn_count);
    let health_status = health_status(&patterns, error_count);

    debug!(
        error_count,
        warn_count,
        status = %health_status,
        "analysed log entries"
    );

    Diagnosis {
        summary: summary_line(error_count, warn_count),
        error_count,
        warn_count,
        patterns,
        specific_issues,
        recommendations,
        next_steps,
        health_status,
    }
}

fn guidance(patterns: &ErrorPatterns, error_count: usize, warn_count: usize) -> (Vec<String>, Vec<String>) {
    let mut recommendations = Vec::new();
    let mut next_steps = Vec::new();

    for category in Category::ALL {
        if patterns.get(category) > 0 {
            recommendations.push(category.recommendation().to_string());
            next_steps.push(category.next_step().to_string());
        }
    }

    if error_count == 0 {
        recommendations.push("No errors detected - application appears healthy".to_string());
        if warn_count > 0 {
            recommendations.push(format!("Review {warn_count} warning(s) for potential issues"));
        }
    }

    (recommendations, next_steps)
}

fn health_status(patterns: &ErrorPatterns, error_count: usize) -> HealthStatus {
    if error_count == 0 {
        HealthStatus::Healthy
    } else if patterns.configuration > 0 {
        HealthStatus::ConfigurationError
    } else {
        HealthStatus::ErrorsDetected
    }
}

fn summary_line(error_count: usize, warn_count: usize) -> String {
    if error_count > 0 {
        format!("Found {error_count} error(s) and {warn_count} warning(s) requiring attention")
    } else {
        format!("Application healthy with {warn_count} warning(s)")
    }
}
