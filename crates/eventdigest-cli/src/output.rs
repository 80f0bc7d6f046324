//! Output formatting utilities.

use eventdigest_canonical::Canonicalized;
use eventdigest_journal::ReadStats;
use eventdigest_store::{AnalysisStats, OutputStats};
use serde::Serialize;
use std::path::PathBuf;

/// Everything worth reporting about one `analyze` run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub input_files: Vec<PathBuf>,
    pub read: ReadStats,
    pub analysis: AnalysisStats,
    pub output: OutputStats,
}

/// Formats a run summary as aligned `name value` rows.
pub fn format_summary(summary: &RunSummary) -> String {
    let skipped: Vec<(String, u64)> = summary
        .analysis
        .skipped
        .iter()
        .map(|(label, count)| (format!("skipped: {}", label.replace('_', " ")), *count))
        .collect();
    let mut rows = vec![
        ("input files", summary.input_files.len() as u64),
        ("lines read", summary.read.lines_read),
        ("malformed lines", summary.read.malformed_lines),
        ("events", summary.analysis.events),
        ("events analyzed", summary.analysis.analyzed),
        ("key paths emitted", summary.analysis.emissions),
    ];
    rows.extend(skipped.iter().map(|(label, count)| (label.as_str(), *count)));
    rows.push(("digest files", summary.output.files_written));
    rows.push(("merged partitions", summary.output.partitions_merged));
    rows.push(("digest lines", summary.output.lines_written));
    rows.push(("unrenderable lines", summary.output.lines_skipped));

    rows.iter()
        .map(|(label, value)| format!("{:<28} {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the result of canonicalizing one event type.
pub fn format_canonicalized(result: &Canonicalized) -> String {
    match result {
        Canonicalized::Signature(signature) => signature.clone(),
        Canonicalized::Excluded(reason) => format!("excluded: {}", reason),
    }
}
