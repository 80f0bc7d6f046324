//! Analyze command implementation.

use crate::config::{AnalysisConfig, AnalyzeArgs};
use crate::output::{self, RunSummary};
use eventdigest_journal::{load_identity_directory, EventLogReader, ReadStats};
use eventdigest_store::{Aggregator, AnalysisStats, EventAnalyzer, PartitionWriter, RawEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Events analyzed per parallel batch.
const BATCH_SIZE: usize = 8192;

pub fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AnalysisConfig::from_args(&args)?;

    let directory = match &config.identity_directory {
        Some(path) => {
            let (directory, _) = load_identity_directory(path).map_err(|e| {
                format!("Failed to load identity directory {}: {}", path.display(), e)
            })?;
            Some(directory)
        }
        None => None,
    };

    let files = input_files(&config.inputs)?;
    info!(files = files.len(), "analyzing tracking logs");

    let analyzer = EventAnalyzer::new(config.options.clone(), directory.as_ref());
    let mut aggregator = Aggregator::new();
    let mut analysis = AnalysisStats::default();
    let mut read = ReadStats::default();

    for path in &files {
        let mut reader = EventLogReader::open(path)
            .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
        let mut batch: Vec<RawEvent> = Vec::with_capacity(BATCH_SIZE);
        while let Some(event) = reader.read_event()? {
            batch.push(event);
            if batch.len() == BATCH_SIZE {
                absorb(&analyzer, &batch, &mut aggregator, &mut analysis);
                batch.clear();
            }
        }
        absorb(&analyzer, &batch, &mut aggregator, &mut analysis);
        debug!(path = %path.display(), stats = ?reader.stats(), "read input");
        read.merge(reader.stats());
    }

    let writer = PartitionWriter::create(&config.output_root)?;
    let written = writer.write_all(&aggregator)?;
    info!(
        events = analysis.events,
        analyzed = analysis.analyzed,
        skipped = analysis.total_skipped(),
        digests = written.files_written,
        "analysis complete"
    );

    let summary = RunSummary {
        input_files: files,
        read,
        analysis,
        output: written,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", output::format_summary(&summary));
    }

    Ok(())
}

fn absorb(
    analyzer: &EventAnalyzer<'_>,
    batch: &[RawEvent],
    aggregator: &mut Aggregator,
    analysis: &mut AnalysisStats,
) {
    if batch.is_empty() {
        return;
    }
    let (partial, stats) = analyzer.analyze_all(batch);
    aggregator.merge(partial);
    analysis.merge(&stats);
}

/// Expands directories into the regular files they hold, in name order.
fn input_files(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = list_files(input)?;
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directories_expand_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.log"), "").unwrap();
        fs::write(temp_dir.path().join("a.log"), "").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        let single = temp_dir.path().join("z.log");

        let files = input_files(&[temp_dir.path().to_path_buf(), single.clone()]).unwrap();
        assert_eq!(
            files,
            vec![
                temp_dir.path().join("a.log"),
                temp_dir.path().join("b.log"),
                single,
            ]
        );
    }
}
