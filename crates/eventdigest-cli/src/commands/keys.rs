//! Keys command implementation.

use eventdigest_store::{AnalysisOptions, EventAnalyzer, RawEvent};
use std::io::{self, Read};

pub fn run(
    input: Option<String>,
    check_user_identity: bool,
    exclude_context: bool,
    include_attested_marker: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Read the record from file or stdin
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let event = RawEvent::parse(json_str.trim()).map_err(|e| format!("Invalid record: {}", e))?;

    let analyzer = EventAnalyzer::new(
        AnalysisOptions {
            check_user_identity,
            exclude_context,
            include_attested_marker,
            ..Default::default()
        },
        None,
    );
    let hints = analyzer.hints_for(&event);
    let keys = analyzer.key_paths(&event, &hints);

    if json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
    } else {
        for key in keys {
            println!("{}", key);
        }
    }

    Ok(())
}
