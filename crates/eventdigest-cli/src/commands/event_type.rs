//! Event-type command implementation.

use crate::config::EventTypeFlags;
use crate::output;
use eventdigest_canonical::{canonicalize_event_type, Canonicalized, HintSources, IdentityHints};
use serde_json::json;

pub fn run(
    event_type: String,
    flags: EventTypeFlags,
    username: Option<String>,
    user_id: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = flags.validate()?;
    let hints = IdentityHints::from_sources(
        &HintSources {
            username,
            context_user_id: user_id,
            payload_user_id: None,
        },
        None,
    );

    let result = canonicalize_event_type(&event_type, &options, Some(&hints));

    if json {
        let (signature, excluded) = match &result {
            Canonicalized::Signature(signature) => (Some(signature.as_str()), None),
            Canonicalized::Excluded(reason) => (None, Some(reason)),
        };
        let output = json!({
            "event_type": event_type,
            "signature": signature,
            "excluded": excluded,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output::format_canonicalized(&result));
    }

    Ok(())
}
