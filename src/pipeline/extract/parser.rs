//! Locate and parse the JSON object in the model's extraction reply.

use super::ExtractionError;
use crate::models::wire::RawDatabase;

/// Cut the JSON object out of the reply. The model tends to wrap it in
/// prose, so everything from the first `{` to the last `}` is taken.
pub fn extract_json(response: &str) -> Result<&str, ExtractionError> {
    let start = response
        .find('{')
        .ok_or_else(|| ExtractionError::SchemaParse("No JSON object in reply".to_string()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end >= start)
        .ok_or_else(|| ExtractionError::SchemaParse("Unclosed JSON object in reply".to_string()))?;
    Ok(&response[start..=end])
}

/// Parse the reply into the tolerant wire envelope.
pub fn parse_reply(response: &str) -> Result<RawDatabase, ExtractionError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| ExtractionError::SchemaParse(e.to_string()))
}
