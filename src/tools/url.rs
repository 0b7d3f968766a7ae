//! Percent-encoding and query string building

use serde::Deserialize;

use super::ToolError;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

pub fn encode(input: &str) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::invalid("Please enter a URL or text."));
    }
    Ok(urlencoding::encode(input).into_owned())
}

pub fn decode(input: &str) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::invalid("Please enter a URL or text."));
    }
    urlencoding::decode(input)
        .map(|s| s.into_owned())
        .map_err(|_| ToolError::invalid("Error: URI malformed"))
}

/// `key=value` pairs joined by `&`; pairs with a blank key or value are skipped
pub fn build_query(params: &[QueryParam]) -> Result<String, ToolError> {
    let pairs: Vec<String> = params
        .iter()
        .filter(|p| !p.key.trim().is_empty() && !p.value.trim().is_empty())
        .map(|p| format!("{}={}", urlencoding::encode(&p.key), urlencoding::encode(&p.value)))
        .collect();

    if pairs.is_empty() {
        return Err(ToolError::invalid(
            "Please add at least one valid key-value pair.",
        ));
    }
    Ok(pairs.join("&"))
}
