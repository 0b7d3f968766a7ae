//! Regular expression tester

use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde::Serialize;

use super::ToolError;

/// Upper bound on reported matches
pub const MAX_MATCHES: usize = 1000;

const MAX_PATTERN_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    #[serde(rename = "match")]
    pub text: String,
    /// Character offset of the match in the input
    pub index: usize,
    pub groups: Vec<Option<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    global: bool,
    ignore_case: bool,
    multi_line: bool,
    dot_all: bool,
    extended: bool,
}

fn parse_flags(flags: &str) -> Result<Flags, ToolError> {
    let mut parsed = Flags::default();
    for c in flags.chars() {
        match c {
            'g' => parsed.global = true,
            'i' => parsed.ignore_case = true,
            'm' => parsed.multi_line = true,
            's' => parsed.dot_all = true,
            'x' => parsed.extended = true,
            // Unicode is always on
            'u' => {}
            other => return Err(ToolError::unsupported("regex flag", other.to_string())),
        }
    }
    Ok(parsed)
}

/// Run `pattern` over `text`. Without the `g` flag only the first match is reported.
pub fn test_pattern(pattern: &str, flags: &str, text: &str) -> Result<Vec<PatternMatch>, ToolError> {
    let flags = parse_flags(flags)?;
    let re = RegexBuilder::new(pattern)
        .case_insensitive(flags.ignore_case)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_all)
        .ignore_whitespace(flags.extended)
        .size_limit(MAX_PATTERN_SIZE)
        .build()
        .map_err(|e| ToolError::invalid(format!("Invalid regular expression: {}", e)))?;

    let limit = if flags.global { MAX_MATCHES } else { 1 };
    let names: Vec<Option<&str>> = re.capture_names().collect();
    // Byte and char offsets of the previous match start
    let mut cursor = (0usize, 0usize);

    Ok(re
        .captures_iter(text)
        .take(limit)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            let named = names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| name.map(|n| (n.to_string(), group(i))))
                .collect();
            let (last_byte, last_char) = cursor;
            let index = last_char + text[last_byte..whole.start()].chars().count();
            cursor = (whole.start(), index);
            Some(PatternMatch {
                text: whole.as_str().to_string(),
                index,
                groups: (1..caps.len()).map(group).collect(),
                named,
            })
        })
        .collect())
}
