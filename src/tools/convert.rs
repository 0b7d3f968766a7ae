//! JSON formatting and JSON / CSV / YAML conversion

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use super::ToolError;

pub const DEFAULT_INDENT: usize = 2;
const MAX_INDENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Csv,
    Yaml,
}

impl DataFormat {
    fn label(self) -> &'static str {
        match self {
            DataFormat::Json => "JSON",
            DataFormat::Csv => "CSV",
            DataFormat::Yaml => "YAML",
        }
    }
}

impl FromStr for DataFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "csv" => Ok(DataFormat::Csv),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            _ => Err(ToolError::unsupported("data format", s)),
        }
    }
}

fn to_json(value: &Value, indent: usize) -> Result<String, ToolError> {
    let pad = vec![b' '; indent.min(MAX_INDENT)];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&pad);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ToolError::invalid(e.to_string()))?;
    String::from_utf8(out).map_err(|e| ToolError::invalid(e.to_string()))
}

/// Pretty-print or minify a JSON document
pub fn format_json(input: &str, indent: Option<usize>, minify: bool) -> Result<String, ToolError> {
    let value: Value = serde_json::from_str(input).map_err(|_| ToolError::invalid("Invalid JSON"))?;
    if minify {
        return serde_json::to_string(&value).map_err(|e| ToolError::invalid(e.to_string()));
    }
    to_json(&value, indent.unwrap_or(DEFAULT_INDENT))
}

fn parse_csv(input: &str) -> Result<Value, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(input.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}

fn parse(input: &str, format: DataFormat) -> Result<Value, ToolError> {
    let result = match format {
        DataFormat::Json => serde_json::from_str(input).map_err(|e| e.to_string()),
        DataFormat::Yaml => serde_yaml::from_str(input).map_err(|e| e.to_string()),
        DataFormat::Csv => parse_csv(input).map_err(|e| e.to_string()),
    };
    result.map_err(|e| ToolError::invalid(format!("Invalid {}: {}", format.label(), e)))
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv(value: &Value) -> Result<String, ToolError> {
    let rows = value
        .as_array()
        .ok_or_else(|| ToolError::invalid("Input must be an array of objects for CSV output."))?;

    // Header is the union of keys in first-seen order
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| ToolError::invalid("Input must be an array of objects for CSV output."))?;
        for key in obj.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let conversion = |e: csv::Error| ToolError::invalid(format!("Conversion error: {}", e));
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).map_err(conversion)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.get(*c).map(csv_cell).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(conversion)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ToolError::invalid(format!("Conversion error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ToolError::invalid(e.to_string()))
}

/// Convert a document between JSON, CSV and YAML
pub fn convert(input: &str, from: DataFormat, to: DataFormat) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::invalid("Please enter an input."));
    }
    let value = parse(input, from)?;
    match to {
        DataFormat::Json => to_json(&value, DEFAULT_INDENT),
        DataFormat::Yaml => serde_yaml::to_string(&value)
            .map_err(|e| ToolError::invalid(format!("Conversion error: {}", e))),
        DataFormat::Csv => write_csv(&value),
    }
}
