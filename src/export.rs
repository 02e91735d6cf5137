//! Record exporters: CSV, JSON, XML and YAML.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BuddyError;
use crate::generators::content::mime_type_for_extension;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xml,
    Yaml,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = BuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(BuddyError::InvalidInput(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exported {
    pub body: String,
    pub extension: &'static str,
    pub mime_type: &'static str,
}

impl Exported {
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }
}

pub fn export_records(records: &[Record], format: ExportFormat) -> Result<Exported, BuddyError> {
    let body = match format {
        ExportFormat::Csv => to_csv(records)?,
        ExportFormat::Json => serde_json::to_string_pretty(records)?,
        ExportFormat::Xml => to_xml(records),
        ExportFormat::Yaml => serde_yaml::to_string(records)?,
    };
    Ok(Exported {
        body,
        extension: format.extension(),
        mime_type: mime_type_for_extension(format.extension()),
    })
}

/// Union of record keys in first-seen order.
fn columns(records: &[Record]) -> Vec<&str> {
    let mut cols: Vec<&str> = Vec::new();
    for key in records.iter().flat_map(|r| r.keys()) {
        if !cols.contains(&key.as_str()) {
            cols.push(key.as_str());
        }
    }
    cols
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn to_csv(records: &[Record]) -> Result<String, BuddyError> {
    let cols = columns(records);
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !cols.is_empty() {
        writer.write_record(&cols)?;
    }
    for record in records {
        writer.write_record(cols.iter().map(|c| cell(record.get(*c))))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| BuddyError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BuddyError::Export(e.to_string()))
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Keys become element names; anything outside `[A-Za-z0-9_.-]` turns into `_`.
fn element_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let bad_start = name
        .chars()
        .next()
        .is_none_or(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if bad_start {
        name.insert(0, '_');
    }
    name
}

fn to_xml(records: &[Record]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<records>\n");
    for record in records {
        out.push_str("  <record>\n");
        for (key, value) in record {
            let name = element_name(key);
            out.push_str(&format!(
                "    <{name}>{}</{name}>\n",
                escape_xml(&cell(Some(value)))
            ));
        }
        out.push_str("  </record>\n");
    }
    out.push_str("</records>\n");
    out
}
