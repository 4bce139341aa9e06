//! CSV rendering of stored documents.

use serde_json::Value;

pub const CSV_HEADER: &str = "id,timestamp,pageType,pageUrl,ttfb,lcp,fcp,cls,fid,inp,incomplete,userAgent,connectionType,deviceMemory";

/// Columns read from the top level of the document.
const TOP_LEVEL: [&str; 11] = [
    "id",
    "timestamp",
    "pageType",
    "pageUrl",
    "ttfb",
    "lcp",
    "fcp",
    "cls",
    "fid",
    "inp",
    "incomplete",
];

/// Columns read from `device`, or from the top level for flat documents.
const DEVICE: [&str; 3] = ["userAgent", "connectionType", "deviceMemory"];

/// Render one document as a CSV row (no trailing newline).
pub fn csv_row(document: &Value) -> String {
    let device = document.get("device");
    let device_field = |key: &str| {
        device
            .and_then(|d| d.get(key))
            .or_else(|| document.get(key))
    };

    TOP_LEVEL
        .iter()
        .map(|key| cell(document.get(*key)))
        .chain(DEVICE.iter().map(|key| cell(device_field(key))))
        .collect::<Vec<_>>()
        .join(",")
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::String(s)) => quote(s),
        Some(other) => quote(&other.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
