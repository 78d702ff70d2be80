//! Plain-text rendering of contact records for the CLI.

use std::fmt::Write as _;

use serde_json::Value;
use shared_types::{ContactRecord, ExtractMeta};

pub fn render_record(record: &ContactRecord) -> String {
    let payload = &record.payload;
    let mut out = String::new();

    let name = payload.name.as_deref().unwrap_or("Unknown Contact");
    let _ = write!(out, "{name}");
    if let Some(percent) = payload.confidence_percent() {
        let _ = write!(out, "  ({percent}% confidence)");
    }
    let _ = writeln!(out);

    if let Some(company) = payload.company.as_deref() {
        let _ = writeln!(out, "  Company: {company}");
    }
    if let Some(email) = payload.email.as_deref() {
        let _ = writeln!(out, "  Email:   {email}");
    }
    if let Some(phone) = payload.phone.as_deref() {
        let _ = writeln!(out, "  Phone:   {phone}");
    }
    if let Some(notes) = payload.notes.as_deref() {
        let _ = writeln!(out, "  Notes:   {notes}");
    }
    for (key, value) in payload.visible_extra() {
        let _ = writeln!(out, "  {key}: {}", render_value(value));
    }

    out
}

pub fn render_records(records: &[ContactRecord]) -> String {
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(out);
        }
        let _ = write!(out, "{}", render_record(record));
    }
    out
}

pub fn render_meta(meta: &ExtractMeta) -> Option<String> {
    let text = meta.ocr_text.as_deref()?;
    let mut out = String::from("--- OCR raw text ---\n");
    let _ = writeln!(out, "{text}");
    Some(out)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
