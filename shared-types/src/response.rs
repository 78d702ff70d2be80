use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contact::{ContactPayload, DatabaseContact};

/// OCR metadata attached to an extraction response. The backend may add
/// fields beyond the two it documents, so the remainder is kept open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractMeta {
    #[serde(default)]
    pub ocr_confidence: Option<f64>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Response envelope shared by `/extract/` and `/improve/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub contacts: Vec<ContactPayload>,
    #[serde(default)]
    pub meta: Option<ExtractMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeMeta {
    pub original_count: usize,
    pub merged_count: usize,
    pub duplicates_found: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupeResponse {
    #[serde(default)]
    pub contacts: Vec<ContactPayload>,
    #[serde(default)]
    pub meta: Option<DedupeMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub contacts: Vec<DatabaseContact>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameSearchResponse {
    pub contacts: Vec<DatabaseContact>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactResponse {
    pub contact: DatabaseContact,
    pub message: String,
}
