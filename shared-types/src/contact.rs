use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One business-card contact as exchanged with the backend.
///
/// Every field is nullable and `None` serializes as an explicit JSON
/// `null` -- absence must survive extract/improve/dedupe round trips
/// without being coerced to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Open mapping for backend-supplied fields outside the fixed schema.
    #[serde(default)]
    pub extra: Option<Map<String, Value>>,
}

impl ContactPayload {
    /// Extra entries worth displaying. Values that are JSON null, empty
    /// after trimming, or the literal string "null" (any case) are hidden
    /// but never removed from the record itself.
    pub fn visible_extra(&self) -> Vec<(&str, &Value)> {
        let Some(extra) = &self.extra else {
            return Vec::new();
        };
        extra
            .iter()
            .filter(|(_, value)| match value {
                Value::Null => false,
                Value::String(s) => {
                    let normalized = s.trim();
                    !normalized.is_empty() && !normalized.eq_ignore_ascii_case("null")
                }
                _ => true,
            })
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }

    /// Confidence reconciled into [0, 1] and rounded to a whole percentage.
    pub fn confidence_percent(&self) -> Option<u8> {
        self.confidence
            .map(|value| (value.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}

/// A contact persisted by the backend: the payload fields plus the
/// server-assigned id and timestamps (opaque to this client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseContact {
    pub id: i64,
    #[serde(flatten)]
    pub payload: ContactPayload,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_survive_a_round_trip() {
        let input = json!({
            "name": "Ada Lovelace",
            "phone": null,
            "email": "ada@example.com",
            "company": null,
            "notes": "",
            "confidence": 0.92,
            "extra": null
        });

        let payload: ContactPayload = serde_json::from_value(input).unwrap();
        assert_eq!(payload.phone, None);
        assert_eq!(payload.notes.as_deref(), Some(""));

        let output = serde_json::to_value(&payload).unwrap();
        assert_eq!(output["phone"], Value::Null);
        assert_eq!(output["notes"], json!(""));
        assert_eq!(output["email"], json!("ada@example.com"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let payload: ContactPayload = serde_json::from_str(r#"{"name": "Bo"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Bo"));
        assert_eq!(payload.email, None);
        assert_eq!(payload.extra, None);
    }

    #[test]
    fn visible_extra_filters_empty_and_null_markers() {
        let payload: ContactPayload = serde_json::from_value(json!({
            "extra": {
                "foo": "null",
                "bar": "",
                "baz": "x",
                "qux": null
            }
        }))
        .unwrap();

        let visible = payload.visible_extra();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0, "baz");

        // Hidden entries are filtered from display, not deleted.
        assert_eq!(payload.extra.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn visible_extra_keeps_non_string_scalars() {
        let payload: ContactPayload = serde_json::from_value(json!({
            "extra": {"years": 12, "active": false, "NULL": "NULL"}
        }))
        .unwrap();

        let visible = payload.visible_extra();
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn confidence_is_clamped_into_unit_range() {
        let mut payload = ContactPayload::default();
        assert_eq!(payload.confidence_percent(), None);

        payload.confidence = Some(0.876);
        assert_eq!(payload.confidence_percent(), Some(88));

        payload.confidence = Some(1.7);
        assert_eq!(payload.confidence_percent(), Some(100));

        payload.confidence = Some(-0.3);
        assert_eq!(payload.confidence_percent(), Some(0));
    }

    #[test]
    fn database_contact_flattens_payload_fields() {
        let contact: DatabaseContact = serde_json::from_value(json!({
            "id": 42,
            "name": "Ada Lovelace",
            "phone": null,
            "email": "ada@example.com",
            "company": "Analytical Engines",
            "notes": null,
            "confidence": null,
            "extra": null,
            "created_at": "2024-03-01T10:00:00",
            "updated_at": "2024-03-02T09:30:00"
        }))
        .unwrap();

        assert_eq!(contact.id, 42);
        assert_eq!(contact.payload.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(contact.created_at, "2024-03-01T10:00:00");
    }
}
