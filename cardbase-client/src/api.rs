//! Typed client for the card-extraction backend.
//!
//! One method per remote operation, single attempt each: no retries, no
//! timeout, no backoff. Response bodies are parsed as JSON on success
//! only; a non-success body is read as text and carried in the error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    ContactPayload, CreateContactResponse, DedupeResponse, ExtractResponse, NameSearchResponse,
    SearchResponse,
};
use thiserror::Error;

/// Default page size for `/contacts/` searches.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[derive(Serialize)]
struct ImproveRequest<'a> {
    contacts: &'a [ContactPayload],
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[derive(Serialize)]
struct DedupeRequest<'a> {
    contacts: &'a [ContactPayload],
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Upload one card image for OCR + AI extraction.
    pub async fn extract(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/extract/", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Ask the backend AI to re-infer fields on existing contacts.
    pub async fn improve(
        &self,
        contacts: &[ContactPayload],
        instructions: Option<&str>,
    ) -> Result<ExtractResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/improve/", self.base_url))
            .json(&ImproveRequest {
                contacts,
                instructions,
            })
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Merge contacts the backend judges to represent the same entity.
    pub async fn dedupe(&self, contacts: &[ContactPayload]) -> Result<DedupeResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/dedupe/", self.base_url))
            .json(&DedupeRequest { contacts })
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Search the remote store. An empty query lists everything; the
    /// `query` parameter is omitted entirely in that case.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResponse, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));

        let response = self
            .http
            .get(format!("{}/contacts/", self.base_url))
            .query(&params)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Exact-name lookup against the remote store.
    pub async fn search_by_name(&self, name: &str) -> Result<NameSearchResponse, ApiError> {
        let response = self
            .http
            .get(format!("{}/contacts/search/by-name", self.base_url))
            .query(&[("name", name)])
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Persist one contact as a new remote record.
    pub async fn create_contact(
        &self,
        contact: &ContactPayload,
    ) -> Result<CreateContactResponse, ApiError> {
        let response = self
            .http
            .post(format!("{}/contacts/", self.base_url))
            .json(contact)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Delete one remote record by its server-assigned id. The response
    /// body is ignored.
    pub async fn delete_contact(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/contacts/{}", self.base_url, id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_contact(name: &str) -> ContactPayload {
        ContactPayload {
            name: Some(name.to_string()),
            ..ContactPayload::default()
        }
    }

    #[tokio::test]
    async fn non_success_status_maps_to_request_failed_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dedupe/"))
            .respond_with(ResponseTemplate::new(422).set_body_string("contacts field is required"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.dedupe(&[]).await.unwrap_err();

        match err {
            ApiError::RequestFailed { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "contacts field is required");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_network_error() {
        // Port 1 is never listening.
        let client = ApiClient::new("http://127.0.0.1:1");
        let err = client.search("", DEFAULT_SEARCH_LIMIT, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn empty_query_is_omitted_from_search_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts/"))
            .and(query_param_is_missing("query"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contacts": [], "total": 0, "limit": 100, "offset": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let response = client.search("", DEFAULT_SEARCH_LIMIT, 0).await.unwrap();
        assert_eq!(response.total, 0);
    }

    #[tokio::test]
    async fn non_empty_query_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts/"))
            .and(query_param("query", "ada@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contacts": [], "total": 1, "limit": 100, "offset": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let response = client
            .search("ada@example.com", DEFAULT_SEARCH_LIMIT, 0)
            .await
            .unwrap();
        assert_eq!(response.total, 1);
    }

    #[tokio::test]
    async fn extract_posts_multipart_to_the_extract_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contacts": [{"name": "Jane Doe", "phone": null, "email": null,
                              "company": null, "notes": null, "confidence": 0.9,
                              "extra": null}],
                "meta": {"ocr_confidence": 0.9, "ocr_text": "Jane Doe"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let response = client
            .extract("card.jpg", b"not-really-a-jpeg".to_vec())
            .await
            .unwrap();

        assert_eq!(response.contacts.len(), 1);
        assert_eq!(response.contacts[0].name.as_deref(), Some("Jane Doe"));

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn improve_omits_absent_instructions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/improve/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"contacts": []})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        client
            .improve(&[sample_contact("Jane")], None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("instructions").is_none());
        assert_eq!(body["contacts"][0]["name"], json!("Jane"));
        // Explicit nulls, not missing keys, for absent payload fields.
        assert_eq!(body["contacts"][0]["email"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn delete_targets_the_record_path_and_ignores_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/contacts/42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Contact deleted successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        client.delete_contact(42).await.unwrap();
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
