//! Workspace orchestration: sequences multi-file uploads, merges the
//! extracted contacts into the workspace store, and runs the improve and
//! dedupe operations against it.

use std::path::{Path, PathBuf};

use shared_types::{ContactRecord, ExtractMeta};

use crate::api::{ApiClient, DEFAULT_SEARCH_LIMIT};
use crate::plural;
use crate::store::ContactStore;

/// Client-side workspace over the extraction backend.
///
/// Every operation takes `&mut self`, so at most one of extract, improve
/// and dedupe can be in flight at a time; the exclusive borrow is the
/// serialization guard.
pub struct Workspace {
    client: ApiClient,
    store: ContactStore,
    meta: Option<ExtractMeta>,
    error: Option<String>,
    notice: Option<String>,
}

impl Workspace {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            store: ContactStore::new(),
            meta: None,
            error: None,
            notice: None,
        }
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        self.store.records()
    }

    pub fn meta(&self) -> Option<&ExtractMeta> {
        self.meta.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Extract contacts from a batch of card images, strictly in order and
    /// one file at a time.
    ///
    /// A failing file is logged and skipped; the batch never aborts because
    /// one upload failed. The retained OCR meta is the last file's. On
    /// completion the workspace collection is replaced wholesale: each
    /// extract call resets the workspace rather than appending to it.
    pub async fn extract(&mut self, files: &[PathBuf]) {
        self.error = None;
        self.notice = None;

        let mut accumulated: Vec<ContactRecord> = Vec::new();
        let mut duplicate_count = 0usize;
        let last = files.len().saturating_sub(1);

        for (index, path) in files.iter().enumerate() {
            tracing::info!(
                file = %path.display(),
                "extracting contacts from image {}/{}",
                index + 1,
                files.len()
            );

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(file = %path.display(), "failed to read image: {}", e);
                    continue;
                }
            };

            let response = match self.client.extract(file_name(path), bytes).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(file = %path.display(), "extraction failed, skipping: {}", e);
                    continue;
                }
            };

            let records: Vec<ContactRecord> = response
                .contacts
                .into_iter()
                .map(ContactRecord::extracted)
                .collect();

            // Advisory check against the remote store: warn about likely
            // duplicates, never block. Lookup failures are swallowed.
            for record in &records {
                let Some(email) = record.payload.email.as_deref().filter(|e| !e.is_empty())
                else {
                    continue;
                };
                match self.client.search(email, DEFAULT_SEARCH_LIMIT, 0).await {
                    Ok(results) if results.total > 0 => duplicate_count += 1,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(email, "advisory duplicate lookup failed: {}", e);
                    }
                }
            }

            if index == last {
                self.meta = response.meta;
            }

            accumulated.extend(records);
        }

        let extracted = accumulated.len();
        tracing::info!("extracted {} contact(s) from {} file(s)", extracted, files.len());
        self.store.replace(accumulated);

        if duplicate_count > 0 {
            self.notice = Some(format!(
                "Found {} contact{} that may already exist in the database. \
                 Merge duplicates from the database view.",
                duplicate_count,
                plural(duplicate_count)
            ));
        } else if files.len() > 1 {
            self.notice = Some(format!(
                "Extracted {} contact{} from {} image{}.",
                extracted,
                plural(extracted),
                files.len(),
                plural(files.len())
            ));
        }
    }

    /// Send the current contacts through the backend AI for field
    /// correction. On success the collection is replaced with re-keyed
    /// results; on failure it is left untouched.
    pub async fn improve(&mut self, instructions: Option<&str>) {
        self.error = None;

        let payload = self.store.payloads();
        match self.client.improve(&payload, instructions).await {
            Ok(response) => {
                let records = response
                    .contacts
                    .into_iter()
                    .map(ContactRecord::extracted)
                    .collect();
                self.store.replace(records);
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Merge duplicates within the workspace collection. Local-only: the
    /// remote store is never touched here.
    pub async fn dedupe(&mut self) {
        self.error = None;
        self.notice = None;

        let payload = self.store.payloads();
        match self.client.dedupe(&payload).await {
            Ok(response) => {
                let records = response
                    .contacts
                    .into_iter()
                    .map(ContactRecord::extracted)
                    .collect();
                self.store.replace(records);

                if let Some(meta) = response.meta {
                    self.notice = Some(format!(
                        "Merged {} duplicate{} ({} -> {} contacts)",
                        meta.duplicates_found,
                        plural(meta.duplicates_found),
                        meta.original_count,
                        meta.merged_count
                    ));
                }
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("card.jpg")
}
