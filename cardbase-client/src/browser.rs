//! Database browser: an independent view over the remote contact store,
//! with search, merge-duplicates and delete reconciliation.

use std::time::{Duration, Instant};

use shared_types::ContactRecord;

use crate::api::{ApiClient, DEFAULT_SEARCH_LIMIT};
use crate::plural;
use crate::store::ContactStore;

/// How long a transient notice (delete confirmation) stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug)]
struct Notice {
    text: String,
    expires_at: Option<Instant>,
}

/// Browser over the persisted contact database.
///
/// Holds its own collection sourced from `/contacts/` search results,
/// never from the workspace. Destructive operations (merge, delete) are
/// reflected back to the server; callers are expected to confirm them
/// first.
pub struct DatabaseBrowser {
    client: ApiClient,
    store: ContactStore,
    last_query: String,
    search_info: Option<String>,
    notice: Option<Notice>,
    error: Option<String>,
}

impl DatabaseBrowser {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            store: ContactStore::new(),
            last_query: String::new(),
            search_info: None,
            notice: None,
            error: None,
        }
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        self.store.records()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_info(&self) -> Option<&str> {
        self.search_info.as_deref()
    }

    /// The current notice, if it has not expired yet.
    pub fn notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| {
                notice
                    .expires_at
                    .map_or(true, |expires_at| Instant::now() < expires_at)
            })
            .map(|notice| notice.text.as_str())
    }

    fn set_notice(&mut self, text: String, transient: bool) {
        self.notice = Some(Notice {
            text,
            expires_at: transient.then(|| Instant::now() + NOTICE_TTL),
        });
    }

    /// Query the remote store and replace the local collection with the
    /// results. An empty query lists the whole database.
    pub async fn search(&mut self, query: &str) {
        self.error = None;
        self.search_info = None;
        self.last_query = query.to_string();

        match self.client.search(query, DEFAULT_SEARCH_LIMIT, 0).await {
            Ok(response) => {
                let total = response.total;
                let records = response
                    .contacts
                    .into_iter()
                    .map(ContactRecord::persisted)
                    .collect();
                self.store.replace(records);

                self.search_info = Some(if query.is_empty() {
                    format!("Showing {} contact{} from the database", total, plural(total))
                } else {
                    format!("Found {} contact{} matching \"{}\"", total, plural(total), query)
                });
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Merge duplicates across the displayed collection and reconcile the
    /// server: delete every original record, then re-insert the merged
    /// ones, then reload.
    ///
    /// The two phases are not transactional. A failure between the delete
    /// loop and the insert loop can lose data; per-record failures inside
    /// either loop are logged and the batch continues.
    pub async fn merge_duplicates(&mut self) {
        self.error = None;
        self.notice = None;

        let original_ids = self.store.server_ids();
        let payload = self.store.payloads();

        match self.client.dedupe(&payload).await {
            Ok(response) => match response.meta {
                Some(meta) if meta.duplicates_found > 0 => {
                    for id in original_ids {
                        if let Err(e) = self.client.delete_contact(id).await {
                            tracing::error!(id, "failed to delete contact during merge: {}", e);
                        }
                    }
                    for contact in &response.contacts {
                        if let Err(e) = self.client.create_contact(contact).await {
                            tracing::error!("failed to save merged contact: {}", e);
                        }
                    }

                    self.set_notice(
                        format!(
                            "Merged {} duplicate{} ({} -> {} contacts)",
                            meta.duplicates_found,
                            plural(meta.duplicates_found),
                            meta.original_count,
                            meta.merged_count
                        ),
                        false,
                    );

                    self.search("").await;
                }
                _ => {
                    self.set_notice(
                        "No duplicates found. All contacts are unique.".to_string(),
                        false,
                    );
                }
            },
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Delete one record by server id, then reload the last-used query.
    /// On failure the displayed collection is left untouched.
    pub async fn delete(&mut self, id: i64) {
        match self.client.delete_contact(id).await {
            Ok(()) => {
                let query = self.last_query.clone();
                self.search(&query).await;
                self.set_notice("Contact deleted successfully".to_string(), true);
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }
}
