use std::fmt;

use uuid::Uuid;

use crate::contact::{ContactPayload, DatabaseContact};

/// Identity of a contact record.
///
/// Client ids exist only inside this process and are never sent to the
/// server as authoritative identity; only server-assigned ids address
/// delete and update operations. Keeping the two spaces in one tagged
/// union prevents a client id from leaking into a server-side call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactId {
    Client(Uuid),
    Server(i64),
}

impl ContactId {
    pub fn fresh() -> Self {
        ContactId::Client(Uuid::new_v4())
    }

    pub fn server(&self) -> Option<i64> {
        match self {
            ContactId::Server(id) => Some(*id),
            ContactId::Client(_) => None,
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactId::Client(uuid) => write!(f, "{uuid}"),
            ContactId::Server(id) => write!(f, "{id}"),
        }
    }
}

/// One contact held in a local collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    pub id: ContactId,
    pub payload: ContactPayload,
}

impl ContactRecord {
    /// Wrap a freshly extracted (or improved/deduped) payload under a new
    /// client id. Server ids are intentionally discarded here: those
    /// operations return reconstructed records, not identified ones.
    pub fn extracted(payload: ContactPayload) -> Self {
        Self {
            id: ContactId::fresh(),
            payload,
        }
    }

    /// Wrap a contact fetched from the remote store, keyed by its
    /// server-assigned id.
    pub fn persisted(contact: DatabaseContact) -> Self {
        Self {
            id: ContactId::Server(contact.id),
            payload: contact.payload,
        }
    }
}
