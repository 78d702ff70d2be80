use shared_types::{ContactPayload, ContactRecord};

/// Ordered in-memory collection of contact records.
///
/// Insertion order is the only ordering guarantee. The store does not
/// enforce dedup-by-id; that is the dedupe operation's job upstream.
#[derive(Debug, Default)]
pub struct ContactStore {
    contacts: Vec<ContactRecord>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a batch, keeping the batch's own order.
    pub fn add(&mut self, incoming: Vec<ContactRecord>) {
        let mut next = incoming;
        next.extend(self.contacts.drain(..));
        self.contacts = next;
    }

    pub fn replace(&mut self, next: Vec<ContactRecord>) {
        self.contacts = next;
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Payloads stripped of local identity, in store order. This is the
    /// shape sent to improve/dedupe, which return reconstructed records.
    pub fn payloads(&self) -> Vec<ContactPayload> {
        self.contacts
            .iter()
            .map(|record| record.payload.clone())
            .collect()
    }

    /// Server-assigned ids of the currently held records, in store order.
    /// Client-keyed records have no server identity and are skipped.
    pub fn server_ids(&self) -> Vec<i64> {
        self.contacts
            .iter()
            .filter_map(|record| record.id.server())
            .collect()
    }
}
