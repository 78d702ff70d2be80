pub mod contact;
pub mod record;
pub mod response;

pub use contact::{ContactPayload, DatabaseContact};
pub use record::{ContactId, ContactRecord};
pub use response::{
    CreateContactResponse, DedupeMeta, DedupeResponse, ExtractMeta, ExtractResponse,
    NameSearchResponse, SearchResponse,
};
