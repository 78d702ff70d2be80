pub mod api;
pub mod browser;
pub mod config;
pub mod render;
pub mod store;
pub mod workspace;

pub use api::{ApiClient, ApiError};
pub use browser::DatabaseBrowser;
pub use config::ClientConfig;
pub use store::ContactStore;
pub use workspace::Workspace;

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
