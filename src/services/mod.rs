pub mod dialog;
pub mod error;
pub mod qa;
pub mod types;

pub use dialog::{DialogService, HttpDialogClient};
pub use error::ServiceError;
pub use qa::{HttpQaClient, QaService};
