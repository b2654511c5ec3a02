pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::FirestoreClient;
pub use error::{FirestoreError, FirestoreResult};
pub use types::{Document, Value, document_id_violation};
