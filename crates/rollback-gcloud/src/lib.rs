pub mod client;
pub mod command;
pub mod credentials;
pub mod error;

pub use client::{Gcloud, DEFAULT_LIST_LIMIT};
pub use credentials::CredentialFile;
pub use error::GcloudError;
