//! HTTP transfer for render jobs.
//!
//! This crate provides:
//! - Asset downloads and preflight HEAD checks
//! - Direct uploads to Cloudflare Stream (basic multipart and tus)
//! - Backend job callbacks

pub mod callback;
pub mod config;
pub mod error;
pub mod stream;
pub mod transfer;

pub use callback::CallbackClient;
pub use config::TransferConfig;
pub use error::{StorageError, StorageResult};
pub use stream::{stream_uid_from_url, UploadMode};
pub use transfer::{infer_asset_filename, TransferClient};
