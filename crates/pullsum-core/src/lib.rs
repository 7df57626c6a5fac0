//! Bulk download of a project's objects with inline MD5 verification
//! against published checksum manifests.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod progress;
pub mod report;
pub mod retry;
pub mod storage;
pub mod store;
pub mod transfer;

pub use catalog::{Catalog, CatalogEntry};
pub use model::{FileProgress, OverallProgress, Phase, RemoteFile, VerifyResult, VerifyStatus};
pub use progress::ProgressEvent;
pub use transfer::{EngineError, RunOptions, TransferEngine};
