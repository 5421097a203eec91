//! Manifest repository synchronisation for tagwatch
//!
//! Keeps a local working copy of each application's deployment manifest
//! repository current: clone when the checkout is missing, pull when it
//! exists. A pull with nothing to fetch is a success, see
//! [`SyncOutcome::AlreadyUpToDate`].

pub mod backend;
pub mod error;
pub mod helpers;
pub mod sync;

pub use backend::{GitBackend, Git2Backend};
pub use error::{Error, Result};
pub use sync::{CloneOrPull, RepositorySync, SyncOutcome, DEFAULT_REMOTE};
